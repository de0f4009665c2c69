//! Command-line argument parsing

use std::path::PathBuf;

use anyhow::{Result, anyhow};

pub const APP_NAME: &str = "comfylens";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
    /// A graph passed directly on the command line
    Inline(String),
}

impl InputSource {
    fn classify(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else if arg.trim_start().starts_with('{') {
            InputSource::Inline(arg.to_string())
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }

    pub fn label(&self) -> String {
        match self {
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::File(path) => path.display().to_string(),
            InputSource::Inline(_) => "<inline>".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub inputs: Vec<InputSource>,
    pub mode: OutputMode,
    pub conventions: Option<PathBuf>,
    pub save_target: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Run(CliOptions),
    Help,
    Version,
}

pub fn parse_arguments(args: &[String]) -> Result<CliCommand> {
    if args.is_empty() {
        return Ok(CliCommand::Help);
    }

    let mut inputs = Vec::new();
    let mut mode = OutputMode::Text;
    let mut conventions: Option<PathBuf> = None;
    let mut save_target: Option<PathBuf> = None;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if matches!(arg.as_str(), "-h" | "--help") {
            return Ok(CliCommand::Help);
        }

        if matches!(arg.as_str(), "-v" | "--version") {
            return Ok(CliCommand::Version);
        }

        if matches!(arg.as_str(), "-j" | "--json") {
            mode = OutputMode::Json;
            i += 1;
            continue;
        }

        if let Some(value) = arg.strip_prefix("--conventions=") {
            set_once(&mut conventions, value, "--conventions")?;
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-c" | "--conventions") {
            let value = args
                .get(i + 1)
                .ok_or_else(|| anyhow!("{arg} requires a file path"))?;
            set_once(&mut conventions, value, "--conventions")?;
            i += 2;
            continue;
        }

        if let Some(value) = arg.strip_prefix("--save=") {
            set_once(&mut save_target, value, "--save")?;
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-s" | "--save") {
            let value = args
                .get(i + 1)
                .ok_or_else(|| anyhow!("{arg} requires an output path"))?;
            set_once(&mut save_target, value, "--save")?;
            i += 2;
            continue;
        }

        if arg.starts_with('-') && arg != "-" {
            return Err(anyhow!("unknown flag: {arg}"));
        }

        let input = InputSource::classify(arg);
        if input == InputSource::Stdin && inputs.contains(&InputSource::Stdin) {
            return Err(anyhow!("stdin (-) given more than once"));
        }
        inputs.push(input);
        i += 1;
    }

    if inputs.is_empty() {
        return Err(anyhow!("missing <INPUT> argument"));
    }

    Ok(CliCommand::Run(CliOptions {
        inputs,
        mode,
        conventions,
        save_target,
    }))
}

fn set_once(slot: &mut Option<PathBuf>, value: &str, flag: &str) -> Result<()> {
    if slot.is_some() {
        return Err(anyhow!("{flag} specified multiple times"));
    }
    if value.is_empty() {
        return Err(anyhow!("{flag} requires a path"));
    }
    *slot = Some(PathBuf::from(value));
    Ok(())
}

pub fn help_text() -> String {
    format!(
        "{APP_NAME} — read generation parameters from embedded node graphs
Usage: {APP_NAME} [OPTIONS] <INPUT>...

<INPUT> is a file holding the graph JSON, - for stdin, or the JSON itself.

Options:
  -j, --json                Print results as JSON
  -c, --conventions <FILE>  Override node/slot name conventions from a JSON file
  -s, --save <PATH>         Also write the output to PATH
  -v, --version             Show version information
  -h, --help                Show this help message

Set RUST_LOG=debug to see which nodes each field was taken from.
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn run_options(values: &[&str]) -> CliOptions {
        match parse_arguments(&args(values)).unwrap() {
            CliCommand::Run(options) => options,
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn test_no_arguments_shows_help() {
        assert_eq!(parse_arguments(&[]).unwrap(), CliCommand::Help);
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse_arguments(&args(&["-h"])).unwrap(), CliCommand::Help);
        assert_eq!(
            parse_arguments(&args(&["a.json", "--version"])).unwrap(),
            CliCommand::Version
        );
    }

    #[test]
    fn test_inputs_are_classified() {
        let options = run_options(&["graph.json", "-", r#"{"3": {}}"#]);
        assert_eq!(
            options.inputs,
            vec![
                InputSource::File(PathBuf::from("graph.json")),
                InputSource::Stdin,
                InputSource::Inline(r#"{"3": {}}"#.to_string()),
            ]
        );
        assert_eq!(options.mode, OutputMode::Text);
    }

    #[test]
    fn test_flags() {
        let options = run_options(&[
            "-j",
            "--conventions",
            "conv.json",
            "--save=out.txt",
            "graph.json",
        ]);
        assert_eq!(options.mode, OutputMode::Json);
        assert_eq!(options.conventions, Some(PathBuf::from("conv.json")));
        assert_eq!(options.save_target, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn test_errors() {
        let err = parse_arguments(&args(&["--bogus", "a.json"])).unwrap_err();
        assert_eq!(err.to_string(), "unknown flag: --bogus");

        let err = parse_arguments(&args(&["-j"])).unwrap_err();
        assert_eq!(err.to_string(), "missing <INPUT> argument");

        let err = parse_arguments(&args(&["a.json", "-c"])).unwrap_err();
        assert!(err.to_string().contains("requires a file path"));

        let err = parse_arguments(&args(&["-s", "x", "--save=y", "a.json"])).unwrap_err();
        assert_eq!(err.to_string(), "--save specified multiple times");

        let err = parse_arguments(&args(&["-", "-"])).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_input_labels() {
        assert_eq!(InputSource::Stdin.label(), "<stdin>");
        assert_eq!(InputSource::Inline("{}".into()).label(), "<inline>");
        assert_eq!(InputSource::File("a/b.json".into()).label(), "a/b.json");
    }
}

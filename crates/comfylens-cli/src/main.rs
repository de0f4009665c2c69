use std::env;
use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use comfylens_core::{Conventions, PlainText, extract_with};
use comfylens_cli::args::{APP_NAME, VERSION, help_text};
use comfylens_cli::{
    CliCommand, CliOptions, InputSource, OutputMode, Report, parse_arguments, render_json,
    render_text,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_logging();

    let raw_args = env::args().skip(1).collect::<Vec<_>>();
    match parse_arguments(&raw_args)? {
        CliCommand::Help => print!("{}", help_text()),
        CliCommand::Version => println!("{APP_NAME} {VERSION}"),
        CliCommand::Run(options) => run(options)?,
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(options: CliOptions) -> Result<()> {
    let conventions = match options.conventions.as_deref() {
        Some(path) => {
            debug!("Loading conventions from {}", path.display());
            Conventions::from_path(path)?
        }
        None => Conventions::default(),
    };

    let mut reports = Vec::with_capacity(options.inputs.len());
    for input in &options.inputs {
        let bytes = read_input(input)?;
        reports.push(Report {
            label: input.label(),
            outcome: extract_with(&PlainText, &bytes, &conventions),
        });
    }

    let output = match options.mode {
        OutputMode::Text => render_text(&reports),
        OutputMode::Json => render_json(&reports)?,
    };
    print!("{output}");

    if let Some(path) = options.save_target {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }
        fs::write(&path, output.as_bytes())
            .with_context(|| format!("failed to write output file {}", path.display()))?;
        eprintln!("Wrote output to {}", path.display());
    }

    Ok(())
}

fn read_input(input: &InputSource) -> Result<Vec<u8>> {
    match input {
        InputSource::Stdin => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read stdin")?;
            Ok(bytes)
        }
        InputSource::File(path) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        InputSource::Inline(json) => Ok(json.clone().into_bytes()),
    }
}

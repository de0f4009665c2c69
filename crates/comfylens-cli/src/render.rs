//! Text and JSON rendering of extraction results

use std::fmt::Write as FmtWrite;

use anyhow::Result;
use comfylens_core::{ExtractionResult, LoadError};
use serde::Serialize;

const DIVIDER: &str = "─────────────────────────────────────────────────────────────";
const LABEL_WIDTH: usize = 16;

pub const NO_METADATA: &str = "No metadata available for this image";
pub const NO_PROMPT: &str = "No prompt available";
pub const NO_MODEL: &str = "No model information available";
pub const NO_LORAS: &str = "No LoRA models used";
pub const NO_SEED: &str = "Seed not available";
pub const NO_LATENT_SIZE: &str = "Latent size not available";

/// Outcome of processing one input
pub struct Report {
    pub label: String,
    pub outcome: Result<ExtractionResult, LoadError>,
}

impl Report {
    pub fn metadata(&self) -> Option<&ExtractionResult> {
        self.outcome.as_ref().ok()
    }
}

fn push_section_header(buf: &mut String, icon: &str, title: &str) {
    let _ = writeln!(buf, "{DIVIDER}");
    let _ = writeln!(buf, "{icon} {title}");
    let _ = writeln!(buf, "{DIVIDER}");
}

fn push_key_value(buf: &mut String, label: &str, value: &str, placeholder: &str) {
    let value = if value.is_empty() { placeholder } else { value };
    let _ = writeln!(buf, "• {:<width$} : {}", label, value, width = LABEL_WIDTH);
}

fn push_list(buf: &mut String, label: &str, values: &[String], placeholder: &str) {
    let Some((first, rest)) = values.split_first() else {
        push_key_value(buf, label, "", placeholder);
        return;
    };
    push_key_value(buf, label, first, placeholder);
    for value in rest {
        let _ = writeln!(buf, "  {:<width$}   {}", "", value, width = LABEL_WIDTH);
    }
}

pub fn render_result(buf: &mut String, result: &ExtractionResult) {
    push_key_value(buf, "Prompt", &result.prompt, NO_PROMPT);
    push_key_value(buf, "Model", &result.model_name, NO_MODEL);
    push_list(buf, "LoRA Models", &result.lora_names, NO_LORAS);

    let seed = result.seed.as_ref().map(ToString::to_string).unwrap_or_default();
    push_key_value(buf, "Seed", &seed, NO_SEED);

    let latent = result
        .latent_size
        .map(|size| format!("{} × {}", size.width, size.height))
        .unwrap_or_default();
    push_key_value(buf, "Latent Size", &latent, NO_LATENT_SIZE);
}

pub fn render_text(reports: &[Report]) -> String {
    let mut output = String::new();
    for report in reports {
        push_section_header(&mut output, "🖼️", &report.label);
        match report.metadata() {
            Some(result) => render_result(&mut output, result),
            None => {
                let _ = writeln!(&mut output, "{NO_METADATA}");
            }
        }
        let _ = writeln!(&mut output);
    }
    output
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    input: &'a str,
    metadata: Option<&'a ExtractionResult>,
}

/// A single input prints its result (or `null`); several print an array
/// of `{input, metadata}` entries.
pub fn render_json(reports: &[Report]) -> Result<String> {
    let mut json = match reports {
        [single] => serde_json::to_string_pretty(&single.metadata())?,
        _ => {
            let entries: Vec<JsonEntry> = reports
                .iter()
                .map(|report| JsonEntry {
                    input: &report.label,
                    metadata: report.metadata(),
                })
                .collect();
            serde_json::to_string_pretty(&entries)?
        }
    };
    json.push('\n');
    Ok(json)
}

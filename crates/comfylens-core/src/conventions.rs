//! Node class names and slot names the resolver recognizes
//!
//! Graph authors spell the same intent with different operators. Each table
//! here lists the spellings we know about; supporting a new loader or
//! sampler is a matter of adding an entry, either in [`Conventions::default`]
//! or in a JSON override file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Conventions used when none are supplied explicitly
pub static DEFAULT_CONVENTIONS: Lazy<Conventions> = Lazy::new(Conventions::default);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    /// Node id the most common workflow template uses for its prompt
    pub prompt_node_id: String,
    pub text_encoder_classes: Vec<String>,
    /// Encoder texts containing this substring are taken to be negative prompts
    pub negative_marker: String,
    pub model_loader_classes: Vec<String>,
    /// Checked in order; the first populated field wins
    pub model_name_fields: Vec<String>,
    pub lora_loaders: Vec<LoraLoaderRule>,
    /// Plain string field read from any node without a dedicated rule
    pub lora_name_field: String,
    pub sampler_classes: Vec<String>,
    pub seed_field: String,
    pub latent_classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoraLoaderRule {
    pub class_type: String,
    pub strategy: LoraStrategy,
}

/// How a LoRA loader node stores the adapters it applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoraStrategy {
    /// One nested object per slot: `"lora_1": {"on": true, "lora": "name"}`
    Slots {
        prefix: String,
        enabled_field: String,
        name_field: String,
    },
    /// A single nested object holding the name: `"lora_name": {"content": "name"}`
    Content {
        field: String,
        content_field: String,
    },
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            prompt_node_id: "113".to_string(),
            text_encoder_classes: strings(&["CLIPTextEncode"]),
            negative_marker: "negative".to_string(),
            model_loader_classes: strings(&[
                "UnetLoaderGGUF",
                "CheckpointLoaderSimple",
                "UNETLoader",
            ]),
            model_name_fields: strings(&["unet_name", "ckpt_name"]),
            lora_loaders: vec![
                LoraLoaderRule {
                    class_type: "Power Lora Loader (rgthree)".to_string(),
                    strategy: LoraStrategy::Slots {
                        prefix: "lora_".to_string(),
                        enabled_field: "on".to_string(),
                        name_field: "lora".to_string(),
                    },
                },
                LoraLoaderRule {
                    class_type: "LoraLoader|pysssss".to_string(),
                    strategy: LoraStrategy::Content {
                        field: "lora_name".to_string(),
                        content_field: "content".to_string(),
                    },
                },
            ],
            lora_name_field: "lora_name".to_string(),
            sampler_classes: strings(&["KSampler"]),
            seed_field: "seed".to_string(),
            latent_classes: strings(&["EmptyLatentImage"]),
        }
    }
}

impl Conventions {
    /// Parse conventions from JSON. Fields left out keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse conventions")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read conventions file {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("invalid conventions file {}", path.display()))
    }

    pub fn lora_rule(&self, class_type: &str) -> Option<&LoraStrategy> {
        self.lora_loaders
            .iter()
            .find(|rule| rule.class_type == class_type)
            .map(|rule| &rule.strategy)
    }

    pub fn is_text_encoder(&self, class_type: &str) -> bool {
        contains(&self.text_encoder_classes, class_type)
    }

    pub fn is_model_loader(&self, class_type: &str) -> bool {
        contains(&self.model_loader_classes, class_type)
    }

    pub fn is_sampler(&self, class_type: &str) -> bool {
        contains(&self.sampler_classes, class_type)
    }

    pub fn is_latent_source(&self, class_type: &str) -> bool {
        contains(&self.latent_classes, class_type)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn contains(values: &[String], needle: &str) -> bool {
    values.iter().any(|v| v == needle)
}

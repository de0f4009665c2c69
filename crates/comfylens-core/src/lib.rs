//! # comfylens-core
//!
//! Core library for reading generation parameters out of the node graph a
//! generative-image pipeline embeds in its output images.
//!
//! This library provides:
//! - Loading the embedded JSON payload into an ordered [`NodeGraph`]
//! - Heuristic recovery of prompt, model name, LoRA names, seed and latent size
//! - Convention tables that can be extended without touching the matchers
//!
//! ## Example
//!
//! ```
//! use comfylens_core::{load, resolve};
//!
//! let raw = r#"{
//!     "3": {"class_type": "KSampler", "inputs": {"seed": 42, "model": ["4", 0]}},
//!     "4": {"class_type": "CheckpointLoaderSimple", "inputs": {"ckpt_name": "sd_xl_base_1.0.safetensors"}},
//!     "6": {"class_type": "CLIPTextEncode", "inputs": {"text": "a lighthouse at dusk"}}
//! }"#;
//!
//! let graph = load(Some(raw))?;
//! let result = resolve(&graph);
//! assert_eq!(result.prompt, "a lighthouse at dusk");
//! assert_eq!(result.model_name, "sd_xl_base_1.0.safetensors");
//! # Ok::<(), comfylens_core::LoadError>(())
//! ```

pub mod conventions;
pub mod loader;
pub mod payload;
pub mod resolver;
pub mod types;

// Re-export commonly used types
pub use types::{ExtractionResult, InputValue, Inputs, LatentSize, Literal, Node, NodeGraph, Seed};

pub use conventions::{Conventions, LoraLoaderRule, LoraStrategy};
pub use loader::{LoadError, MalformedError, load, load_str};
pub use payload::{PayloadLocator, PlainText, extract, extract_with};
pub use resolver::{resolve, resolve_with};

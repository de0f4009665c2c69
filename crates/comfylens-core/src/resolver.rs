//! Recovering prompt, model, LoRAs and seed from a loaded graph
//!
//! Each field has its own matcher and they do not depend on each other. A
//! candidate node whose shape does not fit (wrong class, missing slot, value
//! of the wrong kind) is skipped; nothing here returns an error.

use std::collections::HashSet;

use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use crate::conventions::{Conventions, DEFAULT_CONVENTIONS, LoraStrategy};
use crate::types::{ExtractionResult, InputValue, LatentSize, Literal, Node, NodeGraph, Seed};

/// Resolve every field using the built-in conventions
pub fn resolve(graph: &NodeGraph) -> ExtractionResult {
    resolve_with(graph, &DEFAULT_CONVENTIONS)
}

pub fn resolve_with(graph: &NodeGraph, conventions: &Conventions) -> ExtractionResult {
    ExtractionResult {
        prompt: resolve_prompt(graph, conventions),
        model_name: resolve_model_name(graph, conventions),
        lora_names: resolve_lora_names(graph, conventions),
        seed: resolve_seed(graph, conventions),
        latent_size: resolve_latent_size(graph, conventions),
    }
}

/// The positive prompt.
///
/// The well-known prompt node is consulted first. Otherwise the first text
/// encoder whose text does not mention the negative marker wins.
pub fn resolve_prompt(graph: &NodeGraph, conventions: &Conventions) -> String {
    if let Some(text) = graph
        .get(&conventions.prompt_node_id)
        .and_then(|node| node.input("text"))
        .and_then(InputValue::as_text)
    {
        debug!("Prompt taken from node {}", conventions.prompt_node_id);
        return text.to_string();
    }

    let marker = conventions.negative_marker.as_str();
    graph
        .iter()
        .filter(|(_, node)| conventions.is_text_encoder(&node.class_type))
        .find_map(|(id, node)| {
            let text = node.input("text").and_then(InputValue::as_text)?;
            if !marker.is_empty() && text.contains(marker) {
                trace!("Skipping text encoder {} (looks negative)", id);
                return None;
            }
            debug!("Prompt taken from text encoder {}", id);
            Some(text.to_string())
        })
        .unwrap_or_default()
}

/// Name of the base model. Only the first loader node is considered.
pub fn resolve_model_name(graph: &NodeGraph, conventions: &Conventions) -> String {
    let Some((id, loader)) = graph
        .iter()
        .find(|(_, node)| conventions.is_model_loader(&node.class_type))
    else {
        return String::new();
    };

    let name = conventions
        .model_name_fields
        .iter()
        .find_map(|field| loader.input(field).and_then(InputValue::as_text));

    match name {
        Some(name) => {
            debug!("Model name taken from {} node {}", loader.class_type, id);
            name.to_string()
        }
        None => {
            trace!("Model loader {} has no populated name field", id);
            String::new()
        }
    }
}

/// Every LoRA referenced anywhere in the graph, first-seen order, no repeats
pub fn resolve_lora_names(graph: &NodeGraph, conventions: &Conventions) -> Vec<String> {
    let mut found = Vec::new();

    for (id, node) in graph.iter() {
        let before = found.len();
        match conventions.lora_rule(&node.class_type) {
            Some(LoraStrategy::Slots {
                prefix,
                enabled_field,
                name_field,
            }) => collect_slot_loras(node, prefix, enabled_field, name_field, &mut found),
            Some(LoraStrategy::Content {
                field,
                content_field,
            }) => {
                if let Some(name) = node
                    .input(field)
                    .and_then(InputValue::as_nested)
                    .and_then(|map| non_empty_str(map.get(content_field.as_str())))
                {
                    found.push(name);
                }
            }
            None => {
                if let Some(name) = node
                    .input(&conventions.lora_name_field)
                    .and_then(InputValue::as_text)
                {
                    found.push(name);
                }
            }
        }
        if found.len() > before {
            debug!("Found {} LoRA name(s) on node {}", found.len() - before, id);
        }
    }

    dedup_in_order(found)
}

fn collect_slot_loras<'a>(
    node: &'a Node,
    prefix: &str,
    enabled_field: &str,
    name_field: &str,
    found: &mut Vec<&'a str>,
) {
    for (slot, value) in node.inputs.iter() {
        if !slot.starts_with(prefix) {
            continue;
        }
        let Some(descriptor) = value.as_nested() else {
            continue;
        };
        if descriptor.get(enabled_field) != Some(&JsonValue::Bool(true)) {
            trace!("LoRA slot {} is switched off", slot);
            continue;
        }
        if let Some(name) = non_empty_str(descriptor.get(name_field)) {
            found.push(name);
        }
    }
}

/// Sampler seed, verbatim. Zero and empty values count as absent.
pub fn resolve_seed(graph: &NodeGraph, conventions: &Conventions) -> Option<Seed> {
    graph
        .iter()
        .filter(|(_, node)| conventions.is_sampler(&node.class_type))
        .find_map(|(id, node)| {
            let literal = node
                .input(&conventions.seed_field)?
                .as_literal()
                .filter(|lit| lit.is_truthy())?;
            let seed = match literal {
                Literal::Number(n) => Seed::Number(n.clone()),
                Literal::Text(s) => Seed::Text(s.clone()),
                Literal::Bool(_) => return None,
            };
            debug!("Seed taken from sampler {}", id);
            Some(seed)
        })
}

/// Width and height of the first empty-latent node that has both
pub fn resolve_latent_size(graph: &NodeGraph, conventions: &Conventions) -> Option<LatentSize> {
    graph
        .iter()
        .filter(|(_, node)| conventions.is_latent_source(&node.class_type))
        .find_map(|(_, node)| {
            Some(LatentSize {
                width: positive_int(node.input("width")?)?,
                height: positive_int(node.input("height")?)?,
            })
        })
}

fn positive_int(value: &InputValue) -> Option<u64> {
    match value.as_literal()? {
        Literal::Number(n) => n.as_u64().filter(|v| *v > 0),
        _ => None,
    }
}

fn non_empty_str(value: Option<&JsonValue>) -> Option<&str> {
    value.and_then(JsonValue::as_str).filter(|s| !s.is_empty())
}

fn dedup_in_order(names: Vec<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

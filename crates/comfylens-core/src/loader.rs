//! Parsing raw metadata text into a [`NodeGraph`]

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use tracing::trace;

use crate::types::{InputValue, Inputs, Node, NodeGraph};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no metadata payload")]
    Missing,

    #[error("malformed metadata: {0}")]
    Malformed(#[from] MalformedError),
}

#[derive(Error, Debug)]
pub enum MalformedError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("top level must be an object of nodes, got {0}")]
    NotAnObject(&'static str),
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// Load a node graph from the raw text payload of one image.
///
/// `None` and blank text are [`LoadError::Missing`]. Invalid JSON, or JSON
/// whose top level is not an object, is [`LoadError::Malformed`].
///
/// Individual entries are not validated. An entry that is not an object is
/// dropped; an object without a string `class_type` or an object `inputs`
/// is kept with an empty class or empty inputs, so it simply never matches.
pub fn load(raw: Option<&str>) -> Result<NodeGraph> {
    let text = raw.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(LoadError::Missing);
    }

    let parsed: JsonValue = serde_json::from_str(text).map_err(MalformedError::from)?;
    let entries = match parsed {
        JsonValue::Object(entries) => entries,
        other => return Err(MalformedError::NotAnObject(json_kind(&other)).into()),
    };

    let mut nodes = Vec::with_capacity(entries.len());
    for (id, value) in entries {
        match value {
            JsonValue::Object(record) => {
                let node = parse_node(&id, record);
                nodes.push((id, node));
            }
            other => trace!("Dropping node {} ({} is not a node record)", id, json_kind(&other)),
        }
    }

    Ok(NodeGraph::new(nodes))
}

/// Shorthand for [`load`] with a payload that is known to be present
pub fn load_str(raw: &str) -> Result<NodeGraph> {
    load(Some(raw))
}

fn parse_node(id: &str, mut record: Map<String, JsonValue>) -> Node {
    let class_type = match record.remove("class_type") {
        Some(JsonValue::String(class_type)) => class_type,
        _ => {
            trace!("Node {} has no usable class_type", id);
            String::new()
        }
    };

    let inputs = match record.remove("inputs") {
        Some(JsonValue::Object(inputs)) => parse_inputs(inputs),
        _ => {
            trace!("Node {} has no usable inputs", id);
            Inputs::default()
        }
    };

    Node { class_type, inputs }
}

fn parse_inputs(inputs: Map<String, JsonValue>) -> Inputs {
    Inputs::new(
        inputs
            .into_iter()
            .map(|(slot, value)| (slot, InputValue::from_json(value)))
            .collect(),
    )
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Literal;

    #[test]
    fn test_load_none_is_missing() {
        assert!(matches!(load(None), Err(LoadError::Missing)));
    }

    #[test]
    fn test_load_blank_is_missing() {
        assert!(matches!(load(Some("")), Err(LoadError::Missing)));
        assert!(matches!(load(Some("  \n\t ")), Err(LoadError::Missing)));
    }

    #[test]
    fn test_load_invalid_json_is_malformed() {
        let err = load_str(r#"{"3": {"class_type": "KSampler""#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Malformed(MalformedError::Json(_))
        ));
    }

    #[test]
    fn test_load_top_level_array_is_malformed() {
        let err = load_str("[1, 2, 3]").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Malformed(MalformedError::NotAnObject("an array"))
        ));
    }

    #[test]
    fn test_load_tolerates_irregular_entries() {
        let graph = load_str(
            r#"{
                "6": {"class_type": "CLIPTextEncode", "inputs": {"text": "a cat"}},
                "3": {"class_type": "KSampler", "inputs": {"seed": 42}},
                "99": {"class_type": "Note"},
                "100": "stray",
                "101": {"inputs": {"text": "no class"}},
                "102": {"class_type": 7, "inputs": []}
            }"#,
        )
        .unwrap();

        let ids: Vec<&str> = graph.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["6", "3", "99", "101", "102"]);

        let note = graph.get("99").unwrap();
        assert_eq!(note.class_type, "Note");
        assert!(note.inputs.is_empty());

        let classless = graph.get("101").unwrap();
        assert_eq!(classless.class_type, "");
        assert_eq!(classless.input("text").and_then(InputValue::as_text), Some("no class"));

        let odd = graph.get("102").unwrap();
        assert_eq!(odd.class_type, "");
        assert!(odd.inputs.is_empty());
    }

    #[test]
    fn test_load_trims_whitespace() {
        let graph = load(Some("\n  {\"7\": {\"class_type\": \"KSampler\", \"inputs\": {}}}  \n"))
            .unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get("7").unwrap().class_type, "KSampler");
    }

    #[test]
    fn test_load_empty_object_is_empty_graph() {
        let graph = load_str("{}").unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_load_preserves_document_order() {
        let graph = load_str(
            r#"{
                "9": {"class_type": "SaveImage", "inputs": {}},
                "10": {"class_type": "KSampler", "inputs": {}},
                "2": {"class_type": "CLIPTextEncode", "inputs": {}}
            }"#,
        )
        .unwrap();

        let ids: Vec<&str> = graph.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["9", "10", "2"]);
    }

    #[test]
    fn test_load_classifies_input_values() {
        let graph = load_str(
            r#"{
                "3": {
                    "class_type": "KSampler",
                    "inputs": {
                        "seed": 42,
                        "sampler_name": "euler",
                        "denoise": 1.0,
                        "add_noise": true,
                        "model": ["4", 0],
                        "lora_1": {"on": true, "lora": "x.safetensors"},
                        "tags": ["a", "b", "c"],
                        "nothing": null
                    }
                }
            }"#,
        )
        .unwrap();

        let node = graph.get("3").unwrap();
        assert_eq!(node.inputs.len(), 8);
        assert!(matches!(
            node.input("seed"),
            Some(InputValue::Literal(Literal::Number(_)))
        ));
        assert_eq!(node.input("sampler_name").and_then(InputValue::as_text), Some("euler"));
        assert_eq!(
            node.input("add_noise"),
            Some(&InputValue::Literal(Literal::Bool(true)))
        );
        assert_eq!(
            node.input("model"),
            Some(&InputValue::Reference {
                node: "4".to_string(),
                slot: 0
            })
        );
        assert!(node.input("lora_1").and_then(InputValue::as_nested).is_some());
        assert!(matches!(node.input("tags"), Some(InputValue::Opaque(_))));
        assert!(matches!(node.input("nothing"), Some(InputValue::Opaque(JsonValue::Null))));
    }

    #[test]
    fn test_negative_slot_index_is_not_a_reference() {
        let graph =
            load_str(r#"{"1": {"class_type": "X", "inputs": {"clip": ["4", -1]}}}"#).unwrap();
        assert!(matches!(
            graph.get("1").unwrap().input("clip"),
            Some(InputValue::Opaque(_))
        ));
    }
}

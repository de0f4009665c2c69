//! Common types used across comfylens

use serde::Serialize;
use serde_json::{Map, Number, Value as JsonValue};

/// A literal input value: the payload most matchers look for
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Number(Number),
    Bool(bool),
}

impl Literal {
    /// Truthiness as the generating tools use it: non-empty text,
    /// non-zero number, `true`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Literal::Text(s) => !s.is_empty(),
            Literal::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Literal::Bool(b) => *b,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// The value bound to a node's input slot
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Literal(Literal),
    /// Structured slot descriptor, e.g. `{"on": true, "lora": "x.safetensors"}`
    Nested(Map<String, JsonValue>),
    /// Link to another node's output slot. Never followed by the resolver.
    Reference { node: String, slot: u64 },
    /// Anything else (null, arbitrary arrays)
    Opaque(JsonValue),
}

impl InputValue {
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::String(s) => InputValue::Literal(Literal::Text(s)),
            JsonValue::Number(n) => InputValue::Literal(Literal::Number(n)),
            JsonValue::Bool(b) => InputValue::Literal(Literal::Bool(b)),
            JsonValue::Object(map) => InputValue::Nested(map),
            JsonValue::Array(items) => {
                if let [JsonValue::String(node), JsonValue::Number(slot)] = items.as_slice() {
                    if let Some(slot) = slot.as_u64() {
                        return InputValue::Reference {
                            node: node.clone(),
                            slot,
                        };
                    }
                }
                InputValue::Opaque(JsonValue::Array(items))
            }
            JsonValue::Null => InputValue::Opaque(JsonValue::Null),
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            InputValue::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// The value as a non-empty string literal
    pub fn as_text(&self) -> Option<&str> {
        self.as_literal()
            .and_then(Literal::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn as_nested(&self) -> Option<&Map<String, JsonValue>> {
        match self {
            InputValue::Nested(map) => Some(map),
            _ => None,
        }
    }
}

/// Named input slots of a node, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    slots: Vec<(String, InputValue)>,
}

impl Inputs {
    pub fn new(slots: Vec<(String, InputValue)>) -> Self {
        Self { slots }
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.slots
            .iter()
            .find(|(slot, _)| slot == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.slots.iter().map(|(slot, value)| (slot.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// One operator instance in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub class_type: String,
    pub inputs: Inputs,
}

impl Node {
    pub fn new(class_type: impl Into<String>) -> Self {
        Self {
            class_type: class_type.into(),
            inputs: Inputs::default(),
        }
    }

    pub fn input(&self, name: &str) -> Option<&InputValue> {
        self.inputs.get(name)
    }
}

/// A loaded node graph. Entries keep the order they had in the payload,
/// which the "first match wins" scans depend on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeGraph {
    nodes: Vec<(String, Node)>,
}

impl NodeGraph {
    pub fn new(nodes: Vec<(String, Node)>) -> Self {
        Self { nodes }
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|(node_id, _)| node_id == id)
            .map(|(_, node)| node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(id, node)| (id.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Sampler seed, kept exactly as it appeared in the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Seed {
    Number(Number),
    Text(String),
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seed::Number(n) => write!(f, "{n}"),
            Seed::Text(s) => f.write_str(s),
        }
    }
}

/// Dimensions of the empty latent the sampler started from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatentSize {
    pub width: u64,
    pub height: u64,
}

/// The fields recovered from one graph. Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub prompt: String,
    pub model_name: String,
    pub lora_names: Vec<String>,
    pub seed: Option<Seed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latent_size: Option<LatentSize>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.prompt.is_empty()
            && self.model_name.is_empty()
            && self.lora_names.is_empty()
            && self.seed.is_none()
            && self.latent_size.is_none()
    }
}

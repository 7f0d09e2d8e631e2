use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{AgentError, AgentResult};

/// A car offer the client renders as a card.
///
/// Every field is required by the output schema; the model fills unknown
/// fields with an empty string rather than omitting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarCard {
    pub model: String,
    pub price: String,
    pub seats: String,
    pub doors: String,
    pub fuel: String,
    pub transmission: String,
    pub body_type: String,
    pub image_url: String,
    pub description: String,
    pub message: String,
}

/// The result of a conversation turn, tagged with the UI component that
/// should render it. The tag set is closed: parsing rejects anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Component {
    CarComponent(CarCard),
    TextComponent { message: String },
}

/// The wrapper property name used in the output schema. The structured-output
/// API rejects a top-level anyOf, so the union is nested under a single
/// required object property and unwrapped after parsing.
const WRAPPER_KEY: &str = "component";

impl Component {
    /// The `response_format` payload advertised to the LLM, constraining its
    /// replies to the component union.
    pub fn response_format() -> Value {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": "component",
                "strict": true,
                "schema": {
                    "type": "object",
                    "properties": {
                        "component": {
                            "anyOf": [Self::car_schema(), Self::text_schema()]
                        }
                    },
                    "required": [WRAPPER_KEY],
                    "additionalProperties": false
                }
            }
        })
    }

    /// Parse an assistant reply into a component.
    ///
    /// Accepts both the wrapped form the schema produces and a bare tagged
    /// object; anything else is a [`AgentError::SchemaViolation`].
    pub fn from_model_text(text: &str) -> AgentResult<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            AgentError::SchemaViolation(format!("assistant reply is not valid JSON: {e}"))
        })?;

        let inner = match value {
            Value::Object(mut map) if map.contains_key(WRAPPER_KEY) => {
                map.remove(WRAPPER_KEY).unwrap_or(Value::Null)
            }
            other => other,
        };

        serde_json::from_value(inner).map_err(|e| {
            AgentError::SchemaViolation(format!(
                "assistant reply does not match a known component: {e}"
            ))
        })
    }

    fn car_schema() -> Value {
        let fields = [
            "model",
            "price",
            "seats",
            "doors",
            "fuel",
            "transmission",
            "body_type",
            "image_url",
            "description",
            "message",
        ];
        let mut properties = serde_json::Map::new();
        properties.insert("type".to_string(), json!({"type": "string", "enum": ["CarComponent"]}));
        for field in fields {
            properties.insert(field.to_string(), json!({"type": "string"}));
        }
        let mut required = vec!["type"];
        required.extend(fields);
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }

    fn text_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": {"type": "string", "enum": ["TextComponent"]},
                "message": {"type": "string"}
            },
            "required": ["type", "message"],
            "additionalProperties": false
        })
    }
}

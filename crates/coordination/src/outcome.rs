use serde::{Deserialize, Serialize};
use serde_json::Value;

const UNSUCCESSFUL: &str = "Unsuccessful response";

/// Explicit result contract for a wrapped coordination call.
///
/// Callers with a loosely-shaped response (agent tool output, raw JSON text) adapt it with
/// [`Outcome::from_value`] or [`Outcome::from_text`] instead of handing the harness an
/// untyped value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl Outcome {
    pub fn success(detail: Value) -> Self {
        Self {
            ok: true,
            detail: Some(detail),
            agent: None,
        }
    }

    pub fn failure(detail: Value) -> Self {
        Self {
            ok: false,
            detail: Some(detail),
            agent: None,
        }
    }

    #[must_use]
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Interpret a JSON response.
    ///
    /// An object with `status == "success"` or `success == true` succeeds; otherwise an
    /// object carrying an `error` key fails. Anything else that is not `null` counts as a
    /// success because a response was produced at all.
    pub fn from_value(value: &Value) -> Self {
        let ok = match value {
            Value::Null => false,
            Value::Object(map) => {
                let status_ok = map.get("status").and_then(Value::as_str) == Some("success");
                let flag_ok = map.get("success").and_then(Value::as_bool) == Some(true);
                status_ok || flag_ok || !map.contains_key("error")
            }
            _ => true,
        };

        let agent = value
            .get("agent_used")
            .or_else(|| value.get("agent"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            ok,
            detail: (!value.is_null()).then(|| value.clone()),
            agent,
        }
    }

    /// Interpret a textual response: JSON text goes through [`Outcome::from_value`], other
    /// non-blank text is a success.
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self {
                ok: false,
                detail: None,
                agent: None,
            };
        }
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::success(Value::String(text.to_string())),
        }
    }

    /// Message recorded for a failed outcome; `None` when the outcome succeeded.
    pub fn error_message(&self) -> Option<String> {
        if self.ok {
            return None;
        }
        let message = self
            .detail
            .as_ref()
            .and_then(|detail| detail.get("error"))
            .and_then(Value::as_str)
            .unwrap_or(UNSUCCESSFUL);
        Some(message.to_string())
    }
}

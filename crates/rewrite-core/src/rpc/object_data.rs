//! The unit of the delta wire protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-field delta state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    /// Field unchanged; the receiver keeps its `before` value.
    NoChange,
    /// New value, optionally with a `valueType` to construct and a `ref` to intern.
    Add,
    /// Field becomes null.
    Delete,
    /// Value changed: primitives inline, objects recurse into their fields.
    Change,
    /// Terminates the current top-level object.
    EndOfObject,
}

/// One delta record, `{state, valueType?, value?, ref?, trace?}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcObjectData {
    pub state: State,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl RpcObjectData {
    /// A record carrying only a state.
    pub fn new(state: State) -> Self {
        RpcObjectData {
            state,
            value_type: None,
            value: None,
            reference: None,
            trace: None,
        }
    }

    pub fn with_value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_ref(mut self, reference: u32) -> Self {
        self.reference = Some(reference);
        self
    }

    /// An `ADD` that only points at an already interned value.
    pub fn is_ref_only(&self) -> bool {
        self.state == State::Add
            && self.reference.is_some()
            && self.value_type.is_none()
            && self.value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape_omits_absent_fields() {
        let data = RpcObjectData::new(State::Add)
            .with_value_type("org.openrewrite.java.tree.J$Identifier")
            .with_ref(3);
        let encoded = serde_json::to_value(&data).unwrap();
        assert_eq!(
            encoded,
            json!({"state": "ADD", "valueType": "org.openrewrite.java.tree.J$Identifier", "ref": 3})
        );
    }

    #[test]
    fn decodes_end_of_object() {
        let data: RpcObjectData = serde_json::from_value(json!({"state": "END_OF_OBJECT"})).unwrap();
        assert_eq!(data, RpcObjectData::new(State::EndOfObject));
    }

    #[test]
    fn ref_only_detection() {
        assert!(RpcObjectData::new(State::Add).with_ref(1).is_ref_only());
        assert!(!RpcObjectData::new(State::Add)
            .with_ref(1)
            .with_value(json!("x"))
            .is_ref_only());
        assert!(!RpcObjectData::new(State::Change).with_ref(1).is_ref_only());
    }
}

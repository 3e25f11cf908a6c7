//! Loosely-typed attribute bag exchanged with the host tool.

use crate::diagnostics::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute values by name.
pub type AttributeMap = serde_json::Map<String, Value>;

/// State of one resource or data source instance.
///
/// An instance without an id does not exist (never created, or gone).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    attributes: AttributeMap,
}

impl ResourceData {
    /// Empty instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instance holding `attributes` and no id.
    #[must_use]
    pub fn from_attributes(attributes: AttributeMap) -> Self {
        Self {
            id: None,
            attributes,
        }
    }

    /// Instance from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic if `value` is neither an object nor null.
    pub fn from_value(value: Value) -> Result<Self, Diagnostic> {
        match value {
            Value::Object(attributes) => Ok(Self::from_attributes(attributes)),
            Value::Null => Ok(Self::new()),
            other => Err(Diagnostic::error("Attributes must be an object")
                .with_detail(format!("got `{other}`"))),
        }
    }

    /// Builder-style id setter.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Current id.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Set the id.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Remove the id, marking the instance as gone.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Current id, or a diagnostic naming `what` if unset.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic when the instance has no id.
    pub fn require_id(&self, what: &str) -> Result<&str, Diagnostic> {
        self.id()
            .ok_or_else(|| Diagnostic::error(format!("{what} has no id")))
    }

    /// All attributes.
    #[must_use]
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Mutable access to all attributes.
    pub fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    /// Raw value; null counts as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|value| !value.is_null())
    }

    /// String value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Integer value.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Boolean value.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// List value.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    /// String elements of a list, skipping non-strings.
    #[must_use]
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.get_list(key)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Integer elements of a list, skipping non-integers.
    #[must_use]
    pub fn get_int_list(&self, key: &str) -> Vec<i64> {
        self.get_list(key)
            .map(|items| items.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default()
    }

    /// Required string value.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic naming `key` when the value is absent or not a string.
    pub fn require_str(&self, key: &str) -> Result<&str, Diagnostic> {
        self.get_str(key).ok_or_else(|| missing(key))
    }

    /// Required integer value.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic naming `key` when the value is absent or not an integer.
    pub fn require_i64(&self, key: &str) -> Result<i64, Diagnostic> {
        self.get_i64(key).ok_or_else(|| missing(key))
    }

    /// Set a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Merge every entry of `values`, overwriting existing keys.
    pub fn merge(&mut self, values: AttributeMap) {
        self.attributes.extend(values);
    }
}

fn missing(key: &str) -> Diagnostic {
    Diagnostic::error("Missing required attribute").with_attribute(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> ResourceData {
        ResourceData::from_value(json!({
            "server_number": 321,
            "server_name": "web1",
            "is_cancelled": false,
            "ip_addresses": ["1.2.3.4", 5, "5.6.7.8"],
            "servers": [321, 322],
            "paid_until": null
        }))
        .unwrap()
    }

    #[test]
    fn typed_getters() {
        let data = data();
        assert_eq!(data.get_i64("server_number"), Some(321));
        assert_eq!(data.get_str("server_name"), Some("web1"));
        assert_eq!(data.get_bool("is_cancelled"), Some(false));
        assert_eq!(data.get_string_list("ip_addresses"), vec!["1.2.3.4", "5.6.7.8"]);
        assert_eq!(data.get_int_list("servers"), vec![321, 322]);
        assert!(data.get("paid_until").is_none());
        assert_eq!(data.get_str("server_number"), None);
    }

    #[test]
    fn require_reports_attribute() {
        let err = data().require_str("product").unwrap_err();
        assert_eq!(err.attribute.as_deref(), Some("product"));
        assert!(data().require_i64("server_number").is_ok());
    }

    #[test]
    fn id_lifecycle() {
        let mut data = data();
        assert!(data.require_id("server").is_err());
        data.set_id("321");
        assert_eq!(data.id(), Some("321"));
        data.clear_id();
        assert_eq!(data.id(), None);
    }

    #[test]
    fn from_value_rejects_scalars() {
        assert!(ResourceData::from_value(json!(42)).is_err());
        assert_eq!(ResourceData::from_value(Value::Null).unwrap(), ResourceData::new());
    }

    #[test]
    fn merge_overwrites() {
        let mut data = data();
        let mut update = AttributeMap::new();
        update.insert("server_name".into(), json!("web2"));
        data.merge(update);
        assert_eq!(data.get_str("server_name"), Some("web2"));
        assert_eq!(data.get_i64("server_number"), Some(321));
    }
}

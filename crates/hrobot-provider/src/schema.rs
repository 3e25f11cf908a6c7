//! Attribute schemas for the provider, its resources and data sources.
//!
//! A schema describes the shape of an attribute bag: which keys exist, their
//! types, whether the user must, may or cannot set them, and how missing values
//! are defaulted.
//!
//! ```
//! use hrobot_provider::schema::{Attribute, Schema};
//!
//! let schema = Schema::v0()
//!     .with_attribute("server_number", Attribute::required_int())
//!     .with_attribute("server_name", Attribute::computed_string());
//! assert!(schema.attribute("server_name").is_some());
//! ```

use crate::diagnostics::Diagnostic;
use crate::state::AttributeMap;
use serde_json::Value;
use std::collections::BTreeMap;

/// Value type of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    /// UTF-8 string.
    String,
    /// Signed integer.
    Int,
    /// Boolean.
    Bool,
    /// Ordered list of values of the element type.
    List(Box<AttributeType>),
    /// Nested block with its own attributes.
    Object(BTreeMap<String, Attribute>),
}

impl AttributeType {
    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "number",
            Self::Bool => "bool",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }

    fn from_env(&self, raw: &str) -> Option<Value> {
        match self {
            Self::String => Some(Value::String(raw.to_string())),
            Self::Int => raw.trim().parse::<i64>().ok().map(Value::from),
            Self::Bool => raw.trim().parse::<bool>().ok().map(Value::Bool),
            Self::List(_) | Self::Object(_) => None,
        }
    }
}

/// Declaration of a single attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Value type.
    pub attr_type: AttributeType,
    /// Must be set by the user.
    pub required: bool,
    /// May be set by the user.
    pub optional: bool,
    /// Filled in by the provider.
    pub computed: bool,
    /// Hidden from plan output.
    pub sensitive: bool,
    /// Changing the value replaces the resource.
    pub force_new: bool,
    /// Value used when the attribute is absent.
    pub default: Option<Value>,
    /// Environment variable consulted when the attribute is absent.
    pub env_default: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
}

impl Attribute {
    fn new(attr_type: AttributeType, required: bool, optional: bool, computed: bool) -> Self {
        Self {
            attr_type,
            required,
            optional,
            computed,
            sensitive: false,
            force_new: false,
            default: None,
            env_default: None,
            description: None,
        }
    }

    /// Required string.
    #[must_use]
    pub fn required_string() -> Self {
        Self::new(AttributeType::String, true, false, false)
    }

    /// Optional string.
    #[must_use]
    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, false, true, false)
    }

    /// Provider-set string.
    #[must_use]
    pub fn computed_string() -> Self {
        Self::new(AttributeType::String, false, false, true)
    }

    /// Required integer.
    #[must_use]
    pub fn required_int() -> Self {
        Self::new(AttributeType::Int, true, false, false)
    }

    /// Optional integer.
    #[must_use]
    pub fn optional_int() -> Self {
        Self::new(AttributeType::Int, false, true, false)
    }

    /// Provider-set integer.
    #[must_use]
    pub fn computed_int() -> Self {
        Self::new(AttributeType::Int, false, false, true)
    }

    /// Optional boolean.
    #[must_use]
    pub fn optional_bool() -> Self {
        Self::new(AttributeType::Bool, false, true, false)
    }

    /// Provider-set boolean.
    #[must_use]
    pub fn computed_bool() -> Self {
        Self::new(AttributeType::Bool, false, false, true)
    }

    /// Optional list.
    #[must_use]
    pub fn optional_list(element: AttributeType) -> Self {
        Self::new(AttributeType::List(Box::new(element)), false, true, false)
    }

    /// Provider-set list.
    #[must_use]
    pub fn computed_list(element: AttributeType) -> Self {
        Self::new(AttributeType::List(Box::new(element)), false, false, true)
    }

    /// Mark as both user-settable and provider-filled.
    #[must_use]
    pub fn also_computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Mark as sensitive.
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Mark as replacing the resource when changed.
    #[must_use]
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Set a static default.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Default from an environment variable.
    #[must_use]
    pub fn with_env_default(mut self, variable: impl Into<String>) -> Self {
        self.env_default = Some(variable.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true if the user may set the attribute.
    #[must_use]
    pub fn user_settable(&self) -> bool {
        self.required || self.optional
    }
}

/// Build an object element type from `(name, attribute)` pairs.
#[must_use]
pub fn object<I, K>(fields: I) -> AttributeType
where
    I: IntoIterator<Item = (K, Attribute)>,
    K: Into<String>,
{
    AttributeType::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
}

/// Schema of a provider configuration, resource or data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// State version.
    pub version: i64,
    /// Attributes by name.
    pub attributes: BTreeMap<String, Attribute>,
    /// Human-readable description.
    pub description: Option<String>,
}

impl Schema {
    /// Empty schema at version 0.
    #[must_use]
    pub fn v0() -> Self {
        Self::default()
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Look up an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Fill absent attributes from static defaults, then from `lookup`.
    pub fn apply_defaults<F>(&self, values: &mut AttributeMap, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (name, attribute) in &self.attributes {
            if values.get(name).is_some_and(|v| !v.is_null()) {
                continue;
            }
            let from_env = attribute
                .env_default
                .as_deref()
                .and_then(|variable| lookup(variable))
                .and_then(|raw| attribute.attr_type.from_env(&raw));
            if let Some(value) = from_env.or_else(|| attribute.default.clone()) {
                values.insert(name.clone(), value);
            }
        }
    }

    /// Check `values` against the schema.
    ///
    /// Reports unknown keys, missing required attributes and type mismatches,
    /// recursing into lists and nested blocks. Null counts as absent.
    #[must_use]
    pub fn validate(&self, values: &AttributeMap) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        validate_block(&self.attributes, values, "", &mut diagnostics);
        diagnostics
    }

    /// Check that only user-settable attributes are set.
    #[must_use]
    pub fn validate_config(&self, values: &AttributeMap) -> Vec<Diagnostic> {
        let mut diagnostics = self.validate(values);
        for (name, value) in values {
            let computed_only = self
                .attributes
                .get(name)
                .is_some_and(|attribute| !attribute.user_settable());
            if computed_only && !value.is_null() {
                diagnostics.push(
                    Diagnostic::error("Value for unconfigurable attribute")
                        .with_attribute(name.clone())
                        .with_detail("this attribute is set by the provider"),
                );
            }
        }
        diagnostics
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn validate_block(
    attributes: &BTreeMap<String, Attribute>,
    values: &AttributeMap,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for name in values.keys() {
        if !attributes.contains_key(name) {
            diagnostics.push(
                Diagnostic::error("Unsupported attribute").with_attribute(join_path(prefix, name)),
            );
        }
    }

    for (name, attribute) in attributes {
        let path = join_path(prefix, name);
        match values.get(name) {
            None | Some(Value::Null) => {
                if attribute.required {
                    diagnostics
                        .push(Diagnostic::error("Missing required attribute").with_attribute(path));
                }
            }
            Some(value) => validate_value(&attribute.attr_type, value, &path, diagnostics),
        }
    }
}

fn validate_value(
    expected: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let matches = match (expected, value) {
        (AttributeType::String, Value::String(_))
        | (AttributeType::Bool, Value::Bool(_)) => true,
        (AttributeType::Int, Value::Number(number)) => number.is_i64() || number.is_u64(),
        (AttributeType::List(element), Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                validate_value(element, item, &format!("{path}[{index}]"), diagnostics);
            }
            true
        }
        (AttributeType::Object(fields), Value::Object(map)) => {
            validate_block(fields, map, path, diagnostics);
            true
        }
        _ => false,
    };

    if !matches {
        diagnostics.push(
            Diagnostic::error("Incorrect attribute value type")
                .with_attribute(path.to_string())
                .with_detail(format!("expected {}", expected.name())),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> AttributeMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn rule_schema() -> Schema {
        Schema::v0()
            .with_attribute("server_number", Attribute::required_int().force_new())
            .with_attribute("status", Attribute::optional_string().with_default("active"))
            .with_attribute("server_ip", Attribute::computed_string())
            .with_attribute(
                "rules",
                Attribute::optional_list(object([
                    ("name", Attribute::required_string()),
                    ("dst_port", Attribute::optional_string()),
                ])),
            )
    }

    #[test]
    fn validate_accepts_well_formed_bag() {
        let values = bag(json!({
            "server_number": 321,
            "rules": [{"name": "ssh", "dst_port": "22"}]
        }));
        assert!(rule_schema().validate(&values).is_empty());
    }

    #[test]
    fn validate_reports_missing_required() {
        let diagnostics = rule_schema().validate(&bag(json!({"server_number": null})));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("server_number"));
        assert_eq!(diagnostics[0].summary, "Missing required attribute");
    }

    #[test]
    fn validate_reports_unknown_and_mistyped() {
        let diagnostics = rule_schema().validate(&bag(json!({
            "server_number": "321",
            "colour": "blue"
        })));
        let paths: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert!(paths.contains(&"colour"));
        assert!(paths.contains(&"server_number"));
    }

    #[test]
    fn validate_recurses_into_nested_blocks() {
        let diagnostics = rule_schema().validate(&bag(json!({
            "server_number": 1,
            "rules": [{"name": "ok"}, {"dst_port": 22}]
        })));
        let paths: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(paths, vec!["rules[1].dst_port", "rules[1].name"]);
    }

    #[test]
    fn validate_config_rejects_computed_values() {
        let diagnostics =
            rule_schema().validate_config(&bag(json!({"server_number": 1, "server_ip": "1.2.3.4"})));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Value for unconfigurable attribute");
    }

    #[test]
    fn apply_defaults_prefers_env_over_static() {
        let schema = Schema::v0()
            .with_attribute(
                "url",
                Attribute::optional_string()
                    .with_env_default("ROBOT_URL")
                    .with_default("https://fallback"),
            )
            .with_attribute("port", Attribute::optional_int().with_env_default("ROBOT_PORT"))
            .with_attribute("user", Attribute::optional_string().with_env_default("ROBOT_USER"));

        let mut values = bag(json!({"user": "explicit"}));
        schema.apply_defaults(&mut values, |name| match name {
            "ROBOT_URL" => Some("https://env".to_string()),
            "ROBOT_PORT" => Some("8443".to_string()),
            "ROBOT_USER" => Some("from-env".to_string()),
            _ => None,
        });

        assert_eq!(values["url"], json!("https://env"));
        assert_eq!(values["port"], json!(8443));
        assert_eq!(values["user"], json!("explicit"));
    }

    #[test]
    fn apply_defaults_falls_back_to_static() {
        let mut values = AttributeMap::new();
        rule_schema().apply_defaults(&mut values, |_| None);
        assert_eq!(values["status"], json!("active"));
        assert!(!values.contains_key("server_number"));
    }
}

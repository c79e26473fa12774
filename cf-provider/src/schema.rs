use std::collections::BTreeMap;
use std::ops::Not;

use cf_core::jsonpath::JsonPath;
use regex::Regex;
use serde::Serialize;
use serde_json::{
    Map,
    Value,
};

use crate::diagnostics::Diagnostics;

pub const DNS_SUBDOMAIN_PATTERN: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$";
pub const DNS_LABEL_PATTERN: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int,
    Number,
    Bool,
    Dynamic,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(BTreeMap<String, Attribute>),
}

impl AttributeType {
    fn describe(&self) -> String {
        match self {
            AttributeType::String => "string".into(),
            AttributeType::Int => "integer".into(),
            AttributeType::Number => "number".into(),
            AttributeType::Bool => "bool".into(),
            AttributeType::Dynamic => "any value".into(),
            AttributeType::List(elem) => format!("list of {}", elem.describe()),
            AttributeType::Map(elem) => format!("map of {}", elem.describe()),
            AttributeType::Object(_) => "object".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    Regex { pattern: String, description: String },
    OneOf { values: Vec<String> },
    IntAtLeast { min: i64 },
    IntBetween { min: i64, max: i64 },
    LengthBetween { min: usize, max: usize },
    Duration,
    JsonPath,
}

impl Validator {
    pub fn regex(pattern: &str, description: &str) -> Validator {
        Validator::Regex {
            pattern: pattern.into(),
            description: description.into(),
        }
    }

    pub fn one_of(values: &[&str]) -> Validator {
        Validator::OneOf { values: values.iter().map(|v| v.to_string()).collect() }
    }

    // Returns a description of what's wrong, or None if the value passes.  Values of the wrong
    // JSON type are the type checker's problem, not the validator's, so they always pass here.
    pub fn check(&self, value: &Value) -> Option<String> {
        match (self, value) {
            (Validator::Regex { pattern, description }, Value::String(s)) => match Regex::new(pattern) {
                Ok(re) if re.is_match(s) => None,
                Ok(_) => Some(format!("must be {description}, got {s:?}")),
                Err(err) => Some(format!("could not compile validation pattern {pattern:?}: {err}")),
            },
            (Validator::OneOf { values }, Value::String(s)) => {
                values.contains(s).not().then(|| format!("must be one of {values:?}, got {s:?}"))
            },
            (Validator::IntAtLeast { min }, Value::Number(n)) => match n.as_i64() {
                Some(i) if i >= *min => None,
                _ => Some(format!("must be at least {min}, got {n}")),
            },
            (Validator::IntBetween { min, max }, Value::Number(n)) => match n.as_i64() {
                Some(i) if i >= *min && i <= *max => None,
                _ => Some(format!("must be between {min} and {max}, got {n}")),
            },
            (Validator::LengthBetween { min, max }, Value::String(s)) => length_check(s.chars().count(), *min, *max),
            (Validator::LengthBetween { min, max }, Value::Array(a)) => length_check(a.len(), *min, *max),
            (Validator::Duration, Value::String(s)) => humantime::parse_duration(s)
                .err()
                .map(|err| format!("must be a duration like \"30s\" or \"1h 30m\", got {s:?}: {err}")),
            (Validator::JsonPath, Value::String(s)) => JsonPath::parse(s).err().map(|err| format!("must be a JSONPath expression: {err}")),
            _ => None,
        }
    }
}

fn length_check(len: usize, min: usize, max: usize) -> Option<String> {
    (len < min || len > max).then(|| format!("length must be between {min} and {max}, got {len}"))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub attr_type: AttributeType,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(skip_serializing_if = "<&bool>::not")]
    pub required: bool,

    #[serde(skip_serializing_if = "<&bool>::not")]
    pub optional: bool,

    #[serde(skip_serializing_if = "<&bool>::not")]
    pub computed: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    pub fn new(attr_type: AttributeType, description: &str) -> Attribute {
        Attribute {
            attr_type,
            description: description.into(),
            required: false,
            optional: true,
            computed: false,
            validators: vec![],
        }
    }

    pub fn string(description: &str) -> Attribute {
        Attribute::new(AttributeType::String, description)
    }

    pub fn int(description: &str) -> Attribute {
        Attribute::new(AttributeType::Int, description)
    }

    pub fn number(description: &str) -> Attribute {
        Attribute::new(AttributeType::Number, description)
    }

    pub fn bool(description: &str) -> Attribute {
        Attribute::new(AttributeType::Bool, description)
    }

    pub fn dynamic(description: &str) -> Attribute {
        Attribute::new(AttributeType::Dynamic, description)
    }

    pub fn list(elem: AttributeType, description: &str) -> Attribute {
        Attribute::new(AttributeType::List(Box::new(elem)), description)
    }

    pub fn map(elem: AttributeType, description: &str) -> Attribute {
        Attribute::new(AttributeType::Map(Box::new(elem)), description)
    }

    pub fn object<'a>(attrs: impl IntoIterator<Item = (&'a str, Attribute)>, description: &str) -> Attribute {
        Attribute::new(AttributeType::Object(collect_attrs(attrs)), description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    // Set by the server only
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self.optional = false;
        self
    }

    // Set by the user or filled in by the server
    pub fn optional_computed(mut self) -> Self {
        self.computed = true;
        self.optional = true;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

pub(crate) fn collect_attrs<'a>(attrs: impl IntoIterator<Item = (&'a str, Attribute)>) -> BTreeMap<String, Attribute> {
    attrs.into_iter().map(|(name, attr)| (name.to_string(), attr)).collect()
}

// A Schema describes the attributes of one entity type.  Only top-level attributes are closed:
// bodies are small hand-written slices of much larger CRD schemas, so nested objects only check
// the fields they declare and let everything else through.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Schema {
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new<'a>(description: &str, attrs: impl IntoIterator<Item = (&'a str, Attribute)>) -> Schema {
        Schema {
            description: description.into(),
            attributes: collect_attrs(attrs),
        }
    }

    // Look up an attribute by dotted path, e.g. "metadata.name"
    pub fn attribute(&self, path: &str) -> Option<&Attribute> {
        let mut parts = path.split('.');
        let mut attr = self.attributes.get(parts.next()?)?;
        for part in parts {
            attr = match &attr.attr_type {
                AttributeType::Object(attrs) => attrs.get(part)?,
                _ => return None,
            };
        }
        Some(attr)
    }

    pub fn validate_config(&self, config: &impl Serialize) -> Diagnostics {
        match serde_json::to_value(config) {
            Ok(doc) => self.validate(&doc),
            Err(err) => Diagnostics::from_error(&anyhow::Error::new(err)),
        }
    }

    pub fn validate(&self, doc: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let Value::Object(fields) = doc else {
            diags.add_error("Invalid configuration", "expected an object of attributes at the top level");
            return diags;
        };

        for key in fields.keys().filter(|k| !self.attributes.contains_key(*k)) {
            diags.add_error("Unsupported attribute", &format!("{key}: attribute is not supported by this type"));
        }
        validate_attrs(&self.attributes, fields, "", &mut diags);
        diags
    }
}

fn validate_attrs(attrs: &BTreeMap<String, Attribute>, fields: &Map<String, Value>, prefix: &str, diags: &mut Diagnostics) {
    for (name, attr) in attrs {
        let path = if prefix.is_empty() { name.clone() } else { format!("{prefix}.{name}") };
        match fields.get(name) {
            None | Some(Value::Null) => {
                if attr.required {
                    diags.add_error("Missing required attribute", &format!("{path}: attribute is required"));
                }
            },
            Some(value) => {
                if attr.is_computed_only() {
                    diags.add_warning("Value for computed attribute", &format!("{path}: set by the server, ignoring"));
                }
                validate_value(&attr.attr_type, &attr.validators, value, &path, diags);
            },
        }
    }
}

fn validate_value(attr_type: &AttributeType, validators: &[Validator], value: &Value, path: &str, diags: &mut Diagnostics) {
    let type_ok = match (attr_type, value) {
        (AttributeType::Dynamic, _) | (AttributeType::Bool, Value::Bool(_)) | (AttributeType::String, Value::String(_)) => true,
        (AttributeType::Number, Value::Number(_)) => true,
        (AttributeType::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
        (AttributeType::List(elem), Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                validate_value(elem, &[], item, &format!("{path}[{i}]"), diags);
            }
            true
        },
        (AttributeType::Map(elem), Value::Object(entries)) => {
            for (key, item) in entries {
                validate_value(elem, &[], item, &format!("{path}[{key:?}]"), diags);
            }
            true
        },
        (AttributeType::Object(attrs), Value::Object(fields)) => {
            validate_attrs(attrs, fields, path, diags);
            true
        },
        _ => false,
    };

    if !type_ok {
        diags.add_error(
            "Incorrect attribute value type",
            &format!("{path}: expected {}, got {}", attr_type.describe(), json_type_name(value)),
        );
        return;
    }

    for msg in validators.iter().filter_map(|v| v.check(value)) {
        diags.add_error("Invalid attribute value", &format!("{path}: {msg}"));
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

use serde::Serialize;
use serde_json::{Map, Value};

/// Closed vocabulary of built-in section types.
pub const BUILTIN_TYPES: &[&str] = &[
    "hero",
    "heading",
    "text",
    "feature-grid",
    "stat-row",
    "steps",
    "timeline",
    "list",
    "comparison-table",
    "faq",
    "tabset",
    "form",
    "card",
    "stack",
    "columns",
    "code",
    "media-block",
    "divider",
    "quote",
    "cta",
    "image-text",
    "callout",
];

/// Types that hold child section lists.
pub const CONTAINER_TYPES: &[&str] = &["tabset", "columns", "card", "stack"];

pub fn is_builtin(kind: &str) -> bool {
    BUILTIN_TYPES.contains(&kind)
}

static NULL: Value = Value::Null;

/// A section description after normalization.
///
/// Only the normalizer builds these, so holding one means every top-level
/// string is clamped, known collections are capped and nested section
/// lists are themselves normalized. Individual values still go through the
/// per-field sanitizers when rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Section {
    fields: Map<String, Value>,
}

impl Section {
    pub(crate) fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// The `type` tag. Always present on a normalized section.
    pub fn kind(&self) -> &str {
        self.fields.get("type").and_then(Value::as_str).unwrap_or("")
    }

    /// Field value, or `Null` when absent.
    pub fn get(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&NULL)
    }

    /// String field, or `""` for anything that is not a string.
    pub fn str(&self, key: &str) -> &str {
        self.get(key).as_str().unwrap_or("")
    }

    pub fn opt_str(&self, key: &str) -> Option<&str> {
        self.get(key).as_str().filter(|s| !s.trim().is_empty())
    }

    /// Array field, or an empty slice.
    pub fn array(&self, key: &str) -> &[Value] {
        self.get(key).as_array().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bool(&self, key: &str) -> bool {
        self.get(key).as_bool().unwrap_or(false)
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.get(key).as_f64()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Section> for Value {
    fn from(section: Section) -> Self {
        section.into_value()
    }
}

/// Accessors shared by renderers for nested item objects.
pub fn item_str<'a>(item: &'a Value, key: &str) -> &'a str {
    item.get(key).and_then(Value::as_str).unwrap_or("")
}

pub fn item_opt_str<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

//! Section normalizer.
//!
//! Walks a caller-supplied section tree, drops unknown and malformed
//! entries, clamps strings, caps collections and recurses into container
//! types up to `Limits::max_depth`. Output order follows input order among
//! accepted entries; rejected entries leave no hole. Normalizing an already
//! normalized tree returns the same tree.

use crate::limits::Limits;
use crate::sanitize::clamp_str;
use crate::section::{is_builtin, Section};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// Stateful normalization pass. The section budget is shared across the
/// whole tree, so nested sections count against `Limits::max_sections`.
pub struct Normalizer<'a> {
    limits: &'a Limits,
    custom_types: &'a BTreeSet<String>,
    accepted: usize,
}

/// Normalize a section list with a fresh budget.
pub fn normalize_sections(
    input: &Value,
    limits: &Limits,
    custom_types: &BTreeSet<String>,
) -> Vec<Section> {
    Normalizer::new(limits, custom_types).normalize(input, 0)
}

/// Normalize a single section description (streaming and incremental
/// paths). Returns `None` when the section is rejected.
pub fn normalize_section(
    raw: &Value,
    limits: &Limits,
    custom_types: &BTreeSet<String>,
) -> Option<Section> {
    Normalizer::new(limits, custom_types).normalize_one(raw, 0)
}

impl<'a> Normalizer<'a> {
    pub fn new(limits: &'a Limits, custom_types: &'a BTreeSet<String>) -> Self {
        Self {
            limits,
            custom_types,
            accepted: 0,
        }
    }

    /// Sections accepted so far by this pass, nested ones included.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn normalize(&mut self, input: &Value, depth: usize) -> Vec<Section> {
        if depth > self.limits.max_depth {
            debug!(depth, max_depth = self.limits.max_depth, "nested sections dropped: depth exceeded");
            return Vec::new();
        }
        let Some(candidates) = input.as_array() else {
            if !input.is_null() {
                debug!(depth, "section list dropped: not an array");
            }
            return Vec::new();
        };

        let mut out = Vec::new();
        for (index, raw) in candidates.iter().enumerate() {
            if self.accepted >= self.limits.max_sections {
                debug!(
                    dropped = candidates.len() - index,
                    max_sections = self.limits.max_sections,
                    "sections dropped: section budget exhausted"
                );
                break;
            }
            if let Some(section) = self.normalize_at(raw, depth) {
                out.push(section);
            }
        }
        out
    }

    pub fn normalize_one(&mut self, raw: &Value, depth: usize) -> Option<Section> {
        if depth > self.limits.max_depth || self.accepted >= self.limits.max_sections {
            return None;
        }
        self.normalize_at(raw, depth)
    }

    fn normalize_at(&mut self, raw: &Value, depth: usize) -> Option<Section> {
        let Some(obj) = raw.as_object() else {
            debug!(depth, "section dropped: not an object");
            return None;
        };
        let kind = match obj.get("type").and_then(Value::as_str) {
            Some(kind) if is_builtin(kind) || self.custom_types.contains(kind) => kind.to_string(),
            Some(kind) => {
                debug!(section_type = kind, depth, "section dropped: unknown type");
                return None;
            }
            None => {
                debug!(depth, "section dropped: missing type");
                return None;
            }
        };

        let mut fields = Map::new();
        for (key, value) in obj {
            let value = match value {
                Value::String(s) if key != "type" => {
                    let max = if kind == "code" && key == "code" {
                        self.limits.max_code_length
                    } else {
                        self.limits.max_string_length
                    };
                    Value::String(clamp_str(s, max))
                }
                other => other.clone(),
            };
            fields.insert(key.clone(), value);
        }
        self.accepted += 1;

        let limits = self.limits;
        match kind.as_str() {
            "feature-grid" | "stat-row" | "steps" | "timeline" | "list" => {
                cap_array(&mut fields, "items", limits.max_items);
            }
            "cta" => cap_array(&mut fields, "buttons", limits.max_items),
            "faq" => cap_array(&mut fields, "items", limits.max_faq_items),
            "comparison-table" => {
                cap_array(&mut fields, "columns", limits.max_table_columns);
                cap_array(&mut fields, "rows", limits.max_table_rows);
                if let Some(Value::Array(rows)) = fields.get_mut("rows") {
                    for row in rows.iter_mut() {
                        if let Value::Array(cells) = row {
                            cells.truncate(limits.max_table_columns);
                        }
                    }
                }
            }
            "form" => {
                cap_array(&mut fields, "fields", limits.max_fields);
                if let Some(Value::Array(list)) = fields.get_mut("fields") {
                    for field in list.iter_mut() {
                        if let Value::Object(field) = field {
                            cap_array(field, "options", limits.max_options);
                        }
                    }
                }
            }
            "tabset" => {
                cap_array(&mut fields, "tabs", limits.max_tabs);
                if let Some(Value::Array(tabs)) = fields.remove("tabs") {
                    let tabs: Vec<Value> = tabs
                        .into_iter()
                        .filter_map(|tab| match tab {
                            Value::Object(mut tab) => {
                                let children = tab.remove("sections").unwrap_or(Value::Null);
                                tab.insert("sections".into(), self.children(&children, depth));
                                Some(Value::Object(tab))
                            }
                            _ => {
                                debug!("tab dropped: not an object");
                                None
                            }
                        })
                        .collect();
                    fields.insert("tabs".into(), Value::Array(tabs));
                }
            }
            "card" | "stack" => {
                if let Some(children) = fields.remove("sections") {
                    let normalized = self.children(&children, depth);
                    fields.insert("sections".into(), normalized);
                }
            }
            "columns" => {
                cap_array(&mut fields, "columns", limits.max_columns);
                if let Some(Value::Array(columns)) = fields.remove("columns") {
                    let columns: Vec<Value> = columns
                        .into_iter()
                        .map(|column| match column {
                            Value::Array(_) => self.children(&column, depth),
                            Value::Object(mut column) => {
                                let children = column.remove("sections").unwrap_or(Value::Null);
                                column.insert("sections".into(), self.children(&children, depth));
                                Value::Object(column)
                            }
                            _ => Value::Array(Vec::new()),
                        })
                        .collect();
                    fields.insert("columns".into(), Value::Array(columns));
                }
            }
            _ => {}
        }

        Some(Section::from_fields(fields))
    }

    fn children(&mut self, input: &Value, depth: usize) -> Value {
        Value::Array(
            self.normalize(input, depth + 1)
                .into_iter()
                .map(Section::into_value)
                .collect(),
        )
    }
}

fn cap_array(fields: &mut Map<String, Value>, key: &str, max: usize) {
    if let Some(Value::Array(items)) = fields.get_mut(key) {
        if items.len() > max {
            debug!(field = key, len = items.len(), max, "collection truncated");
            items.truncate(max);
        }
    }
}

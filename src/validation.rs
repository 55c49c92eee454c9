//! Form field validation engine.
//!
//! Rules run in a fixed order: required, length, pattern, numeric range.
//! Only a failed presence check stops evaluation of the remaining rules.

use crate::limits::Limits;
use regex::RegexBuilder;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Field name to ordered error messages. Only invalid fields appear.
pub type ValidationErrors = BTreeMap<String, Vec<String>>;

const REGEX_SIZE_LIMIT: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Submit,
    Change,
    Blur,
    Always,
}

impl ValidationMode {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "change" => ValidationMode::Change,
            "blur" => ValidationMode::Blur,
            "always" => ValidationMode::Always,
            _ => ValidationMode::Submit,
        }
    }

    pub fn on_change(self) -> bool {
        matches!(self, ValidationMode::Change | ValidationMode::Always)
    }

    pub fn on_blur(self) -> bool {
        matches!(self, ValidationMode::Blur | ValidationMode::Always)
    }
}

/// Per-field state, mirrored onto the rendered field as a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Untouched,
    Validating,
    Valid,
    Invalid,
}

impl FieldState {
    pub fn class(self) -> &'static str {
        match self {
            FieldState::Untouched => "lp-field--untouched",
            FieldState::Validating => "lp-field--validating",
            FieldState::Valid => "lp-field--valid",
            FieldState::Invalid => "lp-field--invalid",
        }
    }

    pub const ALL: [FieldState; 4] = [
        FieldState::Untouched,
        FieldState::Validating,
        FieldState::Valid,
        FieldState::Invalid,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Url,
    Password,
    Number,
    Range,
    Date,
    Textarea,
    Select,
    Radio,
    Checkbox,
}

impl FieldKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "email" => FieldKind::Email,
            "tel" => FieldKind::Tel,
            "url" => FieldKind::Url,
            "password" => FieldKind::Password,
            "number" => FieldKind::Number,
            "range" => FieldKind::Range,
            "date" => FieldKind::Date,
            "textarea" => FieldKind::Textarea,
            "select" => FieldKind::Select,
            "radio" => FieldKind::Radio,
            "checkbox" => FieldKind::Checkbox,
            _ => FieldKind::Text,
        }
    }

    /// Value of the `type` attribute for `input`-backed kinds.
    pub fn input_type(self) -> &'static str {
        match self {
            FieldKind::Email => "email",
            FieldKind::Tel => "tel",
            FieldKind::Url => "url",
            FieldKind::Password => "password",
            FieldKind::Number => "number",
            FieldKind::Range => "range",
            FieldKind::Date => "date",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Text | FieldKind::Textarea | FieldKind::Select => "text",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Range)
    }
}

/// Caller-supplied messages that replace the generated defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMessages {
    pub required: Option<String>,
    pub min_length: Option<String>,
    pub max_length: Option<String>,
    pub pattern: Option<String>,
    pub range: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub messages: FieldMessages,
}

impl FieldSpec {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            kind,
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            min: None,
            max: None,
            messages: FieldMessages::default(),
        }
    }
}

/// Everything the submit listener needs, captured at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSpec {
    pub fields: Vec<FieldSpec>,
    pub mode: ValidationMode,
    pub submit_action: String,
    pub cancel_action: String,
}

/// Payload delivered to the action callback on submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormResult {
    pub valid: bool,
    pub values: serde_json::Map<String, Value>,
    pub errors: ValidationErrors,
}

/// Validate a single field value. Returns the ordered error list.
pub fn validate_field(field: &FieldSpec, value: &Value, limits: &Limits) -> Vec<String> {
    let mut errors = Vec::new();
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    };

    // 1. presence
    let present = match field.kind {
        FieldKind::Checkbox => value == &Value::Bool(true),
        _ => !text.trim().is_empty(),
    };
    if !present {
        if field.required {
            errors.push(message_or(&field.messages.required, || {
                format!("{} is required.", field.label)
            }));
        }
        return errors;
    }
    if field.kind == FieldKind::Checkbox {
        return errors;
    }

    // 2. length
    let len = text.chars().count();
    if let Some(min) = field.min_length {
        if len < min {
            errors.push(message_or(&field.messages.min_length, || {
                format!("{} must be at least {} characters.", field.label, min)
            }));
        }
    }
    if let Some(max) = field.max_length {
        if len > max {
            errors.push(message_or(&field.messages.max_length, || {
                format!("{} must be at most {} characters.", field.label, max)
            }));
        }
    }

    // 3. pattern
    if let Some(pattern) = &field.pattern {
        if let Some(false) = pattern_matches(pattern, &text, limits) {
            errors.push(message_or(&field.messages.pattern, || {
                format!("{} has an invalid format.", field.label)
            }));
        }
    }

    // 4. numeric range
    if field.kind.is_numeric() {
        match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => {
                let below = field.min.map(|min| n < min).unwrap_or(false);
                let above = field.max.map(|max| n > max).unwrap_or(false);
                if below || above {
                    errors.push(message_or(&field.messages.range, || {
                        range_message(&field.label, field.min, field.max)
                    }));
                }
            }
            _ => {
                errors.push(message_or(&field.messages.range, || {
                    format!("{} must be a number.", field.label)
                }));
            }
        }
    }

    errors
}

/// Validate every field against the collected values, in field order.
pub fn validate_form(
    spec: &FormSpec,
    values: &serde_json::Map<String, Value>,
    limits: &Limits,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for field in &spec.fields {
        let value = values.get(&field.name).unwrap_or(&Value::Null);
        let field_errors = validate_field(field, value, limits);
        if !field_errors.is_empty() {
            errors.insert(field.name.clone(), field_errors);
        }
    }
    errors
}

/// `Some(matched)` when the rule applies, `None` when it is skipped
/// (pattern rejected by the safety check or failing to compile).
pub fn pattern_matches(pattern: &str, input: &str, limits: &Limits) -> Option<bool> {
    if pattern.chars().count() > limits.max_pattern_length || !is_safe_pattern(pattern) {
        warn!(pattern, "field pattern skipped: unsafe shape");
        return None;
    }
    let anchored = format!("^(?:{})$", pattern);
    let regex = match RegexBuilder::new(&anchored)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
    {
        Ok(re) => re,
        Err(err) => {
            debug!(pattern, reason = %err, "field pattern skipped: does not compile");
            return None;
        }
    };
    let capped: String = input.chars().take(limits.max_pattern_input).collect();
    Some(regex.is_match(&capped))
}

/// Heuristic rejection of catastrophic-backtracking shapes: a quantified
/// group whose body is itself quantified (`(a+)+`, `(.*)*`, `(x|x?)+`) and
/// backreferences.
pub fn is_safe_pattern(pattern: &str) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    let mut stack: Vec<bool> = Vec::new();
    let mut escaped = false;
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if escaped {
            escaped = false;
            if c.is_ascii_digit() && c != '0' {
                return false;
            }
            i += 1;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            _ if in_class => {}
            '(' => {
                stack.push(false);
                // group modifiers such as `(?:` are not quantifiers
                if chars.get(i + 1) == Some(&'?') {
                    i += 1;
                }
            }
            ')' => {
                let quantified_inside = stack.pop().unwrap_or(false);
                if let Some(next) = chars.get(i + 1) {
                    if is_quantifier(*next) && quantified_inside {
                        return false;
                    }
                }
                if quantified_inside {
                    if let Some(parent) = stack.last_mut() {
                        *parent = true;
                    }
                }
            }
            '*' | '+' | '?' | '{' => {
                if let Some(top) = stack.last_mut() {
                    *top = true;
                }
            }
            _ => {}
        }
        i += 1;
    }
    true
}

fn is_quantifier(c: char) -> bool {
    matches!(c, '*' | '+' | '{')
}

fn message_or(custom: &Option<String>, default: impl FnOnce() -> String) -> String {
    match custom {
        Some(msg) if !msg.trim().is_empty() => msg.clone(),
        _ => default(),
    }
}

fn range_message(label: &str, min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{} must be between {} and {}.", label, min, max),
        (Some(min), None) => format!("{} must be at least {}.", label, min),
        (None, Some(max)) => format!("{} must be at most {}.", label, max),
        (None, None) => format!("{} is out of range.", label),
    }
}

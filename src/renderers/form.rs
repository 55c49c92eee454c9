//! Forms: safe field controls plus the submit/cancel/live-validation
//! listener. Values are always read from the live controls at submit time.

use super::{section_header, unique_id};
use crate::action::Trigger;
use crate::dom::{Attr, Element, Node};
use crate::events::{closest, ChangeValue, Event, EventCx, Listener};
use crate::registry::{RenderChild, RenderContext};
use crate::sanitize::{clamp_str, value_to_text};
use crate::section::{item_opt_str, item_str, Section};
use crate::validation::{
    validate_field, validate_form, FieldKind, FieldMessages, FieldSpec, FieldState, FormResult, FormSpec,
    ValidationMode,
};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

const FIELD: &str = "lp-field";
const ERROR: &str = "lp-field-error";
const SUBMIT: &str = "lp-form-submit";
const CANCEL: &str = "lp-form-cancel";

static NULL: Value = Value::Null;

fn get<'v>(value: &'v Value, key: &str) -> &'v Value {
    value.get(key).unwrap_or(&NULL)
}

// ─── Construction ────────────────────────────────────────────────────────

pub fn form(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let form_id = ctx.unique_id(section.str("id"), "form", &[]);
    let mut used = BTreeSet::new();
    let mut specs = Vec::new();
    let mut controls = Vec::new();

    for (i, raw) in section.array("fields").iter().enumerate() {
        if !raw.is_object() {
            continue;
        }
        let fallback = format!("field-{}", i + 1);
        let name = unique_id(&mut used, ctx.id(item_str(raw, "name"), &fallback), &[]);
        let spec = field_spec(raw, &name, ctx);
        controls.push(field_element(&spec, raw, &form_id, ctx));
        specs.push(spec);
    }
    if specs.is_empty() {
        return None;
    }

    let submit = section.get("submit");
    let cancel = section.get("cancel");
    let spec = FormSpec {
        fields: specs,
        mode: ValidationMode::parse(section.str("validate")),
        submit_action: ctx.action_name(get(submit, "action")).unwrap_or_else(|| "submit".to_string()),
        cancel_action: ctx.action_name(get(cancel, "action")).unwrap_or_else(|| "cancel".to_string()),
    };

    let mut root = Element::with_class("form", "lp-form")
        .attr(Attr::Id, form_id.as_str())
        .flag(Attr::NoValidate, true);
    if let Some(header) = section_header(section) {
        root.push(header);
    }
    if let Some(description) = section.opt_str("description") {
        root.push(Element::with_class("p", "lp-muted").text(description));
    }
    for control in controls {
        root.push(control);
    }

    let mut actions = Element::with_class("div", "lp-actions");
    let submit_label = ctx.text(get(submit, "label"));
    actions.push(
        Element::with_class("button", "lp-button")
            .class(SUBMIT)
            .attr(Attr::Type, "submit")
            .attr(Attr::DataAction, spec.submit_action.as_str())
            .text(if submit_label.trim().is_empty() { "Submit" } else { submit_label.as_str() }),
    );
    if cancel.is_object() {
        let cancel_label = ctx.text(get(cancel, "label"));
        actions.push(
            Element::with_class("button", "lp-button lp-button--secondary")
                .class(CANCEL)
                .attr(Attr::Type, "button")
                .attr(Attr::DataAction, spec.cancel_action.as_str())
                .text(if cancel_label.trim().is_empty() { "Cancel" } else { cancel_label.as_str() }),
        );
    }
    root.push(actions);
    Some(root.on(Listener::Form(Box::new(spec))).into())
}

fn field_spec(raw: &Value, name: &str, ctx: &RenderContext<'_>) -> FieldSpec {
    let mut spec = FieldSpec::new(name, FieldKind::parse(item_str(raw, "type")));
    let label = ctx.text(get(raw, "label"));
    if !label.trim().is_empty() {
        spec.label = label;
    }
    spec.required = get(raw, "required").as_bool().unwrap_or(false);
    spec.min_length = get(raw, "minLength").as_u64().map(|n| n as usize);
    spec.max_length = get(raw, "maxLength").as_u64().map(|n| n as usize);
    spec.pattern = item_opt_str(raw, "pattern").map(str::to_string);
    spec.min = get(raw, "min").as_f64();
    spec.max = get(raw, "max").as_f64();

    let messages = get(raw, "messages");
    let message = |key: &str| {
        let text = ctx.text(get(messages, key));
        (!text.trim().is_empty()).then_some(text)
    };
    spec.messages = FieldMessages {
        required: message("required"),
        min_length: message("minLength"),
        max_length: message("maxLength"),
        pattern: message("pattern"),
        range: message("range"),
    };
    spec
}

/// `(value, label)` pairs from strings or `{value, label}` objects.
fn options(raw: &Value, ctx: &RenderContext<'_>) -> Vec<(String, String)> {
    let max = ctx.limits.max_string_length;
    get(raw, "options")
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|opt| {
                    let (value, label) = match opt {
                        Value::Object(_) => {
                            let value = clamp_str(&value_to_text(get(opt, "value")), max);
                            let label = ctx.text(get(opt, "label"));
                            let label = if label.trim().is_empty() { value.clone() } else { label };
                            (value, label)
                        }
                        _ => {
                            let value = clamp_str(&value_to_text(opt), max);
                            (value.clone(), value)
                        }
                    };
                    (!value.is_empty()).then_some((value, label))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn field_element(spec: &FieldSpec, raw: &Value, form_id: &str, ctx: &RenderContext<'_>) -> Element {
    let control_id = format!("{form_id}-{}", spec.name);
    let error_id = format!("{control_id}-error");
    let default = clamp_str(&value_to_text(get(raw, "value")), ctx.limits.max_string_length);
    let mut wrapper = Element::with_class("div", FIELD)
        .class(FieldState::Untouched.class())
        .attr(Attr::DataField, spec.name.as_str());

    let described = |el: Element| {
        el.attr(Attr::AriaDescribedBy, error_id.as_str())
            .attr(Attr::AriaInvalid, "false")
            .flag(Attr::Required, spec.required)
    };

    match spec.kind {
        FieldKind::Checkbox => {
            let checked = get(raw, "value").as_bool().unwrap_or(false);
            let input = Element::with_class("input", "lp-checkbox")
                .attr(Attr::Type, "checkbox")
                .attr(Attr::Id, control_id.as_str())
                .attr(Attr::Name, spec.name.as_str())
                .attr(Attr::Value, "true")
                .flag(Attr::Checked, checked);
            wrapper.push(
                Element::with_class("label", "lp-choice")
                    .child(described(input))
                    .child(Element::new("span").text(&spec.label)),
            );
        }
        FieldKind::Radio => {
            let label_id = format!("{control_id}-label");
            let mut group = Element::with_class("div", "lp-radio-group")
                .attr(Attr::Role, "radiogroup")
                .attr(Attr::AriaLabelledBy, label_id.as_str())
                .attr(Attr::AriaDescribedBy, error_id.as_str())
                .attr(Attr::AriaInvalid, "false");
            for (j, (value, label)) in options(raw, ctx).into_iter().enumerate() {
                let input = Element::new("input")
                    .attr(Attr::Type, "radio")
                    .attr(Attr::Id, format!("{control_id}-{}", j + 1))
                    .attr(Attr::Name, spec.name.as_str())
                    .flag(Attr::Checked, value == default)
                    .attr(Attr::Value, value);
                group.push(
                    Element::with_class("label", "lp-choice")
                        .child(input)
                        .child(Element::new("span").text(&label)),
                );
            }
            wrapper.push(
                Element::with_class("span", "lp-field-label")
                    .attr(Attr::Id, label_id)
                    .text(&spec.label),
            );
            wrapper.push(group);
        }
        kind => {
            wrapper.push(
                Element::with_class("label", "lp-field-label")
                    .attr(Attr::For, control_id.as_str())
                    .text(&spec.label),
            );
            let mut control = match kind {
                FieldKind::Select => {
                    let placeholder = ctx.text(get(raw, "placeholder"));
                    let mut select = Element::with_class("select", "lp-input").child(
                        Element::new("option")
                            .attr(Attr::Value, "")
                            .text(if placeholder.trim().is_empty() { "Select…" } else { placeholder.as_str() }),
                    );
                    for (value, label) in options(raw, ctx) {
                        select.push(
                            Element::new("option")
                                .flag(Attr::Selected, value == default)
                                .attr(Attr::Value, value)
                                .text(&label),
                        );
                    }
                    select
                }
                FieldKind::Textarea => Element::with_class("textarea", "lp-input")
                    .attr(Attr::Rows, "4")
                    .text(&default),
                _ => {
                    let mut input = Element::with_class("input", "lp-input").attr(Attr::Type, kind.input_type());
                    if !default.is_empty() {
                        input.set_attr(Attr::Value, default.as_str());
                    }
                    if kind.is_numeric() {
                        if let Some(min) = spec.min {
                            input.set_attr(Attr::Min, min.to_string());
                        }
                        if let Some(max) = spec.max {
                            input.set_attr(Attr::Max, max.to_string());
                        }
                        if let Some(step) = get(raw, "step").as_f64().filter(|s| s.is_finite() && *s > 0.0) {
                            input.set_attr(Attr::Step, step.to_string());
                        }
                    }
                    input
                }
            };
            control.set_attr(Attr::Id, control_id.as_str());
            control.set_attr(Attr::Name, spec.name.as_str());
            if let Some(n) = spec.min_length {
                control.set_attr(Attr::MinLength, n.to_string());
            }
            if let Some(n) = spec.max_length {
                control.set_attr(Attr::MaxLength, n.to_string());
            }
            let placeholder = ctx.text(get(raw, "placeholder"));
            if !placeholder.trim().is_empty() && kind != FieldKind::Select {
                control.set_attr(Attr::Placeholder, placeholder);
            }
            wrapper.push(described(control));
        }
    }

    let help = ctx.text(get(raw, "help"));
    if !help.trim().is_empty() {
        wrapper.push(Element::with_class("p", "lp-muted lp-field-help").text(&help));
    }
    wrapper.push(
        Element::with_class("p", ERROR)
            .attr(Attr::Id, error_id)
            .attr(Attr::AriaLive, "polite")
            .flag(Attr::Hidden, true),
    );
    wrapper
}

// ─── Live state ──────────────────────────────────────────────────────────

fn is_control(el: &Element) -> bool {
    matches!(el.tag(), "input" | "select" | "textarea")
}

fn is_field(el: &Element) -> bool {
    el.has_class(FIELD) && el.get_attr(Attr::DataField).is_some()
}

fn field_named<'a>(form: &'a Element, name: &str) -> Option<&'a Element> {
    form.find(&|el| is_field(el) && el.get_attr(Attr::DataField) == Some(name))
}

/// Default control behavior for a new value: text controls store it, a
/// select marks the matching option, a radio checks itself when the value
/// is its own.
pub fn set_control_value(el: &mut Element, value: &str) {
    match el.tag() {
        "textarea" => {
            el.children_mut().clear();
            el.push_text(value);
        }
        "select" => {
            for node in el.children_mut() {
                if let Node::Element(option) = node {
                    let on = option.get_attr(Attr::Value) == Some(value);
                    option.set_flag(Attr::Selected, on);
                }
            }
        }
        "input" => match el.get_attr(Attr::Type) {
            Some("radio") => {
                let on = el.get_attr(Attr::Value) == Some(value);
                el.set_flag(Attr::Checked, on);
            }
            Some("checkbox") => {}
            _ => el.set_attr(Attr::Value, value),
        },
        _ => {}
    }
}

/// Current value of one field, read from the live controls.
fn read_value(kind: FieldKind, field: &Element) -> Value {
    let mut controls = Vec::new();
    field.find_all(&is_control, &mut controls);
    match kind {
        FieldKind::Checkbox => Value::Bool(controls.first().map(|c| c.has_flag(Attr::Checked)).unwrap_or(false)),
        FieldKind::Radio => Value::String(
            controls
                .iter()
                .find(|c| c.has_flag(Attr::Checked))
                .and_then(|c| c.get_attr(Attr::Value))
                .unwrap_or("")
                .to_string(),
        ),
        FieldKind::Select => {
            let selected = controls.first().and_then(|select| {
                let mut chosen = select.child_elements().filter(|o| o.has_flag(Attr::Selected));
                chosen
                    .next()
                    .or_else(|| select.child_elements().next())
                    .and_then(|o| o.get_attr(Attr::Value))
            });
            Value::String(selected.unwrap_or("").to_string())
        }
        FieldKind::Textarea => Value::String(controls.first().map(|c| c.text_content()).unwrap_or_default()),
        _ => Value::String(
            controls
                .first()
                .and_then(|c| c.get_attr(Attr::Value))
                .unwrap_or("")
                .to_string(),
        ),
    }
}

pub fn collect_values(spec: &FormSpec, form: &Element) -> Map<String, Value> {
    let mut values = Map::new();
    for field in &spec.fields {
        let value = field_named(form, &field.name)
            .map(|el| read_value(field.kind, el))
            .unwrap_or(Value::Null);
        values.insert(field.name.clone(), value);
    }
    values
}

fn set_state(field: &mut Element, state: FieldState) {
    for s in FieldState::ALL {
        field.remove_class(s.class());
    }
    field.add_class(state.class());
}

/// Mirror one field's validation result onto its wrapper, control and
/// error slot.
fn show_errors(form: &mut Element, name: &str, errors: &[String]) {
    let Some(field) = form.find_mut(&|el| is_field(el) && el.get_attr(Attr::DataField) == Some(name)) else {
        return;
    };
    let invalid = !errors.is_empty();
    set_state(field, if invalid { FieldState::Invalid } else { FieldState::Valid });
    field.walk_mut(&mut |el| {
        if el.has_class(ERROR) {
            el.children_mut().clear();
            for message in errors {
                el.push(Element::new("span").text(message));
            }
            el.set_flag(Attr::Hidden, !invalid);
        } else if is_control(el) || el.get_attr(Attr::Role) == Some("radiogroup") {
            if el.get_attr(Attr::AriaInvalid).is_some() {
                el.set_attr(Attr::AriaInvalid, if invalid { "true" } else { "false" });
            }
        }
    });
}

fn validate_one(spec: &FormSpec, form: &mut Element, field_path: &[usize], cx: &EventCx) {
    let Some(name) = form
        .at_path(field_path)
        .and_then(|el| el.get_attr(Attr::DataField))
        .map(str::to_string)
    else {
        return;
    };
    let Some(field) = spec.fields.iter().find(|f| f.name == name) else {
        return;
    };
    let value = form
        .at_path(field_path)
        .map(|el| read_value(field.kind, el))
        .unwrap_or(Value::Null);
    let errors = validate_field(field, &value, cx.limits);
    show_errors(form, &name, &errors);
}

// ─── Events ──────────────────────────────────────────────────────────────

pub fn handle_event(spec: &FormSpec, form: &mut Element, abs: &[usize], rel: &[usize], event: &Event, cx: &mut EventCx) {
    match event {
        Event::Submit => submit(spec, form, abs, cx),
        Event::Click => {
            if closest(form, rel, &|el| el.has_class(CANCEL)).is_some() {
                let id = form.id().map(str::to_string);
                cx.fire(&spec.cancel_action, Trigger::Cancel, id.as_deref(), &Value::Null);
            } else if closest(form, rel, &|el| el.has_class(SUBMIT)).is_some() {
                submit(spec, form, abs, cx);
            }
        }
        Event::Input(_) | Event::Change(_) => {
            let Some(field_path) = closest(form, rel, &is_field) else {
                return;
            };
            if let Event::Change(ChangeValue::Checked(true)) = event {
                uncheck_other_radios(form, rel, &field_path);
            }
            if spec.mode.on_change() {
                validate_one(spec, form, &field_path, cx);
            } else if let Some(field) = form.at_path_mut(&field_path) {
                set_state(field, FieldState::Validating);
            }
        }
        Event::Blur => {
            if spec.mode.on_blur() {
                if let Some(field_path) = closest(form, rel, &is_field) {
                    validate_one(spec, form, &field_path, cx);
                }
            }
        }
        Event::KeyDown(_) => {}
    }
}

fn uncheck_other_radios(form: &mut Element, target: &[usize], field_path: &[usize]) {
    let Some(target_id) = form
        .at_path(target)
        .filter(|el| el.get_attr(Attr::Type) == Some("radio"))
        .and_then(|el| el.id())
        .map(str::to_string)
    else {
        return;
    };
    if let Some(field) = form.at_path_mut(field_path) {
        field.walk_mut(&mut |el| {
            if el.get_attr(Attr::Type) == Some("radio") {
                let on = el.id() == Some(target_id.as_str());
                el.set_flag(Attr::Checked, on);
            }
        });
    }
}

fn submit(spec: &FormSpec, form: &mut Element, abs: &[usize], cx: &mut EventCx) {
    cx.outcome.default_prevented = true;
    let values = collect_values(spec, form);
    let errors = validate_form(spec, &values, cx.limits);
    for field in &spec.fields {
        let messages = errors.get(&field.name).map(Vec::as_slice).unwrap_or(&[]);
        show_errors(form, &field.name, messages);
    }

    let valid = errors.is_empty();
    if !valid {
        let first = spec.fields.iter().find(|f| errors.contains_key(&f.name));
        let focus = first.and_then(|f| {
            let field_path = form.path_to(&|el| is_field(el) && el.get_attr(Attr::DataField) == Some(f.name.as_str()))?;
            let control_path = form.at_path(&field_path)?.path_to(&is_control)?;
            Some([abs, field_path.as_slice(), control_path.as_slice()].concat())
        });
        cx.outcome.focus = focus;
    }

    let result = FormResult { valid, values, errors };
    let payload = serde_json::to_value(&result).unwrap_or(Value::Null);
    let id = form.id().map(str::to_string);
    cx.fire(&spec.submit_action, Trigger::Submit, id.as_deref(), &payload);
    cx.outcome.form_result = Some(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionEvent, ActionOutcome, ActionPolicy, ActionSandbox};
    use crate::events::dispatch;
    use crate::limits::Limits;
    use crate::renderers::test_support::render;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn signup() -> Element {
        render(json!({
            "type": "form",
            "id": "signup",
            "validate": "blur",
            "fields": [
                {"name": "name", "label": "Name", "required": true},
                {"name": "email", "label": "Email", "type": "email", "required": true},
                {"name": "team", "label": "Team", "type": "select", "required": true, "options": ["red", {"value": "blue", "label": "Blue"}]},
                {"name": "age", "label": "Age", "type": "number", "min": 18, "max": 99},
                {"name": "plan", "label": "Plan", "type": "radio", "options": ["free", "pro"], "value": "free"},
                {"name": "terms", "label": "Terms", "type": "checkbox"}
            ],
            "submit": {"label": "Join", "action": "signup"},
            "cancel": {"label": "Back"}
        }))
        .and_then(Node::into_element)
        .unwrap()
    }

    fn control_path(form: &Element, id: &str) -> Vec<usize> {
        form.path_to(&|el| el.id() == Some(id)).unwrap()
    }

    fn recording() -> (ActionSandbox, Rc<RefCell<Vec<(String, Value)>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let sandbox = ActionSandbox::new(
            ActionPolicy::AllowAll,
            Some(Rc::new(move |name: &str, _: &ActionEvent, payload: &Value| {
                sink.borrow_mut().push((name.to_string(), payload.clone()))
            })),
        );
        (sandbox, seen)
    }

    #[test]
    fn test_submit_batches_errors_and_focuses_first_invalid() {
        let mut form = signup();
        let (sandbox, seen) = recording();
        let limits = Limits::default();
        let email = control_path(&form, "signup-email");
        dispatch(&mut form, &email, &Event::Input("ada@example.com".into()), &sandbox, &limits).unwrap();

        let outcome = dispatch(&mut form, &[], &Event::Submit, &sandbox, &limits).unwrap();
        let result = outcome.form_result.unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors.keys().cloned().collect::<Vec<_>>(), vec!["name", "team"]);
        assert_eq!(outcome.focus, Some(control_path(&form, "signup-name")));
        assert!(outcome.default_prevented);

        let visible: Vec<&Element> = form
            .find_all_by_class(ERROR)
            .into_iter()
            .filter(|e| !e.has_flag(Attr::Hidden))
            .collect();
        assert_eq!(visible.len(), 2);
        assert!(form.find_by_id("signup-name").unwrap().get_attr(Attr::AriaInvalid) == Some("true"));

        let calls = seen.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "signup");
        assert_eq!(calls[0].1["valid"], json!(false));
        assert_eq!(calls[0].1["values"]["email"], json!("ada@example.com"));
    }

    #[test]
    fn test_valid_submit_reads_live_values() {
        let mut form = signup();
        let (sandbox, seen) = recording();
        let limits = Limits::default();
        let name = control_path(&form, "signup-name");
        let team = control_path(&form, "signup-team");
        let email = control_path(&form, "signup-email");
        let pro = control_path(&form, "signup-plan-2");
        let terms = control_path(&form, "signup-terms");
        dispatch(&mut form, &name, &Event::Input("Ada".into()), &sandbox, &limits).unwrap();
        dispatch(&mut form, &email, &Event::Input("ada@example.com".into()), &sandbox, &limits).unwrap();
        dispatch(&mut form, &team, &Event::Change(ChangeValue::Value("blue".into())), &sandbox, &limits).unwrap();
        dispatch(&mut form, &pro, &Event::Change(ChangeValue::Checked(true)), &sandbox, &limits).unwrap();
        dispatch(&mut form, &terms, &Event::Change(ChangeValue::Checked(true)), &sandbox, &limits).unwrap();

        let submit = form.path_to(&|el| el.has_class(SUBMIT)).unwrap();
        let outcome = dispatch(&mut form, &submit, &Event::Click, &sandbox, &limits).unwrap();
        let result = outcome.form_result.unwrap();
        assert!(result.valid, "{:?}", result.errors);
        assert_eq!(outcome.focus, None);
        assert_eq!(result.values["team"], json!("blue"));
        assert_eq!(result.values["plan"], json!("pro"));
        assert_eq!(result.values["terms"], json!(true));
        assert_eq!(result.values["age"], json!(""));
        assert!(!form.find_by_id("signup-plan-1").unwrap().has_flag(Attr::Checked));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_blur_mode_validates_single_field() {
        let mut form = signup();
        let (sandbox, _) = recording();
        let limits = Limits::default();
        let age = control_path(&form, "signup-age");
        dispatch(&mut form, &age, &Event::Input("7".into()), &sandbox, &limits).unwrap();
        let field = form.find(&|el| el.get_attr(Attr::DataField) == Some("age")).unwrap();
        assert!(field.has_class(FieldState::Validating.class()));

        dispatch(&mut form, &age, &Event::Blur, &sandbox, &limits).unwrap();
        let field = form.find(&|el| el.get_attr(Attr::DataField) == Some("age")).unwrap();
        assert!(field.has_class(FieldState::Invalid.class()));
        assert_eq!(field.find_all_by_class(ERROR)[0].text_content(), "Age must be between 18 and 99.");
        let name = form.find(&|el| el.get_attr(Attr::DataField) == Some("name")).unwrap();
        assert!(name.has_class(FieldState::Untouched.class()));
    }

    #[test]
    fn test_cancel_is_gated() {
        let mut form = signup();
        let seen = Rc::new(RefCell::new(0));
        let sink = seen.clone();
        let sandbox = ActionSandbox::new(
            ActionPolicy::allow_list(["signup"]),
            Some(Rc::new(move |_: &str, _: &ActionEvent, _: &Value| *sink.borrow_mut() += 1)),
        );
        let cancel = form.path_to(&|el| el.has_class(CANCEL)).unwrap();
        let outcome = dispatch(&mut form, &cancel, &Event::Click, &sandbox, &Limits::default()).unwrap();
        assert_eq!(outcome.actions, vec![("cancel".to_string(), ActionOutcome::Blocked)]);
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn test_labels_are_text_only() {
        let form = render(json!({
            "type": "form",
            "fields": [{"name": "x\"><script>", "label": "<img src=x onerror=alert(1)>"}]
        }))
        .and_then(Node::into_element)
        .unwrap();
        let html = form.to_html();
        assert!(!html.contains("<img"));
        assert!(!html.contains("<script"));
        assert!(form.find(&|el| el.get_attr(Attr::DataField) == Some("xscript")).is_some());
    }
}

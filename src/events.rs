//! Node-owned event wiring.
//!
//! Interactive renderers attach [`Listener`]s to the element whose subtree
//! they manage. There is no central listener registry: dropping a subtree
//! drops its behavior with it. [`dispatch`] delivers one user event to a
//! target path, applies the default control behavior, then bubbles it up
//! through the target's ancestors.

use crate::action::{ActionEvent, ActionOutcome, ActionSandbox, Trigger};
use crate::dom::{Attr, Element, Node};
use crate::error::{PageError, PageResult};
use crate::limits::Limits;
use crate::renderers::{faq, form, tabs};
use crate::validation::{FormResult, FormSpec};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
    Space,
    Escape,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeValue {
    Checked(bool),
    Value(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Click,
    KeyDown(Key),
    /// Text entry; carries the control's new value.
    Input(String),
    Change(ChangeValue),
    Blur,
    Submit,
}

/// Behavior registered on an element at construction time.
#[derive(Debug, Clone, PartialEq)]
pub enum Listener {
    /// Declarative intent fired on click through the action sandbox.
    Action { name: String, payload: Value },
    /// FAQ entry: toggles its own panel.
    Disclosure,
    /// Tab set: click selection and roving keyboard navigation.
    Tabs,
    /// Form: live validation, submit interception, cancel.
    Form(Box<FormSpec>),
    /// Copy button: writes the captured text to the clipboard.
    CopyText(String),
}

/// Side effects of one dispatched event, reported back to the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// Absolute path of the element that should receive focus.
    pub focus: Option<Vec<usize>>,
    pub clipboard: Option<String>,
    pub actions: Vec<(String, ActionOutcome)>,
    pub default_prevented: bool,
    pub form_result: Option<FormResult>,
}

/// Per-dispatch state handed to every listener on the bubble path.
pub struct EventCx<'a> {
    pub actions: &'a ActionSandbox,
    pub limits: &'a Limits,
    pub outcome: DispatchOutcome,
}

impl EventCx<'_> {
    pub fn fire(&mut self, name: &str, trigger: Trigger, target_id: Option<&str>, payload: &Value) {
        let event = ActionEvent {
            trigger,
            target_id: target_id.map(str::to_string),
        };
        let outcome = self.actions.dispatch(name, &event, payload);
        self.outcome.actions.push((name.to_string(), outcome));
    }
}

/// Deliver `event` to the element at `path` (relative to `root`).
pub fn dispatch(
    root: &mut Element,
    path: &[usize],
    event: &Event,
    actions: &ActionSandbox,
    limits: &Limits,
) -> PageResult<DispatchOutcome> {
    let target = root
        .at_path_mut(path)
        .ok_or_else(|| PageError::InvalidEventTarget {
            path: path.to_vec(),
        })?;
    if target.has_flag(Attr::Disabled) {
        return Ok(DispatchOutcome::default());
    }
    apply_default(target, event);

    let mut cx = EventCx {
        actions,
        limits,
        outcome: DispatchOutcome::default(),
    };
    let mut abs = Vec::with_capacity(path.len());
    bubble(root, &mut abs, path, event, &mut cx);
    Ok(cx.outcome)
}

fn bubble(el: &mut Element, abs: &mut Vec<usize>, rel: &[usize], event: &Event, cx: &mut EventCx) {
    if let Some((first, rest)) = rel.split_first() {
        if let Some(child) = el.children_mut().get_mut(*first).and_then(Node::as_element_mut) {
            abs.push(*first);
            bubble(child, abs, rest, event, cx);
            abs.pop();
        }
    }
    if el.listeners().is_empty() {
        return;
    }
    let listeners = el.listeners().to_vec();
    for listener in &listeners {
        run_listener(listener, el, abs, rel, event, cx);
    }
}

fn run_listener(
    listener: &Listener,
    el: &mut Element,
    abs: &[usize],
    rel: &[usize],
    event: &Event,
    cx: &mut EventCx,
) {
    match listener {
        Listener::Action { name, payload } => {
            if *event == Event::Click {
                let id = el.id().map(str::to_string);
                cx.fire(name, Trigger::Click, id.as_deref(), payload);
            }
        }
        Listener::Disclosure => faq::handle_event(el, rel, event),
        Listener::Tabs => tabs::handle_event(el, abs, rel, event, cx),
        Listener::Form(spec) => form::handle_event(spec, el, abs, rel, event, cx),
        Listener::CopyText(text) => {
            if *event == Event::Click {
                cx.outcome.clipboard = Some(text.clone());
            }
        }
    }
}

/// What a browser does on its own before any listener runs.
fn apply_default(target: &mut Element, event: &Event) {
    match event {
        Event::Input(value) | Event::Change(ChangeValue::Value(value)) => {
            form::set_control_value(target, value);
        }
        Event::Change(ChangeValue::Checked(on)) => {
            target.set_flag(Attr::Checked, *on);
        }
        _ => {}
    }
}

/// Path (relative to the listener element) of the nearest element on the
/// way to the target, target included, that matches `pred`.
pub fn closest(el: &Element, rel: &[usize], pred: &dyn Fn(&Element) -> bool) -> Option<Vec<usize>> {
    (0..=rel.len())
        .rev()
        .map(|n| &rel[..n])
        .find(|prefix| el.at_path(prefix).map(pred).unwrap_or(false))
        .map(<[usize]>::to_vec)
}

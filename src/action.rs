//! Action sandbox: declared intent names are turned into host callbacks,
//! gated by a configurable policy.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Which declared intents may reach the host callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ActionPolicy {
    #[default]
    AllowAll,
    AllowList { allow: BTreeSet<String> },
    DenyAll,
}

impl ActionPolicy {
    pub fn allow_list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ActionPolicy::AllowList {
            allow: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn permits(&self, name: &str) -> bool {
        match self {
            ActionPolicy::AllowAll => true,
            ActionPolicy::AllowList { allow } => allow.contains(name),
            ActionPolicy::DenyAll => false,
        }
    }
}

/// What the user did to trigger an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    Click,
    Submit,
    Cancel,
}

/// Source event handed to the host callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionEvent {
    pub trigger: Trigger,
    /// Id of the element the listener is registered on, when it has one.
    pub target_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Invoked,
    Blocked,
    NoCallback,
}

/// Host callback: `(action_name, source_event, payload)`.
pub type ActionCallback = Rc<dyn Fn(&str, &ActionEvent, &Value)>;

#[derive(Clone, Default)]
pub struct ActionSandbox {
    policy: ActionPolicy,
    callback: Option<ActionCallback>,
}

impl fmt::Debug for ActionSandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSandbox")
            .field("policy", &self.policy)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl ActionSandbox {
    pub fn new(policy: ActionPolicy, callback: Option<ActionCallback>) -> Self {
        Self { policy, callback }
    }

    pub fn policy(&self) -> &ActionPolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: ActionPolicy) {
        self.policy = policy;
    }

    pub fn set_callback(&mut self, callback: Option<ActionCallback>) {
        self.callback = callback;
    }

    /// Renderers only wire declarative intents when a callback exists.
    pub fn is_wired(&self) -> bool {
        self.callback.is_some()
    }

    /// Route one intent through the policy gate.
    pub fn dispatch(&self, name: &str, event: &ActionEvent, payload: &Value) -> ActionOutcome {
        let Some(callback) = &self.callback else {
            debug!(action = name, "action ignored: no callback");
            return ActionOutcome::NoCallback;
        };
        if name.is_empty() || !self.policy.permits(name) {
            warn!(action = name, policy = ?self.policy, "action blocked by policy");
            return ActionOutcome::Blocked;
        }
        callback(name, event, payload);
        ActionOutcome::Invoked
    }
}

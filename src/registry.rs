//! Renderer registry and dispatch.
//!
//! A type name resolves, in order, to a host custom renderer, a built-in
//! renderer, or a host component-catalog entry. A miss yields `None`; the
//! caller logs it and moves on to the next section.

use crate::action::ActionSandbox;
use crate::dom::{Attr, Element, Node};
use crate::icons::IconSet;
use crate::limits::Limits;
use crate::renderers;
use crate::sanitize::{clamp_text, safe_href, sanitize_action_name, sanitize_identifier};
use crate::section::Section;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Signature shared by built-in and host renderers.
pub type RenderFn = fn(&Section, &RenderChild<'_>, &RenderContext<'_>) -> Option<Node>;

/// Host-registered renderer. Receives normalized data only.
pub type CustomRenderer = Rc<dyn Fn(&Section, &RenderChild<'_>, &RenderContext<'_>) -> Option<Node>>;

/// Read-only bundle shared by every renderer call in one render pass.
pub struct RenderContext<'a> {
    pub limits: &'a Limits,
    pub actions: &'a ActionSandbox,
    pub icons: &'a IconSet,
    pub inject_icons: bool,
    /// Element ids already taken on the page. Renderers reserve theirs
    /// through [`RenderContext::unique_id`].
    pub ids: &'a RefCell<BTreeSet<String>>,
}

impl RenderContext<'_> {
    /// Icon element, honoring the icon-injection policy.
    pub fn icon(&self, name: &str) -> Option<Element> {
        if !self.inject_icons {
            return None;
        }
        self.icons.render(name)
    }

    /// Clamped display text for a dynamic value.
    pub fn text(&self, value: &Value) -> String {
        clamp_text(value, self.limits.max_string_length)
    }

    pub fn href(&self, value: &Value) -> String {
        safe_href(value, self.limits.max_url_length)
    }

    pub fn id(&self, raw: &str, fallback: &str) -> String {
        sanitize_identifier(raw, fallback, self.limits.max_id_length)
    }

    /// Page-unique id built from `raw` (or `fallback`), reserved together
    /// with its `{id}-{derived}` companions.
    pub fn unique_id(&self, raw: &str, fallback: &str, derived: &[&str]) -> String {
        let id = self.id(raw, fallback);
        renderers::unique_id(&mut self.ids.borrow_mut(), id, derived)
    }

    /// Sanitized action name, or `None` when nothing is declared.
    pub fn action_name(&self, value: &Value) -> Option<String> {
        let raw = value.as_str()?;
        let name = sanitize_action_name(raw, self.limits.max_action_length);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Attach a declared intent to `el`. The data attribute is always
    /// written; the listener is only wired when a callback exists.
    pub fn wire_action(&self, el: &mut Element, action: &Value, payload: Value) {
        let Some(name) = self.action_name(action) else {
            return;
        };
        el.set_attr(Attr::DataAction, name.as_str());
        if self.actions.is_wired() {
            el.add_listener(crate::events::Listener::Action { name, payload });
        }
    }
}

/// Bound capability for container renderers to render their children
/// without duplicating dispatch.
pub struct RenderChild<'a> {
    registry: &'a Registry,
}

impl RenderChild<'_> {
    /// Render one already-normalized nested section. Nested output carries
    /// `lp-nested` so its page-level spacing is stripped.
    pub fn render(&self, value: &Value, ctx: &RenderContext<'_>) -> Option<Node> {
        let obj = value.as_object()?;
        let section = Section::from_fields(obj.clone());
        let mut node = self.registry.dispatch(&section, ctx)?;
        if let Node::Element(el) = &mut node {
            el.add_class("lp-nested");
        }
        Some(node)
    }

    /// Render every entry of a nested section list, skipping misses.
    pub fn render_list(&self, list: &Value, ctx: &RenderContext<'_>) -> Vec<Node> {
        list.as_array()
            .map(|items| items.iter().filter_map(|v| self.render(v, ctx)).collect())
            .unwrap_or_default()
    }
}

#[derive(Clone, Default)]
pub struct Registry {
    custom: BTreeMap<String, CustomRenderer>,
    catalog: BTreeMap<String, CustomRenderer>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .field("catalog", &self.catalog.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderer that takes priority over the built-in one for
    /// the exact type name.
    pub fn register(&mut self, kind: impl Into<String>, renderer: CustomRenderer) {
        self.custom.insert(kind.into(), renderer);
    }

    /// Register a fallback used only when neither a custom nor a built-in
    /// renderer exists.
    pub fn register_catalog(&mut self, kind: impl Into<String>, renderer: CustomRenderer) {
        self.catalog.insert(kind.into(), renderer);
    }

    /// Type names the normalizer must accept beyond the built-in set.
    pub fn host_types(&self) -> BTreeSet<String> {
        self.custom.keys().chain(self.catalog.keys()).cloned().collect()
    }

    /// Resolve and run the renderer for `section`.
    pub fn dispatch(&self, section: &Section, ctx: &RenderContext<'_>) -> Option<Node> {
        let kind = section.kind();
        let child = RenderChild { registry: self };
        let node = if let Some(custom) = self.custom.get(kind) {
            custom(section, &child, ctx)
        } else if let Some(builtin) = renderers::builtin(kind) {
            builtin(section, &child, ctx)
        } else if let Some(entry) = self.catalog.get(kind) {
            entry(section, &child, ctx)
        } else {
            debug!(section_type = kind, "no renderer registered");
            return None;
        };

        let Some(mut node) = node else {
            debug!(section_type = kind, "renderer produced nothing");
            return None;
        };
        if let Node::Element(el) = &mut node {
            el.add_class("lp-section");
            el.set_attr(Attr::DataSection, kind);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section(value: Value) -> Section {
        Section::from_fields(value.as_object().cloned().unwrap_or_default())
    }

    fn with_ctx<R>(f: impl FnOnce(&RenderContext<'_>) -> R) -> R {
        let limits = Limits::default();
        let actions = ActionSandbox::default();
        let icons = IconSet::builtin();
        let ids = RefCell::new(BTreeSet::new());
        let ctx = RenderContext {
            limits: &limits,
            actions: &actions,
            icons: &icons,
            inject_icons: true,
            ids: &ids,
        };
        f(&ctx)
    }

    #[test]
    fn test_custom_overrides_builtin() {
        let mut registry = Registry::new();
        registry.register(
            "heading",
            Rc::new(|_: &Section, _: &RenderChild<'_>, _: &RenderContext<'_>| {
                Some(Element::new("aside").text("custom").into())
            }),
        );
        let node = with_ctx(|ctx| registry.dispatch(&section(json!({"type": "heading", "text": "x"})), ctx));
        let el = node.and_then(Node::into_element).unwrap();
        assert_eq!(el.tag(), "aside");
        assert!(el.has_class("lp-section"));
        assert_eq!(el.get_attr(Attr::DataSection), Some("heading"));
    }

    #[test]
    fn test_catalog_is_last_resort() {
        let mut registry = Registry::new();
        let catalog: CustomRenderer = Rc::new(|_: &Section, _: &RenderChild<'_>, _: &RenderContext<'_>| {
            Some(Element::new("div").text("catalog").into())
        });
        registry.register_catalog("heading", catalog.clone());
        registry.register_catalog("pricing", catalog);

        let builtin = with_ctx(|ctx| registry.dispatch(&section(json!({"type": "heading", "text": "x"})), ctx));
        assert_ne!(builtin.map(|n| n.text_content()), Some("catalog".to_string()));

        let fallback = with_ctx(|ctx| registry.dispatch(&section(json!({"type": "pricing"})), ctx));
        assert_eq!(fallback.map(|n| n.text_content()), Some("catalog".to_string()));
        assert!(registry.host_types().contains("pricing"));
    }

    #[test]
    fn test_unknown_type_yields_none() {
        let registry = Registry::new();
        let node = with_ctx(|ctx| registry.dispatch(&section(json!({"type": "marquee"})), ctx));
        assert!(node.is_none());
    }

    #[test]
    fn test_icons_respect_policy() {
        let limits = Limits::default();
        let actions = ActionSandbox::default();
        let icons = IconSet::builtin();
        let ids = RefCell::new(BTreeSet::new());
        let ctx = RenderContext {
            limits: &limits,
            actions: &actions,
            icons: &icons,
            inject_icons: false,
            ids: &ids,
        };
        assert!(ctx.icon("check").is_none());
    }

    #[test]
    fn test_unique_id_is_shared_across_calls() {
        with_ctx(|ctx| {
            assert_eq!(ctx.unique_id("", "faq-1", &["panel"]), "faq-1");
            assert_eq!(ctx.unique_id("faq-1", "x", &["panel"]), "faq-1-2");
            assert!(ctx.ids.borrow().contains("faq-1-2-panel"));
        });
    }

    #[test]
    fn test_action_unwired_without_callback() {
        with_ctx(|ctx| {
            let mut el = Element::new("a");
            ctx.wire_action(&mut el, &json!("open modal"), Value::Null);
            assert_eq!(el.get_attr(Attr::DataAction), Some("open_modal"));
            assert!(el.listeners().is_empty());
        });
    }
}

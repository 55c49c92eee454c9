//! Built-in section renderers.
//!
//! Every renderer builds output nodes from normalized data using text nodes
//! and the closed attribute vocabulary only. Class names come from fixed
//! `lp-` lookups; caller strings never pick a class, tag or attribute name.

pub mod basic;
pub mod code;
pub mod collections;
pub mod containers;
pub mod faq;
pub mod form;
pub mod media;
pub mod table;
pub mod tabs;

use crate::dom::{Attr, Element, Node};
use crate::registry::{RenderContext, RenderFn};
use crate::section::{item_opt_str, Section};
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Built-in renderer for `kind`, if the type is part of the closed set.
pub fn builtin(kind: &str) -> Option<RenderFn> {
    let f: RenderFn = match kind {
        "hero" => basic::hero,
        "heading" => basic::heading,
        "text" => basic::text,
        "divider" => basic::divider,
        "quote" => basic::quote,
        "cta" => basic::cta,
        "callout" => basic::callout,
        "image-text" => basic::image_text,
        "feature-grid" => collections::feature_grid,
        "stat-row" => collections::stat_row,
        "steps" => collections::steps,
        "timeline" => collections::timeline,
        "list" => collections::list,
        "comparison-table" => table::comparison_table,
        "faq" => faq::faq,
        "tabset" => tabs::tabset,
        "form" => form::form,
        "card" => containers::card,
        "stack" => containers::stack,
        "columns" => containers::columns,
        "code" => code::code,
        "media-block" => media::media_block,
        _ => return None,
    };
    Some(f)
}

// ─── Shared builders ─────────────────────────────────────────────────────

pub(crate) fn heading_tag(level: u8) -> &'static str {
    match level {
        1 => "h1",
        2 => "h2",
        3 => "h3",
        _ => "h4",
    }
}

/// Optional section heading + subheading block.
pub(crate) fn section_header(section: &Section) -> Option<Element> {
    let heading = section.opt_str("heading");
    let subheading = section.opt_str("subheading");
    if heading.is_none() && subheading.is_none() {
        return None;
    }
    let mut header = Element::with_class("header", "lp-section-header");
    if let Some(label) = section.opt_str("label") {
        header.push(Element::with_class("span", "lp-label").text(label));
    }
    if let Some(text) = heading {
        header.push(Element::new("h2").text(text));
    }
    if let Some(text) = subheading {
        header.push(Element::with_class("p", "lp-muted").text(text));
    }
    Some(header)
}

/// Paragraphs split on blank lines.
pub(crate) fn paragraphs(text: &str) -> Vec<Node> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| Element::new("p").text(p).into())
        .collect()
}

/// Link-styled button for `{text, url, action, variant}`. The href is always
/// sanitized and always present.
pub(crate) fn link_button(item: &Value, ctx: &RenderContext<'_>, secondary: bool) -> Option<Element> {
    let label = ctx.text(item.get("text").unwrap_or(&Value::Null));
    if label.trim().is_empty() {
        return None;
    }
    let href = ctx.href(item.get("url").unwrap_or(&Value::Null));
    let variant = match item_opt_str(item, "variant") {
        Some("primary") => false,
        Some("secondary") | Some("ghost") | Some("outline") => true,
        _ => secondary,
    };
    let mut el = Element::with_class("a", "lp-button").attr(Attr::Href, href.as_str());
    if variant {
        el.add_class("lp-button--secondary");
    }
    if href.starts_with("http") {
        el.set_attr(Attr::Rel, "noopener noreferrer");
    }
    el.push_text(&label);
    ctx.wire_action(
        &mut el,
        item.get("action").unwrap_or(&Value::Null),
        json!({ "href": href }),
    );
    Some(el)
}

/// Reserve `id`, suffixing it until neither it nor any `{id}-{derived}`
/// companion is taken. Companions are reserved along with it.
pub(crate) fn unique_id(used: &mut BTreeSet<String>, id: String, derived: &[&str]) -> String {
    let free = |used: &BTreeSet<String>, candidate: &str| {
        !used.contains(candidate) && derived.iter().all(|d| !used.contains(&format!("{candidate}-{d}")))
    };
    let mut candidate = id.clone();
    let mut n = 2;
    while !free(used, &candidate) {
        candidate = format!("{}-{}", id, n);
        n += 1;
    }
    for d in derived {
        used.insert(format!("{candidate}-{d}"));
    }
    used.insert(candidate.clone());
    candidate
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::action::ActionSandbox;
    use crate::dom::Node;
    use crate::icons::IconSet;
    use crate::limits::Limits;
    use crate::normalize::normalize_section;
    use crate::registry::{RenderContext, Registry};
    use serde_json::Value;
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    /// Normalize and render one section description with default settings.
    pub fn render(value: Value) -> Option<Node> {
        render_with(value, &ActionSandbox::default(), true)
    }

    pub fn render_with(value: Value, actions: &ActionSandbox, inject_icons: bool) -> Option<Node> {
        let limits = Limits::default();
        let section = normalize_section(&value, &limits, &BTreeSet::new())?;
        let icons = IconSet::builtin();
        let ids = RefCell::new(BTreeSet::new());
        let ctx = RenderContext {
            limits: &limits,
            actions,
            icons: &icons,
            inject_icons,
            ids: &ids,
        };
        Registry::new().dispatch(&section, &ctx)
    }
}

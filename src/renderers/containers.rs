use super::{link_button, paragraphs};
use crate::dom::{Element, Node};
use crate::registry::{RenderChild, RenderContext};
use crate::section::Section;
use serde_json::Value;

pub fn card(section: &Section, child: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let mut root = Element::with_class("div", "lp-card");
    if let Some(icon) = section.opt_str("icon").and_then(|name| ctx.icon(name)) {
        root.push(icon);
    }
    if let Some(title) = section.opt_str("title").or(section.opt_str("heading")) {
        root.push(Element::new("h3").text(title));
    }
    if let Some(text) = section.opt_str("text") {
        root = root.children_from(paragraphs(text));
    }
    let nested = child.render_list(section.get("sections"), ctx);
    if !nested.is_empty() {
        root.push(Element::with_class("div", "lp-stack").children_from(nested));
    }
    if let Some(button) = link_button(section.get("cta"), ctx, false) {
        root.push(button);
    }
    if root.children().is_empty() {
        return None;
    }
    Some(root.into())
}

pub fn stack(section: &Section, child: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let nested = child.render_list(section.get("sections"), ctx);
    if nested.is_empty() {
        return None;
    }
    Some(Element::with_class("div", "lp-stack").children_from(nested).into())
}

pub fn columns(section: &Section, child: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let columns = section.array("columns");
    if columns.is_empty() {
        return None;
    }
    let class = match columns.len() {
        1 | 2 => "lp-grid--2",
        3 => "lp-grid--3",
        _ => "lp-grid--4",
    };
    let mut grid = Element::with_class("div", "lp-grid lp-columns").class(class);
    for column in columns {
        let list = match column {
            Value::Array(_) => column,
            _ => column.get("sections").unwrap_or(&Value::Null),
        };
        grid.push(Element::with_class("div", "lp-column lp-stack").children_from(child.render_list(list, ctx)));
    }
    Some(grid.into())
}

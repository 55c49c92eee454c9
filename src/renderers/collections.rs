use super::section_header;
use crate::dom::{Attr, Element, Node};
use crate::registry::{RenderChild, RenderContext};
use crate::sanitize::{clamp_str, value_to_text};
use crate::section::Section;
use serde_json::Value;

static NULL: Value = Value::Null;

fn field<'v>(item: &'v Value, key: &str) -> &'v Value {
    item.get(key).unwrap_or(&NULL)
}

fn grid_class(columns: usize) -> &'static str {
    match columns {
        0..=2 => "lp-grid--2",
        3 => "lp-grid--3",
        _ => "lp-grid--4",
    }
}

/// Section wrapper with the optional header already attached.
fn shell(class: &str, section: &Section) -> Element {
    let mut root = Element::with_class("section", class);
    if let Some(header) = section_header(section) {
        root.push(header);
    }
    root
}

pub fn feature_grid(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let items = section.array("items");
    if items.is_empty() {
        return None;
    }
    let columns = section
        .f64("columns")
        .filter(|n| n.is_finite() && *n >= 1.0)
        .map(|n| n as usize)
        .unwrap_or(3)
        .clamp(2, ctx.limits.max_columns.max(2));
    let mut grid = Element::with_class("div", "lp-grid").class(grid_class(columns));
    for item in items {
        let (title, text) = match item {
            Value::String(_) => (ctx.text(item), String::new()),
            _ => (ctx.text(field(item, "title")), ctx.text(field(item, "text"))),
        };
        if title.trim().is_empty() && text.trim().is_empty() {
            continue;
        }
        let mut card = Element::with_class("div", "lp-card lp-feature");
        if let Some(icon) = item.get("icon").and_then(Value::as_str).and_then(|name| ctx.icon(name)) {
            card.push(icon);
        }
        if !title.trim().is_empty() {
            card.push(Element::new("h3").text(&title));
        }
        if !text.trim().is_empty() {
            card.push(Element::with_class("p", "lp-muted").text(&text));
        }
        grid.push(card);
    }
    if grid.children().is_empty() {
        return None;
    }
    Some(shell("lp-feature-grid", section).child(grid).into())
}

pub fn stat_row(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let items = section.array("items");
    if items.is_empty() {
        return None;
    }
    let columns = items.len().clamp(2, 4);
    let mut grid = Element::with_class("div", "lp-grid").class(grid_class(columns));
    for item in items {
        let value = clamp_str(&value_to_text(field(item, "value")), ctx.limits.max_string_length);
        let label = ctx.text(field(item, "label"));
        if value.is_empty() && label.is_empty() {
            continue;
        }
        let mut stat = Element::with_class("div", "lp-stat");
        stat.push(Element::with_class("span", "lp-stat-value").text(&value));
        if !label.is_empty() {
            stat.push(Element::with_class("span", "lp-muted").text(&label));
        }
        let (trend_class, icon) = match item.get("trend").and_then(Value::as_str) {
            Some("up") => ("lp-trend--up", "trending-up"),
            Some("down") => ("lp-trend--down", "trending-down"),
            _ => ("", ""),
        };
        if !trend_class.is_empty() {
            stat.add_class(trend_class);
            if let Some(svg) = ctx.icon(icon) {
                stat.push(svg);
            }
        }
        grid.push(stat);
    }
    if grid.children().is_empty() {
        return None;
    }
    Some(shell("lp-stat-row", section).child(grid).into())
}

fn ordered_entries(
    section: &Section,
    ctx: &RenderContext<'_>,
    class: &'static str,
    numbered: bool,
) -> Option<Node> {
    let items = section.array("items");
    if items.is_empty() {
        return None;
    }
    let mut list = Element::with_class("ol", class);
    for (i, item) in items.iter().enumerate() {
        let (title, text) = match item {
            Value::String(_) => (ctx.text(item), String::new()),
            _ => (ctx.text(field(item, "title")), ctx.text(field(item, "text"))),
        };
        if title.trim().is_empty() && text.trim().is_empty() {
            continue;
        }
        let mut entry = Element::with_class("li", "lp-entry");
        if numbered {
            entry.push(
                Element::with_class("span", "lp-step-number")
                    .attr(Attr::AriaHidden, "true")
                    .text(&(i + 1).to_string()),
            );
        } else {
            let date = ctx.text(field(item, "date"));
            if !date.trim().is_empty() {
                entry.push(Element::with_class("span", "lp-label").text(&date));
            }
        }
        if !title.trim().is_empty() {
            entry.push(Element::new("h3").text(&title));
        }
        if !text.trim().is_empty() {
            entry.push(Element::with_class("p", "lp-muted").text(&text));
        }
        list.push(entry);
    }
    if list.children().is_empty() {
        return None;
    }
    let wrapper = if numbered { "lp-steps-section" } else { "lp-timeline-section" };
    Some(shell(wrapper, section).child(list).into())
}

pub fn steps(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    ordered_entries(section, ctx, "lp-steps", true)
}

pub fn timeline(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    ordered_entries(section, ctx, "lp-timeline", false)
}

pub fn list(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let items = section.array("items");
    if items.is_empty() {
        return None;
    }
    let tag = if section.bool("ordered") { "ol" } else { "ul" };
    let mut list = Element::with_class(tag, "lp-list");
    for item in items {
        let text = match item {
            Value::Object(_) => ctx.text(field(item, "text")),
            _ => ctx.text(item),
        };
        if !text.trim().is_empty() {
            list.push(Element::new("li").text(&text));
        }
    }
    if list.children().is_empty() {
        return None;
    }
    Some(shell("lp-list-section", section).child(list).into())
}

use super::section_header;
use crate::dom::{Attr, Element, Node};
use crate::registry::{RenderChild, RenderContext};
use crate::sanitize::{clamp_str, value_to_text};
use crate::section::Section;
use serde_json::Value;

/// Cell glyph convention. Only these exact literals become glyphs; any
/// other value, `"TRUE"` and `1` included, renders as plain text.
#[derive(Debug, PartialEq, Eq)]
enum Cell {
    Check,
    Cross,
    Text(String),
}

fn classify(raw: String) -> Cell {
    match raw.as_str() {
        "true" | "✔" => Cell::Check,
        "false" | "✘" => Cell::Cross,
        _ => Cell::Text(raw),
    }
}

fn cell_node(cell: Cell) -> Element {
    match cell {
        Cell::Check => Element::with_class("span", "lp-check")
            .attr(Attr::Role, "img")
            .attr(Attr::AriaLabel, "Yes")
            .text("✔"),
        Cell::Cross => Element::with_class("span", "lp-cross")
            .attr(Attr::Role, "img")
            .attr(Attr::AriaLabel, "No")
            .text("✘"),
        Cell::Text(text) => Element::new("span").text(&text),
    }
}

pub fn comparison_table(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let max = ctx.limits.max_string_length;
    let columns: Vec<String> = section
        .array("columns")
        .iter()
        .map(|c| clamp_str(&value_to_text(c), max))
        .collect();
    let rows = section.array("rows");
    if columns.is_empty() && rows.is_empty() {
        return None;
    }

    let mut table = Element::with_class("table", "lp-table");
    if !columns.is_empty() {
        let mut head_row = Element::new("tr");
        for column in &columns {
            head_row.push(Element::new("th").attr(Attr::Scope, "col").text(column));
        }
        table.push(Element::new("thead").child(head_row));
    }

    let mut body = Element::new("tbody");
    for row in rows {
        let cells: Vec<String> = match row {
            Value::Array(cells) => cells.iter().map(value_to_text).collect(),
            Value::Object(record) => columns
                .iter()
                .map(|c| record.get(c).map(value_to_text).unwrap_or_default())
                .collect(),
            _ => continue,
        };
        let mut tr = Element::new("tr");
        for (i, raw) in cells.into_iter().enumerate() {
            let cell = classify(clamp_str(&raw, max));
            let td = if i == 0 {
                Element::new("th").attr(Attr::Scope, "row")
            } else {
                Element::new("td")
            };
            tr.push(td.child(cell_node(cell)));
        }
        body.push(tr);
    }
    table.push(body);

    let mut root = Element::with_class("section", "lp-comparison");
    if let Some(header) = section_header(section) {
        root.push(header);
    }
    root.push(Element::with_class("div", "lp-table-wrap").child(table));
    Some(root.into())
}

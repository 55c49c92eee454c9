//! Tab set. One panel visible at a time; keyboard navigation moves focus
//! and selection together. Selection only flips attributes, so panels are
//! never rebuilt.

use crate::dom::{Attr, Element, Node};
use crate::events::{Event, EventCx, Key, Listener};
use crate::registry::{RenderChild, RenderContext};
use crate::section::{item_str, Section};
use serde_json::Value;

pub fn tabset(section: &Section, child: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let mut tablist = Element::with_class("div", "lp-tablist")
        .attr(Attr::Role, "tablist")
        .attr(Attr::AriaOrientation, "horizontal");
    let mut panels = Vec::new();

    for (i, tab) in section.array("tabs").iter().enumerate() {
        let label = ctx.text(tab.get("label").unwrap_or(&Value::Null));
        if label.trim().is_empty() {
            continue;
        }
        let fallback = format!("tab-{}", i + 1);
        let id = ctx.unique_id(item_str(tab, "id"), &fallback, &["panel"]);
        let panel_id = format!("{id}-panel");
        let selected = panels.is_empty();

        tablist.push(
            Element::with_class("button", "lp-tab")
                .attr(Attr::Type, "button")
                .attr(Attr::Role, "tab")
                .attr(Attr::Id, id.as_str())
                .attr(Attr::DataTab, id.as_str())
                .attr(Attr::AriaControls, panel_id.as_str())
                .attr(Attr::AriaSelected, if selected { "true" } else { "false" })
                .attr(Attr::TabIndex, if selected { "0" } else { "-1" })
                .text(&label),
        );
        panels.push(
            Element::with_class("div", "lp-tab-panel")
                .attr(Attr::Role, "tabpanel")
                .attr(Attr::Id, panel_id)
                .attr(Attr::AriaLabelledBy, id)
                .attr(Attr::TabIndex, "0")
                .flag(Attr::Hidden, !selected)
                .children_from(child.render_list(tab.get("sections").unwrap_or(&Value::Null), ctx)),
        );
    }
    if panels.is_empty() {
        return None;
    }

    let mut root = Element::with_class("div", "lp-tabs")
        .child(tablist)
        .on(Listener::Tabs);
    for panel in panels {
        root.push(panel);
    }
    Some(root.into())
}

fn tab_count(root: &Element) -> usize {
    root.children()
        .first()
        .and_then(Node::as_element)
        .map(|list| list.child_elements().count())
        .unwrap_or(0)
}

/// Index of the selected tab.
pub fn selected(root: &Element) -> Option<usize> {
    let list = root.children().first()?.as_element()?;
    list.child_elements()
        .position(|tab| tab.get_attr(Attr::AriaSelected) == Some("true"))
}

/// Select tab `index`: flips `aria-selected`, roving `tabindex` and panel
/// visibility in one pass.
pub fn select(root: &mut Element, index: usize) {
    let children = root.children_mut();
    if let Some(Node::Element(list)) = children.first_mut() {
        for (i, node) in list.children_mut().iter_mut().enumerate() {
            if let Node::Element(tab) = node {
                let on = i == index;
                tab.set_attr(Attr::AriaSelected, if on { "true" } else { "false" });
                tab.set_attr(Attr::TabIndex, if on { "0" } else { "-1" });
            }
        }
    }
    for (i, node) in children.iter_mut().skip(1).enumerate() {
        if let Node::Element(panel) = node {
            panel.set_flag(Attr::Hidden, i != index);
        }
    }
}

pub fn handle_event(root: &mut Element, abs: &[usize], rel: &[usize], event: &Event, cx: &mut EventCx) {
    // Only events from a tab button: path [0 (tablist), i, ..].
    let (Some(0), Some(&current)) = (rel.first().copied(), rel.get(1)) else {
        return;
    };
    let count = tab_count(root);
    if current >= count {
        return;
    }
    let next = match event {
        Event::Click => current,
        Event::KeyDown(key) => match key {
            Key::ArrowRight | Key::ArrowDown => (current + 1) % count,
            Key::ArrowLeft | Key::ArrowUp => (current + count - 1) % count,
            Key::Home => 0,
            Key::End => count - 1,
            _ => return,
        },
        _ => return,
    };
    if matches!(event, Event::KeyDown(_)) {
        cx.outcome.default_prevented = true;
    }
    select(root, next);
    let mut focus = abs.to_vec();
    focus.extend([0, next]);
    cx.outcome.focus = Some(focus);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionSandbox;
    use crate::events::dispatch;
    use crate::limits::Limits;
    use crate::renderers::test_support::render;
    use serde_json::json;

    fn render_tabs() -> Element {
        render(json!({
            "type": "tabset",
            "tabs": [
                {"id": "one", "label": "One", "sections": [{"type": "heading", "text": "First"}]},
                {"id": "one", "label": "Two", "sections": [{"type": "text", "body": "Second"}]},
                {"label": "Three", "sections": []}
            ]
        }))
        .and_then(Node::into_element)
        .unwrap()
    }

    fn visible_panels(root: &Element) -> Vec<usize> {
        root.children()
            .iter()
            .skip(1)
            .enumerate()
            .filter(|(_, n)| n.as_element().map(|p| !p.has_flag(Attr::Hidden)).unwrap_or(false))
            .map(|(i, _)| i)
            .collect()
    }

    fn key(root: &mut Element, tab: usize, key: Key) -> Option<Vec<usize>> {
        dispatch(root, &[0, tab], &Event::KeyDown(key), &ActionSandbox::default(), &Limits::default())
            .unwrap()
            .focus
    }

    #[test]
    fn test_first_tab_selected_and_ids_unique() {
        let root = render_tabs();
        assert_eq!(selected(&root), Some(0));
        assert_eq!(visible_panels(&root), vec![0]);
        assert!(root.find_by_id("one-2").is_some());
        assert!(root.find_by_id("tab-3").is_some());
        assert_eq!(
            root.find_by_id("one-2").unwrap().get_attr(Attr::AriaControls),
            Some("one-2-panel")
        );
    }

    #[test]
    fn test_keyboard_moves_focus_and_selection() {
        let mut root = render_tabs();
        assert_eq!(key(&mut root, 0, Key::ArrowRight), Some(vec![0, 1]));
        assert_eq!(selected(&root), Some(1));
        assert_eq!(visible_panels(&root), vec![1]);

        assert_eq!(key(&mut root, 1, Key::End), Some(vec![0, 2]));
        assert_eq!(key(&mut root, 2, Key::ArrowRight), Some(vec![0, 0]));
        assert_eq!(key(&mut root, 0, Key::ArrowLeft), Some(vec![0, 2]));
        assert_eq!(key(&mut root, 2, Key::Home), Some(vec![0, 0]));
        assert_eq!(visible_panels(&root), vec![0]);
        assert_eq!(key(&mut root, 0, Key::Escape), None);
    }

    #[test]
    fn test_click_selects_without_rebuilding_panels() {
        let mut root = render_tabs();
        let before = root.children()[1].clone();
        dispatch(&mut root, &[0, 2], &Event::Click, &ActionSandbox::default(), &Limits::default()).unwrap();
        assert_eq!(selected(&root), Some(2));
        let tab = root.at_path(&[0, 2]).unwrap();
        assert_eq!(tab.get_attr(Attr::TabIndex), Some("0"));
        let mut after = root.children()[1].clone();
        if let Node::Element(panel) = &mut after {
            panel.set_flag(Attr::Hidden, false);
        }
        assert_eq!(before, after);
    }

    #[test]
    fn test_panel_clicks_ignored() {
        let mut root = render_tabs();
        dispatch(&mut root, &[1], &Event::Click, &ActionSandbox::default(), &Limits::default()).unwrap();
        assert_eq!(selected(&root), Some(0));
    }
}

//! FAQ disclosures. Each entry owns its own toggle listener, so open state
//! is local to that entry.

use super::{paragraphs, section_header};
use crate::dom::{Attr, Element, Node};
use crate::events::{closest, Event, Listener};
use crate::registry::{RenderChild, RenderContext};
use crate::section::{item_str, Section};

const TRIGGER: &str = "lp-faq-trigger";
const PANEL: &str = "lp-faq-panel";

pub fn faq(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let mut list = Element::with_class("div", "lp-faq-list");
    for (i, item) in section.array("items").iter().enumerate() {
        let question = ctx.text(item.get("question").unwrap_or(&serde_json::Value::Null));
        if question.trim().is_empty() {
            continue;
        }
        let answer = ctx.text(item.get("answer").unwrap_or(&serde_json::Value::Null));
        let fallback = format!("faq-{}", i + 1);
        let id = ctx.unique_id(item_str(item, "id"), &fallback, &["trigger", "panel"]);
        let open = item.get("open").and_then(serde_json::Value::as_bool).unwrap_or(false);
        list.push(entry(&id, &question, &answer, open));
    }
    if list.children().is_empty() {
        return None;
    }
    let mut root = Element::with_class("section", "lp-faq");
    if let Some(header) = section_header(section) {
        root.push(header);
    }
    root.push(list);
    Some(root.into())
}

fn entry(id: &str, question: &str, answer: &str, open: bool) -> Element {
    let trigger_id = format!("{id}-trigger");
    let panel_id = format!("{id}-panel");
    let trigger = Element::with_class("button", TRIGGER)
        .attr(Attr::Type, "button")
        .attr(Attr::Id, trigger_id.as_str())
        .attr(Attr::AriaExpanded, if open { "true" } else { "false" })
        .attr(Attr::AriaControls, panel_id.as_str())
        .text(question);
    let panel = Element::with_class("div", PANEL)
        .attr(Attr::Id, panel_id)
        .attr(Attr::Role, "region")
        .attr(Attr::AriaLabelledBy, trigger_id)
        .flag(Attr::Hidden, !open)
        .children_from(paragraphs(answer));
    Element::with_class("div", "lp-faq-item")
        .attr(Attr::Id, id)
        .child(Element::new("h3").child(trigger))
        .child(panel)
        .on(Listener::Disclosure)
}

/// Toggle the entry when its trigger (or anything inside it) is clicked.
pub fn handle_event(item: &mut Element, rel: &[usize], event: &Event) {
    if *event != Event::Click {
        return;
    }
    if closest(item, rel, &|el| el.has_class(TRIGGER)).is_none() {
        return;
    }
    set_open(item, !is_open(item));
}

pub fn is_open(item: &Element) -> bool {
    item.find(&|el| el.has_class(TRIGGER))
        .and_then(|t| t.get_attr(Attr::AriaExpanded))
        == Some("true")
}

fn set_open(item: &mut Element, open: bool) {
    item.walk_mut(&mut |el| {
        if el.has_class(TRIGGER) {
            el.set_attr(Attr::AriaExpanded, if open { "true" } else { "false" });
        } else if el.has_class(PANEL) {
            el.set_flag(Attr::Hidden, !open);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionSandbox;
    use crate::events::dispatch;
    use crate::limits::Limits;
    use crate::renderers::test_support::render;
    use serde_json::json;

    fn render_faq() -> Element {
        render(json!({
            "type": "faq",
            "items": [
                {"id": "\"><x", "question": "First?", "answer": "Yes."},
                {"id": "same", "question": "Second?", "answer": "No."},
                {"id": "same", "question": "Third?", "answer": "Maybe."},
                {"question": "", "answer": "dropped"}
            ]
        }))
        .and_then(Node::into_element)
        .unwrap()
    }

    fn item_paths(root: &Element) -> Vec<Vec<usize>> {
        let mut paths = Vec::new();
        for id in ["x", "same", "same-2"] {
            paths.push(root.path_to(&|e| e.id() == Some(id)).unwrap());
        }
        paths
    }

    #[test]
    fn test_ids_sanitized_and_unique() {
        let root = render_faq();
        assert_eq!(root.find_all_by_class("lp-faq-item").len(), 3);
        assert!(root.find_by_id("x-panel").is_some());
        assert!(root.find_by_id("same-2-trigger").is_some());
        let trigger = root.find_by_id("same-trigger").unwrap();
        assert_eq!(trigger.get_attr(Attr::AriaControls), Some("same-panel"));
    }

    #[test]
    fn test_toggle_is_local_to_entry() {
        let mut root = render_faq();
        let paths = item_paths(&root);
        let mut trigger_path = paths[1].clone();
        trigger_path.extend([0, 0]);

        dispatch(&mut root, &trigger_path, &Event::Click, &ActionSandbox::default(), &Limits::default()).unwrap();
        assert!(is_open(root.at_path(&paths[1]).unwrap()));
        assert!(!is_open(root.at_path(&paths[0]).unwrap()));
        assert!(!root.find_by_id("same-panel").unwrap().has_flag(Attr::Hidden));
        assert!(root.find_by_id("x-panel").unwrap().has_flag(Attr::Hidden));

        dispatch(&mut root, &trigger_path, &Event::Click, &ActionSandbox::default(), &Limits::default()).unwrap();
        assert!(!is_open(root.at_path(&paths[1]).unwrap()));
    }

    #[test]
    fn test_click_on_panel_does_not_toggle() {
        let mut root = render_faq();
        let mut panel_path = item_paths(&root)[0].clone();
        panel_path.push(1);
        dispatch(&mut root, &panel_path, &Event::Click, &ActionSandbox::default(), &Limits::default()).unwrap();
        assert!(root.find_by_id("x-panel").unwrap().has_flag(Attr::Hidden));
    }
}

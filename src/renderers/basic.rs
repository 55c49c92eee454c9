use super::{heading_tag, link_button, paragraphs, section_header};
use crate::dom::{Attr, Element, Node};
use crate::registry::{RenderChild, RenderContext};
use crate::sanitize::sanitize_url;
use crate::section::Section;

pub fn hero(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let mut root = Element::with_class("section", "lp-hero");
    if section.str("align") == "center" {
        root.add_class("lp-hero--center");
    }
    let mut body = Element::with_class("div", "lp-hero-body");
    if let Some(label) = section.opt_str("label") {
        body.push(Element::with_class("span", "lp-label").text(label));
    }
    if let Some(heading) = section.opt_str("heading") {
        body.push(Element::new("h1").text(heading));
    }
    if let Some(sub) = section.opt_str("subheading") {
        body.push(Element::with_class("p", "lp-muted lp-lead").text(sub));
    }

    let mut actions = Element::with_class("div", "lp-actions");
    if let Some(button) = link_button(section.get("cta"), ctx, false) {
        actions.push(button);
    }
    if let Some(button) = link_button(section.get("secondaryCta"), ctx, true) {
        actions.push(button);
    }
    if !actions.children().is_empty() {
        body.push(actions);
    }
    root.push(body);

    let src = sanitize_url(section.get("image"), ctx.limits.max_url_length);
    if !src.is_empty() {
        let alt = section.opt_str("alt").or(section.opt_str("heading")).unwrap_or("");
        root.push(
            Element::with_class("img", "lp-hero-image")
                .attr(Attr::Src, src)
                .attr(Attr::Alt, alt)
                .attr(Attr::Loading, "lazy"),
        );
    }
    Some(root.into())
}

pub fn heading(section: &Section, _: &RenderChild<'_>, _: &RenderContext<'_>) -> Option<Node> {
    let text = section.opt_str("text")?;
    let level = section
        .f64("level")
        .filter(|n| n.is_finite())
        .map(|n| n.round().clamp(1.0, 3.0) as u8)
        .unwrap_or(2);
    let mut root = Element::with_class("div", "lp-heading");
    root.push(Element::new(heading_tag(level)).text(text));
    if let Some(sub) = section.opt_str("subheading") {
        root.push(Element::with_class("p", "lp-muted").text(sub));
    }
    Some(root.into())
}

pub fn text(section: &Section, _: &RenderChild<'_>, _: &RenderContext<'_>) -> Option<Node> {
    let body = section.opt_str("body").or(section.opt_str("text"))?;
    let mut root = Element::with_class("div", "lp-text");
    if let Some(heading) = section.opt_str("heading") {
        root.push(Element::new("h2").text(heading));
    }
    Some(root.children_from(paragraphs(body)).into())
}

pub fn divider(section: &Section, _: &RenderChild<'_>, _: &RenderContext<'_>) -> Option<Node> {
    match section.opt_str("label") {
        None => Some(Element::with_class("hr", "lp-divider").into()),
        Some(label) => Some(
            Element::with_class("div", "lp-divider-labeled")
                .attr(Attr::Role, "separator")
                .attr(Attr::AriaLabel, label)
                .child(Element::with_class("span", "lp-muted").text(label))
                .into(),
        ),
    }
}

pub fn quote(section: &Section, _: &RenderChild<'_>, _: &RenderContext<'_>) -> Option<Node> {
    let text = section.opt_str("text")?;
    let mut root = Element::with_class("figure", "lp-quote");
    root.push(Element::new("blockquote").child(Element::new("p").text(text)));
    let author = section.opt_str("author");
    let role = section.opt_str("role");
    if author.is_some() || role.is_some() {
        let mut caption = Element::new("figcaption");
        if let Some(author) = author {
            caption.push(Element::new("cite").text(author));
        }
        if let Some(role) = role {
            caption.push(Element::with_class("span", "lp-muted").text(role));
        }
        root.push(caption);
    }
    Some(root.into())
}

pub fn cta(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let mut root = Element::with_class("section", "lp-cta");
    if let Some(heading) = section.opt_str("heading") {
        root.push(Element::new("h2").text(heading));
    }
    if let Some(body) = section.opt_str("body") {
        root = root.children_from(paragraphs(body));
    }
    let mut actions = Element::with_class("div", "lp-actions");
    for (i, item) in section.array("buttons").iter().enumerate() {
        if let Some(button) = link_button(item, ctx, i > 0) {
            actions.push(button);
        }
    }
    if !actions.children().is_empty() {
        root.push(actions);
    }
    if root.children().is_empty() {
        return None;
    }
    Some(root.into())
}

fn tone(raw: &str) -> (&'static str, &'static str, &'static str) {
    match raw {
        "success" => ("lp-callout--success", "check", "status"),
        "warning" => ("lp-callout--warning", "warning", "note"),
        "danger" | "error" => ("lp-callout--danger", "warning", "alert"),
        _ => ("lp-callout--info", "info", "note"),
    }
}

pub fn callout(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let title = section.opt_str("title");
    let text = section.opt_str("text");
    if title.is_none() && text.is_none() {
        return None;
    }
    let (class, default_icon, role) = tone(section.str("tone"));
    let mut root = Element::with_class("aside", "lp-callout")
        .class(class)
        .attr(Attr::Role, role);
    let icon = section.opt_str("icon").unwrap_or(default_icon);
    if let Some(svg) = ctx.icon(icon) {
        root.push(svg);
    }
    let mut body = Element::with_class("div", "lp-callout-body");
    if let Some(title) = title {
        body.push(Element::new("strong").text(title));
    }
    if let Some(text) = text {
        body = body.children_from(paragraphs(text));
    }
    root.push(body);
    Some(root.into())
}

pub fn image_text(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let mut root = Element::with_class("section", "lp-image-text");
    if section.bool("reverse") {
        root.add_class("lp-image-text--reverse");
    }
    let src = sanitize_url(section.get("image"), ctx.limits.max_url_length);
    if !src.is_empty() {
        root.push(
            Element::with_class("figure", "lp-media").child(
                Element::new("img")
                    .attr(Attr::Src, src)
                    .attr(Attr::Alt, section.str("alt"))
                    .attr(Attr::Loading, "lazy"),
            ),
        );
    }
    let mut copy = Element::with_class("div", "lp-image-text-copy");
    if let Some(header) = section_header(section) {
        copy.push(header);
    }
    if let Some(body) = section.opt_str("body") {
        copy = copy.children_from(paragraphs(body));
    }
    if let Some(button) = link_button(section.get("cta"), ctx, false) {
        copy.push(button);
    }
    if copy.children().is_empty() && root.children().is_empty() {
        return None;
    }
    root.push(copy);
    Some(root.into())
}

#[cfg(test)]
mod tests {
    use crate::action::{ActionEvent, ActionPolicy, ActionSandbox};
    use crate::dom::{Attr, Element, Node};
    use crate::renderers::test_support::{render, render_with};
    use serde_json::{json, Value};
    use std::rc::Rc;

    fn el(node: Option<Node>) -> Element {
        node.and_then(Node::into_element).unwrap()
    }

    #[test]
    fn test_heading_level_clamps() {
        let h = el(render(json!({"type": "heading", "text": "Hi", "level": 9})));
        assert_eq!(h.child_elements().next().map(Element::tag), Some("h3"));
        let h = el(render(json!({"type": "heading", "text": "Hi", "level": -4})));
        assert_eq!(h.child_elements().next().map(Element::tag), Some("h1"));
        let h = el(render(json!({"type": "heading", "text": "Hi"})));
        assert_eq!(h.child_elements().next().map(Element::tag), Some("h2"));
    }

    #[test]
    fn test_heading_without_text_is_dropped() {
        assert!(render(json!({"type": "heading"})).is_none());
    }

    #[test]
    fn test_hero_cta_is_sanitized() {
        let hero = el(render(json!({
            "type": "hero",
            "heading": "<script>alert(1)</script>",
            "cta": {"text": "Go", "url": "javascript:alert(1)", "action": "start now!"}
        })));
        let link = hero.find(&|e| e.tag() == "a").unwrap();
        assert_eq!(link.get_attr(Attr::Href), Some("#"));
        assert_eq!(link.get_attr(Attr::DataAction), Some("start_now_"));
        let h1 = hero.find(&|e| e.tag() == "h1").unwrap();
        assert_eq!(h1.text_content(), "<script>alert(1)</script>");
        assert!(hero.find(&|e| e.tag() == "script").is_none());
    }

    #[test]
    fn test_hero_action_wired_with_callback() {
        let sandbox = ActionSandbox::new(
            ActionPolicy::AllowAll,
            Some(Rc::new(|_: &str, _: &ActionEvent, _: &Value| {})),
        );
        let hero = el(render_with(
            json!({"type": "hero", "heading": "x", "cta": {"text": "Go", "url": "https://a.example", "action": "go"}}),
            &sandbox,
            true,
        ));
        let link = hero.find(&|e| e.tag() == "a").unwrap();
        assert_eq!(link.listeners().len(), 1);
        assert_eq!(link.get_attr(Attr::Href), Some("https://a.example/"));
    }

    #[test]
    fn test_callout_tone_lookup() {
        let c = el(render(json!({"type": "callout", "tone": "lp-evil\" onclick", "text": "Note"})));
        assert!(c.has_class("lp-callout--info"));
        let c = el(render(json!({"type": "callout", "tone": "danger", "title": "Careful"})));
        assert!(c.has_class("lp-callout--danger"));
        assert_eq!(c.get_attr(Attr::Role), Some("alert"));
    }

    #[test]
    fn test_image_text_reverse_and_bad_image() {
        let s = el(render(json!({
            "type": "image-text",
            "image": "data:image/png;base64,AAAA",
            "heading": "Side",
            "reverse": true
        })));
        assert!(s.has_class("lp-image-text--reverse"));
        assert!(s.find(&|e| e.tag() == "img").is_none());
    }

    #[test]
    fn test_divider_with_label() {
        let d = el(render(json!({"type": "divider", "label": "or"})));
        assert_eq!(d.get_attr(Attr::Role), Some("separator"));
        let plain = el(render(json!({"type": "divider"})));
        assert_eq!(plain.tag(), "hr");
    }
}

use crate::dom::{Attr, Element, Node};
use crate::registry::{RenderChild, RenderContext};
use crate::sanitize::sanitize_url;
use crate::section::Section;
use serde_json::json;

pub fn media_block(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let max_url = ctx.limits.max_url_length;
    let alt = section.opt_str("alt").or(section.opt_str("caption")).unwrap_or("");
    let mut root = Element::with_class("figure", "lp-media");

    match section.str("mediaType") {
        "video" => {
            root.add_class("lp-media--video");
            let thumbnail = sanitize_url(section.get("thumbnail"), max_url);
            if !thumbnail.is_empty() {
                root.push(
                    Element::new("img")
                        .attr(Attr::Src, thumbnail)
                        .attr(Attr::Alt, alt)
                        .attr(Attr::Loading, "lazy"),
                );
            }
            // Decorative only; never a click target of its own.
            let mut play = Element::with_class("span", "lp-play").attr(Attr::AriaHidden, "true");
            match ctx.icon("play") {
                Some(svg) => play.push(svg),
                None => play.push_text("▶"),
            }
            root.push(play);
            let url = sanitize_url(section.get("url"), max_url);
            ctx.wire_action(&mut root, section.get("action"), json!({ "url": url }));
        }
        "icon" => {
            root.add_class("lp-media--icon");
            let icon = section.opt_str("icon").and_then(|name| ctx.icon(name))?;
            root.push(Element::with_class("div", "lp-media-icon").child(icon));
        }
        _ => {
            let src = sanitize_url(section.get("image"), max_url);
            if src.is_empty() {
                return None;
            }
            root.push(
                Element::new("img")
                    .attr(Attr::Src, src)
                    .attr(Attr::Alt, alt)
                    .attr(Attr::Loading, "lazy"),
            );
            ctx.wire_action(&mut root, section.get("action"), serde_json::Value::Null);
        }
    }

    if let Some(caption) = section.opt_str("caption") {
        root.push(Element::with_class("figcaption", "lp-muted").text(caption));
    }
    Some(root.into())
}

use crate::dom::{Attr, Element, Node};
use crate::events::Listener;
use crate::registry::{RenderChild, RenderContext};
use crate::section::Section;

pub fn code(section: &Section, _: &RenderChild<'_>, ctx: &RenderContext<'_>) -> Option<Node> {
    let source = section.opt_str("code").or(section.opt_str("text"))?;
    let code = Element::new("code").text(source);
    // The clipboard gets exactly what the reader sees.
    let copied = code.text_content();

    let mut header = Element::with_class("div", "lp-code-header");
    if let Some(filename) = section.opt_str("filename") {
        header.push(Element::with_class("span", "lp-code-filename").text(filename));
    }
    let mut pre = Element::new("pre");
    if let Some(language) = section.opt_str("language") {
        let language = ctx.id(language, "text");
        header.push(Element::with_class("span", "lp-label").text(&language));
        pre.set_attr(Attr::DataLanguage, language);
    }
    header.push(
        Element::with_class("button", "lp-button lp-button--secondary lp-copy")
            .attr(Attr::Type, "button")
            .attr(Attr::AriaLabel, "Copy code")
            .text("Copy")
            .on(Listener::CopyText(copied)),
    );

    Some(
        Element::with_class("figure", "lp-code")
            .child(header)
            .child(pre.child(code))
            .into(),
    )
}

#[cfg(test)]
mod tests {
    use crate::action::ActionSandbox;
    use crate::dom::{Attr, Element, Node};
    use crate::events::{dispatch, Event};
    use crate::limits::Limits;
    use crate::renderers::test_support::render;
    use serde_json::json;

    #[test]
    fn test_copy_button_copies_sanitized_text() {
        let mut root = render(json!({
            "type": "code",
            "language": "rust\"><script>",
            "code": "fn main() {\u{0}\n    println!(\"<hi>\");\n}"
        }))
        .and_then(Node::into_element)
        .unwrap();
        let pre = root.find(&|e| e.tag() == "pre").unwrap();
        assert_eq!(pre.get_attr(Attr::DataLanguage), Some("rustscript"));

        let button = root.path_to(&|e| e.has_class("lp-copy")).unwrap();
        let outcome = dispatch(&mut root, &button, &Event::Click, &ActionSandbox::default(), &Limits::default()).unwrap();
        let code: &Element = root.find(&|e| e.tag() == "code").unwrap();
        assert_eq!(outcome.clipboard, Some(code.text_content()));
        assert_eq!(
            outcome.clipboard.as_deref(),
            Some("fn main() {\n    println!(\"<hi>\");\n}")
        );
    }

    #[test]
    fn test_code_requires_source() {
        assert!(render(json!({"type": "code", "language": "rust"})).is_none());
    }
}

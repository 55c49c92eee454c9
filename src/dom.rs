//! Output node tree.
//!
//! Caller strings reach the tree in exactly two ways: as a [`Node::Text`]
//! child or as the value of an attribute from the closed [`Attr`]
//! vocabulary. Tags are `&'static str` and attribute names are enum
//! variants, so no caller string can ever name an element or an attribute.
//! The serializer escapes every text node and attribute value.

use crate::events::Listener;
use crate::sanitize::to_plain_text;
use std::fmt::Write;

/// Closed attribute vocabulary. There is no variant for inline event
/// handlers and none for arbitrary `data-*` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    Id,
    Class,
    Href,
    Src,
    Alt,
    Role,
    Type,
    Name,
    Value,
    Placeholder,
    Title,
    For,
    Rel,
    Target,
    Min,
    Max,
    Step,
    MinLength,
    MaxLength,
    Rows,
    Checked,
    Disabled,
    Required,
    Hidden,
    Selected,
    NoValidate,
    TabIndex,
    Loading,
    Lang,
    Scope,
    Style,
    AriaExpanded,
    AriaControls,
    AriaSelected,
    AriaLabel,
    AriaLabelledBy,
    AriaHidden,
    AriaInvalid,
    AriaDescribedBy,
    AriaLive,
    AriaOrientation,
    DataAction,
    DataSection,
    DataTab,
    DataField,
    DataLanguage,
    DataIcon,
    ViewBox,
    D,
    Fill,
    Stroke,
    StrokeWidth,
    StrokeLinecap,
    StrokeLinejoin,
    Xmlns,
    Width,
    Height,
}

impl Attr {
    pub fn name(self) -> &'static str {
        match self {
            Attr::Id => "id",
            Attr::Class => "class",
            Attr::Href => "href",
            Attr::Src => "src",
            Attr::Alt => "alt",
            Attr::Role => "role",
            Attr::Type => "type",
            Attr::Name => "name",
            Attr::Value => "value",
            Attr::Placeholder => "placeholder",
            Attr::Title => "title",
            Attr::For => "for",
            Attr::Rel => "rel",
            Attr::Target => "target",
            Attr::Min => "min",
            Attr::Max => "max",
            Attr::Step => "step",
            Attr::MinLength => "minlength",
            Attr::MaxLength => "maxlength",
            Attr::Rows => "rows",
            Attr::Checked => "checked",
            Attr::Disabled => "disabled",
            Attr::Required => "required",
            Attr::Hidden => "hidden",
            Attr::Selected => "selected",
            Attr::NoValidate => "novalidate",
            Attr::TabIndex => "tabindex",
            Attr::Loading => "loading",
            Attr::Lang => "lang",
            Attr::Scope => "scope",
            Attr::Style => "style",
            Attr::AriaExpanded => "aria-expanded",
            Attr::AriaControls => "aria-controls",
            Attr::AriaSelected => "aria-selected",
            Attr::AriaLabel => "aria-label",
            Attr::AriaLabelledBy => "aria-labelledby",
            Attr::AriaHidden => "aria-hidden",
            Attr::AriaInvalid => "aria-invalid",
            Attr::AriaDescribedBy => "aria-describedby",
            Attr::AriaLive => "aria-live",
            Attr::AriaOrientation => "aria-orientation",
            Attr::DataAction => "data-action",
            Attr::DataSection => "data-section",
            Attr::DataTab => "data-tab",
            Attr::DataField => "data-field",
            Attr::DataLanguage => "data-language",
            Attr::DataIcon => "data-icon",
            Attr::ViewBox => "viewBox",
            Attr::D => "d",
            Attr::Fill => "fill",
            Attr::Stroke => "stroke",
            Attr::StrokeWidth => "stroke-width",
            Attr::StrokeLinecap => "stroke-linecap",
            Attr::StrokeLinejoin => "stroke-linejoin",
            Attr::Xmlns => "xmlns",
            Attr::Width => "width",
            Attr::Height => "height",
        }
    }

    /// Boolean attributes serialize as a bare name when present.
    pub fn is_flag(self) -> bool {
        matches!(
            self,
            Attr::Checked
                | Attr::Disabled
                | Attr::Required
                | Attr::Hidden
                | Attr::Selected
                | Attr::NoValidate
        )
    }
}

const VOID_TAGS: &[&str] = &[
    "area", "br", "col", "embed", "hr", "img", "input", "meta", "source", "wbr",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(Attr, String)>,
    children: Vec<Node>,
    listeners: Vec<Listener>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Shorthand for `Element::new(tag)` with a class list.
    pub fn with_class(tag: &'static str, class: &str) -> Self {
        Self::new(tag).class(class)
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    // ─── Builders ────────────────────────────────────────────────────────

    pub fn class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn attr(mut self, attr: Attr, value: impl Into<String>) -> Self {
        self.set_attr(attr, value);
        self
    }

    pub fn flag(mut self, attr: Attr, on: bool) -> Self {
        self.set_flag(attr, on);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children_from(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    /// Appends caller text as an inert text node.
    pub fn text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    pub fn on(mut self, listener: Listener) -> Self {
        self.listeners.push(listener);
        self
    }

    // ─── Attributes ──────────────────────────────────────────────────────

    pub fn set_attr(&mut self, attr: Attr, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(a, _)| *a == attr) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((attr, value)),
        }
    }

    pub fn get_attr(&self, attr: Attr) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(a, _)| *a == attr)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove_attr(&mut self, attr: Attr) {
        self.attrs.retain(|(a, _)| *a != attr);
    }

    pub fn set_flag(&mut self, attr: Attr, on: bool) {
        if on {
            self.set_attr(attr, "");
        } else {
            self.remove_attr(attr);
        }
    }

    pub fn has_flag(&self, attr: Attr) -> bool {
        self.get_attr(attr).is_some()
    }

    pub fn attrs(&self) -> &[(Attr, String)] {
        &self.attrs
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attr(Attr::Id)
    }

    // ─── Classes ─────────────────────────────────────────────────────────

    pub fn add_class(&mut self, class: &str) {
        let mut tokens: Vec<String> = self
            .get_attr(Attr::Class)
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        for tok in class.split_whitespace() {
            if !tokens.iter().any(|t| t == tok) {
                tokens.push(tok.to_string());
            }
        }
        if !tokens.is_empty() {
            self.set_attr(Attr::Class, tokens.join(" "));
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        let Some(current) = self.get_attr(Attr::Class) else {
            return;
        };
        let remaining: Vec<&str> = current.split_whitespace().filter(|t| *t != class).collect();
        if remaining.is_empty() {
            self.remove_attr(Attr::Class);
        } else {
            let joined = remaining.join(" ");
            self.set_attr(Attr::Class, joined);
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr(Attr::Class)
            .map(|c| c.split_whitespace().any(|t| t == class))
            .unwrap_or(false)
    }

    // ─── Children ────────────────────────────────────────────────────────

    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    pub fn push_text(&mut self, text: &str) {
        self.children.push(Node::text(text));
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Child elements, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn add_listener(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find(&|el| el.id() == Some(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find_map(|el| el.find_by_id_mut(id))
    }

    /// First element (self included, depth-first) matching `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.child_elements().find_map(|el| el.find(pred))
    }

    pub fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if pred(self) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find_map(|el| el.find_mut(pred))
    }

    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        if pred(self) {
            out.push(self);
        }
        for el in self.child_elements() {
            el.find_all(pred, out);
        }
    }

    pub fn find_all_by_class(&self, class: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.find_all(&|el| el.has_class(class), &mut out);
        out
    }

    /// Path (child indices) from `self` to the first element matching `pred`.
    pub fn path_to(&self, pred: &dyn Fn(&Element) -> bool) -> Option<Vec<usize>> {
        if pred(self) {
            return Some(Vec::new());
        }
        for (i, node) in self.children.iter().enumerate() {
            if let Node::Element(el) = node {
                if let Some(mut rest) = el.path_to(pred) {
                    rest.insert(0, i);
                    return Some(rest);
                }
            }
        }
        None
    }

    pub fn at_path(&self, path: &[usize]) -> Option<&Element> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self.children.get(*first)?.as_element()?.at_path(rest),
        }
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self
                .children
                .get_mut(*first)?
                .as_element_mut()?
                .at_path_mut(rest),
        }
    }

    /// Applies `f` to every element in the subtree, self included.
    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        f(self);
        for child in self.children.iter_mut() {
            if let Node::Element(el) = child {
                el.walk_mut(f);
            }
        }
    }

    // ─── Serialization ───────────────────────────────────────────────────

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_html(&mut out);
        out
    }

    pub fn write_html(&self, out: &mut String) -> std::fmt::Result {
        write!(out, "<{}", self.tag)?;
        for (attr, value) in &self.attrs {
            if attr.is_flag() {
                write!(out, " {}", attr.name())?;
            } else {
                write!(out, " {}=\"{}\"", attr.name(), escape_attr(value))?;
            }
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag) {
            return Ok(());
        }
        for child in &self.children {
            child.write_html(out)?;
        }
        write!(out, "</{}>", self.tag)
    }
}

impl Node {
    /// Inert text node. Control characters are dropped; everything else is
    /// kept verbatim and escaped when serialized.
    pub fn text(text: &str) -> Node {
        Node::Text(to_plain_text(text))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn into_element(self) -> Option<Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn text_content(&self) -> String {
        match self {
            Node::Text(t) => t.clone(),
            Node::Element(el) => el.text_content(),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let _ = self.write_html(&mut out);
        out
    }

    pub fn write_html(&self, out: &mut String) -> std::fmt::Result {
        match self {
            Node::Text(t) => {
                out.push_str(&escape_text(t));
                Ok(())
            }
            Node::Element(el) => el.write_html(out),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_escaped() {
        let el = Element::new("p").text("<img src=x onerror=alert(1)>");
        assert_eq!(el.to_html(), "<p>&lt;img src=x onerror=alert(1)&gt;</p>");
        assert_eq!(el.children().len(), 1);
        assert!(matches!(el.children()[0], Node::Text(_)));
    }

    #[test]
    fn test_attr_value_cannot_break_out() {
        let el = Element::new("a").attr(Attr::Title, "\"><script>x</script>");
        assert_eq!(
            el.to_html(),
            "<a title=\"&quot;&gt;&lt;script&gt;x&lt;/script&gt;\"></a>"
        );
    }

    #[test]
    fn test_void_and_flag_serialization() {
        let el = Element::new("input")
            .attr(Attr::Type, "checkbox")
            .flag(Attr::Checked, true);
        assert_eq!(el.to_html(), "<input type=\"checkbox\" checked>");
    }

    #[test]
    fn test_class_add_remove() {
        let mut el = Element::with_class("div", "lp-a lp-b");
        el.add_class("lp-b lp-c");
        assert_eq!(el.get_attr(Attr::Class), Some("lp-a lp-b lp-c"));
        el.remove_class("lp-a");
        assert!(!el.has_class("lp-a"));
        assert!(el.has_class("lp-c"));
    }

    #[test]
    fn test_path_lookup() {
        let root = Element::new("div")
            .child(Node::text("x"))
            .child(Element::new("span").child(Element::new("b").attr(Attr::Id, "t")));
        let path = root.path_to(&|el| el.id() == Some("t")).unwrap();
        assert_eq!(path, vec![1, 0]);
        assert_eq!(root.at_path(&path).map(Element::tag), Some("b"));
    }
}

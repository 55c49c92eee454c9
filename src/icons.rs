//! Static icon glyph table. Icons are built from this data only, never from
//! caller-supplied markup.

use crate::dom::{Attr, Element};

/// 24x24 stroke glyphs, keyed by name.
const GLYPHS: &[(&str, &str)] = &[
    ("arrow-right", "M5 12h14M13 5l7 7-7 7"),
    ("bolt", "M13 2L4 14h7l-1 8 9-12h-7l1-8z"),
    ("check", "M5 13l4 4L19 7"),
    ("chart", "M4 20V10M10 20V4M16 20v-7M22 20H2"),
    ("clock", "M12 7v5l3 3M21 12a9 9 0 1 1-18 0 9 9 0 0 1 18 0z"),
    ("cloud", "M7 18h10a4 4 0 0 0 .5-7.97A6 6 0 0 0 6.2 9.1 4.5 4.5 0 0 0 7 18z"),
    ("code", "M8 16l-4-4 4-4M16 8l4 4-4 4M14 4l-4 16"),
    ("copy", "M9 9h10v10H9zM5 15V5h10"),
    ("cross", "M6 6l12 12M18 6L6 18"),
    ("globe", "M12 21a9 9 0 1 0 0-18 9 9 0 0 0 0 18zM3 12h18M12 3c3 3.5 3 14.5 0 18M12 3c-3 3.5-3 14.5 0 18"),
    ("heart", "M12 20s-7-4.5-7-10a4 4 0 0 1 7-2.6A4 4 0 0 1 19 10c0 5.5-7 10-7 10z"),
    ("info", "M12 8h.01M11 12h1v5h1M21 12a9 9 0 1 1-18 0 9 9 0 0 1 18 0z"),
    ("lock", "M6 11h12v10H6zM8 11V7a4 4 0 0 1 8 0v4"),
    ("mail", "M3 6h18v12H3zM3 6l9 7 9-7"),
    ("play", "M8 5v14l11-7z"),
    ("rocket", "M5 15c-1 1-2 4-2 6 2 0 5-1 6-2M9 15l-3-3c1-5 5-9 12-9 0 7-4 11-9 12zM15 9h.01"),
    ("search", "M11 19a8 8 0 1 0 0-16 8 8 0 0 0 0 16zM21 21l-4.35-4.35"),
    ("settings", "M12 15a3 3 0 1 0 0-6 3 3 0 0 0 0 6zM19.4 15a1.7 1.7 0 0 0 .3 1.8l.1.1a2 2 0 1 1-2.8 2.8l-.1-.1a1.7 1.7 0 0 0-2.9 1.2V21a2 2 0 1 1-4 0v-.1a1.7 1.7 0 0 0-2.9-1.2l-.1.1a2 2 0 1 1-2.8-2.8l.1-.1A1.7 1.7 0 0 0 3 14H3a2 2 0 1 1 0-4h.1a1.7 1.7 0 0 0 1.2-2.9l-.1-.1a2 2 0 1 1 2.8-2.8l.1.1A1.7 1.7 0 0 0 10 3V3a2 2 0 1 1 4 0v.1a1.7 1.7 0 0 0 2.9 1.2l.1-.1a2 2 0 1 1 2.8 2.8l-.1.1a1.7 1.7 0 0 0 1.2 2.9H21a2 2 0 1 1 0 4h-.1a1.7 1.7 0 0 0-1.5.9z"),
    ("shield", "M12 3l8 3v6c0 5-3.5 8-8 9-4.5-1-8-4-8-9V6z"),
    ("sparkles", "M12 3l1.8 5.2L19 10l-5.2 1.8L12 17l-1.8-5.2L5 10l5.2-1.8zM19 17l.8 2.2L22 20l-2.2.8L19 23l-.8-2.2L16 20l2.2-.8z"),
    ("star", "M12 3l2.8 5.7 6.2.9-4.5 4.4 1 6.2L12 17.3 6.5 20.2l1-6.2L3 9.6l6.2-.9z"),
    ("trending-down", "M3 7l6 6 4-4 8 8M21 11v6h-6"),
    ("trending-up", "M3 17l6-6 4 4 8-8M21 13V7h-6"),
    ("user", "M12 12a4 4 0 1 0 0-8 4 4 0 0 0 0 8zM4 21a8 8 0 0 1 16 0"),
    ("users", "M9 11a4 4 0 1 0 0-8 4 4 0 0 0 0 8zM1 21a8 8 0 0 1 16 0M17 3.1a4 4 0 0 1 0 7.8M23 21a8 8 0 0 0-5-7.4"),
    ("warning", "M12 9v4M12 17h.01M10.3 3.9L2 18a2 2 0 0 0 1.7 3h16.6a2 2 0 0 0 1.7-3L13.7 3.9a2 2 0 0 0-3.4 0z"),
    ("zap", "M13 2L3 14h9l-1 8 10-12h-9l1-8z"),
];

/// Read-only glyph lookup injected into the render context.
#[derive(Debug, Clone, Copy)]
pub struct IconSet {
    glyphs: &'static [(&'static str, &'static str)],
}

impl Default for IconSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl IconSet {
    pub const fn builtin() -> Self {
        Self { glyphs: GLYPHS }
    }

    pub fn path_data(&self, name: &str) -> Option<&'static str> {
        self.glyphs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, d)| *d)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.path_data(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.glyphs.iter().map(|(key, _)| *key)
    }

    /// Decorative `svg` element for `name`, or `None` for unknown names.
    pub fn render(&self, name: &str) -> Option<Element> {
        let (key, d) = self.glyphs.iter().find(|(key, _)| *key == name.trim())?;
        Some(
            Element::with_class("svg", "lp-icon")
                .attr(Attr::Xmlns, "http://www.w3.org/2000/svg")
                .attr(Attr::ViewBox, "0 0 24 24")
                .attr(Attr::Fill, "none")
                .attr(Attr::Stroke, "currentColor")
                .attr(Attr::StrokeWidth, "2")
                .attr(Attr::StrokeLinecap, "round")
                .attr(Attr::StrokeLinejoin, "round")
                .attr(Attr::AriaHidden, "true")
                .attr(Attr::DataIcon, *key)
                .child(Element::new("path").attr(Attr::D, *d)),
        )
    }
}

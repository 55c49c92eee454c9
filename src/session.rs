//! Page session: owns one mounted output root, its stylesheet and the
//! host hooks, and drives normalize → dispatch → append.

use crate::action::{ActionCallback, ActionPolicy, ActionSandbox};
use crate::dom::{escape_text, Attr, Element, Node};
use crate::error::{PageError, PageResult};
use crate::events::{self, DispatchOutcome, Event};
use crate::icons::IconSet;
use crate::limits::Limits;
use crate::normalize::{normalize_section, Normalizer};
use crate::registry::{CustomRenderer, RenderContext, Registry};
use crate::sanitize::{clamp_str, sanitize_identifier};
use crate::section::Section;
use crate::stream::{BracketDecoder, Decoder, LineDecoder};
use crate::theme::{resolve_background, stylesheet_css, Theme, ThemeName};
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

/// Delay step between consecutive appended sections, in milliseconds.
const STAGGER_MS: usize = 60;
/// Sections past this index share the last delay.
const STAGGER_CAP: usize = 12;

/// Session configuration. The data part deserializes from camelCase JSON;
/// the host hooks are set in code.
#[derive(Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOptions {
    /// Id of the output root. Required.
    pub mount: Option<String>,
    pub theme: ThemeName,
    /// Token overrides layered over the selected palette.
    pub tokens: Option<Theme>,
    pub limits: Limits,
    pub action_policy: ActionPolicy,
    pub inject_icons: bool,
    pub animate: bool,
    #[serde(skip)]
    pub renderers: BTreeMap<String, CustomRenderer>,
    #[serde(skip)]
    pub catalog: BTreeMap<String, CustomRenderer>,
    #[serde(skip)]
    pub on_action: Option<ActionCallback>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mount: None,
            theme: ThemeName::default(),
            tokens: None,
            limits: Limits::default(),
            action_policy: ActionPolicy::default(),
            inject_icons: true,
            animate: false,
            renderers: BTreeMap::new(),
            catalog: BTreeMap::new(),
            on_action: None,
        }
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("mount", &self.mount)
            .field("theme", &self.theme)
            .field("limits", &self.limits)
            .field("action_policy", &self.action_policy)
            .field("inject_icons", &self.inject_icons)
            .field("animate", &self.animate)
            .field("renderers", &self.renderers.keys().collect::<Vec<_>>())
            .field("catalog", &self.catalog.keys().collect::<Vec<_>>())
            .field("on_action", &self.on_action.is_some())
            .finish()
    }
}

impl SessionOptions {
    pub fn new(mount: impl Into<String>) -> Self {
        Self {
            mount: Some(mount.into()),
            ..Self::default()
        }
    }

    pub fn with_renderer(mut self, kind: impl Into<String>, renderer: CustomRenderer) -> Self {
        self.renderers.insert(kind.into(), renderer);
        self
    }

    pub fn with_catalog_entry(mut self, kind: impl Into<String>, renderer: CustomRenderer) -> Self {
        self.catalog.insert(kind.into(), renderer);
        self
    }

    pub fn with_action_callback(mut self, callback: ActionCallback) -> Self {
        self.on_action = Some(callback);
        self
    }
}

/// Stylesheet attached to the output root. Theme changes rewrite its
/// content in place, so a handle obtained from [`Session::stylesheet`]
/// stays current.
#[derive(Debug, Default, PartialEq)]
pub struct Stylesheet {
    css: String,
}

impl Stylesheet {
    pub fn css(&self) -> &str {
        &self.css
    }
}

/// What the page keeps per rendered section once its node is built. The
/// normalized data itself is dropped after rendering.
#[derive(Debug, Clone)]
struct Mounted {
    kind: String,
    ids: BTreeSet<String>,
}

pub struct Session {
    root: Element,
    sections: Vec<Mounted>,
    /// Every element id on the page, the mount included.
    ids: BTreeSet<String>,
    registry: Registry,
    host_types: BTreeSet<String>,
    limits: Limits,
    actions: ActionSandbox,
    icons: IconSet,
    inject_icons: bool,
    animate: bool,
    base_theme: ThemeName,
    theme: ThemeName,
    tokens: Theme,
    background: Option<String>,
    title: Option<String>,
    stylesheet: Rc<RefCell<Stylesheet>>,
    appended: usize,
    focus: Option<Vec<usize>>,
    destroyed: bool,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("mount", &self.root.id())
            .field("sections", &self.sections.len())
            .field("theme", &self.theme)
            .field("registry", &self.registry)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl Session {
    /// Create a session bound to `options.mount`.
    pub fn new(options: SessionOptions) -> PageResult<Self> {
        let mount = match options.mount.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(PageError::MissingMount),
        };
        if sanitize_identifier(&mount, "", options.limits.max_id_length) != mount {
            return Err(PageError::InvalidMount {
                id: mount,
                reason: "expected [A-Za-z0-9_:-] within the id length limit".to_string(),
            });
        }

        let mut registry = Registry::new();
        for (kind, renderer) in options.renderers {
            registry.register(kind, renderer);
        }
        for (kind, renderer) in options.catalog {
            registry.register_catalog(kind, renderer);
        }
        let host_types = registry.host_types();

        let mut session = Self {
            root: Element::with_class("div", "lp-root").attr(Attr::Id, mount.as_str()),
            sections: Vec::new(),
            ids: BTreeSet::from([mount.clone()]),
            registry,
            host_types,
            limits: options.limits,
            actions: ActionSandbox::new(options.action_policy, options.on_action),
            icons: IconSet::builtin(),
            inject_icons: options.inject_icons,
            animate: options.animate,
            base_theme: options.theme,
            theme: options.theme,
            tokens: options.tokens.unwrap_or_default(),
            background: None,
            title: None,
            stylesheet: Rc::new(RefCell::new(Stylesheet::default())),
            appended: 0,
            focus: None,
            destroyed: false,
        };
        session.root.add_class(theme_class(session.theme));
        session.restyle();
        debug!(mount = mount.as_str(), "session created");
        Ok(session)
    }

    // ─── Full-page rendering ─────────────────────────────────────────────

    /// Replace the page with `description`. Accepts a page object
    /// (`theme`, `style.background`, `title`, `sections`) or a bare
    /// section array. Returns the number of sections appended.
    pub fn render(&mut self, description: &Value) -> PageResult<usize> {
        self.ensure_live()?;
        self.reset_page();

        let sections = match description {
            Value::Array(_) => description,
            Value::Object(page) => {
                self.apply_page_settings(page);
                page.get("sections").unwrap_or(&Value::Null)
            }
            _ => {
                debug!("page description ignored: not an object or array");
                return Ok(0);
            }
        };

        let normalized = Normalizer::new(&self.limits, &self.host_types).normalize(sections, 0);
        let mut appended = 0;
        for section in normalized {
            if self.append(section) {
                appended += 1;
            }
        }
        debug!(appended, "page rendered");
        Ok(appended)
    }

    /// Normalize and append one section. Returns `false` when it was
    /// rejected or the page is already at the section limit.
    pub fn add_section(&mut self, raw: &Value) -> PageResult<bool> {
        self.ensure_live()?;
        if self.sections.len() >= self.limits.max_sections {
            debug!(max_sections = self.limits.max_sections, "section dropped: page is full");
            return Ok(false);
        }
        match normalize_section(raw, &self.limits, &self.host_types) {
            Some(section) => Ok(self.append(section)),
            None => Ok(false),
        }
    }

    /// Replace the section at `index`. A rejected replacement leaves the
    /// current section in place and returns `false`.
    pub fn update_section(&mut self, index: usize, raw: &Value) -> PageResult<bool> {
        self.ensure_live()?;
        self.check_index(index)?;
        let Some(section) = normalize_section(raw, &self.limits, &self.host_types) else {
            return Ok(false);
        };
        let previous = std::mem::take(&mut self.sections[index].ids);
        self.release(&previous);
        let Some((node, mounted)) = self.build(&section) else {
            self.reserve(&previous);
            self.sections[index].ids = previous;
            return Ok(false);
        };
        self.reserve(&mounted.ids);
        self.root.children_mut()[index] = node;
        self.sections[index] = mounted;
        if self.focus.as_ref().and_then(|p| p.first()) == Some(&index) {
            self.focus = None;
        }
        Ok(true)
    }

    /// Remove the section at `index` and return its type name.
    pub fn remove_section(&mut self, index: usize) -> PageResult<String> {
        self.ensure_live()?;
        self.check_index(index)?;
        self.root.children_mut().remove(index);
        let removed = self.sections.remove(index);
        self.release(&removed.ids);
        self.focus = match self.focus.take() {
            Some(path) if path.first() == Some(&index) => None,
            Some(mut path) if path.first().is_some_and(|&i| i > index) => {
                path[0] -= 1;
                Some(path)
            }
            other => other,
        };
        Ok(removed.kind)
    }

    /// Drop every section. Theme and page settings are kept.
    pub fn clear(&mut self) -> PageResult<()> {
        self.ensure_live()?;
        self.root.children_mut().clear();
        self.sections.clear();
        self.ids = self.root.id().map(str::to_string).into_iter().collect();
        self.appended = 0;
        self.focus = None;
        Ok(())
    }

    // ─── Theme ───────────────────────────────────────────────────────────

    pub fn set_theme(&mut self, theme: ThemeName) -> PageResult<()> {
        self.ensure_live()?;
        self.apply_theme(theme);
        Ok(())
    }

    /// Replace the token overrides layered over the active palette.
    pub fn set_tokens(&mut self, tokens: Theme) -> PageResult<()> {
        self.ensure_live()?;
        self.tokens = tokens;
        self.restyle();
        Ok(())
    }

    pub fn theme(&self) -> ThemeName {
        self.theme
    }

    /// Shared handle to the root's stylesheet.
    pub fn stylesheet(&self) -> Rc<RefCell<Stylesheet>> {
        Rc::clone(&self.stylesheet)
    }

    // ─── Inspection ──────────────────────────────────────────────────────

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Type names of the rendered sections, in page order.
    pub fn sections(&self) -> Vec<&str> {
        self.sections.iter().map(|m| m.kind.as_str()).collect()
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Element that currently holds focus, if any.
    pub fn focused(&self) -> Option<&Element> {
        self.focus.as_deref().and_then(|path| self.root.at_path(path))
    }

    pub fn focus_path(&self) -> Option<&[usize]> {
        self.focus.as_deref()
    }

    // ─── Interaction ─────────────────────────────────────────────────────

    /// Deliver a user event to the node at `path` (relative to the root).
    pub fn dispatch(&mut self, path: &[usize], event: &Event) -> PageResult<DispatchOutcome> {
        self.ensure_live()?;
        let outcome = events::dispatch(&mut self.root, path, event, &self.actions, &self.limits)?;
        match (&outcome.focus, event) {
            (Some(target), _) => self.focus = Some(target.clone()),
            (None, Event::Click) => self.focus = Some(path.to_vec()),
            (None, Event::Blur) if self.focus.as_deref() == Some(path) => self.focus = None,
            _ => {}
        }
        Ok(outcome)
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Serialized output root.
    pub fn to_html(&self) -> PageResult<String> {
        self.ensure_live()?;
        Ok(self.root.to_html())
    }

    /// Standalone document: the output root plus its active stylesheet.
    pub fn export_html(&self) -> PageResult<String> {
        self.ensure_live()?;
        let title = self.title.as_deref().unwrap_or("Page");
        let css = self.stylesheet.borrow();
        Ok(format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_text(title),
            css.css(),
            self.root.to_html()
        ))
    }

    /// Tear the session down. Every later call returns
    /// [`PageError::Destroyed`].
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.root.children_mut().clear();
        self.sections.clear();
        self.ids.clear();
        self.focus = None;
        self.stylesheet.borrow_mut().css.clear();
        self.destroyed = true;
        debug!("session destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ─── Streaming ───────────────────────────────────────────────────────

    /// Render a page description arriving as text chunks of one JSON
    /// object. Sections appear as soon as each one is complete.
    pub async fn render_stream<S, E>(&mut self, source: S) -> PageResult<usize>
    where
        S: Stream<Item = Result<String, E>>,
        E: fmt::Display,
    {
        self.ensure_live()?;
        self.reset_page();
        let decoder = BracketDecoder::new(self.limits.max_stream_buffer);
        self.consume(source, decoder).await
    }

    /// Render newline-delimited section objects arriving as text chunks.
    pub async fn render_ndjson_stream<S, E>(&mut self, source: S) -> PageResult<usize>
    where
        S: Stream<Item = Result<String, E>>,
        E: fmt::Display,
    {
        self.ensure_live()?;
        self.reset_page();
        let decoder = LineDecoder::new(self.limits.max_stream_buffer);
        self.consume(source, decoder).await
    }

    async fn consume<S, E, D>(&mut self, source: S, mut decoder: D) -> PageResult<usize>
    where
        S: Stream<Item = Result<String, E>>,
        E: fmt::Display,
        D: Decoder,
    {
        let limits = self.limits.clone();
        let host_types = self.host_types.clone();
        let mut normalizer = Normalizer::new(&limits, &host_types);
        let mut source = std::pin::pin!(source);
        let mut appended = 0;

        while let Some(chunk) = source.next().await {
            let chunk = chunk.map_err(|err| {
                warn!(reason = %err, appended, "stream source failed");
                PageError::Stream(err.to_string())
            })?;
            let values = decoder.push(&chunk);
            if let Some(theme) = decoder.take_theme() {
                self.apply_theme(ThemeName::parse(&theme));
            }
            appended += self.append_streamed(&mut normalizer, values);
        }
        let values = decoder.finish();
        if let Some(theme) = decoder.take_theme() {
            self.apply_theme(ThemeName::parse(&theme));
        }
        appended += self.append_streamed(&mut normalizer, values);
        debug!(appended, "stream consumed");
        Ok(appended)
    }

    fn append_streamed(&mut self, normalizer: &mut Normalizer<'_>, values: Vec<Value>) -> usize {
        let mut appended = 0;
        for raw in &values {
            if let Some(section) = normalizer.normalize_one(raw, 0) {
                if self.append(section) {
                    appended += 1;
                }
            }
        }
        appended
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn ensure_live(&self) -> PageResult<()> {
        if self.destroyed {
            Err(PageError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn check_index(&self, index: usize) -> PageResult<()> {
        if index < self.sections.len() {
            Ok(())
        } else {
            Err(PageError::SectionIndexOutOfRange {
                index,
                count: self.sections.len(),
            })
        }
    }

    /// Forget page-level settings and sections before a full render.
    fn reset_page(&mut self) {
        self.root.children_mut().clear();
        self.sections.clear();
        self.ids = self.root.id().map(str::to_string).into_iter().collect();
        self.appended = 0;
        self.focus = None;
        self.title = None;
        self.background = None;
        self.apply_theme(self.base_theme);
    }

    fn apply_page_settings(&mut self, page: &serde_json::Map<String, Value>) {
        let theme = page
            .get("theme")
            .and_then(Value::as_str)
            .map(ThemeName::parse)
            .unwrap_or(self.theme);
        self.background = page
            .get("style")
            .and_then(|style| style.get("background"))
            .and_then(Value::as_str)
            .map(|bg| clamp_str(bg, self.limits.max_string_length));
        self.title = page
            .get("title")
            .and_then(Value::as_str)
            .map(|t| clamp_str(t.trim(), self.limits.max_string_length))
            .filter(|t| !t.is_empty());
        self.apply_theme(theme);
    }

    fn apply_theme(&mut self, theme: ThemeName) {
        self.root.remove_class(theme_class(self.theme));
        self.theme = theme;
        self.root.add_class(theme_class(theme));
        self.restyle();
    }

    fn restyle(&mut self) {
        let mut tokens = Theme::preset(self.theme);
        tokens.merge(&self.tokens);
        let background = self
            .background
            .as_deref()
            .and_then(|raw| resolve_background(&tokens, raw));
        self.stylesheet.borrow_mut().css = stylesheet_css(&tokens, background.as_deref());
    }

    /// Render `section` against the ids already on the page. The section
    /// is consumed; only its type and the ids its node carries are kept.
    fn build(&self, section: &Section) -> Option<(Node, Mounted)> {
        let taken = RefCell::new(self.ids.clone());
        let ctx = RenderContext {
            limits: &self.limits,
            actions: &self.actions,
            icons: &self.icons,
            inject_icons: self.inject_icons,
            ids: &taken,
        };
        let node = self.registry.dispatch(section, &ctx)?;
        let mut ids = BTreeSet::new();
        if let Node::Element(el) = &node {
            let mut with_id = Vec::new();
            el.find_all(&|e| e.id().is_some(), &mut with_id);
            ids.extend(with_id.into_iter().filter_map(Element::id).map(str::to_string));
        }
        let mounted = Mounted {
            kind: section.kind().to_string(),
            ids,
        };
        Some((node, mounted))
    }

    fn reserve(&mut self, ids: &BTreeSet<String>) {
        self.ids.extend(ids.iter().cloned());
    }

    fn release(&mut self, ids: &BTreeSet<String>) {
        for id in ids {
            self.ids.remove(id);
        }
    }

    fn append(&mut self, section: Section) -> bool {
        let Some((mut node, mounted)) = self.build(&section) else {
            return false;
        };
        if self.animate {
            if let Node::Element(el) = &mut node {
                let delay = self.appended.min(STAGGER_CAP) * STAGGER_MS;
                el.add_class("lp-animate");
                el.set_attr(Attr::Style, format!("animation-delay:{delay}ms"));
            }
        }
        self.appended += 1;
        self.reserve(&mounted.ids);
        self.root.push(node);
        self.sections.push(mounted);
        true
    }
}

fn theme_class(theme: ThemeName) -> &'static str {
    match theme {
        ThemeName::Light => "lp-theme--light",
        ThemeName::Dark => "lp-theme--dark",
        ThemeName::Ocean => "lp-theme--ocean",
        ThemeName::Sunset => "lp-theme--sunset",
        ThemeName::Forest => "lp-theme--forest",
    }
}

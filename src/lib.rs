//! # pagelet
//!
//! Sanitizing renderer for declarative JSON page descriptions.
//!
//! ## Features
//! - Closed section vocabulary with bounded, idempotent normalization
//! - Output tree that only admits caller strings as text or escaped values
//! - URL scheme allowlist and action names gated by a host policy
//! - Accessible interactive sections (FAQ, tabs, forms) with node-owned listeners
//! - Incremental rendering from bracket-tracked or newline-delimited streams
//! - Theme palettes with token overrides and standalone HTML export
//!
//! ## Example
//! ```ignore
//! use pagelet::{Session, SessionOptions};
//! use serde_json::json;
//!
//! let mut session = Session::new(SessionOptions::new("page"))?;
//! session.render(&json!({
//!     "theme": "dark",
//!     "sections": [
//!         { "type": "hero", "heading": "Ship faster", "cta": { "text": "Start", "url": "https://example.com" } },
//!         { "type": "faq", "items": [{ "question": "Free?", "answer": "Yes." }] }
//!     ]
//! }))?;
//! let html = session.export_html()?;
//! ```

pub mod action;
pub mod dom;
pub mod error;
pub mod events;
pub mod icons;
pub mod limits;
pub mod normalize;
pub mod registry;
pub mod renderers;
pub mod sanitize;
pub mod section;
pub mod session;
pub mod stream;
pub mod theme;
pub mod validation;

// --- Core types ---
pub use action::{ActionCallback, ActionEvent, ActionOutcome, ActionPolicy, ActionSandbox, Trigger};
pub use dom::{Attr, Element, Node};
pub use error::{PageError, PageResult};
pub use events::{ChangeValue, DispatchOutcome, Event, Key, Listener};
pub use limits::Limits;
pub use registry::{CustomRenderer, RenderChild, RenderContext, Registry};
pub use section::Section;
pub use session::{Session, SessionOptions, Stylesheet};
pub use theme::{Theme, ThemeName};

// --- Streaming ---
pub use stream::{BracketDecoder, Decoder, LineDecoder};

/// Normalize a section list with the given limits and no host types.
pub fn normalize(sections: &serde_json::Value, limits: &Limits) -> Vec<Section> {
    normalize::normalize_sections(sections, limits, &Default::default())
}

/// Render a page description into a standalone HTML document.
pub fn render_document(description: &serde_json::Value) -> PageResult<String> {
    let mut session = Session::new(SessionOptions::new("page"))?;
    session.render(description)?;
    session.export_html()
}

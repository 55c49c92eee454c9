use pagelet::{
    ActionEvent, ActionOutcome, ActionPolicy, Attr, Element, Event, PageError, Session, SessionOptions,
    ThemeName,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

fn get_demo_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("demos");
    path.push(filename);
    path
}

fn load_demo(filename: &str) -> String {
    fs::read_to_string(get_demo_path(filename)).unwrap()
}

fn session() -> Session {
    Session::new(SessionOptions::new("page")).unwrap()
}

fn kinds(session: &Session) -> Vec<String> {
    session.sections().into_iter().map(str::to_string).collect()
}

fn all_elements<'a>(el: &'a Element, out: &mut Vec<&'a Element>) {
    out.push(el);
    for child in el.child_elements() {
        all_elements(child, out);
    }
}

/// Tag and attribute-name outline of a subtree; text and attribute
/// values are left out.
fn shape(el: &Element, out: &mut Vec<String>) {
    let mut names: Vec<&str> = el.attrs().iter().map(|(attr, _)| attr.name()).collect();
    names.sort_unstable();
    out.push(format!("{}[{}]", el.tag(), names.join(",")));
    for child in el.child_elements() {
        shape(child, out);
    }
}

/// Page that routes `text` through every caller-text field kind.
fn page_with(text: &str) -> Value {
    json!([
        {"type": "heading", "text": text},
        {"type": "text", "heading": text, "body": text},
        {"type": "list", "items": [text, {"text": text}]},
        {"type": "comparison-table", "columns": ["Plan", text], "rows": [[text, "true"], {"Plan": text}]},
        {"type": "form", "heading": text, "fields": [
            {"name": "note", "label": text, "placeholder": text},
            {"name": "kind", "type": "select", "label": text, "placeholder": text, "options": [text]}
        ]},
        {"type": "faq", "items": [{"question": text, "answer": text}]},
        {"type": "callout", "title": text, "text": text},
        {"type": "cta", "heading": text, "buttons": [{"text": text, "url": "https://relay.example"}]}
    ])
}

fn render_shape(text: &str) -> (Vec<String>, String) {
    let mut session = session();
    session.render(&page_with(text)).unwrap();
    let mut out = Vec::new();
    shape(session.root(), &mut out);
    (out, session.to_html().unwrap())
}

fn chunks(text: &str, size: usize) -> Vec<Result<String, std::io::Error>> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| Ok(c.iter().collect())).collect()
}

// ─── Fixtures ────────────────────────────────────────────────────────────

#[test]
fn test_landing_demo_renders_every_section() {
    let description: Value = serde_json::from_str(&load_demo("landing.json")).unwrap();
    let mut session = session();
    let count = session.render(&description).unwrap();
    assert_eq!(count, 8);
    assert_eq!(
        kinds(&session),
        vec!["hero", "feature-grid", "stat-row", "comparison-table", "tabset", "faq", "form", "cta"]
    );
    assert_eq!(session.theme(), ThemeName::Ocean);

    let html = session.export_html().unwrap();
    assert!(html.contains("<title>Relay | Ship status pages in minutes</title>"));
    assert!(html.contains("role=\"tablist\""));
    assert!(html.contains("aria-expanded=\"true\""));
}

#[test]
fn test_adversarial_demo_is_neutralized() {
    let description: Value = serde_json::from_str(&load_demo("adversarial.json")).unwrap();
    let mut session = session();
    session.render(&description).unwrap();
    assert_eq!(kinds(&session), vec!["heading", "hero", "text", "list", "cta"]);
    assert_eq!(session.theme(), ThemeName::Light);

    let html = session.export_html().unwrap();
    for needle in ["<script", "<img", "<svg onload", "<iframe", "<b>", "</style><"] {
        assert!(!html.contains(needle), "found {needle}");
    }
    assert!(html.contains("<title>&lt;/title&gt;&lt;script&gt;alert(1)&lt;/script&gt;</title>"));

    let mut elements = Vec::new();
    all_elements(session.root(), &mut elements);
    let hrefs: Vec<&str> = elements.iter().filter_map(|e| e.get_attr(Attr::Href)).collect();
    assert_eq!(hrefs, vec!["#", "#", "mailto:team@relay.example"]);
    let actions: Vec<&str> = elements.iter().filter_map(|e| e.get_attr(Attr::DataAction)).collect();
    assert_eq!(actions, vec!["go___x"]);
}

// ─── Injection and URL allowlist ─────────────────────────────────────────

proptest! {
    #[test]
    fn prop_text_never_becomes_markup(s in ".*") {
        let text = format!("x{s}");
        let mut session = session();
        session.render(&json!([{"type": "heading", "text": text}])).unwrap();
        let section = session.root().child_elements().next().unwrap();

        let mut elements = Vec::new();
        all_elements(section, &mut elements);
        prop_assert_eq!(elements.len(), 2);
        let expected: String = text.chars().filter(|c| !c.is_control() || *c == '\n' || *c == '\t').collect();
        prop_assert_eq!(section.text_content(), expected);
        prop_assert_eq!(section.to_html().matches('<').count(), 4);
    }

    #[test]
    fn prop_markup_in_any_field_stays_text(s in "[<>\"'&=/a-zA-Z0-9 ;:(){}!-]{0,40}") {
        let payload = format!("x{s}");
        let (baseline, baseline_html) = render_shape("x");
        let (shape, html) = render_shape(&payload);
        prop_assert_eq!(shape, baseline);
        prop_assert_eq!(html.matches('<').count(), baseline_html.matches('<').count());
        prop_assert_eq!(html.matches('>').count(), baseline_html.matches('>').count());
    }

    #[test]
    fn prop_disallowed_schemes_are_inert(scheme in "[a-z]{1,10}", rest in "[a-z0-9()/]{0,20}") {
        prop_assume!(!["http", "https", "mailto", "tel"].contains(&scheme.as_str()));
        let mut session = session();
        session
            .render(&json!([{"type": "cta", "buttons": [{"text": "Go", "url": format!("{scheme}:{rest}")}]}]))
            .unwrap();
        let link = session.root().find(&|e| e.tag() == "a").unwrap();
        prop_assert_eq!(link.get_attr(Attr::Href), Some("#"));
    }

    #[test]
    fn prop_allowed_urls_are_preserved(path in "[a-z0-9]{0,20}") {
        let url = format!("https://relay.example/{path}");
        let mut session = session();
        session
            .render(&json!([{"type": "cta", "buttons": [{"text": "Go", "url": url}]}]))
            .unwrap();
        let link = session.root().find(&|e| e.tag() == "a").unwrap();
        prop_assert_eq!(link.get_attr(Attr::Href), Some(url.as_str()));
    }
}

// ─── Normalization ───────────────────────────────────────────────────────

#[test]
fn test_unknown_type_is_dropped_in_order() {
    let mut session = session();
    let count = session
        .render(&json!({"sections": [
            {"type": "heading", "text": "1"},
            {"type": "text", "body": "2"},
            {"type": "carousel", "slides": []},
            {"type": "quote", "text": "3"}
        ]}))
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(kinds(&session), vec!["heading", "text", "quote"]);
}

#[test]
fn test_section_budget_counts_nested_sections() {
    let mut options = SessionOptions::new("page");
    options.limits.max_sections = 3;
    let mut session = Session::new(options).unwrap();
    session
        .render(&json!([
            {"type": "stack", "sections": [{"type": "divider"}, {"type": "divider"}]},
            {"type": "divider"},
            {"type": "divider"}
        ]))
        .unwrap();
    assert_eq!(kinds(&session), vec!["stack"]);
    assert_eq!(session.root().find_all_by_class("lp-nested").len(), 2);
}

// ─── Streaming ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bracket_stream_matches_full_render() {
    let text = load_demo("landing.json");
    let description: Value = serde_json::from_str(&text).unwrap();
    let mut full = session();
    full.render(&description).unwrap();

    for size in [1, 7, 64, 4096] {
        let mut streamed = session();
        let count = streamed
            .render_stream(tokio_stream::iter(chunks(&text, size)))
            .await
            .unwrap();
        assert_eq!(count, full.section_count());
        assert_eq!(kinds(&streamed), kinds(&full));
        assert_eq!(streamed.theme(), ThemeName::Ocean);
        assert_eq!(streamed.root().to_html(), full.root().to_html());
    }
}

#[tokio::test]
async fn test_line_stream_matches_full_render() {
    let description: Value = serde_json::from_str(&load_demo("landing.json")).unwrap();
    let mut full = session();
    full.render(&json!({"theme": "ocean", "sections": description["sections"].clone()}))
        .unwrap();

    let mut ndjson = String::from("{\"theme\":\"ocean\"}\n");
    for (i, section) in description["sections"].as_array().unwrap().iter().enumerate() {
        let line = if i % 2 == 0 {
            section.to_string()
        } else {
            json!({ "section": section }).to_string()
        };
        ndjson.push_str(&line);
        ndjson.push_str("\r\n");
    }

    let mut streamed = session();
    streamed
        .render_ndjson_stream(tokio_stream::iter(chunks(&ndjson, 13)))
        .await
        .unwrap();
    assert_eq!(kinds(&streamed), kinds(&full));
    assert_eq!(streamed.root().to_html(), full.root().to_html());
}

#[tokio::test]
async fn test_line_stream_demo_skips_garbage() {
    let mut session = session();
    let count = session
        .render_ndjson_stream(tokio_stream::iter(chunks(&load_demo("feed.ndjson"), 5)))
        .await
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(kinds(&session), vec!["hero", "feature-grid", "faq"]);
    assert_eq!(session.theme(), ThemeName::Dark);
}

#[tokio::test]
async fn test_stream_error_keeps_completed_sections() {
    let source: Vec<Result<String, String>> = vec![
        Ok("{\"sections\":[{\"type\":\"divider\"},".to_string()),
        Ok("{\"type\":\"heading\",\"te".to_string()),
        Err("connection reset".to_string()),
        Ok("xt\":\"never\"}]}".to_string()),
    ];
    let mut session = session();
    let err = session.render_stream(tokio_stream::iter(source)).await.unwrap_err();
    assert_eq!(err, PageError::Stream("connection reset".to_string()));
    assert_eq!(kinds(&session), vec!["divider"]);
}

// ─── Forms ───────────────────────────────────────────────────────────────

#[test]
fn test_form_batch_validation_focuses_first_invalid() {
    let mut session = session();
    session
        .render(&json!([{
            "type": "form",
            "id": "rsvp",
            "fields": [
                {"name": "first", "label": "First name", "required": true},
                {"name": "last", "label": "Last name", "required": true},
                {"name": "email", "label": "Email", "type": "email", "required": true}
            ]
        }]))
        .unwrap();

    let last = session.root().path_to(&|e| e.id() == Some("rsvp-last")).unwrap();
    session.dispatch(&last, &Event::Input("Lovelace".into())).unwrap();

    let outcome = session.dispatch(&[0], &Event::Submit).unwrap();
    let result = outcome.form_result.unwrap();
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors.contains_key("first"));
    assert!(result.errors.contains_key("email"));

    let visible = session
        .root()
        .find_all_by_class("lp-field-error")
        .into_iter()
        .filter(|e| !e.has_flag(Attr::Hidden))
        .count();
    assert_eq!(visible, 2);
    assert_eq!(session.focused().and_then(Element::id), Some("rsvp-first"));
}

// ─── Actions ─────────────────────────────────────────────────────────────

#[test]
fn test_action_policy_gates_callback() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut options = SessionOptions::new("page").with_action_callback(Rc::new(
        move |name: &str, _: &ActionEvent, payload: &Value| {
            sink.borrow_mut().push((name.to_string(), payload.clone()))
        },
    ));
    options.action_policy = ActionPolicy::allow_list(["go"]);
    let mut session = Session::new(options).unwrap();
    session
        .render(&json!([{"type": "cta", "buttons": [
            {"text": "Go", "url": "https://relay.example/go", "action": "go"},
            {"text": "Stop", "url": "https://relay.example/stop", "action": "stop"}
        ]}]))
        .unwrap();

    let go = session.root().path_to(&|e| e.get_attr(Attr::DataAction) == Some("go")).unwrap();
    let stop = session.root().path_to(&|e| e.get_attr(Attr::DataAction) == Some("stop")).unwrap();
    let outcome = session.dispatch(&go, &Event::Click).unwrap();
    assert_eq!(outcome.actions, vec![("go".to_string(), ActionOutcome::Invoked)]);
    let outcome = session.dispatch(&stop, &Event::Click).unwrap();
    assert_eq!(outcome.actions, vec![("stop".to_string(), ActionOutcome::Blocked)]);

    let calls = seen.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], ("go".to_string(), json!({"href": "https://relay.example/go"})));
}

// ─── Session lifecycle ───────────────────────────────────────────────────

#[test]
fn test_missing_mount_is_fatal() {
    assert_eq!(
        Session::new(SessionOptions::default()).unwrap_err(),
        PageError::MissingMount
    );
}

#[test]
fn test_render_document_helper() {
    let html = pagelet::render_document(&json!({"sections": [{"type": "divider", "label": "or"}]})).unwrap();
    assert!(html.contains("<title>Page</title>"));
    assert!(html.contains("id=\"page\""));
    assert!(html.contains("data-section=\"divider\""));
}

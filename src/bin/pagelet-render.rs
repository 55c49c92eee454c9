use pagelet::{Decoder, LineDecoder, PageError, Session, SessionOptions, ThemeName};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

struct Args {
    ndjson: bool,
    out: Option<String>,
    files: Vec<String>,
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("PAGELET_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();

    let args = match parse_args(env::args().skip(1)) {
        Some(args) => args,
        None => {
            eprintln!("Usage: pagelet-render [--ndjson] [--out <file.html>] <page.json>...");
            eprintln!();
            eprintln!("Examples:");
            eprintln!("  pagelet-render landing.json > landing.html");
            eprintln!("  pagelet-render --ndjson --out feed.html feed.ndjson");
            eprintln!("  PAGELET_LOG=debug pagelet-render demos/*.json");
            process::exit(1);
        }
    };
    if args.out.is_some() && args.files.len() > 1 {
        eprintln!("--out takes a single input file");
        process::exit(1);
    }

    let mut exit_code = 0;
    for file_path in &args.files {
        match render_file(file_path, args.ndjson) {
            Ok(html) => {
                if let Some(out) = &args.out {
                    if let Err(e) = fs::write(out, html) {
                        eprintln!("✗ {} could not be written:", out);
                        print_error(&e.into());
                        exit_code = 1;
                    } else {
                        eprintln!("✓ {} -> {}", file_path, out);
                    }
                } else {
                    print!("{}", html);
                }
            }
            Err(e) => {
                eprintln!("✗ {} failed:", file_path);
                print_error(&e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Option<Args> {
    let mut args = Args {
        ndjson: false,
        out: None,
        files: Vec::new(),
    };
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--ndjson" => args.ndjson = true,
            "--out" => args.out = Some(raw.next()?),
            "-h" | "--help" => return None,
            _ => args.files.push(arg),
        }
    }
    if args.files.is_empty() {
        None
    } else {
        Some(args)
    }
}

fn render_file(path: &str, ndjson: bool) -> Result<String, PageError> {
    let content = fs::read_to_string(path)?;
    let mut session = Session::new(SessionOptions::new("page"))?;

    // Newline-delimited input is fed through the same decoder the
    // streaming path uses; anything else is one page document.
    if ndjson || path.ends_with(".ndjson") {
        let mut decoder = LineDecoder::new(pagelet::Limits::default().max_stream_buffer);
        let mut sections = decoder.push(&content);
        sections.extend(decoder.finish());
        if let Some(theme) = decoder.take_theme() {
            session.set_theme(ThemeName::parse(&theme))?;
        }
        for section in &sections {
            session.add_section(section)?;
        }
    } else {
        let description: serde_json::Value = serde_json::from_str(&content)?;
        session.render(&description)?;
    }
    session.export_html()
}

fn print_error(error: &PageError) {
    match error {
        PageError::Json(msg) => {
            eprintln!("  JSON error:");
            eprintln!("    {}", msg);
        }
        PageError::Io(msg) => {
            eprintln!("  I/O error:");
            eprintln!("    {}", msg);
        }
        PageError::InvalidMount { id, reason } => {
            eprintln!("  Invalid mount target '{}':", id);
            eprintln!("    {}", reason);
        }
        e => {
            eprintln!("  {}", e);
        }
    }
}

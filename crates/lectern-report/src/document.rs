//! Reader page rendering.
//!
//! Blocks become an HTML fragment; the fragment is wrapped in a standalone
//! page with a table-of-contents sidebar, a reading progress bar and a
//! small scroll-spy script.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lectern_core::markdown::{Block, Span};
use lectern_core::reader::{Toc, DEFAULT_HEADER_OFFSET};

use crate::html::html_escape;

/// Escape text content. Quotes are left alone outside attributes.
fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn render_spans(spans: &[Span], out: &mut String) {
    for span in spans {
        match span {
            Span::Text(t) => out.push_str(&escape_text(t)),
            Span::Strong(t) => {
                out.push_str("<strong>");
                out.push_str(&escape_text(t));
                out.push_str("</strong>");
            }
            Span::Emphasis(children) => {
                out.push_str("<em>");
                render_spans(children, out);
                out.push_str("</em>");
            }
        }
    }
}

/// Render one block.
pub fn render_block(block: &Block) -> String {
    let mut out = String::new();
    match block {
        Block::Heading {
            level,
            slug,
            content,
        } => {
            out.push_str(&format!("<h{level} id=\"{}\">", html_escape(slug)));
            render_spans(content, &mut out);
            out.push_str(&format!("</h{level}>"));
        }
        Block::Rule => out.push_str("<hr/>"),
        Block::Spacer => out.push_str("<p class=\"spacer\"></p>"),
        Block::Paragraph {
            content,
            line_break,
        } => {
            out.push_str("<p>");
            render_spans(content, &mut out);
            if *line_break {
                out.push_str("<br/>");
            }
            out.push_str("</p>");
        }
    }
    out
}

/// Render blocks as an HTML fragment, one block per line.
pub fn render_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Options for a standalone reader page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderPageOptions {
    pub title: String,
    /// Section highlighted when the page opens.
    #[serde(default)]
    pub active: Option<String>,
    #[serde(default = "default_header_offset")]
    pub header_offset: f64,
    /// Notes shown read-only beside the document.
    #[serde(default, skip_serializing)]
    pub notes: Option<String>,
}

fn default_header_offset() -> f64 {
    DEFAULT_HEADER_OFFSET
}

impl ReaderPageOptions {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            active: None,
            header_offset: DEFAULT_HEADER_OFFSET,
            notes: None,
        }
    }
}

/// Render the table-of-contents sidebar.
pub fn render_toc(toc: &Toc, active: Option<&str>) -> String {
    let mut nav = String::from("<nav class=\"toc\">\n<ul>\n");
    for entry in toc.entries() {
        let class = if active == Some(entry.id.as_str()) {
            format!("toc-h{} active", entry.level)
        } else {
            format!("toc-h{}", entry.level)
        };
        nav.push_str(&format!(
            "<li class=\"{class}\"><a href=\"#{}\" data-id=\"{}\">{}</a></li>\n",
            html_escape(&entry.id),
            html_escape(&entry.id),
            escape_text(&entry.title)
        ));
    }
    nav.push_str("</ul>\n</nav>\n");
    nav
}

/// Generate a standalone reader page.
pub fn generate_reader_page(blocks: &[Block], options: &ReaderPageOptions) -> String {
    let toc = Toc::from_blocks(blocks);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_text(&options.title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");
    html.push_str("<div class=\"progress\"><div id=\"progress-bar\"></div></div>\n");

    html.push_str(&render_toc(&toc, options.active.as_deref()));

    html.push_str("<main class=\"document\">\n");
    html.push_str(&render_blocks(blocks));
    html.push_str("\n</main>\n");

    if let Some(notes) = &options.notes {
        html.push_str("<aside class=\"notes\">\n<h2>Notes</h2>\n<pre>");
        html.push_str(&escape_text(notes));
        html.push_str("</pre>\n</aside>\n");
    }

    // `<` is escaped so the embedded JSON cannot close the script element.
    let config = serde_json::to_string(options)
        .unwrap_or_else(|_| "{}".to_string())
        .replace('<', "\\u003c");
    html.push_str("<script>\n");
    html.push_str(&format!("const LECTERN = {config};\n"));
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write a reader page to a file.
pub fn write_reader_page(blocks: &[Block], options: &ReaderPageOptions, path: &Path) -> Result<()> {
    let html = generate_reader_page(blocks, options);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write reader page to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fdfcf9; --fg: #1f2937; --muted: #6b7280; --border: #e5e7eb; --accent: #b45309; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f3f4f6; --muted: #9ca3af; --border: #374151; --accent: #f59e0b; }
}
body { font-family: Georgia, 'Noto Serif SC', serif; margin: 0; background: var(--bg); color: var(--fg); line-height: 1.7; }
.progress { position: fixed; top: 0; left: 0; right: 0; height: 3px; background: var(--border); }
#progress-bar { height: 100%; width: 0; background: var(--accent); }
nav.toc { position: fixed; top: 3px; bottom: 0; left: 0; width: 260px; overflow-y: auto; border-right: 1px solid var(--border); padding: 1rem; box-sizing: border-box; }
nav.toc ul { list-style: none; margin: 0; padding: 0; }
nav.toc a { color: var(--muted); text-decoration: none; display: block; padding: 0.15rem 0; }
nav.toc .toc-h2 { padding-left: 1rem; }
nav.toc .toc-h3 { padding-left: 2rem; font-size: 0.9rem; }
nav.toc .active a { color: var(--accent); font-weight: bold; }
main.document { margin-left: 280px; max-width: 760px; padding: 2rem; }
p.spacer { margin: 0; height: 0.75rem; }
aside.notes { margin-left: 280px; max-width: 760px; padding: 0 2rem 2rem; }
aside.notes pre { white-space: pre-wrap; border: 1px solid var(--border); padding: 1rem; border-radius: 8px; }
"#;

const JS: &str = r#"
const headings = Array.from(document.querySelectorAll('main h1, main h2, main h3'));
const links = Array.from(document.querySelectorAll('nav.toc li'));
function setActive(id) {
  links.forEach(li => li.classList.toggle('active', li.querySelector('a').dataset.id === id));
}
function currentIndex() {
  const line = window.scrollY + LECTERN.header_offset;
  let index = 0;
  headings.forEach((h, i) => { if (h.offsetTop <= line) index = i; });
  return index;
}
window.addEventListener('scroll', () => {
  const el = document.documentElement;
  const ratio = Math.min(1, Math.max(0, el.scrollTop / (el.scrollHeight - el.clientHeight + 0.0001)));
  document.getElementById('progress-bar').style.width = (ratio * 100) + '%';
  if (headings.length) setActive(headings[currentIndex()].id);
});
document.addEventListener('keydown', e => {
  if (!headings.length || (e.key !== 'j' && e.key !== 'k')) return;
  const next = Math.min(headings.length - 1, Math.max(0, currentIndex() + (e.key === 'j' ? 1 : -1)));
  headings[next].scrollIntoView();
});
if (LECTERN.active) {
  const target = document.getElementById(LECTERN.active);
  if (target) target.scrollIntoView();
}
"#;

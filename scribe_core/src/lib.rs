//! `scribe_core` is the core library for the scribe static site generator. It
//! translates a lightweight markdown dialect into HTML fragments and builds a
//! site of posts, pages and tag listings around them.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Content file
//!   → Front matter (YAML between `---` lines, split from the body)
//!   → Lexer (single pass, mode and line-start aware, one token per call)
//!   → Parser (recursive descent over blocks and inline spans → HTML)
//!   → Render cache (content hash → rendered HTML, reused on the next build)
//!   → Templates (minijinja pages wrapping the rendered fragments)
//! ```
//!
//! ## Dialect
//!
//! - `#` to `######` followed by a space at the start of a line: heading.
//! - `- `, `* ` or `+ ` at the start of a line: list item. Consecutive items
//!   form one list.
//! - `> `: blockquote. Consecutive quote lines fold into one paragraph.
//! - `*italic*`, `**bold**`, `` `code` `` and `$math$` spans.
//! - `\` makes the next character literal.
//! - A blank line separates blocks.
//!
//! Malformed markup never fails to render. An unclosed span is closed at the
//! end of its block, see [`RenderOptions`] for an opt-in strict mode.
//!
//! ## Quick Start
//!
//! ```rust
//! let html = scribe_core::render("# Title\n\nHello *world*.");
//! assert_eq!(html, "<h1>Title</h1>\n<p>Hello <em>world</em>.</p>\n");
//! ```

pub use cache::*;
pub use config::*;
pub use error::*;
pub use front_matter::*;
pub use lexer::*;
pub use parser::*;
pub use site::*;
pub use templates::SiteTemplates;
pub use tokens::*;

pub mod cache;
pub mod config;
#[allow(unused_assignments)]
mod error;
mod front_matter;
mod lexer;
mod parser;
pub mod site;
pub mod templates;
mod tokens;

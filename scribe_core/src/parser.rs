use tracing::debug;

use crate::ScribeError;
use crate::ScribeResult;
use crate::lexer::tokenize;
use crate::tokens::Token;
use crate::tokens::TokenKind;

/// A problem noticed while rendering. Diagnostics never stop rendering, the
/// markup is always closed on a best-effort basis.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseDiagnostic {
	/// A span was opened but ran into a block boundary before its closing
	/// delimiter.
	UnclosedSpan {
		kind: TokenKind,
		/// Index of the opening delimiter in the token stream.
		token_index: usize,
	},
}

/// How a call to [`parse_until`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanEnd {
	/// The requested closing delimiter was found and consumed.
	Closed,
	/// A block boundary (or the end of the tokens) was reached first.
	Boundary,
}

/// Options for [`render_with_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
	/// Fail on the first unclosed span instead of closing it silently.
	pub strict: bool,
}

/// The output buffer shared by every rule of a single parse.
#[derive(Debug, Default)]
pub struct HtmlWriter {
	html: String,
	diagnostics: Vec<ParseDiagnostic>,
}

impl HtmlWriter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_str(&mut self, value: &str) {
		self.html.push_str(value);
	}

	/// Write `<tag>`.
	pub fn open_tag(&mut self, tag: &str) {
		self.html.push('<');
		self.html.push_str(tag);
		self.html.push('>');
	}

	/// Write `</tag>`.
	pub fn close_tag(&mut self, tag: &str) {
		self.html.push_str("</");
		self.html.push_str(tag);
		self.html.push('>');
	}

	pub fn html(&self) -> &str {
		&self.html
	}

	pub fn diagnostics(&self) -> &[ParseDiagnostic] {
		&self.diagnostics
	}

	pub fn finish(self) -> (String, Vec<ParseDiagnostic>) {
		(self.html, self.diagnostics)
	}

	fn diagnose(&mut self, diagnostic: ParseDiagnostic) {
		self.diagnostics.push(diagnostic);
	}
}

/// Lex and parse a document body into an HTML fragment.
pub fn render(input: &str) -> String {
	let tokens = tokenize(input);
	parse(&tokens)
}

/// Like [`render`], also returning diagnostics for unclosed spans.
pub fn render_with_diagnostics(input: &str) -> (String, Vec<ParseDiagnostic>) {
	let tokens = tokenize(input);
	parse_with_diagnostics(&tokens)
}

/// Render a document body, honouring `options`. `source_name` identifies the
/// document in errors and logs.
pub fn render_with_options(
	input: &str,
	options: &RenderOptions,
	source_name: &str,
) -> ScribeResult<String> {
	render_document(input, options, source_name).map(|(html, _)| html)
}

/// Like [`render_with_options`], also returning the diagnostics of a
/// successful render so callers can cache them.
pub fn render_document(
	input: &str,
	options: &RenderOptions,
	source_name: &str,
) -> ScribeResult<(String, Vec<ParseDiagnostic>)> {
	let tokens = tokenize(input);
	let (html, diagnostics) = parse_with_diagnostics(&tokens);

	debug!(
		source = source_name,
		tokens = tokens.len(),
		diagnostics = diagnostics.len(),
		"rendered document"
	);

	if options.strict {
		if let Some(ParseDiagnostic::UnclosedSpan { kind, token_index }) = diagnostics.first() {
			return Err(ScribeError::UnclosedSpan {
				path: source_name.to_string(),
				kind: *kind,
				token_index: *token_index,
			});
		}
	}

	Ok((html, diagnostics))
}

/// Convert a token sequence into HTML. Never fails.
pub fn parse(tokens: &[Token<'_>]) -> String {
	parse_with_diagnostics(tokens).0
}

/// Convert a token sequence into HTML and collect diagnostics along the way.
pub fn parse_with_diagnostics(tokens: &[Token<'_>]) -> (String, Vec<ParseDiagnostic>) {
	let mut writer = HtmlWriter::new();
	let mut cursor = 0;

	while let Some(token) = tokens.get(cursor) {
		match token.kind {
			TokenKind::Heading => parse_heading(tokens, &mut cursor, &mut writer),
			TokenKind::List => parse_list(tokens, &mut cursor, &mut writer),
			TokenKind::Quote => parse_quote(tokens, &mut cursor, &mut writer),
			// Block separators. A lone newline can show up here after a blank
			// line.
			TokenKind::BlankLine | TokenKind::Newline => cursor += 1,
			TokenKind::EndOfInput => break,
			TokenKind::Text
			| TokenKind::Italic
			| TokenKind::Bold
			| TokenKind::InlineCode
			| TokenKind::Math => parse_paragraph(tokens, &mut cursor, &mut writer),
		}
	}

	writer.finish()
}

fn parse_heading(tokens: &[Token<'_>], cursor: &mut usize, writer: &mut HtmlWriter) {
	let tag = format!("h{}", tokens[*cursor].heading_level().clamp(1, 6));
	*cursor += 1;

	writer.open_tag(&tag);
	parse_until(tokens, cursor, None, writer);
	writer.close_tag(&tag);
	writer.push_str("\n");
}

fn parse_list(tokens: &[Token<'_>], cursor: &mut usize, writer: &mut HtmlWriter) {
	writer.push_str("<ul>");

	while is_kind(tokens, *cursor, TokenKind::List) {
		*cursor += 1;
		writer.push_str("<li>");
		parse_until(tokens, cursor, None, writer);
		writer.push_str("</li>");
	}

	writer.push_str("</ul>\n");
}

/// Consecutive quote lines fold into a single paragraph joined by spaces.
fn parse_quote(tokens: &[Token<'_>], cursor: &mut usize, writer: &mut HtmlWriter) {
	writer.push_str("<blockquote><p>");
	let start = writer.html.len();

	while is_kind(tokens, *cursor, TokenKind::Quote) {
		*cursor += 1;

		if writer.html.len() > start {
			writer.push_str(" ");
		}

		parse_until(tokens, cursor, None, writer);
	}

	writer.push_str("</p></blockquote>\n");
}

fn parse_paragraph(tokens: &[Token<'_>], cursor: &mut usize, writer: &mut HtmlWriter) {
	writer.push_str("<p>");
	parse_until(tokens, cursor, None, writer);
	writer.push_str("</p>\n");
}

/// Render inline tokens starting at `cursor` until `closing` is found, or
/// until the enclosing block ends.
///
/// - The closing delimiter is consumed and [`SpanEnd::Closed`] returned.
/// - `BlankLine`, `EndOfInput`, `Heading`, `List` and `Quote` are left in
///   place and [`SpanEnd::Boundary`] returned.
/// - A newline directly before one of those boundaries is consumed without
///   output, any other newline folds into a single space.
///
/// A delimiter of the same kind as `closing` always closes the span, so same
/// kind spans never nest. Different kinds nest through recursion.
pub fn parse_until(
	tokens: &[Token<'_>],
	cursor: &mut usize,
	closing: Option<TokenKind>,
	writer: &mut HtmlWriter,
) -> SpanEnd {
	while let Some(token) = tokens.get(*cursor) {
		if closing == Some(token.kind) {
			*cursor += 1;
			return SpanEnd::Closed;
		}

		if token.kind.ends_block() || token.kind.starts_block() {
			return SpanEnd::Boundary;
		}

		*cursor += 1;

		match token.kind {
			TokenKind::Text => writer.push_str(token.value),
			TokenKind::Newline => {
				let next = tokens.get(*cursor).map(|next| next.kind);
				match next {
					Some(kind) if !kind.ends_block() && !kind.starts_block() => {
						writer.push_str(" ");
					}
					_ => return SpanEnd::Boundary,
				}
			}
			TokenKind::Bold => parse_span(tokens, cursor, TokenKind::Bold, "strong", writer),
			TokenKind::Italic => parse_span(tokens, cursor, TokenKind::Italic, "em", writer),
			TokenKind::InlineCode => {
				parse_span(tokens, cursor, TokenKind::InlineCode, "code", writer);
			}
			TokenKind::Math => {
				writer.push_str("<math>");
				writer.push_str(token.value);
				writer.push_str("</math>");
			}
			// Boundaries are handled above.
			TokenKind::EndOfInput
			| TokenKind::BlankLine
			| TokenKind::Heading
			| TokenKind::List
			| TokenKind::Quote => {}
		}
	}

	SpanEnd::Boundary
}

/// The opening delimiter has already been consumed. The closing tag is
/// written even when the source never closed the span.
fn parse_span(
	tokens: &[Token<'_>],
	cursor: &mut usize,
	kind: TokenKind,
	tag: &str,
	writer: &mut HtmlWriter,
) {
	let token_index = *cursor - 1;

	writer.open_tag(tag);
	if parse_until(tokens, cursor, Some(kind), writer) == SpanEnd::Boundary {
		writer.diagnose(ParseDiagnostic::UnclosedSpan { kind, token_index });
	}
	writer.close_tag(tag);
}

fn is_kind(tokens: &[Token<'_>], index: usize, kind: TokenKind) -> bool {
	tokens.get(index).is_some_and(|token| token.kind == kind)
}

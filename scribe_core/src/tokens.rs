use std::fmt::Display;

use derive_more::Deref;
use derive_more::DerefMut;

/// The structural role of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
	/// Always the last token of a stream.
	EndOfInput,
	/// A run of literal characters.
	Text,
	/// `*`
	Italic,
	/// `**`
	Bold,
	/// `` ` ``
	InlineCode,
	/// `> `
	Quote,
	/// `\n`
	Newline,
	/// `\n\n`
	BlankLine,
	/// `#` to `######` followed by a space, at the start of a line.
	Heading,
	/// `- `, `* ` or `+ ` at the start of a line.
	List,
	/// The interior of a `$...$` span.
	Math,
}

impl TokenKind {
	/// Kinds which may only appear at the start of a line and therefore end
	/// any inline run that encounters them.
	pub fn starts_block(self) -> bool {
		matches!(self, Self::Heading | Self::List | Self::Quote)
	}

	/// Kinds which end the enclosing block.
	pub fn ends_block(self) -> bool {
		matches!(self, Self::BlankLine | Self::EndOfInput)
	}
}

impl Display for TokenKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::EndOfInput => "END_OF_INPUT",
			Self::Text => "TEXT",
			Self::Italic => "ITALIC",
			Self::Bold => "BOLD",
			Self::InlineCode => "INLINE_CODE",
			Self::Quote => "QUOTE",
			Self::Newline => "NEWLINE",
			Self::BlankLine => "BLANK_LINE",
			Self::Heading => "HEADING",
			Self::List => "LIST",
			Self::Math => "MATH",
		};

		write!(f, "{name}")
	}
}

/// A single lexeme. The value borrows from the source buffer, or is the
/// static spelling of a delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
	pub kind: TokenKind,
	pub value: &'a str,
}

impl<'a> Token<'a> {
	pub const fn new(kind: TokenKind, value: &'a str) -> Self {
		Self { kind, value }
	}

	pub const fn end_of_input() -> Self {
		Self::new(TokenKind::EndOfInput, "")
	}

	pub const fn text(value: &'a str) -> Self {
		Self::new(TokenKind::Text, value)
	}

	/// The number of `#` characters in a heading marker. Zero for every other
	/// kind.
	pub fn heading_level(&self) -> usize {
		if self.kind != TokenKind::Heading {
			return 0;
		}

		self.value.bytes().filter(|byte| *byte == b'#').count()
	}
}

impl Display for Token<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} {:?}", self.kind, self.value)
	}
}

/// The complete token sequence for one document. Always terminated by
/// exactly one [`TokenKind::EndOfInput`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct TokenStream<'a>(
	#[deref]
	#[deref_mut]
	Vec<Token<'a>>,
);

impl<'a> TokenStream<'a> {
	pub fn into_inner(self) -> Vec<Token<'a>> {
		self.0
	}

	/// The kinds of every token, in order. Handy when only the shape of the
	/// stream matters.
	pub fn kinds(&self) -> Vec<TokenKind> {
		self.0.iter().map(|token| token.kind).collect()
	}
}

impl<'a> FromIterator<Token<'a>> for TokenStream<'a> {
	fn from_iter<I: IntoIterator<Item = Token<'a>>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

use crate::tokens::Token;
use crate::tokens::TokenKind;
use crate::tokens::TokenStream;

/// The scanning modes of the lexer. The mode decides which characters are
/// structural and which are literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexerMode {
	/// Plain paragraph text.
	#[default]
	Text,
	/// Entered after a `**` delimiter.
	Bold,
	/// Entered after a `*` delimiter.
	Italic,
	/// Inside a `` ` `` span. Only a backtick, a newline and block markers at
	/// the start of a line are structural here.
	InlineCode,
	/// Entered after a `> ` marker.
	Quote,
}

/// Single pass, left to right scanner which produces one [`Token`] per call
/// to [`Lexer::next_token`]. The position never moves backwards.
///
/// Malformed markup never fails: anything which is not recognised as a
/// delimiter is returned as [`TokenKind::Text`].
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
	/// The document body, front matter already removed.
	input: &'a str,
	/// Byte offset of the next unread character.
	position: usize,
	/// The current scanning mode.
	mode: LexerMode,
	/// True at the start of the input and directly after a newline.
	at_line_start: bool,
	/// Set once the iterator has yielded `EndOfInput`.
	finished: bool,
}

impl<'a> Lexer<'a> {
	pub fn new(input: &'a str) -> Self {
		Self {
			input,
			position: 0,
			mode: LexerMode::Text,
			at_line_start: true,
			finished: false,
		}
	}

	pub fn mode(&self) -> LexerMode {
		self.mode
	}

	pub fn position(&self) -> usize {
		self.position
	}

	pub fn is_at_line_start(&self) -> bool {
		self.at_line_start
	}

	/// Scan and return the next token. Once the input is exhausted every call
	/// returns [`TokenKind::EndOfInput`].
	pub fn next_token(&mut self) -> Token<'a> {
		match self.mode {
			LexerMode::InlineCode => self.next_code_token(),
			LexerMode::Text | LexerMode::Bold | LexerMode::Italic | LexerMode::Quote => {
				self.next_markup_token()
			}
		}
	}

	fn next_markup_token(&mut self) -> Token<'a> {
		if self.is_at_end() {
			return Token::end_of_input();
		}

		let current = self.current();

		if current == b'\n' {
			return self.read_newline();
		}

		if current == b'\\' {
			self.at_line_start = false;
			return self.read_escape();
		}

		if self.at_line_start {
			if let Some(token) = self.read_line_marker() {
				self.at_line_start = false;
				return token;
			}
		}

		self.at_line_start = false;

		match (current, self.peek()) {
			(b'>', b' ') => {
				self.mode = LexerMode::Quote;
				self.read_delimiter(TokenKind::Quote, 2)
			}
			(b'`', _) => {
				self.mode = LexerMode::InlineCode;
				self.read_delimiter(TokenKind::InlineCode, 1)
			}
			(b'*', b'*') => {
				self.mode = LexerMode::Bold;
				self.read_delimiter(TokenKind::Bold, 2)
			}
			(b'*', _) => {
				self.mode = LexerMode::Italic;
				self.read_delimiter(TokenKind::Italic, 1)
			}
			(b'$', _) => self.read_math(),
			_ => self.read_text(),
		}
	}

	/// A code span runs to the next backtick, but never past the end of its
	/// block: a blank line or a block marker at the start of a line returns
	/// the lexer to markup scanning.
	fn next_code_token(&mut self) -> Token<'a> {
		if self.is_at_end() {
			return Token::end_of_input();
		}

		if self.current() == b'\n' {
			let token = self.read_newline();
			if token.kind == TokenKind::BlankLine {
				self.mode = LexerMode::Text;
			}
			return token;
		}

		if self.at_line_start {
			if let Some(token) = self.read_line_marker() {
				self.at_line_start = false;
				self.mode = LexerMode::Text;
				return token;
			}

			if self.current() == b'>' && self.peek() == b' ' {
				self.at_line_start = false;
				self.mode = LexerMode::Quote;
				return self.read_delimiter(TokenKind::Quote, 2);
			}
		}

		self.at_line_start = false;

		if self.current() == b'`' {
			self.mode = LexerMode::Text;
			return self.read_delimiter(TokenKind::InlineCode, 1);
		}

		self.read_text()
	}

	/// Heading and list markers, which only count at the start of a line.
	fn read_line_marker(&mut self) -> Option<Token<'a>> {
		let current = self.current();

		if current == b'#' {
			let level = self.input.as_bytes()[self.position..]
				.iter()
				.take_while(|byte| **byte == b'#')
				.count();

			if level <= 6 && self.byte_at(self.position + level) == b' ' {
				return Some(self.read_delimiter(TokenKind::Heading, level + 1));
			}
		}

		if matches!(current, b'-' | b'*' | b'+') && self.peek() == b' ' {
			self.position += 2;
			return Some(Token::new(TokenKind::List, "- "));
		}

		None
	}

	fn read_newline(&mut self) -> Token<'a> {
		self.at_line_start = true;

		if self.peek() == b'\n' {
			self.read_delimiter(TokenKind::BlankLine, 2)
		} else {
			self.read_delimiter(TokenKind::Newline, 1)
		}
	}

	/// Drop the backslash and return the following character as literal text.
	/// A backslash at the very end of the input is kept as it is.
	fn read_escape(&mut self) -> Token<'a> {
		let backslash = self.position;
		self.position += 1;

		let Some(escaped) = self.input[self.position..].chars().next() else {
			return Token::text(&self.input[backslash..self.position]);
		};

		let start = self.position;
		self.position += escaped.len_utf8();
		Token::text(&self.input[start..self.position])
	}

	/// Capture everything up to the closing `$`. An unterminated span runs to
	/// the end of the input.
	fn read_math(&mut self) -> Token<'a> {
		self.position += 1;
		let start = self.position;

		if let Some(offset) = self.input[start..].find('$') {
			let end = start + offset;
			self.position = end + 1;
			Token::new(TokenKind::Math, &self.input[start..end])
		} else {
			self.position = self.input.len();
			Token::new(TokenKind::Math, &self.input[start..])
		}
	}

	fn read_text(&mut self) -> Token<'a> {
		let start = self.position;

		while !self.is_at_end() && !self.stops_text(self.current()) {
			self.position += 1;
		}

		Token::text(&self.input[start..self.position])
	}

	fn stops_text(&self, byte: u8) -> bool {
		match self.mode {
			LexerMode::InlineCode => matches!(byte, b'`' | b'\n'),
			LexerMode::Text | LexerMode::Bold | LexerMode::Italic | LexerMode::Quote => {
				matches!(byte, b'*' | b'$' | b'\n' | b'`' | b'\\')
			}
		}
	}

	/// Consume `len` bytes and return them as a token of the given kind.
	fn read_delimiter(&mut self, kind: TokenKind, len: usize) -> Token<'a> {
		let start = self.position;
		self.position = (self.position + len).min(self.input.len());
		Token::new(kind, &self.input[start..self.position])
	}

	fn is_at_end(&self) -> bool {
		self.position >= self.input.len()
	}

	fn current(&self) -> u8 {
		self.byte_at(self.position)
	}

	fn peek(&self) -> u8 {
		self.byte_at(self.position + 1)
	}

	fn byte_at(&self, index: usize) -> u8 {
		self.input.as_bytes().get(index).copied().unwrap_or(0)
	}
}

impl<'a> Iterator for Lexer<'a> {
	type Item = Token<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.finished {
			return None;
		}

		let token = self.next_token();
		if token.kind == TokenKind::EndOfInput {
			self.finished = true;
		}

		Some(token)
	}
}

impl std::iter::FusedIterator for Lexer<'_> {}

/// Scan the whole input into a [`TokenStream`] ending with a single
/// [`TokenKind::EndOfInput`].
pub fn tokenize(input: &str) -> TokenStream<'_> {
	Lexer::new(input).collect()
}

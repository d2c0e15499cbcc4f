use miette::Diagnostic;
use thiserror::Error;

use crate::tokens::TokenKind;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ScribeError {
	#[error(transparent)]
	#[diagnostic(code(scribe::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse front matter in `{path}`: {reason}")]
	#[diagnostic(
		code(scribe::front_matter),
		help("front matter must be YAML between two `---` lines at the top of the file")
	)]
	FrontMatter { path: String, reason: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(scribe::config_parse),
		help("check that scribe.toml is valid TOML with optional [site], [render] and [cache] sections")
	)]
	ConfigParse(String),

	#[error("template rendering failed: {0}")]
	#[diagnostic(code(scribe::template))]
	Template(String),

	#[error("unclosed {kind} span in `{path}` (token {token_index})")]
	#[diagnostic(
		code(scribe::unclosed_span),
		help("close the span with a matching delimiter or escape it with `\\`")
	)]
	UnclosedSpan {
		path: String,
		kind: TokenKind,
		token_index: usize,
	},

	#[error("failed to write render cache `{path}`: {reason}")]
	#[diagnostic(
		code(scribe::cache_write),
		help("remove the `.scribe` directory or build with `--no-cache`")
	)]
	CacheWrite { path: String, reason: String },
}

pub type ScribeResult<T> = Result<T, ScribeError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;

use serde::Deserialize;
use serde::Serialize;

use crate::ScribeError;
use crate::ScribeResult;

const DELIMITER: &str = "---";

/// Metadata declared at the top of a content file.
///
/// ```markdown
/// ---
/// title: "My First Post"
/// date: "2023-10-01"
/// tags: ["rust", "ssg"]
/// ---
/// # Hello World
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
	pub title: String,
	pub date: String,
	pub tags: Vec<String>,
}

/// Split a content file into its front matter and body.
///
/// A file without an opening `---` line, or with an opening line but no
/// closing one, has no front matter and the whole content is the body.
pub fn extract_front_matter<'a>(
	content: &'a str,
	source_name: &str,
) -> ScribeResult<(FrontMatter, &'a str)> {
	let Some(rest) = strip_opening_delimiter(content) else {
		return Ok((FrontMatter::default(), content));
	};

	let mut offset = 0;

	for line in rest.split_inclusive('\n') {
		if is_delimiter(line) {
			let yaml = &rest[..offset];
			let body = &rest[offset + line.len()..];

			let front_matter = if yaml.trim().is_empty() {
				FrontMatter::default()
			} else {
				serde_yaml_ng::from_str(yaml).map_err(|e| ScribeError::FrontMatter {
					path: source_name.to_string(),
					reason: e.to_string(),
				})?
			};

			return Ok((front_matter, body));
		}

		offset += line.len();
	}

	Ok((FrontMatter::default(), content))
}

fn strip_opening_delimiter(content: &str) -> Option<&str> {
	let (first, rest) = content.split_once('\n')?;
	is_delimiter(first).then_some(rest)
}

fn is_delimiter(line: &str) -> bool {
	line.trim_end_matches(['\r', '\n']) == DELIMITER
}

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::RenderOptions;
use crate::ScribeError;
use crate::ScribeResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["scribe.toml", ".scribe.toml", ".config/scribe.toml"];

/// Configuration loaded from a `scribe.toml` file. Every field is optional.
///
/// ```toml
/// content_dir = "content"
/// output_dir = "public"
/// templates_dir = "templates"
/// static_dir = "static"
///
/// [site]
/// title = "My notes"
/// base_url = "https://example.com"
///
/// [render]
/// strict = false
///
/// [cache]
/// enabled = true
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScribeConfig {
	/// Directory holding `posts/` and `pages/`, relative to the project root.
	pub content_dir: PathBuf,
	/// Directory the generated site is written to.
	pub output_dir: PathBuf,
	/// Directory searched for `index.html`, `post.html`, `page.html` and
	/// `tag.html` template overrides.
	pub templates_dir: PathBuf,
	/// Directory copied verbatim to `<output_dir>/static`.
	pub static_dir: PathBuf,
	pub site: SiteConfig,
	pub render: RenderConfig,
	pub cache: CacheConfig,
}

impl Default for ScribeConfig {
	fn default() -> Self {
		Self {
			content_dir: PathBuf::from("content"),
			output_dir: PathBuf::from("public"),
			templates_dir: PathBuf::from("templates"),
			static_dir: PathBuf::from("static"),
			site: SiteConfig::default(),
			render: RenderConfig::default(),
			cache: CacheConfig::default(),
		}
	}
}

/// Values exposed to every template as `site`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
	pub title: String,
	pub base_url: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
	/// Treat unclosed inline spans as errors.
	pub strict: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
	/// Reuse rendered HTML for files whose content hash did not change.
	pub enabled: bool,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self { enabled: true }
	}
}

impl ScribeConfig {
	/// Find the first config file candidate that exists at `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> ScribeResult<Option<ScribeConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: ScribeConfig =
			toml::from_str(&content).map_err(|e| ScribeError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}

	/// Like [`ScribeConfig::load`] but falls back to the defaults.
	pub fn load_or_default(root: &Path) -> ScribeResult<ScribeConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	pub fn render_options(&self) -> RenderOptions {
		RenderOptions {
			strict: self.render.strict,
		}
	}
}

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::FrontMatter;
use crate::ScribeError;
use crate::ScribeResult;

pub(crate) const CACHE_SCHEMA_VERSION: u32 = 2;
const CACHE_FILE_NAME: &str = "render-v2.json";

/// The rendered output of one content file, valid while its hash matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedFile {
	pub hash: u64,
	pub front_matter: FrontMatter,
	pub content_html: String,
	/// Unclosed spans found while rendering. A strict build re-renders any
	/// entry with diagnostics so it fails the same way an uncached one does.
	pub diagnostics: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheFile {
	schema_version: u32,
	files: BTreeMap<String, CachedFile>,
}

/// Rendered documents keyed by their path relative to the project root, so
/// unchanged files skip lexing and parsing on the next build.
#[derive(Debug, Clone)]
pub struct RenderCache {
	path: PathBuf,
	files: BTreeMap<String, CachedFile>,
}

impl RenderCache {
	/// An empty cache which will be saved to the default location under
	/// `root`.
	pub fn new(root: &Path) -> Self {
		Self {
			path: cache_path(root),
			files: BTreeMap::new(),
		}
	}

	/// Read the cache stored under `root`. A missing, outdated or unreadable
	/// cache file results in an empty cache.
	pub fn load(root: &Path) -> Self {
		let mut cache = Self::new(root);

		let bytes = match std::fs::read(&cache.path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return cache,
			Err(e) => {
				warn!(path = %cache.path.display(), "failed to read render cache: {e}");
				return cache;
			}
		};

		match serde_json::from_slice::<CacheFile>(&bytes) {
			Ok(file) if file.schema_version == CACHE_SCHEMA_VERSION => {
				debug!(entries = file.files.len(), "loaded render cache");
				cache.files = file.files;
			}
			Ok(file) => {
				debug!(
					found = file.schema_version,
					expected = CACHE_SCHEMA_VERSION,
					"ignoring render cache with another schema version"
				);
			}
			Err(e) => {
				warn!(path = %cache.path.display(), "failed to parse render cache: {e}");
			}
		}

		cache
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn len(&self) -> usize {
		self.files.len()
	}

	pub fn is_empty(&self) -> bool {
		self.files.is_empty()
	}

	/// The cached entry for `key`, only when it was produced from content with
	/// the same `hash`.
	pub fn lookup(&self, key: &str, hash: u64) -> Option<&CachedFile> {
		self.files.get(key).filter(|entry| entry.hash == hash)
	}

	pub fn insert(&mut self, key: impl Into<String>, entry: CachedFile) {
		self.files.insert(key.into(), entry);
	}

	/// Drop every entry whose key `keep` rejects, returning how many were
	/// removed.
	pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
		let before = self.files.len();
		self.files.retain(|key, _| keep(key));
		before - self.files.len()
	}

	/// Write the cache to disk. The file is written to a temporary sibling and
	/// renamed into place.
	pub fn save(&self) -> ScribeResult<()> {
		let write_error = |reason: String| {
			ScribeError::CacheWrite {
				path: self.path.display().to_string(),
				reason,
			}
		};

		if let Some(cache_dir) = self.path.parent() {
			std::fs::create_dir_all(cache_dir).map_err(|e| write_error(e.to_string()))?;
		}

		let payload = serde_json::to_vec_pretty(&CacheFile {
			schema_version: CACHE_SCHEMA_VERSION,
			files: self.files.clone(),
		})
		.map_err(|e| write_error(e.to_string()))?;

		let temp_path = self.path.with_extension(format!(
			"json.tmp-{}-{}",
			std::process::id(),
			SystemTime::now()
				.duration_since(UNIX_EPOCH)
				.map_or(0, |duration| duration.as_nanos())
		));

		std::fs::write(&temp_path, payload).map_err(|e| write_error(e.to_string()))?;

		if let Err(e) = std::fs::rename(&temp_path, &self.path) {
			let _ = std::fs::remove_file(&temp_path);
			return Err(write_error(e.to_string()));
		}

		debug!(entries = self.files.len(), path = %self.path.display(), "saved render cache");
		Ok(())
	}
}

pub(crate) fn cache_path(root: &Path) -> PathBuf {
	root.join(".scribe").join("cache").join(CACHE_FILE_NAME)
}

/// The cache key for `file`: its path relative to `root` with `/`
/// separators.
pub fn relative_file_key(root: &Path, file: &Path) -> String {
	file.strip_prefix(root)
		.unwrap_or(file)
		.to_string_lossy()
		.replace('\\', "/")
}

pub fn content_hash(bytes: &[u8]) -> u64 {
	let mut hasher = DefaultHasher::new();
	bytes.hash(&mut hasher);
	hasher.finish()
}

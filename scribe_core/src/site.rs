use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use minijinja::context;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::FrontMatter;
use crate::RenderOptions;
use crate::ScribeConfig;
use crate::ScribeResult;
use crate::cache::CachedFile;
use crate::cache::RenderCache;
use crate::cache::content_hash;
use crate::cache::relative_file_key;
use crate::extract_front_matter;
use crate::render_document;
use crate::templates::INDEX_TEMPLATE;
use crate::templates::PAGE_TEMPLATE;
use crate::templates::POST_TEMPLATE;
use crate::templates::SiteTemplates;
use crate::templates::TAG_TEMPLATE;

/// A rendered post or page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
	#[serde(flatten)]
	pub front_matter: FrontMatter,
	/// The rendered HTML fragment.
	pub content: String,
	/// The file stem, used for the output file name.
	pub slug: String,
	#[serde(skip)]
	pub source: PathBuf,
}

/// A content file that was left out of the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
	pub path: PathBuf,
	pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
	pub cache_hits: usize,
	pub cache_misses: usize,
	pub skipped: Vec<SkippedFile>,
}

/// The posts sharing one tag page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
	/// The spelling of the tag as first seen, newest post first.
	pub name: String,
	pub posts: Vec<Document>,
}

/// Everything loaded from the content directory.
#[derive(Debug, Clone, Default)]
pub struct Site {
	/// Newest first.
	pub posts: Vec<Document>,
	pub pages: Vec<Document>,
	/// Tags keyed by [`tag_slug`], so spellings differing only by case or
	/// spacing share a page.
	pub tags: BTreeMap<String, Tag>,
}

impl Site {
	/// Load `posts/` and `pages/` from the configured content directory.
	/// Passing a cache reuses the HTML of unchanged files and records newly
	/// rendered ones.
	pub fn load(
		root: &Path,
		config: &ScribeConfig,
		cache: Option<&mut RenderCache>,
	) -> ScribeResult<(Site, LoadStats)> {
		let content_dir = root.join(&config.content_dir);
		let mut loader = ContentLoader {
			root,
			options: config.render_options(),
			cache,
			seen: BTreeSet::new(),
			stats: LoadStats::default(),
		};

		let mut posts = loader.load_dir(&content_dir.join("posts"))?;
		let pages = loader.load_dir(&content_dir.join("pages"))?;

		// Dates are compared as strings, ISO dates sort correctly.
		posts.sort_by(|a, b| b.front_matter.date.cmp(&a.front_matter.date));

		let mut tags: BTreeMap<String, Tag> = BTreeMap::new();
		for post in &posts {
			for name in &post.front_matter.tags {
				let tag = tags.entry(tag_slug(name)).or_insert_with(|| {
					Tag {
						name: name.clone(),
						posts: vec![],
					}
				});

				// `Rust` and `rust` on the same post list it once.
				if tag.posts.last().is_none_or(|last| last.source != post.source) {
					tag.posts.push(post.clone());
				}
			}
		}

		let ContentLoader {
			cache, seen, stats, ..
		} = loader;

		if let Some(cache) = cache {
			let removed = cache.retain(|key| seen.contains(key));
			if removed > 0 {
				debug!(removed, "evicted cache entries for missing files");
			}
		}

		Ok((Site { posts, pages, tags }, stats))
	}
}

struct ContentLoader<'a> {
	root: &'a Path,
	options: RenderOptions,
	cache: Option<&'a mut RenderCache>,
	/// Cache keys of every content file found, used to evict stale entries.
	seen: BTreeSet<String>,
	stats: LoadStats,
}

impl ContentLoader<'_> {
	/// Every `*.md` file directly inside `dir`, in file name order. A missing
	/// directory has no documents.
	fn load_dir(&mut self, dir: &Path) -> ScribeResult<Vec<Document>> {
		let entries = match std::fs::read_dir(dir) {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
			Err(e) => return Err(e.into()),
		};

		let mut files = vec![];
		for entry in entries {
			let path = entry?.path();
			if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
				files.push(path);
			}
		}
		files.sort();

		let mut documents = vec![];
		for path in files {
			if let Some(document) = self.load_file(&path)? {
				documents.push(document);
			}
		}

		Ok(documents)
	}

	fn load_file(&mut self, path: &Path) -> ScribeResult<Option<Document>> {
		let bytes = std::fs::read(path)?;
		let hash = content_hash(&bytes);
		let key = relative_file_key(self.root, path);
		let slug = path
			.file_stem()
			.map(|stem| stem.to_string_lossy().into_owned())
			.unwrap_or_default();

		self.seen.insert(key.clone());

		let cached = self
			.cache
			.as_deref()
			.and_then(|cache| cache.lookup(&key, hash))
			.filter(|cached| !(self.options.strict && cached.diagnostics > 0));

		if let Some(cached) = cached {
			debug!(file = %key, "cache hit");
			self.stats.cache_hits += 1;
			return Ok(Some(Document {
				front_matter: cached.front_matter.clone(),
				content: cached.content_html.clone(),
				slug,
				source: path.to_path_buf(),
			}));
		}

		debug!(file = %key, "cache miss, rendering");
		self.stats.cache_misses += 1;

		let content = String::from_utf8_lossy(&bytes);
		let (front_matter, body) = match extract_front_matter(&content, &key) {
			Ok(parts) => parts,
			Err(e) => {
				warn!(file = %key, "skipping file: {e}");
				self.stats.skipped.push(SkippedFile {
					path: path.to_path_buf(),
					reason: e.to_string(),
				});
				return Ok(None);
			}
		};

		let (html, diagnostics) = render_document(body, &self.options, &key)?;

		if let Some(cache) = self.cache.as_deref_mut() {
			cache.insert(
				key,
				CachedFile {
					hash,
					front_matter: front_matter.clone(),
					content_html: html.clone(),
					diagnostics: diagnostics.len(),
				},
			);
		}

		Ok(Some(Document {
			front_matter,
			content: html,
			slug,
			source: path.to_path_buf(),
		}))
	}
}

/// The file name used for a tag's page, e.g. `Rust Tips` becomes
/// `rust-tips`.
pub fn tag_slug(tag: &str) -> String {
	tag.to_lowercase().replace(' ', "-")
}

/// Render every page of `site` into `output_dir`. Returns the written paths.
pub fn write_site(
	site: &Site,
	output_dir: &Path,
	config: &ScribeConfig,
	templates: &SiteTemplates,
) -> ScribeResult<Vec<PathBuf>> {
	let mut written = vec![];

	let index = templates.render(
		INDEX_TEMPLATE,
		context! {
			site => &config.site,
			posts => &site.posts,
			pages => &site.pages,
		},
	)?;
	written.push(write_output(&output_dir.join("index.html"), &index)?);

	for post in &site.posts {
		let html = templates.render(
			POST_TEMPLATE,
			context! { site => &config.site, post => post },
		)?;
		let path = output_dir.join("posts").join(format!("{}.html", post.slug));
		written.push(write_output(&path, &html)?);
	}

	for page in &site.pages {
		let html = templates.render(
			PAGE_TEMPLATE,
			context! { site => &config.site, page => page },
		)?;
		let path = output_dir.join(format!("{}.html", page.slug));
		written.push(write_output(&path, &html)?);
	}

	for (slug, tag) in &site.tags {
		let html = templates.render(
			TAG_TEMPLATE,
			context! { site => &config.site, tag => &tag.name, posts => &tag.posts },
		)?;
		let path = output_dir.join("tags").join(format!("{slug}.html"));
		written.push(write_output(&path, &html)?);
	}

	Ok(written)
}

fn write_output(path: &Path, content: &str) -> ScribeResult<PathBuf> {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}

	std::fs::write(path, content)?;
	Ok(path.to_path_buf())
}

/// Copy every file below `from` into `to`, keeping relative paths. Hidden
/// files are included and ignore files are not consulted.
pub fn copy_static(from: &Path, to: &Path) -> ScribeResult<Vec<PathBuf>> {
	if !from.is_dir() {
		return Ok(vec![]);
	}

	let mut copied = vec![];
	let walker = ignore::WalkBuilder::new(from)
		.standard_filters(false)
		.build();

	for entry in walker {
		let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
		if !entry.file_type().is_some_and(|file_type| file_type.is_file()) {
			continue;
		}

		let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
		let destination = to.join(relative);
		if let Some(parent) = destination.parent() {
			std::fs::create_dir_all(parent)?;
		}

		std::fs::copy(entry.path(), &destination)?;
		copied.push(destination);
	}

	copied.sort();
	Ok(copied)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
	/// Read and update the render cache. Also requires `cache.enabled` in the
	/// config.
	pub use_cache: bool,
}

impl Default for BuildOptions {
	fn default() -> Self {
		Self { use_cache: true }
	}
}

/// Summary of a finished [`build_site`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
	pub posts: usize,
	pub pages: usize,
	pub tags: usize,
	pub cache_hits: usize,
	pub cache_misses: usize,
	pub written: Vec<PathBuf>,
	pub skipped: Vec<SkippedFile>,
}

/// Load the config at `root` (or the defaults) and build the site.
pub fn build_site(root: &Path, options: &BuildOptions) -> ScribeResult<BuildReport> {
	let config = ScribeConfig::load_or_default(root)?;
	build_site_with_config(root, &config, options)
}

/// Load content, render it through the templates, write the output and copy
/// static files.
pub fn build_site_with_config(
	root: &Path,
	config: &ScribeConfig,
	options: &BuildOptions,
) -> ScribeResult<BuildReport> {
	let mut cache = (options.use_cache && config.cache.enabled).then(|| RenderCache::load(root));

	let (site, stats) = Site::load(root, config, cache.as_mut())?;
	let templates = SiteTemplates::load(&root.join(&config.templates_dir))?;
	let output_dir = root.join(&config.output_dir);

	let mut written = write_site(&site, &output_dir, config, &templates)?;
	written.extend(copy_static(
		&root.join(&config.static_dir),
		&output_dir.join("static"),
	)?);

	if let Some(cache) = &cache {
		if let Err(e) = cache.save() {
			warn!("{e}");
		}
	}

	info!(
		posts = site.posts.len(),
		pages = site.pages.len(),
		tags = site.tags.len(),
		cache_hits = stats.cache_hits,
		cache_misses = stats.cache_misses,
		"built site"
	);

	Ok(BuildReport {
		posts: site.posts.len(),
		pages: site.pages.len(),
		tags: site.tags.len(),
		cache_hits: stats.cache_hits,
		cache_misses: stats.cache_misses,
		written,
		skipped: stats.skipped,
	})
}

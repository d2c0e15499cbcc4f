use std::path::Path;

use minijinja::Environment;
use serde::Serialize;
use tracing::debug;

use crate::ScribeError;
use crate::ScribeResult;

pub const INDEX_TEMPLATE: &str = "index.html";
pub const POST_TEMPLATE: &str = "post.html";
pub const PAGE_TEMPLATE: &str = "page.html";
pub const TAG_TEMPLATE: &str = "tag.html";

/// Every template a site build renders, in the order they are looked up.
pub const TEMPLATE_NAMES: [&str; 4] = [INDEX_TEMPLATE, POST_TEMPLATE, PAGE_TEMPLATE, TAG_TEMPLATE];

const DEFAULT_INDEX: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{{ site.title }}</title></head>
<body>
<h1>{{ site.title }}</h1>
<ul>
{% for post in posts %}<li><a href="{{ site.base_url }}/posts/{{ post.slug }}.html">{{ post.title }}</a> <time>{{ post.date }}</time></li>
{% endfor %}</ul>
{% if pages %}<nav>
{% for page in pages %}<a href="{{ site.base_url }}/{{ page.slug }}.html">{{ page.title }}</a>
{% endfor %}</nav>
{% endif %}</body>
</html>
"#;

const DEFAULT_POST: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{{ post.title }} | {{ site.title }}</title></head>
<body>
<article>
<h1>{{ post.title }}</h1>
<time>{{ post.date }}</time>
{{ post.content|safe }}</article>
{% if post.tags %}<ul class="tags">
{% for tag in post.tags %}<li><a href="{{ site.base_url }}/tags/{{ tag|lower|replace(" ", "-") }}.html">{{ tag }}</a></li>
{% endfor %}</ul>
{% endif %}</body>
</html>
"#;

const DEFAULT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{{ page.title }} | {{ site.title }}</title></head>
<body>
<main>
{{ page.content|safe }}</main>
</body>
</html>
"#;

const DEFAULT_TAG: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{{ tag }} | {{ site.title }}</title></head>
<body>
<h1>{{ tag }}</h1>
<ul>
{% for post in posts %}<li><a href="{{ site.base_url }}/posts/{{ post.slug }}.html">{{ post.title }}</a></li>
{% endfor %}</ul>
</body>
</html>
"#;

/// The HTML templates used to wrap rendered documents.
#[derive(Debug)]
pub struct SiteTemplates {
	env: Environment<'static>,
}

impl SiteTemplates {
	/// Only the built-in templates.
	pub fn builtin() -> Self {
		let mut env = Environment::new();
		env.set_keep_trailing_newline(true);

		for (name, source) in [
			(INDEX_TEMPLATE, DEFAULT_INDEX),
			(POST_TEMPLATE, DEFAULT_POST),
			(PAGE_TEMPLATE, DEFAULT_PAGE),
			(TAG_TEMPLATE, DEFAULT_TAG),
		] {
			// The built-in sources are static and known to compile.
			let _ = env.add_template(name, source);
		}

		Self { env }
	}

	/// The built-in templates, overridden by any file in `dir` with a matching
	/// name. A missing directory is not an error.
	pub fn load(dir: &Path) -> ScribeResult<Self> {
		let mut templates = Self::builtin();

		if !dir.is_dir() {
			return Ok(templates);
		}

		for name in TEMPLATE_NAMES {
			let path = dir.join(name);
			if !path.is_file() {
				continue;
			}

			let source = std::fs::read_to_string(&path)?;
			templates
				.env
				.add_template_owned(name, source)
				.map_err(|e| ScribeError::Template(e.to_string()))?;
			debug!(template = name, path = %path.display(), "using template override");
		}

		Ok(templates)
	}

	pub fn render(&self, name: &str, context: impl Serialize) -> ScribeResult<String> {
		let template = self
			.env
			.get_template(name)
			.map_err(|e| ScribeError::Template(e.to_string()))?;

		template
			.render(minijinja::Value::from_serialize(&context))
			.map_err(|e| ScribeError::Template(e.to_string()))
	}
}

use std::path::Path;

use predicates::prelude::*;
use scribe_core::AnyEmptyResult;

mod common;

use common::scribe_cmd;
use common::write_file;

fn sample_project(root: &Path) -> std::io::Result<()> {
	write_file(
		root,
		"content/posts/first.md",
		"---\ntitle: First\ndate: \"2024-01-01\"\ntags: [\"rust\"]\n---\n# Hello\n\nBody *text*.\n",
	)?;
	write_file(
		root,
		"content/posts/second.md",
		"---\ntitle: Second\ndate: \"2024-02-01\"\ntags: [\"notes\"]\n---\nSecond post.\n",
	)?;
	write_file(
		root,
		"content/pages/about.md",
		"---\ntitle: About\n---\nAbout me.\n",
	)?;
	write_file(root, "static/logo.svg", "<svg></svg>")
}

#[test]
fn build_writes_site() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	sample_project(tmp.path())?;

	scribe_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Built 2 posts, 1 pages and 2 tags"))
		.stdout(predicate::str::contains("3 rendered, 0 from cache"));

	let public = tmp.path().join("public");
	for file in [
		"index.html",
		"posts/first.html",
		"posts/second.html",
		"about.html",
		"tags/rust.html",
		"tags/notes.html",
		"static/logo.svg",
	] {
		assert!(public.join(file).is_file(), "missing {file}");
	}

	let post = std::fs::read_to_string(public.join("posts/first.html"))?;
	assert!(post.contains("<h1>Hello</h1>\n<p>Body <em>text</em>.</p>"));

	Ok(())
}

#[test]
fn build_uses_cache_on_second_run() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	sample_project(tmp.path())?;

	scribe_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
	assert!(tmp.path().join(".scribe/cache/render-v2.json").is_file());

	scribe_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("0 rendered, 3 from cache"));

	Ok(())
}

#[test]
fn build_no_cache_skips_cache_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	sample_project(tmp.path())?;

	scribe_cmd()
		.arg("build")
		.arg("--no-cache")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("3 rendered, 0 from cache"));
	assert!(!tmp.path().join(".scribe").exists());

	Ok(())
}

#[test]
fn build_reports_skipped_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	sample_project(tmp.path())?;
	write_file(
		tmp.path(),
		"content/posts/broken.md",
		"---\ntitle: [unclosed\n---\nbody\n",
	)?;

	scribe_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Built 2 posts"))
		.stderr(predicate::str::contains("warning: skipped"))
		.stderr(predicate::str::contains("broken.md"));

	Ok(())
}

#[test]
fn build_with_invalid_config_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "scribe.toml", "output_dir = [\n")?;

	scribe_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("scribe::config_parse"));

	Ok(())
}

#[test]
fn build_strict_config_fails_on_unclosed_span() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "scribe.toml", "[render]\nstrict = true\n")?;
	write_file(tmp.path(), "content/posts/open.md", "*unclosed\n")?;

	scribe_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("scribe::unclosed_span"));

	Ok(())
}

#[test]
fn build_verbose_logs_to_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	sample_project(tmp.path())?;

	scribe_cmd()
		.arg("build")
		.arg("--verbose")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("built site").not())
		.stderr(predicate::str::contains("built site"));

	Ok(())
}

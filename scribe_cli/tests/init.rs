use predicates::prelude::*;
use scribe_core::AnyEmptyResult;
use scribe_core::ScribeConfig;
use similar_asserts::assert_eq;

mod common;

use common::scribe_cmd;
use common::write_file;

#[test]
fn can_init() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	scribe_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Created scribe.toml"))
		.stdout(predicate::str::contains("Created content/posts/hello.md"))
		.stdout(predicate::str::contains("Next steps"));

	let config = ScribeConfig::load(tmp.path())?;
	assert_eq!(config, Some(ScribeConfig {
		site: scribe_core::SiteConfig {
			title: "My scribe site".into(),
			base_url: String::new(),
		},
		..ScribeConfig::default()
	}));
	assert!(tmp.path().join("content/pages/about.md").is_file());

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "scribe.toml", "existing config")?;
	let config_path = tmp.path().join("scribe.toml");

	scribe_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("already exists"));

	assert_eq!(std::fs::read_to_string(&config_path)?, "existing config");

	Ok(())
}

#[test]
fn init_twice_is_a_no_op() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	for _ in 0..2 {
		scribe_cmd()
			.arg("init")
			.arg("--path")
			.arg(tmp.path())
			.assert()
			.success();
	}

	scribe_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Created").not());

	Ok(())
}

#[test]
fn init_project_builds() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	scribe_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	scribe_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Built 1 posts, 1 pages and 1 tags"));

	let post = std::fs::read_to_string(tmp.path().join("public/posts/hello.html"))?;
	assert!(post.contains("<em>italic</em>"));
	assert!(post.contains("<math>e = mc^2</math>"));
	assert!(post.contains("<blockquote><p>Quotes start with an angle bracket.</p></blockquote>"));
	assert!(tmp.path().join("public/tags/welcome.html").is_file());
	assert!(tmp.path().join("public/about.html").is_file());

	Ok(())
}

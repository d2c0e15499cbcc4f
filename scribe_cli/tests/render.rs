use predicates::prelude::*;
use scribe_core::AnyEmptyResult;
use similar_asserts::assert_eq;

mod common;

use common::scribe_cmd;
use common::write_file;

#[test]
fn render_file_strips_front_matter() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(
		tmp.path(),
		"post.md",
		"---\ntitle: Post\n---\n# Title\n\nHello *world* and **bold** text with `code`.",
	)?;

	let output = scribe_cmd()
		.arg("render")
		.arg(tmp.path().join("post.md"))
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert!(output.status.success());
	assert_eq!(
		String::from_utf8(output.stdout)?,
		"<h1>Title</h1>\n<p>Hello <em>world</em> and <strong>bold</strong> text with \
		 <code>code</code>.</p>\n"
	);

	Ok(())
}

#[test]
fn render_reads_stdin() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	scribe_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("- one\n- **two**\n")
		.assert()
		.success()
		.stdout("<ul><li>one</li><li><strong>two</strong></li></ul>\n");

	Ok(())
}

#[test]
fn render_keeps_front_matter_when_asked() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	scribe_cmd()
		.arg("render")
		.arg("--keep-front-matter")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("---\ntitle: x\n---\nbody")
		.assert()
		.success()
		.stdout("<p>--- title: x --- body</p>\n");

	Ok(())
}

#[test]
fn render_closes_unclosed_spans_by_default() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	scribe_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("*never closed")
		.assert()
		.success()
		.stdout("<p><em>never closed</em></p>\n");

	Ok(())
}

#[test]
fn render_strict_fails_on_unclosed_span() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	scribe_cmd()
		.arg("render")
		.arg("--strict")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("**never closed")
		.assert()
		.code(2)
		.stdout("")
		.stderr(predicate::str::contains("scribe::unclosed_span"));

	Ok(())
}

#[test]
fn render_strict_from_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "scribe.toml", "[render]\nstrict = true\n")?;

	scribe_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("`open")
		.assert()
		.code(2);

	Ok(())
}

#[test]
fn render_invalid_front_matter_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	scribe_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("---\ntags: [oops\n---\nbody")
		.assert()
		.code(2)
		.stderr(predicate::str::contains("scribe::front_matter"));

	Ok(())
}

#[test]
fn render_missing_file_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	scribe_cmd()
		.arg("render")
		.arg(tmp.path().join("missing.md"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2);

	Ok(())
}

#[test]
fn tokens_prints_one_token_per_line() -> AnyEmptyResult {
	let output = scribe_cmd().arg("tokens").write_stdin("# Hi\n\n*x*").output()?;
	assert!(output.status.success());

	let stdout = String::from_utf8(output.stdout)?;
	assert_eq!(stdout.lines().next(), Some(r##"   0 HEADING "# ""##));
	let lines: Vec<_> = stdout.lines().map(str::trim_start).collect();
	assert_eq!(
		lines,
		vec![
			r##"0 HEADING "# ""##,
			r#"1 TEXT "Hi""#,
			r#"2 BLANK_LINE "\n\n""#,
			r#"3 ITALIC "*""#,
			r#"4 TEXT "x""#,
			r#"5 ITALIC "*""#,
			r#"6 END_OF_INPUT """#,
		]
	);

	Ok(())
}

#[test]
fn no_subcommand_exits_with_usage_hint() {
	scribe_cmd()
		.assert()
		.code(1)
		.stderr(predicate::str::contains("scribe --help"));
}

use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use owo_colors::OwoColorize;
use scribe_cli::Commands;
use scribe_cli::ScribeCli;
use scribe_core::BuildOptions;
use scribe_core::BuildReport;
use scribe_core::FrontMatter;
use scribe_core::RenderOptions;
use scribe_core::ScribeConfig;
use scribe_core::build_site_with_config;
use scribe_core::extract_front_matter;
use scribe_core::render_with_options;
use scribe_core::tokenize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,dimmed) => {
		if color_enabled() {
			format!("{}", $text.dimmed())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
	let args = ScribeCli::parse();

	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Render {
			file,
			strict,
			keep_front_matter,
		}) => run_render(&args, file.as_deref(), *strict, *keep_front_matter),
		Some(Commands::Tokens { file }) => run_tokens(file.as_deref()),
		Some(Commands::Build { no_cache, watch }) => run_build(&args, *no_cache, *watch),
		None => {
			eprintln!("No subcommand specified. Run `scribe --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<scribe_core::ScribeError>() {
			Ok(scribe_err) => {
				let report: miette::Report = (*scribe_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr so they never mix with rendered output. `--verbose`
/// wins over `RUST_LOG`.
fn init_tracing(verbose: bool, use_color: bool) {
	let filter = if verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.without_time()
		.init();
}

fn resolve_root(args: &ScribeCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// The document text and a name for it in diagnostics. `None` and `-` read
/// stdin.
fn read_input(file: Option<&Path>) -> Result<(String, String), Box<dyn std::error::Error>> {
	match file {
		Some(path) if path != Path::new("-") => {
			let content = std::fs::read_to_string(path)?;
			Ok((content, path.display().to_string()))
		}
		_ => {
			let mut content = String::new();
			std::io::stdin().read_to_string(&mut content)?;
			Ok((content, "<stdin>".to_string()))
		}
	}
}

fn run_render(
	args: &ScribeCli,
	file: Option<&Path>,
	strict: bool,
	keep_front_matter: bool,
) -> CliResult {
	let config = ScribeConfig::load_or_default(&resolve_root(args))?;
	let options = RenderOptions {
		strict: strict || config.render.strict,
	};

	let (content, source_name) = read_input(file)?;
	let body = if keep_front_matter {
		content.as_str()
	} else {
		let (front_matter, body) = extract_front_matter(&content, &source_name)?;
		if front_matter != FrontMatter::default() {
			tracing::debug!(title = %front_matter.title, "removed front matter");
		}
		body
	};

	let html = render_with_options(body, &options, &source_name)?;
	print!("{html}");

	Ok(())
}

fn run_tokens(file: Option<&Path>) -> CliResult {
	let (content, _) = read_input(file)?;

	for (index, token) in tokenize(&content).iter().enumerate() {
		println!("{} {token}", colored!(format!("{index:>4}"), dimmed));
	}

	Ok(())
}

fn run_build(args: &ScribeCli, no_cache: bool, watch: bool) -> CliResult {
	let root = resolve_root(args);
	let options = BuildOptions {
		use_cache: !no_cache,
	};

	build_once(&root, &options)?;

	if !watch {
		return Ok(());
	}

	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = root.canonicalize().unwrap_or(root);
	let config = ScribeConfig::load_or_default(&root)?;
	let ignored = [root.join(&config.output_dir), root.join(".scribe")];
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if is_source_change(&event, &ignored) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, rebuilding...");
		if let Err(e) = build_once(&root, &options) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

/// Writes into the output directory and the cache must not retrigger a build.
fn is_source_change(event: &notify::Event, ignored: &[PathBuf]) -> bool {
	matches!(
		event.kind,
		notify::EventKind::Modify(_) | notify::EventKind::Create(_) | notify::EventKind::Remove(_)
	) && event
		.paths
		.iter()
		.any(|path| !ignored.iter().any(|dir| path.starts_with(dir)))
}

fn build_once(root: &Path, options: &BuildOptions) -> CliResult {
	// Reloaded on every build so config edits apply in watch mode.
	let config = ScribeConfig::load_or_default(root)?;
	let report = build_site_with_config(root, &config, options)?;
	print_report(&report, &root.join(&config.output_dir));

	Ok(())
}

fn print_report(report: &BuildReport, output_dir: &Path) {
	for skipped in &report.skipped {
		eprintln!(
			"{} skipped {}: {}",
			colored!("warning:", yellow),
			skipped.path.display(),
			skipped.reason
		);
	}

	println!(
		"{} {} posts, {} pages and {} tags into {}",
		colored!("Built", green),
		report.posts,
		report.pages,
		report.tags,
		output_dir.display()
	);
	println!(
		"{}",
		colored!(
			format!(
				"{} rendered, {} from cache, {} files written",
				report.cache_misses,
				report.cache_hits,
				report.written.len()
			),
			dimmed
		)
	);
}

fn run_init(args: &ScribeCli) -> CliResult {
	let root = resolve_root(args);

	let files = [
		(
			"scribe.toml",
			"# scribe configuration. Every key is optional.\n\ncontent_dir = \
			 \"content\"\noutput_dir = \"public\"\ntemplates_dir = \"templates\"\nstatic_dir = \
			 \"static\"\n\n[site]\ntitle = \"My scribe site\"\nbase_url = \"\"\n\n[render]\n# \
			 Fail the build when an inline span is never closed.\nstrict = false\n\n[cache]\nenabled \
			 = true\n",
		),
		(
			"content/posts/hello.md",
			"---\ntitle: \"Hello, scribe\"\ndate: \"2024-01-01\"\ntags: [\"welcome\"]\n---\n# \
			 Hello\n\nThis post uses *italic*, **bold**, `code` and $e = mc^2$.\n\n- Lists \
			 start with a dash\n- One item per line\n\n> Quotes start with an angle \
			 bracket.\n",
		),
		(
			"content/pages/about.md",
			"---\ntitle: \"About\"\n---\n# About\n\nPages are rendered to the site root.\n",
		),
	];

	let mut created_any = false;
	for (relative, content) in files {
		let path = root.join(relative);
		if path.exists() {
			println!("File already exists: {}", path.display());
			continue;
		}

		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&path, content)?;
		println!("Created {relative}");
		created_any = true;
	}

	if created_any {
		println!();
		println!("Next steps:");
		println!("  1. Write posts in content/posts and pages in content/pages");
		println!("  2. Run `scribe build` to generate the site in public/");
		println!("  3. Run `scribe build --watch` to rebuild on every change");
	}

	Ok(())
}

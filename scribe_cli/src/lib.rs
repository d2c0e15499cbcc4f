use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Turn a folder of lightweight markdown into a static HTML site.",
	long_about = "scribe renders a small markdown dialect (headings, lists, quotes, emphasis, \
	              code and math spans) into HTML and builds a static site of posts, pages and \
	              tag listings from it.\n\nQuick start:\n  scribe init    Create a sample \
	              project\n  scribe build   Render the site into the output directory\n  \
	              scribe render  Render a single file to stdout"
)]
pub struct ScribeCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a sample project with a config file, a post and a page.
	///
	/// Existing files are left untouched, running `init` twice is a no-op.
	Init,
	/// Render a single document to HTML on stdout.
	///
	/// Front matter is removed before rendering. Reads from stdin when no
	/// file is given.
	Render {
		/// The document to render. Use `-` or leave empty for stdin.
		file: Option<PathBuf>,

		/// Fail when an inline span is never closed instead of closing it at
		/// the end of its block.
		#[arg(long, default_value_t = false)]
		strict: bool,

		/// Render the whole input, including any front matter block.
		#[arg(long, default_value_t = false)]
		keep_front_matter: bool,
	},
	/// Print the token stream of a document, one token per line.
	///
	/// Useful for understanding why a document renders the way it does.
	Tokens {
		/// The document to scan. Use `-` or leave empty for stdin.
		file: Option<PathBuf>,
	},
	/// Build the site into the output directory.
	///
	/// Loads `content/posts` and `content/pages`, renders them through the
	/// templates and copies static files. Unchanged files are served from
	/// the render cache in `.scribe/cache`.
	Build {
		/// Render every file again and leave the cache untouched.
		#[arg(long, default_value_t = false)]
		no_cache: bool,

		/// Rebuild whenever a file in the project changes.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
}

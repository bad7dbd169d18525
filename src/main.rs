use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use decomment::{Config, run_with_config};

/// decomment - strip comments from source files.
///
/// Deletes language-specific comments and collapses blank lines. The comment
/// grammar is picked by file extension. By default it:
///
///   - prints cleaned files to stdout with file-path headers
///   - respects .gitignore / .ignore / git exclude files when walking
///   - allows adding extra exclude globs
///   - can write results to cleaned_<name> files instead
#[derive(Parser, Debug)]
#[command(
    name = "decomment",
    author,
    version,
    about = "Strip comments from source files, respecting .gitignore",
    long_about = r#"Remove comments from source files and collapse blank lines.

The comment grammar is picked by file extension. Supported types:
  py, r, c, cpp, java, js, ts, rs, php, html, css

A file argument is cleaned directly (an unsupported extension is an
error); a directory is walked recursively and unsupported files are
skipped. Walking:
  • respects .gitignore / .ignore / git exclude files
  • allows adding extra exclude globs

Typical usage:
  decomment src/main.py
  decomment --write src tests
  decomment --write -o cleaned src
"#
)]
struct Args {
    /// Files or directories to clean.
    ///
    /// You can pass multiple:
    ///   decomment src tests tools
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Write each result to a cleaned_<name> file instead of stdout.
    #[arg(short = 'w', long = "write")]
    write: bool,

    /// Directory to place cleaned_<name> files in (requires --write).
    ///
    /// Created if missing. Without it, cleaned files land next to their
    /// inputs.
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        requires = "write"
    )]
    output_dir: Option<PathBuf>,

    /// Follow symbolic links during traversal.
    #[arg(long = "follow-symlinks")]
    follow_symlinks: bool,

    /// Disable reading .gitignore / .ignore / git exclude files.
    ///
    /// By default, decomment honours:
    ///   - .gitignore files in the tree
    ///   - .ignore files
    ///   - global Git exclude config
    #[arg(long = "no-gitignore")]
    no_gitignore: bool,

    /// Additional glob patterns to exclude (files or directories).
    ///
    /// Patterns are evaluated relative to each PATH root and use glob-style
    /// matching (via globset), e.g.:
    ///
    ///   decomment src --exclude 'migrations/**'
    ///   decomment . --exclude 'tests/**,*.gen.py'
    ///
    /// Multiple flags and comma-separated values are both allowed.
    #[arg(
        long = "exclude",
        short = 'E',
        value_name = "GLOB",
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    excludes: Vec<String>,

    /// Maximum file size to clean, in bytes (skip larger files).
    #[arg(long = "max-bytes", value_name = "N")]
    max_bytes: Option<u64>,

    /// Output as a JSON array of objects { "path": "...", "content": "..." }.
    #[arg(long = "json", conflicts_with = "write")]
    json: bool,

    /// Print an explicit END marker after each file (stdout mode).
    #[arg(long = "end-marker")]
    end_marker: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let cfg = Config {
        paths: args.paths,
        follow_symlinks: args.follow_symlinks,
        no_gitignore: args.no_gitignore,
        json: args.json,
        excludes: args.excludes,
        max_bytes: args.max_bytes,
        write: args.write,
        output_dir: args.output_dir,
        end_marker: args.end_marker,
    };

    run_with_config(cfg)
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};

pub mod comments;
mod patterns;

use crate::comments::{strip_comments, supported_extension};

/// Configuration passed from the CLI layer (main.rs) into the core logic.
#[derive(Debug)]
pub struct Config {
    pub paths: Vec<PathBuf>,
    pub follow_symlinks: bool,
    pub no_gitignore: bool,
    pub json: bool,
    pub excludes: Vec<String>,
    pub max_bytes: Option<u64>,
    pub write: bool,
    pub output_dir: Option<PathBuf>,
    pub end_marker: bool,
}

#[derive(serde::Serialize)]
struct FileEntry {
    path: String,
    file_name: String,
    content: String,
}

pub fn run_with_config(cfg: Config) -> Result<()> {
    let exclude_globset = build_exclude_globset(&cfg.excludes)?;

    if let Some(dir) = &cfg.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
    }

    let mut had_error = false;
    let mut first_file = true;

    if cfg.json {
        println!("[");
    }

    for raw_root in &cfg.paths {
        // Canonicalise roots so running from arbitrary working dirs is reliable.
        let canon_root = match raw_root.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Skipping root {:?}: {}", raw_root, e);
                had_error = true;
                continue;
            }
        };

        // A file root is cleaned directly; an unsupported extension is an
        // error here, where a walked directory would just skip the file.
        // Collecting before cleaning keeps files produced by --write out of
        // the walk that produced them.
        let files = if canon_root.is_file() {
            vec![canon_root.clone()]
        } else {
            collect_source_files(&canon_root, &cfg, exclude_globset.clone(), &mut had_error)
        };

        for path in files {
            let display_path = make_display_path(&canon_root, &path);

            if let Some(limit) = cfg.max_bytes
                && let Ok(meta) = fs::metadata(&path)
                && meta.len() > limit
            {
                eprintln!(
                    "Skipping {} (size {} bytes > max {} bytes)",
                    display_path,
                    meta.len(),
                    limit
                );
                continue;
            }

            let cleaned = match clean_file(&path, &display_path) {
                Ok(text) => text,
                Err(err) => {
                    eprintln!("Error cleaning {}: {:#}", display_path, err);
                    had_error = true;
                    continue;
                }
            };

            if cfg.json {
                if !first_file {
                    println!(",");
                }
                if let Err(err) = print_entry_json(&path, &display_path, &cleaned) {
                    eprintln!("Error printing {}: {:#}", display_path, err);
                    had_error = true;
                }
                first_file = false;
            } else if cfg.write {
                if let Err(err) =
                    write_cleaned(&path, &display_path, &cleaned, cfg.output_dir.as_deref())
                {
                    eprintln!("Error writing {}: {:#}", display_path, err);
                    had_error = true;
                }
            } else {
                print_cleaned(&display_path, &cleaned, cfg.end_marker);
            }
        }
    }

    if cfg.json {
        println!("\n]");
    }

    if had_error {
        anyhow::bail!("One or more files could not be cleaned. See stderr for details.");
    }

    Ok(())
}

/// Walk `root` and gather the files whose extension has a comment grammar.
/// Honours gitignore semantics and the user's exclude globs; reports walk
/// errors and keeps going.
fn collect_source_files(
    root: &Path,
    cfg: &Config,
    exclude_globset: Option<GlobSet>,
    had_error: &mut bool,
) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder.follow_links(cfg.follow_symlinks);

    if cfg.no_gitignore {
        builder
            .git_ignore(false)
            .git_exclude(false)
            .git_global(false)
            .ignore(false);
    } else {
        builder
            .git_ignore(true)
            .git_exclude(true)
            .git_global(true)
            .ignore(true)
            .require_git(false);
    }

    // Values moved into the 'static filter closure must be owned separately.
    let root_for_filter = root.to_path_buf();

    builder.filter_entry(move |entry: &DirEntry| {
        // Always keep the root.
        if entry.depth() == 0 {
            return true;
        }

        // Apply user exclude globs, relative to the current root.
        let Some(ref gs) = exclude_globset else {
            return true;
        };

        let path = entry.path();
        let rel = path.strip_prefix(&root_for_filter).unwrap_or(path);
        let rel_norm = normalize_for_matching(rel);

        if gs.is_match(&rel_norm) {
            return false;
        }

        // If this is a directory, also try a trailing slash to make patterns
        // like `tests/**` able to prune the whole subtree early.
        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) && !rel_norm.ends_with('/') {
            let rel_dir = format!("{rel_norm}/");
            if gs.is_match(&rel_dir) {
                return false;
            }
        }

        true
    });

    let mut files = Vec::new();

    for result in builder.build() {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                eprintln!("Walk error: {err}");
                *had_error = true;
                continue;
            }
        };

        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        if !supported_extension(&file_extension(path)) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    // Walk order varies by platform; sorted output is stable output.
    files.sort();
    files
}

/// Build a GlobSet from the user–provided `--exclude` patterns.
/// Returns `Ok(None)` if there are no patterns.
fn build_exclude_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();

    for pat in patterns {
        let pat = pat.trim();
        if pat.is_empty() {
            continue;
        }

        let glob =
            Glob::new(pat).with_context(|| format!("Invalid --exclude glob pattern: {pat}"))?;
        builder.add(glob);
    }

    let set = builder
        .build()
        .context("Failed to build exclude glob set")?;

    Ok(Some(set))
}

/// Everything from the last `.` of the file name, dot included.
/// Empty when the name has no dot; a leading dot alone (".gitignore") does
/// not count as an extension.
pub fn file_extension(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .and_then(|name| {
            name.rfind('.')
                .filter(|&i| i > 0)
                .map(|i| name[i..].to_string())
        })
        .unwrap_or_default()
}

/// Read a file strictly as UTF-8 and strip its comments.
fn clean_file(path: &Path, display_path: &str) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", display_path))?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("{} is not valid UTF-8", display_path))?;

    let cleaned = strip_comments(&text, &file_extension(path))?;
    Ok(cleaned)
}

/// Produce a display path relative to `root` (stable regardless of current working directory).
pub fn make_display_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);

    // If root is a file and path == root, rel is empty.
    if rel.as_os_str().is_empty() {
        return path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
    }

    normalize_for_matching(rel)
}

/// Print a single cleaned file with a header (and optional end marker).
fn print_cleaned(display_path: &str, text: &str, end_marker: bool) {
    println!("========== FILE: {} ==========", display_path);
    print!("{text}");

    // The cleaned body carries no trailing newline; add one before the
    // separator between files.
    if !text.ends_with('\n') {
        println!();
    }

    if end_marker {
        println!("========== END FILE: {} ==========\n", display_path);
    } else {
        println!();
    }
}

fn print_entry_json(path: &Path, display_path: &str, cleaned: &str) -> Result<()> {
    let entry = FileEntry {
        path: display_path.to_string(),
        file_name: path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string(),
        content: cleaned.to_string(),
    };

    let json = serde_json::to_string(&entry)?;
    print!("{}", json);

    Ok(())
}

/// Write the cleaned text as `cleaned_<file name>`, next to the input or
/// into `output_dir`.
fn write_cleaned(
    path: &Path,
    display_path: &str,
    cleaned: &str,
    output_dir: Option<&Path>,
) -> Result<()> {
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let cleaned_name = format!("cleaned_{file_name}");

    let dest = match output_dir {
        Some(dir) => dir.join(&cleaned_name),
        None => path.with_file_name(&cleaned_name),
    };

    fs::write(&dest, cleaned).with_context(|| format!("Failed to write {:?}", dest))?;
    println!("Cleaned {} -> {}", display_path, dest.display());

    Ok(())
}

/// Convert paths to a stable, slash-separated form for matching/printing.
fn normalize_for_matching(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

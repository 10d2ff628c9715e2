//! File discovery and per-file linting for the `check` command

use anyhow::{Context, Result, bail};
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use memmap2::Mmap;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tagcheck_lib::cache::AnalysisCache;
use tagcheck_lib::config::{Config, GlobalConfig, normalize_key};
use tagcheck_lib::rule::Rule;
use tagcheck_lib::types::Diagnostic;

/// Extensions treated as HTML during discovery
pub const HTML_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];

/// Files above this size are read through a memory map
const MMAP_THRESHOLD: u64 = 1024 * 1024;

fn split_list(value: Option<&str>) -> Option<Vec<String>> {
    value.map(|s| {
        s.split(',')
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect()
    })
}

/// Expands directory-style patterns to also match files within them.
/// Patterns containing glob characters are returned unchanged.
fn expand_directory_pattern(pattern: &str) -> Vec<String> {
    if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
        return vec![pattern.to_string()];
    }
    let base = pattern.trim_end_matches('/');
    vec![base.to_string(), format!("{base}/**")]
}

/// Merge CLI `--enable`/`--disable` into the configured global section.
/// CLI `--enable` replaces the configured list; `--disable` extends it.
pub fn effective_global_config(args: &crate::CheckArgs, config: &Config) -> GlobalConfig {
    let mut global = config.global.clone();
    if let Some(enable) = split_list(args.enable.as_deref()) {
        global.enable = enable;
    }
    if let Some(disable) = split_list(args.disable.as_deref()) {
        global.disable.extend(disable);
    }
    global
}

pub fn get_enabled_rules(global: &GlobalConfig, config: &Config, verbose: bool) -> Vec<Box<dyn Rule>> {
    let all_rules = tagcheck_lib::rules::all_rules(config);
    let enabled = tagcheck_lib::rules::filter_rules(&all_rules, global);

    if verbose {
        eprintln!("Enabled rules:");
        for rule in &enabled {
            eprintln!("  - {} ({})", rule.name(), rule.description());
        }
        eprintln!();
    }

    enabled
}

pub fn find_html_files(
    paths: &[String],
    args: &crate::CheckArgs,
    global: &GlobalConfig,
    project_root: Option<&Path>,
) -> Result<Vec<String>> {
    let is_discovery_mode = paths.is_empty() || paths == ["."];

    let include_patterns: Vec<String> = match split_list(args.include.as_deref()) {
        Some(cli_include) => cli_include,
        None if is_discovery_mode => global.include.clone(),
        None => Vec::new(),
    };
    let exclude_patterns: Vec<String> = split_list(args.exclude.as_deref())
        .unwrap_or_else(|| global.exclude.clone())
        .iter()
        .flat_map(|p| expand_directory_pattern(p))
        .collect();

    log::debug!("Include patterns: {include_patterns:?}, exclude patterns: {exclude_patterns:?}");

    let is_excluded = |path_for_matching: &str| -> Option<String> {
        exclude_patterns.iter().find_map(|pattern| {
            let glob = globset::Glob::new(pattern).ok()?;
            glob.compile_matcher()
                .is_match(path_for_matching)
                .then(|| pattern.clone())
        })
    };

    // Explicit files are linted whatever their extension, unless excluded
    let mut explicit_files = Vec::new();
    let mut walk_roots = Vec::new();
    if is_discovery_mode {
        walk_roots.push(".".to_string());
    } else {
        for path_str in paths {
            let path = Path::new(path_str);
            if !path.exists() {
                bail!("File not found: {path_str}");
            }
            if path.is_dir() {
                walk_roots.push(path_str.clone());
                continue;
            }
            let cleaned = path_str.strip_prefix("./").unwrap_or(path_str).to_string();
            match is_excluded(&cleaned) {
                Some(pattern) => eprintln!("warning: {cleaned} ignored because of exclude pattern '{pattern}'"),
                None => explicit_files.push(cleaned),
            }
        }
    }

    let mut file_paths = Vec::new();
    if let Some((first, rest)) = walk_roots.split_first() {
        let mut walk_builder = WalkBuilder::new(first);
        for root in rest {
            walk_builder.add(root);
        }

        if !include_patterns.is_empty() || !exclude_patterns.is_empty() {
            let mut override_builder = OverrideBuilder::new(project_root.unwrap_or(Path::new(".")));
            for pattern in &include_patterns {
                if let Err(e) = override_builder.add(pattern) {
                    eprintln!("Warning: Invalid include pattern '{pattern}': {e}");
                }
            }
            for pattern in &exclude_patterns {
                let exclude_rule = if pattern.starts_with('!') {
                    pattern.clone()
                } else {
                    format!("!{pattern}")
                };
                if let Err(e) = override_builder.add(&exclude_rule) {
                    eprintln!("Warning: Invalid exclude pattern '{pattern}': {e}");
                }
            }
            walk_builder.overrides(override_builder.build().context("Failed to build path overrides")?);
        }

        let use_gitignore = global.respect_gitignore;
        walk_builder.ignore(use_gitignore);
        walk_builder.git_ignore(use_gitignore);
        walk_builder.git_global(use_gitignore);
        walk_builder.git_exclude(use_gitignore);
        walk_builder.parents(use_gitignore);
        walk_builder.hidden(false);
        walk_builder.require_git(false);
        walk_builder.add_custom_ignore_filename(".tagcheckignore");

        for result in walk_builder.build() {
            match result {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.components().all(|c| c.as_os_str() != ".git") {
                        let file_path = path.to_string_lossy().to_string();
                        file_paths.push(file_path.strip_prefix("./").unwrap_or(&file_path).to_string());
                    }
                }
                Err(err) => eprintln!("Error walking directory: {err}"),
            }
        }

        // An explicit --include decides for itself which files count as HTML
        if args.include.is_none() {
            file_paths.retain(|path_str| {
                Path::new(path_str)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| HTML_EXTENSIONS.iter().any(|h| ext.eq_ignore_ascii_case(h)))
            });
        }
        file_paths.retain(|p| is_excluded(p).is_none());
    }

    file_paths.extend(explicit_files);
    file_paths.sort();
    file_paths.dedup();
    Ok(file_paths)
}

/// Read a file, memory-mapping large ones. Invalid UTF-8 is replaced rather
/// than rejected so binary-looking input still gets diagnostics.
pub fn read_file_efficiently(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).with_context(|| format!("Failed to read file {}", path.display()))?;

    if metadata.len() > MMAP_THRESHOLD {
        let file = fs::File::open(path).with_context(|| format!("Failed to open file {}", path.display()))?;
        // SAFETY: the map is read once and copied into an owned String before returning
        let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("Failed to map file {}", path.display()))?;
        Ok(String::from_utf8_lossy(&mmap).into_owned())
    } else {
        let bytes = fs::read(path).with_context(|| format!("Failed to read file {}", path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Lint already-loaded content and apply configuration-level filtering
pub fn lint_content(
    content: &str,
    file_path: &str,
    rules: &[Box<dyn Rule>],
    global: &GlobalConfig,
    config: &Config,
    cache: Option<&Arc<Mutex<AnalysisCache>>>,
    rules_hash: &str,
) -> Vec<Diagnostic> {
    let diagnostics: Vec<Diagnostic> = match cache {
        Some(cache) => {
            let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(cached) = guard.get(content, rules_hash) {
                log::debug!("Cache hit for {file_path}");
                cached.as_ref().clone()
            } else {
                drop(guard);
                let fresh = tagcheck_lib::lint(content, rules);
                let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                guard.insert(content, rules_hash, fresh.clone());
                fresh
            }
        }
        None => tagcheck_lib::lint(content, rules),
    };

    let diagnostics = tagcheck_lib::rules::filter_diagnostics(diagnostics, global);

    let ignored: HashSet<String> = config.get_ignored_rules_for_file(Path::new(file_path));
    if ignored.is_empty() {
        return diagnostics;
    }
    diagnostics
        .into_iter()
        .filter(|d| {
            !ignored.contains(d.rule_code())
                && !ignored.contains(&normalize_key(d.category.as_str()))
        })
        .collect()
}

pub fn process_file(
    file_path: &str,
    rules: &[Box<dyn Rule>],
    global: &GlobalConfig,
    config: &Config,
    cache: Option<&Arc<Mutex<AnalysisCache>>>,
    rules_hash: &str,
) -> Result<Vec<Diagnostic>> {
    let content = read_file_efficiently(Path::new(file_path))?;
    Ok(lint_content(&content, file_path, rules, global, config, cache, rules_hash))
}

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::io::{self, Read};
use std::sync::{Arc, Mutex};

use tagcheck_lib::cache::AnalysisCache;
use tagcheck_lib::config as tagcheck_config;
use tagcheck_lib::exit_codes::exit;
use tagcheck_lib::output::{OutputFormat, format_json_report, write_line};
use tagcheck_lib::types::Diagnostic;

mod file_processor;

#[derive(Parser)]
#[command(author, version, about = "A fast heuristic HTML syntax checker", long_about = None, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = ["auto", "always", "never"])]
    color: String,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Ignore all configuration files and use built-in defaults
    #[arg(long, global = true)]
    no_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check HTML files and print diagnostics
    Check(CheckArgs),
    /// Show information about a rule or list all rules
    Rule {
        /// Rule code or category name (optional)
        rule: Option<String>,
    },
    /// Create a default .tagcheck.toml in the current directory
    Init,
    /// Print the effective configuration as TOML
    Config {
        /// Show only the default configuration values
        #[arg(long)]
        defaults: bool,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Files or directories to check (use '-' for stdin)
    #[arg(required = false)]
    paths: Vec<String>,

    /// Enable only these rules or categories (comma-separated)
    #[arg(short, long)]
    enable: Option<String>,

    /// Disable these rules or categories (comma-separated)
    #[arg(short, long)]
    disable: Option<String>,

    /// Exclude files or directories (comma-separated glob patterns)
    #[arg(long)]
    exclude: Option<String>,

    /// Include only matching files (comma-separated glob patterns)
    #[arg(long)]
    include: Option<String>,

    /// Output format for diagnostics
    #[arg(long, value_parser = ["text", "full", "concise", "json", "github"])]
    output_format: Option<String>,

    /// Fail only on blocking syntax errors
    #[arg(long)]
    blocking_only: bool,

    /// Print diagnostics, but nothing else
    #[arg(short, long)]
    quiet: bool,

    /// Show detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Disable the analysis cache
    #[arg(long)]
    no_cache: bool,

    /// Read from stdin instead of files
    #[arg(long)]
    stdin: bool,

    /// Filename to use for stdin input in diagnostics
    #[arg(long)]
    stdin_filename: Option<String>,
}

fn load_config_with_cli_error_handling(config_path: Option<&str>, no_config: bool) -> tagcheck_config::SourcedConfig {
    match tagcheck_config::SourcedConfig::load_with_discovery(config_path, no_config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Config error".red().bold(), e);
            exit::tool_error();
        }
    }
}

fn print_config_warnings(config: &tagcheck_config::Config) {
    let all_rules = tagcheck_lib::rules::all_rules(config);
    let registry = tagcheck_config::RuleRegistry::from_rules(&all_rules);
    for warning in tagcheck_config::validate_config(config, &registry) {
        eprintln!("{} {}", "[config warning]".yellow().bold(), warning.message);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    let _ = env_logger::Builder::from_default_env().filter_level(level).try_init();
}

fn handle_schema_command() {
    let schema = schemars::schema_for!(tagcheck_config::Config);

    let mut schema_value: serde_json::Value = serde_json::to_value(&schema).unwrap_or_else(|e| {
        eprintln!("{}: Failed to convert schema to Value: {}", "Error".red().bold(), e);
        exit::tool_error();
    });

    // Allow [HT###] sections at the root alongside [global] and [per-file-ignores]
    if let Some(schema_obj) = schema_value.as_object_mut() {
        schema_obj.insert(
            "additionalProperties".to_string(),
            serde_json::json!({ "$ref": "#/$defs/RuleConfig" }),
        );
    }

    match serde_json::to_string_pretty(&schema_value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("{}: Failed to serialize schema: {}", "Error".red().bold(), e);
            exit::tool_error();
        }
    }
}

fn handle_rule_command(query: Option<&str>) {
    let all_rules = tagcheck_lib::rules::all_rules(&tagcheck_config::Config::default());

    let Some(query) = query else {
        println!("Available rules:");
        for rule in &all_rules {
            let categories: Vec<&str> = rule.categories().iter().map(|c| c.as_str()).collect();
            println!("  {} - {} [{}]", rule.name().bold(), rule.description(), categories.join(", "));
        }
        return;
    };

    let Some(rule) = all_rules.iter().find(|r| r.matches_name(query)) else {
        eprintln!("Rule '{query}' not found.");
        exit::tool_error();
    };

    println!("{} - {}\n", rule.name().bold(), rule.description());
    println!("Categories:");
    for category in rule.categories() {
        let blocking = if category.is_blocking() { ", blocking" } else { "" };
        println!("  {} ({}{blocking})", category, category.default_severity());
    }
    if let Some(explanation) = rule.explanation() {
        println!("\n{explanation}");
    }
    if let Some((name, value)) = rule.default_config_section() {
        let mut table = toml::map::Map::new();
        table.insert(name, value);
        if let Ok(rendered) = toml::to_string_pretty(&toml::Value::Table(table)) {
            println!("\nDefault configuration:\n{rendered}");
        }
    }
}

fn handle_config_command(cli: &Cli, defaults: bool) {
    let config = if defaults {
        let mut config = tagcheck_config::Config::default();
        for rule in tagcheck_lib::rules::all_rules(&config) {
            if let Some((name, toml::Value::Table(table))) = rule.default_config_section() {
                config.rules.insert(
                    name,
                    tagcheck_config::RuleConfig {
                        values: table.into_iter().collect(),
                    },
                );
            }
        }
        config
    } else {
        let sourced = load_config_with_cli_error_handling(cli.config.as_deref(), cli.no_config);
        if let Some(path) = &sourced.loaded_file {
            println!("# Loaded from {}", path.display());
        }
        sourced.into()
    };

    match toml::to_string_pretty(&config) {
        Ok(rendered) => print!("{rendered}"),
        Err(e) => {
            eprintln!("{}: Failed to render configuration: {}", "Error".red().bold(), e);
            exit::tool_error();
        }
    }
}

/// Whether a run's diagnostics should fail the process
fn is_failure(diagnostics: &[Diagnostic], blocking_only: bool) -> bool {
    if blocking_only {
        tagcheck_lib::has_blocking_errors(diagnostics)
    } else {
        diagnostics.iter().any(Diagnostic::is_error)
    }
}

fn run_check(args: &CheckArgs, config_path: Option<&str>, no_config: bool) {
    init_logging(args.verbose);

    let sourced = load_config_with_cli_error_handling(config_path, no_config);
    let project_root = sourced.project_root.clone();
    let config: tagcheck_config::Config = sourced.into();
    if !args.quiet {
        print_config_warnings(&config);
    }

    let global = file_processor::effective_global_config(args, &config);
    let output_format: OutputFormat = match args
        .output_format
        .as_deref()
        .or(global.output_format.as_deref())
        .unwrap_or("text")
        .parse()
    {
        Ok(format) => format,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            exit::tool_error();
        }
    };
    let formatter = output_format.create_formatter();

    let rules = file_processor::get_enabled_rules(&global, &config, args.verbose);
    let rules_hash = AnalysisCache::hash_rules(&rules, &config);
    let cache = (global.cache && !args.no_cache).then(|| Arc::new(Mutex::new(AnalysisCache::new())));

    let use_stdin = args.stdin || args.paths.iter().any(|p| p == "-");
    if use_stdin {
        let mut content = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut content) {
            eprintln!("{}: Failed to read stdin: {}", "Error".red().bold(), e);
            exit::tool_error();
        }
        let name = args.stdin_filename.as_deref().unwrap_or("<stdin>");
        let diagnostics = file_processor::lint_content(&content, name, &rules, &global, &config, None, &rules_hash);
        let formatted = formatter.format_warnings(&diagnostics, name);
        if !formatted.is_empty() || formatter.is_batched() {
            write_line(&formatted).unwrap_or_else(|e| eprintln!("Error writing output: {e}"));
        }
        if is_failure(&diagnostics, args.blocking_only) {
            exit::violations_found();
        }
        exit::success();
    }

    let file_paths = match file_processor::find_html_files(&args.paths, args, &global, project_root.as_deref()) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            exit::tool_error();
        }
    };

    if file_paths.is_empty() {
        if !args.quiet {
            println!("No HTML files found to check.");
        }
        exit::success();
    }

    let start = std::time::Instant::now();
    let check_file = |path: &String| {
        let result = file_processor::process_file(path, &rules, &global, &config, cache.as_ref(), &rules_hash);
        (path.clone(), result)
    };

    #[cfg(feature = "parallel")]
    let results: Vec<_> = {
        use rayon::prelude::*;
        file_paths.par_iter().map(check_file).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = file_paths.iter().map(check_file).collect();

    let mut had_tool_error = false;
    let mut failed = false;
    let mut files_with_issues = 0;
    let mut total_issues = 0;
    let mut reports = Vec::new();

    for (path, result) in results {
        match result {
            Ok(diagnostics) => {
                failed |= is_failure(&diagnostics, args.blocking_only);
                if !diagnostics.is_empty() {
                    files_with_issues += 1;
                    total_issues += diagnostics.len();
                }
                reports.push((path, diagnostics));
            }
            Err(e) => {
                had_tool_error = true;
                eprintln!("{}: {:#}", "Error".red().bold(), e);
            }
        }
    }

    if formatter.is_batched() {
        write_line(&format_json_report(&reports)).unwrap_or_else(|e| eprintln!("Error writing output: {e}"));
    } else {
        for (path, diagnostics) in &reports {
            let formatted = formatter.format_warnings(diagnostics, path);
            if !formatted.is_empty() {
                write_line(&formatted).unwrap_or_else(|e| eprintln!("Error writing output: {e}"));
            }
        }
    }

    if !args.quiet && output_format == OutputFormat::Text {
        let elapsed = start.elapsed();
        if total_issues == 0 {
            println!(
                "\n{} No issues found in {} file{} ({}ms)",
                "Success:".green().bold(),
                file_paths.len(),
                if file_paths.len() == 1 { "" } else { "s" },
                elapsed.as_millis()
            );
        } else {
            println!(
                "\n{} Found {} issue{} in {} file{} ({} files checked in {}ms)",
                "Issues:".yellow().bold(),
                total_issues,
                if total_issues == 1 { "" } else { "s" },
                files_with_issues,
                if files_with_issues == 1 { "" } else { "s" },
                file_paths.len(),
                elapsed.as_millis()
            );
        }
        if let Some(cache) = &cache {
            let stats = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).stats();
            log::debug!("Cache: {} hits, {} misses", stats.hits, stats.misses);
        }
    }

    if had_tool_error {
        exit::tool_error();
    }
    if failed {
        exit::violations_found();
    }
}

fn main() {
    // Restore default SIGPIPE so piping into `head` exits quietly
    #[cfg(unix)]
    {
        // SAFETY: resetting SIGPIPE to its default disposition before any threads start
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    let cli = Cli::parse();

    match cli.color.as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::unset_override(),
    }

    match &cli.command {
        Commands::Check(args) => {
            let config_path = if cli.no_config { None } else { cli.config.as_deref() };
            run_check(args, config_path, cli.no_config);
        }
        Commands::Rule { rule } => handle_rule_command(rule.as_deref()),
        Commands::Init => match tagcheck_config::create_default_config(".tagcheck.toml") {
            Ok(()) => {
                println!("Created default configuration file: .tagcheck.toml");
                println!("  • Run {} to check your HTML files", "tagcheck check .".cyan());
            }
            Err(e) => {
                eprintln!("{}: Failed to create config file: {}", "Error".red().bold(), e);
                exit::tool_error();
            }
        },
        Commands::Config { defaults } => handle_config_command(&cli, *defaults),
        Commands::Schema => handle_schema_command(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagcheck_lib::types::Category;

    #[test]
    fn test_is_failure_policy() {
        let warning_only = vec![Diagnostic::new(Category::DuplicateId, 1, 1, 6, "Duplicate id=\"a\"")];
        assert!(!is_failure(&warning_only, false));

        let typo = vec![Diagnostic::new(Category::TagTypo, 1, 1, 6, "Possible typo")];
        assert!(is_failure(&typo, false));
        assert!(!is_failure(&typo, true));

        let unclosed = vec![Diagnostic::new(Category::UnclosedTag, 1, 1, 5, "Unclosed <div> tag")];
        assert!(is_failure(&unclosed, true));
    }

    #[test]
    fn test_cli_parses_check_flags() {
        let cli = Cli::try_parse_from([
            "tagcheck",
            "check",
            "site",
            "--disable",
            "HT001",
            "--output-format",
            "json",
            "--blocking-only",
        ])
        .unwrap();
        let Commands::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.paths, vec!["site"]);
        assert_eq!(args.disable.as_deref(), Some("HT001"));
        assert_eq!(args.output_format.as_deref(), Some("json"));
        assert!(args.blocking_only);
    }
}

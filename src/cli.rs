use crate::config::Config;
use crate::generator::{CollectedDiagnostics, ModuleGenerator};
use crate::{log_debug, log_info};
use crate::metadata::Options;

use anyhow::{Context, Result, anyhow};
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, crate_version};
use colored::Colorize;
use std::path::PathBuf;

const LOG_FILE: &str = "svn-buildinfo-debug.log";

/// Print the SVN build-info module for a working copy
#[derive(Parser, Debug)]
#[command(
    author,
    version = crate_version!(),
    about = "Generate a build-info module from SVN working-copy metadata",
    long_about = "Reads revision, author, branch and recent log of an SVN working copy and prints them as `export <key> = <value>` lines.",
    styles = get_styles(),
)]
pub struct Cli {
    /// Project root to read metadata from (defaults to the current directory)
    #[arg(short = 'C', long = "root", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Extra export, `KEY=VALUE`; VALUE is used as JSON when it parses as JSON
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_define)]
    pub defines: Vec<(String, serde_json::Value)>,

    /// Write the module to a file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// svn executable to run, overriding configuration
    #[arg(long = "svn", value_name = "PATH")]
    pub svn_command: Option<String>,

    /// Number of log entries listed in `tags`, overriding configuration
    #[arg(long = "log-limit", value_name = "N")]
    pub log_limit: Option<usize>,

    /// Log debug messages to a file
    #[arg(short = 'l', long = "log")]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,

    /// Echo log messages to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Suppress warnings
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse a `KEY=VALUE` define
pub fn parse_define(raw: &str) -> Result<(String, serde_json::Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{raw}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("empty key in '{raw}'"));
    }

    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub async fn main() -> Result<()> {
    let cli = parse_args();

    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;
    }
    if cli.verbose {
        crate::logger::enable_logging();
        crate::logger::set_log_to_stderr(true);
    }
    if !cli.log && !cli.verbose {
        crate::logger::disable_logging();
    }

    run(cli).await
}

/// Generate the module described by `cli` and write it out.
pub async fn run(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let mut config = Config::load(&root)?;
    if let Some(command) = cli.svn_command {
        config.svn_command = command;
    }
    if let Some(limit) = cli.log_limit {
        config.log_limit = limit;
    }
    log_debug!("Generating module for {} with {:?}", root.display(), config);

    let mut options = Options::new();
    for (key, value) in cli.defines {
        options.extractors.insert_value(key, value);
    }

    let generator = ModuleGenerator::from_config(&config);
    let diagnostics = CollectedDiagnostics::new();
    let source = generator.generate(&root, &options, &diagnostics).await;

    if !cli.quiet {
        for warning in diagnostics.warnings() {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
    }

    match cli.output {
        Some(path) => {
            tokio::fs::write(&path, format!("{source}\n"))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log_info!("Wrote build-info module to {}", path.display());
        }
        None => println!("{source}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_define() {
        assert_eq!(
            parse_define("buildId=abc").expect("define"),
            ("buildId".to_string(), json!("abc"))
        );
        assert_eq!(
            parse_define("count=3").expect("define"),
            ("count".to_string(), json!(3))
        );
        assert_eq!(
            parse_define("url=https://x/y=z").expect("define"),
            ("url".to_string(), json!("https://x/y=z"))
        );
        assert!(parse_define("novalue").is_err());
        assert!(parse_define("=value").is_err());
    }

    #[test]
    fn test_cli_parses_defines_in_order() {
        let cli = Cli::parse_from(["svn-buildinfo", "-D", "b=1", "--define", "a=\"x\""]);
        let keys: Vec<&str> = cli.defines.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["b", "a"]);
        assert!(cli.root.is_none());
    }
}

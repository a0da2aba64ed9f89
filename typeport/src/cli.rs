//! Command-line interface definitions for Typeport.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Typeport - TypeScript interfaces for the structs of a Rust crate
#[derive(Parser, Debug)]
#[command(name = "typeport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to typeport.toml configuration file
    #[arg(short, long, global = true, env = "TYPEPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (-v, -vv for increasing verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter for the chosen verbosity. `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a package, build and run the generated program
    Transpile(TranspileArgs),

    /// List the struct names found under a directory
    Scan(ScanArgs),

    /// Print the generated program without running it
    Render(RenderArgs),
}

/// Where the structs live and where the interfaces go.
#[derive(Args, Debug, Clone)]
pub struct PackageArgs {
    /// Directory holding the struct declarations
    #[arg(long)]
    pub package_dir: PathBuf,

    /// Rust path of that directory's module, e.g. `shop_models::domain`
    #[arg(long)]
    pub package_path: String,

    /// TypeScript file to write
    #[arg(short, long)]
    pub output: PathBuf,

    /// Import line added to the generated file (repeatable)
    #[arg(long = "import", value_name = "LINE")]
    pub imports: Vec<String>,

    /// Facility option as NAME=EXPR, overriding the configured value (repeatable)
    #[arg(long = "init", value_name = "NAME=EXPR", value_parser = parse_init_param)]
    pub init_params: Vec<(String, String)>,

    /// Generate concrete classes instead of interfaces
    #[arg(long)]
    pub concrete: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TranspileArgs {
    #[command(flatten)]
    pub package: PackageArgs,

    /// Directory for temporary workspaces (overrides config file)
    #[arg(long)]
    pub working_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Directory to scan
    pub dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub package: PackageArgs,
}

fn parse_init_param(value: &str) -> Result<(String, String), String> {
    let (name, expr) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=EXPR, got `{}`", value))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing option name in `{}`", value));
    }
    Ok((name.to_string(), expr.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_transpile() {
        let cli = Cli::parse_from([
            "typeport",
            "-v",
            "transpile",
            "--package-dir",
            "src/models",
            "--package-path",
            "shop::models",
            "-o",
            "models.ts",
            "--import",
            "import { Money } from './money';",
            "--init",
            "backup_dir=String::from(\"/tmp\")",
            "--concrete",
        ]);

        assert_eq!(cli.log_filter(), "debug");
        let Commands::Transpile(args) = cli.command else {
            panic!("expected transpile");
        };
        assert_eq!(args.package.package_path, "shop::models");
        assert_eq!(args.package.imports.len(), 1);
        assert_eq!(
            args.package.init_params,
            vec![(
                "backup_dir".to_string(),
                "String::from(\"/tmp\")".to_string()
            )]
        );
        assert!(args.package.concrete);
        assert!(args.working_dir.is_none());
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        let cli = Cli::parse_from(["typeport", "-vv", "-q", "scan", "."]);
        assert_eq!(cli.log_filter(), "error");
    }

    #[test]
    fn test_parse_init_param_rejects_missing_equals() {
        assert!(parse_init_param("backup_dir").is_err());
        assert!(parse_init_param("=1").is_err());
        assert_eq!(
            parse_init_param("a = b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
    }
}

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "giam")]
#[command(about = "Reconcile IAM service accounts declared in a manifest")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides config and GIAM_BASE_URL env var)
    #[arg(short, long, global = true, env = "GIAM_BASE_URL")]
    pub base_url: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "GIAM_PROFILE", default_value = "default")]
    pub profile: String,

    /// Bearer token used for every request (overrides stored credentials)
    #[arg(long, global = true, env = "GIAM_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile every service account in a manifest, in order
    Apply(ApplyArgs),
    /// Fetch one service account
    Get(GetArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// Path to the TOML manifest
    pub manifest: PathBuf,
    /// Only fetch and report what would change
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct GetArgs {
    /// Project that owns the account
    pub project: String,
    /// Remote name of the account
    pub name: String,
    /// Named credential to use (defaults to the profile's credential)
    #[arg(long)]
    pub credential: Option<String>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (base_url, credential, format)
    pub key: String,
    /// Value
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from(["giam", "-vv", "apply", "sa.toml", "--dry-run"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.profile, "default");
        match cli.command {
            Commands::Apply(args) => {
                assert_eq!(args.manifest, PathBuf::from("sa.toml"));
                assert!(args.dry_run);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_parse_get_with_globals() {
        let cli = Cli::try_parse_from([
            "giam",
            "get",
            "proj0",
            "title0",
            "--base-url",
            "http://localhost:8080/v1",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Get(ref a) if a.project == "proj0" && a.name == "title0"));
    }

    #[test]
    fn test_command_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

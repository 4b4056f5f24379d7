//! Command-line interface for autobox
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading, environment overrides and validation
//! - Subcommands (version, shell completion, configuration inspection)

pub mod completion;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::complete::LookupMode;
use crate::config::{Config, LogLevel};
use crate::error::Result;

/// Autobox - trigger-symbol autocompletion in the terminal
#[derive(Parser, Debug)]
#[command(
    name = "autobox",
    version,
    about = "Hashtag, mention and relation autocompletion in a terminal editor",
    long_about = "An interactive text box that autocompletes #hashtags, @mentions and
~>relations from a candidate store while you type."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Candidate file (TOML or JSON)
    #[arg(long, value_name = "FILE")]
    pub candidates: Option<PathBuf>,

    /// Resolve lookups asynchronously instead of inline
    #[arg(long)]
    pub deferred: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for autobox
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args);

        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    ///
    /// # Arguments
    /// * `config` - Configuration to modify
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_display_args(config, args);
        Self::apply_logging_args(config, args);
        Self::apply_completion_args(config, args);
    }

    /// Apply display-related CLI arguments to configuration
    fn apply_display_args(config: &mut Config, args: &CliArgs) {
        if args.no_color {
            config.display.color_output = false;
        }
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Apply candidate and lookup arguments to configuration
    fn apply_completion_args(config: &mut Config, args: &CliArgs) {
        if let Some(file) = &args.candidates {
            config.candidates.file = Some(file.clone());
        }
        if args.deferred {
            config.lookup.mode = LookupMode::Deferred;
        }
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                completion::generate_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("autobox version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    ///
    /// # Arguments
    /// * `show` - Whether to show configuration
    /// * `validate` - Whether to validate configuration
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file()?;
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("❌ Configuration file does not exist");
            return Ok(());
        }

        match Config::from_file(&path) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("✅ Configuration is valid"),
                Err(e) => println!("❌ Configuration validation failed: {}", e),
            },
            Err(e) => println!("❌ Failed to load configuration: {}", e),
        }

        Ok(())
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();

        match self.config.to_toml() {
            Ok(toml_str) => println!("{}", toml_str),
            Err(e) => {
                eprintln!("Error formatting configuration: {}", e);
                println!("{:#?}", self.config);
            }
        }

        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(vec!["autobox"]).unwrap();
        assert!(args.config_file.is_none());
        assert!(args.candidates.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_with_flags() {
        let args = CliArgs::try_parse_from(vec!["autobox", "--no-color", "--quiet"]).unwrap();
        assert!(args.no_color);
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_args_subcommands() {
        let args = CliArgs::try_parse_from(vec!["autobox", "completion", "zsh"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Completion { ref shell }) if shell == "zsh"));

        let args =
            CliArgs::try_parse_from(vec!["autobox", "config", "--show", "--validate"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Config {
                show: true,
                validate: true
            })
        ));
    }

    #[test]
    fn test_apply_args_to_config() {
        let args = CliArgs::try_parse_from(vec![
            "autobox",
            "--no-color",
            "--vv",
            "--deferred",
            "--candidates",
            "people.json",
        ])
        .unwrap();

        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);

        assert!(!config.display.color_output);
        assert_eq!(config.logging.level, LogLevel::Trace);
        assert_eq!(config.lookup.mode, LookupMode::Deferred);
        assert_eq!(config.candidates.file, Some(PathBuf::from("people.json")));
    }

    #[test]
    fn test_verbose_wins_over_quiet() {
        let args = CliArgs::try_parse_from(vec!["autobox", "-v", "-q"]).unwrap();
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[suggestions]\nmax_rows = 3\n").unwrap();

        let args = CliArgs::try_parse_from(vec![
            "autobox".to_string(),
            "-c".to_string(),
            path.display().to_string(),
        ])
        .unwrap();
        let cli = CliInterface::from_args(args).unwrap();
        assert_eq!(cli.config().suggestions.max_rows, 3);
        assert_eq!(cli.get_config_path(), path);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[suggestions]\nmax_rows = 0\n").unwrap();

        let args = CliArgs::try_parse_from(vec![
            "autobox".to_string(),
            "--config".to_string(),
            path.display().to_string(),
        ])
        .unwrap();
        let cli = CliInterface::from_args(args).unwrap();
        assert_eq!(
            cli.config().suggestions.max_rows,
            Config::default().suggestions.max_rows
        );
    }
}

//! Autobox - trigger-symbol autocompletion in the terminal
//!
//! Opens a full-screen text box wired to the autocompletion engine. Typing a
//! trigger symbol (`#`, `@` or `~>` by default) starts an autocompletion,
//! matching candidates are listed under the text and Tab picks one.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode with the built-in sample candidates
//! autobox
//!
//! # Candidates from a file, lookups resolved off the key loop
//! autobox --candidates people.toml --deferred
//! ```

use std::fs::OpenOptions;
use std::io;
use std::sync::{Arc, Mutex};

use tracing::info;

use autobox::cli::CliInterface;
use autobox::complete::{Autocompleter, LookupDispatcher, LookupMode, MemoryCandidateProvider};
use autobox::config::{Config, LoggingConfig};
use autobox::editor::Editor;
use autobox::error::Result;
use autobox::terminal::TerminalHost;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or start the interactive editor
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;
    let interactive = cli.args().command.is_none();

    initialize_logging(&cli.config().logging, interactive)?;

    if cli.handle_subcommand()? {
        return Ok(());
    }

    run_interactive_mode(cli.config()).await
}

/// Run the terminal editor until the user quits, then print the result
async fn run_interactive_mode(config: &Config) -> Result<()> {
    let provider = Arc::new(load_candidates(config)?);
    let engine = Autocompleter::new(provider.clone())
        .with_triggers(config.triggers()?)
        .with_max_rows(config.suggestions.max_rows)
        .with_lookup_mode(config.lookup.mode);

    let editor = Editor::new(engine).with_echo(true);
    let mut host = TerminalHost::new(editor, config.display.color_output);
    if config.lookup.mode == LookupMode::Deferred {
        let (dispatcher, results) = LookupDispatcher::new(provider, config.lookup_timeout());
        host = host.with_dispatcher(dispatcher, results);
    }

    let editor = host.run().await?;
    let completed = editor.engine().completed().entries();
    info!("Session finished with {} autocompletions", completed.len());

    println!("{}", editor.plain_text());
    if !completed.is_empty() {
        println!();
        println!("Autocompleted: {}", completed.join(", "));
    }
    Ok(())
}

/// Load the candidate store named in the configuration, or the samples
fn load_candidates(config: &Config) -> Result<MemoryCandidateProvider> {
    match &config.candidates.file {
        Some(path) => Ok(MemoryCandidateProvider::from_file(path)?),
        None => {
            info!("No candidate file configured, using samples");
            Ok(MemoryCandidateProvider::with_samples())
        }
    }
}

/// Initialize logging system based on configuration
///
/// Interactive mode owns the terminal, so logs only go out when a log file
/// is configured. Subcommands log to stderr.
///
/// # Arguments
/// * `config` - Logging configuration after CLI overrides
/// * `interactive` - Whether the full-screen editor is about to start
fn initialize_logging(config: &LoggingConfig, interactive: bool) -> Result<()> {
    let level = config.level.to_tracing_level();

    match &config.file_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));

            if config.timestamps {
                subscriber.init();
            } else {
                subscriber.without_time().init();
            }
        }
        None if interactive => {}
        None => {
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(false)
                .with_writer(io::stderr);

            if config.timestamps {
                subscriber.init();
            } else {
                subscriber.without_time().init();
            }
        }
    }
    Ok(())
}

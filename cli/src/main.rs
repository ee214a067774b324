mod commands;
mod logging;

use anyhow::{bail, Context};
use clap::Parser;
use clap_derive::{Parser, ValueEnum};
use config::{load_env_file, Messages, PromptShape, Settings, API_KEY_ENV};
use consulta_core::database::seed::{init_demo_database, known_values};
use consulta_core::{ConversationStore, PipelineOptions, SqliteDatabase, TabularResult, TurnOrchestrator};
use llm::{OpenAIProvider, OpenAITranscriber, RetryPolicy};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq)]
#[clap(rename_all = "lowercase")]
enum Shape {
    Split,
    Combined,
}

impl From<Shape> for PromptShape {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Split => PromptShape::Split,
            Shape::Combined => PromptShape::Combined,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Ask questions about a SQLite database in plain language", long_about = None)]
struct Args {
    /// Chat model (overrides settings.toml)
    #[arg(long)]
    model: Option<String>,

    /// Custom base URL for an OpenAI-compatible API (e.g., for proxy or compatible services)
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    /// SQLite database to query
    #[arg(long)]
    database: Option<PathBuf>,

    /// Prior turns sent to the model as context; 0 sends all of them
    #[arg(long)]
    history_window: Option<usize>,

    /// Send instructions as a system message (split) or inside the user message (combined)
    #[arg(long, value_enum)]
    prompt_shape: Option<Shape>,

    /// Settings file (default: settings.toml in the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not create or fill the demo hospital tables
    #[arg(long)]
    no_seed: bool,

    /// Show the SQL and the result table under each answer
    #[arg(long)]
    show_sql: bool,

    /// Debug logging for the pipeline and the model client
    #[arg(long, short)]
    verbose: bool,

    /// Write logs to the log file instead of stderr
    #[arg(long)]
    log_file: bool,
}

// Application state
pub(crate) struct AppState {
    orchestrator: TurnOrchestrator,
    store: ConversationStore,
    database: Arc<SqliteDatabase>,
    transcriber: OpenAITranscriber,
    show_sql: bool,
    messages: Messages,
}

impl AppState {
    /// Drop the conversation and start a fresh one
    fn reset_session(&mut self) {
        self.store = ConversationStore::new();
    }
}

/// Run one question through the pipeline and print the reply
pub(crate) async fn ask(state: &mut AppState, question: &str) {
    let outcome = state.orchestrator.process_turn(&mut state.store, question).await;

    let Some(reply) = state.store.last() else {
        return;
    };
    println!("{}", reply.content());

    if state.show_sql && outcome.is_completed() {
        if let (Some(sql), Some(result)) = (reply.generated_sql(), reply.result()) {
            println!();
            println!("SQL: {}", sql);
            print_result(result, &state.messages.no_results);
        }
    }
}

pub(crate) fn print_result(result: &TabularResult, no_results: &str) {
    if result.is_empty() {
        println!("({})", no_results);
    } else {
        println!("{}", result);
    }
}

fn print_status_bar(model_name: &str, database: &str) {
    let terminal_width: usize = 80;
    let status = format!(" {} • {} ", model_name, database);
    let padding = terminal_width.saturating_sub(status.chars().count());
    let left_pad = padding / 2;
    let right_pad = padding - left_pad;

    println!("┌{}┐", "─".repeat(terminal_width - 2));
    println!("│{}{}{}│", " ".repeat(left_pad), status, " ".repeat(right_pad));
    println!("└{}┘", "─".repeat(terminal_width - 2));
}

fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(anyhow::Error::msg)?;

    if let Some(model) = &args.model {
        settings.model = model.clone();
    }
    if let Some(base_url) = &args.base_url {
        settings.base_url = Some(base_url.clone());
    }
    if let Some(database) = &args.database {
        settings.database_path = database.display().to_string();
    }
    if let Some(window) = args.history_window {
        settings.history_window = window;
    }
    if let Some(shape) = args.prompt_shape {
        settings.prompt_shape = shape.into();
    }
    Ok(settings)
}

fn build_state(args: &Args, settings: Settings) -> anyhow::Result<AppState> {
    let Some(api_key) = config::api_key() else {
        bail!(
            "{} is not set. Export it or add `{}=<your key>` to a .env file in this directory or your home directory.",
            API_KEY_ENV,
            API_KEY_ENV
        );
    };

    let db_path = PathBuf::from(&settings.database_path);
    let mut options = PipelineOptions::from_settings(&settings);
    if args.no_seed {
        if !db_path.exists() {
            bail!("Database {} does not exist", db_path.display());
        }
    } else {
        init_demo_database(&db_path)
            .with_context(|| format!("Failed to prepare database {}", db_path.display()))?;
        options = options.with_hints(known_values());
    }

    let retry = RetryPolicy {
        max_retries: settings.retry.max_retries,
        initial_backoff: settings.retry.initial_backoff(),
        max_backoff: settings.retry.max_backoff(),
    };
    let provider = match &settings.base_url {
        Some(url) => OpenAIProvider::new(url, &api_key, retry)?,
        None => OpenAIProvider::default(&api_key, retry)?,
    };
    tracing::info!(base_url = provider.base_url(), model = %settings.model, "Provider ready");

    let model = provider.create_chat_model(&settings.model);
    let transcriber = provider.create_transcriber(&settings.transcription_model, None);
    let database = Arc::new(SqliteDatabase::new(&db_path));
    let orchestrator = TurnOrchestrator::new(model, database.clone(), database.clone(), options);

    Ok(AppState {
        orchestrator,
        store: ConversationStore::new(),
        database,
        transcriber,
        show_sql: args.show_sql,
        messages: settings.messages,
    })
}

async fn run(args: Args) -> anyhow::Result<()> {
    let settings = load_settings(&args)?;
    let mut state = build_state(&args, settings)?;

    let database_label = state.database.path().display().to_string();
    print_status_bar(state.orchestrator.model_name(), &database_label);
    println!();
    println!("Type /help for commands, Ctrl+D or /quit to exit.");
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
            None => {
                println!();
                println!("Goodbye!");
                break;
            }
        };

        let input = line.trim();

        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match commands::Command::parse(input) {
                Ok(cmd) => match cmd.execute(&mut state).await {
                    commands::CommandResult::Exit => break,
                    commands::CommandResult::Continue => continue,
                },
                Err(err) => {
                    println!("{}", err);
                    println!();
                    continue;
                }
            }
        }

        ask(&mut state, input).await;
        println!();
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    load_env_file();
    let args = Args::parse();

    let _log_guard = logging::init_logging(args.verbose, args.log_file);

    if let Err(e) = run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let args = Args::parse_from([
            "consulta",
            "--config",
            "/nonexistent/settings.toml",
            "--model",
            "gpt-4o",
            "--database",
            "clinica.db",
            "--history-window",
            "0",
            "--prompt-shape",
            "combined",
        ]);
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.database_path, "clinica.db");
        assert_eq!(settings.history_bound(), None);
        assert_eq!(settings.prompt_shape, PromptShape::Combined);
        assert_eq!(settings.row_limit, Settings::default().row_limit);
    }

    #[test]
    fn test_defaults_come_from_settings() {
        let args = Args::parse_from(["consulta", "--config", "/nonexistent/settings.toml"]);
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.history_bound(), Some(10));
        assert!(!args.show_sql);
    }
}

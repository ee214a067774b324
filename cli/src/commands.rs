//! Slash command parsing and handling

use consulta_core::{transcribe_question, Error, QueryExecutor, SchemaProvider};
use std::path::{Path, PathBuf};

use crate::{ask, print_result, AppState};

/// Rows shown per table by /data
const DATA_PREVIEW_ROWS: usize = 20;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Clear,
    Data,
    Schema,
    ToggleSql,
    Audio(PathBuf),
}

pub enum CommandResult {
    Continue,
    Exit,
}

impl Command {
    pub fn parse(input: &str) -> Result<Self, String> {
        let Some(rest) = input.strip_prefix('/') else {
            return Err("Not a command".to_string());
        };

        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        match name {
            "" => Err("Empty command".to_string()),
            "quit" | "exit" => Ok(Command::Quit),
            "help" => Ok(Command::Help),
            "clear" => Ok(Command::Clear),
            "data" => Ok(Command::Data),
            "schema" => Ok(Command::Schema),
            "sql" => Ok(Command::ToggleSql),
            "audio" => {
                if arg.is_empty() {
                    return Err("Usage: /audio <file>".to_string());
                }
                Ok(Command::Audio(PathBuf::from(arg)))
            }
            _ => Err(format!("Unknown command: /{}. Type /help for available commands.", name)),
        }
    }

    pub async fn execute(self, state: &mut AppState) -> CommandResult {
        match self {
            Command::Quit => {
                println!("Goodbye!");
                return CommandResult::Exit;
            }
            Command::Help => print_help(),
            Command::Clear => {
                state.reset_session();
                println!("Conversation history cleared.");
            }
            Command::Data => show_data(state),
            Command::Schema => match state.database.schema() {
                Ok(schema) => println!("{}", schema),
                Err(e) => eprintln!("Failed to read schema: {}", e),
            },
            Command::ToggleSql => {
                state.show_sql = !state.show_sql;
                let status = if state.show_sql { "on" } else { "off" };
                println!("SQL display {}.", status);
            }
            Command::Audio(path) => ask_from_audio(state, &path).await,
        }
        println!();
        CommandResult::Continue
    }
}

/// Browse every table, a few rows each
fn show_data(state: &AppState) {
    let tables = match state.database.tables() {
        Ok(tables) => tables,
        Err(e) => {
            eprintln!("Failed to list tables: {}", e);
            return;
        }
    };

    for table in tables {
        println!("== {} ==", table);
        let sql = format!(
            "SELECT * FROM \"{}\" LIMIT {}",
            table.replace('"', "\"\""),
            DATA_PREVIEW_ROWS
        );
        match state.database.execute(&sql) {
            Ok(result) => print_result(&result, &state.messages.no_results),
            Err(e) => eprintln!("Failed to read {}: {}", table, e),
        }
        println!();
    }
}

async fn ask_from_audio(state: &mut AppState, path: &Path) {
    let Some(mime_type) = mime_type_for(path) else {
        eprintln!("Unsupported audio format: {}", path.display());
        return;
    };
    let audio = match tokio::fs::read(path).await {
        Ok(audio) => audio,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path.display(), e);
            return;
        }
    };

    match transcribe_question(&state.transcriber, audio, mime_type).await {
        Ok(question) => {
            println!("> {}", question);
            ask(state, &question).await;
        }
        Err(Error::TranscriptionAmbiguous) => {
            println!("⚠ {}", state.messages.transcription_failed);
        }
        Err(e) => eprintln!("{}: {}", state.messages.transcription_failed, e),
    }
}

/// MIME type of a recording, from its extension
fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "wav" => "audio/wav",
        "mp3" | "mpeg" | "mpga" => "audio/mpeg",
        "m4a" | "mp4" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "webm" => "audio/webm",
        "flac" => "audio/flac",
        _ => return None,
    };
    Some(mime)
}

fn print_help() {
    println!("Ask a question about the database, or use a command:");
    println!("  /data                  - Show the rows of every table");
    println!("  /schema                - Show the table definitions");
    println!("  /sql                   - Toggle showing the SQL and result under answers");
    println!("  /audio <file>          - Ask a recorded question (wav, mp3, m4a, ogg, webm, flac)");
    println!("  /clear                 - Start a new conversation");
    println!("  /quit, /exit           - Exit");
    println!("  /help                  - Show this help message");
    println!("  Ctrl+D                 - Exit");
}

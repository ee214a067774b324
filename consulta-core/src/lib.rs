//! Conversational questions over a SQLite database
//!
//! This crate provides:
//! - **Data model**: `Turn`, `TabularResult`, `ConversationStore` and its `ConversationWindow`
//! - **Stages**: `Translator` (question to SQL), the read-only `gate`, `Synthesizer` (result to answer)
//! - **Orchestration**: `TurnOrchestrator::process_turn`, the single entry point for a question
//! - **Store**: `SchemaProvider` and `QueryExecutor` with the `SqliteDatabase` backend and demo seed data
//!
//! # Example
//!
//! ```ignore
//! use consulta_core::{ConversationStore, PipelineOptions, SqliteDatabase, TurnOrchestrator};
//!
//! let db = Arc::new(SqliteDatabase::new("hospital.db"));
//! let orchestrator = TurnOrchestrator::new(model, db.clone(), db, PipelineOptions::default());
//! let mut store = ConversationStore::new();
//! orchestrator.process_turn(&mut store, "Quantos pacientes existem?").await;
//! ```
pub mod conversation;
pub mod database;
pub mod error;
pub mod gate;
pub mod orchestrator;
mod prompt;
pub mod synthesize;
pub mod transcribe;
pub mod translate;
pub mod turn;

pub use conversation::{ConversationStore, ConversationWindow, TurnId};
pub use database::{QueryExecutor, SchemaProvider, SqliteDatabase};
pub use error::{Error, Result};
pub use orchestrator::{PipelineOptions, TurnOrchestrator, TurnOutcome, TurnStage};
pub use synthesize::Synthesizer;
pub use transcribe::transcribe_question;
pub use translate::{strip_code_fence, Translator};
pub use turn::{TabularResult, Turn, TurnRole, Value};

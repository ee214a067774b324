mod common;

use common::{ScriptedModel, TempDatabase};
use config::Messages;
use consulta_core::database::seed::known_values;
use consulta_core::{
    ConversationStore, Error, PipelineOptions, SqliteDatabase, TurnOrchestrator, TurnOutcome,
    TurnRole, TurnStage, Value,
};
use llm::Role;
use std::sync::Arc;

fn orchestrator(model: Arc<ScriptedModel>, db: &TempDatabase) -> TurnOrchestrator {
    let sqlite = Arc::new(SqliteDatabase::new(&db.path));
    let options = PipelineOptions::default().with_hints(known_values());
    TurnOrchestrator::new(model, sqlite.clone(), sqlite, options)
}

#[tokio::test]
async fn test_count_question_is_answered_from_the_store() {
    let db = TempDatabase::seeded();
    let model = ScriptedModel::new([
        "SELECT COUNT(*) FROM pacientes",
        "Existem 10 pacientes cadastrados no sistema.",
    ]);
    let orch = orchestrator(model.clone(), &db);
    let mut store = ConversationStore::new();

    let outcome = orch.process_turn(&mut store, "Quantos pacientes existem?").await;
    assert_eq!(outcome, TurnOutcome::Completed);

    let requests = model.requests();
    assert_eq!(requests.len(), 2);

    // Translation sees the real schema and the known values
    let system = requests[0].text_for(Role::System);
    assert!(system.contains("pacientes"));
    assert!(system.contains("consultas.status: 'agendada', 'realizada'"));
    assert!(requests[0].text_for(Role::User).contains("Quantos pacientes existem?"));

    // Synthesis sees the executed result
    let synthesis = requests[1].text_for(Role::User);
    assert!(synthesis.contains("COUNT(*)"));
    assert!(synthesis.contains("10"));

    let answer = store.last().unwrap();
    assert!(answer.content().contains("10"));
    assert_eq!(answer.generated_sql(), Some("SELECT COUNT(*) FROM pacientes"));
    let result = answer.result().unwrap();
    assert_eq!(result.rows(), &[vec![Value::Integer(10)]]);
}

#[tokio::test]
async fn test_drop_table_is_refused_and_table_survives() {
    let db = TempDatabase::seeded();
    let model = ScriptedModel::new(["DROP TABLE pacientes", "SELECT COUNT(*) FROM pacientes", "10"]);
    let orch = orchestrator(model.clone(), &db);
    let mut store = ConversationStore::new();

    let outcome = orch.process_turn(&mut store, "Apague a tabela de pacientes").await;
    assert_eq!(outcome, TurnOutcome::Refused { keyword: "DROP" });
    assert_eq!(model.requests().len(), 1);

    let reply = store.last().unwrap();
    assert_eq!(reply.content(), Messages::default().refusal);
    assert!(reply.generated_sql().is_none());
    assert!(reply.result().is_none());

    // The next turn still works against an intact table
    let outcome = orch.process_turn(&mut store, "Quantos pacientes existem?").await;
    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(store.last().unwrap().result().unwrap().rows(), &[vec![Value::Integer(10)]]);
    assert_eq!(store.len(), 4);
}

#[tokio::test]
async fn test_empty_result_reaches_synthesis_as_no_results() {
    let db = TempDatabase::seeded();
    let model = ScriptedModel::new([
        "SELECT nome FROM pacientes WHERE data_nascimento < '1900-01-01'",
        "Nenhum paciente nasceu antes de 1900.",
    ]);
    let orch = orchestrator(model.clone(), &db);
    let mut store = ConversationStore::new();

    let outcome = orch.process_turn(&mut store, "Quem nasceu antes de 1900?").await;
    assert_eq!(outcome, TurnOutcome::Completed);

    let synthesis = model.requests()[1].text_for(Role::User);
    assert!(synthesis.contains(&Messages::default().no_results));
    for name in ["Ana Silva", "Carlos Oliveira"] {
        assert!(!synthesis.contains(name));
    }

    let answer = store.last().unwrap();
    assert!(answer.generated_sql().is_some());
    assert!(answer.result().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_column_fails_without_synthesis() {
    let db = TempDatabase::seeded();
    let model = ScriptedModel::new(["SELECT idade FROM pacientes", "unused"]);
    let orch = orchestrator(model.clone(), &db);
    let mut store = ConversationStore::new();

    let outcome = orch.process_turn(&mut store, "Qual a idade dos pacientes?").await;
    match outcome {
        TurnOutcome::Failed {
            stage: TurnStage::Executing,
            error: Error::Query { message },
        } => assert!(message.contains("idade"), "{message}"),
        other => panic!("expected execution failure, got {other:?}"),
    }
    assert_eq!(model.requests().len(), 1);

    let reply = store.last().unwrap();
    assert!(reply.content().starts_with("Erro ao processar a pergunta: "));
    assert!(reply.content().contains("idade"));
    assert_eq!(reply.generated_sql(), Some("SELECT idade FROM pacientes"));
    assert!(reply.result().is_none());
}

#[tokio::test]
async fn test_synthesis_failure_keeps_executed_sql() {
    let db = TempDatabase::seeded();
    let model = ScriptedModel::new(["SELECT COUNT(*) FROM pacientes"]);
    let orch = orchestrator(model.clone(), &db);
    let mut store = ConversationStore::new();

    let outcome = orch.process_turn(&mut store, "Quantos pacientes existem?").await;
    assert!(matches!(
        outcome,
        TurnOutcome::Failed { stage: TurnStage::Synthesizing, .. }
    ));
    assert_eq!(model.requests().len(), 2);

    let reply = store.last().unwrap();
    assert!(reply.content().starts_with("Erro ao processar a pergunta: "));
    assert_eq!(reply.generated_sql(), Some("SELECT COUNT(*) FROM pacientes"));
    assert!(reply.result().is_none());
}

#[tokio::test]
async fn test_follow_up_question_sees_prior_patient() {
    let db = TempDatabase::seeded();
    let model = ScriptedModel::new([
        "SELECT nome, telefone FROM pacientes WHERE nome LIKE '%João Pereira%' COLLATE NOCASE",
        "O telefone de João Pereira é (41) 96543-2109.",
        "SELECT data_nascimento FROM pacientes WHERE nome LIKE '%João Pereira%' COLLATE NOCASE",
        "João Pereira nasceu em 30/01/1995.",
    ]);
    let orch = orchestrator(model.clone(), &db);
    let mut store = ConversationStore::new();

    orch.process_turn(&mut store, "Qual o telefone do paciente João Pereira?").await;
    let outcome = orch.process_turn(&mut store, "E ele, quando nasceu?").await;
    assert_eq!(outcome, TurnOutcome::Completed);

    let requests = model.requests();
    let translation = requests[2].text_for(Role::User);
    assert!(translation.contains("User: Qual o telefone do paciente João Pereira?"));
    assert!(translation.contains("Assistant: O telefone de João Pereira é (41) 96543-2109."));
    assert!(translation.contains("Current question: E ele, quando nasceu?"));

    let answer = store.last().unwrap();
    assert_eq!(
        answer.result().unwrap().rows(),
        &[vec![Value::Text("1995-01-30".to_string())]]
    );
}

#[tokio::test]
async fn test_mixed_session_keeps_one_reply_per_question() {
    let db = TempDatabase::seeded();
    let model = ScriptedModel::new([
        "```sql\nSELECT COUNT(*) FROM medicos\n```",
        "Há 10 médicos.",
        "  update pacientes set nome = 'x'",
        "SELECT coluna_inexistente FROM medicos",
        "SELECT COUNT(*) FROM consultas WHERE status = 'agendada'",
        "Há 3 consultas agendadas.",
    ]);
    let orch = orchestrator(model, &db);
    let mut store = ConversationStore::new();

    let questions = [
        "Quantos médicos existem?",
        "Renomeie os pacientes",
        "Qual a coluna inexistente?",
        "Quantas consultas estão agendadas?",
    ];
    let mut outcomes = Vec::new();
    for question in questions {
        outcomes.push(orch.process_turn(&mut store, question).await);
    }

    assert!(outcomes[0].is_completed());
    assert_eq!(outcomes[1], TurnOutcome::Refused { keyword: "UPDATE" });
    assert!(matches!(outcomes[2], TurnOutcome::Failed { stage: TurnStage::Executing, .. }));
    assert!(outcomes[3].is_completed());

    assert_eq!(store.len(), questions.len() * 2);
    for (idx, turn) in store.turns().iter().enumerate() {
        let expected = if idx % 2 == 0 { TurnRole::User } else { TurnRole::Assistant };
        assert_eq!(turn.role(), expected);
        if turn.result().is_some() {
            assert!(turn.generated_sql().is_some());
        }
    }
    assert_eq!(
        store.turns()[1].generated_sql(),
        Some("SELECT COUNT(*) FROM medicos")
    );
    assert_eq!(
        store.turns()[7].result().unwrap().rows(),
        &[vec![Value::Integer(3)]]
    );
}

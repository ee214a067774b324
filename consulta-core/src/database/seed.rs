//! Demo hospital store
//!
//! Creates the `pacientes`, `medicos` and `consultas` tables and fills them
//! with a fixed data set the first time. This is the only code that writes
//! to the store; generated SQL never reaches it.

use chrono::Local;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::info;

use crate::error::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS pacientes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nome TEXT NOT NULL,
    data_nascimento TEXT NOT NULL,
    telefone TEXT,
    email TEXT
);
CREATE TABLE IF NOT EXISTS medicos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nome TEXT NOT NULL,
    especialidade TEXT NOT NULL,
    crm TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS consultas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    paciente_id INTEGER NOT NULL,
    medico_id INTEGER NOT NULL,
    data_consulta TEXT NOT NULL,
    diagnostico TEXT,
    status TEXT NOT NULL DEFAULT 'agendada',
    FOREIGN KEY (paciente_id) REFERENCES pacientes(id),
    FOREIGN KEY (medico_id) REFERENCES medicos(id)
);
";

const PATIENTS: [(&str, &str, &str, &str); 10] = [
    ("Ana Silva", "1985-03-12", "(11) 99876-5432", "ana.silva@email.com"),
    ("Carlos Oliveira", "1990-07-25", "(21) 98765-4321", "carlos.oliveira@email.com"),
    ("Maria Santos", "1978-11-08", "(31) 97654-3210", "maria.santos@email.com"),
    ("João Pereira", "1995-01-30", "(41) 96543-2109", "joao.pereira@email.com"),
    ("Fernanda Costa", "1988-06-17", "(51) 95432-1098", "fernanda.costa@email.com"),
    ("Rafael Souza", "1972-09-03", "(61) 94321-0987", "rafael.souza@email.com"),
    ("Juliana Lima", "2000-12-22", "(71) 93210-9876", "juliana.lima@email.com"),
    ("Pedro Almeida", "1983-04-14", "(81) 92109-8765", "pedro.almeida@email.com"),
    ("Camila Rodrigues", "1992-08-07", "(91) 91098-7654", "camila.rodrigues@email.com"),
    ("Lucas Ferreira", "1998-02-28", "(11) 90987-6543", "lucas.ferreira@email.com"),
];

const DOCTORS: [(&str, &str, &str); 10] = [
    ("Dr. Roberto Mendes", "Cardiologia", "CRM-SP 12345"),
    ("Dra. Patrícia Nunes", "Dermatologia", "CRM-RJ 23456"),
    ("Dr. André Barbosa", "Ortopedia", "CRM-MG 34567"),
    ("Dra. Beatriz Araújo", "Pediatria", "CRM-PR 45678"),
    ("Dr. Marcos Teixeira", "Neurologia", "CRM-RS 56789"),
    ("Dra. Renata Campos", "Ginecologia", "CRM-BA 67890"),
    ("Dr. Gustavo Ribeiro", "Oftalmologia", "CRM-DF 78901"),
    ("Dra. Larissa Martins", "Psiquiatria", "CRM-PE 89012"),
    ("Dr. Felipe Correia", "Urologia", "CRM-PA 90123"),
    ("Dra. Isabela Rocha", "Endocrinologia", "CRM-SP 01234"),
];

/// `None` dates are filled in with the day the store is seeded
const APPOINTMENTS: [(i64, i64, Option<&str>, &str, &str); 10] = [
    (1, 1, None, "Hipertensão leve", "realizada"),
    (2, 3, Some("2025-12-10"), "Fratura no punho", "realizada"),
    (3, 2, Some("2026-01-15"), "Dermatite de contato", "realizada"),
    (4, 4, None, "Resfriado comum", "realizada"),
    (5, 5, Some("2026-02-01"), "Enxaqueca crônica", "realizada"),
    (6, 6, Some("2026-02-05"), "Exame de rotina", "realizada"),
    (7, 7, Some("2026-02-10"), "Miopia leve", "realizada"),
    (8, 8, None, "Ansiedade generalizada", "agendada"),
    (9, 9, Some("2026-02-20"), "Consulta de rotina", "agendada"),
    (10, 10, Some("2026-02-25"), "Hipotireoidismo", "agendada"),
];

const STATUSES: [&str; 2] = ["agendada", "realizada"];

/// Create the demo tables if needed and seed them when `pacientes` is empty.
/// Returns whether rows were inserted.
pub fn init_demo_database(path: impl AsRef<Path>) -> Result<bool> {
    let mut conn = Connection::open(path.as_ref())?;
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM pacientes", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(false);
    }

    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO pacientes (nome, data_nascimento, telefone, email) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (nome, nascimento, telefone, email) in PATIENTS {
            stmt.execute(params![nome, nascimento, telefone, email])?;
        }

        let mut stmt =
            tx.prepare("INSERT INTO medicos (nome, especialidade, crm) VALUES (?1, ?2, ?3)")?;
        for (nome, especialidade, crm) in DOCTORS {
            stmt.execute(params![nome, especialidade, crm])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO consultas (paciente_id, medico_id, data_consulta, diagnostico, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (paciente, medico, data, diagnostico, status) in APPOINTMENTS {
            let data = data.unwrap_or(today.as_str());
            stmt.execute(params![paciente, medico, data, diagnostico, status])?;
        }
    }
    tx.commit()?;

    info!(path = %path.as_ref().display(), "Seeded demo database");
    Ok(true)
}

/// Domain values worth listing in the translation prompt, so the model
/// filters on the spellings the store actually uses.
pub fn known_values() -> Vec<String> {
    vec![
        format!("consultas.status: {}", quote_all(STATUSES.iter().copied())),
        format!(
            "medicos.especialidade: {}",
            quote_all(DOCTORS.iter().map(|(_, especialidade, _)| *especialidade))
        ),
    ]
}

fn quote_all<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.map(|v| format!("'{}'", v)).collect::<Vec<_>>().join(", ")
}

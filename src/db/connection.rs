use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Ensure the database file exists, run lazy migrations, and return a live
/// connection. The table names match the layout older installs already use so
/// an existing database file keeps working.
pub fn ensure_schema(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(db_path).context("failed to open SQLite database")?;
    create_tables(&conn)?;
    log::info!("database ready at {}", db_path.display());
    Ok(conn)
}

/// Fresh in-memory database with the full schema, used by tests and by
/// `--database :memory:`.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    create_tables(&conn)?;
    Ok(conn)
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS hinos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            numero TEXT NOT NULL,
            titulo TEXT NOT NULL,
            letra TEXT,
            tipo TEXT DEFAULT 'harpa'
        )",
        [],
    )
    .context("failed to create hymns table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS louvores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            titulo TEXT NOT NULL,
            autor TEXT,
            letra TEXT
        )",
        [],
    )
    .context("failed to create praises table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS versiculos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            livro TEXT NOT NULL,
            capitulo INTEGER NOT NULL,
            versiculo INTEGER NOT NULL,
            texto TEXT NOT NULL,
            versao TEXT DEFAULT 'ARC'
        )",
        [],
    )
    .context("failed to create verses table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS historico_culto (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            data TEXT NOT NULL,
            tipo_culto TEXT NOT NULL,
            itens TEXT
        )",
        [],
    )
    .context("failed to create service history table")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_database_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("projector.sqlite");
        let conn = ensure_schema(&path).unwrap();
        assert!(path.exists());

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('hinos', 'louvores', 'versiculos', 'historico_culto')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 4);
    }

    #[test]
    fn schema_creation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projector.sqlite");
        drop(ensure_schema(&path).unwrap());
        ensure_schema(&path).unwrap();
    }
}

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::like_pattern;
use crate::models::{Hymn, DEFAULT_HYMN_KIND};

const HYMN_COLUMNS: &str = "id, numero, titulo, letra, tipo";

fn hymn_from_row(row: &Row<'_>) -> rusqlite::Result<Hymn> {
    Ok(Hymn {
        id: row.get(0)?,
        number: row.get(1)?,
        title: row.get(2)?,
        lyrics: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        kind: row
            .get::<_, Option<String>>(4)?
            .unwrap_or_else(|| DEFAULT_HYMN_KIND.to_string()),
    })
}

/// Retrieve every hymn in hymnal order. Numbers are stored as text, so the
/// query casts them to keep "10" after "9".
pub fn fetch_hymns(conn: &Connection) -> Result<Vec<Hymn>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {HYMN_COLUMNS} FROM hinos ORDER BY CAST(numero AS INTEGER), numero"
        ))
        .context("failed to prepare hymn query")?;

    let hymns = stmt
        .query_map([], hymn_from_row)
        .context("failed to load hymns")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect hymns")?;

    Ok(hymns)
}

pub fn fetch_hymn(conn: &Connection, id: i64) -> Result<Option<Hymn>> {
    conn.query_row(
        &format!("SELECT {HYMN_COLUMNS} FROM hinos WHERE id = ?1"),
        params![id],
        hymn_from_row,
    )
    .optional()
    .context("failed to load hymn")
}

/// Look a hymn up by its exact hymnal number.
pub fn find_hymn_by_number(conn: &Connection, number: &str) -> Result<Option<Hymn>> {
    conn.query_row(
        &format!("SELECT {HYMN_COLUMNS} FROM hinos WHERE numero = ?1"),
        params![number.trim()],
        hymn_from_row,
    )
    .optional()
    .context("failed to look up hymn by number")
}

/// Case-insensitive substring match on number or title.
pub fn search_hymns(conn: &Connection, query: &str) -> Result<Vec<Hymn>> {
    let pattern = like_pattern(query);
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {HYMN_COLUMNS} FROM hinos
             WHERE LOWER(numero) LIKE ?1 ESCAPE '\\' OR LOWER(titulo) LIKE ?1 ESCAPE '\\'
             ORDER BY CAST(numero AS INTEGER), numero"
        ))
        .context("failed to prepare hymn search")?;

    let hymns = stmt
        .query_map(params![pattern], hymn_from_row)
        .context("failed to search hymns")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect hymn search results")?;

    Ok(hymns)
}

/// Insert a hymn and echo the hydrated struct back to the caller.
pub fn create_hymn(
    conn: &Connection,
    number: &str,
    title: &str,
    lyrics: &str,
    kind: &str,
) -> Result<Hymn> {
    conn.execute(
        "INSERT INTO hinos (numero, titulo, letra, tipo) VALUES (?1, ?2, ?3, ?4)",
        params![number, title, lyrics, kind],
    )
    .context("failed to insert hymn")?;

    Ok(Hymn {
        id: conn.last_insert_rowid(),
        number: number.to_string(),
        title: title.to_string(),
        lyrics: lyrics.to_string(),
        kind: kind.to_string(),
    })
}

pub fn update_hymn(conn: &Connection, hymn: &Hymn) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE hinos SET numero = ?1, titulo = ?2, letra = ?3, tipo = ?4 WHERE id = ?5",
            params![hymn.number, hymn.title, hymn.lyrics, hymn.kind, hymn.id],
        )
        .context("failed to update hymn")?;

    if updated == 0 {
        Err(anyhow!("Hymn not found"))
    } else {
        Ok(())
    }
}

pub fn delete_hymn(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM hinos WHERE id = ?1", params![id])
        .context("failed to delete hymn")?;

    if deleted == 0 {
        Err(anyhow!("Hymn not found"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn hymns_sort_numerically() {
        let conn = open_in_memory().unwrap();
        create_hymn(&conn, "10", "Dez", "", "harpa").unwrap();
        create_hymn(&conn, "9", "Nove", "", "harpa").unwrap();
        create_hymn(&conn, "001", "Um", "", "harpa").unwrap();

        let numbers: Vec<String> = fetch_hymns(&conn)
            .unwrap()
            .into_iter()
            .map(|h| h.number)
            .collect();
        assert_eq!(numbers, vec!["001", "9", "10"]);
    }

    #[test]
    fn search_matches_number_or_title() {
        let conn = open_in_memory().unwrap();
        create_hymn(&conn, "001", "Chuvas de Graça", "", "harpa").unwrap();
        create_hymn(&conn, "003", "Vem a Mim", "", "harpa").unwrap();

        assert_eq!(search_hymns(&conn, "CHUVAS").unwrap().len(), 1);
        assert_eq!(search_hymns(&conn, "003").unwrap()[0].title, "Vem a Mim");
        assert_eq!(search_hymns(&conn, "00").unwrap().len(), 2);
        assert!(search_hymns(&conn, "nada").unwrap().is_empty());
    }

    #[test]
    fn search_treats_wildcards_as_text() {
        let conn = open_in_memory().unwrap();
        create_hymn(&conn, "200", "100% Teu", "", "harpa").unwrap();
        create_hymn(&conn, "201", "Vem a Mim", "", "harpa").unwrap();

        let found = search_hymns(&conn, "%").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "100% Teu");
        assert!(search_hymns(&conn, "_").unwrap().is_empty());
    }

    #[test]
    fn update_and_delete_report_missing_rows() {
        let conn = open_in_memory().unwrap();
        let mut hymn = create_hymn(&conn, "005", "Ceia do Senhor", "a\n\nb", "harpa").unwrap();

        hymn.title = "Ceia".into();
        update_hymn(&conn, &hymn).unwrap();
        assert_eq!(fetch_hymn(&conn, hymn.id).unwrap().unwrap().title, "Ceia");
        assert_eq!(
            find_hymn_by_number(&conn, " 005 ").unwrap().map(|h| h.id),
            Some(hymn.id)
        );

        delete_hymn(&conn, hymn.id).unwrap();
        assert!(fetch_hymn(&conn, hymn.id).unwrap().is_none());
        assert!(delete_hymn(&conn, hymn.id).is_err());
        assert!(update_hymn(&conn, &hymn).is_err());
    }

    #[test]
    fn null_columns_fall_back_to_defaults() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO hinos (numero, titulo, letra, tipo) VALUES ('7', 'Sem letra', NULL, NULL)",
            [],
        )
        .unwrap();
        let hymn = &fetch_hymns(&conn).unwrap()[0];
        assert_eq!(hymn.lyrics, "");
        assert_eq!(hymn.kind, DEFAULT_HYMN_KIND);
    }
}

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::like_pattern;
use crate::models::Praise;

const PRAISE_COLUMNS: &str = "id, titulo, autor, letra";

fn praise_from_row(row: &Row<'_>) -> rusqlite::Result<Praise> {
    Ok(Praise {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        lyrics: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
    })
}

/// Fetch all praises ordered case-insensitively by title.
pub fn fetch_praises(conn: &Connection) -> Result<Vec<Praise>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PRAISE_COLUMNS} FROM louvores ORDER BY titulo COLLATE NOCASE"
        ))
        .context("failed to prepare praise query")?;

    let praises = stmt
        .query_map([], praise_from_row)
        .context("failed to iterate praises")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect praises")?;

    Ok(praises)
}

pub fn fetch_praise(conn: &Connection, id: i64) -> Result<Option<Praise>> {
    conn.query_row(
        &format!("SELECT {PRAISE_COLUMNS} FROM louvores WHERE id = ?1"),
        params![id],
        praise_from_row,
    )
    .optional()
    .context("failed to load praise")
}

/// Case-insensitive substring match on title or author.
pub fn search_praises(conn: &Connection, query: &str) -> Result<Vec<Praise>> {
    let pattern = like_pattern(query);
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PRAISE_COLUMNS} FROM louvores
             WHERE LOWER(titulo) LIKE ?1 ESCAPE '\\' OR LOWER(autor) LIKE ?1 ESCAPE '\\'
             ORDER BY titulo COLLATE NOCASE"
        ))
        .context("failed to prepare praise search")?;

    let praises = stmt
        .query_map(params![pattern], praise_from_row)
        .context("failed to search praises")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect praise search results")?;

    Ok(praises)
}

pub fn create_praise(conn: &Connection, title: &str, author: &str, lyrics: &str) -> Result<Praise> {
    conn.execute(
        "INSERT INTO louvores (titulo, autor, letra) VALUES (?1, ?2, ?3)",
        params![title, author, lyrics],
    )
    .context("failed to insert praise")?;

    Ok(Praise {
        id: conn.last_insert_rowid(),
        title: title.to_string(),
        author: author.to_string(),
        lyrics: lyrics.to_string(),
    })
}

pub fn update_praise(conn: &Connection, praise: &Praise) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE louvores SET titulo = ?1, autor = ?2, letra = ?3 WHERE id = ?4",
            params![praise.title, praise.author, praise.lyrics, praise.id],
        )
        .context("failed to update praise")?;

    if updated == 0 {
        Err(anyhow!("Praise not found"))
    } else {
        Ok(())
    }
}

pub fn delete_praise(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM louvores WHERE id = ?1", params![id])
        .context("failed to delete praise")?;

    if deleted == 0 {
        Err(anyhow!("Praise not found"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn search_matches_title_or_author() {
        let conn = open_in_memory().unwrap();
        create_praise(&conn, "Oceanos", "Hillsong United", "").unwrap();
        create_praise(&conn, "Bondade de Deus", "Jenn Johnson", "").unwrap();

        assert_eq!(search_praises(&conn, "hillsong").unwrap()[0].title, "Oceanos");
        assert_eq!(search_praises(&conn, "deus").unwrap().len(), 1);
    }

    #[test]
    fn praises_sort_by_title_ignoring_case() {
        let conn = open_in_memory().unwrap();
        create_praise(&conn, "ruja o Leão", "", "").unwrap();
        create_praise(&conn, "Porque Ele Vive", "", "").unwrap();
        create_praise(&conn, "Quão Grande és Tu", "", "").unwrap();

        let titles: Vec<String> = fetch_praises(&conn)
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Porque Ele Vive", "Quão Grande és Tu", "ruja o Leão"]);
    }

    #[test]
    fn update_then_delete() {
        let conn = open_in_memory().unwrap();
        let mut praise = create_praise(&conn, "Oceanos", "", "verso").unwrap();
        praise.author = "Hillsong United".into();
        update_praise(&conn, &praise).unwrap();
        assert_eq!(
            fetch_praise(&conn, praise.id).unwrap().unwrap().author,
            "Hillsong United"
        );

        delete_praise(&conn, praise.id).unwrap();
        assert!(delete_praise(&conn, praise.id).is_err());
    }
}

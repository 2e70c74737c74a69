use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::like_pattern;
use crate::models::Verse;
use crate::reference::parse_reference;

const VERSE_COLUMNS: &str = "id, livro, capitulo, versiculo, texto, versao";
/// Upper bound on free-text verse search results.
const VERSE_SEARCH_LIMIT: i64 = 20;

fn verse_from_row(row: &Row<'_>) -> rusqlite::Result<Verse> {
    Ok(Verse {
        id: row.get(0)?,
        book: row.get(1)?,
        chapter: row.get(2)?,
        verse: row.get(3)?,
        text: row.get(4)?,
        version: row
            .get::<_, Option<String>>(5)?
            .unwrap_or_else(|| crate::models::DEFAULT_BIBLE_VERSION.to_string()),
    })
}

pub fn fetch_verses(conn: &Connection) -> Result<Vec<Verse>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {VERSE_COLUMNS} FROM versiculos ORDER BY livro, capitulo, versiculo"
        ))
        .context("failed to prepare verse query")?;

    let verses = stmt
        .query_map([], verse_from_row)
        .context("failed to iterate verses")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect verses")?;

    Ok(verses)
}

pub fn fetch_verse(conn: &Connection, id: i64) -> Result<Option<Verse>> {
    conn.query_row(
        &format!("SELECT {VERSE_COLUMNS} FROM versiculos WHERE id = ?1"),
        params![id],
        verse_from_row,
    )
    .optional()
    .context("failed to load verse")
}

/// Exact lookup. SQLite's `LOWER` only folds ASCII, so the book comparison
/// happens here to keep accented names ("Êxodo") case-insensitive.
pub fn find_verse(
    conn: &Connection,
    book: &str,
    chapter: i64,
    verse: i64,
    version: &str,
) -> Result<Option<Verse>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {VERSE_COLUMNS} FROM versiculos
             WHERE capitulo = ?1 AND versiculo = ?2 AND versao = ?3
             ORDER BY id"
        ))
        .context("failed to prepare verse lookup")?;

    let wanted = book.trim().to_lowercase();
    let candidates = stmt
        .query_map(params![chapter, verse, version], verse_from_row)
        .context("failed to look up verse")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect verse candidates")?;

    Ok(candidates
        .into_iter()
        .find(|candidate| candidate.book.to_lowercase() == wanted))
}

/// Look up a canonical `Book chapter:verse` reference. Malformed references
/// yield `Ok(None)` after logging, the same as a reference that is not stored.
pub fn find_verse_by_reference(
    conn: &Connection,
    reference: &str,
    version: &str,
) -> Result<Option<Verse>> {
    match parse_reference(reference) {
        Ok(parsed) => find_verse(conn, &parsed.book, parsed.chapter, parsed.verse, version),
        Err(err) => {
            log::warn!("could not parse reference: {err}");
            Ok(None)
        }
    }
}

/// Case-insensitive substring match on book or text, capped at
/// [`VERSE_SEARCH_LIMIT`] rows.
pub fn search_verses(conn: &Connection, query: &str) -> Result<Vec<Verse>> {
    let pattern = like_pattern(query);
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {VERSE_COLUMNS} FROM versiculos
             WHERE LOWER(livro) LIKE ?1 ESCAPE '\\' OR LOWER(texto) LIKE ?1 ESCAPE '\\'
             ORDER BY livro, capitulo, versiculo
             LIMIT ?2"
        ))
        .context("failed to prepare verse search")?;

    let verses = stmt
        .query_map(params![pattern, VERSE_SEARCH_LIMIT], verse_from_row)
        .context("failed to search verses")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect verse search results")?;

    Ok(verses)
}

pub fn create_verse(
    conn: &Connection,
    book: &str,
    chapter: i64,
    verse: i64,
    text: &str,
    version: &str,
) -> Result<Verse> {
    conn.execute(
        "INSERT INTO versiculos (livro, capitulo, versiculo, texto, versao)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![book, chapter, verse, text, version],
    )
    .context("failed to insert verse")?;

    Ok(Verse {
        id: conn.last_insert_rowid(),
        book: book.to_string(),
        chapter,
        verse,
        text: text.to_string(),
        version: version.to_string(),
    })
}

pub fn update_verse(conn: &Connection, verse: &Verse) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE versiculos
             SET livro = ?1, capitulo = ?2, versiculo = ?3, texto = ?4, versao = ?5
             WHERE id = ?6",
            params![
                verse.book,
                verse.chapter,
                verse.verse,
                verse.text,
                verse.version,
                verse.id
            ],
        )
        .context("failed to update verse")?;

    if updated == 0 {
        Err(anyhow!("Verse not found"))
    } else {
        Ok(())
    }
}

pub fn delete_verse(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM versiculos WHERE id = ?1", params![id])
        .context("failed to delete verse")?;

    if deleted == 0 {
        Err(anyhow!("Verse not found"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn seeded() -> Connection {
        let conn = open_in_memory().unwrap();
        create_verse(&conn, "João", 3, 16, "Porque Deus amou o mundo", "ARC").unwrap();
        create_verse(&conn, "João", 3, 16, "Porque Deus tanto amou o mundo", "NVI").unwrap();
        create_verse(&conn, "1 Coríntios", 13, 4, "O amor é paciente", "ARC").unwrap();
        conn
    }

    #[test]
    fn finds_by_reference_and_version() {
        let conn = seeded();
        let arc = find_verse_by_reference(&conn, "joão 3:16", "ARC")
            .unwrap()
            .unwrap();
        assert_eq!(arc.text, "Porque Deus amou o mundo");

        let nvi = find_verse_by_reference(&conn, "JOÃO 3:16", "NVI")
            .unwrap()
            .unwrap();
        assert_eq!(nvi.version, "NVI");

        assert!(find_verse_by_reference(&conn, "João 3:16", "NTLH")
            .unwrap()
            .is_none());
    }

    #[test]
    fn multi_word_books_resolve() {
        let conn = seeded();
        let verse = find_verse_by_reference(&conn, "1 Coríntios 13:4", "ARC")
            .unwrap()
            .unwrap();
        assert_eq!(verse.reference(), "1 Coríntios 13:4");
    }

    #[test]
    fn malformed_reference_is_not_found() {
        let conn = seeded();
        assert!(find_verse_by_reference(&conn, "João", "ARC").unwrap().is_none());
    }

    #[test]
    fn search_matches_book_or_text_with_limit() {
        let conn = seeded();
        assert_eq!(search_verses(&conn, "amor").unwrap().len(), 1);
        assert_eq!(search_verses(&conn, "MUNDO").unwrap().len(), 2);

        for verse in 1..=30 {
            create_verse(&conn, "Salmos", 119, verse, "lâmpada", "ARC").unwrap();
        }
        assert_eq!(search_verses(&conn, "lâmpada").unwrap().len(), 20);
    }

    #[test]
    fn update_and_delete() {
        let conn = seeded();
        let mut verse = fetch_verses(&conn).unwrap().remove(0);
        verse.text = "Texto revisado".into();
        update_verse(&conn, &verse).unwrap();
        assert_eq!(
            fetch_verse(&conn, verse.id).unwrap().unwrap().text,
            "Texto revisado"
        );
        delete_verse(&conn, verse.id).unwrap();
        assert!(update_verse(&conn, &verse).is_err());
    }
}

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use rusqlite::{params, Connection};

use crate::models::ServiceRecord;

/// Separator used to flatten history items into the `itens` column.
const ITEM_SEPARATOR: &str = "|||";

/// Persist a service history stamped with the current local time and return
/// the new row id.
pub fn save_service(conn: &Connection, service_type: &str, items: &[String]) -> Result<i64> {
    let date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    save_service_at(conn, &date, service_type, items)
}

pub(crate) fn save_service_at(
    conn: &Connection,
    date: &str,
    service_type: &str,
    items: &[String],
) -> Result<i64> {
    conn.execute(
        "INSERT INTO historico_culto (data, tipo_culto, itens) VALUES (?1, ?2, ?3)",
        params![date, service_type, items.join(ITEM_SEPARATOR)],
    )
    .context("failed to save service history")?;

    Ok(conn.last_insert_rowid())
}

/// Every saved service, newest first.
pub fn fetch_services(conn: &Connection) -> Result<Vec<ServiceRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, data, tipo_culto, itens FROM historico_culto
             ORDER BY data DESC, id DESC",
        )
        .context("failed to prepare service history query")?;

    let records = stmt
        .query_map([], |row| {
            let items: Option<String> = row.get(3)?;
            Ok(ServiceRecord {
                id: row.get(0)?,
                date: row.get(1)?,
                service_type: row.get(2)?,
                items: split_items(items.as_deref().unwrap_or_default()),
            })
        })
        .context("failed to iterate service history")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect service history")?;

    Ok(records)
}

pub fn delete_service(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM historico_culto WHERE id = ?1", params![id])
        .context("failed to delete service history")?;

    if deleted == 0 {
        Err(anyhow!("Saved service not found"))
    } else {
        Ok(())
    }
}

fn split_items(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        Vec::new()
    } else {
        raw.split(ITEM_SEPARATOR).map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn services_round_trip_newest_first() {
        let conn = open_in_memory().unwrap();
        let items = vec!["🎵 001 - Chuvas de Graça".to_string(), "📖 João 3:16 (ARC)".to_string()];
        save_service_at(&conn, "2024-03-03 19:00:00", "Sunday", &items).unwrap();
        let newest = save_service_at(&conn, "2024-03-10 19:00:00", "Communion", &[]).unwrap();

        let records = fetch_services(&conn).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, newest);
        assert!(records[0].items.is_empty());
        assert_eq!(records[1].items, items);
        assert_eq!(records[1].service_type, "Sunday");
    }

    #[test]
    fn save_service_stamps_current_time() {
        let conn = open_in_memory().unwrap();
        let id = save_service(&conn, "Regular", &["🎤 Oceanos".to_string()]).unwrap();
        let record = fetch_services(&conn).unwrap().remove(0);
        assert_eq!(record.id, id);
        assert_eq!(record.date.len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[test]
    fn delete_missing_service_fails() {
        let conn = open_in_memory().unwrap();
        let id = save_service(&conn, "Regular", &[]).unwrap();
        delete_service(&conn, id).unwrap();
        assert!(delete_service(&conn, id).is_err());
    }
}

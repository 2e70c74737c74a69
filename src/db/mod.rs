//! Persistence module split across logical submodules. Every function wraps
//! one query so the rest of the codebase stays focused on UI and projection
//! state.

mod connection;
mod hymns;
mod praises;
mod seed;
mod services;
mod verses;

pub use connection::{ensure_schema, open_in_memory};
pub use hymns::{
    create_hymn, delete_hymn, fetch_hymn, fetch_hymns, find_hymn_by_number, search_hymns,
    update_hymn,
};
pub use praises::{
    create_praise, delete_praise, fetch_praise, fetch_praises, search_praises, update_praise,
};
pub use seed::{seed_if_empty, SeedReport};
pub use services::{delete_service, fetch_services, save_service};
pub use verses::{
    create_verse, delete_verse, fetch_verse, fetch_verses, find_verse, find_verse_by_reference,
    search_verses, update_verse,
};

/// `%query%` for a `LIKE ... ESCAPE '\'` clause. The query is lowercased and
/// its wildcards are matched literally.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::from("%");
    for ch in query.trim().to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("  Chuvas "), "%chuvas%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn wildcard_queries_match_literally() {
        let mut conn = open_in_memory().unwrap();
        seed_if_empty(&mut conn).unwrap();
        assert!(search_hymns(&conn, "_").unwrap().is_empty());
        assert!(search_praises(&conn, "%").unwrap().is_empty());
        assert!(search_verses(&conn, "_").unwrap().is_empty());
        assert_eq!(search_hymns(&conn, "chuvas").unwrap().len(), 1);
    }
}

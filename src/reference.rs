//! Parsing and normalizing of Bible references typed by the operator.
//!
//! Operators type references quickly and loosely ("joao 3 16", "1corintios
//! 13.4"), so lookups first normalize the input into the canonical
//! `Book chapter:verse` shape and then parse that back into typed parts.

use thiserror::Error;

/// Errors raised while parsing a canonical reference.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("reference '{0}' must look like 'Book chapter:verse'")]
    MissingSeparator(String),
    #[error("reference '{0}' is missing a book or chapter")]
    MissingChapter(String),
    #[error("'{0}' is not a valid chapter or verse number")]
    InvalidNumber(String),
}

/// Typed parts of a canonical reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseRef {
    pub book: String,
    pub chapter: i64,
    pub verse: i64,
}

/// Normalize free-form input into `Book chapter:verse`.
///
/// Dots, commas and colons act as separators. When fewer than three parts are
/// present the normalized input is returned as-is so the lookup can report it
/// back to the operator.
pub fn format_reference(input: &str) -> String {
    let normalized = input
        .trim()
        .replace(['.', ',', ':'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let parts: Vec<&str> = normalized.split(' ').filter(|p| !p.is_empty()).collect();
    if parts.len() < 3 {
        return normalized;
    }

    let (book_parts, numbers) = parts.split_at(parts.len() - 2);
    let book = capitalize_book(&book_parts.join(" "));
    format!("{book} {}:{}", numbers[0], numbers[1])
}

/// Split a canonical reference into book, chapter and verse.
pub fn parse_reference(reference: &str) -> Result<VerseRef, ReferenceError> {
    let halves: Vec<&str> = reference.split(':').collect();
    if halves.len() != 2 {
        return Err(ReferenceError::MissingSeparator(reference.to_string()));
    }

    let tokens: Vec<&str> = halves[0].split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(ReferenceError::MissingChapter(reference.to_string()));
    }

    let (book_tokens, chapter_token) = tokens.split_at(tokens.len() - 1);
    let chapter = parse_number(chapter_token[0])?;
    let verse = parse_number(halves[1].trim())?;

    Ok(VerseRef {
        book: book_tokens.join(" "),
        chapter,
        verse,
    })
}

fn parse_number(raw: &str) -> Result<i64, ReferenceError> {
    raw.parse::<i64>()
        .map_err(|_| ReferenceError::InvalidNumber(raw.to_string()))
}

/// Lowercase the book and uppercase its first letter. Numbered books
/// ("1corintios", "2 reis") get a single space after the number.
fn capitalize_book(book: &str) -> String {
    let lower = book.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(digit @ ('1' | '2' | '3')) => {
            let rest = chars.as_str().trim_start();
            if rest.is_empty() {
                digit.to_string()
            } else {
                format!("{digit} {}", capitalize(rest))
            }
        }
        _ => capitalize(&lower),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_loose_input() {
        assert_eq!(format_reference("joão 3 16"), "João 3:16");
        assert_eq!(format_reference("  SALMOS 23.1 "), "Salmos 23:1");
        assert_eq!(format_reference("filipenses,4:13"), "Filipenses 4:13");
    }

    #[test]
    fn formats_numbered_books() {
        assert_eq!(format_reference("1corintios 13 4"), "1 Corintios 13:4");
        assert_eq!(format_reference("2 reis 2 11"), "2 Reis 2:11");
    }

    #[test]
    fn keeps_every_word_of_the_book() {
        assert_eq!(
            format_reference("CANTARES DE SALOMÃO 2 1"),
            "Cantares de salomão 2:1"
        );
        let parsed = parse_reference("Cantares de salomão 2:1").unwrap();
        assert_eq!(parsed.book, "Cantares de salomão");
        assert_eq!((parsed.chapter, parsed.verse), (2, 1));
    }

    #[test]
    fn short_input_is_only_normalized() {
        assert_eq!(format_reference("joao  3"), "joao 3");
        assert_eq!(format_reference("   "), "");
    }

    #[test]
    fn parses_multi_word_books() {
        let parsed = parse_reference("1 Corintios 13:4").unwrap();
        assert_eq!(
            parsed,
            VerseRef {
                book: "1 Corintios".into(),
                chapter: 13,
                verse: 4,
            }
        );
    }

    #[test]
    fn rejects_malformed_references() {
        assert!(matches!(
            parse_reference("Joao 3 16"),
            Err(ReferenceError::MissingSeparator(_))
        ));
        assert!(matches!(
            parse_reference("Joao:16"),
            Err(ReferenceError::MissingChapter(_))
        ));
        assert_eq!(
            parse_reference("Joao tres:16"),
            Err(ReferenceError::InvalidNumber("tres".into()))
        );
    }
}

//! Reading-position resolution for owned books.
//!
//! Requested pages come straight from the URL, so every input resolves to a
//! renderable in-range position instead of an error.

use serde::Serialize;

use crate::models::book::BookFormat;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingPosition<T> {
    pub page: i64,
    pub total_pages: i64,
    /// Selected page image (e-books)
    pub current: Option<T>,
    /// First audio track (audiobooks)
    pub audio_track: Option<T>,
}

/// Page number from a path segment. Missing or non-numeric input yields 1;
/// digit strings too large for i64 saturate.
pub fn parse_page(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 1;
    };
    let s = raw.trim();
    match s.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                if s.starts_with('-') { i64::MIN } else { i64::MAX }
            } else {
                1
            }
        }
    }
}

/// Resolve the position to show.
///
/// `rows` must already be in reading order: image rows for e-books, audio
/// rows for audiobooks.
pub fn resolve<T>(format: BookFormat, rows: Vec<T>, requested: i64) -> ReadingPosition<T> {
    match format {
        BookFormat::Ebook => {
            let total = rows.len() as i64;
            let page = if total == 0 {
                1
            } else {
                requested.clamp(1, total)
            };
            let current = if total == 0 {
                None
            } else {
                rows.into_iter().nth((page - 1) as usize)
            };
            ReadingPosition {
                page,
                total_pages: total,
                current,
                audio_track: None,
            }
        }
        BookFormat::Audiobook => ReadingPosition {
            page: 1,
            total_pages: 0,
            current: None,
            audio_track: rows.into_iter().next(),
        },
    }
}

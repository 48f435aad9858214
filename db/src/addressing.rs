//! Verse addressing.
//!
//! Every verse of a translation has an ordinal: its 1-based position when the
//! translation is read by book, then chapter, then verse. Ordinals are handed
//! out once, when a translation is loaded, and stored with the verse. So
//! looking one up is a key lookup rather than a count from Genesis 1:1.
use std::collections::HashSet;

use log::warn;

use crate::canon;
use crate::models::{NewVerse, Verse, VerseKey};
use crate::sword_drill::SwordDrillable;
use crate::{DbConnection, DbError};

/// Ordinal of the verse with the given key in the translation.
pub fn ordinal_of<D: SwordDrillable>(
    translation: &str,
    key: VerseKey,
    conn: &mut DbConnection,
) -> Result<i32, DbError> {
    D::ordinal_of(translation, key, conn)
}

/// Verse at the given ordinal of the translation.
pub fn verse_at<D: SwordDrillable>(
    translation: &str,
    ordinal: i32,
    conn: &mut DbConnection,
) -> Result<Verse, DbError> {
    if ordinal < 1 {
        return Err(DbError::not_found(format!("Verse {} of the {}", ordinal, translation)));
    }
    D::verse(translation, ordinal, conn)
}

/// Checks a translation's verses and numbers them from 1 in traversal order.
pub fn assign_ordinals(mut verses: Vec<NewVerse>) -> Result<Vec<(i32, NewVerse)>, DbError> {
    let mut seen = HashSet::with_capacity(verses.len());
    for verse in &verses {
        validate(verse)?;
        if !seen.insert(verse.key()) {
            return Err(DbError::InvalidVerse {
                reason: format!("{} appears more than once", verse.key()),
            });
        }
    }

    verses.sort_by_key(NewVerse::key);
    Ok((1..).zip(verses).collect())
}

fn validate(verse: &NewVerse) -> Result<(), DbError> {
    let reason = if canon::book_by_id(verse.book).is_err() {
        format!("book {} is not in the canon", verse.book)
    } else if verse.chapter < 1 || verse.verse < 1 {
        format!(
            "{} {}:{} is not a valid verse",
            verse.book, verse.chapter, verse.verse
        )
    } else if verse.words.trim().is_empty() {
        format!("{} has no text", verse.key())
    } else {
        return Ok(());
    };

    Err(DbError::InvalidVerse { reason })
}

/// Checks that the stored ordinals of a translation run from 1 to the number
/// of verses, following traversal order without gaps. Returns the number of
/// verses.
pub fn verify_ordinals<D: SwordDrillable>(
    translation: &str,
    conn: &mut DbConnection,
) -> Result<i64, DbError> {
    let keys = D::keys(translation, conn)?;
    if keys.is_empty() {
        return Err(DbError::TranslationNotFound {
            translation: translation.to_string(),
        });
    }

    let mut prev: Option<VerseKey> = None;
    for (expected, (key, ordinal)) in (1..).zip(keys.iter()) {
        let reason = if *ordinal != expected {
            Some(format!(
                "{} has ordinal {}, expected {}",
                key, ordinal, expected
            ))
        } else if prev.map_or(false, |p| p >= *key) {
            Some(format!("{} is out of order", key))
        } else {
            None
        };

        if let Some(reason) = reason {
            warn!("Ordinal check of the {} failed: {}", translation, reason);
            return Err(DbError::InconsistentOrdinals {
                translation: translation.to_string(),
                reason,
            });
        }
        prev = Some(*key);
    }

    Ok(keys.len() as i64)
}

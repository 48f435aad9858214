use diesel::prelude::*;
use diesel::result::Error;
use log::info;

use crate::addressing;
use crate::models::*;
use crate::schema::verses;
use crate::{DbConnection, DbError};

/// Max number of verses inserted per statement when loading a translation.
const INSERT_BATCH_SIZE: usize = 500;

/// Trait implemented by types that can store and return the verses of
/// translations.
///
/// Every verse is addressed by its translation code and its ordinal, the
/// 1-based position of the verse in the translation when read from Genesis
/// to Revelation.
pub trait SwordDrillable {
    /// Looks up the verse at `ordinal` in the translation.
    fn verse(translation: &str, ordinal: i32, conn: &mut DbConnection) -> Result<Verse, DbError>;

    /// Looks up a verse by its book, chapter and verse numbers.
    fn verse_by_key(
        translation: &str,
        key: VerseKey,
        conn: &mut DbConnection,
    ) -> Result<Verse, DbError>;

    /// Looks up only the ordinal of a verse.
    fn ordinal_of(
        translation: &str,
        key: VerseKey,
        conn: &mut DbConnection,
    ) -> Result<i32, DbError>;

    /// Gets the verses from `start` to `end` (inclusive), ordered by ordinal.
    ///
    /// Fails with `NotFound` rather than returning a shorter list when any
    /// part of the range is not stored.
    fn range(
        translation: &str,
        start: i32,
        end: i32,
        conn: &mut DbConnection,
    ) -> Result<Vec<Verse>, DbError>;

    /// Number of verses stored for the translation.
    fn count(translation: &str, conn: &mut DbConnection) -> Result<i64, DbError>;

    /// Every verse key of the translation with its ordinal, in ordinal order.
    fn keys(translation: &str, conn: &mut DbConnection) -> Result<Vec<(VerseKey, i32)>, DbError>;

    /// Gets all stored translations.
    fn translations(conn: &mut DbConnection) -> Result<Vec<Translation>, DbError>;

    /// Stores a translation and all of its verses. Returns the number of
    /// verses stored.
    fn load(
        translation: &Translation,
        verses: Vec<NewVerse>,
        conn: &mut DbConnection,
    ) -> Result<usize, DbError>;
}

/// Row of the `verses` table.
#[derive(Insertable)]
#[diesel(table_name = verses)]
struct VerseRow<'a> {
    translation: &'a str,
    ordinal: i32,
    book: i32,
    chapter: i32,
    verse: i32,
    words: &'a str,
}

/// Main implementation for the [SwordDrillable](crate::sword_drill::SwordDrillable) trait.
pub struct SwordDrill;

impl SwordDrillable for SwordDrill {
    fn verse(translation: &str, ordinal: i32, conn: &mut DbConnection) -> Result<Verse, DbError> {
        use crate::schema::verses as v;

        v::table
            .filter(v::translation.eq(translation))
            .filter(v::ordinal.eq(ordinal))
            .first::<Verse>(conn)
            .map_err(|e| match e {
                Error::NotFound => {
                    DbError::not_found(format!("Verse {} of the {}", ordinal, translation))
                }
                e => DbError::Other {
                    cause: e.to_string(),
                },
            })
    }

    fn verse_by_key(
        translation: &str,
        key: VerseKey,
        conn: &mut DbConnection,
    ) -> Result<Verse, DbError> {
        use crate::schema::verses as v;

        v::table
            .filter(v::translation.eq(translation))
            .filter(v::book.eq(key.book))
            .filter(v::chapter.eq(key.chapter))
            .filter(v::verse.eq(key.verse))
            .first::<Verse>(conn)
            .map_err(|e| key_error(e, translation, key))
    }

    fn ordinal_of(
        translation: &str,
        key: VerseKey,
        conn: &mut DbConnection,
    ) -> Result<i32, DbError> {
        use crate::schema::verses as v;

        v::table
            .select(v::ordinal)
            .filter(v::translation.eq(translation))
            .filter(v::book.eq(key.book))
            .filter(v::chapter.eq(key.chapter))
            .filter(v::verse.eq(key.verse))
            .first::<i32>(conn)
            .map_err(|e| key_error(e, translation, key))
    }

    fn range(
        translation: &str,
        start: i32,
        end: i32,
        conn: &mut DbConnection,
    ) -> Result<Vec<Verse>, DbError> {
        use crate::schema::verses as v;

        let out_of_range =
            || DbError::not_found(format!("Verses {} to {} of the {}", start, end, translation));

        if start < 1 || end < start || i64::from(end) > Self::count(translation, conn)? {
            return Err(out_of_range());
        }

        let verses = v::table
            .filter(v::translation.eq(translation))
            .filter(v::ordinal.between(start, end))
            .order_by(v::ordinal.asc())
            .load::<Verse>(conn)?;

        // A short read means the stored ordinals have a gap.
        if verses.len() != (end - start + 1) as usize {
            return Err(out_of_range());
        }
        Ok(verses)
    }

    fn count(translation: &str, conn: &mut DbConnection) -> Result<i64, DbError> {
        use crate::schema::verses as v;

        v::table
            .filter(v::translation.eq(translation))
            .count()
            .get_result(conn)
            .map_err(DbError::from)
    }

    fn keys(translation: &str, conn: &mut DbConnection) -> Result<Vec<(VerseKey, i32)>, DbError> {
        use crate::schema::verses as v;

        v::table
            .select((v::book, v::chapter, v::verse, v::ordinal))
            .filter(v::translation.eq(translation))
            .order_by(v::ordinal.asc())
            .load::<(i32, i32, i32, i32)>(conn)
            .map(|rows| {
                rows.into_iter()
                    .map(|(book, chapter, verse, ordinal)| {
                        (VerseKey::new(book, chapter, verse), ordinal)
                    })
                    .collect()
            })
            .map_err(DbError::from)
    }

    fn translations(conn: &mut DbConnection) -> Result<Vec<Translation>, DbError> {
        use crate::schema::translations::dsl::*;

        translations
            .order_by(code)
            .load(conn)
            .map_err(DbError::from)
    }

    fn load(
        translation: &Translation,
        verses: Vec<NewVerse>,
        conn: &mut DbConnection,
    ) -> Result<usize, DbError> {
        use crate::schema::translations as t;
        use crate::schema::verses as v;

        let numbered = addressing::assign_ordinals(verses)?;

        let loaded = conn.transaction::<_, DbError, _>(|conn| {
            if Self::count(&translation.code, conn)? > 0 {
                return Err(DbError::TranslationLoaded {
                    translation: translation.code.clone(),
                });
            }

            diesel::replace_into(t::table)
                .values(translation)
                .execute(conn)?;

            let rows: Vec<VerseRow> = numbered
                .iter()
                .map(|(ordinal, verse)| VerseRow {
                    translation: &translation.code,
                    ordinal: *ordinal,
                    book: verse.book,
                    chapter: verse.chapter,
                    verse: verse.verse,
                    words: &verse.words,
                })
                .collect();
            for batch in rows.chunks(INSERT_BATCH_SIZE) {
                diesel::insert_into(v::table).values(batch).execute(conn)?;
            }

            Ok(rows.len())
        })?;

        info!("Loaded {} verses into the {}", loaded, translation.code);
        Ok(loaded)
    }
}

/// Maps a failed lookup by verse key to a database error.
fn key_error(e: Error, translation: &str, key: VerseKey) -> DbError {
    match e {
        Error::NotFound => DbError::not_found(format!("{} ({})", key, translation)),
        e => DbError::Other {
            cause: e.to_string(),
        },
    }
}

//! Versification: which verses each chapter of a translation has.
//!
//! Translations don't all split the text the same way, so every translation
//! carries its own table. Counting verses between two references with this
//! table gives the same numbers as the translation's stored ordinals.
use crate::models::VerseKey;
use crate::sword_drill::SwordDrillable;
use crate::{DbConnection, DbError};

#[derive(Clone, Debug, PartialEq)]
struct Chapter {
    book: i32,
    chapter: i32,
    /// Verse numbers, ascending.
    verses: Vec<i32>,
    /// Number of verses in all chapters before this one.
    offset: i64,
}

/// The verse numbers of every chapter of one translation, in traversal order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Versification {
    chapters: Vec<Chapter>,
}

impl Versification {
    /// Builds the table from verse keys in any order. Duplicates are ignored.
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = VerseKey>,
    {
        let mut keys: Vec<VerseKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let mut chapters: Vec<Chapter> = Vec::new();
        let mut offset = 0;
        for key in keys {
            let same_chapter = chapters
                .last()
                .map_or(false, |c| c.book == key.book && c.chapter == key.chapter);
            if same_chapter {
                if let Some(c) = chapters.last_mut() {
                    c.verses.push(key.verse);
                }
            } else {
                chapters.push(Chapter {
                    book: key.book,
                    chapter: key.chapter,
                    verses: vec![key.verse],
                    offset,
                });
            }
            offset += 1;
        }

        Self { chapters }
    }

    /// Builds the table from the verses stored for a translation.
    pub fn from_store<D: SwordDrillable>(
        translation: &str,
        conn: &mut DbConnection,
    ) -> Result<Self, DbError> {
        let keys = D::keys(translation, conn)?;
        Ok(Self::from_keys(keys.into_iter().map(|(key, _)| key)))
    }

    /// Total number of verses.
    pub fn len(&self) -> i64 {
        self.chapters
            .last()
            .map_or(0, |c| c.offset + c.verses.len() as i64)
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    fn chapter(&self, book: i32, chapter: i32) -> Result<&Chapter, DbError> {
        self.chapters
            .binary_search_by(|c| (c.book, c.chapter).cmp(&(book, chapter)))
            .map(|i| &self.chapters[i])
            .map_err(|_| DbError::not_found(format!("Chapter {} of book {}", chapter, book)))
    }

    /// 1-based position of a verse, counting from the first verse of the
    /// translation.
    pub fn position(&self, key: VerseKey) -> Result<i64, DbError> {
        let chapter = self.chapter(key.book, key.chapter)?;
        chapter
            .verses
            .binary_search(&key.verse)
            .map(|i| chapter.offset + i as i64 + 1)
            .map_err(|_| DbError::not_found(key.to_string()))
    }

    /// Number of verses from `start` to `end`, both included. Negative or zero
    /// when `end` comes before `start`.
    pub fn span(&self, start: VerseKey, end: VerseKey) -> Result<i64, DbError> {
        Ok(self.position(end)? - self.position(start)? + 1)
    }

    /// First verse of a chapter.
    pub fn first_verse(&self, book: i32, chapter: i32) -> Result<VerseKey, DbError> {
        self.chapter(book, chapter)
            .map(|c| VerseKey::new(book, chapter, c.verses[0]))
    }

    /// Last verse of a chapter.
    pub fn last_verse(&self, book: i32, chapter: i32) -> Result<VerseKey, DbError> {
        self.chapter(book, chapter)
            .map(|c| VerseKey::new(book, chapter, c.verses[c.verses.len() - 1]))
    }
}

use std::cell::OnceCell;
use std::fmt;

use diesel::deserialize;
use diesel::prelude::{Insertable, Queryable};
use diesel::sql_types::{Integer, Text};
use diesel::sqlite::Sqlite;
use log::warn;
use serde_derive::{Deserialize, Serialize};

use crate::canon::{self, Book};
use crate::link::{ChapterAddress, VerseAddress};
use crate::schema::translations;
use crate::sword_drill::SwordDrillable;
use crate::{DbConnection, DbError};

/// Book, chapter and verse of a verse, ordered the way verses are traversed:
/// by book, then chapter, then verse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VerseKey {
    pub book: i32,
    pub chapter: i32,
    pub verse: i32,
}

impl VerseKey {
    /// Genesis 1:1, where counting starts.
    pub const ORIGIN: VerseKey = VerseKey {
        book: canon::FIRST_BOOK_ID,
        chapter: 1,
        verse: 1,
    };

    pub fn new(book: i32, chapter: i32, verse: i32) -> Self {
        Self {
            book,
            chapter,
            verse,
        }
    }
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match canon::book_by_id(self.book) {
            Ok(book) => write!(f, "{} {}:{}", book.name, self.chapter, self.verse),
            Err(_) => write!(f, "Book {} {}:{}", self.book, self.chapter, self.verse),
        }
    }
}

/// Model representing a translation (version) of the Bible.
#[derive(Clone, Debug, PartialEq, Queryable, Insertable, Serialize)]
#[diesel(table_name = translations)]
pub struct Translation {
    pub code: String,
    pub name: String,
}

/// A verse waiting to be loaded into a translation. Its ordinal is assigned
/// when the translation is loaded.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NewVerse {
    pub book: i32,
    pub chapter: i32,
    pub verse: i32,
    pub words: String,
}

impl NewVerse {
    pub fn key(&self) -> VerseKey {
        VerseKey::new(self.book, self.chapter, self.verse)
    }
}

/// Model representing a Bible verse of one translation.
///
/// Neighbouring verses are kept on the value once found, or once known to be
/// missing, so storage is asked at most once for each.
#[derive(Clone, Debug, Serialize)]
pub struct Verse {
    pub translation: String,
    pub ordinal: i32,
    pub book: i32,
    pub chapter: i32,
    pub verse: i32,
    pub words: String,
    #[serde(skip)]
    next: OnceCell<Option<Box<Verse>>>,
    #[serde(skip)]
    prev: OnceCell<Option<Box<Verse>>>,
}

impl Verse {
    pub fn new(
        translation: &str,
        ordinal: i32,
        key: VerseKey,
        words: impl Into<String>,
    ) -> Self {
        Self {
            translation: translation.to_string(),
            ordinal,
            book: key.book,
            chapter: key.chapter,
            verse: key.verse,
            words: words.into(),
            next: OnceCell::new(),
            prev: OnceCell::new(),
        }
    }

    pub fn key(&self) -> VerseKey {
        VerseKey::new(self.book, self.chapter, self.verse)
    }

    /// Whether this is Genesis 1:1, which has no previous verse.
    pub fn is_origin(&self) -> bool {
        self.key() == VerseKey::ORIGIN
    }

    /// The canon entry for this verse's book.
    pub fn canon_book(&self) -> Result<&'static Book, DbError> {
        canon::book_by_id(self.book)
    }

    /// The verse following this one in the translation, if any.
    pub fn next_verse<D: SwordDrillable>(
        &self,
        conn: &mut DbConnection,
    ) -> Result<Option<&Verse>, DbError> {
        if let Some(cached) = self.next.get() {
            return Ok(cached.as_deref());
        }

        let found = match self.ordinal.checked_add(1) {
            Some(ordinal) => optional(D::verse(&self.translation, ordinal, conn))?,
            None => None,
        };
        Ok(self.next.get_or_init(|| found.map(Box::new)).as_deref())
    }

    /// The verse preceding this one in the translation, if any. A failed
    /// lookup also counts as no preceding verse, but isn't kept, so the next
    /// call asks again.
    pub fn prev_verse<D: SwordDrillable>(&self, conn: &mut DbConnection) -> Option<&Verse> {
        if let Some(cached) = self.prev.get() {
            return cached.as_deref();
        }

        // Nothing comes before the first verse, so don't bother asking.
        let found = if self.is_origin() || self.ordinal <= 1 {
            None
        } else {
            match D::verse(&self.translation, self.ordinal - 1, conn) {
                Ok(verse) => Some(verse),
                Err(ref e) if e.is_not_found() => None,
                Err(e) => {
                    warn!("Could not look up the verse before {}: {}", self, e);
                    return None;
                }
            }
        };
        self.prev.get_or_init(|| found.map(Box::new)).as_deref()
    }

    pub fn next_book_id(&self) -> Option<i32> {
        canon::next_book_id(self.book)
    }

    pub fn prev_book_id(&self) -> Option<i32> {
        canon::prev_book_id(self.book)
    }

    /// The book after this verse's book, or `None` in Revelation.
    pub fn next_book(&self) -> Option<&'static Book> {
        self.next_book_id().and_then(|id| canon::book_by_id(id).ok())
    }

    /// The book before this verse's book, or `None` in Genesis.
    pub fn prev_book(&self) -> Option<&'static Book> {
        self.prev_book_id().and_then(|id| canon::book_by_id(id).ok())
    }

    /// The tuple identifying this verse to the outside world.
    pub fn address(&self) -> VerseAddress {
        VerseAddress {
            translation: self.translation.clone(),
            book: self.book,
            chapter: self.chapter,
            verse: self.verse,
        }
    }

    /// The tuple identifying this verse's chapter to the outside world.
    pub fn chapter_address(&self) -> ChapterAddress {
        ChapterAddress {
            translation: self.translation.clone(),
            book: self.book,
            chapter: self.chapter,
        }
    }
}

/// Turns "no such verse" into `None`, keeping any other failure.
fn optional(result: Result<Verse, DbError>) -> Result<Option<Verse>, DbError> {
    match result {
        Ok(verse) => Ok(Some(verse)),
        Err(ref e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

impl PartialEq for Verse {
    fn eq(&self, other: &Self) -> bool {
        self.translation == other.translation
            && self.ordinal == other.ordinal
            && self.key() == other.key()
            && self.words == other.words
    }
}

impl fmt::Display for Verse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.key(), f)
    }
}

impl Queryable<(Text, Integer, Integer, Integer, Integer, Text), Sqlite> for Verse {
    type Row = (String, i32, i32, i32, i32, String);

    fn build(row: Self::Row) -> deserialize::Result<Self> {
        let (translation, ordinal, book, chapter, verse, words) = row;
        Ok(Verse::new(
            &translation,
            ordinal,
            VerseKey::new(book, chapter, verse),
            words,
        ))
    }
}

mod reference;
pub use self::reference::Reference;

use std::collections::HashMap;

use log::debug;

use crate::canon::{self, Book};
use crate::models::{Reference, VerseKey};
use crate::sword_drill::SwordDrillable;
use crate::versification::Versification;
use crate::{DbConnection, DbError};

/// Trait implemented by types that can turn textual references into verse
/// keys and verse counts.
///
/// References may end in a translation code (eg: "John 3:16 KJV"), which
/// chooses whose verse divisions are used for counting.
pub trait ReferenceParsing {
    /// Book, chapter and verse of a reference naming exactly one verse.
    fn verse(&self, reference: &str) -> Result<VerseKey, DbError>;

    /// First verse named by a reference. A chapter reference starts at the
    /// chapter's first verse.
    fn passage_start(&self, reference: &str) -> Result<VerseKey, DbError>;

    /// Number of verses from the first verse of `start` to the last verse of
    /// `end`, both included. Zero or negative when `end` comes first.
    fn passage_len(&self, start: &str, end: &str) -> Result<i64, DbError>;
}

/// Main implementation for the [ReferenceParsing](crate::parser::ReferenceParsing) trait,
/// counting verses with one versification per translation.
#[derive(Clone, Debug, Default)]
pub struct ReferenceParser {
    versifications: HashMap<String, Versification>,
    /// Translation used for references without a translation code.
    default: Option<String>,
}

impl ReferenceParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the verse divisions of a translation. The first translation added
    /// becomes the default.
    pub fn add_versification(&mut self, translation: &str, versification: Versification) {
        if self.default.is_none() {
            self.default = Some(translation.to_string());
        }
        self.versifications
            .insert(translation.to_string(), versification);
    }

    pub fn with_versification(mut self, translation: &str, versification: Versification) -> Self {
        self.add_versification(translation, versification);
        self
    }

    /// Builds a parser knowing the verse divisions of every stored translation.
    pub fn from_store<D: SwordDrillable>(conn: &mut DbConnection) -> Result<Self, DbError> {
        let mut parser = Self::new();
        for translation in D::translations(conn)? {
            let versification = Versification::from_store::<D>(&translation.code, conn)?;
            debug!(
                "{} verses in the {} versification",
                versification.len(),
                translation.code
            );
            parser.add_versification(&translation.code, versification);
        }
        Ok(parser)
    }

    fn versification(&self, translation: Option<&str>) -> Result<&Versification, DbError> {
        let code = translation.or(self.default.as_deref()).unwrap_or_default();
        self.versifications
            .get(code)
            .ok_or_else(|| DbError::TranslationNotFound {
                translation: code.to_string(),
            })
    }

    /// First verse of a parsed reference.
    fn first_key(
        &self,
        reference: &Reference,
        book: &Book,
        versification: Option<&Versification>,
    ) -> Result<VerseKey, DbError> {
        match (reference.first_verse(), versification) {
            (Some(verse), _) => Ok(VerseKey::new(book.id, reference.chapter, verse)),
            (None, Some(v)) => v.first_verse(book.id, reference.chapter),
            (None, None) => self
                .versification(reference.translation.as_deref())?
                .first_verse(book.id, reference.chapter),
        }
    }
}

/// Parses a reference and finds its book in the canon.
fn parse(reference: &str) -> Result<(Reference, &'static Book), DbError> {
    let parsed: Reference = reference.parse()?;
    let book = canon::book_by_name(&parsed.book)
        .ok_or_else(|| DbError::invalid_reference(reference))?;
    Ok((parsed, book))
}

impl ReferenceParsing for ReferenceParser {
    fn verse(&self, reference: &str) -> Result<VerseKey, DbError> {
        let (parsed, book) = parse(reference)?;
        match parsed.verses {
            Some(ref verses) if parsed.is_single_verse() => {
                Ok(VerseKey::new(book.id, parsed.chapter, *verses.start()))
            }
            _ => Err(DbError::invalid_reference(reference)),
        }
    }

    fn passage_start(&self, reference: &str) -> Result<VerseKey, DbError> {
        let (parsed, book) = parse(reference)?;
        self.first_key(&parsed, book, None)
    }

    fn passage_len(&self, start: &str, end: &str) -> Result<i64, DbError> {
        let (start_ref, start_book) = parse(start)?;
        let (end_ref, end_book) = parse(end)?;
        if start_ref.translation != end_ref.translation {
            return Err(DbError::invalid_reference(format!("{} - {}", start, end)));
        }

        let versification = self.versification(start_ref.translation.as_deref())?;
        let first = self.first_key(&start_ref, start_book, Some(versification))?;
        let last = match end_ref.last_verse() {
            Some(verse) => VerseKey::new(end_book.id, end_ref.chapter, verse),
            None => versification.last_verse(end_book.id, end_ref.chapter)?,
        };

        versification.span(first, last)
    }
}

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::{Match, Regex};
use serde_derive::Serialize;

use crate::DbError;

/// Model representing a textual Bible reference, eg: "John 3:16-18 KJV".
///
/// The book is kept as written; resolving it against the canon is up to
/// the parser.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reference {
    pub book: String,
    pub chapter: i32,
    pub verses: Option<RangeInclusive<i32>>,
    pub translation: Option<String>,
}

impl Reference {
    /// First verse named by the reference, if it names verses at all.
    pub fn first_verse(&self) -> Option<i32> {
        self.verses.as_ref().map(|v| *v.start())
    }

    /// Last verse named by the reference, if it names verses at all.
    pub fn last_verse(&self) -> Option<i32> {
        self.verses.as_ref().map(|v| *v.end())
    }

    /// Whether the reference names exactly one verse.
    pub fn is_single_verse(&self) -> bool {
        matches!(self.verses, Some(ref v) if v.start() == v.end())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.verses {
            None => write!(f, "{} {}", self.book, self.chapter)?,
            Some(ref verses) => {
                if verses.start() == verses.end() {
                    write!(f, "{} {}:{}", self.book, self.chapter, verses.start())?
                } else {
                    write!(
                        f,
                        "{} {}:{}-{}",
                        self.book,
                        self.chapter,
                        verses.start(),
                        verses.end()
                    )?
                }
            }
        }

        if let Some(ref translation) = self.translation {
            write!(f, " {}", translation)?;
        }
        Ok(())
    }
}

impl FromStr for Reference {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Reference, Self::Err> {
        lazy_static! {
            static ref REF_RE: Regex = Regex::new(
                r"^(\w+(?: [a-zA-Z]+(?: [a-zA-Z]+)?)?)(?:\.| )([0-9\-:\.]+)(?: +([a-zA-Z][a-zA-Z0-9]*))?$"
            )
            .unwrap();
            static ref CV_RE: Regex =
                Regex::new(r"^(\d{1,3})(?:[:\.](\d{1,3})?(?:-(\d{1,3}))?)?$").unwrap();
        }

        let ref_caps = REF_RE
            .captures(s.trim())
            .ok_or_else(|| invalid_reference(s))?;
        let translation = ref_caps.get(3).map(|t| t.as_str().to_string());

        match (ref_caps.get(1), ref_caps.get(2)) {
            // Book and chapter/verse reference
            (Some(book), Some(cv)) => {
                let cv_caps = CV_RE
                    .captures(cv.as_str())
                    .ok_or_else(|| invalid_reference(s))?;
                let book = book.as_str().to_string();

                match (cv_caps.get(1), cv_caps.get(2), cv_caps.get(3)) {
                    // Chapter only
                    (Some(chapter), None, None) => Ok(Reference {
                        book,
                        chapter: parse_num_match(chapter)?,
                        verses: None,
                        translation,
                    }),
                    // Chapter and one verse
                    (Some(chapter), Some(verse), None) => {
                        let verse = parse_num_match(verse)?;
                        Ok(Reference {
                            book,
                            chapter: parse_num_match(chapter)?,
                            verses: Some(verse..=verse),
                            translation,
                        })
                    }
                    // Chapter with more than one verse
                    (Some(chapter), Some(verse_start), Some(verse_end)) => {
                        let verse_start = parse_num_match(verse_start)?;
                        let verse_end = parse_num_match(verse_end)?;
                        Ok(Reference {
                            book,
                            chapter: parse_num_match(chapter)?,
                            verses: Some(verse_start..=verse_end),
                            translation,
                        })
                    }
                    _ => Err(invalid_reference(s)),
                }
            }
            _ => Err(invalid_reference(s)),
        }
    }
}

/// Parse a [Match](regex::Match) into a positive i32.
fn parse_num_match(m: Match) -> Result<i32, DbError> {
    match m.as_str().parse() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid_reference(m.as_str())),
    }
}

/// Create an invalid reference error from the input.
fn invalid_reference(s: &str) -> DbError {
    DbError::invalid_reference(s)
}

//! Resolves textual references against the verses of a translation.
use log::debug;

use crate::models::{Verse, VerseKey};
use crate::parser::{ReferenceParser, ReferenceParsing};
use crate::registry;
use crate::sword_drill::SwordDrillable;
use crate::{DbConnection, DbError};

/// Appends the translation code to a reference, unless the reference already
/// ends with it.
pub fn qualify(reference: &str, translation: &str) -> String {
    let reference = reference.trim();
    match reference.split_whitespace().last() {
        Some(last) if last == translation => reference.to_string(),
        _ => format!("{} {}", reference, translation),
    }
}

fn ensure_registered(translation: &str) -> Result<(), DbError> {
    if registry::is_registered(translation) {
        Ok(())
    } else {
        Err(DbError::TranslationNotFound {
            translation: translation.to_string(),
        })
    }
}

/// Looks up verses and passages from references like "John 3:16".
pub struct Resolver<P = ReferenceParser> {
    parser: P,
}

impl<P: ReferenceParsing> Resolver<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Looks up the single verse named by `reference` in the translation.
    pub fn resolve_verse<D: SwordDrillable>(
        &self,
        translation: &str,
        reference: &str,
        conn: &mut DbConnection,
    ) -> Result<Verse, DbError> {
        ensure_registered(translation)?;

        let key = self.parser.verse(&qualify(reference, translation))?;
        let ordinal = D::ordinal_of(translation, key, conn)?;
        debug!("{} is verse {} of the {}", key, ordinal, translation);

        D::verse(translation, ordinal, conn)
    }

    /// Looks up the verses from `start` to `end` (inclusive) in the
    /// translation, in order. Without an `end` the passage is just `start`.
    ///
    /// The passage is read as one run of ordinals: the first is the number of
    /// verses from Genesis 1:1 to the start, and the run is as long as the
    /// parser counts the passage to be.
    pub fn resolve_passage<D: SwordDrillable>(
        &self,
        translation: &str,
        start: &str,
        end: Option<&str>,
        conn: &mut DbConnection,
    ) -> Result<Vec<Verse>, DbError> {
        ensure_registered(translation)?;

        let start_ref = qualify(start, translation);
        let end_ref = qualify(end.unwrap_or(start), translation);

        let len = self.parser.passage_len(&start_ref, &end_ref)?;
        if len < 1 {
            return Err(DbError::invalid_reference(format!(
                "{} - {}",
                start_ref, end_ref
            )));
        }

        let first = self.parser.passage_start(&start_ref)?;
        let origin = qualify(&VerseKey::ORIGIN.to_string(), translation);
        let first_ordinal = self
            .parser
            .passage_len(&origin, &qualify(&first.to_string(), translation))?;
        let last_ordinal = first_ordinal + len - 1;
        debug!(
            "{} - {} is verses {} to {} of the {}",
            start_ref, end_ref, first_ordinal, last_ordinal, translation
        );

        let out_of_range = || DbError::not_found(format!("{} - {}", start_ref, end_ref));
        let first_ordinal = i32::try_from(first_ordinal).map_err(|_| out_of_range())?;
        let last_ordinal = i32::try_from(last_ordinal).map_err(|_| out_of_range())?;

        let verses = D::range(translation, first_ordinal, last_ordinal, conn)?;
        // The parser's count and the stored ordinals must agree on where the
        // passage starts.
        match verses.first() {
            Some(verse) if verse.key() == first => Ok(verses),
            _ => Err(out_of_range()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{fixture_connection, fixture_verses, FIXTURE};
    use crate::versification::Versification;
    use crate::SwordDrill;

    fn resolver() -> Resolver {
        registry::register(FIXTURE);
        Resolver::new(ReferenceParser::new().with_versification(
            FIXTURE,
            Versification::from_keys(fixture_verses().iter().map(|v| v.key())),
        ))
    }

    /// Resolver counting with the fixture's verses, changed by `edit`.
    fn resolver_with<F>(edit: F) -> Resolver
    where
        F: FnOnce(&mut Vec<VerseKey>),
    {
        registry::register(FIXTURE);
        let mut keys: Vec<VerseKey> = fixture_verses().iter().map(|v| v.key()).collect();
        edit(&mut keys);
        Resolver::new(
            ReferenceParser::new().with_versification(FIXTURE, Versification::from_keys(keys)),
        )
    }

    #[test]
    fn qualify_references() {
        vec![
            ("John 3:16", "John 3:16 KJV"),
            ("John 3:16 KJV", "John 3:16 KJV"),
            ("  John 3:16  ", "John 3:16 KJV"),
            ("John 3:16 NKJV", "John 3:16 NKJV KJV"),
            ("Song of Solomon 1:1", "Song of Solomon 1:1 KJV"),
        ]
        .into_iter()
        .for_each(|(raw, expected)| assert_eq!(qualify(raw, "KJV"), expected));

        assert_eq!(qualify("John 3:16 NASB95", "NASB95"), "John 3:16 NASB95");
    }

    #[test]
    fn resolve_verse() {
        let mut conn = fixture_connection();
        let resolver = resolver();

        let verse = resolver
            .resolve_verse::<SwordDrill>(FIXTURE, "John 3:16", &mut conn)
            .unwrap();
        assert_eq!(verse.key(), VerseKey::new(43, 3, 16));
        assert_eq!(verse.ordinal, 8);
        assert_eq!(
            verse.words,
            "For God so loved the world, that he gave his only begotten Son, that whosoever believeth in him should not perish, but have everlasting life."
        );

        let qualified = resolver
            .resolve_verse::<SwordDrill>(FIXTURE, "jhn 3:16 KJV", &mut conn)
            .unwrap();
        assert_eq!(qualified, verse);
    }

    #[test]
    fn resolve_missing_verse() {
        let mut conn = fixture_connection();
        let resolver = resolver();

        vec!["Genesis 1:50", "Genesis 51:1", "Exodus 1:2", "Jude 1:1"]
            .into_iter()
            .for_each(|raw| {
                assert!(
                    resolver
                        .resolve_verse::<SwordDrill>(FIXTURE, raw, &mut conn)
                        .unwrap_err()
                        .is_not_found(),
                    "{}",
                    raw
                );
            });
    }

    #[test]
    fn resolve_invalid_reference() {
        let mut conn = fixture_connection();
        let resolver = resolver();

        vec!["Gnesis 1:1", "John 3", "John", "John 3:16 NKJV", ""]
            .into_iter()
            .for_each(|raw| {
                assert!(
                    matches!(
                        resolver.resolve_verse::<SwordDrill>(FIXTURE, raw, &mut conn),
                        Err(DbError::InvalidReference { .. })
                    ),
                    "{}",
                    raw
                );
            });
    }

    #[test]
    fn unregistered_translation() {
        let mut conn = fixture_connection();
        let resolver = resolver();

        assert!(matches!(
            resolver.resolve_verse::<SwordDrill>("UNREGISTERED", "John 3:16", &mut conn),
            Err(DbError::TranslationNotFound { .. })
        ));
        assert!(matches!(
            resolver.resolve_passage::<SwordDrill>("UNREGISTERED", "John 3:16", None, &mut conn),
            Err(DbError::TranslationNotFound { .. })
        ));
    }

    #[test]
    fn single_verse_passage() {
        let mut conn = fixture_connection();
        let resolver = resolver();

        let verse = resolver
            .resolve_verse::<SwordDrill>(FIXTURE, "Genesis 1:1", &mut conn)
            .unwrap();
        let passage = resolver
            .resolve_passage::<SwordDrill>(FIXTURE, "Genesis 1:1", Some("Genesis 1:1"), &mut conn)
            .unwrap();
        assert_eq!(passage, vec![verse.clone()]);

        let implied = resolver
            .resolve_passage::<SwordDrill>(FIXTURE, "Genesis 1:1", None, &mut conn)
            .unwrap();
        assert_eq!(implied, vec![verse]);
    }

    #[test]
    fn passage_across_chapters() {
        let mut conn = fixture_connection();
        let resolver = resolver();

        let passage = resolver
            .resolve_passage::<SwordDrill>(FIXTURE, "Romans 1:1", Some("Romans 2:3"), &mut conn)
            .unwrap();
        let len = resolver
            .parser()
            .passage_len("Romans 1:1 KJV", "Romans 2:3 KJV")
            .unwrap();
        let start = SwordDrill::ordinal_of(FIXTURE, VerseKey::new(45, 1, 1), &mut conn).unwrap();

        assert_eq!(passage.len() as i64, len);
        assert_eq!(passage[0].ordinal, start);
        assert!(passage
            .windows(2)
            .all(|w| w[0].ordinal + 1 == w[1].ordinal));
        assert_eq!(passage[4].key(), VerseKey::new(45, 2, 3));
    }

    #[test]
    fn passage_forms() {
        let mut conn = fixture_connection();
        let resolver = resolver();

        vec![
            ("John 3:16-17", None, 2, VerseKey::new(43, 3, 16)),
            ("John 3:17 KJV", Some("Romans 1:1 KJV"), 2, VerseKey::new(43, 3, 17)),
            ("Genesis 1", Some("Genesis 2"), 5, VerseKey::ORIGIN),
            ("Psalm 119:105", Some("Revelation 22:21"), 10, VerseKey::new(19, 119, 105)),
        ]
        .into_iter()
        .for_each(|(start, end, len, first)| {
            let passage = resolver
                .resolve_passage::<SwordDrill>(FIXTURE, start, end, &mut conn)
                .unwrap();
            assert_eq!(passage.len(), len, "{}", start);
            assert_eq!(passage[0].key(), first, "{}", start);
        });
    }

    #[test]
    fn passage_end_before_start() {
        let mut conn = fixture_connection();
        let resolver = resolver();

        assert!(matches!(
            resolver.resolve_passage::<SwordDrill>(
                FIXTURE,
                "Romans 2:3",
                Some("Romans 1:1"),
                &mut conn
            ),
            Err(DbError::InvalidReference { .. })
        ));
    }

    #[test]
    fn passage_invalid_reference() {
        let mut conn = fixture_connection();
        let resolver = resolver();

        assert!(matches!(
            resolver.resolve_passage::<SwordDrill>(FIXTURE, "Romans 1:1", Some("Rmz 2:3"), &mut conn),
            Err(DbError::InvalidReference { .. })
        ));
        assert!(matches!(
            resolver.resolve_passage::<SwordDrill>(FIXTURE, "Romans", None, &mut conn),
            Err(DbError::InvalidReference { .. })
        ));
    }

    #[test]
    fn passage_past_the_end() {
        let mut conn = fixture_connection();
        let resolver = resolver_with(|keys| keys.push(VerseKey::new(66, 22, 22)));

        assert!(resolver
            .resolve_passage::<SwordDrill>(
                FIXTURE,
                "Revelation 22:21",
                Some("Revelation 22:22"),
                &mut conn
            )
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn passage_of_missing_verse() {
        let mut conn = fixture_connection();
        let resolver = resolver();

        assert!(resolver
            .resolve_passage::<SwordDrill>(FIXTURE, "Genesis 1:50", None, &mut conn)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn counting_disagrees_with_store() {
        let mut conn = fixture_connection();
        let resolver = resolver_with(|keys| keys.retain(|k| *k != VerseKey::new(1, 1, 2)));

        assert!(resolver
            .resolve_passage::<SwordDrill>(FIXTURE, "Romans 1:1", None, &mut conn)
            .unwrap_err()
            .is_not_found());
    }
}

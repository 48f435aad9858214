use std::cell::{Cell, RefCell};

use crate::models::*;
use crate::*;

/// Translation code of the test fixture.
pub const FIXTURE: &str = "KJV";

pub fn kjv() -> Translation {
    Translation {
        code: FIXTURE.to_string(),
        name: "King James (Authorized) Version".to_string(),
    }
}

/// A few verses of the KJV, from Genesis 1:1 to Revelation 22:21, in order.
pub fn fixture_verses() -> Vec<NewVerse> {
    vec![
        (1, 1, 1, "In the beginning God created the heaven and the earth."),
        (1, 1, 2, "And the earth was without form, and void; and darkness was upon the face of the deep. And the Spirit of God moved upon the face of the waters."),
        (1, 1, 3, "And God said, Let there be light: and there was light."),
        (1, 2, 1, "Thus the heavens and the earth were finished, and all the host of them."),
        (1, 2, 2, "And on the seventh day God ended his work which he had made; and he rested on the seventh day from all his work which he had made."),
        (2, 1, 1, "Now these are the names of the children of Israel, which came into Egypt; every man and his household came with Jacob."),
        (19, 119, 105, "NUN. Thy word is a lamp unto my feet, and a light unto my path."),
        (43, 3, 16, "For God so loved the world, that he gave his only begotten Son, that whosoever believeth in him should not perish, but have everlasting life."),
        (43, 3, 17, "For God sent not his Son into the world to condemn the world; but that the world through him might be saved."),
        (45, 1, 1, "Paul, a servant of Jesus Christ, called to be an apostle, separated unto the gospel of God,"),
        (45, 1, 2, "(Which he had promised afore by his prophets in the holy scriptures,)"),
        (45, 2, 1, "Therefore thou art inexcusable, O man, whosoever thou art that judgest: for wherein thou judgest another, thou condemnest thyself; for thou that judgest doest the same things."),
        (45, 2, 2, "But we are sure that the judgment of God is according to truth against them which commit such things."),
        (45, 2, 3, "And thinkest thou this, O man, that judgest them which do such things, and doest the same, that thou shalt escape the judgment of God?"),
        (66, 22, 20, "He which testifieth these things saith, Surely I come quickly. Amen. Even so, come, Lord Jesus."),
        (66, 22, 21, "The grace of our Lord Jesus Christ be with you all. Amen."),
    ]
    .into_iter()
    .map(|(book, chapter, verse, words)| NewVerse {
        book,
        chapter,
        verse,
        words: words.to_string(),
    })
    .collect()
}

/// An empty in-memory database with all migrations applied.
pub fn connection() -> DbConnection {
    let mut conn = establish_connection(":memory:").unwrap();
    run_migrations(&mut conn).unwrap();
    conn
}

/// An in-memory database holding the fixture verses.
pub fn fixture_connection() -> DbConnection {
    let mut conn = connection();
    SwordDrill::load(&kjv(), fixture_verses(), &mut conn).unwrap();
    conn
}

thread_local! {
    static VERSES: RefCell<Vec<Verse>> = RefCell::new(TestSwordDrill::fixture());
    static LOOKUPS: Cell<usize> = Cell::new(0);
    static FAILING: Cell<bool> = Cell::new(false);
}

/// Storage backed by a per-thread list of verses, counting lookups by ordinal.
pub struct TestSwordDrill;

impl TestSwordDrill {
    /// The fixture verses, numbered from 1.
    pub fn fixture() -> Vec<Verse> {
        (1..)
            .zip(fixture_verses())
            .map(|(ordinal, v)| Verse::new(FIXTURE, ordinal, v.key(), v.words))
            .collect()
    }

    /// Replaces the verses of this thread's store.
    pub fn set_verses(verses: Vec<Verse>) {
        VERSES.with(|v| *v.borrow_mut() = verses);
    }

    pub fn lookups() -> usize {
        LOOKUPS.with(Cell::get)
    }

    pub fn reset_lookups() {
        LOOKUPS.with(|l| l.set(0));
    }

    /// Makes lookups by ordinal on this thread fail like a broken database.
    pub fn fail_lookups(failing: bool) {
        FAILING.with(|f| f.set(failing));
    }

    fn find<F>(translation: &str, item: String, f: F) -> Result<Verse, DbError>
    where
        F: Fn(&Verse) -> bool,
    {
        VERSES.with(|verses| {
            verses
                .borrow()
                .iter()
                .find(|v| v.translation == translation && f(v))
                .cloned()
                .ok_or(DbError::NotFound { item })
        })
    }
}

impl SwordDrillable for TestSwordDrill {
    fn verse(translation: &str, ordinal: i32, _: &mut DbConnection) -> Result<Verse, DbError> {
        LOOKUPS.with(|l| l.set(l.get() + 1));
        if FAILING.with(Cell::get) {
            return Err(DbError::Other {
                cause: "disk I/O error".to_string(),
            });
        }
        Self::find(translation, format!("Verse {}", ordinal), |v| {
            v.ordinal == ordinal
        })
    }

    fn verse_by_key(
        translation: &str,
        key: VerseKey,
        _: &mut DbConnection,
    ) -> Result<Verse, DbError> {
        Self::find(translation, key.to_string(), |v| v.key() == key)
    }

    fn ordinal_of(
        translation: &str,
        key: VerseKey,
        conn: &mut DbConnection,
    ) -> Result<i32, DbError> {
        Self::verse_by_key(translation, key, conn).map(|v| v.ordinal)
    }

    fn range(
        translation: &str,
        start: i32,
        end: i32,
        conn: &mut DbConnection,
    ) -> Result<Vec<Verse>, DbError> {
        if start < 1 || end < start {
            return Err(DbError::not_found(format!("Verses {} to {}", start, end)));
        }
        (start..=end)
            .map(|ordinal| Self::verse(translation, ordinal, conn))
            .collect()
    }

    fn count(translation: &str, _: &mut DbConnection) -> Result<i64, DbError> {
        Ok(VERSES.with(|verses| {
            verses
                .borrow()
                .iter()
                .filter(|v| v.translation == translation)
                .count() as i64
        }))
    }

    fn keys(translation: &str, _: &mut DbConnection) -> Result<Vec<(VerseKey, i32)>, DbError> {
        Ok(VERSES.with(|verses| {
            let mut keys: Vec<(VerseKey, i32)> = verses
                .borrow()
                .iter()
                .filter(|v| v.translation == translation)
                .map(|v| (v.key(), v.ordinal))
                .collect();
            keys.sort_by_key(|(_, ordinal)| *ordinal);
            keys
        }))
    }

    fn translations(_: &mut DbConnection) -> Result<Vec<Translation>, DbError> {
        Ok(vec![kjv()])
    }

    fn load(_: &Translation, _: Vec<NewVerse>, _: &mut DbConnection) -> Result<usize, DbError> {
        Err(DbError::Other {
            cause: "The test store is read only.".to_string(),
        })
    }
}

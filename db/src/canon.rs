//! The canon: the 66 books of the Bible in their fixed order.
//!
//! Book ids are 1-indexed and stable (Genesis is 1, Revelation is 66), so
//! every translation can address its verses by the same book ids.

use lazy_static::lazy_static;
use regex::Regex;
use serde_derive::Serialize;

use crate::DbError;

/// Id of the first book in the canon.
pub const FIRST_BOOK_ID: i32 = 1;

/// Id of the last book in the canon.
pub const LAST_BOOK_ID: i32 = 66;

/// Id of the last book of the Old Testament (Malachi).
const LAST_OLD_TESTAMENT_ID: i32 = 39;

/// Enum for the testaments in the Bible (Old or New).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Testament {
    Old,
    New,
}

/// A book of the Bible.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: i32,
    pub name: &'static str,
    /// OSIS abbreviation.
    pub abbreviation: &'static str,
    /// USFM book code.
    pub code: &'static str,
    pub chapter_count: i32,
    pub testament: Testament,
    /// Alternate (long form) name, eg: "The Gospel According to Saint John".
    pub altname: Option<&'static str>,
}

const fn book(
    id: i32,
    name: &'static str,
    abbreviation: &'static str,
    code: &'static str,
    chapter_count: i32,
    altname: Option<&'static str>,
) -> Book {
    Book {
        id,
        name,
        abbreviation,
        code,
        chapter_count,
        testament: if id <= LAST_OLD_TESTAMENT_ID {
            Testament::Old
        } else {
            Testament::New
        },
        altname,
    }
}

/// Array of books indexed by their order in the Bible (offset by one).
#[rustfmt::skip]
static BOOKS: [Book; 66] = [
    book(1, "Genesis", "Gen", "GEN", 50, Some("The First Book of Moses, called Genesis")),
    book(2, "Exodus", "Exod", "EXO", 40, Some("The Second Book of Moses, called Exodus")),
    book(3, "Leviticus", "Lev", "LEV", 27, Some("The Third Book of Moses, called Leviticus")),
    book(4, "Numbers", "Num", "NUM", 36, Some("The Fourth Book of Moses, called Numbers")),
    book(5, "Deuteronomy", "Deut", "DEU", 34, Some("The Fifth Book of Moses, called Deuteronomy")),
    book(6, "Joshua", "Josh", "JOS", 24, None),
    book(7, "Judges", "Judg", "JDG", 21, None),
    book(8, "Ruth", "Ruth", "RUT", 4, None),
    book(9, "1 Samuel", "1Sam", "1SA", 31, Some("The First Book of Samuel")),
    book(10, "2 Samuel", "2Sam", "2SA", 24, Some("The Second Book of Samuel")),
    book(11, "1 Kings", "1Kgs", "1KI", 22, Some("The First Book of the Kings")),
    book(12, "2 Kings", "2Kgs", "2KI", 25, Some("The Second Book of the Kings")),
    book(13, "1 Chronicles", "1Chr", "1CH", 29, Some("The First Book of the Chronicles")),
    book(14, "2 Chronicles", "2Chr", "2CH", 36, Some("The Second Book of the Chronicles")),
    book(15, "Ezra", "Ezra", "EZR", 10, None),
    book(16, "Nehemiah", "Neh", "NEH", 13, None),
    book(17, "Esther", "Esth", "EST", 10, None),
    book(18, "Job", "Job", "JOB", 42, None),
    book(19, "Psalms", "Ps", "PSA", 150, Some("The Book of Psalms")),
    book(20, "Proverbs", "Prov", "PRO", 31, None),
    book(21, "Ecclesiastes", "Eccl", "ECC", 12, Some("Ecclesiastes; or, The Preacher")),
    book(22, "Song of Solomon", "Song", "SNG", 8, Some("The Song of Songs")),
    book(23, "Isaiah", "Isa", "ISA", 66, Some("The Book of the Prophet Isaiah")),
    book(24, "Jeremiah", "Jer", "JER", 52, Some("The Book of the Prophet Jeremiah")),
    book(25, "Lamentations", "Lam", "LAM", 5, Some("The Lamentations of Jeremiah")),
    book(26, "Ezekiel", "Ezek", "EZK", 48, Some("The Book of the Prophet Ezekiel")),
    book(27, "Daniel", "Dan", "DAN", 12, None),
    book(28, "Hosea", "Hos", "HOS", 14, None),
    book(29, "Joel", "Joel", "JOL", 3, None),
    book(30, "Amos", "Amos", "AMO", 9, None),
    book(31, "Obadiah", "Obad", "OBA", 1, None),
    book(32, "Jonah", "Jonah", "JON", 4, None),
    book(33, "Micah", "Mic", "MIC", 7, None),
    book(34, "Nahum", "Nah", "NAM", 3, None),
    book(35, "Habakkuk", "Hab", "HAB", 3, None),
    book(36, "Zephaniah", "Zeph", "ZEP", 3, None),
    book(37, "Haggai", "Hag", "HAG", 2, None),
    book(38, "Zechariah", "Zech", "ZEC", 14, None),
    book(39, "Malachi", "Mal", "MAL", 4, None),
    book(40, "Matthew", "Matt", "MAT", 28, Some("The Gospel According to Saint Matthew")),
    book(41, "Mark", "Mark", "MRK", 16, Some("The Gospel According to Saint Mark")),
    book(42, "Luke", "Luke", "LUK", 24, Some("The Gospel According to Saint Luke")),
    book(43, "John", "John", "JHN", 21, Some("The Gospel According to Saint John")),
    book(44, "Acts", "Acts", "ACT", 28, Some("The Acts of the Apostles")),
    book(45, "Romans", "Rom", "ROM", 16, Some("The Epistle of Paul the Apostle to the Romans")),
    book(46, "1 Corinthians", "1Cor", "1CO", 16, Some("The First Epistle of Paul the Apostle to the Corinthians")),
    book(47, "2 Corinthians", "2Cor", "2CO", 13, Some("The Second Epistle of Paul the Apostle to the Corinthians")),
    book(48, "Galatians", "Gal", "GAL", 6, Some("The Epistle of Paul the Apostle to the Galatians")),
    book(49, "Ephesians", "Eph", "EPH", 6, Some("The Epistle of Paul the Apostle to the Ephesians")),
    book(50, "Philippians", "Phil", "PHP", 4, Some("The Epistle of Paul the Apostle to the Philippians")),
    book(51, "Colossians", "Col", "COL", 4, Some("The Epistle of Paul the Apostle to the Colossians")),
    book(52, "1 Thessalonians", "1Thess", "1TH", 5, Some("The First Epistle of Paul the Apostle to the Thessalonians")),
    book(53, "2 Thessalonians", "2Thess", "2TH", 3, Some("The Second Epistle of Paul the Apostle to the Thessalonians")),
    book(54, "1 Timothy", "1Tim", "1TI", 6, Some("The First Epistle of Paul the Apostle to Timothy")),
    book(55, "2 Timothy", "2Tim", "2TI", 4, Some("The Second Epistle of Paul the Apostle to Timothy")),
    book(56, "Titus", "Titus", "TIT", 3, Some("The Epistle of Paul to Titus")),
    book(57, "Philemon", "Phlm", "PHM", 1, Some("The Epistle of Paul to Philemon")),
    book(58, "Hebrews", "Heb", "HEB", 13, Some("The Epistle of Paul the Apostle to the Hebrews")),
    book(59, "James", "Jas", "JAS", 5, Some("The General Epistle of James")),
    book(60, "1 Peter", "1Pet", "1PE", 5, Some("The First Epistle General of Peter")),
    book(61, "2 Peter", "2Pet", "2PE", 3, Some("The Second Epistle General of Peter")),
    book(62, "1 John", "1John", "1JN", 5, Some("The First Epistle General of John")),
    book(63, "2 John", "2John", "2JN", 1, Some("The Second Epistle of John")),
    book(64, "3 John", "3John", "3JN", 1, Some("The Third Epistle of John")),
    book(65, "Jude", "Jude", "JUD", 1, Some("The General Epistle of Jude")),
    book(66, "Revelation", "Rev", "REV", 22, Some("The Revelation of Saint John the Divine")),
];

/// All books in canonical order.
pub fn books() -> &'static [Book] {
    &BOOKS
}

/// Looks up a book by its canonical id.
pub fn book_by_id(id: i32) -> Result<&'static Book, DbError> {
    if (FIRST_BOOK_ID..=LAST_BOOK_ID).contains(&id) {
        Ok(&BOOKS[(id - 1) as usize])
    } else {
        Err(DbError::not_found(format!("Book {}", id)))
    }
}

/// Id of the book after `id`, or `None` after Revelation.
pub fn next_book_id(id: i32) -> Option<i32> {
    id.checked_add(1)
        .filter(|next| (FIRST_BOOK_ID..=LAST_BOOK_ID).contains(next))
}

/// Id of the book before `id`, or `None` before Genesis.
pub fn prev_book_id(id: i32) -> Option<i32> {
    id.checked_sub(1)
        .filter(|prev| (FIRST_BOOK_ID..=LAST_BOOK_ID).contains(prev))
}

lazy_static! {
    static ref NUMBERED_PREFIX: Regex = Regex::new(r"^(iii|ii|i|first|second|third)\s+").unwrap();

    /// Normalized (name, abbreviation, code) for each book, in canonical order.
    static ref LOOKUP: Vec<(String, String, String)> = BOOKS
        .iter()
        .map(|b| (normalize(b.name), normalize(b.abbreviation), normalize(b.code)))
        .collect();
}

/// Lower cases a book name, turns a leading "I"/"First" style number into a
/// digit, and strips spaces and periods.
fn normalize(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let numbered = NUMBERED_PREFIX.replace(&lower, |caps: &regex::Captures| {
        match &caps[1] {
            "i" | "first" => "1",
            "ii" | "second" => "2",
            _ => "3",
        }
        .to_string()
    });

    numbered
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect()
}

/// Looks up the book with the given name.
///
/// The name can be the canonical book name, the OSIS abbreviation, the
/// USFM code, or a prefix of the canonical name that matches only one book.
/// The book is looked up in a case-insensitive manner.
pub fn book_by_name(name: &str) -> Option<&'static Book> {
    let needle = normalize(name);
    if needle.is_empty() {
        return None;
    }

    if let Some(i) = LOOKUP
        .iter()
        .position(|(n, a, c)| *n == needle || *a == needle || *c == needle)
    {
        return Some(&BOOKS[i]);
    }

    let mut candidates = LOOKUP
        .iter()
        .enumerate()
        .filter(|(_, (n, _, _))| n.starts_with(&needle));
    match (candidates.next(), candidates.next()) {
        (Some((i, _)), None) => Some(&BOOKS[i]),
        _ => None,
    }
}

use serde_derive::Serialize;
use url::Url;

use crate::DbError;

/// Tuple identifying a verse outside the library: translation, book id,
/// chapter and verse.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct VerseAddress {
    pub translation: String,
    pub book: i32,
    pub chapter: i32,
    pub verse: i32,
}

/// Tuple identifying a chapter outside the library: translation, book id and
/// chapter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChapterAddress {
    pub translation: String,
    pub book: i32,
    pub chapter: i32,
}

impl VerseAddress {
    /// Relative path of the verse, eg: `KJV/43/3/16`.
    pub fn path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.translation, self.book, self.chapter, self.verse
        )
    }

    /// Absolute URL of the verse under `base`.
    pub fn url(&self, base: &Url) -> Result<Url, DbError> {
        join(base, &self.path())
    }
}

impl ChapterAddress {
    /// Relative path of the chapter, eg: `KJV/43/3`.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.translation, self.book, self.chapter)
    }

    /// Absolute URL of the chapter under `base`.
    pub fn url(&self, base: &Url) -> Result<Url, DbError> {
        join(base, &self.path())
    }
}

fn join(base: &Url, path: &str) -> Result<Url, DbError> {
    // Without a trailing slash the last segment of the base would be replaced.
    let base = if base.path().ends_with('/') {
        base.clone()
    } else {
        let mut dir = base.clone();
        dir.set_path(&format!("{}/", base.path()));
        dir
    };

    base.join(path).map_err(|e| DbError::Other {
        cause: format!("Could not build a URL for {}: {}", path, e),
    })
}

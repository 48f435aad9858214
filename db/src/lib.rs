#![allow(proc_macro_derive_resolution_fallback)]

#[macro_use]
extern crate diesel;

use diesel::prelude::*;
use diesel::r2d2;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;
use thiserror::Error;

/// Type of a pooled SQLite connection manager.
pub type SqliteConnectionManager = r2d2::ConnectionManager<SqliteConnection>;

/// Type for a SQLite connection pool.
pub type SqliteConnectionPool = r2d2::Pool<SqliteConnectionManager>;

pub type DbConnection = SqliteConnection;

/// Migrations compiled into the library, so an empty database can be set up
/// from any working directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[derive(Clone, Error, Debug, PartialEq)]
pub enum DbError {
    #[error("'{}' is not a valid Bible reference.", reference)]
    InvalidReference { reference: String },

    #[error("{} was not found.", item)]
    NotFound { item: String },

    #[error("The '{}' translation was not found.", translation)]
    TranslationNotFound { translation: String },

    #[error("The '{}' translation is already loaded.", translation)]
    TranslationLoaded { translation: String },

    #[error("Invalid verse data: {}", reason)]
    InvalidVerse { reason: String },

    #[error("Ordinals of the '{}' translation are inconsistent: {}", translation, reason)]
    InconsistentOrdinals { translation: String, reason: String },

    #[error("There was a connection pool error. Root cause: {:?}.", cause)]
    ConnectionPool { cause: String },

    #[error("There was a database error. Root cause: {:?}.", cause)]
    Other { cause: String },

    #[error("There was a database migration error. Root cause: {:?}.", cause)]
    Migration { cause: String },
}

impl DbError {
    /// Whether the error means a well-formed request had nothing stored behind it.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DbError::NotFound { .. } | DbError::TranslationNotFound { .. }
        )
    }

    pub(crate) fn not_found(item: impl Into<String>) -> Self {
        DbError::NotFound { item: item.into() }
    }

    pub(crate) fn invalid_reference(reference: impl Into<String>) -> Self {
        DbError::InvalidReference {
            reference: reference.into(),
        }
    }
}

impl From<diesel::result::Error> for DbError {
    fn from(e: diesel::result::Error) -> Self {
        DbError::Other {
            cause: e.to_string(),
        }
    }
}

/// Builds a SQLite connection pool with the given URL.
pub fn build_pool(db_url: &str) -> Result<SqliteConnectionPool, DbError> {
    r2d2::Pool::builder()
        .max_size(15)
        .build(SqliteConnectionManager::new(db_url))
        .map_err(|e| DbError::ConnectionPool {
            cause: e.to_string(),
        })
}

/// Establishes a non-pooled SQLite connection.
pub fn establish_connection(db_url: &str) -> Result<SqliteConnection, DbError> {
    SqliteConnection::establish(db_url).map_err(|e| DbError::Other {
        cause: format!("Error connecting to {}: {}", db_url, e),
    })
}

/// Run any pending Diesel migrations.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), DbError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| {
            if !applied.is_empty() {
                info!("Applied {} database migration(s)", applied.len());
            }
        })
        .map_err(|e| DbError::Migration {
            cause: e.to_string(),
        })
}

pub mod addressing;
pub mod canon;
pub mod link;
pub mod models;
pub mod parser;
pub mod registry;
pub mod resolver;
mod schema;
mod sword_drill;
#[cfg(test)]
mod test;
pub mod versification;

pub use parser::{ReferenceParser, ReferenceParsing};
pub use resolver::Resolver;
pub use sword_drill::{SwordDrill, SwordDrillable};
pub use versification::Versification;

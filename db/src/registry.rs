//! Registry of the translations available to the process.
//!
//! Translations are registered at startup, before the first reference is
//! resolved, and the registry is only read afterwards.
use std::sync::{PoisonError, RwLock};

use lazy_static::lazy_static;
use log::info;

use crate::sword_drill::SwordDrillable;
use crate::{DbConnection, DbError};

/// A set of translation codes, kept in registration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Registry {
    codes: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a translation code. Returns `false` if it was already registered.
    pub fn register(&mut self, code: &str) -> bool {
        if self.is_registered(code) {
            return false;
        }
        self.codes.push(code.to_string());
        true
    }

    pub fn is_registered(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }
}

lazy_static! {
    static ref REGISTRY: RwLock<Registry> = RwLock::new(Registry::new());
}

/// Registers a translation with the process. Registering twice is a no-op.
pub fn register(code: &str) -> bool {
    let added = REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(code);
    if added {
        info!("Registered the {} translation", code);
    }
    added
}

/// Whether the translation has been registered with the process.
pub fn is_registered(code: &str) -> bool {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_registered(code)
}

/// All translation codes registered with the process.
pub fn registered() -> Vec<String> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .codes()
        .to_vec()
}

/// Registers every stored translation. Returns the number newly registered.
pub fn register_stored<D: SwordDrillable>(conn: &mut DbConnection) -> Result<usize, DbError> {
    Ok(D::translations(conn)?
        .iter()
        .filter(|t| register(&t.code))
        .count())
}

//! Preferred-language resolution over injected storage and locale ports.
//!
//! The resolver never touches ambient state. Callers hand it the current
//! path, a [`PreferenceStore`] and a [`BrowserLocale`]; an environment with
//! neither storage nor a reported language simply supplies the
//! [`Unavailable`] and [`FixedLocale`] stand-ins.

use crate::language::{DEFAULT_LANGUAGE, LanguageCode, language_from_tag};
use crate::routing::resolve_from_path;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage key holding the visitor's chosen language.
pub const LANGUAGE_KEY: &str = "language";

/// Errors raised when persisting a preference.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("preference store at {path} is not accessible")]
    Io {
        /// Location of the backing file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The backing file does not contain a JSON object.
    #[error("preference store at {path} is malformed")]
    Malformed {
        /// Location of the backing file.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Persistent key-value storage for visitor preferences.
pub trait PreferenceStore {
    /// Fetch the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the value cannot be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Storage for environments without persistence: reads nothing, drops writes.
#[derive(Debug, Default, Copy, Clone)]
pub struct Unavailable;

impl PreferenceStore for Unavailable {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
        debug!(key, "no preference storage available; dropping write");
        Ok(())
    }
}

/// In-memory store, useful for embedding and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create a store holding a single `key`/`value` pair.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_owned(), value.to_owned());
        Self { entries }
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Store backed by a JSON object on disk.
///
/// The file is read lazily on every [`get`](PreferenceStore::get) and
/// rewritten through a temporary sibling so a crash never leaves it
/// truncated. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(map) => map.get(key).and_then(Value::as_str).map(ToOwned::to_owned),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable preference store");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // Only a corrupt file is replaced; read failures keep its contents.
        let mut map = match self.load() {
            Ok(map) => map,
            Err(err @ StoreError::Malformed { .. }) => {
                warn!(error = %err, "replacing malformed preference store");
                Map::new()
            }
            Err(err) => return Err(err),
        };
        map.insert(key.to_owned(), Value::String(value.to_owned()));
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|err| self.io_error(err))?;
        let mut tmp = NamedTempFile::new_in(&parent).map_err(|err| self.io_error(err))?;
        let body = serde_json::to_string_pretty(&Value::Object(map)).map_err(|source| {
            StoreError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        writeln!(tmp, "{body}").map_err(|err| self.io_error(err))?;
        tmp.persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;
        debug!(key, value, path = %self.path.display(), "persisted preference");
        Ok(())
    }
}

/// Source of the language reported by the visitor's environment.
pub trait BrowserLocale {
    /// Return the reported locale tag when available.
    fn language(&self) -> Option<String>;
}

/// Locale provider backed by the host's system locale via `sys-locale`.
#[derive(Debug, Default, Copy, Clone)]
pub struct SysLocale;

impl BrowserLocale for SysLocale {
    fn language(&self) -> Option<String> {
        sys_locale::get_locale()
    }
}

/// Locale provider returning a fixed tag, or nothing.
#[derive(Debug, Default, Clone)]
pub struct FixedLocale(pub Option<String>);

impl BrowserLocale for FixedLocale {
    fn language(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Read the stored language, treating unrecognized values as absent.
///
/// Only exact codes are recognized; `" ko "` or `"KO"` read as absent.
#[must_use]
pub fn stored_language(store: &impl PreferenceStore) -> Option<LanguageCode> {
    let raw = store.get(LANGUAGE_KEY)?;
    let parsed = LanguageCode::from_code(&raw);
    if parsed.is_none() {
        debug!(value = %raw, "ignoring unrecognized stored language");
    }
    parsed
}

/// Resolve the language a visitor should see.
///
/// Precedence is the language encoded in `path`, then the stored preference,
/// then the primary subtag reported by `browser`, and finally
/// [`DEFAULT_LANGUAGE`]. Unrecognized values at any step fall through.
///
/// # Examples
///
/// ```
/// use folio::language::LanguageCode;
/// use folio::preference::{FixedLocale, LANGUAGE_KEY, MemoryStore, Unavailable, resolve_preferred};
///
/// let store = MemoryStore::with_entry(LANGUAGE_KEY, "ko");
/// let browser = FixedLocale(Some("en-US".to_owned()));
/// assert_eq!(resolve_preferred(Some("/about"), &store, &browser), LanguageCode::Ko);
/// assert_eq!(resolve_preferred(Some("/about/en"), &store, &browser), LanguageCode::En);
/// assert_eq!(resolve_preferred(None, &Unavailable, &FixedLocale(None)), LanguageCode::En);
/// ```
#[must_use]
pub fn resolve_preferred(
    path: Option<&str>,
    store: &impl PreferenceStore,
    browser: &impl BrowserLocale,
) -> LanguageCode {
    if let Some(lang) = path.and_then(resolve_from_path) {
        debug!(%lang, "language taken from path");
        return lang;
    }
    if let Some(lang) = stored_language(store) {
        debug!(%lang, "language taken from stored preference");
        return lang;
    }
    if let Some(lang) = browser.language().as_deref().and_then(language_from_tag) {
        debug!(%lang, "language taken from browser locale");
        return lang;
    }
    debug!(lang = %DEFAULT_LANGUAGE, "falling back to default language");
    DEFAULT_LANGUAGE
}

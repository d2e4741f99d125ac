//! Supported site languages and locale tag normalization.
//!
//! The site ships in a fixed pair of languages. Adding one means adding a
//! variant here; every other module matches on [`LanguageCode`] exhaustively.

use ortho_config::LanguageIdentifier;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Language used when no other source yields a recognized code.
pub const DEFAULT_LANGUAGE: LanguageCode = LanguageCode::En;

/// A language the site is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageCode {
    /// English, the default language.
    En,
    /// Korean.
    Ko,
}

impl LanguageCode {
    /// Every supported language, default first.
    pub const ALL: [Self; 2] = [Self::En, Self::Ko];

    /// Short code used in paths and persisted preferences.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ko => "ko",
        }
    }

    /// The other language of the pair, used by the switch button.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::En => Self::Ko,
            Self::Ko => Self::En,
        }
    }

    /// Return `true` for [`DEFAULT_LANGUAGE`].
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::En)
    }

    /// Look up a language by its exact code, treating unknown codes as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::language::LanguageCode;
    ///
    /// assert_eq!(LanguageCode::from_code("ko"), Some(LanguageCode::Ko));
    /// assert_eq!(LanguageCode::from_code("fr"), None);
    /// ```
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Raised when a string does not name a supported language.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language code '{code}' (expected one of: en, ko)")]
pub struct UnknownLanguage {
    /// The rejected input.
    pub code: String,
}

impl FromStr for LanguageCode {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownLanguage { code: s.to_owned() })
    }
}

/// Normalize a raw locale string into a valid BCP 47 language tag.
///
/// Encoding suffixes (`.UTF-8`) and variant sections (`@latin`) are dropped
/// and underscores become hyphens before validation.
///
/// # Examples
///
/// ```
/// use folio::language::normalize_locale_tag;
///
/// assert_eq!(normalize_locale_tag("ko_KR.UTF-8"), Some("ko-KR".to_owned()));
/// assert_eq!(normalize_locale_tag("C"), None);
/// ```
#[must_use]
pub fn normalize_locale_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let stripped = trimmed.split(['.', '@']).next().unwrap_or_default().trim();
    if stripped.is_empty() {
        return None;
    }
    let candidate = stripped.replace('_', "-");
    LanguageIdentifier::from_str(&candidate)
        .ok()
        .map(|lang| lang.to_string())
}

/// Map a browser or system locale tag onto a supported language.
///
/// Only the primary language subtag is considered, so `ko-KR` and `ko` both
/// select Korean. Unrecognized languages yield `None`.
///
/// # Examples
///
/// ```
/// use folio::language::{LanguageCode, language_from_tag};
///
/// assert_eq!(language_from_tag("ko-KR"), Some(LanguageCode::Ko));
/// assert_eq!(language_from_tag("en_GB.UTF-8"), Some(LanguageCode::En));
/// assert_eq!(language_from_tag("fr-FR"), None);
/// ```
#[must_use]
pub fn language_from_tag(tag: &str) -> Option<LanguageCode> {
    let normalized = normalize_locale_tag(tag)?;
    let primary = normalized.split('-').next()?.to_ascii_lowercase();
    LanguageCode::from_code(&primary)
}

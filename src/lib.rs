//! Folio core library.
//!
//! Locale resolution and URL routing for a bilingual (English/Korean)
//! portfolio site: detecting the visitor's language from the path, their
//! stored preference and their browser, rewriting paths and links between
//! languages, and loading localized content collections.

pub mod cli;
pub mod config;
pub mod content;
pub mod language;
pub mod links;
pub mod preference;
pub mod routing;
pub mod runner;
pub mod switcher;

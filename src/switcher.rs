//! Effectful language switching on top of the pure resolver.
//!
//! [`LanguageSwitcher`] owns the three side-effecting ports a page needs
//! (preference storage, the document and the navigator) and sequences them:
//! persist the choice, mark the document, then navigate.

use crate::language::LanguageCode;
use crate::preference::{BrowserLocale, LANGUAGE_KEY, PreferenceStore, resolve_preferred};
use crate::routing::{build_path_for_language, redirect_on_load};
use tracing::{debug, info, warn};

/// The document whose language attribute reflects the active language.
pub trait Document {
    /// Set the document-level language attribute.
    fn set_lang(&mut self, lang: LanguageCode);
}

/// Navigation context for the current view.
pub trait Navigator {
    /// Path of the current view, when one exists.
    fn current_path(&self) -> Option<String>;

    /// Move to `path`. Navigation is fire-and-forget.
    fn navigate(&mut self, path: &str);
}

/// Document and navigator for environments without a browser.
///
/// Records what a browser would have done so callers can report it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Headless {
    /// Path the view started on.
    pub current: Option<String>,
    /// Language attribute last applied.
    pub lang: Option<LanguageCode>,
    /// Every path navigated to, oldest first.
    pub visited: Vec<String>,
}

impl Headless {
    /// Create a headless view positioned at `path`.
    #[must_use]
    pub fn at(path: &str) -> Self {
        Self {
            current: Some(path.to_owned()),
            ..Self::default()
        }
    }
}

impl Document for Headless {
    fn set_lang(&mut self, lang: LanguageCode) {
        self.lang = Some(lang);
    }
}

impl Navigator for Headless {
    fn current_path(&self) -> Option<String> {
        self.visited.last().cloned().or_else(|| self.current.clone())
    }

    fn navigate(&mut self, path: &str) {
        self.visited.push(path.to_owned());
    }
}

/// Result of the on-load step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Language applied to the document.
    pub language: LanguageCode,
    /// Path navigated to, when the view was redirected.
    pub redirect: Option<String>,
}

/// Orchestrates persistence, the document attribute and navigation.
#[derive(Debug)]
pub struct LanguageSwitcher<S, V> {
    store: S,
    view: V,
}

impl<S, V> LanguageSwitcher<S, V>
where
    S: PreferenceStore,
    V: Document + Navigator,
{
    /// Create a switcher over `store` and `view`.
    #[must_use]
    pub const fn new(store: S, view: V) -> Self {
        Self { store, view }
    }

    /// Borrow the preference store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Borrow the view.
    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// Release the underlying ports.
    #[must_use]
    pub fn into_parts(self) -> (S, V) {
        (self.store, self.view)
    }

    /// Path of the current view, with a missing context treated as the root.
    fn current_path(&self) -> String {
        self.view
            .current_path()
            .unwrap_or_else(|| String::from("/"))
    }

    /// Language currently in effect for the view.
    #[must_use]
    pub fn current_language(&self, browser: &impl BrowserLocale) -> LanguageCode {
        let path = self.view.current_path();
        resolve_preferred(path.as_deref(), &self.store, browser)
    }

    /// Persist `target`, apply it to the document and navigate to its path.
    ///
    /// A failed write is logged and otherwise ignored; the switch still
    /// happens for the current view. Returns the path navigated to.
    pub fn persist_and_navigate(&mut self, target: LanguageCode) -> String {
        if let Err(err) = self.store.set(LANGUAGE_KEY, target.code()) {
            warn!(error = %err, language = %target, "could not persist language preference");
        }
        self.view.set_lang(target);
        let next = build_path_for_language(&self.current_path(), target);
        info!(language = %target, path = %next, "switching language");
        self.view.navigate(&next);
        next
    }

    /// Switch to the other language of the pair.
    ///
    /// Returns the new language and the path navigated to.
    pub fn toggle(&mut self, browser: &impl BrowserLocale) -> (LanguageCode, String) {
        let target = self.current_language(browser).toggled();
        let path = self.persist_and_navigate(target);
        (target, path)
    }

    /// Apply the preferred language on page load.
    ///
    /// Pages without language evidence are redirected to the resolved
    /// language when it is not the default, so the URL matches the document.
    pub fn initialise(&mut self, browser: &impl BrowserLocale) -> LoadOutcome {
        let language = self.current_language(browser);
        self.view.set_lang(language);
        let redirect = redirect_on_load(&self.current_path(), language);
        if let Some(path) = &redirect {
            debug!(path = %path, %language, "redirecting to preferred language");
            self.view.navigate(path);
        }
        LoadOutcome { language, redirect }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::language::DEFAULT_LANGUAGE;
    use crate::preference::{
        FileStore, FixedLocale, MemoryStore, StoreError, Unavailable, stored_language,
    };
    use crate::routing::resolve_from_path;
    use anyhow::{Context, Result, ensure};
    use rstest::rstest;

    /// Store whose writes always fail.
    struct BrokenStore;

    impl PreferenceStore for BrokenStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: "broken".into(),
                source: std::io::Error::other("read-only"),
            })
        }
    }

    #[rstest]
    #[case("/", LanguageCode::Ko, "/ko")]
    #[case("/ko", LanguageCode::En, "/")]
    #[case("/writing/post_1", LanguageCode::Ko, "/writing/ko/post_1")]
    #[case("/toy-projects", LanguageCode::Ko, "/toy-projects/ko")]
    fn persist_and_navigate_applies_every_effect(
        #[case] start: &str,
        #[case] target: LanguageCode,
        #[case] expected: &str,
    ) -> Result<()> {
        let mut switcher = LanguageSwitcher::new(MemoryStore::default(), Headless::at(start));
        let path = switcher.persist_and_navigate(target);
        ensure!(path == expected, "expected navigation to {expected}, got {path}");
        let (store, view) = switcher.into_parts();
        ensure!(store.get(LANGUAGE_KEY).as_deref() == Some(target.code()));
        ensure!(view.lang == Some(target), "document language should be {target}");
        ensure!(view.visited == vec![expected.to_owned()]);
        Ok(())
    }

    #[rstest]
    fn persist_and_navigate_survives_failed_writes() -> Result<()> {
        let mut switcher = LanguageSwitcher::new(BrokenStore, Headless::at("/about"));
        let path = switcher.persist_and_navigate(LanguageCode::Ko);
        ensure!(path == "/about/ko", "navigation should still happen, got {path}");
        ensure!(switcher.view().lang == Some(LanguageCode::Ko));
        Ok(())
    }

    #[rstest]
    fn missing_navigation_context_is_treated_as_root() -> Result<()> {
        let mut switcher = LanguageSwitcher::new(Unavailable, Headless::default());
        let path = switcher.persist_and_navigate(LanguageCode::Ko);
        ensure!(path == "/ko", "expected root rewrite, got {path}");
        Ok(())
    }

    #[rstest]
    fn toggle_flips_between_languages() -> Result<()> {
        let browser = FixedLocale(None);
        let mut switcher = LanguageSwitcher::new(MemoryStore::default(), Headless::at("/"));
        let (first, first_path) = switcher.toggle(&browser);
        ensure!(first == LanguageCode::Ko && first_path == "/ko");
        let (second, second_path) = switcher.toggle(&browser);
        ensure!(second == LanguageCode::En && second_path == "/");
        ensure!(stored_language(switcher.store()) == Some(LanguageCode::En));
        Ok(())
    }

    #[rstest]
    #[case("/toy-projects", Some("ko"), LanguageCode::Ko, Some("/toy-projects/ko"))]
    #[case("/toy-projects", Some("en"), LanguageCode::En, None)]
    #[case("/toy-projects/en", Some("ko"), LanguageCode::En, None)]
    #[case("/writing/post_1", Some("ko"), LanguageCode::En, None)]
    #[case("/", None, LanguageCode::En, None)]
    fn initialise_applies_language_and_redirects(
        #[case] start: &str,
        #[case] stored: Option<&str>,
        #[case] language: LanguageCode,
        #[case] redirect: Option<&str>,
    ) -> Result<()> {
        let store = stored.map_or_else(MemoryStore::default, |value| {
            MemoryStore::with_entry(LANGUAGE_KEY, value)
        });
        let mut switcher = LanguageSwitcher::new(store, Headless::at(start));
        let outcome = switcher.initialise(&FixedLocale(None));
        ensure!(outcome.language == language, "expected {language}, got {}", outcome.language);
        ensure!(outcome.redirect.as_deref() == redirect, "unexpected redirect {:?}", outcome.redirect);
        ensure!(switcher.view().lang == Some(language));
        Ok(())
    }

    #[rstest]
    #[case("/about", Some("ko-KR"), LanguageCode::Ko, Some("/about/ko"))]
    #[case("/", Some("ko"), LanguageCode::Ko, Some("/ko"))]
    #[case("/about/en", Some("ko-KR"), LanguageCode::En, None)]
    #[case("/writing/post_1", Some("ko-KR"), LanguageCode::En, None)]
    #[case("/about", Some("fr-FR"), LanguageCode::En, None)]
    fn initialise_follows_browser_language_on_unmarked_paths(
        #[case] start: &str,
        #[case] browser: Option<&str>,
        #[case] language: LanguageCode,
        #[case] redirect: Option<&str>,
    ) -> Result<()> {
        let mut switcher = LanguageSwitcher::new(MemoryStore::default(), Headless::at(start));
        let outcome = switcher.initialise(&FixedLocale(browser.map(str::to_owned)));
        ensure!(outcome.language == language, "expected {language}, got {}", outcome.language);
        ensure!(outcome.redirect.as_deref() == redirect, "unexpected redirect {:?}", outcome.redirect);
        let (_, view) = switcher.into_parts();
        let landed = view.current_path().unwrap_or_default();
        let url_language = resolve_from_path(&landed).unwrap_or(DEFAULT_LANGUAGE);
        ensure!(
            view.lang == Some(url_language),
            "document says {:?} but {landed:?} says {url_language}",
            view.lang
        );
        Ok(())
    }

    #[rstest]
    fn file_backed_switch_is_remembered() -> Result<()> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        let path = dir.path().join("prefs.json");
        let mut switcher = LanguageSwitcher::new(FileStore::new(&path), Headless::at("/about"));
        switcher.persist_and_navigate(LanguageCode::Ko);

        let mut next_visit = LanguageSwitcher::new(FileStore::new(&path), Headless::at("/about"));
        let outcome = next_visit.initialise(&FixedLocale(Some("en-US".to_owned())));
        ensure!(outcome.language == LanguageCode::Ko);
        ensure!(outcome.redirect.as_deref() == Some("/about/ko"));
        Ok(())
    }
}

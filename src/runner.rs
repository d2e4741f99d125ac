//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads configuration, builds the ports each command needs and writes the
//! result to the supplied output.

use crate::cli::{BrowserArgs, Cli, Commands};
use crate::config::SiteConfig;
use crate::content::{Collection, DirectorySource, localized_content};
use crate::language::{DEFAULT_LANGUAGE, LanguageCode};
use crate::links::{is_language_aware_target, localize_link};
use crate::preference::{
    BrowserLocale, FileStore, FixedLocale, SysLocale, resolve_preferred, stored_language,
};
use crate::routing::redirect_on_load;
use crate::switcher::{Headless, LanguageSwitcher};
use anyhow::{Context, Result};
use std::io::{self, Write};
use tracing::{debug, info};

/// Execute the parsed [`Cli`] command, writing results to stdout.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or output cannot be
/// written.
pub fn run(cli: &Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with(cli, &mut out)
}

/// Execute `cli`, writing results to `out`.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, an argument fails to
/// parse, or output cannot be written.
pub fn run_with(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = SiteConfig::load(cli.config.as_deref(), cli.state.as_deref())
        .context("loading configuration")?;
    let site = config.origin().context("loading configuration")?;
    debug!(state = %config.state_file.display(), "using preference state file");
    let store = FileStore::new(&config.state_file);

    match &cli.command {
        Commands::Resolve { path, browser } => {
            let lang = resolve_preferred(path.as_deref(), &store, &browser_locale(browser));
            writeln!(out, "{lang}").context("writing language")?;
        }
        Commands::Switch { language, path } => {
            let target = parse_language(language)?;
            let mut switcher = LanguageSwitcher::new(store, Headless::at(path));
            let next = switcher.persist_and_navigate(target);
            writeln!(out, "{next}").context("writing path")?;
        }
        Commands::Toggle { path, browser } => {
            let mut switcher = LanguageSwitcher::new(store, Headless::at(path));
            let (lang, next) = switcher.toggle(&browser_locale(browser));
            writeln!(out, "{lang} {next}").context("writing toggle result")?;
        }
        Commands::Link { href, lang, nav } => {
            let language = language_or_stored(lang.as_deref(), &store)?;
            let localized = if *nav && !is_language_aware_target(href) {
                debug!(href = %href, "not a language-aware navigation target");
                href.clone()
            } else {
                localize_link(href, language, site.as_ref())
            };
            writeln!(out, "{localized}").context("writing link")?;
        }
        Commands::Redirect { path, browser } => {
            let preferred =
                resolve_preferred(Some(path.as_str()), &store, &browser_locale(browser));
            match redirect_on_load(path, preferred) {
                Some(target) => writeln!(out, "{target}").context("writing redirect")?,
                None => debug!(path = %path, %preferred, "no redirect needed"),
            }
        }
        Commands::Content {
            collection,
            lang,
            root,
        } => {
            let kind: Collection = collection.parse()?;
            let language = language_or_stored(lang.as_deref(), &store)?;
            let source = DirectorySource::new(root.clone().unwrap_or(config.content_root));
            info!(root = %source.root().display(), %kind, %language, "listing content");
            for entry in localized_content(&source, kind, language) {
                writeln!(out, "{}", entry.id).context("writing entry")?;
            }
        }
    }
    Ok(())
}

fn parse_language(raw: &str) -> Result<LanguageCode> {
    raw.parse::<LanguageCode>()
        .with_context(|| format!("parsing language '{raw}'"))
}

/// Use the explicit language, else the stored preference, else the default.
fn language_or_stored(explicit: Option<&str>, store: &FileStore) -> Result<LanguageCode> {
    match explicit {
        Some(raw) => parse_language(raw),
        None => Ok(stored_language(store).unwrap_or(DEFAULT_LANGUAGE)),
    }
}

/// Build the browser-locale stand-in described by `args`.
fn browser_locale(args: &BrowserArgs) -> FixedLocale {
    if let Some(tag) = &args.browser {
        return FixedLocale(Some(tag.clone()));
    }
    if args.no_system_locale {
        return FixedLocale(None);
    }
    FixedLocale(SysLocale.language())
}

//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. It only
//! depends on clap and the standard library because `build.rs` includes it
//! directly to render the manual page.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Language codes accepted on the command line.
const LANGUAGES: [&str; 2] = ["en", "ko"];

/// Content collections accepted by the `content` command.
const COLLECTIONS: [&str; 6] = ["pages", "links", "jobs", "talks", "posts", "projects"];

/// Locale routing for a bilingual portfolio site.
#[derive(Debug, Parser)]
#[command(name = "folio", author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of `folio.toml`.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// JSON file holding the persisted language preference.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub state: Option<PathBuf>,

    /// Enable verbose diagnostic logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Stand-in for the visitor's browser-reported language.
#[derive(Debug, Args, PartialEq, Eq, Clone, Default)]
pub struct BrowserArgs {
    /// Browser language tag (for example `ko-KR`); defaults to the system locale.
    #[arg(long, value_name = "TAG")]
    pub browser: Option<String>,

    /// Ignore the system locale when no browser tag is given.
    #[arg(long, conflicts_with = "browser")]
    pub no_system_locale: bool,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Print the language a visitor on PATH would see.
    Resolve {
        /// Current path; omit to resolve without a navigation context.
        #[arg(value_name = "PATH")]
        path: Option<String>,

        /// Browser language used when neither the path nor the store decide.
        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Persist LANG and print the path a visitor on PATH is sent to.
    Switch {
        /// Target language.
        #[arg(value_name = "LANG", value_parser = LANGUAGES)]
        language: String,

        /// Current path.
        #[arg(value_name = "PATH", default_value = "/")]
        path: String,
    },

    /// Switch to the other language and print the resulting path.
    Toggle {
        /// Current path.
        #[arg(value_name = "PATH", default_value = "/")]
        path: String,

        /// Browser language used to work out the current language.
        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Print HREF rewritten for the visitor's language.
    Link {
        /// Link target, site-relative or absolute.
        #[arg(value_name = "HREF")]
        href: String,

        /// Language to localize for; defaults to the stored preference.
        #[arg(short, long, value_name = "LANG", value_parser = LANGUAGES)]
        lang: Option<String>,

        /// Treat HREF as a navigation-bar link: only the home, writing and
        /// toy-projects targets are rewritten.
        #[arg(long)]
        nav: bool,
    },

    /// Print where a page load on PATH redirects, if anywhere.
    Redirect {
        /// Path being loaded.
        #[arg(value_name = "PATH")]
        path: String,

        /// Browser language used when the store holds no preference.
        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// List the entries of a content collection in a language.
    Content {
        /// Collection to list.
        #[arg(value_name = "COLLECTION", value_parser = COLLECTIONS)]
        collection: String,

        /// Language of the collection; defaults to the stored preference.
        #[arg(short, long, value_name = "LANG", value_parser = LANGUAGES)]
        lang: Option<String>,

        /// Root of the content tree.
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },
}

//! Localized content collections with an English fallback.
//!
//! Each kind of content lives in one collection per language, named
//! `<kind>-<code>` (for example `posts-ko`). Requests for a language whose
//! collection is missing fall back to English before giving up.

use crate::language::LanguageCode;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// The kinds of content the site publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Standalone pages.
    Pages,
    /// Social and contact links.
    Links,
    /// Work history entries.
    Jobs,
    /// Conference talks.
    Talks,
    /// Blog posts.
    Posts,
    /// Side projects.
    Projects,
}

impl Collection {
    /// Every collection kind.
    pub const ALL: [Self; 6] = [
        Self::Pages,
        Self::Links,
        Self::Jobs,
        Self::Talks,
        Self::Posts,
        Self::Projects,
    ];

    /// Directory and collection base name.
    #[must_use]
    pub const fn base(self) -> &'static str {
        match self {
            Self::Pages => "pages",
            Self::Links => "links",
            Self::Jobs => "jobs",
            Self::Talks => "talks",
            Self::Posts => "posts",
            Self::Projects => "projects",
        }
    }
}

/// Raised when a string does not name a [`Collection`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown collection '{0}'")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|collection| collection.base() == s)
            .ok_or_else(|| UnknownCollection(s.to_owned()))
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base())
    }
}

/// Name of the collection holding `collection` in `language`.
///
/// # Examples
///
/// ```
/// use folio::content::{Collection, collection_name};
/// use folio::language::LanguageCode;
///
/// assert_eq!(collection_name(Collection::Posts, LanguageCode::Ko), "posts-ko");
/// ```
#[must_use]
pub fn collection_name(collection: Collection, language: LanguageCode) -> String {
    format!("{}-{}", collection.base(), language.code())
}

/// One item of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Identifier derived from the file or directory name.
    pub id: String,
    /// Location on disk.
    pub path: PathBuf,
}

/// Errors raised while loading a collection.
#[derive(Debug, Error)]
pub enum ContentError {
    /// No collection with this name exists.
    #[error("collection '{name}' does not exist")]
    MissingCollection {
        /// Requested collection name.
        name: String,
    },
    /// The collection exists but could not be read.
    #[error("failed to read collection '{name}'")]
    Unreadable {
        /// Requested collection name.
        name: String,
        /// Underlying traversal failure.
        #[source]
        source: walkdir::Error,
    },
}

/// Backing store for content collections.
pub trait ContentSource {
    /// Load every entry of the collection called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] when the collection is missing or unreadable.
    fn load(&self, name: &str) -> Result<Vec<Entry>, ContentError>;
}

/// Collections stored as `<root>/<code>/<kind>/` directories.
///
/// Each direct child of a collection directory is one entry, whether it is a
/// single file (`links/github.yml`) or a directory holding an index file
/// (`posts/post_20250713_keycloak/index.mdx`). Names starting with `_` are
/// drafts of the layout and are skipped.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the content tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn directory_for(&self, name: &str) -> Option<PathBuf> {
        let (base, code) = name.rsplit_once('-')?;
        let language = LanguageCode::from_code(code)?;
        Some(self.root.join(language.code()).join(base))
    }
}

fn entry_id(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if name.starts_with('_') || name.starts_with('.') {
        return None;
    }
    let id = if path.is_dir() {
        name
    } else {
        path.file_stem()?.to_str()?
    };
    Some(id.to_owned())
}

impl ContentSource for DirectorySource {
    fn load(&self, name: &str) -> Result<Vec<Entry>, ContentError> {
        let missing = || ContentError::MissingCollection {
            name: name.to_owned(),
        };
        let dir = self.directory_for(name).ok_or_else(missing)?;
        if !dir.is_dir() {
            return Err(missing());
        }
        let mut entries = Vec::new();
        for item in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let dir_entry = item.map_err(|source| ContentError::Unreadable {
                name: name.to_owned(),
                source,
            })?;
            if let Some(id) = entry_id(dir_entry.path()) {
                entries.push(Entry {
                    id,
                    path: dir_entry.into_path(),
                });
            }
        }
        debug!(collection = name, count = entries.len(), "loaded collection");
        Ok(entries)
    }
}

/// Load `collection` in `language`, falling back to English.
///
/// Failures are logged rather than returned; a collection that cannot be
/// found in either language yields no entries.
#[must_use]
pub fn localized_content(
    source: &impl ContentSource,
    collection: Collection,
    language: LanguageCode,
) -> Vec<Entry> {
    let requested = collection_name(collection, language);
    let err = match source.load(&requested) {
        Ok(entries) => return entries,
        Err(err) => err,
    };
    if language.is_default() {
        error!(error = %err, collection = %requested, "failed to load content");
        return Vec::new();
    }
    warn!(error = %err, collection = %requested, "falling back to English content");
    let fallback = collection_name(collection, LanguageCode::En);
    source.load(&fallback).unwrap_or_else(|fallback_err| {
        error!(
            error = %fallback_err,
            collection = %collection,
            language = %language,
            "failed to load content in both the requested language and English"
        );
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::{Context, Result, ensure};
    use rstest::rstest;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn content_tree() -> Result<TempDir> {
        let dir = tempdir().context("create temp dir")?;
        let en_posts = dir.path().join("en/posts");
        for post in ["post_20250713_keycloak", "post_20250801_debugging", "_template"] {
            fs::create_dir_all(en_posts.join(post)).context("create post dir")?;
            fs::write(en_posts.join(post).join("index.mdx"), "---\n---\n")
                .context("write post")?;
        }
        let ko_posts = dir.path().join("ko/posts/post_20250713_keycloak");
        fs::create_dir_all(&ko_posts).context("create ko post dir")?;
        fs::write(ko_posts.join("index.mdx"), "---\n---\n").context("write ko post")?;
        let en_links = dir.path().join("en/links");
        fs::create_dir_all(&en_links).context("create links dir")?;
        fs::write(en_links.join("github.yml"), "label: GitHub\n").context("write link")?;
        Ok(dir)
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.id.as_str()).collect()
    }

    #[rstest]
    #[case(Collection::Pages, LanguageCode::En, "pages-en")]
    #[case(Collection::Projects, LanguageCode::Ko, "projects-ko")]
    fn collection_names_combine_kind_and_code(
        #[case] collection: Collection,
        #[case] language: LanguageCode,
        #[case] expected: &str,
    ) -> Result<()> {
        let name = collection_name(collection, language);
        ensure!(name == expected, "expected {expected}, got {name}");
        Ok(())
    }

    #[rstest]
    fn collections_parse_from_their_base_name() -> Result<()> {
        for collection in Collection::ALL {
            let parsed: Collection = collection.base().parse()?;
            ensure!(parsed == collection, "{collection} should parse back");
        }
        ensure!("drafts".parse::<Collection>().is_err(), "unknown kinds are rejected");
        Ok(())
    }

    #[rstest]
    fn directory_source_lists_entries_and_skips_underscored() -> Result<()> {
        let tree = content_tree()?;
        let source = DirectorySource::new(tree.path());
        let posts = source.load("posts-en")?;
        ensure!(
            ids(&posts) == ["post_20250713_keycloak", "post_20250801_debugging"],
            "unexpected entries {:?}",
            ids(&posts)
        );
        let links = source.load("links-en")?;
        ensure!(ids(&links) == ["github"], "file entries use their stem");
        Ok(())
    }

    #[rstest]
    #[case("posts-fr")]
    #[case("posts")]
    #[case("talks-en")]
    fn directory_source_reports_missing_collections(#[case] name: &str) -> Result<()> {
        let tree = content_tree()?;
        let source = DirectorySource::new(tree.path());
        let result = source.load(name);
        ensure!(
            matches!(result, Err(ContentError::MissingCollection { .. })),
            "expected {name} to be missing, got {result:?}"
        );
        Ok(())
    }

    #[rstest]
    fn localized_content_prefers_requested_language() -> Result<()> {
        let tree = content_tree()?;
        let source = DirectorySource::new(tree.path());
        let posts = localized_content(&source, Collection::Posts, LanguageCode::Ko);
        ensure!(ids(&posts) == ["post_20250713_keycloak"], "got {:?}", ids(&posts));
        Ok(())
    }

    #[rstest]
    fn localized_content_falls_back_to_english() -> Result<()> {
        let tree = content_tree()?;
        let source = DirectorySource::new(tree.path());
        let links = localized_content(&source, Collection::Links, LanguageCode::Ko);
        ensure!(ids(&links) == ["github"], "expected English fallback, got {:?}", ids(&links));
        Ok(())
    }

    #[rstest]
    #[case(LanguageCode::En)]
    #[case(LanguageCode::Ko)]
    fn localized_content_is_empty_when_nothing_exists(#[case] language: LanguageCode) -> Result<()> {
        let tree = content_tree()?;
        let source = DirectorySource::new(tree.path());
        let talks = localized_content(&source, Collection::Talks, language);
        ensure!(talks.is_empty(), "expected no talks, got {:?}", ids(&talks));
        Ok(())
    }
}

//! Path-based language detection and rewriting.
//!
//! Paths are treated as opaque strings. Three shapes are understood:
//!
//! - the root, `/` for the default language or `/<code>` otherwise;
//! - blog paths under [`BLOG_PREFIX`], which carry a `ko` marker segment
//!   directly after the prefix (`/writing/ko/<slug>`);
//! - any other page, which carries a trailing `/<code>` segment.
//!
//! Every function here is pure, so callers supply the current path rather
//! than this module reaching for it.

use crate::language::LanguageCode;
use tracing::debug;

/// Prefix shared by every blog path.
pub const BLOG_PREFIX: &str = "/writing";

/// Marker segment inserted after [`BLOG_PREFIX`] for Korean posts.
const BLOG_MARKER: LanguageCode = LanguageCode::Ko;

/// Drop a single trailing slash, leaving the root untouched.
fn trim_trailing_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some("") | None => path,
        Some(trimmed) => trimmed,
    }
}

/// Return the remainder after [`BLOG_PREFIX`] when `path` is a blog path.
///
/// The prefix must end on a segment boundary, so `/writings` is not a blog
/// path.
fn blog_remainder(path: &str) -> Option<&str> {
    path.strip_prefix(BLOG_PREFIX)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Return the part of a blog remainder that follows the Korean marker.
fn after_blog_marker(rest: &str) -> Option<&str> {
    rest.strip_prefix('/')
        .and_then(|tail| tail.strip_prefix(BLOG_MARKER.code()))
        .filter(|tail| tail.is_empty() || tail.starts_with('/'))
}

/// Return the path without its trailing `/<code>` segment for `lang`.
fn strip_segment(path: &str, lang: LanguageCode) -> Option<&str> {
    path.strip_suffix(lang.code())
        .and_then(|head| head.strip_suffix('/'))
}

/// Remove any recognized trailing language segment.
fn strip_language_suffix(path: &str) -> &str {
    LanguageCode::ALL
        .into_iter()
        .find_map(|lang| strip_segment(path, lang))
        .unwrap_or(path)
}

/// Detect the language encoded in `path`.
///
/// Rules are evaluated in order and the first match wins:
///
/// 1. a blog path with the Korean marker is Korean;
/// 2. a path ending in `/ko` is Korean;
/// 3. a path ending in `/en` is English;
/// 4. any other blog path is English;
/// 5. otherwise the path carries no language.
///
/// # Examples
///
/// ```
/// use folio::language::LanguageCode;
/// use folio::routing::resolve_from_path;
///
/// assert_eq!(resolve_from_path("/writing/ko/hello"), Some(LanguageCode::Ko));
/// assert_eq!(resolve_from_path("/writing/hello"), Some(LanguageCode::En));
/// assert_eq!(resolve_from_path("/about/ko"), Some(LanguageCode::Ko));
/// assert_eq!(resolve_from_path("/about"), None);
/// ```
#[must_use]
pub fn resolve_from_path(path: &str) -> Option<LanguageCode> {
    let trimmed = trim_trailing_slash(path);
    let blog = blog_remainder(trimmed);
    if blog.and_then(after_blog_marker).is_some() {
        return Some(LanguageCode::Ko);
    }
    if strip_segment(trimmed, LanguageCode::Ko).is_some() {
        return Some(LanguageCode::Ko);
    }
    if strip_segment(trimmed, LanguageCode::En).is_some() {
        return Some(LanguageCode::En);
    }
    blog.map(|_| LanguageCode::En)
}

/// Compute the path a visitor on `path` should see in `target`.
///
/// Blog paths gain or lose the marker segment after [`BLOG_PREFIX`]. Other
/// paths lose any language suffix and gain the one for `target`, except that
/// the root in the default language stays `/`.
///
/// # Examples
///
/// ```
/// use folio::language::LanguageCode;
/// use folio::routing::build_path_for_language;
///
/// assert_eq!(build_path_for_language("/", LanguageCode::Ko), "/ko");
/// assert_eq!(build_path_for_language("/ko", LanguageCode::En), "/");
/// assert_eq!(
///     build_path_for_language("/writing/post_1", LanguageCode::Ko),
///     "/writing/ko/post_1",
/// );
/// ```
#[must_use]
pub fn build_path_for_language(path: &str, target: LanguageCode) -> String {
    let built = match blog_remainder(path) {
        Some(rest) => rewrite_blog_path(path, rest, target),
        None => rewrite_page_path(path, target),
    };
    debug!(from = path, to = %built, language = %target, "rewrote path");
    built
}

fn rewrite_blog_path(path: &str, rest: &str, target: LanguageCode) -> String {
    match (after_blog_marker(rest), target) {
        (Some(_), LanguageCode::Ko) => path.to_owned(),
        (None, LanguageCode::Ko) => {
            format!("{BLOG_PREFIX}/{}{rest}", BLOG_MARKER.code())
        }
        (Some(tail), LanguageCode::En) => format!("{BLOG_PREFIX}{tail}"),
        (None, LanguageCode::En) => path.to_owned(),
    }
}

fn rewrite_page_path(path: &str, target: LanguageCode) -> String {
    let base = strip_language_suffix(trim_trailing_slash(path));
    if base.is_empty() || base == "/" {
        if target.is_default() {
            return String::from("/");
        }
        return format!("/{}", target.code());
    }
    format!("{base}/{}", target.code())
}

/// Decide whether a page load should be redirected to the preferred language.
///
/// `preferred` is the language the visitor ends up with (see
/// [`crate::preference::resolve_preferred`]). Only paths without language
/// evidence are redirected, and only towards a non-default language, so the
/// URL and the document agree on the language after load. Blog paths always
/// resolve, so they never redirect.
///
/// # Examples
///
/// ```
/// use folio::language::LanguageCode;
/// use folio::routing::redirect_on_load;
///
/// assert_eq!(
///     redirect_on_load("/toy-projects", LanguageCode::Ko),
///     Some("/toy-projects/ko".to_owned()),
/// );
/// assert_eq!(redirect_on_load("/toy-projects", LanguageCode::En), None);
/// assert_eq!(redirect_on_load("/writing/post_1", LanguageCode::Ko), None);
/// ```
#[must_use]
pub fn redirect_on_load(path: &str, preferred: LanguageCode) -> Option<String> {
    if resolve_from_path(path).is_some() || preferred.is_default() {
        return None;
    }
    Some(build_path_for_language(path, preferred))
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::{Result, ensure};
    use rstest::rstest;

    #[rstest]
    #[case("/writing/ko/hello", Some(LanguageCode::Ko))]
    #[case("/writing/ko", Some(LanguageCode::Ko))]
    #[case("/writing/hello", Some(LanguageCode::En))]
    #[case("/writing", Some(LanguageCode::En))]
    #[case("/writing/", Some(LanguageCode::En))]
    #[case("/about/ko", Some(LanguageCode::Ko))]
    #[case("/about/en", Some(LanguageCode::En))]
    #[case("/about/ko/", Some(LanguageCode::Ko))]
    #[case("/ko", Some(LanguageCode::Ko))]
    #[case("/en", Some(LanguageCode::En))]
    #[case("/about", None)]
    #[case("/", None)]
    #[case("", None)]
    #[case("/writings/hello", None)]
    #[case("/tokyo", None)]
    #[case("/writing/korea", Some(LanguageCode::En))]
    fn resolve_from_path_follows_rule_order(
        #[case] path: &str,
        #[case] expected: Option<LanguageCode>,
    ) -> Result<()> {
        let resolved = resolve_from_path(path);
        ensure!(
            resolved == expected,
            "expected {path:?} to resolve to {expected:?}, got {resolved:?}"
        );
        Ok(())
    }

    #[rstest]
    #[case("/", LanguageCode::Ko, "/ko")]
    #[case("/", LanguageCode::En, "/")]
    #[case("/ko", LanguageCode::En, "/")]
    #[case("/ko", LanguageCode::Ko, "/ko")]
    #[case("/en", LanguageCode::Ko, "/ko")]
    #[case("", LanguageCode::Ko, "/ko")]
    #[case("/about", LanguageCode::Ko, "/about/ko")]
    #[case("/about", LanguageCode::En, "/about/en")]
    #[case("/about/ko", LanguageCode::En, "/about/en")]
    #[case("/about/en", LanguageCode::Ko, "/about/ko")]
    #[case("/about/", LanguageCode::Ko, "/about/ko")]
    #[case("/toy-projects/ko", LanguageCode::Ko, "/toy-projects/ko")]
    #[case("/writing/post_1", LanguageCode::Ko, "/writing/ko/post_1")]
    #[case("/writing/ko/post_1", LanguageCode::Ko, "/writing/ko/post_1")]
    #[case("/writing/ko/post_1", LanguageCode::En, "/writing/post_1")]
    #[case("/writing/post_1", LanguageCode::En, "/writing/post_1")]
    #[case("/writing", LanguageCode::Ko, "/writing/ko")]
    #[case("/writing/ko", LanguageCode::En, "/writing")]
    #[case("/writing/korea", LanguageCode::Ko, "/writing/ko/korea")]
    fn build_path_for_language_rewrites_known_shapes(
        #[case] path: &str,
        #[case] target: LanguageCode,
        #[case] expected: &str,
    ) -> Result<()> {
        let built = build_path_for_language(path, target);
        ensure!(
            built == expected,
            "expected {path:?} in {target} to be {expected:?}, got {built:?}"
        );
        Ok(())
    }

    #[rstest]
    fn blog_switch_restores_original_path() -> Result<()> {
        let korean = build_path_for_language("/writing/post_1", LanguageCode::Ko);
        let english = build_path_for_language(&korean, LanguageCode::En);
        ensure!(english == "/writing/post_1", "expected round trip, got {english}");
        Ok(())
    }

    #[rstest]
    #[case("/")]
    #[case("/about")]
    #[case("/about/ko")]
    #[case("/writing/post_1")]
    #[case("/writing/ko/post_1")]
    fn built_paths_resolve_to_their_language(#[case] path: &str) -> Result<()> {
        for lang in LanguageCode::ALL {
            let built = build_path_for_language(path, lang);
            let resolved = resolve_from_path(&built).unwrap_or(crate::language::DEFAULT_LANGUAGE);
            ensure!(
                resolved == lang,
                "{path:?} rewritten for {lang} became {built:?}, which resolves to {resolved}"
            );
        }
        Ok(())
    }

    #[rstest]
    #[case("/", LanguageCode::Ko, Some("/ko"))]
    #[case("/about", LanguageCode::Ko, Some("/about/ko"))]
    #[case("/about", LanguageCode::En, None)]
    #[case("/about/ko", LanguageCode::Ko, None)]
    #[case("/about/en", LanguageCode::Ko, None)]
    #[case("/writing/post_1", LanguageCode::Ko, None)]
    fn redirect_on_load_only_targets_unmarked_paths(
        #[case] path: &str,
        #[case] preferred: LanguageCode,
        #[case] expected: Option<&str>,
    ) -> Result<()> {
        let redirect = redirect_on_load(path, preferred);
        ensure!(
            redirect.as_deref() == expected,
            "expected {path:?} with {preferred} to redirect to {expected:?}, got {redirect:?}"
        );
        Ok(())
    }
}

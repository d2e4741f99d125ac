//! Language-aware rewriting of navigation links.
//!
//! Links inside the site keep the visitor in their language: an English
//! visitor follows hrefs unchanged, a Korean visitor is sent to the Korean
//! variant of the target. Links to other origins are never touched.

use crate::language::LanguageCode;
use crate::routing::{BLOG_PREFIX, build_path_for_language};
use tracing::debug;
use url::Url;

/// Paths whose navigation links are rewritten on click.
pub const NAV_TARGETS: [&str; 3] = ["/", BLOG_PREFIX, "/toy-projects"];

/// Return `true` when `href` points at one of the [`NAV_TARGETS`].
///
/// Absolute URLs are matched on their path; query and fragment are ignored.
///
/// # Examples
///
/// ```
/// use folio::links::is_language_aware_target;
///
/// assert!(is_language_aware_target("/writing"));
/// assert!(is_language_aware_target("https://www.jee-eun-k.dev/toy-projects"));
/// assert!(!is_language_aware_target("/writing/post_1"));
/// ```
#[must_use]
pub fn is_language_aware_target(href: &str) -> bool {
    split_href(href, None).is_some_and(|parts| NAV_TARGETS.contains(&parts.path.as_str()))
}

/// Components of an href that points into the site.
#[derive(Debug)]
struct SiteHref {
    /// Origin to keep when the href was absolute.
    origin: Option<String>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl SiteHref {
    fn from_url(url: &Url) -> Self {
        Self {
            origin: Some(url.origin().ascii_serialization()),
            path: url.path().to_owned(),
            query: url.query().map(ToOwned::to_owned),
            fragment: url.fragment().map(ToOwned::to_owned),
        }
    }

    /// Split a site-relative href at its first `?` and `#`, keeping the
    /// path exactly as written.
    fn from_relative(href: &str) -> Self {
        let (rest, fragment) = href
            .split_once('#')
            .map_or((href, None), |(before, after)| (before, Some(after.to_owned())));
        let (path, query) = rest
            .split_once('?')
            .map_or((rest, None), |(before, after)| (before, Some(after.to_owned())));
        Self {
            origin: None,
            path: path.to_owned(),
            query,
            fragment,
        }
    }

    fn render(&self, path: &str) -> String {
        let mut out = self.origin.clone().unwrap_or_default();
        out.push_str(path);
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

/// Split `href` into site components, or `None` when it leaves the site.
///
/// With no `site`, every absolute URL is accepted so that its path can be
/// inspected.
fn split_href(href: &str, site: Option<&Url>) -> Option<SiteHref> {
    if href.starts_with('/') && !href.starts_with("//") {
        return Some(SiteHref::from_relative(href));
    }
    let url = Url::parse(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    match site {
        Some(origin) if origin.origin() != url.origin() => None,
        _ => Some(SiteHref::from_url(&url)),
    }
}

/// Rewrite `href` so that following it keeps the visitor in `language`.
///
/// Default-language visitors get `href` back unchanged, as do hrefs that
/// leave the site. When `site` is given, absolute URLs on that origin are
/// rewritten too; otherwise only site-relative hrefs are.
///
/// # Examples
///
/// ```
/// use folio::language::LanguageCode;
/// use folio::links::localize_link;
///
/// assert_eq!(localize_link("/", LanguageCode::Ko, None), "/ko");
/// assert_eq!(localize_link("/writing", LanguageCode::Ko, None), "/writing/ko");
/// assert_eq!(localize_link("/about", LanguageCode::En, None), "/about");
/// assert_eq!(
///     localize_link("https://github.com/jee-eun-k", LanguageCode::Ko, None),
///     "https://github.com/jee-eun-k",
/// );
/// ```
#[must_use]
pub fn localize_link(href: &str, language: LanguageCode, site: Option<&Url>) -> String {
    if language.is_default() {
        return href.to_owned();
    }
    let parts = if href.starts_with('/') {
        split_href(href, site)
    } else {
        site.and_then(|origin| split_href(href, Some(origin)))
    };
    let Some(site_href) = parts else {
        debug!(href, "leaving external link unchanged");
        return href.to_owned();
    };
    let rewritten = site_href.render(&build_path_for_language(&site_href.path, language));
    debug!(href, to = %rewritten, %language, "localized link");
    rewritten
}

//! Content extraction from GitHub repository pages.
//!
//! DESIGN
//! ======
//! Pure reads over a parsed document: classify the page location, resolve a
//! description and README text through ordered fallback selector lists, and
//! normalize into a [`ContentBundle`]. `extract` returns `None` when the
//! page is not a repository page at all — distinct from a matched page that
//! yields no text, which is signaled by an all-empty bundle.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

/// Path first-segments that are never repository owners.
const RESERVED_SEGMENTS: [&str; 5] = ["orgs", "teams", "search", "settings", "explore"];

/// Description fallbacks, tried in order after the `og:description` meta tag.
const DESCRIPTION_SELECTORS: [&str; 3] = [
    r##"[data-pjax="#repo-content-pjax-container"] p"##,
    ".f4.mb-3",
    r#"[itemprop="description"]"#,
];

/// README containers, tried in order. First non-empty text wins.
const README_SELECTORS: [&str; 4] = [
    "#readme .markdown-body",
    "#readme article.markdown-body",
    "article.markdown-body.entry-content",
    r#"[data-target="readme-toc"]"#,
];

static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:description"]"#).expect("static selector"));

static DESCRIPTION_FALLBACKS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    DESCRIPTION_SELECTORS.iter().map(|s| Selector::parse(s).expect("static selector")).collect()
});

static README_FALLBACKS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| README_SELECTORS.iter().map(|s| Selector::parse(s).expect("static selector")).collect());

// =============================================================================
// CONTENT BUNDLE
// =============================================================================

/// Normalized text extracted from one repository page.
///
/// Immutable once produced; the session holds it for the lifetime of one
/// page visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBundle {
    /// Full page URL the bundle was extracted from.
    pub url: String,
    /// Repository owner (first path segment).
    pub owner: String,
    /// Repository name (second path segment).
    pub repo: String,
    /// Human-readable description; empty when the page has none.
    pub description: String,
    /// Flattened README text; falls back to the description when the README
    /// is empty so downstream never sees an all-empty bundle if any text
    /// exists.
    pub readme_text: String,
}

impl ContentBundle {
    /// `owner/repo` identifier.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// True when the page matched but yielded no usable text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.readme_text.is_empty()
    }

    /// Build the project-content block sent to the generation host.
    #[must_use]
    pub fn prompt_content(&self) -> String {
        let mut parts = vec![format!("Repository: {}", self.name()), format!("URL: {}", self.url), String::new()];
        if !self.description.is_empty() {
            parts.push("Description:".into());
            parts.push(self.description.clone());
            parts.push(String::new());
        }
        if !self.readme_text.is_empty() {
            parts.push("README / Project content:".into());
            parts.push("---".into());
            parts.push(self.readme_text.clone());
        }
        parts.join("\n")
    }
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// Extract a [`ContentBundle`] from a repository page.
///
/// Returns `None` when the URL path does not identify a repository root page
/// (fewer than two segments, or a reserved first segment). A matched page
/// with no readable text returns an all-empty bundle instead.
#[must_use]
pub fn extract(html: &str, url: &Url) -> Option<ContentBundle> {
    let (owner, repo) = repo_from_path(url.path())?;
    let owner = owner.to_string();
    let repo = repo.to_string();

    let document = Html::parse_document(html);

    let mut description = document
        .select(&META_DESCRIPTION)
        .find_map(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .unwrap_or_default();
    if description.is_empty() {
        description = first_non_empty_text(&document, &DESCRIPTION_FALLBACKS);
    }

    let mut readme_text = first_non_empty_text(&document, &README_FALLBACKS);
    if readme_text.is_empty() && !description.is_empty() {
        readme_text = description.clone();
    }

    Some(ContentBundle { url: url.to_string(), owner, repo, description, readme_text })
}

/// Classify a URL path as a repository page: at least two non-empty
/// segments, first segment not reserved.
fn repo_from_path(path: &str) -> Option<(&str, &str)> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    if RESERVED_SEGMENTS.contains(&owner) {
        return None;
    }
    Some((owner, repo))
}

/// First non-empty flattened text across an ordered selector list.
fn first_non_empty_text(document: &Html, selectors: &[Selector]) -> String {
    for selector in selectors {
        for el in document.select(selector) {
            let text = flatten_text(&el.text().collect::<Vec<_>>().concat());
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// Collapse whitespace runs to single spaces and trim.
fn flatten_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// PAGE SOURCE
// =============================================================================

/// The page collaborator the session probes. Selectors are queried once per
/// probe; no other assumptions about document stability.
pub trait PageSource: Send + Sync {
    /// Run extraction against the current page.
    fn probe(&self) -> Option<ContentBundle>;
}

/// A captured page: URL plus raw HTML.
pub struct HtmlPage {
    url: Url,
    html: String,
}

impl HtmlPage {
    #[must_use]
    pub fn new(url: Url, html: String) -> Self {
        Self { url, html }
    }
}

impl PageSource for HtmlPage {
    fn probe(&self) -> Option<ContentBundle> {
        extract(&self.html, &self.url)
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;

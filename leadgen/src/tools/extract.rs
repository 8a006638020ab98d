//! Best-effort field extraction from company web pages.
//!
//! A [`FieldExtractor`] turns raw HTML into [`ExtractedFields`]. Extraction never fails:
//! a field that cannot be found is reported as [`NOT_FOUND_TEXT`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Placeholder for a field the page does not expose.
pub const NOT_FOUND_TEXT: &str = "Not found";

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title regex"));
static H2_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h2[^>]*>(.*?)</h2>").expect("h2 regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex"));
static META_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<meta\s[^>]*>").expect("meta regex"));
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)([a-z_:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("attribute regex")
});
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Fields pulled from one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub company_name: String,
    pub company_mission: String,
}

impl ExtractedFields {
    fn from_options(company_name: Option<String>, company_mission: Option<String>) -> Self {
        Self {
            company_name: company_name.unwrap_or_else(|| NOT_FOUND_TEXT.to_string()),
            company_mission: company_mission.unwrap_or_else(|| NOT_FOUND_TEXT.to_string()),
        }
    }
}

/// Strategy that reads company fields out of an HTML document.
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, html: &str) -> ExtractedFields;
}

/// Company name from `<title>`, mission from the first `<h2>` mentioning "mission".
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingFieldExtractor;

impl FieldExtractor for HeadingFieldExtractor {
    fn extract(&self, html: &str) -> ExtractedFields {
        let mission = H2_RE
            .captures_iter(html)
            .filter_map(|c| c.get(1).map(|m| clean_text(m.as_str())))
            .find(|text| text.to_lowercase().contains("mission"));
        ExtractedFields::from_options(title(html), mission)
    }
}

/// Company name from `og:site_name` (falling back to `<title>`), mission from the
/// `description` / `og:description` meta tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaFieldExtractor;

impl FieldExtractor for MetaFieldExtractor {
    fn extract(&self, html: &str) -> ExtractedFields {
        let name = meta_content(html, "og:site_name").or_else(|| title(html));
        let mission =
            meta_content(html, "description").or_else(|| meta_content(html, "og:description"));
        ExtractedFields::from_options(name, mission)
    }
}

fn title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|t| !t.is_empty())
}

/// Content of the first `<meta>` whose `name` or `property` equals `key`.
fn meta_content(html: &str, key: &str) -> Option<String> {
    META_RE.find_iter(html).find_map(|tag| {
        let mut matches_key = false;
        let mut content = None;
        for attr in ATTR_RE.captures_iter(tag.as_str()) {
            let name = attr.get(1).map(|m| m.as_str().to_ascii_lowercase());
            let value = attr.get(2).or_else(|| attr.get(3)).map(|m| m.as_str());
            match (name.as_deref(), value) {
                (Some("name") | Some("property"), Some(v)) if v.eq_ignore_ascii_case(key) => {
                    matches_key = true
                }
                (Some("content"), Some(v)) => content = Some(clean_text(v)),
                _ => {}
            }
        }
        if matches_key {
            content.filter(|c| !c.is_empty())
        } else {
            None
        }
    })
}

/// Strips tags, decodes the common entities and collapses whitespace.
fn clean_text(fragment: &str) -> String {
    let without_tags = TAG_RE.replace_all(fragment, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&");
    WS_RE.replace_all(decoded.trim(), " ").into_owned()
}

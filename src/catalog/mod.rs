//! Source catalog: the ordered set of sources for an aggregation run
//!
//! Two kinds of sources exist: user-managed subscriptions persisted in
//! the store, and the compiled-in table of free endpoints (several of
//! them URL-templated by the current date). The catalog resolves both
//! into plain [`Source`] records and validates URLs before any network
//! call happens.

pub mod builtin;
pub mod template;

use chrono::{Local, NaiveDate, Utc};
use url::Url;

use crate::config::TemplateTimezone;
use crate::fetcher::FetchError;
use crate::models::Subscription;

pub use builtin::{BuiltinSource, BUILTIN_SOURCES};

/// One resolved source, ready to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Subscription id (user sources) or built-in id
    pub id: String,

    /// Label used in notifications
    pub label: String,

    /// Resolved URL (templates already expanded)
    pub url: String,

    /// Whether this source came from the compiled-in table
    pub built_in: bool,
}

impl Source {
    /// Build from a persisted user subscription
    pub fn from_subscription(sub: &Subscription) -> Self {
        Self {
            id: sub.id.clone(),
            label: sub.remarks.clone(),
            url: sub.url.clone(),
            built_in: false,
        }
    }

    /// Build from a built-in table entry, expanding date tokens
    pub fn from_builtin(entry: &BuiltinSource, date: NaiveDate) -> Self {
        Self {
            id: entry.id.to_string(),
            label: entry.label.to_string(),
            url: template::expand(entry.url_template, date),
            built_in: true,
        }
    }
}

/// Produces the ordered sequence of sources for a run
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    timezone: TemplateTimezone,
}

impl SourceCatalog {
    pub fn new(timezone: TemplateTimezone) -> Self {
        Self { timezone }
    }

    /// Current calendar day in the configured template timezone
    pub fn today(&self) -> NaiveDate {
        match self.timezone {
            TemplateTimezone::Local => Local::now().date_naive(),
            TemplateTimezone::Utc => Utc::now().date_naive(),
        }
    }

    /// User subscriptions filtered to enabled entries with a non-empty
    /// url and remarks, in the order given.
    pub fn user_sources(&self, subscriptions: &[Subscription]) -> Vec<Source> {
        subscriptions
            .iter()
            .filter(|s| s.enabled && !s.url.is_empty() && !s.remarks.is_empty())
            .map(Source::from_subscription)
            .collect()
    }

    /// The full built-in list with templates resolved against today
    pub fn builtin_sources(&self) -> Vec<Source> {
        self.builtin_sources_for_date(self.today())
    }

    /// The full built-in list resolved against an explicit date
    pub fn builtin_sources_for_date(&self, date: NaiveDate) -> Vec<Source> {
        BUILTIN_SOURCES
            .iter()
            .map(|entry| Source::from_builtin(entry, date))
            .collect()
    }

    /// A single built-in source by id, resolved against today
    pub fn builtin_source(&self, id: &str) -> Option<Source> {
        builtin::find(id).map(|entry| Source::from_builtin(entry, self.today()))
    }
}

impl Default for SourceCatalog {
    fn default() -> Self {
        Self::new(TemplateTimezone::default())
    }
}

/// Well-formedness check run before any fetch.
///
/// Parsing through the `url` crate also normalizes internationalized
/// domain names to their ASCII (punycode) form, so the returned string
/// is safe to hand to the HTTP client directly.
pub fn validate_url(raw: &str) -> Result<String, FetchError> {
    let parsed = Url::parse(raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "{raw}: unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none() {
        return Err(FetchError::InvalidUrl(format!("{raw}: missing host")));
    }

    Ok(parsed.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sub(remarks: &str, url: &str, enabled: bool) -> Subscription {
        Subscription {
            enabled,
            ..Subscription::new(remarks, url)
        }
    }

    #[test]
    fn test_user_sources_filtering() {
        let catalog = SourceCatalog::default();
        let subs = vec![
            sub("active", "https://example.com/a", true),
            sub("disabled", "https://example.com/b", false),
            sub("", "https://example.com/c", true),
            sub("no-url", "", true),
        ];

        let sources = catalog.user_sources(&subs);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].label, "active");
        assert!(!sources[0].built_in);
    }

    #[test]
    fn test_builtin_sources_resolved() {
        let catalog = SourceCatalog::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let sources = catalog.builtin_sources_for_date(date);

        assert_eq!(sources.len(), BUILTIN_SOURCES.len());
        assert!(sources.iter().all(|s| s.built_in));
        assert!(sources.iter().all(|s| !s.url.contains('{')));

        let freenode = sources.iter().find(|s| s.id == "freenode-me").unwrap();
        assert_eq!(
            freenode.url,
            "https://freenode.me/wp-content/uploads/2024/03/0305.txt"
        );

        let nodefree = sources.iter().find(|s| s.id == "nodefree").unwrap();
        assert_eq!(nodefree.url, "https://nodefree.org/dy/2024/03/20240305.txt");
    }

    #[test]
    fn test_builtin_source_by_id() {
        let catalog = SourceCatalog::default();
        assert!(catalog.builtin_source("freefq").is_some());
        assert!(catalog.builtin_source("unknown").is_none());
    }

    #[test]
    fn test_validate_url_accepts_http_https() {
        assert!(validate_url("https://example.com/sub").is_ok());
        assert!(validate_url("http://example.com/sub").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_malformed() {
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("ftp://example.com/sub").is_err());
        assert!(validate_url("vmess://abcdef").is_err());
    }

    #[test]
    fn test_validate_url_normalizes_idn() {
        let normalized = validate_url("https://bücher.example/sub").unwrap();
        assert!(normalized.starts_with("https://xn--bcher-kva.example/"));
    }
}

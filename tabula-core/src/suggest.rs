//! Autocomplete suggestions for the search bar.
//!
//! Combines a matched command's static suggestions with results from a remote
//! autocomplete service, capped to the configured limit. The remote service
//! sits behind the [`SuggestionSource`] trait so the engine can be tested
//! without a network.
//!
//! Concurrency note: there is no cancellation of in-flight requests. Each
//! fetch is stamped with a monotonically increasing sequence token; a remote
//! response whose token is no longer the latest is discarded wholesale. The
//! input controller additionally compares the batch's originating
//! [`QueryIdentity`] against a re-resolution of the live input before
//! rendering. Out-of-order responses can therefore never overwrite
//! suggestions for a newer keystroke.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::SuggestError;
use crate::query::{QueryDescriptor, QueryIdentity};
use crate::registry::CommandRegistry;

/// Request timeout for the remote autocomplete call. A suggestion that
/// arrives slower than this is worthless anyway.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Byte range of the substring matching the active search term, for
/// highlight rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub len: usize,
}

/// One rendered suggestion line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionItem {
    /// The literal suggestion text, already prefixed where applicable.
    pub text: String,
    /// First case-insensitive occurrence of the search term within `text`.
    /// `None` means the line renders without a highlight.
    pub matched: Option<MatchSpan>,
}

impl SuggestionItem {
    /// Build an item, locating the search term within the text.
    pub fn new(text: String, search: &str) -> Self {
        let matched = find_case_insensitive(&text, search);
        Self { text, matched }
    }
}

/// A completed suggestion fetch, tagged with its correlation data.
#[derive(Debug, Clone)]
pub struct SuggestionBatch {
    /// Sequence token stamped when the fetch started.
    pub token: u64,
    /// Identity of the query that initiated the fetch.
    pub identity: QueryIdentity,
    pub items: Vec<SuggestionItem>,
}

/// Remote autocomplete service boundary.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Fetch completion phrases for a search term. Implementations filter
    /// out any phrase equal (case-insensitively) to the term itself.
    async fn complete(&self, search: &str) -> Result<Vec<String>, SuggestError>;
}

/// DuckDuckGo's public autocomplete endpoint.
pub struct DuckDuckGoSource {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct PhraseEntry {
    phrase: String,
}

impl DuckDuckGoSource {
    pub fn new() -> Self {
        Self::with_endpoint("https://duckduckgo.com/ac/")
    }

    /// Point the source at a different autocomplete endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Default for DuckDuckGoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SuggestionSource for DuckDuckGoSource {
    async fn complete(&self, search: &str) -> Result<Vec<String>, SuggestError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", search), ("type", "json")])
            .send()
            .await
            .map_err(|e| SuggestError::Request {
                message: e.to_string(),
            })?;

        let entries: Vec<PhraseEntry> =
            response.json().await.map_err(|e| SuggestError::Payload {
                message: e.to_string(),
            })?;

        Ok(entries
            .into_iter()
            .map(|entry| entry.phrase)
            .filter(|phrase| !phrase.eq_ignore_ascii_case(search))
            .collect())
    }
}

/// Fixed-phrase source for tests and offline use.
pub struct StaticSource {
    phrases: Vec<String>,
    delay: Duration,
}

impl StaticSource {
    pub fn new(phrases: Vec<String>) -> Self {
        Self {
            phrases,
            delay: Duration::ZERO,
        }
    }

    /// Delay every response, to exercise the staleness guard.
    pub fn with_delay(phrases: Vec<String>, delay: Duration) -> Self {
        Self { phrases, delay }
    }
}

#[async_trait]
impl SuggestionSource for StaticSource {
    async fn complete(&self, search: &str) -> Result<Vec<String>, SuggestError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self
            .phrases
            .iter()
            .filter(|phrase| !phrase.eq_ignore_ascii_case(search))
            .cloned()
            .collect())
    }
}

/// Produces ordered, length-capped suggestion batches for resolved queries.
pub struct SuggestionEngine {
    source: Arc<dyn SuggestionSource>,
    registry: Arc<CommandRegistry>,
    seq: AtomicU64,
}

impl SuggestionEngine {
    pub fn new(source: Arc<dyn SuggestionSource>, registry: Arc<CommandRegistry>) -> Self {
        Self {
            source,
            registry,
            seq: AtomicU64::new(0),
        }
    }

    /// Whether `token` still belongs to the most recently started fetch.
    pub fn is_current(&self, token: u64) -> bool {
        self.seq.load(Ordering::SeqCst) == token
    }

    /// Fetch suggestions for a resolved query.
    ///
    /// Static suggestions of the matched command come first, verbatim (the
    /// registry stores them as full input lines). Remote results follow when
    /// the query carries a non-empty search term and the static seed falls
    /// short of `limit`; they are prefixed with `key + split_by` when the
    /// query used a delimiter, so activating one re-enters the same command.
    /// Remote failures degrade to the static seed alone.
    pub async fn fetch(&self, descriptor: &QueryDescriptor, limit: usize) -> SuggestionBatch {
        let token = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let identity = descriptor.identity();

        let mut texts: Vec<String> = Vec::new();
        if let Some(command) = descriptor.key().and_then(|k| self.registry.lookup(k)) {
            texts.extend(command.suggestions.iter().cloned());
        }

        let search = descriptor.search_term().unwrap_or("");
        if !search.is_empty() && texts.len() < limit {
            match self.source.complete(search).await {
                Ok(phrases) => {
                    if self.is_current(token) {
                        let prefix = match (descriptor.key(), descriptor.split_by()) {
                            (Some(key), Some(split_by)) => Some(format!("{key}{split_by}")),
                            _ => None,
                        };
                        texts.extend(phrases.into_iter().map(|phrase| match &prefix {
                            Some(prefix) => format!("{prefix}{phrase}"),
                            None => phrase,
                        }));
                    } else {
                        tracing::debug!(token, "discarding stale autocomplete response");
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "autocomplete fetch failed, keeping static suggestions");
                }
            }
        }

        texts.truncate(limit);
        let items = texts
            .into_iter()
            .map(|text| SuggestionItem::new(text, search))
            .collect();

        SuggestionBatch {
            token,
            identity,
            items,
        }
    }
}

/// First case-insensitive occurrence of `needle` in `haystack`, as byte
/// offsets into `haystack`. Empty needles never match.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<MatchSpan> {
    if needle.is_empty() {
        return None;
    }
    for (start, _) in haystack.char_indices() {
        if let Some(len) = caseless_prefix_len(&haystack[start..], needle) {
            return Some(MatchSpan { start, len });
        }
    }
    None
}

/// If `haystack` starts with `needle` ignoring case, the byte length of that
/// prefix in `haystack`.
fn caseless_prefix_len(haystack: &str, needle: &str) -> Option<usize> {
    let mut hay = haystack.char_indices();
    let mut matched = 0;
    for nc in needle.chars() {
        let (i, hc) = hay.next()?;
        if !hc.to_lowercase().eq(nc.to_lowercase()) {
            return None;
        }
        matched = i + hc.len_utf8();
    }
    Some(matched)
}

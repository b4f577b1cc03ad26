//! Query resolution for the search bar.
//!
//! [`Resolver::resolve`] classifies raw input text into a
//! [`QueryDescriptor`]: a direct URL, a registered command (bare, aliased,
//! searching, or path-extended), or a default web search. Resolution is pure,
//! total, and deterministic; every input string (including empty) maps to
//! exactly one variant, so there is no error path here at all.
//!
//! Precedence is strict and load-bearing: an exact registered key outranks
//! URL-shape detection, which outranks delimiter splitting, which outranks
//! the default-search fallback.

use std::sync::Arc;
use url::Url;

use crate::config::TabulaConfig;
use crate::registry::CommandRegistry;

/// Recursion bound for alias resolution. The registry is validated acyclic at
/// load time; this guard only bounds the damage of a future validation bug.
const MAX_ALIAS_DEPTH: usize = 16;

/// The classified result of resolving raw search-bar text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryDescriptor {
    /// Input was empty after trimming.
    Empty,
    /// Input looked like a URL; `url` carries a scheme either way.
    DirectUrl { url: String },
    /// Input was exactly a registered key with no alias.
    Command { key: String, url: String },
    /// Input was exactly a registered key whose descriptor aliases another
    /// command; `resolved` is the re-resolution through that alias.
    CommandAlias {
        key: String,
        resolved: Box<QueryDescriptor>,
    },
    /// `<key><search delimiter><term>` against a search-capable command.
    CommandSearch {
        key: String,
        search: String,
        split_by: String,
        url: String,
    },
    /// `<key><path delimiter><path>` against any registered command.
    CommandPath {
        key: String,
        path: String,
        split_by: String,
        url: String,
    },
    /// Anything else: the whole input as a default-engine search.
    DefaultSearch { search: String, url: String },
}

impl QueryDescriptor {
    /// The resolved navigation target. `None` only for `Empty`.
    pub fn url(&self) -> Option<&str> {
        match self {
            QueryDescriptor::Empty => None,
            QueryDescriptor::DirectUrl { url }
            | QueryDescriptor::Command { url, .. }
            | QueryDescriptor::CommandSearch { url, .. }
            | QueryDescriptor::CommandPath { url, .. }
            | QueryDescriptor::DefaultSearch { url, .. } => Some(url),
            QueryDescriptor::CommandAlias { resolved, .. } => resolved.url(),
        }
    }

    /// The matched registry key, if any. Aliases report the key the user
    /// actually typed, not the target's.
    pub fn key(&self) -> Option<&str> {
        match self {
            QueryDescriptor::Command { key, .. }
            | QueryDescriptor::CommandAlias { key, .. }
            | QueryDescriptor::CommandSearch { key, .. }
            | QueryDescriptor::CommandPath { key, .. } => Some(key),
            _ => None,
        }
    }

    /// The active search term, if this query carries one.
    pub fn search_term(&self) -> Option<&str> {
        match self {
            QueryDescriptor::CommandSearch { search, .. }
            | QueryDescriptor::DefaultSearch { search, .. } => Some(search),
            QueryDescriptor::CommandAlias { resolved, .. } => resolved.search_term(),
            _ => None,
        }
    }

    /// The delimiter that separated key from argument, when one was used.
    pub fn split_by(&self) -> Option<&str> {
        match self {
            QueryDescriptor::CommandSearch { split_by, .. }
            | QueryDescriptor::CommandPath { split_by, .. } => Some(split_by),
            _ => None,
        }
    }

    /// Correlation identity for the staleness guard: kind, matched key, and
    /// argument text. Two descriptors with equal identity would fetch the
    /// same suggestions; an in-flight response is discarded when the live
    /// input's identity no longer matches the one that started it.
    pub fn identity(&self) -> QueryIdentity {
        match self {
            QueryDescriptor::Empty => QueryIdentity::new("empty", None, None),
            QueryDescriptor::DirectUrl { url } => {
                QueryIdentity::new("url", None, Some(url.clone()))
            }
            QueryDescriptor::Command { key, .. } => {
                QueryIdentity::new("command", Some(key.clone()), None)
            }
            QueryDescriptor::CommandAlias { resolved, .. } => resolved.identity(),
            QueryDescriptor::CommandSearch { key, search, .. } => {
                QueryIdentity::new("search", Some(key.clone()), Some(search.clone()))
            }
            QueryDescriptor::CommandPath { key, path, .. } => {
                QueryIdentity::new("path", Some(key.clone()), Some(path.clone()))
            }
            QueryDescriptor::DefaultSearch { search, .. } => {
                QueryIdentity::new("default", None, Some(search.clone()))
            }
        }
    }
}

/// Comparable identity of a resolved query, used to detect stale suggestion
/// responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryIdentity {
    kind: &'static str,
    key: Option<String>,
    text: Option<String>,
}

impl QueryIdentity {
    fn new(kind: &'static str, key: Option<String>, text: Option<String>) -> Self {
        Self { kind, key, text }
    }
}

/// Pure query resolver over an immutable registry and configuration.
#[derive(Clone)]
pub struct Resolver {
    config: Arc<TabulaConfig>,
    registry: Arc<CommandRegistry>,
}

impl Resolver {
    pub fn new(config: Arc<TabulaConfig>, registry: Arc<CommandRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Classify raw input text. See the module docs for precedence.
    pub fn resolve(&self, raw: &str) -> QueryDescriptor {
        self.resolve_depth(raw, 0)
    }

    fn resolve_depth(&self, raw: &str, depth: usize) -> QueryDescriptor {
        let query = raw.trim();
        if query.is_empty() {
            return QueryDescriptor::Empty;
        }

        // An exact registered key wins over URL-shape detection. "fm.example"
        // could be both; the registry owner's intent takes precedence.
        if let Some(descriptor) = self.registry.lookup(query) {
            if let Some(target) = &descriptor.alias {
                if depth >= MAX_ALIAS_DEPTH {
                    tracing::warn!(key = %query, "alias depth bound hit during resolution");
                    return QueryDescriptor::Empty;
                }
                return QueryDescriptor::CommandAlias {
                    key: query.to_string(),
                    resolved: Box::new(self.resolve_depth(target, depth + 1)),
                };
            }
            if let Some(url) = &descriptor.url {
                return QueryDescriptor::Command {
                    key: query.to_string(),
                    url: url.clone(),
                };
            }
        }

        if is_url_shaped(query) {
            let url = if has_protocol(query) {
                query.to_string()
            } else {
                format!("https://{query}")
            };
            return QueryDescriptor::DirectUrl { url };
        }

        let search_delim = &self.config.command_search_delimiter;
        if let Some((head, rest)) = query.split_once(search_delim.as_str()) {
            if let Some(descriptor) = self.registry.lookup(head) {
                // Only search-capable commands match here; a command without
                // a template has no search mode and falls through.
                if let (Some(template), Some(base)) =
                    (&descriptor.search_template, &descriptor.url)
                {
                    let search = rest.trim().to_string();
                    let url = format_search_url(base, template, &search);
                    return QueryDescriptor::CommandSearch {
                        key: head.to_string(),
                        search,
                        split_by: search_delim.clone(),
                        url,
                    };
                }
            }
        }

        let path_delim = &self.config.command_path_delimiter;
        if let Some((head, rest)) = query.split_once(path_delim.as_str()) {
            if let Some(descriptor) = self.registry.lookup(head) {
                if let Some(base) = &descriptor.url {
                    let (origin, _) = split_url(base);
                    return QueryDescriptor::CommandPath {
                        key: head.to_string(),
                        path: rest.to_string(),
                        split_by: path_delim.clone(),
                        url: format!("{origin}/{rest}"),
                    };
                }
            }
        }

        let (origin, template) = split_url(&self.config.default_search_template);
        let url = format_search_url(&origin, &template, query);
        QueryDescriptor::DefaultSearch {
            search: query.to_string(),
            url,
        }
    }
}

/// Whether `s` starts with any `scheme://` prefix.
fn has_protocol(s: &str) -> bool {
    match s.find("://") {
        Some(i) => i > 0 && s[..i].chars().all(|c| c.is_ascii_alphabetic()),
        None => false,
    }
}

/// URL-shape test: optional http(s) scheme, a dotted host of `[\w-]` labels,
/// an optional trailing dot, optional `:port`, optional path with no
/// whitespace. Deliberately narrow; single-label hosts like `localhost` do
/// not pass.
fn is_url_shaped(s: &str) -> bool {
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return false;
    }

    let lower = s.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);

    let host_port = match rest.find('/') {
        Some(i) if i == 0 => return false,
        Some(i) => &rest[..i],
        None => rest,
    };

    let (host, port) = match host_port.rsplit_once(':') {
        Some((h, p)) => (h, Some(p)),
        None => (host_port, None),
    };
    if let Some(port) = port {
        if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }

    let host = host.strip_suffix('.').unwrap_or(host);
    let mut labels = 0;
    for label in host.split('.') {
        if label.is_empty()
            || !label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return false;
        }
        labels += 1;
    }
    labels >= 2
}

/// Split a URL into (origin without port, path-and-query). Falls back to the
/// whole string as origin when it does not parse, which keeps resolution
/// total even for malformed registry entries.
fn split_url(raw: &str) -> (String, String) {
    match Url::parse(raw) {
        Ok(parsed) => {
            let origin = match parsed.host_str() {
                Some(host) => format!("{}://{host}", parsed.scheme()),
                None => return (raw.to_string(), String::new()),
            };
            let mut rest = parsed.path().to_string();
            if let Some(q) = parsed.query() {
                rest.push('?');
                rest.push_str(q);
            }
            (origin, rest)
        }
        Err(_) => (raw.to_string(), String::new()),
    }
}

/// Substitute the percent-encoded search term into every `{}` of the
/// template and append it to the base URL's origin.
fn format_search_url(base: &str, template: &str, search: &str) -> String {
    let (origin, _) = split_url(base);
    let encoded = urlencoding::encode(search);
    let path = template.replace("{}", &encoded);
    format!("{origin}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{default_commands, CommandDescriptor};
    use pretty_assertions::assert_eq;

    fn resolver() -> Resolver {
        resolver_with(default_commands())
    }

    fn resolver_with(commands: Vec<CommandDescriptor>) -> Resolver {
        let config = Arc::new(TabulaConfig::default());
        let registry = Arc::new(CommandRegistry::new(commands).unwrap());
        Resolver::new(config, registry)
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(resolver().resolve(""), QueryDescriptor::Empty);
        assert_eq!(resolver().resolve("   "), QueryDescriptor::Empty);
    }

    #[test]
    fn test_bare_command() {
        let descriptor = resolver().resolve("g");
        assert_eq!(
            descriptor,
            QueryDescriptor::Command {
                key: "g".into(),
                url: "https://github.com".into(),
            }
        );
    }

    #[test]
    fn test_bare_command_trims_whitespace() {
        assert_eq!(resolver().resolve("  g  ").key(), Some("g"));
    }

    #[test]
    fn test_command_search() {
        let descriptor = resolver().resolve("y search_query");
        assert_eq!(
            descriptor,
            QueryDescriptor::CommandSearch {
                key: "y".into(),
                search: "search_query".into(),
                split_by: " ".into(),
                url: "https://youtube.com/results?search_query=search_query".into(),
            }
        );
    }

    #[test]
    fn test_command_search_encodes_term() {
        let descriptor = resolver().resolve("y lofi beats");
        assert_eq!(
            descriptor.url(),
            Some("https://youtube.com/results?search_query=lofi%20beats")
        );
    }

    #[test]
    fn test_command_search_port_template() {
        // The localhost command rewrites the port through its template.
        let descriptor = resolver().resolve("0 54323");
        assert_eq!(descriptor.url(), Some("http://localhost:54323"));
    }

    #[test]
    fn test_command_without_template_is_not_searchable() {
        // "g" has no search template, so "g hello" is a default search.
        let descriptor = resolver().resolve("g hello");
        assert!(matches!(descriptor, QueryDescriptor::DefaultSearch { .. }));
    }

    #[test]
    fn test_command_path() {
        let descriptor = resolver().resolve("r/rust");
        assert_eq!(
            descriptor,
            QueryDescriptor::CommandPath {
                key: "r".into(),
                path: "rust".into(),
                split_by: "/".into(),
                url: "https://reddit.com/rust".into(),
            }
        );
    }

    #[test]
    fn test_command_path_splits_on_first_delimiter_only() {
        let descriptor = resolver().resolve("r/r/rust");
        assert_eq!(descriptor.url(), Some("https://reddit.com/r/rust"));
    }

    #[test]
    fn test_direct_url_without_scheme() {
        let descriptor = resolver().resolve("github.com");
        assert_eq!(
            descriptor,
            QueryDescriptor::DirectUrl {
                url: "https://github.com".into(),
            }
        );
    }

    #[test]
    fn test_direct_url_with_scheme_kept() {
        let descriptor = resolver().resolve("http://example.com/a/b?c=d");
        assert_eq!(descriptor.url(), Some("http://example.com/a/b?c=d"));
    }

    #[test]
    fn test_direct_url_with_port() {
        let descriptor = resolver().resolve("example.com:8080/health");
        assert_eq!(descriptor.url(), Some("https://example.com:8080/health"));
    }

    #[test]
    fn test_default_search_percent_encodes() {
        let descriptor = resolver().resolve("hello world");
        assert_eq!(
            descriptor,
            QueryDescriptor::DefaultSearch {
                search: "hello world".into(),
                url: "https://duckduckgo.com/?q=hello%20world".into(),
            }
        );
    }

    #[test]
    fn test_exact_key_outranks_url_shape() {
        // A key that is also URL-shaped must resolve as a command.
        let mut commands = default_commands();
        commands.push(CommandDescriptor {
            key: "news.ycombinator.com".into(),
            name: Some("HN front page".into()),
            url: Some("https://news.ycombinator.com/front".into()),
            search_template: None,
            suggestions: Vec::new(),
            alias: None,
        });
        let descriptor = resolver_with(commands).resolve("news.ycombinator.com");
        assert_eq!(
            descriptor.url(),
            Some("https://news.ycombinator.com/front")
        );
        assert!(matches!(descriptor, QueryDescriptor::Command { .. }));
    }

    #[test]
    fn test_alias_resolves_recursively() {
        let mut commands = default_commands();
        commands.push(CommandDescriptor {
            key: "gh".into(),
            name: None,
            url: None,
            search_template: None,
            suggestions: Vec::new(),
            alias: Some("g".into()),
        });
        let descriptor = resolver_with(commands).resolve("gh");
        match descriptor {
            QueryDescriptor::CommandAlias { ref key, ref resolved } => {
                assert_eq!(key, "gh");
                assert_eq!(resolved.url(), Some("https://github.com"));
            }
            other => panic!("expected alias, got {other:?}"),
        }
    }

    #[test]
    fn test_alias_identity_matches_target() {
        let mut commands = default_commands();
        commands.push(CommandDescriptor {
            key: "gh".into(),
            name: None,
            url: None,
            search_template: None,
            suggestions: Vec::new(),
            alias: Some("g".into()),
        });
        let resolver = resolver_with(commands);
        assert_eq!(
            resolver.resolve("gh").identity(),
            resolver.resolve("g").identity()
        );
    }

    #[test]
    fn test_resolution_is_total() {
        let resolver = resolver();
        for input in [
            "", " ", "g", "y cats", "r/rust", "github.com", "what is rust",
            "///", "  :  ", "y", "0 8080", "\t\n",
        ] {
            let descriptor = resolver.resolve(input);
            if !matches!(descriptor, QueryDescriptor::Empty) {
                let url = descriptor.url().expect("non-empty query must carry a url");
                assert!(!url.is_empty());
            }
        }
    }

    #[test]
    fn test_direct_url_round_trip_is_stable() {
        let resolver = resolver();
        let first = resolver.resolve("example.com/path?x=1");
        let url = first.url().unwrap().to_string();
        let second = resolver.resolve(&url);
        assert_eq!(second, QueryDescriptor::DirectUrl { url });
    }

    #[test]
    fn test_is_url_shaped() {
        assert!(is_url_shaped("example.com"));
        assert!(is_url_shaped("example.com."));
        assert!(is_url_shaped("sub.example-site.com:3000/a/b"));
        assert!(is_url_shaped("https://example.com"));
        assert!(is_url_shaped("HTTP://EXAMPLE.COM"));
        assert!(!is_url_shaped("localhost"));
        assert!(!is_url_shaped("hello world"));
        assert!(!is_url_shaped("example"));
        assert!(!is_url_shaped("example.com:port"));
        assert!(!is_url_shaped(".com"));
        assert!(!is_url_shaped(""));
    }

    #[test]
    fn test_has_protocol() {
        assert!(has_protocol("https://example.com"));
        assert!(has_protocol("ftp://example.com"));
        assert!(!has_protocol("example.com"));
        assert!(!has_protocol("://example.com"));
    }

    #[test]
    fn test_split_url_drops_port_from_origin() {
        let (origin, rest) = split_url("http://localhost:3000");
        assert_eq!(origin, "http://localhost");
        assert_eq!(rest, "/");
    }

    #[test]
    fn test_split_url_keeps_query() {
        let (origin, rest) = split_url("https://duckduckgo.com/?q={}");
        assert_eq!(origin, "https://duckduckgo.com");
        assert_eq!(rest, "/?q={}");
    }

    #[test]
    fn test_format_search_url_replaces_all_placeholders() {
        let url = format_search_url("https://example.com", "/s?a={}&b={}", "x y");
        assert_eq!(url, "https://example.com/s?a=x%20y&b=x%20y");
    }
}

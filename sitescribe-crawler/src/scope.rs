use crate::config::{PathMatch, SeedConfig, authority};
use url::Url;

/// Decides whether a discovered URL belongs to the site being crawled.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    host: String,
    base_path: String,
    path_match: PathMatch,
}

impl ScopeFilter {
    pub fn new(config: &SeedConfig) -> Self {
        Self {
            host: config.origin_host().to_string(),
            base_path: config.base_path().to_string(),
            path_match: config.path_match(),
        }
    }

    pub fn is_in_scope(&self, candidate: &str) -> bool {
        self.admit(candidate).is_some()
    }

    /// Parses `candidate` and returns it only if it is in scope.
    pub fn admit(&self, candidate: &str) -> Option<Url> {
        let url = Url::parse(candidate).ok()?;

        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        if authority(&url)? != self.host {
            return None;
        }

        if !self.path_matches(url.path()) {
            return None;
        }

        Some(url)
    }

    fn path_matches(&self, path: &str) -> bool {
        if self.base_path.is_empty() {
            return true;
        }
        match self.path_match {
            PathMatch::Prefix => path.starts_with(&self.base_path),
            PathMatch::Segment => path
                .strip_prefix(&self.base_path)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

use reqwest::Url;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

static SIGNATURE_BASE: OnceLock<Url> = OnceLock::new();

/// Exact request identity: path plus form-encoded query parameters sorted by
/// name. Encoding keeps `&` and `=` inside values from forging extra pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestSignature(String);

impl RequestSignature {
    pub fn new(path: &str, query: &[(String, String)]) -> Self {
        let mut params: Vec<&(String, String)> = query.iter().collect();
        params.sort();
        if params.is_empty() {
            return Self(path.to_string());
        }
        let mut url = SIGNATURE_BASE
            .get_or_init(|| Url::parse("http://signature.invalid/").unwrap())
            .clone();
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Self(format!("{path}?{}", url.query().unwrap_or_default()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Memoised response bodies. Entries live as long as the cache.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<RequestSignature, Value>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, sig: &RequestSignature) -> Option<Value> {
        let found = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(sig)
            .cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn insert(&self, sig: RequestSignature, body: Value) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(sig, body);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn signature_ignores_param_order() {
        let a = RequestSignature::new("/search.json", &q(&[("q", "dune"), ("page", "1")]));
        let b = RequestSignature::new("/search.json", &q(&[("page", "1"), ("q", "dune")]));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "/search.json?page=1&q=dune");
        assert_eq!(RequestSignature::new("/x", &[]).as_str(), "/x");
    }

    #[test]
    fn separators_inside_values_do_not_collide() {
        let smuggled = RequestSignature::new("/search.json", &q(&[("a", "1&z=2")]));
        let split = RequestSignature::new("/search.json", &q(&[("a", "1"), ("z", "2")]));
        assert_ne!(smuggled, split);
        assert_eq!(smuggled.as_str(), "/search.json?a=1%26z%3D2");
        assert_eq!(split.as_str(), "/search.json?a=1&z=2");
    }

    #[test]
    fn counts_hits_and_misses() {
        let cache = ResponseCache::new();
        let sig = RequestSignature::new("/characters", &[]);
        assert!(cache.get(&sig).is_none());
        cache.insert(sig.clone(), serde_json::json!(["amber"]));
        assert!(cache.get(&sig).is_some());
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);
    }
}

// Response cache for successful GET requests. Entries expire after a TTL and the
// cache holds a bounded number of entries, least recently used evicted first.
use crate::config::CacheConfig;
use crate::credentials::Credential;
use crate::metrics_defs::{RESPONSE_CACHE_HIT, RESPONSE_CACHE_MISS};
use crate::request::RequestDescriptor;
use moka::sync::Cache;
use serde_json::Value;
use shared::counter;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

#[derive(Clone)]
pub struct ResponseCache {
    cache: Cache<String, Value>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        ResponseCache { cache }
    }

    /// Deterministic key for a resolved URL, the request options and the identity
    /// the request is sent as. Tokens enter the key only as a hash.
    pub fn key(url: &str, request: &RequestDescriptor, credential: &Credential) -> String {
        let mut headers: Vec<(&str, &[u8])> = request
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_bytes()))
            .collect();
        headers.sort();

        let mut key = format!("{} {url}", request.method);
        for (name, value) in headers {
            key.push(' ');
            key.push_str(name);
            key.push('=');
            key.push_str(&String::from_utf8_lossy(value));
        }
        if let Some(body) = &request.body {
            key.push(' ');
            key.push_str(&body.to_string());
        }
        if credential.token.is_some() || credential.user_id.is_some() {
            let mut hasher = DefaultHasher::new();
            credential.token.hash(&mut hasher);
            credential.user_id.hash(&mut hasher);
            key.push_str(&format!(" as={:016x}", hasher.finish()));
        }
        key
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let value = self.cache.get(key);
        let metric_def = if value.is_some() {
            RESPONSE_CACHE_HIT
        } else {
            RESPONSE_CACHE_MISS
        };
        counter!(metric_def).increment(1);
        value
    }

    pub fn set(&self, key: String, value: Value) {
        self.cache.insert(key, value);
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
        tracing::debug!("response cache cleared");
    }

    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue};
    use serde_json::json;

    fn cache(ttl_secs: u64, max_capacity: u64) -> ResponseCache {
        ResponseCache::new(&CacheConfig {
            ttl_secs,
            max_capacity,
        })
    }

    #[test]
    fn set_get_clear() {
        let cache = cache(60, 10);
        assert_eq!(cache.get("k"), None);

        cache.set("k".into(), json!({"courses": []}));
        assert_eq!(cache.get("k"), Some(json!({"courses": []})));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn entries_expire() {
        let cache = cache(1, 10);
        cache.set("k".into(), json!(1));
        std::thread::sleep(Duration::from_millis(1100));
        assert_eq!(cache.get("k"), None);
    }

    fn key(url: &str, request: &RequestDescriptor) -> String {
        ResponseCache::key(url, request, &Credential::default())
    }

    #[test]
    fn keys_are_deterministic() {
        let url = "http://localhost:8080/api/v1/learning/courses";
        let a = RequestDescriptor::get("/courses")
            .with_header(HeaderName::from_static("x-b"), HeaderValue::from_static("2"))
            .with_header(HeaderName::from_static("x-a"), HeaderValue::from_static("1"));
        let b = RequestDescriptor::get("/courses")
            .with_header(HeaderName::from_static("x-a"), HeaderValue::from_static("1"))
            .with_header(HeaderName::from_static("x-b"), HeaderValue::from_static("2"));
        assert_eq!(key(url, &a), key(url, &b));

        let other_url = "http://localhost:8080/api/v1/learning/courses/1";
        assert_ne!(key(url, &a), key(other_url, &a));

        let with_header = RequestDescriptor::get("/courses")
            .with_header(HeaderName::from_static("x-a"), HeaderValue::from_static("other"));
        assert_ne!(
            key(url, &with_header),
            key(url, &RequestDescriptor::get("/courses"))
        );
    }

    #[test]
    fn keys_depend_on_identity() {
        let url = "http://localhost:8080/api/v1/auth/profile";
        let request = RequestDescriptor::get("/profile");
        let as_user = |token: &str, user_id: &str| {
            ResponseCache::key(
                url,
                &request,
                &Credential {
                    token: Some(token.into()),
                    user_id: Some(user_id.into()),
                },
            )
        };

        assert_eq!(as_user("tok-a", "u1"), as_user("tok-a", "u1"));
        assert_ne!(as_user("tok-a", "u1"), as_user("tok-b", "u1"));
        assert_ne!(as_user("tok-a", "u1"), as_user("tok-a", "u2"));
        assert_ne!(as_user("tok-a", "u1"), key(url, &request));
        assert!(!as_user("secret-token", "u1").contains("secret-token"));
    }
}

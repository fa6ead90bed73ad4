use crate::config::CredentialKeys;
use std::collections::HashMap;

/// Read-only key/value store holding authentication state.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credential {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

impl Credential {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Looks up the current credential. Token keys are tried in order and the first
/// non-empty value wins. Missing keys are not an error.
pub fn current_credential(store: &dyn CredentialStore, keys: &CredentialKeys) -> Credential {
    let token = keys
        .token_keys
        .iter()
        .find_map(|key| store.get(key).filter(|value| !value.is_empty()));
    let user_id = store
        .get(&keys.user_id_key)
        .filter(|value| !value.is_empty());

    Credential { token, user_id }
}

/// Cookie header style store: `name=value; other=value`.
#[derive(Clone, Debug, Default)]
pub struct CookieJar {
    cookies: HashMap<String, String>,
}

impl CookieJar {
    pub fn parse(header: &str) -> Self {
        let mut cookies = HashMap::new();
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            // First occurrence wins, like a browser cookie lookup
            cookies
                .entry(name.to_string())
                .or_insert_with(|| value.trim().to_string());
        }
        CookieJar { cookies }
    }
}

impl CredentialStore for CookieJar {
    fn get(&self, key: &str) -> Option<String> {
        self.cookies.get(key).cloned()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

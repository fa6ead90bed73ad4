use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde_json::Value;

/// A single logical API call. Built fresh by the caller for every request.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the service base URL, e.g. `/courses/42`
    pub path: String,
    pub body: Option<Value>,
    /// Extra headers. They override the client's defaults.
    pub headers: HeaderMap,
    /// Bypass the response cache and refetch
    pub skip_cache: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        RequestDescriptor {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
            skip_cache: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn skip_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }

    /// Body to send, if any. Bodyless methods never carry one.
    /// True if a path segment is `.` or `..`, literally or percent-encoded.
    /// URL normalization would collapse such a segment and change the endpoint.
    pub fn has_dot_segment(&self) -> bool {
        let path = self.path.split(['?', '#']).next().unwrap_or_default();
        path.split('/').any(|segment| {
            let segment = segment.to_ascii_lowercase().replace("%2e", ".");
            segment == "." || segment == ".."
        })
    }

    pub fn payload(&self) -> Option<&Value> {
        if is_bodyless(&self.method) {
            None
        } else {
            self.body.as_ref()
        }
    }
}

impl Default for RequestDescriptor {
    fn default() -> Self {
        RequestDescriptor::get("")
    }
}

pub fn is_bodyless(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

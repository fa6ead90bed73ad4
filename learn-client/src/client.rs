use crate::cache::ResponseCache;
use crate::config::{CacheConfig, Config, CredentialKeys, Environment, ValidationError};
use crate::cost::{CostModel, LinearCost};
use crate::credentials::{Credential, CredentialStore, MemoryStore, current_credential};
use crate::errors::{ClientError, Result, TransportCause};
use crate::footprint::{MetricsAggregator, MetricsSummary, Sample};
use crate::metrics_defs::{
    API_REQUEST, API_REQUEST_CARBON, API_REQUEST_DURATION, API_REQUEST_FAILURE,
    API_RESPONSE_BYTES,
};
use crate::request::RequestDescriptor;
use crate::resolver::{EndpointResolver, join};
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use serde_json::Value;
use shared::{counter, histogram};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout};

const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// Builds an [`ApiClient`] from configuration plus injected collaborators.
pub struct ClientBuilder {
    config: Config,
    credentials: Arc<dyn CredentialStore>,
    cost_model: Arc<dyn CostModel>,
}

impl ClientBuilder {
    pub fn new(config: Config) -> Self {
        ClientBuilder {
            config,
            credentials: Arc::new(MemoryStore::new()),
            cost_model: Arc::new(LinearCost::default()),
        }
    }

    pub fn credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = store;
        self
    }

    pub fn cost_model(mut self, model: Arc<dyn CostModel>) -> Self {
        self.cost_model = model;
        self
    }

    pub fn build(self) -> Result<ApiClient, ValidationError> {
        self.config.validate()?;

        let environment = self.config.environment();
        let diagnostic_headers = self.config.diagnostic_header_map()?;

        let resolver = EndpointResolver::new(
            self.config.endpoints,
            environment,
            self.config.feature_flags,
        );

        tracing::info!(
            environment = environment.as_str(),
            services = ?resolver.services(),
            "API client initialized"
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http: reqwest::Client::new(),
                resolver,
                credentials: self.credentials,
                credential_keys: self.config.credentials,
                diagnostic_headers,
                cost_model: self.cost_model,
                metrics: MetricsAggregator::new(self.config.recent_samples),
                timeout: Duration::from_secs(self.config.timeout_secs),
            }),
        })
    }
}

struct ClientInner {
    http: reqwest::Client,
    resolver: EndpointResolver,
    credentials: Arc<dyn CredentialStore>,
    credential_keys: CredentialKeys,
    diagnostic_headers: HeaderMap,
    cost_model: Arc<dyn CostModel>,
    metrics: MetricsAggregator,
    timeout: Duration,
}

/// Client for the AgenticLearn backend. Cheap to clone; clones share the
/// connection pool and the metrics totals.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    pub fn builder(config: Config) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    pub fn environment(&self) -> Environment {
        self.inner.resolver.environment()
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.inner.resolver
    }

    /// Running totals of every measured request.
    pub fn carbon_footprint(&self) -> MetricsSummary {
        self.inner.metrics.summary()
    }

    pub fn recent_samples(&self) -> Vec<Sample> {
        self.inner.metrics.recent()
    }

    pub fn credential(&self) -> Credential {
        current_credential(self.inner.credentials.as_ref(), &self.inner.credential_keys)
    }

    /// Full URL for a path on a service.
    pub fn url_for(&self, service: &str, path: &str) -> Result<String> {
        self.inner
            .resolver
            .resolve(service)
            .map(|base| join(base, path))
            .ok_or_else(|| ClientError::Config {
                service: service.to_string(),
            })
    }

    /// Sends one request to a service and returns the parsed JSON body.
    ///
    /// Every attempt that reaches the network is recorded as a sample, whether the
    /// status was a success or not. Transport, timeout and decode failures are
    /// also counted in `failures`.
    pub async fn execute(&self, service: &str, request: RequestDescriptor) -> Result<Value> {
        let start = Instant::now();
        if request.has_dot_segment() {
            tracing::warn!(service, path = %request.path, "dot segment in request path, request not sent");
            return Err(ClientError::InvalidPath { path: request.path });
        }

        let url = match self.url_for(service, &request.path) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(service, "no base URL for service, request not sent");
                return Err(e);
            }
        };

        let credential = self.credential();
        let headers = self.headers(&credential, &request.headers);

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), &url)
            .headers(headers);
        if let Some(body) = request.payload() {
            builder = builder.body(body.to_string());
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        // The deadline covers connecting, sending and reading the whole body.
        let (status, body) = match timeout(self.inner.timeout, exchange).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                return Err(self.transport_failure(service, url, start, TransportCause::Http(e)));
            }
            Err(_) => {
                let cause = TransportCause::Timeout(self.inner.timeout);
                return Err(self.transport_failure(service, url, start, cause));
            }
        };

        let duration = start.elapsed();
        let duration_ms = duration.as_secs_f64() * 1000.0;
        let response_bytes = body.len() as u64;
        let cost = self.inner.cost_model.cost(duration_ms, response_bytes);
        let sample = Sample {
            endpoint: url.clone(),
            duration,
            response_bytes,
            cost,
            status: Some(status.as_u16()),
        };

        let parsed = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            match serde_json::from_slice::<Value>(&body) {
                Ok(value) => value,
                Err(source) => {
                    self.inner.metrics.record_failure(sample);
                    counter!(API_REQUEST_FAILURE, "service" => service.to_string(), "reason" => "decode")
                        .increment(1);
                    tracing::warn!(%url, status = status.as_u16(), "response body is not valid JSON");
                    return Err(ClientError::Decode { url, source });
                }
            }
        };

        self.inner.metrics.record(sample);
        counter!(API_REQUEST, "service" => service.to_string(), "status" => status.as_u16().to_string())
            .increment(1);
        histogram!(API_REQUEST_DURATION, "service" => service.to_string()).record(duration_ms);
        histogram!(API_RESPONSE_BYTES, "service" => service.to_string()).record(response_bytes as f64);
        histogram!(API_REQUEST_CARBON, "service" => service.to_string()).record(cost);

        tracing::debug!(
            %url,
            status = status.as_u16(),
            duration_ms,
            carbon_g = cost,
            "API request completed"
        );

        if !status.is_success() {
            let message = error_message(&parsed, status);
            tracing::warn!(%url, status = status.as_u16(), error = %message, "API request failed");
            return Err(ClientError::Request {
                status: status.as_u16(),
                message,
            });
        }

        Ok(parsed)
    }

    /// Failed attempts are measured with no response bytes, no status and no cost.
    fn transport_failure(
        &self,
        service: &str,
        url: String,
        start: Instant,
        cause: TransportCause,
    ) -> ClientError {
        self.inner.metrics.record_failure(Sample {
            endpoint: url.clone(),
            duration: start.elapsed(),
            response_bytes: 0,
            cost: 0.0,
            status: None,
        });
        let reason = match cause {
            TransportCause::Timeout(_) => "timeout",
            TransportCause::Http(_) => "transport",
        };
        counter!(API_REQUEST_FAILURE, "service" => service.to_string(), "reason" => reason)
            .increment(1);
        tracing::warn!(%url, error = %cause, "API request could not complete");
        ClientError::Transport { url, cause }
    }

    /// Defaults first, then caller headers replacing any default of the same name.
    fn headers(&self, credential: &Credential, extra: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &credential.token {
            match HeaderValue::try_from(format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("stored token is not a valid header value, sending unauthenticated"),
            }
        }
        if let Some(value) = credential
            .user_id
            .as_deref()
            .and_then(|user_id| HeaderValue::try_from(user_id).ok())
        {
            headers.insert(USER_ID_HEADER, value);
        }

        for (name, value) in &self.inner.diagnostic_headers {
            headers.insert(name.clone(), value.clone());
        }

        for name in extra.keys() {
            headers.remove(name);
        }
        for (name, value) in extra {
            headers.append(name.clone(), value.clone());
        }

        headers
    }
}

/// Prefers the body's `message` (or `error`) string over a generic status line.
fn error_message(body: &Value, status: StatusCode) -> String {
    ["message", "error"]
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .filter(|message| !message.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Pipeline decorated with a response cache. Only successful GET responses are
/// cached; everything else goes straight through. Entries are keyed by the
/// credential in effect, so a changed token or user never sees another's body.
#[derive(Clone)]
pub struct CachedClient {
    client: ApiClient,
    cache: ResponseCache,
}

impl CachedClient {
    pub fn new(client: ApiClient, config: &CacheConfig) -> Self {
        CachedClient {
            client,
            cache: ResponseCache::new(config),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub async fn execute(&self, service: &str, request: RequestDescriptor) -> Result<Value> {
        if request.method != Method::GET {
            return self.client.execute(service, request).await;
        }

        let url = self.client.url_for(service, &request.path)?;
        let key = ResponseCache::key(&url, &request, &self.client.credential());

        if !request.skip_cache
            && let Some(value) = self.cache.get(&key)
        {
            tracing::debug!(%url, "response cache hit");
            return Ok(value);
        }

        let value = self.client.execute(service, request).await?;
        self.cache.set(key, value.clone());
        Ok(value)
    }
}

use crate::config::{Config, Environment};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use url::Url;

/// A request as the mock backend received it.
#[derive(Clone, Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: http::HeaderMap,
    pub body: Bytes,
}

pub struct MockResponse {
    status: u16,
    body: String,
    delay: Duration,
}

impl MockResponse {
    pub fn json(status: u16, body: &str) -> Self {
        MockResponse {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = dyn Fn(&CapturedRequest) -> MockResponse + Send + Sync;

/// HTTP backend on an ephemeral local port that records every request.
pub struct MockBackend {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockBackend {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&CapturedRequest) -> MockResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().unwrap();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let respond: Arc<Responder> = Arc::new(respond);

        let captured = requests.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);
                let respond = respond.clone();
                let captured = captured.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        handle(req, respond.clone(), captured.clone())
                    });
                    if let Err(err) = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                        .serve_connection(io, service)
                        .await
                    {
                        eprintln!("Error serving connection: {:?}", err);
                    }
                });
            }
        });

        MockBackend { addr, requests }
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).unwrap()
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

async fn handle(
    req: Request<Incoming>,
    respond: Arc<Responder>,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = body
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_else(|_| Bytes::new());

    let request = CapturedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        headers: parts.headers,
        body,
    };
    let response = respond(&request);
    captured.lock().push(request);

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    let mut res = Response::new(Full::new(Bytes::from(response.body)));
    *res.status_mut() = http::StatusCode::from_u16(response.status).unwrap();
    res.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    Ok(res)
}

/// Development config with every service under `<base>/api/<service>`.
pub fn test_config(base: &Url) -> Config {
    let services = ["auth", "content", "assessment", "personalization", "admin"];
    let table: IndexMap<String, Url> = services
        .iter()
        .map(|service| {
            let url = base.join(&format!("api/{service}")).unwrap();
            (service.to_string(), url)
        })
        .collect();

    let mut config = Config {
        environment: Some(Environment::Development),
        timeout_secs: 5,
        ..Default::default()
    };
    config.endpoints.development = table;
    config
}

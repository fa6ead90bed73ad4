use crate::config::{Endpoints, Environment, FeatureFlags};
use url::Url;

/// Maps logical service names to base URLs for one environment.
#[derive(Clone, Debug)]
pub struct EndpointResolver {
    endpoints: Endpoints,
    environment: Environment,
    flags: FeatureFlags,
}

impl EndpointResolver {
    pub fn new(endpoints: Endpoints, environment: Environment, flags: FeatureFlags) -> Self {
        EndpointResolver {
            endpoints,
            environment,
            flags,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Base URL for a service in the active environment.
    pub fn resolve(&self, service: &str) -> Option<&Url> {
        resolve(&self.endpoints, service, self.environment, &self.flags)
    }

    /// Health probe URL for a service.
    pub fn health_url(&self, service: &str) -> Option<String> {
        self.resolve(service)
            .map(|base| join(base, "/health"))
    }

    /// Service names that resolve in the active environment, in configuration order.
    pub fn services(&self) -> Vec<&str> {
        let mut names: Vec<&str> = match self.environment {
            Environment::Development => self
                .endpoints
                .development
                .keys()
                .map(String::as_str)
                .collect(),
            Environment::Production => self
                .endpoints
                .production
                .keys()
                .chain(self.endpoints.fallback.keys())
                .map(String::as_str)
                .collect(),
        };

        let mut seen = std::collections::HashSet::new();
        names.retain(|name| seen.insert(*name) && self.resolve(name).is_some());
        names
    }
}

/// Development always uses the local table. Production uses the primary table
/// when the service's flag is on and the legacy table otherwise. A flagged service
/// missing from the primary table falls back to the legacy table.
pub fn resolve<'a>(
    endpoints: &'a Endpoints,
    service: &str,
    environment: Environment,
    flags: &FeatureFlags,
) -> Option<&'a Url> {
    match environment {
        Environment::Development => endpoints.development.get(service),
        Environment::Production if flags.is_enabled(service) => endpoints
            .production
            .get(service)
            .or_else(|| endpoints.fallback.get(service)),
        Environment::Production => endpoints.fallback.get(service),
    }
}

/// Appends a request path to a base URL.
pub fn join(base: &Url, path: &str) -> String {
    let base = base.as_str().trim_end_matches('/');
    if path.is_empty() {
        base.to_string()
    } else if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

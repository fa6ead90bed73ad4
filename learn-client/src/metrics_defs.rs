//! Metrics definitions for the learn client.

use shared::metrics_defs::{MetricDef, MetricType};

pub const API_REQUEST: MetricDef = MetricDef {
    name: "api.request",
    metric_type: MetricType::Counter,
    description: "Number of completed API requests, tagged by service and status",
};

pub const API_REQUEST_FAILURE: MetricDef = MetricDef {
    name: "api.request.failure",
    metric_type: MetricType::Counter,
    description: "Number of API requests that ended without a decodable response",
};

pub const API_REQUEST_DURATION: MetricDef = MetricDef {
    name: "api.request.duration",
    metric_type: MetricType::Histogram,
    description: "Time to complete an API request in milliseconds",
};

pub const API_RESPONSE_BYTES: MetricDef = MetricDef {
    name: "api.response.bytes",
    metric_type: MetricType::Histogram,
    description: "Size of API response bodies in bytes",
};

pub const API_REQUEST_CARBON: MetricDef = MetricDef {
    name: "api.request.carbon",
    metric_type: MetricType::Histogram,
    description: "Estimated carbon cost of an API request in grams of CO2",
};

pub const RESPONSE_CACHE_HIT: MetricDef = MetricDef {
    name: "response_cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of lookups that hit the response cache",
};

pub const RESPONSE_CACHE_MISS: MetricDef = MetricDef {
    name: "response_cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of lookups that missed the response cache",
};

pub const ALL_METRICS: &[MetricDef] = &[
    API_REQUEST,
    API_REQUEST_FAILURE,
    API_REQUEST_DURATION,
    API_RESPONSE_BYTES,
    API_REQUEST_CARBON,
    RESPONSE_CACHE_HIT,
    RESPONSE_CACHE_MISS,
];

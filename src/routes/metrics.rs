use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use prometheus::Encoder;

use crate::metrics::REGISTRY;

pub async fn metrics_handler() -> Response {
    let encoder = prometheus::TextEncoder::new();

    let mut res = encode(&encoder, &REGISTRY.gather(), "custom");
    res.push_str(&encode(&encoder, &prometheus::gather(), "prometheus"));

    (StatusCode::OK, res).into_response()
}

fn encode(
    encoder: &prometheus::TextEncoder,
    metric_families: &[prometheus::proto::MetricFamily],
    source: &str,
) -> String {
    let mut buffer = Vec::new();
    if let Err(error) = encoder.encode(metric_families, &mut buffer) {
        log::error!("Could not encode {source} metrics: {error}");
    };
    String::from_utf8(buffer).unwrap_or_else(|error| {
        log::error!("The {source} metrics could not be from_utf8'd: {error}");
        String::default()
    })
}

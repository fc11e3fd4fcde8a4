//! Hardening headers set on every response.

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

const HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("referrer-policy", "no-referrer"),
    ("x-dns-prefetch-control", "off"),
    ("x-permitted-cross-domain-policies", "none"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
];

const HSTS: (&str, &str) = ("strict-transport-security", "max-age=15552000; includeSubDomains");

/// Wrap `router` so every response carries the hardening headers. HSTS is only
/// sent when `https` is set.
pub fn apply(router: Router, https: bool) -> Router {
    let hsts = https.then_some(&HSTS);
    HEADERS.iter().chain(hsts).fold(router, |router, &(name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}

//! Cross-origin resource sharing policies.
//!
//! A [`CorsConfig`] can be attached to an individual route or installed as
//! the router-wide default; [`Router::resolve`](crate::Router::resolve)
//! picks whichever applies. Evaluation against a concrete request happens
//! through [`Resource::cors_headers`](crate::Resource::cors_headers) and
//! only ever *adds* headers, it never decides a response status.

use http::header::{self, HeaderMap, HeaderValue};
use http::Method;

/// An explicit CORS policy.
///
/// Immutable once attached to a route or the router's global slot, except
/// through [`merge`](CorsConfig::merge), which runs at registration time
/// only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorsConfig {
    /// Allowed origins. `"*"` allows any origin.
    pub origins: Vec<String>,
    /// Methods a preflight request may ask for.
    pub methods: Vec<Method>,
    /// Request headers a preflight request may ask for.
    pub allow_headers: Vec<String>,
    /// Response headers exposed to the requesting script.
    pub expose_headers: Vec<String>,
    /// Whether `Access-Control-Allow-Credentials: true` is emitted.
    pub credentials: bool,
    /// Preflight cache lifetime in seconds. `0` omits
    /// `Access-Control-Max-Age` entirely.
    pub max_age: u32,
}

impl CorsConfig {
    /// Returns an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlays `src` onto this policy.
    ///
    /// List fields keep their existing items followed by any `src` items
    /// not already present (order-preserving de-duplication); the scalar
    /// fields (`credentials`, `max_age`) always take `src`'s value.
    pub fn merge(&mut self, src: &CorsConfig) {
        merge_strings(&mut self.origins, &src.origins);
        merge_strings(&mut self.allow_headers, &src.allow_headers);
        merge_strings(&mut self.expose_headers, &src.expose_headers);

        for method in &src.methods {
            if !self.methods.contains(method) {
                self.methods.push(method.clone());
            }
        }

        self.credentials = src.credentials;
        self.max_age = src.max_age;
    }

    /// Returns `true` if the policy admits the given literal origin.
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == "*" || o == origin)
    }
}

fn merge_strings(dest: &mut Vec<String>, src: &[String]) {
    for item in src {
        if !dest.iter().any(|existing| existing == item) {
            dest.push(item.clone());
        }
    }
}

/// The CORS-relevant parts of an incoming request.
#[derive(Clone, Debug)]
pub struct CorsRequest<'a> {
    /// The actual request method.
    pub method: Method,
    /// The `Origin` header, if present.
    pub origin: Option<&'a str>,
    /// The `Access-Control-Request-Method` header, if present.
    pub request_method: Option<&'a str>,
    /// The `Access-Control-Request-Headers` header, if present.
    pub request_headers: Option<&'a str>,
}

impl<'a> CorsRequest<'a> {
    /// Extracts the CORS-relevant headers from a request's header map.
    pub fn from_parts(method: Method, headers: &'a HeaderMap) -> Self {
        let as_str = |name| headers.get(name).and_then(|v: &HeaderValue| v.to_str().ok());

        Self {
            method,
            origin: as_str(header::ORIGIN),
            request_method: as_str(header::ACCESS_CONTROL_REQUEST_METHOD),
            request_headers: as_str(header::ACCESS_CONTROL_REQUEST_HEADERS),
        }
    }
}

/// Evaluates `policy` against a request, for a resource whose implemented
/// methods are described by `implements`.
///
/// Returns the headers to append to the response. An empty map means the
/// request gets no CORS treatment at all: a missing or disallowed origin, a
/// malformed preflight probe, or a preflight asking for something the
/// policy or resource does not offer.
pub(crate) fn evaluate<F>(policy: &CorsConfig, request: &CorsRequest<'_>, implements: F) -> HeaderMap
where
    F: Fn(&Method) -> bool,
{
    let mut headers = HeaderMap::new();

    let origin = match request.origin {
        Some(origin) => origin,
        None => return headers,
    };

    if !policy.allows_origin(origin) {
        return headers;
    }

    let is_options = request.method == Method::OPTIONS;
    match (is_options, request.request_method) {
        // A real preflight: OPTIONS carrying Access-Control-Request-Method.
        (true, Some(requested)) => {
            let requested: Method = match requested.parse() {
                Ok(method) => method,
                Err(_) => return headers,
            };

            // The requested method must be allowed by the policy *and*
            // actually implemented by the resource.
            if !policy.methods.contains(&requested) || !implements(&requested) {
                return headers;
            }

            if let Some(list) = request.request_headers {
                for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                    if !policy.allow_headers.iter().any(|h| h == token) {
                        return headers;
                    }
                }
            }

            for method in &policy.methods {
                if implements(method) {
                    if let Ok(value) = HeaderValue::from_str(method.as_str()) {
                        headers.append(header::ACCESS_CONTROL_ALLOW_METHODS, value);
                    }
                }
            }

            for allowed in &policy.allow_headers {
                if let Ok(value) = HeaderValue::from_str(allowed) {
                    headers.append(header::ACCESS_CONTROL_ALLOW_HEADERS, value);
                }
            }

            if policy.max_age > 0 {
                headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from(policy.max_age));
            }
        }
        // An OPTIONS probe without a requested method, or a non-OPTIONS
        // request carrying one: not a CORS request we answer.
        (true, None) | (false, Some(_)) => return headers,
        // A simple request.
        (false, None) => {
            for exposed in &policy.expose_headers {
                if let Ok(value) = HeaderValue::from_str(exposed) {
                    headers.append(header::ACCESS_CONTROL_EXPOSE_HEADERS, value);
                }
            }
        }
    }

    // Echo the literal origin, never "*".
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.append(header::VARY, HeaderValue::from_static("Origin"));

    if policy.credentials {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }

    headers
}

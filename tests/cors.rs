use http::header;
use trailmap::{CorsConfig, CorsRequest, Method, Router};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn global() -> CorsConfig {
    CorsConfig {
        origins: strings(&["http://x"]),
        methods: vec![Method::POST, Method::PUT],
        allow_headers: strings(&["X-H"]),
        ..CorsConfig::default()
    }
}

fn preflight(
    origin: &'static str,
    method: &'static str,
    headers: Option<&'static str>,
) -> CorsRequest<'static> {
    CorsRequest {
        method: Method::OPTIONS,
        origin: Some(origin),
        request_method: Some(method),
        request_headers: headers,
    }
}

#[test]
fn no_policy_anywhere_is_a_noop() {
    let mut router = Router::new();
    router.get("/plain", "plain").unwrap();

    let resource = router.resolve("/plain").unwrap();
    assert!(resource.cors().is_none());

    let request = CorsRequest {
        method: Method::GET,
        origin: Some("http://x"),
        request_method: None,
        request_headers: None,
    };
    assert!(resource.cors_headers(&request).is_empty());
}

#[test]
fn global_policy_is_inherited() {
    let mut router = Router::new();
    router.get("/inherit", "inherit").unwrap();
    router.set_global_cors(global());

    let resource = router.resolve("/inherit").unwrap();
    assert_eq!(resource.cors(), Some(&global()));
}

#[test]
fn own_policy_wins_over_global() {
    let mut router = Router::new();
    router.get("/own", "own").unwrap();
    router.set_global_cors(global());

    let own = CorsConfig {
        origins: strings(&["http://y"]),
        methods: vec![Method::GET],
        ..CorsConfig::default()
    };
    router.set_cors("/own", own.clone()).unwrap();

    let resource = router.resolve("/own").unwrap();
    assert_eq!(resource.cors(), Some(&own));
}

#[test]
fn set_cors_replaces() {
    let mut router = Router::new();
    router.get("/r", "r").unwrap();

    let first = CorsConfig {
        origins: strings(&["http://a"]),
        ..CorsConfig::default()
    };
    let second = CorsConfig {
        origins: strings(&["http://b"]),
        ..CorsConfig::default()
    };
    router.set_cors("/r", first).unwrap();
    router.set_cors("/r", second.clone()).unwrap();

    assert_eq!(router.resolve("/r").unwrap().cors(), Some(&second));
}

#[test]
fn set_cors_before_insert_lands_on_the_same_node() {
    let mut router = Router::new();
    let own = CorsConfig {
        origins: strings(&["http://a"]),
        ..CorsConfig::default()
    };
    router.set_cors("/later/{id}", own.clone()).unwrap();
    router.get("/later/{id}", "later").unwrap();

    let resource = router.resolve("/later/7").unwrap();
    assert_eq!(resource.cors(), Some(&own));
    assert_eq!(resource.params.get("id"), Some("7"));
}

#[test]
fn add_cors_merges_over_global() {
    let mut router = Router::new();
    router.get("/merged", "merged").unwrap();
    router.set_global_cors(CorsConfig {
        origins: strings(&["A", "B"]),
        methods: vec![Method::GET],
        max_age: 600,
        ..CorsConfig::default()
    });

    router
        .add_cors(
            "/merged",
            CorsConfig {
                origins: strings(&["B", "C"]),
                methods: vec![Method::GET, Method::DELETE],
                max_age: 30,
                ..CorsConfig::default()
            },
        )
        .unwrap();

    let resource = router.resolve("/merged").unwrap();
    let policy = resource.cors().unwrap();
    assert_eq!(policy.origins, strings(&["A", "B", "C"]));
    assert_eq!(policy.methods, vec![Method::GET, Method::DELETE]);
    assert_eq!(policy.max_age, 30);
}

// The resource only implements POST, so a successful preflight must echo
// POST but not PUT, even though the policy allows both.
#[test]
fn preflight_echoes_only_implemented_methods() {
    let mut router = Router::new();
    router.post("/thing", "create thing").unwrap();
    router.set_global_cors(global());

    let resource = router.resolve("/thing").unwrap();
    let headers = resource.cors_headers(&preflight("http://x", "POST", Some("X-H")));

    let methods: Vec<_> = headers
        .get_all(header::ACCESS_CONTROL_ALLOW_METHODS)
        .iter()
        .collect();
    assert_eq!(methods, ["POST"]);

    let allow: Vec<_> = headers
        .get_all(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .iter()
        .collect();
    assert_eq!(allow, ["X-H"]);

    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://x"
    );
    assert_eq!(headers.get(header::VARY).unwrap(), "Origin");
    // max_age is 0: no caching header.
    assert!(headers.get(header::ACCESS_CONTROL_MAX_AGE).is_none());
}

#[test]
fn preflight_for_unimplemented_method_fails() {
    let mut router = Router::new();
    router.post("/thing", "create thing").unwrap();
    router.set_global_cors(global());

    let resource = router.resolve("/thing").unwrap();
    // PUT is in the policy but the resource has no PUT handler.
    let headers = resource.cors_headers(&preflight("http://x", "PUT", None));
    assert!(headers.is_empty());
}

#[test]
fn preflight_with_unknown_request_header_fails() {
    let mut router = Router::new();
    router.post("/thing", "create thing").unwrap();
    router.set_global_cors(global());

    let resource = router.resolve("/thing").unwrap();
    let headers = resource.cors_headers(&preflight("http://x", "POST", Some("X-Other")));
    assert!(headers.is_empty());
}

#[test]
fn disallowed_origin_gets_nothing() {
    let mut router = Router::new();
    router.post("/thing", "create thing").unwrap();
    router.set_global_cors(global());

    let resource = router.resolve("/thing").unwrap();
    let headers = resource.cors_headers(&preflight("http://evil", "POST", None));
    assert!(headers.is_empty());
}

#[test]
fn simple_request_headers() {
    let mut router = Router::new();
    router.get("/thing", "get thing").unwrap();
    router.set_global_cors(CorsConfig {
        origins: strings(&["*"]),
        expose_headers: strings(&["X-Total", "X-Page"]),
        credentials: true,
        ..CorsConfig::default()
    });

    let resource = router.resolve("/thing").unwrap();
    let request = CorsRequest {
        method: Method::GET,
        origin: Some("http://anywhere"),
        request_method: None,
        request_headers: None,
    };
    let headers = resource.cors_headers(&request);

    // The literal origin is echoed, never "*".
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://anywhere"
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );

    let exposed: Vec<_> = headers
        .get_all(header::ACCESS_CONTROL_EXPOSE_HEADERS)
        .iter()
        .collect();
    assert_eq!(exposed, ["X-Total", "X-Page"]);

    // Expose-Headers is a simple-request header only.
    assert!(headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .is_none());
}

#[test]
fn cors_request_from_header_map() {
    let mut headers = http::HeaderMap::new();
    headers.insert(header::ORIGIN, "http://x".parse().unwrap());
    headers.insert(
        header::ACCESS_CONTROL_REQUEST_METHOD,
        "POST".parse().unwrap(),
    );

    let request = CorsRequest::from_parts(Method::OPTIONS, &headers);
    assert_eq!(request.origin, Some("http://x"));
    assert_eq!(request.request_method, Some("POST"));
    assert_eq!(request.request_headers, None);
}

use std::collections::HashMap;

use webserver::http::request::{Method, Request, RequestBuilder};

#[test]
fn test_request_header_retrieval() {
    let mut headers = HashMap::new();
    headers.insert("Host".to_string(), "example.com".to_string());
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    let req = Request {
        method: Method::GET,
        path: "/".to_string(),
        version: Some("HTTP/1.1".to_string()),
        headers,
        params: HashMap::new(),
        form: HashMap::new(),
        body: vec![],
    };

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_header_lookup_is_exact() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("Host", "example.com")
        .build()
        .unwrap();

    assert_eq!(req.header("host"), None);
}

#[test]
fn test_request_builder_defaults() {
    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/submit")
        .build()
        .unwrap();

    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/submit");
    assert_eq!(req.version, None);
    assert!(req.headers.is_empty());
    assert!(req.body.is_empty());
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).path("").build().is_err());
}

#[test]
fn test_method_round_trips_wire_token() {
    for token in ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH", "BREW"] {
        assert_eq!(Method::parse(token).as_str(), token);
    }
}

#[test]
fn test_method_parse_is_case_sensitive() {
    assert_eq!(Method::parse("get"), Method::Other("get".to_string()));
    assert_eq!(Method::GET.to_string(), "GET");
}

//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for route matching,
//! method validation, and turning handler outcomes into responses.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode, Uri};
use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::birds::{self, Outcome};
use super::openapi;
use crate::config::{AppState, HealthConfig};
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Routes known to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint<'a> {
    Root,
    Birds,
    /// Raw (still percent-encoded) `birdid` segment
    Bird(&'a str),
    OpenApi,
    Health,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let response = route(&req, &state);

    if state.access_log() {
        log_access(&req, &response, peer_addr, started, &state);
    }

    Ok(response)
}

/// Route a request to its handler and build the response
pub fn route<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let response = dispatch(req, state);
    http::with_server_name(response, &state.config.http.server_name)
}

fn dispatch<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let uri = req.uri();
    let health = &state.config.health;

    // 1. Resolve the path; unknown paths may still be a trailing-slash redirect
    let Some(endpoint) = resolve(uri.path(), health) else {
        return redirect_slash(uri, health).unwrap_or_else(http::build_404_response);
    };

    // 2. Check HTTP method
    let method = req.method();
    if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        return resp;
    }

    // 3. Check body size
    if let Some(resp) = check_body_size(req, state.config.http.max_body_size) {
        return resp;
    }

    // 4. Serve
    let response = serve(endpoint, uri.query(), state);
    if *method == Method::HEAD {
        http::strip_body(response)
    } else {
        response
    }
}

/// Application routes take precedence; health paths only fill unused paths
fn resolve<'a>(path: &'a str, health: &HealthConfig) -> Option<Endpoint<'a>> {
    let endpoint = match path {
        "/" => Some(Endpoint::Root),
        "/birds" => Some(Endpoint::Birds),
        "/openapi.json" => Some(Endpoint::OpenApi),
        _ => path
            .strip_prefix("/birds/")
            .filter(|segment| !segment.is_empty() && !segment.contains('/'))
            .map(Endpoint::Bird),
    };
    if endpoint.is_some() {
        return endpoint;
    }

    let is_probe = path == health.liveness_path || path == health.readiness_path;
    (health.enabled && is_probe).then_some(Endpoint::Health)
}

/// Redirect `/birds/` to `/birds` (and alike) when the trimmed path is a route
fn redirect_slash(uri: &Uri, health: &HealthConfig) -> Option<Response<Full<Bytes>>> {
    let trimmed = uri.path().strip_suffix('/').filter(|p| !p.is_empty())?;
    resolve(trimmed, health)?;

    let target = match uri.query() {
        Some(q) => format!("{trimmed}?{q}"),
        None => trimmed.to_string(),
    };
    Some(http::build_redirect_response(&target))
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_debug(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };

    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

fn serve(endpoint: Endpoint<'_>, query: Option<&str>, state: &AppState) -> Response<Full<Bytes>> {
    let store = &state.store;
    match endpoint {
        Endpoint::Root => http::build_json_response(StatusCode::OK, &birds::root()),
        Endpoint::Birds => {
            let starts_with = http::query_param(query, "starts_with");
            respond(birds::list_birds(store, starts_with.as_deref()))
        }
        Endpoint::Bird(segment) => match birds::parse_bird_id(segment) {
            Ok(id) => respond(birds::get_bird(store, id)),
            Err(err) => http::build_json_response(StatusCode::UNPROCESSABLE_ENTITY, &err),
        },
        Endpoint::OpenApi => http::build_json_response(StatusCode::OK, openapi::document()),
        Endpoint::Health => http::build_health_response("ok"),
    }
}

/// `Found` is a 200 with a JSON body; `NotFound` is a 404 with no body
fn respond<T: Serialize>(outcome: Outcome<T>) -> Response<Full<Bytes>> {
    match outcome {
        Outcome::Found(value) => http::build_json_response(StatusCode::OK, &value),
        Outcome::NotFound => http::build_empty_response(StatusCode::NOT_FOUND),
    }
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = logger::version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
        .unwrap_or(usize::MAX);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::header::{ALLOW, CONTENT_TYPE, LOCATION, SERVER};
    use serde_json::{json, Value};

    fn test_state() -> AppState {
        let config = Config::load_from("this-config-file-does-not-exist").unwrap();
        AppState::new(&config)
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    fn get(state: &AppState, uri: &str) -> Response<Full<Bytes>> {
        route(&request(Method::GET, uri), state)
    }

    async fn body(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    async fn json_body(response: Response<Full<Bytes>>) -> Value {
        serde_json::from_slice(&body(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let state = test_state();
        for uri in ["/", "/?starts_with=T", "/?anything=else"] {
            let response = get(&state, uri);
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
            assert_eq!(
                json_body(response).await,
                json!({ "greeting": "Hello birds!", "number": 42 })
            );
        }
    }

    #[tokio::test]
    async fn test_list_all_birds() {
        let state = test_state();
        let response = get(&state, "/birds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "birds": {
                    "17852": "Trana",
                    "25340": "Koltrast",
                    "27361": "Blåmes",
                    "27392": "Talgoxe"
                },
                "count": 4
            })
        );
    }

    #[tokio::test]
    async fn test_list_birds_starting_with_t() {
        let state = test_state();
        let response = get(&state, "/birds?starts_with=T");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "birds": { "17852": "Trana", "27392": "Talgoxe" }, "count": 2 })
        );
    }

    #[tokio::test]
    async fn test_list_birds_percent_encoded_prefix() {
        let state = test_state();
        let response = get(&state, "/birds?starts_with=Bl%C3%A5");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "birds": { "27361": "Blåmes" }, "count": 1 })
        );
    }

    #[tokio::test]
    async fn test_list_birds_without_match_is_empty_404() {
        let state = test_state();
        for uri in ["/birds?starts_with=Z", "/birds?starts_with=t"] {
            let response = get(&state, uri);
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert!(response.headers().get(CONTENT_TYPE).is_none());
            assert!(body(response).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_list_birds_empty_prefix_returns_all() {
        let state = test_state();
        let response = get(&state, "/birds?starts_with=");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["count"], 4);
    }

    #[tokio::test]
    async fn test_get_each_seeded_bird() {
        let state = test_state();
        for (id, name) in [
            (17852, "Trana"),
            (25340, "Koltrast"),
            (27361, "Blåmes"),
            (27392, "Talgoxe"),
        ] {
            let response = get(&state, &format!("/birds/{id}"));
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(json_body(response).await, json!(name));
        }
    }

    #[tokio::test]
    async fn test_get_unknown_bird_is_empty_404() {
        let state = test_state();
        let response = get(&state, "/birds/99999");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_LENGTH], "0");
        assert!(body(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_get_bird_non_integer_is_422() {
        let state = test_state();
        let response = get(&state, "/birds/abc");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let value = json_body(response).await;
        assert_eq!(value["detail"][0]["loc"], json!(["path", "birdid"]));
        assert_eq!(value["detail"][0]["input"], "abc");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let state = test_state();
        for uri in ["/nope", "/birds/17852/extra", "/birdsong"] {
            let response = get(&state, uri);
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(json_body(response).await, json!({ "detail": "Not Found" }));
        }
    }

    #[test]
    fn test_trailing_slash_redirect() {
        let state = test_state();
        let response = get(&state, "/birds/?starts_with=T");
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/birds?starts_with=T");

        let response = get(&state, "/birds/17852/");
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/birds/17852");
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let state = test_state();
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            let response = route(&request(method, "/birds"), &state);
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.headers()[ALLOW], "GET, HEAD, OPTIONS");
            assert_eq!(
                json_body(response).await,
                json!({ "detail": "Method Not Allowed" })
            );
        }
    }

    #[test]
    fn test_options() {
        let state = test_state();
        let response = route(&request(Method::OPTIONS, "/birds"), &state);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let state = test_state();
        let response = route(&request(Method::HEAD, "/birds/17852"), &state);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "7");
        assert!(body(response).await.is_empty());
    }

    #[test]
    fn test_body_too_large() {
        let state = test_state();
        let req = Request::builder()
            .uri("/birds")
            .header(CONTENT_LENGTH, "2000000")
            .body(())
            .unwrap();
        assert_eq!(route(&req, &state).status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_openapi_and_health() {
        let state = test_state();
        let response = get(&state, "/openapi.json");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["info"]["title"], "The Birds API");

        for uri in ["/healthz", "/readyz"] {
            let response = get(&state, uri);
            assert_eq!(json_body(response).await, json!({ "status": "ok" }));
        }
    }

    #[test]
    fn test_health_disabled() {
        let mut config = Config::load_from("this-config-file-does-not-exist").unwrap();
        config.health.enabled = false;
        let state = AppState::new(&config);
        assert_eq!(get(&state, "/healthz").status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_path_cannot_shadow_birds() {
        let mut config = Config::load_from("this-config-file-does-not-exist").unwrap();
        config.health.liveness_path = "/birds".to_string();
        config.health.readiness_path = "/birds/17852".to_string();
        let state = AppState::new(&config);

        assert_eq!(json_body(get(&state, "/birds")).await["count"], 4);
        assert_eq!(json_body(get(&state, "/birds/17852")).await, json!("Trana"));
        assert_eq!(
            json_body(get(&state, "/healthz")).await,
            json!({ "detail": "Not Found" })
        );
    }

    #[test]
    fn test_server_header() {
        let state = test_state();
        for uri in ["/", "/birds/99999", "/nope"] {
            let response = get(&state, uri);
            assert_eq!(
                response.headers()[SERVER],
                state.config.http.server_name.as_str()
            );
        }
    }

    #[tokio::test]
    async fn test_requests_are_idempotent() {
        let state = test_state();
        for uri in ["/", "/birds", "/birds?starts_with=K", "/birds/27392", "/birds/1"] {
            let first = get(&state, uri);
            let first_status = first.status();
            let first_body = body(first).await;
            for _ in 0..3 {
                let again = get(&state, uri);
                assert_eq!(again.status(), first_status);
                assert_eq!(body(again).await, first_body);
            }
        }
        assert_eq!(state.store.count(), 4);
    }

    #[tokio::test]
    async fn test_handle_request() {
        let state = Arc::new(test_state());
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();
        let response = handle_request(request(Method::GET, "/birds/25340"), state, peer)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!("Koltrast"));
    }
}

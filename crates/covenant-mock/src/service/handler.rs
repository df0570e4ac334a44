//! Request handling: the boundary between the HTTP host and the matcher.
//!
//! The host owns the connection lifecycle; this handler reduces the hyper
//! request to the fields the matcher consults, asks the service for its
//! decision, and writes back whatever it returned.

use super::core::MockService;
use super::types::build_response;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Handle one request to the mock service.
pub async fn handle_mock_request(
    req: Request<Incoming>,
    service: Arc<MockService>,
    client_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().to_string();
    let uri = req.uri().clone();
    let path = uri.path().to_string();
    let query = uri.query().map(str::to_string);

    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("").to_string(),
            )
        })
        .collect();

    let body = match req.into_body().collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            if bytes.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(&bytes).to_string())
            }
        }
        Err(_) => None,
    };

    debug!(%method, %path, client = %client_addr, "handling request");
    let answer = service.handle(&method, &path, query.as_deref(), headers, body);

    let status = StatusCode::from_u16(answer.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = Response::builder().status(status);
    for (name, value) in &answer.headers {
        response = response.header(name.as_str(), value.as_str());
    }
    Ok(response
        .body(Full::new(Bytes::from(answer.body.unwrap_or_default())))
        .unwrap_or_else(|_| build_response(StatusCode::INTERNAL_SERVER_ERROR, "response build error")))
}

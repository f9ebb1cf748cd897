use std::convert::Infallible;
use std::fmt::Debug;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http_body_util::{BodyExt, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_TYPE, WWW_AUTHENTICATE};
use hyper::http::request::Parts;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::pin;
use tracing::{debug, error, info, instrument};

use crate::command::server::auth::Authenticator;
use crate::command::server::error::Error;
use crate::command::server::response_body::ResponseBody;
use crate::command::server::router::{self, Route};

/// Largest login form accepted.
pub const LOGIN_BODY_LIMIT: usize = 64 * 1024;

pub async fn serve_request<S>(
    stream: TokioIo<S>,
    authenticator: Arc<Authenticator>,
    timeouts: Arc<[Duration; 2]>,
    remote_address: SocketAddr,
) where
    S: Unpin + AsyncWrite + AsyncRead + Send + Debug + 'static,
{
    let conn = http1::Builder::new().serve_connection(
        stream,
        service_fn(move |mut request| {
            request.extensions_mut().insert(remote_address);
            handle_request(Arc::clone(&authenticator), request)
        }),
    );
    pin!(conn);

    for (iter, sleep_duration) in timeouts.iter().enumerate() {
        debug!("iter = {iter} sleep_duration = {sleep_duration:?}");
        tokio::select! {
            res = conn.as_mut() => {
                match res {
                    Ok(()) => debug!("after polling conn, no error"),
                    Err(error) =>  debug!("error serving connection: {error}"),
                }
                break;
            }
            () = tokio::time::sleep(*sleep_duration) => {
                // first timeout asks the connection to wind down, the grace period ends it
                debug!("iter = {iter} got timeout_interval, calling conn.graceful_shutdown");
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}

#[instrument(skip(authenticator, request))]
async fn handle_request<B>(
    authenticator: Arc<Authenticator>,
    request: Request<B>,
) -> Result<Response<ResponseBody>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let start_time = Instant::now();
    let method = request.method().to_owned();
    let path = request.uri().path().to_owned();

    let response = match router(&authenticator, request).await {
        Ok(response) => response,
        Err(error) => error_to_response(&error, authenticator.challenge()),
    };

    let elapsed = start_time.elapsed();
    let status = response.status();
    let log = format!("{status} {elapsed:?} {method} {path}");

    if status.is_server_error() {
        error!("{log}");
    } else {
        info!("{log}");
    }

    Ok(response)
}

async fn router<B>(
    authenticator: &Authenticator,
    request: Request<B>,
) -> Result<Response<ResponseBody>, Error>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = request.into_parts();
    let route = router::parse(&parts.method, &parts.uri, authenticator.login_path());
    debug!("route = {}", route.action_name());

    if route == Route::Login {
        let body = read_login_body(body).await?;
        return Ok(authenticator.login(&parts, &body));
    }

    authenticator.authenticate_request(&parts)?;

    match route {
        Route::Status => handle_status(authenticator),
        Route::Login | Route::Unknown => Err(unknown_route(&parts)),
    }
}

async fn read_login_body<B>(body: B) -> Result<Bytes, Error>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, LOGIN_BODY_LIMIT).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) => {
            let msg = format!("unreadable login request: {err}");
            Err(Error::BadRequest(msg))
        }
    }
}

fn handle_status(authenticator: &Authenticator) -> Result<Response<ResponseBody>, Error> {
    let body = json!({
        "status": "ok",
        "auth": authenticator.strategy_name(),
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .body(ResponseBody::fixed(body.to_string()));

    match response {
        Ok(resp) => Ok(resp),
        Err(e) => {
            let msg = format!("Failed to build status response: {e}");
            Err(Error::Internal(msg))
        }
    }
}

fn unknown_route(parts: &Parts) -> Error {
    let msg = format!("unknown route: {} {}", parts.method, parts.uri.path());
    Error::NotFound(msg)
}

pub fn error_to_response(error: &Error, challenge: Option<&'static str>) -> Response<ResponseBody> {
    let body = error.as_json().to_string();

    let mut response = Response::new(ResponseBody::fixed(body));
    *response.status_mut() = error.status_code();

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let (Error::Unauthorized(_), Some(challenge)) = (error, challenge) {
        headers.insert(WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
    }

    response
}

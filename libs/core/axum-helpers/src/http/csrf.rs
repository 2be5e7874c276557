//! Double-submit cookie CSRF protection.
//!
//! Safe requests (GET, HEAD, OPTIONS, TRACE) receive a `csrf_token` cookie if
//! they do not already carry one, and the token is exposed to handlers as a
//! [`CsrfToken`] request extension so views can embed it in forms.
//!
//! Every other request must echo the cookie value back, either in the
//! `x-csrf-token` header or in the `csrf_token` field of an urlencoded form.
//! Anything else is rejected with 403.

use crate::errors::AppError;
use axum::{
    Form, RequestExt,
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::collections::HashMap;
use uuid::Uuid;

pub const CSRF_COOKIE: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// Upper bound on a form body buffered for token inspection.
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Anti-forgery token for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

impl CsrfToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn is_urlencoded_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

fn forbidden(reason: &str) -> Response {
    AppError::Forbidden(reason.to_string()).into_response()
}

fn token_cookie(token: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/",
        CSRF_COOKIE, token
    ))
    .ok()
}

async fn form_token(bytes: &Bytes) -> Option<String> {
    let request = Request::builder()
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(bytes.clone()))
        .ok()?;

    let Form(fields) = request
        .extract::<Form<HashMap<String, String>>, _>()
        .await
        .ok()?;

    fields.get(CSRF_FORM_FIELD).cloned()
}

/// CSRF middleware; install with `axum::middleware::from_fn(csrf_protection)`.
pub async fn csrf_protection(mut request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let cookie_token = jar
        .get(CSRF_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty());

    if is_safe(request.method()) {
        let (token, minted) = match cookie_token {
            Some(token) => (token, false),
            None => (Uuid::new_v4().simple().to_string(), true),
        };

        request.extensions_mut().insert(CsrfToken(token.clone()));
        let mut response = next.run(request).await;

        if minted && let Some(value) = token_cookie(&token) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        return response;
    }

    let Some(expected) = cookie_token else {
        tracing::warn!(method = %request.method(), uri = %request.uri(), "CSRF cookie missing");
        return forbidden("Missing anti-forgery cookie");
    };

    if let Some(submitted) = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        if submitted == expected {
            request.extensions_mut().insert(CsrfToken(expected));
            return next.run(request).await;
        }
        tracing::warn!(uri = %request.uri(), "CSRF header token mismatch");
        return forbidden("Anti-forgery token mismatch");
    }

    if !is_urlencoded_form(request.headers()) {
        return forbidden("Missing anti-forgery token");
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_FORM_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppError::BadRequest(format!("Unreadable form body: {}", e)).into_response();
        }
    };

    match form_token(&bytes).await {
        Some(submitted) if submitted == expected => {
            parts.extensions.insert(CsrfToken(expected));
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        _ => {
            tracing::warn!(uri = %parts.uri, "CSRF form token missing or mismatched");
            forbidden("Anti-forgery token missing or mismatched")
        }
    }
}

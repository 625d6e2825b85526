//! Middleware for protecting authenticated routes and handling authorization.
//!
//! `jwt_auth` validates the bearer access token and stores its claims in the
//! request extensions; the role layers read those claims back and enforce
//! each route's statically declared requirement.

use axum::{
    extract::{OriginalUri, Request},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::api::common::service_error_to_http;
use crate::auth::guard;
use crate::database::models::Role;
use crate::errors::ServiceError;
use crate::utils::jwt::{Claims, TokenCodec};

/// Pulls the token out of a `Bearer` authorization header.
fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|token| token.trim().to_string())
}

/// The request path for error envelopes, preferring the pre-nesting URI.
fn request_path(request: &Request) -> String {
    request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// JWT authentication middleware.
///
/// Only access tokens pass; a refresh token presented as a bearer
/// credential is rejected as malformed.
pub async fn jwt_auth(mut request: Request, next: Next) -> Result<Response, (StatusCode, String)> {
    let path = request_path(&request);

    let codec = request
        .extensions()
        .get::<Arc<TokenCodec>>()
        .cloned()
        .ok_or_else(|| {
            service_error_to_http(
                ServiceError::internal_error("Token codec not configured"),
                &path,
            )
        })?;

    let token = extract_bearer(request.headers())
        .ok_or_else(|| service_error_to_http(ServiceError::Unauthenticated, &path))?;

    match codec.verify_access(&token) {
        Ok(claims) => {
            // Make claims available to handlers and downstream middleware
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(error) => Err(service_error_to_http(error, &path)),
    }
}

/// Admin role authorization middleware. Must be layered inside `jwt_auth`.
pub async fn admin_auth(request: Request, next: Next) -> Result<Response, (StatusCode, String)> {
    let path = request_path(&request);

    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| service_error_to_http(ServiceError::Unauthenticated, &path))?;

    guard::check(&[Role::Admin], &claims.roles)
        .map_err(|error| service_error_to_http(error, &path))?;

    Ok(next.run(request).await)
}

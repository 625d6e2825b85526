//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for registration, login,
//! token refresh, and logout, translate between the transport layer (JSON
//! bodies, the refresh cookie) and the `auth::service` business logic, and
//! shape the response envelopes.

use axum::{
    extract::{Extension, Json, OriginalUri, Path},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::errors::ServiceError;
use crate::utils::cookies::{self, REFRESH_COOKIE};
use crate::utils::jwt::{Claims, TokenCodec};

/// Handle user registration (administrators only)
#[axum::debug_handler]
pub async fn register(
    Extension(pool): Extension<SqlitePool>,
    Extension(codec): Extension<Arc<TokenCodec>>,
    Extension(config): Extension<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<UserInfo>>), (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &codec, &config);

    match auth_service.register(payload).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(user, "User registered")),
        )),
        Err(error) => Err(service_error_to_http(error, uri.path())),
    }
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(codec): Extension<Arc<TokenCodec>>,
    Extension(config): Extension<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<LoginResponse>>), (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &codec, &config);

    match auth_service.login(payload).await {
        Ok((response, cookie)) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                SET_COOKIE,
                cookie
                    .header_value(&config)
                    .map_err(|error| service_error_to_http(error, uri.path()))?,
            );
            Ok((
                headers,
                ResponseJson(ApiResponse::success(response, "Authentication completed")),
            ))
        }
        Err(error) => Err(service_error_to_http(error, uri.path())),
    }
}

/// Handle token refresh request. The refresh token comes from its cookie,
/// never from the body.
#[axum::debug_handler]
pub async fn refresh(
    Extension(pool): Extension<SqlitePool>,
    Extension(codec): Extension<Arc<TokenCodec>>,
    Extension(config): Extension<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<LoginResponse>>), (StatusCode, String)> {
    let refresh_token = cookies::parse_cookie(&headers, REFRESH_COOKIE)
        .ok_or_else(|| service_error_to_http(ServiceError::Unauthenticated, uri.path()))?;

    let auth_service = AuthService::new(&pool, &codec, &config);

    match auth_service.refresh(&refresh_token).await {
        Ok((response, cookie)) => {
            let mut response_headers = HeaderMap::new();
            response_headers.insert(
                SET_COOKIE,
                cookie
                    .header_value(&config)
                    .map_err(|error| service_error_to_http(error, uri.path()))?,
            );
            Ok((
                response_headers,
                ResponseJson(ApiResponse::success(response, "Tokens refreshed")),
            ))
        }
        Err(error) => Err(service_error_to_http(error, uri.path())),
    }
}

/// Handle logout of the caller's own session.
///
/// Always answers 200 and clears the cookie; an unusable refresh token is
/// not an error here.
#[axum::debug_handler]
pub async fn logout(
    Extension(pool): Extension<SqlitePool>,
    Extension(codec): Extension<Arc<TokenCodec>>,
    Extension(config): Extension<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<()>>), (StatusCode, String)> {
    let refresh_token = cookies::parse_cookie(&headers, REFRESH_COOKIE);

    let auth_service = AuthService::new(&pool, &codec, &config);
    auth_service
        .logout(refresh_token.as_deref())
        .await
        .map_err(|error| service_error_to_http(error, uri.path()))?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        SET_COOKIE,
        cookies::clear_cookie(&config)
            .map_err(|error| service_error_to_http(error, uri.path()))?,
    );

    Ok((
        response_headers,
        ResponseJson(ApiResponse::message("Logged out")),
    ))
}

/// Handle an administrator's forced logout of another user.
#[axum::debug_handler]
pub async fn forced_logout(
    Extension(pool): Extension<SqlitePool>,
    Extension(codec): Extension<Arc<TokenCodec>>,
    Extension(config): Extension<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<ForcedLogoutResponse>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &codec, &config);

    match auth_service.forced_logout(&id).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(
            response,
            "Sessions revoked",
        ))),
        Err(error) => Err(service_error_to_http(error, uri.path())),
    }
}

/// Get current user information from token claims.
///
/// Deliberately answers from the claims alone: access tokens stay valid
/// for their whole lifetime even after the session is revoked, and
/// revocation takes effect at the next refresh.
#[axum::debug_handler]
pub async fn me(
    Extension(claims): Extension<Claims>,
) -> Result<ResponseJson<ApiResponse<UserInfo>>, (StatusCode, String)> {
    Ok(ResponseJson(ApiResponse::success(
        UserInfo::from(&claims),
        "Current user",
    )))
}

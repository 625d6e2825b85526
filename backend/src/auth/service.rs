//! Core business logic for the authentication system.
//!
//! Orchestrates credential verification, session persistence, and token
//! issuance. Every login atomically replaces the user's previous sessions;
//! every refresh rotates the session it is bound to.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use validator::Validate;

use crate::auth::models::*;
use crate::config::Config;
use crate::database::models::{CreateUser, Role, Session, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::session_repository::SessionRepository;
use crate::services::user_service::UserService;
use crate::utils::cookies::RefreshCookie;
use crate::utils::jwt::TokenCodec;

/// Authentication service handling login, token rotation, and logout.
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    codec: &'a TokenCodec,
    config: &'a Config,
}

impl<'a> AuthService<'a> {
    /// Creates a new AuthService instance over the shared pool, token
    /// codec, and configuration.
    pub fn new(pool: &'a SqlitePool, codec: &'a TokenCodec, config: &'a Config) -> Self {
        AuthService {
            pool,
            codec,
            config,
        }
    }

    /// Registers a new user. Only reachable through the ADMIN-gated route.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<UserInfo> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        let roles = request.roles.unwrap_or_else(|| vec![Role::User]);
        let user_service = UserService::new(self.pool);
        let (user, roles) = user_service
            .create_user(CreateUser {
                login: request.login,
                password: request.password,
                roles,
            })
            .await?;

        info!("Registered user '{}'", user.login);
        Ok(UserInfo {
            id: user.id,
            login: user.login,
            roles,
        })
    }

    /// Authenticates a user and opens their session, revoking any previous
    /// one in the same transaction that creates the new one.
    pub async fn login(
        &self,
        request: LoginRequest,
    ) -> ServiceResult<(LoginResponse, RefreshCookie)> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        let user_service = UserService::new(self.pool);
        let (user, roles) = user_service
            .authenticate(&request.login, &request.password)
            .await?;

        let refresh_ttl = self.config.refresh_ttl_seconds(request.remember);
        let now = Utc::now();
        let session_repo = SessionRepository::new(self.pool);
        let session = session_repo
            .replace_for_user(
                &user.id,
                now,
                now + Duration::seconds(refresh_ttl as i64),
                request.remember,
            )
            .await?;

        info!("User '{}' logged in", user.login);
        self.issue_tokens(&user, &roles, &session, refresh_ttl)
    }

    /// Exchanges a refresh token for a new token pair, rotating the bound
    /// session. A token whose session has already been rotated or revoked
    /// is rejected; of two concurrent refreshes exactly one wins.
    pub async fn refresh(
        &self,
        refresh_token: &str,
    ) -> ServiceResult<(LoginResponse, RefreshCookie)> {
        let claims = self.codec.verify_refresh(refresh_token)?;
        let session_id = claims.sid.as_deref().ok_or(ServiceError::TokenMalformed)?;

        let session_repo = SessionRepository::new(self.pool);
        let session = session_repo
            .find_active(session_id)
            .await?
            .ok_or(ServiceError::SessionRevoked)?;

        // The principal is reloaded so rotated tokens carry fresh roles,
        // and so a blocked account stops refreshing immediately.
        let user_service = UserService::new(self.pool);
        let (user, roles) = user_service.get_user_with_roles_required(&claims.sub).await?;
        if !user.is_active {
            return Err(ServiceError::AccountBlocked);
        }

        let refresh_ttl = self.config.refresh_ttl_seconds(session.remember);
        let now = Utc::now();
        let successor = session_repo
            .rotate(
                &session.id,
                &user.id,
                now,
                now + Duration::seconds(refresh_ttl as i64),
                session.remember,
            )
            .await?
            .ok_or(ServiceError::SessionRevoked)?;

        debug!("Rotated session for user '{}'", user.login);
        self.issue_tokens(&user, &roles, &successor, refresh_ttl)
    }

    /// Closes the caller's own session, best effort.
    ///
    /// An expired refresh cookie still identifies its session, which gets
    /// revoked; a missing or undecodable cookie is simply ignored. Token
    /// problems never fail a logout.
    pub async fn logout(&self, refresh_token: Option<&str>) -> ServiceResult<()> {
        let Some(token) = refresh_token else {
            return Ok(());
        };

        match self.codec.verify_refresh_lenient(token) {
            Ok(claims) => {
                if let Some(session_id) = claims.sid.as_deref() {
                    SessionRepository::new(self.pool).revoke(session_id).await?;
                    debug!("Revoked session on logout for user '{}'", claims.login);
                }
            }
            Err(error) => {
                debug!("Ignoring unusable refresh token on logout: {}", error);
            }
        }

        Ok(())
    }

    /// Revokes every session of the target user (administrator action).
    pub async fn forced_logout(&self, target_user_id: &str) -> ServiceResult<ForcedLogoutResponse> {
        let user_service = UserService::new(self.pool);
        let user = user_service.get_user_required(target_user_id).await?;

        let revoked_sessions = SessionRepository::new(self.pool)
            .revoke_all_for_user(&user.id)
            .await?;

        info!(
            "Forced logout of user '{}', revoked {} session(s)",
            user.login, revoked_sessions
        );
        Ok(ForcedLogoutResponse {
            user_id: user.id,
            revoked_sessions,
        })
    }

    fn issue_tokens(
        &self,
        user: &User,
        roles: &[Role],
        session: &Session,
        refresh_ttl: u64,
    ) -> ServiceResult<(LoginResponse, RefreshCookie)> {
        let access_token = self.codec.sign_access(
            &user.id,
            &user.login,
            roles,
            self.config.access_token_ttl_seconds,
        )?;
        let refresh_token =
            self.codec
                .sign_refresh(&user.id, &user.login, roles, &session.id, refresh_ttl)?;

        let response = LoginResponse {
            access_token,
            expires_in: self.config.access_token_ttl_seconds,
            user: UserInfo {
                id: user.id.clone(),
                login: user.login.clone(),
                roles: roles.to_vec(),
            },
        };
        let cookie = RefreshCookie {
            token: refresh_token,
            max_age: refresh_ttl,
        };

        Ok((response, cookie))
    }
}

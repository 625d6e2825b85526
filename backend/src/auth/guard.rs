//! Role-based authorization checks.
//!
//! Authorization is a pure set intersection over the caller's roles; the
//! routers declare which roles each endpoint requires. Failing closed, the
//! guard distinguishes "not authenticated" (401) from "authenticated but
//! not allowed" (403).

use crate::database::models::Role;
use crate::errors::{ServiceError, ServiceResult};
use crate::utils::jwt::Claims;

/// Checks a caller's roles against an endpoint's requirement.
///
/// An empty `required` set admits any authenticated caller. A caller with
/// no roles is treated as unauthenticated regardless of the requirement.
pub fn check(required: &[Role], caller: &[Role]) -> ServiceResult<()> {
    if caller.is_empty() {
        return Err(ServiceError::Unauthenticated);
    }
    if required.is_empty() {
        return Ok(());
    }
    if required.iter().any(|role| caller.contains(role)) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

/// Admits the target user themselves, or any administrator.
///
/// Used by the directory endpoints where users manage their own account but
/// administrators manage everyone's.
pub fn check_self_or_admin(caller: &Claims, target_user_id: &str) -> ServiceResult<()> {
    if caller.sub == target_user_id {
        return Ok(());
    }
    check(&[Role::Admin], &caller.roles)
}

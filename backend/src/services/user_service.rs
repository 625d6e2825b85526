//! User business logic service.
//!
//! Owns credential verification and the directory operations on user
//! accounts: creation, renaming, password changes, blocking, and role
//! management.

use sqlx::SqlitePool;
use validator::Validate;

use crate::database::models::{
    ChangePasswordRequest, ChangeRolesRequest, CreateUser, RenameUserRequest, Role, User,
    UserProfile,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::utils::password::{hash_password, verify_password};

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Verifies a login/password pair and returns the matching user with
    /// their roles.
    ///
    /// An unknown login and a wrong password fail identically, so the
    /// endpoint cannot be used to probe which logins exist. The blocked
    /// check runs only after the password has been verified.
    ///
    /// # Errors
    /// - `InvalidCredentials` for an unknown login or a wrong password
    /// - `AccountBlocked` for a correct password on a blocked account
    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> ServiceResult<(User, Vec<Role>)> {
        let repo = UserRepository::new(self.pool);

        let user = repo
            .get_user_by_login(login)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(ServiceError::AccountBlocked);
        }

        let roles = repo.get_roles(&user.id).await?;
        Ok((user, roles))
    }

    /// Creates a new user with full validation.
    ///
    /// # Errors
    /// Returns `ServiceError` for validation failures, an empty role set,
    /// or a duplicate login.
    pub async fn create_user(&self, create_user: CreateUser) -> ServiceResult<(User, Vec<Role>)> {
        if let Err(validation_errors) = create_user.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }
        if create_user.roles.is_empty() {
            return Err(ServiceError::validation("At least one role is required"));
        }

        let repo = UserRepository::new(self.pool);
        if repo.login_exists(&create_user.login).await? {
            return Err(ServiceError::already_exists("User", &create_user.login));
        }

        let password_hash = hash_password(&create_user.password)?;
        let user = repo
            .create_user(&create_user.login, &password_hash, &create_user.roles)
            .await?;

        let roles = repo.get_roles(&user.id).await?;
        Ok((user, roles))
    }

    /// Retrieves a user by ID with existence verification.
    ///
    /// # Errors
    /// Returns `ServiceError::NotFound` if the user doesn't exist
    pub async fn get_user_required(&self, id: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        Ok(user)
    }

    /// Like [`get_user_required`](Self::get_user_required), with the role
    /// set loaded alongside.
    pub async fn get_user_with_roles_required(
        &self,
        id: &str,
    ) -> ServiceResult<(User, Vec<Role>)> {
        let user = self.get_user_required(id).await?;
        let roles = UserRepository::new(self.pool).get_roles(&user.id).await?;
        Ok((user, roles))
    }

    /// Changes a user's login, rejecting collisions with other accounts.
    pub async fn rename(&self, id: &str, request: RenameUserRequest) -> ServiceResult<UserProfile> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        let repo = UserRepository::new(self.pool);
        self.get_user_required(id).await?;

        if repo.login_exists_excluding(&request.login, id).await? {
            return Err(ServiceError::already_exists("User", &request.login));
        }
        repo.update_login(id, &request.login).await?;

        // Re-read so the response carries the bumped updated_at.
        let (user, roles) = self.get_user_with_roles_required(id).await?;
        Ok(UserProfile::from_parts(user, roles))
    }

    /// Changes a user's password after verifying the current one.
    ///
    /// The new password must differ from the current one; a wrong current
    /// password surfaces as the uniform credential failure.
    pub async fn change_password(
        &self,
        id: &str,
        request: ChangePasswordRequest,
    ) -> ServiceResult<()> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        let user = self.get_user_required(id).await?;

        // The current password gates everything else: a caller who fails it
        // must not learn whether their new-password guess matched the real
        // one, so the must-differ check only runs afterwards.
        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }
        if verify_password(&request.new_password, &user.password_hash)? {
            return Err(ServiceError::validation(
                "New password must differ from the current one",
            ));
        }

        let password_hash = hash_password(&request.new_password)?;
        UserRepository::new(self.pool)
            .update_password_hash(id, &password_hash)
            .await?;

        Ok(())
    }

    /// Flips the blocked flag on a user account.
    ///
    /// Blocking does not revoke live sessions; the block takes effect at
    /// the next login or refresh.
    pub async fn toggle_blocked(&self, id: &str) -> ServiceResult<UserProfile> {
        let repo = UserRepository::new(self.pool);
        let user = self.get_user_required(id).await?;

        repo.set_active(id, !user.is_active).await?;

        let (user, roles) = self.get_user_with_roles_required(id).await?;
        Ok(UserProfile::from_parts(user, roles))
    }

    /// Grants and withdraws roles, keeping the resulting set non-empty.
    pub async fn change_roles(
        &self,
        id: &str,
        request: ChangeRolesRequest,
    ) -> ServiceResult<UserProfile> {
        if request.add_roles.is_empty() && request.remove_roles.is_empty() {
            return Err(ServiceError::validation("No role changes requested"));
        }

        let repo = UserRepository::new(self.pool);
        let user = self.get_user_required(id).await?;

        let current = repo.get_roles(id).await?;
        let resulting: Vec<Role> = current
            .iter()
            .chain(request.add_roles.iter())
            .filter(|role| !request.remove_roles.contains(role))
            .copied()
            .collect();
        if resulting.is_empty() {
            return Err(ServiceError::validation(
                "User must keep at least one role",
            ));
        }

        repo.update_roles(id, &request.add_roles, &request.remove_roles)
            .await?;

        let roles = repo.get_roles(id).await?;
        Ok(UserProfile::from_parts(user, roles))
    }
}

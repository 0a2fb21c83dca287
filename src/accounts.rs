//! Users, roles and the many-to-many link between them.

use crate::{
    auth,
    config::AppConfig,
    error::AppError,
    models::{
        CreateUserRequest, LoginRequest, NewUser, Role, RoleType, SignupRequest, TokenResponse,
        UpdateUserRequest, User,
    },
    repository::Repository,
};

/// Argon2 is deliberately slow; keep it off the async workers.
async fn hash_off_thread(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
}

async fn verify_off_thread(password_hash: String, password: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || auth::verify_password(&password_hash, &password))
        .await
        .map_err(|e| AppError::Internal(format!("password verification task failed: {e}")))
}

/// resolve_roles
///
/// Every supplied id must name an existing role. Duplicate ids are collapsed first;
/// if fewer roles resolve than distinct ids were given, the whole request is rejected.
pub async fn resolve_roles(repo: &dyn Repository, role_ids: &[i64]) -> Result<Vec<Role>, AppError> {
    let mut ids = role_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Err(AppError::Validation(
            "A user must have at least one role.".to_string(),
        ));
    }

    let roles = repo.get_roles_by_ids(&ids).await?;
    if roles.len() < ids.len() {
        tracing::debug!(requested = ?ids, resolved = roles.len(), "role resolution failed");
        return Err(AppError::Validation("Some role ids were invalid.".to_string()));
    }
    Ok(roles)
}

async fn ensure_email_available(
    repo: &dyn Repository,
    email: &str,
    owner: Option<i64>,
) -> Result<(), AppError> {
    match repo.get_user_by_email(email).await? {
        Some(existing) if Some(existing.id) != owner => Err(AppError::Validation(
            "A user already exists with this email.".to_string(),
        )),
        _ => Ok(()),
    }
}

/// create_user
///
/// Administrative creation with an explicit role selection. Roles are resolved
/// before anything is written, so an invalid id leaves no user behind.
pub async fn create_user(repo: &dyn Repository, req: CreateUserRequest) -> Result<User, AppError> {
    req.validate()?;
    ensure_email_available(repo, &req.email, None).await?;

    let roles = resolve_roles(repo, &req.role_ids).await?;
    let role_ids: Vec<i64> = roles.iter().map(|r| r.id).collect();
    let password_hash = hash_off_thread(req.password).await?;

    let user = repo
        .create_user(
            NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
                address: req.address,
                phone: req.phone,
            },
            &role_ids,
        )
        .await?;

    tracing::info!(user_id = user.id, roles = ?user.role_types(), "user created");
    Ok(user)
}

/// signup
///
/// Self-registration. The new account always gets exactly the customer role; any
/// role selection in the payload is ignored.
pub async fn signup(repo: &dyn Repository, req: SignupRequest) -> Result<User, AppError> {
    req.validate()?;
    if req.role_ids.is_some() {
        tracing::debug!(email = %req.email, "ignoring role selection on signup");
    }
    ensure_email_available(repo, &req.email, None).await?;

    let customer = repo
        .get_role_by_type(RoleType::Customer)
        .await?
        .ok_or_else(|| AppError::Internal("the customer role is not configured".to_string()))?;
    let password_hash = hash_off_thread(req.password).await?;

    let user = repo
        .create_user(
            NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
                address: req.address,
                phone: req.phone,
            },
            &[customer.id],
        )
        .await?;

    tracing::info!(user_id = user.id, "customer signed up");
    Ok(user)
}

/// login
///
/// Verifies the credentials and issues a token carrying the user's role types.
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    repo: &dyn Repository,
    config: &AppConfig,
    req: LoginRequest,
) -> Result<TokenResponse, AppError> {
    let invalid = || AppError::Unauthorized("Incorrect email or password.".to_string());

    let user = repo.get_user_by_email(&req.email).await?.ok_or_else(invalid)?;

    if !verify_off_thread(user.password_hash.clone(), req.password).await? {
        tracing::warn!(user_id = user.id, "failed login attempt");
        return Err(invalid());
    }

    auth::issue_token(config, user.id, &user.role_types())
}

/// update_user
///
/// Patch semantics: only supplied fields change. A new password is re-hashed and
/// `role_ids`, when present, replaces the role set under the same resolution rules
/// as creation.
pub async fn update_user(
    repo: &dyn Repository,
    id: i64,
    req: UpdateUserRequest,
) -> Result<Option<User>, AppError> {
    req.validate()?;

    let Some(mut user) = repo.get_user(id).await? else {
        return Ok(None);
    };

    if let Some(email) = &req.email {
        ensure_email_available(repo, email, Some(id)).await?;
    }

    let role_ids = match &req.role_ids {
        Some(ids) => Some(
            resolve_roles(repo, ids)
                .await?
                .iter()
                .map(|r| r.id)
                .collect::<Vec<_>>(),
        ),
        None => None,
    };

    req.apply(&mut user);
    if let Some(password) = req.password {
        user.password_hash = hash_off_thread(password).await?;
    }

    Ok(repo.update_user(&user, role_ids.as_deref()).await?)
}

/// delete_user
///
/// Restricted while the user still owns orders.
pub async fn delete_user(repo: &dyn Repository, id: i64) -> Result<bool, AppError> {
    if repo.get_user(id).await?.is_none() {
        return Ok(false);
    }
    if !repo.list_orders_for_client(id).await?.is_empty() {
        return Err(AppError::Conflict(
            "The user still has orders and cannot be deleted.".to_string(),
        ));
    }
    Ok(repo.delete_user(id).await?)
}

// --- Roles ---

pub async fn create_role(repo: &dyn Repository, role_type: RoleType) -> Result<Role, AppError> {
    if repo.get_role_by_type(role_type).await?.is_some() {
        return Err(AppError::Validation(
            "A role already exists with this role type.".to_string(),
        ));
    }
    Ok(repo.create_role(role_type).await?)
}

/// update_role
///
/// The new type must not belong to another role, and a role held by users is
/// immutable. Re-submitting the current type is a no-op.
pub async fn update_role(
    repo: &dyn Repository,
    id: i64,
    role_type: RoleType,
) -> Result<Option<Role>, AppError> {
    let Some(mut role) = repo.get_role(id).await? else {
        return Ok(None);
    };
    if role.role_type == role_type {
        return Ok(Some(role));
    }

    if let Some(other) = repo.get_role_by_type(role_type).await? {
        if other.id != id {
            return Err(AppError::Validation(
                "Another role with the same role type already exists.".to_string(),
            ));
        }
    }
    if repo.count_role_holders(id).await? > 0 {
        return Err(AppError::Conflict(
            "The role is assigned to users and cannot be changed.".to_string(),
        ));
    }

    role.role_type = role_type;
    Ok(repo.update_role(&role).await?)
}

pub async fn delete_role(repo: &dyn Repository, id: i64) -> Result<bool, AppError> {
    if repo.get_role(id).await?.is_none() {
        return Ok(false);
    }
    let holders = repo.count_role_holders(id).await?;
    if holders > 0 {
        return Err(AppError::Conflict(format!(
            "The role is assigned to {holders} user(s) and cannot be deleted."
        )));
    }
    Ok(repo.delete_role(id).await?)
}

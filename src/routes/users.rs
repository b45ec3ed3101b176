/// User Routes
///
/// Registration, self-service profile endpoints, and admin management of
/// other users. Guards are applied by scope in `startup`.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{hash_password, AccessClaims, TokenService};
use crate::error::{AppError, DatabaseError, ErrorContext};
use crate::routes::blocking;
use crate::user_store::{Role, User, UserStore};
use crate::validators::{is_valid_email, is_valid_name};

/// New user request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Profile changes a user may make to their own record
#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Profile changes plus role, admin only
#[derive(Deserialize)]
pub struct AdminUpdateUserRequest {
    #[serde(flatten)]
    pub profile: UpdateProfileRequest,
    pub role: Option<Role>,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Public view of a user; never includes credentials or token state
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

async fn load_user(users: &dyn UserStore, id: Uuid) -> Result<User, AppError> {
    users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::Database(DatabaseError::NotFound(format!("user {}", id))))
}

/// Apply the present fields of `changes` to `user`.
///
/// Returns true if the password changed, in which case the caller must
/// revoke the user's refresh token once the update is stored.
async fn apply_profile_changes(
    user: &mut User,
    changes: &UpdateProfileRequest,
) -> Result<bool, AppError> {
    let mut password_changed = false;
    if let Some(email) = &changes.email {
        user.email = is_valid_email(email)?;
    }
    if let Some(name) = &changes.name {
        user.name = is_valid_name(name)?;
    }
    if let Some(password) = &changes.password {
        let password = password.clone();
        user.password_hash = blocking(move || hash_password(&password)).await?;
        password_changed = true;
    }
    user.touch();
    Ok(password_changed)
}

/// POST /users
///
/// Register a new user. The role is always `standard`; only an admin can
/// promote a user afterwards.
///
/// # Errors
/// - 400: Validation errors (invalid email/password/name)
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_creation");

    let email = is_valid_email(&form.email)?;
    let name = is_valid_name(&form.name)?;
    let password = form.password.clone();
    let password_hash = blocking(move || hash_password(&password)).await?;

    let user = User::new(email, name, password_hash, Role::Standard);
    users.insert(&user).await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = %user.id,
        "User created"
    );

    Ok(HttpResponse::Created().json(CreatedResponse { id: user.id }))
}

/// GET /users (admin)
pub async fn list_users(users: web::Data<dyn UserStore>) -> Result<HttpResponse, AppError> {
    let all = users.list().await?;
    let body: Vec<UserResponse> = all.iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /users/me
///
/// # Errors
/// - 404: The account was deleted after the token was issued
pub async fn get_me(
    claims: web::ReqData<AccessClaims>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user = load_user(users.get_ref(), claims.id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// PUT /users/me
///
/// Accepts `email`, `name` and `password`; absent fields are left untouched.
pub async fn update_me(
    claims: web::ReqData<AccessClaims>,
    body: web::Json<UpdateProfileRequest>,
    users: web::Data<dyn UserStore>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("profile_update").with_user_id(claims.id);

    let mut user = load_user(users.get_ref(), claims.id).await?;
    let password_changed = apply_profile_changes(&mut user, &body).await?;
    users.update(&user).await?;
    if password_changed {
        tokens.revoke_refresh_token(user.id).await?;
    }

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = %user.id,
        "Profile updated"
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// DELETE /users/me
pub async fn delete_me(
    claims: web::ReqData<AccessClaims>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    delete_by_id(users.get_ref(), claims.id).await
}

/// GET /users/{user_id} (admin)
pub async fn get_user(
    path: web::Path<Uuid>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user = load_user(users.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// PUT /users/{user_id} (admin)
///
/// Like `PUT /users/me`, plus `role`. Changing the role or the password
/// clears the user's stored refresh token, so the change takes effect no
/// later than the expiry of their current access token.
pub async fn update_user(
    claims: web::ReqData<AccessClaims>,
    path: web::Path<Uuid>,
    body: web::Json<AdminUpdateUserRequest>,
    users: web::Data<dyn UserStore>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("admin_user_update").with_user_id(claims.id);
    let body = body.into_inner();

    let mut user = load_user(users.get_ref(), path.into_inner()).await?;
    let mut revoke = apply_profile_changes(&mut user, &body.profile).await?;
    if let Some(role) = body.role {
        if role != user.role {
            user.role = role;
            revoke = true;
        }
    }
    users.update(&user).await?;
    if revoke {
        tokens.revoke_refresh_token(user.id).await?;
    }

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        admin_id = %claims.id,
        user_id = %user.id,
        role = %user.role,
        "User updated by admin"
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// DELETE /users/{user_id} (admin)
pub async fn delete_user(
    claims: web::ReqData<AccessClaims>,
    path: web::Path<Uuid>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let target = path.into_inner();
    tracing::info!(admin_id = %claims.id, user_id = %target, "Admin deleting user");
    delete_by_id(users.get_ref(), target).await
}

async fn delete_by_id(users: &dyn UserStore, id: Uuid) -> Result<HttpResponse, AppError> {
    if !users.delete(id).await? {
        return Err(AppError::Database(DatabaseError::NotFound(format!("user {}", id))));
    }

    tracing::info!(user_id = %id, "User deleted");
    Ok(HttpResponse::NoContent().finish())
}

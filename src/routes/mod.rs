mod auth;
mod health_check;
mod users;

pub use auth::{login, logout, refresh};
pub use health_check::health_check;
pub use users::{
    create_user, delete_me, delete_user, get_me, get_user, list_users, update_me, update_user,
};

use actix_web::web;

use crate::error::AppError;

/// Run CPU-bound work (bcrypt) on the blocking thread pool
pub(crate) async fn blocking<F, R>(f: F) -> Result<R, AppError>
where
    F: FnOnce() -> Result<R, AppError> + Send + 'static,
    R: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}

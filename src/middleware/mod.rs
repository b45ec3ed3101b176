/// Middleware module
///
/// Authentication and authorization guards for protected scopes.

mod admin_middleware;
mod jwt_middleware;

pub use admin_middleware::AdminMiddleware;
pub use jwt_middleware::JwtMiddleware;

/// JWT Authentication Middleware
///
/// Verifies the bearer access token from the Authorization header and injects
/// its `AccessClaims` into request extensions for handlers and later guards.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::TokenService;
use crate::error::{AppError, AuthError};

/// Guard for routes that require an authenticated caller
///
/// Missing or malformed header answers 401 `UNAUTHORIZED`; a token that fails
/// verification answers 401 `TOKEN_INVALID`.
pub struct JwtMiddleware {
    tokens: TokenService,
}

impl JwtMiddleware {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    tokens: TokenService,
}

/// Token from an `Authorization: Bearer <token>` header, if well formed
fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = match bearer_token(&req) {
            Some(token) => token,
            None => {
                tracing::warn!(path = %req.path(), "Missing or invalid Authorization header");
                let err = Error::from(AppError::Auth(AuthError::MissingToken));
                return Box::pin(async move { Err(err) });
            }
        };

        match self.tokens.verify_access_token(&token) {
            Ok(claims) => {
                tracing::debug!(
                    user_id = %claims.id,
                    role = %claims.role,
                    "Access token verified"
                );
                req.extensions_mut().insert(claims);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(kind) => {
                tracing::warn!(path = %req.path(), reason = %kind, "Access token rejected");
                let err = Error::from(AppError::from(kind));
                Box::pin(async move { Err(err) })
            }
        }
    }
}

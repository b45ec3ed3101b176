/// Admin Authorization Middleware
///
/// Must be wrapped inside `JwtMiddleware` (registered before it with
/// `.wrap`), since it only reads the claims that middleware injects.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::AccessClaims;
use crate::error::{AppError, AuthError};

/// Guard that lets only `admin` callers through; others get 403 `FORBIDDEN`
pub struct AdminMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AdminMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AdminMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AdminMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminMiddlewareService<S>
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
        let decision = match req.extensions().get::<AccessClaims>() {
            None => Err(AuthError::MissingToken),
            Some(claims) if claims.is_admin() => Ok(()),
            Some(claims) => {
                tracing::warn!(
                    user_id = %claims.id,
                    path = %req.path(),
                    "Admin access denied"
                );
                Err(AuthError::Forbidden)
            }
        };

        match decision {
            Ok(()) => {
                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                let err = Error::from(AppError::Auth(e));
                Box::pin(async move { Err(err) })
            }
        }
    }
}

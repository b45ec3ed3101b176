use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Per-request logging middleware
///
/// Opens a `request` span carrying a fresh request id, then logs the start
/// and the outcome (status, latency) of every request. Query strings and
/// headers are never logged, since they may carry tokens.
pub struct LoggerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
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
        let start_time = Instant::now();
        let span = tracing::info_span!(
            "request",
            request_id = %Uuid::new_v4(),
            method = %req.method(),
            path = %req.path(),
        );

        let service = self.service.clone();

        Box::pin(
            async move {
                tracing::info!("Request started");

                let result = service.call(req).await;
                let elapsed_ms = start_time.elapsed().as_millis() as u64;

                match &result {
                    Ok(res) => tracing::info!(
                        status = res.status().as_u16(),
                        elapsed_ms,
                        "Request completed"
                    ),
                    // errors from guards become responses further out
                    Err(e) => tracing::info!(
                        status = e.as_response_error().status_code().as_u16(),
                        elapsed_ms,
                        "Request completed with error"
                    ),
                }

                result
            }
            .instrument(span),
        )
    }
}

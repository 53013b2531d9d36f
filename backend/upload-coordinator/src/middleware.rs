//! Correlation middleware: installs the ambient [`CorrelationContext`] for
//! the lifetime of one request, sourced from the `x-correlation-id` and
//! `traceparent` headers (generating fresh identifiers for whichever is
//! missing) so every downstream log line and outbound event carries them.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use correlation_context::{CorrelationContext, HTTP_CORRELATION_ID_HEADER, HTTP_TRACEPARENT_HEADER};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

#[derive(Clone, Default)]
pub struct CorrelationMiddleware;

impl<S, B> Transform<S, ServiceRequest> for CorrelationMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CorrelationMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorrelationMiddlewareService { service }))
    }
}

pub struct CorrelationMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for CorrelationMiddlewareService<S>
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
        let correlation_id = req
            .headers()
            .get(HTTP_CORRELATION_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let traceparent = req
            .headers()
            .get(HTTP_TRACEPARENT_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        let ctx = CorrelationContext::from_parts(correlation_id, traceparent.as_deref());
        let fut = self.service.call(req);
        Box::pin(ctx.scope(fut))
    }
}

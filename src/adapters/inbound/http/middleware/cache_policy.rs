use axum::{body::Body, http::Request, response::Response};
use futures::future::BoxFuture;
use http::{header::CACHE_CONTROL, HeaderValue};
use std::{
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::{domain::models::RouteClass, services::RoutingPolicy};

/// Tower layer that stamps `Cache-Control` on every portal response.
///
/// Handlers tag successful responses with their [`RouteClass`] as a response
/// extension; the layer turns that into the class's directive. Anything that
/// is not a success, or carries no class, is `no-store`.
#[derive(Clone)]
pub struct CachePolicyLayer {
    policy: Arc<RoutingPolicy>,
}

impl CachePolicyLayer {
    pub fn new(policy: Arc<RoutingPolicy>) -> Self {
        CachePolicyLayer { policy }
    }
}

impl<S> Layer<S> for CachePolicyLayer
where
    S: Service<Request<Body>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Service = CachePolicyMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CachePolicyMiddleware {
            inner,
            policy: self.policy.clone(),
        }
    }
}

#[derive(Clone)]
pub struct CachePolicyMiddleware<S> {
    inner: S,
    policy: Arc<RoutingPolicy>,
}

impl<S> Service<Request<Body>> for CachePolicyMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let future = self.inner.call(req);
        let policy = self.policy.clone();

        Box::pin(async move {
            let mut response = future.await?;

            let class = response.extensions().get::<RouteClass>().copied();
            let directive = match class {
                Some(class) if response.status().is_success() => {
                    policy.cache_directive(class).header_value()
                }
                _ => "no-store".to_string(),
            };

            if let Ok(value) = HeaderValue::from_str(&directive) {
                response.headers_mut().insert(CACHE_CONTROL, value);
            }
            Ok(response)
        })
    }
}

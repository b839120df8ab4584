//! Handlers, services, and type erasure.
//!
//! A [`Handler`] is what you register on a [`Router`](crate::Router): any
//! `async fn(Request) -> impl IntoResponse`. A [`Service`] is what a
//! [`Server`](crate::Server) drives: the router itself, or the router wrapped
//! in [`Metered`](crate::middleware::Metered).
//!
//! Both return a [`BoxFuture`], so a router can store handlers of different
//! concrete types behind one `Arc<dyn Handler>` and a wrapper can time the
//! inner future without knowing its type.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Implemented for every `Fn(Request) -> impl Future<Output = impl IntoResponse>`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = self(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

pub(crate) type BoxedHandler = Arc<dyn Handler>;

/// One request in, one response out. What [`Server`](crate::Server) serves.
pub trait Service: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

impl<S: Service + ?Sized> Service for Arc<S> {
    fn call(&self, req: Request) -> BoxFuture {
        (**self).call(req)
    }
}

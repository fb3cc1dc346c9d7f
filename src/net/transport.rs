//! Transport contract.
//!
//! The pipeline's sink: takes a fully formed request, performs the network
//! exchange, and returns a response or a transport failure. Connection
//! pooling, TLS and protocol framing are the implementation's business.

use futures_util::future::BoxFuture;

use crate::error::Result;
use crate::http::{Request, Response};

/// Performs the actual network exchange.
pub trait Transport: Send + Sync {
    fn handle(&self, request: Request) -> BoxFuture<'_, Result<Response>>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn handle(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        (**self).handle(request)
    }
}

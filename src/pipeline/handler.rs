//! Handler contract and chain cursor.
//!
//! # Responsibilities
//! - Define the single capability every interceptor implements
//! - Walk the chain by index; the final link calls the transport
//! - Strip the per-call options side-channel before the transport sees the request
//!
//! # Design Decisions
//! - `Next` is `Copy`, so retry and redirect loops can run the rest of the
//!   chain as many times as they need
//! - Handlers hold configuration only; per-call state lives in the call frame

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::Result;
use crate::http::{Request, Response};
use crate::net::Transport;

/// One interceptor in the pipeline.
pub trait Handler: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Inspect or mutate `request`, hand it to `next` zero or more times, and
    /// return exactly one response (or fail).
    fn send<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>>;
}

/// The remainder of the chain after the current handler.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    handlers: &'a [Arc<dyn Handler>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    pub fn new(handlers: &'a [Arc<dyn Handler>], transport: &'a dyn Transport) -> Self {
        Self {
            handlers,
            transport,
        }
    }

    /// Number of handlers still ahead of the transport.
    pub fn remaining(&self) -> usize {
        self.handlers.len()
    }

    /// Send `request` through the rest of the chain.
    pub fn run(self, mut request: Request) -> BoxFuture<'a, Result<Response>> {
        match self.handlers.split_first() {
            Some((current, rest)) => {
                let next = Next {
                    handlers: rest,
                    transport: self.transport,
                };
                current.send(request, next)
            }
            None => {
                let transport = self.transport;
                Box::pin(async move {
                    request.options_mut().clear();
                    let head = request.head();
                    let mut response = transport.handle(request).await?;
                    response.set_request(head);
                    Ok(response)
                })
            }
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field(
                "handlers",
                &self.handlers.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

//! Outbound request pipeline.
//!
//! # Data Flow
//! ```text
//! Pipeline::send(request)
//!     → handler[0].send(request, next)
//!     → handler[1].send(request, next)
//!     → ...
//!     → transport.handle(request)   (options stripped, head recorded)
//!     ← response travels back up through every handler in reverse
//! ```
//!
//! # Design Decisions
//! - The chain is a fixed slice once built; handlers are shared by `Arc`
//! - A pipeline is `Send + Sync` and serves concurrent calls without locks
//! - Zero handlers is valid: the request goes straight to the transport

pub mod builder;
pub mod handler;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::Result;
use crate::http::{Request, Response};
use crate::net::Transport;

pub use builder::PipelineBuilder;
pub use handler::{Handler, Next};

/// An ordered chain of handlers ending in a transport.
#[derive(Clone)]
pub struct Pipeline {
    handlers: Vec<Arc<dyn Handler>>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    /// Create a pipeline with no handlers.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            handlers: Vec::new(),
            transport: Arc::new(transport),
        }
    }

    pub(crate) fn from_parts(handlers: Vec<Arc<dyn Handler>>, transport: Arc<dyn Transport>) -> Self {
        Self {
            handlers,
            transport,
        }
    }

    /// Append a handler after the ones already installed.
    pub fn add(&mut self, handler: impl Handler + 'static) {
        self.handlers.push(Arc::new(handler));
    }

    pub fn with(mut self, handler: impl Handler + 'static) -> Self {
        self.add(handler);
        self
    }

    /// Names of the installed handlers, outermost first.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Send a request through every handler and the transport.
    #[instrument(skip_all, fields(request_id = %request.id(), method = %request.method(), url = %request.url()))]
    pub async fn send(&self, request: Request) -> Result<Response> {
        let response = Next::new(&self.handlers, self.transport.as_ref())
            .run(request)
            .await?;
        debug!(status = response.status().as_u16(), "Pipeline call completed");
        Ok(response)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("handlers", &self.handler_names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{response, ScriptedTransport};
    use futures_util::future::BoxFuture;
    use http::{HeaderName, HeaderValue};
    use url::Url;

    static TRAIL: HeaderName = HeaderName::from_static("x-trail");

    struct Marker(&'static str);

    #[derive(Clone, Debug, PartialEq)]
    struct Unwound(Vec<&'static str>);

    impl Handler for Marker {
        fn name(&self) -> &'static str {
            self.0
        }

        fn send<'a>(&'a self, mut request: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response>> {
            Box::pin(async move {
                request
                    .headers_mut()
                    .append(&TRAIL, HeaderValue::from_static(self.0));
                let mut response = next.run(request).await?;
                let mut unwound = response
                    .extensions_mut()
                    .remove::<Unwound>()
                    .unwrap_or(Unwound(Vec::new()));
                unwound.0.push(self.0);
                response.extensions_mut().insert(unwound);
                Ok(response)
            })
        }
    }

    fn request() -> Request {
        Request::get(Url::parse("https://example.com/").unwrap())
    }

    #[tokio::test]
    async fn test_empty_pipeline_forwards_to_transport() {
        let transport = ScriptedTransport::new(vec![response(204, &[])]);
        let pipeline = Pipeline::new(transport.clone());

        let response = pipeline.send(request()).await.unwrap();

        assert_eq!(response.status(), 204);
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(response.request().unwrap().url.as_str(), "https://example.com/");
    }

    #[tokio::test]
    async fn test_handlers_run_in_order_and_unwind_in_reverse() {
        let transport = ScriptedTransport::new(vec![]);
        let pipeline = Pipeline::new(transport.clone())
            .with(Marker("a"))
            .with(Marker("b"))
            .with(Marker("c"));
        assert_eq!(pipeline.handler_names(), vec!["a", "b", "c"]);

        let response = pipeline.send(request()).await.unwrap();

        let seen = transport.requests();
        let trail: Vec<_> = seen[0]
            .head
            .headers
            .get_all(&TRAIL)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(trail, vec!["a", "b", "c"]);
        assert_eq!(
            response.extensions().get::<Unwound>(),
            Some(&Unwound(vec!["c", "b", "a"]))
        );
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let pipeline = Pipeline::new(ScriptedTransport::failing()).with(Marker("a"));
        let err = pipeline.send(request()).await.unwrap_err();
        assert!(matches!(err, crate::error::PipelineError::Transport(_)));
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_pipeline() {
        let transport = ScriptedTransport::new(vec![]);
        let pipeline = Arc::new(Pipeline::new(transport.clone()).with(Marker("a")));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let pipeline = pipeline.clone();
                tokio::spawn(async move { pipeline.send(request()).await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().status(), 200);
        }
        assert_eq!(transport.requests().len(), 8);
    }
}

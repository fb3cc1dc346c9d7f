//! End-to-end tests: default pipeline over the reqwest transport against
//! local mock backends.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use http::header::{AUTHORIZATION, COOKIE, USER_AGENT};
use http::{HeaderValue, Method};
use url::Url;

use request_pipeline::config::TimeoutConfig;
use request_pipeline::middleware::{InspectedHeaders, RetryOptions};
use request_pipeline::{
    Pipeline, PipelineConfig, PipelineError, ReqwestTransport, Request, RequestOptions,
};

mod common;
use common::Reply;

fn pipeline(config: &PipelineConfig) -> Pipeline {
    let transport = ReqwestTransport::new(&config.timeouts).unwrap();
    Pipeline::from_config(config, transport).unwrap()
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[tokio::test]
async fn test_retry_until_success() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let (addr, log) = common::start_programmable_backend(move |_| {
        let counter = counter.clone();
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Reply::new(503, "Service Unavailable").header("Retry-After", "0")
            } else {
                Reply::new(200, "Success")
            }
        }
    })
    .await;

    let pipeline = pipeline(&PipelineConfig::default());
    let response = pipeline
        .send(Request::get(url(&format!("http://{addr}/flaky"))))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.body().as_ref(), b"Success");

    let received = log.lock().unwrap().clone();
    assert_eq!(received.len(), 3);
    assert_eq!(received[0].header("retry-attempt"), None);
    assert_eq!(received[1].header("retry-attempt"), Some("1"));
    assert_eq!(received[2].header("retry-attempt"), Some("2"));
}

#[tokio::test]
async fn test_retry_exhaustion_returns_last_response() {
    let (addr, log) = common::start_programmable_backend(|_| async {
        Reply::new(429, "slow down").header("Retry-After", "0")
    })
    .await;

    let mut config = PipelineConfig::default();
    config.retry = RetryOptions {
        max_retries: 2,
        ..RetryOptions::default()
    };
    let response = pipeline(&config)
        .send(Request::get(url(&format!("http://{addr}/busy"))))
        .await
        .unwrap();

    assert_eq!(response.status(), 429);
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_redirect_chain_post_becomes_get() {
    let (addr, log) = common::start_programmable_backend(|req| async move {
        match req.target.as_str() {
            "/submit" => Reply::new(303, "").header("Location", "/step"),
            "/step" => Reply::new(302, "").header("Location", "/done"),
            _ => Reply::new(200, "landed"),
        }
    })
    .await;

    let request = Request::new(Method::POST, url(&format!("http://{addr}/submit")))
        .with_header(COOKIE, HeaderValue::from_static("session=1"))
        .with_body("form=1");
    let response = pipeline(&PipelineConfig::default()).send(request).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.body().as_ref(), b"landed");
    let hops: Vec<_> = response.history().iter().map(|h| h.url.path().to_string()).collect();
    assert_eq!(hops, ["/submit", "/step"]);
    assert_eq!(response.request().unwrap().url.path(), "/done");

    let received = log.lock().unwrap().clone();
    assert_eq!(received.len(), 3);
    assert_eq!(received[0].method, "POST");
    assert_eq!(received[0].body, b"form=1");
    assert_eq!(received[0].header("cookie"), Some("session=1"));
    assert_eq!(received[1].method, "GET");
    assert!(received[1].body.is_empty());
    assert_eq!(received[1].header("cookie"), None);
    assert_eq!(received[2].method, "GET");
}

#[tokio::test]
async fn test_redirect_loop_is_capped() {
    let (addr, log) = common::start_programmable_backend(|_| async {
        Reply::new(302, "").header("Location", "/again")
    })
    .await;

    let err = pipeline(&PipelineConfig::default())
        .send(Request::get(url(&format!("http://{addr}/again"))))
        .await
        .unwrap_err();

    match err {
        PipelineError::TooManyRedirects {
            max_redirects,
            history,
        } => {
            assert_eq!(max_redirects, 5);
            assert_eq!(history.len(), 5);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(log.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn test_cross_host_redirect_drops_authorization() {
    let (target, target_log) =
        common::start_programmable_backend(|_| async { Reply::new(200, "target") }).await;
    let location = format!("http://localhost:{}/landing", target.port());
    let (origin, origin_log) = common::start_programmable_backend(move |_| {
        let location = location.clone();
        async move { Reply::new(307, "").header("Location", location) }
    })
    .await;

    let request = Request::get(url(&format!("http://{origin}/start")))
        .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
    let response = pipeline(&PipelineConfig::default()).send(request).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        origin_log.lock().unwrap()[0].header("authorization"),
        Some("Bearer secret")
    );
    let landed = target_log.lock().unwrap()[0].clone();
    assert_eq!(landed.header("authorization"), None);
    assert_eq!(landed.header("host"), Some(format!("localhost:{}", target.port()).as_str()));
}

#[tokio::test]
async fn test_query_names_decoded_on_the_wire() {
    let (addr, log) =
        common::start_programmable_backend(|_| async { Reply::new(200, "[]") }).await;

    let request = Request::get(url(&format!(
        "http://{addr}/users?%24select=name&api%2Dversion=2&q=%24keep"
    )));
    pipeline(&PipelineConfig::default()).send(request).await.unwrap();

    let received = log.lock().unwrap()[0].clone();
    assert_eq!(received.target, "/users?$select=name&api-version=2&q=%24keep");
}

#[tokio::test]
async fn test_user_agent_and_inspection() {
    let (addr, log) = common::start_programmable_backend(|_| async {
        Reply::new(200, "ok").header("X-Served-By", "mock")
    })
    .await;

    let request = Request::get(url(&format!("http://{addr}/")))
        .with_header(USER_AGENT, HeaderValue::from_static("custom/1.0"));
    let response = pipeline(&PipelineConfig::default()).send(request).await.unwrap();

    let agent = log.lock().unwrap()[0].header("user-agent").unwrap().to_string();
    assert_eq!(
        agent,
        format!("custom/1.0 request-pipeline/{}", env!("CARGO_PKG_VERSION"))
    );

    let inspected = response.extensions().get::<InspectedHeaders>().unwrap();
    assert_eq!(inspected.request[USER_AGENT].to_str().unwrap(), agent);
    assert_eq!(inspected.response["x-served-by"], "mock");
}

#[tokio::test]
async fn test_per_request_override_disables_retry() {
    let (addr, log) =
        common::start_programmable_backend(|_| async { Reply::new(503, "down") }).await;

    let options = RetryOptions {
        should_retry: false,
        ..RetryOptions::default()
    };
    let request = Request::get(url(&format!("http://{addr}/")))
        .with_options(RequestOptions::new().with(options));
    let response = pipeline(&PipelineConfig::default()).send(request).await.unwrap();

    assert_eq!(response.status(), 503);
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_deadline_cuts_backoff_short() {
    let (addr, _log) = common::start_programmable_backend(|_| async {
        Reply::new(503, "").header("Retry-After", "5")
    })
    .await;

    let request =
        Request::get(url(&format!("http://{addr}/"))).with_timeout(Duration::from_millis(300));
    let err = pipeline(&PipelineConfig::default())
        .send(request)
        .await
        .unwrap_err();

    assert!(err.is_deadline());
}

#[tokio::test]
async fn test_transport_error_surfaces() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = PipelineConfig {
        timeouts: TimeoutConfig {
            connect_secs: 2,
            request_secs: 5,
        },
        ..PipelineConfig::default()
    };
    let err = pipeline(&config)
        .send(Request::get(url(&format!("http://{addr}/"))))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Transport(_)));
}

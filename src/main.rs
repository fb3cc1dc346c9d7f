//! request-pipeline CLI
//!
//! Sends one request through the default pipeline and prints the response.
//!
//! ```text
//! request-pipeline <URL> [-X METHOD] [-H 'Name: value']... [-d BODY]
//!                  [--config FILE] [--deadline-secs N] [--no-redirect] [--json]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::{json, Map, Value};
use url::Url;

use request_pipeline::http::RequestOptions;
use request_pipeline::middleware::{InspectedHeaders, RedirectOptions};
use request_pipeline::observability::{logging, metrics};
use request_pipeline::{load_config, Pipeline, PipelineConfig, ReqwestTransport, Request, Response};

#[derive(Parser)]
#[command(name = "request-pipeline")]
#[command(version, about = "Send an HTTP request through the middleware pipeline", long_about = None)]
struct Cli {
    /// Target URL
    url: Url,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Request header, `Name: value` (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Request body
    #[arg(short = 'd', long)]
    data: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overall deadline for the call, retries and redirects included
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Return redirect responses instead of following them
    #[arg(long)]
    no_redirect: bool,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    logging::init_logging(&config.observability);

    let recorder = if config.observability.metrics_enabled {
        match metrics::init_metrics() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install metrics recorder");
                None
            }
        }
    } else {
        None
    };

    let transport = ReqwestTransport::new(&config.timeouts)?;
    let pipeline = Pipeline::from_config(&config, transport)?;

    let request = build_request(&cli, &config)?;
    tracing::debug!(request_id = %request.id(), "Sending request");

    let response = pipeline.send(request).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&response))?);
    } else {
        print_response(&response);
    }

    if let Some(handle) = recorder {
        eprintln!("{}", handle.render());
    }

    Ok(())
}

fn build_request(cli: &Cli, config: &PipelineConfig) -> Result<Request, Box<dyn std::error::Error>> {
    let method = Method::from_bytes(cli.method.to_ascii_uppercase().as_bytes())?;
    let mut request = Request::new(method, cli.url.clone());

    for raw in &cli.headers {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| format!("invalid header {raw:?}, expected 'Name: value'"))?;
        request.headers_mut().append(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }

    if let Some(data) = &cli.data {
        request = request.with_body(data.clone());
    }
    if let Some(secs) = cli.deadline_secs {
        request = request.with_timeout(Duration::from_secs(secs));
    }
    if cli.no_redirect {
        let options = RedirectOptions {
            should_redirect: false,
            ..config.redirect.clone()
        };
        request = request.with_options(RequestOptions::new().with(options));
    }

    Ok(request)
}

fn print_response(response: &Response) {
    for hop in response.history() {
        eprintln!("> {} {} (redirected)", hop.method, hop.url);
    }
    if let Some(request) = response.request() {
        eprintln!("> {} {}", request.method, request.url);
    }
    eprintln!("< {}", response.status());
    for (name, value) in response.headers() {
        eprintln!("< {}: {}", name, String::from_utf8_lossy(value.as_bytes()));
    }
    println!("{}", String::from_utf8_lossy(response.body()));
}

fn to_json(response: &Response) -> Value {
    let history: Vec<Value> = response
        .history()
        .iter()
        .map(|hop| json!({ "method": hop.method.as_str(), "url": hop.url.as_str() }))
        .collect();

    let inspected = response.extensions().get::<InspectedHeaders>().map(|captured| {
        json!({
            "request": headers_json(&captured.request),
            "response": headers_json(&captured.response),
        })
    });

    json!({
        "status": response.status().as_u16(),
        "url": response.request().map(|r| r.url.as_str()),
        "headers": headers_json(response.headers()),
        "history": history,
        "inspected_headers": inspected,
        "body": String::from_utf8_lossy(response.body()),
    })
}

fn headers_json(headers: &HeaderMap) -> Value {
    let map: Map<String, Value> = headers
        .keys()
        .map(|name| {
            let values: Vec<Value> = headers
                .get_all(name)
                .iter()
                .map(|v| Value::String(String::from_utf8_lossy(v.as_bytes()).into_owned()))
                .collect();
            (name.to_string(), Value::Array(values))
        })
        .collect();
    Value::Object(map)
}

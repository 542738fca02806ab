//! Dashboard HTTP server.
//!
//! Endpoints:
//!   GET /                 - the dashboard page
//!   GET /_dash-update     - recomputed figures for a control change
//!   GET /api/stats        - stat card values
//!   GET /api/dataset      - dataset summary and load report
//!   GET /api/health       - health check
//!
//! Connections are served one at a time on a current-thread runtime, so each
//! control event is processed to completion before the next is read.

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use url::Url;

use crate::charts::ChartTheme;
use crate::data::Dataset;
use crate::engine::events::ControlEvent;
use crate::engine::reducer::reduce;
use crate::engine::state::{PayloadBounds, SelectionState, SiteFilter, ALL_SITES};
use crate::layout::render_page;
use crate::logging::{
    log, log_control_event, log_request, obj, v_str, Domain, Level, ProfileScope,
};
use crate::state::Config;

/// Everything a request handler reads. Built once at startup, never mutated.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub dataset: Dataset,
    pub config: Config,
    pub theme: ChartTheme,
}

impl AppContext {
    pub fn new(dataset: Dataset, config: Config) -> Self {
        Self {
            dataset,
            config,
            theme: ChartTheme::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
        }
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "BAD REQUEST",
            404 => "NOT FOUND",
            405 => "METHOD NOT ALLOWED",
            _ => "INTERNAL SERVER ERROR",
        }
    }

    pub fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

/// Parsed `/_dash-update` query: the firing control plus both control values.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub event: ControlEvent,
    pub selection: SelectionState,
}

fn parse_bound(name: &str, raw: Option<&String>) -> Result<f64, String> {
    let raw = raw.ok_or_else(|| format!("missing parameter: {}", name))?;
    let v = raw
        .parse::<f64>()
        .map_err(|e| format!("bad {}: {}", name, e))?;
    if !v.is_finite() {
        return Err(format!("bad {}: not finite", name));
    }
    Ok(v)
}

impl UpdateRequest {
    pub fn from_query(url: &Url) -> Result<Self, String> {
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

        let site = SiteFilter::parse(params.get("site").map(String::as_str).unwrap_or(ALL_SITES));
        let low = parse_bound("low", params.get("low"))?;
        let high = parse_bound("high", params.get("high"))?;
        if low > high {
            return Err(format!("low ({}) must not exceed high ({})", low, high));
        }
        let bounds = PayloadBounds::new(low, high);

        let event = match params.get("trigger").map(String::as_str).unwrap_or("init") {
            "init" => ControlEvent::Init,
            "site" => ControlEvent::SiteSelected(site.clone()),
            "payload" => ControlEvent::PayloadChanged(bounds),
            other => return Err(format!("unknown trigger: {}", other)),
        };

        Ok(Self {
            event,
            selection: SelectionState {
                site,
                payload: bounds,
            },
        })
    }
}

fn handle_update(ctx: &AppContext, url: &Url) -> Response {
    let _scope = ProfileScope::with_context("dash_update", &[("query", json!(url.query()))]);
    let req = match UpdateRequest::from_query(url) {
        Ok(r) => r,
        Err(err) => return Response::json(400, json!({ "error": err })),
    };

    let trigger = req.event.name();
    let mut selection = req.selection;
    let updates = reduce(&mut selection, req.event, &ctx.dataset, &ctx.theme);
    log_control_event(
        trigger,
        &selection.site.to_string(),
        selection.payload.low,
        selection.payload.high,
        updates.len(),
    );

    let mut body = Map::new();
    for u in updates {
        body.insert(u.chart.element_id().to_string(), u.figure);
    }
    Response::json(200, Value::Object(body))
}

fn dataset_summary(ctx: &AppContext) -> Value {
    json!({
        "rows": ctx.dataset.len(),
        "payload_range": ctx.dataset.payload_range(),
        "slider_extent": ctx.config.slider_extent(ctx.dataset.payload_range()),
        "sites": ctx.dataset.sites(),
        "report": ctx.dataset.report(),
    })
}

/// Route one request. Pure with respect to the context.
pub fn route(ctx: &AppContext, method: &str, target: &str) -> Response {
    let url = match Url::parse("http://localhost").and_then(|base| base.join(target)) {
        Ok(u) => u,
        Err(err) => return Response::text(400, &format!("bad request target: {}", err)),
    };
    if method != "GET" {
        return Response::text(405, "Method Not Allowed");
    }

    match url.path() {
        "/" => Response::html(render_page(&ctx.dataset, &ctx.config, &ctx.theme)),
        "/_dash-update" => handle_update(ctx, &url),
        "/api/stats" => Response::json(200, json!(ctx.dataset.stats())),
        "/api/dataset" => Response::json(200, dataset_summary(ctx)),
        "/api/health" => Response::json(200, json!({ "status": "ok" })),
        _ => Response::text(404, "Not Found"),
    }
}

/// Upper bound on request line plus headers.
pub const MAX_REQUEST_BYTES: u64 = 16 * 1024;

/// Read the request line and drain the headers; requests carry no body.
/// `None` when the peer closed before sending anything.
async fn read_request<R: AsyncBufRead + Unpin>(reader: R) -> Result<Option<String>> {
    let mut reader = reader.take(MAX_REQUEST_BYTES);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Ok(None);
    }
    if !request_line.ends_with('\n') {
        anyhow::bail!("request line truncated or over {} bytes", MAX_REQUEST_BYTES);
    }
    loop {
        let mut header = String::new();
        let n = reader.read_line(&mut header).await?;
        if n == 0 && reader.limit() == 0 {
            anyhow::bail!("request headers over {} bytes", MAX_REQUEST_BYTES);
        }
        if n == 0 || header.trim().is_empty() {
            break;
        }
    }
    Ok(Some(request_line))
}

async fn serve_connection(ctx: &AppContext, mut stream: TcpStream) -> Result<()> {
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader);

    let deadline = Duration::from_millis(ctx.config.read_timeout_ms);
    let request_line = match timeout(deadline, read_request(&mut reader)).await {
        Ok(read) => read?,
        Err(_) => anyhow::bail!("no request within {} ms", ctx.config.read_timeout_ms),
    };
    let Some(request_line) = request_line else {
        return Ok(());
    };

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let target = parts.next().unwrap_or("/");

    let response = route(ctx, method, target);
    let path = target.split('?').next().unwrap_or(target);
    log_request(method, path, response.status, response.body.len());

    writer.write_all(response.to_http().as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Accept loop. Runs until the listener fails.
pub async fn serve(ctx: AppContext) -> Result<()> {
    let addr = ctx.config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    serve_listener(ctx, listener).await
}

pub async fn serve_listener(ctx: AppContext, listener: TcpListener) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.context("accept")?;
        if let Err(err) = serve_connection(&ctx, stream).await {
            log(
                Level::Warn,
                Domain::Http,
                "connection_error",
                obj(&[
                    ("peer", v_str(&peer.to_string())),
                    ("error", v_str(&format!("{:#}", err))),
                ]),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AppContext {
        AppContext::new(Dataset::sample(), Config::default())
    }

    #[test]
    fn health_ok() {
        let r = route(&ctx(), "GET", "/api/health");
        assert_eq!(r.status, 200);
        assert_eq!(r.body, r#"{"status":"ok"}"#);
    }

    #[test]
    fn unknown_path_is_404() {
        assert_eq!(route(&ctx(), "GET", "/nope").status, 404);
    }

    #[test]
    fn post_is_rejected() {
        assert_eq!(route(&ctx(), "POST", "/").status, 405);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let r = route(&ctx(), "GET", "/_dash-update?trigger=payload&site=ALL&low=5000&high=1000");
        assert_eq!(r.status, 400);
        assert!(r.body.contains("must not exceed"));
    }

    #[test]
    fn non_numeric_bound_is_rejected() {
        let r = route(&ctx(), "GET", "/_dash-update?trigger=init&low=abc&high=1000");
        assert_eq!(r.status, 400);
    }

    #[test]
    fn query_parsing_decodes_site() {
        let url = Url::parse("http://localhost/_dash-update?trigger=site&site=KSC+LC-39A&low=0&high=10000")
            .unwrap();
        let req = UpdateRequest::from_query(&url).unwrap();
        assert_eq!(
            req.event,
            ControlEvent::SiteSelected(SiteFilter::Site("KSC LC-39A".into()))
        );
        assert_eq!(req.selection.payload, PayloadBounds::new(0.0, 10_000.0));
    }

    #[test]
    fn http_framing() {
        let r = Response::text(404, "Not Found");
        let raw = r.to_http();
        assert!(raw.starts_with("HTTP/1.1 404 NOT FOUND\r\n"));
        assert!(raw.contains("Content-Length: 9\r\n"));
        assert!(raw.ends_with("\r\n\r\nNot Found"));
    }

    #[tokio::test]
    async fn request_line_and_headers_are_read() {
        let raw = b"GET /api/health HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let line = read_request(&raw[..]).await.unwrap();
        assert_eq!(line.as_deref(), Some("GET /api/health HTTP/1.1\r\n"));

        assert_eq!(read_request(&b""[..]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn oversized_request_is_refused() {
        let mut raw = b"GET /".to_vec();
        raw.extend(std::iter::repeat(b'a').take(MAX_REQUEST_BYTES as usize));
        raw.extend_from_slice(b" HTTP/1.1\r\n\r\n");
        let err = read_request(&raw[..]).await.unwrap_err();
        assert!(err.to_string().contains("request line"));

        let mut raw = b"GET / HTTP/1.1\r\nX-Pad: ".to_vec();
        raw.extend(std::iter::repeat(b'a').take(MAX_REQUEST_BYTES as usize));
        raw.extend_from_slice(b"\r\n\r\n");
        let err = read_request(&raw[..]).await.unwrap_err();
        assert!(err.to_string().contains("headers"));
    }
}

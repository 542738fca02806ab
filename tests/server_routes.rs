use launchdash::data::Dataset;
use launchdash::server::{route, serve_listener, AppContext};
use launchdash::state::Config;
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn ctx() -> AppContext {
    launchdash::logging::configure(None);
    AppContext::new(Dataset::sample(), Config::default())
}

fn json_body(target: &str) -> Value {
    let r = route(&ctx(), "GET", target);
    assert_eq!(r.status, 200, "{} -> {}", target, r.body);
    assert_eq!(r.content_type, "application/json");
    serde_json::from_str(&r.body).unwrap()
}

#[test]
fn init_update_returns_both_figures() {
    let body = json_body("/_dash-update?trigger=init&site=ALL&low=2500&high=9000");
    let pie = &body["success-pie-chart"];
    let scatter = &body["success-payload-scatter-chart"];
    assert_eq!(pie["layout"]["title"]["text"], "Total Successful Launches by Site");
    assert_eq!(pie["data"][0]["values"].as_array().unwrap().len(), 4);
    let points: usize = scatter["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["x"].as_array().unwrap().len())
        .sum();
    assert_eq!(points, 100);
}

#[test]
fn payload_update_only_returns_scatter() {
    let body = json_body("/_dash-update?trigger=payload&site=ALL&low=3000&high=3000");
    let obj = body.as_object().unwrap();
    assert_eq!(obj.len(), 1);
    let traces = body["success-payload-scatter-chart"]["data"].as_array().unwrap();
    assert!(traces
        .iter()
        .flat_map(|t| t["x"].as_array().unwrap())
        .all(|x| x.as_f64() == Some(3000.0)));
}

#[test]
fn unknown_site_gives_empty_charts() {
    let body = json_body("/_dash-update?trigger=site&site=Boca+Chica&low=0&high=10000");
    assert_eq!(body["success-pie-chart"]["data"], Value::Array(vec![]));
    assert_eq!(body["success-payload-scatter-chart"]["data"], Value::Array(vec![]));
    assert_eq!(
        body["success-pie-chart"]["layout"]["title"]["text"],
        "Success Rate: Boca Chica"
    );
}

#[test]
fn stats_and_dataset_endpoints() {
    let stats = json_body("/api/stats");
    assert_eq!(stats["total"], 100);
    assert_eq!(stats["successes"], 63);
    assert_eq!(stats["failures"], 37);

    let ds = json_body("/api/dataset");
    assert_eq!(ds["rows"], 100);
    assert_eq!(ds["payload_range"]["min"], 2500.0);
    assert_eq!(ds["slider_extent"]["max"], 10000.0);
    assert_eq!(ds["sites"].as_array().unwrap().len(), 4);
}

#[test]
fn page_is_html() {
    let r = route(&ctx(), "GET", "/");
    assert_eq!(r.status, 200);
    assert!(r.content_type.starts_with("text/html"));
    assert!(r.body.contains("SpaceX Launch Analytics"));
}

async fn get_health(addr: std::net::SocketAddr) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /api/health HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    raw
}

#[tokio::test]
async fn serves_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_listener(ctx(), listener));

    let raw = get_health(addr).await;
    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(raw.ends_with(r#"{"status":"ok"}"#));
}

#[tokio::test]
async fn idle_connection_does_not_block_others() {
    launchdash::logging::configure(None);
    let cfg = Config {
        read_timeout_ms: 200,
        ..Config::default()
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_listener(AppContext::new(Dataset::sample(), cfg), listener));

    let _idle = TcpStream::connect(addr).await.unwrap();
    let raw = tokio::time::timeout(Duration::from_secs(3), get_health(addr))
        .await
        .expect("health check stalled behind an idle connection");
    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
}

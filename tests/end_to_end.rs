//! Full stack over TCP: app server wrapped in `PatternMetrics`, scrape
//! listener served separately (`create_server = false`).

use std::net::SocketAddr;
use std::sync::Arc;

use route_metrics::{Options, PatternMetrics, Request, Response, Router, Server, scrape};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

async fn get_user(req: Request) -> Response {
    Response::text(req.param("id").unwrap_or("none").to_owned())
}

async fn ok(_req: Request) -> &'static str { "ok" }

/// Sends one request with `Connection: close` and returns the raw response.
async fn send(addr: SocketAddr, method: &str, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!("{method} {target} HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n");
    stream.write_all(head.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

async fn start<S: route_metrics::Service>(service: S) -> Running {
    let server = Server::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        server
            .serve_with_shutdown(service, async { let _ = stopped.await; })
            .await
            .unwrap();
    });
    Running { addr, stop, task }
}

impl Running {
    async fn shutdown(self) {
        let _ = self.stop.send(());
        self.task.await.unwrap();
    }
}

#[tokio::test]
async fn scrape_reports_route_patterns() {
    let metrics = Arc::new(PatternMetrics::new(Options::default().create_server(false)));
    let app = start(metrics.wrap(
        Router::new()
            .get("/users/:id", get_user)
            .get("/health/", ok)
            .get("*", ok),
    ))
    .await;
    let scraper = start(scrape::router(Arc::clone(metrics.recorder()))).await;

    let res = send(app.addr, "GET", "/users/42?expand=true").await;
    assert!(res.starts_with("HTTP/1.1 200"), "{res}");
    assert!(res.ends_with("42"), "{res}");
    send(app.addr, "GET", "/users/7/").await;
    send(app.addr, "GET", "/health").await;
    send(app.addr, "GET", "/no/such/route").await;

    let body = send(scraper.addr, "GET", "/metrics").await;
    assert!(body.starts_with("HTTP/1.1 200"), "{body}");
    assert!(body.to_ascii_lowercase().contains("content-type: text/plain"), "{body}");
    assert!(body.contains(
        r#"http_request_duration_seconds_count{method="GET",path="/users/:id",status_code="200"} 2"#
    ), "{body}");
    assert!(body.contains(r#"path="/health",status_code="200"} 1"#), "{body}");
    // Answered by the catch-all, labelled by its own path.
    assert!(body.contains(r#"path="/no/such/route""#), "{body}");
    assert!(!body.contains(r#"path="/users/42""#), "{body}");
    assert!(!body.contains(r#"path="*""#), "{body}");

    let other = send(scraper.addr, "GET", "/").await;
    assert!(other.starts_with("HTTP/1.1 404"), "{other}");

    app.shutdown().await;
    scraper.shutdown().await;
}

#[tokio::test]
async fn discarded_requests_never_reach_the_scrape() {
    let options = Options::default().create_server(false).discard_unmatched(true);
    let metrics = Arc::new(PatternMetrics::new(options));
    let app = start(metrics.wrap(Router::new().get("/known", ok))).await;

    send(app.addr, "GET", "/known").await;
    send(app.addr, "GET", "/unknown").await;

    let text = metrics.recorder().render();
    assert!(text.contains(r#"path="/known""#), "{text}");
    assert!(!text.contains("unknown"), "{text}");

    app.shutdown().await;
}

#[tokio::test]
async fn busy_scrape_port_does_not_break_requests() {
    let squatter = Server::bind("127.0.0.1:0").await.unwrap();
    let port = squatter.local_addr().unwrap().port();

    let metrics = Arc::new(PatternMetrics::new(Options::default().port(port)));
    let app = start(metrics.wrap(Router::new().get("/users/:id", get_user))).await;

    let res = send(app.addr, "GET", "/users/1").await;
    assert!(res.starts_with("HTTP/1.1 200"), "{res}");
    assert!(metrics.recorder().render().contains(r#"path="/users/:id""#));

    app.shutdown().await;
    drop(squatter);
}

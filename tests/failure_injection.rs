//! Failure injection tests: every upstream fault surfaces as a failed request.

use relay_proxy::config::ProxyConfig;

mod common;

use common::{client, closed_addr, start_proxy, start_upstream, Reply};

const OVER_LIMIT: usize = 10 * 1024 * 1024 + 1;

#[tokio::test]
async fn test_oversized_body_with_length_fails() {
    let (upstream, _) = start_upstream(|_| Reply::ok(vec![b'x'; OVER_LIMIT])).await;
    let (proxy, shutdown) = start_proxy(ProxyConfig::default()).await;

    let res = client()
        .get(format!("http://{proxy}/"))
        .header("X-Proxy-Url", format!("http://{upstream}/big"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    assert!(res.headers().get("x-location").is_none());
    assert_eq!(res.text().await.unwrap(), "Upstream request failed");
    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_streamed_body_fails() {
    let (upstream, _) =
        start_upstream(|_| Reply::ok(vec![b'x'; OVER_LIMIT]).without_length()).await;
    let (proxy, shutdown) = start_proxy(ProxyConfig::default()).await;

    let res = client()
        .get(format!("http://{proxy}/"))
        .header("X-Proxy-Url", format!("http://{upstream}/stream"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    let body = res.bytes().await.unwrap();
    assert!(body.len() < 1024);
    shutdown.trigger();
}

#[tokio::test]
async fn test_body_at_limit_is_relayed() {
    let mut config = ProxyConfig::default();
    config.limits.max_response_body_bytes = 1024;
    let (upstream, _) = start_upstream(|_| Reply::ok(vec![b'y'; 1024]).without_length()).await;
    let (proxy, shutdown) = start_proxy(config).await;

    let res = client()
        .get(format!("http://{proxy}/"))
        .header("X-Proxy-Url", format!("http://{upstream}/"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.bytes().await.unwrap().len(), 1024);
    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream() {
    let upstream = closed_addr().await;
    let (proxy, shutdown) = start_proxy(ProxyConfig::default()).await;

    let res = client()
        .get(format!("http://{proxy}/"))
        .header("X-Proxy-Url", format!("http://{upstream}/"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    shutdown.trigger();
}

#[tokio::test]
async fn test_error_status_fails_by_default() {
    let (upstream, captures) =
        start_upstream(|_| Reply::ok("boom").status(500).header("Content-Type", "text/plain"))
            .await;
    let (proxy, shutdown) = start_proxy(ProxyConfig::default()).await;

    let res = client()
        .get(format!("http://{proxy}/"))
        .header("X-Proxy-Url", format!("http://{upstream}/"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    assert_ne!(res.text().await.unwrap(), "boom");
    // No retries
    assert_eq!(captures.lock().unwrap().len(), 1);
    shutdown.trigger();
}

#[tokio::test]
async fn test_error_status_relayed_when_configured() {
    let (upstream, _) =
        start_upstream(|_| Reply::ok("missing").status(404).header("Content-Type", "text/plain"))
            .await;
    let mut config = ProxyConfig::default();
    config.upstream.relay_error_status = true;
    let (proxy, shutdown) = start_proxy(config).await;

    let res = client()
        .get(format!("http://{proxy}/"))
        .header("X-Proxy-Url", format!("http://{upstream}/gone"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.text().await.unwrap(), "missing");
    shutdown.trigger();
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let (upstream, captures) = start_upstream(|_| Reply::redirect(302, "/again")).await;
    let mut config = ProxyConfig::default();
    config.upstream.max_redirects = 3;
    let (proxy, shutdown) = start_proxy(config).await;

    let res = client()
        .get(format!("http://{proxy}/"))
        .header("X-Proxy-Url", format!("http://{upstream}/again"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    assert_eq!(captures.lock().unwrap().len(), 4);
    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_target() {
    let (proxy, shutdown) = start_proxy(ProxyConfig::default()).await;

    let res = client()
        .get(format!("http://{proxy}/"))
        .header("X-Proxy-Url", "not a url")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    shutdown.trigger();
}

mod support;

use std::time::Duration;

use bytes::Bytes;
use tcall_http::Request;
use tcall_testserver::{CUSTOM_HEADER, PATH_RPC, TestServer};
use tokio::time::Instant;

#[tokio::test]
async fn call_sends_metadata_and_returns_reply() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let transport = support::transport(server.rpc_url())?;

    let req = Request::new("method", Bytes::from_static(&[1, 2, 3]));
    let got = transport
        .call(Some(Instant::now() + Duration::from_secs(3)), &req)
        .await?;

    assert_eq!(got.body, Bytes::from_static(b"ok"));
    assert_eq!(got.header(CUSTOM_HEADER), Some("ok"));
    assert_eq!(got.header("Custom-Header"), Some("ok"));
    assert!(got.header("rpc-service").is_none());

    let Some(seen) = server.stats().last_request().await else {
        panic!("server saw no request");
    };
    assert_eq!(seen.path, PATH_RPC);
    assert_eq!(seen.body, req.body);
    assert_eq!(seen.header("RPC-Service"), Some("target"));
    assert_eq!(seen.header("RPC-Caller"), Some("source"));
    assert_eq!(seen.header("RPC-Procedure"), Some("method"));

    let Some(ttl) = seen.header("Context-TTL-MS").and_then(|v| v.parse::<u64>().ok()) else {
        panic!("missing or malformed ttl header: {:?}", seen.headers);
    };
    assert!((2900..=3000).contains(&ttl), "ttl {ttl} out of range");

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn call_without_deadline_advertises_default_ttl() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let transport = support::transport(server.rpc_url())?;

    let got = transport
        .call(None, &Request::new("method", Bytes::from_static(&[1, 2, 3])))
        .await?;
    assert_eq!(got.body, Bytes::from_static(b"ok"));

    let Some(seen) = server.stats().last_request().await else {
        panic!("server saw no request");
    };
    let expected = tcall_http::DEFAULT_TTL.as_millis().to_string();
    assert_eq!(seen.header("context-ttl-ms"), Some(expected.as_str()));

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn extra_request_headers_pass_through() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let transport = support::transport(server.rpc_url())?;

    let req = Request::new("method", Bytes::new())
        .with_header("X-Trace", "abc")
        .with_header("baggage", "k=v");
    transport
        .call_with_timeout(Duration::from_secs(3), &req)
        .await?;

    let Some(seen) = server.stats().last_request().await else {
        panic!("server saw no request");
    };
    assert_eq!(seen.header("x-trace"), Some("abc"));
    assert_eq!(seen.header("baggage"), Some("k=v"));

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn calls_rotate_across_endpoints() -> anyhow::Result<()> {
    let a = TestServer::start().await?;
    let b = TestServer::start().await?;
    let transport = tcall_http::HttpTransport::new(tcall_http::HttpOptions {
        urls: vec![a.rpc_url().to_string(), b.rpc_url().to_string()],
        target_service: "target".to_string(),
        ..Default::default()
    })?;

    let req = Request::new("method", Bytes::new());
    for _ in 0..4 {
        transport.call(None, &req).await?;
    }
    assert_eq!(a.stats().requests_total(), 2);
    assert_eq!(b.stats().requests_total(), 2);

    let Some(seen) = a.stats().last_request().await else {
        panic!("server saw no request");
    };
    assert!(seen.header("rpc-caller").is_none());

    a.shutdown().await;
    b.shutdown().await;
    Ok(())
}

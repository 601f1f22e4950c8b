mod support;

use std::time::{Duration, Instant};

use bytes::Bytes;
use tcall_http::{Error, ErrorKind, Request};
use tcall_testserver::{Fault, FaultServer};

fn request() -> Request {
    Request::new("method", Bytes::from_static(&[1, 2, 3]))
}

#[tokio::test]
async fn connection_killed_before_reply() -> anyhow::Result<()> {
    let server = FaultServer::start(Fault::KillConn).await?;
    let transport = support::transport(server.url())?;

    let Err(err) = transport.call(None, &request()).await else {
        panic!("expected a failure");
    };
    assert_eq!(err.kind(), ErrorKind::ConnectionClosed, "{err}");
    assert!(err.to_string().contains("EOF"), "{err}");

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn connection_killed_mid_body() -> anyhow::Result<()> {
    let server = FaultServer::start(Fault::FlushAndKill).await?;
    let transport = support::transport(server.url())?;

    let Err(err) = transport.call(None, &request()).await else {
        panic!("expected a failure");
    };
    assert_eq!(err.kind(), ErrorKind::TruncatedBody, "{err}");
    assert!(err.to_string().contains("unexpected EOF"), "{err}");

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn bad_request_status_fails() -> anyhow::Result<()> {
    let server = FaultServer::start(Fault::Status(400)).await?;
    let transport = support::transport(server.url())?;

    let Err(err) = transport.call(None, &request()).await else {
        panic!("expected a failure");
    };
    assert!(matches!(err, Error::Status { code: 400 }));
    assert!(
        err.to_string().contains("non-success response code: 400"),
        "{err}"
    );

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn server_error_status_fails() -> anyhow::Result<()> {
    let server = FaultServer::start(Fault::Status(500)).await?;
    let transport = support::transport(server.url())?;

    let Err(err) = transport.call(None, &request()).await else {
        panic!("expected a failure");
    };
    assert_eq!(err.to_string(), "non-success response code: 500");

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn stalled_peer_hits_deadline() -> anyhow::Result<()> {
    let server = FaultServer::start(Fault::Stall).await?;
    let transport = support::transport(server.url())?;

    let started = Instant::now();
    let Err(err) = transport
        .call_with_timeout(Duration::from_millis(200), &request())
        .await
    else {
        panic!("expected a failure");
    };
    let elapsed = started.elapsed();

    assert_eq!(err.kind(), ErrorKind::DeadlineExceeded, "{err}");
    assert!(
        elapsed < Duration::from_secs(2),
        "expected prompt cancellation, elapsed={elapsed:?}"
    );

    server.shutdown().await;
    Ok(())
}

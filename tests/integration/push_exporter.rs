//! Pushgateway exporter tests against a mocked gateway.

use std::time::Duration;

use mockito::{Matcher, Server};

use difficulty_monitor::services::metrics::{MetricsSink, PushError, PushGatewayExporter};

const TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_push_sends_gauge_to_job_path() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("PUT", "/metrics/job/difficulty_monitor")
		.match_body(Matcher::Regex("chain_block_difficulty 7".to_string()))
		.with_status(200)
		.create_async()
		.await;

	let exporter = PushGatewayExporter::new(&server.url(), TIMEOUT).unwrap();
	exporter.set_difficulty(7);
	exporter.push().await.unwrap();

	mock.assert_async().await;
}

#[tokio::test]
async fn test_push_surfaces_gateway_failure() {
	let mut server = Server::new_async().await;
	server
		.mock("PUT", "/metrics/job/difficulty_monitor")
		.with_status(500)
		.create_async()
		.await;

	let exporter = PushGatewayExporter::new(&server.url(), TIMEOUT).unwrap();
	exporter.set_difficulty(7);
	let error = exporter.push().await.unwrap_err();

	assert!(matches!(error, PushError::Gateway { .. }));
}

#[tokio::test]
async fn test_push_times_out_against_stalled_gateway() {
	// A gateway that accepts the connection but never answers. The push must
	// fail at the deadline instead of stalling the caller.
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		let mut sockets = Vec::new();
		loop {
			match listener.accept().await {
				Ok((socket, _)) => sockets.push(socket),
				Err(_) => break,
			}
		}
	});

	let exporter =
		PushGatewayExporter::new(&format!("http://{addr}"), Duration::from_millis(200)).unwrap();
	exporter.set_difficulty(7);

	let error = tokio::time::timeout(Duration::from_secs(5), exporter.push())
		.await
		.expect("push should fail at its own deadline")
		.unwrap_err();

	match error {
		PushError::Http(e) => assert!(e.is_timeout()),
		other => panic!("expected timeout, got {other:?}"),
	}
}

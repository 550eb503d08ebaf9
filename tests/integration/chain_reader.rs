//! Chain reader tests against a mocked JSON-RPC endpoint.

use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;

use difficulty_monitor::services::blockchain::{ChainReader, ClientError, EvmChainReader};

const TIMEOUT: Duration = Duration::from_secs(2);

fn rpc_matcher(method: &str) -> Matcher {
	Matcher::PartialJson(json!({
		"jsonrpc": "2.0",
		"method": method,
	}))
}

#[tokio::test]
async fn test_latest_block_number_decodes_hex_quantity() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.match_body(rpc_matcher("eth_blockNumber"))
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x67"}"#)
		.create_async()
		.await;

	let reader = EvmChainReader::new(&server.url(), TIMEOUT).unwrap();
	let tip = reader.latest_block_number().await.unwrap();

	assert_eq!(tip, 103);
	mock.assert_async().await;
}

#[tokio::test]
async fn test_header_by_number_decodes_header() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({
			"method": "eth_getBlockByNumber",
			"params": ["0x65", false],
		})))
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"number":"0x65","difficulty":"0x5"}}"#)
		.create_async()
		.await;

	let reader = EvmChainReader::new(&server.url(), TIMEOUT).unwrap();
	let header = reader.header_by_number(101).await.unwrap();

	assert_eq!(header.number, 101);
	assert_eq!(header.difficulty, Some(5));
	mock.assert_async().await;
}

#[tokio::test]
async fn test_header_by_number_null_result_is_not_found() {
	let mut server = Server::new_async().await;
	server
		.mock("POST", "/")
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
		.create_async()
		.await;

	let reader = EvmChainReader::new(&server.url(), TIMEOUT).unwrap();
	let error = reader.header_by_number(999).await.unwrap_err();

	assert!(error.is_not_found());
}

#[tokio::test]
async fn test_rpc_error_object_is_surfaced() {
	let mut server = Server::new_async().await;
	server
		.mock("POST", "/")
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"header not found"}}"#)
		.create_async()
		.await;

	let reader = EvmChainReader::new(&server.url(), TIMEOUT).unwrap();
	let error = reader.header_by_number(101).await.unwrap_err();

	match error {
		ClientError::Rpc { code, message, .. } => {
			assert_eq!(code, -32000);
			assert_eq!(message, "header not found");
		}
		other => panic!("expected Rpc error, got {other:?}"),
	}
}

#[tokio::test]
async fn test_header_without_difficulty_field() {
	let mut server = Server::new_async().await;
	server
		.mock("POST", "/")
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"number":"0x65"}}"#)
		.create_async()
		.await;

	let reader = EvmChainReader::new(&server.url(), TIMEOUT).unwrap();
	let header = reader.header_by_number(101).await.unwrap();

	assert_eq!(header.difficulty, None);
}

#[tokio::test]
async fn test_connect_succeeds_on_reachable_endpoint() {
	let mut server = Server::new_async().await;
	server
		.mock("POST", "/")
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x67"}"#)
		.create_async()
		.await;

	let reader =
		EvmChainReader::connect(&server.url(), TIMEOUT, 3, Duration::from_millis(10)).await;

	assert!(reader.is_ok());
}

#[tokio::test]
async fn test_connect_exhausts_probes_against_failing_endpoint() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(500)
		.expect(3)
		.create_async()
		.await;

	let error =
		EvmChainReader::connect(&server.url(), TIMEOUT, 3, Duration::from_millis(10))
			.await
			.unwrap_err();

	match error {
		ClientError::Connection { attempts, .. } => assert_eq!(attempts, 3),
		other => panic!("expected Connection error, got {other:?}"),
	}
	mock.assert_async().await;
}

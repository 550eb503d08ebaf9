//! Integration tests against mocked HTTP endpoints.

mod chain_reader;
mod push_exporter;

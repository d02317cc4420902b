//! Integration tests with mock HTTP server

mod error_handling;
mod legacy;
mod mock_server;
mod modern;

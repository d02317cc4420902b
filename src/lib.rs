//! # c2client
//!
//! Command-line API client for cloud services that speak the EC2-style query
//! protocol or structured JSON calls.
//!
//! Every binary maps a generic `c2-<name> <action> key value ...` invocation
//! onto one service:
//!
//! ```text
//! c2-ec2 RunInstances ImageId ami-1 MinCount 1 MaxCount 1
//! c2-ct LookupEvents --json '{"MaxResults": 5}'
//! c2-eks describe-cluster name prod
//! ```
//!
//! ## Pipeline
//!
//! 1. [`cli`] parses the action, the flags and the raw parameter tokens.
//! 2. [`params`] pairs the tokens, expands dot-notation keys into nested
//!    structures and coerces scalar leaves (or reads one JSON document).
//! 3. [`registry`] resolves the program to a [`ClientDescriptor`], and
//!    [`transport::build_adapter`] picks the legacy or modern adapter for it.
//! 4. The adapter signs and sends the request, then decodes the response.
//! 5. [`format`] renders XML with two-space indentation or JSON with sorted
//!    keys and four-space indentation.
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cli`] | clap definition shared by all binaries |
//! | [`config`] | Environment snapshot, credentials and transport settings |
//! | [`params`] | Parameter pairing, dot-notation expansion and coercion |
//! | [`registry`] | Static table of programs and their services |
//! | [`transport`] | Signed HTTP, legacy and modern adapters, operation tables |
//! | [`format`] | XML and JSON rendering |
//! | [`shell`] | Dispatcher and process entry point |
//! | [`logging`] | tracing subscriber setup |

pub mod cli;
pub mod config;
pub mod format;
pub mod logging;
pub mod params;
pub mod registry;
pub mod shell;
pub mod transport;

pub use config::{Credentials, Settings, TransportConfig};
pub use registry::{ClientDescriptor, TransportKind};
pub use transport::{Request, Response, TransportAdapter};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};

//! Mock HTTP server setup for integration tests

use c2client::config::{ACCESS_KEY_VAR, SECRET_KEY_VAR};
use c2client::{registry, Settings};
use mockito::{Server, ServerGuard};
use std::io::Cursor;

pub const ACCESS_KEY: &str = "AKIDTEST";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Settings pointing the given program's endpoint at the mock server
    pub fn settings(&self, identity: &str) -> Settings {
        let descriptor = registry::lookup(identity).expect("registered identity");
        Settings::from_vars([
            (descriptor.url_key, self.base_url.as_str()),
            (ACCESS_KEY_VAR, ACCESS_KEY),
            (SECRET_KEY_VAR, "test-secret"),
        ])
    }

    /// Run one invocation against the mock server, capturing stdout
    pub async fn dispatch(&self, identity: &str, args: &[&str]) -> (c2client::Result<()>, String) {
        self.dispatch_with_stdin(identity, args, "").await
    }

    pub async fn dispatch_with_stdin(
        &self,
        identity: &str,
        args: &[&str],
        stdin: &str,
    ) -> (c2client::Result<()>, String) {
        let mut out = Vec::new();
        let result = c2client::shell::dispatch(
            identity,
            args.iter().copied(),
            &self.settings(identity),
            Cursor::new(stdin.as_bytes().to_vec()),
            &mut out,
        )
        .await;
        (result, String::from_utf8(out).expect("utf-8 output"))
    }
}

/// Authorization header pattern for a signing service name
pub fn authorization_for(signing_name: &str) -> mockito::Matcher {
    mockito::Matcher::Regex(format!(
        r"^AWS4-HMAC-SHA256 Credential={}/\d{{8}}/croc/{}/aws4_request, SignedHeaders=[a-z0-9;-]+, Signature=[0-9a-f]{{64}}$",
        ACCESS_KEY, signing_name
    ))
}

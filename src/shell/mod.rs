//! Dispatcher: one invocation from argv to printed response.
//!
//! [`dispatch`] is the testable core with injected settings and I/O;
//! [`run`] wraps it with the process environment, a current-thread runtime
//! and the error → exit status mapping used by every binary.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::process::ExitCode;

use tracing::debug;

use crate::cli::{self, Parsed};
use crate::config::Settings;
use crate::transport::{build_adapter, Request};
use crate::{logging, registry, Error, Result};

/// Parse, coerce, call and print.
pub async fn dispatch<I, T, R, W>(
    identity: &str,
    args: I,
    settings: &Settings,
    stdin: R,
    stdout: &mut W,
) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
    R: Read,
    W: Write,
{
    let descriptor = registry::lookup(identity)?;
    let args = match cli::parse(&descriptor.program(), args)? {
        Parsed::Run(args) => args,
        Parsed::Info(text) => {
            write!(stdout, "{}", text)?;
            return Ok(());
        }
    };

    let config = settings.transport_config(args.verify_tls());
    let adapter = build_adapter(descriptor, settings, &config)?;
    let params = adapter.coercer().coerce(args.input(), stdin)?;
    debug!(action = %args.action, parameters = %params, "dispatching");

    let request = Request {
        action: args.action.clone(),
        params,
        verify_tls: args.verify_tls(),
    };
    let response = adapter.send(&request).await?;
    let text = adapter.format(&response)?;
    writeln!(stdout, "{}", text)?;
    stdout.flush()?;
    Ok(())
}

/// Entry point for the `c2-*` binaries.
pub fn run<I>(identity: &str, args: I) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
{
    let settings = Settings::from_env();
    logging::init(settings.debug());

    let args: Vec<String> = args
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::from)
        .and_then(|runtime| {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            runtime.block_on(dispatch(identity, args, &settings, stdin.lock(), &mut out))
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

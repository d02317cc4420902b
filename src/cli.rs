//! Command-line surface shared by every `c2-*` binary.

use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};

use crate::params::ParameterInput;
use crate::{Error, Result};

/// `c2-<name> <action> [--no-verify-ssl] [--json] [param ...]`
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    version,
    about = "Call a cloud API action and print the response",
    after_help = "Parameters are given as key/value pairs (dot-notation keys build nested \
                  structures), or as one JSON document with --json ('-' or nothing reads stdin)."
)]
pub struct ShellArgs {
    /// API action, e.g. RunInstances or describe-clusters
    pub action: String,

    /// Do not verify TLS certificates
    #[arg(long = "no-verify-ssl")]
    pub no_verify_ssl: bool,

    /// Take parameters as a single JSON document
    #[arg(long)]
    pub json: bool,

    /// Parameters: key value [key value ...] or one JSON document
    #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub parameters: Vec<String>,
}

impl ShellArgs {
    pub fn verify_tls(&self) -> bool {
        !self.no_verify_ssl
    }

    pub fn input(&self) -> ParameterInput<'_> {
        if self.json {
            ParameterInput::Json(&self.parameters)
        } else {
            ParameterInput::Flat(&self.parameters)
        }
    }
}

/// Outcome of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(ShellArgs),
    /// `--help` or `--version` text; printed and the process exits successfully.
    Info(String),
}

/// Parse arguments (without the program name) for the given binary.
pub fn parse<I, T>(program: &str, args: I) -> Result<Parsed>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let argv = std::iter::once(program.to_string()).chain(args.into_iter().map(Into::into));
    let command = ShellArgs::command().bin_name(program.to_string());

    match command.try_get_matches_from(argv) {
        Ok(matches) => ShellArgs::from_arg_matches(&matches)
            .map(Parsed::Run)
            .map_err(usage_error),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Parsed::Info(e.render().to_string()))
        }
        Err(e) => Err(usage_error(e)),
    }
}

// The dispatcher adds its own `error: ` prefix.
fn usage_error(e: clap::Error) -> Error {
    let rendered = e.render().to_string();
    Error::InvalidArguments(
        rendered
            .trim_start_matches("error: ")
            .trim_end()
            .to_string(),
    )
}

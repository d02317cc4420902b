use std::process::ExitCode;

fn main() -> ExitCode {
    c2client::shell::run("ec2", std::env::args_os().skip(1))
}

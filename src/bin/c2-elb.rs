use std::process::ExitCode;

fn main() -> ExitCode {
    c2client::shell::run("elb", std::env::args_os().skip(1))
}

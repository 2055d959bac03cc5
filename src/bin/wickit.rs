use std::process::ExitCode;

fn main() -> ExitCode {
    wickit::cli::run()
}

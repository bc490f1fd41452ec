use std::process::ExitCode;

fn main() -> ExitCode {
    lodgr_cli::run()
}

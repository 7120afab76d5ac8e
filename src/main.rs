use std::process::ExitCode;

fn main() -> ExitCode {
    vrachos::cli::run()
}

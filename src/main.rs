use std::process::ExitCode;

mod app;
mod logging;

fn main() -> ExitCode {
    let args = openz::cli::parse();
    app::run(args)
}

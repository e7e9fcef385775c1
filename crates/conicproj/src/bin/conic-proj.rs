use conicproj::conic_cli::{ConicProjArgs, run};
use line_entrypoints::{log_version_info, parse_or_exit, setup_logging_and_profiling};
use std::process::ExitCode;

fn main() -> ExitCode {
    let _guard = setup_logging_and_profiling();
    let args: ConicProjArgs = parse_or_exit();
    log_version_info("conic-proj");

    match run(args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            tracing::debug!(?err, "Setup failed");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

use conicproj::proj_test::{ProjTestArgs, run};
use line_entrypoints::{log_version_info, parse_or_exit, setup_logging_and_profiling};
use std::io::Write;
use std::process::ExitCode;

fn main() -> ExitCode {
    let _guard = setup_logging_and_profiling();
    let args: ProjTestArgs = parse_or_exit();
    log_version_info("proj-test");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run(&args, &mut out) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            // Fatal errors share standard output with the reports
            let _ = writeln!(out, "ERROR: {err}");
            ExitCode::FAILURE
        }
    }
}

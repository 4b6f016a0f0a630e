use std::process::ExitCode;

fn main() -> ExitCode {
    match ozh_covid::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ozh: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

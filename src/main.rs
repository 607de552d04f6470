//! mediasync - find likely-identical media files across file trees
//!
//! Entry point for the mediasync CLI application.

use clap::Parser;
use mediasync::{
    cli::Cli,
    error::{ExitCode, StructuredError},
};

fn main() -> std::process::ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version output go through here as well
            if let Err(print_err) = err.print() {
                eprintln!("{}", print_err);
            }
            return ExitCode::from_clap(&err).into();
        }
    };
    let json_errors = cli.json_errors;

    match mediasync::run_app(cli) {
        Ok(code) => code.into(),
        Err(err) => {
            let exit_code = ExitCode::GeneralError;

            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                match serde_json::to_string_pretty(&structured) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err),
                }
            } else {
                eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            }

            exit_code.into()
        }
    }
}

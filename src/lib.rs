use std::process;

use error::ScanError;

#[cfg(not(target_os = "linux"))]
std::compile_error!("linux is the only target os that was tested");

pub mod addr;
pub mod cli;
pub mod error;
pub mod logger;
pub mod probe;
pub mod report;
pub mod scan;

/// Reports an unrecoverable error and ends the process with its exit code.
pub fn abort(error: ScanError) -> ! {
    eprintln!("ERROR: {}", error);
    process::exit(error.exit_code());
}

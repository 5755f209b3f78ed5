use std::{
    io::{self, Write},
    path::Path,
    process,
};

use anyhow::{Context, Result};
use ipscan::{
    abort, cli, logger,
    probe::ConnectProbe,
    report::Report,
    scan::Scanner,
};

fn main() -> Result<()> {
    let matches = match cli::command().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            // Help and version go to stdout with success, everything else is a usage error.
            let _ = e.print();
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if matches.get_flag("license") {
        print!("{}", cli::LICENSE);
        return Ok(());
    }

    // Extract arguments.
    let config = cli::parse(&matches).unwrap_or_else(|e| abort(e));

    // Set debug if desired.
    if config.verbose {
        logger::init();
    }

    let report = Report::new(config.output.as_deref().map(Path::new));
    let probe = ConnectProbe::new(config.timeout);

    // Start scanner.
    let summary = Scanner::new(&config, probe)
        .run(&report)
        .unwrap_or_else(|e| abort(e));

    log::debug!("Scan finished, {}", summary);

    report.finish();
    io::stdout().flush().context("failed to flush standard output")?;

    Ok(())
}

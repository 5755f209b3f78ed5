use log::{LevelFilter, Metadata, Record};

/// Writes debug records of this crate to stderr, stdout is reserved for
/// scan results.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with(env!("CARGO_CRATE_NAME"))
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[Debug] {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Turns on debug output. Calling it more than once is harmless.
pub fn init() {
    let _ = log::set_logger(&LOGGER).map(|_| log::set_max_level(LevelFilter::Debug));
}

use std::{
    fs::File,
    io::{self, Write},
    path::Path,
    sync::{Mutex, MutexGuard},
};

use crate::{addr, scan::ResultSink};

/// Prints scan events and saves every hit as an `ip:port` line.
///
/// Failures of the output file never stop the scan, they're only logged.
pub struct Report<C = io::Stdout> {
    console: Mutex<C>,
    output: Option<Mutex<File>>,
}

impl Report {
    pub fn new(output: Option<&Path>) -> Self {
        Self::with_console(io::stdout(), output)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking writer leaves nothing half updated worth refusing.
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<C: Write + Send> Report<C> {
    pub fn with_console(console: C, output: Option<&Path>) -> Self {
        let output = output.and_then(|path| match File::create(path) {
            Ok(file) => {
                log::debug!("Saving responding addresses to `{}`", path.display());
                Some(Mutex::new(file))
            }
            Err(e) => {
                log::debug!("Failed to open output file `{}`: {}", path.display(), e);
                None
            }
        });

        Self {
            console: Mutex::new(console),
            output,
        }
    }

    fn say(&self, line: String) {
        let mut console = lock(&self.console);
        let _ = writeln!(console, "{}", line);
    }

    fn save(&self, ip: u32, port: u16) {
        let Some(output) = &self.output else {
            return;
        };

        let line = format!("{}:{}\n", addr::to_text(ip), port);
        let mut file = lock(output);

        if let Err(e) = file.write_all(line.as_bytes()) {
            log::debug!("Failed to write to output file: {}", e);
        }
        if let Err(e) = file.flush() {
            log::debug!("Failed to flush output file: {}", e);
        }
    }

    /// Syncs the output file to disk and gives the console back.
    pub fn finish(self) -> C {
        if let Some(output) = self.output {
            let file = output.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Err(e) = file.sync_all() {
                log::debug!("Failed to close output file: {}", e);
            }
        }

        let mut console = self.console.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = console.flush();
        console
    }
}

impl<C: Write + Send> ResultSink for Report<C> {
    fn on_probe_attempt(&self, ip: u32, port: u16) {
        self.say(format!("Check connection to {}:{}", addr::to_text(ip), port));
    }

    fn on_hit(&self, ip: u32, port: u16) {
        self.save(ip, port);
        self.say(format!(
            "IP {} has been responsed on port {}. (yay!!!)",
            addr::to_text(ip),
            port
        ));
    }

    fn on_miss(&self, ip: u32) {
        self.say(format!("IP {} hasn't been responsed. (booooo)", addr::to_text(ip)));
    }
}

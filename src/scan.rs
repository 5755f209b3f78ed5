use std::{
    fmt::Display,
    net::SocketAddrV4,
    ops::Range,
    time::{Duration, Instant},
};

use rayon::prelude::{IntoParallelIterator, ParallelIterator};

use crate::{
    addr,
    error::ScanError,
    probe::{Probe, ProbeOutcome},
};

/// Ports probed when none are given.
pub const DEFAULT_PORTS: [u16; 2] = [80, 443];

/// Half open range of IPv4 addresses in integer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub start: u32,
    pub end: u32,
}

impl AddressRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Addresses covered, zero when `end` isn't past `start`.
    pub fn len(&self) -> u64 {
        u64::from(self.end.saturating_sub(self.start))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Range<u32> {
        self.start..self.end
    }
}

impl Display for AddressRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", addr::to_text(self.start), addr::to_text(self.end))
    }
}

/// Everything a sweep needs, fixed once it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub range: AddressRange,
    /// Probe order per address, duplicates are kept.
    pub ports: Vec<u16>,
    pub timeout: Duration,
    pub report_misses: bool,
    pub verbose: bool,
    pub output: Option<String>,
    /// Addresses swept at once, `1` keeps the sweep sequential.
    pub jobs: usize,
}

impl ScanConfig {
    pub fn new(range: AddressRange) -> Self {
        Self {
            range,
            ports: DEFAULT_PORTS.to_vec(),
            timeout: Duration::from_secs(5),
            report_misses: false,
            verbose: false,
            output: None,
            jobs: 1,
        }
    }
}

/// Verdict for one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult {
    /// First port, in configured order, that accepted a connection.
    Responding(u16),
    NoResponse,
}

/// Receives scan events as they happen.
///
/// Methods take `&self` since a parallel sweep calls them from several
/// threads, implementations serialize their own writes.
pub trait ResultSink: Sync {
    fn on_probe_attempt(&self, ip: u32, port: u16);
    fn on_hit(&self, ip: u32, port: u16);
    fn on_miss(&self, ip: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub elapsed: Duration,
    pub addresses: u64,
    pub responding: u64,
}

impl Display for ScanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} address(es) responded in {:.4}s",
            self.responding,
            self.addresses,
            self.elapsed.as_secs_f32()
        )
    }
}

pub struct Scanner<'a, P> {
    config: &'a ScanConfig,
    probe: P,
}

impl<'a, P: Probe> Scanner<'a, P> {
    pub fn new(config: &'a ScanConfig, probe: P) -> Self {
        Self { config, probe }
    }

    /// Tries the configured ports of `ip` in order until one connects.
    fn scan_address(&self, ip: u32, sink: &dyn ResultSink) -> Result<ScanResult, ScanError> {
        let target = addr::to_ipv4(ip);

        for &port in &self.config.ports {
            if self.config.verbose {
                sink.on_probe_attempt(ip, port);
            }

            if self.probe.check(SocketAddrV4::new(target, port))? == ProbeOutcome::Connected {
                return Ok(ScanResult::Responding(port));
            }
        }

        Ok(ScanResult::NoResponse)
    }

    fn visit(&self, ip: u32, sink: &dyn ResultSink) -> Result<bool, ScanError> {
        match self.scan_address(ip, sink)? {
            ScanResult::Responding(port) => {
                sink.on_hit(ip, port);
                Ok(true)
            }
            ScanResult::NoResponse => {
                if self.config.report_misses {
                    sink.on_miss(ip);
                }
                Ok(false)
            }
        }
    }

    fn sweep_sequential(&self, sink: &dyn ResultSink) -> Result<u64, ScanError> {
        let mut responding = 0;
        for ip in self.config.range.iter() {
            if self.visit(ip, sink)? {
                responding += 1;
            }
        }
        Ok(responding)
    }

    fn sweep_parallel(&self, sink: &dyn ResultSink) -> Result<u64, ScanError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .build()
            .map_err(ScanError::WorkerPool)?;

        pool.install(|| {
            self.config
                .range
                .iter()
                .into_par_iter()
                .map(|ip| self.visit(ip, sink).map(u64::from))
                .try_reduce(|| 0, |a, b| Ok(a + b))
        })
    }

    /// Sweeps the whole range, stopping only on a system failure.
    pub fn run(&self, sink: &dyn ResultSink) -> Result<ScanSummary, ScanError> {
        log::debug!(
            "Scanning {} ({} address(es)) on port(s) {:?} with {:?} timeout",
            self.config.range,
            self.config.range.len(),
            self.config.ports,
            self.config.timeout,
        );

        let now = Instant::now();
        let responding = if self.config.jobs > 1 {
            self.sweep_parallel(sink)?
        } else {
            self.sweep_sequential(sink)?
        };

        Ok(ScanSummary {
            elapsed: now.elapsed(),
            addresses: self.config.range.len(),
            responding,
        })
    }
}

use std::time::Duration;

use clap::{arg, crate_authors, crate_name, crate_version, Arg, ArgAction, ArgMatches, Command};

use crate::{
    addr,
    error::ScanError,
    scan::{AddressRange, ScanConfig, DEFAULT_PORTS},
};

/// First address scanned when none is given.
pub const DEFAULT_BEGIN: &str = "1.1.1.1";
/// Address after the last one scanned when none is given.
pub const DEFAULT_END: &str = "255.255.255.255";

pub const LICENSE: &str = "\
MIT License

Copyright (c) 2018 Eridan Domoratskiy

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
";

pub fn command() -> Command {
    Command::new(crate_name!())
        .about(
            "Scans a range of IPv4 addresses by ports with TCP connect.\n\
            The end address is the one after the last scanned.",
        )
        .version(crate_version!())
        .author(crate_authors!())
        .args([
            Arg::new("print-boo")
                .short('b')
                .long("print-boo")
                .help("Print addresses that didn't respond")
                .action(ArgAction::SetTrue),
            arg!(-D --debug "Print every attempt and why it failed").action(ArgAction::SetTrue),
            arg!(-l --license "Show software license and quit").action(ArgAction::SetTrue),
            arg!(-p --ports <PORT> "Ports to check in order, replaces the default 80 443, repeating adds more")
                .num_args(1..)
                .value_delimiter(',')
                .action(ArgAction::Append),
            arg!(-d --delay <SECONDS> "Connection waiting time").default_value("5"),
            arg!(-o --output <FILE> "File to save \"ip:port\" pairs to, rewritten on every run"),
            arg!(-j --jobs <N> "Addresses scanned at once").default_value("1"),
        ])
        .args([
            arg!([begin] "First IP to scan, e.g. 10.0.0.1").default_value(DEFAULT_BEGIN),
            arg!([end] "IP after the last one to scan").default_value(DEFAULT_END),
        ])
}

fn one<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}

/// Turns parsed arguments into a scan configuration.
pub fn parse(matches: &ArgMatches) -> Result<ScanConfig, ScanError> {
    let ports = match matches.get_many::<String>("ports") {
        Some(rps) => rps
            .map(|rp| match rp.trim().parse::<u16>() {
                Ok(p) => Ok(p),
                Err(_) => Err(ScanError::InvalidPort(String::from(rp))),
            })
            .collect::<Result<_, _>>()?,
        None => DEFAULT_PORTS.to_vec(),
    };

    let raw_delay = one(matches, "delay");
    let delay = raw_delay
        .parse::<u64>()
        .map_err(|_| ScanError::InvalidDelay(raw_delay.into()))?;

    let raw_jobs = one(matches, "jobs");
    let jobs = match raw_jobs.parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => return Err(ScanError::InvalidJobs(raw_jobs.into())),
    };

    let range = AddressRange::new(
        addr::from_text(one(matches, "begin")),
        addr::from_text(one(matches, "end")),
    );

    Ok(ScanConfig {
        range,
        ports,
        timeout: Duration::from_secs(delay),
        report_misses: matches.get_flag("print-boo"),
        verbose: matches.get_flag("debug"),
        output: matches.get_one::<String>("output").cloned(),
        jobs,
    })
}

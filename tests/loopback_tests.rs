use std::{
    fs,
    net::{Ipv4Addr, TcpListener},
    time::Duration,
};

use ipscan::{
    addr,
    probe::ConnectProbe,
    report::Report,
    scan::{AddressRange, ScanConfig, Scanner},
};

fn listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn unused_port() -> u16 {
    listener().1
}

#[test]
fn sweep_over_loopback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("found.txt");
    let (_listener, open) = listener();
    let closed = unused_port();

    // 127.0.0.2 is routed to loopback too but nothing listens there.
    let mut config = ScanConfig::new(AddressRange::new(
        addr::from_text("127.0.0.1"),
        addr::from_text("127.0.0.3"),
    ));
    config.ports = vec![closed, open];
    config.timeout = Duration::from_secs(2);
    config.report_misses = true;
    config.verbose = true;

    let report = Report::with_console(Vec::new(), Some(path.as_path()));
    let summary = Scanner::new(&config, ConnectProbe::new(config.timeout))
        .run(&report)
        .unwrap();
    let console = String::from_utf8(report.finish()).unwrap();

    assert_eq!(summary.addresses, 2);
    assert_eq!(summary.responding, 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), format!("127.0.0.1:{open}\n"));
    assert_eq!(
        console,
        format!(
            "Check connection to 127.0.0.1:{closed}\n\
             Check connection to 127.0.0.1:{open}\n\
             IP 127.0.0.1 has been responsed on port {open}. (yay!!!)\n\
             Check connection to 127.0.0.2:{closed}\n\
             Check connection to 127.0.0.2:{open}\n\
             IP 127.0.0.2 hasn't been responsed. (booooo)\n"
        )
    );
}

#[test]
fn parallel_sweep_over_loopback() {
    let (_listener, open) = listener();

    let mut config = ScanConfig::new(AddressRange::new(
        addr::from_text("127.0.0.1"),
        addr::from_text("127.0.0.9"),
    ));
    config.ports = vec![open];
    config.timeout = Duration::from_secs(2);
    config.jobs = 4;

    let report = Report::with_console(Vec::new(), None);
    let summary = Scanner::new(&config, ConnectProbe::new(config.timeout))
        .run(&report)
        .unwrap();
    let console = String::from_utf8(report.finish()).unwrap();

    assert_eq!(summary.addresses, 8);
    assert_eq!(summary.responding, 1);
    assert_eq!(console, format!("IP 127.0.0.1 has been responsed on port {open}. (yay!!!)\n"));
}

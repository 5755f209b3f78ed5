//! Kept alone in its own binary so no other test opens descriptors meanwhile.

use std::{
    fs,
    net::{Ipv4Addr, SocketAddrV4, TcpListener},
    time::Duration,
};

use ipscan::probe::{ConnectProbe, Probe, ProbeOutcome};

fn open_descriptors() -> usize {
    fs::read_dir("/proc/self/fd").unwrap().count()
}

#[test]
fn probes_leave_no_descriptor_behind() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let open = SocketAddrV4::new(Ipv4Addr::LOCALHOST, listener.local_addr().unwrap().port());
    let closed = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 2), open.port());
    let probe = ConnectProbe::new(Duration::from_secs(2));
    let quick = ConnectProbe::new(Duration::ZERO);

    let before = open_descriptors();

    for _ in 0..16 {
        assert_eq!(probe.check(open).unwrap(), ProbeOutcome::Connected);
        assert_eq!(probe.check(closed).unwrap(), ProbeOutcome::Refused);
        // Either the handshake finishes inside connect or the zero budget gives up.
        assert_ne!(quick.check(closed).unwrap(), ProbeOutcome::Connected);
    }

    assert_eq!(open_descriptors(), before);
}

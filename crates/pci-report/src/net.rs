use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Best-guess LAN address of this host for display to operators.
///
/// Connecting a UDP socket sends nothing; it only makes the OS pick the
/// outbound interface. Loopback and link-local (APIPA) answers are ignored.
pub fn local_ip() -> Ipv4Addr {
    outbound_ipv4()
        .filter(|ip| !ip.is_loopback() && !ip.is_link_local() && !ip.is_unspecified())
        .unwrap_or(Ipv4Addr::LOCALHOST)
}

fn outbound_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(_) => None,
    }
}

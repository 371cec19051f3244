// Listener module
// Creates the TCP listener and works out the address other devices should use

use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, SocketAddr, UdpSocket};
use tokio::net::TcpListener;

/// Create a `TcpListener` bound to `addr`.
///
/// `SO_REUSEADDR` lets a stopped server be started again on the same port
/// while old connections sit in `TIME_WAIT`; it does not allow two live
/// listeners on one port, so a taken port still fails with `AddrInUse`.
///
/// Must be called from within a Tokio runtime.
pub fn create_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // On Windows SO_REUSEADDR would allow stealing a port in use
    #[cfg(unix)]
    socket.set_reuse_address(true)?;

    // Set non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;

    // Convert socket2::Socket to std::net::TcpListener, then to tokio::net::TcpListener
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

/// Address of this machine on the local network
///
/// Connecting a UDP socket only selects a route; no packet is sent.
pub fn detect_lan_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

/// URL other devices can open to reach a server bound to `addr`
pub fn access_url(addr: &SocketAddr) -> Option<String> {
    let ip = if addr.ip().is_unspecified() {
        detect_lan_ip()?
    } else {
        addr.ip()
    };
    Some(format!("http://{}", SocketAddr::new(ip, addr.port())))
}

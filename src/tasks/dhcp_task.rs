//! DHCP server for the access point.
//!
//! Clients joining the access point lease an address from the device's /24 and
//! get the device itself as gateway, so they can reach the TCP listener without
//! any manual network setup.
use crate::config::NetworkConfig;
use core::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use edge_dhcp::io::{self, DEFAULT_SERVER_PORT};
use edge_dhcp::server::{Server, ServerOptions};
use edge_nal::UdpBind;
use edge_nal_embassy::{Udp, UdpBuffers};
use embassy_net::Stack;
use embassy_time::Timer;
use log::{error, info, warn};

/// Largest DHCP packet handled.
const PACKET_SIZE: usize = 1500;
const MAX_LEASES: usize = 8;

#[embassy_executor::task]
pub async fn dhcp_task(stack: Stack<'static>, network: &'static NetworkConfig) {
    let ip = Ipv4Addr::from(network.address);
    let mut buf = [0u8; PACKET_SIZE];
    let mut gateways = [ip];

    let buffers = UdpBuffers::<1, PACKET_SIZE, PACKET_SIZE, 2>::new();
    let udp = Udp::new(stack, &buffers);
    let mut socket = match udp
        .bind(SocketAddr::V4(SocketAddrV4::new(
            Ipv4Addr::UNSPECIFIED,
            DEFAULT_SERVER_PORT,
        )))
        .await
    {
        Ok(socket) => socket,
        Err(e) => {
            error!("DHCP server failed to bind: {:?}", e);
            return;
        }
    };

    info!("DHCP server running on {ip}");
    let mut server = Server::<_, MAX_LEASES>::new_with_et(ip);
    loop {
        if let Err(e) = io::server::run(
            &mut server,
            &ServerOptions::new(ip, Some(&mut gateways)),
            &mut socket,
            &mut buf,
        )
        .await
        {
            warn!("DHCP server error: {:?}", e);
        }
        Timer::after_millis(500).await;
    }
}

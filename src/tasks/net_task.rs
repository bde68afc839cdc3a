//! Access point bring-up and the TCP command listener.
//!
//! The listener owns a single socket, so while a session is live any other
//! client's connection attempt is refused by the stack. Each accepted client is
//! handed to [`serve`] until it disconnects or times out.
extern crate alloc;

use crate::config::{ArmConfig, NetworkConfig, RX_BUF_SIZE, TX_BUF_SIZE};
use crate::robot::arm::Arm;
use crate::robot::ledc::ServoChannel;
use crate::session::{serve, SessionState};
use alloc::string::String;
use anyhow::anyhow;
use embassy_net::{tcp::TcpSocket, IpListenEndpoint, Ipv4Address, Ipv4Cidr, Stack, StaticConfigV4};
use embassy_time::{with_timeout, Duration, Timer};
use esp_wifi::wifi::{AccessPointConfiguration, AuthMethod, Configuration, WifiController, WifiDevice};
use log::{error, info};

const CLOSE_TIMEOUT: Duration = Duration::from_millis(500);

#[embassy_executor::task]
pub async fn runner_task(mut runner: embassy_net::Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}

/// Static addressing for the access point interface.
pub fn static_ip_config(network: &NetworkConfig) -> embassy_net::Config {
    let [a, b, c, d] = network.address;
    let address = Ipv4Address::new(a, b, c, d);
    embassy_net::Config::ipv4_static(StaticConfigV4 {
        address: Ipv4Cidr::new(address, network.prefix_len),
        gateway: Some(address),
        dns_servers: Default::default(),
    })
}

pub fn start_access_point(
    wifi_controller: &mut WifiController<'_>,
    network: &NetworkConfig,
) -> anyhow::Result<()> {
    let config = Configuration::AccessPoint(AccessPointConfiguration {
        ssid: String::from(network.ssid),
        password: String::from(network.password),
        auth_method: AuthMethod::WPA2Personal,
        ..Default::default()
    });

    info!("Starting access point: {}", network.ssid);
    wifi_controller
        .set_configuration(&config)
        .map_err(|e| anyhow!("fail setting configuration of wifi controller: {e:?}"))?;

    wifi_controller
        .set_power_saving(esp_wifi::config::PowerSaveMode::None)
        .map_err(|e| anyhow!("Fail setting wifi power mode: {e:?}"))?;

    wifi_controller
        .start()
        .map_err(|e| anyhow!("An error occured starting the access point: {e:?}"))?;

    Ok(())
}

#[embassy_executor::task]
pub async fn tcp_server(
    stack: Stack<'static>,
    mut arm: Arm<ServoChannel>,
    config: &'static ArmConfig,
) {
    let mut rx_buf = [0u8; RX_BUF_SIZE];
    let mut tx_buf = [0u8; TX_BUF_SIZE];
    let port = config.network.port;

    while !stack.is_config_up() {
        Timer::after_millis(500).await;
    }

    if let Some(ip) = stack.config_v4() {
        info!("TCP server listening at address {}:{}", ip.address, port);
    }

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buf, &mut tx_buf);

        if let Err(e) = socket.accept(IpListenEndpoint { port, addr: None }).await {
            error!("Accept failed: {:?}", e);
            Timer::after_millis(500).await; // Backoff delay
            continue;
        }
        info!("Client connected: {:?}", socket.remote_endpoint());

        let session = serve(&mut socket, &mut arm, &config.session).await;
        let stats = session.stats();
        info!(
            "Client disconnected ({:?}): {} applied, {} ignored, {} decode misses, {} overflows, {} write failures",
            session.state(),
            stats.applied,
            stats.ignored,
            stats.decode_misses,
            stats.overflows,
            stats.write_failures
        );

        match session.state() {
            SessionState::TimedOut => socket.abort(),
            _ => socket.close(),
        }
        let _ = with_timeout(CLOSE_TIMEOUT, socket.flush()).await;
    }
}

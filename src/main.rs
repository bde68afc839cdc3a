#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

extern crate alloc;

use alloc::boxed::Box;
use arm_controller::config::ArmConfig;
use arm_controller::robot::ledc::create_arm;
use arm_controller::tasks::dhcp_task::dhcp_task;
use arm_controller::tasks::net_task::{
    runner_task, start_access_point, static_ip_config, tcp_server,
};
use core::future::pending;
use embassy_executor::Spawner;
use embassy_net::StackResources;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{AnyPin, Pin};
use esp_hal::timer::timg::TimerGroup;
use log::{error, info};

esp_bootloader_esp_idf::esp_app_desc!();

//SERVOS: [base, shoulder, elbow, gripper]
//GPIO: [14, 12, 13, 15]

static ARM_CONFIG: ArmConfig = ArmConfig::DEFAULT;

macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.init_with(|| $val)
    }};
}

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let p = esp_hal::init(config);

    esp_alloc::heap_allocator!(size: 32 * 1024);
    esp_alloc::heap_allocator!(#[unsafe(link_section = ".dram2_uninit")] size: 96 * 1024);

    let timer0 = TimerGroup::new(p.TIMG1);
    esp_hal_embassy::init(timer0.timer0);

    let servo_pins: [AnyPin<'static>; 4] = [
        p.GPIO14.degrade(),
        p.GPIO12.degrade(),
        p.GPIO13.degrade(),
        p.GPIO15.degrade(),
    ];
    let arm = create_arm(p.LEDC, servo_pins, &ARM_CONFIG).expect("Fail configurating servos");

    // take important peripherals
    let mut rng = esp_hal::rng::Rng::new(p.RNG);
    let timer1 = TimerGroup::new(p.TIMG0);
    let wifi_init = esp_wifi::init(timer1.timer0, rng, p.RADIO_CLK)
        .expect("Failed to initialize WIFI controller");
    let wifi_init = Box::leak(Box::new(wifi_init));
    let (mut wifi_controller, interfaces) =
        esp_wifi::wifi::new(wifi_init, p.WIFI).expect("Failed to initialize WIFI controller");

    if let Err(e) = start_access_point(&mut wifi_controller, &ARM_CONFIG.network) {
        error!("Access point bring-up failed: {e:?}");
        loop {
            pending::<()>().await;
        }
    }

    //Get the embassy net stack up and working.
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let (stack, runner) = embassy_net::new(
        interfaces.ap,
        static_ip_config(&ARM_CONFIG.network),
        mk_static!(StackResources<4>, StackResources::new()),
        seed,
    );

    info!("Starting arm controller...");
    info!(
        "Waiting for JSON commands: {{\"type\":\"servo\",\"servo1\":angle,\"servo2\":angle,\"servo3\":angle,\"servo4\":angle}}"
    );
    spawner
        .spawn(runner_task(runner))
        .expect("Fail spawning runner task");
    spawner
        .spawn(dhcp_task(stack, &ARM_CONFIG.network))
        .expect("Fail spawning dhcp task");
    spawner
        .spawn(tcp_server(stack, arm, &ARM_CONFIG))
        .expect("Fail spawning tcp server task");

    // Keeps the wifi controller alive for the lifetime of the firmware.
    let _wifi_controller = wifi_controller;
    loop {
        pending::<()>().await;
    }
}

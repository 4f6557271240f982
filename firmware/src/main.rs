#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use core::future::pending;
use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{AnyPin, Pin};
use esp_hal::ledc::channel::{self, Channel, ChannelIFace, Number};
use esp_hal::ledc::timer::{self, LSClockSource, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::uart::{self, Uart};
use esp_hal::Blocking;
use log::{debug, info};
use quadruped_link::config::{BAUD_RATE, POLL_INTERVAL_MS, PWM_FREQUENCY_HZ, SERVO_COUNT};
use quadruped_link::robot::{channel_layout, Servo, ServoCalibration};
use quadruped_link::{Controller, Tick};

esp_bootloader_esp_idf::esp_app_desc!();

// Channel order: [knee, hip] per leg, legs FL, BL, FR, BR.
const SERVO_GPIOS: [u8; SERVO_COUNT] = [32, 33, 25, 26, 27, 14, 12, 13];

type PoseController = Controller<Uart<'static, Blocking>, Channel<'static, LowSpeed>>;

macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.init_with(|| $val)
    }};
}

#[embassy_executor::task]
async fn poll_task(mut controller: PoseController) {
    info!("[POLL_TASK] listening every {POLL_INTERVAL_MS} ms");
    loop {
        match controller.poll() {
            Tick::Dispatched { updated } => {
                debug!("[POLL_TASK] {updated}/{SERVO_COUNT} channels updated")
            }
            Tick::Idle | Tick::Skipped => {}
        }
        Timer::after_millis(POLL_INTERVAL_MS).await;
    }
}

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let p = esp_hal::init(config);

    let timer0 = TimerGroup::new(p.TIMG1);
    esp_hal_embassy::init(timer0.timer0);

    let servo_pins: [AnyPin<'static>; SERVO_COUNT] = [
        p.GPIO32.degrade(),
        p.GPIO33.degrade(),
        p.GPIO25.degrade(),
        p.GPIO26.degrade(),
        p.GPIO27.degrade(),
        p.GPIO14.degrade(),
        p.GPIO12.degrade(),
        p.GPIO13.degrade(),
    ];

    let mut ledc = Ledc::new(p.LEDC);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

    let pwm_timer = mk_static!(
        timer::Timer<'static, LowSpeed>,
        ledc.timer::<LowSpeed>(timer::Number::Timer0)
    );
    pwm_timer
        .configure(timer::config::Config {
            duty: timer::config::Duty::Duty14Bit,
            clock_source: LSClockSource::APBClk,
            frequency: Rate::from_hz(PWM_FREQUENCY_HZ),
        })
        .expect("Fail creating ledc timer");
    let pwm_timer: &'static timer::Timer<'static, LowSpeed> = pwm_timer;

    let [p0, p1, p2, p3, p4, p5, p6, p7] = servo_pins;
    let channels: [Channel<'static, LowSpeed>; SERVO_COUNT] = [
        ledc.channel(Number::Channel0, p0),
        ledc.channel(Number::Channel1, p1),
        ledc.channel(Number::Channel2, p2),
        ledc.channel(Number::Channel3, p3),
        ledc.channel(Number::Channel4, p4),
        ledc.channel(Number::Channel5, p5),
        ledc.channel(Number::Channel6, p6),
        ledc.channel(Number::Channel7, p7),
    ];

    // No pulse until the first command arrives.
    let layout = channel_layout(SERVO_GPIOS);
    let mut index = 0;
    let servos = channels.map(|mut channel| {
        channel
            .configure(channel::config::Config {
                timer: pwm_timer,
                duty_pct: 0,
                pin_config: channel::config::PinConfig::PushPull,
            })
            .expect("Fail configurating servo channel");
        let servo = Servo::new(channel, layout[index], ServoCalibration::default());
        index += 1;
        servo
    });

    let serial = Uart::new(
        p.UART0,
        uart::Config::default().with_baudrate(BAUD_RATE),
    )
    .expect("Fail creating uart")
    .with_rx(p.GPIO3)
    .with_tx(p.GPIO1);

    info!("Starting quadruped pose link...");
    for descriptor in layout {
        debug!("{descriptor}");
    }
    spawner
        .spawn(poll_task(Controller::new(serial, servos)))
        .expect("Fail spawning poll task");

    loop {
        pending::<()>().await;
    }
}

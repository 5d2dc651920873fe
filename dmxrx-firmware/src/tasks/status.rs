//! Status task
//!
//! Consumer context: owns the receiver session, reports link health on
//! the defmt log and mirrors liveness on the status LED.

use defmt::*;
use embassy_rp::gpio::{Level, Output};
use embassy_time::{Duration, Ticker};

use dmxrx_core::config::MAX_WATCH_CHANNELS;
use dmxrx_core::{AppConfig, DmxReceiver};

use crate::board;
use crate::platform::{EmbassyClock, Rs485Port};

/// Status task - starts the receiver and reports periodically
#[embassy_executor::task]
pub async fn status_task(
    mut receiver: DmxReceiver<'static, Rs485Port, EmbassyClock>,
    app: AppConfig,
    mut led: Output<'static>,
) {
    info!("Status task started");

    if let Err(e) = receiver.initialize(board::receiver_config(&app.rs485)) {
        error!("DMX receiver failed to start: {:?}", e);
        return;
    }

    let status = app.status;
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(
        status.report_interval_ms,
    )));
    let mut window = [0u8; MAX_WATCH_CHANNELS as usize];
    let mut was_connected = false;

    loop {
        ticker.next().await;

        let connected = receiver.is_connected();
        if connected != was_connected {
            if connected {
                info!("DMX signal acquired");
            } else {
                warn!("DMX signal lost");
            }
            was_connected = connected;
        }
        led.set_level(if connected { Level::High } else { Level::Low });

        let n = receiver.read_channels(
            &mut window,
            status.watch_start,
            usize::from(status.watch_count),
        );

        info!(
            "DMX connected={} packets={} errors={} rate={}Hz size={} age={}ms ch{}+: {}",
            connected,
            receiver.packet_count(),
            receiver.error_count(),
            receiver.packet_rate(),
            receiver.last_packet_size(),
            receiver.time_since_last_packet(),
            status.watch_start,
            &window[..n]
        );
    }
}

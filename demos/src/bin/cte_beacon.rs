//! This demo brings up a direction-finding beacon on a Bluetooth LE controller
//! that is attached over an HCI UART (and reset with a GPIO pin).
//!
//! The beacon advertises an Eddystone-UID frame and appends CTEs to its
//! periodic advertising train. Build with `--features aod` to send CTEs
//! for Angle of Departure instead of Angle of Arrival.
//!
//! Set the `RUST_LOG` environment variable to change the log level (default is `info`).
//!
//! See bt-df-rs and df-beacon-rs documentation.
use std::{thread::sleep, time::Duration};

use anyhow::Result;
use bt_df::radio::HciController;
use df_beacon::{bring_up, BeaconConfig, CteMode, LogSent};
use df_beacon_demos::{
    debug_err,
    linux::{BoardHardware, CdevPin as DigitalOutImpl, Delay as DelayImpl, Serial as SerialImpl},
};
use log::info;

/// A struct to drive our demo app
struct App {
    /// Any platform-specific functionality is abstracted into this object.
    #[allow(dead_code, reason = "keep board's peripheral objects alive")]
    board: BoardHardware,
    /// Our instantiated HCI controller object.
    controller: HciController<SerialImpl, DigitalOutImpl, DelayImpl>,
}

impl App {
    pub fn new() -> Result<Self> {
        // instantiate a hardware peripherals on the board
        let mut board = BoardHardware::default()?;

        // instantiate the controller object using board's hardware
        let controller = HciController::new(
            board.default_reset_pin()?,
            BoardHardware::default_serial()?,
            DelayImpl,
        );
        Ok(Self { board, controller })
    }

    /// The beacon's configuration, as selected by cargo features.
    fn config() -> BeaconConfig {
        let config = BeaconConfig::default();
        if cfg!(feature = "aod") {
            config.with_cte_mode(CteMode::aod())
        } else {
            config
        }
    }

    /// Bring up the beacon and report its "sent" events until the process is stopped.
    pub fn run(&mut self) -> Result<()> {
        let config = Self::config();
        let mut beacon = match bring_up(&mut self.controller, &config, LogSent) {
            Ok(beacon) => beacon,
            // the failed step was logged; the controller is left as it is
            Err(_) => return Ok(()),
        };
        loop {
            beacon.process_events().map_err(debug_err)?;
            sleep(Duration::from_millis(100));
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting Connectionless Beacon Demo");
    let mut app = App::new()?;
    app.run()
}

#![no_std]
#![doc = include_str!("../README.md")]
//!
//! ## Example
//!
//! ```ignore
//! use df_beacon::{bring_up, BeaconConfig, CteMode, LogSent};
//!
//! let config = BeaconConfig::default().with_cte_mode(CteMode::aod());
//! match bring_up(&mut controller, &config, LogSent) {
//!     Ok(mut beacon) => loop {
//!         beacon.process_events()?;
//!     },
//!     // the failing step was already logged
//!     Err(e) => return Err(e.code()),
//! }
//! ```

// This mod MUST go first, so that the others see its macros.
mod fmt;

mod beacon;
pub use beacon::{bring_up, Beacon, BringUpError, BringUpStep, LogSent, SentHandler};

mod config;
pub use config::{
    AntennaPattern, AodSlot, BeaconConfig, CteMode, InstanceId, CTE_LEN, DEFAULT_ANT_PATTERN,
    MAX_ANT_IDS, PER_ADV_EVENT_CTE_COUNT,
};

pub mod eddystone;

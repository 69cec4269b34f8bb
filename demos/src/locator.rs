//! Angle reports sent by a direction-finding locator about the beacons it hears.
extern crate std;

use anyhow::{anyhow, Error};
use core::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use std::string::String;

/// The port the locator connects to.
pub const LOCATOR_PORT: u16 = 8080;

/// One angle measurement of a beacon.
///
/// A report is a line of comma-separated fields:
/// `device_id, instance_id, rssi, azimuth, elevation, channel`.
/// Only the digits and `-` of each field are kept, so quoted or
/// labelled values (`"azimuth":-12`) are accepted. Fields after the
/// sixth are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AngleReport {
    /// The locator's identifier of the beacon.
    pub device_id: String,
    /// The Eddystone instance the beacon advertises.
    pub instance_id: String,
    pub rssi: i32,
    /// Degrees.
    pub azimuth: i32,
    /// Degrees.
    pub elevation: i32,
    pub channel: i32,
}

/// Keep the digits and `-` of a field.
fn digits(field: &str) -> String {
    field
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect()
}

fn number(name: &str, field: &str) -> Result<i32, Error> {
    let value = digits(field);
    value
        .parse()
        .map_err(|_| anyhow!("{name} is not a number: {:?}", field.trim()))
}

impl FromStr for AngleReport {
    type Err = Error;

    fn from_str(report: &str) -> Result<Self, Self::Err> {
        let mut fields = report.split(',');
        let mut next = |name: &str| {
            fields
                .next()
                .ok_or_else(|| anyhow!("report has no {name}"))
        };
        let device_id = digits(next("device_id")?);
        let instance_id = digits(next("instance_id")?);
        let rssi = number("rssi", next("rssi")?)?;
        let azimuth = number("azimuth", next("azimuth")?)?;
        let elevation = number("elevation", next("elevation")?)?;
        let channel = number("channel", next("channel")?)?;
        Ok(AngleReport {
            device_id,
            instance_id,
            rssi,
            azimuth,
            elevation,
            channel,
        })
    }
}

impl Display for AngleReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} : Azimuth angle - {}°, Elevation angle - {}°",
            self.device_id, self.azimuth, self.elevation
        )
    }
}

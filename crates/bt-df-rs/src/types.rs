//! This module defines types used by various traits.
//! These types are meant to be agnostic of the trait implementation.

use core::{
    fmt::{Display, Formatter, Result},
    write,
};

use bitfield_struct::bitfield;

/// Fast advertising interval (minimum), in units of 0.625 ms (100 ms).
///
/// The same raw value is used for periodic advertising intervals, where the unit is 1.25 ms.
pub const ADV_FAST_INT_MIN_2: u16 = 0x00A0;
/// Fast advertising interval (maximum), in units of 0.625 ms (150 ms).
///
/// The same raw value is used for periodic advertising intervals, where the unit is 1.25 ms.
pub const ADV_FAST_INT_MAX_2: u16 = 0x00F0;

/// The type of an LE device address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressType {
    /// A public (IEEE-assigned) address.
    Public,
    /// A random address. Identity addresses of this type are random static addresses.
    Random,
}

impl AddressType {
    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            AddressType::Public => 0,
            AddressType::Random => 1,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AddressType {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            AddressType::Public => defmt::write!(fmt, "public"),
            AddressType::Random => defmt::write!(fmt, "random"),
        }
    }
}

impl Display for AddressType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            AddressType::Public => write!(f, "public"),
            AddressType::Random => write!(f, "random"),
        }
    }
}

/// An LE device address with its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeAddress {
    /// The 6 address bytes, stored in little-endian order (as sent over HCI).
    pub address: [u8; 6],
    /// Either public or random.
    pub address_type: AddressType,
}

impl LeAddress {
    /// Create a public address from its little-endian bytes.
    pub const fn public(address: [u8; 6]) -> Self {
        Self {
            address,
            address_type: AddressType::Public,
        }
    }

    /// Create a random address from its little-endian bytes.
    pub const fn random(address: [u8; 6]) -> Self {
        Self {
            address,
            address_type: AddressType::Random,
        }
    }

    /// Get the address bytes with the most significant byte first,
    /// which is the order an address is written in.
    pub fn to_be_bytes(&self) -> [u8; 6] {
        let mut result = self.address;
        result.reverse();
        result
    }

    /// Is this address all zeros or all ones?
    ///
    /// Controllers without a programmed public address report one of these.
    pub fn is_unassigned(&self) -> bool {
        self.address.iter().all(|b| *b == 0) || self.address.iter().all(|b| *b == 0xFF)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LeAddress {
    fn format(&self, fmt: defmt::Formatter) {
        let a = self.to_be_bytes();
        defmt::write!(
            fmt,
            "{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X} ({})",
            a[0],
            a[1],
            a[2],
            a[3],
            a[4],
            a[5],
            self.address_type
        )
    }
}

impl Display for LeAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let a = self.to_be_bytes();
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X} ({})",
            a[0], a[1], a[2], a[3], a[4], a[5], self.address_type
        )
    }
}

/// Options that describe how an advertising set is advertised.
///
/// ```
/// use bt_df::AdvOptions;
/// let options = AdvOptions::new()
///     .with_ext_adv(true)
///     .with_use_identity(true);
/// ```
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct AdvOptions {
    /// Advertise with extended advertising PDUs.
    ///
    /// Periodic advertising (and thus connectionless CTE) requires this.
    pub ext_adv: bool,

    /// Advertise with the device's identity address.
    pub use_identity: bool,

    /// Include the TX power in the extended advertising header.
    pub use_tx_power: bool,

    #[bits(5)]
    _padding: u8,
}

/// Parameters of an (extended) advertising set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdvParams {
    /// How the set is advertised.
    pub options: AdvOptions,
    /// The advertising set identifier (0 to 15).
    pub sid: u8,
    /// Minimum primary advertising interval, in units of 0.625 ms.
    pub interval_min: u32,
    /// Maximum primary advertising interval, in units of 0.625 ms.
    pub interval_max: u32,
}

impl Default for AdvParams {
    /// Non-connectable extended advertising with the identity address
    /// at [`ADV_FAST_INT_MIN_2`]..[`ADV_FAST_INT_MAX_2`].
    fn default() -> Self {
        Self {
            options: AdvOptions::new().with_ext_adv(true).with_use_identity(true),
            sid: 0,
            interval_min: ADV_FAST_INT_MIN_2 as u32,
            interval_max: ADV_FAST_INT_MAX_2 as u32,
        }
    }
}

/// Parameters of periodic advertising.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerAdvParams {
    /// Minimum periodic advertising interval, in units of 1.25 ms.
    pub interval_min: u16,
    /// Maximum periodic advertising interval, in units of 1.25 ms.
    pub interval_max: u16,
    /// Include the TX power in periodic advertising PDUs.
    pub include_tx_power: bool,
}

impl Default for PerAdvParams {
    fn default() -> Self {
        Self {
            interval_min: ADV_FAST_INT_MIN_2,
            interval_max: ADV_FAST_INT_MAX_2,
            include_tx_power: true,
        }
    }
}

/// Parameters used when extended advertising is started.
///
/// A value of `0` in either field means "unlimited".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExtAdvStartParams {
    /// Advertising duration, in units of 10 ms.
    pub timeout: u16,
    /// Maximum number of extended advertising events.
    pub num_events: u8,
}

/// The type of a Constant Tone Extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CteType {
    /// Angle of Arrival: the receiver switches antennas.
    Aoa,
    /// Angle of Departure with 1 µs switching slots.
    Aod1us,
    /// Angle of Departure with 2 µs switching slots.
    Aod2us,
}

impl CteType {
    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            CteType::Aoa => 0,
            CteType::Aod1us => 1,
            CteType::Aod2us => 2,
        }
    }

    /// Does this CTE type require the transmitter to switch antennas?
    pub const fn is_aod(self) -> bool {
        !matches!(self, CteType::Aoa)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CteType {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            CteType::Aoa => defmt::write!(fmt, "AoA"),
            CteType::Aod1us => defmt::write!(fmt, "AoD 1 us"),
            CteType::Aod2us => defmt::write!(fmt, "AoD 2 us"),
        }
    }
}

impl Display for CteType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            CteType::Aoa => write!(f, "AoA"),
            CteType::Aod1us => write!(f, "AoD 1 us"),
            CteType::Aod2us => write!(f, "AoD 2 us"),
        }
    }
}

/// Parameters of the CTE appended to periodic advertising PDUs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CteTxParams<'a> {
    /// Length of the CTE, in units of 8 µs (2 to 20).
    pub cte_len: u8,
    /// Number of CTEs transmitted in each periodic advertising event (1 to 16).
    pub cte_count: u8,
    /// AoA or AoD.
    pub cte_type: CteType,
    /// The antenna switch pattern (antenna IDs in switching order).
    ///
    /// Only used for AoD. It should be empty for AoA.
    pub ant_ids: &'a [u8],
}

impl CteTxParams<'_> {
    /// The number of entries in the antenna switch pattern.
    pub fn num_ant_ids(&self) -> usize {
        self.ant_ids.len()
    }
}

/// A handle to an advertising set created by
/// [`LeExtAdv::create_adv_set()`](fn@crate::radio::prelude::LeExtAdv::create_adv_set).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdvSet {
    handle: u8,
}

impl AdvSet {
    /// Refer to the advertising set with the given `handle`.
    ///
    /// Only radio stack implementations should need this.
    pub const fn new(handle: u8) -> Self {
        Self { handle }
    }

    /// The set's index among all advertising sets of the stack.
    pub const fn index(&self) -> u8 {
        self.handle
    }
}

impl Display for AdvSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "adv-set@{}", self.handle)
    }
}

/// Information about a finished run of an advertising set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SentInfo {
    /// The number of extended advertising events that were sent.
    pub num_sent: u8,
}

/// Local out-of-band information of an advertising set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LeOob {
    /// The address the set advertises with.
    pub addr: LeAddress,
}

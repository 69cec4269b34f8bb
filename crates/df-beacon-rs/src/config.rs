use bt_df::{AdvParams, CteTxParams, CteType, ExtAdvStartParams, LeAddress, PerAdvParams};

use crate::eddystone::{EddystoneUidService, DEFAULT_NAMESPACE, PLACEHOLDER_INSTANCE};

/// Length of CTE in units of 8 µs.
pub const CTE_LEN: u8 = 0x14;
/// Number of CTEs sent in a single periodic advertising event.
pub const PER_ADV_EVENT_CTE_COUNT: u8 = 5;
/// Example sequence of antenna switch patterns for an antenna matrix designed by Nordic.
pub const DEFAULT_ANT_PATTERN: [u8; 12] = [0x2, 0x0, 0x5, 0x6, 0x1, 0x4, 0xC, 0x9, 0xE, 0xD, 0x8, 0xA];

/// The length of the longest antenna switch pattern a controller may accept.
pub const MAX_ANT_IDS: usize = 0x4B;

/// An antenna switch pattern used for AoD.
///
/// Each entry is the ID of the antenna used in the corresponding switch slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AntennaPattern {
    ids: [u8; MAX_ANT_IDS],
    len: u8,
}

impl Default for AntennaPattern {
    /// The [`DEFAULT_ANT_PATTERN`].
    fn default() -> Self {
        let mut ids = [0u8; MAX_ANT_IDS];
        ids[..DEFAULT_ANT_PATTERN.len()].copy_from_slice(&DEFAULT_ANT_PATTERN);
        Self {
            ids,
            len: DEFAULT_ANT_PATTERN.len() as u8,
        }
    }
}

impl AntennaPattern {
    /// Create a pattern from the given antenna `ids`.
    ///
    /// Returns [`None`] if more than [`MAX_ANT_IDS`] are given.
    pub fn new(ids: &[u8]) -> Option<Self> {
        if ids.len() > MAX_ANT_IDS {
            return None;
        }
        let mut buf = [0u8; MAX_ANT_IDS];
        buf[..ids.len()].copy_from_slice(ids);
        Some(Self {
            ids: buf,
            len: ids.len() as u8,
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.ids[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The duration of antenna switching and sampling slots used for AoD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AodSlot {
    Us1,
    #[default]
    Us2,
}

/// The direction-finding method the CTE is sent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CteMode {
    /// Angle of Arrival: the locator switches antennas, so no pattern is needed.
    #[default]
    Aoa,
    /// Angle of Departure: the beacon switches its antennas in the given `pattern`.
    Aod {
        slot: AodSlot,
        pattern: AntennaPattern,
    },
}

impl CteMode {
    /// AoD with 2 µs slots and the [`DEFAULT_ANT_PATTERN`].
    pub fn aod() -> Self {
        CteMode::Aod {
            slot: AodSlot::Us2,
            pattern: AntennaPattern::default(),
        }
    }

    pub const fn cte_type(&self) -> CteType {
        match self {
            CteMode::Aoa => CteType::Aoa,
            CteMode::Aod {
                slot: AodSlot::Us1, ..
            } => CteType::Aod1us,
            CteMode::Aod {
                slot: AodSlot::Us2, ..
            } => CteType::Aod2us,
        }
    }

    /// The antenna switch pattern (empty for AoA).
    pub fn ant_ids(&self) -> &[u8] {
        match self {
            CteMode::Aoa => &[],
            CteMode::Aod { pattern, .. } => pattern.as_slice(),
        }
    }
}

/// Where the Eddystone-UID instance ID comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InstanceId {
    /// Always advertise the given instance ID.
    Fixed([u8; 6]),
    /// Use the 6 bytes of the identity address (most significant byte first).
    #[default]
    FromIdentity,
}

impl InstanceId {
    /// Get the instance ID for a stack with the given `identity` address.
    ///
    /// [`PLACEHOLDER_INSTANCE`] is used if the identity is required but unknown.
    pub fn resolve(&self, identity: Option<LeAddress>) -> [u8; 6] {
        match (self, identity) {
            (InstanceId::Fixed(instance), _) => *instance,
            (InstanceId::FromIdentity, Some(addr)) => addr.to_be_bytes(),
            (InstanceId::FromIdentity, None) => PLACEHOLDER_INSTANCE,
        }
    }
}

/// An object to configure the beacon.
///
/// This struct follows a builder pattern. Since all fields are private, users should
/// start with the [`BeaconConfig::default`] constructor, then mutate the object accordingly.
/// ```
/// use df_beacon::{BeaconConfig, CteMode};
/// let config = BeaconConfig::default().with_cte_mode(CteMode::aod());
/// assert_eq!(config.cte_tx_params().num_ant_ids(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeaconConfig {
    adv_params: AdvParams,
    per_adv_params: PerAdvParams,
    ext_adv_start: ExtAdvStartParams,
    cte_len: u8,
    cte_count: u8,
    cte_mode: CteMode,
    namespace: [u8; 10],
    instance: InstanceId,
    tx_power: i8,
}

impl Default for BeaconConfig {
    /// Instantiate a [`BeaconConfig`] object with library defaults.
    ///
    /// | feature | default value |
    /// |--------:|:--------------|
    /// | [`BeaconConfig::adv_params()`] | [`AdvParams::default()`] |
    /// | [`BeaconConfig::per_adv_params()`] | [`PerAdvParams::default()`] |
    /// | [`BeaconConfig::ext_adv_start()`] | unlimited duration and events |
    /// | [`BeaconConfig::cte_len()`] | [`CTE_LEN`] |
    /// | [`BeaconConfig::cte_count()`] | [`PER_ADV_EVENT_CTE_COUNT`] |
    /// | [`BeaconConfig::cte_mode()`] | [`CteMode::Aoa`] |
    /// | [`BeaconConfig::namespace()`] | [`DEFAULT_NAMESPACE`] |
    /// | [`BeaconConfig::instance()`] | [`InstanceId::FromIdentity`] |
    /// | [`BeaconConfig::tx_power()`] | `0` |
    fn default() -> Self {
        Self {
            adv_params: AdvParams::default(),
            per_adv_params: PerAdvParams::default(),
            ext_adv_start: ExtAdvStartParams::default(),
            cte_len: CTE_LEN,
            cte_count: PER_ADV_EVENT_CTE_COUNT,
            cte_mode: CteMode::Aoa,
            namespace: DEFAULT_NAMESPACE,
            instance: InstanceId::FromIdentity,
            tx_power: 0,
        }
    }
}

impl BeaconConfig {
    pub const fn adv_params(&self) -> &AdvParams {
        &self.adv_params
    }

    /// Set the parameters of the advertising set.
    pub fn with_adv_params(self, params: AdvParams) -> Self {
        Self {
            adv_params: params,
            ..self
        }
    }

    pub const fn per_adv_params(&self) -> &PerAdvParams {
        &self.per_adv_params
    }

    /// Set the parameters of the periodic advertising train that carries the CTEs.
    pub fn with_per_adv_params(self, params: PerAdvParams) -> Self {
        Self {
            per_adv_params: params,
            ..self
        }
    }

    pub const fn ext_adv_start(&self) -> &ExtAdvStartParams {
        &self.ext_adv_start
    }

    /// Limit how long extended advertising runs.
    ///
    /// The beacon advertises indefinitely by default.
    pub fn with_ext_adv_start(self, params: ExtAdvStartParams) -> Self {
        Self {
            ext_adv_start: params,
            ..self
        }
    }

    /// Returns the value set by [`BeaconConfig::with_cte_len()`].
    pub const fn cte_len(&self) -> u8 {
        self.cte_len
    }

    /// Set the length of each CTE (in units of 8 µs).
    ///
    /// The radio stack validates this value when the beacon is brought up.
    pub fn with_cte_len(self, value: u8) -> Self {
        Self {
            cte_len: value,
            ..self
        }
    }

    /// Returns the value set by [`BeaconConfig::with_cte_count()`].
    pub const fn cte_count(&self) -> u8 {
        self.cte_count
    }

    /// Set the number of CTEs sent in each periodic advertising event.
    pub fn with_cte_count(self, value: u8) -> Self {
        Self {
            cte_count: value,
            ..self
        }
    }

    pub const fn cte_mode(&self) -> &CteMode {
        &self.cte_mode
    }

    pub fn with_cte_mode(self, mode: CteMode) -> Self {
        Self {
            cte_mode: mode,
            ..self
        }
    }

    pub const fn namespace(&self) -> &[u8; 10] {
        &self.namespace
    }

    /// Set the Eddystone-UID namespace.
    pub fn with_namespace(self, namespace: [u8; 10]) -> Self {
        Self { namespace, ..self }
    }

    pub const fn instance(&self) -> &InstanceId {
        &self.instance
    }

    /// Set the source of the Eddystone-UID instance ID.
    pub fn with_instance(self, instance: InstanceId) -> Self {
        Self { instance, ..self }
    }

    /// Returns the value set by [`BeaconConfig::with_tx_power()`].
    pub const fn tx_power(&self) -> i8 {
        self.tx_power
    }

    /// Set the calibrated TX power at 0 meters (in dBm) that is advertised.
    pub fn with_tx_power(self, level: i8) -> Self {
        Self {
            tx_power: level,
            ..self
        }
    }

    /// The CTE transmit parameters described by this configuration.
    ///
    /// For AoD, `num_ant_ids()` is the length of the configured pattern.
    pub fn cte_tx_params(&self) -> CteTxParams<'_> {
        CteTxParams {
            cte_len: self.cte_len,
            cte_count: self.cte_count,
            cte_type: self.cte_mode.cte_type(),
            ant_ids: self.cte_mode.ant_ids(),
        }
    }

    /// Build the Eddystone-UID service for a stack with the given `identity` address.
    pub fn eddystone(&self, identity: Option<LeAddress>) -> EddystoneUidService {
        let mut service = EddystoneUidService::new();
        service.set_tx_power(self.tx_power);
        service.set_namespace(&self.namespace);
        service.set_instance(&self.instance.resolve(identity));
        service
    }
}

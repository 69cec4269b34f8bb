/// A module encapsulating the HCI command opcodes used by [`HciController`](struct@super::HciController).
///
/// An opcode is `(OGF << 10) | OCF`, sent in little-endian order.
pub mod commands {
    pub const RESET: u16 = 0x0C03;
    pub const READ_BD_ADDR: u16 = 0x1009;
    pub const LE_SET_EVENT_MASK: u16 = 0x2001;
    pub const LE_SET_RANDOM_ADDRESS: u16 = 0x2005;
    pub const LE_SET_ADV_SET_RANDOM_ADDRESS: u16 = 0x2035;
    pub const LE_SET_EXT_ADV_PARAMS: u16 = 0x2036;
    pub const LE_SET_EXT_ADV_DATA: u16 = 0x2037;
    pub const LE_SET_EXT_ADV_ENABLE: u16 = 0x2039;
    pub const LE_SET_PER_ADV_PARAMS: u16 = 0x203E;
    pub const LE_SET_PER_ADV_ENABLE: u16 = 0x2040;
    pub const LE_SET_CL_CTE_TX_PARAMS: u16 = 0x2051;
    pub const LE_SET_CL_CTE_TX_ENABLE: u16 = 0x2052;
}

/// A module encapsulating HCI event codes and LE meta sub-event codes.
pub mod events {
    pub const COMMAND_COMPLETE: u8 = 0x0E;
    pub const COMMAND_STATUS: u8 = 0x0F;
    pub const LE_META: u8 = 0x3E;
    pub const LE_ADV_SET_TERMINATED: u8 = 0x12;
}

/// A module encapsulating the H4 (UART) packet indicators.
pub(super) mod indicators {
    pub const COMMAND: u8 = 0x01;
    pub const EVENT: u8 = 0x04;
}

/// A module encapsulating protocol limits and field values.
pub(super) mod mnemonics {
    /// Default LE event mask plus the "Advertising Set Terminated" event (bit 17).
    pub const LE_EVENT_MASK: u64 = 0x0000_0000_0002_001F;
    /// Include TxPower in the extended header (extended & periodic advertising properties).
    pub const PROP_INCLUDE_TX_POWER: u16 = 1 << 6;
    /// Use all 3 primary advertising channels.
    pub const CHANNEL_MAP_ALL: u8 = 0x07;
    /// No preference of the controller's advertising TX power.
    pub const TX_POWER_NO_PREF: u8 = 0x7F;
    pub const PHY_1M: u8 = 0x01;
    /// Extended advertising data operation: complete data.
    pub const OP_COMPLETE: u8 = 0x03;
    /// Extended advertising data fragment preference: don't fragment.
    pub const FRAG_NONE: u8 = 0x01;
    /// Max advertising data length of a single (complete) operation.
    pub const MAX_ADV_DATA_LEN: usize = 251;
    pub const ADV_INTERVAL_MIN: u32 = 0x20;
    pub const ADV_INTERVAL_MAX: u32 = 0xFF_FFFF;
    pub const PER_ADV_INTERVAL_MIN: u16 = 0x0006;
    pub const MAX_SID: u8 = 0x0F;
    pub const CTE_LEN_MIN: u8 = 0x02;
    pub const CTE_LEN_MAX: u8 = 0x14;
    pub const CTE_COUNT_MIN: u8 = 0x01;
    pub const CTE_COUNT_MAX: u8 = 0x10;
    pub const ANT_IDS_MIN: usize = 0x02;
    pub const ANT_IDS_MAX: usize = 0x4B;
}

//! A module to build the Eddystone-UID advertising payload.
//!
//! See [Google's Eddystone-UID][eddystone-uid] frame specification.
//!
//! [eddystone-uid]: https://github.com/google/eddystone/tree/master/eddystone-uid

/// The Eddystone Service UUID number
pub const EDDYSTONE_UUID: u16 = 0xFEAA;

/// The namespace advertised by default.
pub const DEFAULT_NAMESPACE: [u8; 10] = *b"NINA-B4TAG";

/// The instance ID advertised until it is replaced with a real one.
pub const PLACEHOLDER_INSTANCE: [u8; 6] = [0x10, 0x11, 0x12, 0x13, 0x14, 0x15];

/// Eddystone frame type of UID frames.
const FRAME_TYPE_UID: u8 = 0x00;

/// AD type: Flags
const AD_FLAGS: u8 = 0x01;
/// AD type: Complete List of 16-bit Service UUIDs
const AD_UUID16_ALL: u8 = 0x03;
/// AD type: Service Data - 16-bit UUID
const AD_SVC_DATA16: u8 = 0x16;
/// "BR/EDR not supported" flag
const AD_NO_BREDR: u8 = 0x04;

/// Some common traits related to advertising payloads.
pub mod prelude {
    /// A trait to define the factory method of constructing service data from a buffer.
    pub(super) trait FromBuffer {
        fn from_buffer(buf: &[u8]) -> Self;
    }

    /// A trait to define the buffer extraction of advertising payloads.
    pub trait AsBuffer {
        fn buffer(&self) -> &[u8];
    }
}

/// An AD structure carrying an Eddystone-UID frame.
///
/// The frame consists of 20 bytes:
///
/// | offset | size | field |
/// |-------:|-----:|:------|
/// | 0 | 1 | frame type (`0x00`) |
/// | 1 | 1 | TX power at 0 m (dBm) |
/// | 2 | 10 | namespace |
/// | 12 | 6 | instance |
/// | 18 | 2 | reserved (`0x00`) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EddystoneUidService {
    buf: [u8; 24],
}

impl Default for EddystoneUidService {
    fn default() -> Self {
        Self::new()
    }
}

impl EddystoneUidService {
    /// The length of an Eddystone-UID frame.
    pub const FRAME_LEN: usize = 20;

    /// Create an instance of [`EddystoneUidService`] with the [`DEFAULT_NAMESPACE`],
    /// the [`PLACEHOLDER_INSTANCE`] and a TX power of 0 dBm.
    pub fn new() -> Self {
        let mut data = [0u8; 24];
        data[0] = 23; // chunk length (including type)
        data[1] = AD_SVC_DATA16;
        data[2..4].copy_from_slice(&EDDYSTONE_UUID.to_le_bytes());
        data[4] = FRAME_TYPE_UID;
        data[6..16].copy_from_slice(&DEFAULT_NAMESPACE);
        data[16..22].copy_from_slice(&PLACEHOLDER_INSTANCE);
        Self { buf: data }
    }

    /// Set the calibrated TX power at 0 meters (in dBm).
    pub fn set_tx_power(&mut self, level: i8) {
        self.buf[5] = level as u8;
    }

    /// Get the calibrated TX power at 0 meters (in dBm).
    pub fn tx_power(&self) -> i8 {
        self.buf[5] as i8
    }

    pub fn set_namespace(&mut self, namespace: &[u8; 10]) {
        self.buf[6..16].copy_from_slice(namespace);
    }

    pub fn namespace(&self) -> [u8; 10] {
        let mut result = [0u8; 10];
        result.copy_from_slice(&self.buf[6..16]);
        result
    }

    pub fn set_instance(&mut self, instance: &[u8; 6]) {
        self.buf[16..22].copy_from_slice(instance);
    }

    pub fn instance(&self) -> [u8; 6] {
        let mut result = [0u8; 6];
        result.copy_from_slice(&self.buf[16..22]);
        result
    }

    /// The Eddystone-UID frame (the service data after the UUID).
    pub fn frame(&self) -> &[u8] {
        &self.buf[4..]
    }

    /// Find an Eddystone-UID service in a sequence of AD structures.
    ///
    /// Returns [`None`] if there is none, or if the AD structures are malformed.
    pub fn from_ad(data: &[u8]) -> Option<Self> {
        use prelude::FromBuffer;

        let mut index = 0_usize;
        while index < data.len() {
            let chunk_len = data[index] as usize;
            let end = index + chunk_len + 1;
            if chunk_len == 0 || end > data.len() {
                return None;
            }
            if data[index + 1] == AD_SVC_DATA16
                && chunk_len == 23
                && u16::from_le_bytes([data[index + 2], data[index + 3]]) == EDDYSTONE_UUID
                && data[index + 4] == FRAME_TYPE_UID
            {
                return Some(Self::from_buffer(&data[index..end]));
            }
            index = end;
        }
        None
    }
}

impl prelude::AsBuffer for EddystoneUidService {
    /// Transform the service data into an AD structure that is ready for broadcasting.
    fn buffer(&self) -> &[u8] {
        &self.buf
    }
}

impl prelude::FromBuffer for EddystoneUidService {
    fn from_buffer(buf: &[u8]) -> Self {
        let max_len = buf.len().min(24);
        let mut self_buf = [0u8; 24];
        self_buf[0..max_len].copy_from_slice(&buf[0..max_len]);
        Self { buf: self_buf }
    }
}

/// The complete advertising data of the beacon.
///
/// It holds the following AD structures:
///
/// 1. Flags: BR/EDR not supported
/// 2. Complete list of 16-bit service UUIDs: the Eddystone UUID
/// 3. Service data: the [`EddystoneUidService`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertisingData {
    buf: [u8; 31],
}

impl AdvertisingData {
    pub fn new(service: &EddystoneUidService) -> Self {
        use prelude::AsBuffer;

        let mut data = [0u8; 31];
        data[0..3].copy_from_slice(&[2, AD_FLAGS, AD_NO_BREDR]);
        data[3] = 3;
        data[4] = AD_UUID16_ALL;
        data[5..7].copy_from_slice(&EDDYSTONE_UUID.to_le_bytes());
        data[7..].copy_from_slice(service.buffer());
        Self { buf: data }
    }

    /// The Eddystone-UID service within this advertising data.
    pub fn service(&self) -> Option<EddystoneUidService> {
        EddystoneUidService::from_ad(&self.buf)
    }
}

impl prelude::AsBuffer for AdvertisingData {
    fn buffer(&self) -> &[u8] {
        &self.buf
    }
}

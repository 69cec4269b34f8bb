#![doc = include_str!("../README.md")]
//!
//! ## Basic API
//!
//! - [`HciController::new()`](fn@crate::radio::HciController::new)
//! - [`HciController::with_static_address()`](fn@crate::radio::HciController::with_static_address)
//! - [`BtStack::enable()`](fn@crate::radio::prelude::BtStack::enable)
//! - [`LeExtAdv::create_adv_set()`](fn@crate::radio::prelude::LeExtAdv::create_adv_set)
//! - [`LeExtAdv::set_adv_data()`](fn@crate::radio::prelude::LeExtAdv::set_adv_data)
//! - [`LeExtAdv::start_ext_adv()`](fn@crate::radio::prelude::LeExtAdv::start_ext_adv)
//! - [`LeExtAdv::poll_sent()`](fn@crate::radio::prelude::LeExtAdv::poll_sent)
//!
//! ## Direction finding API
//!
//! - [`LePerAdv::set_per_adv_params()`](fn@crate::radio::prelude::LePerAdv::set_per_adv_params)
//! - [`LePerAdv::start_per_adv()`](fn@crate::radio::prelude::LePerAdv::start_per_adv)
//! - [`DfCteTx::set_cte_tx_params()`](fn@crate::radio::prelude::DfCteTx::set_cte_tx_params)
//! - [`DfCteTx::enable_cte_tx()`](fn@crate::radio::prelude::DfCteTx::enable_cte_tx)
//!
#![no_std]

// This mod MUST go first, so that the others see its macros.
mod fmt;

mod types;
pub use types::{
    AddressType, AdvOptions, AdvParams, AdvSet, CteTxParams, CteType, ExtAdvStartParams,
    LeAddress, LeOob, PerAdvParams, SentInfo, ADV_FAST_INT_MAX_2, ADV_FAST_INT_MIN_2,
};
pub mod radio;

#[cfg(test)]
mod test {
    extern crate std;
    use crate::radio::HciController;
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction},
        serial::{Mock as SerialMock, Transaction as SerialTransaction},
    };
    use std::{vec, vec::Vec};

    /// Takes an indefinite repetition of a tuple of 2 vectors: `(command_packet, event_packet)`
    /// and generates an array of `SerialTransaction`s.
    ///
    /// NOTE: This macro is only used to generate code in unit tests (for this crate only).
    #[macro_export]
    macro_rules! hci_test_expects {
        ($( ($command:expr , $event:expr $(,)? ) , ) + ) => {
            [
                $(
                    embedded_hal_mock::eh1::serial::Transaction::<u8>::write_many($command),
                    embedded_hal_mock::eh1::serial::Transaction::<u8>::flush(),
                    embedded_hal_mock::eh1::serial::Transaction::<u8>::read_many($event),
                )*
            ]
        }
    }

    /// A tuple struct to encapsulate objects used to mock [`HciController`],
    pub struct MockController(
        pub HciController<SerialMock<u8>, PinMock, NoopDelay>,
        pub SerialMock<u8>,
        pub PinMock,
    );

    /// Create a mock objects using the given expectations.
    pub fn mk_controller(
        pin_expectations: &[PinTransaction],
        serial_expectations: &[SerialTransaction<u8>],
    ) -> MockController {
        let serial = SerialMock::new(serial_expectations);
        let reset_pin = PinMock::new(pin_expectations);
        let delay_impl = NoopDelay;
        let controller = HciController::new(reset_pin.clone(), serial.clone(), delay_impl);
        MockController(controller, serial, reset_pin)
    }

    /// The reset pulse done by `BtStack::enable()`.
    pub fn reset_pulse() -> [PinTransaction; 2] {
        [
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]
    }

    /// The HCI traffic of `BtStack::enable()` for a controller with the given
    /// public address (little-endian).
    ///
    /// No `HCI_LE_Set_Random_Address` is expected.
    pub fn enable_expects(bd_addr: [u8; 6]) -> Vec<SerialTransaction<u8>> {
        let mut read_bd_addr = vec![0x04, 0x0E, 0x0A, 0x01, 0x09, 0x10, 0x00];
        read_bd_addr.extend(bd_addr);
        hci_test_expects![
            // HCI_Reset
            (
                vec![0x01, 0x03, 0x0C, 0x00],
                vec![0x04, 0x0E, 0x04, 0x01, 0x03, 0x0C, 0x00],
            ),
            // HCI_Read_BD_ADDR
            (vec![0x01, 0x09, 0x10, 0x00], read_bd_addr),
            // HCI_LE_Set_Event_Mask
            (
                vec![0x01, 0x01, 0x20, 0x08, 0x1F, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00],
                vec![0x04, 0x0E, 0x04, 0x01, 0x01, 0x20, 0x00],
            ),
        ]
        .into_iter()
        .collect()
    }

    /// The address used by [`enable_expects()`] in tests of advertising sets.
    pub const TEST_ADDRESS: [u8; 6] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];

    /// The HCI traffic of creating advertising set 0 with the default parameters
    /// for a public identity.
    pub fn create_adv_set_expects() -> [SerialTransaction<u8>; 3] {
        hci_test_expects![(
            vec![
                0x01, 0x36, 0x20, 0x19, // HCI_LE_Set_Extended_Advertising_Parameters
                0x00, // handle
                0x00, 0x00, // properties
                0xA0, 0x00, 0x00, 0xF0, 0x00, 0x00, // intervals
                0x07, 0x00, // channel map, own address type
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // peer
                0x7F, 0x01, 0x00, 0x01, // tx power, PHYs
                0x00, 0x00, // sid, scan request notifications
            ],
            vec![0x04, 0x0E, 0x05, 0x01, 0x36, 0x20, 0x00, 0xF8],
        ),]
    }
}

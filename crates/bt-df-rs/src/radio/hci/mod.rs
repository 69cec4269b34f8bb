use core::fmt::{Debug, Display, Formatter};
#[cfg(feature = "std")]
extern crate std;

use embedded_hal::{delay::DelayNs, digital::OutputPin};
use embedded_hal_nb::{
    nb::block,
    serial::{Read, Write},
};
use heapless::Deque;

mod bit_fields;
mod constants;
mod cte;
mod ext_adv;
mod init;
mod per_adv;
mod receive;
use bit_fields::AdvSetFlags;
pub use constants::{commands, events};
use constants::{indicators, mnemonics};

use super::prelude::ErrorCode;
use crate::types::{AdvSet, LeAddress, SentInfo};

/// The number of advertising sets the controller is asked to handle.
pub(crate) const MAX_ADV_SETS: usize = 1;

/// How many "advertising set terminated" events are kept until polled.
/// The oldest one is dropped when more arrive.
const MAX_PENDING_SENT: usize = 4;

/// Largest H4 packet: indicator + opcode + length + 255 parameter bytes.
const BUF_LEN: usize = 259;

/// Offset of command parameters in [`HciController`]'s buffer.
const PARAMS: usize = 4;

const EIO: i32 = 5;
const EAGAIN: i32 = 11;
const ENOMEM: i32 = 12;
const ENODEV: i32 = 19;
const EINVAL: i32 = 22;
const EPROTO: i32 = 71;

/// An collection of error types to describe failures of the HCI controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HciError<SER, DO> {
    /// Represents a serial (UART) transport error.
    Serial(SER),
    /// Represents a DigitalOutput (reset pin) error.
    Gpo(DO),
    /// The controller rejected a command with the given (non-zero) HCI status.
    Status(u8),
    /// Represents a corruption of binary data (as it was received over the UART).
    BinaryCorruption,
    /// The controller kept sending events that did not answer the pending command.
    UnexpectedEvent,
    /// A parameter is out of range, or the advertising set is in the wrong state.
    InvalidParam,
    /// The stack was not enabled.
    NotReady,
    /// All advertising sets are already in use.
    NoAdvSet,
    /// The controller has no public address and no static address was configured.
    ///
    /// See [`HciController::with_static_address()`].
    NoIdentity,
}

impl<SER, DO> ErrorCode for HciError<SER, DO> {
    /// Controller statuses are reported as-is (positive);
    /// everything else is a negative errno value.
    fn code(&self) -> i32 {
        match self {
            HciError::Status(status) => *status as i32,
            HciError::Serial(_) | HciError::Gpo(_) | HciError::UnexpectedEvent => -EIO,
            HciError::BinaryCorruption => -EPROTO,
            HciError::InvalidParam => -EINVAL,
            HciError::NotReady => -EAGAIN,
            HciError::NoAdvSet => -ENOMEM,
            HciError::NoIdentity => -ENODEV,
        }
    }
}

impl<SER: Debug, DO: Debug> Display for HciError<SER, DO> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            HciError::Serial(e) => write!(f, "serial error: {e:?}"),
            HciError::Gpo(e) => write!(f, "reset pin error: {e:?}"),
            HciError::Status(status) => write!(f, "controller status 0x{status:02X}"),
            HciError::BinaryCorruption => write!(f, "malformed HCI packet"),
            HciError::UnexpectedEvent => write!(f, "no response to HCI command"),
            HciError::InvalidParam => write!(f, "invalid parameter"),
            HciError::NotReady => write!(f, "stack not enabled"),
            HciError::NoAdvSet => write!(f, "no free advertising set"),
            HciError::NoIdentity => write!(f, "no identity address"),
        }
    }
}

#[cfg(feature = "std")]
impl<SER: Debug, DO: Debug> std::error::Error for HciError<SER, DO> {}

#[cfg(feature = "defmt")]
impl<SER, DO> defmt::Format for HciError<SER, DO> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            HciError::Serial(_) => defmt::write!(fmt, "serial error"),
            HciError::Gpo(_) => defmt::write!(fmt, "reset pin error"),
            HciError::Status(status) => defmt::write!(fmt, "controller status {=u8:#04X}", *status),
            HciError::BinaryCorruption => defmt::write!(fmt, "malformed HCI packet"),
            HciError::UnexpectedEvent => defmt::write!(fmt, "no response to HCI command"),
            HciError::InvalidParam => defmt::write!(fmt, "invalid parameter"),
            HciError::NotReady => defmt::write!(fmt, "stack not enabled"),
            HciError::NoAdvSet => defmt::write!(fmt, "no free advertising set"),
            HciError::NoIdentity => defmt::write!(fmt, "no identity address"),
        }
    }
}

/// This struct implements the [traits of the `prelude`](mod@crate::radio::prelude)
/// for a Bluetooth LE controller that is attached over an HCI UART (H4) transport.
///
/// The controller must support extended advertising, periodic advertising and
/// connectionless CTE transmission (Bluetooth 5.1).
pub struct HciController<SER, DO, DELAY> {
    /// The (active low) reset pin of the controller.
    ///
    /// It is pulsed by [`BtStack::enable()`](fn@crate::radio::prelude::BtStack::enable).
    pub reset_pin: DO,
    /// The time (in milliseconds) the controller needs to boot after a reset.
    pub boot_delay_ms: u32,
    _serial: SER,
    _delay_impl: DELAY,
    _buf: [u8; BUF_LEN],
    _static_address: Option<[u8; 6]>,
    _identity: Option<LeAddress>,
    _sets: [AdvSetFlags; MAX_ADV_SETS],
    _pending_sent: Deque<(AdvSet, SentInfo), MAX_PENDING_SENT>,
}

impl<SER, DO, DELAY> HciController<SER, DO, DELAY>
where
    SER: Read<u8> + Write<u8>,
    DO: OutputPin,
    DELAY: DelayNs,
{
    /// Instantiate an [`HciController`] object that talks to the controller
    /// over the given `serial` port and resets it with the given `reset_pin`.
    pub fn new(reset_pin: DO, serial: SER, delay_impl: DELAY) -> HciController<SER, DO, DELAY> {
        HciController {
            reset_pin,
            boot_delay_ms: 100,
            _serial: serial,
            _delay_impl: delay_impl,
            _buf: [0u8; BUF_LEN],
            _static_address: None,
            _identity: None,
            _sets: [AdvSetFlags::new(); MAX_ADV_SETS],
            _pending_sent: Deque::new(),
        }
    }

    /// Use the given `address` (most significant byte first) as a random static
    /// identity address if the controller has no public address.
    ///
    /// The two most significant bits are set as required for static addresses.
    pub fn with_static_address(mut self, address: [u8; 6]) -> Self {
        let mut le = address;
        le.reverse();
        le[5] |= 0xC0;
        self._static_address = Some(le);
        self
    }

    /// Write the H4 header for the given `opcode` and send the command with the
    /// `param_len` parameters that were already stored in `self._buf[PARAMS..]`.
    fn send_command(
        &mut self,
        opcode: u16,
        param_len: usize,
    ) -> Result<(), HciError<SER::Error, DO::Error>> {
        self._buf[0] = indicators::COMMAND;
        self._buf[1..3].copy_from_slice(&opcode.to_le_bytes());
        self._buf[3] = param_len as u8;
        for byte in &self._buf[..PARAMS + param_len] {
            block!(self._serial.write(*byte)).map_err(HciError::Serial)?;
        }
        block!(self._serial.flush()).map_err(HciError::Serial)
    }

    /// Send a command and wait for its completion.
    ///
    /// On success, the event parameters are stored at the start of `self._buf`
    /// and their length is returned. For a "Command Complete" event, the
    /// return parameters (after the status) begin at `self._buf[4]`.
    fn command(
        &mut self,
        opcode: u16,
        param_len: usize,
    ) -> Result<usize, HciError<SER::Error, DO::Error>> {
        trace!("HCI command {}", opcode);
        self.send_command(opcode, param_len)?;
        self.wait_for_command(opcode)
    }

    /// Look up the configuration progress of the given `adv` set.
    fn flags(&self, adv: &AdvSet) -> Result<AdvSetFlags, HciError<SER::Error, DO::Error>> {
        if self._identity.is_none() {
            return Err(HciError::NotReady);
        }
        match self._sets.get(adv.index() as usize) {
            Some(flags) if flags.created() => Ok(*flags),
            _ => Err(HciError::InvalidParam),
        }
    }

    fn set_flags(&mut self, adv: &AdvSet, flags: AdvSetFlags) {
        self._sets[adv.index() as usize] = flags;
    }

    /// Is the given `adv` set currently sending extended advertisements?
    pub fn is_ext_advertising(&self, adv: &AdvSet) -> bool {
        self.flags(adv).is_ok_and(|flags| flags.ext_started())
    }

    /// Is the given `adv` set currently sending periodic advertisements?
    pub fn is_per_advertising(&self, adv: &AdvSet) -> bool {
        self.flags(adv).is_ok_and(|flags| flags.per_started())
    }

    /// Is CTE transmission enabled for the given `adv` set?
    pub fn is_cte_enabled(&self, adv: &AdvSet) -> bool {
        self.flags(adv).is_ok_and(|flags| flags.cte_enabled())
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use super::{commands, HciError, PARAMS};
    use crate::{hci_test_expects, radio::prelude::ErrorCode, test::mk_controller};
    use embedded_hal_mock::eh1::serial::Transaction as SerialTransaction;
    use std::{format, vec};

    #[test]
    fn error_codes() {
        type Error = HciError<(), ()>;
        assert_eq!(Error::Status(0x12).code(), 0x12);
        assert_eq!(Error::Serial(()).code(), -5);
        assert_eq!(Error::Gpo(()).code(), -5);
        assert_eq!(Error::InvalidParam.code(), -22);
        assert_eq!(Error::NotReady.code(), -11);
        assert_eq!(Error::NoAdvSet.code(), -12);
        assert_eq!(Error::NoIdentity.code(), -19);
        assert_eq!(Error::BinaryCorruption.code(), -71);
        assert_eq!(format!("{}", Error::Status(0x0C)), "controller status 0x0C");
    }

    #[test]
    fn static_address() {
        let mocks = mk_controller(&[], &[]);
        let (controller, mut serial, mut reset_pin) = (mocks.0, mocks.1, mocks.2);
        let controller = controller.with_static_address([0x01, 0x22, 0x33, 0x44, 0x55, 0x66]);
        assert_eq!(
            controller._static_address,
            Some([0x66, 0x55, 0x44, 0x33, 0x22, 0xC1])
        );
        serial.done();
        reset_pin.done();
    }

    #[test]
    fn command_status_event() {
        let expectations = hci_test_expects![(
            vec![0x01, 0x03, 0x0C, 0x00],
            vec![0x04, 0x0F, 0x04, 0x00, 0x01, 0x03, 0x0C],
        ),];
        let mocks = mk_controller(&[], &expectations);
        let (mut controller, mut serial, mut reset_pin) = (mocks.0, mocks.1, mocks.2);
        assert_eq!(controller.command(commands::RESET, 0), Ok(4));
        serial.done();
        reset_pin.done();
    }

    #[test]
    fn command_rejected() {
        let expectations = hci_test_expects![(
            vec![0x01, 0x03, 0x0C, 0x00],
            vec![0x04, 0x0E, 0x04, 0x01, 0x03, 0x0C, 0x0C],
        ),];
        let mocks = mk_controller(&[], &expectations);
        let (mut controller, mut serial, mut reset_pin) = (mocks.0, mocks.1, mocks.2);
        assert_eq!(
            controller.command(commands::RESET, 0),
            Err(HciError::Status(0x0C))
        );
        serial.done();
        reset_pin.done();
    }

    #[test]
    fn skip_unrelated_events() {
        let mut expectations = vec![
            SerialTransaction::write_many([0x01, 0x03, 0x0C, 0x00]),
            SerialTransaction::flush(),
        ];
        // a "Command Complete" for another opcode, then a vendor event
        expectations.push(SerialTransaction::read_many([
            0x04, 0x0E, 0x04, 0x01, 0x09, 0x10, 0x00,
        ]));
        expectations.push(SerialTransaction::read_many([0x04, 0xFF, 0x02, 0xAA, 0xBB]));
        expectations.push(SerialTransaction::read_many([
            0x04, 0x0E, 0x04, 0x01, 0x03, 0x0C, 0x00,
        ]));
        let mocks = mk_controller(&[], &expectations);
        let (mut controller, mut serial, mut reset_pin) = (mocks.0, mocks.1, mocks.2);
        assert_eq!(controller.command(commands::RESET, 0), Ok(4));
        serial.done();
        reset_pin.done();
    }

    #[test]
    fn corrupt_indicator() {
        let expectations = [
            SerialTransaction::write_many([0x01, 0x03, 0x0C, 0x00]),
            SerialTransaction::flush(),
            SerialTransaction::read(0x02),
        ];
        let mocks = mk_controller(&[], &expectations);
        let (mut controller, mut serial, mut reset_pin) = (mocks.0, mocks.1, mocks.2);
        assert_eq!(
            controller.command(commands::RESET, 0),
            Err(HciError::BinaryCorruption)
        );
        serial.done();
        reset_pin.done();
    }

    #[test]
    fn command_header() {
        let expectations = hci_test_expects![(
            vec![0x01, 0x52, 0x20, 0x02, 0x00, 0x01],
            vec![0x04, 0x0E, 0x04, 0x01, 0x52, 0x20, 0x00],
        ),];
        let mocks = mk_controller(&[], &expectations);
        let (mut controller, mut serial, mut reset_pin) = (mocks.0, mocks.1, mocks.2);
        controller._buf[PARAMS] = 0;
        controller._buf[PARAMS + 1] = 1;
        assert_eq!(controller.command(commands::LE_SET_CL_CTE_TX_ENABLE, 2), Ok(4));
        serial.done();
        reset_pin.done();
    }
}

use super::{
    bit_fields::AdvSetFlags, commands, mnemonics, HciController, HciError, MAX_ADV_SETS, PARAMS,
};
use crate::{radio::prelude::BtStack, types::LeAddress};
use embedded_hal::{delay::DelayNs, digital::OutputPin};
use embedded_hal_nb::serial::{Read, Write};

impl<SER, DO, DELAY> BtStack for HciController<SER, DO, DELAY>
where
    SER: Read<u8> + Write<u8>,
    DO: OutputPin,
    DELAY: DelayNs,
{
    type StackErrorType = HciError<SER::Error, DO::Error>;

    /// Reset the controller with [`HciController::reset_pin`] and
    /// resolve the identity address.
    ///
    /// The controller's public address is used if it has one.
    /// Otherwise, the address given to [`HciController::with_static_address()`]
    /// is assigned to the controller as a random static address.
    fn enable(&mut self) -> Result<(), Self::StackErrorType> {
        self._identity = None;
        self._pending_sent.clear();
        self._sets = [AdvSetFlags::new(); MAX_ADV_SETS];

        self.reset_pin.set_low().map_err(HciError::Gpo)?;
        self._delay_impl.delay_ms(10);
        self.reset_pin.set_high().map_err(HciError::Gpo)?;
        self._delay_impl.delay_ms(self.boot_delay_ms);

        self.command(commands::RESET, 0)?;

        let len = self.command(commands::READ_BD_ADDR, 0)?;
        if len < 10 {
            return Err(HciError::BinaryCorruption);
        }
        let mut address = [0u8; 6];
        address.copy_from_slice(&self._buf[4..10]);
        let public = LeAddress::public(address);

        self._buf[PARAMS..PARAMS + 8].copy_from_slice(&mnemonics::LE_EVENT_MASK.to_le_bytes());
        self.command(commands::LE_SET_EVENT_MASK, 8)?;

        let identity = if !public.is_unassigned() {
            public
        } else if let Some(address) = self._static_address {
            self._buf[PARAMS..PARAMS + 6].copy_from_slice(&address);
            self.command(commands::LE_SET_RANDOM_ADDRESS, 6)?;
            LeAddress::random(address)
        } else {
            return Err(HciError::NoIdentity);
        };
        debug!("Identity address is {}", identity);
        self._identity = Some(identity);
        Ok(())
    }

    fn identity(&self) -> Option<LeAddress> {
        self._identity
    }
}

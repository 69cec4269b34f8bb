use super::{commands, mnemonics, HciController, HciError, PARAMS};
use crate::{
    radio::prelude::LePerAdv,
    types::{AdvSet, PerAdvParams},
};
use embedded_hal::{delay::DelayNs, digital::OutputPin};
use embedded_hal_nb::serial::{Read, Write};

impl<SER, DO, DELAY> LePerAdv for HciController<SER, DO, DELAY>
where
    SER: Read<u8> + Write<u8>,
    DO: OutputPin,
    DELAY: DelayNs,
{
    fn set_per_adv_params(
        &mut self,
        adv: &AdvSet,
        params: &PerAdvParams,
    ) -> Result<(), Self::StackErrorType> {
        let flags = self.flags(adv)?;
        if params.interval_min < mnemonics::PER_ADV_INTERVAL_MIN
            || params.interval_min > params.interval_max
        {
            return Err(HciError::InvalidParam);
        }
        let properties = if params.include_tx_power {
            mnemonics::PROP_INCLUDE_TX_POWER
        } else {
            0
        };
        self._buf[PARAMS] = adv.index();
        self._buf[PARAMS + 1..PARAMS + 3].copy_from_slice(&params.interval_min.to_le_bytes());
        self._buf[PARAMS + 3..PARAMS + 5].copy_from_slice(&params.interval_max.to_le_bytes());
        self._buf[PARAMS + 5..PARAMS + 7].copy_from_slice(&properties.to_le_bytes());
        self.command(commands::LE_SET_PER_ADV_PARAMS, 7)?;
        self.set_flags(adv, flags.with_per_params_set(true));
        Ok(())
    }

    fn start_per_adv(&mut self, adv: &AdvSet) -> Result<(), Self::StackErrorType> {
        let flags = self.flags(adv)?;
        if !flags.per_params_set() {
            return Err(HciError::InvalidParam);
        }
        self._buf[PARAMS] = 1;
        self._buf[PARAMS + 1] = adv.index();
        self.command(commands::LE_SET_PER_ADV_ENABLE, 2)?;
        self.set_flags(adv, flags.with_per_started(true));
        Ok(())
    }
}

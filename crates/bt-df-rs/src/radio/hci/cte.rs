use super::{commands, mnemonics, HciController, HciError, PARAMS};
use crate::{
    radio::prelude::DfCteTx,
    types::{AdvSet, CteTxParams},
};
use embedded_hal::{delay::DelayNs, digital::OutputPin};
use embedded_hal_nb::serial::{Read, Write};

impl<SER, DO, DELAY> DfCteTx for HciController<SER, DO, DELAY>
where
    SER: Read<u8> + Write<u8>,
    DO: OutputPin,
    DELAY: DelayNs,
{
    /// The antenna switch pattern is only sent for AoD.
    /// For AoA, `params.ant_ids` is ignored.
    fn set_cte_tx_params(
        &mut self,
        adv: &AdvSet,
        params: &CteTxParams<'_>,
    ) -> Result<(), Self::StackErrorType> {
        let flags = self.flags(adv)?;
        let num_ant_ids = if params.cte_type.is_aod() {
            params.num_ant_ids()
        } else {
            0
        };
        if !(mnemonics::CTE_LEN_MIN..=mnemonics::CTE_LEN_MAX).contains(&params.cte_len)
            || !(mnemonics::CTE_COUNT_MIN..=mnemonics::CTE_COUNT_MAX).contains(&params.cte_count)
            || (params.cte_type.is_aod()
                && !(mnemonics::ANT_IDS_MIN..=mnemonics::ANT_IDS_MAX).contains(&num_ant_ids))
        {
            return Err(HciError::InvalidParam);
        }
        self._buf[PARAMS] = adv.index();
        self._buf[PARAMS + 1] = params.cte_len;
        self._buf[PARAMS + 2] = params.cte_type.into_bits();
        self._buf[PARAMS + 3] = params.cte_count;
        self._buf[PARAMS + 4] = num_ant_ids as u8;
        self._buf[PARAMS + 5..PARAMS + 5 + num_ant_ids]
            .copy_from_slice(&params.ant_ids[..num_ant_ids]);
        self.command(commands::LE_SET_CL_CTE_TX_PARAMS, 5 + num_ant_ids)?;
        self.set_flags(adv, flags.with_cte_params_set(true));
        Ok(())
    }

    fn enable_cte_tx(&mut self, adv: &AdvSet) -> Result<(), Self::StackErrorType> {
        let flags = self.flags(adv)?;
        if !flags.cte_ready() {
            return Err(HciError::InvalidParam);
        }
        self._buf[PARAMS] = adv.index();
        self._buf[PARAMS + 1] = 1;
        self.command(commands::LE_SET_CL_CTE_TX_ENABLE, 2)?;
        self.set_flags(adv, flags.with_cte_enabled(true));
        Ok(())
    }
}

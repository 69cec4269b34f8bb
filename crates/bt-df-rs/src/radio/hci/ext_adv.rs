use super::{commands, mnemonics, HciController, HciError, MAX_ADV_SETS, PARAMS};
use crate::{
    radio::prelude::LeExtAdv,
    types::{AddressType, AdvParams, AdvSet, ExtAdvStartParams, LeOob, SentInfo},
};
use embedded_hal::{delay::DelayNs, digital::OutputPin};
use embedded_hal_nb::serial::{Read, Write};

impl<SER, DO, DELAY> LeExtAdv for HciController<SER, DO, DELAY>
where
    SER: Read<u8> + Write<u8>,
    DO: OutputPin,
    DELAY: DelayNs,
{
    /// Only non-connectable, non-scannable extended advertising with the
    /// identity address is supported. Other `params.options` are rejected with
    /// [`HciError::InvalidParam`].
    fn create_adv_set(&mut self, params: &AdvParams) -> Result<AdvSet, Self::StackErrorType> {
        let identity = self._identity.ok_or(HciError::NotReady)?;
        if !params.options.ext_adv()
            || !params.options.use_identity()
            || params.sid > mnemonics::MAX_SID
            || params.interval_min < mnemonics::ADV_INTERVAL_MIN
            || params.interval_max > mnemonics::ADV_INTERVAL_MAX
            || params.interval_min > params.interval_max
        {
            return Err(HciError::InvalidParam);
        }
        let handle = self
            ._sets
            .iter()
            .position(|flags| !flags.created())
            .ok_or(HciError::NoAdvSet)?;
        let adv = AdvSet::new(handle as u8);

        let properties = if params.options.use_tx_power() {
            mnemonics::PROP_INCLUDE_TX_POWER
        } else {
            0
        };
        let buf = &mut self._buf[PARAMS..PARAMS + 25];
        buf[0] = adv.index();
        buf[1..3].copy_from_slice(&properties.to_le_bytes());
        buf[3..6].copy_from_slice(&params.interval_min.to_le_bytes()[..3]);
        buf[6..9].copy_from_slice(&params.interval_max.to_le_bytes()[..3]);
        buf[9] = mnemonics::CHANNEL_MAP_ALL;
        buf[10] = identity.address_type.into_bits();
        // peer address type, peer address, filter policy
        buf[11..19].fill(0);
        buf[19] = mnemonics::TX_POWER_NO_PREF;
        buf[20] = mnemonics::PHY_1M;
        buf[21] = 0;
        buf[22] = mnemonics::PHY_1M;
        buf[23] = params.sid;
        buf[24] = 0;
        let len = self.command(commands::LE_SET_EXT_ADV_PARAMS, 25)?;
        if len >= 5 {
            debug!("{} selected TX power {} dBm", adv, self._buf[4] as i8);
        }

        if identity.address_type == AddressType::Random {
            self._buf[PARAMS] = adv.index();
            self._buf[PARAMS + 1..PARAMS + 7].copy_from_slice(&identity.address);
            self.command(commands::LE_SET_ADV_SET_RANDOM_ADDRESS, 7)?;
        }

        self._sets[handle] = self._sets[handle].with_created(true);
        Ok(adv)
    }

    fn set_adv_data(&mut self, adv: &AdvSet, data: &[u8]) -> Result<(), Self::StackErrorType> {
        let flags = self.flags(adv)?;
        let len = data.len();
        if len > mnemonics::MAX_ADV_DATA_LEN {
            return Err(HciError::InvalidParam);
        }
        self._buf[PARAMS] = adv.index();
        self._buf[PARAMS + 1] = mnemonics::OP_COMPLETE;
        self._buf[PARAMS + 2] = mnemonics::FRAG_NONE;
        self._buf[PARAMS + 3] = len as u8;
        self._buf[PARAMS + 4..PARAMS + 4 + len].copy_from_slice(data);
        self.command(commands::LE_SET_EXT_ADV_DATA, 4 + len)?;
        self.set_flags(adv, flags.with_data_set(true));
        Ok(())
    }

    fn start_ext_adv(
        &mut self,
        adv: &AdvSet,
        params: &ExtAdvStartParams,
    ) -> Result<(), Self::StackErrorType> {
        let flags = self.flags(adv)?;
        self._buf[PARAMS] = 1; // enable
        self._buf[PARAMS + 1] = 1; // number of sets
        self._buf[PARAMS + 2] = adv.index();
        self._buf[PARAMS + 3..PARAMS + 5].copy_from_slice(&params.timeout.to_le_bytes());
        self._buf[PARAMS + 5] = params.num_events;
        self.command(commands::LE_SET_EXT_ADV_ENABLE, 6)?;
        self.set_flags(adv, flags.with_ext_started(true));
        Ok(())
    }

    /// The advertising set uses the identity address, so no HCI traffic is needed.
    fn oob_get_local(&mut self, adv: &AdvSet) -> Result<LeOob, Self::StackErrorType> {
        self.flags(adv)?;
        let addr = self._identity.ok_or(HciError::NotReady)?;
        Ok(LeOob { addr })
    }

    fn poll_sent(&mut self) -> Result<Option<(AdvSet, SentInfo)>, Self::StackErrorType> {
        if self._identity.is_none() {
            return Err(HciError::NotReady);
        }
        self.try_read_sent()
    }
}

impl<SER, DO, DELAY> HciController<SER, DO, DELAY> {
    /// The number of advertising sets that are not created yet.
    pub fn free_adv_sets(&self) -> usize {
        MAX_ADV_SETS - self._sets.iter().filter(|flags| flags.created()).count()
    }
}

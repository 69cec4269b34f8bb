use core::fmt::{Display, Formatter};
#[cfg(feature = "std")]
extern crate std;

use bt_df::{
    radio::prelude::{DfAdvertiser, ErrorCode},
    AdvSet, LeAddress, SentInfo,
};

use crate::{
    config::BeaconConfig,
    eddystone::{prelude::AsBuffer, AdvertisingData},
};

/// The steps of [`bring_up()`], in the order they are done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUpStep {
    /// Enable the Bluetooth stack.
    Enable,
    /// Create the advertising set.
    CreateAdvSet,
    /// Set the extended advertising data (the Eddystone frame).
    SetAdvData,
    /// Set the CTE transmit parameters.
    SetCteTxParams,
    /// Set the periodic advertising parameters.
    SetPerAdvParams,
    /// Enable CTE transmission.
    EnableCte,
    /// Start periodic advertising.
    StartPerAdv,
    /// Start extended advertising.
    StartExtAdv,
}

impl BringUpStep {
    pub const ALL: [BringUpStep; 8] = [
        BringUpStep::Enable,
        BringUpStep::CreateAdvSet,
        BringUpStep::SetAdvData,
        BringUpStep::SetCteTxParams,
        BringUpStep::SetPerAdvParams,
        BringUpStep::EnableCte,
        BringUpStep::StartPerAdv,
        BringUpStep::StartExtAdv,
    ];

    /// The description of the step used in log messages.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BringUpStep::Enable => "Bluetooth initialization",
            BringUpStep::CreateAdvSet => "Advertising set create",
            BringUpStep::SetAdvData => "Update extended advertising data (Eddystone frame)",
            BringUpStep::SetCteTxParams => "Update CTE params",
            BringUpStep::SetPerAdvParams => "Periodic advertising params set",
            BringUpStep::EnableCte => "Enable CTE",
            BringUpStep::StartPerAdv => "Periodic advertising enable",
            BringUpStep::StartExtAdv => "Extended advertising enable",
        }
    }
}

impl Display for BringUpStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BringUpStep {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.as_str())
    }
}

/// The error returned by [`bring_up()`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BringUpError<E> {
    /// The step that failed. No later step was attempted.
    pub step: BringUpStep,
    /// The radio stack's error.
    pub error: E,
}

impl<E: ErrorCode> BringUpError<E> {
    /// The integer status of the failure (see [`ErrorCode`]).
    pub fn code(&self) -> i32 {
        self.error.code()
    }
}

impl<E: ErrorCode> Display for BringUpError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}...failed (err {})", self.step, self.code())
    }
}

#[cfg(feature = "std")]
impl<E: ErrorCode + core::fmt::Debug> std::error::Error for BringUpError<E> {}

#[cfg(feature = "defmt")]
impl<E: ErrorCode> defmt::Format for BringUpError<E> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}...failed (err {=i32})", self.step, self.code())
    }
}

/// A trait to observe the "advertising set sent" events of a running [`Beacon`].
///
/// This is implemented for closures of the form `|index: u8, adv: &AdvSet, info: &SentInfo| {}`.
pub trait SentHandler {
    /// Called after the advertising set `adv` (of advertiser `index`)
    /// sent `info.num_sent` advertising events.
    fn sent(&mut self, index: u8, adv: &AdvSet, info: &SentInfo);
}

impl<F> SentHandler for F
where
    F: FnMut(u8, &AdvSet, &SentInfo),
{
    fn sent(&mut self, index: u8, adv: &AdvSet, info: &SentInfo) {
        self(index, adv, info)
    }
}

/// A [`SentHandler`] that only logs the events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSent;

impl SentHandler for LogSent {
    fn sent(&mut self, index: u8, adv: &AdvSet, info: &SentInfo) {
        info!("Advertiser[{}] {} sent {}", index, adv, info.num_sent);
    }
}

/// A beacon that was brought up with [`bring_up()`].
///
/// It is advertising, and keeps the radio stack borrowed to
/// dispatch events to its [`SentHandler`].
pub struct Beacon<'a, S, H> {
    stack: &'a mut S,
    adv: AdvSet,
    address: Option<LeAddress>,
    handler: H,
}

impl<S, H> Beacon<'_, S, H>
where
    S: DfAdvertiser,
    H: SentHandler,
{
    /// The advertising set of the beacon.
    pub fn adv_set(&self) -> &AdvSet {
        &self.adv
    }

    /// The address the beacon advertises with.
    ///
    /// This is [`None`] if the radio stack could not report it.
    pub fn address(&self) -> Option<LeAddress> {
        self.address
    }

    /// Pass all pending "advertising set sent" events to the [`SentHandler`].
    ///
    /// Returns the number of events handled.
    pub fn process_events(&mut self) -> Result<usize, S::StackErrorType> {
        let mut count = 0;
        while let Some((adv, info)) = self.stack.poll_sent()? {
            self.handler.sent(adv.index(), &adv, &info);
            count += 1;
        }
        Ok(count)
    }
}

/// Log the outcome of a bring-up `step`.
fn check<T, E: ErrorCode>(step: BringUpStep, result: Result<T, E>) -> Result<T, BringUpError<E>> {
    match result {
        Ok(value) => {
            info!("{}...success", step.as_str());
            Ok(value)
        }
        Err(error) => {
            error!("{}...failed (err {})", step.as_str(), error.code());
            Err(BringUpError { step, error })
        }
    }
}

/// Configure the `stack` as described by the `config` and start advertising.
///
/// The steps listed in [`BringUpStep::ALL`] are done in order. The first
/// step that fails ends the bring-up; nothing is undone or retried.
///
/// The `handler` only observes events after extended advertising has started,
/// through [`Beacon::process_events()`].
pub fn bring_up<'a, S, H>(
    stack: &'a mut S,
    config: &BeaconConfig,
    handler: H,
) -> Result<Beacon<'a, S, H>, BringUpError<S::StackErrorType>>
where
    S: DfAdvertiser,
    H: SentHandler,
{
    check(BringUpStep::Enable, stack.enable())?;

    let adv = check(
        BringUpStep::CreateAdvSet,
        stack.create_adv_set(config.adv_params()),
    )?;

    let ad = AdvertisingData::new(&config.eddystone(stack.identity()));
    check(
        BringUpStep::SetAdvData,
        stack.set_adv_data(&adv, ad.buffer()),
    )?;

    check(
        BringUpStep::SetCteTxParams,
        stack.set_cte_tx_params(&adv, &config.cte_tx_params()),
    )?;

    check(
        BringUpStep::SetPerAdvParams,
        stack.set_per_adv_params(&adv, config.per_adv_params()),
    )?;

    check(BringUpStep::EnableCte, stack.enable_cte_tx(&adv))?;

    check(BringUpStep::StartPerAdv, stack.start_per_adv(&adv))?;

    check(
        BringUpStep::StartExtAdv,
        stack.start_ext_adv(&adv, config.ext_adv_start()),
    )?;

    let address = match stack.oob_get_local(&adv) {
        Ok(oob) => {
            info!("Started extended advertising as {}", oob.addr);
            Some(oob.addr)
        }
        Err(e) => {
            warn!("Failed to get the local address (err {})", e.code());
            None
        }
    };

    Ok(Beacon {
        stack,
        adv,
        address,
        handler,
    })
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::{bring_up, BringUpStep, LogSent};
    use crate::{
        config::{BeaconConfig, CteMode},
        eddystone::{EddystoneUidService, DEFAULT_NAMESPACE},
        test::{Call, MockError, MockStack},
    };
    use bt_df::{
        radio::{prelude::BtStack, HciController},
        AdvSet, CteType, LeAddress, SentInfo,
    };
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction},
        serial::{Mock as SerialMock, Transaction as SerialTransaction},
    };
    use embedded_hal_nb::nb;
    use std::{format, vec, vec::Vec};

    const CALL_ORDER: [Call; 9] = [
        Call::Enable,
        Call::CreateAdvSet,
        Call::SetAdvData,
        Call::SetCteTxParams,
        Call::SetPerAdvParams,
        Call::EnableCteTx,
        Call::StartPerAdv,
        Call::StartExtAdv,
        Call::OobGetLocal,
    ];

    #[test]
    fn step_names() {
        assert_eq!(
            format!("{}", BringUpStep::SetAdvData),
            "Update extended advertising data (Eddystone frame)"
        );
        assert_eq!(BringUpStep::ALL.len(), CALL_ORDER.len() - 1);
    }

    #[test]
    fn all_steps_succeed() {
        let mut stack = MockStack::default();
        let beacon = bring_up(&mut stack, &BeaconConfig::default(), LogSent).unwrap();
        assert_eq!(beacon.adv_set().index(), 0);
        assert_eq!(beacon.address(), Some(MockStack::IDENTITY));
        drop(beacon);
        assert_eq!(stack.calls, CALL_ORDER);
        assert!(stack.ext_started);
        assert!(stack.per_started);
    }

    #[test]
    fn failure_stops_bring_up() {
        for (k, step) in BringUpStep::ALL.iter().enumerate() {
            let mut stack = MockStack::failing_at(CALL_ORDER[k]);
            let result = bring_up(&mut stack, &BeaconConfig::default(), LogSent);
            let err = result.err().unwrap();
            assert_eq!(err.step, *step);
            assert_eq!(err.code(), -5);
            assert_eq!(err.error, MockError(-5));
            assert_eq!(stack.calls, CALL_ORDER[..=k]);
        }
    }

    #[test]
    fn failure_message() {
        let mut stack = MockStack::failing_at(Call::EnableCteTx);
        let err = bring_up(&mut stack, &BeaconConfig::default(), LogSent)
            .err()
            .unwrap();
        assert_eq!(format!("{err}"), "Enable CTE...failed (err -5)");
    }

    #[test]
    fn address_is_best_effort() {
        let mut stack = MockStack::failing_at(Call::OobGetLocal);
        let beacon = bring_up(&mut stack, &BeaconConfig::default(), LogSent).unwrap();
        assert_eq!(beacon.address(), None);
        drop(beacon);
        assert_eq!(stack.calls, CALL_ORDER);
    }

    #[cfg(feature = "log")]
    #[test]
    fn success_log() {
        use crate::test::logs::capture;
        use std::string::String;

        let mut stack = MockStack::default();
        let (started, lines) =
            capture(|| bring_up(&mut stack, &BeaconConfig::default(), LogSent).is_ok());
        assert!(started);
        let mut expected: Vec<String> = BringUpStep::ALL
            .iter()
            .map(|step| format!("[INFO] {step}...success"))
            .collect();
        expected.push("[INFO] Started extended advertising as 01:02:03:04:05:06 (public)".into());
        assert_eq!(lines, expected);
    }

    #[cfg(feature = "log")]
    #[test]
    fn failure_log() {
        use crate::test::logs::capture;

        for (k, step) in BringUpStep::ALL.iter().enumerate() {
            let mut stack = MockStack::failing_at(CALL_ORDER[k]);
            let (failed, lines) = capture(|| {
                bring_up(&mut stack, &BeaconConfig::default(), LogSent).is_err()
            });
            assert!(failed);
            // nothing is logged after the failed step
            assert_eq!(lines.len(), k + 1);
            for (line, done) in lines.iter().zip(&BringUpStep::ALL[..k]) {
                assert_eq!(*line, format!("[INFO] {done}...success"));
            }
            assert_eq!(lines[k], format!("[ERROR] {step}...failed (err -5)"));
        }
    }

    #[cfg(feature = "log")]
    #[test]
    fn address_failure_log() {
        use crate::test::logs::capture;
        use std::string::String;

        let mut stack = MockStack::failing_at(Call::OobGetLocal);
        let (started, lines) =
            capture(|| bring_up(&mut stack, &BeaconConfig::default(), LogSent).is_ok());
        assert!(started);
        assert_eq!(lines.len(), BringUpStep::ALL.len() + 1);
        assert_eq!(
            lines.last().map(String::as_str),
            Some("[WARN] Failed to get the local address (err -5)")
        );
        assert!(!lines.iter().any(|line| line.contains("Started extended advertising as")));
    }

    #[test]
    fn eddystone_data() {
        let mut stack = MockStack::default();
        bring_up(&mut stack, &BeaconConfig::default(), LogSent).unwrap();
        assert_eq!(stack.adv_data.len(), 31);
        let service = EddystoneUidService::from_ad(&stack.adv_data).unwrap();
        let frame = service.frame();
        assert_eq!(frame.len(), 20);
        assert_eq!(frame[0], 0x00);
        assert_eq!(frame[2..12], DEFAULT_NAMESPACE);
        assert_eq!(frame[12..18], MockStack::IDENTITY.to_be_bytes());
        assert_eq!(frame[18..], [0, 0]);
    }

    #[test]
    fn aod_pattern_length() {
        let mut stack = MockStack::default();
        let config = BeaconConfig::default().with_cte_mode(CteMode::aod());
        bring_up(&mut stack, &config, LogSent).unwrap();
        let (cte_type, num_ant_ids, ant_ids) = stack.cte_params.clone().unwrap();
        assert_eq!(cte_type, CteType::Aod2us);
        assert_eq!(num_ant_ids, ant_ids.len());
        assert_eq!(ant_ids, [0x2, 0x0, 0x5, 0x6, 0x1, 0x4, 0xC, 0x9, 0xE, 0xD, 0x8, 0xA]);
    }

    #[test]
    fn aoa_has_no_pattern() {
        let mut stack = MockStack::default();
        bring_up(&mut stack, &BeaconConfig::default(), LogSent).unwrap();
        let (cte_type, num_ant_ids, _) = stack.cte_params.clone().unwrap();
        assert_eq!(cte_type, CteType::Aoa);
        assert_eq!(num_ant_ids, 0);
    }

    #[test]
    fn sent_events_after_start() {
        let mut stack = MockStack::default();
        // events the stack reports as soon as it is asked
        stack.sent.extend([SentInfo { num_sent: 3 }, SentInfo { num_sent: 4 }]);
        let mut seen = Vec::new();
        let handler = |index: u8, adv: &AdvSet, info: &SentInfo| {
            seen.push((index, *adv, info.num_sent));
        };
        let mut beacon = bring_up(&mut stack, &BeaconConfig::default(), handler).unwrap();
        assert_eq!(beacon.process_events(), Ok(2));
        assert_eq!(beacon.process_events(), Ok(0));
        let adv = *beacon.adv_set();
        drop(beacon);
        assert_eq!(seen, vec![(0, adv, 3), (0, adv, 4)]);
        // the stack was only polled after extended advertising started
        let first_poll = stack.calls.iter().position(|c| *c == Call::PollSent).unwrap();
        let ext_start = stack.calls.iter().position(|c| *c == Call::StartExtAdv).unwrap();
        assert!(ext_start < first_poll);
    }

    #[test]
    fn no_sent_events_on_failure() {
        let mut stack = MockStack::failing_at(Call::StartExtAdv);
        stack.sent.extend([SentInfo { num_sent: 1 }]);
        let mut calls = 0;
        let handler = |_: u8, _: &AdvSet, _: &SentInfo| calls += 1;
        assert!(bring_up(&mut stack, &BeaconConfig::default(), handler).is_err());
        assert_eq!(calls, 0);
        assert!(!stack.calls.contains(&Call::PollSent));
    }

    #[test]
    fn instance_from_identity() {
        let mut stack = MockStack {
            identity: Some(LeAddress::random([0x66, 0x55, 0x44, 0x33, 0x22, 0xC1])),
            ..Default::default()
        };
        bring_up(&mut stack, &BeaconConfig::default(), LogSent).unwrap();
        let service = EddystoneUidService::from_ad(&stack.adv_data).unwrap();
        assert_eq!(service.instance(), [0xC1, 0x22, 0x33, 0x44, 0x55, 0x66]);
    }

    /// A command packet and the "Command Complete" event that answers it.
    fn exchange(command: &[u8]) -> [SerialTransaction<u8>; 3] {
        let event = [0x04, 0x0E, 0x04, 0x01, command[1], command[2], 0x00];
        [
            SerialTransaction::write_many(command),
            SerialTransaction::flush(),
            SerialTransaction::read_many(event),
        ]
    }

    #[test]
    fn hci_controller() {
        let identity = LeAddress::public([0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
        let config = BeaconConfig::default();
        let ad = crate::eddystone::AdvertisingData::new(&config.eddystone(Some(identity)));
        let mut set_adv_data = vec![0x01, 0x37, 0x20, 0x23, 0x00, 0x03, 0x01, 0x1F];
        set_adv_data.extend_from_slice(crate::eddystone::prelude::AsBuffer::buffer(&ad));

        let mut expectations = Vec::new();
        expectations.extend(exchange(&[0x01, 0x03, 0x0C, 0x00]));
        expectations.extend([
            SerialTransaction::write_many([0x01, 0x09, 0x10, 0x00]),
            SerialTransaction::flush(),
            SerialTransaction::read_many([
                0x04, 0x0E, 0x0A, 0x01, 0x09, 0x10, 0x00, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01,
            ]),
        ]);
        expectations.extend(exchange(&[
            0x01, 0x01, 0x20, 0x08, 0x1F, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]));
        expectations.extend(exchange(&[
            0x01, 0x36, 0x20, 0x19, 0x00, 0x00, 0x00, 0xA0, 0x00, 0x00, 0xF0, 0x00, 0x00, 0x07,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x7F, 0x01, 0x00, 0x01, 0x00,
            0x00,
        ]));
        expectations.extend(exchange(&set_adv_data));
        expectations.extend(exchange(&[0x01, 0x51, 0x20, 0x05, 0x00, 0x14, 0x00, 0x05, 0x00]));
        expectations.extend(exchange(&[
            0x01, 0x3E, 0x20, 0x07, 0x00, 0xA0, 0x00, 0xF0, 0x00, 0x40, 0x00,
        ]));
        expectations.extend(exchange(&[0x01, 0x52, 0x20, 0x02, 0x00, 0x01]));
        expectations.extend(exchange(&[0x01, 0x40, 0x20, 0x02, 0x01, 0x00]));
        expectations.extend(exchange(&[
            0x01, 0x39, 0x20, 0x06, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00,
        ]));
        expectations.push(SerialTransaction::read_error(nb::Error::WouldBlock));

        let pin_expectations = [
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ];
        let mut serial = SerialMock::new(&expectations);
        let mut reset_pin = PinMock::new(&pin_expectations);
        let mut controller = HciController::new(reset_pin.clone(), serial.clone(), NoopDelay);

        let mut beacon = bring_up(&mut controller, &config, LogSent).unwrap();
        assert_eq!(beacon.address(), Some(identity));
        assert_eq!(beacon.process_events(), Ok(0));
        let adv = *beacon.adv_set();
        drop(beacon);
        assert_eq!(controller.identity(), Some(identity));
        assert!(controller.is_ext_advertising(&adv));
        assert!(controller.is_per_advertising(&adv));
        assert!(controller.is_cte_enabled(&adv));
        serial.done();
        reset_pin.done();
    }
}

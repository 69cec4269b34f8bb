//! This module defines the generic traits that may
//! need to imported to use radio stack implementations.
//!
//! Since rustc only compiles objects that are used,
//! it is convenient to import these traits with the `*` syntax.
//!
//! ```
//! use bt_df::radio::prelude::*;
//! ```
//!
//! All traits extend [`BtStack`] and share its [`BtStack::StackErrorType`].

use crate::types::{
    AdvParams, AdvSet, CteTxParams, ExtAdvStartParams, LeAddress, LeOob, PerAdvParams, SentInfo,
};

/// A trait to map a stack error to the integer status reported in logs.
///
/// `0` is never returned for an error.
pub trait ErrorCode {
    fn code(&self) -> i32;
}

/// A trait to represent the lifecycle of a Bluetooth LE stack.
pub trait BtStack {
    type StackErrorType: ErrorCode;

    /// Bring up the Bluetooth stack (and the radio underneath it).
    ///
    /// This must succeed before any other function of the stack is used.
    fn enable(&mut self) -> Result<(), Self::StackErrorType>;

    /// Get the identity address that was resolved by [`BtStack::enable()`].
    ///
    /// Returns [`None`] if the stack is not enabled.
    fn identity(&self) -> Option<LeAddress>;
}

/// A trait to represent the lifecycle of an extended advertising set.
pub trait LeExtAdv: BtStack {
    /// Create an advertising set with the given `params`.
    ///
    /// Events about the set (see [`LeExtAdv::poll_sent()`]) are only
    /// reported after the set was started with [`LeExtAdv::start_ext_adv()`].
    fn create_adv_set(&mut self, params: &AdvParams) -> Result<AdvSet, Self::StackErrorType>;

    /// Set the advertising data of the given `adv` set.
    ///
    /// The `data` is a sequence of AD structures (`[len, type, data...]`).
    fn set_adv_data(&mut self, adv: &AdvSet, data: &[u8]) -> Result<(), Self::StackErrorType>;

    /// Start extended advertising of the given `adv` set.
    fn start_ext_adv(
        &mut self,
        adv: &AdvSet,
        params: &ExtAdvStartParams,
    ) -> Result<(), Self::StackErrorType>;

    /// Get the local out-of-band information (the address) of the given `adv` set.
    fn oob_get_local(&mut self, adv: &AdvSet) -> Result<LeOob, Self::StackErrorType>;

    /// Fetch the next "advertising set sent" event, if any.
    ///
    /// This does not block; [`None`] is returned when no event is pending.
    fn poll_sent(&mut self) -> Result<Option<(AdvSet, SentInfo)>, Self::StackErrorType>;
}

/// A trait to represent periodic advertising on an advertising set.
pub trait LePerAdv: BtStack {
    /// Set the periodic advertising parameters of the given `adv` set.
    fn set_per_adv_params(
        &mut self,
        adv: &AdvSet,
        params: &PerAdvParams,
    ) -> Result<(), Self::StackErrorType>;

    /// Start periodic advertising of the given `adv` set.
    ///
    /// [`LePerAdv::set_per_adv_params()`] must be called first.
    fn start_per_adv(&mut self, adv: &AdvSet) -> Result<(), Self::StackErrorType>;
}

/// A trait to represent connectionless CTE transmission (direction finding).
pub trait DfCteTx: BtStack {
    /// Set the CTE transmit parameters of the given `adv` set.
    ///
    /// For AoD, the antenna switch pattern is taken from `params`.
    fn set_cte_tx_params(
        &mut self,
        adv: &AdvSet,
        params: &CteTxParams<'_>,
    ) -> Result<(), Self::StackErrorType>;

    /// Append CTEs to the periodic advertising PDUs of the given `adv` set.
    ///
    /// Both [`DfCteTx::set_cte_tx_params()`] and
    /// [`LePerAdv::set_per_adv_params()`] must be called first.
    fn enable_cte_tx(&mut self, adv: &AdvSet) -> Result<(), Self::StackErrorType>;
}

/// A stack that can run a direction-finding advertiser.
///
/// This is implemented for any type that implements all other traits of this module.
pub trait DfAdvertiser: BtStack + LeExtAdv + LePerAdv + DfCteTx {}

impl<T> DfAdvertiser for T where T: BtStack + LeExtAdv + LePerAdv + DfCteTx {}

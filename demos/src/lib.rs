//! A helper library for the demos. It keeps platform-specific details
//! out of the demo binaries.
#![no_std]
#[cfg(feature = "linux")]
pub mod linux;
pub mod locator;

use anyhow::{anyhow, Error};
use core::fmt::Debug;

/// Wrap an error that only implements [`Debug`] (like the radio stack's) for [`anyhow`].
pub fn debug_err(err: impl Debug) -> Error {
    anyhow!("{err:?}")
}

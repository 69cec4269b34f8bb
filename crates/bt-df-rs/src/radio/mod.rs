//! A module to encapsulate all things related to radio stack operation.
pub mod prelude;

mod hci;
pub use hci::{commands, events, HciController, HciError};

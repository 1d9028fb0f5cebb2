//! Bus message handling.

pub(crate) mod bus_handler;
pub mod translator;

pub use translator::translate;

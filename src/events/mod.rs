//! Discrete events for externally driven inputs
//!
//! Input injection does not *detect* events: every discrete event here
//! is a placeholder slot, scheduled to fire only at t = +inf, that the
//! injection primitive records against manually. The per-run record of
//! when a slot fired, and with which value, lives in an [`EventHistory`].

mod base;
mod history;

pub use base::{DiscreteEvent, EventId};
pub use history::EventHistory;

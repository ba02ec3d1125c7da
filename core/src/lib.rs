//! The core messaging contract.
//!
//! A pure, synchronous state machine: given its current state and a raw
//! attestation, [`contract::CoreBridge`] either applies a governance action
//! and reports it as an [`contract::Event`], or rejects with a
//! [`error::ContractError`] leaving every piece of state untouched. The
//! embedding runtime owns persistence, transport and time; each entry point
//! takes the current block time as a parameter.

pub mod contract;
pub mod error;
pub mod state;

pub use contract::{CoreBridge, Event};
pub use error::ContractError;
pub use state::Config;

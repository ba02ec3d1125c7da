//! The token bridge ("portal") contract.
//!
//! A second consumer of the guardian attestation layer: it binds itself to a
//! core messaging contract at boot and accepts token-bridge governance from
//! there on, registering foreign emitters and recording attested asset
//! metadata. Signature verification is delegated to the bound core instance;
//! everything else here is the portal's own gating and state.

pub mod contract;
pub mod state;

pub use causeway::ContractError;
pub use contract::{Portal, PortalEvent};
pub use state::{AssetRecord, PortalConfig};

use serde::{Deserialize, Serialize};

use causeway_vaa::Address;

/// Static portal configuration, fixed at construction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PortalConfig {
    /// Chain this portal instance lives on.
    pub chain_id: u16,

    /// Emitter trusted for token-bridge governance.
    pub gov_chain: u16,
    pub gov_address: Address,
}

/// Attested metadata for one foreign token, keyed by `(token_chain,
/// token_address)`. `sequence` is the record's own update clock: it moves
/// independently of the emitter-wide sequence so attestations for different
/// tokens may arrive in any global order, while updates to the same record
/// must be newer than what is stored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AssetRecord {
    pub decimals: u8,
    pub symbol: String,
    pub name: String,

    /// Attestation sequence this record was last written at.
    pub sequence: u64,
}

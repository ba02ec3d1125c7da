//! Wire-format primitives for guardian-attested messages.
//!
//! This crate provides the chain-agnostic types shared by guardians and
//! receiving contracts:
//!
//! - The attestation envelope and body with their canonical byte encoding.
//! - Digests used for signing and identifying attestations.
//! - Governance packets and their action payloads.
//!
//! Everything here is pure data; signing keys and contract state live in
//! their own crates.

use std::fmt;

use serde::{Deserialize, Serialize};

mod byte_utils;
pub mod error;
pub mod governance;
pub mod vaa;

pub use byte_utils::get_string_from_32;
pub use error::DecodeError;
pub use vaa::{digest, Body, Digest, Signature, Vaa};

/// A guardian is identified by the last 20 bytes of the Keccak256 hash of its
/// uncompressed secp256k1 public key, Ethereum style.
#[derive(
    Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct GuardianAddress(pub [u8; 20]);

/// Addresses are 32 bytes. Addresses that are shorter on their origin chain,
/// for example 20 byte Ethereum addresses, are left zero padded to 32.
#[derive(
    Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Address(pub [u8; 32]);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }

        Ok(())
    }
}

/// A versioned set of guardian keys. The position of a key within
/// `addresses` is the index its signatures carry on the wire.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GuardianSetInfo {
    pub addresses: Vec<GuardianAddress>,

    /// Unix seconds after which this set no longer verifies signatures.
    /// Zero means the set never expires; only the current set has zero.
    pub expiration_time: u64,
}

impl GuardianSetInfo {
    /// More than two thirds of the set must sign.
    pub fn quorum(&self) -> usize {
        (self.addresses.len() * 2) / 3 + 1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn quorum() {
        let tests = [
            (1, 1),
            (2, 2),
            (3, 3),
            (4, 3),
            (5, 4),
            (6, 5),
            (7, 5),
            (8, 6),
            (9, 7),
            (10, 7),
            (11, 8),
            (12, 9),
            (13, 9),
            (19, 13),
            (50, 34),
            (100, 67),
            (1000, 667),
        ];

        for (count, quorum) in tests {
            let gs = GuardianSetInfo {
                addresses: vec![Default::default(); count],
                expiration_time: 0,
            };

            assert_eq!(quorum, gs.quorum());
        }
    }

    #[test]
    fn address_display() {
        let mut addr = Address::default();
        addr.0[31] = 0x04;
        assert_eq!(
            addr.to_string(),
            "0000000000000000000000000000000000000000000000000000000000000004"
        );
    }

    #[test]
    fn guardian_set_serde() {
        let gs = GuardianSetInfo {
            addresses: vec![GuardianAddress([7u8; 20])],
            expiration_time: 1000,
        };

        let encoded = serde_json::to_string(&gs).unwrap();
        assert_eq!(gs, serde_json::from_str(&encoded).unwrap());
    }
}

//! The attestation envelope: a collection of guardian signatures over a
//! message body. Receiving contracts treat a verified envelope as proof that
//! the guardian network observed the event the body describes.

use sha3::{Digest as Sha3Digest, Keccak256};

use crate::byte_utils::Reader;
use crate::error::DecodeError;
use crate::Address;

/// Largest guardian set a signature index can address.
pub const MAX_GUARDIANS: usize = 255;

/// A guardian signature prefixed with the signer's position in the guardian
/// set. The 65 signature bytes are r (32) ‖ s (32) ‖ recovery id (1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature {
    pub index: u8,
    pub signature: [u8; 65],
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            index: 0,
            signature: [0; 65],
        }
    }
}

/// The signed-over portion of an envelope. The `(emitter_chain,
/// emitter_address, sequence)` triple is the replay-protection key.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Body {
    /// Seconds since UNIX epoch.
    pub timestamp: u32,
    pub nonce: u32,
    pub emitter_chain: u16,
    pub emitter_address: Address,
    pub sequence: u64,
    pub consistency_level: u8,
    pub payload: Vec<u8>,
}

/// A full envelope as submitted to receiving contracts.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vaa {
    pub guardian_set_index: u32,
    pub signatures: Vec<Signature>,
    pub body: Body,
}

/* Wire layout (big-endian):

header:
0           uint32  guardian set index
4           uint8   len signatures

per signature (length 66):
0           uint8   index of the signer (in guardian keys)
1   [65]uint8   signature

body:
0           uint32  timestamp (unix seconds)
4           uint32  nonce
8           uint16  emitter chain
10          uint8   emitter address length (must be 32)
11  [32]uint8   emitter address
43          uint64  sequence
51          uint8   consistency level
52          uint32  payload length
56    []uint8   payload */

impl Body {
    /// Canonical body encoding; the digest input shared by all chains.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(56 + self.payload.len());
        out.extend_from_slice(&self.timestamp.to_be_bytes());
        out.extend_from_slice(&self.nonce.to_be_bytes());
        out.extend_from_slice(&self.emitter_chain.to_be_bytes());
        out.push(self.emitter_address.0.len() as u8);
        out.extend_from_slice(&self.emitter_address.0);
        out.extend_from_slice(&self.sequence.to_be_bytes());
        out.push(self.consistency_level);
        out.extend_from_slice(&(self.payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn digest(&self) -> Digest {
        digest(&self.serialize())
    }

    fn read_from(reader: &mut Reader) -> Result<Self, DecodeError> {
        let timestamp = reader.get_u32()?;
        let nonce = reader.get_u32()?;
        let emitter_chain = reader.get_u16()?;
        if reader.get_u8()? as usize != 32 {
            return Err(DecodeError::InvalidAddressLength);
        }
        let emitter_address = Address(reader.get_const_bytes()?);
        let sequence = reader.get_u64()?;
        let consistency_level = reader.get_u8()?;
        let payload_len = reader.get_u32()? as usize;
        let payload = reader.take(payload_len)?.to_vec();

        Ok(Body {
            timestamp,
            nonce,
            emitter_chain,
            emitter_address,
            sequence,
            consistency_level,
            payload,
        })
    }
}

impl Vaa {
    pub fn serialize(&self) -> Vec<u8> {
        debug_assert!(self.signatures.len() <= MAX_GUARDIANS);

        let mut out = Vec::with_capacity(5 + self.signatures.len() * 66);
        out.extend_from_slice(&self.guardian_set_index.to_be_bytes());
        out.push(self.signatures.len() as u8);
        for sig in &self.signatures {
            out.push(sig.index);
            out.extend_from_slice(&sig.signature);
        }
        out.extend_from_slice(&self.body.serialize());
        out
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);

        let guardian_set_index = reader.get_u32()?;
        let len_signatures = reader.get_u8()? as usize;

        let mut signatures = Vec::with_capacity(len_signatures);
        for _ in 0..len_signatures {
            let index = reader.get_u8()?;
            let signature = reader.get_const_bytes()?;
            signatures.push(Signature { index, signature });
        }

        let body = Body::read_from(&mut reader)?;
        reader.finish()?;

        Ok(Vaa {
            guardian_set_index,
            signatures,
            body,
        })
    }
}

/// Digest data for a [`Body`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest {
    /// Keccak256 of the canonical body encoding; the identity of an
    /// attestation across all chains.
    pub hash: [u8; 32],

    /// Keccak256 of `hash`. Guardians sign the hash of the hash so that
    /// `ecrecover`-style verifiers, which expect a prehashed input, check
    /// exactly what was signed.
    pub secp256k_hash: [u8; 32],
}

/// Calculates the digest for `body` as used in all signing and verification.
pub fn digest(body: &[u8]) -> Digest {
    let hash: [u8; 32] = Keccak256::digest(body).into();
    let secp256k_hash: [u8; 32] = Keccak256::digest(hash).into();

    Digest {
        hash,
        secp256k_hash,
    }
}

//! Governance packets. A governance packet is the payload of an attestation
//! emitted by the governance emitter; it names the module it is addressed to,
//! an action code, and the chain it targets (0 for all chains).

use serde::{Deserialize, Serialize};

use crate::byte_utils::{string_to_array, Reader};
use crate::error::DecodeError;
use crate::{get_string_from_32, Address, GuardianAddress};

/// Module identifiers are ASCII names right-aligned in 32 zero-padded bytes.
pub const CORE_MODULE: [u8; 32] = module_id(b"Core");
pub const PORTAL_MODULE: [u8; 32] = module_id(b"TokenBridge");

const fn module_id(name: &[u8]) -> [u8; 32] {
    let mut id = [0u8; 32];
    let start = 32 - name.len();
    let mut i = 0;
    while i < name.len() {
        id[start + i] = name[i];
        i += 1;
    }
    id
}

/* Packet layout:

0   [32]uint8   module
32  uint8       action
33  uint16      target chain
35    []uint8   action payload */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernancePacket {
    pub module: [u8; 32],
    pub action: u8,
    pub target_chain: u16,
    pub payload: Vec<u8>,
}

impl GovernancePacket {
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(35 + self.payload.len());
        out.extend_from_slice(&self.module);
        out.push(self.action);
        out.extend_from_slice(&self.target_chain.to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let module = reader.get_const_bytes()?;
        let action = reader.get_u8()?;
        let target_chain = reader.get_u16()?;
        let payload = reader.rest().to_vec();

        Ok(GovernancePacket {
            module,
            action,
            target_chain,
            payload,
        })
    }
}

// Core module, action 2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardianSetUpgrade {
    pub new_guardian_set_index: u32,
    pub addresses: Vec<GuardianAddress>,
}

impl GuardianSetUpgrade {
    /* Payload format
    0   uint32 new_index
    4   uint8 len(keys)
    5   [][20]uint8 guardian addresses
    */

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(5 + self.addresses.len() * 20);
        out.extend_from_slice(&self.new_guardian_set_index.to_be_bytes());
        out.push(self.addresses.len() as u8);
        for addr in &self.addresses {
            out.extend_from_slice(&addr.0);
        }
        out
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let new_guardian_set_index = reader.get_u32()?;
        let len = reader.get_u8()? as usize;

        let mut addresses = Vec::with_capacity(len);
        for _ in 0..len {
            addresses.push(GuardianAddress(reader.get_const_bytes()?));
        }
        reader.finish()?;

        Ok(GuardianSetUpgrade {
            new_guardian_set_index,
            addresses,
        })
    }
}

// Core module, action 3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetFee {
    pub amount: u128,
}

impl SetFee {
    /* Payload format
    0   [32]uint8 amount (uint256, high 128 bits must be zero)
    */

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = vec![0u8; 16];
        out.extend_from_slice(&self.amount.to_be_bytes());
        out
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let (hi, amount) = reader.get_u256()?;
        reader.finish()?;

        if hi != 0 {
            return Err(DecodeError::AmountTooHigh);
        }
        Ok(SetFee { amount })
    }
}

// TokenBridge module, action 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterChain {
    pub chain_id: u16,
    pub chain_address: Address,
}

impl RegisterChain {
    /* Payload format
    0   uint16 emitter chain
    2   [32]uint8 emitter address
    */

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(34);
        out.extend_from_slice(&self.chain_id.to_be_bytes());
        out.extend_from_slice(&self.chain_address.0);
        out
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let chain_id = reader.get_u16()?;
        let chain_address = Address(reader.get_const_bytes()?);
        reader.finish()?;

        Ok(RegisterChain {
            chain_id,
            chain_address,
        })
    }
}

// TokenBridge module, action 2
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetMeta {
    /// Address of the token on its origin chain.
    pub token_address: Address,

    /// Origin chain of the token.
    pub token_chain: u16,

    /// Number of decimals the token has on its origin chain.
    pub decimals: u8,

    /// Ticker symbol, at most 32 bytes on the wire.
    pub symbol: String,

    /// Full token name, at most 32 bytes on the wire.
    pub name: String,
}

impl AssetMeta {
    /* Payload format
    0   [32]uint8 token address
    32  uint16 token chain
    34  uint8 decimals
    35  [32]uint8 symbol
    67  [32]uint8 name
    */

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(99);
        out.extend_from_slice(&self.token_address.0);
        out.extend_from_slice(&self.token_chain.to_be_bytes());
        out.push(self.decimals);
        out.extend_from_slice(&string_to_array::<32>(&self.symbol));
        out.extend_from_slice(&string_to_array::<32>(&self.name));
        out
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let token_address = Address(reader.get_const_bytes()?);
        let token_chain = reader.get_u16()?;
        let decimals = reader.get_u8()?;
        let symbol: [u8; 32] = reader.get_const_bytes()?;
        let name: [u8; 32] = reader.get_const_bytes()?;
        reader.finish()?;

        Ok(AssetMeta {
            token_address,
            token_chain,
            decimals,
            symbol: get_string_from_32(&symbol),
            name: get_string_from_32(&name),
        })
    }
}

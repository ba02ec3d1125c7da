//! Contract state: configuration, the guardian set registry, emitter
//! sequence tracking and the fee schedule. All of it serializes with serde so
//! the embedding runtime can persist it however it stores contract state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use causeway_vaa::{Address, GuardianSetInfo};

use crate::error::ContractError;

/// Static contract configuration, fixed at construction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Chain this contract instance lives on.
    pub chain_id: u16,

    /// Emitter trusted for governance actions.
    pub gov_chain: u16,
    pub gov_address: Address,

    /// Seconds a superseded guardian set keeps verifying signatures.
    pub guardian_set_grace: u64,
}

/// Append-only, versioned log of guardian sets. Installing a new set
/// supersedes the previous one without deleting it, so attestations signed
/// under the old set keep verifying until its grace period runs out.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct GuardianRegistry {
    sets: BTreeMap<u32, GuardianSetInfo>,
    current: u32,
}

impl GuardianRegistry {
    pub fn current_index(&self) -> u32 {
        self.current
    }

    pub fn current(&self) -> Option<&GuardianSetInfo> {
        self.sets.get(&self.current)
    }

    pub fn get(&self, index: u32) -> Option<&GuardianSetInfo> {
        self.sets.get(&index)
    }

    /// Seed the registry with set 0. Only the boot path calls this.
    pub(crate) fn init(&mut self, set: GuardianSetInfo) {
        self.sets.insert(0, set);
        self.current = 0;
    }

    /// Install the next guardian set. `new_index` must be exactly one past
    /// the current index; the superseded set is kept and stamped to expire
    /// at `retire_at`.
    pub(crate) fn install(
        &mut self,
        new_index: u32,
        set: GuardianSetInfo,
        retire_at: u64,
    ) -> Result<(), ContractError> {
        if new_index != self.current + 1 {
            return Err(ContractError::InvalidGovernanceSequence);
        }

        if let Some(old) = self.sets.get_mut(&self.current) {
            old.expiration_time = retire_at;
        }
        self.sets.insert(new_index, set);
        self.current = new_index;
        Ok(())
    }
}

/// Last accepted inbound sequence per emitter. A new attestation from an
/// emitter must carry a strictly greater sequence than the one recorded.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceTracker {
    last: BTreeMap<(u16, Address), u64>,
}

impl SequenceTracker {
    pub fn check(&self, chain: u16, address: Address, sequence: u64) -> Result<(), ContractError> {
        match self.last.get(&(chain, address)) {
            Some(&last) if sequence <= last => Err(ContractError::ReplayOrOutOfOrder),
            _ => Ok(()),
        }
    }

    pub fn record(&mut self, chain: u16, address: Address, sequence: u64) {
        self.last.insert((chain, address), sequence);
    }

    pub fn last(&self, chain: u16, address: Address) -> Option<u64> {
        self.last.get(&(chain, address)).copied()
    }
}

/// Per-chain message fees with a global default. A governance action
/// targeting chain 0 moves the default; targeting chain X moves only X's
/// override, never the default and never another chain's override.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FeeSchedule {
    default_fee: u128,
    overrides: BTreeMap<u16, u128>,
}

impl FeeSchedule {
    pub fn fee_for(&self, chain: u16) -> u128 {
        self.overrides
            .get(&chain)
            .copied()
            .unwrap_or(self.default_fee)
    }

    pub fn set_default(&mut self, amount: u128) {
        self.default_fee = amount;
    }

    pub fn set_chain(&mut self, chain: u16, amount: u128) {
        self.overrides.insert(chain, amount);
    }
}

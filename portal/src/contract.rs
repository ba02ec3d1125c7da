//! Dispatch of token-bridge governance attestations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use causeway::state::SequenceTracker;
use causeway::{ContractError, CoreBridge};
use causeway_vaa::governance::{AssetMeta, GovernancePacket, RegisterChain, PORTAL_MODULE};
use causeway_vaa::Address;

use crate::state::{AssetRecord, PortalConfig};

/// What an accepted portal submission did.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum PortalEvent {
    ChainRegistered {
        chain_id: u16,
        chain_address: Address,
    },
    AssetMetaApplied {
        token_chain: u16,
        token_address: Address,
        sequence: u64,
    },
}

/// The token bridge contract.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Portal {
    config: PortalConfig,
    booted: bool,

    /// Identity of the core messaging contract bound at boot.
    core: Address,

    /// Registered foreign token-bridge emitters, one per chain.
    registrations: BTreeMap<u16, Address>,

    /// Attested asset metadata.
    assets: BTreeMap<(u16, Address), AssetRecord>,

    sequences: SequenceTracker,
}

impl Portal {
    pub fn new(config: PortalConfig) -> Self {
        Portal {
            config,
            booted: false,
            core: Address::default(),
            registrations: BTreeMap::new(),
            assets: BTreeMap::new(),
            sequences: SequenceTracker::default(),
        }
    }

    /// One-time binding to the core messaging contract.
    pub fn boot(&mut self, core: Address) -> Result<(), ContractError> {
        if self.booted {
            return Err(ContractError::AlreadyBooted);
        }
        self.booted = true;
        self.core = core;
        Ok(())
    }

    /// Verifies a token-bridge governance attestation against the bound core
    /// contract and applies it. Either every gate passes and exactly one
    /// action is applied, or nothing changes.
    pub fn submit_vaa(
        &mut self,
        core: &CoreBridge,
        data: &[u8],
        now: u64,
    ) -> Result<PortalEvent, ContractError> {
        if !self.booted {
            return Err(ContractError::NotBooted);
        }

        let vaa = core.verify_vaa(data, now)?;

        if vaa.body.emitter_chain != self.config.gov_chain
            || vaa.body.emitter_address != self.config.gov_address
        {
            return Err(ContractError::InvalidGovernanceEmitter);
        }
        if vaa.guardian_set_index != core.guardian_set_index() {
            return Err(ContractError::StaleGovernanceSet);
        }

        let packet =
            GovernancePacket::deserialize(&vaa.body.payload).map_err(|_| ContractError::Malformed)?;
        if packet.module != PORTAL_MODULE {
            return Err(ContractError::InvalidGovernanceModule);
        }
        if packet.target_chain != 0 && packet.target_chain != self.config.chain_id {
            return Err(ContractError::WrongTargetChain);
        }

        match packet.action {
            1u8 => {
                self.sequences.check(
                    vaa.body.emitter_chain,
                    vaa.body.emitter_address,
                    vaa.body.sequence,
                )?;
                let event = self.handle_register_chain(&packet.payload)?;
                self.sequences.record(
                    vaa.body.emitter_chain,
                    vaa.body.emitter_address,
                    vaa.body.sequence,
                );
                Ok(event)
            }
            // Asset metadata reconciles against its own record, not the
            // emitter-wide sequence: attestations for different tokens may
            // arrive in any global order.
            2u8 => self.handle_asset_meta(vaa.body.sequence, &packet.payload),
            _ => Err(ContractError::InvalidGovernanceAction),
        }
    }

    fn handle_register_chain(&mut self, data: &[u8]) -> Result<PortalEvent, ContractError> {
        let RegisterChain {
            chain_id,
            chain_address,
        } = RegisterChain::deserialize(data).map_err(|_| ContractError::Malformed)?;

        if self.registrations.contains_key(&chain_id) {
            return Err(ContractError::AlreadyRegistered);
        }
        self.registrations.insert(chain_id, chain_address);

        Ok(PortalEvent::ChainRegistered {
            chain_id,
            chain_address,
        })
    }

    fn handle_asset_meta(
        &mut self,
        sequence: u64,
        data: &[u8],
    ) -> Result<PortalEvent, ContractError> {
        let meta = AssetMeta::deserialize(data).map_err(|_| ContractError::Malformed)?;

        let key = (meta.token_chain, meta.token_address);
        if let Some(existing) = self.assets.get(&key) {
            if sequence <= existing.sequence {
                return Err(ContractError::StaleUpdate);
            }
        }

        self.assets.insert(
            key,
            AssetRecord {
                decimals: meta.decimals,
                symbol: meta.symbol,
                name: meta.name,
                sequence,
            },
        );

        Ok(PortalEvent::AssetMetaApplied {
            token_chain: meta.token_chain,
            token_address: meta.token_address,
            sequence,
        })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Identity of the bound core contract; zero before boot.
    pub fn core_address(&self) -> Address {
        self.core
    }

    pub fn registration(&self, chain_id: u16) -> Option<Address> {
        self.registrations.get(&chain_id).copied()
    }

    pub fn asset_meta(&self, token_chain: u16, token_address: Address) -> Option<&AssetRecord> {
        self.assets.get(&(token_chain, token_address))
    }
}

//! Verification and dispatch of guardian-signed attestations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use causeway_guardian::{recover, GuardianError};
use causeway_vaa::governance::{GovernancePacket, GuardianSetUpgrade, SetFee, CORE_MODULE};
use causeway_vaa::{Address, GuardianAddress, GuardianSetInfo, Vaa};

use crate::error::ContractError;
use crate::state::{Config, FeeSchedule, GuardianRegistry, SequenceTracker};

/// What an accepted submission did. The embedding runtime emits these the way
/// the chain exposes contract events.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Event {
    GuardianSetChange {
        old_index: u32,
        new_index: u32,
    },
    FeeChange {
        target_chain: u16,
        amount: u128,
    },
    MessagePublished {
        emitter: Address,
        chain_id: u16,
        nonce: u32,
        sequence: u64,
        payload: Vec<u8>,
    },
}

/// The core messaging contract. Holds the guardian set registry, replay
/// tracking for the governance emitter, the fee schedule and outbound
/// sequence assignment.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CoreBridge {
    config: Config,
    booted: bool,
    registry: GuardianRegistry,
    sequences: SequenceTracker,
    fees: FeeSchedule,
    publish_sequences: BTreeMap<Address, u64>,
}

impl CoreBridge {
    pub fn new(config: Config) -> Self {
        CoreBridge {
            config,
            booted: false,
            registry: GuardianRegistry::default(),
            sequences: SequenceTracker::default(),
            fees: FeeSchedule::default(),
            publish_sequences: BTreeMap::new(),
        }
    }

    /// One-time initialization: installs the initial guardian set as set 0.
    pub fn boot(&mut self, addresses: Vec<GuardianAddress>) -> Result<(), ContractError> {
        if self.booted {
            return Err(ContractError::AlreadyBooted);
        }

        self.registry.init(GuardianSetInfo {
            addresses,
            expiration_time: 0,
        });
        self.booted = true;
        Ok(())
    }

    /// Parses raw attestation bytes and verifies the signatures against the
    /// referenced guardian set. Read-only; the portal and external callers
    /// use this as their verification primitive.
    pub fn verify_vaa(&self, data: &[u8], now: u64) -> Result<Vaa, ContractError> {
        let vaa = Vaa::deserialize(data).map_err(|_| ContractError::Malformed)?;

        let guardian_set = self
            .registry
            .get(vaa.guardian_set_index)
            .ok_or(ContractError::UnknownGuardianSet)?;
        if guardian_set.expiration_time != 0 && guardian_set.expiration_time < now {
            return Err(ContractError::GuardianSetExpired);
        }

        // Indices must strictly increase: no duplicates, no reordering.
        let mut last_index: i32 = -1;
        for sig in &vaa.signatures {
            if i32::from(sig.index) <= last_index {
                return Err(ContractError::UnsortedSignatures);
            }
            last_index = i32::from(sig.index);
        }

        let digest = vaa.body.digest();
        for sig in &vaa.signatures {
            let expected = guardian_set
                .addresses
                .get(sig.index as usize)
                .ok_or(ContractError::TooManySignatures)?;

            let recovered =
                recover(&digest.secp256k_hash, &sig.signature).map_err(|e| match e {
                    GuardianError::RecoveryFailed => ContractError::CannotRecoverKey,
                    _ => ContractError::CannotDecodeSignature,
                })?;
            if recovered != *expected {
                return Err(ContractError::GuardianSignatureError);
            }
        }

        if vaa.signatures.len() < guardian_set.quorum() {
            return Err(ContractError::NoQuorum);
        }

        Ok(vaa)
    }

    /// Verifies and executes a governance attestation. Either every gate
    /// passes and exactly one action is applied, or nothing changes.
    pub fn submit_vaa(&mut self, data: &[u8], now: u64) -> Result<Event, ContractError> {
        if !self.booted {
            return Err(ContractError::NotBooted);
        }

        let vaa = self.verify_vaa(data, now)?;

        if vaa.body.emitter_chain != self.config.gov_chain
            || vaa.body.emitter_address != self.config.gov_address
        {
            return Err(ContractError::InvalidGovernanceEmitter);
        }

        // A valid-but-superseded set may still verify ordinary traffic during
        // its grace window; governance demands the current set exactly.
        if vaa.guardian_set_index != self.registry.current_index() {
            return Err(ContractError::StaleGovernanceSet);
        }

        self.sequences.check(
            vaa.body.emitter_chain,
            vaa.body.emitter_address,
            vaa.body.sequence,
        )?;

        let packet =
            GovernancePacket::deserialize(&vaa.body.payload).map_err(|_| ContractError::Malformed)?;
        if packet.module != CORE_MODULE {
            return Err(ContractError::InvalidGovernanceModule);
        }

        let event = match packet.action {
            2u8 => {
                if packet.target_chain != 0 && packet.target_chain != self.config.chain_id {
                    return Err(ContractError::WrongTargetChain);
                }
                self.handle_guardian_set_upgrade(&packet.payload, now)?
            }
            3u8 => self.handle_set_fee(packet.target_chain, &packet.payload)?,
            _ => return Err(ContractError::InvalidGovernanceAction),
        };

        self.sequences.record(
            vaa.body.emitter_chain,
            vaa.body.emitter_address,
            vaa.body.sequence,
        );
        Ok(event)
    }

    fn handle_guardian_set_upgrade(
        &mut self,
        data: &[u8],
        now: u64,
    ) -> Result<Event, ContractError> {
        let GuardianSetUpgrade {
            new_guardian_set_index,
            addresses,
        } = GuardianSetUpgrade::deserialize(data).map_err(|_| ContractError::Malformed)?;

        let old_index = self.registry.current_index();
        self.registry.install(
            new_guardian_set_index,
            GuardianSetInfo {
                addresses,
                expiration_time: 0,
            },
            now + self.config.guardian_set_grace,
        )?;

        Ok(Event::GuardianSetChange {
            old_index,
            new_index: new_guardian_set_index,
        })
    }

    fn handle_set_fee(&mut self, target_chain: u16, data: &[u8]) -> Result<Event, ContractError> {
        let SetFee { amount } =
            SetFee::deserialize(data).map_err(|_| ContractError::Malformed)?;

        if target_chain == 0 {
            self.fees.set_default(amount);
        } else {
            self.fees.set_chain(target_chain, amount);
        }

        Ok(Event::FeeChange {
            target_chain,
            amount,
        })
    }

    /// Assigns the emitter's next outbound sequence. The attached fee must
    /// cover this chain's message fee.
    pub fn publish_message(
        &mut self,
        emitter: Address,
        nonce: u32,
        payload: &[u8],
        fee_paid: u128,
    ) -> Result<Event, ContractError> {
        if !self.booted {
            return Err(ContractError::NotBooted);
        }
        if fee_paid < self.fees.fee_for(self.config.chain_id) {
            return Err(ContractError::FeeTooLow);
        }

        let next = self.publish_sequences.entry(emitter).or_insert(0);
        let sequence = *next;
        *next += 1;

        Ok(Event::MessagePublished {
            emitter,
            chain_id: self.config.chain_id,
            nonce,
            sequence,
            payload: payload.to_vec(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Index of the current guardian set.
    pub fn guardian_set_index(&self) -> u32 {
        self.registry.current_index()
    }

    pub fn guardian_set(&self, index: u32) -> Option<&GuardianSetInfo> {
        self.registry.get(index)
    }

    pub fn current_guardian_set(&self) -> Option<&GuardianSetInfo> {
        self.registry.current()
    }

    pub fn fee_for(&self, chain: u16) -> u128 {
        self.fees.fee_for(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causeway_guardian::GuardianKeyring;

    fn test_config() -> Config {
        let mut gov_address = [0u8; 32];
        gov_address[31] = 4;
        Config {
            chain_id: 18,
            gov_chain: 1,
            gov_address: Address(gov_address),
            guardian_set_grace: 50,
        }
    }

    #[test]
    fn boot_installs_set_zero() {
        let keyring = GuardianKeyring::generate(3, 1);
        let mut core = CoreBridge::new(test_config());
        core.boot(keyring.addresses()).unwrap();

        assert!(core.is_booted());
        assert_eq!(core.guardian_set_index(), 0);
        let set = core.current_guardian_set().unwrap();
        assert_eq!(set.addresses, keyring.addresses());
        assert_eq!(set.expiration_time, 0);
    }

    #[test]
    fn boot_twice_fails() {
        let keyring = GuardianKeyring::generate(1, 1);
        let mut core = CoreBridge::new(test_config());
        core.boot(keyring.addresses()).unwrap();

        assert_eq!(
            core.boot(keyring.addresses()),
            Err(ContractError::AlreadyBooted)
        );
    }

    #[test]
    fn submit_before_boot_fails() {
        let mut core = CoreBridge::new(test_config());
        assert_eq!(
            core.submit_vaa(&[], 0),
            Err(ContractError::NotBooted)
        );
    }

    #[test]
    fn publish_assigns_sequences_per_emitter() {
        let keyring = GuardianKeyring::generate(1, 1);
        let mut core = CoreBridge::new(test_config());
        core.boot(keyring.addresses()).unwrap();

        let alice = Address([0xaa; 32]);
        let bob = Address([0xbb; 32]);

        for expected in 0..3u64 {
            let event = core.publish_message(alice, 7, b"hi", 0).unwrap();
            match event {
                Event::MessagePublished {
                    emitter, sequence, ..
                } => {
                    assert_eq!(emitter, alice);
                    assert_eq!(sequence, expected);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }

        let event = core.publish_message(bob, 7, b"hi", 0).unwrap();
        assert!(matches!(event, Event::MessagePublished { sequence: 0, .. }));
    }

    #[test]
    fn publish_requires_fee() {
        let keyring = GuardianKeyring::generate(1, 1);
        let mut core = CoreBridge::new(test_config());
        core.boot(keyring.addresses()).unwrap();

        // Raise this chain's fee directly through the fee schedule path the
        // governance handler uses.
        core.handle_set_fee(0, &SetFee { amount: 25 }.serialize())
            .unwrap();

        assert_eq!(
            core.publish_message(Address([1; 32]), 0, b"m", 24),
            Err(ContractError::FeeTooLow)
        );
        assert!(core.publish_message(Address([1; 32]), 0, b"m", 25).is_ok());
    }
}

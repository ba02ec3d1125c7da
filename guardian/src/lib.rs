//! The guardian signature scheme.
//!
//! Guardians sign the double Keccak256 digest of an attestation body with
//! recoverable secp256k1 ECDSA. Receiving contracts never store public keys;
//! they recover the signer from the 65-byte signature and compare its
//! Ethereum-style address against the registered guardian set. Both halves of
//! that exchange live here: [`GuardianKey`] for the signing side and
//! [`recover`] for the verifying side.
//!
//! Signing is deterministic (RFC 6979), so a guardian producing a signature
//! twice over the same body yields identical bytes.

use libsecp256k1::{Message, PublicKey, RecoveryId, SecretKey};
use sha3::{Digest, Keccak256};
use thiserror::Error;

use causeway_vaa::{Body, GuardianAddress, Signature, Vaa};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardianError {
    /// Secret key bytes outside the curve order
    #[error("InvalidSecretKey")]
    InvalidSecretKey,

    /// Signature r/s or recovery id could not be parsed
    #[error("MalformedSignature")]
    MalformedSignature,

    /// No public key could be recovered from the signature
    #[error("RecoveryFailed")]
    RecoveryFailed,
}

/// One guardian's signing key.
#[derive(Clone)]
pub struct GuardianKey {
    secret: SecretKey,
    address: GuardianAddress,
}

impl GuardianKey {
    pub fn from_secret(bytes: &[u8; 32]) -> Result<Self, GuardianError> {
        let secret = SecretKey::parse(bytes).map_err(|_| GuardianError::InvalidSecretKey)?;
        let public = PublicKey::from_secret_key(&secret);
        Ok(GuardianKey {
            secret,
            address: address_of(&public),
        })
    }

    /// The address signatures of this key recover to.
    pub fn address(&self) -> GuardianAddress {
        self.address
    }

    /// Sign a 32-byte digest, returning r ‖ s ‖ recovery id.
    pub fn sign(&self, digest: &[u8; 32]) -> [u8; 65] {
        let (signature, recovery_id) = libsecp256k1::sign(&Message::parse(digest), &self.secret);

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.serialize());
        out[64] = recovery_id.serialize();
        out
    }

    /// Sign the canonical encoding of an attestation body.
    pub fn sign_body(&self, body: &Body) -> [u8; 65] {
        self.sign(&body.digest().secp256k_hash)
    }
}

/// Recover the signer address from a 65-byte signature over `digest`.
pub fn recover(digest: &[u8; 32], signature: &[u8; 65]) -> Result<GuardianAddress, GuardianError> {
    let sig = libsecp256k1::Signature::parse_standard_slice(&signature[..64])
        .map_err(|_| GuardianError::MalformedSignature)?;
    let recovery_id =
        RecoveryId::parse(signature[64]).map_err(|_| GuardianError::MalformedSignature)?;

    let public = libsecp256k1::recover(&Message::parse(digest), &sig, &recovery_id)
        .map_err(|_| GuardianError::RecoveryFailed)?;
    Ok(address_of(&public))
}

/// Last 20 bytes of keccak256 of the uncompressed public key, skipping the
/// 0x04 prefix.
fn address_of(public: &PublicKey) -> GuardianAddress {
    let hash = Keccak256::digest(&public.serialize()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..32]);
    GuardianAddress(address)
}

/// An ordered collection of guardian keys that assembles signed envelopes.
/// Key order matters: the position of a key is the signature index it signs
/// under.
#[derive(Clone)]
pub struct GuardianKeyring {
    keys: Vec<GuardianKey>,
}

impl GuardianKeyring {
    pub fn new(keys: Vec<GuardianKey>) -> Self {
        GuardianKeyring { keys }
    }

    /// Derive `count` keys from a seed, each as keccak256(seed ‖ index).
    /// Useful wherever reproducible guardian identities are needed.
    pub fn generate(count: usize, seed: u64) -> Self {
        let keys = (0..count)
            .map(|i| {
                let mut input = [0u8; 16];
                input[..8].copy_from_slice(&seed.to_le_bytes());
                input[8..].copy_from_slice(&(i as u64).to_le_bytes());
                // The secret must be a valid curve scalar; rehash until it is.
                let mut secret: [u8; 32] = Keccak256::digest(input).into();
                loop {
                    match GuardianKey::from_secret(&secret) {
                        Ok(key) => return key,
                        Err(_) => secret = Keccak256::digest(secret).into(),
                    }
                }
            })
            .collect();
        GuardianKeyring { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GuardianKey> {
        self.keys.get(index)
    }

    /// The guardian set this keyring signs for, in signing order.
    pub fn addresses(&self) -> Vec<GuardianAddress> {
        self.keys.iter().map(|k| k.address()).collect()
    }

    /// Sign `body` with every key and assemble the envelope.
    pub fn sign(&self, body: Body, guardian_set_index: u32) -> Vaa {
        let all: Vec<u8> = (0..self.keys.len() as u8).collect();
        self.sign_subset(body, guardian_set_index, &all)
    }

    /// Sign `body` with the keys at `indices` only. Indices without a key are
    /// skipped; signatures come out ordered by guardian index as the wire
    /// format demands.
    pub fn sign_subset(&self, body: Body, guardian_set_index: u32, indices: &[u8]) -> Vaa {
        let digest = body.digest();

        let mut indices = indices.to_vec();
        indices.sort_unstable();
        indices.dedup();

        let signatures = indices
            .iter()
            .filter_map(|&index| {
                self.keys.get(index as usize).map(|key| Signature {
                    index,
                    signature: key.sign(&digest.secp256k_hash),
                })
            })
            .collect();

        Vaa {
            guardian_set_index,
            signatures,
            body,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // Well known development key; the address is the first account every
    // ganache user has seen.
    const DEV_SECRET: &str = "4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d";
    const DEV_ADDRESS: &str = "90f8bf6a479f320ead074411a4b0e7944ea8c9c1";

    fn dev_key() -> GuardianKey {
        let bytes: [u8; 32] = hex::decode(DEV_SECRET).unwrap().try_into().unwrap();
        GuardianKey::from_secret(&bytes).unwrap()
    }

    #[test]
    fn address_derivation() {
        assert_eq!(hex::encode(dev_key().address().0), DEV_ADDRESS);
    }

    #[test]
    fn sign_is_deterministic() {
        let key = dev_key();
        let digest = [7u8; 32];
        assert_eq!(key.sign(&digest), key.sign(&digest));
    }

    #[test]
    fn sign_recover_round_trip() {
        let key = dev_key();
        let digest = [7u8; 32];
        let signature = key.sign(&digest);

        assert_eq!(recover(&digest, &signature).unwrap(), key.address());
    }

    #[test]
    fn recover_rejects_bad_recovery_id() {
        let key = dev_key();
        let digest = [7u8; 32];
        let mut signature = key.sign(&digest);
        signature[64] = 9;

        assert_eq!(
            recover(&digest, &signature),
            Err(GuardianError::MalformedSignature)
        );
    }

    #[test]
    fn recovered_address_changes_with_digest() {
        let key = dev_key();
        let signature = key.sign(&[7u8; 32]);

        match recover(&[8u8; 32], &signature) {
            Ok(recovered) => assert_ne!(recovered, key.address()),
            Err(e) => assert_eq!(e, GuardianError::RecoveryFailed),
        }
    }

    #[test]
    fn generate_is_stable_and_distinct() {
        let a = GuardianKeyring::generate(7, 1234);
        let b = GuardianKeyring::generate(7, 1234);
        assert_eq!(a.addresses(), b.addresses());

        let addrs = a.addresses();
        for i in 0..addrs.len() {
            for j in (i + 1)..addrs.len() {
                assert_ne!(addrs[i], addrs[j]);
            }
        }
    }

    #[test]
    fn sign_subset_orders_and_dedups() {
        let keyring = GuardianKeyring::generate(5, 99);
        let body = Body {
            payload: b"hello".to_vec(),
            ..Default::default()
        };

        let vaa = keyring.sign_subset(body, 0, &[4, 0, 2, 2]);
        let indices: Vec<u8> = vaa.signatures.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2, 4]);
    }

    #[test]
    fn signed_envelope_verifies_per_index() {
        let keyring = GuardianKeyring::generate(3, 7);
        let body = Body {
            payload: b"attested".to_vec(),
            ..Default::default()
        };
        let digest = body.digest();

        let vaa = keyring.sign(body, 0);
        assert_eq!(vaa.signatures.len(), 3);
        for sig in &vaa.signatures {
            let expected = keyring.get(sig.index as usize).unwrap().address();
            assert_eq!(
                recover(&digest.secp256k_hash, &sig.signature).unwrap(),
                expected
            );
        }
    }
}

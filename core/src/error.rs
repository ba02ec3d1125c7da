use thiserror::Error;

/// Every rejection a submission can end in. All of these are deterministic
/// verdicts on the submitted bytes against current state, not transient
/// faults; nothing here is retried internally, and a rejected submission
/// leaves all contract state unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractError {
    /// Attestation or governance payload bytes do not decode
    #[error("Malformed")]
    Malformed,

    /// No guardian set with the referenced index
    #[error("UnknownGuardianSet")]
    UnknownGuardianSet,

    /// Referenced guardian set has passed its expiration time
    #[error("GuardianSetExpired")]
    GuardianSetExpired,

    /// Signer indices not strictly increasing
    #[error("UnsortedSignatures")]
    UnsortedSignatures,

    /// Signer index outside the referenced guardian set
    #[error("TooManySignatures")]
    TooManySignatures,

    /// Signature bytes could not be parsed
    #[error("CannotDecodeSignature")]
    CannotDecodeSignature,

    /// No public key could be recovered from a signature
    #[error("CannotRecoverKey")]
    CannotRecoverKey,

    /// Recovered signer does not match the guardian at its index
    #[error("GuardianSignatureError")]
    GuardianSignatureError,

    /// Fewer signatures than the guardian set's quorum
    #[error("NoQuorum")]
    NoQuorum,

    /// Governance attestation signed under a set that is no longer current
    #[error("StaleGovernanceSet")]
    StaleGovernanceSet,

    /// Emitter is not the governance emitter
    #[error("InvalidGovernanceEmitter")]
    InvalidGovernanceEmitter,

    /// Governance packet addressed to a different module
    #[error("InvalidGovernanceModule")]
    InvalidGovernanceModule,

    /// Governance action code not recognized
    #[error("InvalidGovernanceAction")]
    InvalidGovernanceAction,

    /// Guardian set index must increase in steps of 1
    #[error("InvalidGovernanceSequence")]
    InvalidGovernanceSequence,

    /// Governance packet targets another chain
    #[error("WrongTargetChain")]
    WrongTargetChain,

    /// Sequence not greater than the last accepted for this emitter
    #[error("ReplayOrOutOfOrder")]
    ReplayOrOutOfOrder,

    /// Sequence not greater than the record's own last update
    #[error("StaleUpdate")]
    StaleUpdate,

    /// Boot called on an already booted contract
    #[error("AlreadyBooted")]
    AlreadyBooted,

    /// Contract has not been booted yet
    #[error("NotBooted")]
    NotBooted,

    /// Chain already has an emitter registration
    #[error("AlreadyRegistered")]
    AlreadyRegistered,

    /// Fee attached to the message is below the configured fee
    #[error("FeeTooLow")]
    FeeTooLow,
}

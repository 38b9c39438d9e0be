// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Domain types: account identities, networks, key records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthnError;

/// Ledger account identifier in `shard.realm.num` form.
///
/// Accepts an optional `-abcde` checksum suffix on input. The checksum is
/// checked for shape only and is not kept; the canonical form never has it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl AccountId {
    pub fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }
}

impl FromStr for AccountId {
    type Err = AuthnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AuthnError::InvalidArgument(format!("malformed account id: {s:?}"));

        let (id, checksum) = match s.split_once('-') {
            Some((id, checksum)) => (id, Some(checksum)),
            None => (s, None),
        };

        if let Some(checksum) = checksum {
            if checksum.len() != 5 || !checksum.bytes().all(|b| b.is_ascii_lowercase()) {
                return Err(invalid());
            }
        }

        let mut parts = id.split('.');
        let mut next = || -> Result<u64, AuthnError> {
            let part = parts.next().ok_or_else(invalid)?;
            // u64::from_str accepts a leading '+', which is not a valid id.
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse::<u64>().map_err(|_| invalid())
        };

        let shard = next()?;
        let realm = next()?;
        let num = next()?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self { shard, realm, num })
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

/// Ledger network an account lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Network {
    Testnet,
    Mainnet,
    Previewnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
            Network::Previewnet => "previewnet",
        }
    }
}

impl FromStr for Network {
    type Err = AuthnError;

    /// Parse network from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            "previewnet" => Ok(Network::Previewnet),
            _ => Err(AuthnError::InvalidArgument(format!("unknown network: {s:?}"))),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage key for per-account state: one slot per (account, network).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChallengeKey {
    pub account: AccountId,
    pub network: Network,
}

impl ChallengeKey {
    pub fn new(account: AccountId, network: Network) -> Self {
        Self { account, network }
    }

    /// Key used by the embedded database: `network|shard.realm.num`.
    pub fn storage_key(&self) -> String {
        format!("{}|{}", self.network, self.account)
    }
}

impl fmt::Display for ChallengeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.account, self.network)
    }
}

/// Signature scheme of an account key.
///
/// Numeric codes follow the key directory's wire values. Anything unknown
/// decodes to `Invalid`, which the verifier rejects outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    Invalid,
    Ed25519,
    EcdsaSecp256k1,
}

impl KeyAlgorithm {
    pub fn code(&self) -> u32 {
        match self {
            KeyAlgorithm::Invalid => 0,
            KeyAlgorithm::Ed25519 => 1,
            KeyAlgorithm::EcdsaSecp256k1 => 2,
        }
    }
}

impl From<u32> for KeyAlgorithm {
    fn from(code: u32) -> Self {
        match code {
            1 => KeyAlgorithm::Ed25519,
            2 => KeyAlgorithm::EcdsaSecp256k1,
            _ => KeyAlgorithm::Invalid,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::Invalid => write!(f, "INVALID"),
            KeyAlgorithm::Ed25519 => write!(f, "ED25519"),
            KeyAlgorithm::EcdsaSecp256k1 => write!(f, "ECDSA_SECP256K1"),
        }
    }
}

/// Public key resolved for an account on a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyRecord {
    /// Raw key bytes (32-byte Ed25519, or SEC1-encoded secp256k1 point)
    pub key: Vec<u8>,
    pub algorithm: KeyAlgorithm,
}

impl PublicKeyRecord {
    pub fn new(key: impl Into<Vec<u8>>, algorithm: KeyAlgorithm) -> Self {
        Self {
            key: key.into(),
            algorithm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_account_id() {
        let id: AccountId = "0.0.4821".parse().unwrap();
        assert_eq!(id, AccountId::new(0, 0, 4821));
        assert_eq!(id.to_string(), "0.0.4821");
    }

    #[test]
    fn checksum_suffix_is_accepted_and_dropped() {
        let id: AccountId = "0.0.123-vfmkw".parse().unwrap();
        assert_eq!(id.to_string(), "0.0.123");
    }

    #[test]
    fn rejects_malformed_account_ids() {
        for bad in [
            "", "0.0", "0.0.1.2", "a.b.c", "0.0.-1", "0.0.+1", "0..1", "0.0.1-ABCDE", "0.0.1-abc",
            " 0.0.1", "0.0.99999999999999999999",
        ] {
            let result = bad.parse::<AccountId>();
            assert!(
                matches!(result, Err(AuthnError::InvalidArgument(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn network_parses_case_insensitively() {
        assert_eq!("TESTNET".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("previewnet".parse::<Network>().unwrap(), Network::Previewnet);
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn storage_key_is_network_scoped() {
        let account = AccountId::new(0, 0, 7);
        let a = ChallengeKey::new(account, Network::Testnet);
        let b = ChallengeKey::new(account, Network::Mainnet);
        assert_eq!(a.storage_key(), "testnet|0.0.7");
        assert_ne!(a.storage_key(), b.storage_key());
    }

    #[test]
    fn unknown_algorithm_codes_are_invalid() {
        assert_eq!(KeyAlgorithm::from(0), KeyAlgorithm::Invalid);
        assert_eq!(KeyAlgorithm::from(1), KeyAlgorithm::Ed25519);
        assert_eq!(KeyAlgorithm::from(2), KeyAlgorithm::EcdsaSecp256k1);
        assert_eq!(KeyAlgorithm::from(77), KeyAlgorithm::Invalid);
        assert_eq!(KeyAlgorithm::EcdsaSecp256k1.code(), 2);
    }
}

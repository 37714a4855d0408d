//! Contract manifest and name resolution.

use serde::Deserialize;

use crate::{Address, FeltError, parse_felt};

/// Manifest lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    /// No contract carries the requested tag.
    #[error("Contract {0} not found in manifest")]
    ContractNotFound(String),
    /// The manifest entry holds an unparseable address.
    #[error("Invalid address in manifest: {0}")]
    InvalidAddress(#[from] FeltError),
    /// The manifest document could not be parsed.
    #[error("Malformed manifest: {0}")]
    Malformed(String),
}

/// The world contract entry.
#[derive(Clone, Debug, Deserialize)]
pub struct WorldEntry {
    /// Hex encoded address.
    pub address: String,
}

/// One deployed contract.
#[derive(Clone, Debug, Deserialize)]
pub struct ContractEntry {
    /// Logical name, e.g. `s1_eternum-troop_movement_systems`.
    pub tag: String,
    /// Hex encoded address.
    pub address: String,
}

/// Deployment manifest mapping logical contract names to addresses.
#[derive(Clone, Debug, Deserialize)]
pub struct Manifest {
    /// World contract.
    pub world: WorldEntry,
    /// Deployed contracts.
    #[serde(default)]
    pub contracts: Vec<ContractEntry>,
}

impl Manifest {
    /// Parses a manifest from its JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Malformed`] if the document is not a manifest.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(json).map_err(|e| ManifestError::Malformed(e.to_string()))
    }

    /// Resolves a logical contract name to its deployed address.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::ContractNotFound`] for unknown names.
    pub fn resolve(&self, name: &str) -> Result<Address, ManifestError> {
        let entry = self
            .contracts
            .iter()
            .find(|contract| contract.tag == name)
            .ok_or_else(|| ManifestError::ContractNotFound(name.to_string()))?;
        Ok(parse_felt(&entry.address)?)
    }

    /// Returns the world contract address.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::InvalidAddress`] if the address cannot be parsed.
    pub fn world_address(&self) -> Result<Address, ManifestError> {
        Ok(parse_felt(&self.world.address)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::felt_from_u64;

    const MANIFEST: &str = r#"{
        "world": { "address": "0x100" },
        "contracts": [
            { "tag": "s1_eternum-trade_systems", "address": "0x1a" },
            { "tag": "s1_eternum-bank_systems", "address": "0x2b" },
            { "tag": "s1_eternum-broken", "address": "0xnothex" }
        ]
    }"#;

    #[test]
    fn resolves_known_contracts() {
        let manifest = Manifest::from_json(MANIFEST).unwrap();
        assert_eq!(manifest.resolve("s1_eternum-trade_systems").unwrap(), felt_from_u64(0x1a));
        assert_eq!(manifest.resolve("s1_eternum-bank_systems").unwrap(), felt_from_u64(0x2b));
        assert_eq!(manifest.world_address().unwrap(), felt_from_u64(0x100));
    }

    #[test]
    fn unknown_contract_is_not_found() {
        let manifest = Manifest::from_json(MANIFEST).unwrap();
        let err = manifest.resolve("s1_eternum-missing").unwrap_err();
        assert_eq!(err, ManifestError::ContractNotFound("s1_eternum-missing".to_string()));
        assert_eq!(err.to_string(), "Contract s1_eternum-missing not found in manifest");
    }

    #[test]
    fn bad_address_is_reported() {
        let manifest = Manifest::from_json(MANIFEST).unwrap();
        assert!(matches!(
            manifest.resolve("s1_eternum-broken"),
            Err(ManifestError::InvalidAddress(_))
        ));
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(matches!(Manifest::from_json("[]"), Err(ManifestError::Malformed(_))));
    }
}

//! Typed-data domain shared by every order hash and signature
use alloy::primitives::{Address, B256, U256, address};
use alloy::sol_types::Eip712Domain;
use std::borrow::Cow;

pub const DEFAULT_DOMAIN_NAME: &str = "iExecODB";
pub const DEFAULT_DOMAIN_VERSION: &str = "5.0.0";

pub const BELLECOUR_CHAIN_ID: u64 = 134;
pub const BELLECOUR_HUB: Address = address!("3eca1b216a7df1c7689aeb259ffb83adfb894e7f");

/// Immutable once built; fields are only readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    name: String,
    version: String,
    chain_id: u64,
    verifying_contract: Address,
}

impl Domain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }

    /// Domain of the production hub.
    pub fn bellecour() -> Self {
        Self::new(
            DEFAULT_DOMAIN_NAME,
            DEFAULT_DOMAIN_VERSION,
            BELLECOUR_CHAIN_ID,
            BELLECOUR_HUB,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn verifying_contract(&self) -> Address {
        self.verifying_contract
    }

    /// Projection handed to struct hashing and to signers.
    pub fn eip712(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(Cow::Owned(self.name.clone())),
            Some(Cow::Owned(self.version.clone())),
            Some(U256::from(self.chain_id)),
            Some(self.verifying_contract),
            None,
        )
    }

    pub fn separator(&self) -> B256 {
        self.eip712().separator()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "version": self.version,
            "chainId": self.chain_id,
            "verifyingContract": self.verifying_contract.to_checksum(None),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_depends_on_every_field() {
        let base = Domain::new("iExecODB", "5.0.0", 134, BELLECOUR_HUB);
        let other_chain = Domain::new("iExecODB", "5.0.0", 1, BELLECOUR_HUB);
        let other_version = Domain::new("iExecODB", "3.0-alpha", 134, BELLECOUR_HUB);
        let other_contract = Domain::new("iExecODB", "5.0.0", 134, Address::ZERO);

        assert_ne!(base.separator(), other_chain.separator());
        assert_ne!(base.separator(), other_version.separator());
        assert_ne!(base.separator(), other_contract.separator());
        assert_eq!(base.separator(), Domain::bellecour().separator());
    }
}

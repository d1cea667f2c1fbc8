//! Signer capability and the typed-data payload it signs over
use super::domain::Domain;
use super::error::SignerError;
use super::order::{AbiType, CanonicalValue, OrderSignature};
use alloy::primitives::{Address, B256};
use alloy::signers::SignerSync;
use alloy::signers::local::PrivateKeySigner;

/// Everything an external signer needs: domain projection, salted type
/// table and salted values, plus the hash they commit to.
#[derive(Debug, Clone)]
pub struct TypedDataPayload {
    pub domain: Domain,
    pub primary_type: &'static str,
    pub fields: Vec<(&'static str, AbiType)>,
    pub message: Vec<(&'static str, CanonicalValue)>,
    pub signing_hash: B256,
}

impl TypedDataPayload {
    /// `eth_signTypedData_v4` document.
    pub fn to_json(&self) -> serde_json::Value {
        let domain_type = serde_json::json!([
            { "name": "name", "type": "string" },
            { "name": "version", "type": "string" },
            { "name": "chainId", "type": "uint256" },
            { "name": "verifyingContract", "type": "address" },
        ]);
        let order_type: Vec<serde_json::Value> = self
            .fields
            .iter()
            .map(|(name, kind)| serde_json::json!({ "name": name, "type": kind.as_str() }))
            .collect();

        let mut types = serde_json::Map::new();
        types.insert("EIP712Domain".into(), domain_type);
        types.insert(self.primary_type.into(), order_type.into());

        let message: serde_json::Map<String, serde_json::Value> = self
            .message
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect();

        serde_json::json!({
            "types": types,
            "primaryType": self.primary_type,
            "domain": self.domain.to_json(),
            "message": message,
        })
    }
}

/// External typed-data signing capability.
pub trait TypedDataSigner {
    fn address(&self) -> Address;

    fn sign_typed_data(&self, payload: &TypedDataPayload) -> Result<OrderSignature, SignerError>;
}

impl TypedDataSigner for PrivateKeySigner {
    fn address(&self) -> Address {
        PrivateKeySigner::address(self)
    }

    fn sign_typed_data(&self, payload: &TypedDataPayload) -> Result<OrderSignature, SignerError> {
        let signature = self
            .sign_hash_sync(&payload.signing_hash)
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;

        tracing::trace!(
            primary_type = payload.primary_type,
            hash = hex::encode(payload.signing_hash),
            "signed typed data"
        );

        Ok(signature.into())
    }
}

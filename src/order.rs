//! Shared order machinery: the `Order` capability, salts, signatures and
//! canonical values. The four concrete orders live in their own modules.
use super::domain::Domain;
use super::error::{SignerError, ValidationError};
use super::signer::{TypedDataPayload, TypedDataSigner};
use super::snapshot::ResourceRef;
use super::tag::Tag;
use alloy::primitives::{Address, B256, Signature, U256};
use alloy::sol_types::SolStruct;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Volume used when an app or dataset order does not cap it.
pub const UNLIMITED_VOLUME: U256 = U256::MAX;

pub const SIGNATURE_LENGTH: usize = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiType {
    Address,
    Uint256,
    Bytes32,
    String,
}

impl AbiType {
    pub fn as_str(self) -> &'static str {
        match self {
            AbiType::Address => "address",
            AbiType::Uint256 => "uint256",
            AbiType::Bytes32 => "bytes32",
            AbiType::String => "string",
        }
    }
}

/// Hash-ready value of a single order field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalValue {
    Address(Address),
    Uint(U256),
    Bytes32(B256),
    String(String),
    Bytes(Vec<u8>),
}

impl CanonicalValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CanonicalValue::Address(a) => a.to_checksum(None).into(),
            CanonicalValue::Uint(u) => u.to_string().into(),
            CanonicalValue::String(s) => s.clone().into(),
            CanonicalValue::Bytes32(_) | CanonicalValue::Bytes(_) => self.to_string().into(),
        }
    }
}

impl fmt::Display for CanonicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalValue::Address(a) => write!(f, "{}", a.to_checksum(None)),
            CanonicalValue::Uint(u) => write!(f, "{u}"),
            CanonicalValue::Bytes32(b) => write!(f, "0x{}", hex::encode(b)),
            CanonicalValue::String(s) => f.write_str(s),
            CanonicalValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
        }
    }
}

/// Restriction or resource address as given by a caller, resolved once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AddressLike {
    Raw(Address),
    Entry(ResourceRef),
    #[default]
    None,
}

impl AddressLike {
    pub fn resolve(&self) -> Address {
        match self {
            AddressLike::Raw(address) => *address,
            AddressLike::Entry(entry) => entry.pointer,
            AddressLike::None => Address::ZERO,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, AddressLike::None)
    }
}

impl FromStr for AddressLike {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(AddressLike::None);
        }
        Address::from_str(s)
            .map(AddressLike::Raw)
            .map_err(|e| ValidationError::InvalidAddress(format!("`{s}`: {e}")))
    }
}

impl From<Address> for AddressLike {
    fn from(value: Address) -> Self {
        AddressLike::Raw(value)
    }
}

impl From<Option<Address>> for AddressLike {
    fn from(value: Option<Address>) -> Self {
        value.map_or(AddressLike::None, AddressLike::Raw)
    }
}

impl From<&ResourceRef> for AddressLike {
    fn from(value: &ResourceRef) -> Self {
        AddressLike::Entry(value.clone())
    }
}

/// 32 random bytes making two otherwise identical orders distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Salt(B256);

impl Salt {
    pub fn random() -> Self {
        Self(B256::random())
    }

    pub fn as_b256(&self) -> B256 {
        self.0
    }
}

impl From<B256> for Salt {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl FromStr for Salt {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .filter(|d| d.len() == 64)
            .ok_or_else(|| ValidationError::InvalidSalt(s.to_string()))?;

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| ValidationError::InvalidSalt(s.to_string()))?;

        Ok(Self(B256::from(bytes)))
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// 65 bytes `r || s || v` signature. All zeroes means unsigned.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OrderSignature([u8; SIGNATURE_LENGTH]);

impl OrderSignature {
    pub const NONE: OrderSignature = OrderSignature([0u8; SIGNATURE_LENGTH]);

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; SIGNATURE_LENGTH]>::try_from(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Signer of `hash`, if this is a well-formed signature.
    pub fn recover(&self, hash: B256) -> Option<Address> {
        if self.is_none() {
            return None;
        }
        let signature = Signature::try_from(&self.0[..]).ok()?;
        signature.recover_address_from_prehash(&hash).ok()
    }
}

impl From<Signature> for OrderSignature {
    fn from(value: Signature) -> Self {
        Self(value.as_bytes())
    }
}

impl fmt::Display for OrderSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for OrderSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OrderSignature({self})")
    }
}

/// Checks requested from `Order::verify`. Unset checks are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyRequest<'a> {
    pub signature: Option<&'a OrderSignature>,
    pub signer: Option<Address>,
    pub expected_hash: Option<B256>,
}

impl<'a> VerifyRequest<'a> {
    pub fn signed_by(signature: &'a OrderSignature, signer: Address) -> Self {
        Self {
            signature: Some(signature),
            signer: Some(signer),
            expected_hash: None,
        }
    }

    pub fn hash(expected_hash: B256) -> Self {
        Self {
            expected_hash: Some(expected_hash),
            ..Self::default()
        }
    }
}

/// Required builder field.
pub(crate) fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}

/// Required address field, the null address is not accepted.
pub(crate) fn require_address(
    value: &AddressLike,
    field: &'static str,
) -> Result<Address, ValidationError> {
    match value.resolve() {
        Address::ZERO => Err(ValidationError::MissingField(field)),
        address => Ok(address),
    }
}

/// Capability shared by the four order kinds.
pub trait Order: Sized {
    /// Contract-side struct the typed-data hash is computed over.
    type Typed: SolStruct;

    /// Short name used in logs and errors.
    const KIND: &'static str;
    const PRIMARY_TYPE: &'static str;
    /// Fixed ABI field table, without the trailing salt.
    const FIELDS: &'static [(&'static str, AbiType)];

    fn canonical_fields(&self) -> BTreeMap<&'static str, CanonicalValue>;

    fn to_typed(&self, salt: &Salt) -> Self::Typed;

    fn volume(&self) -> U256;

    fn tag(&self) -> Tag;

    /// Field table with the salt appended, as signed.
    fn salted_fields() -> Vec<(&'static str, AbiType)> {
        let mut fields = Self::FIELDS.to_vec();
        fields.push(("salt", AbiType::Bytes32));
        fields
    }

    /// Canonical values in field-table order.
    fn ordered_values(&self) -> Vec<CanonicalValue> {
        let mut canonical = self.canonical_fields();
        Self::FIELDS
            .iter()
            .filter_map(|(name, _)| canonical.remove(name))
            .collect()
    }

    fn hash(&self, domain: &Domain, salt: &Salt) -> B256 {
        self.to_typed(salt).eip712_signing_hash(&domain.eip712())
    }

    fn typed_data(&self, domain: &Domain, salt: &Salt) -> TypedDataPayload {
        let mut message: Vec<(&'static str, CanonicalValue)> = Self::FIELDS
            .iter()
            .map(|(name, _)| *name)
            .zip(self.ordered_values())
            .collect();
        message.push(("salt", CanonicalValue::Bytes32(salt.as_b256())));

        TypedDataPayload {
            domain: domain.clone(),
            primary_type: Self::PRIMARY_TYPE,
            fields: Self::salted_fields(),
            message,
            signing_hash: self.hash(domain, salt),
        }
    }

    /// Without a signer the unsigned placeholder is returned.
    fn sign(
        &self,
        domain: &Domain,
        salt: &Salt,
        signer: Option<&dyn TypedDataSigner>,
    ) -> Result<OrderSignature, SignerError> {
        match signer {
            None => Ok(OrderSignature::NONE),
            Some(signer) => signer.sign_typed_data(&self.typed_data(domain, salt)),
        }
    }

    fn sign_order(
        self,
        domain: &Domain,
        salt: Salt,
        signer: Option<&dyn TypedDataSigner>,
    ) -> Result<SignedOrder<Self>, SignerError> {
        let signature = self.sign(domain, &salt, signer)?;
        Ok(SignedOrder {
            order: self,
            salt,
            signature,
        })
    }

    /// True only when at least one check was requested and all of them pass.
    fn verify(&self, domain: &Domain, salt: &Salt, request: VerifyRequest<'_>) -> bool {
        let hash = self.hash(domain, salt);
        let mut checked = false;

        if let Some(expected) = request.expected_hash {
            if expected != hash {
                return false;
            }
            checked = true;
        }

        if let (Some(signature), Some(signer)) = (request.signature, request.signer) {
            if signature.recover(hash) != Some(signer) {
                return false;
            }
            checked = true;
        }

        checked
    }

    /// Field values in table order followed by salt and signature.
    fn match_arguments(
        &self,
        domain: &Domain,
        salt: &Salt,
        signer: Option<&dyn TypedDataSigner>,
    ) -> Result<Vec<CanonicalValue>, SignerError> {
        let signature = self.sign(domain, salt, signer)?;
        let mut values = self.ordered_values();
        values.push(CanonicalValue::Bytes32(salt.as_b256()));
        values.push(CanonicalValue::Bytes(signature.as_bytes().to_vec()));
        Ok(values)
    }
}

/// An order with the salt and signature it was published with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOrder<O> {
    pub order: O,
    pub salt: Salt,
    pub signature: OrderSignature,
}

impl<O: Order> SignedOrder<O> {
    pub fn hash(&self, domain: &Domain) -> B256 {
        self.order.hash(domain, &self.salt)
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_none()
    }

    pub fn verify_signer(&self, domain: &Domain, signer: Address) -> bool {
        self.order.verify(
            domain,
            &self.salt,
            VerifyRequest::signed_by(&self.signature, signer),
        )
    }

    /// Arguments for submission, reusing the stored signature.
    pub fn match_arguments(&self) -> Vec<CanonicalValue> {
        let mut values = self.order.ordered_values();
        values.push(CanonicalValue::Bytes32(self.salt.as_b256()));
        values.push(CanonicalValue::Bytes(self.signature.as_bytes().to_vec()));
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_requires_prefixed_32_bytes() {
        let good = format!("0x{}", "ab".repeat(32));
        assert!(good.parse::<Salt>().is_ok());

        assert_eq!(
            "0x1234".parse::<Salt>(),
            Err(ValidationError::InvalidSalt("0x1234".into()))
        );
        assert!("ab".repeat(32).parse::<Salt>().is_err());
        assert!(format!("0x{}", "zz".repeat(32)).parse::<Salt>().is_err());
    }

    #[test]
    fn salt_display_roundtrip() {
        let salt = Salt::random();
        assert_eq!(salt.to_string().parse::<Salt>().unwrap(), salt);
    }

    #[test]
    fn placeholder_signature_recovers_nothing() {
        assert!(OrderSignature::NONE.is_none());
        assert_eq!(OrderSignature::NONE.recover(B256::ZERO), None);
        assert_eq!(OrderSignature::NONE.to_string(), format!("0x{}", "00".repeat(65)));
    }

    #[test]
    fn address_like_resolution() {
        let raw: Address = "0x000000000000000000000000000000000000dead".parse().unwrap();
        let entry = ResourceRef {
            pointer: raw,
            owner: Address::ZERO,
            price: U256::ZERO,
        };

        assert_eq!(AddressLike::None.resolve(), Address::ZERO);
        assert_eq!(AddressLike::from(raw).resolve(), raw);
        assert_eq!(AddressLike::from(&entry).resolve(), raw);
        assert_eq!(AddressLike::from(None).resolve(), Address::ZERO);
        assert_eq!("".parse::<AddressLike>(), Ok(AddressLike::None));
        assert!("0xnotanaddress".parse::<AddressLike>().is_err());
    }
}

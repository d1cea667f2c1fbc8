use super::error::ValidationError;
use super::order::{AbiType, AddressLike, CanonicalValue, Order, Salt, require_address};
use super::tag::Tag;
use super::typed;
use alloy::primitives::{Address, U256};
use std::collections::BTreeMap;

/// Offer of computing capacity in a category at a trust level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerpoolOrder {
    workerpool: Address,
    workerpoolprice: U256,
    volume: U256,
    tag: Tag,
    category: U256,
    trust: U256,
    apprestrict: Address,
    datasetrestrict: Address,
    requesterrestrict: Address,
}

#[derive(Debug, Default)]
pub struct WorkerpoolOrderBuilder {
    workerpool: AddressLike,
    workerpoolprice: U256,
    volume: Option<U256>,
    tag: Tag,
    category: U256,
    trust: U256,
    apprestrict: AddressLike,
    datasetrestrict: AddressLike,
    requesterrestrict: AddressLike,
}

impl WorkerpoolOrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_workerpool(mut self, workerpool: impl Into<AddressLike>) -> Self {
        self.workerpool = workerpool.into();
        self
    }
    pub fn set_price(mut self, price: U256) -> Self {
        self.workerpoolprice = price;
        self
    }
    pub fn set_volume(mut self, volume: U256) -> Self {
        self.volume = Some(volume);
        self
    }
    pub fn set_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }
    pub fn set_category(mut self, category: U256) -> Self {
        self.category = category;
        self
    }
    pub fn set_trust(mut self, trust: U256) -> Self {
        self.trust = trust;
        self
    }
    pub fn set_app_restrict(mut self, restrict: impl Into<AddressLike>) -> Self {
        self.apprestrict = restrict.into();
        self
    }
    pub fn set_dataset_restrict(mut self, restrict: impl Into<AddressLike>) -> Self {
        self.datasetrestrict = restrict.into();
        self
    }
    pub fn set_requester_restrict(mut self, restrict: impl Into<AddressLike>) -> Self {
        self.requesterrestrict = restrict.into();
        self
    }
    pub fn build(self) -> Result<WorkerpoolOrder, ValidationError> {
        Ok(WorkerpoolOrder {
            workerpool: require_address(&self.workerpool, "workerpool")?,
            workerpoolprice: self.workerpoolprice,
            volume: self.volume.unwrap_or(U256::from(1)),
            tag: self.tag,
            category: self.category,
            trust: self.trust,
            apprestrict: self.apprestrict.resolve(),
            datasetrestrict: self.datasetrestrict.resolve(),
            requesterrestrict: self.requesterrestrict.resolve(),
        })
    }
}

impl WorkerpoolOrder {
    pub fn builder() -> WorkerpoolOrderBuilder {
        WorkerpoolOrderBuilder::new()
    }
    pub fn workerpool(&self) -> Address {
        self.workerpool
    }
    pub fn price(&self) -> U256 {
        self.workerpoolprice
    }
    pub fn category(&self) -> U256 {
        self.category
    }
    pub fn trust(&self) -> U256 {
        self.trust
    }
    pub fn app_restrict(&self) -> Address {
        self.apprestrict
    }
    pub fn dataset_restrict(&self) -> Address {
        self.datasetrestrict
    }
    pub fn requester_restrict(&self) -> Address {
        self.requesterrestrict
    }
}

impl Order for WorkerpoolOrder {
    type Typed = typed::WorkerpoolOrder;

    const KIND: &'static str = "workerpool";
    const PRIMARY_TYPE: &'static str = "WorkerpoolOrder";
    const FIELDS: &'static [(&'static str, AbiType)] = &[
        ("workerpool", AbiType::Address),
        ("workerpoolprice", AbiType::Uint256),
        ("volume", AbiType::Uint256),
        ("tag", AbiType::Bytes32),
        ("category", AbiType::Uint256),
        ("trust", AbiType::Uint256),
        ("apprestrict", AbiType::Address),
        ("datasetrestrict", AbiType::Address),
        ("requesterrestrict", AbiType::Address),
    ];

    fn canonical_fields(&self) -> BTreeMap<&'static str, CanonicalValue> {
        BTreeMap::from([
            ("workerpool", CanonicalValue::Address(self.workerpool)),
            ("workerpoolprice", CanonicalValue::Uint(self.workerpoolprice)),
            ("volume", CanonicalValue::Uint(self.volume)),
            ("tag", CanonicalValue::Bytes32(self.tag.to_bytes32())),
            ("category", CanonicalValue::Uint(self.category)),
            ("trust", CanonicalValue::Uint(self.trust)),
            ("apprestrict", CanonicalValue::Address(self.apprestrict)),
            ("datasetrestrict", CanonicalValue::Address(self.datasetrestrict)),
            ("requesterrestrict", CanonicalValue::Address(self.requesterrestrict)),
        ])
    }

    fn to_typed(&self, salt: &Salt) -> typed::WorkerpoolOrder {
        typed::WorkerpoolOrder {
            workerpool: self.workerpool,
            workerpoolprice: self.workerpoolprice,
            volume: self.volume,
            tag: self.tag.to_bytes32(),
            category: self.category,
            trust: self.trust,
            apprestrict: self.apprestrict,
            datasetrestrict: self.datasetrestrict,
            requesterrestrict: self.requesterrestrict,
            salt: salt.as_b256(),
        }
    }

    fn volume(&self) -> U256 {
        self.volume
    }

    fn tag(&self) -> Tag {
        self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_defaults_to_one() {
        let order = WorkerpoolOrder::builder()
            .set_workerpool(Address::repeat_byte(0x03))
            .set_category(U256::from(2))
            .build()
            .unwrap();

        assert_eq!(order.volume(), U256::from(1));
        assert_eq!(order.category(), U256::from(2));
        assert_eq!(order.trust(), U256::ZERO);
    }
}

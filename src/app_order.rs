use super::error::ValidationError;
use super::order::{
    AbiType, AddressLike, CanonicalValue, Order, Salt, UNLIMITED_VOLUME, require_address,
};
use super::tag::Tag;
use super::typed;
use alloy::primitives::{Address, U256};
use std::collections::BTreeMap;

/// Offer to run an application at a unit price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppOrder {
    app: Address,
    appprice: U256,
    volume: U256,
    tag: Tag,
    datasetrestrict: Address,
    workerpoolrestrict: Address,
    requesterrestrict: Address,
}

#[derive(Debug, Default)]
pub struct AppOrderBuilder {
    app: AddressLike,
    appprice: U256,
    volume: Option<U256>,
    tag: Tag,
    datasetrestrict: AddressLike,
    workerpoolrestrict: AddressLike,
    requesterrestrict: AddressLike,
}

impl AppOrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_app(mut self, app: impl Into<AddressLike>) -> Self {
        self.app = app.into();
        self
    }
    pub fn set_price(mut self, price: U256) -> Self {
        self.appprice = price;
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
    pub fn set_dataset_restrict(mut self, restrict: impl Into<AddressLike>) -> Self {
        self.datasetrestrict = restrict.into();
        self
    }
    pub fn set_workerpool_restrict(mut self, restrict: impl Into<AddressLike>) -> Self {
        self.workerpoolrestrict = restrict.into();
        self
    }
    pub fn set_requester_restrict(mut self, restrict: impl Into<AddressLike>) -> Self {
        self.requesterrestrict = restrict.into();
        self
    }
    pub fn build(self) -> Result<AppOrder, ValidationError> {
        Ok(AppOrder {
            app: require_address(&self.app, "app")?,
            appprice: self.appprice,
            volume: self.volume.unwrap_or(UNLIMITED_VOLUME),
            tag: self.tag,
            datasetrestrict: self.datasetrestrict.resolve(),
            workerpoolrestrict: self.workerpoolrestrict.resolve(),
            requesterrestrict: self.requesterrestrict.resolve(),
        })
    }
}

impl AppOrder {
    pub fn builder() -> AppOrderBuilder {
        AppOrderBuilder::new()
    }
    pub fn app(&self) -> Address {
        self.app
    }
    pub fn price(&self) -> U256 {
        self.appprice
    }
    pub fn dataset_restrict(&self) -> Address {
        self.datasetrestrict
    }
    pub fn workerpool_restrict(&self) -> Address {
        self.workerpoolrestrict
    }
    pub fn requester_restrict(&self) -> Address {
        self.requesterrestrict
    }
}

impl Order for AppOrder {
    type Typed = typed::AppOrder;

    const KIND: &'static str = "app";
    const PRIMARY_TYPE: &'static str = "AppOrder";
    const FIELDS: &'static [(&'static str, AbiType)] = &[
        ("app", AbiType::Address),
        ("appprice", AbiType::Uint256),
        ("volume", AbiType::Uint256),
        ("tag", AbiType::Bytes32),
        ("datasetrestrict", AbiType::Address),
        ("workerpoolrestrict", AbiType::Address),
        ("requesterrestrict", AbiType::Address),
    ];

    fn canonical_fields(&self) -> BTreeMap<&'static str, CanonicalValue> {
        BTreeMap::from([
            ("app", CanonicalValue::Address(self.app)),
            ("appprice", CanonicalValue::Uint(self.appprice)),
            ("volume", CanonicalValue::Uint(self.volume)),
            ("tag", CanonicalValue::Bytes32(self.tag.to_bytes32())),
            ("datasetrestrict", CanonicalValue::Address(self.datasetrestrict)),
            ("workerpoolrestrict", CanonicalValue::Address(self.workerpoolrestrict)),
            ("requesterrestrict", CanonicalValue::Address(self.requesterrestrict)),
        ])
    }

    fn to_typed(&self, salt: &Salt) -> typed::AppOrder {
        typed::AppOrder {
            app: self.app,
            appprice: self.appprice,
            volume: self.volume,
            tag: self.tag.to_bytes32(),
            datasetrestrict: self.datasetrestrict,
            workerpoolrestrict: self.workerpoolrestrict,
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
    fn defaults_apply() {
        let order = AppOrder::builder()
            .set_app(Address::repeat_byte(0x01))
            .build()
            .unwrap();

        assert_eq!(order.volume(), UNLIMITED_VOLUME);
        assert_eq!(order.tag(), Tag::NONE);
        assert_eq!(order.price(), U256::ZERO);
        assert_eq!(order.requester_restrict(), Address::ZERO);
    }

    #[test]
    fn app_is_required() {
        assert_eq!(
            AppOrder::builder().build(),
            Err(ValidationError::MissingField("app"))
        );
    }
}

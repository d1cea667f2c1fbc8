use super::error::ValidationError;
use super::order::{
    AbiType, AddressLike, CanonicalValue, Order, Salt, UNLIMITED_VOLUME, require_address,
};
use super::tag::Tag;
use super::typed;
use alloy::primitives::{Address, U256};
use std::collections::BTreeMap;

/// Offer to license a dataset at a unit price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetOrder {
    dataset: Address,
    datasetprice: U256,
    volume: U256,
    tag: Tag,
    apprestrict: Address,
    workerpoolrestrict: Address,
    requesterrestrict: Address,
}

#[derive(Debug, Default)]
pub struct DatasetOrderBuilder {
    dataset: AddressLike,
    datasetprice: U256,
    volume: Option<U256>,
    tag: Tag,
    apprestrict: AddressLike,
    workerpoolrestrict: AddressLike,
    requesterrestrict: AddressLike,
}

impl DatasetOrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_dataset(mut self, dataset: impl Into<AddressLike>) -> Self {
        self.dataset = dataset.into();
        self
    }
    pub fn set_price(mut self, price: U256) -> Self {
        self.datasetprice = price;
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
    pub fn set_app_restrict(mut self, restrict: impl Into<AddressLike>) -> Self {
        self.apprestrict = restrict.into();
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
    pub fn build(self) -> Result<DatasetOrder, ValidationError> {
        Ok(DatasetOrder {
            dataset: require_address(&self.dataset, "dataset")?,
            datasetprice: self.datasetprice,
            volume: self.volume.unwrap_or(UNLIMITED_VOLUME),
            tag: self.tag,
            apprestrict: self.apprestrict.resolve(),
            workerpoolrestrict: self.workerpoolrestrict.resolve(),
            requesterrestrict: self.requesterrestrict.resolve(),
        })
    }
}

impl DatasetOrder {
    pub fn builder() -> DatasetOrderBuilder {
        DatasetOrderBuilder::new()
    }
    pub fn dataset(&self) -> Address {
        self.dataset
    }
    pub fn price(&self) -> U256 {
        self.datasetprice
    }
    pub fn app_restrict(&self) -> Address {
        self.apprestrict
    }
    pub fn workerpool_restrict(&self) -> Address {
        self.workerpoolrestrict
    }
    pub fn requester_restrict(&self) -> Address {
        self.requesterrestrict
    }
}

impl Order for DatasetOrder {
    type Typed = typed::DatasetOrder;

    const KIND: &'static str = "dataset";
    const PRIMARY_TYPE: &'static str = "DatasetOrder";
    const FIELDS: &'static [(&'static str, AbiType)] = &[
        ("dataset", AbiType::Address),
        ("datasetprice", AbiType::Uint256),
        ("volume", AbiType::Uint256),
        ("tag", AbiType::Bytes32),
        ("apprestrict", AbiType::Address),
        ("workerpoolrestrict", AbiType::Address),
        ("requesterrestrict", AbiType::Address),
    ];

    fn canonical_fields(&self) -> BTreeMap<&'static str, CanonicalValue> {
        BTreeMap::from([
            ("dataset", CanonicalValue::Address(self.dataset)),
            ("datasetprice", CanonicalValue::Uint(self.datasetprice)),
            ("volume", CanonicalValue::Uint(self.volume)),
            ("tag", CanonicalValue::Bytes32(self.tag.to_bytes32())),
            ("apprestrict", CanonicalValue::Address(self.apprestrict)),
            ("workerpoolrestrict", CanonicalValue::Address(self.workerpoolrestrict)),
            ("requesterrestrict", CanonicalValue::Address(self.requesterrestrict)),
        ])
    }

    fn to_typed(&self, salt: &Salt) -> typed::DatasetOrder {
        typed::DatasetOrder {
            dataset: self.dataset,
            datasetprice: self.datasetprice,
            volume: self.volume,
            tag: self.tag.to_bytes32(),
            apprestrict: self.apprestrict,
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

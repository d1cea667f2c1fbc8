use super::error::ValidationError;
use super::order::{AbiType, AddressLike, CanonicalValue, Order, Salt, require, require_address};
use super::request_params::RequestParameters;
use super::tag::Tag;
use super::typed;
use alloy::primitives::{Address, U256};
use std::collections::BTreeMap;

/// Demand for executions of an app, optionally on a dataset and workerpool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrder {
    app: Address,
    appmaxprice: U256,
    dataset: Address,
    datasetmaxprice: U256,
    workerpool: Address,
    workerpoolmaxprice: U256,
    requester: Address,
    volume: U256,
    tag: Tag,
    category: U256,
    trust: U256,
    beneficiary: Address,
    callback: Address,
    params: RequestParameters,
    params_json: String, // canonical form, fixed at build
}

#[derive(Debug, Default)]
pub struct RequestOrderBuilder {
    app: AddressLike,
    appmaxprice: U256,
    dataset: AddressLike,
    datasetmaxprice: U256,
    workerpool: AddressLike,
    workerpoolmaxprice: U256,
    requester: AddressLike,
    volume: Option<U256>,
    tag: Tag,
    category: U256,
    trust: U256,
    beneficiary: AddressLike,
    callback: AddressLike,
    params: Option<RequestParameters>,
}

impl RequestOrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_app(mut self, app: impl Into<AddressLike>) -> Self {
        self.app = app.into();
        self
    }
    pub fn set_app_max_price(mut self, price: U256) -> Self {
        self.appmaxprice = price;
        self
    }
    pub fn set_dataset(mut self, dataset: impl Into<AddressLike>) -> Self {
        self.dataset = dataset.into();
        self
    }
    pub fn set_dataset_max_price(mut self, price: U256) -> Self {
        self.datasetmaxprice = price;
        self
    }
    pub fn set_workerpool(mut self, workerpool: impl Into<AddressLike>) -> Self {
        self.workerpool = workerpool.into();
        self
    }
    pub fn set_workerpool_max_price(mut self, price: U256) -> Self {
        self.workerpoolmaxprice = price;
        self
    }
    pub fn set_requester(mut self, requester: impl Into<AddressLike>) -> Self {
        self.requester = requester.into();
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
    pub fn set_beneficiary(mut self, beneficiary: impl Into<AddressLike>) -> Self {
        self.beneficiary = beneficiary.into();
        self
    }
    pub fn set_callback(mut self, callback: impl Into<AddressLike>) -> Self {
        self.callback = callback.into();
        self
    }
    pub fn set_params(mut self, params: RequestParameters) -> Self {
        self.params = Some(params);
        self
    }
    /// Beneficiary falls back to the requester.
    pub fn build(self) -> Result<RequestOrder, ValidationError> {
        let requester = require_address(&self.requester, "requester")?;
        let beneficiary = if self.beneficiary.is_none() {
            requester
        } else {
            self.beneficiary.resolve()
        };
        let app = require_address(&self.app, "app")?;
        let params = require(self.params, "params")?;
        let params_json = params.canonical_serialize()?;

        Ok(RequestOrder {
            app,
            appmaxprice: self.appmaxprice,
            dataset: self.dataset.resolve(),
            datasetmaxprice: self.datasetmaxprice,
            workerpool: self.workerpool.resolve(),
            workerpoolmaxprice: self.workerpoolmaxprice,
            requester,
            volume: self.volume.unwrap_or(U256::from(1)),
            tag: self.tag,
            category: self.category,
            trust: self.trust,
            beneficiary,
            callback: self.callback.resolve(),
            params,
            params_json,
        })
    }
}

impl RequestOrder {
    pub fn builder() -> RequestOrderBuilder {
        RequestOrderBuilder::new()
    }
    pub fn app(&self) -> Address {
        self.app
    }
    pub fn app_max_price(&self) -> U256 {
        self.appmaxprice
    }
    pub fn dataset(&self) -> Address {
        self.dataset
    }
    pub fn dataset_max_price(&self) -> U256 {
        self.datasetmaxprice
    }
    pub fn workerpool(&self) -> Address {
        self.workerpool
    }
    pub fn workerpool_max_price(&self) -> U256 {
        self.workerpoolmaxprice
    }
    pub fn requester(&self) -> Address {
        self.requester
    }
    pub fn category(&self) -> U256 {
        self.category
    }
    pub fn trust(&self) -> U256 {
        self.trust
    }
    pub fn beneficiary(&self) -> Address {
        self.beneficiary
    }
    pub fn callback(&self) -> Address {
        self.callback
    }
    pub fn params(&self) -> &RequestParameters {
        &self.params
    }
}

impl Order for RequestOrder {
    type Typed = typed::RequestOrder;

    const KIND: &'static str = "request";
    const PRIMARY_TYPE: &'static str = "RequestOrder";
    const FIELDS: &'static [(&'static str, AbiType)] = &[
        ("app", AbiType::Address),
        ("appmaxprice", AbiType::Uint256),
        ("dataset", AbiType::Address),
        ("datasetmaxprice", AbiType::Uint256),
        ("workerpool", AbiType::Address),
        ("workerpoolmaxprice", AbiType::Uint256),
        ("requester", AbiType::Address),
        ("volume", AbiType::Uint256),
        ("tag", AbiType::Bytes32),
        ("category", AbiType::Uint256),
        ("trust", AbiType::Uint256),
        ("beneficiary", AbiType::Address),
        ("callback", AbiType::Address),
        ("params", AbiType::String),
    ];

    fn canonical_fields(&self) -> BTreeMap<&'static str, CanonicalValue> {
        BTreeMap::from([
            ("app", CanonicalValue::Address(self.app)),
            ("appmaxprice", CanonicalValue::Uint(self.appmaxprice)),
            ("dataset", CanonicalValue::Address(self.dataset)),
            ("datasetmaxprice", CanonicalValue::Uint(self.datasetmaxprice)),
            ("workerpool", CanonicalValue::Address(self.workerpool)),
            ("workerpoolmaxprice", CanonicalValue::Uint(self.workerpoolmaxprice)),
            ("requester", CanonicalValue::Address(self.requester)),
            ("volume", CanonicalValue::Uint(self.volume)),
            ("tag", CanonicalValue::Bytes32(self.tag.to_bytes32())),
            ("category", CanonicalValue::Uint(self.category)),
            ("trust", CanonicalValue::Uint(self.trust)),
            ("beneficiary", CanonicalValue::Address(self.beneficiary)),
            ("callback", CanonicalValue::Address(self.callback)),
            ("params", CanonicalValue::String(self.params_json.clone())),
        ])
    }

    fn to_typed(&self, salt: &Salt) -> typed::RequestOrder {
        typed::RequestOrder {
            app: self.app,
            appmaxprice: self.appmaxprice,
            dataset: self.dataset,
            datasetmaxprice: self.datasetmaxprice,
            workerpool: self.workerpool,
            workerpoolmaxprice: self.workerpoolmaxprice,
            requester: self.requester,
            volume: self.volume,
            tag: self.tag.to_bytes32(),
            category: self.category,
            trust: self.trust,
            beneficiary: self.beneficiary,
            callback: self.callback,
            params: self.params_json.clone(),
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
    use crate::request_params::StorageProvider;

    fn params() -> RequestParameters {
        RequestParameters::new(StorageProvider::Ipfs, "https://result.proxy").unwrap()
    }

    #[test]
    fn beneficiary_defaults_to_requester() {
        let requester = Address::repeat_byte(0x0a);
        let order = RequestOrder::builder()
            .set_app(Address::repeat_byte(0x01))
            .set_requester(requester)
            .set_params(params())
            .build()
            .unwrap();

        assert_eq!(order.beneficiary(), requester);
        assert_eq!(order.dataset(), Address::ZERO);
        assert_eq!(order.workerpool(), Address::ZERO);
        assert_eq!(order.volume(), U256::from(1));
    }

    #[test]
    fn params_are_projected_canonically() {
        let order = RequestOrder::builder()
            .set_app(Address::repeat_byte(0x01))
            .set_requester(Address::repeat_byte(0x0a))
            .set_params(params())
            .build()
            .unwrap();

        assert_eq!(
            order.canonical_fields().get("params"),
            Some(&CanonicalValue::String(params().canonical_serialize().unwrap()))
        );
    }

    #[test]
    fn hashed_params_string_is_fixed_at_build() {
        let params = params().with_args("--threads 4");
        let order = RequestOrder::builder()
            .set_app(Address::repeat_byte(0x01))
            .set_requester(Address::repeat_byte(0x0a))
            .set_params(params.clone())
            .build()
            .unwrap();

        let typed = order.to_typed(&Salt::from(alloy::primitives::B256::ZERO));
        assert_eq!(typed.params, params.canonical_serialize().unwrap());
        assert!(!typed.params.is_empty());
    }

    #[test]
    fn requester_and_params_are_required() {
        let missing_requester = RequestOrder::builder()
            .set_app(Address::repeat_byte(0x01))
            .set_params(params())
            .build();
        let missing_params = RequestOrder::builder()
            .set_app(Address::repeat_byte(0x01))
            .set_requester(Address::repeat_byte(0x0a))
            .build();

        assert_eq!(missing_requester, Err(ValidationError::MissingField("requester")));
        assert_eq!(missing_params, Err(ValidationError::MissingField("params")));
    }
}

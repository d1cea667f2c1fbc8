//! Smoke Screen Unit tests for the order library components
//!
//! These tests span the codebase and check each component in isolation,
//! mostly along the happy path. Matching scenarios live in `scenarios.rs`.

use alloy::primitives::{Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolStruct;
use poco_orders::{
    AppOrder, DatasetOrder, Domain, Order, RequestOrder, RequestParameters, Salt, Tag,
    WorkerpoolOrder,
    error::ValidationError,
    ids,
    order::{CanonicalValue, OrderSignature, VerifyRequest},
    request_params::StorageProvider,
    signer::TypedDataSigner,
    snapshot::{DealSnapshot, ResourceRef, TimeStamp},
    typed,
};

const OWNER_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const OTHER_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

fn domain() -> Domain {
    Domain::new("iExecODB", "5.0.0", 134, Address::repeat_byte(0xee))
}

fn salt() -> Salt {
    Salt::from(B256::repeat_byte(0x5a))
}

fn signer(key: &str) -> PrivateKeySigner {
    key.parse().unwrap()
}

fn app_order() -> AppOrder {
    AppOrder::builder()
        .set_app(Address::repeat_byte(0x01))
        .set_price(U256::from(5))
        .set_volume(U256::from(100))
        .set_tag(Tag::TEE)
        .build()
        .unwrap()
}

fn request_order() -> RequestOrder {
    RequestOrder::builder()
        .set_app(Address::repeat_byte(0x01))
        .set_app_max_price(U256::from(5))
        .set_workerpool_max_price(U256::from(10))
        .set_requester(Address::repeat_byte(0x0a))
        .set_category(U256::from(1))
        .set_params(
            RequestParameters::new(StorageProvider::Ipfs, "https://result.proxy/")
                .unwrap()
                .with_args("hello world"),
        )
        .build()
        .unwrap()
}

fn encode_type(primary: &str, fields: &[(&str, poco_orders::order::AbiType)]) -> String {
    let body: Vec<String> = fields
        .iter()
        .map(|(name, kind)| format!("{} {}", kind.as_str(), name))
        .collect();
    format!("{}({})", primary, body.join(","))
}

// TYPE TABLE TESTS
#[cfg(test)]
mod type_table_tests {
    use super::*;

    /// The field tables must match the contract struct definitions exactly,
    /// salt included as the last member.
    #[test]
    fn field_tables_match_typed_structs() {
        assert_eq!(
            encode_type(AppOrder::PRIMARY_TYPE, &AppOrder::salted_fields()),
            typed::AppOrder::eip712_encode_type()
        );
        assert_eq!(
            encode_type(DatasetOrder::PRIMARY_TYPE, &DatasetOrder::salted_fields()),
            typed::DatasetOrder::eip712_encode_type()
        );
        assert_eq!(
            encode_type(WorkerpoolOrder::PRIMARY_TYPE, &WorkerpoolOrder::salted_fields()),
            typed::WorkerpoolOrder::eip712_encode_type()
        );
        assert_eq!(
            encode_type(RequestOrder::PRIMARY_TYPE, &RequestOrder::salted_fields()),
            typed::RequestOrder::eip712_encode_type()
        );
    }

    /// Salt is always appended last
    #[test]
    fn salt_is_last_field() {
        let fields = RequestOrder::salted_fields();
        assert_eq!(fields.last().map(|(name, _)| *name), Some("salt"));
        assert_eq!(fields.len(), RequestOrder::FIELDS.len() + 1);
    }
}

// ORDER TESTS
#[cfg(test)]
mod order_tests {
    use super::*;

    /// Tag is projected to its bytes32 form
    #[test]
    fn canonical_fields_project_tag() {
        let fields = app_order().canonical_fields();

        assert_eq!(
            fields.get("tag"),
            Some(&CanonicalValue::Bytes32(Tag::TEE.to_bytes32()))
        );
        assert_eq!(fields.len(), AppOrder::FIELDS.len());
    }

    /// Hashing is deterministic and sensitive to domain and salt
    #[test]
    fn hash_is_deterministic() {
        let order = app_order();
        let first = order.hash(&domain(), &salt());
        let second = order.hash(&domain(), &salt());

        assert_eq!(first, second);
        assert_ne!(first, order.hash(&domain(), &Salt::from(B256::ZERO)));
        assert_ne!(first, order.hash(&Domain::bellecour(), &salt()));
    }

    /// Malformed salts never reach the hash
    #[test]
    fn malformed_salt_is_rejected() {
        assert!(matches!(
            "0xdeadbeef".parse::<Salt>(),
            Err(ValidationError::InvalidSalt(_))
        ));
    }

    /// Without signer the placeholder signature is produced
    #[test]
    fn unsigned_order_gets_placeholder() {
        let signature = app_order().sign(&domain(), &salt(), None).unwrap();
        assert_eq!(signature, OrderSignature::NONE);
    }

    /// Signature verifies against the signer and nobody else
    #[test]
    fn sign_then_verify() {
        let owner = signer(OWNER_KEY);
        let other = signer(OTHER_KEY);
        let order = request_order();

        let signature = order.sign(&domain(), &salt(), Some(&owner)).unwrap();

        assert!(order.verify(
            &domain(),
            &salt(),
            VerifyRequest::signed_by(&signature, TypedDataSigner::address(&owner))
        ));
        assert!(!order.verify(
            &domain(),
            &salt(),
            VerifyRequest::signed_by(&signature, TypedDataSigner::address(&other))
        ));
        assert!(!order.verify(
            &Domain::bellecour(),
            &salt(),
            VerifyRequest::signed_by(&signature, TypedDataSigner::address(&owner))
        ));
    }

    /// verify returns false when asked nothing
    #[test]
    fn verify_without_checks_is_false() {
        assert!(!app_order().verify(&domain(), &salt(), VerifyRequest::default()));
    }

    /// Hash check alone, and combined with a signature check
    #[test]
    fn verify_expected_hash() {
        let owner = signer(OWNER_KEY);
        let order = app_order();
        let hash = order.hash(&domain(), &salt());
        let signature = order.sign(&domain(), &salt(), Some(&owner)).unwrap();

        assert!(order.verify(&domain(), &salt(), VerifyRequest::hash(hash)));
        assert!(!order.verify(&domain(), &salt(), VerifyRequest::hash(B256::ZERO)));

        let both = VerifyRequest {
            signature: Some(&signature),
            signer: Some(TypedDataSigner::address(&owner)),
            expected_hash: Some(B256::ZERO),
        };
        assert!(!order.verify(&domain(), &salt(), both));
    }

    /// The placeholder signature never verifies
    #[test]
    fn placeholder_never_verifies() {
        let owner = signer(OWNER_KEY);
        assert!(!app_order().verify(
            &domain(),
            &salt(),
            VerifyRequest::signed_by(&OrderSignature::NONE, TypedDataSigner::address(&owner))
        ));
    }

    /// Match arguments are the field values, then salt, then signature
    #[test]
    fn match_arguments_layout() {
        let owner = signer(OWNER_KEY);
        let order = app_order();
        let args = order.match_arguments(&domain(), &salt(), Some(&owner)).unwrap();

        assert_eq!(args.len(), AppOrder::FIELDS.len() + 2);
        assert_eq!(args[0], CanonicalValue::Address(Address::repeat_byte(0x01)));
        assert_eq!(args[1], CanonicalValue::Uint(U256::from(5)));
        assert_eq!(args[7], CanonicalValue::Bytes32(salt().as_b256()));
        match &args[8] {
            CanonicalValue::Bytes(bytes) => assert_eq!(bytes.len(), 65),
            other => panic!("unexpected signature value {other:?}"),
        }
    }

    /// The typed data document carries domain, types and message
    #[test]
    fn typed_data_json_shape() {
        let payload = app_order().typed_data(&domain(), &salt());
        let json = payload.to_json();

        assert_eq!(json["primaryType"], "AppOrder");
        assert_eq!(json["domain"]["chainId"], 134);
        assert_eq!(json["types"]["AppOrder"].as_array().unwrap().len(), 8);
        assert_eq!(json["message"]["appprice"], "5");
        assert_eq!(json["message"]["salt"], salt().to_string());
        assert_eq!(payload.signing_hash, app_order().hash(&domain(), &salt()));
    }

    /// Signed orders keep salt and signature together
    #[test]
    fn signed_order_verifies_owner() {
        let owner = signer(OWNER_KEY);
        let signed = app_order()
            .sign_order(&domain(), salt(), Some(&owner))
            .unwrap();

        assert!(signed.is_signed());
        assert!(signed.verify_signer(&domain(), TypedDataSigner::address(&owner)));
        assert_eq!(signed.hash(&domain()), app_order().hash(&domain(), &salt()));
    }
}

// IDENTIFIER TESTS
#[cfg(test)]
mod ids_tests {
    use super::*;

    fn deal(bot_first: u64, bot_size: u64) -> DealSnapshot {
        DealSnapshot {
            deal_id: B256::repeat_byte(0xd1),
            app: ResourceRef::default(),
            dataset: ResourceRef::default(),
            workerpool: ResourceRef::default(),
            trust: U256::ZERO,
            category: U256::ZERO,
            tag: Tag::NONE,
            requester: Address::ZERO,
            beneficiary: Address::ZERO,
            callback: Address::ZERO,
            params: String::new(),
            start_time: TimeStamp::from_unix(0).unwrap(),
            bot_first: U256::from(bot_first),
            bot_size: U256::from(bot_size),
            worker_stake: U256::ZERO,
            scheduler_reward_ratio: U256::ZERO,
        }
    }

    /// Index bound is the batch size
    #[test]
    fn task_index_bound() {
        let deal = deal(0, 5);

        assert!(ids::task_id_at(&deal, 4).is_ok());
        assert_eq!(
            ids::task_id_at(&deal, 5),
            Err(ValidationError::OutOfBoundsTaskIndex {
                index: 5,
                batch_size: U256::from(5)
            })
        );
    }

    /// Relative indices are shifted by the first index of the batch
    #[test]
    fn task_index_is_absolute() {
        let deal = deal(3, 2);

        assert_eq!(
            ids::task_id_at(&deal, 1).unwrap(),
            ids::task_id(deal.deal_id, U256::from(4))
        );
        assert_eq!(
            deal.task_ids().collect::<Vec<_>>(),
            vec![
                ids::task_id(deal.deal_id, U256::from(3)),
                ids::task_id(deal.deal_id, U256::from(4)),
            ]
        );
    }

    /// A corrupt batch size does not allocate the whole batch up front
    #[test]
    fn huge_batch_is_listed_lazily() {
        let mut deal = deal(0, 0);
        deal.bot_size = U256::MAX;

        let first: Vec<B256> = deal.task_ids().take(2).collect();

        assert_eq!(
            first,
            vec![
                ids::task_id(deal.deal_id, U256::ZERO),
                ids::task_id(deal.deal_id, U256::from(1)),
            ]
        );
    }
}

// REQUEST PARAMETERS TESTS
#[cfg(test)]
mod request_params_tests {
    use super::*;

    /// Re-serializing the canonical form is byte identical
    #[test]
    fn canonical_form_is_idempotent() {
        let params = RequestParameters::new(StorageProvider::Dropbox, "https://proxy.io///")
            .unwrap()
            .with_secrets(["alpha", "beta"]);

        let first = params.canonical_serialize().unwrap();
        let second = RequestParameters::parse(&first).unwrap().canonical_serialize().unwrap();

        assert_eq!(first, second);
    }

    /// A JSON string holding the object is accepted as well
    #[test]
    fn accepts_stringified_json() {
        let inner = r#"{"iexec_result_storage_provider":"ipfs","iexec_result_storage_proxy":"https://p.io"}"#;
        let params = RequestParameters::from_value(serde_json::Value::String(inner.into())).unwrap();

        assert_eq!(params.canonical_serialize().unwrap(), inner);
    }

    /// Changing only the proxy slash does not change the request hash
    #[test]
    fn trailing_slash_does_not_change_hash() {
        let with_slash = request_order();
        let without_slash = RequestOrder::builder()
            .set_app(Address::repeat_byte(0x01))
            .set_app_max_price(U256::from(5))
            .set_workerpool_max_price(U256::from(10))
            .set_requester(Address::repeat_byte(0x0a))
            .set_category(U256::from(1))
            .set_params(
                RequestParameters::new(StorageProvider::Ipfs, "https://result.proxy")
                    .unwrap()
                    .with_args("hello world"),
            )
            .build()
            .unwrap();

        assert_eq!(
            with_slash.hash(&domain(), &salt()),
            without_slash.hash(&domain(), &salt())
        );
    }
}

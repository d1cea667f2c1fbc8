//! Off-chain side of the PoCo marketplace: builds, hashes, signs and verifies
//! the four order kinds, validates matches and derives deal and task ids.

pub mod app_order;
mod cbor;
pub mod chain;
pub mod config;
pub mod dataset_order;
pub mod domain;
pub mod error;
pub mod ids;
pub mod matching;
pub mod order;
pub mod request_order;
pub mod request_params;
pub mod service;
pub mod signer;
pub mod snapshot;
pub mod store;
pub mod tag;
pub mod typed;
pub mod workerpool_order;

pub use app_order::AppOrder;
pub use dataset_order::DatasetOrder;
pub use domain::Domain;
pub use order::{Order, Salt, SignedOrder};
pub use request_order::RequestOrder;
pub use request_params::RequestParameters;
pub use tag::Tag;
pub use workerpool_order::WorkerpoolOrder;

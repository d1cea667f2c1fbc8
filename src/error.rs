use alloy::primitives::U256;

/// Malformed input, raised at construction or parse time.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid tag: {0}")]
    InvalidTag(String),
    #[error("invalid salt, expected a 32 bytes hex string: {0}")]
    InvalidSalt(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid request params: {0}")]
    InvalidRequestParams(String),
    #[error("task index {index} is out of bounds for a batch of {batch_size}")]
    OutOfBoundsTaskIndex { index: u64, batch_size: U256 },
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

/// A match rejected by the validation pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("category mismatch: workerpool {workerpool} != request {request}")]
    CategoryMismatch { workerpool: U256, request: U256 },
    #[error("workerpool trust {workerpool} is below requested trust {request}")]
    InsufficientTrust { workerpool: U256, request: U256 },
    #[error("workerpool tag {provided} does not cover needed tag {needed}")]
    TagMismatch { needed: String, provided: String },
    #[error("tee is required by the request or dataset but missing from the app tag")]
    MissingTeeTag,
    #[error("{resource} price {price} exceeds request max price {max_price}")]
    PriceTooLow {
        resource: &'static str,
        price: U256,
        max_price: U256,
    },
    #[error("no volume left to match")]
    VolumeExhausted,
    #[error("requester stake {available} is below required lock {required}")]
    InsufficientRequesterStake { required: U256, available: U256 },
    #[error("workerpool owner stake {available} is below required lock {required}")]
    InsufficientWorkerpoolStake { required: U256, available: U256 },
    #[error("request {field} does not match the provided order")]
    ResourceMismatch { field: &'static str },
    #[error("{order} order {field} excludes this match")]
    RestrictionViolation {
        order: &'static str,
        field: &'static str,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum SignerError {
    #[error("typed data signing failed: {0}")]
    SigningFailed(String),
}

/// Failures of the match service that are neither validation nor policy.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{order} order signature does not match its owner")]
    InvalidSignature { order: &'static str },
    #[error("no owner known for {resource} {address}")]
    UnknownOwner {
        resource: &'static str,
        address: String,
    },
}

//! Match validation: compatibility and economic checks over a set of orders.
//!
//! Everything here is a pure function of the orders and of the consumed
//! volumes and stakes the caller fetched beforehand.
use super::app_order::AppOrder;
use super::dataset_order::DatasetOrder;
use super::error::MatchError;
use super::order::Order;
use super::request_order::RequestOrder;
use super::tag::Tag;
use super::workerpool_order::WorkerpoolOrder;
use alloy::primitives::{Address, U256};

pub const DEFAULT_WORKERPOOL_STAKE_RATIO: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Percentage of the workerpool price locked per matched unit.
    pub workerpool_stake_ratio: u64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            workerpool_stake_ratio: DEFAULT_WORKERPOOL_STAKE_RATIO,
        }
    }
}

/// Volumes already consumed on chain, per order hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumedVolumes {
    pub app: U256,
    pub dataset: U256,
    pub workerpool: U256,
    pub request: U256,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchInput<'a> {
    pub app: &'a AppOrder,
    pub dataset: Option<&'a DatasetOrder>,
    pub workerpool: &'a WorkerpoolOrder,
    pub request: &'a RequestOrder,
    pub consumed: ConsumedVolumes,
    pub requester_stake: U256,
    pub workerpool_owner_stake: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matched_volume: U256,
    pub requester_lock: U256,
    pub workerpool_lock: U256,
}

/// Runs the checks in order and stops at the first failure.
pub fn validate_match(input: &MatchInput<'_>, policy: &MatchPolicy) -> Result<MatchOutcome, MatchError> {
    let result = check_category(input)
        .and_then(|_| check_trust(input))
        .and_then(|_| check_tags(input))
        .and_then(|_| check_prices(input))
        .and_then(|_| matched_volume(input))
        .and_then(|volume| compute_locks(input, volume, policy));

    match &result {
        Ok(outcome) => tracing::debug!(
            volume = %outcome.matched_volume,
            requester_lock = %outcome.requester_lock,
            workerpool_lock = %outcome.workerpool_lock,
            "match accepted"
        ),
        Err(reason) => tracing::debug!(%reason, "match rejected"),
    }
    result
}

/// Resource links and restrictions, then the economic pipeline.
pub fn validate_match_strict(
    input: &MatchInput<'_>,
    policy: &MatchPolicy,
) -> Result<MatchOutcome, MatchError> {
    check_links(input).inspect_err(|reason| tracing::debug!(%reason, "match rejected"))?;
    validate_match(input, policy)
}

fn check_category(input: &MatchInput<'_>) -> Result<(), MatchError> {
    let (workerpool, request) = (input.workerpool.category(), input.request.category());
    if workerpool != request {
        return Err(MatchError::CategoryMismatch { workerpool, request });
    }
    Ok(())
}

fn check_trust(input: &MatchInput<'_>) -> Result<(), MatchError> {
    let (workerpool, request) = (input.workerpool.trust(), input.request.trust());
    if workerpool < request {
        return Err(MatchError::InsufficientTrust { workerpool, request });
    }
    Ok(())
}

fn check_tags(input: &MatchInput<'_>) -> Result<(), MatchError> {
    let dataset_tag = input.dataset.map_or(Tag::NONE, |d| d.tag());
    let app_tag = input.app.tag();
    let workerpool_tag = input.workerpool.tag();

    let needed = input.request.tag() | dataset_tag | app_tag;
    if !workerpool_tag.covers(needed) {
        return Err(MatchError::TagMismatch {
            needed: needed.to_string(),
            provided: workerpool_tag.to_string(),
        });
    }

    // tee asked by the requester or the dataset must be honoured by the app itself
    if (input.request.tag() | dataset_tag).has_tee() && !app_tag.has_tee() {
        return Err(MatchError::MissingTeeTag);
    }
    Ok(())
}

fn check_prices(input: &MatchInput<'_>) -> Result<(), MatchError> {
    let request = input.request;

    let app_price = input.app.price();
    if request.app_max_price() < app_price {
        return Err(MatchError::PriceTooLow {
            resource: "app",
            price: app_price,
            max_price: request.app_max_price(),
        });
    }

    let workerpool_price = input.workerpool.price();
    if request.workerpool_max_price() < workerpool_price {
        return Err(MatchError::PriceTooLow {
            resource: "workerpool",
            price: workerpool_price,
            max_price: request.workerpool_max_price(),
        });
    }

    if let Some(dataset) = input.dataset {
        if request.dataset_max_price() < dataset.price() {
            return Err(MatchError::PriceTooLow {
                resource: "dataset",
                price: dataset.price(),
                max_price: request.dataset_max_price(),
            });
        }
    }
    Ok(())
}

fn matched_volume(input: &MatchInput<'_>) -> Result<U256, MatchError> {
    let consumed = &input.consumed;
    let mut remaining = vec![
        input.app.volume().saturating_sub(consumed.app),
        input.workerpool.volume().saturating_sub(consumed.workerpool),
        input.request.volume().saturating_sub(consumed.request),
    ];
    if let Some(dataset) = input.dataset {
        remaining.push(dataset.volume().saturating_sub(consumed.dataset));
    }

    match remaining.into_iter().min() {
        Some(volume) if volume > U256::ZERO => Ok(volume),
        _ => Err(MatchError::VolumeExhausted),
    }
}

fn compute_locks(
    input: &MatchInput<'_>,
    volume: U256,
    policy: &MatchPolicy,
) -> Result<MatchOutcome, MatchError> {
    let dataset_price = input.dataset.map_or(U256::ZERO, |d| d.price());
    let workerpool_price = input.workerpool.price();

    let unit_cost = input
        .app
        .price()
        .saturating_add(dataset_price)
        .saturating_add(workerpool_price);
    let requester_lock = unit_cost.saturating_mul(volume);
    if input.requester_stake < requester_lock {
        return Err(MatchError::InsufficientRequesterStake {
            required: requester_lock,
            available: input.requester_stake,
        });
    }

    let workerpool_lock = workerpool_unit_lock(workerpool_price, policy.workerpool_stake_ratio)
        .and_then(|per_unit| per_unit.checked_mul(volume))
        .unwrap_or(U256::MAX);
    if input.workerpool_owner_stake < workerpool_lock {
        return Err(MatchError::InsufficientWorkerpoolStake {
            required: workerpool_lock,
            available: input.workerpool_owner_stake,
        });
    }

    Ok(MatchOutcome {
        matched_volume: volume,
        requester_lock,
        workerpool_lock,
    })
}

/// `floor(price * ratio / 100)` without the intermediate product, `None`
/// only when the lock itself does not fit.
fn workerpool_unit_lock(price: U256, ratio: u64) -> Option<U256> {
    let (hundreds, rest) = price.div_rem(U256::from(100));
    let ratio = U256::from(ratio);

    hundreds
        .checked_mul(ratio)?
        .checked_add(rest * ratio / U256::from(100))
}

fn restricts(restriction: Address, actual: Address) -> bool {
    restriction != Address::ZERO && restriction != actual
}

/// Every order must point at the others and accept them through its
/// restriction fields.
pub fn check_links(input: &MatchInput<'_>) -> Result<(), MatchError> {
    let request = input.request;
    let app = input.app;
    let workerpool = input.workerpool;
    let dataset_address = input.dataset.map_or(Address::ZERO, |d| d.dataset());
    let requester = request.requester();

    if request.app() != app.app() {
        return Err(MatchError::ResourceMismatch { field: "app" });
    }
    if request.dataset() != dataset_address {
        return Err(MatchError::ResourceMismatch { field: "dataset" });
    }
    if restricts(request.workerpool(), workerpool.workerpool()) {
        return Err(MatchError::ResourceMismatch { field: "workerpool" });
    }

    let violation = |order: &'static str, field: &'static str| {
        Err(MatchError::RestrictionViolation { order, field })
    };

    if restricts(app.dataset_restrict(), dataset_address) {
        return violation("app", "datasetrestrict");
    }
    if restricts(app.workerpool_restrict(), workerpool.workerpool()) {
        return violation("app", "workerpoolrestrict");
    }
    if restricts(app.requester_restrict(), requester) {
        return violation("app", "requesterrestrict");
    }

    if let Some(dataset) = input.dataset {
        if restricts(dataset.app_restrict(), app.app()) {
            return violation("dataset", "apprestrict");
        }
        if restricts(dataset.workerpool_restrict(), workerpool.workerpool()) {
            return violation("dataset", "workerpoolrestrict");
        }
        if restricts(dataset.requester_restrict(), requester) {
            return violation("dataset", "requesterrestrict");
        }
    }

    if restricts(workerpool.app_restrict(), app.app()) {
        return violation("workerpool", "apprestrict");
    }
    if restricts(workerpool.dataset_restrict(), dataset_address) {
        return violation("workerpool", "datasetrestrict");
    }
    if restricts(workerpool.requester_restrict(), requester) {
        return violation("workerpool", "requesterrestrict");
    }
    Ok(())
}

//! Service layer: gathers chain state for a set of signed orders and
//! validates the match before it is submitted
use super::app_order::AppOrder;
use super::chain::ChainReader;
use super::dataset_order::DatasetOrder;
use super::domain::Domain;
use super::error::ServiceError;
use super::ids;
use super::matching::{ConsumedVolumes, MatchInput, MatchOutcome, MatchPolicy, validate_match_strict};
use super::order::{CanonicalValue, Order, SignedOrder};
use super::request_order::RequestOrder;
use super::snapshot::{DealSnapshot, TaskSnapshot};
use super::workerpool_order::WorkerpoolOrder;
use alloy::primitives::{Address, B256};

/// A validated match, ready for submission.
#[derive(Debug, Clone)]
pub struct PreparedMatch {
    pub outcome: MatchOutcome,
    /// Id the hub will assign to the resulting deal.
    pub deal_id: B256,
    pub app_arguments: Vec<CanonicalValue>,
    pub dataset_arguments: Option<Vec<CanonicalValue>>,
    pub workerpool_arguments: Vec<CanonicalValue>,
    pub request_arguments: Vec<CanonicalValue>,
}

pub struct MatchService<R> {
    reader: R,
    domain: Domain,
    policy: MatchPolicy,
}

impl<R: ChainReader> MatchService<R> {
    pub fn new(reader: R, domain: Domain, policy: MatchPolicy) -> Self {
        Self {
            reader,
            domain,
            policy,
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    fn owner(&self, resource: &'static str, address: Address) -> anyhow::Result<Address> {
        self.reader.owner_of(address)?.ok_or_else(|| {
            ServiceError::UnknownOwner {
                resource,
                address: address.to_checksum(None),
            }
            .into()
        })
    }

    fn check_signature<O: Order>(&self, signed: &SignedOrder<O>, signer: Address) -> anyhow::Result<()> {
        if !signed.verify_signer(&self.domain, signer) {
            tracing::warn!(order = O::KIND, signer = %signer, "signature check failed");
            return Err(ServiceError::InvalidSignature { order: O::KIND }.into());
        }
        Ok(())
    }

    /// Verifies signatures, fetches consumed volumes and stakes, then runs
    /// the match validation.
    pub fn prepare_match(
        &self,
        app: &SignedOrder<AppOrder>,
        dataset: Option<&SignedOrder<DatasetOrder>>,
        workerpool: &SignedOrder<WorkerpoolOrder>,
        request: &SignedOrder<RequestOrder>,
    ) -> anyhow::Result<PreparedMatch> {
        let app_owner = self.owner("app", app.order.app())?;
        self.check_signature(app, app_owner)?;

        if let Some(dataset) = dataset {
            let dataset_owner = self.owner("dataset", dataset.order.dataset())?;
            self.check_signature(dataset, dataset_owner)?;
        }

        let workerpool_owner = self.owner("workerpool", workerpool.order.workerpool())?;
        self.check_signature(workerpool, workerpool_owner)?;

        let requester = request.order.requester();
        self.check_signature(request, requester)?;

        let request_hash = request.hash(&self.domain);
        let consumed = ConsumedVolumes {
            app: self.reader.consumed_volume(app.hash(&self.domain))?,
            dataset: match dataset {
                Some(d) => self.reader.consumed_volume(d.hash(&self.domain))?,
                None => Default::default(),
            },
            workerpool: self.reader.consumed_volume(workerpool.hash(&self.domain))?,
            request: self.reader.consumed_volume(request_hash)?,
        };

        let input = MatchInput {
            app: &app.order,
            dataset: dataset.map(|d| &d.order),
            workerpool: &workerpool.order,
            request: &request.order,
            consumed,
            requester_stake: self.reader.stake_of(requester)?,
            workerpool_owner_stake: self.reader.stake_of(workerpool_owner)?,
        };
        let outcome = validate_match_strict(&input, &self.policy)?;

        let deal_id = ids::deal_id(request_hash, consumed.request);
        tracing::info!(
            deal_id = hex::encode(deal_id),
            volume = %outcome.matched_volume,
            "match prepared"
        );

        Ok(PreparedMatch {
            outcome,
            deal_id,
            app_arguments: app.match_arguments(),
            dataset_arguments: dataset.map(|d| d.match_arguments()),
            workerpool_arguments: workerpool.match_arguments(),
            request_arguments: request.match_arguments(),
        })
    }

    pub fn show_deal(&self, deal_id: B256) -> anyhow::Result<Option<DealSnapshot>> {
        self.reader.deal(deal_id)
    }

    /// Task at `relative_index` of a known deal.
    pub fn show_task(&self, deal_id: B256, relative_index: u64) -> anyhow::Result<Option<TaskSnapshot>> {
        let Some(deal) = self.reader.deal(deal_id)? else {
            return Ok(None);
        };
        let task_id = ids::task_id_at(&deal, relative_index)?;
        self.reader.task(task_id)
    }
}

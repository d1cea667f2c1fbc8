//! Read access to hub state. Implementations own connections and retries.
use super::snapshot::{DealSnapshot, TaskSnapshot};
use alloy::primitives::{Address, B256, U256};

pub trait ChainReader {
    /// Volume already consumed for the order with this typed-data hash.
    fn consumed_volume(&self, order_hash: B256) -> anyhow::Result<U256>;

    /// Free stake of an account.
    fn stake_of(&self, account: Address) -> anyhow::Result<U256>;

    /// Owner of a registered app, dataset or workerpool.
    fn owner_of(&self, resource: Address) -> anyhow::Result<Option<Address>>;

    fn deal(&self, deal_id: B256) -> anyhow::Result<Option<DealSnapshot>>;

    fn task(&self, task_id: B256) -> anyhow::Result<Option<TaskSnapshot>>;
}

impl<R: ChainReader + ?Sized> ChainReader for &R {
    fn consumed_volume(&self, order_hash: B256) -> anyhow::Result<U256> {
        (**self).consumed_volume(order_hash)
    }

    fn stake_of(&self, account: Address) -> anyhow::Result<U256> {
        (**self).stake_of(account)
    }

    fn owner_of(&self, resource: Address) -> anyhow::Result<Option<Address>> {
        (**self).owner_of(resource)
    }

    fn deal(&self, deal_id: B256) -> anyhow::Result<Option<DealSnapshot>> {
        (**self).deal(deal_id)
    }

    fn task(&self, task_id: B256) -> anyhow::Result<Option<TaskSnapshot>> {
        (**self).task(task_id)
    }
}

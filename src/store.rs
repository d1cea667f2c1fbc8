//! Local mirror of hub state backed by sled
use super::chain::ChainReader;
use super::snapshot::{DealSnapshot, TaskSnapshot};
use alloy::primitives::{Address, B256, U256};
use sled::{Batch, Db, Tree};
use std::sync::Arc;

const DEALS: &str = "deals";
const TASKS: &str = "tasks";
const CONSUMED: &str = "consumed";
const STAKES: &str = "stakes";
const OWNERS: &str = "owners";

pub struct SnapshotStore {
    instance: Arc<Db>,
}

impl SnapshotStore {
    pub fn new(instance: Arc<Db>) -> Self {
        Self { instance }
    }

    fn tree(&self, name: &str) -> anyhow::Result<Tree> {
        Ok(self.instance.open_tree(name)?)
    }

    fn read_u256(&self, tree: &str, key: &[u8]) -> anyhow::Result<U256> {
        match self.tree(tree)?.get(key)? {
            Some(raw) => {
                let bytes: [u8; 32] = raw
                    .as_ref()
                    .try_into()
                    .map_err(|_| anyhow::anyhow!("corrupted {tree} entry"))?;
                Ok(U256::from_be_bytes(bytes))
            }
            None => Ok(U256::ZERO),
        }
    }

    /// Stores a deal along with the tasks already known for it.
    pub fn put_deal(&self, deal: &DealSnapshot, tasks: &[TaskSnapshot]) -> anyhow::Result<()> {
        self.tree(DEALS)?
            .insert(deal.deal_id.as_slice(), minicbor::to_vec(deal)?)?;

        let mut batch = Batch::default();
        for task in tasks {
            batch.insert(task.task_id.as_slice(), minicbor::to_vec(task)?);
        }
        self.tree(TASKS)?.apply_batch(batch)?;

        tracing::debug!(
            deal_id = hex::encode(deal.deal_id),
            tasks = tasks.len(),
            "stored deal snapshot"
        );
        Ok(())
    }

    pub fn put_task(&self, task: &TaskSnapshot) -> anyhow::Result<()> {
        self.tree(TASKS)?
            .insert(task.task_id.as_slice(), minicbor::to_vec(task)?)?;
        tracing::debug!(task_id = hex::encode(task.task_id), status = ?task.status, "stored task snapshot");
        Ok(())
    }

    pub fn record_consumed(&self, order_hash: B256, volume: U256) -> anyhow::Result<()> {
        self.tree(CONSUMED)?
            .insert(order_hash.as_slice(), &volume.to_be_bytes::<32>()[..])?;
        Ok(())
    }

    pub fn set_stake(&self, account: Address, stake: U256) -> anyhow::Result<()> {
        self.tree(STAKES)?
            .insert(account.as_slice(), &stake.to_be_bytes::<32>()[..])?;
        Ok(())
    }

    pub fn set_owner(&self, resource: Address, owner: Address) -> anyhow::Result<()> {
        self.tree(OWNERS)?.insert(resource.as_slice(), owner.as_slice())?;
        Ok(())
    }
}

impl ChainReader for SnapshotStore {
    fn consumed_volume(&self, order_hash: B256) -> anyhow::Result<U256> {
        self.read_u256(CONSUMED, order_hash.as_slice())
    }

    fn stake_of(&self, account: Address) -> anyhow::Result<U256> {
        self.read_u256(STAKES, account.as_slice())
    }

    fn owner_of(&self, resource: Address) -> anyhow::Result<Option<Address>> {
        let Some(raw) = self.tree(OWNERS)?.get(resource.as_slice())? else {
            return Ok(None);
        };
        let bytes: [u8; 20] = raw
            .as_ref()
            .try_into()
            .map_err(|_| anyhow::anyhow!("corrupted owner entry"))?;
        Ok(Some(Address::from(bytes)))
    }

    fn deal(&self, deal_id: B256) -> anyhow::Result<Option<DealSnapshot>> {
        match self.tree(DEALS)?.get(deal_id.as_slice())? {
            Some(raw) => Ok(Some(minicbor::decode(&raw)?)),
            None => Ok(None),
        }
    }

    fn task(&self, task_id: B256) -> anyhow::Result<Option<TaskSnapshot>> {
        match self.tree(TASKS)?.get(task_id.as_slice())? {
            Some(raw) => Ok(Some(minicbor::decode(&raw)?)),
            None => Ok(None),
        }
    }
}

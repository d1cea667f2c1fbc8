//! Read-only projections of deal and task state fetched from the chain
use super::error::ValidationError;
use super::ids;
use super::request_params::RequestParameters;
use super::tag::Tag;
use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, TimeZone, Utc};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn now() -> Self {
        Self(Utc::now())
    }
    /// Chain timestamps are whole seconds.
    pub fn from_unix(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(TimeStamp)
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.i64(self.0.timestamp())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let secs = d.i64()?;

        TimeStamp::from_unix(secs).ok_or(minicbor::decode::Error::message(
            "failed to convert timestamp to utc",
        ))
    }
}

/// A registry resource as referenced by a deal: pointer, owner, unit price.
#[derive(Debug, Clone, Default, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct ResourceRef {
    #[cbor(n(0), with = "crate::cbor::address")]
    pub pointer: Address,
    #[cbor(n(1), with = "crate::cbor::address")]
    pub owner: Address,
    #[cbor(n(2), with = "crate::cbor::u256")]
    pub price: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct DealSnapshot {
    #[cbor(n(0), with = "crate::cbor::b256")]
    pub deal_id: B256,
    #[n(1)]
    pub app: ResourceRef,
    #[n(2)]
    pub dataset: ResourceRef,
    #[n(3)]
    pub workerpool: ResourceRef,
    #[cbor(n(4), with = "crate::cbor::u256")]
    pub trust: U256,
    #[cbor(n(5), with = "crate::cbor::u256")]
    pub category: U256,
    #[n(6)]
    pub tag: Tag,
    #[cbor(n(7), with = "crate::cbor::address")]
    pub requester: Address,
    #[cbor(n(8), with = "crate::cbor::address")]
    pub beneficiary: Address,
    #[cbor(n(9), with = "crate::cbor::address")]
    pub callback: Address,
    #[n(10)]
    pub params: String, // raw string as stored by the hub
    #[n(11)]
    pub start_time: TimeStamp<Utc>,
    #[cbor(n(12), with = "crate::cbor::u256")]
    pub bot_first: U256,
    #[cbor(n(13), with = "crate::cbor::u256")]
    pub bot_size: U256,
    #[cbor(n(14), with = "crate::cbor::u256")]
    pub worker_stake: U256,
    #[cbor(n(15), with = "crate::cbor::u256")]
    pub scheduler_reward_ratio: U256,
}

impl DealSnapshot {
    pub fn has_dataset(&self) -> bool {
        self.dataset.pointer != Address::ZERO
    }

    pub fn request_params(&self) -> Result<RequestParameters, ValidationError> {
        RequestParameters::parse(&self.params)
    }

    /// Id of the task at `relative_index` within this deal's batch.
    pub fn task_id(&self, relative_index: u64) -> Result<B256, ValidationError> {
        ids::task_id_at(self, relative_index)
    }

    /// Ids of every task in the batch, in index order. Lazy, the batch size
    /// comes from chain data and is not trusted to be small.
    pub fn task_ids(&self) -> impl Iterator<Item = B256> + '_ {
        let size = u64::try_from(self.bot_size).unwrap_or(u64::MAX);
        (0..size).map(|i| ids::task_id(self.deal_id, self.bot_first.saturating_add(U256::from(i))))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub enum TaskStatus {
    #[n(0)]
    Unset,
    #[n(1)]
    Active,
    #[n(2)]
    Revealing,
    #[n(3)]
    Completed,
    #[n(4)]
    Failed,
}

impl TaskStatus {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TaskStatus::Unset),
            1 => Some(TaskStatus::Active),
            2 => Some(TaskStatus::Revealing),
            3 => Some(TaskStatus::Completed),
            4 => Some(TaskStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub enum TaskResult {
    #[n(0)]
    NoResult,
    #[n(1)]
    Ipfs {
        #[n(0)]
        location: String,
    },
}

impl TaskResult {
    /// Decodes the raw `results` bytes of a task.
    pub fn from_raw(raw: &[u8]) -> Self {
        match std::str::from_utf8(raw) {
            Ok(path) if path.starts_with("/ipfs/") => TaskResult::Ipfs {
                location: path.to_string(),
            },
            _ => TaskResult::NoResult,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct TaskSnapshot {
    #[cbor(n(0), with = "crate::cbor::b256")]
    pub task_id: B256,
    #[n(1)]
    pub status: TaskStatus,
    #[cbor(n(2), with = "crate::cbor::b256")]
    pub deal_id: B256,
    #[cbor(n(3), with = "crate::cbor::u256")]
    pub idx: U256, // absolute index within the deal
    #[n(4)]
    pub time_ref: TimeStamp<Utc>,
    #[n(5)]
    pub contribution_deadline: TimeStamp<Utc>,
    #[n(6)]
    pub reveal_deadline: TimeStamp<Utc>,
    #[n(7)]
    pub final_deadline: TimeStamp<Utc>,
    #[cbor(n(8), with = "crate::cbor::b256")]
    pub consensus_value: B256,
    #[n(9)]
    pub reveal_counter: u64,
    #[n(10)]
    pub winner_counter: u64,
    #[cbor(n(11), with = "crate::cbor::addresses")]
    pub contributors: Vec<Address>,
    #[n(12)]
    pub results: TaskResult,
}

impl TaskSnapshot {
    pub fn is_timed_out(&self, now: &TimeStamp<Utc>) -> bool {
        self.status != TaskStatus::Completed
            && now.to_datetime_utc() > self.final_deadline.to_datetime_utc()
    }
}

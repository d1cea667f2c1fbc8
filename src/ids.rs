//! Deal and task identifiers, as derived by the hub
use super::error::ValidationError;
use super::snapshot::DealSnapshot;
use alloy::primitives::{B256, U256, keccak256};
use alloy::sol_types::SolValue;

/// `keccak256(abi.encode(requestOrderHash, index))` where `index` is the
/// request order's consumed volume at match time.
pub fn deal_id(request_order_hash: B256, sequence_index: U256) -> B256 {
    keccak256((request_order_hash, sequence_index).abi_encode())
}

/// `keccak256(abi.encode(dealId, absoluteIndex))`.
pub fn task_id(deal_id: B256, absolute_index: U256) -> B256 {
    keccak256((deal_id, absolute_index).abi_encode())
}

pub fn task_id_at(deal: &DealSnapshot, relative_index: u64) -> Result<B256, ValidationError> {
    let relative = U256::from(relative_index);
    if relative >= deal.bot_size {
        return Err(ValidationError::OutOfBoundsTaskIndex {
            index: relative_index,
            batch_size: deal.bot_size,
        });
    }

    Ok(task_id(deal.deal_id, deal.bot_first.saturating_add(relative)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(word: B256, index: U256) -> B256 {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(word.as_slice());
        buf[32..].copy_from_slice(&index.to_be_bytes::<32>());
        keccak256(buf)
    }

    #[test]
    fn abi_encoding_is_two_words() {
        let hash = B256::repeat_byte(0x11);
        let index = U256::from(7);

        assert_eq!(deal_id(hash, index), packed(hash, index));
        assert_eq!(task_id(hash, index), packed(hash, index));
    }

    #[test]
    fn sequence_index_changes_deal_id() {
        let hash = B256::repeat_byte(0x42);
        assert_ne!(deal_id(hash, U256::ZERO), deal_id(hash, U256::from(1)));
    }
}

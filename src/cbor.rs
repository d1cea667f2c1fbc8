//! `#[cbor(with = ...)]` codecs for the alloy primitive types

use minicbor::decode::Error as DecodeError;
use minicbor::encode::{Error as EncodeError, Write};
use minicbor::{Decoder, Encoder};

fn fixed<const N: usize>(d: &mut Decoder<'_>) -> Result<[u8; N], DecodeError> {
    let bytes = d.bytes()?;
    <[u8; N]>::try_from(bytes).map_err(|_| DecodeError::message("unexpected byte length"))
}

pub mod address {
    use super::*;
    use alloy::primitives::Address;

    pub fn encode<C, W: Write>(
        v: &Address,
        e: &mut Encoder<W>,
        _: &mut C,
    ) -> Result<(), EncodeError<W::Error>> {
        e.bytes(v.as_slice())?.ok()
    }

    pub fn decode<C>(d: &mut Decoder<'_>, _: &mut C) -> Result<Address, DecodeError> {
        fixed::<20>(d).map(Address::from)
    }
}

pub mod addresses {
    use super::*;
    use alloy::primitives::Address;

    pub fn encode<C, W: Write>(
        v: &[Address],
        e: &mut Encoder<W>,
        _: &mut C,
    ) -> Result<(), EncodeError<W::Error>> {
        e.array(v.len() as u64)?;
        for address in v {
            e.bytes(address.as_slice())?;
        }
        Ok(())
    }

    pub fn decode<C>(d: &mut Decoder<'_>, _: &mut C) -> Result<Vec<Address>, DecodeError> {
        let len = d
            .array()?
            .ok_or_else(|| DecodeError::message("indefinite address array"))?;

        (0..len).map(|_| fixed::<20>(d).map(Address::from)).collect()
    }
}

pub mod b256 {
    use super::*;
    use alloy::primitives::B256;

    pub fn encode<C, W: Write>(
        v: &B256,
        e: &mut Encoder<W>,
        _: &mut C,
    ) -> Result<(), EncodeError<W::Error>> {
        e.bytes(v.as_slice())?.ok()
    }

    pub fn decode<C>(d: &mut Decoder<'_>, _: &mut C) -> Result<B256, DecodeError> {
        fixed::<32>(d).map(B256::from)
    }
}

pub mod u256 {
    use super::*;
    use alloy::primitives::U256;

    pub fn encode<C, W: Write>(
        v: &U256,
        e: &mut Encoder<W>,
        _: &mut C,
    ) -> Result<(), EncodeError<W::Error>> {
        e.bytes(&v.to_be_bytes::<32>())?.ok()
    }

    pub fn decode<C>(d: &mut Decoder<'_>, _: &mut C) -> Result<U256, DecodeError> {
        fixed::<32>(d).map(|bytes| U256::from_be_bytes(bytes))
    }
}

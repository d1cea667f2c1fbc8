//! Capability tags (trusted execution, GPU) and their three representations
use super::error::ValidationError;
use alloy::primitives::B256;
use std::fmt;
use std::ops::{BitAnd, BitOr};

const TEE_BIT: u8 = 0b001;
const GPU_BIT: u8 = 0b100;

// on-chain layout of the bytes32 tag: tee is bit 0, gpu is bit 8
const TEE_WORD: u16 = 0x0001;
const GPU_WORD: u16 = 0x0100;

pub const TEE_SYMBOL: &str = "tee";
pub const GPU_SYMBOL: &str = "gpu";

/// A capability set in its integer form. Only 0, 1, 4 and 5 are legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(u8);

impl Tag {
    pub const NONE: Tag = Tag(0);
    pub const TEE: Tag = Tag(TEE_BIT);
    pub const GPU: Tag = Tag(GPU_BIT);
    pub const TEE_GPU: Tag = Tag(TEE_BIT | GPU_BIT);

    pub fn from_int(value: u64) -> Result<Self, ValidationError> {
        match value {
            0 | 1 | 4 | 5 => Ok(Tag(value as u8)),
            other => Err(ValidationError::InvalidTag(format!(
                "{other} is not one of 0, 1, 4, 5"
            ))),
        }
    }

    /// Order-insensitive, duplicates collapse. At most two symbols.
    pub fn from_symbols<I, S>(symbols: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let symbols: Vec<S> = symbols.into_iter().collect();
        if symbols.len() > 2 {
            return Err(ValidationError::InvalidTag(format!(
                "expected at most 2 symbols, got {}",
                symbols.len()
            )));
        }

        let mut bits = 0u8;
        for symbol in &symbols {
            bits |= match symbol.as_ref() {
                TEE_SYMBOL => TEE_BIT,
                GPU_SYMBOL => GPU_BIT,
                unknown => {
                    return Err(ValidationError::InvalidTag(format!(
                        "unknown tag symbol `{unknown}`"
                    )));
                }
            };
        }

        Ok(Tag(bits))
    }

    /// Parses the fixed-width `0x`-prefixed 32 bytes form.
    pub fn from_hex(value: &str) -> Result<Self, ValidationError> {
        let digits = value
            .strip_prefix("0x")
            .filter(|d| d.len() == 64)
            .ok_or_else(|| ValidationError::InvalidTag(format!("`{value}` is not a bytes32")))?;

        let mut word = [0u8; 32];
        hex::decode_to_slice(digits, &mut word)
            .map_err(|e| ValidationError::InvalidTag(format!("`{value}`: {e}")))?;

        Self::from_bytes32(B256::from(word))
    }

    pub fn from_bytes32(word: B256) -> Result<Self, ValidationError> {
        let bytes = word.as_slice();
        if bytes[..30].iter().any(|b| *b != 0) {
            return Err(ValidationError::InvalidTag(format!("{word} sets unknown bits")));
        }

        let low = u16::from_be_bytes([bytes[30], bytes[31]]);
        match low {
            0 => Ok(Tag::NONE),
            TEE_WORD => Ok(Tag::TEE),
            GPU_WORD => Ok(Tag::GPU),
            w if w == TEE_WORD | GPU_WORD => Ok(Tag::TEE_GPU),
            _ => Err(ValidationError::InvalidTag(format!("{word} sets unknown bits"))),
        }
    }

    pub fn to_int(self) -> u8 {
        self.0
    }

    pub fn to_symbols(self) -> Vec<&'static str> {
        let mut symbols = Vec::with_capacity(2);
        if self.has_tee() {
            symbols.push(TEE_SYMBOL);
        }
        if self.has_gpu() {
            symbols.push(GPU_SYMBOL);
        }
        symbols
    }

    pub fn to_bytes32(self) -> B256 {
        let mut word: u16 = 0;
        if self.has_tee() {
            word |= TEE_WORD;
        }
        if self.has_gpu() {
            word |= GPU_WORD;
        }

        let mut bytes = [0u8; 32];
        bytes[30..].copy_from_slice(&word.to_be_bytes());
        B256::from(bytes)
    }

    pub fn to_hex(self) -> String {
        format!("0x{}", hex::encode(self.to_bytes32()))
    }

    pub fn has_tee(self) -> bool {
        self.0 & TEE_BIT != 0
    }

    pub fn has_gpu(self) -> bool {
        self.0 & GPU_BIT != 0
    }

    /// True when every capability of `other` is also in `self`.
    pub fn covers(self, other: Tag) -> bool {
        self & other == other
    }

    pub fn bitwise_and(a: u64, b: u64) -> Result<Tag, ValidationError> {
        let (a, b) = (Tag::from_int(a)?, Tag::from_int(b)?);
        Tag::from_int(u64::from(a.0 & b.0))
    }

    pub fn bitwise_or(a: u64, b: u64) -> Result<Tag, ValidationError> {
        let (a, b) = (Tag::from_int(a)?, Tag::from_int(b)?);
        Tag::from_int(u64::from(a.0 | b.0))
    }
}

// the legal set is closed under & and |
impl BitAnd for Tag {
    type Output = Tag;

    fn bitand(self, rhs: Tag) -> Tag {
        Tag(self.0 & rhs.0)
    }
}

impl BitOr for Tag {
    type Output = Tag;

    fn bitor(self, rhs: Tag) -> Tag {
        Tag(self.0 | rhs.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_symbols().join(","))
    }
}

impl<C> minicbor::Encode<C> for Tag {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.u8(self.0)?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Tag {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let bits = d.u8()?;

        Tag::from_int(u64::from(bits))
            .map_err(|_| minicbor::decode::Error::message("tag outside of the legal set"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_layout_matches_chain() {
        assert_eq!(Tag::NONE.to_hex(), format!("0x{}", "0".repeat(64)));
        assert_eq!(Tag::TEE.to_hex(), format!("0x{}01", "0".repeat(62)));
        assert_eq!(Tag::GPU.to_hex(), format!("0x{}0100", "0".repeat(60)));
        assert_eq!(Tag::TEE_GPU.to_hex(), format!("0x{}0101", "0".repeat(60)));
    }

    #[test]
    fn symbols_are_order_insensitive() {
        let a = Tag::from_symbols(["gpu", "tee"]).unwrap();
        let b = Tag::from_symbols(["tee", "gpu"]).unwrap();

        assert_eq!(a, b);
        assert_eq!(a, Tag::TEE_GPU);
        assert_eq!(Tag::from_symbols(Vec::<&str>::new()).unwrap(), Tag::NONE);
    }

    #[test]
    fn rejects_unknown_symbol() {
        assert!(Tag::from_symbols(["sgx"]).is_err());
    }

    #[test]
    fn rejects_hex_without_prefix_or_width() {
        assert!(Tag::from_hex("0x01").is_err());
        assert!(Tag::from_hex(&"0".repeat(64)).is_err());
        assert!(Tag::from_hex(&format!("0x{}02", "0".repeat(62))).is_err());
    }

    #[test]
    fn tag_cbor_encoding() {
        let encoding = minicbor::to_vec(Tag::TEE_GPU).unwrap();
        let decode: Tag = minicbor::decode(&encoding).unwrap();

        assert_eq!(decode, Tag::TEE_GPU);
    }
}

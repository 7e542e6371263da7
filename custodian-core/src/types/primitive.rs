//! Elementary Solidity types as they appear in typed-data schemas.
use crate::{
    types::U256,
    utils::keccak256,
    validation::{address, boolean, numeric, numeric_str, string, ValidationError},
};
use ethabi::Token;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Primitive {
    Address,
    Bool,
    String,
    Bytes,
    /// `bytes1` .. `bytes32`
    FixedBytes(usize),
    /// bit width, a multiple of 8 up to 256
    Uint(usize),
    Int(usize),
}

fn digits(s: &str) -> Option<usize> {
    if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None
    }
    s.parse().ok()
}

/// `""` means the default width of 256 bits
fn bit_width(suffix: &str) -> Option<usize> {
    if suffix.is_empty() {
        return Some(256)
    }
    digits(suffix).filter(|bits| *bits <= 256 && bits % 8 == 0)
}

impl Primitive {
    pub(crate) fn parse(ty: &str) -> Option<Self> {
        match ty {
            "address" => Some(Self::Address),
            "bool" => Some(Self::Bool),
            "string" => Some(Self::String),
            "bytes" => Some(Self::Bytes),
            _ => {
                if let Some(len) = ty.strip_prefix("bytes") {
                    return digits(len).filter(|len| *len <= 32).map(Self::FixedBytes)
                }
                if let Some(bits) = ty.strip_prefix("uint") {
                    return bit_width(bits).map(Self::Uint)
                }
                if let Some(bits) = ty.strip_prefix("int") {
                    return bit_width(bits).map(Self::Int)
                }
                None
            }
        }
    }

    /// Encodes `value` as the single 32-byte word `encodeData` uses for this type.
    pub(crate) fn encode_word(&self, value: &Value) -> Result<Token, ValidationError> {
        Ok(match *self {
            Self::Address => Token::Address(address(value)?),
            Self::Bool => Token::Uint(U256::from(boolean(value)? as u8)),
            Self::String => Token::Uint(U256::from(keccak256(string(value)?))),
            Self::Bytes => Token::Uint(U256::from(keccak256(dynamic_bytes(value)?))),
            Self::FixedBytes(len) => Token::FixedBytes(fixed_bytes(value, len)?),
            Self::Uint(bits) => Token::Uint(unsigned(value, bits)?),
            Self::Int(bits) => Token::Int(signed(value, bits)?),
        })
    }

    /// Encodes `value` with Solidity's non-standard tight packing (`abi.encodePacked`).
    pub(crate) fn encode_packed(&self, value: &Value) -> Result<Vec<u8>, ValidationError> {
        Ok(match *self {
            Self::Address => address(value)?.as_bytes().to_vec(),
            Self::Bool => vec![boolean(value)? as u8],
            Self::String => string(value)?.as_bytes().to_vec(),
            Self::Bytes => dynamic_bytes(value)?,
            Self::FixedBytes(len) => fixed_bytes(value, len)?,
            Self::Uint(bits) => tail(unsigned(value, bits)?, bits),
            Self::Int(bits) => tail(signed(value, bits)?, bits),
        })
    }
}

/// The low `bits / 8` bytes of a big-endian word
fn tail(word: U256, bits: usize) -> Vec<u8> {
    let mut buf = [0u8; 32];
    word.to_big_endian(&mut buf);
    buf[32 - bits / 8..].to_vec()
}

/// `0x`-prefixed hex is decoded, anything else is taken as UTF-8.
fn dynamic_bytes(value: &Value) -> Result<Vec<u8>, ValidationError> {
    let s = string(value)?;
    match s.strip_prefix("0x") {
        Some(hex) => hex::decode(hex)
            .map_err(|_| ValidationError::mismatch("hex encoded bytes", s)),
        None => Ok(s.as_bytes().to_vec()),
    }
}

fn fixed_bytes(value: &Value, len: usize) -> Result<Vec<u8>, ValidationError> {
    let s = string(value)?;
    let bytes = s
        .strip_prefix("0x")
        .and_then(|hex| hex::decode(hex).ok())
        .ok_or_else(|| ValidationError::mismatch(format!("bytes{len}"), s))?;
    if bytes.len() != len {
        return Err(ValidationError::mismatch(format!("bytes{len}"), s))
    }
    Ok(bytes)
}

fn unsigned(value: &Value, bits: usize) -> Result<U256, ValidationError> {
    let parsed = numeric(value)?;
    if bits < 256 && parsed >= U256::one() << bits {
        return Err(ValidationError::mismatch(format!("uint{bits}"), parsed))
    }
    Ok(parsed)
}

/// Parses a signed integer into its two's complement 256-bit representation.
fn signed(value: &Value, bits: usize) -> Result<U256, ValidationError> {
    let (negative, magnitude) = match value {
        Value::Number(num) => match (num.as_u64(), num.as_i64()) {
            (Some(positive), _) => (false, U256::from(positive)),
            (None, Some(negative)) => (true, U256::from(negative.unsigned_abs())),
            _ => return Err(ValidationError::mismatch("integer", num)),
        },
        Value::String(s) => match s.strip_prefix('-') {
            Some(rest) => (true, numeric_str(rest)?),
            None => (false, numeric_str(s)?),
        },
        _ => return Err(ValidationError::mismatch(format!("int{bits}"), value)),
    };

    let limit = U256::one() << (bits - 1);
    if (negative && magnitude > limit) || (!negative && magnitude >= limit) {
        return Err(ValidationError::mismatch(format!("int{bits}"), value))
    }
    Ok(if negative { (!magnitude).overflowing_add(U256::one()).0 } else { magnitude })
}

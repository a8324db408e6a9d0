//! Primitive action-data encoding
//!
//! Action payloads are normally packed by the caller. When they are not, a
//! payload can be given as an ordered list of primitive values which are
//! written in declaration order. There is no ABI-file lookup: the caller
//! states each field's type.

use crate::core::name::Name;
use crate::error::{Result, SigningError};
use crate::utils::write_varint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_SYMBOL_CODE_LEN: usize = 7;
pub const MAX_PRECISION: u8 = 18;

/// Token symbol: a precision and an upper-case code of 1-7 letters.
/// Packed as a u64 with the precision in the low byte and the code's ASCII
/// bytes above it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol {
    precision: u8,
    code: String,
}

impl Symbol {
    pub fn new(precision: u8, code: &str) -> Result<Self> {
        if precision > MAX_PRECISION {
            return Err(SigningError::InvalidAsset(format!(
                "precision {precision} exceeds {MAX_PRECISION}"
            )));
        }
        if code.is_empty()
            || code.len() > MAX_SYMBOL_CODE_LEN
            || !code.bytes().all(|c| c.is_ascii_uppercase())
        {
            return Err(SigningError::InvalidAsset(format!(
                "symbol code must be 1-{MAX_SYMBOL_CODE_LEN} upper-case letters: {code}"
            )));
        }
        Ok(Symbol {
            precision,
            code: code.to_string(),
        })
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn value(&self) -> u64 {
        let mut value = u64::from(self.precision);
        for (idx, c) in self.code.bytes().enumerate() {
            value |= u64::from(c) << (8 * (idx + 1));
        }
        value
    }
}

/// Text form is `precision,CODE`, e.g. `4,EOS`
impl FromStr for Symbol {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self> {
        let (precision, code) = s
            .split_once(',')
            .ok_or_else(|| SigningError::InvalidAsset(format!("expected precision,CODE: {s}")))?;
        let precision = precision
            .trim()
            .parse::<u8>()
            .map_err(|e| SigningError::InvalidAsset(format!("bad precision in {s}: {e}")))?;
        Symbol::new(precision, code.trim())
    }
}

impl TryFrom<String> for Symbol {
    type Error = SigningError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.to_string()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision, self.code)
    }
}

/// Token quantity, e.g. `1.0000 EOS`: a signed amount in the smallest unit
/// followed by its symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asset {
    amount: i64,
    symbol: Symbol,
}

impl Asset {
    pub fn new(amount: i64, symbol: Symbol) -> Self {
        Asset { amount, symbol }
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}

impl FromStr for Asset {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (quantity, code) = trimmed
            .split_once(' ')
            .ok_or_else(|| SigningError::InvalidAsset(format!("expected 'AMOUNT CODE': {s}")))?;

        let (negative, digits) = match quantity.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, quantity),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty()
            || !whole.bytes().all(|c| c.is_ascii_digit())
            || !fraction.bytes().all(|c| c.is_ascii_digit())
        {
            return Err(SigningError::InvalidAsset(format!("bad amount: {s}")));
        }

        let precision = u8::try_from(fraction.len())
            .map_err(|_| SigningError::InvalidAsset(format!("too many decimals: {s}")))?;
        let symbol = Symbol::new(precision, code.trim())?;

        let magnitude = format!("{whole}{fraction}")
            .parse::<i64>()
            .map_err(|e| SigningError::InvalidAsset(format!("amount out of range in {s}: {e}")))?;
        let amount = if negative { -magnitude } else { magnitude };
        Ok(Asset { amount, symbol })
    }
}

impl TryFrom<String> for Asset {
    type Error = SigningError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.to_string()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let magnitude = self.amount.unsigned_abs();
        let precision = u32::from(self.symbol.precision);
        if precision == 0 {
            return write!(f, "{sign}{magnitude} {}", self.symbol.code);
        }
        let scale = 10u64.pow(precision);
        write!(
            f,
            "{sign}{}.{:0width$} {}",
            magnitude / scale,
            magnitude % scale,
            self.symbol.code,
            width = precision as usize
        )
    }
}

/// One typed field of an action payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AbiValue {
    Name(Name),
    String(String),
    Bytes(#[serde(with = "hex::serde")] Vec<u8>),
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I64(i64),
    Symbol(Symbol),
    Asset(Asset),
}

impl AbiValue {
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        match self {
            AbiValue::Name(name) => buf.extend_from_slice(&name.to_le_bytes()),
            AbiValue::String(text) => {
                write_varint(buf, text.len() as u64);
                buf.extend_from_slice(text.as_bytes());
            }
            AbiValue::Bytes(bytes) => {
                write_varint(buf, bytes.len() as u64);
                buf.extend_from_slice(bytes);
            }
            AbiValue::Bool(flag) => buf.push(u8::from(*flag)),
            AbiValue::U8(v) => buf.push(*v),
            AbiValue::U16(v) => buf.extend_from_slice(&v.to_le_bytes()),
            AbiValue::U32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            AbiValue::U64(v) => buf.extend_from_slice(&v.to_le_bytes()),
            AbiValue::I64(v) => buf.extend_from_slice(&v.to_le_bytes()),
            AbiValue::Symbol(symbol) => buf.extend_from_slice(&symbol.value().to_le_bytes()),
            AbiValue::Asset(asset) => {
                buf.extend_from_slice(&asset.amount.to_le_bytes());
                buf.extend_from_slice(&asset.symbol.value().to_le_bytes());
            }
        }
    }
}

/// Packs fields back to back in the order given
pub fn pack_fields(fields: &[AbiValue]) -> Vec<u8> {
    let mut buf = Vec::new();
    for field in fields {
        field.write_to(&mut buf);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_value() {
        let symbol = Symbol::new(4, "EOS").unwrap();
        // 0x04 | 'E' << 8 | 'O' << 16 | 'S' << 24
        assert_eq!(symbol.value(), 0x534f_4504);
        assert_eq!(symbol.to_string(), "4,EOS");
        assert_eq!("4,EOS".parse::<Symbol>().unwrap(), symbol);
    }

    #[test]
    fn test_symbol_validation() {
        assert!(Symbol::new(4, "eos").is_err());
        assert!(Symbol::new(4, "").is_err());
        assert!(Symbol::new(4, "ABCDEFGH").is_err());
        assert!(Symbol::new(19, "EOS").is_err());
    }

    #[test]
    fn test_asset_parse_and_display() {
        let asset: Asset = "1.0000 EOS".parse().unwrap();
        assert_eq!(asset.amount(), 10_000);
        assert_eq!(asset.symbol().precision(), 4);
        assert_eq!(asset.to_string(), "1.0000 EOS");

        let asset: Asset = "-0.05 WAX".parse().unwrap();
        assert_eq!(asset.amount(), -5);
        assert_eq!(asset.to_string(), "-0.05 WAX");

        let asset: Asset = "42 TKN".parse().unwrap();
        assert_eq!(asset.amount(), 42);
        assert_eq!(asset.to_string(), "42 TKN");
    }

    #[test]
    fn test_asset_parse_errors() {
        for bad in ["1.0000", "abc EOS", "1.0x EOS", ".5 EOS", "1.0 eos"] {
            assert!(bad.parse::<Asset>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_transfer_payload_layout() {
        let fields = vec![
            AbiValue::Name("alice".parse().unwrap()),
            AbiValue::Name("bob".parse().unwrap()),
            AbiValue::Asset("1.0000 EOS".parse().unwrap()),
            AbiValue::String("hi".to_string()),
        ];
        let packed = pack_fields(&fields);

        assert_eq!(packed.len(), 8 + 8 + 16 + 1 + 2);
        assert_eq!(&packed[0..8], &0x345c_8500_0000_0000u64.to_le_bytes());
        assert_eq!(&packed[16..24], &10_000i64.to_le_bytes());
        assert_eq!(&packed[24..32], &0x534f_4504u64.to_le_bytes());
        assert_eq!(&packed[32..], &[0x02, b'h', b'i']);
    }

    #[test]
    fn test_integer_widths() {
        let packed = pack_fields(&[
            AbiValue::Bool(true),
            AbiValue::U8(7),
            AbiValue::U16(0x0102),
            AbiValue::U32(0x0304_0506),
            AbiValue::U64(1),
        ]);
        assert_eq!(
            packed,
            vec![1, 7, 0x02, 0x01, 0x06, 0x05, 0x04, 0x03, 1, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_value_json_shape() {
        let value: AbiValue =
            serde_json::from_str(r#"{"type":"asset","value":"2.5000 EOS"}"#).unwrap();
        assert_eq!(value, AbiValue::Asset("2.5000 EOS".parse().unwrap()));

        let value: AbiValue = serde_json::from_str(r#"{"type":"bytes","value":"0a0b"}"#).unwrap();
        assert_eq!(value, AbiValue::Bytes(vec![0x0a, 0x0b]));
    }
}

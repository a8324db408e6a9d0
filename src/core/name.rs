//! Account and action names
//!
//! A name is up to 12 characters from `.12345abcdefghijklmnopqrstuvwxyz`
//! packed 5 bits each into bits 63..4 of a u64, plus an optional 13th
//! character whose value must fit in the remaining 4 bits (`.` through `j`).

use crate::error::{Result, SigningError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";
pub const MAX_NAME_LEN: usize = 13;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(u64);

impl Name {
    pub const fn from_u64(value: u64) -> Self {
        Name(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

fn char_to_symbol(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some(u64::from(c - b'a') + 6),
        b'1'..=b'5' => Some(u64::from(c - b'1') + 1),
        b'.' => Some(0),
        _ => None,
    }
}

pub fn name_to_u64(name: &str) -> Result<u64> {
    let bytes = name.as_bytes();
    if bytes.len() > MAX_NAME_LEN {
        return Err(SigningError::NameTooLong(name.to_string()));
    }

    let mut value: u64 = 0;
    for (idx, &c) in bytes.iter().enumerate() {
        let symbol = char_to_symbol(c).ok_or_else(|| SigningError::InvalidName(name.to_string()))?;
        if idx < MAX_NAME_LEN - 1 {
            value |= symbol << (64 - 5 * (idx + 1));
        } else {
            // The 13th character only has 4 bits left
            if symbol > 0x0f {
                return Err(SigningError::InvalidName(name.to_string()));
            }
            value |= symbol;
        }
    }
    Ok(value)
}

pub fn u64_to_name(value: u64) -> String {
    let mut out = [b'.'; MAX_NAME_LEN];
    let mut tmp = value;
    for i in 0..MAX_NAME_LEN {
        let (mask, shift) = if i == 0 { (0x0f, 4) } else { (0x1f, 5) };
        out[MAX_NAME_LEN - 1 - i] = CHARMAP[(tmp & mask) as usize];
        tmp >>= shift;
    }

    let len = out.iter().rposition(|&c| c != b'.').map_or(0, |p| p + 1);
    // Every byte comes from CHARMAP, which is ASCII
    out[..len].iter().map(|&c| c as char).collect()
}

impl FromStr for Name {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self> {
        name_to_u64(s).map(Name)
    }
}

impl TryFrom<&str> for Name {
    type Error = SigningError;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl TryFrom<String> for Name {
    type Error = SigningError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<u64> for Name {
    fn from(value: u64) -> Self {
        Name(value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.to_string()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&u64_to_name(self.0))
    }
}

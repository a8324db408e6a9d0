use crate::core::abi::{pack_fields, AbiValue};
use crate::core::name::Name;
use crate::error::Result;
use crate::utils::{write_varint, ByteReader};
use serde::{Deserialize, Serialize};

/// Who authorizes an action: an account and one of its permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionLevel {
    pub actor: Name,
    pub permission: Name,
}

impl PermissionLevel {
    pub fn new(actor: &str, permission: &str) -> Result<PermissionLevel> {
        Ok(PermissionLevel {
            actor: actor.parse()?,
            permission: permission.parse()?,
        })
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.actor.to_le_bytes());
        buf.extend_from_slice(&self.permission.to_le_bytes());
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<PermissionLevel> {
        Ok(PermissionLevel {
            actor: Name::from(reader.read_u64()?),
            permission: Name::from(reader.read_u64()?),
        })
    }
}

/// Action payload, either already packed by the caller or a list of
/// primitive fields to be packed in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionData {
    Packed(#[serde(with = "hex::serde")] Vec<u8>),
    Fields(Vec<AbiValue>),
}

impl ActionData {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ActionData::Packed(bytes) => bytes,
            ActionData::Fields(fields) => pack_fields(&fields),
        }
    }
}

impl From<Vec<u8>> for ActionData {
    fn from(bytes: Vec<u8>) -> Self {
        ActionData::Packed(bytes)
    }
}

impl From<&[u8]> for ActionData {
    fn from(bytes: &[u8]) -> Self {
        ActionData::Packed(bytes.to_vec())
    }
}

impl From<Vec<AbiValue>> for ActionData {
    fn from(fields: Vec<AbiValue>) -> Self {
        ActionData::Fields(fields)
    }
}

/// A single contract call. `data` always holds the packed payload; the
/// field order of the wire form is account, name, authorization, data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub account: Name,
    pub name: Name,
    pub authorization: Vec<PermissionLevel>,
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
}

impl Action {
    pub fn new(
        account: Name,
        name: Name,
        authorization: Vec<PermissionLevel>,
        data: impl Into<ActionData>,
    ) -> Action {
        Action {
            account,
            name,
            authorization,
            data: data.into().into_bytes(),
        }
    }

    /// Builds an action authorized by a single `actor@permission`
    pub fn with_single_auth(
        contract: &str,
        action: &str,
        actor: &str,
        permission: &str,
        data: impl Into<ActionData>,
    ) -> Result<Action> {
        Ok(Action::new(
            contract.parse()?,
            action.parse()?,
            vec![PermissionLevel::new(actor, permission)?],
            data,
        ))
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf =
            Vec::with_capacity(8 + 8 + 1 + 16 * self.authorization.len() + 1 + self.data.len());
        self.write_to(&mut buf);
        buf
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.account.to_le_bytes());
        buf.extend_from_slice(&self.name.to_le_bytes());
        write_varint(buf, self.authorization.len() as u64);
        for level in &self.authorization {
            level.write_to(buf);
        }
        write_varint(buf, self.data.len() as u64);
        buf.extend_from_slice(&self.data);
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Action> {
        let account = Name::from(reader.read_u64()?);
        let name = Name::from(reader.read_u64()?);
        let auth_count = reader.read_varint()?;
        let mut authorization = Vec::new();
        for _ in 0..auth_count {
            authorization.push(PermissionLevel::read_from(reader)?);
        }
        let data = reader.read_prefixed_bytes()?.to_vec();
        Ok(Action {
            account,
            name,
            authorization,
            data,
        })
    }
}

use crate::core::{Action, ActionData, ChainInfo, PermissionLevel, Transaction, TransactionBuilder};
use crate::error::{Result, SigningError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Input of the `sign` command: chain metadata from the caller's `get_info`
/// plus the actions to sign.
///
/// ```json
/// {
///   "chain": { "chain_id": "...", "head_block_num": 1, "head_block_id": "...",
///              "head_block_time": "2024-01-01T00:00:00.000" },
///   "actions": [{
///     "account": "eosio.token", "name": "transfer",
///     "authorization": [{ "actor": "alice", "permission": "active" }],
///     "data": { "packed": "0011..." }
///   }]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SignRequest {
    pub chain: ChainInfo,
    #[serde(default)]
    pub expiration_secs: Option<u64>,
    #[serde(default)]
    pub use_last_irreversible: bool,
    #[serde(default)]
    pub max_cpu_usage_ms: u8,
    #[serde(default)]
    pub max_net_usage_words: u32,
    pub actions: Vec<ActionRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub account: String,
    pub name: String,
    pub authorization: Vec<PermissionLevel>,
    pub data: ActionData,
}

impl SignRequest {
    pub fn load(path: &Path) -> Result<SignRequest> {
        let text = fs::read_to_string(path)?;
        SignRequest::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<SignRequest> {
        Ok(serde_json::from_str(text)?)
    }

    /// Runs the request through a `TransactionBuilder`. `default_expiration`
    /// applies when the request does not name its own.
    pub fn build_transaction(&self, default_expiration: Duration) -> Result<Transaction> {
        let expiration = self
            .expiration_secs
            .map(Duration::from_secs)
            .unwrap_or(default_expiration);

        let mut builder = TransactionBuilder::new(self.chain.clone());
        builder
            .set_expiration(expiration)?
            .set_max_cpu_usage_ms(self.max_cpu_usage_ms)?
            .set_max_net_usage_words(self.max_net_usage_words)?;
        if self.use_last_irreversible {
            builder.use_last_irreversible_block()?;
        }

        for request in &self.actions {
            if request.authorization.is_empty() {
                return Err(SigningError::Serialization(format!(
                    "action {}::{} has no authorization",
                    request.account, request.name
                )));
            }
            let action = Action::new(
                request.account.parse()?,
                request.name.parse()?,
                request.authorization.clone(),
                request.data.clone(),
            );
            builder.push_action(action)?;
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{pack_fields, AbiValue};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const REQUEST: &str = r#"{
        "chain": {
            "chain_id": "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906",
            "head_block_num": 123456,
            "head_block_id": "0001e2403f4c1f0a0b0c0d0e1234567890abcdef1234567890abcdef12345678",
            "head_block_time": "2024-01-01T00:00:00.000"
        },
        "actions": [
            {
                "account": "eosio.token",
                "name": "transfer",
                "authorization": [{ "actor": "alice", "permission": "active" }],
                "data": { "fields": [
                    { "type": "name", "value": "alice" },
                    { "type": "name", "value": "bob" },
                    { "type": "asset", "value": "1.0000 EOS" },
                    { "type": "string", "value": "hi" }
                ] }
            },
            {
                "account": "eosio",
                "name": "noop",
                "authorization": [{ "actor": "bob", "permission": "active" }],
                "data": { "packed": "deadbeef" }
            }
        ]
    }"#;

    #[test]
    fn test_build_from_json() {
        let request = SignRequest::from_json(REQUEST).unwrap();
        let tx = request.build_transaction(Duration::from_secs(60)).unwrap();

        assert_eq!(tx.expiration, 1_704_067_260);
        assert_eq!(tx.ref_block_num, 0xe240);
        assert_eq!(tx.actions.len(), 2);
        assert_eq!(tx.actions[1].data, vec![0xde, 0xad, 0xbe, 0xef]);

        let expected = pack_fields(&[
            AbiValue::Name("alice".parse().unwrap()),
            AbiValue::Name("bob".parse().unwrap()),
            AbiValue::Asset("1.0000 EOS".parse().unwrap()),
            AbiValue::String("hi".to_string()),
        ]);
        assert_eq!(tx.actions[0].data, expected);
    }

    #[test]
    fn test_request_expiration_wins() {
        let mut request = SignRequest::from_json(REQUEST).unwrap();
        request.expiration_secs = Some(600);
        let tx = request.build_transaction(Duration::from_secs(60)).unwrap();
        assert_eq!(tx.expiration, 1_704_067_800);
    }

    #[test]
    fn test_invalid_name_in_request() {
        let json = REQUEST.replace("\"noop\"", "\"NoOp\"");
        let request = SignRequest::from_json(&json).unwrap();
        assert!(matches!(
            request.build_transaction(Duration::from_secs(60)),
            Err(SigningError::InvalidName(_))
        ));
    }

    #[test]
    fn test_empty_actions() {
        let mut request = SignRequest::from_json(REQUEST).unwrap();
        request.actions.clear();
        assert_eq!(
            request.build_transaction(Duration::from_secs(60)),
            Err(SigningError::NoActionsAdded)
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(REQUEST.as_bytes()).unwrap();
        let request = SignRequest::load(file.path()).unwrap();
        assert_eq!(request.actions.len(), 2);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SignRequest::from_json("{"),
            Err(SigningError::Serialization(_))
        ));
    }
}

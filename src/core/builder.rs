use crate::core::action::{Action, ActionData};
use crate::core::chain_info::{ChainInfo, ReferenceBlock};
use crate::core::transaction::Transaction;
use crate::error::{Result, SigningError};
use log::{debug, warn};
use std::time::Duration;

pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(60);

/// Accumulates actions on top of chain metadata and produces one
/// `Transaction`. Each builder is single-use: after `build()` every mutator
/// returns `AlreadyBuilt`.
#[derive(Debug)]
pub struct TransactionBuilder {
    chain_info: ChainInfo,
    expiration: Duration,
    max_net_usage_words: u32,
    max_cpu_usage_ms: u8,
    delay_sec: u32,
    use_last_irreversible: bool,
    actions: Vec<Action>,
    built: bool,
}

impl TransactionBuilder {
    pub fn new(chain_info: ChainInfo) -> TransactionBuilder {
        TransactionBuilder {
            chain_info,
            expiration: DEFAULT_EXPIRATION,
            max_net_usage_words: 0,
            max_cpu_usage_ms: 0,
            delay_sec: 0,
            use_last_irreversible: false,
            actions: Vec::new(),
            built: false,
        }
    }

    fn ensure_building(&self) -> Result<()> {
        if self.built {
            return Err(SigningError::AlreadyBuilt);
        }
        Ok(())
    }

    /// Expiration becomes head block time + `duration`
    pub fn set_expiration(&mut self, duration: Duration) -> Result<&mut Self> {
        self.ensure_building()?;
        if duration.as_secs() == 0 {
            return Err(SigningError::InvalidExpiration(format!(
                "expiration must be at least one second after the head block, got {duration:?}"
            )));
        }
        self.expiration = duration;
        Ok(self)
    }

    pub fn set_max_net_usage_words(&mut self, words: u32) -> Result<&mut Self> {
        self.ensure_building()?;
        self.max_net_usage_words = words;
        Ok(self)
    }

    pub fn set_max_cpu_usage_ms(&mut self, ms: u8) -> Result<&mut Self> {
        self.ensure_building()?;
        self.max_cpu_usage_ms = ms;
        Ok(self)
    }

    pub fn set_delay_sec(&mut self, seconds: u32) -> Result<&mut Self> {
        self.ensure_building()?;
        self.delay_sec = seconds;
        Ok(self)
    }

    /// Take TAPOS fields from the last irreversible block instead of the head.
    /// Falls back to the head block if the chain info does not carry one.
    pub fn use_last_irreversible_block(&mut self) -> Result<&mut Self> {
        self.ensure_building()?;
        self.use_last_irreversible = true;
        Ok(self)
    }

    /// Appends an action authorized by `actor@permission`
    pub fn add_action(
        &mut self,
        contract: &str,
        action: &str,
        actor: &str,
        permission: &str,
        data: impl Into<ActionData>,
    ) -> Result<&mut Self> {
        self.ensure_building()?;
        let action = Action::with_single_auth(contract, action, actor, permission, data)?;
        self.actions.push(action);
        Ok(self)
    }

    /// Appends a prepared action, e.g. one with several authorizations
    pub fn push_action(&mut self, action: Action) -> Result<&mut Self> {
        self.ensure_building()?;
        self.actions.push(action);
        Ok(self)
    }

    pub fn build(&mut self) -> Result<Transaction> {
        self.ensure_building()?;
        if self.actions.is_empty() {
            return Err(SigningError::NoActionsAdded);
        }

        let reference = self.reference_block()?;
        let expiration = self.expiration_timestamp()?;

        debug!(
            "Built transaction: expiration={expiration}, ref_block_num={}, ref_block_prefix={}, actions={}",
            reference.ref_block_num,
            reference.ref_block_prefix,
            self.actions.len()
        );

        self.built = true;
        Ok(Transaction {
            expiration,
            ref_block_num: reference.ref_block_num,
            ref_block_prefix: reference.ref_block_prefix,
            max_net_usage_words: self.max_net_usage_words,
            max_cpu_usage_ms: self.max_cpu_usage_ms,
            delay_sec: self.delay_sec,
            actions: std::mem::take(&mut self.actions),
        })
    }

    fn reference_block(&self) -> Result<ReferenceBlock> {
        if self.use_last_irreversible {
            match self.chain_info.last_irreversible_reference() {
                Some(reference) => return reference,
                None => warn!("Chain info has no last irreversible block, using head block"),
            }
        }
        self.chain_info.head_reference()
    }

    fn expiration_timestamp(&self) -> Result<u32> {
        let head = self.chain_info.head_block_timestamp();
        let expiration = i64::try_from(self.expiration.as_secs())
            .ok()
            .and_then(|secs| head.checked_add(secs))
            .ok_or_else(|| {
                SigningError::InvalidExpiration(format!("{:?} overflows", self.expiration))
            })?;
        u32::try_from(expiration).map_err(|_| {
            SigningError::InvalidExpiration(format!(
                "{expiration} does not fit in 32-bit unix seconds"
            ))
        })
    }
}

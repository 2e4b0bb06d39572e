//! Multi-account front door.
//!
//! Each account gets its own LoyaltyEngine behind its own Mutex, so
//! operations on one account are serialised while different accounts
//! proceed independently. The registry lock covers lookup and first
//! load only, never an account operation.

use crate::{
    clock::Clock,
    config::LoyaltyConfig,
    engine::LoyaltyEngine,
    error::{LoyaltyError, LoyaltyResult},
    rng::RngBank,
    store::StateStore,
    types::AccountId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct LoyaltyService {
    config:   LoyaltyConfig,
    rng_bank: RngBank,
    clock:    Arc<dyn Clock>,
    store:    Arc<dyn StateStore>,
    accounts: Mutex<HashMap<AccountId, Arc<Mutex<LoyaltyEngine>>>>,
}

impl LoyaltyService {
    pub fn new(
        config: LoyaltyConfig,
        clock: Arc<dyn Clock>,
        store: Arc<dyn StateStore>,
    ) -> LoyaltyResult<Self> {
        config.validate()?;
        let rng_bank = match config.rng_seed {
            Some(seed) => RngBank::new(seed),
            None => RngBank::from_entropy(),
        };
        log::debug!("loyalty service up, master_seed={}", rng_bank.master_seed());
        Ok(Self {
            config,
            rng_bank,
            clock,
            store,
            accounts: Mutex::new(HashMap::new()),
        })
    }

    /// The engine for `account_id`, loaded on first use.
    ///
    /// The load runs outside the registry lock. If two callers race on
    /// a cold account, the first insert wins and the other load is dropped.
    pub fn account(&self, account_id: &str) -> LoyaltyResult<Arc<Mutex<LoyaltyEngine>>> {
        if let Some(engine) = self.registry(account_id)?.get(account_id) {
            return Ok(Arc::clone(engine));
        }

        let engine = LoyaltyEngine::open(
            account_id,
            &self.config,
            &self.rng_bank,
            Arc::clone(&self.clock),
            Arc::clone(&self.store),
        )?;
        let mut accounts = self.registry(account_id)?;
        let engine = accounts
            .entry(account_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(engine)));
        Ok(Arc::clone(engine))
    }

    /// Run `f` with exclusive access to one account's engine.
    pub fn with_account<T>(
        &self,
        account_id: &str,
        f: impl FnOnce(&mut LoyaltyEngine) -> LoyaltyResult<T>,
    ) -> LoyaltyResult<T> {
        let engine = self.account(account_id)?;
        let mut engine = engine.lock().map_err(|_| LoyaltyError::LockPoisoned {
            account_id: account_id.to_string(),
        })?;
        f(&mut engine)
    }

    fn registry(
        &self,
        account_id: &str,
    ) -> LoyaltyResult<MutexGuard<'_, HashMap<AccountId, Arc<Mutex<LoyaltyEngine>>>>> {
        self.accounts.lock().map_err(|_| LoyaltyError::LockPoisoned {
            account_id: account_id.to_string(),
        })
    }

    /// Accounts currently held in memory.
    pub fn loaded_accounts(&self) -> Vec<AccountId> {
        let accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<_> = accounts.keys().cloned().collect();
        ids.sort();
        ids
    }
}

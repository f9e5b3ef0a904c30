//! Cost ledger
//!
//! Spend is tracked per (provider, UTC day). Every mutation of one entry
//! runs under that entry's shard lock in the concurrent map, so concurrent
//! charges and reservations against the same provider are serialized while
//! different providers proceed in parallel.
//!
//! Spend is only recorded through [`CostLedger::charge`] or by committing a
//! [`Reservation`], which applies the same check. A reservation holds budget
//! for an in-flight call; holds count against the budget of every other
//! charge or reservation until they are committed or dropped.

use chrono::NaiveDate;
use dashmap::DashMap;
use lgw_domain::error::{Error, Result};
use lgw_domain::ports::Clock;
use lgw_domain::{CostLedgerEntry, ProviderDescriptor, ProviderId, Usd};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
struct LedgerState {
    spent: Usd,
    reserved: Usd,
}

/// Per-provider, per-day spend with budget enforcement
pub struct CostLedger {
    budgets: HashMap<ProviderId, Usd>,
    entries: DashMap<(ProviderId, NaiveDate), LedgerState>,
    clock: Arc<dyn Clock>,
}

impl CostLedger {
    /// Create a ledger for the given daily budgets
    pub fn new(budgets: impl IntoIterator<Item = (ProviderId, Usd)>, clock: Arc<dyn Clock>) -> Self {
        Self {
            budgets: budgets.into_iter().collect(),
            entries: DashMap::new(),
            clock,
        }
    }

    /// Create a ledger from provider descriptors
    pub fn from_descriptors<'a>(
        descriptors: impl IntoIterator<Item = &'a ProviderDescriptor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            descriptors
                .into_iter()
                .map(|descriptor| (descriptor.id.clone(), descriptor.daily_budget)),
            clock,
        )
    }

    /// Daily budget of a provider
    pub fn budget(&self, provider: &ProviderId) -> Option<Usd> {
        self.budgets.get(provider).copied()
    }

    fn require_budget(&self, provider: &ProviderId) -> Result<Usd> {
        self.budget(provider)
            .ok_or_else(|| Error::not_found(format!("ledger provider {provider}")))
    }

    /// Record `amount` of spend for today
    ///
    /// Returns the new total spend. Fails with [`Error::BudgetExceeded`]
    /// without applying anything when spend, outstanding holds and `amount`
    /// together would pass the daily budget.
    pub fn charge(&self, provider: &ProviderId, amount: Usd) -> Result<Usd> {
        let budget = self.require_budget(provider)?;
        self.apply(provider, self.clock.today(), amount, Usd::ZERO, budget)
    }

    fn apply(
        &self,
        provider: &ProviderId,
        date: NaiveDate,
        amount: Usd,
        release: Usd,
        budget: Usd,
    ) -> Result<Usd> {
        let mut entry = self.entries.entry((provider.clone(), date)).or_default();
        let state = entry.value_mut();

        let reserved = state.reserved.saturating_sub(release);
        let committed = state.spent + reserved;
        match committed.checked_add(amount) {
            Some(total) if total <= budget => {}
            _ => {
                return Err(Error::BudgetExceeded {
                    provider: provider.clone(),
                    spent: committed,
                    requested: amount,
                    budget,
                });
            }
        }

        state.reserved = reserved;
        state.spent = state.spent + amount;
        debug!(provider = %provider, %date, spent = %state.spent, "Ledger charged");
        Ok(state.spent)
    }

    /// Hold `amount` of today's budget for an in-flight call
    pub fn reserve(self: &Arc<Self>, provider: &ProviderId, amount: Usd) -> Result<Reservation> {
        let budget = self.require_budget(provider)?;
        let date = self.clock.today();

        let mut entry = self.entries.entry((provider.clone(), date)).or_default();
        let state = entry.value_mut();
        let committed = state.spent + state.reserved;
        match committed.checked_add(amount) {
            Some(total) if total <= budget => state.reserved = state.reserved + amount,
            _ => {
                return Err(Error::BudgetExceeded {
                    provider: provider.clone(),
                    spent: committed,
                    requested: amount,
                    budget,
                });
            }
        }
        drop(entry);

        Ok(Reservation {
            ledger: Arc::clone(self),
            provider: provider.clone(),
            date,
            amount,
            budget,
            settled: false,
        })
    }

    fn release(&self, provider: &ProviderId, date: NaiveDate, amount: Usd) {
        if let Some(mut entry) = self.entries.get_mut(&(provider.clone(), date)) {
            entry.reserved = entry.reserved.saturating_sub(amount);
        }
    }

    /// Budget left today: budget minus spend and outstanding holds
    pub fn remaining(&self, provider: &ProviderId) -> Usd {
        let Some(budget) = self.budget(provider) else {
            return Usd::ZERO;
        };
        let state = self.state(provider, self.clock.today());
        budget.saturating_sub(state.spent + state.reserved)
    }

    /// Spend recorded today
    pub fn spent_today(&self, provider: &ProviderId) -> Usd {
        self.state(provider, self.clock.today()).spent
    }

    /// Budget currently held by in-flight calls
    pub fn reserved_today(&self, provider: &ProviderId) -> Usd {
        self.state(provider, self.clock.today()).reserved
    }

    fn state(&self, provider: &ProviderId, date: NaiveDate) -> LedgerState {
        self.entries
            .get(&(provider.clone(), date))
            .map(|entry| *entry.value())
            .unwrap_or_default()
    }

    /// Every entry, oldest day first, providers in id order
    pub fn entries(&self) -> Vec<CostLedgerEntry> {
        let mut entries: Vec<CostLedgerEntry> = self
            .entries
            .iter()
            .map(|entry| {
                let (provider, date) = entry.key();
                CostLedgerEntry {
                    provider: provider.clone(),
                    date: *date,
                    spent: entry.spent,
                    reserved: entry.reserved,
                }
            })
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.provider.cmp(&b.provider)));
        entries
    }
}

/// Budget held for one in-flight call
///
/// Dropping an uncommitted reservation releases the hold.
pub struct Reservation {
    ledger: Arc<CostLedger>,
    provider: ProviderId,
    date: NaiveDate,
    amount: Usd,
    budget: Usd,
    settled: bool,
}

impl Reservation {
    /// Provider the hold is for
    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    /// Amount held
    pub fn amount(&self) -> Usd {
        self.amount
    }

    /// Turn the hold into spend on the day it was taken
    ///
    /// Returns the new total spend for that day.
    pub fn commit(mut self) -> Result<Usd> {
        let total = self.ledger.apply(
            &self.provider,
            self.date,
            self.amount,
            self.amount,
            self.budget,
        )?;
        self.settled = true;
        Ok(total)
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.settled {
            self.ledger.release(&self.provider, self.date, self.amount);
            if !self.amount.is_zero() {
                debug!(provider = %self.provider, amount = %self.amount, "Reservation released");
            }
        }
    }
}

impl std::fmt::Debug for Reservation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reservation")
            .field("provider", &self.provider)
            .field("date", &self.date)
            .field("amount", &self.amount)
            .field("settled", &self.settled)
            .finish_non_exhaustive()
    }
}

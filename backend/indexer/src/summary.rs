//! Off-chain reconstruction of the FundMe ledger from indexed events.
//!
//! Replaying `funded` and `withdrawn` in ledger order yields the same
//! contribution record, funder sequence and held balance the contract
//! reports, without a contract call per funder.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, EventRecord};

/// Cumulative contribution of one funder since the last withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunderTotal {
    pub address: String,
    pub amount: i128,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    /// Tokens the contract should be holding right now.
    pub held_balance: i128,
    /// Funders in order of first contribution, with their totals.
    pub funders: Vec<FunderTotal>,
    /// Every accepted payment's funder, duplicates included.
    pub funder_sequence: Vec<String>,
    pub withdrawals: u32,
    pub total_withdrawn: i128,
    /// Events that could not be applied (missing or malformed fields).
    pub skipped_events: u32,
}

impl LedgerSummary {
    /// Replay `events`, which must be in ledger order.
    pub fn replay(events: &[EventRecord]) -> Self {
        let mut summary = Self::default();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for event in events {
            let applied = match event.kind() {
                EventKind::Funded => summary.apply_funded(&mut positions, event),
                EventKind::Withdrawn => summary.apply_withdrawn(&mut positions, event),
                EventKind::Unknown => Ok(()),
            };
            if let Err(e) = applied {
                warn!("Skipping event {} in summary: {e}", event.event_id);
                summary.skipped_events += 1;
            }
        }

        summary
    }

    fn apply_funded(
        &mut self,
        positions: &mut HashMap<String, usize>,
        event: &EventRecord,
    ) -> Result<()> {
        let funder = event
            .actor
            .clone()
            .ok_or_else(|| IndexerError::EventParse("funded event without funder".to_string()))?;
        let amount = parse_amount(event.amount.as_deref())?;

        match positions.get(&funder) {
            Some(&i) => self.funders[i].amount += amount,
            None => {
                positions.insert(funder.clone(), self.funders.len());
                self.funders.push(FunderTotal {
                    address: funder.clone(),
                    amount,
                });
            }
        }
        self.funder_sequence.push(funder);
        self.held_balance += amount;
        Ok(())
    }

    fn apply_withdrawn(
        &mut self,
        positions: &mut HashMap<String, usize>,
        event: &EventRecord,
    ) -> Result<()> {
        let amount = parse_amount(event.amount.as_deref())?;
        if amount != self.held_balance {
            warn!(
                "Withdrawal {} moved {amount}, replay expected {}",
                event.event_id, self.held_balance
            );
        }

        positions.clear();
        self.funders.clear();
        self.funder_sequence.clear();
        self.held_balance = 0;
        self.withdrawals += 1;
        self.total_withdrawn += amount;
        Ok(())
    }

    /// Contribution of `address` since the last withdrawal; zero if none.
    pub fn amount_funded(&self, address: &str) -> i128 {
        self.funders
            .iter()
            .find(|f| f.address == address)
            .map(|f| f.amount)
            .unwrap_or(0)
    }
}

fn parse_amount(raw: Option<&str>) -> Result<i128> {
    let raw = raw.ok_or_else(|| IndexerError::InvalidAmount(String::new()))?;
    raw.parse()
        .map_err(|_| IndexerError::InvalidAmount(raw.to_string()))
}

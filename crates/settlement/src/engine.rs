//! Balance derivation and greedy debt simplification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitbill_core::{GroupId, PersonId};
use splitbill_ledger::{Expense, Person};

/// Two-decimal currency tolerance. Balances within this distance of zero
/// count as settled; it also absorbs floating-point drift.
pub const EPSILON: f64 = 0.01;

/// Per-person net position derived from a group's expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonBalance {
    pub person_id: PersonId,
    /// Sum of amounts this person paid for the group.
    pub total_paid: f64,
    /// Sum of shares this person owes across all expenses.
    pub total_share: f64,
    /// `total_paid - total_share`; positive = owed money, negative = owes.
    pub balance: f64,
}

/// One recommended payment from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub from_person_id: PersonId,
    pub to_person_id: PersonId,
    /// Rounded to two decimals when recorded.
    pub amount: f64,
}

/// Raw engine output: balances plus the transfer plan derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub person_balances: Vec<PersonBalance>,
    pub optimal_transfers: Vec<Transfer>,
}

/// Full settlement report for one group, as assembled by the ledger store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub group_id: GroupId,
    pub person_balances: Vec<PersonBalance>,
    pub optimal_transfers: Vec<Transfer>,
    /// Sum of all expense amounts in the group, including expenses whose
    /// cost was dropped from balances.
    pub total_amount: f64,
    pub calculated_at: DateTime<Utc>,
}

/// Derives balances and a transfer plan from a group's expenses.
///
/// Only active members carry balances. An expense whose participants are
/// all inactive is skipped entirely: its cost is unattributable and is
/// deliberately dropped from every balance rather than redistributed.
/// Shares are split equally among the *active* participants of each
/// expense, so a soft-deleted participant's portion falls to the
/// remaining active ones.
pub fn compute_settlement(expenses: &[Expense], members: &[Person]) -> Settlement {
    let mut balances: Vec<PersonBalance> = members
        .iter()
        .filter(|m| m.is_active())
        .map(|m| PersonBalance {
            person_id: m.id,
            total_paid: 0.0,
            total_share: 0.0,
            balance: 0.0,
        })
        .collect();

    for expense in expenses {
        let active_participants: Vec<PersonId> = expense
            .participants
            .iter()
            .copied()
            .filter(|id| balances.iter().any(|b| b.person_id == *id))
            .collect();

        if active_participants.is_empty() {
            continue;
        }

        let share = expense.amount / active_participants.len() as f64;

        // The store blocks soft-deleting a payer with expenses on record,
        // so an inactive payer here means the snapshot was produced some
        // other way. Drop the payment but leave a trace.
        match balances
            .iter_mut()
            .find(|b| b.person_id == expense.payer_id)
        {
            Some(payer) => payer.total_paid += expense.amount,
            None => tracing::warn!(
                expense = %expense.id,
                payer = %expense.payer_id,
                "dropping payment from inactive payer"
            ),
        }

        for participant_id in &active_participants {
            if let Some(balance) = balances
                .iter_mut()
                .find(|b| b.person_id == *participant_id)
            {
                balance.total_share += share;
            }
        }
    }

    for balance in &mut balances {
        balance.balance = balance.total_paid - balance.total_share;
    }

    let optimal_transfers = minimize_transfers(&balances);

    Settlement {
        person_balances: balances,
        optimal_transfers,
    }
}

/// Greedy debt simplification: repeatedly match the largest creditor with
/// the largest-magnitude debtor.
///
/// Guarantees every balance ends within [`EPSILON`] of zero using at most
/// `creditors + debtors - 1` transfers. Running balances stay unrounded;
/// only recorded amounts are rounded to two decimals, so rounding error
/// does not compound across transfers.
pub fn minimize_transfers(balances: &[PersonBalance]) -> Vec<Transfer> {
    let mut creditors: Vec<(PersonId, f64)> = balances
        .iter()
        .filter(|b| b.balance > EPSILON)
        .map(|b| (b.person_id, b.balance))
        .collect();
    let mut debtors: Vec<(PersonId, f64)> = balances
        .iter()
        .filter(|b| b.balance < -EPSILON)
        .map(|b| (b.person_id, b.balance))
        .collect();

    creditors.sort_by(|a, b| b.1.total_cmp(&a.1));
    debtors.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut transfers = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < creditors.len() && j < debtors.len() {
        let amount = creditors[i].1.min(-debtors[j].1);

        if amount > EPSILON {
            transfers.push(Transfer {
                from_person_id: debtors[j].0,
                to_person_id: creditors[i].0,
                amount: round_cents(amount),
            });
            creditors[i].1 -= amount;
            debtors[j].1 += amount;
        }

        // "<=" so a residue of exactly EPSILON cannot stall the sweep.
        if creditors[i].1.abs() <= EPSILON {
            i += 1;
        }
        if debtors[j].1.abs() <= EPSILON {
            j += 1;
        }
    }

    transfers
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

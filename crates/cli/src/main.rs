//! Thin command-line consumer of the ledger core.
//!
//! Owns the process lifecycle: init observability, open the snapshot
//! store, load the ledger, run exactly one operation, print the result.
//! All domain rules live in the core crates; this binary only renders.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use splitbill_core::{Entity, ExpenseId, GroupId, PersonId};
use splitbill_infra::JsonFileSnapshotStore;
use splitbill_ledger::{ExpenseInput, Group};
use splitbill_settlement::SettlementResult;
use splitbill_store::LedgerStore;

#[derive(Parser)]
#[command(name = "splitbill", about = "Split shared group expenses and settle debts")]
struct Cli {
    /// Data directory holding the persisted ledger.
    #[arg(long, env = "SPLITBILL_DATA_DIR", default_value = ".splitbill")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all groups.
    Groups,
    /// Create a group and make it the active one.
    CreateGroup {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Replace a group's name and description.
    UpdateGroup {
        group_id: GroupId,
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove a group (the last group always remains).
    RemoveGroup { group_id: GroupId },
    /// Select another group.
    SwitchGroup { group_id: GroupId },
    /// Add a member to the active group.
    AddPerson {
        name: String,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Soft-delete a member of the active group.
    RemovePerson { person_id: PersonId },
    /// Record an expense in the active group, split equally among the
    /// participants.
    AddExpense {
        title: String,
        amount: f64,
        #[arg(long)]
        payer: PersonId,
        #[arg(long, required = true, num_args = 1..)]
        participants: Vec<PersonId>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Rewrite an existing expense.
    UpdateExpense {
        expense_id: ExpenseId,
        title: String,
        amount: f64,
        #[arg(long)]
        payer: PersonId,
        #[arg(long, required = true, num_args = 1..)]
        participants: Vec<PersonId>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove an expense from the active group.
    RemoveExpense { expense_id: ExpenseId },
    /// Show balances and the transfer plan for the active group.
    Settle,
    /// Erase all persisted data.
    Clear,
}

fn main() -> anyhow::Result<()> {
    splitbill_observability::init();
    let cli = Cli::parse();

    let snapshots = JsonFileSnapshotStore::open(&cli.data_dir).with_context(|| {
        format!("failed to open data directory {}", cli.data_dir.display())
    })?;
    let mut store = LedgerStore::load(snapshots).context("failed to load ledger snapshot")?;

    match cli.command {
        Command::Groups => print_groups(&store),
        Command::CreateGroup { name, description } => {
            let group = store.create_group(&name, description)?;
            println!("created group {} ({})", group.name(), group.id());
        }
        Command::UpdateGroup {
            group_id,
            name,
            description,
        } => {
            let group = store.update_group(group_id, &name, description)?;
            println!("updated group {} ({})", group.name(), group.id());
        }
        Command::RemoveGroup { group_id } => {
            let group = store.remove_group(group_id)?;
            println!("removed group {}", group.name());
        }
        Command::SwitchGroup { group_id } => {
            let group = store.switch_group(group_id)?;
            println!("switched to group {}", group.name());
        }
        Command::AddPerson { name, avatar } => {
            let person = store.add_person(&name, avatar)?;
            println!("added {} ({})", person.name, person.id);
        }
        Command::RemovePerson { person_id } => {
            let person = store.remove_person(person_id)?;
            println!("removed {} (record kept for history)", person.name);
        }
        Command::AddExpense {
            title,
            amount,
            payer,
            participants,
            description,
            category,
        } => {
            let expense = store.add_expense(ExpenseInput {
                title,
                amount,
                payer_id: payer,
                participants,
                description,
                category,
            })?;
            println!(
                "recorded {} at {:.2} ({})",
                expense.title, expense.amount, expense.id
            );
        }
        Command::UpdateExpense {
            expense_id,
            title,
            amount,
            payer,
            participants,
            description,
            category,
        } => {
            let expense = store.update_expense(
                expense_id,
                ExpenseInput {
                    title,
                    amount,
                    payer_id: payer,
                    participants,
                    description,
                    category,
                },
            )?;
            println!("updated {} at {:.2}", expense.title, expense.amount);
        }
        Command::RemoveExpense { expense_id } => {
            let expense = store.remove_expense(expense_id)?;
            println!("removed expense {}", expense.title);
        }
        Command::Settle => match store.settlement() {
            Some(result) => print_settlement(store.active_group(), &result),
            None => println!("nothing to settle yet"),
        },
        Command::Clear => {
            store.clear_all().context("failed to erase persisted data")?;
            println!("all data erased");
        }
    }

    Ok(())
}

fn print_groups<S: splitbill_store::SnapshotStore>(store: &LedgerStore<S>) {
    if store.groups().is_empty() {
        println!("no groups yet; create one with `splitbill create-group <name>`");
        return;
    }
    for group in store.groups() {
        let marker = if store.active_group_id() == Some(group.id()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {}  {} ({} members, {} expenses)",
            group.id(),
            group.name(),
            group.members().len(),
            group.expenses().len(),
        );
    }
}

fn print_settlement(group: Option<&Group>, result: &SettlementResult) {
    let name_of = |person_id: PersonId| -> String {
        group
            .and_then(|g| g.members().iter().find(|m| m.id == person_id))
            .map(|m| m.name.clone())
            .unwrap_or_else(|| person_id.to_string())
    };

    println!("total spent: {:.2}", result.total_amount);
    println!("balances:");
    for balance in &result.person_balances {
        println!(
            "  {:<20} paid {:>8.2}  share {:>8.2}  balance {:>+8.2}",
            name_of(balance.person_id),
            balance.total_paid,
            balance.total_share,
            balance.balance,
        );
    }

    if result.optimal_transfers.is_empty() {
        println!("everyone is settled");
        return;
    }
    println!("suggested transfers:");
    for transfer in &result.optimal_transfers {
        println!(
            "  {} -> {}  {:.2}",
            name_of(transfer.from_person_id),
            name_of(transfer.to_person_id),
            transfer.amount,
        );
    }
}

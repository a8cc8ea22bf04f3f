use chrono::Utc;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use splitbill_core::{ExpenseId, PersonId};
use splitbill_ledger::{Expense, Person, PersonStatus};
use splitbill_settlement::{compute_settlement, minimize_transfers};

fn make_members(count: usize) -> Vec<Person> {
    (0..count)
        .map(|idx| Person {
            id: PersonId::new(),
            name: format!("member-{idx}"),
            avatar: None,
            status: PersonStatus::Active,
            created_at: Utc::now(),
        })
        .collect()
}

/// Deterministic expense mix: rotating payers, participant windows of
/// varying width, amounts spread over a realistic range.
fn make_expenses(members: &[Person], count: usize) -> Vec<Expense> {
    (0..count)
        .map(|idx| {
            let payer = &members[idx % members.len()];
            let window = 1 + (idx % members.len().min(5));
            let participants = (0..window)
                .map(|offset| members[(idx + offset) % members.len()].id)
                .collect();
            Expense {
                id: ExpenseId::new(),
                title: format!("expense-{idx}"),
                amount: 5.0 + (idx % 200) as f64 * 0.75,
                payer_id: payer.id,
                participants,
                description: None,
                category: None,
                created_at: Utc::now(),
            }
        })
        .collect()
}

fn bench_compute_settlement(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_settlement");

    for (people, expenses) in [(5usize, 50usize), (20, 500), (100, 2000)] {
        let members = make_members(people);
        let expense_list = make_expenses(&members, expenses);

        group.throughput(Throughput::Elements(expenses as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{people}people_{expenses}expenses")),
            &(members, expense_list),
            |b, (members, expense_list)| {
                b.iter(|| compute_settlement(black_box(expense_list), black_box(members)));
            },
        );
    }

    group.finish();
}

fn bench_minimize_transfers(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimize_transfers");
    group.sample_size(500);

    let members = make_members(200);
    let expense_list = make_expenses(&members, 1000);
    let balances = compute_settlement(&expense_list, &members).person_balances;

    group.bench_function("200_balances", |b| {
        b.iter(|| minimize_transfers(black_box(&balances)));
    });

    group.finish();
}

criterion_group!(benches, bench_compute_settlement, bench_minimize_transfers);
criterion_main!(benches);

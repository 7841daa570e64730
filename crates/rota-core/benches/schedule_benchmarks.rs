use chrono::{NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rota_core::models::{RecurrenceRule, RuleType};
use rota_core::recurrence::{DueDates, GenerationLimits};
use uuid::Uuid;

fn weekly_rule(day: u32) -> RecurrenceRule {
    RecurrenceRule {
        task_definition_id: Uuid::now_v7(),
        rule_type: RuleType::Weekly,
        weekly_recurring_day: Some(day),
        monthly_recurring_day: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn monthly_rule(day: u32) -> RecurrenceRule {
    RecurrenceRule {
        task_definition_id: Uuid::now_v7(),
        rule_type: RuleType::Monthly,
        weekly_recurring_day: None,
        monthly_recurring_day: Some(day),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn bench_weekly_expansion(c: &mut Criterion) {
    let rule = weekly_rule(5);
    let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    let limits = GenerationLimits::default();

    c.bench_function("weekly_expansion_13_months", |b| {
        b.iter(|| {
            DueDates::for_rule(black_box(&rule), black_box(today), black_box(&limits))
                .unwrap()
                .count()
        })
    });
}

fn bench_monthly_expansion(c: &mut Criterion) {
    let rule = monthly_rule(31);
    let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let limits = GenerationLimits::default();

    c.bench_function("monthly_expansion_day_31", |b| {
        b.iter(|| {
            DueDates::for_rule(black_box(&rule), black_box(today), black_box(&limits))
                .unwrap()
                .count()
        })
    });
}

criterion_group!(benches, bench_weekly_expansion, bench_monthly_expansion);
criterion_main!(benches);

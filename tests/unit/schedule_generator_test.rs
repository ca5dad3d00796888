// Unit tests for the pure schedule generator: cadence, amount split and
// commission rounding, plus property-based coverage across random sales.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use commtrack::sales::models::Sale;
use commtrack::schedule::models::ScheduleCadence;
use commtrack::schedule::services::ScheduleGenerator;
use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn noon(day: NaiveDate) -> NaiveDateTime {
    day.and_hms_opt(12, 0, 0).unwrap()
}

fn sale(amount: Decimal, percent: Decimal, sale_date: NaiveDate) -> Sale {
    Sale {
        id: 42,
        client_id: 7,
        contact_id: None,
        invoice_number: "INV-1042".to_string(),
        sale_date,
        amount,
        commission_percent: percent,
        deleted: false,
        deleted_at: None,
        created_at: noon(sale_date),
        updated_at: noon(sale_date),
    }
}

/// Default cadence yields exactly three installments at +25/+30/+35 days
#[test]
fn test_fixed_cadence() {
    let sale = sale(dec!(999.00), dec!(10), date(2024, 1, 1));
    let installments = ScheduleGenerator::generate(
        &sale,
        &[],
        &ScheduleCadence::default(),
        noon(sale.sale_date),
    )
    .unwrap();

    assert_eq!(installments.len(), 3);
    assert_eq!(installments[0].due_date, date(2024, 1, 26));
    assert_eq!(installments[1].due_date, date(2024, 1, 31));
    assert_eq!(installments[2].due_date, date(2024, 2, 5));
}

/// Reference scenario: 999.00 at 10% on 2024-01-01
#[test]
fn test_reference_scenario_amounts() {
    let sale = sale(dec!(999.00), dec!(10), date(2024, 1, 1));
    let installments = ScheduleGenerator::generate(
        &sale,
        &[],
        &ScheduleCadence::default(),
        noon(sale.sale_date),
    )
    .unwrap();

    for installment in &installments {
        assert_eq!(installment.amount, dec!(333.00));
        assert_eq!(installment.commission_amount, dec!(33.30));
        assert_eq!(installment.sale_id, 42);
        assert!(!installment.paid);
        assert!(installment.paid_at.is_none());
        assert!(!installment.deleted);
    }

    // Days 26 and 31 cut off at end of January; Feb 5 cuts off mid-February
    assert_eq!(installments[0].pay_date, date(2024, 1, 31));
    assert_eq!(installments[1].pay_date, date(2024, 1, 31));
    assert_eq!(installments[2].pay_date, date(2024, 2, 15));
}

/// The per-installment split is a plain rounded division, no remainder
/// redistribution; 100.00 splits into 3 x 33.33 and a cent goes missing
#[test]
fn test_split_drift_is_preserved() {
    let sale = sale(dec!(100.00), dec!(10), date(2024, 3, 1));
    let installments = ScheduleGenerator::generate(
        &sale,
        &[],
        &ScheduleCadence::default(),
        noon(sale.sale_date),
    )
    .unwrap();

    let total: Decimal = installments.iter().map(|i| i.amount).sum();
    assert_eq!(total, dec!(99.99));
    assert!(installments.iter().all(|i| i.amount == dec!(33.33)));
}

/// Commission rounds half away from zero, not banker's rounding
#[test]
fn test_commission_rounding_midpoint() {
    // 0.25 * 10% = 0.025: banker's rounding would give 0.02, the schedule
    // must carry 0.03
    let sale = sale(dec!(0.75), dec!(10), date(2024, 3, 1));
    let installments = ScheduleGenerator::generate(
        &sale,
        &[],
        &ScheduleCadence::default(),
        noon(sale.sale_date),
    )
    .unwrap();

    assert_eq!(installments[0].amount, dec!(0.25));
    assert_eq!(installments[0].commission_amount, dec!(0.03));
}

/// A custom cadence drives both installment count and due dates
#[test]
fn test_custom_cadence() {
    let cadence = ScheduleCadence::new(vec![10, 20, 30, 40]).unwrap();
    let sale = sale(dec!(400.00), dec!(5), date(2024, 6, 1));
    let installments =
        ScheduleGenerator::generate(&sale, &[], &cadence, noon(sale.sale_date)).unwrap();

    assert_eq!(installments.len(), 4);
    assert_eq!(installments[0].due_date, date(2024, 6, 11));
    assert_eq!(installments[3].due_date, date(2024, 7, 11));
    assert!(installments.iter().all(|i| i.amount == dec!(100.00)));
}

proptest! {
    /// One installment per cadence offset, each due at sale_date + offset
    #[test]
    fn prop_cadence_shape(
        year in 2001i32..2090,
        month in 1u32..=12,
        day in 1u32..=28,
        amount_cents in 1u64..100_000_000,
        percent_tenths in 0u64..1000,
        offsets in prop::collection::vec(1i64..400, 1..8),
    ) {
        let sale_date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let amount = Decimal::from(amount_cents) / Decimal::from(100);
        let percent = Decimal::from(percent_tenths) / Decimal::from(10);
        let sale = sale(amount, percent, sale_date);
        let cadence = ScheduleCadence::new(offsets.clone()).unwrap();

        let installments = ScheduleGenerator::generate(
            &sale, &[], &cadence, noon(sale_date),
        ).unwrap();

        prop_assert_eq!(installments.len(), offsets.len());
        for (installment, offset) in installments.iter().zip(&offsets) {
            prop_assert_eq!(installment.due_date, sale_date + Duration::days(*offset));
        }
    }

    /// Identical inputs produce identical output
    #[test]
    fn prop_deterministic(
        amount_cents in 1u64..100_000_000,
        percent_tenths in 0u64..1000,
        day_of_year in 0i64..3650,
    ) {
        let sale_date = date(2020, 1, 1) + Duration::days(day_of_year);
        let amount = Decimal::from(amount_cents) / Decimal::from(100);
        let percent = Decimal::from(percent_tenths) / Decimal::from(10);
        let sale = sale(amount, percent, sale_date);
        let now = noon(sale_date);

        let first = ScheduleGenerator::generate(&sale, &[], &ScheduleCadence::default(), now).unwrap();
        let second = ScheduleGenerator::generate(&sale, &[], &ScheduleCadence::default(), now).unwrap();

        prop_assert_eq!(first, second);
    }

    /// Commission per installment always equals the rounded product
    #[test]
    fn prop_commission_formula(
        amount_cents in 1u64..100_000_000,
        percent_tenths in 0u64..1000,
    ) {
        let amount = Decimal::from(amount_cents) / Decimal::from(100);
        let percent = Decimal::from(percent_tenths) / Decimal::from(10);
        let sale = sale(amount, percent, date(2024, 5, 1));

        let installments = ScheduleGenerator::generate(
            &sale, &[], &ScheduleCadence::default(), noon(sale.sale_date),
        ).unwrap();

        for installment in &installments {
            let expected = (installment.amount * percent / Decimal::from(100))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            prop_assert_eq!(installment.commission_amount, expected);
        }
    }

    /// Every installment carries the same equal share of the sale amount
    #[test]
    fn prop_equal_split(
        amount_cents in 1u64..100_000_000,
    ) {
        let amount = Decimal::from(amount_cents) / Decimal::from(100);
        let sale = sale(amount, dec!(10), date(2024, 5, 1));

        let installments = ScheduleGenerator::generate(
            &sale, &[], &ScheduleCadence::default(), noon(sale.sale_date),
        ).unwrap();

        let first = installments[0].amount;
        prop_assert!(installments.iter().all(|i| i.amount == first));
    }
}

// Unit tests for paid-state carry-over across schedule regeneration.

use chrono::{NaiveDate, NaiveDateTime};
use commtrack::sales::models::Sale;
use commtrack::schedule::models::ScheduleCadence;
use commtrack::schedule::services::ScheduleGenerator;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn noon(day: NaiveDate) -> NaiveDateTime {
    day.and_hms_opt(12, 0, 0).unwrap()
}

fn sale(amount: Decimal, percent: Decimal, sale_date: NaiveDate) -> Sale {
    Sale {
        id: 5,
        client_id: 2,
        contact_id: Some(9),
        invoice_number: "INV-2005".to_string(),
        sale_date,
        amount,
        commission_percent: percent,
        deleted: false,
        deleted_at: None,
        created_at: noon(sale_date),
        updated_at: noon(sale_date),
    }
}

/// Regenerating with an unchanged sale and the same clock reproduces the set
/// exactly, paid state included
#[test]
fn test_regeneration_is_idempotent() {
    let sale = sale(dec!(900.00), dec!(12), date(2024, 2, 1));
    let now = noon(sale.sale_date);
    let cadence = ScheduleCadence::default();

    let mut first = ScheduleGenerator::generate(&sale, &[], &cadence, now).unwrap();
    let paid_at = noon(date(2024, 3, 1));
    first[0].set_paid_status(true, Some(paid_at), paid_at);

    let second = ScheduleGenerator::generate(&sale, &first, &cadence, now).unwrap();
    let third = ScheduleGenerator::generate(&sale, &second, &cadence, now).unwrap();

    let tuples = |set: &[commtrack::schedule::models::Installment]| {
        set.iter()
            .map(|i| {
                (
                    i.due_date,
                    i.pay_date,
                    i.amount,
                    i.commission_amount,
                    i.paid,
                    i.paid_at,
                )
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(tuples(&second), tuples(&third));
    assert!(second[0].paid);
    assert_eq!(second[0].paid_at, Some(paid_at));
}

/// Editing only the commission percent keeps paid state while recomputing
/// the commission amounts
#[test]
fn test_percent_edit_preserves_paid_state() {
    let original = sale(dec!(900.00), dec!(12), date(2024, 2, 1));
    let now = noon(original.sale_date);
    let cadence = ScheduleCadence::default();

    let mut existing = ScheduleGenerator::generate(&original, &[], &cadence, now).unwrap();
    let paid_at = noon(date(2024, 3, 2));
    // Mark the second installment (due D+30) paid
    existing[1].set_paid_status(true, Some(paid_at), paid_at);

    let mut edited = original.clone();
    edited.commission_percent = dec!(15);

    let regenerated =
        ScheduleGenerator::generate(&edited, &existing, &cadence, noon(date(2024, 3, 3))).unwrap();

    assert!(regenerated[1].paid);
    assert_eq!(regenerated[1].paid_at, Some(paid_at));
    // 900 / 3 = 300; 15% of 300 = 45.00 under the new percent
    assert_eq!(regenerated[1].commission_amount, dec!(45.00));
    assert!(!regenerated[0].paid);
    assert!(!regenerated[2].paid);
}

/// Shifting the sale date so no due date survives drops all paid state
#[test]
fn test_full_date_shift_drops_paid_state() {
    let original = sale(dec!(900.00), dec!(12), date(2024, 2, 1));
    let now = noon(original.sale_date);
    let cadence = ScheduleCadence::default();

    let mut existing = ScheduleGenerator::generate(&original, &[], &cadence, now).unwrap();
    for installment in existing.iter_mut() {
        installment.set_paid_status(true, Some(now), now);
    }

    let mut edited = original.clone();
    edited.sale_date = date(2024, 4, 1);

    let regenerated = ScheduleGenerator::generate(&edited, &existing, &cadence, now).unwrap();

    for installment in &regenerated {
        assert!(!installment.paid);
        assert!(installment.paid_at.is_none());
    }
}

/// A partial shift carries state only for the due dates that still overlap
#[test]
fn test_partial_date_shift_carries_overlapping_dates() {
    let original = sale(dec!(900.00), dec!(12), date(2024, 2, 1));
    let now = noon(original.sale_date);
    let cadence = ScheduleCadence::default();

    // Old due dates: Feb 26, Mar 2, Mar 7
    let mut existing = ScheduleGenerator::generate(&original, &[], &cadence, now).unwrap();
    let paid_at = noon(date(2024, 3, 3));
    existing[1].set_paid_status(true, Some(paid_at), paid_at); // Mar 2
    existing[2].set_paid_status(true, Some(paid_at), paid_at); // Mar 7

    // Shift by 5 days: new due dates Mar 2, Mar 7, Mar 12
    let mut edited = original.clone();
    edited.sale_date = date(2024, 2, 6);

    let regenerated = ScheduleGenerator::generate(&edited, &existing, &cadence, now).unwrap();

    assert_eq!(regenerated[0].due_date, date(2024, 3, 2));
    assert!(regenerated[0].paid);
    assert_eq!(regenerated[0].paid_at, Some(paid_at));

    assert_eq!(regenerated[1].due_date, date(2024, 3, 7));
    assert!(regenerated[1].paid);

    assert_eq!(regenerated[2].due_date, date(2024, 3, 12));
    assert!(!regenerated[2].paid);
    assert!(regenerated[2].paid_at.is_none());
}

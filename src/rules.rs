use crate::error::ValidationError;
use crate::model::{FeeStatus, StudentFeeRecord};
use chrono::NaiveDate;

/// Status of a fee record from its balances and due date.
///
/// Any payment on an unsettled record makes it `Partial`, regardless of the
/// due date; only untouched records become `Overdue`.
pub fn derive_status(paid: u64, pending: u64, due_date: NaiveDate, today: NaiveDate) -> FeeStatus {
    if pending == 0 {
        FeeStatus::Paid
    } else if paid > 0 {
        FeeStatus::Partial
    } else if today > due_date {
        FeeStatus::Overdue
    } else {
        FeeStatus::Pending
    }
}

/// Applies a payment of `amount` made on `on`, returning the updated record.
/// `record` itself is never modified.
pub fn apply_payment(
    record: &StudentFeeRecord,
    amount: u64,
    on: NaiveDate,
) -> Result<StudentFeeRecord, ValidationError> {
    if record.status == FeeStatus::Paid || record.pending_amount == 0 {
        return Err(ValidationError::AlreadyPaid(record.id));
    }
    if amount == 0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    if amount > record.pending_amount {
        return Err(ValidationError::AmountExceedsPending {
            amount,
            pending: record.pending_amount,
        });
    }

    let mut next = record.clone();
    next.paid_amount = next.paid_amount.saturating_add(amount);
    next.pending_amount -= amount;
    next.status = if next.pending_amount == 0 {
        FeeStatus::Paid
    } else {
        FeeStatus::Partial
    };
    next.last_payment_date = Some(on);
    Ok(next)
}

/// `REC001`, `REC002`, ... for the payment following `count` existing ones.
pub fn default_receipt_number(count: usize) -> String {
    format!("REC{:03}", count + 1)
}

/// Lazy `Pending -> Overdue` transition applied when records are read.
pub fn refresh_overdue(record: &StudentFeeRecord, today: NaiveDate) -> StudentFeeRecord {
    let mut next = record.clone();
    if next.status == FeeStatus::Pending && next.pending_amount > 0 && today > next.due_date {
        next.status = FeeStatus::Overdue;
    }
    next
}

/// Normalizes an edited fee record: pending is recomputed from total and
/// paid, and status re-derived, so the balance invariant holds on save.
pub fn normalize_student_fee(
    record: &StudentFeeRecord,
    today: NaiveDate,
) -> Result<StudentFeeRecord, ValidationError> {
    if record.student_name.trim().is_empty() {
        return Err(ValidationError::EmptyField("studentName"));
    }
    if record.paid_amount > record.total_amount {
        return Err(ValidationError::PaidExceedsTotal {
            paid: record.paid_amount,
            total: record.total_amount,
        });
    }
    let mut next = record.clone();
    next.student_name = record.student_name.trim().to_string();
    next.pending_amount = record.total_amount - record.paid_amount;
    next.status = derive_status(next.paid_amount, next.pending_amount, next.due_date, today);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("date")
    }

    fn fresh_fee() -> StudentFeeRecord {
        StudentFeeRecord {
            id: 1,
            student_name: "Rohan Gupta".into(),
            roll_number: "003".into(),
            class_name: "Class 9-B".into(),
            total_amount: 15000,
            paid_amount: 0,
            pending_amount: 15000,
            due_date: d(2024, 4, 15),
            status: FeeStatus::Pending,
            last_payment_date: None,
        }
    }

    #[test]
    fn partial_then_full_payment() {
        let first = apply_payment(&fresh_fee(), 5000, d(2024, 4, 1)).expect("first payment");
        assert_eq!(first.paid_amount, 5000);
        assert_eq!(first.pending_amount, 10000);
        assert_eq!(first.status, FeeStatus::Partial);
        assert_eq!(first.last_payment_date, Some(d(2024, 4, 1)));

        let second = apply_payment(&first, 10000, d(2024, 4, 2)).expect("second payment");
        assert_eq!(second.paid_amount, 15000);
        assert_eq!(second.pending_amount, 0);
        assert_eq!(second.status, FeeStatus::Paid);

        assert_eq!(
            apply_payment(&second, 1, d(2024, 4, 3)),
            Err(ValidationError::AlreadyPaid(1))
        );
    }

    #[test]
    fn overpayment_is_rejected() {
        let rec = fresh_fee();
        let res = apply_payment(&rec, 15001, d(2024, 4, 1));
        assert_eq!(
            res,
            Err(ValidationError::AmountExceedsPending {
                amount: 15001,
                pending: 15000
            })
        );
        assert_eq!(rec, fresh_fee());
    }

    #[test]
    fn zero_payment_is_rejected() {
        assert_eq!(
            apply_payment(&fresh_fee(), 0, d(2024, 4, 1)),
            Err(ValidationError::NonPositiveAmount)
        );
    }

    #[test]
    fn overdue_record_becomes_partial_on_payment() {
        let mut rec = fresh_fee();
        rec.status = FeeStatus::Overdue;
        let next = apply_payment(&rec, 100, d(2024, 5, 1)).expect("payment");
        assert_eq!(next.status, FeeStatus::Partial);
    }

    #[test]
    fn balance_invariant_holds_for_every_valid_amount() {
        let rec = fresh_fee();
        for amount in [1, 2, 999, 7500, 14999, 15000] {
            let next = apply_payment(&rec, amount, d(2024, 4, 1)).expect("payment");
            assert_eq!(next.paid_amount + next.pending_amount, next.total_amount);
        }
    }

    #[test]
    fn receipt_numbers_are_zero_padded() {
        assert_eq!(default_receipt_number(0), "REC001");
        assert_eq!(default_receipt_number(41), "REC042");
        assert_eq!(default_receipt_number(999), "REC1000");
    }

    #[test]
    fn overdue_is_derived_only_after_the_due_date() {
        let rec = fresh_fee();
        assert_eq!(refresh_overdue(&rec, d(2024, 4, 15)).status, FeeStatus::Pending);
        assert_eq!(refresh_overdue(&rec, d(2024, 4, 16)).status, FeeStatus::Overdue);

        let mut partial = rec.clone();
        partial.status = FeeStatus::Partial;
        assert_eq!(
            refresh_overdue(&partial, d(2025, 1, 1)).status,
            FeeStatus::Partial
        );
    }

    #[test]
    fn derive_status_table() {
        let due = d(2024, 4, 15);
        let before = d(2024, 4, 1);
        let after = d(2024, 5, 1);
        assert_eq!(derive_status(100, 0, due, after), FeeStatus::Paid);
        assert_eq!(derive_status(50, 50, due, after), FeeStatus::Partial);
        assert_eq!(derive_status(0, 100, due, after), FeeStatus::Overdue);
        assert_eq!(derive_status(0, 100, due, before), FeeStatus::Pending);
    }

    #[test]
    fn normalize_recomputes_pending_and_status() {
        let mut rec = fresh_fee();
        rec.paid_amount = 4000;
        rec.pending_amount = 999;
        rec.status = FeeStatus::Paid;
        let next = normalize_student_fee(&rec, d(2024, 4, 1)).expect("normalize");
        assert_eq!(next.pending_amount, 11000);
        assert_eq!(next.status, FeeStatus::Partial);
    }

    #[test]
    fn normalize_rejects_paid_over_total() {
        let mut rec = fresh_fee();
        rec.paid_amount = 20000;
        assert_eq!(
            normalize_student_fee(&rec, d(2024, 4, 1)),
            Err(ValidationError::PaidExceedsTotal {
                paid: 20000,
                total: 15000
            })
        );
    }
}

use crate::error::ValidationError;
use crate::model::{PaymentMethod, PaymentRecord, PaymentStatus, StudentFeeRecord};
use crate::rules;
use crate::store::{EntityStore, RecordId};
use chrono::NaiveDate;
use tracing::info;

#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub student_fee_id: RecordId,
    pub amount: u64,
    pub method: PaymentMethod,
    pub receipt_number: Option<String>,
    pub payment_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub student_fee: StudentFeeRecord,
    pub payment: PaymentRecord,
    pub persisted: bool,
}

/// Applies a payment to a fee record and appends the matching payment.
/// Nothing is written when validation fails.
pub fn record_payment(
    fees: &mut EntityStore<StudentFeeRecord>,
    payments: &mut EntityStore<PaymentRecord>,
    req: PaymentRequest,
) -> Result<PaymentOutcome, ValidationError> {
    let Some(fee) = fees.get(req.student_fee_id) else {
        return Err(ValidationError::UnknownFeeRecord(req.student_fee_id));
    };

    let receipt_number = match req.receipt_number.as_deref().map(str::trim) {
        Some(r) if !r.is_empty() => {
            if receipt_in_use(payments, r) {
                return Err(ValidationError::DuplicateReceipt(r.to_string()));
            }
            r.to_string()
        }
        _ => next_free_receipt(payments),
    };

    let updated = rules::apply_payment(fee, req.amount, req.payment_date)?;
    let student_fee = fees.upsert(updated);

    let payment = payments.upsert(PaymentRecord {
        id: 0,
        student_fee_id: student_fee.id,
        amount: req.amount,
        payment_date: req.payment_date,
        method: req.method,
        receipt_number,
        status: PaymentStatus::Success,
    });
    info!(
        fee_id = student_fee.id,
        payment_id = payment.id,
        amount = req.amount,
        receipt = %payment.receipt_number,
        "payment recorded"
    );

    Ok(PaymentOutcome {
        persisted: fees.persisted() && payments.persisted(),
        student_fee,
        payment,
    })
}

fn receipt_in_use(payments: &EntityStore<PaymentRecord>, receipt: &str) -> bool {
    payments
        .list()
        .iter()
        .any(|p| p.receipt_number.eq_ignore_ascii_case(receipt))
}

// Deleted payments can leave the count-based number already taken.
fn next_free_receipt(payments: &EntityStore<PaymentRecord>) -> String {
    let mut count = payments.list().len();
    loop {
        let candidate = rules::default_receipt_number(count);
        if !receipt_in_use(payments, &candidate) {
            return candidate;
        }
        count += 1;
    }
}

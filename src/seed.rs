//! Default collections used when a workspace has no snapshot yet.

use crate::model::{
    ActiveStatus, FeeStatus, FeeStructure, FeeType, Parent, ParentRelation, PaymentMethod,
    PaymentRecord, PaymentStatus, Role, StudentFeeRecord,
};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

pub fn fee_structures() -> Vec<FeeStructure> {
    let row = |id, class_name: &str, fee_type, amount, due| FeeStructure {
        id,
        class_name: class_name.to_string(),
        fee_type,
        amount,
        due_date: due,
        status: ActiveStatus::Active,
    };
    vec![
        row(1, "Class 10", FeeType::Tuition, 15000, date(2024, 4, 15)),
        row(2, "Class 10", FeeType::Transport, 3000, date(2024, 4, 15)),
        row(3, "Class 9", FeeType::Tuition, 14000, date(2024, 4, 15)),
        row(4, "Class 9", FeeType::Library, 1000, date(2024, 4, 30)),
    ]
}

pub fn student_fees() -> Vec<StudentFeeRecord> {
    vec![
        StudentFeeRecord {
            id: 1,
            student_name: "Aarav Sharma".into(),
            roll_number: "001".into(),
            class_name: "Class 10-A".into(),
            total_amount: 18000,
            paid_amount: 18000,
            pending_amount: 0,
            due_date: date(2024, 4, 15),
            status: FeeStatus::Paid,
            last_payment_date: Some(date(2024, 4, 10)),
        },
        StudentFeeRecord {
            id: 2,
            student_name: "Priya Patel".into(),
            roll_number: "002".into(),
            class_name: "Class 10-A".into(),
            total_amount: 18000,
            paid_amount: 9000,
            pending_amount: 9000,
            due_date: date(2024, 4, 15),
            status: FeeStatus::Partial,
            last_payment_date: Some(date(2024, 4, 5)),
        },
        StudentFeeRecord {
            id: 3,
            student_name: "Rohan Gupta".into(),
            roll_number: "003".into(),
            class_name: "Class 9-B".into(),
            total_amount: 15000,
            paid_amount: 0,
            pending_amount: 15000,
            due_date: date(2024, 3, 31),
            status: FeeStatus::Overdue,
            last_payment_date: None,
        },
    ]
}

pub fn payments() -> Vec<PaymentRecord> {
    vec![
        PaymentRecord {
            id: 1,
            student_fee_id: 1,
            amount: 18000,
            payment_date: date(2024, 4, 10),
            method: PaymentMethod::Online,
            receipt_number: "REC001".into(),
            status: PaymentStatus::Success,
        },
        PaymentRecord {
            id: 2,
            student_fee_id: 2,
            amount: 9000,
            payment_date: date(2024, 4, 5),
            method: PaymentMethod::Cash,
            receipt_number: "REC002".into(),
            status: PaymentStatus::Success,
        },
    ]
}

pub fn parents() -> Vec<Parent> {
    vec![
        Parent {
            id: 1,
            name: "Rajesh Sharma".into(),
            email: "rajesh.sharma@example.com".into(),
            phone: "+91 98765 43210".into(),
            relation: ParentRelation::Father,
            children: vec!["Aarav Sharma".into()],
            status: ActiveStatus::Active,
        },
        Parent {
            id: 2,
            name: "Meera Patel".into(),
            email: "meera.patel@example.com".into(),
            phone: "+91 98765 43211".into(),
            relation: ParentRelation::Mother,
            children: vec!["Priya Patel".into()],
            status: ActiveStatus::Active,
        },
    ]
}

pub fn roles() -> Vec<Role> {
    let role = |id, name: &str, description: &str, permissions: &[&str]| Role {
        id,
        name: name.to_string(),
        description: description.to_string(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        status: ActiveStatus::Active,
    };
    vec![
        role(
            1,
            "Administrator",
            "Full access to every module",
            &["fees.manage", "parents.manage", "roles.manage", "payments.record"],
        ),
        role(
            2,
            "Accountant",
            "Records payments and manages fee structures",
            &["fees.manage", "payments.record"],
        ),
        role(3, "Teacher", "Read-only access to class fees", &["fees.view"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_student_fees_balance() {
        for rec in student_fees() {
            assert_eq!(rec.paid_amount + rec.pending_amount, rec.total_amount);
        }
    }

    #[test]
    fn seeded_payments_reference_seeded_fees() {
        let fees = student_fees();
        for p in payments() {
            assert!(fees.iter().any(|f| f.id == p.student_fee_id));
        }
    }
}

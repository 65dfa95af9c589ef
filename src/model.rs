use crate::store::{Record, RecordId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const FEE_STRUCTURES_KEY: &str = "feeStructures";
pub const STUDENT_FEES_KEY: &str = "studentFees";
pub const PAYMENTS_KEY: &str = "payments";
pub const PARENTS_KEY: &str = "parents";
pub const ROLES_KEY: &str = "roles";

macro_rules! impl_record {
    ($ty:ty) => {
        impl Record for $ty {
            fn id(&self) -> RecordId {
                self.id
            }
            fn set_id(&mut self, id: RecordId) {
                self.id = id;
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeType {
    Tuition,
    Transport,
    Library,
    Sports,
    Annual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActiveStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeStructure {
    #[serde(default)]
    pub id: RecordId,
    pub class_name: String,
    pub fee_type: FeeType,
    pub amount: u64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: ActiveStatus,
}
impl_record!(FeeStructure);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeStatus {
    Paid,
    Pending,
    Overdue,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFeeRecord {
    #[serde(default)]
    pub id: RecordId,
    pub student_name: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub class_name: String,
    pub total_amount: u64,
    #[serde(default)]
    pub paid_amount: u64,
    #[serde(default)]
    pub pending_amount: u64,
    pub due_date: NaiveDate,
    #[serde(default = "default_fee_status")]
    pub status: FeeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<NaiveDate>,
}
impl_record!(StudentFeeRecord);

fn default_fee_status() -> FeeStatus {
    FeeStatus::Pending
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    #[serde(alias = "Bank Transfer")]
    BankTransfer,
    Online,
    Cheque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Success,
    Pending,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(default)]
    pub id: RecordId,
    pub student_fee_id: RecordId,
    pub amount: u64,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub receipt_number: String,
    pub status: PaymentStatus,
}
impl_record!(PaymentRecord);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentRelation {
    Father,
    Mother,
    Guardian,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parent {
    #[serde(default)]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub relation: ParentRelation,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub status: ActiveStatus,
}
impl_record!(Parent);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default)]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub status: ActiveStatus,
}
impl_record!(Role);

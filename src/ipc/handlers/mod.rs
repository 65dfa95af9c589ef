pub mod backup;
pub mod core;
pub mod fee_structures;
pub mod parents;
pub mod payments;
pub mod roles;
pub mod student_fees;

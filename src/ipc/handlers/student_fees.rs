use crate::ipc::error::{ok, validation_err};
use crate::ipc::helpers::{as_of, param_id, param_record, require_workspace};
use crate::ipc::types::{AppState, Request};
use crate::model::{FeeStatus, StudentFeeRecord};
use crate::rules;
use chrono::NaiveDate;
use serde_json::json;

fn refreshed(records: &[StudentFeeRecord], today: NaiveDate) -> Vec<StudentFeeRecord> {
    records
        .iter()
        .map(|r| rules::refresh_overdue(r, today))
        .collect()
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let today = match as_of(req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let Some(ws) = state.workspace.as_ref() else {
        return ok(&req.id, json!({ "studentFees": [] }));
    };
    ok(
        &req.id,
        json!({ "studentFees": refreshed(ws.student_fees.list(), today) }),
    )
}

fn handle_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let today = match as_of(req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let ws = match require_workspace(state, req) {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let record: StudentFeeRecord = match param_record(req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let record = match rules::normalize_student_fee(&record, today) {
        Ok(r) => r,
        Err(e) => return validation_err(&req.id, &e),
    };

    let saved = ws.student_fees.upsert(record);
    ok(
        &req.id,
        json!({ "record": saved, "persisted": ws.student_fees.persisted() }),
    )
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ws = match require_workspace(state, req) {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let id = match param_id(req, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // Payments keep their back-reference; payments.list renders it as unknown.
    let removed = ws.student_fees.contains(id);
    ws.student_fees.remove(id);
    ok(
        &req.id,
        json!({ "removed": removed, "persisted": ws.student_fees.persisted() }),
    )
}

fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let today = match as_of(req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let records = state
        .workspace
        .as_ref()
        .map(|ws| refreshed(ws.student_fees.list(), today))
        .unwrap_or_default();

    let mut total: u64 = 0;
    let mut collected: u64 = 0;
    let mut pending: u64 = 0;
    let mut overdue_amount: u64 = 0;
    let (mut paid_n, mut pending_n, mut partial_n, mut overdue_n) = (0, 0, 0, 0);
    for r in &records {
        // Saturates rather than wrapping on oversized amounts.
        total = total.saturating_add(r.total_amount);
        collected = collected.saturating_add(r.paid_amount);
        pending = pending.saturating_add(r.pending_amount);
        match r.status {
            FeeStatus::Paid => paid_n += 1,
            FeeStatus::Pending => pending_n += 1,
            FeeStatus::Partial => partial_n += 1,
            FeeStatus::Overdue => {
                overdue_n += 1;
                overdue_amount = overdue_amount.saturating_add(r.pending_amount);
            }
        }
    }

    ok(
        &req.id,
        json!({
            "asOf": today,
            "records": records.len(),
            "totalAmount": total,
            "collectedAmount": collected,
            "pendingAmount": pending,
            "overdueAmount": overdue_amount,
            "counts": {
                "Paid": paid_n,
                "Pending": pending_n,
                "Partial": partial_n,
                "Overdue": overdue_n,
            }
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "studentFees.list" => Some(handle_list(state, req)),
        "studentFees.upsert" => Some(handle_upsert(state, req)),
        "studentFees.delete" => Some(handle_delete(state, req)),
        "studentFees.summary" => Some(handle_summary(state, req)),
        _ => None,
    }
}

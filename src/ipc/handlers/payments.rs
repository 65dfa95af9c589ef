use crate::error::ValidationError;
use crate::ipc::error::{err, ok, validation_err};
use crate::ipc::helpers::{param_id, param_opt_date, param_opt_str, require_workspace, today};
use crate::ipc::types::{AppState, Request};
use crate::ledger::{self, PaymentRequest};
use crate::model::{PaymentMethod, PaymentRecord};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRow<'a> {
    #[serde(flatten)]
    payment: &'a PaymentRecord,
    /// `None` when the fee record was deleted after the payment.
    student_name: Option<&'a str>,
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_ref() else {
        return ok(&req.id, json!({ "payments": [] }));
    };
    let rows: Vec<PaymentRow<'_>> = ws
        .payments
        .list()
        .iter()
        .map(|p| PaymentRow {
            payment: p,
            student_name: ws
                .student_fees
                .get(p.student_fee_id)
                .map(|f| f.student_name.as_str()),
        })
        .collect();
    ok(&req.id, json!({ "payments": rows }))
}

fn handle_record(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ws = match require_workspace(state, req) {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let student_fee_id = match param_id(req, "studentFeeId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let amount = match req.params.get("amount") {
        None | Some(serde_json::Value::Null) => {
            return err(&req.id, "bad_params", "missing amount", None)
        }
        Some(v) => match (v.as_u64(), v.as_i64()) {
            (Some(0), _) | (None, Some(_)) => {
                return validation_err(&req.id, &ValidationError::NonPositiveAmount)
            }
            (Some(n), _) => n,
            (None, None) => {
                return err(&req.id, "bad_params", format!("invalid amount: {}", v), None)
            }
        },
    };
    let method: PaymentMethod = match req.params.get("method") {
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(m) => m,
            Err(_) => return err(&req.id, "bad_params", format!("unknown method: {}", v), None),
        },
        None => return err(&req.id, "bad_params", "missing method", None),
    };
    let payment_date = match param_opt_date(req, "paymentDate") {
        Ok(d) => d.unwrap_or_else(today),
        Err(resp) => return resp,
    };

    let request = PaymentRequest {
        student_fee_id,
        amount,
        method,
        receipt_number: param_opt_str(req, "receiptNumber").map(str::to_string),
        payment_date,
    };
    match ledger::record_payment(&mut ws.student_fees, &mut ws.payments, request) {
        Ok(outcome) => ok(
            &req.id,
            json!({
                "payment": outcome.payment,
                "studentFee": outcome.student_fee,
                "persisted": outcome.persisted,
            }),
        ),
        Err(e) => validation_err(&req.id, &e),
    }
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
    let removed = ws.payments.contains(id);
    ws.payments.remove(id);
    ok(
        &req.id,
        json!({ "removed": removed, "persisted": ws.payments.persisted() }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "payments.list" => Some(handle_list(state, req)),
        "payments.record" => Some(handle_record(state, req)),
        "payments.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}

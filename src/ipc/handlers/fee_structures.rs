use crate::ipc::error::{ok, validation_err};
use crate::ipc::helpers::{param_id, param_record, require_workspace};
use crate::ipc::types::{AppState, Request};
use crate::model::FeeStructure;
use crate::validate;
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_ref() else {
        return ok(&req.id, json!({ "feeStructures": [] }));
    };
    ok(&req.id, json!({ "feeStructures": ws.fee_structures.list() }))
}

fn handle_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ws = match require_workspace(state, req) {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let record: FeeStructure = match param_record(req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let record = match validate::fee_structure(&record) {
        Ok(r) => r,
        Err(e) => return validation_err(&req.id, &e),
    };

    let saved = ws.fee_structures.upsert(record);
    ok(
        &req.id,
        json!({ "record": saved, "persisted": ws.fee_structures.persisted() }),
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
    let removed = ws.fee_structures.contains(id);
    ws.fee_structures.remove(id);
    ok(
        &req.id,
        json!({ "removed": removed, "persisted": ws.fee_structures.persisted() }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "feeStructures.list" => Some(handle_list(state, req)),
        "feeStructures.upsert" => Some(handle_upsert(state, req)),
        "feeStructures.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}

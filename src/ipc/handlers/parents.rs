use crate::ipc::error::{ok, validation_err};
use crate::ipc::helpers::{param_id, param_record, require_workspace};
use crate::ipc::types::{AppState, Request};
use crate::model::Parent;
use crate::validate;
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_ref() else {
        return ok(&req.id, json!({ "parents": [] }));
    };
    ok(&req.id, json!({ "parents": ws.parents.list() }))
}

fn handle_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ws = match require_workspace(state, req) {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let record: Parent = match param_record(req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let record = match validate::parent(&record) {
        Ok(r) => r,
        Err(e) => return validation_err(&req.id, &e),
    };

    let saved = ws.parents.upsert(record);
    ok(
        &req.id,
        json!({ "record": saved, "persisted": ws.parents.persisted() }),
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
    let removed = ws.parents.contains(id);
    ws.parents.remove(id);
    ok(
        &req.id,
        json!({ "removed": removed, "persisted": ws.parents.persisted() }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "parents.list" => Some(handle_list(state, req)),
        "parents.upsert" => Some(handle_upsert(state, req)),
        "parents.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}

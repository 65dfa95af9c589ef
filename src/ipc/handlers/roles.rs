use crate::ipc::error::{ok, validation_err};
use crate::ipc::helpers::{param_id, param_record, require_workspace};
use crate::ipc::types::{AppState, Request};
use crate::model::Role;
use crate::validate;
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_ref() else {
        return ok(&req.id, json!({ "roles": [] }));
    };
    ok(&req.id, json!({ "roles": ws.roles.list() }))
}

fn handle_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ws = match require_workspace(state, req) {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let record: Role = match param_record(req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let record = match validate::role(&record, ws.roles.list()) {
        Ok(r) => r,
        Err(e) => return validation_err(&req.id, &e),
    };

    let saved = ws.roles.upsert(record);
    ok(
        &req.id,
        json!({ "record": saved, "persisted": ws.roles.persisted() }),
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
    let removed = ws.roles.contains(id);
    ws.roles.remove(id);
    ok(
        &req.id,
        json!({ "removed": removed, "persisted": ws.roles.persisted() }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roles.list" => Some(handle_list(state, req)),
        "roles.upsert" => Some(handle_upsert(state, req)),
        "roles.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}

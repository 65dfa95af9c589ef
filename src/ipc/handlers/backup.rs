use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{param_opt_str, require_workspace};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ws = match require_workspace(state, req) {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let Some(out_path) = param_opt_str(req, "outPath").map(PathBuf::from) else {
        return err(&req.id, "bad_params", "missing outPath", None);
    };

    match backup::export_bundle(ws.adapter.as_ref(), &out_path) {
        Ok(summary) => {
            info!(out = %out_path.display(), entries = summary.entry_count, "bundle exported");
            ok(
                &req.id,
                json!({
                    "bundleFormat": summary.bundle_format,
                    "entryCount": summary.entry_count,
                }),
            )
        }
        Err(e) => {
            warn!(error = ?e, "bundle export failed");
            err(&req.id, "backup_failed", format!("{e:?}"), None)
        }
    }
}

fn handle_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ws = match require_workspace(state, req) {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let Some(in_path) = param_opt_str(req, "inPath").map(PathBuf::from) else {
        return err(&req.id, "bad_params", "missing inPath", None);
    };

    match backup::import_bundle(ws.adapter.as_ref(), &in_path) {
        Ok(summary) => {
            ws.reload();
            info!(input = %in_path.display(), keys = ?summary.restored_keys, "bundle imported");
            ok(
                &req.id,
                json!({
                    "bundleFormat": summary.bundle_format_detected,
                    "restoredKeys": summary.restored_keys,
                }),
            )
        }
        Err(e) => {
            warn!(error = ?e, "bundle import failed");
            let details = e.downcast_ref::<backup::PartialRestore>().map(|p| {
                json!({ "partial": true, "restoredKeys": p.restored, "failedKey": p.failed })
            });
            if details.is_some() {
                // Some snapshots were replaced; bring the stores back in line.
                ws.reload();
            }
            err(&req.id, "backup_failed", format!("{e:?}"), details)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportBundle" => Some(handle_export(state, req)),
        "backup.importBundle" => Some(handle_import(state, req)),
        _ => None,
    }
}

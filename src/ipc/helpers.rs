use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::store::RecordId;
use crate::workspace::Workspace;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

pub fn require_workspace<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut Workspace, serde_json::Value> {
    state
        .workspace
        .as_mut()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn param_record<T: DeserializeOwned>(req: &Request) -> Result<T, serde_json::Value> {
    let Some(raw) = req.params.get("record") else {
        return Err(err(&req.id, "bad_params", "missing record", None));
    };
    serde_json::from_value(raw.clone())
        .map_err(|e| err(&req.id, "bad_params", format!("invalid record: {}", e), None))
}

pub fn param_id(req: &Request, name: &str) -> Result<RecordId, serde_json::Value> {
    req.params
        .get(name)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", name), None))
}

pub fn param_opt_str<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.params
        .get(name)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub fn param_opt_date(req: &Request, name: &str) -> Result<Option<NaiveDate>, serde_json::Value> {
    let Some(raw) = param_opt_str(req, name) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be a YYYY-MM-DD date", name),
                None,
            )
        })
}

/// `params.asOf` when supplied, otherwise the local calendar date.
pub fn as_of(req: &Request) -> Result<NaiveDate, serde_json::Value> {
    Ok(param_opt_date(req, "asOf")?.unwrap_or_else(today))
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capture::scrape_profile;
use crate::config::SelectorSettings;
use crate::db;
use crate::error::StoreError;
use crate::model::ProfileRecord;
use crate::page::Page;

/// One request on the message boundary, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ScrapeProfile,
    SaveProfile {
        data: ProfileRecord,
    },
    GetAllProfiles,
    DeleteProfile {
        #[serde(rename = "profileId")]
        profile_id: String,
    },
    ClearAllProfiles,
}

/// `{success, ...payload}` on success, `{success: false, error}` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ProfileRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<BTreeMap<String, ProfileRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Response { success: true, ..Default::default() }
    }

    pub fn failure(error: impl ToString) -> Self {
        Response { success: false, error: Some(error.to_string()), ..Default::default() }
    }
}

impl From<Result<Response, StoreError>> for Response {
    fn from(result: Result<Response, StoreError>) -> Self {
        result.unwrap_or_else(|e| {
            if e.is_not_found() {
                debug!(error = %e, "Rejected request");
            } else {
                warn!(error = %e, "Store request failed");
            }
            Response::failure(e)
        })
    }
}

/// Answer one request. Never fails: store errors come back as `{success: false}`.
pub fn dispatch<P: Page>(
    conn: &Connection,
    page: Option<&P>,
    selectors: &SelectorSettings,
    request: Request,
) -> Response {
    match request {
        Request::ScrapeProfile => match page {
            Some(page) => Response { data: Some(scrape_profile(page, selectors)), ..Response::ok() },
            None => Response::failure("No page attached"),
        },
        Request::SaveProfile { data } => db::save(conn, &data)
            .map(|()| {
                info!(profile_id = ?data.profile_id, "Profile saved");
                Response::ok()
            })
            .into(),
        Request::GetAllProfiles => db::get_all(conn)
            .map(|profiles| Response { profiles: Some(profiles), ..Response::ok() })
            .into(),
        Request::DeleteProfile { profile_id } => {
            db::delete(conn, &profile_id).map(|()| Response::ok()).into()
        }
        Request::ClearAllProfiles => db::clear_all(conn).map(|_| Response::ok()).into(),
    }
}

/// Parse one line of JSON and dispatch it. Malformed requests get a failure response.
pub fn handle_line<P: Page>(
    conn: &Connection,
    page: Option<&P>,
    selectors: &SelectorSettings,
    line: &str,
) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(conn, page, selectors, request),
        Err(e) => Response::failure(format!("Invalid request: {}", e)),
    }
}

use serde::{Deserialize, Serialize};

/// A single to-do entry.
///
/// Items live in one shared table; every client (web UI, API, Telegram bot)
/// sees the same list. The id is assigned by the store on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub text: String,
}

/// Body for `POST /api/add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemInput {
    pub text: String,
}

/// Body for `POST /api/edit`. The text replaces the stored value wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditItemInput {
    pub id: i64,
    pub text: String,
}

/// Body for `POST /api/delete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteItemInput {
    pub id: i64,
}

/// Response for `POST /api/add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemResponse {
    pub id: i64,
}

/// Response for mutations that report no data beyond their outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

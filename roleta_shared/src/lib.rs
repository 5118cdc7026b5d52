use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ItemDto {
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SectorDto {
    pub name: String,
    pub weight: f64,
    pub start_deg: f64,
    pub end_deg: f64,
}

/// Everything an external renderer needs: the list, its derived sectors,
/// the live rotation and the settle delay to animate over.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WheelResponse {
    pub items: Vec<ItemDto>,
    pub sectors: Vec<SectorDto>,
    pub rotation: f64,
    pub spinning: bool,
    pub settle_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AddItemRequest {
    pub name: String,
    /// Defaults to 1.0 when omitted.
    pub weight: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SetWeightRequest {
    pub weight: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpinResponse {
    /// False when the wheel had no items and the request was a no-op.
    pub started: bool,
    pub rotation: f64,
    pub settle_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutcomeResponse {
    pub selected: Option<String>,
    pub ts: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpinLogEntry {
    pub id: i64,
    pub ts: DateTime<Utc>,
    pub rotation: f64,
    pub selected: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("no such item: {0}")]
    NotFound(String),
    #[error("a spin is already in flight")]
    SpinInFlight,
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal server error")]
    Internal,
}

pub type ApiResult<T> = Result<T, ApiError>;

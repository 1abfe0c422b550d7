//! Teescanner response types for `getTeeTimeListbyGolfclub`.
//!
//! ### Envelope
//! Slots live at `data.teeTimeList`. Clubs with nothing bookable come back
//! with `data: null` or without the list at all; both mean zero slots.
//!
//! ### `price`
//! Usually an integer in won, occasionally a formatted string. Kept as a raw
//! JSON value and normalized per slot.
//!
//! ### `teetime_time`
//! `"HH:MM"` local tee-off time.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct TeeTimeListResponse {
    #[serde(default)]
    pub data: Option<TeeTimeListData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TeeTimeListData {
    #[serde(default, rename = "teeTimeList")]
    pub tee_time_list: Vec<TeeTimeSlot>,
}

#[derive(Debug, Deserialize)]
pub struct TeeTimeSlot {
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub teetime_time: Option<String>,
}

impl TeeTimeListResponse {
    #[must_use]
    pub fn into_slots(self) -> Vec<TeeTimeSlot> {
        self.data.map(|d| d.tee_time_list).unwrap_or_default()
    }
}

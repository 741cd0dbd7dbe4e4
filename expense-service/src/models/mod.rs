//! Wire types for the receipt-parsing and per-diem endpoints.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// The 16 fixed accounting codes used to classify an expense.
pub const EXPENSE_CATEGORIES: [&str; 16] = [
    "5400 Direct Travel",
    "5450 Direct Lodging",
    "5500 Direct Meals and Incidental",
    "6120 Fringe Staff Education",
    "7336 OVERHEAD COSTS:OH Seminars/Trainings",
    "7580 OH Travel",
    "7585 OH Business Meals",
    "8190 G&A Office supplies",
    "8197 G&A Office parking/tolls",
    "8207 G&A Conference/Seminar",
    "8231 BD Travel",
    "8232 BD Meals",
    "8320 G&A Travel",
    "8321 G&A Business meals",
    "8330 G&A Office supplies",
    "9080 Employee Morale",
];

/// Category assigned when parsing fails and a fallback record is returned.
pub const FALLBACK_CATEGORY: &str = "8330 G&A Office supplies";

/// Inbound body for `POST /api/v1/parse-receipt`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseReceiptRequest {
    #[serde(default)]
    pub base64_image: String,
}

/// Structured fields extracted from a receipt image.
///
/// `category` is whatever the model returned; the schema enum constrains
/// generation but the value is not re-validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReceiptData {
    /// Transaction date in `YYYY-MM-DD` format.
    pub date: String,
    /// Short vendor or purchase description.
    pub description: String,
    /// Final total amount, no currency symbols.
    pub amount: f64,
    /// One of the 16 expense category codes.
    pub category: String,
}

impl ParsedReceiptData {
    /// Record substituted on any parsing failure so callers always receive
    /// a well-typed object.
    pub fn fallback() -> Self {
        Self {
            date: Local::now().format("%Y-%m-%d").to_string(),
            description: String::new(),
            amount: 0.0,
            category: FALLBACK_CATEGORY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStatus {
    Success,
    Error,
}

/// Envelope wrapping every response from the receipt endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseReceiptResponse {
    pub status: ParseStatus,
    pub data: ParsedReceiptData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ParseReceiptResponse {
    pub fn success(data: ParsedReceiptData) -> Self {
        Self {
            status: ParseStatus::Success,
            data,
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            status: ParseStatus::Error,
            data: ParsedReceiptData::fallback(),
            message: Some(message),
        }
    }
}

/// Query parameters for `GET /api/v1/perdiem`.
///
/// Location is a ZIP code or a city/state pair.
#[derive(Debug, Clone, Deserialize)]
pub struct PerDiemQuery {
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub year: i32,
}

/// Combined per-diem envelope: the location (lodging) lookup plus the
/// M&IE breakdown table, each passed through from the GSA API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerDiemRates {
    pub location_data: LocationRates,
    pub meal_rates: Vec<MealRates>,
}

/// GSA location rates response (`rates/zip/...` or `rates/city/...`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationRates {
    #[serde(default)]
    pub rates: Vec<LocationRateRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationRateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub rate: Vec<LocationRate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationRate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// M&IE total for the location; keys into the meal-rates table.
    #[serde(default)]
    pub meals: f64,
    #[serde(default)]
    pub months: LodgingMonths,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LodgingMonths {
    #[serde(default)]
    pub month: Vec<MonthlyLodgingRate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyLodgingRate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default)]
    pub value: f64,
}

/// GSA M&IE breakdown response (`rates/conus/mie/{year}` entries).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealRates {
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub breakfast: f64,
    #[serde(default)]
    pub lunch: f64,
    #[serde(default)]
    pub dinner: f64,
    #[serde(default)]
    pub incidental: f64,
}

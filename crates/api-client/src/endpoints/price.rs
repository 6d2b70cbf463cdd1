//! Price lookup endpoint
//!
//! `GET <base>/app.aspx?barcode=<barcode>` answers with
//! `{"barcode": "...", "invName": "...", "price": "..."}`. An empty
//! `barcode` field means the item is unknown.

use crate::client::PriceClient;
use crate::error::{ApiError, ApiResult};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::{debug, info};

/// Path of the lookup script below the base URL
pub const LOOKUP_PATH: &str = "app.aspx";

/// Price lookup API interface
#[derive(Clone)]
pub struct PriceApi {
    client: PriceClient,
}

impl PriceApi {
    pub(crate) fn new(client: PriceClient) -> Self {
        Self { client }
    }

    /// Look one barcode up
    ///
    /// GET /app.aspx?barcode=<barcode>
    pub async fn lookup(&self, barcode: &str) -> ApiResult<LookupOutcome> {
        let url = self.client.url(LOOKUP_PATH, &[("barcode", barcode)])?;
        debug!(barcode = %barcode, url = %url, "Looking up price");

        let body = self.client.get_text(url).await?;
        let outcome = parse_price_response(&body, barcode)?;

        match &outcome {
            LookupOutcome::Found(record) => {
                info!(barcode = %record.barcode(), price = %record.price(), "Price found");
            }
            LookupOutcome::NotFound { barcode } => info!(barcode = %barcode, "No item for barcode"),
        }
        Ok(outcome)
    }
}

/// Result of a lookup that reached the server and was understood
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The server knows the item
    Found(PriceRecord),
    /// The server answered with an empty barcode
    NotFound {
        /// Barcode that was asked for
        barcode: String,
    },
}

/// One priced item, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    barcode: String,
    #[serde(rename = "invName")]
    item_name: String,
    price: String,
    #[serde(skip)]
    amount: Decimal,
}

impl PriceRecord {
    /// Build a found record; the barcode must be non-empty and the price a decimal
    pub fn new(
        barcode: impl Into<String>,
        item_name: impl Into<String>,
        price: impl Into<String>,
    ) -> ApiResult<Self> {
        let barcode = barcode.into();
        if barcode.is_empty() {
            return Err(ApiError::parse("a price record needs a barcode"));
        }
        let price = price.into();
        let amount = parse_amount(&price)?;

        Ok(Self {
            barcode,
            item_name: item_name.into(),
            price,
            amount,
        })
    }

    /// Barcode as confirmed by the server
    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    /// Item name for display
    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    /// Price exactly as the server sent it
    pub fn price(&self) -> &str {
        &self.price
    }

    /// Price as a decimal number
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Parse a decimal price such as `"2.5"`, `"19"` or `"1e2"`
///
/// Digit group separators (`"1_000"`) are rejected. Magnitudes beyond what
/// [`Decimal`] holds, about 7.9e28, are a parse error too.
pub fn parse_amount(price: &str) -> ApiResult<Decimal> {
    let trimmed = price.trim();
    if trimmed.contains('_') {
        return Err(ApiError::parse(format!("price '{price}' is not a number")));
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ApiError::parse(format!("price '{price}' is not a number")))
}

/// Interpret a response body for the requested barcode
pub fn parse_price_response(body: &str, requested: &str) -> ApiResult<LookupOutcome> {
    let value: Value = serde_json::from_str(body)?;
    let object = value
        .as_object()
        .ok_or_else(|| ApiError::parse("response is not a JSON object"))?;

    let barcode = string_field(object, "barcode")?;
    let item_name = string_field(object, "invName")?;
    let price = string_field(object, "price")?;

    if barcode.is_empty() {
        return Ok(LookupOutcome::NotFound {
            barcode: requested.to_string(),
        });
    }

    PriceRecord::new(barcode, item_name, price).map(LookupOutcome::Found)
}

/// Strings are taken as-is and numbers stringified; anything else is rejected
fn string_field(object: &Map<String, Value>, name: &str) -> ApiResult<String> {
    match object.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(ApiError::parse(format!(
            "field '{name}' should be a string, got {other}"
        ))),
        None => Err(ApiError::parse(format!("missing field '{name}'"))),
    }
}

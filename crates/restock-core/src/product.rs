use serde::{Deserialize, Serialize};

/// One product as returned by the shop's listing endpoint.
///
/// Every field defaults so a partially populated record decodes to
/// "not purchasable" instead of failing the whole feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub inventory_quantity: i64,
    #[serde(default)]
    pub price: f64,
}

/// Envelope around the product listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFeed {
    #[serde(default)]
    pub data: Vec<ProductRecord>,
}

impl ProductFeed {
    /// Decode the raw JSON body captured from the in-page fetch.
    ///
    /// A response with no `data` key is a valid empty feed; a body that is
    /// not a JSON object at all is rejected.
    pub fn from_value(value: serde_json::Value) -> crate::Result<Vec<ProductRecord>> {
        if !value.is_object() {
            return Err(crate::Error::Shape(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        }

        let feed: ProductFeed = serde_json::from_value(value)?;
        tracing::debug!("Decoded {} products from feed", feed.data.len());
        Ok(feed.data)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

use serde::{Deserialize, Serialize};

use docmail_core::Money;

/// A priced line on a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item_name: String,
    pub description: Option<String>,
    /// May be fractional (hours, kilograms).
    pub quantity: f64,
    /// Unit price.
    pub price: Money,
    pub total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_and_whole_quantities_decode() {
        let item: LineItem = serde_json::from_value(serde_json::json!({
            "itemName": "Consulting",
            "description": null,
            "quantity": 1.5,
            "price": 200000,
            "total": 300000
        }))
        .unwrap();
        assert_eq!(item.quantity, 1.5);

        let whole: LineItem = serde_json::from_value(serde_json::json!({
            "itemName": "Design",
            "description": "Landing page",
            "quantity": 2,
            "price": 50000,
            "total": 100000
        }))
        .unwrap();
        assert_eq!(whole.quantity, 2.0);
    }
}

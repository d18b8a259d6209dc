//! Receipt line items, before and after consolidation.

use serde::{Deserialize, Serialize};

use crate::invoice::normalize::{format_br_decimal, format_quantity};

/// One item row as read from the invoice page.
///
/// Numeric fields hold `NaN` when the page text could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    /// Product description.
    pub title: String,
    /// Product code, digits only.
    pub code: String,
    /// Quantity purchased.
    pub qtd: f64,
    /// Unit price.
    pub amount_unit: f64,
    /// Line total.
    pub amount_total: f64,
}

/// One product after duplicate rows were merged, formatted for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedItem {
    pub title: String,
    pub code: String,
    /// Summed quantity, shortest decimal form (`"3"`, `"1.5"`).
    pub qtd: String,
    /// Unit price of the first merged row, `"20,00"` form.
    pub amount_unit: String,
    /// Summed line total, `"60,00"` form.
    pub amount_total: String,
}

impl From<RawItem> for ConsolidatedItem {
    fn from(item: RawItem) -> Self {
        Self {
            qtd: format_quantity(item.qtd),
            amount_unit: format_br_decimal(item.amount_unit),
            amount_total: format_br_decimal(item.amount_total),
            title: item.title,
            code: item.code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serializes_with_camel_case_fields() {
        let item = ConsolidatedItem::from(RawItem {
            title: "Feijao 1kg".to_string(),
            code: "789100".to_string(),
            qtd: 2.0,
            amount_unit: 8.5,
            amount_total: 17.0,
        });

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Feijao 1kg",
                "code": "789100",
                "qtd": "2",
                "amountUnit": "8,50",
                "amountTotal": "17,00"
            })
        );
    }
}

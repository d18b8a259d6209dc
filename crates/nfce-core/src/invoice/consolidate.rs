//! Merging duplicate receipt rows into one entry per product.

use std::collections::HashMap;

use tracing::debug;

use crate::models::item::{ConsolidatedItem, RawItem};

use super::normalize::consolidation_key;

/// Merge rows sharing `title-code`, keeping first-appearance order.
///
/// Quantities and line totals are summed. The unit price stays the one of
/// the first row seen for the product.
pub fn consolidate(items: &[RawItem]) -> Vec<ConsolidatedItem> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(items.len());
    let mut merged: Vec<RawItem> = Vec::with_capacity(items.len());

    for item in items {
        let key = consolidation_key(&item.title, &item.code);

        match positions.get(&key) {
            Some(&pos) => {
                let entry = &mut merged[pos];
                entry.qtd += item.qtd;
                entry.amount_total += item.amount_total;

                if entry.amount_unit != item.amount_unit {
                    debug!(
                        "Unit price differs for {}: keeping {} over {}",
                        key, entry.amount_unit, item.amount_unit
                    );
                }
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(item.clone());
            }
        }
    }

    debug!("Consolidated {} rows into {} items", items.len(), merged.len());

    merged.into_iter().map(ConsolidatedItem::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(title: &str, code: &str, qtd: f64, unit: f64, total: f64) -> RawItem {
        RawItem {
            title: title.to_string(),
            code: code.to_string(),
            qtd,
            amount_unit: unit,
            amount_total: total,
        }
    }

    fn out(title: &str, code: &str, qtd: &str, unit: &str, total: &str) -> ConsolidatedItem {
        ConsolidatedItem {
            title: title.to_string(),
            code: code.to_string(),
            qtd: qtd.to_string(),
            amount_unit: unit.to_string(),
            amount_total: total.to_string(),
        }
    }

    #[test]
    fn test_merges_duplicates_around_other_item() {
        let items = vec![
            raw("Arroz 5kg", "7891234", 1.0, 20.0, 20.0),
            raw("Feijao 1kg", "7895555", 2.0, 8.5, 17.0),
            raw("Arroz 5kg", "7891234", 2.0, 20.0, 40.0),
        ];

        assert_eq!(
            consolidate(&items),
            vec![
                out("Arroz 5kg", "7891234", "3", "20,00", "60,00"),
                out("Feijao 1kg", "7895555", "2", "8,50", "17,00"),
            ]
        );
    }

    #[test]
    fn test_unique_keys_only_reformat() {
        let items = vec![
            raw("Banana", "1", 1.5, 5.99, 8.985),
            raw("Maca", "2", 0.5, 10.0, 5.0),
        ];

        assert_eq!(
            consolidate(&items),
            vec![
                out("Banana", "1", "1.5", "5,99", "8,98"),
                out("Maca", "2", "0.5", "10,00", "5,00"),
            ]
        );
    }

    #[test]
    fn test_first_unit_price_wins() {
        let items = vec![
            raw("Refrigerante", "42", 1.0, 7.0, 7.0),
            raw("Refrigerante", "42", 1.0, 6.5, 6.5),
        ];

        let result = consolidate(&items);
        assert_eq!(result, vec![out("Refrigerante", "42", "2", "7,00", "13,50")]);
    }

    #[test]
    fn test_same_title_different_code_stays_separate() {
        let items = vec![
            raw("Agua 500ml", "100", 1.0, 2.0, 2.0),
            raw("Agua 500ml", "200", 1.0, 2.0, 2.0),
        ];

        assert_eq!(consolidate(&items).len(), 2);
    }

    #[test]
    fn test_nan_propagates_into_sum() {
        let items = vec![
            raw("Pao", "9", 1.0, f64::NAN, 0.8),
            raw("Pao", "9", f64::NAN, 0.8, 0.8),
        ];

        assert_eq!(consolidate(&items), vec![out("Pao", "9", "NaN", "NaN", "1,60")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(consolidate(&[]).is_empty());
    }
}

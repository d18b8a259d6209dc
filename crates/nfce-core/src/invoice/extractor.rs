//! Item table extraction from the NFC-e consultation page.

use std::fmt;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::item::RawItem;

use super::normalize::{digits_only, parse_br_number, strip_label};
use super::patterns::{
    CODE, ITEM_ROW, QUANTITY, QUANTITY_LABEL, TABLE, TITLE, TOTAL_VALUE, UNIT_VALUE,
    UNIT_VALUE_LABEL,
};

/// Numeric field of an item row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericField {
    Qtd,
    AmountUnit,
    AmountTotal,
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericField::Qtd => write!(f, "qtd"),
            NumericField::AmountUnit => write!(f, "amountUnit"),
            NumericField::AmountTotal => write!(f, "amountTotal"),
        }
    }
}

/// A numeric fragment that did not parse; the row keeps `NaN` for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionWarning {
    /// Zero-based index of the row among matched item rows.
    pub row: usize,
    pub field: NumericField,
    /// Fragment text after label removal.
    pub raw: String,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: unparsable {} {:?}", self.row, self.field, self.raw)
    }
}

/// Rows read from one invoice page.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Items in document order.
    pub items: Vec<RawItem>,
    pub warnings: Vec<ExtractionWarning>,
}

/// Reads item rows out of the invoice HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableExtractor;

impl TableExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every item row. A page without item rows yields no items.
    pub fn extract(&self, html: &str) -> Extraction {
        let document = Html::parse_document(html);
        let mut extraction = Extraction::default();

        for (index, row) in document.select(&ITEM_ROW).enumerate() {
            let item = self.extract_row(index, row, &mut extraction.warnings);
            extraction.items.push(item);
        }

        debug!(
            "Extracted {} item rows ({} warnings)",
            extraction.items.len(),
            extraction.warnings.len()
        );

        extraction
    }

    fn extract_row(
        &self,
        index: usize,
        row: ElementRef<'_>,
        warnings: &mut Vec<ExtractionWarning>,
    ) -> RawItem {
        let title = row
            .select(&TITLE)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default()
            .trim()
            .to_string();

        let code = digits_only(&fragment_text(row, &CODE));

        let qtd_text = strip_label(&fragment_text(row, &QUANTITY), QUANTITY_LABEL);
        let unit_text = strip_label(&fragment_text(row, &UNIT_VALUE), UNIT_VALUE_LABEL);
        let total_text = fragment_text(row, &TOTAL_VALUE).trim().to_string();

        RawItem {
            qtd: parse_field(index, NumericField::Qtd, qtd_text, warnings),
            amount_unit: parse_field(index, NumericField::AmountUnit, unit_text, warnings),
            amount_total: parse_field(index, NumericField::AmountTotal, total_text, warnings),
            title,
            code,
        }
    }
}

/// Inner HTML of the first `<table>` on the page.
pub fn first_table_html(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document.select(&TABLE).next().map(|table| table.inner_html())
}

/// Text of every element matching `selector` inside `row`, concatenated.
fn fragment_text(row: ElementRef<'_>, selector: &Selector) -> String {
    row.select(selector).flat_map(|el| el.text()).collect()
}

fn parse_field(
    row: usize,
    field: NumericField,
    raw: String,
    warnings: &mut Vec<ExtractionWarning>,
) -> f64 {
    match parse_br_number(&raw) {
        Some(value) => value,
        None => {
            let warning = ExtractionWarning { row, field, raw };
            warn!("{}", warning);
            warnings.push(warning);
            f64::NAN
        }
    }
}

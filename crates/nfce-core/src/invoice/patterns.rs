//! Structural markers of the NFC-e consultation page.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::Selector;

/// Label preceding the quantity inside its fragment.
pub const QUANTITY_LABEL: &str = "Qtde.:";

/// Label preceding the unit price inside its fragment.
pub const UNIT_VALUE_LABEL: &str = "Vl. Unit.:";

lazy_static! {
    pub static ref NON_DIGIT: Regex = Regex::new(r"[^0-9]").unwrap();

    // Item rows carry ids like "Item + 1"; header and footer rows don't.
    pub static ref ITEM_ROW: Selector = Selector::parse(r#"tr[id^="Item"]"#).unwrap();

    pub static ref TITLE: Selector = Selector::parse(".txtTit").unwrap();
    pub static ref CODE: Selector = Selector::parse(".RCod").unwrap();
    pub static ref QUANTITY: Selector = Selector::parse(".Rqtd").unwrap();
    pub static ref UNIT_VALUE: Selector = Selector::parse(".RvlUnit").unwrap();
    pub static ref TOTAL_VALUE: Selector = Selector::parse(".valor").unwrap();

    pub static ref TABLE: Selector = Selector::parse("table").unwrap();
}

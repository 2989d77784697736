use std::{collections::HashMap, str::FromStr};

use crate::utils::text::parse_number;

/// Columns of the per-stock daily trading report (`STOCK_DAY`). Parses from
/// the exchange's column title or an English alias.
#[derive(
    Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display, strum::EnumIter, strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum DailyField {
    #[strum(to_string = "日期", serialize = "date")]
    Date,

    #[strum(to_string = "成交股數", serialize = "shares")]
    SharesTraded,

    #[strum(to_string = "成交金額", serialize = "amount")]
    AmountTraded,

    #[strum(to_string = "開盤價", serialize = "open")]
    Open,

    #[strum(to_string = "最高價", serialize = "high")]
    High,

    #[strum(to_string = "最低價", serialize = "low")]
    Low,

    #[strum(to_string = "收盤價", serialize = "close")]
    Close,

    #[strum(to_string = "漲跌價差", serialize = "change")]
    Change,

    #[strum(to_string = "成交筆數", serialize = "trades", serialize = "volume")]
    TradeCount,
}

/// One trading day of one ticker, values kept as the exchange's text.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyRecord {
    pub date: String,
    values: HashMap<DailyField, String>,
}

impl DailyRecord {
    /// Zip a report row against its declared columns. Unknown columns are
    /// ignored; a row without a date yields `None`.
    pub fn from_row(fields: &[String], row: &[String]) -> Option<Self> {
        let mut date: Option<String> = None;
        let mut values: HashMap<DailyField, String> = HashMap::new();

        for (field_name, value) in fields.iter().zip(row.iter()) {
            match DailyField::from_str(field_name.trim()) {
                Ok(DailyField::Date) => date = Some(value.trim().to_string()),
                Ok(field) => {
                    values.insert(field, value.trim().to_string());
                }
                Err(_) => {}
            }
        }

        date.filter(|d| !d.is_empty())
            .map(|date| Self { date, values })
    }

    pub fn get(&self, field: DailyField) -> Option<&str> {
        match field {
            DailyField::Date => Some(&self.date),
            _ => self.values.get(&field).map(String::as_str),
        }
    }

    pub fn value(&self, field: DailyField) -> Option<f64> {
        match field {
            DailyField::Date => None,
            _ => self.get(field).and_then(parse_number),
        }
    }
}

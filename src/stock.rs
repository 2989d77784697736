use std::{fmt::Display, str::FromStr};

use log::debug;
use serde_json::{Map, Value};

use crate::{
    data::{
        daily::{DailyField, DailyRecord},
        realtime::{RealTimeField, RealTimeSnapshot},
        report::ReportPayload,
        series::{Interval, OhlcRow, SeriesPoint, aggregate},
    },
    error::{TsError, TsResult},
    utils::{datetime::DateRange, text::is_ticker},
};

/// Anything [`Stock::get`] can answer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StockField {
    /// The day-record collection.
    Daily,
    RealTime(RealTimeField),
}

impl FromStr for StockField {
    type Err = TsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "每日交易資料" || s.eq_ignore_ascii_case("daily") {
            return Ok(Self::Daily);
        }

        RealTimeField::from_str(s)
            .map(Self::RealTime)
            .map_err(|_| TsError::FieldNotFound(s.to_string()))
    }
}

#[derive(Debug, PartialEq)]
pub enum StockValue<'a> {
    Daily(Vec<&'a DailyRecord>),
    Text(&'a str),
}

/// One ticker's merged daily rows and its latest quote.
#[derive(Clone, Debug)]
pub struct Stock {
    symbol: String,
    daily: Option<Vec<DailyRecord>>,
    real_time: Option<RealTimeSnapshot>,
}

impl Stock {
    pub fn new(symbol: &str) -> TsResult<Self> {
        let symbol = symbol.trim();
        if !is_ticker(symbol) {
            return Err(TsError::ValidationError {
                code: "INVALID_TICKER",
                message: format!("Invalid ticker '{symbol}'"),
            });
        }

        Ok(Self {
            symbol: symbol.to_uppercase(),
            daily: None,
            real_time: None,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Populate either half; `None` leaves that half untouched.
    pub fn set_data(
        &mut self,
        daily: Option<ReportPayload>,
        real_time: Option<Map<String, Value>>,
    ) {
        if let Some(item) = real_time {
            let snapshot = RealTimeSnapshot::from_json(&item);
            debug!("[{}] {} real-time fields", self.symbol, snapshot.len());
            self.real_time = Some(snapshot);
        }

        if let Some(payload) = daily {
            let records = self.daily.get_or_insert_with(Vec::new);
            let mut skipped = 0;

            for row in &payload.data {
                match DailyRecord::from_row(&payload.fields, row) {
                    Some(record) => records.push(record),
                    None => skipped += 1,
                }
            }

            debug!(
                "[{}] {} daily records, {skipped} rows without date",
                self.symbol,
                records.len()
            );
        }
    }

    pub fn get(&self, field: StockField, range: Option<&DateRange>) -> TsResult<StockValue<'_>> {
        match field {
            StockField::Daily => {
                let records = self
                    .daily
                    .as_ref()
                    .ok_or_else(|| TsError::FieldNotFound(format!("{}: daily", self.symbol)))?;

                Ok(StockValue::Daily(
                    records
                        .iter()
                        .filter(|r| range.is_none_or(|range| range.contains(&r.date)))
                        .collect(),
                ))
            }
            StockField::RealTime(field) => self
                .real_time
                .as_ref()
                .and_then(|snapshot| snapshot.get(field))
                .map(StockValue::Text)
                .ok_or_else(|| TsError::FieldNotFound(format!("{}: {field}", self.symbol))),
        }
    }

    pub fn daily_records(&self, range: Option<&DateRange>) -> TsResult<Vec<&DailyRecord>> {
        match self.get(StockField::Daily, range)? {
            StockValue::Daily(records) => Ok(records),
            StockValue::Text(_) => Ok(vec![]),
        }
    }

    pub fn real_time(&self, field: RealTimeField) -> Option<&str> {
        self.real_time.as_ref().and_then(|s| s.get(field))
    }

    pub fn short_name(&self) -> Option<&str> {
        self.real_time(RealTimeField::ShortName)
    }

    pub fn full_name(&self) -> Option<&str> {
        self.real_time(RealTimeField::FullName)
    }

    /// `(date, value)` of one daily column, sorted by date, non-numeric cells
    /// dropped. `None` when no row survives.
    pub fn daily_field_transform(
        &self,
        field: DailyField,
        interval: Interval,
        range: Option<&DateRange>,
    ) -> TsResult<Option<Vec<SeriesPoint>>> {
        let points: Vec<SeriesPoint> = self
            .daily_records(range)?
            .into_iter()
            .filter_map(|r| r.value(field).map(|v| SeriesPoint::new(&r.date, v)))
            .collect();

        if points.is_empty() {
            return Ok(None);
        }

        Ok(Some(aggregate(points, interval)))
    }

    /// Candles for every day whose four prices all parse, sorted by date.
    pub fn kline(&self, range: Option<&DateRange>) -> TsResult<Option<Vec<OhlcRow>>> {
        let mut rows: Vec<OhlcRow> = self
            .daily_records(range)?
            .into_iter()
            .filter_map(|r| {
                Some(OhlcRow {
                    date: r.date.to_string(),
                    open: r.value(DailyField::Open)?,
                    high: r.value(DailyField::High)?,
                    low: r.value(DailyField::Low)?,
                    close: r.value(DailyField::Close)?,
                })
            })
            .collect();

        if rows.is_empty() {
            return Ok(None);
        }

        rows.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(Some(rows))
    }
}

impl Display for Stock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.symbol, self.short_name().unwrap_or("-"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::utils::datetime::check_date_range;

    fn payload(rows: &[[&str; 9]]) -> ReportPayload {
        ReportPayload {
            fields: [
                "日期",
                "成交股數",
                "成交金額",
                "開盤價",
                "最高價",
                "最低價",
                "收盤價",
                "漲跌價差",
                "成交筆數",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            data: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn sample_stock() -> Stock {
        let mut stock = Stock::new("2330").unwrap();
        stock.set_data(
            Some(payload(&[
                ["20250203", "1,000", "1", "1,050.00", "1,060.00", "1,040.00", "1,055.00", "+5.00", "100"],
                ["20250102", "2,000", "1", "1,070.00", "1,080.00", "1,065.00", "1,075.00", "-5.00", "300"],
                ["20250106", "3,000", "1", "--", "--", "--", "--", "0.00", "0"],
                ["20250103", "4,000", "1", "1,080.00", "1,090.00", "1,075.00", "1,085.00", "+10.00", "200"],
                ["20250204", "5,000", "1", "1,055.00", "1,065.00", "1,055.00", "1,055.00", "0.00", "400"],
            ])),
            json!({"n": "台積電", "nf": "台灣積體電路製造股份有限公司", "z": "1075.0000"})
                .as_object()
                .cloned(),
        );
        stock
    }

    #[test]
    fn test_new() {
        assert_eq!(Stock::new(" 2330 ").unwrap().symbol(), "2330");
        assert!(matches!(
            Stock::new(""),
            Err(TsError::ValidationError { .. })
        ));
        assert!(Stock::new("23 30").is_err());
    }

    #[test]
    fn test_stock_field_parse() {
        assert_eq!(StockField::from_str("每日交易資料").unwrap(), StockField::Daily);
        assert_eq!(StockField::from_str("daily").unwrap(), StockField::Daily);
        assert_eq!(
            StockField::from_str("股票簡稱").unwrap(),
            StockField::RealTime(RealTimeField::ShortName)
        );
        assert!(matches!(
            StockField::from_str("股價"),
            Err(TsError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_get() {
        let stock = sample_stock();

        assert_eq!(
            stock
                .get(StockField::RealTime(RealTimeField::ShortName), None)
                .unwrap(),
            StockValue::Text("台積電")
        );
        assert!(matches!(
            stock.get(StockField::RealTime(RealTimeField::Open), None),
            Err(TsError::FieldNotFound(_))
        ));

        assert_eq!(stock.daily_records(None).unwrap().len(), 5);

        let january = check_date_range(Some("20250101"), Some("20250131")).unwrap();
        let records = stock.daily_records(Some(&january)).unwrap();
        let dates: Vec<&str> = records.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["20250102", "20250106", "20250103"]);

        assert_eq!(stock.to_string(), "2330: 台積電");
        assert_eq!(stock.full_name(), Some("台灣積體電路製造股份有限公司"));
    }

    #[test]
    fn test_partial_population() {
        let mut stock = Stock::new("2330").unwrap();
        stock.set_data(None, json!({"z": "1075.0000"}).as_object().cloned());

        assert!(matches!(
            stock.get(StockField::Daily, None),
            Err(TsError::FieldNotFound(_))
        ));
        assert_eq!(stock.real_time(RealTimeField::Price), Some("1075.0000"));
        assert_eq!(stock.to_string(), "2330: -");

        let mut stock = Stock::new("2330").unwrap();
        stock.set_data(Some(payload(&[])), None);

        assert!(stock.daily_records(None).unwrap().is_empty());
        assert!(stock.short_name().is_none());
        assert_eq!(
            stock
                .daily_field_transform(DailyField::Close, Interval::Day, None)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_daily_field_transform_day() {
        let stock = sample_stock();

        let points = stock
            .daily_field_transform(DailyField::Close, Interval::Day, None)
            .unwrap()
            .unwrap();

        assert_eq!(
            points,
            vec![
                SeriesPoint::new("20250102", 1075.0),
                SeriesPoint::new("20250103", 1085.0),
                SeriesPoint::new("20250203", 1055.0),
                SeriesPoint::new("20250204", 1055.0),
            ]
        );
        assert!(points.windows(2).all(|w| w[0].date() <= w[1].date()));
    }

    #[test]
    fn test_daily_field_transform_month() {
        let stock = sample_stock();

        let points = stock
            .daily_field_transform(DailyField::TradeCount, Interval::Month, None)
            .unwrap()
            .unwrap();

        // January: 300, 0, 200; February: 100, 400
        assert_eq!(
            points,
            vec![
                SeriesPoint::new("202501", 500.0 / 3.0),
                SeriesPoint::new("202502", 250.0),
            ]
        );
    }

    #[test]
    fn test_daily_field_transform_range() {
        let stock = sample_stock();
        let range = check_date_range(Some("20250201"), Some("20250228")).unwrap();

        let points = stock
            .daily_field_transform(DailyField::Open, Interval::Day, Some(&range))
            .unwrap()
            .unwrap();
        assert_eq!(points.len(), 2);

        let empty = check_date_range(Some("20250106"), Some("20250106")).unwrap();
        assert_eq!(
            stock
                .daily_field_transform(DailyField::Open, Interval::Day, Some(&empty))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_kline() {
        let stock = sample_stock();

        let rows = stock.kline(None).unwrap().unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].date, "20250102");
        assert_eq!(rows[0].open, 1070.0);
        assert_eq!(rows[0].high, 1080.0);
        assert_eq!(rows[0].low, 1065.0);
        assert_eq!(rows[0].close, 1075.0);
        assert_eq!(rows[3].date, "20250204");

        let empty = check_date_range(Some("20250106"), Some("20250106")).unwrap();
        assert_eq!(stock.kline(Some(&empty)).unwrap(), None);
    }
}

use std::collections::HashMap;

use serde_json::{Map, Value};
use strum::IntoEnumIterator;

/// Fields of the real-time quote (`getStockInfo.jsp`), each bound to the short
/// code the exchange uses in `msgArray`.
#[derive(
    Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display, strum::EnumIter, strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum RealTimeField {
    #[strum(to_string = "股票代碼", serialize = "code")]
    Code,
    #[strum(to_string = "總委買筆數", serialize = "total_bid_orders")]
    TotalBidOrders,
    #[strum(to_string = "總委賣筆數", serialize = "total_ask_orders")]
    TotalAskOrders,
    #[strum(to_string = "相關股票", serialize = "related")]
    Related,
    #[strum(to_string = "前一日收盤價", serialize = "prev_close_pz")]
    PrevClosePz,
    #[strum(to_string = "跌停價", serialize = "limit_down")]
    LimitDown,
    #[strum(to_string = "成交流水(千股)", serialize = "trade_flow")]
    TradeFlow,
    #[strum(to_string = "委買價", serialize = "bid")]
    Bid,
    #[strum(to_string = "委賣價", serialize = "ask")]
    Ask,
    #[strum(to_string = "暫無用途", serialize = "reserved")]
    Reserved,
    #[strum(to_string = "日期（西元年月日）", serialize = "date")]
    Date,
    #[strum(to_string = "資料鍵值（交易所_代碼_日期）", serialize = "key")]
    Key,
    #[strum(to_string = "五檔賣出價格（_分隔）", serialize = "ask_prices")]
    AskPrices,
    #[strum(to_string = "五檔買入價格（_分隔）", serialize = "bid_prices")]
    BidPrices,
    #[strum(to_string = "股票代碼（純數字）", serialize = "symbol")]
    Symbol,
    #[strum(to_string = "時間（最後更新時間）", serialize = "update_time")]
    UpdateTime,
    #[strum(to_string = "股票代碼（完整）", serialize = "channel")]
    Channel,
    #[strum(to_string = "時間戳（毫秒）", serialize = "timestamp")]
    Timestamp,
    #[strum(to_string = "最終撮合時間", serialize = "match_time")]
    MatchTime,
    #[strum(to_string = "五檔買入量（_分隔）", serialize = "bid_volumes")]
    BidVolumes,
    #[strum(to_string = "五檔賣出量（_分隔）", serialize = "ask_volumes")]
    AskVolumes,
    #[strum(to_string = "總委買張數", serialize = "total_bid_volume")]
    TotalBidVolume,
    #[strum(to_string = "今日最高價", serialize = "high")]
    High,
    #[strum(to_string = "最小跳動單位", serialize = "tick_size")]
    TickSize,
    #[strum(to_string = "單位張數", serialize = "lot_size")]
    LotSize,
    #[strum(to_string = "成交價（最後成交）", serialize = "last_trade_price")]
    LastTradePrice,
    #[strum(to_string = "今日最低價", serialize = "low")]
    Low,
    #[strum(to_string = "股票簡稱", serialize = "short_name", serialize = "name")]
    ShortName,
    #[strum(to_string = "開盤價", serialize = "open")]
    Open,
    #[strum(to_string = "交易所", serialize = "exchange")]
    Exchange,
    #[strum(to_string = "成交筆數", serialize = "trades")]
    Trades,
    #[strum(to_string = "最後成交時間", serialize = "last_trade_time")]
    LastTradeTime,
    #[strum(to_string = "漲停價", serialize = "limit_up")]
    LimitUp,
    #[strum(to_string = "成交張數", serialize = "volume")]
    Volume,
    #[strum(to_string = "股票全名", serialize = "full_name")]
    FullName,
    #[strum(to_string = "昨日收盤價", serialize = "prev_close")]
    PrevClose,
    #[strum(to_string = "目前成交價", serialize = "price")]
    Price,
}

impl RealTimeField {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Code => "@",
            Self::TotalBidOrders => "tv",
            Self::TotalAskOrders => "ps",
            Self::Related => "pid",
            Self::PrevClosePz => "pz",
            Self::LimitDown => "bp",
            Self::TradeFlow => "fv",
            Self::Bid => "oa",
            Self::Ask => "ob",
            Self::Reserved => "ts",
            Self::Date => "d",
            Self::Key => "key",
            Self::AskPrices => "a",
            Self::BidPrices => "b",
            Self::Symbol => "c",
            Self::UpdateTime => "%",
            Self::Channel => "ch",
            Self::Timestamp => "tlong",
            Self::MatchTime => "ot",
            Self::BidVolumes => "f",
            Self::AskVolumes => "g",
            Self::TotalBidVolume => "ov",
            Self::High => "h",
            Self::TickSize => "i",
            Self::LotSize => "it",
            Self::LastTradePrice => "oz",
            Self::Low => "l",
            Self::ShortName => "n",
            Self::Open => "o",
            Self::Exchange => "ex",
            Self::Trades => "s",
            Self::LastTradeTime => "t",
            Self::LimitUp => "u",
            Self::Volume => "v",
            Self::FullName => "nf",
            Self::PrevClose => "y",
            Self::Price => "z",
        }
    }
}

/// Quote fields captured at fetch time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RealTimeSnapshot {
    values: HashMap<RealTimeField, String>,
}

impl RealTimeSnapshot {
    /// Copy every known code present in one `msgArray` element.
    pub fn from_json(item: &Map<String, Value>) -> Self {
        let mut values: HashMap<RealTimeField, String> = HashMap::new();

        for field in RealTimeField::iter() {
            if let Some(value) = item.get(field.code()) {
                let value = match value {
                    Value::String(s) => s.to_string(),
                    Value::Null => continue,
                    v => v.to_string(),
                };
                values.insert(field, value);
            }
        }

        Self { values }
    }

    pub fn get(&self, field: RealTimeField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, str::FromStr};

    use serde_json::json;

    use super::*;

    #[test]
    fn test_codes_unique() {
        let codes: HashSet<&str> = RealTimeField::iter().map(|f| f.code()).collect();
        assert_eq!(codes.len(), RealTimeField::iter().count());
    }

    #[test]
    fn test_field_parse() {
        assert_eq!(
            RealTimeField::from_str("股票簡稱").unwrap(),
            RealTimeField::ShortName
        );
        assert_eq!(
            RealTimeField::from_str("name").unwrap(),
            RealTimeField::ShortName
        );
        assert_eq!(RealTimeField::from_str("Price").unwrap(), RealTimeField::Price);
        assert!(RealTimeField::from_str("股價").is_err());
    }

    #[test]
    fn test_from_json() {
        let item = json!({
            "c": "2330",
            "n": "台積電",
            "nf": "台灣積體電路製造股份有限公司",
            "z": "1075.0000",
            "y": "1080.0000",
            "tlong": 1735794000000u64,
            "ex": null,
            "unknown": "x"
        });

        let snapshot = RealTimeSnapshot::from_json(item.as_object().unwrap());

        assert_eq!(snapshot.len(), 6);
        assert_eq!(snapshot.get(RealTimeField::Symbol), Some("2330"));
        assert_eq!(snapshot.get(RealTimeField::ShortName), Some("台積電"));
        assert_eq!(snapshot.get(RealTimeField::Price), Some("1075.0000"));
        assert_eq!(snapshot.get(RealTimeField::Timestamp), Some("1735794000000"));
        assert_eq!(snapshot.get(RealTimeField::Exchange), None);
        assert_eq!(snapshot.get(RealTimeField::Open), None);
    }
}

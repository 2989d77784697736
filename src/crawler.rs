use log::info;

use crate::{
    ds::twse::{FetchOptions, ReportKind, fetch_real_time, fetch_report},
    error::{TsError, TsResult},
    stock::Stock,
    utils::{
        datetime::{DateRange, check_date_range},
        text::is_ticker,
    },
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum FetchPart {
    #[strum(serialize = "daily")]
    Daily,
    #[strum(serialize = "real_time", serialize = "realtime")]
    RealTime,
}

/// Build a [`Stock`] for `ticker`. `range = None` means today only and
/// `only_fetch = None` fetches both halves.
pub async fn lookup(
    ticker: &str,
    range: Option<&DateRange>,
    only_fetch: Option<&[FetchPart]>,
    options: &FetchOptions,
) -> TsResult<Stock> {
    let ticker = ticker.trim();
    if !is_ticker(ticker) {
        return Err(TsError::ValidationError {
            code: "INVALID_TICKER",
            message: format!("Invalid ticker '{ticker}'"),
        });
    }

    let wants = |part: FetchPart| only_fetch.is_none_or(|parts| parts.contains(&part));

    let mut stock = Stock::new(ticker)?;

    let daily = if wants(FetchPart::Daily) {
        let range = match range {
            Some(range) => range.clone(),
            None => check_date_range(None, None)?,
        };
        info!("[Lookup] {ticker} daily {range}");

        Some(fetch_report(ReportKind::StockDay, &range, Some(ticker), options).await?)
    } else {
        None
    };

    let real_time = if wants(FetchPart::RealTime) {
        info!("[Lookup] {ticker} real-time");

        Some(fetch_real_time(ticker, options).await?)
    } else {
        None
    };

    stock.set_data(daily, real_time);

    Ok(stock)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;
    use crate::data::{daily::DailyField, realtime::RealTimeField, series::Interval};

    fn options(server: &Server) -> FetchOptions {
        FetchOptions {
            report_api: server.url(),
            realtime_api: format!("{}/getStockInfo.jsp", server.url()),
            ..Default::default()
        }
    }

    #[test]
    fn test_fetch_part_parse() {
        assert_eq!(FetchPart::from_str("daily").unwrap(), FetchPart::Daily);
        assert_eq!(FetchPart::from_str("RealTime").unwrap(), FetchPart::RealTime);
    }

    #[tokio::test]
    async fn test_lookup_invalid_ticker() {
        let result = lookup("", None, None, &FetchOptions::default()).await;

        assert!(matches!(result, Err(TsError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_lookup_january() {
        let mut server = Server::new_async().await;

        let report = server
            .mock("GET", "/STOCK_DAY")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("date".into(), "20250101".into()),
                Matcher::UrlEncoded("stockNo".into(), "2330".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "stat": "OK",
                    "fields": ["日期", "成交股數", "成交金額", "開盤價", "最高價", "最低價", "收盤價", "漲跌價差", "成交筆數"],
                    "data": [
                        ["114/01/02", "30,000,000", "32,000,000,000", "1,070.00", "1,080.00", "1,065.00", "1,075.00", "-5.00", "50,000"],
                        ["114/01/03", "28,000,000", "30,000,000,000", "1,080.00", "1,090.00", "1,075.00", "1,085.00", "+10.00", "48,000"],
                        ["114/01/06", "0", "0", "--", "--", "--", "--", " 0.00", "0"]
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let quote = server
            .mock("GET", "/getStockInfo.jsp")
            .match_query(Matcher::UrlEncoded("ex_ch".into(), "tse_2330.tw".into()))
            .with_status(200)
            .with_body(
                json!({
                    "rtmessage": "OK",
                    "msgArray": [{"c": "2330", "n": "台積電", "z": "1075.0000"}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let range = check_date_range(Some("20250101"), Some("20250131")).unwrap();
        let stock = lookup("2330", Some(&range), None, &options(&server))
            .await
            .unwrap();

        report.assert_async().await;
        quote.assert_async().await;

        assert_eq!(stock.to_string(), "2330: 台積電");
        assert_eq!(stock.real_time(RealTimeField::Price), Some("1075.0000"));

        let closes = stock
            .daily_field_transform(DailyField::Close, Interval::Day, Some(&range))
            .unwrap()
            .unwrap();
        let dates: Vec<&str> = closes.iter().map(|p| p.date()).collect();
        assert_eq!(dates, vec!["20250102", "20250103"]);
        assert!(!dates.contains(&"20250101"));
    }

    #[tokio::test]
    async fn test_lookup_only_real_time() {
        let mut server = Server::new_async().await;

        let report = server
            .mock("GET", "/STOCK_DAY")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let quote = server
            .mock("GET", "/getStockInfo.jsp")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"rtmessage": "OK", "msgArray": [{"n": "台積電"}]}).to_string())
            .create_async()
            .await;

        let stock = lookup(
            "2330",
            None,
            Some(&[FetchPart::RealTime]),
            &options(&server),
        )
        .await
        .unwrap();

        report.assert_async().await;
        quote.assert_async().await;

        assert_eq!(stock.short_name(), Some("台積電"));
        assert!(stock.daily_records(None).is_err());
    }
}

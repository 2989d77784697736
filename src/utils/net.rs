use std::{collections::HashMap, time::Duration};

use log::debug;
use reqwest::Method;
use url::Url;

use crate::error::{TsError, TsResult};

/// Single GET without retries. A timeout surfaces as [`TsError::Timeout`] so
/// callers can tell a slow upstream apart from a broken response.
pub async fn http_get(
    request_url: &str,
    query: &[(String, String)],
    headers: &HashMap<String, String>,
    timeout: Duration,
) -> TsResult<Vec<u8>> {
    let client = reqwest::Client::new();
    let mut request_builder = client
        .request(Method::GET, request_url)
        .timeout(timeout)
        .query(query);

    for (k, v) in headers {
        request_builder = request_builder.header(k, v);
    }

    let response = request_builder
        .send()
        .await
        .map_err(|err| map_request_error(err, request_url, timeout))?;

    if response.status().is_success() {
        let bytes = response
            .bytes()
            .await
            .map_err(|err| map_request_error(err, request_url, timeout))?;

        Ok(bytes.to_vec())
    } else {
        debug!("[HTTP Status Error] {response:?}");

        Err(TsError::FetchError {
            status: response.status().to_string(),
            request: describe_request(request_url, query),
        })
    }
}

pub fn describe_request(url: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        url.to_string()
    } else {
        let params: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{url}?{}", params.join("&"))
    }
}

pub fn join_url(base_url: &str, extend_url: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base_url)?;

    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(extend_url.split('/').filter(|s| !s.is_empty()));

    Ok(url.to_string())
}

fn map_request_error(err: reqwest::Error, request_url: &str, timeout: Duration) -> TsError {
    if err.is_timeout() {
        TsError::Timeout(format!(
            "No response from {request_url} within {}ms",
            timeout.as_millis()
        ))
    } else {
        TsError::HttpRequestError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://127.0.0.1:8000/", "/hello").unwrap(),
            "http://127.0.0.1:8000/hello"
        );
        assert_eq!(
            join_url("https://www.twse.com.tw/exchangeReport", "STOCK_DAY").unwrap(),
            "https://www.twse.com.tw/exchangeReport/STOCK_DAY"
        );
    }

    #[test]
    fn test_describe_request() {
        let query = vec![
            ("response".to_string(), "json".to_string()),
            ("date".to_string(), "20250101".to_string()),
        ];
        assert_eq!(
            describe_request("https://example.com/STOCK_DAY", &query),
            "https://example.com/STOCK_DAY?response=json&date=20250101"
        );
        assert_eq!(
            describe_request("https://example.com", &[]),
            "https://example.com"
        );
    }

    #[tokio::test]
    async fn test_http_get_status_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let result = http_get(
            &join_url(&server.url(), "missing").unwrap(),
            &[],
            &HashMap::new(),
            Duration::from_secs(5),
        )
        .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(TsError::FetchError { .. })));
    }

    #[tokio::test]
    async fn test_http_get_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and hold connections without ever answering.
            let mut sockets = vec![];
            while let Ok((socket, _)) = listener.accept().await {
                sockets.push(socket);
            }
        });

        let result = http_get(
            &format!("http://{addr}"),
            &[],
            &HashMap::new(),
            Duration::from_millis(200),
        )
        .await;

        assert!(matches!(result, Err(TsError::Timeout(_))));
    }
}

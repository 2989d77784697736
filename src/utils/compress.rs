use std::{io, io::Write};

use base64::{Engine, engine::general_purpose::URL_SAFE};
use flate2::{
    Compression,
    write::{GzDecoder, GzEncoder},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::TsResult;

pub fn encode(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

pub fn decode(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(Vec::new());
    decoder.write_all(data)?;
    decoder.finish()
}

/// JSON -> gzip -> base64url, small enough to travel in a URL query.
pub fn encode_token<T: Serialize + ?Sized>(value: &T) -> TsResult<String> {
    let json = serde_json::to_vec(value)?;
    let compressed = encode(&json)?;

    Ok(URL_SAFE.encode(compressed))
}

pub fn decode_token<T: DeserializeOwned>(token: &str) -> TsResult<T> {
    let compressed = URL_SAFE.decode(token.trim())?;
    let json = decode(&compressed)?;

    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::data::series::{OhlcRow, SeriesPoint};

    #[test]
    fn test_encode_decode() {
        let data: &[u8] = "Hello world, I am twstock.".as_bytes();

        let encoded_data = encode(data).unwrap();
        assert_eq!(&encoded_data[..2], &[0x1f, 0x8b]);

        let decoded_data = decode(&encoded_data).unwrap();
        assert_eq!(data, &decoded_data);
    }

    #[test]
    fn test_token_series() {
        let series = vec![
            SeriesPoint::new("20250102", 1075.0),
            SeriesPoint::new("20250103", 1085.5),
            SeriesPoint::new("20250106", 1090.0),
        ];

        let token = encode_token(&series).unwrap();
        assert!(
            token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'=')
        );

        let decoded: Vec<SeriesPoint> = decode_token(&token).unwrap();
        assert_eq!(decoded, series);

        let raw: Value = decode_token(&token).unwrap();
        assert_eq!(raw[0], json!(["20250102", 1075.0]));
    }

    #[test]
    fn test_token_ohlc() {
        let rows = vec![OhlcRow {
            date: "20250102".to_string(),
            open: 1070.0,
            high: 1080.0,
            low: 1065.0,
            close: 1075.0,
        }];

        let token = encode_token(&rows).unwrap();
        let decoded: Vec<OhlcRow> = decode_token(&token).unwrap();
        assert_eq!(decoded, rows);
    }

    #[test]
    fn test_token_unicode() {
        let value = json!({"title": "台積電-收盤價", "values": [1, 2, 3]});

        let token = encode_token(&value).unwrap();
        let decoded: Value = decode_token(&token).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_decode_invalid_token() {
        assert!(decode_token::<Value>("not a token!").is_err());
        assert!(decode_token::<Value>(&URL_SAFE.encode(b"plain")).is_err());
    }
}

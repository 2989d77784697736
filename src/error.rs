pub type TsResult<T> = Result<T, TsError>;

#[derive(Debug, thiserror::Error)]
pub enum TsError {
    #[error("[Budget Exceeded] {message}")]
    BudgetExceeded { elapsed_ms: u128, message: String },

    #[error("[Chart Error] {0}")]
    ChartError(String),

    #[error("[CSV Error] {0}")]
    CsvError(#[from] ::csv::Error),

    #[error("[Decode Error] {0}")]
    DecodeError(#[from] ::base64::DecodeError),

    #[error("[Fetch Error] [{request}] {status}")]
    FetchError { status: String, request: String },

    #[error("[Field Not Found] {0}")]
    FieldNotFound(String),

    #[error("[Format Error] {message}")]
    FormatError { code: &'static str, message: String },

    #[error("[HTTP Request Error] {0}")]
    HttpRequestError(#[from] ::reqwest::Error),

    #[error("[Image Error] {0}")]
    ImageError(#[from] ::image::ImageError),

    #[error("[IO Error] {0}")]
    IoError(#[from] std::io::Error),

    #[error("[Parse Config Error] {0}")]
    ParseConfigError(#[from] ::confy::ConfyError),

    #[error("[Parse Enum Error] {0}")]
    ParseEnumError(#[from] ::strum::ParseError),

    #[error("[Parse URL Error] {0}")]
    ParseUrlError(#[from] url::ParseError),

    #[error("[Serde JSON Error] {0}")]
    SerdeJsonError(#[from] ::serde_json::Error),

    #[error("[Timeout] {0}")]
    Timeout(String),

    #[error("[Validation Error] {message}")]
    ValidationError { code: &'static str, message: String },
}

impl TsError {
    /// Short hint shown to the person who typed the command.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } | Self::FormatError { .. } => {
                "Check the ticker and the dates (YYYYMMDD), start must not be after end"
            }
            Self::Timeout(_) | Self::BudgetExceeded { .. } => {
                "The exchange is slow right now, try a narrower date range"
            }
            Self::FetchError { .. } => {
                "The exchange returned no usable data, check the ticker and the dates"
            }
            Self::FieldNotFound(_) => "Unknown or unavailable data field",
            _ => "Unexpected error, try again later",
        }
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationError { .. } | Self::FormatError { .. } | Self::FieldNotFound(_)
        )
    }
}

use thiserror::Error;

/// Failures that can only happen at the I/O boundary. Normalization and
/// aggregation never fail; they degrade to `Unknown`/0 instead.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Request to {url} failed with status {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("No usable sheets found in {0}")]
    NoUsableSheets(String),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

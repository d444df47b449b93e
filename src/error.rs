use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodyError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("Row {row} has {found} cells, expected {expected}")]
    RowArity { row: usize, expected: usize, found: usize },
    #[error("Capacity exceeded: {0}")]
    Capacity(String),
}

pub type Result<T> = std::result::Result<T, CodyError>;

// Helper conversions
impl From<csv::Error> for CodyError {
    fn from(e: csv::Error) -> Self {
        let message = e.to_string();
        match e.into_kind() {
            csv::ErrorKind::Io(io) => Self::Io(io),
            _ => Self::Csv(message),
        }
    }
}
impl From<config::ConfigError> for CodyError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<rayon::ThreadPoolBuildError> for CodyError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self { Self::Config(e.to_string()) }
}

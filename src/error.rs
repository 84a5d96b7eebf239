use thiserror::Error;

pub type ReactabResult<T> = Result<T, ReactabError>;

#[derive(Error, Debug)]
pub enum ReactabError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Value error: {0}")]
    Value(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Resolution error: {0}")]
    Resolution(String),
}

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("could not read wallet file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed .env keypair file: {0}")]
    Malformed(String),

    #[error("stored keypair is invalid: {0}")]
    Keypair(#[from] obscura_core::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("no poll with id {0}")]
    PollNotFound(i64),

    #[error("no option with id {0}")]
    OptionNotFound(i64),

    #[error("no votes cast for option {0}")]
    NoVotes(i64),

    #[error("invalid selection: {0:?}")]
    InvalidSelection(String),

    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

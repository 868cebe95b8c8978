use generational_arena::Index;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeatError {
    #[error("no heat value recorded for node {0:?}")]
    MissingHeat(Index),

    #[error("selection policy yielded no candidates for node {0:?}")]
    EmptySelection(Index),

    #[error("moderation invoked with no values")]
    EmptyModeration,

    #[error("failed to read heat table: {0}")]
    TableRead(#[from] std::io::Error),
}

pub type HeatResult<T> = Result<T, HeatError>;

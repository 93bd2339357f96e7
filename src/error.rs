use thiserror::Error;

/// Rule violations raised by the engine. None of these leave partial state
/// behind: the caller's snapshot is untouched whenever one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error(
        "insufficient budget: net cost {net_cost} (new: {actual_cost}, refund: {refund_amount})"
    )]
    InsufficientBudget {
        net_cost: i64,
        actual_cost: i64,
        refund_amount: i64,
    },

    #[error("cell index {0} is outside the board")]
    InvalidCellIndex(usize),

    #[error("unknown energy source '{0}'")]
    UnknownSource(String),

    #[error("the game is over; reset to play again")]
    GameOver,
}

pub type Result<T> = std::result::Result<T, GameError>;

use solana_program::{
    decode_error::DecodeError, msg, program_error::PrintProgramError,
    program_error::ProgramError,
};
use thiserror::Error;

/// Errors that may be returned by the Raffle program
///
/// Every failure aborts the triggering call atomically; nothing is retried
/// internally. Retry, if any, is the external caller's business.
#[derive(Error, Debug, Copy, Clone)]
pub enum RaffleError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstructionData,

    /// Entry payment below the entrance fee
    #[error("Payment is below the entrance fee")]
    InsufficientPayment,

    /// Entry attempted while a payout is being calculated
    #[error("Raffle is not open")]
    RaffleNotOpen,

    /// Upkeep executed while its predicate is false
    #[error("Upkeep is not needed")]
    UpkeepNotNeeded,

    /// Payout could not be applied; the whole fulfillment rolls back
    #[error("Prize transfer failed")]
    TransferFailed,

    /// Unknown subscription id
    #[error("Subscription does not exist")]
    InvalidSubscription,

    /// Subscription cannot pay for the fulfillment
    #[error("Subscription balance cannot cover the request payment")]
    InsufficientSubscriptionBalance,

    /// Fulfillment for a request id the coordinator never issued
    #[error("Randomness request does not exist")]
    NonexistentRequest,

    /// Pending request does not belong to this raffle
    #[error("Randomness request does not match this raffle")]
    RequestMismatch,

    /// Fulfillment word count differs from what was requested
    #[error("Unexpected number of random words")]
    InvalidRandomWords,

    /// Passed winner account is not the selected player
    #[error("Winner account does not match the selected player")]
    WinnerMismatch,
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Error"
    }
}

impl PrintProgramError for RaffleError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}

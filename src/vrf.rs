//! Randomness request plumbing against the mock coordinator.
//!
//! Requests and fulfillments form a two-phase protocol: upkeep execution
//! registers a request here and the raffle blocks in Calculating until the
//! matching fulfillment arrives. The pending record in the coordinator
//! account doubles as the authorization for the fulfillment side.

use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::error::RaffleError;
use crate::state::{PendingRequest, Raffle, VrfCoordinator};

/// Every request asks for exactly one random word
pub const NUM_WORDS: u32 = 1;

/// Confirmation depth forwarded with every request
pub const REQUEST_CONFIRMATIONS: u32 = 3;

/// Register a randomness request for `consumer` and hand out its id.
/// Ids start at 1 and only increase, so a live request id is never 0.
pub fn issue_request(
    coordinator: &mut VrfCoordinator,
    consumer: &Pubkey,
    raffle: &Raffle,
) -> Result<u64, ProgramError> {
    if coordinator.subscription(raffle.subscription_id).is_none() {
        return Err(RaffleError::InvalidSubscription.into());
    }

    let request_id = coordinator.next_request_id;
    coordinator.next_request_id = request_id
        .checked_add(1)
        .ok_or(ProgramError::InvalidArgument)?;
    coordinator.pending.push(PendingRequest {
        request_id,
        consumer: *consumer,
        subscription_id: raffle.subscription_id,
        callback_gas_limit: raffle.callback_gas_limit,
        num_words: NUM_WORDS,
    });

    Ok(request_id)
}

/// Remove and return the pending request matching `request_id`, verifying it
/// was issued for `consumer`. An id the coordinator never issued (or already
/// fulfilled) is `NonexistentRequest`; an id belonging to another consumer is
/// `RequestMismatch`.
pub fn take_request(
    coordinator: &mut VrfCoordinator,
    request_id: u64,
    consumer: &Pubkey,
) -> Result<PendingRequest, ProgramError> {
    let index = coordinator
        .pending
        .iter()
        .position(|r| r.request_id == request_id)
        .ok_or(RaffleError::NonexistentRequest)?;
    if coordinator.pending[index].consumer != *consumer {
        return Err(RaffleError::RequestMismatch.into());
    }
    Ok(coordinator.pending.remove(index))
}

/// Charge the request payment (base fee plus callback gas at the configured
/// price) against the funding subscription.
pub fn settle_request(
    coordinator: &mut VrfCoordinator,
    request: &PendingRequest,
) -> Result<(), ProgramError> {
    let payment = coordinator
        .base_fee
        .checked_add(
            coordinator
                .gas_price
                .saturating_mul(request.callback_gas_limit as u64),
        )
        .ok_or(ProgramError::InvalidArgument)?;

    let subscription = coordinator
        .subscription_mut(request.subscription_id)
        .ok_or(RaffleError::InvalidSubscription)?;
    subscription.balance = subscription
        .balance
        .checked_sub(payment)
        .ok_or(RaffleError::InsufficientSubscriptionBalance)?;

    Ok(())
}

/// Map a random word onto a player slot.
///
/// Plain modulo, kept for parity with the deployed selection behavior; it
/// slightly favors low indexes when `player_count` does not divide 2^64.
pub fn winner_index(random_word: u64, player_count: u64) -> u64 {
    if player_count == 0 {
        return 0;
    }
    random_word % player_count
}

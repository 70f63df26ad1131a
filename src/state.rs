use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::UnixTimestamp, program_error::ProgramError, pubkey::Pubkey};
use std::convert::TryFrom;

/// Lifecycle state of a raffle
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq)]
pub enum RaffleState {
    /// Raffle is open for entries
    Open,
    /// A randomness request is in flight, entries are blocked.
    /// There is no timeout path out of this state: if the coordinator never
    /// fulfills, the raffle stays here and the operator deploys a replacement.
    Calculating,
}

impl TryFrom<u8> for RaffleState {
    type Error = &'static str;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(RaffleState::Open),
            1 => Ok(RaffleState::Calculating),
            _ => Err("Invalid raffle state"),
        }
    }
}

impl From<RaffleState> for u8 {
    fn from(state: RaffleState) -> Self {
        match state {
            RaffleState::Open => 0,
            RaffleState::Calculating => 1,
        }
    }
}

/// Raffle account data
///
/// The account's lamports above its rent-exempt floor are the accumulated
/// round balance; the whole pool moves to the winner at fulfillment, so no
/// funds carry over between rounds.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct Raffle {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Minimum payment to be appended to the player list, in lamports
    pub entrance_fee: u64,
    /// Minimum seconds between the start of a round and upkeep eligibility
    pub interval: i64,
    /// Coordinator account this raffle requests randomness from; fulfillment
    /// is only accepted when routed through this account's pending requests
    pub coordinator: Pubkey,
    /// Subscription that pays for randomness requests
    pub subscription_id: u64,
    /// Gas lane key passed along with every randomness request
    pub gas_lane: [u8; 32],
    /// Gas limit forwarded for the fulfillment callback
    pub callback_gas_limit: u32,
    /// Current lifecycle state
    pub state: RaffleState,
    /// Players of the current round, append-only, duplicates allowed
    /// (one address may enter multiple times, each as a separate slot)
    pub players: Vec<Pubkey>,
    /// Start timestamp of the current round
    pub last_timestamp: UnixTimestamp,
    /// Winner of the most recent completed round (zero until the first payout)
    pub recent_winner: Pubkey,
    /// Outstanding randomness request id; Some iff state is Calculating
    pub pending_request: Option<u64>,
}

impl Raffle {
    /// Serialized size excluding the player list
    pub const BASE_SPACE: usize = 1 + 8 + 8 + 32 + 8 + 32 + 4 + 1 + 4 + 8 + 32 + 9;

    /// Account space for a raffle that can hold up to `max_players` entries
    pub fn space(max_players: usize) -> usize {
        Self::BASE_SPACE + 32 * max_players
    }

    /// Deserialize an initialized raffle account
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let raffle = Self::unpack_unchecked(data)?;
        if !raffle.is_initialized {
            return Err(ProgramError::UninitializedAccount);
        }
        Ok(raffle)
    }

    /// Deserialize without the initialization check (used when creating)
    pub fn unpack_unchecked(mut data: &[u8]) -> Result<Self, ProgramError> {
        Self::deserialize(&mut data).map_err(|_| ProgramError::InvalidAccountData)
    }

    /// Serialize into the account buffer; trailing bytes stay untouched
    pub fn pack(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        let mut writer = dst;
        self.serialize(&mut writer)
            .map_err(|_| ProgramError::AccountDataTooSmall)
    }

    /// The upkeep predicate: true iff the raffle is open, the configured
    /// interval has elapsed since the round started, at least one player has
    /// entered, and the prize pool holds something to pay out.
    ///
    /// Side-effect-free and callable by anyone holding the account data.
    pub fn upkeep_needed(&self, prize_pool: u64, now: UnixTimestamp) -> bool {
        let is_open = self.state == RaffleState::Open;
        let interval_passed = now.saturating_sub(self.last_timestamp) >= self.interval;
        let has_players = !self.players.is_empty();
        let has_balance = prize_pool > 0;
        is_open && interval_passed && has_players && has_balance
    }

    /// Player at the given entry slot
    pub fn player(&self, index: usize) -> Option<&Pubkey> {
        self.players.get(index)
    }

    /// Number of entry slots in the current round
    pub fn num_players(&self) -> usize {
        self.players.len()
    }
}

/// A funded subscription on the mock coordinator. Balances are notional:
/// funding credits a counter, fulfillment charges against it, and no real
/// lamports move.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct Subscription {
    pub id: u64,
    pub owner: Pubkey,
    pub balance: u64,
}

impl Subscription {
    pub const SPACE: usize = 8 + 32 + 8;
}

/// A randomness request issued by a raffle and not yet fulfilled.
///
/// This record is the capability that authorizes fulfillment: only upkeep
/// execution can create one, so a fulfillment call that does not match an
/// outstanding record is rejected regardless of its caller.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct PendingRequest {
    pub request_id: u64,
    /// The raffle account the fulfillment must be delivered to
    pub consumer: Pubkey,
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
    /// Number of random words the consumer expects back
    pub num_words: u32,
}

impl PendingRequest {
    pub const SPACE: usize = 8 + 32 + 8 + 4 + 4;
}

/// Mock randomness coordinator account data
///
/// Deterministic stand-in for the production coordinator: the harness
/// creates and funds a subscription, upkeep execution registers requests
/// here, and the harness fulfills them with chosen words.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct VrfCoordinator {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Flat fee charged per fulfilled request
    pub base_fee: u64,
    /// Price per unit of callback gas charged on top of the base fee
    pub gas_price: u64,
    /// Next request id to hand out; starts at 1 so ids are always > 0
    pub next_request_id: u64,
    /// Next subscription id to hand out; starts at 1
    pub next_subscription_id: u64,
    pub subscriptions: Vec<Subscription>,
    pub pending: Vec<PendingRequest>,
}

impl VrfCoordinator {
    pub const BASE_SPACE: usize = 1 + 8 + 8 + 8 + 8 + 4 + 4;

    pub fn space(max_subscriptions: usize, max_pending: usize) -> usize {
        Self::BASE_SPACE
            + Subscription::SPACE * max_subscriptions
            + PendingRequest::SPACE * max_pending
    }

    pub fn new(base_fee: u64, gas_price: u64) -> Self {
        Self {
            is_initialized: true,
            base_fee,
            gas_price,
            next_request_id: 1,
            next_subscription_id: 1,
            subscriptions: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let coordinator = Self::unpack_unchecked(data)?;
        if !coordinator.is_initialized {
            return Err(ProgramError::UninitializedAccount);
        }
        Ok(coordinator)
    }

    pub fn unpack_unchecked(mut data: &[u8]) -> Result<Self, ProgramError> {
        Self::deserialize(&mut data).map_err(|_| ProgramError::InvalidAccountData)
    }

    pub fn pack(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        let mut writer = dst;
        self.serialize(&mut writer)
            .map_err(|_| ProgramError::AccountDataTooSmall)
    }

    pub fn subscription(&self, id: u64) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.id == id)
    }

    pub fn subscription_mut(&mut self, id: u64) -> Option<&mut Subscription> {
        self.subscriptions.iter_mut().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_raffle() -> Raffle {
        Raffle {
            is_initialized: true,
            entrance_fee: 10_000_000,
            interval: 30,
            coordinator: Pubkey::new_unique(),
            subscription_id: 1,
            gas_lane: [7u8; 32],
            callback_gas_limit: 500_000,
            state: RaffleState::Open,
            players: vec![Pubkey::new_unique()],
            last_timestamp: 1_700_000_000,
            recent_winner: Pubkey::default(),
            pending_request: None,
        }
    }

    #[test]
    fn upkeep_needed_when_all_conditions_hold() {
        let raffle = open_raffle();
        assert!(raffle.upkeep_needed(10_000_000, raffle.last_timestamp + 31));
    }

    #[test]
    fn upkeep_not_needed_while_calculating() {
        let mut raffle = open_raffle();
        raffle.state = RaffleState::Calculating;
        raffle.pending_request = Some(1);
        assert!(!raffle.upkeep_needed(10_000_000, raffle.last_timestamp + 31));
    }

    #[test]
    fn upkeep_not_needed_before_interval() {
        let raffle = open_raffle();
        assert!(!raffle.upkeep_needed(10_000_000, raffle.last_timestamp + 29));
        // boundary: exactly the interval is enough
        assert!(raffle.upkeep_needed(10_000_000, raffle.last_timestamp + 30));
    }

    #[test]
    fn upkeep_not_needed_without_players() {
        let mut raffle = open_raffle();
        raffle.players.clear();
        assert!(!raffle.upkeep_needed(10_000_000, raffle.last_timestamp + 31));
    }

    #[test]
    fn upkeep_not_needed_without_balance() {
        let raffle = open_raffle();
        assert!(!raffle.upkeep_needed(0, raffle.last_timestamp + 31));
    }

    #[test]
    fn raffle_roundtrips_through_account_buffer() {
        let mut raffle = open_raffle();
        raffle.players.push(Pubkey::new_unique());
        raffle.pending_request = Some(42);
        raffle.state = RaffleState::Calculating;

        let mut buf = vec![0u8; Raffle::space(8)];
        raffle.pack(&mut buf).unwrap();
        let decoded = Raffle::unpack(&buf).unwrap();

        assert_eq!(decoded.players, raffle.players);
        assert_eq!(decoded.pending_request, Some(42));
        assert_eq!(decoded.state, RaffleState::Calculating);
        assert_eq!(decoded.entrance_fee, raffle.entrance_fee);
    }

    #[test]
    fn unpack_rejects_uninitialized_account() {
        let buf = vec![0u8; Raffle::space(4)];
        assert_eq!(
            Raffle::unpack(&buf).unwrap_err(),
            ProgramError::UninitializedAccount
        );
    }

    #[test]
    fn raffle_state_from_u8() {
        assert_eq!(RaffleState::try_from(0).unwrap(), RaffleState::Open);
        assert_eq!(RaffleState::try_from(1).unwrap(), RaffleState::Calculating);
        assert!(RaffleState::try_from(2).is_err());
    }

    #[test]
    fn coordinator_starts_counting_from_one() {
        let coordinator = VrfCoordinator::new(250_000_000, 1);
        assert_eq!(coordinator.next_request_id, 1);
        assert_eq!(coordinator.next_subscription_id, 1);
        assert!(coordinator.subscriptions.is_empty());
        assert!(coordinator.pending.is_empty());
    }
}

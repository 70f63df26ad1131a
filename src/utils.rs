/// Round balance of a raffle account: everything above the rent-exempt
/// floor. The floor never leaves the account, so a freshly reset raffle has
/// a pool of zero even though its lamport balance is not.
pub fn prize_pool(account_lamports: u64, rent_floor: u64) -> u64 {
    account_lamports.saturating_sub(rent_floor)
}

/// Convert lamports to SOL (for display purposes)
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / 1_000_000_000.0
}

//! Per-cluster deployment parameters.
//!
//! The raffle constructor takes its fee schedule and oracle wiring from
//! here, keyed by the target cluster. On a local cluster the harness first
//! initializes the mock coordinator and a funded subscription, then
//! substitutes those into the raffle; public clusters use an operator-run
//! coordinator and a subscription created out of band.

/// Flat per-request fee the mock coordinator is constructed with
/// (0.25 payment units at 9 decimals).
pub const MOCK_BASE_FEE: u64 = 250_000_000;

/// Per-gas price the mock coordinator is constructed with
/// (one 9-decimal unit per unit of callback gas).
pub const MOCK_GAS_PRICE: u64 = 1;

/// Amount the harness credits to a freshly created mock subscription
/// (1000 payment units at 9 decimals).
pub const SUBSCRIPTION_FUND_AMOUNT: u64 = 1_000_000_000_000;

/// Gas lane key used on public clusters; the mock ignores it, so local
/// deployments forward the same value.
pub const DEFAULT_GAS_LANE: [u8; 32] = [
    0x47, 0x4e, 0x34, 0xa0, 0x77, 0xdf, 0x58, 0x80, 0x7d, 0xbe, 0x9c, 0x96, 0xd3, 0xc0, 0x09, 0xb2,
    0x3b, 0x3c, 0x6d, 0x0c, 0xce, 0x43, 0x3e, 0x59, 0xbb, 0xf5, 0xb3, 0x4f, 0x82, 0x3b, 0xc5, 0x6c,
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cluster {
    Localnet,
    Devnet,
    MainnetBeta,
}

/// Raffle constructor parameters for one cluster. The coordinator address
/// and subscription id are environment-supplied (freshly deployed mock on
/// localnet, operator-run coordinator elsewhere) and so not part of the
/// table.
#[derive(Clone, Copy, Debug)]
pub struct NetworkConfig {
    /// Minimum entry payment, in lamports
    pub entrance_fee: u64,
    /// Minimum seconds between rounds
    pub interval: i64,
    /// Gas lane key forwarded with randomness requests
    pub gas_lane: [u8; 32],
    /// Gas limit forwarded for the fulfillment callback
    pub callback_gas_limit: u32,
}

impl NetworkConfig {
    pub fn for_cluster(cluster: Cluster) -> Self {
        match cluster {
            Cluster::Localnet => Self {
                entrance_fee: 10_000_000, // 0.01 SOL
                interval: 30,
                gas_lane: DEFAULT_GAS_LANE,
                callback_gas_limit: 500_000,
            },
            Cluster::Devnet => Self {
                entrance_fee: 10_000_000,
                interval: 30,
                gas_lane: DEFAULT_GAS_LANE,
                callback_gas_limit: 500_000,
            },
            Cluster::MainnetBeta => Self {
                entrance_fee: 100_000_000, // 0.1 SOL
                interval: 3600,
                gas_lane: DEFAULT_GAS_LANE,
                callback_gas_limit: 500_000,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localnet_parameters_suit_the_harness() {
        let config = NetworkConfig::for_cluster(Cluster::Localnet);
        assert_eq!(config.entrance_fee, 10_000_000);
        assert_eq!(config.interval, 30);
        // a funded subscription covers many fulfillments at mock pricing
        let payment = MOCK_BASE_FEE + MOCK_GAS_PRICE * config.callback_gas_limit as u64;
        assert!(SUBSCRIPTION_FUND_AMOUNT / payment > 1000);
    }
}

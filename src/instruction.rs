use arrayref::array_ref;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::error::RaffleError;

#[derive(Clone, Debug, PartialEq)]
pub enum RaffleInstruction {
    /// Initialize the mock randomness coordinator
    ///
    /// Local-harness analogue of deploying the coordinator mock; public
    /// clusters use an already-deployed coordinator instead.
    ///
    /// Accounts expected:
    /// 0. `[signer]` The payer deploying the mock
    /// 1. `[writable]` The coordinator account, program-owned, uninitialized
    InitializeCoordinator {
        /// Flat fee charged per fulfilled request
        base_fee: u64,
        /// Price per unit of callback gas
        gas_price: u64,
    },

    /// Create a subscription on the coordinator
    ///
    /// Accounts expected:
    /// 0. `[signer]` The subscription owner
    /// 1. `[writable]` The coordinator account
    CreateSubscription,

    /// Credit a subscription's notional balance
    ///
    /// Accounts expected:
    /// 0. `[signer]` The funder
    /// 1. `[writable]` The coordinator account
    FundSubscription {
        subscription_id: u64,
        amount: u64,
    },

    /// Initialize a raffle. Configuration is immutable afterwards.
    ///
    /// Accounts expected:
    /// 0. `[signer]` The authority deploying the raffle
    /// 1. `[writable]` The raffle account, program-owned, uninitialized
    /// 2. `[]` The coordinator account the raffle will request randomness from
    InitializeRaffle {
        /// Minimum payment per entry, in lamports
        entrance_fee: u64,
        /// Minimum seconds between rounds
        interval: i64,
        /// Subscription that pays for randomness requests
        subscription_id: u64,
        /// Gas lane key forwarded with every request
        gas_lane: [u8; 32],
        /// Gas limit forwarded for the fulfillment callback
        callback_gas_limit: u32,
    },

    /// Enter the raffle by paying at least the entrance fee
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The player paying the entry
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    EnterRaffle {
        /// Payment in lamports
        amount: u64,
    },

    /// Evaluate the upkeep predicate and log the outcome. Read-only;
    /// callable by any party at any time. Trailing instruction bytes are
    /// opaque check data and are ignored.
    ///
    /// Accounts expected:
    /// 0. `[]` The raffle account
    CheckUpkeep,

    /// Re-validate the upkeep predicate and issue a randomness request.
    /// The sole path that moves a raffle out of Open. Trailing instruction
    /// bytes are opaque perform data and are ignored.
    ///
    /// Accounts expected:
    /// 0. `[signer]` Any caller (permissionless, the predicate is re-checked)
    /// 1. `[writable]` The raffle account
    /// 2. `[writable]` The coordinator account
    PerformUpkeep,

    /// Deliver random words for an outstanding request and pay the winner
    ///
    /// Accounts expected:
    /// 0. `[signer]` Any caller (the harness drives the mock); the call only
    ///    lands when it matches a pending request in the raffle's coordinator
    /// 1. `[writable]` The coordinator account
    /// 2. `[writable]` The raffle account
    /// 3. `[writable]` The winner account, must be the selected player
    FulfillRandomWords {
        request_id: u64,
        random_words: Vec<u64>,
    },
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(RaffleError::InvalidInstructionData)?;

        Ok(match tag {
            0 => {
                let (base_fee, rest) = Self::unpack_u64(rest)?;
                let (gas_price, _) = Self::unpack_u64(rest)?;
                Self::InitializeCoordinator { base_fee, gas_price }
            }
            1 => Self::CreateSubscription,
            2 => {
                let (subscription_id, rest) = Self::unpack_u64(rest)?;
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::FundSubscription {
                    subscription_id,
                    amount,
                }
            }
            3 => {
                let (entrance_fee, rest) = Self::unpack_u64(rest)?;
                let (interval, rest) = Self::unpack_i64(rest)?;
                let (subscription_id, rest) = Self::unpack_u64(rest)?;
                let (gas_lane, rest) = Self::unpack_bytes32(rest)?;
                let (callback_gas_limit, _) = Self::unpack_u32(rest)?;
                Self::InitializeRaffle {
                    entrance_fee,
                    interval,
                    subscription_id,
                    gas_lane,
                    callback_gas_limit,
                }
            }
            4 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::EnterRaffle { amount }
            }
            // 5 and 6 carry opaque check/perform data after the tag; ignored
            5 => Self::CheckUpkeep,
            6 => Self::PerformUpkeep,
            7 => {
                let (request_id, rest) = Self::unpack_u64(rest)?;
                let (count, mut rest) = Self::unpack_u32(rest)?;
                let expected = (count as usize)
                    .checked_mul(8)
                    .ok_or(RaffleError::InvalidInstructionData)?;
                if rest.len() < expected {
                    return Err(RaffleError::InvalidInstructionData.into());
                }
                let mut random_words = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let (word, tail) = Self::unpack_u64(rest)?;
                    random_words.push(word);
                    rest = tail;
                }
                Self::FulfillRandomWords {
                    request_id,
                    random_words,
                }
            }
            _ => return Err(RaffleError::InvalidInstructionData.into()),
        })
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match *self {
            Self::InitializeCoordinator { base_fee, gas_price } => {
                buf.push(0);
                buf.extend_from_slice(&base_fee.to_le_bytes());
                buf.extend_from_slice(&gas_price.to_le_bytes());
            }
            Self::CreateSubscription => buf.push(1),
            Self::FundSubscription {
                subscription_id,
                amount,
            } => {
                buf.push(2);
                buf.extend_from_slice(&subscription_id.to_le_bytes());
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::InitializeRaffle {
                entrance_fee,
                interval,
                subscription_id,
                ref gas_lane,
                callback_gas_limit,
            } => {
                buf.push(3);
                buf.extend_from_slice(&entrance_fee.to_le_bytes());
                buf.extend_from_slice(&interval.to_le_bytes());
                buf.extend_from_slice(&subscription_id.to_le_bytes());
                buf.extend_from_slice(gas_lane);
                buf.extend_from_slice(&callback_gas_limit.to_le_bytes());
            }
            Self::EnterRaffle { amount } => {
                buf.push(4);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep => buf.push(5),
            Self::PerformUpkeep => buf.push(6),
            Self::FulfillRandomWords {
                request_id,
                ref random_words,
            } => {
                buf.push(7);
                buf.extend_from_slice(&request_id.to_le_bytes());
                buf.extend_from_slice(&(random_words.len() as u32).to_le_bytes());
                for word in random_words {
                    buf.extend_from_slice(&word.to_le_bytes());
                }
            }
        }
        buf
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        if input.len() < 8 {
            return Err(RaffleError::InvalidInstructionData.into());
        }
        let value = u64::from_le_bytes(*array_ref![input, 0, 8]);
        Ok((value, &input[8..]))
    }

    fn unpack_i64(input: &[u8]) -> Result<(i64, &[u8]), ProgramError> {
        if input.len() < 8 {
            return Err(RaffleError::InvalidInstructionData.into());
        }
        let value = i64::from_le_bytes(*array_ref![input, 0, 8]);
        Ok((value, &input[8..]))
    }

    fn unpack_u32(input: &[u8]) -> Result<(u32, &[u8]), ProgramError> {
        if input.len() < 4 {
            return Err(RaffleError::InvalidInstructionData.into());
        }
        let value = u32::from_le_bytes(*array_ref![input, 0, 4]);
        Ok((value, &input[4..]))
    }

    fn unpack_bytes32(input: &[u8]) -> Result<([u8; 32], &[u8]), ProgramError> {
        if input.len() < 32 {
            return Err(RaffleError::InvalidInstructionData.into());
        }
        Ok((*array_ref![input, 0, 32], &input[32..]))
    }
}

/// Create initialize_coordinator instruction
pub fn initialize_coordinator(
    program_id: &Pubkey,
    payer: &Pubkey,
    coordinator: &Pubkey,
    base_fee: u64,
    gas_price: u64,
) -> Instruction {
    let data = RaffleInstruction::InitializeCoordinator { base_fee, gas_price }.pack();

    let accounts = vec![
        AccountMeta::new_readonly(*payer, true),
        AccountMeta::new(*coordinator, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create create_subscription instruction
pub fn create_subscription(program_id: &Pubkey, owner: &Pubkey, coordinator: &Pubkey) -> Instruction {
    let data = RaffleInstruction::CreateSubscription.pack();

    let accounts = vec![
        AccountMeta::new_readonly(*owner, true),
        AccountMeta::new(*coordinator, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create fund_subscription instruction
pub fn fund_subscription(
    program_id: &Pubkey,
    funder: &Pubkey,
    coordinator: &Pubkey,
    subscription_id: u64,
    amount: u64,
) -> Instruction {
    let data = RaffleInstruction::FundSubscription {
        subscription_id,
        amount,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new_readonly(*funder, true),
        AccountMeta::new(*coordinator, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create initialize_raffle instruction
#[allow(clippy::too_many_arguments)]
pub fn initialize_raffle(
    program_id: &Pubkey,
    authority: &Pubkey,
    raffle: &Pubkey,
    coordinator: &Pubkey,
    entrance_fee: u64,
    interval: i64,
    subscription_id: u64,
    gas_lane: [u8; 32],
    callback_gas_limit: u32,
) -> Instruction {
    let data = RaffleInstruction::InitializeRaffle {
        entrance_fee,
        interval,
        subscription_id,
        gas_lane,
        callback_gas_limit,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new_readonly(*authority, true),
        AccountMeta::new(*raffle, false),
        AccountMeta::new_readonly(*coordinator, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create enter_raffle instruction
pub fn enter_raffle(
    program_id: &Pubkey,
    player: &Pubkey,
    raffle: &Pubkey,
    amount: u64,
) -> Instruction {
    let data = RaffleInstruction::EnterRaffle { amount }.pack();

    let accounts = vec![
        AccountMeta::new(*player, true),
        AccountMeta::new(*raffle, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create check_upkeep instruction; `check_data` is opaque and ignored
pub fn check_upkeep(program_id: &Pubkey, raffle: &Pubkey, check_data: &[u8]) -> Instruction {
    let mut data = RaffleInstruction::CheckUpkeep.pack();
    data.extend_from_slice(check_data);

    let accounts = vec![AccountMeta::new_readonly(*raffle, false)];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create perform_upkeep instruction; `perform_data` is opaque and ignored
pub fn perform_upkeep(
    program_id: &Pubkey,
    caller: &Pubkey,
    raffle: &Pubkey,
    coordinator: &Pubkey,
    perform_data: &[u8],
) -> Instruction {
    let mut data = RaffleInstruction::PerformUpkeep.pack();
    data.extend_from_slice(perform_data);

    let accounts = vec![
        AccountMeta::new_readonly(*caller, true),
        AccountMeta::new(*raffle, false),
        AccountMeta::new(*coordinator, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create fulfill_random_words instruction
pub fn fulfill_random_words(
    program_id: &Pubkey,
    caller: &Pubkey,
    coordinator: &Pubkey,
    raffle: &Pubkey,
    winner: &Pubkey,
    request_id: u64,
    random_words: Vec<u64>,
) -> Instruction {
    let data = RaffleInstruction::FulfillRandomWords {
        request_id,
        random_words,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new_readonly(*caller, true),
        AccountMeta::new(*coordinator, false),
        AccountMeta::new(*raffle, false),
        AccountMeta::new(*winner, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

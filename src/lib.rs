// Solraffle
// A cycling raffle on Solana driven by permissionless upkeep and an
// asynchronous randomness request/fulfillment protocol

pub mod error;
pub mod instruction;
pub mod network;
pub mod processor;
pub mod state;
pub mod utils;
pub mod vrf;

#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint;

use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process(program_id, accounts, instruction_data)
}

use crate::error::RaffleError;
use crate::instruction::RaffleInstruction;
use crate::state::{Raffle, RaffleState, Subscription, VrfCoordinator};
use crate::utils::{lamports_to_sol, prize_pool};
use crate::vrf;

use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::invoke,
    program_error::ProgramError,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::InitializeCoordinator { base_fee, gas_price } => {
                msg!("Instruction: Initialize Coordinator");
                Self::process_initialize_coordinator(accounts, base_fee, gas_price, program_id)
            }
            RaffleInstruction::CreateSubscription => {
                msg!("Instruction: Create Subscription");
                Self::process_create_subscription(accounts, program_id)
            }
            RaffleInstruction::FundSubscription {
                subscription_id,
                amount,
            } => {
                msg!("Instruction: Fund Subscription");
                Self::process_fund_subscription(accounts, subscription_id, amount, program_id)
            }
            RaffleInstruction::InitializeRaffle {
                entrance_fee,
                interval,
                subscription_id,
                gas_lane,
                callback_gas_limit,
            } => {
                msg!("Instruction: Initialize Raffle");
                Self::process_initialize_raffle(
                    accounts,
                    entrance_fee,
                    interval,
                    subscription_id,
                    gas_lane,
                    callback_gas_limit,
                    program_id,
                )
            }
            RaffleInstruction::EnterRaffle { amount } => {
                msg!("Instruction: Enter Raffle");
                Self::process_enter_raffle(accounts, amount, program_id)
            }
            RaffleInstruction::CheckUpkeep => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(accounts, program_id)
            }
            RaffleInstruction::PerformUpkeep => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(accounts, program_id)
            }
            RaffleInstruction::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill Random Words");
                Self::process_fulfill_random_words(accounts, request_id, &random_words, program_id)
            }
        }
    }

    fn process_initialize_coordinator(
        accounts: &[AccountInfo],
        base_fee: u64,
        gas_price: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer {
            msg!("Payer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if coordinator_info.owner != program_id {
            msg!("Coordinator account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let existing = VrfCoordinator::unpack_unchecked(&coordinator_info.data.borrow())?;
        if existing.is_initialized {
            msg!("Coordinator account is already initialized");
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        let coordinator = VrfCoordinator::new(base_fee, gas_price);
        coordinator.pack(&mut coordinator_info.data.borrow_mut())?;

        msg!(
            "Coordinator initialized: base_fee={}, gas_price={}",
            base_fee,
            gas_price
        );
        Ok(())
    }

    fn process_create_subscription(
        accounts: &[AccountInfo],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        if !owner_info.is_signer {
            msg!("Subscription owner must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if coordinator_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut coordinator = VrfCoordinator::unpack(&coordinator_info.data.borrow())?;

        let id = coordinator.next_subscription_id;
        coordinator.next_subscription_id = id
            .checked_add(1)
            .ok_or(ProgramError::InvalidArgument)?;
        coordinator.subscriptions.push(Subscription {
            id,
            owner: *owner_info.key,
            balance: 0,
        });
        coordinator.pack(&mut coordinator_info.data.borrow_mut())?;

        msg!("SubscriptionCreated: id={}, owner={}", id, owner_info.key);
        Ok(())
    }

    fn process_fund_subscription(
        accounts: &[AccountInfo],
        subscription_id: u64,
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let funder_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        if !funder_info.is_signer {
            msg!("Funder must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if coordinator_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut coordinator = VrfCoordinator::unpack(&coordinator_info.data.borrow())?;

        let subscription = coordinator
            .subscription_mut(subscription_id)
            .ok_or(RaffleError::InvalidSubscription)?;
        subscription.balance = subscription
            .balance
            .checked_add(amount)
            .ok_or(ProgramError::InvalidArgument)?;
        let balance = subscription.balance;
        coordinator.pack(&mut coordinator_info.data.borrow_mut())?;

        msg!(
            "SubscriptionFunded: id={}, amount={}, balance={}",
            subscription_id,
            amount,
            balance
        );
        Ok(())
    }

    fn process_initialize_raffle(
        accounts: &[AccountInfo],
        entrance_fee: u64,
        interval: i64,
        subscription_id: u64,
        gas_lane: [u8; 32],
        callback_gas_limit: u32,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        if !authority_info.is_signer {
            msg!("Authority must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        if coordinator_info.owner != program_id {
            msg!("Coordinator account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        if entrance_fee == 0 {
            msg!("Entrance fee must be greater than zero");
            return Err(ProgramError::InvalidArgument);
        }
        if interval <= 0 {
            msg!("Interval must be greater than zero");
            return Err(ProgramError::InvalidArgument);
        }

        // the raffle binds to its payment subscription at construction
        let coordinator = VrfCoordinator::unpack(&coordinator_info.data.borrow())?;
        if coordinator.subscription(subscription_id).is_none() {
            msg!("Subscription {} does not exist", subscription_id);
            return Err(RaffleError::InvalidSubscription.into());
        }

        let existing = Raffle::unpack_unchecked(&raffle_info.data.borrow())?;
        if existing.is_initialized {
            msg!("Raffle account is already initialized");
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        let clock = Clock::get()?;

        let raffle = Raffle {
            is_initialized: true,
            entrance_fee,
            interval,
            coordinator: *coordinator_info.key,
            subscription_id,
            gas_lane,
            callback_gas_limit,
            state: RaffleState::Open,
            players: Vec::new(),
            last_timestamp: clock.unix_timestamp,
            recent_winner: Pubkey::default(),
            pending_request: None,
        };
        raffle.pack(&mut raffle_info.data.borrow_mut())?;

        msg!(
            "Raffle initialized: entrance_fee={}, interval={}s, subscription={}",
            entrance_fee,
            interval,
            subscription_id
        );
        Ok(())
    }

    fn process_enter_raffle(
        accounts: &[AccountInfo],
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if raffle_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::unpack(&raffle_info.data.borrow())?;

        if amount < raffle.entrance_fee {
            msg!(
                "Payment of {} lamports is below the entrance fee of {}",
                amount,
                raffle.entrance_fee
            );
            return Err(RaffleError::InsufficientPayment.into());
        }
        if raffle.state != RaffleState::Open {
            msg!("Raffle is calculating a winner, entries are blocked");
            return Err(RaffleError::RaffleNotOpen.into());
        }

        invoke(
            &system_instruction::transfer(player_info.key, raffle_info.key, amount),
            &[
                player_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        raffle.players.push(*player_info.key);
        raffle.pack(&mut raffle_info.data.borrow_mut())?;

        msg!("RaffleEnter: player={}", player_info.key);
        Ok(())
    }

    /// Read-only: evaluates and logs the upkeep predicate, never writes
    fn process_check_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        if raffle_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let raffle = Raffle::unpack(&raffle_info.data.borrow())?;
        let rent = Rent::get()?;
        let pool = prize_pool(
            raffle_info.lamports(),
            rent.minimum_balance(raffle_info.data_len()),
        );
        let clock = Clock::get()?;
        let upkeep_needed = raffle.upkeep_needed(pool, clock.unix_timestamp);

        msg!("CheckUpkeep: upkeep_needed={}", upkeep_needed);
        Ok(())
    }

    fn process_perform_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        // permissionless, but the caller still signs the transaction
        if !caller_info.is_signer {
            msg!("Caller must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if raffle_info.owner != program_id || coordinator_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::unpack(&raffle_info.data.borrow())?;

        if raffle.coordinator != *coordinator_info.key {
            msg!("Coordinator account does not match the one configured for this raffle");
            return Err(ProgramError::InvalidArgument);
        }

        let rent = Rent::get()?;
        let pool = prize_pool(
            raffle_info.lamports(),
            rent.minimum_balance(raffle_info.data_len()),
        );
        let clock = Clock::get()?;

        // any account may call this, so the predicate is re-checked even
        // though a well-behaved trigger only calls after CheckUpkeep
        if !raffle.upkeep_needed(pool, clock.unix_timestamp) {
            msg!(
                "UpkeepNotNeeded: balance={}, players={}, state={:?}",
                pool,
                raffle.num_players(),
                raffle.state
            );
            return Err(RaffleError::UpkeepNotNeeded.into());
        }

        let mut coordinator = VrfCoordinator::unpack(&coordinator_info.data.borrow())?;
        let request_id = vrf::issue_request(&mut coordinator, raffle_info.key, &raffle)?;
        coordinator.pack(&mut coordinator_info.data.borrow_mut())?;

        // sole transition out of Open; balance and players are untouched
        raffle.state = RaffleState::Calculating;
        raffle.pending_request = Some(request_id);
        raffle.pack(&mut raffle_info.data.borrow_mut())?;

        msg!(
            "RequestedRaffleWinner: request_id={}, subscription={}, confirmations={}, callback_gas_limit={}, num_words={}",
            request_id,
            raffle.subscription_id,
            vrf::REQUEST_CONFIRMATIONS,
            raffle.callback_gas_limit,
            vrf::NUM_WORDS
        );
        Ok(())
    }

    /// Delivers the random words for an outstanding request: picks the
    /// winner, pays out the whole pool, and reopens the raffle. Runs as one
    /// transaction, so a failed payout leaves every state change unapplied
    /// and the raffle still Calculating.
    fn process_fulfill_random_words(
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: &[u64],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        if !caller_info.is_signer {
            msg!("Caller must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if raffle_info.owner != program_id || coordinator_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::unpack(&raffle_info.data.borrow())?;

        // the raffle only accepts fulfillment routed through the coordinator
        // it was constructed with
        if raffle.coordinator != *coordinator_info.key {
            msg!("Coordinator account does not match the one configured for this raffle");
            return Err(RaffleError::RequestMismatch.into());
        }

        let mut coordinator = VrfCoordinator::unpack(&coordinator_info.data.borrow())?;
        let request = vrf::take_request(&mut coordinator, request_id, raffle_info.key)?;

        if raffle.pending_request != Some(request_id) {
            msg!("Raffle has no outstanding request with id {}", request_id);
            return Err(RaffleError::RequestMismatch.into());
        }

        if random_words.len() != request.num_words as usize {
            msg!(
                "Expected {} random words, got {}",
                request.num_words,
                random_words.len()
            );
            return Err(RaffleError::InvalidRandomWords.into());
        }

        vrf::settle_request(&mut coordinator, &request)?;

        let index = vrf::winner_index(random_words[0], raffle.players.len() as u64);
        let winner = *raffle
            .players
            .get(index as usize)
            .ok_or(ProgramError::InvalidAccountData)?;
        if *winner_info.key != winner {
            msg!(
                "Winner account {} is not the selected player {}",
                winner_info.key,
                winner
            );
            return Err(RaffleError::WinnerMismatch.into());
        }

        let clock = Clock::get()?;

        // reset the round and reopen atomically with the payout below
        raffle.players.clear();
        raffle.last_timestamp = clock.unix_timestamp;
        raffle.state = RaffleState::Open;
        raffle.recent_winner = winner;
        raffle.pending_request = None;
        raffle.pack(&mut raffle_info.data.borrow_mut())?;
        coordinator.pack(&mut coordinator_info.data.borrow_mut())?;

        // move the entire pool; the rent floor stays behind
        let rent = Rent::get()?;
        let pool = prize_pool(
            raffle_info.lamports(),
            rent.minimum_balance(raffle_info.data_len()),
        );
        let raffle_lamports = raffle_info.lamports();
        **raffle_info.lamports.borrow_mut() = raffle_lamports
            .checked_sub(pool)
            .ok_or(RaffleError::TransferFailed)?;
        **winner_info.lamports.borrow_mut() = winner_info
            .lamports()
            .checked_add(pool)
            .ok_or(RaffleError::TransferFailed)?;

        msg!(
            "WinnerPicked: winner={}, prize={} SOL",
            winner,
            lamports_to_sol(pool)
        );
        Ok(())
    }
}

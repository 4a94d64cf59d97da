use std::time::Duration;

use anchor_client::solana_sdk::pubkey::Pubkey;
use votesol_client::{BallotTally, VoteError, VoteOption, VoteOutcome, VotePhase};

use crate::utils::*;

fn votes(tally: &BallotTally) -> (u64, u64) {
    (tally.left_votes, tally.right_votes)
}

#[tokio::test]
async fn test_vote_left_updates_cache() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let voter = context.voter(true);

    let outcome = voter
        .coordinator
        .cast_vote(voter.caller, VoteOption::Left)
        .await;

    let VoteOutcome::Completed { tally, .. } = outcome else {
        panic!("unexpected outcome: {}", outcome);
    };
    assert_eq!(votes(&tally.unwrap()), (1, 0));
    assert_eq!(votes(&voter.coordinator.cache().snapshot().unwrap()), (1, 0));
    assert_eq!(voter.coordinator.phase(&voter.caller), VotePhase::Completed);
    assert_eq!(context.ledger.submissions(), 1);
}

#[tokio::test]
async fn test_not_whitelisted_is_rejected_without_submission() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let voter = context.voter(false);

    let outcome = voter
        .coordinator
        .cast_vote(voter.caller, VoteOption::Right)
        .await;

    assert_rejected(&outcome, VoteError::NotWhitelisted);
    assert_eq!(context.ledger.submissions(), 0);
    assert!(voter.coordinator.cache().snapshot().is_none());
    assert_eq!(voter.coordinator.phase(&voter.caller), VotePhase::Rejected);
}

#[tokio::test]
async fn test_gate_network_failure_fails_the_vote() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let voter = context.voter(true);
    context
        .ledger
        .fail_fetches(Some(VoteError::NetworkError("timeout".into())));

    let outcome = voter
        .coordinator
        .cast_vote(voter.caller, VoteOption::Left)
        .await;

    assert_failed(&outcome, VoteError::NetworkError("timeout".into()));
    assert_eq!(context.ledger.submissions(), 0);
}

#[tokio::test]
async fn test_rejected_transaction_is_surfaced_verbatim() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let voter = context.voter(true);
    let reason = "Error processing Instruction 0: custom program error: 0x1770";
    context
        .ledger
        .fail_sends(Some(VoteError::TransactionRejected(reason.into())));

    let outcome = voter
        .coordinator
        .cast_vote(voter.caller, VoteOption::Left)
        .await;

    assert_failed(&outcome, VoteError::TransactionRejected(reason.into()));
    assert!(voter.coordinator.cache().snapshot().is_none());
    assert_eq!(voter.coordinator.phase(&voter.caller), VotePhase::Failed);
}

#[tokio::test]
async fn test_network_failure_leaves_state_for_retry() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let voter = context.voter(true);
    context
        .ledger
        .fail_sends(Some(VoteError::NetworkError("connection reset".into())));

    let outcome = voter
        .coordinator
        .cast_vote(voter.caller, VoteOption::Left)
        .await;
    let VoteOutcome::Failed(err) = &outcome else {
        panic!("unexpected outcome: {}", outcome);
    };
    assert!(err.is_retryable());
    assert!(voter.coordinator.cache().snapshot().is_none());
    assert_eq!(votes_on_ledger(&context), (0, 0));

    context.ledger.fail_sends(None);
    let retry = voter
        .coordinator
        .cast_vote(voter.caller, VoteOption::Left)
        .await;
    assert!(matches!(retry, VoteOutcome::Completed { .. }));
    assert_eq!(votes_on_ledger(&context), (1, 0));
}

#[tokio::test]
async fn test_second_request_while_in_flight_is_ignored() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let voter = context.voter(true);
    context.ledger.hold_submissions();

    let (first, second) = tokio::join!(
        voter.coordinator.cast_vote(voter.caller, VoteOption::Left),
        async {
            context.ledger.wait_for_submission().await;
            assert_eq!(voter.coordinator.phase(&voter.caller), VotePhase::Submitting);
            let second = voter
                .coordinator
                .cast_vote(voter.caller, VoteOption::Left)
                .await;
            context.ledger.release_submissions();
            second
        }
    );

    assert!(matches!(first, VoteOutcome::Completed { .. }));
    assert_rejected(&second, VoteError::AlreadyInFlight);
    assert_eq!(context.ledger.submissions(), 1);
    assert_eq!(votes_on_ledger(&context), (1, 0));
}

#[tokio::test]
async fn test_different_callers_vote_independently() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let alice = context.voter(true);
    let bob = context.voter(true);

    let (a, b) = tokio::join!(
        alice.coordinator.cast_vote(alice.caller, VoteOption::Left),
        bob.coordinator.cast_vote(bob.caller, VoteOption::Right),
    );

    assert!(matches!(a, VoteOutcome::Completed { .. }));
    assert!(matches!(b, VoteOutcome::Completed { .. }));
    assert_eq!(context.ledger.submissions(), 2);
    assert_eq!(votes_on_ledger(&context), (1, 1));
}

#[tokio::test]
async fn test_disconnect_during_submission_abandons_vote() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let voter = context.voter(true);
    context.ledger.hold_submissions();

    let (outcome, _) = tokio::join!(
        voter.coordinator.cast_vote(voter.caller, VoteOption::Right),
        async {
            context.ledger.wait_for_submission().await;
            voter.coordinator.session().disconnect();
            context.ledger.release_submissions();
        }
    );

    assert_eq!(outcome, VoteOutcome::Abandoned);
    assert!(voter.coordinator.cache().snapshot().is_none());
    assert_eq!(voter.coordinator.phase(&voter.caller), VotePhase::Abandoned);
}

#[tokio::test]
async fn test_disconnect_during_gating_abandons_vote() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let voter = context.voter(true);
    context.ledger.hold_fetches();

    let (outcome, _) = tokio::join!(
        voter.coordinator.cast_vote(voter.caller, VoteOption::Left),
        async {
            context.ledger.wait_for_fetch().await;
            assert_eq!(voter.coordinator.phase(&voter.caller), VotePhase::Gating);
            voter.coordinator.session().disconnect();
            context.ledger.release_fetches();
        }
    );

    assert_eq!(outcome, VoteOutcome::Abandoned);
    assert_eq!(context.ledger.submissions(), 0);
    assert!(voter.coordinator.cache().snapshot().is_none());
    assert_eq!(voter.coordinator.phase(&voter.caller), VotePhase::Abandoned);
}

#[tokio::test]
async fn test_reconnect_during_submission_still_abandons_vote() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let voter = context.voter(true);
    context.ledger.hold_submissions();

    let (outcome, _) = tokio::join!(
        voter.coordinator.cast_vote(voter.caller, VoteOption::Right),
        async {
            context.ledger.wait_for_submission().await;
            voter.coordinator.session().disconnect();
            voter.coordinator.session().connect();
            context.ledger.release_submissions();
        }
    );

    assert_eq!(outcome, VoteOutcome::Abandoned);
    assert!(voter.coordinator.cache().snapshot().is_none());
    assert_eq!(votes_on_ledger(&context), (0, 0));

    // The new session votes normally.
    let outcome = voter
        .coordinator
        .cast_vote(voter.caller, VoteOption::Right)
        .await;
    let VoteOutcome::Completed { tally, .. } = outcome else {
        panic!("unexpected outcome: {}", outcome);
    };
    assert_eq!(votes(&tally.unwrap()), (0, 1));
}

#[tokio::test]
async fn test_vote_requires_connected_caller() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let voter = context.voter(true);

    let stranger = Pubkey::new_unique();
    let outcome = voter
        .coordinator
        .cast_vote(stranger, VoteOption::Left)
        .await;
    assert_rejected(&outcome, VoteError::WalletNotConnected);

    voter.coordinator.session().disconnect();
    let outcome = voter
        .coordinator
        .cast_vote(voter.caller, VoteOption::Left)
        .await;
    assert_rejected(&outcome, VoteError::WalletNotConnected);
    assert_eq!(context.ledger.submissions(), 0);

    voter.coordinator.session().connect();
    let outcome = voter
        .coordinator
        .cast_vote(voter.caller, VoteOption::Left)
        .await;
    assert!(matches!(outcome, VoteOutcome::Completed { .. }));
}

#[tokio::test]
async fn test_dropped_request_releases_caller() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let voter = context.voter(true);
    context.ledger.hold_submissions();

    let res = tokio::time::timeout(
        Duration::from_millis(50),
        voter.coordinator.cast_vote(voter.caller, VoteOption::Left),
    )
    .await;
    assert!(res.is_err());
    assert_eq!(voter.coordinator.phase(&voter.caller), VotePhase::Abandoned);

    context.ledger.resume_submissions();
    let outcome = voter
        .coordinator
        .cast_vote(voter.caller, VoteOption::Left)
        .await;
    let VoteOutcome::Completed { tally, .. } = outcome else {
        panic!("unexpected outcome: {}", outcome);
    };
    assert_eq!(votes(&tally.unwrap()), (1, 0));
    assert_eq!(context.ledger.submissions(), 2);
}

#[tokio::test]
async fn test_sequential_votes_are_monotone() {
    let context = ProgramTestContext::new();
    context.ledger.put_ballot_box(0, 0);
    let voter = context.voter(true);

    let mut previous: Option<BallotTally> = None;
    for option in [VoteOption::Left, VoteOption::Right, VoteOption::Left] {
        let (_, tally) = voter
            .coordinator
            .cast_vote(voter.caller, option)
            .await
            .into_result()
            .unwrap();
        let tally = tally.unwrap();

        if let Some(previous) = previous {
            assert_eq!(tally.total_votes(), previous.total_votes() + 1);
            assert!(tally.left_votes >= previous.left_votes);
            assert!(tally.right_votes >= previous.right_votes);
            assert!(tally.slot > previous.slot);
        }
        previous = Some(tally);
    }

    assert_eq!(votes(&previous.unwrap()), (2, 1));
    assert_eq!(context.ledger.submissions(), 3);
}

fn votes_on_ledger(context: &ProgramTestContext) -> (u64, u64) {
    let ballot_box = context.ledger.ballot_box().unwrap();
    (ballot_box.left_votes, ballot_box.right_votes)
}

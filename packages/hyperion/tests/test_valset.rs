//! Validator set rotation tests.

mod support;

use cosmwasm_std::{HexBinary, Uint128, Uint256};

use hyperion::msg::{ExecuteMsg, QueryMsg, Signatures};
use hyperion::state::MAX_NONCE_JUMP;

use crate::support::{
    attr, events, setup, setup_with, sign, signer, Behavior, Committee, TestEnv, OWNER, RELAYER,
};

fn next_committee(nonce: u128) -> Committee {
    Committee::new(&[0x1a, 0x1b, 0x1c, 0x1d], &[100, 100, 100, 100], nonce)
}

fn update_with(env: &TestEnv, next: &Committee, signatures: Signatures) -> ExecuteMsg {
    ExecuteMsg::UpdateValset {
        new_valset: next.valset(),
        current_valset: env.committee.valset(),
        signatures,
    }
}

fn last_valset_nonce(env: &TestEnv) -> Uint256 {
    env.query(&QueryMsg::StateLastValsetNonce {})
}

fn word(byte: u8) -> HexBinary {
    HexBinary::from([byte; 32].as_slice())
}

// ============================================================================
// Rotation
// ============================================================================

#[test]
fn test_rotation_commits_new_checkpoint() {
    let mut env = setup();
    let next = next_committee(1);

    let res = env.rotate(next.clone(), &[0, 1]).unwrap();

    assert_eq!(
        env.checkpoint(),
        HexBinary::from(next.checkpoint().as_slice())
    );
    assert_eq!(last_valset_nonce(&env), Uint256::from(1u128));
    assert_eq!(env.last_event_nonce(), Uint256::from(1u128));

    let updated = events(&res, "valset_updated");
    assert_eq!(updated.len(), 1);
    assert_eq!(attr(updated[0], "new_valset_nonce").as_deref(), Some("1"));
    assert_eq!(attr(updated[0], "event_nonce").as_deref(), Some("1"));
    assert_eq!(
        attr(updated[0], "validators"),
        Some(next.addresses().join(","))
    );
    assert_eq!(
        attr(updated[0], "powers").as_deref(),
        Some("100,100,100,100")
    );
    assert_eq!(attr(updated[0], "reward_token"), None);
}

#[test]
fn test_new_committee_governs_after_rotation() {
    let mut env = setup();
    env.rotate(next_committee(1), &[0, 2]).unwrap();

    // the new set signs the following rotation
    let third = Committee::new(&[0x2a, 0x2b], &[150, 150], 2);
    env.rotate(third, &[1, 3]).unwrap();
    assert_eq!(env.last_event_nonce(), Uint256::from(2u128));
}

#[test]
fn test_replayed_update_fails() {
    let mut env = setup();
    let msg = env.update_valset_msg(&next_committee(1), &[0, 1]);

    env.execute(RELAYER, &msg).unwrap();
    let err = env.execute(RELAYER, &msg).unwrap_err();
    assert_eq!(
        err,
        "Supplied current validators and powers do not match checkpoint."
    );
}

// ============================================================================
// Nonce rules
// ============================================================================

#[test]
fn test_nonce_must_increase() {
    let mut env = setup();
    let err = env.rotate(next_committee(0), &[0, 1]).unwrap_err();
    assert_eq!(
        err,
        "New valset nonce must be greater than the current nonce"
    );
}

#[test]
fn test_nonce_jump_boundary() {
    let mut env = setup();

    let mut too_far = next_committee(0);
    too_far.nonce = MAX_NONCE_JUMP;
    let err = env.rotate(too_far, &[0, 1]).unwrap_err();
    assert_eq!(
        err,
        "New valset nonce must be less than 10^15 greater than the current nonce"
    );

    let mut furthest = next_committee(0);
    furthest.nonce = MAX_NONCE_JUMP - Uint256::from(1u128);
    env.rotate(furthest, &[0, 1]).unwrap();
    assert_eq!(
        last_valset_nonce(&env),
        MAX_NONCE_JUMP - Uint256::from(1u128)
    );
}

// ============================================================================
// Consistency
// ============================================================================

#[test]
fn test_malformed_new_valset() {
    let mut env = setup();
    let mut next = next_committee(1);
    next.powers.pop();
    let err = env.rotate(next, &[0, 1]).unwrap_err();
    assert_eq!(err, "Malformed new validator set");
}

#[test]
fn test_malformed_signature_arrays() {
    let mut env = setup();
    let next = next_committee(1);
    let mut signatures = env.committee.sign(&next.checkpoint(), &[0, 1]);
    signatures.v.pop();
    let msg = update_with(&env, &next, signatures);

    let err = env.execute(RELAYER, &msg).unwrap_err();
    assert_eq!(err, "Malformed current validator set");
}

#[test]
fn test_signature_words_must_be_32_bytes() {
    let mut env = setup();
    let next = next_committee(1);
    let mut signatures = env.committee.sign(&next.checkpoint(), &[0, 1]);
    signatures.r[2] = HexBinary::from([0u8; 31].as_slice());
    let msg = update_with(&env, &next, signatures);

    let err = env.execute(RELAYER, &msg).unwrap_err();
    assert_eq!(err, "Malformed current validator set");
}

#[test]
fn test_invalid_validator_address() {
    let mut env = setup();
    let next = next_committee(1);
    let mut new_valset = next.valset();
    new_valset.validators[0] = "0x1234".to_string();
    let msg = ExecuteMsg::UpdateValset {
        new_valset,
        current_valset: env.committee.valset(),
        signatures: env.committee.sign(&next.checkpoint(), &[0, 1]),
    };

    let err = env.execute(RELAYER, &msg).unwrap_err();
    assert_eq!(err, "Hyperion: invalid validator address 0x1234");
}

#[test]
fn test_current_valset_must_match_checkpoint() {
    let mut env = setup();
    let next = next_committee(1);
    let mut current_valset = env.committee.valset();
    current_valset.powers[2] = Uint256::from(101u128);
    let msg = ExecuteMsg::UpdateValset {
        new_valset: next.valset(),
        current_valset,
        signatures: env.committee.sign(&next.checkpoint(), &[0, 1]),
    };

    let err = env.execute(RELAYER, &msg).unwrap_err();
    assert_eq!(
        err,
        "Supplied current validators and powers do not match checkpoint."
    );
}

#[test]
fn test_new_valset_needs_threshold_power() {
    let mut env = setup();
    let weak = Committee::new(&[0x1a], &[199], 1);
    let err = env.rotate(weak, &[0, 1, 2]).unwrap_err();
    assert_eq!(err, "New validator set does not have enough power.");
}

// ============================================================================
// Signatures
// ============================================================================

#[test]
fn test_insufficient_signing_power() {
    let mut env = setup();
    let err = env.rotate(next_committee(1), &[2]).unwrap_err();
    assert_eq!(
        err,
        "Submitted validator set signatures do not have enough power."
    );
    assert_eq!(env.last_event_nonce(), Uint256::zero());
}

#[test]
fn test_signature_from_wrong_key() {
    let mut env = setup();
    let next = next_committee(1);
    let mut signatures = env.committee.sign(&next.checkpoint(), &[0, 1]);
    let (v, r, s) = sign(&signer(0x66), &next.checkpoint());
    signatures.v[0] = v;
    signatures.r[0] = r;
    signatures.s[0] = s;
    let msg = update_with(&env, &next, signatures);

    let err = env.execute(RELAYER, &msg).unwrap_err();
    assert_eq!(err, "Validator signature does not match.");
}

#[test]
fn test_signature_over_other_digest() {
    let mut env = setup();
    let next = next_committee(1);
    let mut signatures = env.committee.sign(&next.checkpoint(), &[1, 2]);
    let (v, r, s) = sign(&env.committee.keys[1], &[0x42; 32]);
    signatures.v[1] = v;
    signatures.r[1] = r;
    signatures.s[1] = s;
    let msg = update_with(&env, &next, signatures);

    let err = env.execute(RELAYER, &msg).unwrap_err();
    assert_eq!(err, "Validator signature does not match.");
}

#[test]
fn test_threshold_reached_exactly() {
    // 60 + 40 meets a threshold of 100; the bad signature after it is never read
    let committee = Committee::new(&[0x0a, 0x0b, 0x0c], &[60, 40, 50], 0);
    let mut env = setup_with(committee, 100);

    let next = Committee::new(&[0x1a], &[100], 1);
    let mut signatures = env.committee.sign(&next.checkpoint(), &[0, 1]);
    signatures.v[2] = 27;
    signatures.r[2] = word(0x11);
    signatures.s[2] = word(0x22);
    let msg = update_with(&env, &next, signatures);

    env.execute(RELAYER, &msg).unwrap();
    assert_eq!(
        env.checkpoint(),
        HexBinary::from(next.checkpoint().as_slice())
    );
}

#[test]
fn test_zero_power_validator_is_skipped() {
    let committee = Committee::new(&[0x0a, 0x0b, 0x0c], &[0, 100, 100], 0);
    let mut env = setup_with(committee, 200);

    let next = next_committee(1);
    let mut signatures = env.committee.sign(&next.checkpoint(), &[1, 2]);
    // garbage under a zero-power validator does not matter
    signatures.v[0] = 28;
    signatures.r[0] = word(0x33);
    signatures.s[0] = word(0x44);
    let msg = update_with(&env, &next, signatures);

    env.execute(RELAYER, &msg).unwrap();
}

// ============================================================================
// Rewards
// ============================================================================

#[test]
fn test_reward_paid_from_vault() {
    let mut env = setup();
    let token = env.deploy_mock(Behavior::Standard, OWNER, 1_000);
    env.fund_vault(&token, OWNER, 1_000);

    let mut next = next_committee(1);
    next.reward_amount = Uint128::new(250);
    next.reward_token = Some(token.to_string());
    let res = env.rotate(next, &[0, 1]).unwrap();

    assert_eq!(env.balance_of(&token, RELAYER), Uint128::new(250));
    assert_eq!(env.balance_of(&token, env.bridge.as_str()), Uint128::new(750));
    assert_eq!(
        event_reward_token(&res),
        Some(token.to_string())
    );
}

fn event_reward_token(res: &cw_multi_test::AppResponse) -> Option<String> {
    attr(events(res, "valset_updated")[0], "reward_token")
}

#[test]
fn test_reward_minted_for_native_token() {
    let mut env = setup();
    let token = env.deploy_native("ahelios", None);
    let nonce_before = env.last_event_nonce();

    let mut next = next_committee(1);
    next.reward_amount = Uint128::new(5);
    next.reward_token = Some(token.to_string());
    let res = env.rotate(next, &[0, 1]).unwrap();

    assert_eq!(env.balance_of(&token, RELAYER), Uint128::new(5));
    assert_eq!(env.total_supply(&token), Uint128::new(5));

    let updated = events(&res, "valset_updated");
    assert_eq!(
        attr(updated[0], "event_nonce"),
        Some((nonce_before + Uint256::from(1u128)).to_string())
    );
    assert_eq!(event_reward_token(&res), Some(token.to_string()));
}

#[test]
fn test_unfunded_reward_reverts_rotation() {
    let mut env = setup();
    let token = env.deploy_mock(Behavior::Standard, OWNER, 1_000);
    let before = env.checkpoint();

    let mut next = next_committee(1);
    next.reward_amount = Uint128::new(1);
    next.reward_token = Some(token.to_string());
    let err = env.rotate(next, &[0, 1]).unwrap_err();

    assert!(err.contains("Cannot Sub"), "{err}");
    assert_eq!(env.checkpoint(), before);
    assert_eq!(env.last_event_nonce(), Uint256::zero());
}

#[test]
fn test_missing_reward_token_pays_nothing() {
    let mut env = setup();
    let mut next = next_committee(1);
    next.reward_amount = Uint128::new(10);
    next.reward_token = Some(String::new());
    env.rotate(next, &[0, 1]).unwrap();
    assert_eq!(env.last_event_nonce(), Uint256::from(1u128));
}

#[test]
fn test_rotation_blocked_while_paused() {
    let mut env = setup();
    env.execute(OWNER, &ExecuteMsg::EmergencyPause {}).unwrap();
    let err = env.rotate(next_committee(1), &[0, 1]).unwrap_err();
    assert_eq!(err, "Pausable: paused");
}

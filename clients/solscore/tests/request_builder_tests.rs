//! Request builder tests
//!
//! - Preconditions fail before anything is sent
//! - Derived accounts and normalized amounts reach the instruction
//! - Duplicate submissions resolve to the sentinel


use anchor_lang::prelude::Pubkey;
use anchor_lang::AnchorDeserialize;
use solscore_client::instructions::{sighash, InitializeMarketArgs, PlaceBetArgs};
use solscore_client::pda::{bet_address, market_address, token_account, vault_address};
use solscore_client::{
    ClaimPayoutParams, ClientError, CloseMarketParams, CreateMarketParams, PlaceBetParams,
    ResolveMarketParams, TransportError, TxOutcome,
};
use test_helpers::*;

fn create_params() -> CreateMarketParams {
    CreateMarketParams {
        league_name: "Premier League".to_string(),
        season: "2025".to_string(),
        teams: vec!["A".to_string(), "B".to_string()],
        odds: vec![2.0, 3.0],
        max_stake: 10.0,
        allowed_bettors: 10,
    }
}

// ============================================================================
// CREATE MARKET
// ============================================================================

#[tokio::test]
async fn test_create_market_sends_normalized_args() {
    let admin = Pubkey::new_unique();
    let client = create_client(Some(admin));

    let outcome = client.create_market(&create_params()).await.unwrap();
    assert_eq!(outcome, TxOutcome::Confirmed("sig1".to_string()));

    let sent = client.transport().sent();
    assert_eq!(sent.len(), 1);
    let ix = &sent[0];
    assert_eq!(ix.program_id, client.config().program_id);
    assert_eq!(&ix.data[..8], &sighash("initialize_market"));

    let args = InitializeMarketArgs::try_from_slice(&ix.data[8..]).unwrap();
    assert_eq!(args.odds, vec![200, 300]);
    assert_eq!(args.max_stake_amount, 10_000_000);
    assert_eq!(args.allowed_bettors, 10);

    let (market, _) = market_address(&client.config().program_id, "Premier League", "2025").unwrap();
    assert_eq!(ix.accounts[0].pubkey, market);
    assert_eq!(ix.accounts[1].pubkey, vault_address(&client.config().mint, &market));
    assert_eq!(ix.accounts[3].pubkey, admin);
    assert!(ix.accounts[3].is_signer);
    assert_eq!(ix.accounts[4].pubkey, token_account(&client.config().mint, &admin));
}

#[tokio::test]
async fn test_create_market_requires_wallet() {
    let client = create_client(None);
    let err = client.create_market(&create_params()).await.unwrap_err();
    assert_eq!(err, ClientError::WalletNotConnected);
    assert!(client.transport().sent().is_empty());
}

#[tokio::test]
async fn test_create_market_rejects_mismatched_odds() {
    let client = create_client(Some(Pubkey::new_unique()));
    let mut params = create_params();
    params.odds = vec![2.0];

    let err = client.create_market(&params).await.unwrap_err();
    assert!(err.is_precondition());
    assert!(client.transport().sent().is_empty());
}

#[tokio::test]
async fn test_create_market_rejects_more_teams_than_a_u8_index() {
    let client = create_client(Some(Pubkey::new_unique()));
    let mut params = create_params();
    params.teams = (0..257).map(|i| format!("Team {}", i)).collect();
    params.odds = vec![2.0; 257];

    let err = client.create_market(&params).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidParameter(_)));
    assert!(client.transport().sent().is_empty());

    params.teams.pop();
    params.odds.pop();
    client.create_market(&params).await.unwrap();
    assert_eq!(client.transport().sent().len(), 1);
}

// ============================================================================
// PLACE BET
// ============================================================================

#[tokio::test]
async fn test_place_bet_two_team_scenario() {
    let user = Pubkey::new_unique();
    let client = create_client(Some(user));
    let market = seed_market(&client, &two_team_market(Pubkey::new_unique()));

    let view = client.market(&market).await.unwrap().unwrap();
    assert_eq!(view.max_stake_amount, 10_000_000);
    assert_eq!(view.potential_payout(1, 4_000_000), Some(12.0));

    let outcome = client
        .place_bet(&PlaceBetParams {
            market,
            team_index: 1,
            amount: 4.0,
        })
        .await
        .unwrap();
    assert!(outcome.signature().is_some());

    let sent = client.transport().sent();
    let ix = &sent[0];
    assert_eq!(&ix.data[..8], &sighash("place_bet"));
    let args = PlaceBetArgs::try_from_slice(&ix.data[8..]).unwrap();
    assert_eq!(args, PlaceBetArgs { team_index: 1, amount: 4_000_000 });

    let (bet, _) = bet_address(&client.config().program_id, &user, &market).unwrap();
    assert_eq!(ix.accounts[0].pubkey, bet);
    assert_eq!(ix.accounts[1].pubkey, market);
    assert_eq!(ix.accounts[3].pubkey, token_account(&client.config().mint, &user));
}

#[tokio::test]
async fn test_place_bet_team_index_out_of_range() {
    let client = create_client(Some(Pubkey::new_unique()));
    let market = seed_market(&client, &two_team_market(Pubkey::new_unique()));

    let err = client
        .place_bet(&PlaceBetParams {
            market,
            team_index: 2,
            amount: 1.0,
        })
        .await
        .unwrap_err();

    assert_eq!(err, ClientError::TeamIndexOutOfRange { index: 2, teams: 2 });
    assert!(client.transport().sent().is_empty());
}

#[tokio::test]
async fn test_place_bet_on_resolved_market_rejected() {
    let client = create_client(Some(Pubkey::new_unique()));
    let mut resolved = two_team_market(Pubkey::new_unique());
    resolved.is_resolved = true;
    resolved.winning_team_index = Some(0);
    let market = seed_market(&client, &resolved);

    for team_index in 0..2 {
        let err = client
            .place_bet(&PlaceBetParams {
                market,
                team_index,
                amount: 1.0,
            })
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::MarketResolved);
    }
    assert!(client.transport().sent().is_empty());
}

#[tokio::test]
async fn test_place_bet_rechecks_market_resolved_after_caching() {
    let client = create_client(Some(Pubkey::new_unique()));
    let mut open = two_team_market(Pubkey::new_unique());
    let market = seed_market(&client, &open);

    let cached = client.market(&market).await.unwrap().unwrap();
    assert!(!cached.is_resolved);

    open.is_resolved = true;
    open.winning_team_index = Some(0);
    client.transport().insert(market, &open);

    let err = client
        .place_bet(&PlaceBetParams {
            market,
            team_index: 1,
            amount: 1.0,
        })
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::MarketResolved);
    assert!(client.transport().sent().is_empty());
}

#[tokio::test]
async fn test_place_bet_rejects_non_positive_stake() {
    let client = create_client(Some(Pubkey::new_unique()));
    let market = seed_market(&client, &two_team_market(Pubkey::new_unique()));

    for amount in [0.0, -1.0, f64::NAN] {
        let err = client
            .place_bet(&PlaceBetParams {
                market,
                team_index: 0,
                amount,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidParameter(_)));
    }
    assert!(client.transport().sent().is_empty());
}

#[tokio::test]
async fn test_place_bet_above_max_stake_rejected() {
    let client = create_client(Some(Pubkey::new_unique()));
    let market = seed_market(&client, &two_team_market(Pubkey::new_unique()));

    let err = client
        .place_bet(&PlaceBetParams {
            market,
            team_index: 0,
            amount: 10.5,
        })
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::StakeExceedsMax { max: 10.0 });
}

#[tokio::test]
async fn test_place_bet_unknown_market() {
    let client = create_client(Some(Pubkey::new_unique()));
    let err = client
        .place_bet(&PlaceBetParams {
            market: Pubkey::new_unique(),
            team_index: 0,
            amount: 1.0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MarketNotFound(_)));
}

#[tokio::test]
async fn test_place_bet_already_processed_is_soft_success() {
    let client = create_client(Some(Pubkey::new_unique()));
    let market = seed_market(&client, &two_team_market(Pubkey::new_unique()));
    client.transport().fail_next_send(TransportError::from_message(
        "Transaction simulation failed: This transaction has already been processed",
    ));

    let outcome = client
        .place_bet(&PlaceBetParams {
            market,
            team_index: 0,
            amount: 2.0,
        })
        .await
        .unwrap();

    assert!(outcome.is_already_processed());
    assert_eq!(outcome.to_string(), "Transaction completed (already processed)");
}

#[tokio::test]
async fn test_place_bet_rejection_propagates_message() {
    let client = create_client(Some(Pubkey::new_unique()));
    let market = seed_market(&client, &two_team_market(Pubkey::new_unique()));
    client
        .transport()
        .fail_next_send(TransportError::Rejected("insufficient funds".to_string()));

    let err = client
        .place_bet(&PlaceBetParams {
            market,
            team_index: 0,
            amount: 2.0,
        })
        .await
        .unwrap_err();

    assert_eq!(err, ClientError::Submission("insufficient funds".to_string()));
    assert!(!err.is_precondition());
}

// ============================================================================
// RESOLVE / CLAIM / CLOSE
// ============================================================================

#[tokio::test]
async fn test_resolve_market_encodes_winner() {
    let admin = Pubkey::new_unique();
    let client = create_client(Some(admin));
    let market = seed_market(&client, &two_team_market(admin));

    client
        .resolve_market(&ResolveMarketParams {
            market,
            winning_team_index: 1,
        })
        .await
        .unwrap();

    let sent = client.transport().sent();
    let ix = &sent[0];
    assert_eq!(&ix.data[..8], &sighash("resolve_market"));
    assert_eq!(ix.data[8], 1);
    assert_eq!(ix.accounts[0].pubkey, market);
    assert_eq!(ix.accounts[1].pubkey, admin);
}

#[tokio::test]
async fn test_resolve_market_twice_rejected() {
    let admin = Pubkey::new_unique();
    let client = create_client(Some(admin));
    let mut resolved = two_team_market(admin);
    resolved.is_resolved = true;
    resolved.winning_team_index = Some(1);
    let market = seed_market(&client, &resolved);

    let err = client
        .resolve_market(&ResolveMarketParams {
            market,
            winning_team_index: 0,
        })
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::MarketResolved);
}

#[tokio::test]
async fn test_resolve_market_rechecks_cached_market() {
    let admin = Pubkey::new_unique();
    let client = create_client(Some(admin));
    let mut market_account = two_team_market(admin);
    let market = seed_market(&client, &market_account);
    client.market(&market).await.unwrap();

    market_account.is_resolved = true;
    market_account.winning_team_index = Some(1);
    client.transport().insert(market, &market_account);

    let err = client
        .resolve_market(&ResolveMarketParams {
            market,
            winning_team_index: 0,
        })
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::MarketResolved);
    assert!(client.transport().sent().is_empty());
}

#[tokio::test]
async fn test_claim_payout_uses_derived_bet() {
    let user = Pubkey::new_unique();
    let client = create_client(Some(user));
    let market = seed_market(&client, &two_team_market(Pubkey::new_unique()));

    client
        .claim_payout(&ClaimPayoutParams {
            market,
            league_name: "Premier League".to_string(),
            season: "2025".to_string(),
        })
        .await
        .unwrap();

    let sent = client.transport().sent();
    let ix = &sent[0];
    let (bet, _) = bet_address(&client.config().program_id, &user, &market).unwrap();
    assert_eq!(ix.data, sighash("claim_payout").to_vec());
    assert_eq!(ix.accounts[0].pubkey, market);
    assert_eq!(ix.accounts[2].pubkey, bet);
    assert_eq!(ix.accounts[4].pubkey, user);
}

#[tokio::test]
async fn test_claim_payout_rejects_seed_mismatch() {
    let client = create_client(Some(Pubkey::new_unique()));
    let market = seed_market(&client, &two_team_market(Pubkey::new_unique()));

    let err = client
        .claim_payout(&ClaimPayoutParams {
            market,
            league_name: "Serie A".to_string(),
            season: "2025".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidParameter(_)));

    let err = client
        .claim_payout(&ClaimPayoutParams {
            market,
            league_name: String::new(),
            season: "2025".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MissingParameter(_)));
    assert!(client.transport().sent().is_empty());
}

#[tokio::test]
async fn test_close_market_returns_custody_to_admin() {
    let admin = Pubkey::new_unique();
    let client = create_client(Some(admin));
    let market = seed_market(&client, &two_team_market(admin));

    client
        .close_market(&CloseMarketParams {
            market,
            league_name: "Premier League".to_string(),
            season: "2025".to_string(),
        })
        .await
        .unwrap();

    let sent = client.transport().sent();
    let ix = &sent[0];
    assert_eq!(ix.data, sighash("close_market").to_vec());
    assert_eq!(ix.accounts[2].pubkey, vault_address(&client.config().mint, &market));
    assert_eq!(ix.accounts[3].pubkey, token_account(&client.config().mint, &admin));
    assert!(ix.accounts[4].is_signer);
}

#[tokio::test]
async fn test_every_builder_requires_wallet() {
    let client = create_client(None);
    let market = Pubkey::new_unique();
    let seeds = ClaimPayoutParams {
        market,
        league_name: "Premier League".to_string(),
        season: "2025".to_string(),
    };

    let results = vec![
        client
            .place_bet(&PlaceBetParams {
                market,
                team_index: 0,
                amount: 1.0,
            })
            .await,
        client
            .resolve_market(&ResolveMarketParams {
                market,
                winning_team_index: 0,
            })
            .await,
        client.claim_payout(&seeds).await,
        client.close_market(&seeds).await,
    ];

    for result in results {
        assert_eq!(result.unwrap_err(), ClientError::WalletNotConnected);
    }
    assert_eq!(client.transport().read_count(), 0);
}

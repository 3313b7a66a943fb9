use std::collections::HashMap;

use common::fixtures::{agent_config, funded_chain, observed, swap_id, WALLET};
use common::helpers::wait_until;
use hookswap_agent::agent::SwapAgent;
use hookswap_agent::config::{
    AgentConfig, HOOK_ADDRESS_VAR, PRIVATE_KEY_VAR, RPC_URL_VAR, TOKEN0_ADDRESS_VAR,
};
use hookswap_agent::policy::NoBetterPrice;
use hookswap_agent::utils::mock_chain::ChainCall;
use hookswap_agent::AgentError;
use hookswap_primitives::deployments::{LOCAL_HOOK_ADDRESS, LOCAL_TOKEN0_ADDRESS};
use tokio_util::sync::CancellationToken;

pub mod common;

#[tokio::test(start_paused = true)]
/// On startup the agent reports balances once and then only reacts to intents.
async fn reports_balances_once_at_startup() {
    let chain = funded_chain();
    chain.set_head(1);
    let _session = chain.open_session();
    let shutdown = CancellationToken::new();

    let agent = SwapAgent::new(&agent_config(), chain.clone(), NoBetterPrice);
    let handle = tokio::spawn(agent.run(shutdown.clone()));

    wait_until("startup report", || chain.balance_queries() == 4).await;
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    assert_eq!(chain.balance_queries(), 4);
    assert!(chain.calls().contains(&ChainCall::BalanceOf {
        token: LOCAL_TOKEN0_ADDRESS,
        account: WALLET,
    }));
    assert!(chain.calls().contains(&ChainCall::BalanceOf {
        token: LOCAL_TOKEN0_ADDRESS,
        account: LOCAL_HOOK_ADDRESS,
    }));

    shutdown.cancel();
    handle.await.unwrap().unwrap();
    assert!(chain.completions().is_empty());
}

#[tokio::test(start_paused = true)]
/// An intent delivered to a running agent is completed between its two reports.
async fn completes_intents_end_to_end() {
    let chain = funded_chain();
    chain.set_head(1);
    let session = chain.open_session();
    let shutdown = CancellationToken::new();

    let agent = SwapAgent::new(&agent_config(), chain.clone(), NoBetterPrice);
    let handle = tokio::spawn(agent.run(shutdown.clone()));

    wait_until("startup report", || chain.balance_queries() == 4).await;
    session.unbounded_send(Ok(observed(7, 2))).unwrap();

    // startup report plus before and after
    wait_until("after report", || chain.balance_queries() == 12).await;
    shutdown.cancel();
    handle.await.unwrap().unwrap();

    let completions = chain.completions();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].swap_id, swap_id(7));
    assert!(!completions[0].better_price_found);
}

#[tokio::test(start_paused = true)]
/// Missing token addresses only disable reporting, the agent still completes swaps.
async fn runs_without_token_addresses() {
    let chain = funded_chain();
    chain.set_head(1);
    let session = chain.open_session();
    let shutdown = CancellationToken::new();

    let config = AgentConfig {
        token0_address: None,
        token1_address: None,
        ..agent_config()
    };
    let agent = SwapAgent::new(&config, chain.clone(), NoBetterPrice);
    let handle = tokio::spawn(agent.run(shutdown.clone()));

    session.unbounded_send(Ok(observed(1, 2))).unwrap();
    wait_until("completion", || chain.completions().len() == 1).await;
    shutdown.cancel();
    handle.await.unwrap().unwrap();

    assert_eq!(chain.balance_queries(), 0);
}

#[test]
/// Startup without a hook address fails before anything touches the chain.
fn missing_hook_address_fails_startup() {
    let env: HashMap<&str, &str> = HashMap::from([
        (RPC_URL_VAR, "http://127.0.0.1:8545"),
        (
            PRIVATE_KEY_VAR,
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        ),
        (TOKEN0_ADDRESS_VAR, "0xCf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9"),
    ]);

    let result = AgentConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

    match result {
        Err(AgentError::ConfigError(msg)) => assert!(msg.contains(HOOK_ADDRESS_VAR)),
        other => panic!("expected config error, got {other:?}"),
    }
}

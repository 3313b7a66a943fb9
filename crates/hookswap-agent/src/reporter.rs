use std::fmt;

use hookswap_primitives::alloy::primitives::Address;
use hookswap_primitives::balance::BalanceSnapshot;
use hookswap_primitives::units::format_ether;

use crate::config::AgentConfig;
use crate::connection::HookChain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStage {
    Startup,
    Before,
    After,
}

impl fmt::Display for ReportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportStage::Startup => "STARTUP",
            ReportStage::Before => "BEFORE",
            ReportStage::After => "AFTER",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceReport {
    pub stage: ReportStage,
    pub wallet: BalanceSnapshot,
    pub hook: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Reported(BalanceReport),
    /// a token address is not configured, nothing was queried
    Skipped,
    /// a balance query failed
    Incomplete,
}

/// Reads token0/token1 balances of the operating wallet and the hook and logs
/// them in display units. Never fails the caller.
#[derive(Debug, Clone, Copy)]
pub struct BalanceReporter {
    wallet: Address,
    hook: Address,
    token0: Option<Address>,
    token1: Option<Address>,
}

impl BalanceReporter {
    pub fn new(
        wallet: Address,
        hook: Address,
        token0: Option<Address>,
        token1: Option<Address>,
    ) -> Self {
        Self {
            wallet,
            hook,
            token0,
            token1,
        }
    }

    pub fn from_config(config: &AgentConfig, wallet: Address) -> Self {
        Self::new(
            wallet,
            config.hook_address,
            config.token0_address,
            config.token1_address,
        )
    }

    pub async fn report<C>(&self, chain: &C, stage: ReportStage) -> ReportOutcome
    where
        C: HookChain + ?Sized,
    {
        let (Some(token0), Some(token1)) = (self.token0, self.token1) else {
            tracing::warn!(
                %stage,
                "Missing TOKEN0_ADDRESS or TOKEN1_ADDRESS, skipping balance report"
            );
            return ReportOutcome::Skipped;
        };

        let balances = tokio::try_join!(
            chain.balance_of(token0, self.wallet),
            chain.balance_of(token1, self.wallet),
            chain.balance_of(token0, self.hook),
            chain.balance_of(token1, self.hook),
        );

        let (wallet0, wallet1, hook0, hook1) = match balances {
            Ok(balances) => balances,
            Err(e) => {
                tracing::error!(%stage, "Error fetching balances: {}", e);
                return ReportOutcome::Incomplete;
            }
        };

        let report = BalanceReport {
            stage,
            wallet: BalanceSnapshot::new(self.wallet, wallet0, wallet1),
            hook: BalanceSnapshot::new(self.hook, hook0, hook1),
        };

        tracing::info!("{stage}");
        for (label, snapshot) in [("Wallet", &report.wallet), ("Hook", &report.hook)] {
            tracing::info!(
                "{label} Balances ({}): Token0 ({token0}): {}, Token1 ({token1}): {}",
                snapshot.subject,
                format_ether(snapshot.token0_balance),
                format_ether(snapshot.token1_balance),
            );
        }

        ReportOutcome::Reported(report)
    }
}

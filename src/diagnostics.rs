use derive_more::Display;
use log::warn;

/// A fallback step the connector took because a provider call failed. Calls
/// that succeed with nothing fall through silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Fallback {
    #[display(fmt = "eth_requestAccounts was unsuccessful, falling back to enable")]
    RequestAccountsToEnable,
    #[display(fmt = "eth_chainId was unsuccessful, falling back to net_version")]
    ChainIdToNetVersion,
    #[display(fmt = "net_version was unsuccessful, falling back to provider fields")]
    NetVersionToProperties,
    #[display(fmt = "eth_accounts was unsuccessful, falling back to enable")]
    AccountsToEnable,
    #[display(fmt = "enable was unsuccessful")]
    EnableFailed,
}

/// Receives every fallback the connector takes.
pub trait Diagnostics {
    fn fallback(&self, fallback: Fallback);
}

/// Writes fallbacks to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn fallback(&self, fallback: Fallback) {
        warn!("{fallback}");
    }
}

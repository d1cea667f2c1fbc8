//! Network configuration from the environment (and `.env` when present).
//!
//! `POCO_CHAIN_ID` and `POCO_HUB_ADDRESS` are required, the rest default.
use super::domain::{DEFAULT_DOMAIN_NAME, DEFAULT_DOMAIN_VERSION, Domain};
use super::matching::{DEFAULT_WORKERPOOL_STAKE_RATIO, MatchPolicy};
use alloy::primitives::Address;
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Once;

static DOTENV: Once = Once::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketConfig {
    pub chain_id: u64,
    pub hub: Address,
    pub domain_name: String,
    pub domain_version: String,
    pub workerpool_stake_ratio: u64,
    pub store_path: PathBuf,
}

impl MarketConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        DOTENV.call_once(|| {
            let _ = dotenvy::dotenv(); // a missing .env is fine
        });
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let chain_id: u64 = lookup("POCO_CHAIN_ID")
            .context("POCO_CHAIN_ID not set")?
            .parse()
            .context("POCO_CHAIN_ID is not an integer")?;
        let hub: Address = lookup("POCO_HUB_ADDRESS")
            .context("POCO_HUB_ADDRESS not set")?
            .parse()
            .context("POCO_HUB_ADDRESS is not an address")?;
        let workerpool_stake_ratio: u64 = match lookup("POCO_WORKERPOOL_STAKE_RATIO") {
            Some(raw) => raw
                .parse()
                .context("POCO_WORKERPOOL_STAKE_RATIO is not an integer")?,
            None => DEFAULT_WORKERPOOL_STAKE_RATIO,
        };
        anyhow::ensure!(
            workerpool_stake_ratio <= 100,
            "POCO_WORKERPOOL_STAKE_RATIO must be a percentage"
        );

        let config = Self {
            chain_id,
            hub,
            domain_name: lookup("POCO_DOMAIN_NAME").unwrap_or_else(|| DEFAULT_DOMAIN_NAME.into()),
            domain_version: lookup("POCO_DOMAIN_VERSION")
                .unwrap_or_else(|| DEFAULT_DOMAIN_VERSION.into()),
            workerpool_stake_ratio,
            store_path: lookup("POCO_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("poco-snapshots.db")),
        };

        tracing::info!(chain_id = config.chain_id, hub = %config.hub, "loaded market config");
        Ok(config)
    }

    pub fn domain(&self) -> Domain {
        Domain::new(
            self.domain_name.clone(),
            self.domain_version.clone(),
            self.chain_id,
            self.hub,
        )
    }

    pub fn policy(&self) -> MatchPolicy {
        MatchPolicy {
            workerpool_stake_ratio: self.workerpool_stake_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_fill_optional_keys() {
        let config = MarketConfig::from_lookup(lookup(&[
            ("POCO_CHAIN_ID", "134"),
            ("POCO_HUB_ADDRESS", "0x3eca1b216a7df1c7689aeb259ffb83adfb894e7f"),
        ]))
        .unwrap();

        assert_eq!(config.domain(), Domain::bellecour());
        assert_eq!(config.policy(), MatchPolicy::default());
        assert_eq!(config.store_path, PathBuf::from("poco-snapshots.db"));
    }

    #[test]
    fn missing_or_bad_keys_fail() {
        assert!(MarketConfig::from_lookup(lookup(&[("POCO_CHAIN_ID", "134")])).is_err());
        assert!(
            MarketConfig::from_lookup(lookup(&[
                ("POCO_CHAIN_ID", "bellecour"),
                ("POCO_HUB_ADDRESS", "0x3eca1b216a7df1c7689aeb259ffb83adfb894e7f"),
            ]))
            .is_err()
        );
        assert!(
            MarketConfig::from_lookup(lookup(&[
                ("POCO_CHAIN_ID", "134"),
                ("POCO_HUB_ADDRESS", "0x3eca1b216a7df1c7689aeb259ffb83adfb894e7f"),
                ("POCO_WORKERPOOL_STAKE_RATIO", "120"),
            ]))
            .is_err()
        );
    }
}

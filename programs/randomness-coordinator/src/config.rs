//! Coordinator configuration loaded from environment variables.
//!
//! Required: `COORDINATOR_INSTANCE`, `OPERATOR` (base58 identities)
//! Optional: `CHAIN_ID` (default `1`)

use anyhow::{bail, Context, Result};

use crate::state::{ChainId, Identity};

const DEFAULT_CHAIN_ID: ChainId = 1;

/// Identity and authorization settings of one coordinator deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Identity of this coordinator instance, mixed into every derivation.
    pub instance: Identity,
    /// Chain the coordinator is deployed on, mixed into every derivation.
    pub chain_id: ChainId,
    /// The identity allowed to fulfill requests.
    pub operator: Identity,
}

impl CoordinatorConfig {
    pub fn new(instance: Identity, chain_id: ChainId, operator: Identity) -> Self {
        Self {
            instance,
            chain_id,
            operator,
        }
    }

    /// Load `.env` if present, then read the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let instance = required_identity(&lookup, "COORDINATOR_INSTANCE")?;
        let operator = required_identity(&lookup, "OPERATOR")?;

        let chain_id = match lookup("CHAIN_ID") {
            Some(value) => value
                .trim()
                .parse::<ChainId>()
                .with_context(|| format!("invalid CHAIN_ID: {value}"))?,
            None => DEFAULT_CHAIN_ID,
        };

        Ok(Self {
            instance,
            chain_id,
            operator,
        })
    }
}

fn required_identity(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Identity> {
    let value = lookup(key).with_context(|| format!("{key} env var must be set"))?;
    let identity = value
        .trim()
        .parse::<Identity>()
        .with_context(|| format!("invalid {key}: {value}"))?;
    if identity.is_zero() {
        bail!("{key} must not be the zero identity");
    }
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn id(byte: u8) -> Identity {
        Identity::new([byte; 32])
    }

    #[test]
    fn reads_all_fields() {
        let config = CoordinatorConfig::from_lookup(lookup(&[
            ("COORDINATOR_INSTANCE", id(1).to_string()),
            ("OPERATOR", id(2).to_string()),
            ("CHAIN_ID", "137".into()),
        ]))
        .unwrap();

        assert_eq!(config, CoordinatorConfig::new(id(1), 137, id(2)));
    }

    #[test]
    fn chain_id_defaults_to_one() {
        let config = CoordinatorConfig::from_lookup(lookup(&[
            ("COORDINATOR_INSTANCE", id(1).to_string()),
            ("OPERATOR", id(2).to_string()),
        ]))
        .unwrap();

        assert_eq!(config.chain_id, 1);
    }

    #[test]
    fn missing_operator_is_an_error() {
        let err = CoordinatorConfig::from_lookup(lookup(&[(
            "COORDINATOR_INSTANCE",
            id(1).to_string(),
        )]))
        .unwrap_err();

        assert!(err.to_string().contains("OPERATOR"));
    }

    #[test]
    fn zero_operator_is_rejected() {
        let err = CoordinatorConfig::from_lookup(lookup(&[
            ("COORDINATOR_INSTANCE", id(1).to_string()),
            ("OPERATOR", Identity::default().to_string()),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("zero identity"));
    }

    #[test]
    fn bad_chain_id_is_an_error() {
        let err = CoordinatorConfig::from_lookup(lookup(&[
            ("COORDINATOR_INSTANCE", id(1).to_string()),
            ("OPERATOR", id(2).to_string()),
            ("CHAIN_ID", "mainnet".into()),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("invalid CHAIN_ID"));
    }
}

use crate::interface::{GatewayError, GatewayProviderKind};
use crate::providers::in_memory::{InMemoryGateway, InMemorySeed};

const SUPPORTED_PROVIDER_KEYS: [&str; 1] = [GatewayProviderKind::InMemory.as_key()];

pub fn supported_provider_keys() -> &'static [&'static str] {
    &SUPPORTED_PROVIDER_KEYS
}

pub fn resolve_provider_kind(provider_key: &str) -> Result<GatewayProviderKind, GatewayError> {
    GatewayProviderKind::from_key(provider_key)
        .ok_or_else(|| GatewayError::UnknownProviderKey(provider_key.to_owned()))
}

pub fn build_provider(
    provider_key: &str,
    seed_demo_data: bool,
) -> Result<InMemoryGateway, GatewayError> {
    match resolve_provider_kind(provider_key)? {
        GatewayProviderKind::InMemory => {
            let seed = if seed_demo_data {
                InMemorySeed::demo()
            } else {
                InMemorySeed::default()
            };
            Ok(InMemoryGateway::new(seed))
        }
    }
}

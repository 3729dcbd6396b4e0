pub mod factory;
pub mod interface;
pub mod providers;

pub use factory::{build_provider, resolve_provider_kind, supported_provider_keys};
pub use interface::{BackendGateway, GatewayError, GatewayProviderKind, GatewayResult};
pub use providers::in_memory::{InMemoryGateway, InMemorySeed};

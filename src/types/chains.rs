//! Network and registry identifiers understood by the Curve API

pub const BLOCKCHAIN_IDS: &[&str] = &[
    "ethereum",
    "arbitrum",
    "aurora",
    "avalanche",
    "base",
    "bsc",
    "celo",
    "fantom",
    "fraxtal",
    "harmony",
    "hyperliquid",
    "kava",
    "mantle",
    "moonbeam",
    "optimism",
    "polygon",
    "sonic",
    "x-layer",
    "xdai",
    "zkevm",
    "zksync",
];

// Chains with Curve Lend (LlamaLend) deployments
pub const LENDING_SUPPORTED_CHAINS: &[&str] = &[
    "ethereum",
    "arbitrum",
    "optimism",
    "fraxtal",
    "sonic",
];

pub const REGISTRY_IDS: &[&str] = &[
    "main",
    "factory",
    "crypto",
    "factory-crypto",
    "factory-crvusd",
    "factory-twocrypto",
    "factory-tricrypto",
    "factory-eywa",
    "factory-stable-ng",
];

pub const DEFAULT_REGISTRY: &str = "main";

pub fn is_known_chain(chain: &str) -> bool {
    BLOCKCHAIN_IDS.contains(&chain)
}

pub fn supports_lending(chain: &str) -> bool {
    LENDING_SUPPORTED_CHAINS.contains(&chain)
}

pub fn is_known_registry(registry: &str) -> bool {
    REGISTRY_IDS.contains(&registry)
}

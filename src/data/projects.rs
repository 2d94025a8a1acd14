//! Bundled implementation projects.

use crate::models::{Project, ProjectStatus};

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    website: &'static str,
    github: Option<&'static str>,
    eip_numbers: &'static [u32],
    implementation_details: &'static str,
    status: ProjectStatus,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "metamask",
        name: "MetaMask",
        description: "Browser extension and mobile wallet for Ethereum.",
        website: "https://metamask.io",
        github: Some("https://github.com/MetaMask/metamask-extension"),
        eip_numbers: &[1559, 721, 20],
        implementation_details: "Type-2 transactions with base fee and priority fee estimation; \
                                 token and collectible display.",
        status: ProjectStatus::Active,
    },
    Seed {
        id: "openzeppelin-contracts",
        name: "OpenZeppelin Contracts",
        description: "Library of audited smart contract building blocks.",
        website: "https://openzeppelin.com/contracts",
        github: Some("https://github.com/OpenZeppelin/openzeppelin-contracts"),
        eip_numbers: &[20, 721],
        implementation_details: "Reference ERC20 and ERC721 implementations with extensions.",
        status: ProjectStatus::Active,
    },
    Seed {
        id: "opensea",
        name: "OpenSea",
        description: "Marketplace for non-fungible tokens.",
        website: "https://opensea.io",
        github: None,
        eip_numbers: &[721],
        implementation_details: "Indexes and trades ERC721 collections.",
        status: ProjectStatus::Active,
    },
    Seed {
        id: "safe",
        name: "Safe",
        description: "Multi-signature smart account infrastructure.",
        website: "https://safe.global",
        github: Some("https://github.com/safe-global/safe-smart-account"),
        eip_numbers: &[4337],
        implementation_details: "Safe4337Module lets Safe accounts validate UserOperations \
                                 through the EntryPoint.",
        status: ProjectStatus::Active,
    },
    Seed {
        id: "alchemy-account-kit",
        name: "Alchemy Account Kit",
        description: "Toolkit for embedded smart accounts with gas sponsorship.",
        website: "https://www.alchemy.com/account-kit",
        github: Some("https://github.com/alchemyplatform/aa-sdk"),
        eip_numbers: &[4337, 7702],
        implementation_details: "Bundler, paymaster and modular account SDK; experimental \
                                 EOA delegation.",
        status: ProjectStatus::Beta,
    },
    Seed {
        id: "optimism",
        name: "Optimism",
        description: "Optimistic rollup scaling Ethereum.",
        website: "https://optimism.io",
        github: Some("https://github.com/ethereum-optimism/optimism"),
        eip_numbers: &[4844, 1559],
        implementation_details: "Batcher posts L2 data as blobs; L2 uses an EIP-1559 style fee \
                                 market.",
        status: ProjectStatus::Active,
    },
    Seed {
        id: "geth",
        name: "Go Ethereum",
        description: "Execution client written in Go.",
        website: "https://geth.ethereum.org",
        github: Some("https://github.com/ethereum/go-ethereum"),
        eip_numbers: &[1559, 4844, 7702],
        implementation_details: "Consensus-critical implementation of the fee market, blob \
                                 transactions and set-code transactions.",
        status: ProjectStatus::Active,
    },
    Seed {
        id: "louper",
        name: "Louper",
        description: "Inspector for diamond proxy contracts.",
        website: "https://louper.dev",
        github: Some("https://github.com/mark3labs/louper-v2"),
        eip_numbers: &[2535],
        implementation_details: "Reads facets and selectors through the DiamondLoupe interface.",
        status: ProjectStatus::Deprecated,
    },
];

/// The static project dataset served whenever no live source is available.
pub fn fallback_projects() -> Vec<Project> {
    SEEDS
        .iter()
        .map(|seed| Project {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            website: seed.website.to_string(),
            github: seed.github.map(str::to_string),
            logo: None,
            eip_numbers: seed.eip_numbers.to_vec(),
            implementation_details: seed.implementation_details.to_string(),
            status: seed.status,
        })
        .collect()
}

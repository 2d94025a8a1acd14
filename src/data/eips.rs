//! Bundled proposal catalog.

use chrono::{DateTime, Utc};

use crate::models::{Eip, EipCategory, EipStatus, EipType};

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .expect("bundled catalog contains an invalid date")
}

fn authors(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// The static proposal dataset served whenever no live source is available.
pub fn fallback_eips() -> Vec<Eip> {
    vec![
        Eip {
            number: 1,
            title: "EIP Purpose and Guidelines".to_string(),
            author: authors(&["Martin Becze", "Hudson Jameson"]),
            status: EipStatus::Living,
            eip_type: EipType::Meta,
            category: None,
            created: date(2015, 10, 27),
            updated: Some(date(2023, 11, 1)),
            description: "What an EIP is, the EIP workflow and the roles of editors.".to_string(),
            content: "## What is an EIP?\n\nEIP stands for Ethereum Improvement Proposal. \
                      An EIP is a design document providing information to the Ethereum \
                      community, or describing a new feature for Ethereum or its processes."
                .to_string(),
            discussions: None,
            requires: None,
            replaces: None,
            superseded_by: None,
        },
        Eip {
            number: 20,
            title: "Token Standard".to_string(),
            author: authors(&["Fabian Vogelsteller", "Vitalik Buterin"]),
            status: EipStatus::Final,
            eip_type: EipType::StandardsTrack,
            category: Some(EipCategory::ERC),
            created: date(2015, 11, 19),
            updated: None,
            description: "A standard interface for fungible tokens.".to_string(),
            content: "## Abstract\n\nThe following standard allows for the implementation \
                      of a standard API for tokens within smart contracts: transfer, \
                      approve and allowance."
                .to_string(),
            discussions: Some("https://github.com/ethereum/EIPs/issues/20".to_string()),
            requires: None,
            replaces: None,
            superseded_by: None,
        },
        Eip {
            number: 721,
            title: "Non-Fungible Token Standard".to_string(),
            author: authors(&["William Entriken", "Dieter Shirley", "Jacob Evans", "Nastassia Sachs"]),
            status: EipStatus::Final,
            eip_type: EipType::StandardsTrack,
            category: Some(EipCategory::ERC),
            created: date(2018, 1, 24),
            updated: None,
            description: "A standard interface for non-fungible tokens, also known as deeds."
                .to_string(),
            content: "## Abstract\n\nA standard interface allowing smart contracts to track, \
                      transfer and manage ownership of unique assets."
                .to_string(),
            discussions: Some("https://github.com/ethereum/eips/issues/721".to_string()),
            requires: Some(vec![165]),
            replaces: None,
            superseded_by: None,
        },
        Eip {
            number: 1559,
            title: "Fee market change for ETH 1.0 chain".to_string(),
            author: authors(&["Vitalik Buterin", "Eric Conner", "Rick Dudley", "Matthew Slipper", "Ian Norden", "Abdelhamid Bakhta"]),
            status: EipStatus::Final,
            eip_type: EipType::StandardsTrack,
            category: Some(EipCategory::Core),
            created: date(2019, 4, 13),
            updated: Some(date(2021, 8, 5)),
            description: "A transaction pricing mechanism with a fixed-per-block network fee \
                          that is burned and a dynamically expanding block size."
                .to_string(),
            content: "## Abstract\n\nWe introduce a new transaction pricing mechanism that \
                      includes a fixed-per-block network fee that is burned and dynamically \
                      expands and contracts block sizes to deal with transient congestion."
                .to_string(),
            discussions: Some("https://ethereum-magicians.org/t/eip-1559-fee-market-change-for-eth-1-0-chain/2783".to_string()),
            requires: Some(vec![2718, 2930]),
            replaces: None,
            superseded_by: None,
        },
        Eip {
            number: 2535,
            title: "Diamonds, Multi-Facet Proxy".to_string(),
            author: authors(&["Nick Mudge"]),
            status: EipStatus::Final,
            eip_type: EipType::StandardsTrack,
            category: Some(EipCategory::ERC),
            created: date(2020, 2, 22),
            updated: Some(date(2022, 9, 15)),
            description: "Create modular smart contract systems that can be extended after \
                          deployment."
                .to_string(),
            content: "## Abstract\n\nA diamond is a contract with external functions that are \
                      supplied by contracts called facets."
                .to_string(),
            discussions: Some("https://github.com/ethereum/EIPs/issues/2535".to_string()),
            requires: Some(vec![165]),
            replaces: None,
            superseded_by: None,
        },
        Eip {
            number: 4337,
            title: "Account Abstraction Using Alt Mempool".to_string(),
            author: authors(&["Vitalik Buterin", "Yoav Weiss", "Dror Tirosh", "Shahaf Nacson", "Alex Forshtat"]),
            status: EipStatus::Draft,
            eip_type: EipType::StandardsTrack,
            category: Some(EipCategory::ERC),
            created: date(2021, 9, 29),
            updated: Some(date(2024, 3, 12)),
            description: "An account abstraction proposal which completely avoids consensus-layer \
                          protocol changes, instead relying on higher-layer infrastructure."
                .to_string(),
            content: "## Abstract\n\nUsers send UserOperation objects into a separate mempool. \
                      Bundlers package these into a transaction to a special EntryPoint contract."
                .to_string(),
            discussions: Some("https://ethereum-magicians.org/t/erc-4337-account-abstraction-via-entry-point-contract-specification/7160".to_string()),
            requires: Some(vec![7562]),
            replaces: None,
            superseded_by: None,
        },
        Eip {
            number: 4844,
            title: "Shard Blob Transactions".to_string(),
            author: authors(&["Vitalik Buterin", "Dankrad Feist", "Diederik Loerakker", "George Kadianakis", "Matt Garnett", "Mofi Taiwo", "Ansgar Dietrichs"]),
            status: EipStatus::Final,
            eip_type: EipType::StandardsTrack,
            category: Some(EipCategory::Core),
            created: date(2022, 2, 25),
            updated: Some(date(2024, 3, 13)),
            description: "Shard blob transactions scale data availability of Ethereum in a simple, \
                          forwards-compatible manner."
                .to_string(),
            content: "## Abstract\n\nIntroduce a new transaction format for blob-carrying \
                      transactions which contain a large amount of data that cannot be accessed \
                      by EVM execution, but whose commitment can be accessed."
                .to_string(),
            discussions: Some("https://ethereum-magicians.org/t/eip-4844-shard-blob-transactions/8430".to_string()),
            requires: Some(vec![1559, 2718, 2930, 4895]),
            replaces: None,
            superseded_by: None,
        },
        Eip {
            number: 7702,
            title: "Set Code for EOAs".to_string(),
            author: authors(&["Vitalik Buterin", "Sam Wilson", "Ansgar Dietrichs", "Matt Garnett"]),
            status: EipStatus::Review,
            eip_type: EipType::StandardsTrack,
            category: Some(EipCategory::Core),
            created: date(2024, 5, 7),
            updated: Some(date(2024, 10, 1)),
            description: "Add a new transaction type that adds a list of authorizations to set \
                          code for externally owned accounts."
                .to_string(),
            content: "## Abstract\n\nAdd a new EIP-2718 transaction type that allows EOAs to set \
                      the code in their account through a signed authorization tuple."
                .to_string(),
            discussions: Some("https://ethereum-magicians.org/t/eip-set-eoa-account-code-for-one-transaction/19923".to_string()),
            requires: Some(vec![2, 161, 1052, 2718, 2929, 2930, 3541, 3607, 4337]),
            replaces: None,
            superseded_by: None,
        },
    ]
}

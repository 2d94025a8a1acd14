//! Proposal model matching the frontend EIP interface.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle status of a proposal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EipStatus {
    Draft,
    Review,
    #[serde(rename = "Last Call")]
    LastCall,
    Final,
    Stagnant,
    Withdrawn,
    Living,
}

impl EipStatus {
    pub const ALL: [EipStatus; 7] = [
        EipStatus::Draft,
        EipStatus::Review,
        EipStatus::LastCall,
        EipStatus::Final,
        EipStatus::Stagnant,
        EipStatus::Withdrawn,
        EipStatus::Living,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EipStatus::Draft => "Draft",
            EipStatus::Review => "Review",
            EipStatus::LastCall => "Last Call",
            EipStatus::Final => "Final",
            EipStatus::Stagnant => "Stagnant",
            EipStatus::Withdrawn => "Withdrawn",
            EipStatus::Living => "Living",
        }
    }

    /// Parse a status label, ignoring case, spaces and dashes ("last-call", "LastCall").
    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| normalize_label(status.as_str()) == normalize_label(s))
    }
}

impl fmt::Display for EipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proposal type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EipType {
    #[serde(rename = "Standards Track")]
    StandardsTrack,
    Meta,
    Informational,
}

impl EipType {
    pub const ALL: [EipType; 3] = [EipType::StandardsTrack, EipType::Meta, EipType::Informational];

    pub fn as_str(&self) -> &'static str {
        match self {
            EipType::StandardsTrack => "Standards Track",
            EipType::Meta => "Meta",
            EipType::Informational => "Informational",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| normalize_label(t.as_str()) == normalize_label(s))
    }
}

impl fmt::Display for EipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standards Track category.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EipCategory {
    Core,
    Networking,
    Interface,
    ERC,
}

impl EipCategory {
    pub const ALL: [EipCategory; 4] = [
        EipCategory::Core,
        EipCategory::Networking,
        EipCategory::Interface,
        EipCategory::ERC,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EipCategory::Core => "Core",
            EipCategory::Networking => "Networking",
            EipCategory::Interface => "Interface",
            EipCategory::ERC => "ERC",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| normalize_label(c.as_str()) == normalize_label(s))
    }
}

impl fmt::Display for EipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proposal dates arrive either as plain `YYYY-MM-DD` dates or as RFC 3339
/// timestamps. Plain dates are read as midnight UTC.
mod calendar {
    use super::*;
    use serde::de::Error;

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc())
            })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
    }

    pub fn deserialize_optional<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date: {raw}"))),
            None => Ok(None),
        }
    }
}

fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// An Ethereum Improvement Proposal.
///
/// `requires`, `replaces` and `superseded_by` are weak references to other
/// proposal numbers; they may point at proposals missing from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Eip {
    pub number: u32,
    pub title: String,
    pub author: Vec<String>,
    pub status: EipStatus,
    #[serde(rename = "type")]
    pub eip_type: EipType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EipCategory>,
    #[serde(deserialize_with = "calendar::deserialize")]
    pub created: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "calendar::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated: Option<DateTime<Utc>>,
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discussions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<Vec<u32>>,
}

impl super::Keyed for Eip {
    type Key = u32;

    fn key(&self) -> &u32 {
        &self.number
    }
}

impl Eip {
    /// Last modification date; falls back to `created`.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.updated.unwrap_or(self.created)
    }

    /// All proposal numbers this one refers to, in declaration order.
    pub fn referenced_numbers(&self) -> Vec<u32> {
        let mut numbers = Vec::new();
        for list in [&self.requires, &self.replaces, &self.superseded_by]
            .into_iter()
            .flatten()
        {
            for n in list {
                if *n != self.number && !numbers.contains(n) {
                    numbers.push(*n);
                }
            }
        }
        numbers
    }
}

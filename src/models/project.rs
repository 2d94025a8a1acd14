//! Project model matching the frontend Project interface.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maintenance status of an implementation project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Beta,
    Deprecated,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Beta => "beta",
            ProjectStatus::Deprecated => "deprecated",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Some(ProjectStatus::Active),
            "beta" => Some(ProjectStatus::Beta),
            "deprecated" => Some(ProjectStatus::Deprecated),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A third-party project implementing one or more proposals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub eip_numbers: Vec<u32>,
    pub implementation_details: String,
    pub status: ProjectStatus,
}

impl super::Keyed for Project {
    type Key = str;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Project {
    pub fn implements(&self, number: u32) -> bool {
        self.eip_numbers.contains(&number)
    }
}

use crate::models::{Project, ProjectStatus};
use crate::stats::{compute_project_stats, ProjectStats};

use super::dataset::{CacheStatus, DatasetService};

/// The catalog of projects implementing proposals.
pub struct ProjectService {
    dataset: DatasetService<Project>,
}

impl ProjectService {
    pub fn new(dataset: DatasetService<Project>) -> Self {
        Self { dataset }
    }

    pub async fn get_project(&self, id: &str) -> Option<Project> {
        self.dataset.get_by_key(id).await
    }

    /// Text search narrowed to one status when given.
    pub async fn list(&self, text: Option<&str>, status: Option<ProjectStatus>) -> Vec<Project> {
        let mut projects = self.dataset.search(text.unwrap_or_default(), None).await;
        if let Some(status) = status {
            projects.retain(|p| p.status == status);
        }
        projects
    }

    /// Projects implementing proposal `number`, in catalog order.
    pub async fn for_eip(&self, number: u32) -> Vec<Project> {
        self.dataset
            .get_all()
            .await
            .iter()
            .filter(|p| p.implements(number))
            .cloned()
            .collect()
    }

    pub async fn stats(&self) -> ProjectStats {
        compute_project_stats(&self.dataset.get_all().await)
    }

    pub async fn invalidate(&self) {
        self.dataset.invalidate().await;
    }

    pub async fn cache_status(&self) -> CacheStatus {
        self.dataset.cache_status().await
    }
}

use serde::Serialize;
use std::time::Duration;

use somewhere_core::{CommittedSpot, SpotBackend, SpotError};

/// Committed spots in insertion order. Only ever appended to.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SpotCollection {
    spots: Vec<CommittedSpot>,
}

impl SpotCollection {
    pub fn from_spots(spots: Vec<CommittedSpot>) -> Self {
        Self { spots }
    }

    /// Fetch the initial collection. A failed or timed-out fetch is logged and
    /// yields an empty collection so drafting still works.
    pub async fn load(backend: &dyn SpotBackend, timeout: Duration) -> Self {
        let result = match tokio::time::timeout(timeout, backend.list_spots()).await {
            Ok(result) => result,
            Err(_) => Err(SpotError::Fetch(format!(
                "spot list request timed out after {:?}",
                timeout
            ))),
        };

        match result {
            Ok(spots) => {
                tracing::info!(count = spots.len(), "Loaded spots");
                Self::from_spots(spots)
            }
            Err(e) => {
                e.log("Failed to load spots, starting with an empty collection");
                Self::default()
            }
        }
    }

    pub(crate) fn push(&mut self, spot: CommittedSpot) {
        self.spots.push(spot);
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommittedSpot> {
        self.spots.iter()
    }
}

impl<'a> IntoIterator for &'a SpotCollection {
    type Item = &'a CommittedSpot;
    type IntoIter = std::slice::Iter<'a, CommittedSpot>;

    fn into_iter(self) -> Self::IntoIter {
        self.spots.iter()
    }
}

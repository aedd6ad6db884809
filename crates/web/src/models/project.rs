//! Project domain types and ordering.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crowdfund_core::{ProjectId, UserId};

use super::user::Donation;

/// A crowdfunding project (read-only in this crate).
#[derive(Debug, Clone)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    /// The user who created the project.
    pub creator: UserId,
    /// Creation timestamp.
    pub date: DateTime<Utc>,
    pub pledge_goal: Decimal,
    pub collected: Decimal,
    /// Donations received, oldest first.
    pub donations: Vec<Donation>,
}

impl Project {
    /// Number of donation records, shown as the donor count.
    #[must_use]
    pub fn donor_count(&self) -> usize {
        self.donations.len()
    }
}

/// Sort projects newest first.
///
/// The sort is stable: projects created at the same instant keep their
/// relative order.
pub fn sort_by_creation_date(projects: &mut [Project]) {
    projects.sort_by(|a, b| b.date.cmp(&a.date));
}

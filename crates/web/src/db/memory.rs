//! In-memory stores for route and service tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crowdfund_core::{Email, ProjectId, UserId};

use super::{ProjectStore, RepositoryError, UserStore};
use crate::models::{Donation, NewUser, Project, User};

fn unavailable() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

/// User store kept in a `Vec`, ids assigned sequentially from 1.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
    broken: AtomicBool,
}

impl MemoryUserStore {
    /// Make every subsequent call fail with a database error.
    pub fn break_store(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// Append a donation to a user's history.
    pub fn push_donation(&self, user_id: UserId, donation: Donation) {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| u.id == user_id).unwrap();
        user.donated.push(donation);
    }

    /// Snapshot of every stored user.
    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| &u.email == email).cloned())
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let id = UserId::new(i32::try_from(users.len()).unwrap() + 1);
        let created = User {
            id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            city: user.city,
            state: user.state,
            donated: Vec::new(),
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check()
    }
}

/// Project store kept in a `Vec` in insertion order.
#[derive(Default)]
pub struct MemoryProjectStore {
    projects: Mutex<Vec<Project>>,
    broken: AtomicBool,
}

impl MemoryProjectStore {
    /// Make every subsequent call fail with a database error.
    pub fn break_store(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// Add a project.
    pub fn insert(&self, project: Project) {
        self.projects.lock().unwrap().push(project);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn get_by_id(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        self.check()?;
        let projects = self.projects.lock().unwrap();
        Ok(projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_by_creator(&self, creator: UserId) -> Result<Vec<Project>, RepositoryError> {
        self.check()?;
        let projects = self.projects.lock().unwrap();
        Ok(projects
            .iter()
            .filter(|p| p.creator == creator)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Project>, RepositoryError> {
        self.check()?;
        Ok(self.projects.lock().unwrap().clone())
    }
}

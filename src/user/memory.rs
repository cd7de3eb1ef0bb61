//! In-memory storage, used by tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{Result, ServerError};
use crate::user::{DateRange, Page, PageRequest, User, UserRepository};

#[derive(Debug, Default)]
struct Store {
    sequence: i64,
    users: BTreeMap<i64, User>,
}

/// [`UserRepository`] keeping users in a map.
///
/// Enforces the same email and phone uniqueness as the database schema.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self, page: &PageRequest, range: &DateRange) -> Result<Page<User>> {
        let store = self.store.read().await;

        let matching = store
            .users
            .values()
            .filter(|u| range.contains(u.birth_date))
            .collect::<Vec<_>>();
        let total = matching.len() as u64;

        let content = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.size() as usize)
            .cloned()
            .collect();

        Ok(Page::new(content, *page, total))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self
            .store
            .read()
            .await
            .users
            .values()
            .any(|u| u.email == email))
    }

    async fn save(&self, mut user: User) -> Result<User> {
        let mut store = self.store.write().await;

        let conflict = store.users.values().filter(|u| u.id != user.id);
        for other in conflict {
            if other.email == user.email {
                return Err(ServerError::AlreadyExists(
                    "User with this email already registered".into(),
                ));
            }
            if user.phone.is_some() && other.phone == user.phone {
                return Err(ServerError::AlreadyExists(
                    "User with this phone already registered".into(),
                ));
            }
        }

        let now = Utc::now();
        match user.id {
            Some(id) => {
                let existing = store.users.get(&id).ok_or(ServerError::NotFound(id))?;
                user.created_at = existing.created_at;
            }
            None => {
                store.sequence += 1;
                user.id = Some(store.sequence);
                user.created_at = Some(now);
            }
        }
        user.updated_at = Some(now);

        if let Some(id) = user.id {
            store.users.insert(id, user.clone());
        }

        Ok(user)
    }

    async fn delete(&self, user: &User) -> Result<()> {
        if let Some(id) = user.id {
            self.store.write().await.users.remove(&id);
        }

        Ok(())
    }
}

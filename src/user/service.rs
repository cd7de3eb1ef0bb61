use std::sync::Arc;

use axum::extract::FromRef;
use chrono::{NaiveDate, Utc};

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::user::{Address, DateRange, Page, PageRequest, User, UserRepository};

/// User manager.
///
/// Checks business rules, then hands the resulting record to the
/// repository in a single write.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    min_age: u32,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(repo: Arc<dyn UserRepository>, min_age: u32) -> Self {
        Self { repo, min_age }
    }

    /// Minimum age, in whole years, required to register.
    pub fn min_age(&self) -> u32 {
        self.min_age
    }

    /// Register a new user.
    pub async fn save(&self, user: User) -> Result<User> {
        self.assert_age_is_legal(user.birth_date)?;
        self.assert_email_not_taken(&user.email).await?;

        let user = self.repo.save(user).await?;
        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// List users, optionally restricted to a birth date range.
    pub async fn get_all(&self, page: PageRequest, range: DateRange) -> Result<Page<User>> {
        self.repo.find_all(&page, &range).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ServerError::NotFound(id))
    }

    /// Overwrite names, address and phone.
    ///
    /// Birth date and email are only checked, and written, when they differ
    /// from the stored values.
    pub async fn update_by_id(&self, id: i64, patch: User) -> Result<User> {
        let mut user = self.get_by_id(id).await?;
        user.first_name = patch.first_name;
        user.last_name = patch.last_name;
        user.address = patch.address;
        user.phone = patch.phone;

        if user.birth_date != patch.birth_date {
            self.assert_age_is_legal(patch.birth_date)?;
            user.birth_date = patch.birth_date;
        }

        if user.email != patch.email {
            self.assert_email_not_taken(&patch.email).await?;
            user.email = patch.email;
        }

        self.repo.save(user).await
    }

    pub async fn update_email(&self, id: i64, email: String) -> Result<User> {
        self.assert_email_not_taken(&email).await?;

        let mut user = self.get_by_id(id).await?;
        user.email = email;
        self.repo.save(user).await
    }

    pub async fn update_address(&self, id: i64, address: Address) -> Result<User> {
        let mut user = self.get_by_id(id).await?;
        user.address = Some(address);
        self.repo.save(user).await
    }

    pub async fn delete_users_address(&self, id: i64) -> Result<()> {
        let mut user = self.get_by_id(id).await?;
        user.address = None;
        self.repo.save(user).await?;
        Ok(())
    }

    pub async fn update_phone(&self, id: i64, phone: String) -> Result<User> {
        let mut user = self.get_by_id(id).await?;
        user.phone = Some(phone);
        self.repo.save(user).await
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<()> {
        let user = self.get_by_id(id).await?;
        self.repo.delete(&user).await?;

        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }

    async fn assert_email_not_taken(&self, email: &str) -> Result<()> {
        if self.repo.exists_by_email(email).await? {
            return Err(ServerError::AlreadyExists(
                "User with this email already registered".into(),
            ));
        }

        Ok(())
    }

    fn assert_age_is_legal(&self, birth_date: NaiveDate) -> Result<()> {
        if age(birth_date, Utc::now().date_naive()) < self.min_age {
            return Err(ServerError::AgeValidation {
                min_age: self.min_age,
            });
        }

        Ok(())
    }
}

/// Whole years elapsed between `birth_date` and `today`.
fn age(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(birth_date).unwrap_or_default()
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> UserService {
        state.users.clone()
    }
}

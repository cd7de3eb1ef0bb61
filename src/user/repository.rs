//! Handle database requests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres, QueryBuilder, Transaction};

use crate::error::{Result, ServerError};
use crate::user::{Address, DateRange, Page, PageRequest, User};

/// Storage of [`User`] records.
///
/// Every mutating call is a single unit of work: it either commits
/// completely or leaves the store untouched.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find one page of users, restricted to birth dates within `range`.
    async fn find_all(&self, page: &PageRequest, range: &DateRange) -> Result<Page<User>>;

    /// Find a user with its address.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Check whether a user already owns this email.
    async fn exists_by_email(&self, email: &str) -> Result<bool>;

    /// Insert a new user (no `id`) or overwrite an existing one.
    async fn save(&self, user: User) -> Result<User>;

    /// Delete user and owned address.
    async fn delete(&self, user: &User) -> Result<()>;
}

const SELECT_USERS: &str = r#"SELECT
        u.id,
        u.email,
        u.first_name,
        u.last_name,
        u.birth_date,
        u.phone,
        u.created_at,
        u.updated_at,
        a.street,
        a.city,
        a.country,
        a.number
    FROM users u
    LEFT JOIN addresses a ON a.user_id = u.id"#;

const EMAIL_CONSTRAINT: &str = "users_email_key";
const PHONE_CONSTRAINT: &str = "users_phone_key";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    first_name: String,
    last_name: String,
    birth_date: NaiveDate,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    street: Option<String>,
    city: Option<String>,
    country: Option<String>,
    number: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let address = match (row.street, row.city, row.country, row.number) {
            (Some(street), Some(city), Some(country), Some(number)) => Some(Address {
                street,
                city,
                country,
                number,
            }),
            _ => None,
        };

        Self {
            id: Some(row.id),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            birth_date: row.birth_date,
            address,
            phone: row.phone,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// PostgreSQL backed [`UserRepository`].
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: Pool<Postgres>,
}

impl PostgresUserRepository {
    /// Create a new [`PostgresUserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn insert(&self, tx: &mut Transaction<'static, Postgres>, user: &mut User) -> Result<()> {
        let (id, created_at, updated_at): (i64, DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(
            r#"INSERT INTO users (email, first_name, last_name, birth_date, phone)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, created_at, updated_at"#,
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.birth_date)
        .bind(&user.phone)
        .fetch_one(&mut **tx)
        .await
        .map_err(unique_violation)?;

        user.id = Some(id);
        user.created_at = Some(created_at);
        user.updated_at = Some(updated_at);
        Ok(())
    }

    async fn update(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        id: i64,
        user: &mut User,
    ) -> Result<()> {
        let (created_at, updated_at): (DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(
            r#"UPDATE users
                SET email = $1, first_name = $2, last_name = $3, birth_date = $4, phone = $5, updated_at = NOW()
                WHERE id = $6
                RETURNING created_at, updated_at"#,
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.birth_date)
        .bind(&user.phone)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(unique_violation)?
        .ok_or(ServerError::NotFound(id))?;

        user.created_at = Some(created_at);
        user.updated_at = Some(updated_at);
        Ok(())
    }

    async fn write_address(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        id: i64,
        address: Option<&Address>,
    ) -> Result<()> {
        match address {
            Some(address) => {
                sqlx::query(
                    r#"INSERT INTO addresses (user_id, street, city, country, number)
                        VALUES ($1, $2, $3, $4, $5)
                        ON CONFLICT (user_id) DO UPDATE
                        SET street = EXCLUDED.street, city = EXCLUDED.city,
                            country = EXCLUDED.country, number = EXCLUDED.number"#,
                )
                .bind(id)
                .bind(&address.street)
                .bind(&address.city)
                .bind(&address.country)
                .bind(&address.number)
                .execute(&mut **tx)
                .await?;
            }
            None => {
                sqlx::query(r#"DELETE FROM addresses WHERE user_id = $1"#)
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_all(&self, page: &PageRequest, range: &DateRange) -> Result<Page<User>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users u");
        push_range(&mut count, range);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(SELECT_USERS);
        push_range(&mut query, range);
        query
            .push(" ORDER BY u.id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let users = query
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::from)
            .collect();

        Ok(Page::new(users, *page, u64::try_from(total).unwrap_or_default()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let query = format!("{SELECT_USERS} WHERE u.id = $1");

        let user = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user.map(User::from))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)"#)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn save(&self, mut user: User) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let id = match user.id {
            Some(id) => {
                self.update(&mut tx, id, &mut user).await?;
                id
            }
            None => {
                self.insert(&mut tx, &mut user).await?;
                user.id.ok_or_else(|| ServerError::Internal {
                    details: "insert returned no identifier".into(),
                })?
            }
        };
        self.write_address(&mut tx, id, user.address.as_ref()).await?;

        tx.commit().await?;

        tracing::debug!(user_id = id, "user saved");
        Ok(user)
    }

    async fn delete(&self, user: &User) -> Result<()> {
        let Some(id) = user.id else {
            return Ok(());
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }
}

/// Translate the birth date filter into SQL conditions.
fn push_range(query: &mut QueryBuilder<'_, Postgres>, range: &DateRange) {
    match (range.from(), range.to()) {
        (Some(from), Some(to)) => {
            query
                .push(" WHERE u.birth_date BETWEEN ")
                .push_bind(from)
                .push(" AND ")
                .push_bind(to);
        }
        (Some(from), None) => {
            query.push(" WHERE u.birth_date >= ").push_bind(from);
        }
        (None, Some(to)) => {
            query.push(" WHERE u.birth_date <= ").push_bind(to);
        }
        (None, None) => (),
    }
}

/// Unique indexes are the real guard against concurrent duplicates.
fn unique_violation(err: sqlx::Error) -> ServerError {
    let Some(db_err) = err.as_database_error().filter(|e| e.is_unique_violation()) else {
        return err.into();
    };

    match db_err.constraint() {
        Some(EMAIL_CONSTRAINT) => {
            ServerError::AlreadyExists("User with this email already registered".into())
        }
        Some(PHONE_CONSTRAINT) => {
            ServerError::AlreadyExists("User with this phone already registered".into())
        }
        _ => ServerError::AlreadyExists("User already registered".into()),
    }
}

#[cfg(test)]
mod tests {
    use sqlx::{Pool, Postgres};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    #[ignore = "requires DATABASE_URL pointing to PostgreSQL"]
    async fn test_find_all_in_range(pool: Pool<Postgres>) {
        let repo = PostgresUserRepository::new(pool);
        let range = DateRange::new(Some(date(1983, 1, 1)), Some(date(2000, 12, 29))).unwrap();

        let page = repo.find_all(&PageRequest::default(), &range).await.unwrap();
        let dates = page.content.iter().map(|u| u.birth_date).collect::<Vec<_>>();
        assert_eq!(dates, vec![date(1985, 1, 1), date(1990, 1, 1)]);
        assert_eq!(page.total_elements, 2);
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    #[ignore = "requires DATABASE_URL pointing to PostgreSQL"]
    async fn test_find_by_id_loads_address(pool: Pool<Postgres>) {
        let repo = PostgresUserRepository::new(pool);

        let user = repo.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(user.email, "john.doe@gmail.com");
        assert_eq!(user.address.unwrap().city, "Kyiv");

        assert!(repo.find_by_id(999).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing to PostgreSQL"]
    async fn test_save_update_and_delete(pool: Pool<Postgres>) {
        let repo = PostgresUserRepository::new(pool);

        let user = User::new("jane@ukr.net", "Jane", "Doe", date(1995, 5, 5)).with_address(
            Address {
                street: "Khreshchatyk".into(),
                city: "Kyiv".into(),
                country: "Ukraine".into(),
                number: "1".into(),
            },
        );
        let saved = repo.save(user).await.unwrap();
        let id = saved.id.unwrap();
        assert!(saved.created_at.is_some());
        assert!(repo.exists_by_email("jane@ukr.net").await.unwrap());

        let mut changed = saved.clone();
        changed.address = None;
        changed.phone = Some("+380671112233".into());
        let updated = repo.save(changed).await.unwrap();
        assert!(updated.updated_at >= saved.updated_at);

        let reloaded = repo.find_by_id(id).await.unwrap().unwrap();
        assert!(reloaded.address.is_none());
        assert_eq!(reloaded.phone.as_deref(), Some("+380671112233"));

        repo.delete(&reloaded).await.unwrap();
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    #[ignore = "requires DATABASE_URL pointing to PostgreSQL"]
    async fn test_duplicate_email_is_rejected_by_store(pool: Pool<Postgres>) {
        let repo = PostgresUserRepository::new(pool);

        let duplicate = User::new("john.doe@gmail.com", "John", "Doe", date(1990, 1, 1));
        let err = repo.save(duplicate).await.unwrap_err();
        assert!(matches!(err, ServerError::AlreadyExists(_)));
    }
}

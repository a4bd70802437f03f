use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use mrportal_sdk::objects::account::ProfileResponse;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    /// Lower-cased, unique.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: OffsetDateTime,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl From<Account> for ProfileResponse {
    fn from(account: Account) -> Self {
        ProfileResponse {
            email: account.email,
            full_name: account.full_name,
            company_name: account.company_name,
            phone: account.phone,
            created_at: account.created_at,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AccountInsert {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
}

/// Insert an account unless the email is already registered.
///
/// Returns `None` when the email is taken.
#[derive(Clone)]
pub struct InsertAccount {
    pub account: AccountInsert,
}

impl Processor<InsertAccount> for DatabaseProcessor {
    type Output = Option<Account>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertAccount")]
    async fn process(&self, cmd: InsertAccount) -> Result<Option<Account>, sqlx::Error> {
        let AccountInsert {
            id,
            email,
            password_hash,
            full_name,
            company_name,
            phone,
        } = cmd.account;
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, password_hash, full_name, company_name, phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, password_hash, full_name, company_name, phone, created_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(company_name)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetAccountByEmail {
    pub email: String,
}

impl Processor<GetAccountByEmail> for DatabaseProcessor {
    type Output = Option<Account>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetAccountByEmail")]
    async fn process(&self, query: GetAccountByEmail) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, full_name, company_name, phone, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(query.email)
        .fetch_optional(&self.pool)
        .await
    }
}

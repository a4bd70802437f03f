use crate::entities::{Page, push_page_clause};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use mrportal_sdk::objects::catalog::{InfographicDraft, InfographicResponse, ListParams};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

const INFOGRAPHIC_COLUMNS: &str = "id, title, category, single_user_price, multi_user_price, \
    enterprise_price, summary, table_of_contents, methodology, infographics, description, \
    image_url, report_id, file_path, created_at";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Infographic {
    pub id: Uuid,
    pub title: Option<String>,
    pub category: Option<String>,
    pub single_user_price: Option<Decimal>,
    pub multi_user_price: Option<Decimal>,
    pub enterprise_price: Option<Decimal>,
    pub summary: Option<String>,
    pub table_of_contents: Option<String>,
    pub methodology: Option<String>,
    pub infographics: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub report_id: Option<String>,
    pub file_path: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<Infographic> for InfographicResponse {
    fn from(i: Infographic) -> Self {
        InfographicResponse {
            id: i.id,
            title: i.title,
            category: i.category,
            single_user_price: i.single_user_price,
            multi_user_price: i.multi_user_price,
            enterprise_price: i.enterprise_price,
            summary: i.summary,
            table_of_contents: i.table_of_contents,
            methodology: i.methodology,
            infographics: i.infographics,
            description: i.description,
            image_url: i.image_url,
            report_id: i.report_id,
            file_path: i.file_path,
            created_at: i.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfographicInsert {
    pub id: Uuid,
    pub draft: InfographicDraft,
    pub file_path: Option<String>,
}

impl InfographicInsert {
    pub fn into_infographic(self, created_at: OffsetDateTime) -> Infographic {
        let InfographicInsert {
            id,
            draft,
            file_path,
        } = self;
        Infographic {
            id,
            title: draft.title,
            category: draft.category,
            single_user_price: draft.prices.single_user,
            multi_user_price: draft.prices.multi_user,
            enterprise_price: draft.prices.enterprise,
            summary: draft.summary,
            table_of_contents: draft.table_of_contents,
            methodology: draft.methodology,
            infographics: draft.infographics,
            description: draft.description,
            image_url: draft.image_url,
            report_id: draft.report_id,
            file_path,
            created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsertInfographic {
    pub infographic: InfographicInsert,
}

impl Processor<InsertInfographic> for DatabaseProcessor {
    type Output = Infographic;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertInfographic")]
    async fn process(&self, cmd: InsertInfographic) -> Result<Infographic, sqlx::Error> {
        let i = cmd.infographic.into_infographic(OffsetDateTime::now_utc());
        sqlx::query_as::<_, Infographic>(&format!(
            r#"
            INSERT INTO infographics (id, title, category, single_user_price, multi_user_price,
                enterprise_price, summary, table_of_contents, methodology, infographics,
                description, image_url, report_id, file_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {INFOGRAPHIC_COLUMNS}
            "#
        ))
        .bind(i.id)
        .bind(i.title)
        .bind(i.category)
        .bind(i.single_user_price)
        .bind(i.multi_user_price)
        .bind(i.enterprise_price)
        .bind(i.summary)
        .bind(i.table_of_contents)
        .bind(i.methodology)
        .bind(i.infographics)
        .bind(i.description)
        .bind(i.image_url)
        .bind(i.report_id)
        .bind(i.file_path)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetInfographic {
    pub id: Uuid,
}

impl Processor<GetInfographic> for DatabaseProcessor {
    type Output = Option<Infographic>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetInfographic")]
    async fn process(&self, query: GetInfographic) -> Result<Option<Infographic>, sqlx::Error> {
        sqlx::query_as::<_, Infographic>(&format!(
            "SELECT {INFOGRAPHIC_COLUMNS} FROM infographics WHERE id = $1"
        ))
        .bind(query.id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct ListInfographics {
    pub params: ListParams,
}

impl Processor<ListInfographics> for DatabaseProcessor {
    type Output = Page<Infographic>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListInfographics")]
    async fn process(&self, query: ListInfographics) -> Result<Page<Infographic>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM infographics")
            .fetch_one(&self.pool)
            .await?;
        let mut builder =
            sqlx::QueryBuilder::new(format!("SELECT {INFOGRAPHIC_COLUMNS} FROM infographics"));
        push_page_clause(&mut builder, &query.params);
        let items = builder
            .build_query_as::<Infographic>()
            .fetch_all(&self.pool)
            .await?;
        Ok(Page { items, total })
    }
}

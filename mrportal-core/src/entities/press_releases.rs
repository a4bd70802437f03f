use crate::entities::{Page, push_page_clause};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use mrportal_sdk::objects::catalog::{ListParams, PressReleaseForm, PressReleaseResponse};
use time::OffsetDateTime;
use uuid::Uuid;

const PRESS_RELEASE_COLUMNS: &str =
    "id, title, category, description, file_path, report_id, created_at";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PressRelease {
    pub id: Uuid,
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub report_id: Option<String>,
    pub created_at: OffsetDateTime,
}

impl PressRelease {
    /// Overwrite the fields present in `form`; a new upload replaces the file.
    pub fn apply_update(&mut self, form: PressReleaseForm, file_path: Option<String>) {
        let PressReleaseForm {
            title,
            category,
            description,
            report_id,
        } = form;
        if title.is_some() {
            self.title = title;
        }
        if category.is_some() {
            self.category = category;
        }
        if description.is_some() {
            self.description = description;
        }
        if report_id.is_some() {
            self.report_id = report_id;
        }
        if file_path.is_some() {
            self.file_path = file_path;
        }
    }
}

impl From<PressRelease> for PressReleaseResponse {
    fn from(p: PressRelease) -> Self {
        PressReleaseResponse {
            id: p.id,
            title: p.title,
            category: p.category,
            description: p.description,
            file_path: p.file_path,
            report_id: p.report_id,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PressReleaseInsert {
    pub id: Uuid,
    pub form: PressReleaseForm,
    pub file_path: Option<String>,
}

impl PressReleaseInsert {
    pub fn into_press_release(self, created_at: OffsetDateTime) -> PressRelease {
        PressRelease {
            id: self.id,
            title: self.form.title,
            category: self.form.category,
            description: self.form.description,
            file_path: self.file_path,
            report_id: self.form.report_id,
            created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsertPressRelease {
    pub press_release: PressReleaseInsert,
}

impl Processor<InsertPressRelease> for DatabaseProcessor {
    type Output = PressRelease;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertPressRelease")]
    async fn process(&self, cmd: InsertPressRelease) -> Result<PressRelease, sqlx::Error> {
        let p = cmd.press_release.into_press_release(OffsetDateTime::now_utc());
        sqlx::query_as::<_, PressRelease>(&format!(
            r#"
            INSERT INTO press_releases (id, title, category, description, file_path, report_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRESS_RELEASE_COLUMNS}
            "#
        ))
        .bind(p.id)
        .bind(p.title)
        .bind(p.category)
        .bind(p.description)
        .bind(p.file_path)
        .bind(p.report_id)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetPressRelease {
    pub id: Uuid,
}

impl Processor<GetPressRelease> for DatabaseProcessor {
    type Output = Option<PressRelease>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPressRelease")]
    async fn process(&self, query: GetPressRelease) -> Result<Option<PressRelease>, sqlx::Error> {
        sqlx::query_as::<_, PressRelease>(&format!(
            "SELECT {PRESS_RELEASE_COLUMNS} FROM press_releases WHERE id = $1"
        ))
        .bind(query.id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Overwrite the mutable columns of a press release.
#[derive(Debug, Clone)]
pub struct UpdatePressRelease {
    pub press_release: PressRelease,
}

impl Processor<UpdatePressRelease> for DatabaseProcessor {
    type Output = Option<PressRelease>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdatePressRelease")]
    async fn process(&self, cmd: UpdatePressRelease) -> Result<Option<PressRelease>, sqlx::Error> {
        let p = cmd.press_release;
        sqlx::query_as::<_, PressRelease>(&format!(
            r#"
            UPDATE press_releases
            SET title = $2, category = $3, description = $4, file_path = $5, report_id = $6
            WHERE id = $1
            RETURNING {PRESS_RELEASE_COLUMNS}
            "#
        ))
        .bind(p.id)
        .bind(p.title)
        .bind(p.category)
        .bind(p.description)
        .bind(p.file_path)
        .bind(p.report_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct ListPressReleases {
    pub params: ListParams,
}

impl Processor<ListPressReleases> for DatabaseProcessor {
    type Output = Page<PressRelease>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListPressReleases")]
    async fn process(&self, query: ListPressReleases) -> Result<Page<PressRelease>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM press_releases")
            .fetch_one(&self.pool)
            .await?;
        let mut builder =
            sqlx::QueryBuilder::new(format!("SELECT {PRESS_RELEASE_COLUMNS} FROM press_releases"));
        push_page_clause(&mut builder, &query.params);
        let items = builder
            .build_query_as::<PressRelease>()
            .fetch_all(&self.pool)
            .await?;
        Ok(Page { items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_keeps_absent_fields() {
        let mut release = PressReleaseInsert {
            id: Uuid::now_v7(),
            form: PressReleaseForm {
                title: Some("Q3 outlook".into()),
                category: Some("Energy".into()),
                description: Some("<p>Body</p>".into()),
                report_id: None,
            },
            file_path: Some("/uploads/a.pdf".into()),
        }
        .into_press_release(OffsetDateTime::now_utc());

        release.apply_update(
            PressReleaseForm {
                title: Some("Q4 outlook".into()),
                ..Default::default()
            },
            None,
        );
        assert_eq!(release.title.as_deref(), Some("Q4 outlook"));
        assert_eq!(release.category.as_deref(), Some("Energy"));
        assert_eq!(release.file_path.as_deref(), Some("/uploads/a.pdf"));

        release.apply_update(PressReleaseForm::default(), Some("/uploads/b.pdf".into()));
        assert_eq!(release.file_path.as_deref(), Some("/uploads/b.pdf"));
    }
}

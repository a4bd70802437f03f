//! Lead-capture submissions: contact forms, contact page messages and
//! sample report requests.
//!
//! Each submission is written together with its outbox notification.

use crate::entities::notifications::{Notification, NotificationInsert};
use crate::framework::{DatabaseAccessor, DatabaseProcessor};
use kanau::processor::Processor;
use mrportal_sdk::objects::forms::{
    ContactFormResponse, ContactFormSubmission, ContactPageRequest, ContactPageResponse,
    SampleRequest as SampleRequestData,
};
use time::OffsetDateTime;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Contact form
// ---------------------------------------------------------------------------

const CONTACT_FORM_COLUMNS: &str = "id, name, email, company_name, phone_number, country, \
    street_address, city, postal_code, notes, created_at";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ContactForm {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub phone_number: String,
    pub country: String,
    pub street_address: String,
    pub city: String,
    pub postal_code: String,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

impl ContactForm {
    pub fn new(id: Uuid, s: ContactFormSubmission, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            name: s.name,
            email: s.email,
            company_name: s.company_name,
            phone_number: s.phone_number,
            country: s.country,
            street_address: s.street_address,
            city: s.city,
            postal_code: s.postal_code,
            notes: s.notes,
            created_at,
        }
    }

    async fn insert_tx(
        db: &mut impl DatabaseAccessor,
        form: ContactForm,
    ) -> Result<ContactForm, sqlx::Error> {
        sqlx::query_as::<_, ContactForm>(&format!(
            r#"
            INSERT INTO contact_forms (id, name, email, company_name, phone_number, country,
                street_address, city, postal_code, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CONTACT_FORM_COLUMNS}
            "#
        ))
        .bind(form.id)
        .bind(form.name)
        .bind(form.email)
        .bind(form.company_name)
        .bind(form.phone_number)
        .bind(form.country)
        .bind(form.street_address)
        .bind(form.city)
        .bind(form.postal_code)
        .bind(form.notes)
        .fetch_one(db.acquire())
        .await
    }
}

impl From<ContactForm> for ContactFormResponse {
    fn from(f: ContactForm) -> Self {
        ContactFormResponse {
            id: f.id,
            name: f.name,
            email: f.email,
            company_name: f.company_name,
            phone_number: f.phone_number,
            country: f.country,
            street_address: f.street_address,
            city: f.city,
            postal_code: f.postal_code,
            notes: f.notes,
            created_at: f.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmitContactForm {
    pub form: ContactForm,
    pub notification: NotificationInsert,
}

impl Processor<SubmitContactForm> for DatabaseProcessor {
    type Output = (ContactForm, Notification);
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:SubmitContactForm")]
    async fn process(
        &self,
        cmd: SubmitContactForm,
    ) -> Result<(ContactForm, Notification), sqlx::Error> {
        let mut tx = self.begin().await?;
        let form = ContactForm::insert_tx(&mut tx, cmd.form).await?;
        let notification = Notification::insert_tx(&mut tx, cmd.notification).await?;
        tx.commit().await?;
        Ok((form, notification))
    }
}

#[derive(Debug, Clone)]
pub struct ListContactForms;

impl Processor<ListContactForms> for DatabaseProcessor {
    type Output = Vec<ContactForm>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListContactForms")]
    async fn process(&self, _: ListContactForms) -> Result<Vec<ContactForm>, sqlx::Error> {
        sqlx::query_as::<_, ContactForm>(&format!(
            "SELECT {CONTACT_FORM_COLUMNS} FROM contact_forms ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
    }
}

// ---------------------------------------------------------------------------
// Contact page
// ---------------------------------------------------------------------------

const CONTACT_PAGE_COLUMNS: &str = "id, full_name, company_name, email, phone, country, \
    street, city, zip, message, terms, created_at";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ContactPage {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub message: Option<String>,
    pub terms: Option<bool>,
    pub created_at: OffsetDateTime,
}

impl ContactPage {
    pub fn new(id: Uuid, r: ContactPageRequest, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            full_name: r.full_name,
            company_name: r.company_name,
            email: r.email,
            phone: r.phone,
            country: r.country,
            street: r.street,
            city: r.city,
            zip: r.zip,
            message: r.message,
            terms: r.terms,
            created_at,
        }
    }

    async fn insert_tx(
        db: &mut impl DatabaseAccessor,
        page: ContactPage,
    ) -> Result<ContactPage, sqlx::Error> {
        sqlx::query_as::<_, ContactPage>(&format!(
            r#"
            INSERT INTO contact_pages (id, full_name, company_name, email, phone, country,
                street, city, zip, message, terms)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {CONTACT_PAGE_COLUMNS}
            "#
        ))
        .bind(page.id)
        .bind(page.full_name)
        .bind(page.company_name)
        .bind(page.email)
        .bind(page.phone)
        .bind(page.country)
        .bind(page.street)
        .bind(page.city)
        .bind(page.zip)
        .bind(page.message)
        .bind(page.terms)
        .fetch_one(db.acquire())
        .await
    }
}

impl From<ContactPage> for ContactPageResponse {
    fn from(p: ContactPage) -> Self {
        ContactPageResponse {
            id: p.id,
            full_name: p.full_name,
            company_name: p.company_name,
            email: p.email,
            phone: p.phone,
            country: p.country,
            street: p.street,
            city: p.city,
            zip: p.zip,
            message: p.message,
            terms: p.terms,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmitContactPage {
    pub page: ContactPage,
    pub notification: NotificationInsert,
}

impl Processor<SubmitContactPage> for DatabaseProcessor {
    type Output = (ContactPage, Notification);
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:SubmitContactPage")]
    async fn process(
        &self,
        cmd: SubmitContactPage,
    ) -> Result<(ContactPage, Notification), sqlx::Error> {
        let mut tx = self.begin().await?;
        let page = ContactPage::insert_tx(&mut tx, cmd.page).await?;
        let notification = Notification::insert_tx(&mut tx, cmd.notification).await?;
        tx.commit().await?;
        Ok((page, notification))
    }
}

#[derive(Debug, Clone)]
pub struct ListContactPages;

impl Processor<ListContactPages> for DatabaseProcessor {
    type Output = Vec<ContactPage>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListContactPages")]
    async fn process(&self, _: ListContactPages) -> Result<Vec<ContactPage>, sqlx::Error> {
        sqlx::query_as::<_, ContactPage>(&format!(
            "SELECT {CONTACT_PAGE_COLUMNS} FROM contact_pages ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
    }
}

// ---------------------------------------------------------------------------
// Sample report requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SampleRequest {
    pub id: Uuid,
    pub user_name: Option<String>,
    pub user_company: Option<String>,
    pub user_email: String,
    pub user_phone: Option<String>,
    pub user_message: Option<String>,
    pub user_link: String,
    pub report_title: Option<String>,
    pub submitted_at: OffsetDateTime,
}

impl SampleRequest {
    pub fn new(id: Uuid, r: SampleRequestData, submitted_at: OffsetDateTime) -> Self {
        Self {
            id,
            user_name: r.user_name,
            user_company: r.user_company,
            user_email: r.user_email,
            user_phone: r.user_phone,
            user_message: r.user_message,
            user_link: r.user_link,
            report_title: r.report_title,
            submitted_at,
        }
    }

    async fn insert_tx(
        db: &mut impl DatabaseAccessor,
        request: SampleRequest,
    ) -> Result<SampleRequest, sqlx::Error> {
        sqlx::query_as::<_, SampleRequest>(
            r#"
            INSERT INTO sample_requests (id, user_name, user_company, user_email, user_phone,
                user_message, user_link, report_title)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_name, user_company, user_email, user_phone, user_message,
                user_link, report_title, submitted_at
            "#,
        )
        .bind(request.id)
        .bind(request.user_name)
        .bind(request.user_company)
        .bind(request.user_email)
        .bind(request.user_phone)
        .bind(request.user_message)
        .bind(request.user_link)
        .bind(request.report_title)
        .fetch_one(db.acquire())
        .await
    }
}

#[derive(Debug, Clone)]
pub struct SubmitSampleRequest {
    pub request: SampleRequest,
    pub notification: NotificationInsert,
}

impl Processor<SubmitSampleRequest> for DatabaseProcessor {
    type Output = (SampleRequest, Notification);
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:SubmitSampleRequest")]
    async fn process(
        &self,
        cmd: SubmitSampleRequest,
    ) -> Result<(SampleRequest, Notification), sqlx::Error> {
        let mut tx = self.begin().await?;
        let request = SampleRequest::insert_tx(&mut tx, cmd.request).await?;
        let notification = Notification::insert_tx(&mut tx, cmd.notification).await?;
        tx.commit().await?;
        Ok((request, notification))
    }
}

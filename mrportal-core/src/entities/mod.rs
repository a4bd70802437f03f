pub mod accounts;
pub mod contacts;
pub mod infographics;
pub mod notifications;
pub mod payments;
pub mod press_releases;
pub mod reports;

use mrportal_sdk::objects::catalog::{
    LicenseType as SdkLicenseType, ListParams, SortKey, SortOrder,
};
use mrportal_sdk::objects::forms::NotificationStatus as SdkNotificationStatus;

/// License type for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `mrportal_sdk::objects::catalog::LicenseType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "license_type")]
pub enum LicenseType {
    Single,
    Multi,
    Enterprise,
}

impl From<LicenseType> for SdkLicenseType {
    fn from(value: LicenseType) -> Self {
        match value {
            LicenseType::Single => SdkLicenseType::Single,
            LicenseType::Multi => SdkLicenseType::Multi,
            LicenseType::Enterprise => SdkLicenseType::Enterprise,
        }
    }
}

impl From<SdkLicenseType> for LicenseType {
    fn from(value: SdkLicenseType) -> Self {
        match value {
            SdkLicenseType::Single => LicenseType::Single,
            SdkLicenseType::Multi => LicenseType::Multi,
            SdkLicenseType::Enterprise => LicenseType::Enterprise,
        }
    }
}

/// Notification delivery status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `mrportal_sdk::objects::forms::NotificationStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "notification_status")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

impl From<NotificationStatus> for SdkNotificationStatus {
    fn from(value: NotificationStatus) -> Self {
        match value {
            NotificationStatus::Pending => SdkNotificationStatus::Pending,
            NotificationStatus::Sent => SdkNotificationStatus::Sent,
            NotificationStatus::Failed => SdkNotificationStatus::Failed,
        }
    }
}

impl From<SdkNotificationStatus> for NotificationStatus {
    fn from(value: SdkNotificationStatus) -> Self {
        match value {
            SdkNotificationStatus::Pending => NotificationStatus::Pending,
            SdkNotificationStatus::Sent => NotificationStatus::Sent,
            SdkNotificationStatus::Failed => NotificationStatus::Failed,
        }
    }
}

/// One page of a listing plus the size of the whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

fn sort_column(key: SortKey) -> &'static str {
    match key {
        SortKey::CreatedAt => "created_at",
        SortKey::Title => "title",
        SortKey::Category => "category",
        SortKey::SingleUserPrice => "single_user_price",
        SortKey::MultiUserPrice => "multi_user_price",
        SortKey::EnterprisePrice => "enterprise_price",
    }
}

/// Append `ORDER BY ... LIMIT ... OFFSET ...` for `params`.
///
/// NULLs sort lowest in both directions and `id` breaks ties, so paging is
/// stable.
pub(crate) fn push_page_clause(
    builder: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>,
    params: &ListParams,
) {
    let column = sort_column(params.sort);
    let clause = match params.order {
        SortOrder::Asc => format!(" ORDER BY {column} ASC NULLS FIRST, id ASC"),
        SortOrder::Desc => format!(" ORDER BY {column} DESC NULLS LAST, id DESC"),
    };
    builder.push(clause);
    builder.push(" LIMIT ");
    builder.push_bind(params.limit);
    builder.push(" OFFSET ");
    builder.push_bind(params.offset());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clause_orders_nulls_low() {
        let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new("SELECT * FROM reports");
        push_page_clause(
            &mut builder,
            &ListParams {
                page: 2,
                limit: 10,
                sort: SortKey::SingleUserPrice,
                order: SortOrder::Asc,
            },
        );
        assert_eq!(
            builder.sql(),
            "SELECT * FROM reports ORDER BY single_user_price ASC NULLS FIRST, id ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_license_type_conversion() {
        let sdk: SdkLicenseType = LicenseType::Multi.into();
        assert_eq!(sdk, SdkLicenseType::Multi);
        assert_eq!(LicenseType::from(SdkLicenseType::Single), LicenseType::Single);
    }
}

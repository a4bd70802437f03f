//! Notification bodies for each form.
//!
//! Every submitted value interpolated into HTML goes through
//! [`escape_html`].

use crate::entities::contacts::{ContactForm, ContactPage, SampleRequest};
use crate::entities::notifications::{NotificationInsert, NotificationKind};
use crate::html::escape_html;
use uuid::Uuid;

pub const CONTACT_FORM_SUBJECT: &str = "Form Submission Confirmation";
pub const CONTACT_PAGE_SUBJECT: &str = "New Contact Page Submission";
pub const SAMPLE_REQUEST_SUBJECT: &str = "Your Sample Report";

/// Plain-text notice of a contact form, sent to the sales inbox.
pub fn contact_form(form: &ContactForm, notify_to: &str) -> NotificationInsert {
    let text = format!(
        "Hi {name},\n\nThank you for submitting the form.\n\nDetails:\nName: {name}\n\
         Email: {email}\nCompany: {company}\nPhone: {phone}\nCountry: {country}\n\
         Street Address: {street}\nCity: {city}\nPostal Code: {postal}\nNotes: {notes}\n\n\
         We will get back to you shortly.\n",
        name = form.name,
        email = form.email,
        company = form.company_name,
        phone = form.phone_number,
        country = form.country,
        street = form.street_address,
        city = form.city,
        postal = form.postal_code,
        notes = form.notes.as_deref().unwrap_or("-"),
    );
    NotificationInsert {
        id: Uuid::now_v7(),
        kind: NotificationKind::ContactForm,
        subject_id: form.id,
        recipient: notify_to.to_string(),
        subject: CONTACT_FORM_SUBJECT.to_string(),
        html_body: None,
        text_body: Some(text),
    }
}

/// HTML notice of a contact page message, sent to the sales inbox.
pub fn contact_page(page: &ContactPage, notify_to: &str) -> NotificationInsert {
    let rows = [
        ("Full name", page.full_name.as_deref()),
        ("Company", page.company_name.as_deref()),
        ("Email", page.email.as_deref()),
        ("Phone", page.phone.as_deref()),
        ("Country", page.country.as_deref()),
        ("Street", page.street.as_deref()),
        ("City", page.city.as_deref()),
        ("Zip", page.zip.as_deref()),
        ("Message", page.message.as_deref()),
    ];
    let mut html = String::from("<h3>New contact page submission</h3>\n<table>\n");
    for (label, value) in rows {
        html.push_str(&format!(
            "<tr><th align=\"left\">{label}</th><td>{}</td></tr>\n",
            escape_html(value.unwrap_or("-"))
        ));
    }
    let terms = match page.terms {
        Some(true) => "accepted",
        Some(false) => "declined",
        None => "-",
    };
    html.push_str(&format!(
        "<tr><th align=\"left\">Terms</th><td>{terms}</td></tr>\n</table>\n"
    ));
    NotificationInsert {
        id: Uuid::now_v7(),
        kind: NotificationKind::ContactPage,
        subject_id: page.id,
        recipient: notify_to.to_string(),
        subject: CONTACT_PAGE_SUBJECT.to_string(),
        html_body: Some(html),
        text_body: None,
    }
}

/// HTML mail with the sample download link, sent to the requester.
pub fn sample_request(request: &SampleRequest) -> NotificationInsert {
    let mut html = String::from("<h3>This is the sample report link</h3>\n");
    if let Some(title) = &request.report_title {
        html.push_str(&format!("<p>{}</p>\n", escape_html(title)));
    }
    html.push_str(&format!(
        "<a href=\"{}\" target=\"_blank\">Download PDF</a>\n",
        escape_html(&request.user_link)
    ));
    NotificationInsert {
        id: Uuid::now_v7(),
        kind: NotificationKind::SampleRequest,
        subject_id: request.id,
        recipient: request.user_email.clone(),
        subject: SAMPLE_REQUEST_SUBJECT.to_string(),
        html_body: Some(html),
        text_body: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn test_sample_request_escapes_link_and_title() {
        let request = SampleRequest {
            id: Uuid::now_v7(),
            user_name: Some("Asha".into()),
            user_company: None,
            user_email: "asha@x.com".into(),
            user_phone: None,
            user_message: None,
            user_link: "https://x.com/s.pdf?a=1&b=\"2\"".into(),
            report_title: Some("<script>alert(1)</script>".into()),
            submitted_at: OffsetDateTime::now_utc(),
        };
        let n = sample_request(&request);
        let html = n.html_body.unwrap();
        assert!(html.contains("href=\"https://x.com/s.pdf?a=1&amp;b=&quot;2&quot;\""));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert_eq!(n.recipient, "asha@x.com");
        assert_eq!(n.subject_id, request.id);
    }

    #[test]
    fn test_contact_page_escapes_every_value() {
        let page = ContactPage {
            id: Uuid::now_v7(),
            full_name: Some("<b>Mallory</b>".into()),
            company_name: None,
            email: None,
            phone: None,
            country: None,
            street: None,
            city: None,
            zip: None,
            message: Some("a & b".into()),
            terms: Some(true),
            created_at: OffsetDateTime::now_utc(),
        };
        let html = contact_page(&page, "inbox@x.com").html_body.unwrap();
        assert!(html.contains("&lt;b&gt;Mallory&lt;/b&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(html.contains("accepted"));
    }

    #[test]
    fn test_contact_form_is_plain_text_to_inbox() {
        let form = ContactForm {
            id: Uuid::now_v7(),
            name: "Asha".into(),
            email: "asha@x.com".into(),
            company_name: "Acme".into(),
            phone_number: "1".into(),
            country: "IN".into(),
            street_address: "1 Main".into(),
            city: "Pune".into(),
            postal_code: "411001".into(),
            notes: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let n = contact_form(&form, "sales@x.com");
        assert_eq!(n.recipient, "sales@x.com");
        assert!(n.html_body.is_none());
        assert!(n.text_body.unwrap().contains("Notes: -"));
    }
}

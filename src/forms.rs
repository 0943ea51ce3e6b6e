//! Inbound form payloads and validation.
//!
//! Both forms arrive as JSON POST bodies. Fields are untyped strings until
//! validated here; free-text values are escaped only at the point they are
//! interpolated into generated HTML.

use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::escape::escape_html;

/// Raw contact form submission.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    /// Honeypot field, hidden on the rendered form. Humans leave it empty.
    #[serde(default)]
    pub website: String,
}

/// Raw newsletter subscription request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsletterForm {
    #[serde(default)]
    pub email: String,
}

/// A contact submission whose required fields are all present and whose
/// email passed the syntactic check. Field values are kept raw; escaping
/// happens in the body builders.
#[derive(Debug, Clone)]
pub struct ValidatedContact {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Validate field presence, then email shape.
    ///
    /// Presence is checked first so a submission that is both empty and
    /// malformed reports the missing fields, matching the order callers see
    /// on the rendered form.
    pub fn validate(self) -> ApiResult<ValidatedContact> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        let subject = self.subject.trim().to_string();
        let message = self.message.trim().to_string();

        if name.is_empty() || email.is_empty() || subject.is_empty() || message.is_empty() {
            return Err(ApiError::Validation("All fields are required".to_string()));
        }

        if !is_valid_email(&email) {
            return Err(ApiError::Validation("Invalid email address".to_string()));
        }

        Ok(ValidatedContact {
            name,
            email,
            subject,
            message,
        })
    }
}

impl NewsletterForm {
    /// Validate the subscription email.
    ///
    /// Intentionally weaker than the contact-path check (presence plus an
    /// `@`): the list service performs its own full validation and rejects
    /// with a 400 we map back to the caller.
    pub fn validate(self) -> ApiResult<String> {
        let email = self.email.trim().to_string();

        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::Validation("Valid email is required".to_string()));
        }

        Ok(email)
    }
}

impl ValidatedContact {
    /// Plain-text body variant, raw values.
    pub fn text_body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\nSubject: {}\n\n{}",
            self.name, self.email, self.subject, self.message
        )
    }

    /// HTML body variant. Every interpolated field is entity-escaped.
    pub fn html_body(&self) -> String {
        format!(
            "<h2>New contact form submission</h2>\
             <p><strong>Name:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <p><strong>Subject:</strong> {}</p>\
             <p><strong>Message:</strong></p>\
             <p>{}</p>",
            escape_html(&self.name),
            escape_html(&self.email),
            escape_html(&self.subject),
            escape_html(&self.message).replace('\n', "<br>"),
        )
    }

    /// Subject line for the outbound operator email.
    pub fn email_subject(&self) -> String {
        format!("Contact form: {}", self.subject)
    }
}

/// Permissive `local@domain.tld` check for the contact path: non-empty
/// local part, single `@`, domain with a dot and non-empty labels, no
/// whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    !host.is_empty() && !tld.is_empty()
}

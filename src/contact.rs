use crate::error::LedgerError::InvalidContactMessage;
use crate::error::LedgerResult;
use chrono::{DateTime, Utc};

/// A message left by the account holder through the contact form.
#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq, Clone)]
pub struct ContactMessage {
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub message: String,

    pub date: DateTime<Utc>,
}

/// The raw fields of a contact form as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Validates the form and turns it into a message stamped with `now`.
    ///
    /// All fields are required after trimming and the email has to look like `local@domain.tld`.
    pub fn submit(self, now: DateTime<Utc>) -> LedgerResult<ContactMessage> {
        let name = self.name.trim();
        let email = self.email.trim();
        let subject = self.subject.trim();
        let message = self.message.trim();

        if [name, email, subject, message].iter().any(|field| field.is_empty()) {
            return Err(InvalidContactMessage("please fill in all required fields".into()));
        }
        if !is_valid_email(email) {
            return Err(InvalidContactMessage("please enter a valid email address".into()));
        }
        Ok(ContactMessage {
            id: now.timestamp_millis(),
            name: name.into(),
            email: email.into(),
            subject: subject.into(),
            message: message.into(),
            date: now,
        })
    }
}

/// Matches `^[^\s@]+@[^\s@]+\.[^\s@]+$`.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// The per-kind pieces an email is assembled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailParts {
    pub body_text: String,
    pub email_body_link: String,
    pub navigation_button_text: String,
}

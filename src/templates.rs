use anyhow::{Error, Result, anyhow};
use handlebars::Handlebars;
use serde_json::json;
use tracing::debug;

use crate::models::{
    event::NotificationEvent,
    template::{EmailContent, EmailParts},
    user::UserProfile,
};

pub const EMAIL_SUBJECT: &str = "Charsi Notification System";
pub const PUSH_TITLE: &str = "Charsi";

const EMAIL_TEMPLATE_NAME: &str = "notification_email";

const EMAIL_SKELETON: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Charsi Notification</title>
  </head>
  <body style="margin:0;padding:0;background-color:#121212;font-family:Helvetica,Arial,sans-serif;">
    <table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="padding:32px 0;">
      <tr>
        <td align="center">
          <table role="presentation" width="480" cellpadding="0" cellspacing="0" style="background-color:#1e1e1e;border-radius:8px;padding:32px;">
            <tr>
              <td align="center" style="padding-bottom:16px;">
                <img src="{{avatar_url}}" alt="{{username}}" width="64" height="64" style="border-radius:50%;" />
              </td>
            </tr>
            <tr>
              <td align="center" style="color:#f5f5f5;font-size:18px;font-weight:bold;padding-bottom:8px;">{{username}}</td>
            </tr>
            <tr>
              <td align="center" style="color:#d0d0d0;font-size:16px;padding-bottom:24px;">{{body_text}}</td>
            </tr>
            <tr>
              <td align="center">
                <a href="{{email_body_link}}" style="display:inline-block;background-color:#c8a45c;color:#121212;text-decoration:none;font-weight:bold;padding:12px 24px;border-radius:4px;">{{navigation_button_text}}</a>
              </td>
            </tr>
          </table>
          <p style="color:#7a7a7a;font-size:12px;padding-top:16px;">You are receiving this email because email notifications are enabled in your Charsi settings.</p>
        </td>
      </tr>
    </table>
  </body>
</html>
"#;

/// Short sentence used as the push body.
pub fn notification_body(event: &NotificationEvent, sender_username: &str) -> String {
    event.describe(sender_username).body
}

pub fn email_parts(event: &NotificationEvent, sender_username: &str, base_url: &str) -> EmailParts {
    let descriptor = event.describe(sender_username);

    EmailParts {
        body_text: descriptor.body,
        email_body_link: format!("{}{}", base_url.trim_end_matches('/'), descriptor.link_path),
        navigation_button_text: descriptor.button_text.to_string(),
    }
}

/// Renders the notification email. `base_url` is the already-resolved
/// frontend origin; nothing here depends on the environment.
pub fn render_email(
    event: &NotificationEvent,
    sender: &UserProfile,
    base_url: &str,
) -> Result<EmailContent, Error> {
    let parts = email_parts(event, &sender.username, base_url);
    let avatar_url = sender
        .avatar_url
        .clone()
        .unwrap_or_else(|| format!("{}/images/default-avatar.png", base_url.trim_end_matches('/')));

    debug!(kind = %event.kind(), "Rendering notification email");

    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_template_string(EMAIL_TEMPLATE_NAME, EMAIL_SKELETON)
        .map_err(|e| anyhow!("Invalid email template: {}", e))?;

    let html = registry
        .render(
            EMAIL_TEMPLATE_NAME,
            &json!({
                "avatar_url": avatar_url,
                "username": sender.username,
                "body_text": parts.body_text,
                "email_body_link": parts.email_body_link,
                "navigation_button_text": parts.navigation_button_text,
            }),
        )
        .map_err(|e| anyhow!("Email template render failed: {}", e))?;

    let text = format!(
        "{}\n\n{}: {}",
        parts.body_text, parts.navigation_button_text, parts.email_body_link
    );

    Ok(EmailContent {
        subject: EMAIL_SUBJECT.to_string(),
        text,
        html,
    })
}

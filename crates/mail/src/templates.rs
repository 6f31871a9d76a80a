//! Email templates.

/// Subject line for password reset mails.
pub const RESET_PASSWORD_SUBJECT: &str = "Password Reset";

/// A message body before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTemplate {
    ResetPassword {
        first_name: String,
        reset_url: String,
        expires_in_mins: i64,
    },
}

/// Rendered plain-text and HTML alternatives of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub text: String,
    pub html: String,
}

impl EmailTemplate {
    /// Stable template name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ResetPassword { .. } => "reset_password",
        }
    }

    pub fn render(&self) -> RenderedEmail {
        match self {
            Self::ResetPassword {
                first_name,
                reset_url,
                expires_in_mins,
            } => {
                let text = format!(
                    "Hi {first_name},\n\n\
                     We received a request to reset your password. Open the link below to choose a new one:\n\n\
                     {reset_url}\n\n\
                     The link expires in {expires_in_mins} minutes. If you did not ask for this, you can ignore this email.\n"
                );
                let html = format!(
                    "<!DOCTYPE html>\
                     <html><body>\
                     <p>Hi {name},</p>\
                     <p>We received a request to reset your password. Click the button below to choose a new one.</p>\
                     <p><a href=\"{url}\">Reset password</a></p>\
                     <p>The link expires in {expires_in_mins} minutes. If you did not ask for this, you can ignore this email.</p>\
                     </body></html>",
                    name = escape_html(first_name),
                    url = escape_html(reset_url),
                );
                RenderedEmail { text, html }
            }
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_password_contains_link_and_expiry() {
        let template = EmailTemplate::ResetPassword {
            first_name: "Ada".into(),
            reset_url: "https://app.test/reset?token=abc&x=1".into(),
            expires_in_mins: 60,
        };
        let rendered = template.render();

        assert!(rendered.text.contains("https://app.test/reset?token=abc&x=1"));
        assert!(rendered.text.contains("60 minutes"));
        assert!(rendered.html.contains("href=\"https://app.test/reset?token=abc&amp;x=1\""));
        assert_eq!(template.name(), "reset_password");
    }

    #[test]
    fn names_are_escaped_in_html() {
        let template = EmailTemplate::ResetPassword {
            first_name: "<script>".into(),
            reset_url: "https://app.test".into(),
            expires_in_mins: 5,
        };
        let html = template.render().html;
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}

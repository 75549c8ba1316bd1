//! HTML bodies for lead notifications.

use crate::i18n::{confirmation_copy, kind_phrase, Locale};
use crate::models::{LeadKind, StoredLead};

pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Escapes text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
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

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>{title}</title></head>
<body style="font-family: Arial, sans-serif; color: #1f2937; max-width: 600px; margin: 0 auto; padding: 24px;">
{body}
</body>
</html>"#,
        title = escape_html(title),
        body = body
    )
}

/// Email to the operations inbox with every submitted field.
pub fn internal_notification(
    kind: LeadKind,
    lead: &StoredLead,
    full_name: &str,
    summary: &[(&'static str, String)],
) -> RenderedEmail {
    let subject = format!("New {} lead: {}", kind.label(), full_name.trim());

    let mut rows = String::new();
    for (label, value) in summary {
        rows.push_str(&format!(
            "<tr><td style=\"padding: 6px 12px; font-weight: bold; vertical-align: top;\">{}</td>\
             <td style=\"padding: 6px 12px; white-space: pre-wrap;\">{}</td></tr>\n",
            escape_html(label),
            escape_html(value)
        ));
    }

    let body = format!(
        "<h2>New {label} submission</h2>\n\
         <table style=\"border-collapse: collapse;\">\n{rows}</table>\n\
         <p style=\"color: #6b7280; font-size: 12px;\">Lead ID: {id}<br>Received: {received}</p>",
        label = escape_html(kind.label()),
        rows = rows,
        id = lead.id,
        received = lead.created_at.format("%Y-%m-%d %H:%M UTC"),
    );

    RenderedEmail {
        html: layout(&subject, &body),
        subject,
    }
}

/// Acknowledgement sent to the person who submitted the form.
pub fn confirmation(
    kind: LeadKind,
    lead: &StoredLead,
    full_name: &str,
    locale: Locale,
) -> RenderedEmail {
    let copy = confirmation_copy(locale);
    let subject = copy.subject.to_string();

    let body = format!(
        "<p>{greeting} {name},</p>\n\
         <p>{received} {phrase}.</p>\n\
         <p>{next_steps}</p>\n\
         <p>{reference}: <strong>{id}</strong></p>\n\
         <p>{closing}<br>{signature}</p>",
        greeting = copy.greeting,
        name = escape_html(full_name.trim()),
        received = copy.received,
        phrase = kind_phrase(kind, locale),
        next_steps = copy.next_steps,
        reference = copy.reference,
        id = lead.id,
        closing = copy.closing,
        signature = copy.signature,
    );

    RenderedEmail {
        html: layout(&subject, &body),
        subject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lead() -> StoredLead {
        StoredLead::from_row(json!({
            "id": "0b8e7d1a-5f2c-4c1e-8a7b-9d6e5f4c3b2a",
            "status": "new",
            "created_at": "2026-10-16T14:03:11Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn test_internal_notification_escapes_user_input() {
        let summary = vec![
            ("Name", "<b>Mallory</b>".to_string()),
            ("Investment Budget", "250k-500k".to_string()),
        ];

        let email = internal_notification(LeadKind::BusinessBuyer, &lead(), "<b>Mallory</b>", &summary);

        assert_eq!(email.subject, "New Business Buyer lead: <b>Mallory</b>");
        assert!(email.html.contains("&lt;b&gt;Mallory&lt;/b&gt;"));
        assert!(!email.html.contains("<b>Mallory</b>"));
        assert!(email.html.contains("250k-500k"));
        assert!(email.html.contains("0b8e7d1a-5f2c-4c1e-8a7b-9d6e5f4c3b2a"));
        assert!(email.html.contains("2026-10-16 14:03 UTC"));
    }

    #[test]
    fn test_confirmation_is_localized() {
        let en = confirmation(LeadKind::Appointment, &lead(), "Ana", Locale::En);
        let es = confirmation(LeadKind::Appointment, &lead(), "Ana", Locale::Es);

        assert_eq!(en.subject, "We received your request");
        assert!(en.html.contains("appointment request"));
        assert_eq!(es.subject, "Hemos recibido su solicitud");
        assert!(es.html.contains("solicitud de cita"));
        assert!(es.html.contains("0b8e7d1a-5f2c-4c1e-8a7b-9d6e5f4c3b2a"));
    }
}

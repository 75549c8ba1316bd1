//! Localized strings for submitter-facing confirmation emails.

use crate::models::LeadKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    /// Accepts a language tag such as `es`, `es-MX` or `EN`; anything
    /// unrecognised falls back to English.
    pub fn from_tag(tag: Option<&str>) -> Self {
        let primary = tag
            .unwrap_or_default()
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "es" => Locale::Es,
            _ => Locale::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }
}

pub struct ConfirmationCopy {
    pub subject: &'static str,
    pub greeting: &'static str,
    pub received: &'static str,
    pub next_steps: &'static str,
    pub reference: &'static str,
    pub closing: &'static str,
    pub signature: &'static str,
}

pub fn confirmation_copy(locale: Locale) -> ConfirmationCopy {
    match locale {
        Locale::En => ConfirmationCopy {
            subject: "We received your request",
            greeting: "Hello",
            received: "Thank you for reaching out. We have received your",
            next_steps: "A member of our team will review your information and contact you within one business day.",
            reference: "Your reference number",
            closing: "Best regards,",
            signature: "The Brokerage Team",
        },
        Locale::Es => ConfirmationCopy {
            subject: "Hemos recibido su solicitud",
            greeting: "Hola",
            received: "Gracias por comunicarse con nosotros. Hemos recibido su",
            next_steps: "Un miembro de nuestro equipo revisará su información y se comunicará con usted en un día hábil.",
            reference: "Su número de referencia",
            closing: "Saludos cordiales,",
            signature: "El equipo de la correduría",
        },
    }
}

/// Lower-case noun phrase for the submission, as it reads mid-sentence.
pub fn kind_phrase(kind: LeadKind, locale: Locale) -> &'static str {
    match (locale, kind) {
        (Locale::En, LeadKind::Contact) => "message",
        (Locale::En, LeadKind::BusinessBuyer)
        | (Locale::En, LeadKind::EstablishedBusinessBuyer)
        | (Locale::En, LeadKind::TexasBusinessBuyer) => "business buyer inquiry",
        (Locale::En, LeadKind::BusinessValuation) => "business valuation request",
        (Locale::En, LeadKind::InterviewRequest) => "interview request",
        (Locale::En, LeadKind::Appointment) => "appointment request",
        (Locale::Es, LeadKind::Contact) => "mensaje",
        (Locale::Es, LeadKind::BusinessBuyer)
        | (Locale::Es, LeadKind::EstablishedBusinessBuyer)
        | (Locale::Es, LeadKind::TexasBusinessBuyer) => "consulta para compra de negocio",
        (Locale::Es, LeadKind::BusinessValuation) => "solicitud de valuación de negocio",
        (Locale::Es, LeadKind::InterviewRequest) => "solicitud de entrevista",
        (Locale::Es, LeadKind::Appointment) => "solicitud de cita",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Locale::from_tag(Some("es")), Locale::Es);
        assert_eq!(Locale::from_tag(Some("es-MX")), Locale::Es);
        assert_eq!(Locale::from_tag(Some(" ES_us ")), Locale::Es);
        assert_eq!(Locale::from_tag(Some("en-US")), Locale::En);
        assert_eq!(Locale::from_tag(Some("fr")), Locale::En);
        assert_eq!(Locale::from_tag(Some("")), Locale::En);
        assert_eq!(Locale::from_tag(None), Locale::En);
    }

    #[test]
    fn test_every_kind_has_a_phrase_in_each_locale() {
        for kind in LeadKind::ALL {
            assert!(!kind_phrase(kind, Locale::En).is_empty());
            assert!(!kind_phrase(kind, Locale::Es).is_empty());
        }
    }
}

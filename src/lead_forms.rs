use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};

use crate::i18n::Locale;
use crate::models::LeadKind;

/// A typed form submission for one lead kind.
///
/// `REQUIRED` lists wire names exactly as the website posts them; several
/// endpoints use `camelCase` while others use `snake_case`. Columns are
/// always written in `snake_case`.
pub trait LeadForm: DeserializeOwned + Send + Sync + 'static {
    const KIND: LeadKind;
    const REQUIRED: &'static [&'static str];

    fn full_name(&self) -> &str;
    fn email(&self) -> &str;
    fn locale(&self) -> Locale;

    /// Column values to persist, keyed by column name. Absent optional
    /// fields are left out so the table defaults apply.
    fn columns(&self) -> Map<String, Value>;

    /// Labelled values for the internal notification, in display order.
    fn summary(&self) -> Vec<(&'static str, String)>;
}

fn non_null(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
        _ => Map::new(),
    }
}

fn push_opt(summary: &mut Vec<(&'static str, String)>, label: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        summary.push((label, v.to_string()));
    }
}

/// Renders a JSON scalar as text. Forms post numeric inputs (phone, revenue,
/// years) as numbers or strings depending on the widget.
fn scalar_text<E: de::Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(E::custom(format!("expected a string or number, got {}", other))),
    }
}

fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    scalar_text::<D::Error>(Value::deserialize(deserializer)?)?
        .ok_or_else(|| de::Error::custom("expected a string or number, got null"))
}

fn optional_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    scalar_text(Value::deserialize(deserializer)?)
}

/// Checkbox value: `true`, non-zero numbers and strings such as `"on"` or
/// `"yes"` are ticked.
fn checkbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Ok(!matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "0" | "off" | "no"
        )),
        other => Err(de::Error::custom(format!("expected a checkbox value, got {}", other))),
    }
}

/// General contact form.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    #[serde(deserialize_with = "scalar")]
    pub full_name: String,
    #[serde(deserialize_with = "scalar")]
    pub email: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub inquiry_type: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub message: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub locale: Option<String>,
}

impl LeadForm for ContactForm {
    const KIND: LeadKind = LeadKind::Contact;
    const REQUIRED: &'static [&'static str] = &["full_name", "email", "message"];

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn locale(&self) -> Locale {
        Locale::from_tag(self.locale.as_deref())
    }

    fn columns(&self) -> Map<String, Value> {
        non_null(json!({
            "full_name": self.full_name,
            "email": self.email,
            "phone": self.phone,
            "inquiry_type": self.inquiry_type,
            "message": self.message,
            "locale": self.locale().code(),
        }))
    }

    fn summary(&self) -> Vec<(&'static str, String)> {
        let mut summary = vec![
            ("Name", self.full_name.clone()),
            ("Email", self.email.clone()),
        ];
        push_opt(&mut summary, "Phone", &self.phone);
        push_opt(&mut summary, "Inquiry Type", &self.inquiry_type);
        summary.push(("Message", self.message.clone()));
        summary
    }
}

/// Buyer looking to acquire a business (main buyer funnel).
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessBuyerForm {
    #[serde(deserialize_with = "scalar")]
    pub full_name: String,
    #[serde(deserialize_with = "scalar")]
    pub email: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub investment_budget: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub business_type: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub visa_type: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub timeline: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub message: Option<String>,
    #[serde(deserialize_with = "checkbox")]
    pub consent: bool,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub locale: Option<String>,
}

impl LeadForm for BusinessBuyerForm {
    const KIND: LeadKind = LeadKind::BusinessBuyer;
    const REQUIRED: &'static [&'static str] =
        &["full_name", "email", "investment_budget", "consent"];

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn locale(&self) -> Locale {
        Locale::from_tag(self.locale.as_deref())
    }

    fn columns(&self) -> Map<String, Value> {
        non_null(json!({
            "full_name": self.full_name,
            "email": self.email,
            "phone": self.phone,
            "investment_budget": self.investment_budget,
            "business_type": self.business_type,
            "visa_type": self.visa_type,
            "timeline": self.timeline,
            "message": self.message,
            "consent": self.consent,
            "locale": self.locale().code(),
        }))
    }

    fn summary(&self) -> Vec<(&'static str, String)> {
        let mut summary = vec![
            ("Name", self.full_name.clone()),
            ("Email", self.email.clone()),
        ];
        push_opt(&mut summary, "Phone", &self.phone);
        summary.push(("Investment Budget", self.investment_budget.clone()));
        push_opt(&mut summary, "Business Type", &self.business_type);
        push_opt(&mut summary, "Visa Type", &self.visa_type);
        push_opt(&mut summary, "Timeline", &self.timeline);
        push_opt(&mut summary, "Message", &self.message);
        summary
    }
}

/// Buyer interested in established, cash-flowing businesses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstablishedBusinessBuyerForm {
    #[serde(deserialize_with = "scalar")]
    pub full_name: String,
    #[serde(deserialize_with = "scalar")]
    pub email: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub investment_budget: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub business_type: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub preferred_location: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub visa_type: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub locale: Option<String>,
}

impl LeadForm for EstablishedBusinessBuyerForm {
    const KIND: LeadKind = LeadKind::EstablishedBusinessBuyer;
    const REQUIRED: &'static [&'static str] = &["fullName", "email", "investmentBudget"];

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn locale(&self) -> Locale {
        Locale::from_tag(self.locale.as_deref())
    }

    fn columns(&self) -> Map<String, Value> {
        non_null(json!({
            "full_name": self.full_name,
            "email": self.email,
            "phone": self.phone,
            "investment_budget": self.investment_budget,
            "business_type": self.business_type,
            "preferred_location": self.preferred_location,
            "visa_type": self.visa_type,
            "message": self.message,
            "locale": self.locale().code(),
        }))
    }

    fn summary(&self) -> Vec<(&'static str, String)> {
        let mut summary = vec![
            ("Name", self.full_name.clone()),
            ("Email", self.email.clone()),
        ];
        push_opt(&mut summary, "Phone", &self.phone);
        summary.push(("Investment Budget", self.investment_budget.clone()));
        push_opt(&mut summary, "Business Type", &self.business_type);
        push_opt(&mut summary, "Preferred Location", &self.preferred_location);
        push_opt(&mut summary, "Visa Type", &self.visa_type);
        push_opt(&mut summary, "Message", &self.message);
        summary
    }
}

/// Texas-market buyer landing page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TexasBusinessBuyerForm {
    #[serde(deserialize_with = "scalar")]
    pub full_name: String,
    #[serde(deserialize_with = "scalar")]
    pub email: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub investment_budget: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub preferred_city: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub business_type: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub visa_type: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub message: Option<String>,
    #[serde(deserialize_with = "checkbox")]
    pub consent: bool,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub locale: Option<String>,
}

impl LeadForm for TexasBusinessBuyerForm {
    const KIND: LeadKind = LeadKind::TexasBusinessBuyer;
    const REQUIRED: &'static [&'static str] =
        &["fullName", "email", "investmentBudget", "consent"];

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn locale(&self) -> Locale {
        Locale::from_tag(self.locale.as_deref())
    }

    fn columns(&self) -> Map<String, Value> {
        non_null(json!({
            "full_name": self.full_name,
            "email": self.email,
            "phone": self.phone,
            "investment_budget": self.investment_budget,
            "preferred_city": self.preferred_city,
            "business_type": self.business_type,
            "visa_type": self.visa_type,
            "message": self.message,
            "consent": self.consent,
            "locale": self.locale().code(),
        }))
    }

    fn summary(&self) -> Vec<(&'static str, String)> {
        let mut summary = vec![
            ("Name", self.full_name.clone()),
            ("Email", self.email.clone()),
        ];
        push_opt(&mut summary, "Phone", &self.phone);
        summary.push(("Investment Budget", self.investment_budget.clone()));
        push_opt(&mut summary, "Preferred City", &self.preferred_city);
        push_opt(&mut summary, "Business Type", &self.business_type);
        push_opt(&mut summary, "Visa Type", &self.visa_type);
        push_opt(&mut summary, "Message", &self.message);
        summary
    }
}

/// Owner asking for a valuation of their business.
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessValuationForm {
    #[serde(deserialize_with = "scalar")]
    pub full_name: String,
    #[serde(deserialize_with = "scalar")]
    pub email: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub business_name: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub business_type: String,
    #[serde(deserialize_with = "scalar")]
    pub annual_revenue: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub years_in_business: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub locale: Option<String>,
}

impl LeadForm for BusinessValuationForm {
    const KIND: LeadKind = LeadKind::BusinessValuation;
    const REQUIRED: &'static [&'static str] =
        &["full_name", "email", "business_type", "annual_revenue"];

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn locale(&self) -> Locale {
        Locale::from_tag(self.locale.as_deref())
    }

    fn columns(&self) -> Map<String, Value> {
        non_null(json!({
            "full_name": self.full_name,
            "email": self.email,
            "phone": self.phone,
            "business_name": self.business_name,
            "business_type": self.business_type,
            "annual_revenue": self.annual_revenue,
            "years_in_business": self.years_in_business,
            "message": self.message,
            "locale": self.locale().code(),
        }))
    }

    fn summary(&self) -> Vec<(&'static str, String)> {
        let mut summary = vec![
            ("Name", self.full_name.clone()),
            ("Email", self.email.clone()),
        ];
        push_opt(&mut summary, "Phone", &self.phone);
        push_opt(&mut summary, "Business Name", &self.business_name);
        summary.push(("Business Type", self.business_type.clone()));
        summary.push(("Annual Revenue", self.annual_revenue.clone()));
        push_opt(&mut summary, "Years in Business", &self.years_in_business);
        push_opt(&mut summary, "Message", &self.message);
        summary
    }
}

/// Request for a consultation interview (investor visa candidates, mostly).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRequestForm {
    #[serde(deserialize_with = "scalar")]
    pub full_name: String,
    #[serde(deserialize_with = "scalar")]
    pub email: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub visa_type: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub preferred_date: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub locale: Option<String>,
}

impl LeadForm for InterviewRequestForm {
    const KIND: LeadKind = LeadKind::InterviewRequest;
    const REQUIRED: &'static [&'static str] = &["fullName", "email"];

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn locale(&self) -> Locale {
        Locale::from_tag(self.locale.as_deref())
    }

    fn columns(&self) -> Map<String, Value> {
        non_null(json!({
            "full_name": self.full_name,
            "email": self.email,
            "phone": self.phone,
            "visa_type": self.visa_type,
            "preferred_date": self.preferred_date,
            "message": self.message,
            "locale": self.locale().code(),
        }))
    }

    fn summary(&self) -> Vec<(&'static str, String)> {
        let mut summary = vec![
            ("Name", self.full_name.clone()),
            ("Email", self.email.clone()),
        ];
        push_opt(&mut summary, "Phone", &self.phone);
        push_opt(&mut summary, "Visa Type", &self.visa_type);
        push_opt(&mut summary, "Preferred Date", &self.preferred_date);
        push_opt(&mut summary, "Message", &self.message);
        summary
    }
}

/// Appointment booking.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentForm {
    #[serde(deserialize_with = "scalar")]
    pub full_name: String,
    #[serde(deserialize_with = "scalar")]
    pub email: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub appointment_type: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub preferred_date: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub preferred_time: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub locale: Option<String>,
}

impl LeadForm for AppointmentForm {
    const KIND: LeadKind = LeadKind::Appointment;
    const REQUIRED: &'static [&'static str] = &["full_name", "email", "preferred_date"];

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn locale(&self) -> Locale {
        Locale::from_tag(self.locale.as_deref())
    }

    fn columns(&self) -> Map<String, Value> {
        non_null(json!({
            "full_name": self.full_name,
            "email": self.email,
            "phone": self.phone,
            "appointment_type": self.appointment_type,
            "preferred_date": self.preferred_date,
            "preferred_time": self.preferred_time,
            "notes": self.notes,
            "locale": self.locale().code(),
        }))
    }

    fn summary(&self) -> Vec<(&'static str, String)> {
        let mut summary = vec![
            ("Name", self.full_name.clone()),
            ("Email", self.email.clone()),
        ];
        push_opt(&mut summary, "Phone", &self.phone);
        push_opt(&mut summary, "Appointment Type", &self.appointment_type);
        summary.push(("Preferred Date", self.preferred_date.clone()));
        push_opt(&mut summary, "Preferred Time", &self.preferred_time);
        push_opt(&mut summary, "Notes", &self.notes);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_form_writes_snake_case_columns() {
        let form: EstablishedBusinessBuyerForm = serde_json::from_value(json!({
            "fullName": "Maria Garcia",
            "email": "maria@example.com",
            "investmentBudget": "500k-1m",
            "visaType": "E-2"
        }))
        .unwrap();

        let columns = form.columns();
        assert_eq!(columns["full_name"], "Maria Garcia");
        assert_eq!(columns["investment_budget"], "500k-1m");
        assert_eq!(columns["visa_type"], "E-2");
        assert_eq!(columns["locale"], "en");
        assert!(!columns.contains_key("phone"));
        assert!(!columns.contains_key("fullName"));
    }

    #[test]
    fn test_snake_case_form_ignores_camel_case_keys() {
        let result: Result<BusinessBuyerForm, _> = serde_json::from_value(json!({
            "fullName": "John Smith",
            "email": "john@example.com",
            "investmentBudget": "250k-500k",
            "consent": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_skips_blank_optionals() {
        let form: ContactForm = serde_json::from_value(json!({
            "full_name": "Ana Lopez",
            "email": "ana@example.com",
            "phone": "  ",
            "message": "Do you list franchises?",
            "locale": "es"
        }))
        .unwrap();

        let labels: Vec<_> = form.summary().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Name", "Email", "Message"]);
        assert_eq!(form.locale(), Locale::Es);
        assert_eq!(form.columns()["locale"], "es");
    }

    #[test]
    fn test_required_fields_exist_on_the_wire_shape() {
        let form: TexasBusinessBuyerForm = serde_json::from_value(json!({
            "fullName": "Sam Houston",
            "email": "sam@example.com",
            "investmentBudget": "100k-250k",
            "preferredCity": "Austin",
            "consent": true
        }))
        .unwrap();

        assert_eq!(TexasBusinessBuyerForm::REQUIRED.len(), 4);
        assert!(form.consent);
        assert_eq!(form.columns()["preferred_city"], "Austin");
    }

    #[test]
    fn test_numeric_inputs_are_stored_as_text() {
        let form: BusinessValuationForm = serde_json::from_value(json!({
            "full_name": "Lee Park",
            "email": "lee@example.com",
            "phone": 5551234567u64,
            "business_type": "Restaurant",
            "annual_revenue": 1200000,
            "years_in_business": 12,
            "message": null
        }))
        .unwrap();

        assert_eq!(form.phone.as_deref(), Some("5551234567"));
        assert_eq!(form.annual_revenue, "1200000");
        let columns = form.columns();
        assert_eq!(columns["years_in_business"], "12");
        assert!(!columns.contains_key("message"));
    }

    #[test]
    fn test_structured_values_are_rejected() {
        let result: Result<ContactForm, _> = serde_json::from_value(json!({
            "full_name": "Ana Lopez",
            "email": "ana@example.com",
            "phone": { "mobile": "555" },
            "message": "Hi"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_checkbox_values() {
        for (raw, ticked) in [
            (json!(true), true),
            (json!("on"), true),
            (json!("yes"), true),
            (json!(1), true),
            (json!("false"), false),
            (json!(0), false),
        ] {
            let form: BusinessBuyerForm = serde_json::from_value(json!({
                "full_name": "John Smith",
                "email": "john@example.com",
                "investment_budget": "250k-500k",
                "consent": raw
            }))
            .unwrap();
            assert_eq!(form.consent, ticked);
        }
    }
}

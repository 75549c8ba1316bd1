/// Property-based tests using proptest
/// Tests invariants that should hold for all submissions
use brokerage_leads_api::email_templates::escape_html;
use brokerage_leads_api::errors::AppError;
use brokerage_leads_api::lead_forms::{
    AppointmentForm, BusinessBuyerForm, LeadForm, TexasBusinessBuyerForm,
};
use brokerage_leads_api::validation::{is_present, missing_fields, validate};
use proptest::prelude::*;
use serde_json::{json, Value};

fn buyer(name: &str, email: &str, budget: &str) -> Value {
    json!({
        "full_name": name,
        "email": email,
        "investment_budget": budget,
        "consent": true
    })
}

fn texas_buyer(name: &str, email: &str, budget: &str) -> Value {
    json!({
        "fullName": name,
        "email": email,
        "investmentBudget": budget,
        "consent": true
    })
}

// Property: validation never panics, whatever JSON arrives
proptest! {
    #[test]
    fn validate_never_panics_on_arbitrary_strings(raw in "\\PC*") {
        let payload = json!({ "full_name": raw.clone(), "email": raw.clone(), "preferred_date": raw });
        let _ = validate::<AppointmentForm>(&payload);
    }

    #[test]
    fn validate_never_panics_on_non_objects(n in any::<i64>(), s in "\\PC*", b in any::<bool>()) {
        for payload in [json!(n), json!(s), json!(b), json!([n]), Value::Null] {
            let result = validate::<BusinessBuyerForm>(&payload);
            prop_assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn complete_buyer_submissions_validate(
        name in "[A-Za-z][A-Za-z ]{0,30}",
        local in "[a-z]{1,10}",
        domain in "[a-z]{1,10}",
        budget in "[0-9]{2,3}k-[0-9]{3}k"
    ) {
        let email = format!("{}@{}.com", local, domain);
        let form = validate::<BusinessBuyerForm>(&buyer(&name, &email, &budget));
        prop_assert!(form.is_ok());
        prop_assert_eq!(form.unwrap().investment_budget, budget);
    }

    #[test]
    fn removing_any_required_field_is_rejected(index in 0usize..4) {
        let field = TexasBusinessBuyerForm::REQUIRED[index];
        let mut payload = texas_buyer("John Smith", "john@example.com", "250k-500k");
        payload.as_object_mut().unwrap().remove(field);

        match validate::<TexasBusinessBuyerForm>(&payload) {
            Err(AppError::Validation(missing)) => prop_assert_eq!(missing, vec![field.to_string()]),
            other => prop_assert!(false, "expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn blank_required_strings_are_missing(spaces in "[ \\t\\n]{0,8}") {
        let payload = buyer(&spaces, "john@example.com", "250k-500k");
        let missing = missing_fields(payload.as_object().unwrap(), BusinessBuyerForm::REQUIRED);
        prop_assert_eq!(missing, vec!["full_name".to_string()]);
    }

    #[test]
    fn non_zero_numbers_are_present(n in any::<i64>().prop_filter("non-zero", |n| *n != 0)) {
        prop_assert!(is_present(&json!(n)));
    }

    #[test]
    fn escaped_html_has_no_markup(input in "\\PC*") {
        let escaped = escape_html(&input);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
    }
}

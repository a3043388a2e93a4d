use super::common::*;
use crate::inquiries::validation::{NAME_MAX, PHONE_MAX};
use crate::inquiries::{
    is_deliverable_address, is_phone_number, validate_reply, validate_submission,
    ContactSubmission,
};

#[test]
fn accepts_a_complete_submission_and_trims_it() {
    let mut raw = submission();
    raw.name = "  Ada Lovelace ".to_string();
    raw.email = " ada@example.com".to_string();

    let fields = validate_submission(&raw).expect("valid submission");
    assert_eq!(fields.name, "Ada Lovelace");
    assert_eq!(fields.email, "ada@example.com");
    assert_eq!(fields.phone.as_deref(), Some("+1 555-123-4567"));
    assert_eq!(fields.company.as_deref(), Some("Analytical Engines Ltd"));
}

#[test]
fn blank_optional_fields_become_absent() {
    let mut raw = submission();
    raw.phone = Some("   ".to_string());
    raw.company = Some(String::new());

    let fields = validate_submission(&raw).expect("valid submission");
    assert_eq!(fields.phone, None);
    assert_eq!(fields.company, None);
}

#[test]
fn reports_every_missing_required_field() {
    let raw = ContactSubmission {
        name: " ".to_string(),
        ..ContactSubmission::default()
    };

    let errors = validate_submission(&raw).expect_err("empty form is rejected");
    assert_eq!(
        errors.fields().collect::<Vec<_>>(),
        vec!["email", "message", "name", "subject"]
    );
    assert_eq!(errors.get("name"), Some("This field is required."));
}

#[test]
fn rejects_malformed_email() {
    let mut raw = submission();
    raw.email = "ada-at-example".to_string();

    let errors = validate_submission(&raw).expect_err("bad email");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("email"), Some("Enter a valid email address."));
}

#[test]
fn rejects_addresses_the_mail_transport_cannot_reach() {
    assert!(is_deliverable_address("ada@example.com"));
    assert!(!is_deliverable_address("x@[127.0.0.1]"));

    let mut raw = submission();
    raw.email = "x@[127.0.0.1]".to_string();
    let errors = validate_submission(&raw).expect_err("domain literal");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("email"), Some("Enter a valid email address."));
}

#[test]
fn length_limits_report_both_counts() {
    let mut raw = submission();
    raw.name = "x".repeat(NAME_MAX + 1);
    raw.phone = Some("1".repeat(PHONE_MAX + 5));

    let errors = validate_submission(&raw).expect_err("too long");
    assert_eq!(
        errors.get("name"),
        Some("Ensure this value has at most 100 characters (it has 101).")
    );
    assert_eq!(
        errors.get("phone"),
        Some("Ensure this value has at most 20 characters (it has 25).")
    );
}

#[test]
fn phone_numbers_allow_spacing_and_one_leading_plus() {
    assert!(is_phone_number("+1 555-123-4567"));
    assert!(is_phone_number("555 1234"));
    assert!(is_phone_number("0044-20-7946-0018"));

    assert!(!is_phone_number("call me"));
    assert!(!is_phone_number("++1 555"));
    assert!(!is_phone_number("555+1234"));
    assert!(!is_phone_number("- -"));
}

#[test]
fn phone_failures_use_the_form_message() {
    let mut raw = submission();
    raw.phone = Some("call me".to_string());

    let errors = validate_submission(&raw).expect_err("bad phone");
    assert_eq!(errors.get("phone"), Some("Please enter a valid phone number."));
}

#[test]
fn replies_need_subject_and_message() {
    let errors = validate_reply(&reply(" ", "", true)).expect_err("blank reply");
    assert!(errors.contains("reply_subject"));
    assert!(errors.contains("reply_message"));

    let draft = validate_reply(&reply("Re: Pricing", "  Thanks!  ", false)).expect("valid");
    assert_eq!(draft.reply_message, "Thanks!");
    assert!(!draft.send_email);
}

#[test]
fn send_flag_honours_checkbox_and_falsy_values() {
    for (value, expected) in [
        (None, false),
        (Some("on"), true),
        (Some("true"), true),
        (Some("1"), true),
        (Some(""), false),
        (Some("false"), false),
        (Some("OFF"), false),
        (Some("0"), false),
    ] {
        let mut raw = reply("Re: Pricing", "Thanks", false);
        raw.send_email = value.map(str::to_string);
        assert_eq!(raw.wants_send(), expected, "send_email={value:?}");
    }
}

#[test]
fn reply_notes_and_signature_are_normalized() {
    let mut raw = reply("Re: Pricing", "Thanks", true);
    raw.admin_notes = Some("   ".to_string());
    raw.sender_name = Some(" Grace ".to_string());

    let draft = validate_reply(&raw).expect("valid");
    assert_eq!(draft.admin_notes, None);
    assert_eq!(draft.sender_name.as_deref(), Some("Grace"));
}

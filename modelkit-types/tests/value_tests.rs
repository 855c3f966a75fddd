use chrono::{TimeZone, Utc};
use modelkit_types::{AttrType, AttrValue};
use serde_json::json;
use std::str::FromStr;

// ── AttrType ─────────────────────────────────────────────────────

#[test]
fn attr_type_parses_lowercase_names() {
    assert_eq!(AttrType::from_str("number").unwrap(), AttrType::Number);
    assert_eq!(AttrType::from_str("string").unwrap(), AttrType::String);
    assert_eq!(AttrType::from_str("boolean").unwrap(), AttrType::Boolean);
    assert_eq!(AttrType::from_str("date").unwrap(), AttrType::Date);
    assert_eq!(AttrType::from_str("json").unwrap(), AttrType::Json);
}

#[test]
fn attr_type_rejects_unknown_names() {
    let err = AttrType::from_str("decimal").unwrap_err();
    assert!(err.to_string().contains("decimal"));
}

#[test]
fn attr_type_display_matches_serde() {
    for ty in [AttrType::Number, AttrType::String, AttrType::Boolean, AttrType::Date, AttrType::Json] {
        let serialized = serde_json::to_string(&ty).unwrap();
        assert_eq!(serialized, format!("\"{ty}\""));
    }
}

// ── Accessors ────────────────────────────────────────────────────

#[test]
fn accessors_match_variant() {
    assert_eq!(AttrValue::Number(2.5).as_f64(), Some(2.5));
    assert_eq!(AttrValue::from("x").as_str(), Some("x"));
    assert_eq!(AttrValue::Boolean(true).as_bool(), Some(true));
    assert_eq!(AttrValue::Json(json!([1])).as_json(), Some(&json!([1])));
    assert!(AttrValue::Null.is_null());
    assert!(AttrValue::default().is_null());
}

#[test]
fn accessors_return_none_for_other_variants() {
    let v = AttrValue::String("1".into());
    assert_eq!(v.as_f64(), None);
    assert_eq!(v.as_bool(), None);
    assert!(v.as_date().is_none());
    assert!(v.as_json().is_none());
}

// ── JSON conversion ──────────────────────────────────────────────

#[test]
fn to_json_converts_each_variant() {
    let date = Utc.with_ymd_and_hms(2021, 5, 6, 0, 0, 0).unwrap();
    assert_eq!(AttrValue::Null.to_json(), json!(null));
    assert_eq!(AttrValue::Number(123.0).to_json(), json!(123));
    assert_eq!(AttrValue::Number(f64::NAN).to_json(), json!(null));
    assert_eq!(AttrValue::from("a").to_json(), json!("a"));
    assert_eq!(AttrValue::Boolean(false).to_json(), json!(false));
    assert_eq!(AttrValue::Date(date).to_json(), json!("2021-05-06T00:00:00"));
    assert_eq!(AttrValue::InvalidDate.to_json(), json!("Invalid date"));
    assert_eq!(AttrValue::Json(json!({"k": 1})).to_json(), json!({"k": 1}));
}

#[test]
fn to_json_with_custom_date_format() {
    let date = Utc.with_ymd_and_hms(2024, 7, 3, 14, 4, 13).unwrap();
    assert_eq!(AttrValue::Date(date).to_json_with("%d.%m.%Y"), json!("03.07.2024"));
}

#[test]
fn serialize_uses_json_form() {
    let s = serde_json::to_string(&AttrValue::Number(7.0)).unwrap();
    assert_eq!(s, "7");
}

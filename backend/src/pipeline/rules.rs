//! Text heuristics and business rules applied around the engine calls.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use shared::{DocumentType, FieldValue};
use std::collections::BTreeMap;

pub const GSTIN_CHECK: &str = "GSTIN Format";
pub const AMOUNT_CHECK: &str = "Amount Sanity Check";

pub const CHECK_OK: &str = "✅ OK";
pub const GSTIN_INVALID: &str = "❌ Invalid";
pub const AMOUNT_OUT_OF_RANGE: &str = "❌ Amount seems unusually high or low.";
pub const AMOUNT_UNPARSABLE: &str = "⚠️ Could not parse amount.";

pub const RISK_INSUFFICIENT: &str = "N/A - Insufficient data for analysis.";
pub const RISK_FAILED: &str = "Error: Could not perform AI analysis.";

lazy_static! {
    static ref AMOUNT_LINE: Regex =
        Regex::new(r"(?i)(total|amount|total amount|net amount)[\s:₹]*([\d,]+\.\d{2})").expect("amount line regex");
    static ref GSTIN: Regex =
        Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z]{1}[1-9A-Z]{1}Z[0-9A-Z]{1}$").expect("gstin regex");
}

/// Appends a normalized `TOTAL AMOUNT:` line when the text carries a
/// recognizable total, so classification and extraction see one form.
pub fn append_amount_hint(text: &str) -> String {
    match AMOUNT_LINE.captures(text).and_then(|caps| caps.get(2)) {
        Some(amount) => format!("{}\nTOTAL AMOUNT: {}\n", text, amount.as_str()),
        None => text.to_string(),
    }
}

/// Keyword classifier. Strong two-keyword matches come first; the order of
/// the rules decides ties.
pub fn classify_text(text: &str) -> (DocumentType, f64) {
    let lower = text.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    if has("invoice number") && has("total amount") {
        (DocumentType::Invoice, 0.98)
    } else if has("claim form") && has("policy number") {
        (DocumentType::ClaimForm, 0.97)
    } else if has("inspection report") && has("vehicle details") {
        (DocumentType::InspectionReport, 0.96)
    } else if has("invoice") || has("bill") {
        (DocumentType::Invoice, 0.85)
    } else if has("claim") {
        (DocumentType::ClaimForm, 0.82)
    } else if has("inspection report") || has("vehicle inspection") {
        (DocumentType::InspectionReport, 0.86)
    } else {
        (DocumentType::Unknown, 0.40)
    }
}

/// Parses engine extraction output into typed fields.
///
/// Models like to wrap JSON in markdown fences; those are stripped. Anything
/// but a JSON object is an error.
pub fn parse_extraction(raw: &str) -> Result<BTreeMap<String, FieldValue>, String> {
    let cleaned = raw.trim().replace("```json", "").replace("```", "");
    let value: Value = serde_json::from_str(cleaned.trim()).map_err(|e| e.to_string())?;
    match value {
        Value::Object(map) => Ok(map.into_iter().map(|(key, value)| (key, field_value(value))).collect()),
        other => Err(format!("expected a JSON object, got {}", other)),
    }
}

fn field_value(value: Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
        Value::String(text) => FieldValue::Text(text),
        Value::Bool(flag) => FieldValue::Text(flag.to_string()),
        Value::Array(items) => FieldValue::List(
            items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(|item| match item {
                    Value::String(text) => text,
                    other => other.to_string(),
                })
                .collect(),
        ),
        other @ Value::Object(_) => FieldValue::Text(other.to_string()),
    }
}

pub fn validate_fields(fields: &BTreeMap<String, FieldValue>, amount_ceiling: f64) -> BTreeMap<String, String> {
    let mut results = BTreeMap::new();

    if let Some(gstin) = fields.get("GSTIN").filter(|v| !v.is_blank()).and_then(FieldValue::as_text) {
        let outcome = if GSTIN.is_match(&gstin) { CHECK_OK } else { GSTIN_INVALID };
        results.insert(GSTIN_CHECK.to_string(), outcome.to_string());
    }

    if let Some(amount) = fields.get("Total Amount").filter(|v| !matches!(v, FieldValue::Null)) {
        let outcome = match amount.as_amount() {
            Some(value) if value > 0.0 && value < amount_ceiling => CHECK_OK,
            Some(_) => AMOUNT_OUT_OF_RANGE,
            None => AMOUNT_UNPARSABLE,
        };
        results.insert(AMOUNT_CHECK.to_string(), outcome.to_string());
    }

    results
}

/// What the risk step can work with.
#[derive(Debug, PartialEq)]
pub enum RiskInput {
    Insufficient,
    Unparsable,
    Ready { vendor: String, amount: f64 },
}

pub fn risk_input(fields: &BTreeMap<String, FieldValue>) -> RiskInput {
    let vendor = fields.get("Vendor Name").filter(|v| !v.is_blank()).and_then(FieldValue::as_text);
    let amount = fields.get("Total Amount").filter(|v| !v.is_blank());
    match (vendor, amount) {
        (Some(vendor), Some(amount)) => match amount.as_amount() {
            Some(amount) => RiskInput::Ready { vendor, amount },
            None => RiskInput::Unparsable,
        },
        _ => RiskInput::Insufficient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, FieldValue)]) -> BTreeMap<String, FieldValue> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn amount_hint_is_appended_once() {
        let text = "ACME TRADERS\nNet Amount: ₹ 12,500.00\nThank you";
        let hinted = append_amount_hint(text);
        assert!(hinted.starts_with(text));
        assert!(hinted.ends_with("\nTOTAL AMOUNT: 12,500.00\n"));
        assert_eq!(append_amount_hint("no figures here"), "no figures here");
        assert_eq!(append_amount_hint("Total: 500"), "Total: 500");
    }

    #[test]
    fn classification_table() {
        let cases = [
            ("INVOICE NUMBER 7\nTOTAL AMOUNT: 10.00", DocumentType::Invoice, 0.98),
            ("Claim Form\nPolicy Number P-1", DocumentType::ClaimForm, 0.97),
            ("Inspection Report\nVehicle Details", DocumentType::InspectionReport, 0.96),
            ("Electricity bill", DocumentType::Invoice, 0.85),
            ("Claim ref 4", DocumentType::ClaimForm, 0.82),
            ("Vehicle inspection notes", DocumentType::InspectionReport, 0.86),
            ("lorem ipsum", DocumentType::Unknown, 0.40),
        ];
        for (text, doc_type, confidence) in cases {
            assert_eq!(classify_text(text), (doc_type, confidence), "{text}");
        }
    }

    #[test]
    fn extraction_output_tolerates_fences() {
        let raw = "```json\n{\"Vendor Name\": \"Acme\", \"Total Amount\": 1250.5, \"GSTIN\": null, \
                   \"Damages Observed\": [\"dent\", \"scratch\"], \"Paid\": true}\n```";
        let parsed = parse_extraction(raw).unwrap();
        assert_eq!(parsed["Vendor Name"], FieldValue::Text("Acme".into()));
        assert_eq!(parsed["Total Amount"], FieldValue::Number(1250.5));
        assert_eq!(parsed["GSTIN"], FieldValue::Null);
        assert_eq!(parsed["Damages Observed"], FieldValue::List(vec!["dent".into(), "scratch".into()]));
        assert_eq!(parsed["Paid"], FieldValue::Text("true".into()));
    }

    #[test]
    fn extraction_output_must_be_an_object() {
        assert!(parse_extraction("Sorry, I cannot help with that.").is_err());
        assert!(parse_extraction("[1, 2]").is_err());
    }

    #[test]
    fn gstin_rule() {
        let ok = validate_fields(&fields(&[("GSTIN", FieldValue::Text("27ABCDE1234F1Z5".into()))]), 1e6);
        assert_eq!(ok[GSTIN_CHECK], CHECK_OK);
        let bad = validate_fields(&fields(&[("GSTIN", FieldValue::Text("27abcde1234f1z5".into()))]), 1e6);
        assert_eq!(bad[GSTIN_CHECK], GSTIN_INVALID);
        let absent = validate_fields(&fields(&[("GSTIN", FieldValue::Text(" ".into()))]), 1e6);
        assert!(!absent.contains_key(GSTIN_CHECK));
    }

    #[test]
    fn amount_rule() {
        let check = |value: FieldValue| validate_fields(&fields(&[("Total Amount", value)]), 1_000_000.0);
        assert_eq!(check(FieldValue::Text("Rs. 45,000".into()))[AMOUNT_CHECK], CHECK_OK);
        assert_eq!(check(FieldValue::Number(0.0))[AMOUNT_CHECK], AMOUNT_OUT_OF_RANGE);
        assert_eq!(check(FieldValue::Number(1_000_000.0))[AMOUNT_CHECK], AMOUNT_OUT_OF_RANGE);
        assert_eq!(check(FieldValue::Text("twelve".into()))[AMOUNT_CHECK], AMOUNT_UNPARSABLE);
        assert!(check(FieldValue::Null).is_empty());
    }

    #[test]
    fn risk_needs_vendor_and_amount() {
        assert_eq!(risk_input(&fields(&[])), RiskInput::Insufficient);
        assert_eq!(
            risk_input(&fields(&[("Total Amount", FieldValue::Number(10.0))])),
            RiskInput::Insufficient
        );
        assert_eq!(
            risk_input(&fields(&[
                ("Vendor Name", FieldValue::Text("Acme".into())),
                ("Total Amount", FieldValue::Text("n/a".into())),
            ])),
            RiskInput::Unparsable
        );
        assert_eq!(
            risk_input(&fields(&[
                ("Vendor Name", FieldValue::Text("Acme".into())),
                ("Total Amount", FieldValue::Text("1,200.00".into())),
            ])),
            RiskInput::Ready { vendor: "Acme".into(), amount: 1200.0 }
        );
    }
}

use std::collections::BTreeMap;

use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{Display as LabelDisplay, EnumIter, EnumString, IntoStaticStr};

/// Document classes the extraction service knows about.
///
/// Wire labels are the human-readable ones (`"Inspection Report"`); the
/// compact variant names are accepted on input as well. Anything else decodes
/// to [`DocumentType::Unknown`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, LabelDisplay, EnumString, EnumIter,
    IntoStaticStr,
)]
pub enum DocumentType {
    #[strum(to_string = "Invoice")]
    Invoice,
    #[strum(to_string = "Inspection Report", serialize = "InspectionReport")]
    InspectionReport,
    #[strum(to_string = "Claim Form", serialize = "ClaimForm")]
    ClaimForm,
    #[strum(to_string = "Unknown Document", serialize = "Unknown")]
    Unknown,
}

impl DocumentType {
    pub fn label(self) -> &'static str {
        self.into()
    }

    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim().parse().unwrap_or(DocumentType::Unknown)
    }
}

impl Serialize for DocumentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for DocumentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(DocumentType::parse_lenient(&raw))
    }
}

/// Triage outcome reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, LabelDisplay, EnumString, IntoStaticStr)]
pub enum ProcessingStatus {
    #[strum(to_string = "Processing Complete", serialize = "Finalized")]
    Finalized,
    #[strum(to_string = "Sent to Review Queue", serialize = "PendingReview")]
    PendingReview,
}

impl ProcessingStatus {
    pub fn label(self) -> &'static str {
        self.into()
    }
}

impl Serialize for ProcessingStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ProcessingStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("unrecognized processing status \"{}\"", raw))
        })
    }
}

/// A single extracted value. Shapes vary by document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Number(_) => false,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }

    /// Numeric reading of the value, tolerating currency marks and digit grouping.
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(text) => parse_amount(text),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Number(n) => Some(format_plain_number(*n)),
            FieldValue::Text(text) => Some(text.clone()),
            FieldValue::List(items) => Some(items.join(", ")),
        }
    }
}

/// Parses `"₹ 1,20,000.50"`, `"Rs. 450"` and similar into a number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw
        .replace('₹', "")
        .replace("Rs.", "")
        .replace(',', "");
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_plain_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Confidence rounded to the nearest whole percent, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[display(fmt = "{}%", _0)]
pub struct Percent(pub u8);

impl Percent {
    pub fn from_ratio(ratio: f64) -> Self {
        let clamped = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
        Percent((clamped * 100.0).round() as u8)
    }
}

/// Output of submitting one document. Never mutated after decoding; a
/// re-submission produces a new value that supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub filename: String,
    #[serde(rename = "ocr_text", default, deserialize_with = "null_as_default")]
    pub raw_text: String,
    #[serde(rename = "doc_type")]
    pub document_type: DocumentType,
    pub confidence: f64,
    pub status: ProcessingStatus,
    #[serde(rename = "extracted_data", default, deserialize_with = "null_as_default")]
    pub extracted_fields: BTreeMap<String, FieldValue>,
    #[serde(rename = "validation_results", default, deserialize_with = "null_as_default")]
    pub validation_checks: BTreeMap<String, String>,
    #[serde(rename = "risk_analysis", default, deserialize_with = "null_as_default")]
    pub risk_narrative: String,
}

impl ProcessingResult {
    pub fn confidence_percent(&self) -> Percent {
        Percent::from_ratio(self.confidence)
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.extracted_fields.get(name).filter(|value| !value.is_blank())
    }
}

/// A document parked for human correction. `filename` is the only
/// correlation key between the queue and a re-submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewQueueEntry {
    pub filename: String,
    #[serde(rename = "ai_guess")]
    pub model_guess: DocumentType,
    #[serde(rename = "confidence")]
    pub model_confidence: String,
}

impl ReviewQueueEntry {
    pub fn new(filename: impl Into<String>, model_guess: DocumentType, confidence: f64) -> Self {
        Self {
            filename: filename.into(),
            model_guess,
            model_confidence: Percent::from_ratio(confidence).to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kpis {
    pub total_docs: u64,
    pub total_invoices: u64,
    pub total_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Charts {
    pub doc_distribution: BTreeMap<String, u64>,
    pub top_vendors: BTreeMap<String, f64>,
}

/// Body of `GET /dashboard-data/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardPayload {
    pub kpis: Kpis,
    pub charts: Charts,
}

/// Aggregate counters and groupings from one refresh. Replaced wholesale,
/// never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub total_documents: u64,
    pub total_invoices: u64,
    pub total_value: f64,
    pub document_type_distribution: BTreeMap<String, u64>,
    pub top_vendors_by_value: BTreeMap<String, f64>,
}

impl DashboardSnapshot {
    /// Vendors ordered by descending value, ties broken by name.
    pub fn vendors_ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .top_vendors_by_value
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    pub fn distribution_ranked(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .document_type_distribution
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

impl From<DashboardPayload> for DashboardSnapshot {
    fn from(payload: DashboardPayload) -> Self {
        Self {
            total_documents: payload.kpis.total_docs,
            total_invoices: payload.kpis.total_invoices,
            total_value: payload.kpis.total_value,
            document_type_distribution: payload.charts.doc_distribution,
            top_vendors_by_value: payload.charts.top_vendors,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

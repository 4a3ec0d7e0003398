//! View model for finalized results.
//!
//! Which fields a result shows is decided by its document type through an
//! exhaustive match, so adding a [`DocumentType`] variant forces a decision
//! here. Validation checks and the risk narrative render the same way for
//! every type.

use crate::classifier::{Triage, classify};
use crate::model::{DocumentType, FieldValue, Percent, ProcessingResult, ProcessingStatus};

pub const NOT_AVAILABLE: &str = "N/A";
pub const FALLBACK_NOTICE: &str = "No extraction profile for this document type.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Currency,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Spans the full row in the grid.
    pub wide: bool,
}

const fn field(key: &'static str, kind: FieldKind, wide: bool) -> FieldSpec {
    FieldSpec { key, label: key, kind, wide }
}

const INVOICE_FIELDS: &[FieldSpec] = &[
    field("Vendor Name", FieldKind::Text, false),
    field("Invoice Number", FieldKind::Text, false),
    field("Invoice Date", FieldKind::Text, false),
    field("Total Amount", FieldKind::Currency, false),
    field("GSTIN", FieldKind::Text, true),
];

const INSPECTION_REPORT_FIELDS: &[FieldSpec] = &[
    field("Report ID", FieldKind::Text, false),
    field("Policy Number", FieldKind::Text, false),
    field("Make", FieldKind::Text, false),
    field("Model", FieldKind::Text, false),
    field("Registration No", FieldKind::Text, false),
    field("VIN", FieldKind::Text, false),
    field("Damages Observed", FieldKind::List, true),
];

/// Field projection registered for a document type, if any.
pub fn projection(document_type: DocumentType) -> Option<&'static [FieldSpec]> {
    match document_type {
        DocumentType::Invoice => Some(INVOICE_FIELDS),
        DocumentType::InspectionReport => Some(INSPECTION_REPORT_FIELDS),
        DocumentType::ClaimForm | DocumentType::Unknown => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Projection(&'static [FieldSpec]),
    Fallback,
}

impl Layout {
    pub fn for_type(document_type: DocumentType) -> Self {
        projection(document_type).map_or(Layout::Fallback, Layout::Projection)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Text(String),
    Items(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub label: &'static str,
    pub value: DisplayValue,
    pub wide: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldsView {
    Projected(Vec<FieldView>),
    Fallback(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckView {
    pub name: String,
    pub outcome: CheckOutcome,
    pub detail: String,
}

/// Presentation severity of a risk narrative, from its leading marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskSeverity {
    Positive,
    Caution,
    Unknown,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskView {
    pub severity: RiskSeverity,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Primary,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultBody {
    Details {
        risk: RiskView,
        fields: FieldsView,
        checks: Vec<CheckView>,
    },
    ReviewDirective(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub filename: String,
    pub document_type: DocumentType,
    pub confidence: Percent,
    pub status: ProcessingStatus,
    pub status_tone: StatusTone,
    pub body: ResultBody,
    /// Always carried, even when details are suppressed.
    pub raw_text: String,
}

pub fn render(result: &ProcessingResult) -> ResultView {
    let (body, status_tone) = match classify(result) {
        Triage::Finalized { layout } => (
            ResultBody::Details {
                risk: render_risk(&result.risk_narrative),
                fields: render_fields(result, layout),
                checks: render_checks(result),
            },
            StatusTone::Primary,
        ),
        Triage::PendingReview { directive } => {
            (ResultBody::ReviewDirective(directive), StatusTone::Warning)
        }
    };

    ResultView {
        filename: result.filename.clone(),
        document_type: result.document_type,
        confidence: result.confidence_percent(),
        status: result.status,
        status_tone,
        body,
        raw_text: result.raw_text.clone(),
    }
}

pub fn render_fields(result: &ProcessingResult, layout: Layout) -> FieldsView {
    let specs = match layout {
        Layout::Projection(specs) => specs,
        Layout::Fallback => return FieldsView::Fallback(FALLBACK_NOTICE),
    };

    let fields = specs
        .iter()
        .map(|spec| FieldView {
            label: spec.label,
            value: display_value(spec.kind, result.field(spec.key)),
            wide: spec.wide,
        })
        .collect();
    FieldsView::Projected(fields)
}

fn display_value(kind: FieldKind, value: Option<&FieldValue>) -> DisplayValue {
    match kind {
        FieldKind::List => {
            let items = match value {
                Some(FieldValue::List(items)) => items
                    .iter()
                    .map(|item| item.trim())
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
                Some(other) => other.as_text().into_iter().collect(),
                None => Vec::new(),
            };
            DisplayValue::Items(items)
        }
        FieldKind::Currency => {
            let text = match value {
                Some(v) => match v.as_amount() {
                    Some(amount) if amount != 0.0 => format_inr(amount),
                    Some(_) => NOT_AVAILABLE.to_string(),
                    None => v.as_text().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                },
                None => NOT_AVAILABLE.to_string(),
            };
            DisplayValue::Text(text)
        }
        FieldKind::Text => DisplayValue::Text(
            value
                .and_then(FieldValue::as_text)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
    }
}

pub fn classify_check(outcome: &str) -> CheckOutcome {
    if outcome.contains("OK") {
        CheckOutcome::Pass
    } else {
        CheckOutcome::Fail
    }
}

pub fn render_checks(result: &ProcessingResult) -> Vec<CheckView> {
    result
        .validation_checks
        .iter()
        .map(|(name, outcome)| CheckView {
            name: name.clone(),
            outcome: classify_check(outcome),
            detail: outcome.replace("✅ OK", "").replace("❌ ", "").trim().to_string(),
        })
        .collect()
}

pub fn classify_risk(narrative: &str) -> RiskSeverity {
    let text = narrative.trim_start();
    if text.starts_with('✅') {
        RiskSeverity::Positive
    } else if text.starts_with('⚠') {
        RiskSeverity::Caution
    } else if text.starts_with('❓') || text.starts_with("N/A") {
        RiskSeverity::Unknown
    } else {
        RiskSeverity::Neutral
    }
}

pub fn render_risk(narrative: &str) -> RiskView {
    let text = narrative.trim();
    RiskView {
        severity: classify_risk(text),
        text: if text.is_empty() { NOT_AVAILABLE.to_string() } else { text.to_string() },
    }
}

/// Formats an amount with Indian digit grouping: `₹ 12,34,567.5`.
pub fn format_inr(amount: f64) -> String {
    let rounded = (amount.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    let fraction = match cents {
        0 => String::new(),
        c if c % 10 == 0 => format!(".{}", c / 10),
        c => format!(".{:02}", c),
    };
    let sign = if amount < 0.0 && (whole > 0 || cents > 0) { "-" } else { "" };
    format!("{}₹ {}{}", sign, grouped, fraction)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::model::{Charts, Kpis};
use shared::{DashboardPayload, DocumentType, FieldValue};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{StoreError, load_or_quarantine, write_json};

const NOT_AVAILABLE: &str = "N/A";

/// One finalized document as the dashboard sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub doc_type: DocumentType,
    pub vendor_name: String,
    pub total_amount: f64,
    pub invoice_date: String,
    pub content_sha256: String,
}

impl LedgerRecord {
    pub fn new(doc_type: DocumentType, fields: &BTreeMap<String, FieldValue>, content: &[u8]) -> Self {
        let text_field = |name: &str| {
            fields
                .get(name)
                .filter(|value| !value.is_blank())
                .and_then(FieldValue::as_text)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            doc_type,
            vendor_name: text_field("Vendor Name"),
            total_amount: fields
                .get("Total Amount")
                .and_then(FieldValue::as_amount)
                .unwrap_or(0.0),
            invoice_date: text_field("Invoice Date"),
            content_sha256: content_hash(content),
        }
    }
}

pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Append-only log of processed documents, persisted as a JSON array.
pub struct Ledger {
    path: PathBuf,
    records: Mutex<Vec<LedgerRecord>>,
}

impl Ledger {
    /// Fails only when an unreadable ledger cannot be moved aside.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records: Vec<LedgerRecord> = load_or_quarantine(&path, "ledger")?;
        log::info!("Ledger loaded with {} records", records.len());
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub async fn append(&self, record: LedgerRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        records.push(record);
        if let Err(e) = write_json(&self.path, records.as_slice()).await {
            records.pop();
            return Err(e);
        }
        if let Some(last) = records.last() {
            log::info!(
                "Recorded {} from {} ({})",
                last.doc_type,
                last.vendor_name,
                last.total_amount
            );
        }
        Ok(())
    }

    pub async fn dashboard(&self, top_vendor_limit: usize) -> DashboardPayload {
        summarize(&self.records.lock().await, top_vendor_limit)
    }
}

pub fn summarize(records: &[LedgerRecord], top_vendor_limit: usize) -> DashboardPayload {
    let mut distribution: BTreeMap<String, u64> = BTreeMap::new();
    let mut vendor_totals: HashMap<&str, f64> = HashMap::new();
    let mut total_value = 0.0;
    let mut total_invoices = 0;

    for record in records {
        *distribution.entry(record.doc_type.to_string()).or_default() += 1;
        *vendor_totals.entry(record.vendor_name.as_str()).or_default() += record.total_amount;
        total_value += record.total_amount;
        if record.doc_type == DocumentType::Invoice {
            total_invoices += 1;
        }
    }

    let mut ranked: Vec<(&str, f64)> = vendor_totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let top_vendors = ranked
        .into_iter()
        .take(top_vendor_limit)
        .map(|(name, total)| (name.to_string(), total))
        .collect();

    DashboardPayload {
        kpis: Kpis {
            total_docs: records.len() as u64,
            total_invoices,
            total_value,
        },
        charts: Charts {
            doc_distribution: distribution,
            top_vendors,
        },
    }
}

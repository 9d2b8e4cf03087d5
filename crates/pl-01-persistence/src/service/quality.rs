//! # Farm Store Service - Quality
//!
//! Quality checks, the issues opened by failed ones, and compliance.

use super::helpers::{insert_ops, put_ops, read_doc, scan_store};
use super::*;
use crate::domain::summaries::ComplianceReport;
use crate::domain::validation::decode_records;
use serde_json::Value;
use shared_schema::{
    from_document, to_document, CheckResult, IssueStatus, QualityCheck, QualityCheckDraft,
    QualityIssue, RecordKey, Severity,
};

/// Inspector recorded when the caller names none.
const DEFAULT_INSPECTOR: &str = "system";

impl<O, TS> FarmStore<O, TS>
where
    O: StoreOpener,
    TS: TimeSource,
{
    pub async fn record_quality_check(
        &self,
        draft: QualityCheckDraft,
    ) -> Result<QualityCheck, StoreError> {
        let now = self.now_iso();
        let check = QualityCheck {
            id: RecordKey::Int(self.next_id()),
            kind: draft.kind,
            value: draft.value,
            result: draft.result,
            description: draft.description,
            date: now.clone(),
            inspector: Some(
                draft
                    .inspector
                    .unwrap_or_else(|| DEFAULT_INSPECTOR.to_string()),
            ),
        };

        // Fresh ids, so there is no previous version to unindex.
        let mut ops = insert_ops(StoreName::QualityChecks, &check.id, &to_document(&check)?)?;
        let issue = (check.result == CheckResult::Fail).then(|| QualityIssue {
            id: RecordKey::Int(self.next_id()),
            title: format!("Failed {} check", check.kind),
            description: check
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("Value: {}", display_value(&check.value))),
            severity: Severity::High,
            date: now,
            status: IssueStatus::Open,
            resolved_at: None,
            check_id: Some(check.id.clone()),
        });
        if let Some(issue) = &issue {
            ops.extend(insert_ops(
                StoreName::QualityIssues,
                &issue.id,
                &to_document(issue)?,
            )?);
        }

        let backend = self.backend().await?;
        backend.write().atomic_batch_write(ops)?;

        match &issue {
            Some(issue) => tracing::warn!(
                check = %check.id,
                issue = %issue.id,
                "[pl-01] ⚠️ Quality check '{}' failed, issue opened",
                check.kind
            ),
            None => tracing::info!(check = %check.id, "[pl-01] ✅ Quality check '{}' passed", check.kind),
        }
        Ok(check)
    }

    pub async fn resolve_quality_issue(
        &self,
        issue_id: &RecordKey,
    ) -> Result<QualityIssue, StoreError> {
        let backend = self.backend().await?;
        let mut kv = backend.write();

        let mut doc = read_doc(&*kv, StoreName::QualityIssues, issue_id)?.ok_or_else(|| {
            StoreError::RecordNotFound {
                store: StoreName::QualityIssues,
                key: issue_id.clone(),
            }
        })?;
        doc.insert("status".into(), Value::from(IssueStatus::Resolved.as_str()));
        doc.insert("resolvedAt".into(), Value::from(self.now_iso()));
        let issue: QualityIssue = from_document(&doc)?;

        let ops = put_ops(&*kv, StoreName::QualityIssues, issue_id, &doc)?;
        kv.atomic_batch_write(ops)?;
        Ok(issue)
    }

    pub async fn get_compliance(&self) -> Result<ComplianceReport, StoreError> {
        let backend = self.backend().await?;
        let records = scan_store(&*backend.read(), StoreName::QualityChecks)?;
        let checks: Vec<QualityCheck> =
            decode_records(StoreName::QualityChecks, records.into_iter().map(|(_, d)| d))?;
        Ok(ComplianceReport::from_results(checks.iter().map(|c| c.result)))
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

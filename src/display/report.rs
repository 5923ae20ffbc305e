//! Reconciliation report rendering
//!
//! Sections are printed worst first: amount mismatches, transactions only in
//! YNAB, transactions only in the CSV, then the matched count and any rows
//! that had to be skipped.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::ReconcileResult;
use crate::models::{MatchKind, MatchResult, MatchTier, Money, Transaction};
use crate::services::normalize::format_amount;
use crate::services::session::{ReconcileReport, RemoteOrigin};

/// Rendering switches
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// List matched pairs instead of only counting them
    pub show_matched: bool,
}

#[derive(Tabled)]
struct MismatchRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Payee")]
    payee: String,
    #[tabled(rename = "YNAB")]
    remote_amount: String,
    #[tabled(rename = "CSV")]
    imported_amount: String,
    #[tabled(rename = "Difference")]
    delta: String,
    #[tabled(rename = "YNAB id")]
    remote_id: String,
    #[tabled(rename = "CSV line")]
    line: String,
}

#[derive(Tabled)]
struct RemoteRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Payee")]
    payee: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Memo")]
    memo: String,
    #[tabled(rename = "YNAB id")]
    id: String,
}

#[derive(Tabled)]
struct ImportRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Payee")]
    payee: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Memo")]
    memo: String,
    #[tabled(rename = "CSV line")]
    line: String,
}

#[derive(Tabled)]
struct MatchedRow {
    #[tabled(rename = "YNAB date")]
    remote_date: String,
    #[tabled(rename = "CSV date")]
    imported_date: String,
    #[tabled(rename = "YNAB payee")]
    remote_payee: String,
    #[tabled(rename = "CSV payee")]
    imported_payee: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "By")]
    tier: String,
}

#[derive(Tabled)]
struct SkippedRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Row")]
    row: usize,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// Render a report as terminal text
pub fn format_report(report: &ReconcileReport, options: ReportOptions) -> String {
    let places = report.decimal_places;
    let mut output = String::new();

    output.push_str(&format!(
        "Reconciling account {} (budget {}) against {}\n",
        report.account_id, report.budget_id, report.csv_path
    ));
    if report.remote_origin == RemoteOrigin::Cache {
        output.push_str(&format!(
            "YNAB transactions from cache, fetched {}\n",
            report.remote_fetched_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    output.push('\n');

    let mismatches: Vec<MismatchRow> = of_kind(&report.results, MatchKind::AmountMismatch)
        .filter_map(|r| Some((r.remote()?, r.imported()?)))
        .map(|(remote, imported)| MismatchRow {
            date: imported.date.format("%Y-%m-%d").to_string(),
            payee: display_payee(imported),
            remote_amount: format_amount(remote.amount, places),
            imported_amount: format_amount(imported.amount, places),
            delta: format_amount(imported.amount - remote.amount, places),
            remote_id: remote.id.clone().unwrap_or_default(),
            line: line_label(imported),
        })
        .collect();
    push_section(&mut output, MatchKind::AmountMismatch, mismatches);

    let remote_only: Vec<RemoteRow> = of_kind(&report.results, MatchKind::RemoteOnly)
        .filter_map(MatchResult::remote)
        .map(|txn| RemoteRow {
            date: txn.date.format("%Y-%m-%d").to_string(),
            payee: display_payee(txn),
            amount: format_amount(txn.amount, places),
            memo: txn.memo.clone().unwrap_or_default(),
            id: txn.id.clone().unwrap_or_default(),
        })
        .collect();
    push_section(&mut output, MatchKind::RemoteOnly, remote_only);

    let import_only: Vec<ImportRow> = of_kind(&report.results, MatchKind::ImportOnly)
        .filter_map(MatchResult::imported)
        .map(|txn| ImportRow {
            date: txn.date.format("%Y-%m-%d").to_string(),
            payee: display_payee(txn),
            amount: format_amount(txn.amount, places),
            memo: txn.memo.clone().unwrap_or_default(),
            line: line_label(txn),
        })
        .collect();
    push_section(&mut output, MatchKind::ImportOnly, import_only);

    if options.show_matched {
        let matched: Vec<MatchedRow> = of_kind(&report.results, MatchKind::Matched)
            .filter_map(|r| Some((r.remote()?, r.imported()?, r.tier())))
            .map(|(remote, imported, tier)| MatchedRow {
                remote_date: remote.date.format("%Y-%m-%d").to_string(),
                imported_date: imported.date.format("%Y-%m-%d").to_string(),
                remote_payee: display_payee(remote),
                imported_payee: display_payee(imported),
                amount: format_amount(remote.amount, places),
                tier: tier.map(tier_label).unwrap_or_default().to_string(),
            })
            .collect();
        push_section(&mut output, MatchKind::Matched, matched);
    }

    output.push_str(&format_summary(report));

    if !report.skipped.is_empty() {
        output.push('\n');
        output.push_str(&format!("Skipped records ({}):\n", report.skipped.len()));
        let rows = report.skipped.iter().map(|s| SkippedRow {
            source: s.source.to_string(),
            row: s.row,
            reason: s.reason.clone(),
        });
        output.push_str(&Table::new(rows).with(Style::psql()).to_string());
        output.push('\n');
    }

    output
}

/// Render the summary lines
pub fn format_summary(report: &ReconcileReport) -> String {
    let places = report.decimal_places;
    let s = &report.summary;
    let mut output = String::new();

    output.push_str(&format!("Matched:          {}\n", s.matched));
    output.push_str(&format!(
        "Amount mismatch:  {} (net {})\n",
        s.amount_mismatch,
        signed(s.mismatch_delta, places)
    ));
    output.push_str(&format!(
        "Only in YNAB:     {} (net {})\n",
        s.remote_only,
        signed(s.remote_only_total, places)
    ));
    output.push_str(&format!(
        "Only in CSV:      {} (net {})\n",
        s.import_only,
        signed(s.import_only_total, places)
    ));

    if s.is_clean() {
        output.push_str("\nEverything reconciles.\n");
    }

    output
}

/// Render a report as pretty JSON
pub fn format_json(report: &ReconcileReport) -> ReconcileResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn of_kind(results: &[MatchResult], kind: MatchKind) -> impl Iterator<Item = &MatchResult> {
    results.iter().filter(move |r| r.kind() == kind)
}

fn push_section<T: Tabled>(output: &mut String, kind: MatchKind, rows: Vec<T>) {
    if rows.is_empty() {
        return;
    }
    output.push_str(&format!("{} ({}):\n", kind, rows.len()));
    output.push_str(&Table::new(rows).with(Style::psql()).to_string());
    output.push_str("\n\n");
}

fn display_payee(txn: &Transaction) -> String {
    if txn.payee.is_empty() {
        "(no payee)".to_string()
    } else {
        txn.payee.clone()
    }
}

fn line_label(txn: &Transaction) -> String {
    txn.line.map(|l| l.to_string()).unwrap_or_default()
}

fn tier_label(tier: MatchTier) -> &'static str {
    match tier {
        MatchTier::ExactKey => "reference",
        MatchTier::AmountDate => "amount/date",
        MatchTier::AmountMismatch => "payee/date",
    }
}

fn signed(amount: Money, places: u32) -> String {
    let text = format_amount(amount, places);
    if amount.is_negative() || amount.is_zero() {
        text
    } else {
        format!("+{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::matcher::{MatchConfig, ReconciliationMatcher};
    use crate::services::normalize::SkippedRecord;
    use crate::models::Source;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_report() -> ReconcileReport {
        let remote = vec![
            Transaction::remote("r-coffee", date("2024-01-01"), Money::from_minor(-500), "Coffee"),
            Transaction::remote("r-rent", date("2024-01-03"), Money::from_minor(-20000), "Rent")
                .at_position(1),
            Transaction::remote("r-gym", date("2024-01-10"), Money::from_minor(-1000), "Gym")
                .at_position(2),
        ];
        let imported = vec![
            Transaction::imported(date("2024-01-02"), Money::from_minor(-500), "COFFEE SHOP")
                .at_line(2),
            Transaction::imported(date("2024-01-03"), Money::from_minor(-21000), "RENT LLC")
                .at_position(1)
                .at_line(3),
            Transaction::imported(date("2024-02-01"), Money::from_minor(-350), "Bookshop")
                .with_memo("novel")
                .at_position(2)
                .at_line(5),
        ];
        let reconciliation =
            ReconciliationMatcher::new(MatchConfig::default()).reconcile(&remote, &imported);

        ReconcileReport {
            budget_id: "b1".into(),
            account_id: "a1".into(),
            csv_path: "bank.csv".into(),
            remote_origin: RemoteOrigin::Api,
            remote_fetched_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            date_window_days: 3,
            decimal_places: 2,
            summary: reconciliation.summary(),
            results: reconciliation.into_results(),
            skipped: vec![SkippedRecord {
                source: Source::Imported,
                row: 4,
                reason: "Could not parse date: 'soon'".into(),
            }],
        }
    }

    #[test]
    fn test_sections_in_order() {
        let text = format_report(&sample_report(), ReportOptions::default());

        let mismatch = text.find("Amount mismatch (1):").unwrap();
        let remote = text.find("Only in YNAB (1):").unwrap();
        let import = text.find("Only in CSV (1):").unwrap();
        let summary = text.find("Matched:").unwrap();
        let skipped = text.find("Skipped records (1):").unwrap();
        assert!(mismatch < remote && remote < import && import < summary && summary < skipped);
    }

    #[test]
    fn test_rows_carry_identifying_fields() {
        let text = format_report(&sample_report(), ReportOptions::default());

        assert!(text.contains("-200.00"));
        assert!(text.contains("-210.00"));
        assert!(text.contains("-10.00"));
        assert!(text.contains("r-rent"));
        assert!(text.contains("r-gym"));
        assert!(text.contains("novel"));
        assert!(text.contains("Could not parse date: 'soon'"));
    }

    #[test]
    fn test_matched_detail_is_opt_in() {
        let report = sample_report();

        let hidden = format_report(&report, ReportOptions::default());
        assert!(!hidden.contains("COFFEE SHOP"));
        assert!(hidden.contains("Matched:          1"));

        let shown = format_report(&report, ReportOptions { show_matched: true });
        assert!(shown.contains("Matched (1):"));
        assert!(shown.contains("COFFEE SHOP"));
        assert!(shown.contains("amount/date"));
    }

    #[test]
    fn test_summary_totals() {
        let summary = format_summary(&sample_report());
        assert!(summary.contains("Amount mismatch:  1 (net -10.00)"));
        assert!(summary.contains("Only in YNAB:     1 (net -10.00)"));
        assert!(summary.contains("Only in CSV:      1 (net -3.50)"));
        assert!(!summary.contains("Everything reconciles"));
    }

    #[test]
    fn test_json_output() {
        let json = format_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["matched"], 1);
        assert_eq!(value["results"][0]["kind"], "matched");
        assert_eq!(value["results"][0]["tier"], "amount_date");
        assert_eq!(value["skipped"][0]["row"], 4);
        assert_eq!(value["remote_origin"], "api");
    }

    #[test]
    fn test_signed_amounts() {
        assert_eq!(signed(Money::from_minor(1234), 2), "+12.34");
        assert_eq!(signed(Money::from_minor(-5), 2), "-0.05");
        assert_eq!(signed(Money::zero(), 2), "0.00");
    }
}

use crate::harvest::HarvestSummary;
use crate::report::style::{autofit_columns, style_header_row};
use crate::report::ReportError;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use umya_spreadsheet::Spreadsheet;

/// File name of the merged report, relative to the save directory
pub const REPORT_FILE_NAME: &str = "results.xlsx";

const MATCH_COLUMNS: [&str; 9] = [
    "Community link",
    "Name",
    "Post link",
    "Text",
    "Matched keywords",
    "Date",
    "Views",
    "Likes",
    "Reposts",
];

const UNMATCHED_COLUMNS: [&str; 3] = ["Link", "Name", "Reason"];

/// Merges a harvest summary into the report workbook
///
/// The run lands in a sheet named after `run_date` (`dd.mm.yyyy`), with a
/// companion `unmatched` sheet when some targets produced nothing. If a
/// report already exists and `previous_hash` matches `current_hash`, the
/// existing workbook is extended and any sheets from an earlier run on the
/// same date are replaced. A changed or unknown hash supersedes the whole
/// workbook instead.
///
/// # Returns
///
/// The path of the written report file.
pub fn merge(
    save_dir: &Path,
    run_date: NaiveDate,
    summary: &HarvestSummary,
    current_hash: &str,
    previous_hash: Option<&str>,
) -> Result<PathBuf, ReportError> {
    let path = save_dir.join(REPORT_FILE_NAME);
    let extend = path.exists() && previous_hash == Some(current_hash);

    let mut book = if extend {
        tracing::info!("Extending existing report at {}", path.display());
        umya_spreadsheet::reader::xlsx::read(&path).map_err(|e| ReportError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
    } else {
        tracing::info!("Starting a fresh report at {}", path.display());
        let mut book = umya_spreadsheet::new_file();
        let _ = book.remove_sheet_by_name("Sheet1");
        book
    };

    let date_label = run_date.format("%d.%m.%Y").to_string();
    let unmatched_label = format!("unmatched {date_label}");

    // A re-run on the same date replaces that date's sheets.
    let _ = book.remove_sheet_by_name(&date_label);
    let _ = book.remove_sheet_by_name(&unmatched_label);

    write_match_sheet(&mut book, &date_label, summary)?;
    if !summary.empties.is_empty() {
        write_unmatched_sheet(&mut book, &unmatched_label, summary)?;
    }

    save_atomically(&book, save_dir, &path)?;

    tracing::info!(
        "Report saved: {} match rows, {} unmatched targets",
        summary
            .matched
            .iter()
            .map(|group| group.matches.len())
            .sum::<usize>(),
        summary.empties.len()
    );

    Ok(path)
}

fn write_match_sheet(
    book: &mut Spreadsheet,
    name: &str,
    summary: &HarvestSummary,
) -> Result<(), ReportError> {
    let sheet = book
        .new_sheet(name)
        .map_err(|e| ReportError::Sheet(e.to_string()))?;
    style_header_row(sheet, &MATCH_COLUMNS);

    let mut row = 2u32;
    for group in &summary.matched {
        for result in &group.matches {
            sheet
                .get_cell_mut((1, row))
                .set_value(group.target.original_link.clone());
            sheet
                .get_cell_mut((2, row))
                .set_value(group.target.display_name.clone());
            sheet
                .get_cell_mut((3, row))
                .set_value(result.post_permalink.clone());
            sheet.get_cell_mut((4, row)).set_value(result.text.clone());
            sheet
                .get_cell_mut((5, row))
                .set_value(result.matched_keywords.join("; "));
            sheet
                .get_cell_mut((6, row))
                .set_value(result.formatted_date());
            sheet
                .get_cell_mut((7, row))
                .set_value_number(result.views as f64);
            sheet
                .get_cell_mut((8, row))
                .set_value_number(result.likes as f64);
            sheet
                .get_cell_mut((9, row))
                .set_value_number(result.reposts as f64);
            row += 1;
        }
    }

    autofit_columns(sheet, MATCH_COLUMNS.len() as u32);
    Ok(())
}

fn write_unmatched_sheet(
    book: &mut Spreadsheet,
    name: &str,
    summary: &HarvestSummary,
) -> Result<(), ReportError> {
    let sheet = book
        .new_sheet(name)
        .map_err(|e| ReportError::Sheet(e.to_string()))?;
    style_header_row(sheet, &UNMATCHED_COLUMNS);

    for (index, empty) in summary.empties.iter().enumerate() {
        let row = (index + 2) as u32;
        sheet
            .get_cell_mut((1, row))
            .set_value(empty.target.original_link.clone());
        sheet
            .get_cell_mut((2, row))
            .set_value(empty.target.display_name.clone());
        sheet.get_cell_mut((3, row)).set_value(empty.reason.label());
    }

    autofit_columns(sheet, UNMATCHED_COLUMNS.len() as u32);
    Ok(())
}

/// Writes the workbook next to its destination and renames it into place, so
/// an existing report survives a failed write
fn save_atomically(
    book: &Spreadsheet,
    save_dir: &Path,
    path: &Path,
) -> Result<(), ReportError> {
    let temp_path = save_dir.join(format!(".{REPORT_FILE_NAME}.tmp"));

    umya_spreadsheet::writer::xlsx::write(book, &temp_path).map_err(|e| ReportError::Write {
        path: temp_path.display().to_string(),
        message: e.to_string(),
    })?;

    std::fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::{EmptyOutcome, EmptyReason, TargetMatches};
    use crate::matcher::MatchResult;
    use crate::platform::Platform;
    use crate::resolve::Target;
    use tempfile::TempDir;

    fn target(id: &str) -> Target {
        Target {
            original_link: format!("https://vk.com/{id}"),
            platform: Platform::Vk,
            platform_id: format!("vk_{id}"),
            display_name: id.to_string(),
        }
    }

    fn summary_with_match(text: &str) -> HarvestSummary {
        let t = target("shop");
        HarvestSummary {
            matched: vec![TargetMatches {
                target: t.clone(),
                matches: vec![MatchResult {
                    target: t,
                    post_permalink: "https://vk.com/wall-1_1".to_string(),
                    text: text.to_string(),
                    matched_keywords: vec!["sale".to_string()],
                    timestamp: 1_714_521_600,
                    views: 10,
                    likes: 2,
                    reposts: 1,
                }],
            }],
            empties: vec![EmptyOutcome {
                target: target("ghost"),
                reason: EmptyReason::NoMatches,
            }],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fresh_report_has_date_and_unmatched_sheets() {
        let dir = TempDir::new().unwrap();
        let summary = summary_with_match("sale today");

        let path = merge(dir.path(), date(2024, 5, 1), &summary, "hash-a", None).unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        assert!(book.get_sheet_by_name("Sheet1").is_none());

        let sheet = book.get_sheet_by_name("01.05.2024").unwrap();
        assert_eq!(sheet.get_value((1, 1)), "Community link");
        assert_eq!(sheet.get_value((1, 2)), "https://vk.com/shop");
        assert_eq!(sheet.get_value((3, 2)), "https://vk.com/wall-1_1");
        assert_eq!(sheet.get_value((5, 2)), "sale");
        assert_eq!(sheet.get_value((6, 2)), "01.05.2024 00:00");

        let unmatched = book.get_sheet_by_name("unmatched 01.05.2024").unwrap();
        assert_eq!(unmatched.get_value((1, 2)), "https://vk.com/ghost");
        assert_eq!(unmatched.get_value((3, 2)), "no matches");
    }

    #[test]
    fn test_same_hash_extends_across_dates() {
        let dir = TempDir::new().unwrap();
        let summary = summary_with_match("sale");

        merge(dir.path(), date(2024, 5, 1), &summary, "hash-a", None).unwrap();
        let path = merge(
            dir.path(),
            date(2024, 5, 2),
            &summary,
            "hash-a",
            Some("hash-a"),
        )
        .unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        assert!(book.get_sheet_by_name("01.05.2024").is_some());
        assert!(book.get_sheet_by_name("02.05.2024").is_some());
    }

    #[test]
    fn test_rerun_on_same_date_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let summary = summary_with_match("sale");

        merge(dir.path(), date(2024, 5, 1), &summary, "hash-a", None).unwrap();
        let path = merge(
            dir.path(),
            date(2024, 5, 1),
            &summary,
            "hash-a",
            Some("hash-a"),
        )
        .unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        assert_eq!(book.get_sheet_collection().len(), 2);

        let sheet = book.get_sheet_by_name("01.05.2024").unwrap();
        // one header row and one data row, not doubled
        assert_eq!(sheet.get_highest_row(), 2);
    }

    #[test]
    fn test_changed_hash_supersedes_the_workbook() {
        let dir = TempDir::new().unwrap();
        let summary = summary_with_match("sale");

        merge(dir.path(), date(2024, 5, 1), &summary, "hash-a", None).unwrap();
        let path = merge(
            dir.path(),
            date(2024, 5, 2),
            &summary,
            "hash-b",
            Some("hash-a"),
        )
        .unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        assert!(book.get_sheet_by_name("01.05.2024").is_none());
        assert!(book.get_sheet_by_name("02.05.2024").is_some());
    }

    #[test]
    fn test_run_without_empties_skips_unmatched_sheet() {
        let dir = TempDir::new().unwrap();
        let mut summary = summary_with_match("sale");
        summary.empties.clear();

        let path = merge(dir.path(), date(2024, 5, 1), &summary, "hash-a", None).unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        assert!(book.get_sheet_by_name("unmatched 01.05.2024").is_none());
        assert_eq!(book.get_sheet_collection().len(), 1);
    }
}

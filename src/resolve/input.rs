use crate::resolve::{resolve, TargetSet};
use std::path::Path;
use thiserror::Error;

/// Errors from loading a targets workbook
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to open targets file {path}: {message}")]
    Open { path: String, message: String },

    #[error("Targets file {0} has no sheets")]
    NoSheets(String),
}

/// Loads and resolves targets from a spreadsheet file
///
/// The first sheet is read with the layout `(link, display name)` per row,
/// first row being a header. Rows with fewer than two usable cells are
/// skipped before resolution, and rows whose link no recognizer accepts are
/// dropped silently.
///
/// # Arguments
///
/// * `path` - Path to the xlsx file with the target list
///
/// # Returns
///
/// * `Ok(TargetSet)` - The resolved targets, in file order
/// * `Err(InputError)` - The file could not be opened or has no sheets
pub fn load_targets(path: &Path) -> Result<TargetSet, InputError> {
    let book = umya_spreadsheet::reader::xlsx::read(path).map_err(|e| InputError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let sheet = book
        .get_sheet(&0)
        .ok_or_else(|| InputError::NoSheets(path.display().to_string()))?;

    let mut targets = Vec::new();
    let highest_row = sheet.get_highest_row();

    // Row 1 is the header.
    for row in 2..=highest_row {
        let link = sheet.get_value((1, row)).trim().to_string();
        let name = sheet.get_value((2, row)).trim().to_string();

        if link.is_empty() || name.is_empty() {
            tracing::debug!("Skipping row {}: fewer than two usable cells", row);
            continue;
        }

        match resolve(&link, &name) {
            Some(target) => targets.push(target),
            None => tracing::debug!("Dropping unrecognized link on row {}: {}", row, link),
        }
    }

    tracing::info!(
        "Loaded {} targets from {}",
        targets.len(),
        path.display()
    );

    Ok(TargetSet::new(targets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use tempfile::tempdir;

    fn write_workbook(rows: &[(&str, &str)]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("targets.xlsx");

        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut((1, 1)).set_value("Link");
        sheet.get_cell_mut((2, 1)).set_value("Name");
        for (i, (link, name)) in rows.iter().enumerate() {
            let row = (i + 2) as u32;
            sheet.get_cell_mut((1, row)).set_value(*link);
            sheet.get_cell_mut((2, row)).set_value(*name);
        }
        umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();

        (dir, path)
    }

    #[test]
    fn test_load_targets_resolves_rows() {
        let (_dir, path) = write_workbook(&[
            ("https://vk.com/mygroup", "My Group"),
            ("https://t.me/channel", "Channel"),
            ("https://ok.ru/group/123", "OK Group"),
        ]);

        let set = load_targets(&path).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.targets()[0].platform, Platform::Vk);
        assert_eq!(set.targets()[1].platform, Platform::Tg);
        assert_eq!(set.targets()[2].platform, Platform::Ok);
    }

    #[test]
    fn test_load_targets_skips_incomplete_rows() {
        let (_dir, path) = write_workbook(&[
            ("https://vk.com/mygroup", "My Group"),
            ("", "Name Only"),
            ("https://vk.com/other", ""),
        ]);

        let set = load_targets(&path).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_load_targets_drops_unrecognized_links() {
        let (_dir, path) = write_workbook(&[
            ("https://example.com/nothing", "Nope"),
            ("https://vk.com/real", "Real"),
        ]);

        let set = load_targets(&path).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.targets()[0].platform_id, "vk_real");
    }

    #[test]
    fn test_load_targets_missing_file() {
        let result = load_targets(Path::new("/nonexistent/targets.xlsx"));
        assert!(matches!(result, Err(InputError::Open { .. })));
    }
}

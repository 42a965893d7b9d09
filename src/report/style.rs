use umya_spreadsheet::helper::coordinate::string_from_column_index;
use umya_spreadsheet::{HorizontalAlignmentValues, VerticalAlignmentValues, Worksheet};

/// Steel-blue fill behind header cells
const HEADER_FILL_ARGB: &str = "FF4682B4";

const HEADER_FONT_ARGB: &str = "FFFFFFFF";

/// Columns wider than this stay readable without scrolling sideways
const MAX_COLUMN_WIDTH: f64 = 80.0;

/// Writes and styles the header row: bold white text on a steel-blue fill,
/// centered, with wrapping enabled
pub(crate) fn style_header_row(sheet: &mut Worksheet, columns: &[&str]) {
    for (index, title) in columns.iter().enumerate() {
        let col = (index + 1) as u32;
        sheet.get_cell_mut((col, 1)).set_value(*title);

        let style = sheet.get_style_mut((col, 1));
        style.set_background_color(HEADER_FILL_ARGB);

        let font = style.get_font_mut();
        font.set_bold(true);
        font.get_color_mut().set_argb(HEADER_FONT_ARGB);

        let alignment = style.get_alignment_mut();
        alignment.set_horizontal(HorizontalAlignmentValues::Center);
        alignment.set_vertical(VerticalAlignmentValues::Center);
        alignment.set_wrap_text(true);
    }
}

/// Sizes each column to its longest cell value, capped so post bodies do not
/// blow the layout up
pub(crate) fn autofit_columns(sheet: &mut Worksheet, column_count: u32) {
    let highest_row = sheet.get_highest_row();

    for col in 1..=column_count {
        let mut max_len = 0usize;
        for row in 1..=highest_row {
            max_len = max_len.max(sheet.get_value((col, row)).chars().count());
        }

        let width = (((max_len + 2) as f64) * 1.2).min(MAX_COLUMN_WIDTH);
        let letter = string_from_column_index(&col);
        sheet.get_column_dimension_mut(&letter).set_width(width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_row_values_and_style() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();

        style_header_row(sheet, &["Link", "Name"]);

        assert_eq!(sheet.get_value((1, 1)), "Link");
        assert_eq!(sheet.get_value((2, 1)), "Name");
    }

    #[test]
    fn test_autofit_caps_width() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut((1, 1)).set_value("x".repeat(500));

        autofit_columns(sheet, 1);

        let width = *sheet.get_column_dimension_mut("A").get_width();
        assert!(width <= MAX_COLUMN_WIDTH);
    }
}

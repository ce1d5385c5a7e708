use chrono::Duration;
use chrono::NaiveDate;

/// Types of cell data in spreadsheet files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Quoted literals, escapes and bracketed sections (colors, locales) are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut is_date = false;
        let mut is_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// A single non-empty cell: 1-based position, type and raw stored value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (1-based)
    pub(crate) row: usize,
    /// Column index (1-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as stored in the file
    pub(crate) value: String,
}

impl Cell {
    /// Renders the cell as the string the merge engine sees.
    /// Numeric dates become ISO dates; a value that fails to convert is kept verbatim.
    pub(crate) fn to_text(&self) -> String {
        let converted = match self.kind {
            CellType::Boolean => Some(if self.value == "1" { "true" } else { "false" }.to_owned()),
            CellType::NumberDate1900 => to_date_string(&self.value, false),
            CellType::NumberDate1904 => to_date_string(&self.value, true),
            CellType::NumberDateTime1900 => to_datetime_string(&self.value, false),
            CellType::NumberDateTime1904 => to_datetime_string(&self.value, true),
            CellType::NumberTime1900 | CellType::NumberTime1904 => to_time_string(&self.value),
            CellType::IsoDateTime => Some(self.value.replace('T', " ")),
            _ => None,
        };
        converted.unwrap_or_else(|| self.value.to_owned())
    }
}

/// Converts an Excel serial day number to a date.
/// Handles the Lotus 1-2-3 leap year bug for the 1900 epoch.
pub(crate) fn serial_to_date(days: i64, is_1904: bool) -> Option<NaiveDate> {
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::try_days(days + offset)?)
}

/// Converts Excel numeric date to ISO date string.
fn to_date_string(value: &str, is_1904: bool) -> Option<String> {
    let days = value.parse::<f64>().ok()?.trunc() as i64;
    serial_to_date(days, is_1904).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Converts Excel numeric time (fraction of a day) to ISO time string.
fn to_time_string(value: &str) -> Option<String> {
    let fraction = value.parse::<f64>().ok()?.fract();
    let mut seconds = (fraction * 86_400f64).round() as i64;
    let hours = seconds / 3600;
    seconds %= 3600;
    let minutes = seconds / 60;
    seconds %= 60;
    Some(format!("{hours:02}:{minutes:02}:{seconds:02}"))
}

/// Converts Excel numeric datetime to ISO datetime string.
fn to_datetime_string(value: &str, is_1904: bool) -> Option<String> {
    let date = to_date_string(value, is_1904)?;
    let time = to_time_string(value)?;
    Some(format!("{date} {time}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell { row: 2, col: 3, kind, value: value.to_owned() }
    }

    #[test]
    fn custom_formats() {
        assert_eq!(CellType::parse_custom_number_format("dd.mm.yyyy", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("dd/mm/yyyy hh:mm", true), CellType::NumberDateTime1904);
        assert_eq!(CellType::parse_custom_number_format("[h]:mm:ss", false), CellType::NumberTime1900);
        assert_eq!(CellType::parse_custom_number_format("0.00\" days\"", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.00", false), CellType::Number);
    }

    #[test]
    fn builtin_formats() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("0", false), None);
    }

    #[test]
    fn renders_dates() {
        assert_eq!(cell(CellType::NumberDate1900, "45352").to_text(), "2024-03-01");
        assert_eq!(cell(CellType::NumberDate1904, "43890").to_text(), "2024-03-01");
        assert_eq!(cell(CellType::NumberDateTime1900, "45352.5").to_text(), "2024-03-01 12:00:00");
        assert_eq!(cell(CellType::NumberTime1900, "0.25").to_text(), "06:00:00");
        assert_eq!(cell(CellType::IsoDateTime, "2024-03-01T00:00:00").to_text(), "2024-03-01 00:00:00");
    }

    #[test]
    fn keeps_unconvertible_values() {
        assert_eq!(cell(CellType::NumberDate1900, "soon").to_text(), "soon");
        assert_eq!(cell(CellType::Boolean, "1").to_text(), "true");
        assert_eq!(cell(CellType::InlineString, "№ 1").to_text(), "№ 1");
    }
}

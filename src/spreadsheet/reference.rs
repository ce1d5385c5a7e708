//! Conversion between A1-style cell references and 1-based row/column indexes.

/// Converts column letters (`A`, `AB`, ...) to a 1-based column index.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0usize, |index, letter| {
        let letter = letter.to_ascii_uppercase();
        if !letter.is_ascii_uppercase() {
            return None;
        }
        index
            .checked_mul(26)?
            .checked_add(letter as usize - 'A' as usize + 1)
    })
}

/// Converts a 1-based column index to column letters.
pub(crate) fn index_to_col(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let remainder = (col - 1) % 26;
        letters.push((b'A' + remainder as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Parses a cell reference such as `C12` into 1-based `(row, col)`.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let col = col_to_index(&reference[..split])?;
    let row = reference[split..].parse::<usize>().ok().filter(|row| *row > 0)?;
    Some((row, col))
}

/// Builds the A1-style reference for 1-based `(row, col)`.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(col_to_index("A"), Some(1));
        assert_eq!(col_to_index("z"), Some(26));
        assert_eq!(col_to_index("AA"), Some(27));
        assert_eq!(col_to_index("XFD"), Some(16384));
        assert_eq!(col_to_index(""), None);
        assert_eq!(col_to_index("A1"), None);
        assert_eq!(col_to_index(&"Z".repeat(40)), None);
        assert_eq!(reference_to_index(&format!("{}1", "Z".repeat(40))), None);
        assert_eq!(index_to_col(28), "AB");
        assert_eq!(index_to_col(16384), "XFD");
    }

    #[test]
    fn references() {
        assert_eq!(reference_to_index("B3"), Some((3, 2)));
        assert_eq!(reference_to_index("AA10"), Some((10, 27)));
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("12"), None);
        assert_eq!(index_to_reference(3, 2), "B3");
    }
}

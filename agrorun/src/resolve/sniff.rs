//! Best-effort crop-code sniffing from experiment file content.

use regex::Regex;
use std::sync::LazyLock;

const CULTIVAR_HEADER: &str = "*CULTIVARS";

static CULTIVAR_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s+(\S+)").expect("valid cultivar row regex"));

/// Scans at most `limit` lines after the `*CULTIVARS` header for the first
/// numbered row and returns the first two characters of its crop token.
///
/// Returns `None` when there is no header, no row within the bound, or the
/// token is shorter than two characters.
#[must_use]
pub fn sniff_crop_code(text: &str, limit: usize) -> Option<String> {
    let mut lines = text.lines();
    lines.find(|line| line.trim_start().to_ascii_uppercase().starts_with(CULTIVAR_HEADER))?;

    lines
        .take(limit)
        .find_map(|line| CULTIVAR_ROW.captures(line))
        .and_then(|caps| {
            let token = caps.get(1)?.as_str();
            let crop: String = token.chars().take(2).collect();
            (crop.chars().count() == 2).then(|| crop.to_ascii_uppercase())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_numbered_row_after_header() {
        let text = "*EXP.DETAILS\n 1 XX ignored\n*CULTIVARS\n@C CR INGENO CNAME\n 1 mz IB0035 McCurdy\n 2 SB X\n";
        assert_eq!(sniff_crop_code(text, 50).as_deref(), Some("MZ"));
    }

    #[test]
    fn test_no_header() {
        assert_eq!(sniff_crop_code(" 1 MZ IB0035\n", 50), None);
    }

    #[test]
    fn test_bounded_lookahead() {
        let text = "*CULTIVARS\n\n\n\n 1 MZ IB0035\n";
        assert_eq!(sniff_crop_code(text, 3), None);
        assert_eq!(sniff_crop_code(text, 4).as_deref(), Some("MZ"));
    }

    #[test]
    fn test_short_token() {
        assert_eq!(sniff_crop_code("*CULTIVARS\n 1 M\n", 50), None);
    }
}

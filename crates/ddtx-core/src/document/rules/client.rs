//! Client name extraction below the header.

use tracing::debug;

use crate::layout::Line;

use super::patterns::{CLIENT_BLOCK_END, CLIENT_NOISE, MULTI_SPACE};

/// Lines after the header that may hold the client name.
const CLIENT_LINES: usize = 3;
/// Name lines kept at most (a name can wrap once).
const MAX_NAME_PARTS: usize = 2;

/// Client name and the last line it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientBlock {
    pub name: String,
    /// Index of the last line consumed by the client block.
    pub last_line: usize,
}

/// Read the client name from the lines following the header.
///
/// Stops at the first address-like line or VAT number, skips payment and
/// supplier-code noise, and collapses names printed twice.
pub fn extract_client_name(lines: &[Line], header: usize) -> ClientBlock {
    let mut parts: Vec<String> = Vec::new();
    let mut last_line = header;

    for index in (header + 1)..=(header + CLIENT_LINES) {
        let Some(line) = lines.get(index) else {
            break;
        };
        let text = line.text().trim();

        if CLIENT_BLOCK_END.is_match(text) {
            break;
        }
        if text.is_empty() || CLIENT_NOISE.is_match(text) {
            continue;
        }

        parts.push(collapse_duplicate(text));
        last_line = index;
        if parts.len() == MAX_NAME_PARTS {
            break;
        }
    }

    let name = parts.join(" ");
    debug!("Client name '{}' ending at line {}", name, last_line);
    ClientBlock { name, last_line }
}

/// Collapse a name printed twice on one line, or keep the left column.
pub fn collapse_duplicate(text: &str) -> String {
    let columns: Vec<&str> = MULTI_SPACE
        .split(text.trim())
        .filter(|part| !part.is_empty())
        .collect();

    if columns.len() >= 2 && columns[0] == columns[1] {
        return columns[0].to_string();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let half = words.len() / 2;
    if half > 0 && words.len() % 2 == 0 && words[..half] == words[half..] {
        return words[..half].join(" ");
    }

    match columns.first() {
        Some(left) if columns.len() >= 2 => left.to_string(),
        _ => words.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_lines(texts: &[&str]) -> Vec<Line> {
        texts.iter().map(|t| Line::from_text(*t)).collect()
    }

    #[test]
    fn test_collapse_duplicate() {
        assert_eq!(collapse_duplicate("DONAC S.R.L.   DONAC S.R.L."), "DONAC S.R.L.");
        assert_eq!(collapse_duplicate("DONAC S.R.L. DONAC S.R.L."), "DONAC S.R.L.");
        assert_eq!(collapse_duplicate("ROSSI SPA    MAGAZZINO NORD"), "ROSSI SPA");
        assert_eq!(collapse_duplicate("BAR SPORT DI  ROSSI"), "BAR SPORT DI");
        assert_eq!(collapse_duplicate("PANETTERIA BIANCHI"), "PANETTERIA BIANCHI");
    }

    #[test]
    fn test_stops_at_address() {
        let lines = text_lines(&[
            "4681 21/05/25 1 5712",
            "DONAC S.R.L.   DONAC S.R.L.",
            "VIA ROMA 12 VIA SALUZZO 10",
        ]);

        assert_eq!(
            extract_client_name(&lines, 0),
            ClientBlock { name: "DONAC S.R.L.".to_string(), last_line: 1 }
        );
    }

    #[test]
    fn test_wrapped_name_and_noise() {
        let lines = text_lines(&[
            "4681 21/05/25 1 5712",
            "Pagamento: RIMESSA DIRETTA",
            "PASTICCERIA DEL CORSO",
            "DI VERDI ANNA",
            "PIAZZA GRANDE 1",
        ]);

        assert_eq!(
            extract_client_name(&lines, 0),
            ClientBlock { name: "PASTICCERIA DEL CORSO DI VERDI ANNA".to_string(), last_line: 3 }
        );
    }

    #[test]
    fn test_stops_at_vat_number() {
        let lines = text_lines(&["4681 21/05/25 1 5712", "01234567890"]);
        assert_eq!(
            extract_client_name(&lines, 0),
            ClientBlock { name: String::new(), last_line: 0 }
        );
    }
}

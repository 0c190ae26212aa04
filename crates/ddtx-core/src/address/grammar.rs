//! Italian address grammar shared by the address strategies.
//!
//! Line classification (address-shaped, street, noise) and parsing of
//! candidate lines into [`AddressFields`].

use lazy_static::lazy_static;
use regex::Regex;

use super::AddressFields;

lazy_static! {
    // Street prefixes; dotted abbreviations carry their own boundary.
    static ref STREET_PREFIX: Regex = Regex::new(
        r"(?i)^(?:via\b|v\.le\b|viale\b|corso\b|c\.so\b|piazza\b|p\.zza\b|p\.za\b|strada\b|loc\.|localit[àa]\b|fraz\.|frazione\b|largo\b|vicolo\b)"
    ).unwrap();

    static ref ADDRESS_NEGATIVE: Regex = Regex::new(
        r"(?i)^(?:tel|fax|cell|e-?mail|pec|cf|c\.f\.|p\.\s?iva|rea|pagamento|operatore|vettore|trasportatore|documento)"
    ).unwrap();

    static ref BARE_AMOUNT: Regex = Regex::new(r"^\d+[,.]\d{2}$").unwrap();

    static ref LEADING_POSTAL_CODE: Regex = Regex::new(r"^\d{5}\s").unwrap();

    static ref POSTAL_CODE_AND_CITY: Regex = Regex::new(r"(?i)\b\d{5}\s+[A-Z]").unwrap();

    static ref ADDITIONAL_INFO: Regex = Regex::new(r"(?i)ingr\.|scarico").unwrap();

    static ref POSTAL_CODE: Regex = Regex::new(r"\b\d{5}\b").unwrap();

    // Postal code followed by an uppercase city and an optional province.
    static ref POSTAL_INFO: Regex = Regex::new(
        r"(?P<postal_code>\d{5})\s*-?\s*(?P<city>[A-ZÀ-Ý][A-Za-zÀ-ÿ\s'\-]+?)(?:\s+(?P<province>[A-Z]{2}))?\s*$"
    ).unwrap();

    // Postal block inside a street line.
    static ref STREET_POSTAL_BOUNDARY: Regex = Regex::new(r"\s(?P<postal>\d{5}\s)").unwrap();

    static ref PAYMENT_OR_OPERATOR: Regex = Regex::new(
        r"(?i)pagamento:|operatore:|bb\s+\d+\s+gg|d\.f\.|banca|iban|scadenza"
    ).unwrap();

    static ref HEADER_OR_FOOTER: Regex = Regex::new(
        r"(?i)documento di trasporto|d\.d\.t\.|partita iva|codice fiscale|tel\.|fax|e-mail|pag\.\s*\d+"
    ).unwrap();
}

/// Postal code, city and province parsed from one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalInfo {
    pub postal_code: String,
    pub city: String,
    pub province: String,
}

/// Check whether a line looks like part of an address.
pub fn is_address_line(text: &str) -> bool {
    let text = text.trim();
    if text.chars().count() < 5 {
        return false;
    }

    if ADDRESS_NEGATIVE.is_match(text) || BARE_AMOUNT.is_match(text) || text.starts_with('€') {
        return false;
    }

    STREET_PREFIX.is_match(text)
        || LEADING_POSTAL_CODE.is_match(text)
        || POSTAL_CODE_AND_CITY.is_match(text)
        || ADDITIONAL_INFO.is_match(text)
}

/// Check whether a line starts with a street prefix.
pub fn is_street_line(text: &str) -> bool {
    STREET_PREFIX.is_match(text.trim())
}

/// Payment terms, bank details or operator codes printed beside the address.
pub fn is_payment_or_operator(text: &str) -> bool {
    PAYMENT_OR_OPERATOR.is_match(text)
}

/// Document title, tax labels, contact details or page numbers.
pub fn is_header_or_footer(text: &str) -> bool {
    HEADER_OR_FOOTER.is_match(text)
}

/// Parse `12345 CITY PR` (also `12345 - CITY`) anywhere in a line.
pub fn parse_postal_info(text: &str) -> Option<PostalInfo> {
    let text = text.trim();

    if let Some(caps) = POSTAL_INFO.captures(text) {
        return Some(PostalInfo {
            postal_code: caps["postal_code"].to_string(),
            city: caps["city"].trim().to_string(),
            province: caps
                .name("province")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        });
    }

    POSTAL_CODE.find(text).map(|m| PostalInfo {
        postal_code: m.as_str().to_string(),
        ..PostalInfo::default()
    })
}

/// Parse candidate lines into address fields.
///
/// The first street line sets `street`; the first postal line sets postal
/// code, city and province. A postal block trailing a street line is split off
/// so it never ends up in `street`. Lines mentioning an unloading entrance
/// ("ingr.", "scarico") fill `additional_info`.
pub fn parse_address_lines<S: AsRef<str>>(lines: &[S]) -> AddressFields {
    let mut fields = AddressFields::default();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        if is_street_line(line) {
            let (street, postal) = split_street_and_postal(line);
            if fields.street.is_empty() {
                fields.street = street.to_string();
            } else if fields.additional_info.is_empty() && ADDITIONAL_INFO.is_match(line) {
                fields.additional_info = line.to_string();
            }
            if let Some(postal) = postal {
                fill_postal(&mut fields, postal);
            }
        } else if POSTAL_CODE.is_match(line) {
            fill_postal(&mut fields, line);
        } else if fields.additional_info.is_empty() && ADDITIONAL_INFO.is_match(line) {
            fields.additional_info = line.to_string();
        }
    }

    fields
}

fn split_street_and_postal(line: &str) -> (&str, Option<&str>) {
    match STREET_POSTAL_BOUNDARY.captures(line).and_then(|c| c.name("postal")) {
        Some(postal) => (line[..postal.start()].trim(), Some(&line[postal.start()..])),
        None => (line, None),
    }
}

fn fill_postal(fields: &mut AddressFields, text: &str) {
    if !fields.postal_code.is_empty() {
        return;
    }
    if let Some(info) = parse_postal_info(text) {
        fields.postal_code = info.postal_code;
        fields.city = info.city;
        fields.province = info.province;
    }
}

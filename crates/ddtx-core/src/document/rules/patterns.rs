//! Common regex patterns for DDT/FT field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Numeric header: number, date, page, client code
    pub static ref DOCUMENT_HEADER: Regex = Regex::new(
        r"^(?P<number>\d{4,5})\s+(?P<date>\d{1,2}/\d{2}/\d{2})\s+(?P<page>\d+)\s+(?P<client>\d{4,5})$"
    ).unwrap();

    // Same header with the number glued to the date
    pub static ref DOCUMENT_HEADER_FUSED: Regex = Regex::new(
        r"^(?P<number>\d{4})(?P<date>\d{2}/\d{2}/\d{2})\s+(?P<page>\d+)\s+(?P<client>\d{4,5})$"
    ).unwrap();

    pub static ref SHORT_DATE: Regex = Regex::new(
        r"^(?P<day>\d{1,2})/(?P<month>\d{2})/(?P<year>\d{2})$"
    ).unwrap();

    // Client block ends at an address or a VAT number
    pub static ref CLIENT_BLOCK_END: Regex = Regex::new(
        r"(?i)^(?:VIA|V\.LE|VIALE|CORSO|C\.SO|P\.ZA|PIAZZA|STRADA)\b|\d{5}"
    ).unwrap();

    pub static ref CLIENT_NOISE: Regex = Regex::new(r"Pagamento:|COD\. FORN\.").unwrap();

    pub static ref MULTI_SPACE: Regex = Regex::new(r"\s{2,}").unwrap();

    pub static ref WIDE_GAP: Regex = Regex::new(r"\s{5,}").unwrap();

    pub static ref STREET_WORD: Regex = Regex::new(
        r"\b(?:VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZA)\b"
    ).unwrap();

    pub static ref BARE_HOUSE_NUMBER: Regex = Regex::new(r"^\d+\s").unwrap();

    pub static ref STRICT_STREET_TAIL: Regex = Regex::new(
        r"\s{5,}(?P<street>(?:CORSO|VIA|V\.LE|VIALE|PIAZZA|P\.ZA|LOC\.|STRADA)[^,]+,\s*\d+)$"
    ).unwrap();

    pub static ref LOCALITY_THEN_STREET: Regex = Regex::new(
        r"\b(?:LOC\.|LOCALITÀ|FRAZ\.|FRAZIONE)\s+.+\s+(?:VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZA)\b"
    ).unwrap();

    pub static ref POSTAL_CODE: Regex = Regex::new(r"\b\d{5}\b").unwrap();

    pub static ref LEADING_POSTAL_CODE: Regex = Regex::new(r"^\d{5}").unwrap();

    // Italian VAT number (partita IVA)
    pub static ref VAT_NUMBER: Regex = Regex::new(r"\b\d{11}\b").unwrap();

    // Order references
    pub static ref ORDER_VS: Regex = Regex::new(
        r"(?i)Rif\.?\s*V[s.]?\s*\.?\s*Ordine\s*n\.?\s*(?P<number>[A-Z0-9]+)"
    ).unwrap();

    pub static ref ORDER_NS: Regex = Regex::new(
        r"(?i)Rif\.?\s*N[s.]?\s*\.?\s*Ordine\s*N\.?\s*(?P<number>\d+)"
    ).unwrap();

    pub static ref ORDER_ODV: Regex = Regex::new(
        r"(?i)ODV\s+Nr?\.?\s*(?P<number>[A-Z0-9]+)"
    ).unwrap();

    pub static ref ORDER_GENERIC: Regex = Regex::new(
        r"(?i)Ordine\s*n?\.?\s*(?P<number>[A-Z0-9]+)(?:\s+del|\s*$)"
    ).unwrap();

    pub static ref ORDER_DATE: Regex = Regex::new(
        r"(?i)del\s+(?P<date>\d{1,2}[/\-]\d{1,2}(?:[/\-]\d{1,4})?)"
    ).unwrap();

    // Any standard reference, used to veto the 507 fallback
    pub static ref STANDARD_REFERENCE: Regex = Regex::new(
        r"(?i)Rif\.?\s*[VN]s?\.?\s*Ordine\s*n?\.?\s*\d+"
    ).unwrap();

    pub static ref ORDER_507_LABELLED: Regex = Regex::new(
        r"(?i)(?:ODV\s+Nr?\.?|N\.|Ordine|Ord\.)\s*(?P<number>507[A-Z0-9]*)\b"
    ).unwrap();

    // Only a line opening with the 507 code followed by a name
    pub static ref ORDER_507_BARE: Regex = Regex::new(
        r"(?i)^(?P<number>507[A-Z0-9]*)\s+[A-Z]"
    ).unwrap();

    pub static ref DATE_LIKE: Regex = Regex::new(r"^\d{1,2}[/.\-]\d{1,2}([/.\-]\d{2,4})?$").unwrap();

    // Line items: code, description, unit, quantity, price, total, VAT rate [, SM]
    pub static ref ITEM_ROW_WITH_SM: Regex = Regex::new(
        r"^(?P<code>\w{6,})\s+(?P<description>.+?)\s+(?P<unit>PZ|KG|LT|CF|CT|BT|SC|GR)\s+(?P<quantity>\d+(?:,\d+)?)\s+(?P<price>[\d,]+)\s+(?P<total>[\d.,]+)\s+(?P<vat>\d{2})\s+(?P<sm>\d{2})\s*$"
    ).unwrap();

    pub static ref ITEM_ROW: Regex = Regex::new(
        r"^(?P<code>\w{6,})\s+(?P<description>.+?)\s+(?P<unit>PZ|KG|LT|CF|CT|BT|SC|GR)\s+(?P<quantity>\d+(?:,\d+)?)\s+(?P<price>[\d,]+)\s+(?P<total>[\d.,]+)\s+(?P<vat>\d{2})"
    ).unwrap();

    // Free goods: quantity * price, list total, VAT rate [, SM]
    pub static ref ITEM_ROW_FREE_GOODS: Regex = Regex::new(
        r"^(?P<code>\w{6,})\s+(?P<description>.+?)\s+(?P<unit>PZ|KG|LT|CF|CT|BT|SC|GR)\s+(?P<quantity>\d+(?:,\d+)?)\s+\*\s+(?P<price>[\d,]+)\s+(?P<total>[\d.,]+)\s+(?P<vat>\d{2})(?:\s+(?P<sm>\d{2}))?\s*$"
    ).unwrap();

    // Totals (1.234,56)
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"\b(?P<amount>\d{1,3}(?:\.\d{3})*,\d{2})(?:\s|$)"
    ).unwrap();
}

//! CSV reader with encoding and delimiter auto-detection.
//!
//! Produces a [`RawTable`] of untyped string fields. No sales-specific logic here.

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::RawTable;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Header and records
    pub table: RawTable,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

impl ParseResult {
    /// Records as JSON objects keyed by header.
    pub fn to_json(&self) -> Vec<Value> {
        table_to_json(&self.table)
    }
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is always reported as `utf-8`; chardet only guesses for
/// everything else.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        // not valid UTF-8, whatever chardet says
        "" | "ascii" | "utf-8" | "utf8" => "windows-1252".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// A leading byte order mark is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => {
                let (text, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    return Err(CsvError::Encoding(format!(
                        "invalid byte sequence for {}",
                        other
                    )));
                }
                text.into_owned()
            }
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Falls back to `,` when no candidate occurs.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// Fields are trimmed, quoted fields are honoured, short records are padded
/// and extra trailing fields are ignored.
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<RawTable> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .flexible(true)
        .trim(csv::Trim::All)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut table = RawTable::new(headers);
    let width = table.headers.len();

    for result in reader.records() {
        let record = result?;
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue;
        }

        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let mut fields: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        fields.resize(width, String::new());

        table.records.push(crate::models::RawRecord { line, fields });
    }

    Ok(table)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    let table = parse_str(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file_auto("retail_sales.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Records: {}", result.table.records.len());
/// ```
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Parse a CSV file with an explicit delimiter (encoding still auto-detected).
pub fn parse_csv_file<P: AsRef<Path>>(path: P, delimiter: char) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding)?;
    let table = parse_str(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Convert a raw table into JSON objects keyed by header.
pub fn table_to_json(table: &RawTable) -> Vec<Value> {
    table
        .records
        .iter()
        .map(|record| {
            let obj: Map<String, Value> = table
                .headers
                .iter()
                .zip(record.fields.iter())
                .map(|(h, v)| (h.clone(), Value::String(v.clone())))
                .collect();
            Value::Object(obj)
        })
        .collect()
}

fn delimiter_byte(delimiter: char) -> CsvResult<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| CsvError::Parse {
            line: 0,
            message: format!("Delimiter '{}' is not a single ASCII character", delimiter),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_str("StoreID,Date,Sales\n101,2024-01-01,6000\n102,2024-01-02,", ',')
            .unwrap();

        assert_eq!(table.headers, vec!["StoreID", "Date", "Sales"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].fields, vec!["101", "2024-01-01", "6000"]);
        assert_eq!(table.records[1].fields, vec!["102", "2024-01-02", ""]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table = parse_str("a,b\n1,2\n\n3,4\n", ',').unwrap();

        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].line, 2);
        assert!(table.records[1].line > 2);
        assert_eq!(table.records[1].fields, vec!["3", "4"]);
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name,value\n\"Store, North\",\"1200\"";
        let table = parse_str(csv, ',').unwrap();

        assert_eq!(table.records[0].fields, vec!["Store, North", "1200"]);
    }

    #[test]
    fn test_short_rows_padded_and_extra_columns_ignored() {
        let table = parse_str("a,b,c\n1\n1,2,3,4", ',').unwrap();

        assert_eq!(table.records[0].fields, vec!["1", "", ""]);
        assert_eq!(table.records[1].fields, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_fields_trimmed() {
        let table = parse_str("a , b\n 1 , 2 ", ',').unwrap();

        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.records[0].fields, vec!["1", "2"]);
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_str("", ','), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b""), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse_semicolon() {
        let csv = "StoreID;Date;Sales\n101;2024-01-01;6000";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.table.headers, vec!["StoreID", "Date", "Sales"]);
        assert_eq!(result.table.records.len(), 1);
    }

    #[test]
    fn test_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"StoreID,Date,Sales\n101,2024-01-01,1");
        let result = parse_bytes_auto(&bytes).unwrap();

        assert_eq!(result.table.headers[0], "StoreID");
    }

    #[test]
    fn test_utf8_with_accents_kept_verbatim() {
        let csv = "StoreID,Date,Sales,City,Promo\n\
                   Köln,2024-01-01,10,Zürich,€ promo\n";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.encoding, "utf-8");
        assert_eq!(
            result.table.records[0].fields,
            vec!["Köln", "2024-01-01", "10", "Zürich", "€ promo"]
        );
    }

    #[test]
    fn test_non_utf8_falls_back_to_detection() {
        // "Zürich" with ü as a single ISO-8859-1 byte
        let bytes: &[u8] = b"City\nZ\xFCrich\n";
        assert_ne!(detect_encoding(bytes), "utf-8");
        assert_eq!(
            decode_content(bytes, "windows-1252").unwrap(),
            "City\nZürich\n"
        );
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_table_to_json() {
        let table = parse_str("a,b\n1,2", ',').unwrap();
        let rows = table_to_json(&table);

        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "2");
    }

    #[test]
    fn test_parse_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, "StoreID,Date,Sales\n101,2024-01-01,10\n").unwrap();

        let result = parse_csv_file_auto(&path).unwrap();
        assert_eq!(result.table.records.len(), 1);

        let explicit = parse_csv_file(&path, ',').unwrap();
        assert_eq!(explicit.table, result.table);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = parse_csv_file_auto("/definitely/not/here.csv");
        assert!(matches!(result, Err(CsvError::Io(_))));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        assert!(matches!(parse_str("a;b", '§'), Err(CsvError::Parse { .. })));
    }
}

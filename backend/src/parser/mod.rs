//! Spreadsheet decoding with encoding and delimiter auto-detection.
//!
//! CSV bytes go through charset detection, delimiter sniffing and the `csv`
//! reader; XLSX/XLS workbooks are read through `calamine` (first worksheet
//! only). Both produce the same [`Table`].

use std::io::Cursor;

use calamine::Reader;

use crate::error::{ParseError, ParseResult};
use crate::models::FileType;

/// A decoded sheet: header row plus data rows, all cells as text.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column headers
    pub headers: Vec<String>,
    /// Data rows (header row excluded)
    pub rows: Vec<Vec<String>>,
    /// Detected encoding (CSV only)
    pub encoding: Option<String>,
    /// Detected delimiter (CSV only)
    pub delimiter: Option<char>,
}

/// Decode bytes according to their file type.
pub fn parse_bytes(bytes: &[u8], file_type: FileType) -> ParseResult<Table> {
    if bytes.is_empty() {
        return Err(ParseError::EmptyFile);
    }
    match file_type {
        FileType::Csv => parse_csv_auto(bytes),
        FileType::Xlsx | FileType::Xls => parse_workbook(bytes),
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        // WHATWG maps latin1 labels to windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            match text.strip_prefix('\u{feff}') {
                Some(stripped) => stripped.to_string(),
                None => text,
            }
        }
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
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

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_csv_auto(bytes: &[u8]) -> ParseResult<Table> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    let mut table = parse_csv_str(&content, delimiter)?;
    table.encoding = Some(encoding);
    Ok(table)
}

/// Parse CSV text with an explicit delimiter.
///
/// Rows are allowed to be shorter or longer than the header; blank lines
/// are skipped and cells are trimmed.
pub fn parse_csv_str(content: &str, delimiter: char) -> ParseResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(ParseError::NoHeaders);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table {
        headers,
        rows,
        encoding: None,
        delimiter: Some(delimiter),
    })
}

fn csv_error(e: csv::Error) -> ParseError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    ParseError::Csv {
        line,
        message: e.to_string(),
    }
}

/// Read the first worksheet of an XLSX/XLS workbook.
pub fn parse_workbook(bytes: &[u8]) -> ParseResult<Table> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
        .map_err(|e| ParseError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoWorksheet)?
        .map_err(|e| ParseError::Workbook(e.to_string()))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(String::is_empty));

    let headers = rows.next().ok_or(ParseError::NoHeaders)?;

    Ok(Table {
        headers,
        rows: rows.collect(),
        encoding: None,
        delimiter: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_csv_str("name;age\nAlice;30\nBob;25", ';').unwrap();

        assert_eq!(table.headers, vec!["name", "age"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["Alice", "30"]);
        assert_eq!(table.rows[1], vec!["Bob", "25"]);
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name,value\n\"Doe, Jane\",\"Hello World\"";
        let table = parse_csv_str(csv, ',').unwrap();

        assert_eq!(table.rows[0], vec!["Doe, Jane", "Hello World"]);
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse_csv_str("a;b\n1;2\n\n3;4\n", ';').unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_ragged_rows_kept() {
        let table = parse_csv_str("a;b;c\n1;;3\n1;2;3;4", ';').unwrap();

        assert_eq!(table.rows[0], vec!["1", "", "3"]);
        assert_eq!(table.rows[1].len(), 4);
    }

    #[test]
    fn test_header_only_csv() {
        let table = parse_csv_str("a,b\n", ',').unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(parse_bytes(b"", FileType::Csv), Err(ParseError::EmptyFile)));
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
    fn test_auto_parse() {
        let table = parse_csv_auto(b"name;age\nAlice;30\nBob;25").unwrap();

        assert_eq!(table.delimiter, Some(';'));
        assert_eq!(table.encoding.as_deref(), Some("utf-8"));
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_bom_stripped() {
        let table = parse_csv_auto("\u{feff}id,name\n1,x".as_bytes()).unwrap();
        assert_eq!(table.headers[0], "id");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_latin1_currency_sign() {
        // 0xA4 is the generic currency sign in latin1, the euro sign only in latin9
        let decoded = decode_content(&[0x31, 0x30, 0xA4], "iso-8859-1");
        assert_eq!(decoded, "10\u{a4}");
        assert_eq!(decode_content(&[0x80], "latin1"), "\u{20ac}");
    }

    #[test]
    fn test_garbage_workbook_rejected() {
        let result = parse_bytes(b"definitely not a workbook", FileType::Xlsx);
        assert!(matches!(result, Err(ParseError::Workbook(_))));
    }
}

// SPDX-License-Identifier: Apache-2.0

use encoding_rs::Encoding;
use yubin_model::FamilyRecord;

use crate::IngestError;

/// Resolves a WHATWG encoding label. `cp932` is accepted as an alias for
/// `windows-31j`, which the JIGYOSYO file is published in.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, IngestError> {
    let normalized = label.trim().to_ascii_lowercase();
    let label = match normalized.as_str() {
        "cp932" | "ms932" => "windows-31j",
        other => other,
    };
    Encoding::for_label(label.as_bytes())
        .ok_or_else(|| IngestError::config(format!("unknown encoding label `{label}`")))
}

/// Decodes the whole file. Any byte sequence the encoding cannot map fails
/// the run; replacement characters never reach the catalog.
pub fn decode_source(bytes: &[u8], encoding: &'static Encoding) -> Result<String, IngestError> {
    if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
        return Ok(text.into_owned());
    }
    let (lossy, _) = encoding.decode_without_bom_handling(bytes);
    let line = lossy
        .find('\u{FFFD}')
        .map(|at| lossy[..at].matches('\n').count() + 1)
        .unwrap_or(1);
    Err(IngestError::format(format!(
        "line {line}: bytes not decodable as {}",
        encoding.name()
    )))
}

/// Splits decoded text into comma-separated rows and projects each onto the
/// family's fields. Fields may be double-quoted; there is no header row.
pub fn read_records<R: FamilyRecord>(text: &str) -> Result<Vec<R>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let expected = R::FAMILY.source_column_count();
    let mut out = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IngestError::format(format!("csv: {e}")))?;
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue;
        }
        let line = record.position().map_or(0, csv::Position::line);
        let fields: Vec<&str> = record.iter().collect();
        let projected = R::project(&fields).ok_or_else(|| {
            IngestError::format(format!(
                "line {line}: expected {expected} columns for {}, found {}",
                R::FAMILY,
                fields.len()
            ))
        })?;
        out.push(projected);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IngestErrorCode;
    use yubin_model::KenAllRecord;

    #[test]
    fn shift_jis_round_trips_through_decode() {
        let enc = resolve_encoding("shift_jis").expect("encoding");
        let (bytes, _, unmappable) = enc.encode("北海道,札幌市\r\n");
        assert!(!unmappable);
        assert_eq!(decode_source(&bytes, enc).expect("decode"), "北海道,札幌市\r\n");
    }

    #[test]
    fn cp932_label_resolves_to_windows_31j_family() {
        let enc = resolve_encoding("CP932").expect("encoding");
        assert_eq!(enc, encoding_rs::SHIFT_JIS);
        assert!(resolve_encoding("no-such-codec").is_err());
    }

    #[test]
    fn undecodable_bytes_report_line() {
        let enc = resolve_encoding("shift_jis").expect("encoding");
        let err = decode_source(b"ok\r\n\x82\xff\r\n", enc).expect_err("format error");
        assert_eq!(err.code, IngestErrorCode::Format);
        assert!(err.message.starts_with("line 2:"), "{}", err.message);
    }

    #[test]
    fn quoted_rows_project_and_short_rows_fail() {
        let text = "01101,\"060  \",\"0600000\",\"ﾎｯｶｲﾄﾞｳ\",\"ｻｯﾎﾟﾛｼ\",\"ｲｶﾆ\",\"北海道\",\"札幌市中央区\",\"旭ケ丘\",0,0,1,0,0,0\r\n";
        let rows: Vec<KenAllRecord> = read_records(text).expect("rows");
        assert_eq!(rows, vec![KenAllRecord::new("0600000", "北海道", "札幌市中央区", "旭ケ丘")]);

        let short = "01101,\"060  \",\"0600000\"\r\n";
        let err = read_records::<KenAllRecord>(short).expect_err("short row");
        assert_eq!(err.code, IngestErrorCode::Format);
        assert!(err.message.contains("expected 15 columns"), "{}", err.message);
    }
}

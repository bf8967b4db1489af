// SPDX-License-Identifier: Apache-2.0

use super::*;

fn shift_jis(rows: &[&str]) -> Vec<u8> {
    let text: String = rows.iter().map(|r| format!("{r}\r\n")).collect();
    let (bytes, _, unmappable) = encoding_rs::SHIFT_JIS.encode(&text);
    assert!(!unmappable);
    bytes.into_owned()
}

#[test]
fn in_memory_ken_all_run_expands_and_numbers_rows() {
    let bytes = shift_jis(&[
        r#"01607,"05803","0580343","ﾎｯｶｲﾄﾞｳ","ｻﾏﾆｸﾞﾝｻﾏﾆﾁｮｳ","ﾄｳﾖｳ","北海道","様似郡様似町","甲（乙",0,0,0,0,0,0"#,
        r#"01607,"05803","0580343","ﾎｯｶｲﾄﾞｳ","ｻﾏﾆｸﾞﾝｻﾏﾆﾁｮｳ","ﾄｳﾖｳ","北海道","様似郡様似町","丙）",0,0,0,0,0,0"#,
    ]);
    let out = normalize_ken_all(&bytes, "shift_jis").expect("pipeline");
    let towns: Vec<(u64, &str)> = out.rows.iter().map(|r| (r.id, r.town.as_str())).collect();
    assert_eq!(towns, vec![(1, "甲"), (2, "甲乙丙")]);
    assert_eq!(out.counts.source_rows, 2);
    assert_eq!(out.counts.merged_rows, 1);
    assert_eq!(out.rows[1].address, "北海道様似郡様似町甲乙丙");
}

#[test]
fn rows_differing_only_in_dropped_columns_collapse_to_one() {
    let bytes = shift_jis(&[
        r#"01101,"064  ","0640941","ﾎｯｶｲﾄﾞｳ","ｻｯﾎﾟﾛｼﾁｭｳｵｳｸ","ｱｻﾋｶﾞｵｶ","北海道","札幌市中央区","旭ケ丘",0,0,1,0,0,0"#,
        r#"01101,"064  ","0640941","ﾎｯｶｲﾄﾞｳ","ｻｯﾎﾟﾛｼﾁｭｳｵｳｸ","ｱｻﾋｶﾞｵｶX","北海道","札幌市中央区","旭ケ丘",1,1,0,1,1,1"#,
    ]);
    let out = normalize_ken_all(&bytes, "shift_jis").expect("pipeline");
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0].id, 1);
    assert_eq!(out.rows[0].town, "旭ケ丘");
    assert_eq!(out.counts.source_rows, 2);
    assert_eq!(out.counts.exploded_rows, 2);
    assert_eq!(out.counts.duplicates_removed, 1);
    assert_eq!(out.counts.catalog_rows, 1);
}

#[test]
fn in_memory_jigyosyo_run_skips_town_rules() {
    let text = r#"01101,"ｻﾂﾎﾟﾛ","（株）札幌","北海道","札幌市中央区","北一条西（仮）","２丁目","0608611","060  ","札幌中央",0,0,0"#;
    let out = normalize_jigyosyo(&shift_jis(&[text]), "cp932").expect("pipeline");
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0].company, "(株)札幌");
    assert_eq!(out.rows[0].town, "北一条西(仮)");
    assert_eq!(out.rows[0].address, "北海道札幌市中央区北一条西(仮)2丁目");
    assert!(out.rule_hits.is_empty());
}

#[test]
fn error_display_carries_code() {
    let err = IngestError::format("row 3: bad");
    assert_eq!(err.to_string(), "format: row 3: bad");
    assert_eq!(IngestErrorCode::Storage.as_str(), "storage");
}

#[test]
fn default_options_pick_family_encoding() {
    let opts = IngestOptions {
        family: RecordFamily::Jigyosyo,
        ..IngestOptions::default()
    };
    assert_eq!(opts.effective_encoding_label(), "cp932");
    assert!(opts.write_manifest);
}

// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;

const KEN_ALL_ROWS: &[&str] = &[
    r#"01101,"060  ","0600000","ﾎｯｶｲﾄﾞｳ","ｻｯﾎﾟﾛｼﾁｭｳｵｳｸ","ｲｶﾆｹｲｻｲｶﾞﾅｲﾊﾞｱｲ","北海道","札幌市中央区","以下に掲載がない場合",0,0,0,0,0,0"#,
    r#"01607,"05803","0580343","ﾎｯｶｲﾄﾞｳ","ｻﾏﾆｸﾞﾝｻﾏﾆﾁｮｳ","ﾄｳﾖｳ","北海道","様似郡様似町","東洋（油駒、南東洋、",0,0,0,0,0,0"#,
    r#"01607,"05803","0580343","ﾎｯｶｲﾄﾞｳ","ｻﾏﾆｸﾞﾝｻﾏﾆﾁｮｳ","ﾄｳﾖｳ","北海道","様似郡様似町","１３２〜１５６、１５８〜３５４、",0,0,0,0,0,0"#,
    r#"01607,"05803","0580343","ﾎｯｶｲﾄﾞｳ","ｻﾏﾆｸﾞﾝｻﾏﾆﾁｮｳ","ﾄｳﾖｳ","北海道","様似郡様似町","３６６、３６７番地）",0,0,0,0,0,0"#,
    r#"13101,"100  ","1006890","ﾄｳｷｮｳﾄ","ﾁﾖﾀﾞｸ","ｵｵﾃﾏﾁｼﾞｪｲｴｲﾋﾞﾙ(3ｶｲ)","東京都","千代田区","大手町ＪＡビル（３階）",0,0,0,0,0,0"#,
];

fn yubin() -> Command {
    let mut cmd = Command::cargo_bin("yubin").expect("yubin binary");
    cmd.env_remove("YUBIN_CATALOG_DB")
        .env_remove("YUBIN_LOG_JSON")
        .env("YUBIN_LOG_LEVEL", "error")
        .env("YUBIN_CURSOR_SECRET", "cli-contract-secret");
    cmd
}

fn write_shift_jis(dir: &Path, rows: &[&str]) -> PathBuf {
    let text = rows.iter().map(|r| format!("{r}\r\n")).collect::<String>();
    let (bytes, _, unmappable) = encoding_rs::SHIFT_JIS.encode(&text);
    assert!(!unmappable);
    let path = dir.join("KEN_ALL.CSV");
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is one JSON document")
}

/// The machine error is the last stderr line; log lines may precede it.
fn stderr_machine_error(output: &std::process::Output) -> Value {
    let stderr = String::from_utf8(output.stderr.clone()).expect("utf8 stderr");
    let last = stderr.lines().last().expect("stderr has a line");
    serde_json::from_str(last).expect("machine error json")
}

fn ingest_fixture(dir: &Path) -> PathBuf {
    let input = write_shift_jis(dir, KEN_ALL_ROWS);
    let db = dir.join("zipcode.db");
    let output = yubin()
        .args(["--json", "ingest", "--family", "ken_all", "--input"])
        .arg(&input)
        .arg("--db")
        .arg(&db)
        .output()
        .expect("run ingest");
    assert!(output.status.success(), "{output:?}");
    db
}

#[test]
fn help_lists_every_subcommand() {
    let output = yubin().arg("--help").output().expect("run help");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8 help");
    for command in ["ingest", "query", "inspect-db", "diff-normalized", "completion"] {
        assert!(text.contains(command), "help must mention {command}");
    }
}

#[test]
fn unknown_flag_returns_usage_exit_code_with_machine_error() {
    let output = yubin()
        .args(["--json", "--unknown-flag"])
        .output()
        .expect("run bad cli");
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr_machine_error(&output)["code"], "usage_error");
}

#[test]
fn ingest_reports_counts_and_writes_manifest() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_shift_jis(tmp.path(), KEN_ALL_ROWS);
    let db = tmp.path().join("catalog").join("zipcode.db");
    let output = yubin()
        .args(["--json", "ingest", "--family", "ken_all", "--input"])
        .arg(&input)
        .arg("--db")
        .arg(&db)
        .output()
        .expect("run ingest");
    assert!(output.status.success(), "{output:?}");
    let body = stdout_json(&output);
    assert_eq!(body["table"], "ken_all");
    assert_eq!(body["counts"]["source_rows"], 5);
    assert_eq!(body["counts"]["merged_rows"], 3);
    assert_eq!(body["counts"]["catalog_rows"], 7);
    assert!(tmp.path().join("catalog").join("ken_all.manifest.json").exists());
}

#[test]
fn query_by_zipcode_returns_rows_in_id_order() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = ingest_fixture(tmp.path());
    let output = yubin()
        .args(["--json", "query", "--zipcode", "058-0343", "--db"])
        .arg(&db)
        .output()
        .expect("run query");
    assert!(output.status.success(), "{output:?}");
    let body = stdout_json(&output);
    let towns = body["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .map(|r| r["town"].as_str().unwrap_or_default().to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        towns,
        ["東洋", "東洋油駒", "東洋南東洋", "東洋366番地", "東洋367番地"]
    );
    assert!(body["next_cursor"].is_null());
}

#[test]
fn query_cursor_continues_across_invocations() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = ingest_fixture(tmp.path());
    let first = yubin()
        .args(["--json", "query", "--address", "様似", "--limit", "3", "--db"])
        .arg(&db)
        .output()
        .expect("first page");
    assert!(first.status.success(), "{first:?}");
    let first = stdout_json(&first);
    assert_eq!(first["rows"].as_array().map(Vec::len), Some(3));
    let cursor = first["next_cursor"].as_str().expect("cursor").to_string();

    let second = yubin()
        .args(["--json", "query", "--address", "様似", "--limit", "3", "--cursor"])
        .arg(&cursor)
        .arg("--db")
        .arg(&db)
        .output()
        .expect("second page");
    assert!(second.status.success(), "{second:?}");
    let second = stdout_json(&second);
    assert_eq!(second["rows"].as_array().map(Vec::len), Some(2));
    assert!(second["next_cursor"].is_null());
}

#[test]
fn query_with_no_match_exits_with_not_found() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = ingest_fixture(tmp.path());
    let output = yubin()
        .args(["--json", "query", "--zipcode", "9999999", "--db"])
        .arg(&db)
        .output()
        .expect("run query");
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stderr_machine_error(&output)["code"], "not_found");
}

#[test]
fn undecodable_input_exits_with_validation_code() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("KEN_ALL.CSV");
    std::fs::write(&input, [0x30, 0x2c, 0x82, 0x0a]).expect("write bad bytes");
    let output = yubin()
        .args(["--json", "ingest", "--family", "ken_all", "--input"])
        .arg(&input)
        .arg("--db")
        .arg(tmp.path().join("zipcode.db"))
        .output()
        .expect("run ingest");
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stderr_machine_error(&output)["code"], "format_error");
}

#[test]
fn inspect_db_reports_index_and_meta() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = ingest_fixture(tmp.path());
    let output = yubin()
        .args(["--json", "inspect-db", "--db"])
        .arg(&db)
        .output()
        .expect("run inspect-db");
    assert!(output.status.success(), "{output:?}");
    let body = stdout_json(&output);
    assert_eq!(body["schema_version"], 1);
    let indexes = body["indexes"].as_array().expect("indexes");
    assert!(indexes.iter().any(|i| i == "idx_ken_all_zipcode"));
    let families = body["families"].as_array().expect("families");
    assert_eq!(families.len(), 1);
    assert_eq!(families[0]["row_count"], 7);
    assert_eq!(families[0]["meta"]["row_count"], 7);
}

#[test]
fn completion_prints_a_script() {
    let output = yubin()
        .args(["completion", "bash"])
        .output()
        .expect("run completion");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8 completion");
    assert!(text.contains("yubin"));
}

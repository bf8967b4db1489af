// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Ten KEN_ALL rows exercising placeholders, a three-row continuation,
/// ranges, a floor number, a whole-area suffix, a duplicate and a hyphen.
pub const KEN_ALL_ROWS: &[&str] = &[
    r#"01101,"060  ","0600000","ﾎｯｶｲﾄﾞｳ","ｻｯﾎﾟﾛｼﾁｭｳｵｳｸ","ｲｶﾆｹｲｻｲｶﾞﾅｲﾊﾞｱｲ","北海道","札幌市中央区","以下に掲載がない場合",0,0,0,0,0,0"#,
    r#"01101,"064  ","0640941","ﾎｯｶｲﾄﾞｳ","ｻｯﾎﾟﾛｼﾁｭｳｵｳｸ","ｱｻﾋｶﾞｵｶ","北海道","札幌市中央区","旭ケ丘",0,0,1,0,0,0"#,
    r#"01101,"060  ","0600042","ﾎｯｶｲﾄﾞｳ","ｻｯﾎﾟﾛｼﾁｭｳｵｳｸ","ｵｵﾄﾞｵﾘﾆｼ(1-19ﾁｮｳﾒ)","北海道","札幌市中央区","大通西（１〜１９丁目）",1,0,1,0,0,0"#,
    r#"01607,"05803","0580343","ﾎｯｶｲﾄﾞｳ","ｻﾏﾆｸﾞﾝｻﾏﾆﾁｮｳ","ﾄｳﾖｳ","北海道","様似郡様似町","東洋（油駒、南東洋、",0,0,0,0,0,0"#,
    r#"01607,"05803","0580343","ﾎｯｶｲﾄﾞｳ","ｻﾏﾆｸﾞﾝｻﾏﾆﾁｮｳ","ﾄｳﾖｳ","北海道","様似郡様似町","１３２〜１５６、１５８〜３５４、",0,0,0,0,0,0"#,
    r#"01607,"05803","0580343","ﾎｯｶｲﾄﾞｳ","ｻﾏﾆｸﾞﾝｻﾏﾆﾁｮｳ","ﾄｳﾖｳ","北海道","様似郡様似町","３６６、３６７番地）",0,0,0,0,0,0"#,
    r#"13101,"100  ","1006890","ﾄｳｷｮｳﾄ","ﾁﾖﾀﾞｸ","ｵｵﾃﾏﾁｼﾞｪｲｴｲﾋﾞﾙ(3ｶｲ)","東京都","千代田区","大手町ＪＡビル（３階）",0,0,0,0,0,0"#,
    r#"01101,"064  ","0640941","ﾎｯｶｲﾄﾞｳ","ｻｯﾎﾟﾛｼﾁｭｳｵｳｸ","ｱｻﾋｶﾞｵｶ","北海道","札幌市中央区","旭ケ丘",0,0,1,0,0,0"#,
    r#"20385,"39945","3994511","ﾅｶﾞﾉｹﾝ","ｶﾐｲﾅｸﾞﾝﾐﾅﾐﾐﾉﾜﾑﾗ","ﾐﾅﾐﾐﾉﾜﾑﾗｲﾁｴﾝ","長野県","上伊那郡南箕輪村","南箕輪村一円",0,0,0,0,0,0"#,
    r#"01102,"001  ","0010010","ﾎｯｶｲﾄﾞｳ","ｻｯﾎﾟﾛｼｷﾀｸ","ｷﾀ10ｼﾞｮｳﾆｼ","北海道","札幌市北区","北十条西（１−４丁目）",0,0,1,0,0,0"#,
];

/// `(zipcode, town)` for every catalog row the fixture must produce, in id
/// order.
pub const KEN_ALL_EXPECTED: &[(&str, &str)] = &[
    ("0600000", ""),
    ("0640941", "旭ケ丘"),
    ("0600042", "大通西"),
    ("0580343", "東洋"),
    ("0580343", "東洋油駒"),
    ("0580343", "東洋南東洋"),
    ("0580343", "東洋366番地"),
    ("0580343", "東洋367番地"),
    ("1006890", "大手町JAビル3階"),
    ("3994511", "南箕輪村"),
    ("0010010", "北十条西"),
    ("0010010", "北十条西1-4丁目"),
];

pub const JIGYOSYO_ROWS: &[&str] = &[
    r#"01101,"ｻﾂﾎﾟﾛｼﾁﾕｳｵｳｸﾔｸｼﾖ","札幌市中央区役所","北海道","札幌市中央区","南三条西","１１丁目","0608612","060  ","札幌中央",0,0,0"#,
    r#"01101,"ｻﾂﾎﾟﾛｼﾁﾕｳｵｳｸﾔｸｼﾖ","札幌市中央区役所","北海道","札幌市中央区","南三条西","１１丁目","0608612","060  ","札幌中央",0,0,0"#,
    r#"13101,"ﾆﾂﾎﾟﾝﾕｳﾋﾞﾝ","日本郵便　株式会社","東京都","千代田区","大手町","","1008798","100  ","銀座",0,0,0"#,
];

/// Joins rows with CRLF and encodes them as the publisher does.
pub fn encode_rows(rows: &[&str], label: &str) -> Vec<u8> {
    let encoding = encoding_rs::Encoding::for_label(label.as_bytes()).expect("known label");
    let text = rows.iter().map(|r| format!("{r}\r\n")).collect::<String>();
    let (bytes, _, unmappable) = encoding.encode(&text);
    assert!(!unmappable, "fixture text must be representable in {label}");
    bytes.into_owned()
}

pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

pub fn ken_all_fixture(dir: &Path) -> PathBuf {
    write_fixture(dir, "KEN_ALL.CSV", &encode_rows(KEN_ALL_ROWS, "shift_jis"))
}

pub fn jigyosyo_fixture(dir: &Path) -> PathBuf {
    write_fixture(dir, "JIGYOSYO.CSV", &encode_rows(JIGYOSYO_ROWS, "windows-31j"))
}

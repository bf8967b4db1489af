// SPDX-License-Identifier: Apache-2.0

//! Bracket expansion: `甲(乙、丙)` becomes `甲、甲乙、甲丙`.

const RANGE_MARKERS: [char; 2] = ['〜', '~'];
const UNIT_SUFFIXES: [&str; 2] = ["番地", "丁目"];
const SEGMENT_SEPARATORS: [char; 2] = ['(', '、'];

fn ends_in_number(segment: &str) -> bool {
    segment
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_digit() || c == '−' || c == '-')
}

fn with_unit(segment: &str, unit: Option<&str>) -> String {
    match unit {
        Some(unit) if ends_in_number(segment) => format!("{segment}{unit}"),
        _ => segment.to_string(),
    }
}

/// Expands a parenthesized enumeration into a `、`-separated list whose
/// first element is the bare prefix and every later element is prefixed
/// with it. Items holding a range marker are dropped; when the list ends in
/// `番地)` or `丁目)` that unit is appended to items ending in a number.
/// A town without parentheses or `、` comes back unchanged.
#[must_use]
pub fn expand_brackets(town: &str) -> String {
    let town = town.replace("()", "");
    let unit = UNIT_SUFFIXES
        .into_iter()
        .find(|u| town.strip_suffix(')').is_some_and(|t| t.ends_with(u)));
    let mut segments = town.split(SEGMENT_SEPARATORS);
    let prefix = with_unit(segments.next().unwrap_or_default(), unit);
    let mut out = vec![prefix.clone()];
    out.extend(
        segments
            .filter(|s| !s.contains(RANGE_MARKERS))
            .map(|s| format!("{prefix}{}", with_unit(s, unit))),
    );
    let joined = out.join("、");
    match joined.strip_suffix(')') {
        Some(trimmed) => trimmed.to_string(),
        None => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::expand_brackets;

    #[test]
    fn enumeration_with_ranges_and_banchi_unit() {
        assert_eq!(
            expand_brackets("東洋(油駒、南東洋、132〜156、158〜354、366、367番地)"),
            "東洋、東洋油駒、東洋南東洋、東洋366番地、東洋367番地"
        );
    }

    #[test]
    fn chome_unit_applies_to_numeric_items() {
        assert_eq!(
            expand_brackets("大通(1、3丁目)"),
            "大通、大通1丁目、大通3丁目"
        );
    }

    #[test]
    fn merged_record_expands() {
        assert_eq!(expand_brackets("甲(乙丙)"), "甲、甲乙丙");
    }

    #[test]
    fn empty_parentheses_collapse_to_prefix() {
        assert_eq!(expand_brackets("甲()"), "甲");
    }

    #[test]
    fn only_range_items_leave_prefix() {
        assert_eq!(expand_brackets("北一条西(1〜19丁目)"), "北一条西");
    }

    #[test]
    fn plain_towns_are_unchanged() {
        assert_eq!(expand_brackets("北一条西"), "北一条西");
        assert_eq!(expand_brackets(""), "");
        assert_eq!(expand_brackets("大手町JAビル3階"), "大手町JAビル3階");
    }
}

// SPDX-License-Identifier: Apache-2.0

//! Table-driven town-name rewrite rules.
//!
//! Each rule is a descriptor: a name, a trigger deciding whether it applies
//! and a rewrite. A cascade applies its rules in table order, each one
//! seeing the output of the previous. Patterns assume width-folded input,
//! so parentheses are ASCII and digits are narrow.

use regex::{NoExpand, Regex};

use crate::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSpec {
    Always,
    /// Whole-field equality.
    Equals(&'static str),
    ContainsAny(&'static [&'static str]),
    /// Marker present and the field is longer than `min_chars` characters.
    ContainsLongerThan {
        marker: &'static str,
        min_chars: usize,
    },
    Matches(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteSpec {
    Clear,
    /// Regex replace-all with a literal replacement.
    Replace {
        pattern: &'static str,
        with: &'static str,
    },
    Literal {
        from: &'static str,
        to: &'static str,
    },
    StripChars(&'static [char]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSpec {
    pub name: &'static str,
    pub trigger: TriggerSpec,
    pub rewrite: RewriteSpec,
}

const fn rule(name: &'static str, trigger: TriggerSpec, rewrite: RewriteSpec) -> RuleSpec {
    RuleSpec {
        name,
        trigger,
        rewrite,
    }
}

const fn remove(name: &'static str, pattern: &'static str) -> RuleSpec {
    rule(
        name,
        TriggerSpec::Always,
        RewriteSpec::Replace { pattern, with: "" },
    )
}

const DROP_PARENTHESIZED: RewriteSpec = RewriteSpec::Replace {
    pattern: r"\(.*\)",
    with: "",
};

/// Rules applied before bracket expansion.
pub const PRE_EXPANSION_RULES: &[RuleSpec] = &[
    rule(
        "unlisted_placeholder",
        TriggerSpec::Equals("以下に掲載がない場合"),
        RewriteSpec::Clear,
    ),
    remove("banchi_follows_notice", r".*の次に番地がくる場合"),
    remove(
        "numbered_banchi_follows_notice",
        r".*の次に[\d〜~−-]+番地(以降)?がくる場合.*",
    ),
    rule(
        "whole_area_suffix",
        TriggerSpec::ContainsLongerThan {
            marker: "一円",
            min_chars: 2,
        },
        RewriteSpec::Literal {
            from: "一円",
            to: "",
        },
    ),
    remove("chiwari_range", r"第?\d+地割(〜|~|、).*地割"),
    remove("chiwari", r"第?\d+地割"),
    remove("whole_area", r"\(全域\)"),
    remove("chome_placeholder", r"\(丁目\)"),
    remove("each_town", r"\(各町\)"),
    remove("oaza_banchi_placeholder", r"\(大字、番地\)"),
    remove("banchi_placeholder", r"\(番地\)"),
    remove("no_banchi_parenthesized", r"\(無番地\)"),
    remove("no_banchi", r"無番地"),
    remove("banchi_only", r"番地のみ"),
    remove("mansion_placeholder", r"\(○○屋敷\)"),
    remove("unknown_floor", r"\(地階・階層不明\)"),
    remove("high_rise_building", r"\(高層棟\)"),
    rule(
        "floor_number",
        TriggerSpec::Matches(r"\(\d+階\)"),
        RewriteSpec::StripChars(&['(', ')']),
    ),
    remove("narita_airport_premises", r"\(成田国際空港内\)"),
    remove("sendai_airport_facilities", r"仙台空港関係施設"),
    remove("excluding_clause", r"\(.*を除く\)$"),
    remove("quoted_excluding_clause", r"「.*を除く」"),
    rule(
        "bounded_clause",
        TriggerSpec::ContainsAny(&["を含む", "以上", "以下", "以内", "以降"]),
        DROP_PARENTHESIZED,
    ),
    rule(
        "other_than_clause",
        TriggerSpec::Matches(r"以外\)$"),
        DROP_PARENTHESIZED,
    ),
    rule(
        "nakaichiriyama_banchi",
        TriggerSpec::Always,
        RewriteSpec::Literal {
            from: "中一里山「9番地の4、12番地」",
            to: "中一里山9番地の4、中一里山12番地",
        },
    ),
    remove("quoted_clause", r"「.*」(以外)?"),
    rule(
        "others_clause",
        TriggerSpec::ContainsAny(&["その他"]),
        DROP_PARENTHESIZED,
    ),
];

/// Whole-string corrections for enumerations the generic expander cannot
/// split, applied after expansion.
pub const TOWN_CORRECTIONS: &[(&str, &str)] = &[
    ("野牛稲崎平302番地・315番地", "野牛稲崎平302番地、野牛稲崎平315番地"),
    ("戸山3丁目18・21番", "戸山3丁目18番、戸山3丁目21番"),
    ("御料牧場・成田国際空港内", "御料牧場"),
    ("大豆4の2・4・6番地", "大豆4の2番地、大豆4の4番地、大豆4の6番地"),
    ("新所・岡崎・梅田入会地", "新所、岡崎、梅田入会地"),
    ("岡之原町832の2・4", "岡之原町832の2、岡之原町832の4"),
    ("結東逆巻・前倉・結東", "結東逆巻、結東前倉、結東"),
    ("北山渋御殿湯・渋の湯", "北山渋御殿湯、北山渋の湯"),
    ("中山町出渕豊岡・東町", "中山町出渕豊岡、中山町出渕東町"),
    ("浦ノ内東分鳴無・坂内", "浦ノ内東分鳴無、浦ノ内東分坂内"),
    ("釜ケ島土手畑・藤場", "釜ケ島土手畑、釜ケ島藤場"),
    ("牧白滝B・C", "牧白滝B、牧白滝C"),
    ("土居甲・乙", "土居甲、土居乙"),
];

/// Minus-sign variants folded to ASCII `-` as the last step.
pub const HYPHEN_RULE: RuleSpec = rule(
    "ascii_hyphen",
    TriggerSpec::Always,
    RewriteSpec::Replace {
        pattern: "[−‐‑]",
        with: "-",
    },
);

#[derive(Debug, Clone)]
enum Trigger {
    Always,
    Equals(&'static str),
    ContainsAny(&'static [&'static str]),
    ContainsLongerThan {
        marker: &'static str,
        min_chars: usize,
    },
    Matches(Regex),
}

#[derive(Debug, Clone)]
enum Rewrite {
    Clear,
    Replace { pattern: Regex, with: &'static str },
    Literal { from: &'static str, to: &'static str },
    StripChars(&'static [char]),
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct TownRule {
    name: &'static str,
    trigger: Trigger,
    rewrite: Rewrite,
}

impl TownRule {
    pub fn compile(spec: &RuleSpec) -> Result<Self, regex::Error> {
        let trigger = match spec.trigger {
            TriggerSpec::Always => Trigger::Always,
            TriggerSpec::Equals(s) => Trigger::Equals(s),
            TriggerSpec::ContainsAny(markers) => Trigger::ContainsAny(markers),
            TriggerSpec::ContainsLongerThan { marker, min_chars } => {
                Trigger::ContainsLongerThan { marker, min_chars }
            }
            TriggerSpec::Matches(pattern) => Trigger::Matches(Regex::new(pattern)?),
        };
        let rewrite = match spec.rewrite {
            RewriteSpec::Clear => Rewrite::Clear,
            RewriteSpec::Replace { pattern, with } => Rewrite::Replace {
                pattern: Regex::new(pattern)?,
                with,
            },
            RewriteSpec::Literal { from, to } => Rewrite::Literal { from, to },
            RewriteSpec::StripChars(chars) => Rewrite::StripChars(chars),
        };
        Ok(Self {
            name: spec.name,
            trigger,
            rewrite,
        })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn triggers_on(&self, town: &str) -> bool {
        match &self.trigger {
            Trigger::Always => true,
            Trigger::Equals(s) => town == *s,
            Trigger::ContainsAny(markers) => markers.iter().any(|m| town.contains(m)),
            Trigger::ContainsLongerThan { marker, min_chars } => {
                town.contains(marker) && town.chars().count() > *min_chars
            }
            Trigger::Matches(re) => re.is_match(town),
        }
    }

    /// The rewritten text, or `None` when the rule leaves `town` unchanged.
    #[must_use]
    pub fn apply(&self, town: &str) -> Option<String> {
        if !self.triggers_on(town) {
            return None;
        }
        let out = match &self.rewrite {
            Rewrite::Clear => String::new(),
            Rewrite::Replace { pattern, with } => {
                let mut out = pattern.replace_all(town, NoExpand(with)).into_owned();
                // Removal can splice a fresh match together (`無無番地番地`).
                while with.is_empty() && pattern.is_match(&out) {
                    let next = pattern.replace_all(&out, NoExpand(with)).into_owned();
                    if next.len() >= out.len() {
                        break;
                    }
                    out = next;
                }
                out
            }
            Rewrite::Literal { from, to } => town.replace(from, to),
            Rewrite::StripChars(chars) => town.chars().filter(|c| !chars.contains(c)).collect(),
        };
        (out != town).then_some(out)
    }
}

/// An ordered list of compiled rules.
#[derive(Debug, Clone)]
pub struct RuleCascade {
    rules: Vec<TownRule>,
}

impl RuleCascade {
    pub fn compile(specs: &[RuleSpec]) -> Result<Self, IngestError> {
        let rules = specs
            .iter()
            .map(|spec| {
                TownRule::compile(spec).map_err(|e| {
                    IngestError::config(format!("rule {} does not compile: {e}", spec.name))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn pre_expansion() -> Result<Self, IngestError> {
        Self::compile(PRE_EXPANSION_RULES)
    }

    /// Corrections table followed by hyphen folding.
    pub fn finishing() -> Result<Self, IngestError> {
        let mut specs: Vec<RuleSpec> = TOWN_CORRECTIONS
            .iter()
            .map(|&(from, to)| {
                rule(
                    "town_correction",
                    TriggerSpec::Always,
                    RewriteSpec::Literal { from, to },
                )
            })
            .collect();
        specs.push(HYPHEN_RULE);
        Self::compile(&specs)
    }

    #[must_use]
    pub fn apply(&self, town: &str) -> String {
        self.rules
            .iter()
            .fold(town.to_string(), |acc, r| r.apply(&acc).unwrap_or(acc))
    }

    /// Like [`apply`](Self::apply), also naming each rule that changed the
    /// text, in firing order.
    #[must_use]
    pub fn apply_traced(&self, town: &str) -> (String, Vec<&'static str>) {
        let mut fired = Vec::new();
        let mut acc = town.to_string();
        for r in &self.rules {
            if let Some(next) = r.apply(&acc) {
                fired.push(r.name());
                acc = next;
            }
        }
        (acc, fired)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(TownRule::name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

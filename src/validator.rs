//! Checks class tokens against the resolved design tokens.
//!
//! Colors and spacing utilities must name a resolved token; sizing and
//! single-side border utilities are checked too, with a few fixed keywords
//! allowed. Every other utility is accepted once it is recognized, and
//! unrecognized tokens pass through untouched. Arbitrary values (`w-[50px]`)
//! are always rejected.
//!
//! Validation never fails. Every token is examined and each rejected one
//! yields a [`Rejection`]; the accepted tokens form the sanitized output.

use crate::options::Options;
use crate::prefix::{split_variants, Category, PrefixMatch, PrefixTable, BORDER_SIDE_PREFIXES, SIZING_PREFIXES};
use crate::suggest::suggest;
use crate::tokenizer::{class_attributes, split_classes, ClassToken, Piece};
use crate::truth::{Family, ResolvedTruth};
use crate::utils::get_line_and_column;
use serde::Serialize;
use std::fmt;

const TEXT_SIZES: &[&str] = &[
    "xs", "sm", "base", "lg", "xl", "2xl", "3xl", "4xl", "5xl", "6xl", "7xl", "8xl", "9xl",
];

const BORDER_WIDTHS: &[&str] = &["0", "2", "4", "8"];

const SIZE_KEYWORDS: &[&str] = &[
    "auto", "full", "screen", "svw", "svh", "lvw", "lvh", "dvw", "dvh", "min", "max", "fit",
    "none", "prose", "px", "xs", "sm", "md", "lg", "xl", "2xl", "3xl", "4xl", "5xl", "6xl",
    "7xl", "screen-sm", "screen-md", "screen-lg", "screen-xl", "screen-2xl",
];

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    ArbitraryValue,
    UnknownColor,
    UnknownTextSizeOrColor,
    UnknownBorderWidthOrColor,
    UnknownSpacing,
    UnknownSize,
}

impl RejectionReason {
    fn expected(self) -> &'static str {
        match self {
            RejectionReason::ArbitraryValue => "a design token",
            RejectionReason::UnknownColor => "a color",
            RejectionReason::UnknownTextSizeOrColor => "a text size or a color",
            RejectionReason::UnknownBorderWidthOrColor => "a border width or a color",
            RejectionReason::UnknownSpacing => "a spacing step",
            RejectionReason::UnknownSize => "a size keyword, a fraction or a spacing step",
        }
    }
}

/// A rejected token, where it was found and what could replace it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub token: String,
    /// The part of the token that failed the check, e.g. `giant` in
    /// `text-giant`.
    pub value: String,
    pub reason: RejectionReason,
    /// Full replacement classes, nearest first, with variants and prefix
    /// kept from the original token.
    pub suggestions: Vec<String>,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            RejectionReason::ArbitraryValue => write!(
                f,
                "Invalid class \"{}\": arbitrary values are not allowed, use {}.",
                self.token,
                self.reason.expected()
            )?,
            reason => write!(
                f,
                "Invalid class \"{}\": \"{}\" is not {}.",
                self.token,
                self.value,
                reason.expected()
            )?,
        }
        if !self.suggestions.is_empty() {
            let quoted: Vec<String> = self.suggestions.iter().map(|s| format!("\"{s}\"")).collect();
            write!(f, " Did you mean {}?", quoted.join(", "))?;
        }
        Ok(())
    }
}

/// The outcome of validating a class string or a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// The input with every rejected token removed.
    pub code: String,
    /// One message per rejected token, in input order.
    pub errors: Vec<String>,
    #[serde(skip)]
    pub rejections: Vec<Rejection>,
}

impl ValidationResult {
    fn new(code: String, rejections: Vec<Rejection>) -> Self {
        Self {
            is_valid: rejections.is_empty(),
            code,
            errors: rejections.iter().map(ToString::to_string).collect(),
            rejections,
        }
    }

    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// The check applied to the remainder of a matched stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Color,
    TextSizeOrColor,
    BorderWidthOrColor,
    Spacing,
    Size,
    BorderSide,
}

impl Rule {
    /// `None` when the match is accepted without looking at its remainder.
    fn for_match(found: &PrefixMatch<'_, '_>) -> Option<Rule> {
        if found.is_exact() {
            return None;
        }
        match found.category {
            Category::Colors => Some(match found.prefix {
                "text-" => Rule::TextSizeOrColor,
                "border-" => Rule::BorderWidthOrColor,
                _ => Rule::Color,
            }),
            Category::Spacing => Some(Rule::Spacing),
            Category::Layout if SIZING_PREFIXES.contains(&found.prefix) => Some(Rule::Size),
            Category::Layout if BORDER_SIDE_PREFIXES.contains(&found.prefix) => Some(Rule::BorderSide),
            Category::Layout | Category::Typography | Category::Decoration => None,
        }
    }

    fn family(self) -> Family {
        match self {
            Rule::Color | Rule::TextSizeOrColor | Rule::BorderWidthOrColor => Family::Colors,
            Rule::Spacing | Rule::Size | Rule::BorderSide => Family::Spacing,
        }
    }

    fn reason(self) -> RejectionReason {
        match self {
            Rule::Color => RejectionReason::UnknownColor,
            Rule::TextSizeOrColor => RejectionReason::UnknownTextSizeOrColor,
            Rule::BorderWidthOrColor => RejectionReason::UnknownBorderWidthOrColor,
            Rule::Spacing | Rule::BorderSide => RejectionReason::UnknownSpacing,
            Rule::Size => RejectionReason::UnknownSize,
        }
    }
}

/// What went wrong with a single token, before its position is known.
struct Finding {
    value: String,
    reason: RejectionReason,
    suggestions: Vec<String>,
}

/// Validates class tokens against one [`ResolvedTruth`].
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    truth: &'a ResolvedTruth,
    table: &'a PrefixTable,
    max_suggestions: usize,
    strip_variants: bool,
}

impl<'a> Validator<'a> {
    pub fn new(truth: &'a ResolvedTruth) -> Self {
        Self::with_options(truth, &Options::default())
    }

    pub fn with_options(truth: &'a ResolvedTruth, options: &Options) -> Self {
        Self {
            truth,
            table: PrefixTable::standard(),
            max_suggestions: options.max_suggestions,
            strip_variants: options.strip_variants,
        }
    }

    /// Uses `table` instead of the standard prefix table.
    #[must_use]
    pub fn with_table(mut self, table: &'a PrefixTable) -> Self {
        self.table = table;
        self
    }

    /// Whether a single class token would be accepted.
    pub fn accepts(&self, token: &str) -> bool {
        self.examine(token).is_none()
    }

    /// Validates a whitespace-separated class string. The result's `code` is
    /// the accepted tokens joined by single spaces, in their original order.
    pub fn validate_classes(&self, classes: &str) -> ValidationResult {
        let mut rejections = Vec::new();
        let accepted: Vec<&str> = split_classes(classes, 0)
            .into_iter()
            .filter(|token| self.admit(token, classes, &mut rejections))
            .map(|token| token.value)
            .collect();
        ValidationResult::new(accepted.join(" "), rejections)
    }

    /// Validates every class attribute in `source`. The result's `code` is
    /// `source` with rejected tokens removed from their attributes;
    /// attributes without rejections are left byte for byte as they were.
    pub fn validate_source(&self, source: &str) -> ValidationResult {
        let mut rejections = Vec::new();
        let mut code = String::with_capacity(source.len());
        let mut copied = 0;

        for attribute in class_attributes(source) {
            let before = rejections.len();
            let kept: Vec<&str> = attribute
                .pieces
                .iter()
                .filter_map(|piece| match piece {
                    Piece::Class(token) => self.admit(token, source, &mut rejections).then_some(token.value),
                    Piece::Dynamic(text) => Some(*text),
                })
                .collect();
            if rejections.len() == before {
                continue;
            }
            code.push_str(&source[copied..attribute.start]);
            code.push_str(&kept.join(" "));
            copied = attribute.end;
        }
        code.push_str(&source[copied..]);

        ValidationResult::new(code, rejections)
    }

    /// Records a rejection for `token` if it fails. `text` is what the
    /// token's offset refers to.
    fn admit(&self, token: &ClassToken<'_>, text: &str, rejections: &mut Vec<Rejection>) -> bool {
        let Some(finding) = self.examine(token.value) else {
            return true;
        };
        let (line, column) = get_line_and_column(text, token.start);
        let rejection = Rejection {
            token: token.value.to_string(),
            value: finding.value,
            reason: finding.reason,
            suggestions: finding.suggestions,
            line,
            column,
        };
        log::debug!("{line}:{column}: {rejection}");
        rejections.push(rejection);
        false
    }

    fn examine(&self, token: &str) -> Option<Finding> {
        if token.contains('[') && token.contains(']') {
            return Some(Finding {
                value: token.to_string(),
                reason: RejectionReason::ArbitraryValue,
                suggestions: Vec::new(),
            });
        }

        let (variants, utility) = if self.strip_variants {
            let split = split_variants(token);
            (split.prefix, split.utility)
        } else {
            ("", token)
        };
        let found = self.table.match_token(utility)?;
        let rule = Rule::for_match(&found)?;
        let value = found.remainder;
        if self.satisfies(rule, value) {
            return None;
        }

        let target = match rule.family() {
            Family::Colors => strip_opacity(value),
            Family::Spacing => value,
        };
        let pool = self.truth.family(rule.family()).keys();
        let suggestions = suggest(target, pool, self.max_suggestions)
            .into_iter()
            .map(|candidate| format!("{variants}{}{candidate}", found.prefix))
            .collect();
        Some(Finding {
            value: value.to_string(),
            reason: rule.reason(),
            suggestions,
        })
    }

    fn satisfies(&self, rule: Rule, value: &str) -> bool {
        match rule {
            Rule::Color => self.is_color(value),
            Rule::TextSizeOrColor => TEXT_SIZES.contains(&value) || self.is_color(value),
            Rule::BorderWidthOrColor => BORDER_WIDTHS.contains(&value) || self.is_color(value),
            Rule::Spacing | Rule::BorderSide => self.is_spacing(value),
            Rule::Size => SIZE_KEYWORDS.contains(&value) || is_fraction(value) || self.is_spacing(value),
        }
    }

    fn is_color(&self, value: &str) -> bool {
        self.truth.colors().contains_key(strip_opacity(value))
    }

    fn is_spacing(&self, value: &str) -> bool {
        self.truth.spacing().contains_key(value)
    }
}

/// Drops an opacity modifier: `blue-500/50` becomes `blue-500`.
fn strip_opacity(value: &str) -> &str {
    match value.rsplit_once('/') {
        Some((color, alpha)) if is_digits(alpha) => color,
        _ => value,
    }
}

/// `1/2`, `2/3`, `11/12` and the like.
fn is_fraction(value: &str) -> bool {
    value
        .split_once('/')
        .is_some_and(|(numerator, denominator)| is_digits(numerator) && is_digits(denominator))
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

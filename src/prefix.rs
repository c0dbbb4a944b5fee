//! Maps a class token to the utility family it belongs to.
//!
//! A [`PrefixTable`] registers prefixes under a [`Category`]. A prefix ending
//! in `-` is a stem and matches any token starting with it; any other prefix
//! matches only the identical token. When several prefixes match, the longest
//! one wins, and between equally long prefixes the first registered wins.

use std::fmt;
use std::sync::OnceLock;

/// Utility families. `Colors` and `Spacing` are checked against the resolved
/// design tokens; the others are accepted once matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Colors,
    Spacing,
    Layout,
    Typography,
    Decoration,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Colors => "colors",
            Category::Spacing => "spacing",
            Category::Layout => "layout",
            Category::Typography => "typography",
            Category::Decoration => "decoration",
        };
        f.write_str(name)
    }
}

/// The outcome of matching a token against a [`PrefixTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixMatch<'p, 't> {
    pub category: Category,
    pub prefix: &'p str,
    /// What follows a stem prefix. Always empty for exact prefixes.
    pub remainder: &'t str,
}

impl PrefixMatch<'_, '_> {
    pub fn is_exact(&self) -> bool {
        !is_stem(self.prefix)
    }
}

fn is_stem(prefix: &str) -> bool {
    prefix.ends_with('-')
}

#[derive(Debug, Clone)]
pub struct PrefixTable {
    entries: Vec<(Category, String)>,
}

impl PrefixTable {
    /// Builds a table from `(category, prefixes)` groups. Registration order
    /// is the group order followed by the order within each group.
    pub fn new<I, P, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = (Category, P)>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = groups
            .into_iter()
            .flat_map(|(category, prefixes)| {
                prefixes.into_iter().map(move |prefix| (category, prefix.into()))
            })
            .collect();
        Self { entries }
    }

    /// The built-in table of utility prefixes.
    pub fn standard() -> &'static PrefixTable {
        static TABLE: OnceLock<PrefixTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            let layout = [SIZING_PREFIXES, BORDER_SIDE_PREFIXES, LAYOUT_PREFIXES].concat();
            PrefixTable::new([
                (Category::Colors, COLOR_PREFIXES.to_vec()),
                (Category::Spacing, SPACING_PREFIXES.to_vec()),
                (Category::Layout, layout),
                (Category::Typography, TYPOGRAPHY_PREFIXES.to_vec()),
                (Category::Decoration, DECORATION_PREFIXES.to_vec()),
            ])
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered prefixes with their category, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &str)> {
        self.entries
            .iter()
            .map(|(category, prefix)| (*category, prefix.as_str()))
    }

    /// Finds the longest prefix matching `token`. Returns `None` for tokens
    /// no prefix claims.
    pub fn match_token<'p, 't>(&'p self, token: &'t str) -> Option<PrefixMatch<'p, 't>> {
        let mut best: Option<(Category, &'p str)> = None;
        for (category, prefix) in &self.entries {
            let hit = if is_stem(prefix) {
                token.starts_with(prefix.as_str())
            } else {
                token == prefix.as_str()
            };
            if !hit {
                continue;
            }
            // Strictly longer only, so the first registered keeps a tie.
            if best.map_or(true, |(_, current)| prefix.len() > current.len()) {
                best = Some((*category, prefix.as_str()));
            }
        }

        best.map(|(category, prefix)| PrefixMatch {
            category,
            prefix,
            remainder: if is_stem(prefix) { &token[prefix.len()..] } else { "" },
        })
    }
}

/// A class split into its variant prefix and the utility it applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variants<'t> {
    /// Everything before the utility: `md:hover:` and a `!` marker.
    pub prefix: &'t str,
    pub utility: &'t str,
}

/// Splits `md:hover:!bg-red-500` into `md:hover:!` and `bg-red-500`.
///
/// The split happens after the last `:` that is not inside square brackets,
/// so arbitrary values such as `bg-[url(a:b)]` stay whole.
pub fn split_variants(token: &str) -> Variants<'_> {
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in token.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => start = i + 1,
            _ => {}
        }
    }
    if token[start..].starts_with('!') {
        start += 1;
    }
    Variants {
        prefix: &token[..start],
        utility: &token[start..],
    }
}

/// Stems whose remainder must be a resolved color key.
const COLOR_PREFIXES: &[&str] = &[
    "bg-",
    "text-",
    "border-",
    "from-",
    "via-",
    "to-",
    "fill-",
    "stroke-",
    "placeholder-",
    "caret-",
    "accent-",
    "divide-",
];

/// Stems whose remainder must be a resolved spacing key.
const SPACING_PREFIXES: &[&str] = &[
    "p-", "px-", "py-", "pt-", "pr-", "pb-", "pl-", "ps-", "pe-",
    "m-", "mx-", "my-", "mt-", "mr-", "mb-", "ml-", "ms-", "me-",
    "-m-", "-mx-", "-my-", "-mt-", "-mr-", "-mb-", "-ml-",
    "gap-", "gap-x-", "gap-y-",
    "space-x-", "space-y-", "-space-x-", "-space-y-",
    "indent-", "scroll-m-", "scroll-p-", "-indent-",
];

/// Sizing stems. Their remainder may be a keyword, a fraction or a spacing key.
pub const SIZING_PREFIXES: &[&str] = &["w-", "h-", "min-w-", "min-h-", "max-w-", "max-h-", "size-"];

/// Single-side border width stems. Their remainder must be a spacing key.
pub const BORDER_SIDE_PREFIXES: &[&str] = &[
    "border-t-",
    "border-b-",
    "border-l-",
    "border-r-",
    "border-x-",
    "border-y-",
    "border-s-",
    "border-e-",
];

/// Layout prefixes besides the sizing and border side stems, which are
/// registered ahead of these.
const LAYOUT_PREFIXES: &[&str] = &[
    // display and position
    "block", "inline-block", "inline", "flex", "inline-flex", "grid", "inline-grid",
    "contents", "hidden", "table", "flow-root", "container",
    "static", "fixed", "absolute", "relative", "sticky",
    "visible", "invisible", "collapse", "isolate",
    "grow", "shrink",
    "mx-auto", "my-auto", "m-auto", "mt-auto", "mb-auto", "ml-auto", "mr-auto", "ms-auto", "me-auto",
    "space-x-reverse", "space-y-reverse",
    // flex and grid
    "flex-", "basis-", "grow-", "shrink-", "order-",
    "grid-cols-", "grid-rows-", "grid-flow-", "auto-cols-", "auto-rows-",
    "col-", "row-",
    "justify-", "items-", "content-", "self-", "place-",
    // placement
    "z-", "inset-", "top-", "right-", "bottom-", "left-", "start-", "end-",
    "-inset-", "-top-", "-right-", "-bottom-", "-left-",
    "overflow-", "overscroll-", "object-", "aspect-", "columns-",
    "float-", "clear-", "box-", "break-before-", "break-after-", "break-inside-", "-z-",
];

const TYPOGRAPHY_PREFIXES: &[&str] = &[
    "font-", "leading-", "tracking-", "whitespace-", "break-", "line-clamp-",
    "list-", "align-", "hyphens-", "decoration-", "underline-offset-",
    "text-left", "text-center", "text-right", "text-justify", "text-start", "text-end",
    "text-wrap", "text-nowrap", "text-balance", "text-pretty", "text-ellipsis", "text-clip",
    "italic", "not-italic", "underline", "overline", "line-through", "no-underline",
    "uppercase", "lowercase", "capitalize", "normal-case", "truncate",
    "antialiased", "subpixel-antialiased", "sr-only", "not-sr-only",
    "ordinal", "slashed-zero", "tabular-nums", "normal-nums",
];

const DECORATION_PREFIXES: &[&str] = &[
    // borders
    "border", "border-t", "border-b", "border-l", "border-r", "border-x", "border-y",
    "border-solid", "border-dashed", "border-dotted", "border-double", "border-hidden",
    "border-none", "border-collapse", "border-separate",
    "divide-x", "divide-y", "divide-x-", "divide-y-", "divide-solid", "divide-dashed",
    "divide-dotted", "divide-x-reverse", "divide-y-reverse",
    "rounded", "rounded-",
    // effects
    "shadow", "shadow-", "opacity-", "ring", "ring-", "ring-inset", "ring-offset-",
    "outline", "outline-", "mix-blend-", "bg-blend-",
    // backgrounds
    "bg-cover", "bg-contain", "bg-auto", "bg-center", "bg-top", "bg-bottom", "bg-left",
    "bg-right", "bg-fixed", "bg-local", "bg-scroll", "bg-repeat", "bg-no-repeat",
    "bg-repeat-x", "bg-repeat-y", "bg-none", "bg-gradient-to-", "bg-clip-", "bg-origin-",
    // filters and transforms
    "blur", "blur-", "brightness-", "contrast-", "grayscale", "invert", "sepia",
    "drop-shadow-", "backdrop-", "transform", "scale-", "rotate-", "translate-x-",
    "translate-y-", "skew-x-", "skew-y-", "origin-",
    // motion and interaction
    "transition", "transition-", "duration-", "ease-", "delay-", "animate-",
    "cursor-",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn standard_match(token: &str) -> Option<(Category, &'static str, &str)> {
        PrefixTable::standard()
            .match_token(token)
            .map(|m| (m.category, m.prefix, m.remainder))
    }

    #[test]
    fn border_color_is_a_color() {
        assert_eq!(
            standard_match("border-blue-500"),
            Some((Category::Colors, "border-", "blue-500"))
        );
    }

    #[test]
    fn longest_prefix_wins() {
        assert_eq!(
            standard_match("border-t-2"),
            Some((Category::Layout, "border-t-", "2"))
        );
        assert_eq!(standard_match("gap-x-4"), Some((Category::Spacing, "gap-x-", "4")));
        assert_eq!(
            standard_match("bg-gradient-to-r"),
            Some((Category::Decoration, "bg-gradient-to-", "r"))
        );
    }

    #[test]
    fn exact_prefixes_need_the_whole_token() {
        assert_eq!(standard_match("border"), Some((Category::Decoration, "border", "")));
        assert_eq!(standard_match("text-center"), Some((Category::Typography, "text-center", "")));
        assert_eq!(standard_match("mx-auto"), Some((Category::Layout, "mx-auto", "")));
        // `flexible` is neither `flex` nor does it start with `flex-`.
        assert_eq!(standard_match("flexible"), None);
    }

    #[test]
    fn unknown_tokens_pass_through() {
        assert_eq!(standard_match("prose"), None);
        assert_eq!(standard_match("card-header"), None);
        assert_eq!(standard_match(""), None);
    }

    #[test]
    fn ties_go_to_first_registered() {
        let table = PrefixTable::new([
            (Category::Typography, vec!["ab-"]),
            (Category::Colors, vec!["ab-"]),
        ]);
        let found = table.match_token("ab-c").unwrap();
        assert_eq!(found.category, Category::Typography);
    }

    #[test]
    fn standard_table_has_no_duplicates() {
        let mut seen = HashSet::new();
        for (_, prefix) in PrefixTable::standard().iter() {
            assert!(seen.insert(prefix), "{prefix} registered twice");
        }
    }

    #[test]
    fn sizing_and_border_sides_are_layout_stems() {
        let table = PrefixTable::standard();
        for prefix in SIZING_PREFIXES.iter().chain(BORDER_SIDE_PREFIXES) {
            let token = format!("{prefix}4");
            let found = table.match_token(&token).unwrap();
            assert_eq!((found.category, found.prefix), (Category::Layout, *prefix));
        }
    }

    #[test]
    fn variants_split_at_last_colon() {
        let v = split_variants("md:hover:bg-red-500");
        assert_eq!((v.prefix, v.utility), ("md:hover:", "bg-red-500"));

        let v = split_variants("dark:!p-4");
        assert_eq!((v.prefix, v.utility), ("dark:!", "p-4"));

        let v = split_variants("p-4");
        assert_eq!((v.prefix, v.utility), ("", "p-4"));
    }

    #[test]
    fn colons_inside_brackets_are_not_variants() {
        let v = split_variants("lg:bg-[url(http://x)]");
        assert_eq!((v.prefix, v.utility), ("lg:", "bg-[url(http://x)]"));
    }
}

use crate::tree::{flatten, TokenTree};
use crate::truth::{Family, OrderedMap, TokenMap};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const DEFAULT_THEME_JSON: &str = include_str!("../assets/default_theme.json");

static BUILTIN: OnceLock<DefaultTheme> = OnceLock::new();

/// The fallback token families used when a project does not override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultTheme {
    pub version: String,
    pub colors: TokenMap,
    pub spacing: TokenMap,
}

// Nested as published; flattened on load.
#[derive(Deserialize)]
struct RawTheme {
    version: String,
    colors: OrderedMap<TokenTree>,
    spacing: OrderedMap<TokenTree>,
}

impl DefaultTheme {
    /// Loads a theme table from JSON of the shape
    /// `{ "version": "...", "colors": { ... }, "spacing": { ... } }`.
    /// Nested groups are flattened like configuration values.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if the JSON does not have that shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawTheme = serde_json::from_str(json)?;
        Ok(Self {
            version: raw.version,
            colors: flatten(&raw.colors),
            spacing: flatten(&raw.spacing),
        })
    }

    /// The table bundled with the crate, parsed on first use.
    ///
    /// # Panics
    ///
    /// Panics if the bundled asset is not valid, which the tests rule out.
    pub fn builtin() -> &'static DefaultTheme {
        BUILTIN.get_or_init(|| {
            let theme = Self::from_json(DEFAULT_THEME_JSON)
                .unwrap_or_else(|err| panic!("bundled default theme is invalid: {err}"));
            log::debug!(
                "loaded default theme v{} ({} colors, {} spacing steps)",
                theme.version,
                theme.colors.len(),
                theme.spacing.len()
            );
            theme
        })
    }

    pub fn family(&self, family: Family) -> &TokenMap {
        match family {
            Family::Colors => &self.colors,
            Family::Spacing => &self.spacing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_theme_loads() {
        let theme = DefaultTheme::builtin();
        assert_eq!(theme.version, "3.4");
        assert_eq!(theme.colors.len(), 5 + 22 * 11);
        assert_eq!(theme.spacing.len(), 35);
    }

    #[test]
    fn builtin_colors_are_flattened_in_order() {
        let colors = &DefaultTheme::builtin().colors;
        let first: Vec<&str> = colors.keys().take(7).collect();
        assert_eq!(
            first,
            vec!["inherit", "current", "transparent", "black", "white", "slate-50", "slate-100"]
        );
        assert_eq!(colors.get("blue-500").map(String::as_str), Some("#3b82f6"));
    }

    #[test]
    fn builtin_spacing_has_fractional_steps() {
        let spacing = &DefaultTheme::builtin().spacing;
        assert_eq!(spacing.get("0.5").map(String::as_str), Some("0.125rem"));
        assert_eq!(spacing.get("px").map(String::as_str), Some("1px"));
        assert_eq!(spacing.get("4").map(String::as_str), Some("1rem"));
    }

    #[test]
    fn custom_table_from_json() {
        let theme = DefaultTheme::from_json(
            r##"{ "version": "test", "colors": { "brand": { "DEFAULT": "#111" } }, "spacing": { "1": "4px" } }"##,
        )
        .unwrap();
        assert!(theme.colors.contains_key("brand"));
        assert_eq!(theme.family(Family::Spacing).len(), 1);
    }

    #[test]
    fn rejects_malformed_table() {
        assert!(DefaultTheme::from_json(r#"{ "colors": [] }"#).is_err());
    }
}

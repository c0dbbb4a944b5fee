use crate::defaults::DefaultTheme;
use crate::truth::{ExtractedTruth, Family, Origin, ResolvedTruth, TokenMap};

/// Merges extracted tokens with the built-in defaults.
pub fn resolve_with_builtin(extracted: &ExtractedTruth) -> ResolvedTruth {
    resolve(extracted, DefaultTheme::builtin())
}

/// Merges extracted tokens with `defaults`, family by family.
///
/// A non-empty override replaces the defaults as the baseline; the extend
/// bucket is then overlaid and wins on shared keys.
pub fn resolve(extracted: &ExtractedTruth, defaults: &DefaultTheme) -> ResolvedTruth {
    ResolvedTruth::new(
        resolve_family(extracted, defaults, Family::Colors),
        resolve_family(extracted, defaults, Family::Spacing),
    )
}

fn resolve_family(extracted: &ExtractedTruth, defaults: &DefaultTheme, family: Family) -> TokenMap {
    let overrides = extracted.bucket(Origin::Override).family(family);
    let extend = extracted.bucket(Origin::Extend).family(family);

    let mut resolved = if overrides.is_empty() {
        defaults.family(family).clone()
    } else {
        log::debug!(
            "{}: {} override token(s) replace the defaults",
            family.as_str(),
            overrides.len()
        );
        overrides.clone()
    };
    resolved.overlay(extend);
    log::trace!(
        "{}: {} token(s) after extending with {}",
        family.as_str(),
        resolved.len(),
        extend.len()
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme() -> DefaultTheme {
        DefaultTheme::from_json(
            r##"{
                "version": "test",
                "colors": { "red": "#f00", "blue": "#00f" },
                "spacing": { "1": "4px", "2": "8px" }
            }"##,
        )
        .unwrap()
    }

    fn truth(entries: &[(Origin, Family, &str, &str)]) -> ExtractedTruth {
        let mut truth = ExtractedTruth::default();
        for (origin, family, key, value) in entries {
            truth
                .bucket_mut(*origin)
                .family_mut(*family)
                .insert(*key, value.to_string());
        }
        truth
    }

    #[test]
    fn empty_truth_round_trips_to_defaults() {
        let defaults = theme();
        let resolved = resolve(&ExtractedTruth::default(), &defaults);
        assert_eq!(resolved.colors(), &defaults.colors);
        assert_eq!(resolved.spacing(), &defaults.spacing);
    }

    #[test]
    fn builtin_round_trip() {
        let resolved = resolve_with_builtin(&ExtractedTruth::default());
        assert_eq!(resolved.colors(), &DefaultTheme::builtin().colors);
        assert_eq!(resolved.spacing(), &DefaultTheme::builtin().spacing);
    }

    #[test]
    fn override_replaces_defaults() {
        let extracted = truth(&[(Origin::Override, Family::Colors, "brand", "#123")]);
        let resolved = resolve(&extracted, &theme());
        assert_eq!(resolved.colors().keys().collect::<Vec<_>>(), vec!["brand"]);
        // Spacing was not overridden and keeps the defaults.
        assert_eq!(resolved.spacing(), &theme().spacing);
    }

    #[test]
    fn extend_layers_over_defaults() {
        let extracted = truth(&[
            (Origin::Extend, Family::Colors, "brand", "#123"),
            (Origin::Extend, Family::Colors, "red", "#e00"),
        ]);
        let resolved = resolve(&extracted, &theme());
        assert_eq!(
            resolved.colors().keys().collect::<Vec<_>>(),
            vec!["red", "blue", "brand"]
        );
        assert_eq!(resolved.colors().get("red").map(String::as_str), Some("#e00"));
    }

    #[test]
    fn extend_layers_over_override() {
        let extracted = truth(&[
            (Origin::Override, Family::Spacing, "1", "1px"),
            (Origin::Override, Family::Spacing, "2", "2px"),
            (Origin::Extend, Family::Spacing, "2", "3px"),
            (Origin::Extend, Family::Spacing, "huge", "100px"),
        ]);
        let resolved = resolve(&extracted, &theme());
        let spacing = resolved.spacing();
        assert_eq!(spacing.get("1").map(String::as_str), Some("1px"));
        assert_eq!(spacing.get("2").map(String::as_str), Some("3px"));
        assert_eq!(spacing.get("huge").map(String::as_str), Some("100px"));
        assert_eq!(spacing.len(), 3);
    }

    #[test]
    fn merge_law_holds_for_every_key() {
        let defaults = theme();
        let cases = [
            truth(&[(Origin::Override, Family::Colors, "green", "#0f0")]),
            truth(&[(Origin::Extend, Family::Colors, "blue", "#00e")]),
            truth(&[
                (Origin::Override, Family::Colors, "red", "#a00"),
                (Origin::Extend, Family::Colors, "red", "#b00"),
                (Origin::Extend, Family::Spacing, "3", "12px"),
            ]),
        ];
        for extracted in &cases {
            let resolved = resolve(extracted, &defaults);
            for family in [Family::Colors, Family::Spacing] {
                let overrides = extracted.overrides.family(family);
                let extend = extracted.extend.family(family);
                let baseline = if overrides.is_empty() {
                    defaults.family(family)
                } else {
                    overrides
                };
                for (key, value) in resolved.family(family).iter() {
                    let expected = extend.get(key).or_else(|| baseline.get(key));
                    assert_eq!(Some(value), expected, "{key} in {}", family.as_str());
                }
            }
        }
    }
}

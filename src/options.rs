use serde::Deserialize;

/// Configuration file names probed at the project root, in order.
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    "tailwind.config.js",
    "tailwind.config.ts",
    "tailwind.config.cjs",
    "tailwind.config.mjs",
];

/// Tunables for extraction and validation. Every field has a default, so a
/// partial JSON or YAML document is enough to change one of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Options {
    /// File names to look for at the project root; the first one found wins.
    pub config_files: Vec<String>,
    /// How many suggestions a rejection carries at most.
    pub max_suggestions: usize,
    /// Split `md:`/`hover:` style variants and a leading `!` off a class
    /// before matching it.
    pub strip_variants: bool,
    /// Deepest object nesting accepted inside the `theme` section.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config_files: CONFIG_FILE_NAMES.iter().map(|s| s.to_string()).collect(),
            max_suggestions: 3,
            strip_variants: true,
            max_depth: 32,
        }
    }
}

impl Options {
    /// # Errors
    /// Returns a `serde_json::Error` if `json` is not a valid options object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// # Errors
    /// Returns a `serde_yaml::Error` if `yaml` is not a valid options mapping.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::default();
        assert_eq!(options.config_files[0], "tailwind.config.js");
        assert_eq!(options.config_files.len(), 4);
        assert_eq!(options.max_suggestions, 3);
        assert!(options.strip_variants);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let options = Options::from_json(r#"{ "max_suggestions": 5 }"#).unwrap();
        assert_eq!(options.max_suggestions, 5);
        assert_eq!(options.config_files, Options::default().config_files);
    }

    #[test]
    fn yaml_options() {
        let options = Options::from_yaml("strip_variants: false\nconfig_files: [theme.js]\n").unwrap();
        assert!(!options.strip_variants);
        assert_eq!(options.config_files, vec!["theme.js".to_string()]);
    }
}

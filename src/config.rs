//! Configuration management for sort operations

use crate::error::{SortError, SortResult};
use std::str::FromStr;

/// How keys are typed before comparison.
///
/// Only one mode is active per run. When several typed flags are requested
/// at once, [`KeyMode::resolve`] picks the winner by a fixed precedence:
/// numeric, then human-numeric, then version, then month, then plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    /// Byte-wise lexicographic comparison of the key
    #[default]
    Lexicographic,
    /// Floating point value of the whole key; non-numbers sort last
    Numeric,
    /// Numeric value scaled by a magnitude suffix (2K, 1.5Mi, 3G)
    HumanNumeric,
    /// Digit runs compared numerically, other runs as text
    Version,
    /// Three-letter month abbreviation
    Month,
}

/// Raw typed-mode flags as the user supplied them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub numeric: bool,
    pub human_numeric: bool,
    pub version: bool,
    pub month: bool,
}

impl ModeFlags {
    /// Number of typed flags that are set
    pub fn count(&self) -> usize {
        [self.numeric, self.human_numeric, self.version, self.month]
            .iter()
            .filter(|&&set| set)
            .count()
    }
}

impl KeyMode {
    /// Pick the active mode from a set of flags.
    pub fn resolve(flags: &ModeFlags) -> Self {
        let mode = if flags.numeric {
            KeyMode::Numeric
        } else if flags.human_numeric {
            KeyMode::HumanNumeric
        } else if flags.version {
            KeyMode::Version
        } else if flags.month {
            KeyMode::Month
        } else {
            KeyMode::Lexicographic
        };

        if flags.count() > 1 {
            log::warn!("several key modes requested; using {mode}");
        }
        mode
    }
}

impl FromStr for KeyMode {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexicographic" | "text" | "default" => Ok(KeyMode::Lexicographic),
            "numeric" => Ok(KeyMode::Numeric),
            "human-numeric" => Ok(KeyMode::HumanNumeric),
            "version" => Ok(KeyMode::Version),
            "month" => Ok(KeyMode::Month),
            _ => Err(SortError::parse_error(&format!("unknown sort mode: {s}"))),
        }
    }
}

impl std::fmt::Display for KeyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            KeyMode::Lexicographic => "lexicographic",
            KeyMode::Numeric => "numeric",
            KeyMode::HumanNumeric => "human-numeric",
            KeyMode::Version => "version",
            KeyMode::Month => "month",
        };
        write!(f, "{name}")
    }
}

/// Field separator used when a field index is selected
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Delimiter {
    /// Runs of whitespace; leading and trailing whitespace yield no fields
    #[default]
    Whitespace,
    /// Exact literal string; adjacent separators yield empty fields
    Literal(String),
}

impl From<&str> for Delimiter {
    /// A single space (or nothing at all) means "any whitespace run".
    fn from(s: &str) -> Self {
        if s.is_empty() || s == " " {
            Delimiter::Whitespace
        } else {
            Delimiter::Literal(s.to_string())
        }
    }
}

/// Main configuration structure for sort operations
#[derive(Debug, Clone, Default)]
pub struct SortConfig {
    /// Key typing mode
    pub mode: KeyMode,
    /// Invert every comparison
    pub reverse: bool,
    /// Keep input order among equal keys
    pub stable: bool,
    /// Output only the first line of each key class
    pub unique: bool,
    /// Fold case before comparing and deduplicating
    pub ignore_case: bool,
    /// Strip leading spaces and tabs from the key
    pub ignore_leading_blanks: bool,
    /// Shuffle instead of sorting
    pub random: bool,
    /// 1-based field index; 0 selects the whole line
    pub field: usize,
    /// Field separator
    pub delimiter: Delimiter,
    /// Seed for the shuffle generator; entropy when unset
    pub random_seed: Option<u64>,
}

impl SortConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: KeyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn with_stable(mut self, stable: bool) -> Self {
        self.stable = stable;
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn with_ignore_leading_blanks(mut self, ignore: bool) -> Self {
        self.ignore_leading_blanks = ignore;
        self
    }

    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    /// Select a 1-based field (0 = whole line)
    pub fn with_field(mut self, field: usize) -> Self {
        self.field = field;
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<Delimiter>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> SortResult<()> {
        if let Delimiter::Literal(sep) = &self.delimiter {
            if sep.contains('\n') {
                return Err(SortError::invalid_field_separator(
                    "separator cannot contain a newline",
                ));
            }
        }

        if self.random && self.stable {
            log::warn!("random order ignores --stable");
        }

        Ok(())
    }
}

/// Parse a user-supplied field index. Negative and non-integer values are
/// configuration errors; 0 selects the whole line.
pub fn parse_field_index(value: &str) -> SortResult<usize> {
    let index: i64 = value
        .trim()
        .parse()
        .map_err(|_| SortError::invalid_field(value))?;
    usize::try_from(index).map_err(|_| SortError::invalid_field(value))
}

/// Builder pattern for creating configurations
#[derive(Debug, Default)]
pub struct SortConfigBuilder {
    config: SortConfig,
    flags: ModeFlags,
    field: i64,
}

impl SortConfigBuilder {
    /// Start building a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key mode directly, bypassing flag precedence
    pub fn mode(mut self, mode: KeyMode) -> Self {
        self.flags = ModeFlags::default();
        match mode {
            KeyMode::Numeric => self.flags.numeric = true,
            KeyMode::HumanNumeric => self.flags.human_numeric = true,
            KeyMode::Version => self.flags.version = true,
            KeyMode::Month => self.flags.month = true,
            KeyMode::Lexicographic => {}
        }
        self
    }

    pub fn numeric(mut self) -> Self {
        self.flags.numeric = true;
        self
    }

    pub fn human_numeric(mut self) -> Self {
        self.flags.human_numeric = true;
        self
    }

    pub fn version_sort(mut self) -> Self {
        self.flags.version = true;
        self
    }

    pub fn month_sort(mut self) -> Self {
        self.flags.month = true;
        self
    }

    pub fn reverse(mut self) -> Self {
        self.config.reverse = true;
        self
    }

    pub fn stable(mut self) -> Self {
        self.config.stable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.config.unique = true;
        self
    }

    pub fn ignore_case(mut self) -> Self {
        self.config.ignore_case = true;
        self
    }

    pub fn ignore_leading_blanks(mut self) -> Self {
        self.config.ignore_leading_blanks = true;
        self
    }

    pub fn random(mut self) -> Self {
        self.config.random = true;
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = Some(seed);
        self
    }

    /// Field index as supplied by a caller; validated in [`build`](Self::build)
    pub fn field_index(mut self, field: i64) -> Self {
        self.field = field;
        self
    }

    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.config.delimiter = Delimiter::from(delimiter);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> SortResult<SortConfig> {
        let mut config = self.config;
        config.field = usize::try_from(self.field)
            .map_err(|_| SortError::invalid_field(&self.field.to_string()))?;
        config.mode = KeyMode::resolve(&self.flags);
        config.validate()?;
        Ok(config)
    }
}

/// Preset configurations for common use cases
pub mod presets {
    use super::*;

    pub fn numeric() -> SortConfig {
        SortConfig::new().with_mode(KeyMode::Numeric)
    }

    pub fn version() -> SortConfig {
        SortConfig::new().with_mode(KeyMode::Version)
    }

    pub fn human_numeric() -> SortConfig {
        SortConfig::new().with_mode(KeyMode::HumanNumeric)
    }

    pub fn month() -> SortConfig {
        SortConfig::new().with_mode(KeyMode::Month)
    }

    pub fn case_insensitive() -> SortConfig {
        SortConfig::new().with_ignore_case(true)
    }

    pub fn unique() -> SortConfig {
        SortConfig::new().with_unique(true)
    }

    pub fn reverse() -> SortConfig {
        SortConfig::new().with_reverse(true)
    }

    pub fn stable() -> SortConfig {
        SortConfig::new().with_stable(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SortConfig::default();
        assert_eq!(config.mode, KeyMode::Lexicographic);
        assert_eq!(config.delimiter, Delimiter::Whitespace);
        assert_eq!(config.field, 0);
        assert!(!config.reverse);
        assert!(!config.unique);
        assert!(!config.stable);
        assert!(!config.random);
    }

    #[test]
    fn test_config_builder() {
        let config = SortConfigBuilder::new()
            .numeric()
            .reverse()
            .unique()
            .field_index(2)
            .delimiter(",")
            .build()
            .expect("Failed to build test config");

        assert_eq!(config.mode, KeyMode::Numeric);
        assert!(config.reverse);
        assert!(config.unique);
        assert_eq!(config.field, 2);
        assert_eq!(config.delimiter, Delimiter::Literal(",".to_string()));
    }

    #[test]
    fn test_mode_precedence() {
        let all = ModeFlags {
            numeric: true,
            human_numeric: true,
            version: true,
            month: true,
        };
        assert_eq!(KeyMode::resolve(&all), KeyMode::Numeric);

        let no_numeric = ModeFlags { numeric: false, ..all };
        assert_eq!(KeyMode::resolve(&no_numeric), KeyMode::HumanNumeric);

        let version_month = ModeFlags {
            version: true,
            month: true,
            ..ModeFlags::default()
        };
        assert_eq!(KeyMode::resolve(&version_month), KeyMode::Version);

        assert_eq!(KeyMode::resolve(&ModeFlags::default()), KeyMode::Lexicographic);
    }

    #[test]
    fn test_negative_field_is_rejected() {
        let result = SortConfigBuilder::new().field_index(-1).build();
        assert!(matches!(result, Err(SortError::InvalidField { .. })));
    }

    #[test]
    fn test_parse_field_index() {
        assert_eq!(parse_field_index("0").expect("zero"), 0);
        assert_eq!(parse_field_index("3").expect("three"), 3);
        assert!(parse_field_index("-2").is_err());
        assert!(parse_field_index("two").is_err());
    }

    #[test]
    fn test_delimiter_from_str() {
        assert_eq!(Delimiter::from(" "), Delimiter::Whitespace);
        assert_eq!(Delimiter::from(""), Delimiter::Whitespace);
        assert_eq!(Delimiter::from("\t"), Delimiter::Literal("\t".to_string()));
        assert_eq!(Delimiter::from("::"), Delimiter::Literal("::".to_string()));
    }

    #[test]
    fn test_newline_separator_rejected() {
        let config = SortConfig::new().with_delimiter("\n");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_key_mode_from_str() {
        assert_eq!(
            "numeric".parse::<KeyMode>().expect("Failed to parse numeric mode"),
            KeyMode::Numeric
        );
        assert_eq!(
            "human-numeric"
                .parse::<KeyMode>()
                .expect("Failed to parse human-numeric mode"),
            KeyMode::HumanNumeric
        );
        assert!("random".parse::<KeyMode>().is_err());
        assert!("n".parse::<KeyMode>().is_err());
        assert_eq!(KeyMode::Version.to_string(), "version");
    }

    #[test]
    fn test_presets() {
        assert_eq!(presets::numeric().mode, KeyMode::Numeric);
        assert_eq!(presets::month().mode, KeyMode::Month);
        assert!(presets::reverse().reverse);
        assert!(presets::unique().unique);
        assert!(presets::case_insensitive().ignore_case);
    }
}

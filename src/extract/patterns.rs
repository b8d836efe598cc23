use crate::error::AnalysisError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Built-in name rules, in priority order: (regex, VBO, description).
///
/// The order is part of the contract. "Excel Database Export" resolves to
/// the Excel VBO because Excel is listed before Database.
const STANDARD_RULES: [(&str, &str, &str); 11] = [
    (r"(?i)excel", "MS Excel VBO", "Microsoft Excel automation"),
    (r"(?i)e-?mail", "Email - POP3/SMTP", "Email send and receive"),
    (r"(?i)collection", "Utility - Collection Manipulation", "Collection manipulation utilities"),
    (r"(?i)file", "Utility - File Management", "File system operations"),
    (r"(?i)string", "Utility - Strings", "String manipulation utilities"),
    (r"(?i)date", "Utility - Date and Time", "Date and time utilities"),
    (r"(?i)math", "Utility - Math", "Mathematical utilities"),
    (r"(?i)environment", "Utility - Environment", "Environment and system information"),
    (r"(?i)\bsap\b", "SAP VBO", "SAP GUI automation"),
    (r"(?i)web", "Web Browser VBO", "Web browser automation"),
    (r"(?i)database", "Database VBO", "Database access"),
];

static STANDARD: LazyLock<PatternSet> = LazyLock::new(|| {
    let specs = STANDARD_RULES.iter().map(|(pattern, vbo, description)| PatternSpec {
        pattern: pattern.to_string(),
        vbo: vbo.to_string(),
        description: Some(description.to_string()),
    });
    PatternSet::compile(specs).expect("built-in VBO patterns are valid regexes")
});

static LEADING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]*\]\s*").expect("leading tag regex is valid"));

/// A name rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub pattern: String,
    pub vbo: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    matcher: Regex,
    pub vbo_name: String,
    pub description: String,
}

impl PatternRule {
    pub fn is_match(&self, stage_name: &str) -> bool {
        self.matcher.is_match(stage_name)
    }
}

/// Ordered (matcher, canonical VBO) list used when a stage has no resource
/// descriptor. The first matching rule wins.
#[derive(Debug, Clone)]
pub struct PatternSet {
    rules: Vec<PatternRule>,
}

impl Default for PatternSet {
    fn default() -> Self {
        STANDARD.clone()
    }
}

impl PatternSet {
    pub fn compile(specs: impl IntoIterator<Item = PatternSpec>) -> Result<Self, AnalysisError> {
        let rules = specs
            .into_iter()
            .map(|spec| {
                let matcher = Regex::new(&spec.pattern)
                    .map_err(|e| AnalysisError::InvalidPattern(format!("{}: {e}", spec.pattern)))?;
                Ok(PatternRule {
                    matcher,
                    description: spec.description.unwrap_or_default(),
                    vbo_name: spec.vbo,
                })
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?;
        Ok(Self { rules })
    }

    /// Built-in rules followed by `extra`. Extra rules never outrank the
    /// built-in ones.
    pub fn with_extra(extra: &[PatternSpec]) -> Result<Self, AnalysisError> {
        let mut set = Self::default();
        set.rules.extend(Self::compile(extra.iter().cloned())?.rules);
        Ok(set)
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn classify(&self, stage_name: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|rule| rule.is_match(stage_name))
    }
}

/// Action name for a pattern-matched stage: the stage name without a
/// leading `[...] ` tag, or the full name when nothing else remains.
pub fn action_name_from_stage(stage_name: &str) -> String {
    let stripped = LEADING_TAG.replace(stage_name, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        stage_name.to_string()
    } else {
        stripped.to_string()
    }
}

pub mod extract;
pub mod nextjs;

use crate::logs::LogLine;
use crate::metrics::Metrics;

/// Which parser a framework name resolved to. Selection is separate from
/// parsing so new frameworks are additive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    NextJs,
    Passthrough,
}

struct RegistryEntry {
    keyword: &'static str,
    kind: ParserKind,
}

/// Ordered framework-parser registry. Entries are tried in registration
/// order; the first whose keyword is a case-insensitive substring of the
/// framework name wins. Unknown frameworks fall back to an identity
/// transform that carries the raw logs and no metrics; not an error.
pub struct ParserRegistry {
    entries: Vec<RegistryEntry>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        ParserRegistry {
            entries: vec![RegistryEntry {
                keyword: nextjs::KEYWORD,
                kind: ParserKind::NextJs,
            }],
        }
    }

    pub fn resolve(&self, framework_name: &str) -> ParserKind {
        let needle = framework_name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| needle.contains(entry.keyword))
            .map(|entry| entry.kind)
            .unwrap_or(ParserKind::Passthrough)
    }

    pub fn parse(&self, framework_name: &str, lines: Vec<LogLine>) -> Metrics {
        match self.resolve(framework_name) {
            ParserKind::NextJs => nextjs::parse(lines),
            ParserKind::Passthrough => {
                log::debug!("No parser registered for framework '{framework_name}', passing logs through");
                Metrics::passthrough(lines)
            }
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a log batch with the default registry.
pub fn parse(framework_name: &str, lines: Vec<LogLine>) -> Metrics {
    ParserRegistry::new().parse(framework_name, lines)
}

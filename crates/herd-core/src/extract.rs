//! Column contracts for the extract lineages.
//!
//! Upstream extractors evolved independently, so the same column reaches us
//! under several header spellings. Each [`ExtractKind`] declares the canonical
//! columns it needs, the aliases and header patterns accepted for each, and
//! which ones are mandatory. [`ResolvedColumns::resolve`] maps a file's actual
//! column names onto that contract.

use regex::Regex;
use std::sync::OnceLock;

/// A canonical column and the source headers that may supply it
#[derive(Debug)]
pub struct ColumnSpec {
    /// Canonical name in staging/production
    pub name: &'static str,
    /// DuckDB type the source value is cast to
    pub sql_type: &'static str,
    /// Alternative source header names
    pub aliases: &'static [&'static str],
    /// Matched against the lower-cased header when no name matches
    pub header_matcher: Option<fn(&str) -> bool>,
    /// Whether a file lacking the column is rejected
    pub required: bool,
    /// Negative values are read as NULL
    pub non_negative: bool,
    /// A required column is satisfied by this column instead when absent
    pub fallback: Option<&'static str>,
}

impl ColumnSpec {
    const fn required(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            aliases: &[],
            header_matcher: None,
            required: true,
            non_negative: false,
            fallback: None,
        }
    }

    const fn optional(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            aliases: &[],
            header_matcher: None,
            required: false,
            non_negative: false,
            fallback: None,
        }
    }

    const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    const fn matching(mut self, matcher: fn(&str) -> bool) -> Self {
        self.header_matcher = Some(matcher);
        self
    }

    const fn non_negative(mut self) -> Self {
        self.non_negative = true;
        self
    }

    const fn or_else(mut self, fallback: &'static str) -> Self {
        self.fallback = Some(fallback);
        self
    }

    fn matches(&self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        if header == self.name || self.aliases.contains(&header.as_str()) {
            return true;
        }
        self.header_matcher.is_some_and(|matches| matches(&header))
    }
}

const RATIO_ALIASES: &[&str] = &[
    "male_female_ratio",
    "bull_cow_ratio",
    "buck_doe_ratio",
    "bull_cow_ratio_(per_100)",
    "bull_per_cow_ratio_(per_100)",
    "buck_doe_ratio_(per_100)",
    "buck_per_doe_ratio_(per_100)",
];

fn is_gmu_header(header: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^game_management_unit(e)?s_involved_in_\d{4}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(header))
}

static POPULATION_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("state", "VARCHAR"),
    ColumnSpec::required("species", "VARCHAR"),
    ColumnSpec::required("herd_name", "VARCHAR").or_else("dau"),
    ColumnSpec::optional("dau", "VARCHAR").aliases(&["dau*"]),
    ColumnSpec::required("post_hunt_estimate", "BIGINT"),
    ColumnSpec::required("male_female_ratio", "DOUBLE").aliases(RATIO_ALIASES),
    ColumnSpec::required("year", "INTEGER"),
    ColumnSpec::required("gmu_list", "VARCHAR").matching(is_gmu_header),
];

static HERD_POPULATION_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::optional("dau", "VARCHAR").aliases(&["dau*"]),
    ColumnSpec::required("herd_name", "VARCHAR").or_else("dau"),
    ColumnSpec::required("gmu_list", "VARCHAR").matching(is_gmu_header),
    ColumnSpec::required("post_hunt_estimate", "BIGINT"),
    ColumnSpec::required("bull_cow_ratio", "DOUBLE").aliases(RATIO_ALIASES),
    ColumnSpec::required("year", "INTEGER"),
];

static HARVEST_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("state", "VARCHAR"),
    ColumnSpec::required("species", "VARCHAR"),
    ColumnSpec::required("season", "VARCHAR"),
    ColumnSpec::required("unit", "INTEGER")
        .aliases(&["gmu"])
        .non_negative(),
    ColumnSpec::required("year", "INTEGER"),
    ColumnSpec::optional("adult_male", "BIGINT").aliases(&["bulls", "bucks"]),
    ColumnSpec::optional("adult_female", "BIGINT").aliases(&["cows", "does"]),
    ColumnSpec::optional("young", "BIGINT").aliases(&["calves", "fawns"]),
    ColumnSpec::optional("total_harvest", "BIGINT"),
    ColumnSpec::optional("total_hunters", "BIGINT"),
    ColumnSpec::optional("percent_success", "DOUBLE"),
    ColumnSpec::optional("total_rec_days", "BIGINT"),
];

/// The three extract lineages read by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractKind {
    /// Jurisdiction/species population extracts
    Population,
    /// Herd-keyed legacy population extracts
    HerdPopulation,
    /// Unit-granular harvest extracts
    Harvest,
}

impl ExtractKind {
    /// Canonical column contract, in staging column order
    pub fn columns(self) -> &'static [ColumnSpec] {
        match self {
            ExtractKind::Population => POPULATION_COLUMNS,
            ExtractKind::HerdPopulation => HERD_POPULATION_COLUMNS,
            ExtractKind::Harvest => HARVEST_COLUMNS,
        }
    }

    /// Natural key of one loaded row
    pub fn key_columns(self) -> &'static [&'static str] {
        match self {
            ExtractKind::Population => &["state", "species", "herd_name", "year"],
            ExtractKind::HerdPopulation => &["herd_name", "year"],
            ExtractKind::Harvest => &["state", "species", "unit", "year", "season"],
        }
    }

    /// Short name used in logs and reports
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractKind::Population => "population",
            ExtractKind::HerdPopulation => "legacy_population",
            ExtractKind::Harvest => "harvest",
        }
    }
}

impl std::fmt::Display for ExtractKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file's headers mapped onto an extract contract
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    kind: ExtractKind,
    sources: Vec<(&'static ColumnSpec, Option<String>)>,
}

impl ResolvedColumns {
    /// Map `available` headers onto the contract for `kind`.
    ///
    /// Returns the names of missing required columns on failure.
    pub fn resolve(kind: ExtractKind, available: &[String]) -> Result<Self, Vec<&'static str>> {
        let sources: Vec<(&'static ColumnSpec, Option<String>)> = kind
            .columns()
            .iter()
            .map(|spec| {
                let exact = available
                    .iter()
                    .find(|h| h.trim().eq_ignore_ascii_case(spec.name));
                let source = exact.or_else(|| available.iter().find(|h| spec.matches(h)));
                (spec, source.cloned())
            })
            .collect();

        let resolved = |name: &str| {
            sources
                .iter()
                .any(|(spec, source)| spec.name == name && source.is_some())
        };

        let missing: Vec<&'static str> = sources
            .iter()
            .filter(|(spec, source)| {
                spec.required
                    && source.is_none()
                    && !spec.fallback.is_some_and(|fallback| resolved(fallback))
            })
            .map(|(spec, _)| spec.name)
            .collect();

        if missing.is_empty() {
            Ok(Self { kind, sources })
        } else {
            Err(missing)
        }
    }

    /// The contract these columns satisfy
    pub fn kind(&self) -> ExtractKind {
        self.kind
    }

    /// Source header supplying a canonical column, if any
    pub fn source_for(&self, name: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|(spec, _)| spec.name == name)
            .and_then(|(_, source)| source.as_deref())
    }

    /// Every canonical column with its source header, in contract order
    pub fn iter(&self) -> impl Iterator<Item = (&'static ColumnSpec, Option<&str>)> + '_ {
        self.sources
            .iter()
            .map(|(spec, source)| (*spec, source.as_deref()))
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;

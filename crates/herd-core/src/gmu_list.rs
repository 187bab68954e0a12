//! Game-management-unit list normalization.
//!
//! Population extracts carry the units a herd occupies as one text field in
//! one of two encodings: bare comma-separated integers (`"12,13,201"`) or a
//! bracketed JSON-style array (`"[12,13,201]"`). [`UnitList::parse`] resolves
//! the field once into a tagged [`UnitList`] holding a uniform ordered
//! sequence of unit ids, and [`explode`] fans a record out into one row per
//! unit. No other module looks at the raw encoding.

use regex::Regex;
use std::sync::OnceLock;

/// Sentinel written by extractors for herds with no applicable units.
pub const NO_UNITS_SENTINEL: &str = "notin";

/// A game management unit identifier
pub type GmuId = u32;

/// Largest unit id the production `gmu`/`unit` columns (`INTEGER`) can hold
pub const MAX_GMU_ID: GmuId = i32::MAX as GmuId;

/// Validation applied to the delimited encoding before it is split
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnitListPolicy {
    /// Unparseable members are dropped one by one
    #[default]
    Lenient,
    /// The raw field may only hold digits, commas and whitespace; anything
    /// else rejects the whole field
    DigitGuard,
}

/// Which encoding a unit list arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitEncoding {
    /// `12,13,201`
    Delimited,
    /// `[12,13,201]`
    Bracketed,
}

/// Why a present, non-sentinel field produced no units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Failed the digit/comma guard
    GuardFailed,
    /// Bracketed but not a valid array
    Malformed,
    /// Parsed, but no member was a valid unit id
    NoUnits,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::GuardFailed => write!(f, "failed digit/comma guard"),
            RejectReason::Malformed => write!(f, "malformed unit array"),
            RejectReason::NoUnits => write!(f, "no valid unit ids"),
        }
    }
}

/// A unit-list field resolved at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitList {
    /// Null, empty, or the `notin` sentinel
    Absent,
    /// At least one unit id was recovered
    Parsed {
        encoding: UnitEncoding,
        /// Unit ids in field order; duplicates are kept
        units: Vec<GmuId>,
        /// Members that were not valid unit ids
        dropped: usize,
    },
    /// Present but yields nothing
    Rejected(RejectReason),
}

fn digit_guard() -> Option<&'static Regex> {
    static GUARD: OnceLock<Option<Regex>> = OnceLock::new();
    GUARD
        .get_or_init(|| Regex::new(r"^[\d,\s]+$").ok())
        .as_ref()
}

impl UnitList {
    /// Resolve a raw unit-list field.
    ///
    /// Never fails: every input maps to one of the three variants, and only
    /// [`UnitList::Parsed`] contributes rows.
    pub fn parse(raw: Option<&str>, policy: UnitListPolicy) -> Self {
        let trimmed = match raw.map(str::trim) {
            None => return UnitList::Absent,
            Some(t) if t.is_empty() || t == NO_UNITS_SENTINEL => return UnitList::Absent,
            Some(t) => t,
        };

        if trimmed.starts_with('[') {
            return Self::parse_bracketed(trimmed);
        }

        if policy == UnitListPolicy::DigitGuard {
            let passes = digit_guard().is_some_and(|re| re.is_match(trimmed));
            if !passes {
                return UnitList::Rejected(RejectReason::GuardFailed);
            }
        }

        let mut units = Vec::new();
        let mut dropped = 0;
        for token in trimmed.split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            match parse_unit(token) {
                Some(unit) => units.push(unit),
                None => dropped += 1,
            }
        }
        Self::finish(UnitEncoding::Delimited, units, dropped)
    }

    fn parse_bracketed(trimmed: &str) -> Self {
        let members: Vec<serde_json::Value> = match serde_json::from_str(trimmed) {
            Ok(members) => members,
            Err(_) => return UnitList::Rejected(RejectReason::Malformed),
        };

        let mut units = Vec::with_capacity(members.len());
        let mut dropped = 0;
        for member in &members {
            match member_as_unit(member) {
                Some(unit) => units.push(unit),
                None => dropped += 1,
            }
        }
        Self::finish(UnitEncoding::Bracketed, units, dropped)
    }

    fn finish(encoding: UnitEncoding, units: Vec<GmuId>, dropped: usize) -> Self {
        if units.is_empty() {
            UnitList::Rejected(RejectReason::NoUnits)
        } else {
            UnitList::Parsed {
                encoding,
                units,
                dropped,
            }
        }
    }

    /// Unit ids in field order (empty unless parsed)
    pub fn units(&self) -> &[GmuId] {
        match self {
            UnitList::Parsed { units, .. } => units,
            _ => &[],
        }
    }

    /// Number of members discarded during parsing
    pub fn dropped(&self) -> usize {
        match self {
            UnitList::Parsed { dropped, .. } => *dropped,
            _ => 0,
        }
    }

    /// Whether no rows will be produced
    pub fn is_empty(&self) -> bool {
        self.units().is_empty()
    }
}

fn parse_unit(token: &str) -> Option<GmuId> {
    token.parse::<GmuId>().ok().filter(|&unit| unit <= MAX_GMU_ID)
}

fn member_as_unit(member: &serde_json::Value) -> Option<GmuId> {
    match member {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|v| GmuId::try_from(v).ok())
            .filter(|&unit| unit <= MAX_GMU_ID),
        serde_json::Value::String(s) => parse_unit(s.trim()),
        _ => None,
    }
}

/// A record whose unit-list field can be fanned out into per-unit rows.
pub trait UnitExplode {
    /// The per-unit row type
    type Row;

    /// The raw unit-list field
    fn unit_list_field(&self) -> Option<&str>;

    /// Build the row attributed to a single unit
    fn at_unit(&self, gmu: GmuId) -> Self::Row;
}

/// Lazily explode a record into one row per unit in its unit list.
pub fn explode<R: UnitExplode>(record: &R, policy: UnitListPolicy) -> Exploded<'_, R> {
    Exploded {
        record,
        list: UnitList::parse(record.unit_list_field(), policy),
        next: 0,
    }
}

/// Iterator returned by [`explode`]
#[derive(Debug)]
pub struct Exploded<'a, R> {
    record: &'a R,
    list: UnitList,
    next: usize,
}

impl<R> Exploded<'_, R> {
    /// The parsed unit list driving this iterator
    pub fn unit_list(&self) -> &UnitList {
        &self.list
    }
}

impl<R: UnitExplode> Iterator for Exploded<'_, R> {
    type Item = R::Row;

    fn next(&mut self) -> Option<Self::Item> {
        let unit = *self.list.units().get(self.next)?;
        self.next += 1;
        Some(self.record.at_unit(unit))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.units().len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
#[path = "gmu_list_test.rs"]
mod tests;

use super::*;

struct Herd {
    name: &'static str,
    gmu_list: Option<&'static str>,
}

impl UnitExplode for Herd {
    type Row = (&'static str, GmuId);

    fn unit_list_field(&self) -> Option<&str> {
        self.gmu_list
    }

    fn at_unit(&self, gmu: GmuId) -> Self::Row {
        (self.name, gmu)
    }
}

fn lenient(raw: &str) -> UnitList {
    UnitList::parse(Some(raw), UnitListPolicy::Lenient)
}

fn guarded(raw: &str) -> UnitList {
    UnitList::parse(Some(raw), UnitListPolicy::DigitGuard)
}

// ── Encodings ──────────────────────────────────────────────────────────

#[test]
fn test_delimited_list_yields_every_unit() {
    let list = lenient("12,13,201");
    assert_eq!(list.units(), &[12, 13, 201]);
    assert!(matches!(
        list,
        UnitList::Parsed {
            encoding: UnitEncoding::Delimited,
            dropped: 0,
            ..
        }
    ));
}

#[test]
fn test_delimited_list_tolerates_spaces() {
    assert_eq!(lenient("  12, 13 ,201 ").units(), &[12, 13, 201]);
}

#[test]
fn test_bracketed_list_yields_every_unit() {
    let list = lenient("[12,13,201]");
    assert_eq!(list.units(), &[12, 13, 201]);
    assert!(matches!(
        list,
        UnitList::Parsed {
            encoding: UnitEncoding::Bracketed,
            ..
        }
    ));
}

#[test]
fn test_bracketed_and_delimited_agree() {
    assert_eq!(lenient("[12,13]").units(), lenient("12,13").units());
    assert_eq!(lenient("[12, 13]").units(), &[12, 13]);
}

#[test]
fn test_bracketed_list_accepts_quoted_members() {
    assert_eq!(lenient(r#"["12", "013"]"#).units(), &[12, 13]);
}

#[test]
fn test_leading_zeros_are_ignored() {
    assert_eq!(lenient("012,001").units(), &[12, 1]);
}

#[test]
fn test_duplicates_are_preserved() {
    assert_eq!(lenient("12,12,13").units(), &[12, 12, 13]);
}

// ── Absent inputs ──────────────────────────────────────────────────────

#[test]
fn test_sentinel_is_absent() {
    assert_eq!(lenient("notin"), UnitList::Absent);
    assert_eq!(lenient("  notin "), UnitList::Absent);
}

#[test]
fn test_sentinel_is_case_sensitive() {
    assert_eq!(lenient("NOTIN"), UnitList::Rejected(RejectReason::NoUnits));
}

#[test]
fn test_null_and_empty_are_absent() {
    assert_eq!(UnitList::parse(None, UnitListPolicy::Lenient), UnitList::Absent);
    assert_eq!(lenient(""), UnitList::Absent);
    assert_eq!(lenient("   "), UnitList::Absent);
    assert!(lenient("").is_empty());
}

// ── Unparseable inputs ─────────────────────────────────────────────────

#[test]
fn test_unparseable_members_are_dropped() {
    let list = lenient("12,abc,13");
    assert_eq!(list.units(), &[12, 13]);
    assert_eq!(list.dropped(), 1);
}

#[test]
fn test_bracketed_nulls_are_dropped() {
    let list = lenient("[22, null, 24]");
    assert_eq!(list.units(), &[22, 24]);
    assert_eq!(list.dropped(), 1);
}

#[test]
fn test_negative_and_fractional_members_are_dropped() {
    let list = lenient("[-4, 2.5, 7]");
    assert_eq!(list.units(), &[7]);
    assert_eq!(list.dropped(), 2);
}

#[test]
fn test_wholly_unparseable_produces_no_units() {
    assert_eq!(
        lenient("see appendix"),
        UnitList::Rejected(RejectReason::NoUnits)
    );
    assert_eq!(lenient(",,,"), UnitList::Rejected(RejectReason::NoUnits));
}

#[test]
fn test_malformed_bracket_is_rejected() {
    assert_eq!(
        lenient("[12, 13"),
        UnitList::Rejected(RejectReason::Malformed)
    );
    assert_eq!(lenient("[]"), UnitList::Rejected(RejectReason::NoUnits));
}

#[test]
fn test_units_beyond_column_range_are_dropped() {
    let list = lenient("22,3000000000,23");
    assert_eq!(list.units(), &[22, 23]);
    assert_eq!(list.dropped(), 1);

    let list = lenient("[2147483647, 2147483648]");
    assert_eq!(list.units(), &[MAX_GMU_ID]);
    assert_eq!(list.dropped(), 1);
}

#[test]
fn test_only_out_of_range_units_produce_no_units() {
    assert_eq!(
        lenient("3000000000"),
        UnitList::Rejected(RejectReason::NoUnits)
    );
    assert_eq!(
        guarded("3000000000"),
        UnitList::Rejected(RejectReason::NoUnits)
    );
    assert_eq!(
        lenient(r#"["4294967296"]"#),
        UnitList::Rejected(RejectReason::NoUnits)
    );
}

// ── Digit guard ────────────────────────────────────────────────────────

#[test]
fn test_guard_accepts_digits_commas_spaces() {
    assert_eq!(guarded("12, 13,201").units(), &[12, 13, 201]);
}

#[test]
fn test_guard_rejects_whole_field() {
    assert_eq!(
        guarded("12,abc,13"),
        UnitList::Rejected(RejectReason::GuardFailed)
    );
    assert_eq!(
        guarded("12;13"),
        UnitList::Rejected(RejectReason::GuardFailed)
    );
}

#[test]
fn test_guard_does_not_apply_to_bracketed_lists() {
    assert_eq!(guarded("[12,13]").units(), &[12, 13]);
}

#[test]
fn test_guard_still_honours_sentinel() {
    assert_eq!(guarded("notin"), UnitList::Absent);
}

// ── Explosion ──────────────────────────────────────────────────────────

#[test]
fn test_explode_yields_one_row_per_unit() {
    let herd = Herd {
        name: "Flat Tops",
        gmu_list: Some("[22,23,24]"),
    };
    let rows: Vec<_> = explode(&herd, UnitListPolicy::Lenient).collect();
    assert_eq!(
        rows,
        vec![("Flat Tops", 22), ("Flat Tops", 23), ("Flat Tops", 24)]
    );
}

#[test]
fn test_explode_absent_list_is_empty() {
    let herd = Herd {
        name: "Bear's Ears",
        gmu_list: Some("notin"),
    };
    let exploded = explode(&herd, UnitListPolicy::Lenient);
    assert_eq!(exploded.unit_list(), &UnitList::Absent);
    assert_eq!(exploded.count(), 0);
}

#[test]
fn test_explode_size_hint_is_exact() {
    let herd = Herd {
        name: "White River",
        gmu_list: Some("11,12,13,211"),
    };
    let mut exploded = explode(&herd, UnitListPolicy::DigitGuard);
    assert_eq!(exploded.size_hint(), (4, Some(4)));
    exploded.next();
    assert_eq!(exploded.size_hint(), (3, Some(3)));
}

#[test]
fn test_reject_reason_display() {
    assert_eq!(
        RejectReason::GuardFailed.to_string(),
        "failed digit/comma guard"
    );
}

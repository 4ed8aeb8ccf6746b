// ─── Version Ordering ───
// Loose ordering for Maven versions, used to pick a winner on conflicts.

use std::cmp::Ordering;

fn parse_numeric_version_parts(raw: &str) -> Vec<u32> {
    // Only the release part counts; qualifiers such as `-rc1` break ties below.
    let release = raw.split('-').next().unwrap_or(raw);
    release
        .split(|c: char| !c.is_ascii_digit())
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| segment.parse::<u32>().ok())
        .collect()
}

fn is_prerelease(raw: &str) -> bool {
    let Some((_, qualifier)) = raw.split_once('-') else {
        return false;
    };
    let lower = qualifier.to_ascii_lowercase();
    ["snapshot", "alpha", "beta", "rc", "pre"]
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Compare two version strings by their numeric segments.
///
/// `1.10` sorts after `1.9`; with equal numbers a release sorts after a
/// qualified pre-release (`2.0` > `2.0-SNAPSHOT`).
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = parse_numeric_version_parts(a);
    let b_parts = parse_numeric_version_parts(b);

    let max_len = a_parts.len().max(b_parts.len());
    for idx in 0..max_len {
        let a_val = a_parts.get(idx).copied().unwrap_or(0);
        let b_val = b_parts.get(idx).copied().unwrap_or(0);
        match a_val.cmp(&b_val) {
            Ordering::Equal => continue,
            non_eq => return non_eq,
        }
    }

    match (is_prerelease(a), is_prerelease(b)) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    // Deterministic tiebreaker for versions with identical numeric parts.
    a.cmp(b)
}

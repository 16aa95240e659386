//! Grouping of reports by region for the location index.

use std::collections::BTreeMap;
use unswachh_types::Report;

/// Bucket for labels that carry no usable region.
pub const OTHER_REGION: &str = "Other";

fn looks_numeric(part: &str) -> bool {
    part.is_empty() || part.parse::<f64>().map(|v| !v.is_nan()).unwrap_or(false)
}

/// Guess the region (usually the state) from a comma-separated label.
///
/// Labels end in "..., State" or "..., State, Postcode"; the second-to-last
/// part is taken unless it is numeric, in which case the one before it is.
pub fn region_of(label: &str) -> String {
    let parts: Vec<&str> = label.split(',').map(str::trim).collect();

    if parts.len() >= 2 {
        let candidate = parts[parts.len() - 2];
        if !looks_numeric(candidate) {
            return candidate.to_string();
        }
        return parts
            .len()
            .checked_sub(3)
            .map(|i| parts[i])
            .filter(|p| !p.is_empty())
            .unwrap_or(OTHER_REGION)
            .to_string();
    }

    match parts.first() {
        Some(only) if !only.is_empty() => only.to_string(),
        _ => OTHER_REGION.to_string(),
    }
}

/// Group reports by [`region_of`] their label, regions in sorted order.
pub fn group_by_region(reports: &[Report]) -> BTreeMap<String, Vec<&Report>> {
    let mut groups: BTreeMap<String, Vec<&Report>> = BTreeMap::new();
    for report in reports {
        groups
            .entry(region_of(&report.location_name))
            .or_default()
            .push(report);
    }
    groups
}

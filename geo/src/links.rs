//! Map links for a location.

use unswachh_types::{Coordinate, ReportId};

/// Zoom level used when a link opens the map on a single report.
pub const REPORT_ZOOM: u8 = 18;

/// Google Maps search URL for navigation to `coordinate`.
pub fn maps_search_url(coordinate: &Coordinate) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        coordinate.latitude(),
        coordinate.longitude()
    )
}

/// Link into the public map centred on `coordinate`, optionally opening a report.
pub fn deep_link(base_url: &str, coordinate: &Coordinate, report: Option<&ReportId>) -> String {
    let mut link = format!(
        "{}/?lat={}&lng={}&zoom={}",
        base_url.trim_end_matches('/'),
        coordinate.latitude(),
        coordinate.longitude(),
        REPORT_ZOOM
    );
    if let Some(id) = report {
        link.push_str(&format!("&reportId={id}"));
    }
    link
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_maps_and_deep_links() {
        let c = Coordinate::new(12.9716, 77.5946).unwrap();
        assert_eq!(
            maps_search_url(&c),
            "https://www.google.com/maps/search/?api=1&query=12.9716,77.5946"
        );
        assert_eq!(
            deep_link("https://unswachh.example/", &c, None),
            "https://unswachh.example/?lat=12.9716&lng=77.5946&zoom=18"
        );
        let id = ReportId::new([1; 16]);
        let link = deep_link("https://x.example", &c, Some(&id));
        assert!(link.ends_with(&format!("&reportId={id}")));
    }
}

//! Static region and category catalog for the `mostPopular` chart.
//!
//! Region codes are ISO 3166-1 alpha-2; category ids are `YouTube` video
//! category ids, which are stable across regions for the ids listed here.

/// Regions swept when `collect` is run without `--regions`.
pub const REGIONS: &[&str] = &[
    "US", "GB", "CA", "AU", "DE", "FR", "ES", "IT", "JP", "KR", "BR", "MX", "IN", "RU", "NL", "SE",
    "NO", "DK", "FI", "PL",
];

/// `(id, display name)` pairs swept when `collect` is run without `--categories`.
pub const CATEGORIES: &[(&str, &str)] = &[
    ("1", "Film & Animation"),
    ("2", "Autos & Vehicles"),
    ("10", "Music"),
    ("15", "Pets & Animals"),
    ("17", "Sports"),
    ("19", "Travel & Events"),
    ("20", "Gaming"),
    ("22", "People & Blogs"),
    ("23", "Comedy"),
    ("24", "Entertainment"),
    ("25", "News & Politics"),
    ("26", "Howto & Style"),
    ("27", "Education"),
    ("28", "Science & Technology"),
];

/// Returns the display name for a category id, or `None` if it is not in the catalog.
#[must_use]
pub fn category_name(category_id: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .find(|(id, _)| *id == category_id)
        .map(|(_, name)| *name)
}

#[must_use]
pub fn is_known_region(region_code: &str) -> bool {
    REGIONS.contains(&region_code)
}

#[must_use]
pub fn is_known_category(category_id: &str) -> bool {
    category_name(category_id).is_some()
}

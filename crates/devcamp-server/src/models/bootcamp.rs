use serde::{Deserialize, Serialize};

/// Career tracks a bootcamp may advertise
pub const CAREERS: &[&str] = &[
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

/// Photo assigned to bootcamps that have not uploaded one
pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

/// Structured location produced by geocoding a street address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

/// Turn a bootcamp name into a URL slug
///
/// Lowercases ASCII letters and digits, collapses every other run of
/// characters into a single hyphen and trims hyphens at both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Devworks Bootcamp"), "devworks-bootcamp");
        assert_eq!(slugify("  ModernTech -- Bootcamp!  "), "moderntech-bootcamp");
        assert_eq!(slugify("UI/UX Academy 2"), "ui-ux-academy-2");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_careers_are_unique() {
        let mut sorted = CAREERS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), CAREERS.len());
    }
}

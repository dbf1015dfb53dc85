use serde::{Deserialize, Serialize};

/// Minimum skill a course expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "skill_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Bootcamp average cost from the mean tuition of its courses
///
/// Rounded up to the next multiple of ten; `None` when there are no courses.
pub fn average_cost(mean_tuition: Option<f64>) -> Option<f64> {
    mean_tuition.map(|mean| (mean / 10.0).ceil() * 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_cost_rounds_up_to_ten() {
        assert_eq!(average_cost(Some(9_000.0)), Some(9_000.0));
        assert_eq!(average_cost(Some(9_001.0)), Some(9_010.0));
        assert_eq!(average_cost(Some(12_345.5)), Some(12_350.0));
        assert_eq!(average_cost(Some(0.0)), Some(0.0));
    }

    #[test]
    fn test_average_cost_of_two_courses() {
        let mean = (10_000.0 + 12_500.0) / 2.0;
        assert_eq!(average_cost(Some(mean)), Some(11_250.0));
    }

    #[test]
    fn test_average_cost_without_courses() {
        assert_eq!(average_cost(None), None);
    }

    #[test]
    fn test_skill_level_serde() {
        let level: SkillLevel = serde_json::from_str("\"intermediate\"").unwrap();
        assert_eq!(level, SkillLevel::Intermediate);
        assert!(serde_json::from_str::<SkillLevel>("\"expert\"").is_err());
    }
}

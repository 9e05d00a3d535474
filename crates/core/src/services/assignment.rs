//! Committee and country assignment.
//!
//! Every paid delegate is placed on the single conference committee and
//! given a country drawn uniformly from a fixed pool. The draw is
//! memoryless: nothing records which countries are taken, so collisions
//! across delegates are expected and correct.

use rand::seq::SliceRandom;
use serde::Serialize;

/// The single committee every delegate is assigned to.
pub const COMMITTEE: &str = "General Assembly";

/// Country pool for delegate assignment.
pub const COUNTRIES: [&str; 10] = [
    "Ghana",
    "Nigeria",
    "Kenya",
    "South Africa",
    "Egypt",
    "France",
    "Germany",
    "Japan",
    "Brazil",
    "Canada",
];

/// A (committee, country) pair given to a delegate after payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub committee: String,
    pub country: String,
}

/// Draw an assignment.
#[must_use]
pub fn assign() -> Assignment {
    let mut rng = rand::thread_rng();
    let country = COUNTRIES.choose(&mut rng).copied().unwrap_or(COUNTRIES[0]);

    Assignment {
        committee: COMMITTEE.to_string(),
        country: country.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_country_is_from_pool() {
        for _ in 0..100 {
            let assignment = assign();
            assert!(COUNTRIES.contains(&assignment.country.as_str()));
            assert_eq!(assignment.committee, COMMITTEE);
        }
    }

    #[test]
    fn test_assignment_is_memoryless() {
        // More draws than countries: the pigeonhole principle forces at
        // least one repeat, which is legal.
        let draws: Vec<String> = (0..COUNTRIES.len() + 1).map(|_| assign().country).collect();
        let mut unique = draws.clone();
        unique.sort();
        unique.dedup();
        assert!(unique.len() <= COUNTRIES.len());
    }

    #[test]
    fn test_pool_has_ten_entries() {
        assert_eq!(COUNTRIES.len(), 10);
    }
}

//! Reward calculator
//!
//! Converts volunteered time into points. Only whole hours count.

use chrono::{DateTime, Utc};

/// Points credited per whole volunteered hour
pub const POINTS_PER_HOUR: i64 = 5;

/// Points earned for `elapsed_hours` of volunteering.
///
/// Negative input is treated as zero.
pub fn reward(elapsed_hours: i64) -> i64 {
    elapsed_hours.max(0).saturating_mul(POINTS_PER_HOUR)
}

/// Whole hours between `start` and `end`, floored.
///
/// An `end` before `start` (clock skew) counts as zero.
pub fn elapsed_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_hours().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_reward_examples() {
        assert_eq!(reward(0), 0);
        assert_eq!(reward(1), 5);
        assert_eq!(reward(3), 15);
        assert_eq!(reward(-4), 0);
    }

    #[test]
    fn test_elapsed_hours_floors() {
        assert_eq!(elapsed_hours(t0(), t0()), 0);
        assert_eq!(elapsed_hours(t0(), t0() + Duration::minutes(59)), 0);
        assert_eq!(elapsed_hours(t0(), t0() + Duration::minutes(60)), 1);
        assert_eq!(elapsed_hours(t0(), t0() + Duration::minutes(150)), 2);
    }

    #[test]
    fn test_elapsed_hours_clamps_clock_skew() {
        assert_eq!(elapsed_hours(t0(), t0() - Duration::hours(3)), 0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn reward_is_five_points_per_hour(hours in 0i64..1_000_000) {
                prop_assert_eq!(reward(hours), hours * 5);
            }

            #[test]
            fn reward_never_negative(hours in any::<i64>()) {
                prop_assert!(reward(hours) >= 0);
            }

            /// Elapsed hours never exceed the real duration and miss it by less than an hour.
            #[test]
            fn elapsed_hours_is_floor_of_duration(seconds in 0i64..10_000_000) {
                let hours = elapsed_hours(t0(), t0() + Duration::seconds(seconds));
                prop_assert!(hours * 3600 <= seconds);
                prop_assert!(seconds < (hours + 1) * 3600);
            }
        }
    }
}

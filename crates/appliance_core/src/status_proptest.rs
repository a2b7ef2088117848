#[cfg(test)]
mod tests {
    use crate::status::{add_calendar_months, maintenance_status, warranty_end_date, warranty_status};
    use appliance_common::models::{MaintenanceStatus, WarrantyStatus};
    use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    // Any second between 2000-01-01 and roughly 2060.
    fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
        (946_684_800i64..2_840_000_000i64)
            .prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap())
    }

    proptest! {
        // Expired exactly when now is past the calendar end date.
        #[test]
        fn test_expired_iff_now_after_end(
            purchase in timestamp(),
            months in 1u32..240,
            now in timestamp(),
        ) {
            let status = warranty_status(purchase, months, now);
            let end = add_calendar_months(purchase, months);
            prop_assert_eq!(status == WarrantyStatus::Expired, now > end);
        }

        // Inside the window the status depends only on the whole days left.
        #[test]
        fn test_expiring_soon_window(
            purchase in timestamp(),
            months in 1u32..240,
            seconds_before_end in 1i64..(90 * 86_400),
        ) {
            let end = warranty_end_date(purchase, months);
            let now = end - Duration::seconds(seconds_before_end);
            let expected = if seconds_before_end / 86_400 <= 30 {
                WarrantyStatus::ExpiringSoon
            } else {
                WarrantyStatus::Active
            };
            prop_assert_eq!(warranty_status(purchase, months, now), expected);
        }

        // Month arithmetic never lands in a different month than expected and
        // never moves the day forward.
        #[test]
        fn test_add_months_lands_in_target_month(
            start in timestamp(),
            months in 0u32..600,
        ) {
            let end = add_calendar_months(start, months);
            let total = start.year() * 12 + start.month0() as i32 + months as i32;
            prop_assert_eq!(end.year(), total.div_euclid(12));
            prop_assert_eq!(end.month0() as i32, total.rem_euclid(12));
            prop_assert!(end.day() <= start.day());
            prop_assert_eq!(end.time(), start.time());
        }

        #[test]
        fn test_completion_always_wins(
            scheduled in timestamp(),
            completed in timestamp(),
            now in timestamp(),
        ) {
            prop_assert_eq!(
                maintenance_status(scheduled, Some(completed), now),
                MaintenanceStatus::Completed
            );
        }

        #[test]
        fn test_open_task_overdue_iff_in_past(
            scheduled in timestamp(),
            now in timestamp(),
        ) {
            let expected = if scheduled < now {
                MaintenanceStatus::Overdue
            } else {
                MaintenanceStatus::Upcoming
            };
            prop_assert_eq!(maintenance_status(scheduled, None, now), expected);
        }
    }
}

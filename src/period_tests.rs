// src/period_tests.rs

#[cfg(test)]
mod tests {
    use crate::period::*;
    use chrono::{Datelike, NaiveDate, Weekday};

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    #[test]
    fn prior_friday_from_monday_is_the_preceding_friday() {
        let monday = d("2025-03-10");
        assert_eq!(monday.weekday(), Weekday::Mon);
        assert_eq!(prior_friday(monday), d("2025-03-07"));
    }

    #[test]
    fn prior_friday_from_sunday_is_two_days_back() {
        let sunday = d("2025-03-09");
        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert_eq!(prior_friday(sunday), d("2025-03-07"));
    }

    #[test]
    fn prior_friday_from_saturday_is_one_day_back() {
        let saturday = d("2025-03-08");
        assert_eq!(saturday.weekday(), Weekday::Sat);
        assert_eq!(prior_friday(saturday), d("2025-03-07"));
    }

    #[test]
    fn prior_friday_from_friday_is_the_week_before() {
        let friday = d("2025-03-07");
        assert_eq!(friday.weekday(), Weekday::Fri);
        assert_eq!(prior_friday(friday), d("2025-02-28"));
    }

    #[test]
    fn prior_friday_always_lands_on_a_friday() {
        let mut date = d("2025-01-01");
        for _ in 0..30 {
            assert_eq!(prior_friday(date).weekday(), Weekday::Fri, "from {}", date);
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn daily_passes_explicit_date_through_unchanged() {
        let date = d("2025-06-17");
        assert_eq!(daily(Some(date)), ReportingPeriod::Day(date));
    }

    #[test]
    fn week_start_applies_prior_friday_to_the_reference() {
        let monday = d("2025-03-10");
        assert_eq!(
            week_start(Some(monday)),
            ReportingPeriod::Day(d("2025-03-07"))
        );
    }

    #[test]
    fn weekly_with_explicit_from_spans_five_days() {
        let from = d("2025-03-03");
        assert_eq!(
            weekly(Some(from), None),
            ReportingPeriod::Range {
                from,
                to: d("2025-03-07"),
            }
        );
    }

    #[test]
    fn weekly_honors_explicit_range() {
        let period = weekly(Some(d("2025-03-03")), Some(d("2025-03-09")));
        assert_eq!(period.start(), d("2025-03-03"));
        assert_eq!(period.end(), d("2025-03-09"));
    }

    #[test]
    fn previous_week_monday_from_midweek() {
        let wednesday = d("2025-03-12");
        assert_eq!(wednesday.weekday(), Weekday::Wed);
        assert_eq!(previous_week_monday(wednesday), d("2025-03-03"));
    }

    #[test]
    fn previous_week_monday_from_a_monday() {
        let monday = d("2025-03-10");
        assert_eq!(previous_week_monday(monday), d("2025-03-03"));
    }

    #[test]
    fn period_accessors_cover_both_shapes() {
        let day = ReportingPeriod::Day(d("2025-03-07"));
        assert_eq!(day.start(), d("2025-03-07"));
        assert_eq!(day.end(), d("2025-03-07"));

        let range = ReportingPeriod::Range {
            from: d("2025-03-03"),
            to: d("2025-03-07"),
        };
        assert_eq!(range.start(), d("2025-03-03"));
        assert_eq!(range.end(), d("2025-03-07"));
    }
}

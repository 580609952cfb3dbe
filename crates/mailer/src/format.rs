//! Indian-locale presentation of amounts and dates.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use docmail_core::Money;

/// Dates are shown in Indian Standard Time (UTC+05:30).
const IST_OFFSET_SECS: i32 = 5 * 3600 + 1800;

fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Format an amount as Indian Rupees with Indian digit grouping, e.g.
/// `₹12,34,567.89`. Zero renders as `₹0.00`.
pub fn format_inr(amount: Money) -> String {
    let grouped = group_indian(amount.whole_rupees());
    let sign = if amount.is_negative() { "-" } else { "" };
    format!("{sign}₹{grouped}.{:02}", amount.paise_part())
}

/// Last three digits form one group, every group before that has two.
fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    let lead = head.len() % 2;
    if lead == 1 {
        out.push_str(&head[..1]);
    }
    for (i, pair) in head.as_bytes()[lead..].chunks(2).enumerate() {
        if i > 0 || lead == 1 {
            out.push(',');
        }
        out.push(pair[0] as char);
        out.push(pair[1] as char);
    }
    out.push(',');
    out.push_str(tail);
    out
}

/// `5 Mar 2025`, in IST.
pub fn format_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&ist()).format("%-d %b %Y").to_string()
}

/// Like [`format_date`], with `N/A` for a missing date.
pub fn format_optional_date(at: Option<DateTime<Utc>>) -> String {
    at.map(format_date).unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn small_amounts_are_not_grouped() {
        assert_eq!(format_inr(Money::ZERO), "₹0.00");
        assert_eq!(format_inr(Money::from_rupees(500)), "₹500.00");
        assert_eq!(format_inr(Money::from_paise(5)), "₹0.05");
    }

    #[test]
    fn thousands_and_lakhs_use_indian_grouping() {
        assert_eq!(format_inr(Money::from_rupees(1000)), "₹1,000.00");
        assert_eq!(format_inr(Money::from_rupees(100_000)), "₹1,00,000.00");
        assert_eq!(format_inr(Money::from_paise(1_234_567_89)), "₹12,34,567.89");
        assert_eq!(format_inr(Money::from_rupees(12_345_678)), "₹1,23,45,678.00");
    }

    #[test]
    fn negative_amounts_lead_with_a_minus() {
        assert_eq!(format_inr(Money::from_rupees(-600)), "-₹600.00");
    }

    #[test]
    fn dates_are_day_month_year() {
        let at = Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap();
        assert_eq!(format_date(at), "5 Mar 2025");
    }

    #[test]
    fn dates_roll_over_into_ist() {
        // 20:00 UTC is 01:30 the next day in IST.
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 20, 0, 0).unwrap();
        assert_eq!(format_date(at), "1 Jan 2025");
    }

    #[test]
    fn missing_date_is_na() {
        assert_eq!(format_optional_date(None), "N/A");
    }

    proptest! {
        #[test]
        fn grouping_preserves_digits(paise in 0i64..1_000_000_000_000i64) {
            let formatted = format_inr(Money::from_paise(paise));
            let digits: String = formatted.chars().filter(char::is_ascii_digit).collect();
            let expected = format!("{}{:02}", paise / 100, paise % 100);
            prop_assert_eq!(digits, expected);
        }

        #[test]
        fn groups_before_the_last_are_pairs(rupees in 1_000i64..100_000_000_000i64) {
            let formatted = format_inr(Money::from_rupees(rupees));
            let integer = formatted.trim_start_matches('₹').split('.').next().unwrap().to_string();
            let groups: Vec<&str> = integer.split(',').collect();
            prop_assert_eq!(groups.last().unwrap().len(), 3);
            for g in &groups[1..groups.len() - 1] {
                prop_assert_eq!(g.len(), 2);
            }
            prop_assert!(groups[0].len() == 1 || groups[0].len() == 2);
        }
    }
}

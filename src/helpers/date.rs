//! Date helper functions

use chrono::{DateTime, Datelike, TimeZone, Utc};
use chrono_tz::Tz;

/// Convert a UTC timestamp into the site's display timezone
///
/// Unknown timezone names fall back to UTC rather than failing a build.
pub fn in_timezone(date: &DateTime<Utc>, tz_name: &str) -> DateTime<Tz> {
    let tz: Tz = tz_name.parse().unwrap_or(chrono_tz::UTC);
    date.with_timezone(&tz)
}

/// Format a date using a Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "DD MMM YYYY", "pt-br") // -> "15 mar 2021"
/// ```
pub fn format_date<Z: TimeZone>(date: &DateTime<Z>, format: &str, lang: &str) -> String
where
    Z::Offset: std::fmt::Display,
{
    // Month names are substituted before the remaining tokens go to chrono
    // so they honor the configured language.
    let localized = format
        .replace("MMMM", month_name(date.month(), lang))
        .replace("MMM", month_abbrev(date.month(), lang));
    let chrono_format = moment_to_chrono_format(&localized);
    date.format(&chrono_format).to_string()
}

/// The "edited on ..." note under a post title
pub fn edited_note<Z: TimeZone>(date: &DateTime<Z>, date_format: &str, lang: &str) -> String
where
    Z::Offset: std::fmt::Display,
{
    let day = format_date(date, date_format, lang);
    let time = date.format("%H:%M");
    if lang.starts_with("pt") {
        format!("editado em {}, às {}", day, time)
    } else {
        format!("edited on {}, at {}", day, time)
    }
}

fn month_abbrev(month: u32, lang: &str) -> &'static str {
    const EN: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    const PT: [&str; 12] = [
        "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
    ];
    let idx = (month.saturating_sub(1) as usize).min(11);
    if lang.starts_with("pt") {
        PT[idx]
    } else {
        EN[idx]
    }
}

fn month_name(month: u32, lang: &str) -> &'static str {
    const EN: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    const PT: [&str; 12] = [
        "janeiro",
        "fevereiro",
        "março",
        "abril",
        "maio",
        "junho",
        "julho",
        "agosto",
        "setembro",
        "outubro",
        "novembro",
        "dezembro",
    ];
    let idx = (month.saturating_sub(1) as usize).min(11);
    if lang.starts_with("pt") {
        PT[idx]
    } else {
        EN[idx]
    }
}

/// Convert Moment.js tokens to chrono format specifiers
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MM", "%m"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("mm", "%M"),
        ("ss", "%S"),
    ];

    let mut result = format.to_string();
    for (from, to) in replacements {
        result = result.replace(from, to);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 28).unwrap()
    }

    #[test]
    fn test_format_date_english() {
        assert_eq!(format_date(&date(), "DD MMM YYYY", "en"), "15 Mar 2021");
        assert_eq!(format_date(&date(), "YYYY-MM-DD", "en"), "2021-03-15");
    }

    #[test]
    fn test_format_date_portuguese() {
        assert_eq!(format_date(&date(), "DD MMM YYYY", "pt-br"), "15 mar 2021");
        assert_eq!(
            format_date(&date(), "DD MMMM YYYY", "pt-br"),
            "15 março 2021"
        );
    }

    #[test]
    fn test_edited_note() {
        assert_eq!(
            edited_note(&date(), "DD MMM YYYY", "pt-br"),
            "editado em 15 mar 2021, às 19:25"
        );
        assert_eq!(
            edited_note(&date(), "DD MMM YYYY", "en"),
            "edited on 15 Mar 2021, at 19:25"
        );
    }

    #[test]
    fn test_in_timezone() {
        let local = in_timezone(&date(), "America/Sao_Paulo");
        assert_eq!(local.hour(), 16);

        // unknown zones fall back to UTC
        let utc = in_timezone(&date(), "Nowhere/Invalid");
        assert_eq!(utc.hour(), 19);
    }
}

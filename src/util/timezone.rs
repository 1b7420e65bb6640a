use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use time::{OffsetDateTime, UtcOffset};

/// Display format for fault timestamps, e.g. `4 Mar 2025, 09:15`.
pub const DISPLAY_FORMAT: &str = "%-d %b %Y, %H:%M";

pub fn localized_datetime(time: OffsetDateTime, tz: Tz) -> DateTime<Tz> {
    let utc = time.to_offset(UtcOffset::UTC);
    let datetime_utc = DateTime::<Utc>::from_timestamp(utc.unix_timestamp(), utc.nanosecond())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    tz.from_utc_datetime(&datetime_utc.naive_utc())
}

pub fn format_local(time: OffsetDateTime, tz: Tz) -> String {
    localized_datetime(time, tz)
        .format(DISPLAY_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_in_the_board_timezone() {
        let at = datetime!(2025-03-04 08:15:30 UTC);
        assert_eq!(format_local(at, Tz::UTC), "4 Mar 2025, 08:15");
        assert_eq!(
            format_local(at, chrono_tz::Europe::Berlin),
            "4 Mar 2025, 09:15"
        );
    }

    #[test]
    fn offsets_are_normalised_before_localising() {
        let at = datetime!(2025-07-01 23:30:00 -02:00);
        assert_eq!(format_local(at, Tz::UTC), "2 Jul 2025, 01:30");
    }
}

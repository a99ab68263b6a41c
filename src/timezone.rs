use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::{Error, month::YearMonth};

pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in `canonical_timezone`.
///
/// # Errors
///
/// Returns an [Error::InvalidTimezoneError] if `canonical_timezone` is not a known timezone.
pub fn local_today(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

/// The current month in `canonical_timezone`.
///
/// # Errors
///
/// Returns an [Error::InvalidTimezoneError] if `canonical_timezone` is not a known timezone.
pub fn current_month(canonical_timezone: &str) -> Result<YearMonth, Error> {
    local_today(canonical_timezone).map(YearMonth::from_date)
}

#[cfg(test)]
mod tests {
    use time::{OffsetDateTime, UtcOffset};

    use crate::{
        Error,
        month::YearMonth,
        timezone::{current_month, get_local_offset, local_today},
    };

    #[test]
    fn manila_has_fixed_offset() {
        assert_eq!(
            get_local_offset("Asia/Manila"),
            Some(UtcOffset::from_hms(8, 0, 0).unwrap())
        );
    }

    #[test]
    fn utc_today_matches_now() {
        let today = local_today("Etc/UTC").unwrap();

        assert_eq!(today, OffsetDateTime::now_utc().date());
        assert_eq!(current_month("Etc/UTC").unwrap(), YearMonth::from_date(today));
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        assert_eq!(
            local_today("Mars/Olympus_Mons"),
            Err(Error::InvalidTimezoneError("Mars/Olympus_Mons".to_owned()))
        );
    }
}

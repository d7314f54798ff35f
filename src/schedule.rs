use chrono::{Days, NaiveDateTime, NaiveTime};

use crate::reminder::Frequency;

/// Works out when a reminder at `time` should next fire, as seen from `now`.
///
/// A one-off reminder is always due today at `time`, even when that has
/// already passed; the tick is what turns it into a miss. A daily reminder
/// whose slot today is not strictly after `now` moves on to tomorrow.
///
/// `None` only when tomorrow is past the end of the representable calendar.
pub(crate) fn compute_next_due(
    time: NaiveTime,
    frequency: Frequency,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let today = NaiveDateTime::new(now.date(), time);

    match frequency {
        Frequency::Once => Some(today),
        Frequency::Daily if today > now => Some(today),
        Frequency::Daily => now
            .date()
            .checked_add_days(Days::new(1))
            .map(|tomorrow| NaiveDateTime::new(tomorrow, time)),
    }
}

/// The daily slot at `time` lying closest to `now`, before or after it. When
/// both are equally far the earlier one wins.
pub(crate) fn nearest_daily_slot(time: NaiveTime, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let upcoming = compute_next_due(time, Frequency::Daily, now)?;
    let Some(previous) = upcoming.checked_sub_days(Days::new(1)) else {
        return Some(upcoming);
    };

    if upcoming - now < now - previous {
        Some(upcoming)
    } else {
        Some(previous)
    }
}

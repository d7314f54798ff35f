use std::{fmt, str::FromStr};

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::EngineError,
    schedule::{compute_next_due, nearest_daily_slot},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct ReminderId(Uuid);

impl ReminderId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Frequency {
    Once,
    Daily,
}

impl Frequency {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Frequency::Once => "once",
            Frequency::Daily => "daily",
        }
    }
}

impl FromStr for Frequency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "once" => Ok(Frequency::Once),
            "daily" => Ok(Frequency::Daily),
            other => Err(EngineError::validation(
                "frequency",
                format!("expected once or daily, got {other:?}"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Status {
    Upcoming,
    Taken,
    Missed,
}

impl Status {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Status::Upcoming => "upcoming",
            Status::Taken => "taken",
            Status::Missed => "missed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single medicine reminder as it is stored and shown. Stored with
/// camelCase field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Reminder {
    pub(crate) id: ReminderId,
    pub(crate) medicine_name: String,
    pub(crate) dosage: String,
    #[serde(with = "time_of_day")]
    pub(crate) time: NaiveTime,
    pub(crate) frequency: Frequency,
    pub(crate) status: Status,
    pub(crate) created_at: NaiveDateTime,
    pub(crate) last_taken: Option<NaiveDateTime>,
    pub(crate) next_due: Option<NaiveDateTime>,
}

impl Reminder {
    pub(crate) fn new(fields: ReminderFields, now: NaiveDateTime) -> Self {
        Self {
            id: ReminderId::generate(),
            next_due: compute_next_due(fields.time, fields.frequency, now),
            medicine_name: fields.medicine_name,
            dosage: fields.dosage,
            time: fields.time,
            frequency: fields.frequency,
            status: Status::Upcoming,
            created_at: now,
            last_taken: None,
        }
    }

    /// Replaces the user-editable fields and re-arms `next_due`. `last_taken`
    /// is left alone, and so is the status of a one-off. A daily reminder is
    /// always upcoming.
    pub(crate) fn apply(&mut self, fields: ReminderFields, now: NaiveDateTime) {
        self.medicine_name = fields.medicine_name;
        self.dosage = fields.dosage;
        self.time = fields.time;
        self.frequency = fields.frequency;
        self.next_due = compute_next_due(fields.time, fields.frequency, now);
        if self.frequency == Frequency::Daily {
            self.status = Status::Upcoming;
        }
    }

    /// Returns false when the reminder is a one-off that has already been
    /// taken or missed.
    pub(crate) fn mark_taken(&mut self, now: NaiveDateTime) -> bool {
        match self.frequency {
            Frequency::Once => {
                if self.status != Status::Upcoming {
                    return false;
                }
                self.status = Status::Taken;
                self.last_taken = Some(now);
            }
            Frequency::Daily => {
                self.last_taken = Some(now);

                // The dose being taken is the slot nearest to now, whether it
                // is just ahead or already rolled over by a tick.
                self.next_due = nearest_daily_slot(self.time, now)
                    .and_then(|slot| compute_next_due(self.time, Frequency::Daily, slot));
                self.status = Status::Upcoming;
            }
        }

        true
    }
}

/// Raw, unvalidated input from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReminderDraft {
    pub(crate) medicine_name: String,
    pub(crate) dosage: String,
    pub(crate) time: String,
    pub(crate) frequency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReminderFields {
    medicine_name: String,
    dosage: String,
    time: NaiveTime,
    frequency: Frequency,
}

impl ReminderDraft {
    pub(crate) fn validate(&self) -> Result<ReminderFields, EngineError> {
        Ok(ReminderFields {
            medicine_name: non_empty("medicine name", &self.medicine_name)?,
            dosage: non_empty("dosage", &self.dosage)?,
            time: parse_time_of_day(&self.time)?,
            frequency: self.frequency.parse()?,
        })
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<String, EngineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_owned())
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime, EngineError> {
    NaiveTime::parse_from_str(value.trim(), time_of_day::FORMAT).map_err(|err| {
        EngineError::validation("time", format!("expected HH:MM, got {value:?} ({err})"))
    })
}

mod time_of_day {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) const FORMAT: &str = "%H:%M";

    pub(super) fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&encoded, FORMAT).map_err(D::Error::custom)
    }
}


#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{NaiveDateTime, NaiveTime};

    use crate::error::EngineError;

    use super::{testhelper::draft, Frequency, Reminder, ReminderDraft, Status};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::from_str(s).unwrap()
    }

    #[test]
    fn validate_trims_text_fields() {
        let fields = ReminderDraft {
            medicine_name: "  Aspirin ".to_owned(),
            dosage: " 100mg\n".to_owned(),
            time: "08:30".to_owned(),
            frequency: "daily".to_owned(),
        }
        .validate()
        .unwrap();

        let reminder = Reminder::new(fields, at("2020-01-01T07:00:00"));
        assert_eq!(reminder.medicine_name, "Aspirin");
        assert_eq!(reminder.dosage, "100mg");
        assert_eq!(reminder.time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    }

    #[test]
    fn validate_rejects_blank_name() {
        let err = draft("   ", "08:00", "once").validate().unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation {
                field: "medicine name",
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_blank_dosage() {
        let mut input = draft("Aspirin", "08:00", "once");
        input.dosage = String::new();
        let err = input.validate().unwrap_err();
        assert!(matches!(err, EngineError::Validation { field: "dosage", .. }));
    }

    #[test]
    fn validate_rejects_malformed_time() {
        for time in ["", "8am", "25:00", "12:61", "noon"] {
            let err = draft("Aspirin", time, "once").validate().unwrap_err();
            assert!(
                matches!(err, EngineError::Validation { field: "time", .. }),
                "{time:?} should be rejected"
            );
        }
    }

    #[test]
    fn validate_rejects_unknown_frequency() {
        let err = draft("Aspirin", "08:00", "weekly").validate().unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation {
                field: "frequency",
                ..
            }
        ));
    }

    #[test]
    fn new_reminder_is_upcoming_and_armed() {
        let now = at("2020-01-01T07:00:00");
        let reminder = Reminder::new(draft("Aspirin", "08:00", "daily").validate().unwrap(), now);

        assert_eq!(reminder.status, Status::Upcoming);
        assert_eq!(reminder.created_at, now);
        assert_eq!(reminder.last_taken, None);
        assert_eq!(reminder.next_due, Some(at("2020-01-01T08:00:00")));
    }

    #[test]
    fn ids_are_unique() {
        let now = at("2020-01-01T07:00:00");
        let fields = draft("Aspirin", "08:00", "daily").validate().unwrap();
        let a = Reminder::new(fields.clone(), now);
        let b = Reminder::new(fields, now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn mark_taken_once_is_terminal() {
        let now = at("2020-01-01T07:00:00");
        let mut reminder = Reminder::new(draft("Aspirin", "08:00", "once").validate().unwrap(), now);

        assert!(reminder.mark_taken(at("2020-01-01T08:00:30")));
        assert_eq!(reminder.status, Status::Taken);
        assert_eq!(reminder.last_taken, Some(at("2020-01-01T08:00:30")));

        assert!(!reminder.mark_taken(at("2020-01-01T09:00:00")));
        assert_eq!(reminder.last_taken, Some(at("2020-01-01T08:00:30")));
    }

    #[test]
    fn mark_taken_early_daily_moves_to_tomorrow() {
        let mut reminder = Reminder::new(
            draft("Aspirin", "08:00", "daily").validate().unwrap(),
            at("2020-01-01T07:00:00"),
        );

        // Taken 30 seconds before the dose is due
        assert!(reminder.mark_taken(at("2020-01-01T07:59:30")));
        assert_eq!(reminder.status, Status::Upcoming);
        assert_eq!(reminder.last_taken, Some(at("2020-01-01T07:59:30")));
        assert_eq!(reminder.next_due, Some(at("2020-01-02T08:00:00")));
    }

    #[test]
    fn apply_keeps_one_off_status_and_last_taken() {
        let mut reminder = Reminder::new(
            draft("Aspirin", "08:00", "once").validate().unwrap(),
            at("2020-01-01T07:00:00"),
        );
        reminder.mark_taken(at("2020-01-01T08:00:00"));

        reminder.apply(
            draft("Ibuprofen", "21:15", "once").validate().unwrap(),
            at("2020-01-01T20:00:00"),
        );
        assert_eq!(reminder.medicine_name, "Ibuprofen");
        assert_eq!(reminder.status, Status::Taken);
        assert_eq!(reminder.last_taken, Some(at("2020-01-01T08:00:00")));
        assert_eq!(reminder.next_due, Some(at("2020-01-01T21:15:00")));
    }

    #[test]
    fn apply_daily_rearms_a_taken_one_off() {
        let mut reminder = Reminder::new(
            draft("Aspirin", "08:00", "once").validate().unwrap(),
            at("2020-01-01T07:00:00"),
        );
        reminder.mark_taken(at("2020-01-01T08:00:00"));

        reminder.apply(
            draft("Ibuprofen", "21:15", "daily").validate().unwrap(),
            at("2020-01-01T22:00:00"),
        );
        assert_eq!(reminder.frequency, Frequency::Daily);
        assert_eq!(reminder.status, Status::Upcoming);
        assert_eq!(reminder.last_taken, Some(at("2020-01-01T08:00:00")));
        assert_eq!(reminder.next_due, Some(at("2020-01-02T21:15:00")));
    }

    #[test]
    fn mark_taken_late_daily_after_rollover_keeps_tomorrow() {
        let mut reminder = Reminder::new(
            draft("Aspirin", "09:00", "daily").validate().unwrap(),
            at("2020-01-01T08:00:00"),
        );
        // What a tick past the grace window leaves behind
        reminder.next_due = Some(at("2020-01-02T09:00:00"));

        assert!(reminder.mark_taken(at("2020-01-01T09:30:00")));
        assert_eq!(reminder.next_due, Some(at("2020-01-02T09:00:00")));
        assert!(reminder.mark_taken(at("2020-01-01T09:31:00")));
        assert_eq!(reminder.next_due, Some(at("2020-01-02T09:00:00")));
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let reminder = Reminder::new(
            draft("Aspirin", "08:05", "daily").validate().unwrap(),
            at("2020-01-01T07:00:00"),
        );
        let json: serde_json::Value = serde_json::to_value(&reminder).unwrap();

        assert_eq!(json["medicineName"], "Aspirin");
        assert_eq!(json["time"], "08:05");
        assert_eq!(json["frequency"], "daily");
        assert_eq!(json["status"], "upcoming");
        assert_eq!(json["lastTaken"], serde_json::Value::Null);
        assert_eq!(json["nextDue"], "2020-01-01T08:05:00");

        let decoded: Reminder = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, reminder);
    }
}

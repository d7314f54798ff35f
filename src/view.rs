use std::io::Write;

use chrono::{NaiveDateTime, NaiveTime};
use log::warn;

use crate::{
    engine::{StatusCounts, StatusFilter},
    notify::Alert,
    reminder::{Reminder, Status},
    theme::Theme,
};

/// Everything the engine actor tells the user about. Fired after every
/// mutation and after every tick that changed something.
pub(crate) trait ReminderView: Alert {
    fn on_reminder_list_changed(&mut self, filter: StatusFilter, reminders: &[&Reminder]);
    fn on_counts_changed(&mut self, counts: StatusCounts);
    fn on_theme_changed(&mut self, theme: Theme);
    fn show_success(&mut self, message: &str);
    fn show_error(&mut self, message: &str);
}

/// Plain-text view written to a terminal.
pub(crate) struct ConsoleView<W: Write> {
    out: W,
}

impl<W: Write> ConsoleView<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    fn write_lines<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        let result = lines
            .into_iter()
            .try_for_each(|line| writeln!(self.out, "{line}"))
            .and_then(|()| self.out.flush());
        if let Err(err) = result {
            warn!("Failed to write to console: {}", err);
        }
    }
}

impl<W: Write> Alert for ConsoleView<W> {
    fn alert(&mut self, message: &str) {
        // Terminal bell, then the message itself
        self.write_lines(
            std::iter::once("\x07".to_owned()).chain(message.lines().map(str::to_owned)),
        );
    }
}

impl<W: Write> ReminderView for ConsoleView<W> {
    fn on_reminder_list_changed(&mut self, filter: StatusFilter, reminders: &[&Reminder]) {
        if reminders.is_empty() {
            self.write_lines([empty_message(filter).to_owned()]);
            return;
        }

        let lines: Vec<String> = reminders
            .iter()
            .enumerate()
            .flat_map(|(idx, reminder)| render_card(idx + 1, reminder))
            .collect();
        self.write_lines(lines);
    }

    fn on_counts_changed(&mut self, counts: StatusCounts) {
        self.write_lines([format!(
            "All {} | Upcoming {} | Taken {} | Missed {}",
            counts.all, counts.upcoming, counts.taken, counts.missed
        )]);
    }

    fn on_theme_changed(&mut self, theme: Theme) {
        self.write_lines([format!("Theme: {}", theme.as_str())]);
    }

    fn show_success(&mut self, message: &str) {
        self.write_lines([message.to_owned()]);
    }

    fn show_error(&mut self, message: &str) {
        self.write_lines([format!("Error: {message}")]);
    }
}

fn empty_message(filter: StatusFilter) -> &'static str {
    match filter {
        StatusFilter::All => "No reminders found. Add your first medicine reminder above!",
        StatusFilter::Only(Status::Upcoming) => "No upcoming reminders.",
        StatusFilter::Only(Status::Taken) => "No reminders marked as taken yet.",
        StatusFilter::Only(Status::Missed) => "No missed reminders.",
    }
}

fn render_card(position: usize, reminder: &Reminder) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{}. {} ({}) [{}]",
            position, reminder.medicine_name, reminder.dosage, reminder.status
        ),
        format!(
            "   Time: {}  Frequency: {}",
            format_time(reminder.time),
            reminder.frequency.as_str()
        ),
    ];

    if reminder.status == Status::Upcoming {
        if let Some(next_due) = reminder.next_due {
            lines.push(format!("   Next due: {}", format_date_time(next_due)));
        }
    }
    if let Some(last_taken) = reminder.last_taken {
        lines.push(format!("   Last taken: {}", format_date_time(last_taken)));
    }

    lines
}

/// `9:05 PM` style.
pub(crate) fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// `Jan 2, 9:05 PM` style.
pub(crate) fn format_date_time(datetime: NaiveDateTime) -> String {
    datetime.format("%b %-d, %-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{NaiveDateTime, NaiveTime};

    use crate::{
        engine::{StatusCounts, StatusFilter},
        notify::Alert,
        reminder::{testhelper::draft, Reminder, Status},
    };

    use super::{format_date_time, format_time, render_card, ConsoleView, ReminderView};

    fn output(view: ConsoleView<Vec<u8>>) -> String {
        String::from_utf8(view.out).unwrap()
    }

    #[test]
    fn format_time_is_twelve_hour() {
        assert_eq!(format_time(NaiveTime::from_str("00:05:00").unwrap()), "12:05 AM");
        assert_eq!(format_time(NaiveTime::from_str("09:00:00").unwrap()), "9:00 AM");
        assert_eq!(format_time(NaiveTime::from_str("12:30:00").unwrap()), "12:30 PM");
        assert_eq!(format_time(NaiveTime::from_str("21:45:00").unwrap()), "9:45 PM");
    }

    #[test]
    fn format_date_time_short_month() {
        assert_eq!(
            format_date_time(NaiveDateTime::from_str("2020-01-02T21:05:00").unwrap()),
            "Jan 2, 9:05 PM"
        );
    }

    #[test]
    fn card_shows_next_due_only_while_upcoming() {
        let mut reminder = Reminder::new(
            draft("Aspirin", "09:00", "once").validate().unwrap(),
            NaiveDateTime::from_str("2020-01-01T08:00:00").unwrap(),
        );
        assert_eq!(
            render_card(1, &reminder),
            vec![
                "1. Aspirin (1 tablet) [upcoming]",
                "   Time: 9:00 AM  Frequency: once",
                "   Next due: Jan 1, 9:00 AM",
            ]
        );

        reminder.mark_taken(NaiveDateTime::from_str("2020-01-01T09:02:00").unwrap());
        assert_eq!(
            render_card(2, &reminder),
            vec![
                "2. Aspirin (1 tablet) [taken]",
                "   Time: 9:00 AM  Frequency: once",
                "   Last taken: Jan 1, 9:02 AM",
            ]
        );
    }

    #[test]
    fn empty_list_explains_the_filter() {
        let mut view = ConsoleView::new(Vec::new());
        view.on_reminder_list_changed(StatusFilter::Only(Status::Missed), &[]);
        view.on_reminder_list_changed(StatusFilter::All, &[]);

        assert_eq!(
            output(view),
            "No missed reminders.\nNo reminders found. Add your first medicine reminder above!\n"
        );
    }

    #[test]
    fn counts_and_alerts() {
        let mut view = ConsoleView::new(Vec::new());
        view.on_counts_changed(StatusCounts {
            all: 3,
            upcoming: 1,
            taken: 1,
            missed: 1,
        });
        view.alert("Medicine Reminder!\n\nTime to take your Aspirin");

        assert_eq!(
            output(view),
            "All 3 | Upcoming 1 | Taken 1 | Missed 1\n\x07\nMedicine Reminder!\n\nTime to take your Aspirin\n"
        );
    }
}

use std::process::{Command, Stdio};

use anyhow::{ensure, Context, Result};
use log::{debug, error, info, warn};

use crate::reminder::Reminder;

const NOTIFICATION_TITLE: &str = "Medicine Reminder";

// Desktop notifications close themselves after this long
const AUTO_CLOSE_MILLIS: u32 = 10_000;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Permission {
    Default,
    Granted,
    Denied,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct NotificationAction {
    pub(crate) id: &'static str,
    pub(crate) label: &'static str,
}

const REMINDER_ACTIONS: &[NotificationAction] = &[
    NotificationAction {
        id: "taken",
        label: "Mark as Taken",
    },
    NotificationAction {
        id: "dismiss",
        label: "Dismiss",
    },
];

pub(crate) trait Notifier {
    fn permission(&self) -> Permission;
    fn request_permission(&mut self) -> Result<Permission>;
    fn notify(&mut self, title: &str, body: &str, actions: &[NotificationAction]) -> Result<()>;
}

/// Synchronous last-resort path for getting a reminder in front of the user.
pub(crate) trait Alert {
    fn alert(&mut self, message: &str);
}

/// Shows notifications by running a desktop notification program
/// (`notify-send` compatible). Without a program, permission is denied and
/// every reminder goes through the fallback alert.
pub(crate) struct CommandNotifier {
    program: Option<String>,
    permission: Permission,
}

impl CommandNotifier {
    pub(crate) fn new(program: Option<String>) -> Self {
        let permission = if program.is_some() {
            Permission::Default
        } else {
            Permission::Denied
        };
        Self {
            program,
            permission,
        }
    }
}

impl Notifier for CommandNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Result<Permission> {
        let Some(program) = &self.program else {
            return Ok(Permission::Denied);
        };

        let status = Command::new(program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        self.permission = match status {
            Ok(status) if status.success() => Permission::Granted,
            Ok(_) => Permission::Denied,
            Err(err) => {
                self.permission = Permission::Denied;
                return Err(err).with_context(|| format!("Failed to run {program}"));
            }
        };

        Ok(self.permission)
    }

    fn notify(&mut self, title: &str, body: &str, actions: &[NotificationAction]) -> Result<()> {
        let program = self
            .program
            .as_deref()
            .context("No notification program configured")?;

        // notify-send can only report actions by blocking until the
        // notification closes, so they are not offered.
        for action in actions {
            debug!("Not offering action {} ({})", action.id, action.label);
        }

        let status = Command::new(program)
            .arg(format!("--expire-time={AUTO_CLOSE_MILLIS}"))
            .arg("--app-name=pillminder")
            .arg(title)
            .arg(body)
            .status()
            .with_context(|| format!("Failed to run {program}"))?;
        ensure!(status.success(), "{} exited with {}", program, status);

        Ok(())
    }
}

fn notification_body(reminder: &Reminder) -> String {
    format!(
        "Time to take your {} ({})",
        reminder.medicine_name, reminder.dosage
    )
}

fn fallback_message(reminder: &Reminder) -> String {
    format!(
        "Medicine Reminder!\n\nTime to take your {}\nDosage: {}",
        reminder.medicine_name, reminder.dosage
    )
}

/// Checks permission up front and asks for it when it was never decided.
pub(crate) fn ensure_permission<N: Notifier>(notifier: &mut N) -> Permission {
    if notifier.permission() != Permission::Default {
        return notifier.permission();
    }

    match notifier.request_permission() {
        Ok(permission) => {
            info!("Notification permission: {:?}", permission);
            permission
        }
        Err(err) => {
            warn!("Notification permission request failed: {:?}", err);
            notifier.permission()
        }
    }
}

/// Tells the user `reminder` is due: a notification when permitted and
/// working, otherwise the fallback alert.
pub(crate) fn deliver<N, A>(notifier: &mut N, alert: &mut A, reminder: &Reminder)
where
    N: Notifier,
    A: Alert,
{
    if notifier.permission() == Permission::Granted {
        match notifier.notify(
            NOTIFICATION_TITLE,
            &notification_body(reminder),
            REMINDER_ACTIONS,
        ) {
            Ok(()) => {
                info!("Sent notification for {}", reminder.medicine_name);
                return;
            }
            Err(err) => {
                error!(
                    "Failed to show notification for {}: {:?}",
                    reminder.medicine_name, err
                );
            }
        }
    }

    alert.alert(&fallback_message(reminder));
}

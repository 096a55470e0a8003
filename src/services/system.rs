//! Effects backed by external commands: an audio player and `notify-send`

use std::{
    collections::HashMap,
    path::PathBuf,
    process::Stdio,
    sync::{Arc, Mutex},
};

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
    sync::mpsc,
};
use tracing::{debug, info, warn};

use super::{Effects, NotificationClicks};

/// Action key `notify-send --wait` prints when the body is clicked
const DEFAULT_ACTION: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// `notify-send` is starting; `close` is set when a clear arrived first
    Pending { close: bool },
    Shown(u32),
}

/// Server-assigned notification ids, keyed by our fixed tags
#[derive(Debug, Default)]
struct NotificationIds {
    slots: HashMap<String, Slot>,
}

impl NotificationIds {
    /// Id to replace when showing `tag` again; otherwise marks it pending
    fn begin(&mut self, tag: &str) -> Option<u32> {
        match self.slots.get(tag) {
            Some(Slot::Shown(id)) => Some(*id),
            _ => {
                self.slots.insert(tag.to_string(), Slot::Pending { close: false });
                None
            }
        }
    }

    /// Record the id reported for `tag`. Returns it back when a clear was
    /// requested in the meantime and the notification must be closed now.
    fn assigned(&mut self, tag: &str, id: u32) -> Option<u32> {
        match self.slots.get(tag) {
            Some(Slot::Pending { close: true }) => {
                self.slots.remove(tag);
                Some(id)
            }
            _ => {
                self.slots.insert(tag.to_string(), Slot::Shown(id));
                None
            }
        }
    }

    /// Id to close for `tag`, or a deferred close if the id is not known yet
    fn take_for_close(&mut self, tag: &str) -> Option<u32> {
        match self.slots.remove(tag) {
            Some(Slot::Shown(id)) => Some(id),
            Some(Slot::Pending { .. }) => {
                self.slots.insert(tag.to_string(), Slot::Pending { close: true });
                None
            }
            None => None,
        }
    }

    /// The notification went away on its own
    fn gone(&mut self, tag: &str, id: Option<u32>) {
        let matches = match (self.slots.get(tag), id) {
            (Some(Slot::Shown(current)), Some(id)) => *current == id,
            (Some(Slot::Pending { .. }), None) => true,
            _ => false,
        };
        if matches {
            self.slots.remove(tag);
        }
    }
}

/// Effects that shell out to the desktop
#[derive(Debug, Clone)]
pub struct SystemEffects {
    /// Player program and leading arguments; `None` disables audio
    player: Option<(String, Vec<String>)>,
    chime_path: PathBuf,
    notifications: bool,
    ids: Arc<Mutex<NotificationIds>>,
    /// Receives the tag of every notification the user clicks
    clicks: NotificationClicks,
}

impl SystemEffects {
    pub fn new(
        player: Option<(String, Vec<String>)>,
        chime_path: PathBuf,
        notifications: bool,
        clicks: NotificationClicks,
    ) -> Self {
        Self {
            player,
            chime_path,
            notifications,
            ids: Arc::new(Mutex::new(NotificationIds::default())),
            clicks,
        }
    }
}

fn close_notification(id: u32) -> Result<(), String> {
    let child = Command::new("gdbus")
        .args([
            "call",
            "--session",
            "--dest",
            "org.freedesktop.Notifications",
            "--object-path",
            "/org/freedesktop/Notifications",
            "--method",
            "org.freedesktop.Notifications.CloseNotification",
        ])
        .arg(id.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to execute gdbus: {}", e))?;

    tokio::spawn(async move {
        match child.wait_with_output().await {
            Ok(out) if !out.status.success() => {
                warn!("Closing notification {} failed: {}", id, String::from_utf8_lossy(&out.stderr));
            }
            Ok(_) => debug!("Closed notification {}", id),
            Err(e) => warn!("Failed to wait for gdbus: {}", e),
        }
    });
    Ok(())
}

/// Follow a `notify-send --print-id --wait` process: the first line is the
/// id, any later line is the action the user invoked.
async fn watch_notification(
    mut child: tokio::process::Child,
    tag: String,
    ids: Arc<Mutex<NotificationIds>>,
    clicks: mpsc::UnboundedSender<String>,
) {
    let mut id = None;
    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read notify-send output: {}", e);
                    break;
                }
            };
            let line = line.trim();

            if id.is_none() {
                match line.parse::<u32>() {
                    Ok(assigned) => {
                        debug!("Notification {} shown with id {}", tag, assigned);
                        id = Some(assigned);
                        let close_now = match ids.lock() {
                            Ok(mut ids) => ids.assigned(&tag, assigned),
                            Err(_) => None,
                        };
                        if let Some(stale) = close_now {
                            debug!("Notification {} was cleared before it appeared", tag);
                            if let Err(e) = close_notification(stale) {
                                warn!("{}", e);
                            }
                        }
                        continue;
                    }
                    Err(_) => debug!("notify-send did not report an id for {}", tag),
                }
            }

            if line == DEFAULT_ACTION {
                info!("Notification {} clicked", tag);
                if clicks.send(tag.clone()).is_err() {
                    debug!("Nobody listens for notification clicks");
                }
            }
        }
    }

    match child.wait_with_output().await {
        Ok(output) if !output.status.success() => {
            warn!("notify-send failed: {}", String::from_utf8_lossy(&output.stderr));
        }
        Ok(_) => {}
        Err(e) => warn!("Failed to wait for notify-send: {}", e),
    }
    if let Ok(mut ids) = ids.lock() {
        ids.gone(&tag, id);
    }
}

impl Effects for SystemEffects {
    fn play_chime(&self) -> Result<(), String> {
        let Some((program, args)) = &self.player else {
            return Ok(());
        };

        let mut child = Command::new(program)
            .args(args)
            .arg(&self.chime_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("Failed to execute {}: {}", program, e))?;

        let program = program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    warn!("{} exited with {}", program, status);
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to wait for {}: {}", program, e),
            }
        });
        Ok(())
    }

    fn show_notification(&self, tag: &str, title: &str, message: &str) -> Result<(), String> {
        if !self.notifications {
            return Ok(());
        }

        let replace = self
            .ids
            .lock()
            .map_err(|e| format!("Failed to lock notification ids: {}", e))?
            .begin(tag);

        let mut command = Command::new("notify-send");
        command.args([
            "--app-name",
            "Tea Timer",
            "--urgency",
            "critical",
            "--print-id",
            "--wait",
            "--action",
            "default=Dismiss",
        ]);
        if let Some(id) = replace {
            command.arg("--replace-id").arg(id.to_string());
        }
        command
            .args([title, message])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                if let Ok(mut ids) = self.ids.lock() {
                    ids.gone(tag, None);
                }
                return Err(format!("Failed to execute notify-send: {}", e));
            }
        };

        tokio::spawn(watch_notification(
            child,
            tag.to_string(),
            Arc::clone(&self.ids),
            self.clicks.clone(),
        ));
        Ok(())
    }

    fn clear_notification(&self, tag: &str) -> Result<(), String> {
        let id = self
            .ids
            .lock()
            .map_err(|e| format!("Failed to lock notification ids: {}", e))?
            .take_for_close(tag);
        match id {
            Some(id) => close_notification(id),
            None => Ok(()),
        }
    }
}

/// Check whether an external program can be started
pub async fn check_command_available(program: &str, version_arg: &str) -> Result<(), String> {
    Command::new(program)
        .arg(version_arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|_| format!("{} is not available", program))?;

    info!("{} is available", program);
    Ok(())
}

//! Notification dispatcher: one QR-bearing message per attendee.
//!
//! Attendees are processed strictly one after another with a fixed pause in
//! between. A failed attendee is logged and counted; the batch always runs
//! to the end of the list.

use crate::errors::AppResult;
use crate::messaging::{MessagingProvider, OutgoingMessage};
use crate::models::attendee::Attendee;
use crate::qr;
use chrono::{DateTime, Local};
use std::thread;
use std::time::Duration;

/// Pause between two attendees.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchProgress {
    pub total: usize,
    pub current: usize,
    pub success: usize,
    pub fail: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct DispatchLogEntry {
    pub at: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub progress: DispatchProgress,
    pub log: Vec<DispatchLogEntry>,
}

impl DispatchReport {
    fn push(&mut self, level: LogLevel, message: String) -> &DispatchLogEntry {
        self.log.push(DispatchLogEntry {
            at: Local::now(),
            level,
            message,
        });
        &self.log[self.log.len() - 1]
    }
}

pub struct Dispatcher<'p, P: MessagingProvider> {
    provider: &'p P,
    sender: String,
    template: String,
    delay: Duration,
}

impl<'p, P: MessagingProvider> Dispatcher<'p, P> {
    pub fn new(provider: &'p P, sender: &str, template: &str) -> Self {
        Self {
            provider,
            sender: sender.to_string(),
            template: template.to_string(),
            delay: DEFAULT_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Render, upload and send for one attendee. The error says which step failed.
    fn deliver(
        &self,
        attendee: &Attendee,
        report: &mut DispatchReport,
        on_log: &mut impl FnMut(&DispatchProgress, &DispatchLogEntry),
    ) -> AppResult<()> {
        let image = qr::render_base64(attendee)?;

        // no image, no message: the send step is skipped
        let image_id = self.provider.upload_image(&image)?;

        let progress = report.progress;
        let entry = report.push(
            LogLevel::Success,
            format!("{}: QR image uploaded", attendee.name),
        );
        on_log(&progress, entry);

        let message = OutgoingMessage {
            to: attendee.phone.clone(),
            from: self.sender.clone(),
            text: self.template.clone(),
            image_id: Some(image_id),
        };
        self.provider.send(&message)
    }

    /// Process every attendee. `on_log` fires for every log entry with the
    /// counters as they stand after it.
    pub fn run<F>(&self, attendees: &[Attendee], mut on_log: F) -> DispatchReport
    where
        F: FnMut(&DispatchProgress, &DispatchLogEntry),
    {
        let mut report = DispatchReport {
            progress: DispatchProgress {
                total: attendees.len(),
                ..DispatchProgress::default()
            },
            log: Vec::new(),
        };

        for (i, attendee) in attendees.iter().enumerate() {
            let result = self.deliver(attendee, &mut report, &mut on_log);

            report.progress.current = i + 1;
            let (level, message) = match result {
                Ok(()) => {
                    report.progress.success += 1;
                    (
                        LogLevel::Success,
                        format!("{} ({}): sent", attendee.name, attendee.phone),
                    )
                }
                Err(e) => {
                    report.progress.fail += 1;
                    (LogLevel::Error, format!("{}: failed - {}", attendee.name, e))
                }
            };

            let progress = report.progress;
            let entry = report.push(level, message);
            on_log(&progress, entry);

            if i + 1 < attendees.len() && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }

        report
    }
}

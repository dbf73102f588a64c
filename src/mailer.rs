//! Outgoing mail for one-time codes and account notifications.
//!
//! Delivery through an email provider is left to implementors of [Mailer].
//! The server uses [LogMailer], which writes each message to the log.

use std::fmt::Debug;

use crate::Error;

/// A message addressed to a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct Mail {
    /// The recipient's email address.
    pub to: String,
    /// The subject line.
    pub subject: String,
    /// The plain text body.
    pub body: String,
}

/// Something that can deliver a [Mail].
pub trait Mailer: Debug + Send + Sync {
    /// Deliver `mail` to its recipient.
    ///
    /// # Errors
    /// Returns an [Error::MailError] if the message could not be delivered.
    fn send(&self, mail: Mail) -> Result<(), Error>;
}

/// A [Mailer] that writes messages to the tracing log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, mail: Mail) -> Result<(), Error> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "{}", mail.body);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use recording::RecordingMailer;

#[cfg(test)]
mod recording {
    use std::sync::Mutex;

    use crate::{Error, Mail, Mailer};

    /// Keeps sent mail in memory so tests can inspect it.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingMailer {
        sent: Mutex<Vec<Mail>>,
    }

    impl RecordingMailer {
        pub(crate) fn sent(&self) -> Vec<Mail> {
            self.sent.lock().unwrap().clone()
        }

        pub(crate) fn last_to(&self, to: &str) -> Option<Mail> {
            self.sent().into_iter().rev().find(|mail| mail.to == to)
        }
    }

    impl Mailer for RecordingMailer {
        fn send(&self, mail: Mail) -> Result<(), Error> {
            self.sent
                .lock()
                .map_err(|error| Error::MailError(error.to_string()))?
                .push(mail);
            Ok(())
        }
    }
}

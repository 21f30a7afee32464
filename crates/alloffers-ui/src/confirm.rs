use crate::config::Locale;

/// Host capable of asking the user a yes/no question.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Ask before deleting; without a message the localized default is used.
pub fn confirm_delete(host: &impl Confirm, message: Option<&str>, locale: Locale) -> bool {
    let text = match message {
        Some(message) if !message.is_empty() => message,
        _ => locale.strings().confirm_delete,
    };
    host.confirm(text)
}

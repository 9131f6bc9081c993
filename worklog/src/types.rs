use std::fmt::{self, Formatter};

/// The set of email addresses to report on, in configuration order.
///
/// Parsed once at startup from the comma-delimited `tracking.emails` value;
/// used both to seed zero-totals and to filter which aggregate entries are
/// surfaced downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedUsers(Vec<String>);

impl ObservedUsers {
    #[must_use]
    pub fn from_comma_separated(input: &str) -> Self {
        let mut emails: Vec<String> = Vec::new();
        for part in input.split(',') {
            let email = part.trim();
            if !email.is_empty() && !emails.iter().any(|e| e == email) {
                emails.push(email.to_string());
            }
        }
        ObservedUsers(emails)
    }

    #[must_use]
    pub fn contains(&self, email: &str) -> bool {
        self.0.iter().any(|e| e == email)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ObservedUsers {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

/// Seconds logged by one observed user within the current window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserHours {
    pub email: String,
    pub seconds: i64,
}

impl UserHours {
    /// Logged time in hours, for two-decimal presentation
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(&self) -> f64 {
        self.seconds as f64 / 3600.0
    }
}

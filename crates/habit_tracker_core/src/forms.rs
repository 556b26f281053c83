//! crates/habit_tracker_core/src/forms.rs
//!
//! Typed request models for every mutating operation. Each form is validated
//! in full before the store is touched, and all failures are reported together.

use chrono::NaiveDate;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// The batched messages produced by a failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .0.join(" "))]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    fn single(message: &str) -> Self {
        Self(vec![message.to_string()])
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

//=========================================================================================
// Auth
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirmation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub username: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<ValidRegistration, ValidationErrors> {
        let mut errors = Vec::new();
        let username = present(&self.username);
        let password = self.password.as_deref().unwrap_or_default();

        if username.is_none() {
            errors.push("Username is required.".to_string());
        }
        if password.is_empty() {
            errors.push("Password is required.".to_string());
        }
        if Some(password) != self.confirmation.as_deref() {
            errors.push("Passwords do not match.".to_string());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(format!(
                "Passwords need to be at least {MIN_PASSWORD_LEN} characters long."
            ));
        }

        match username {
            Some(username) if errors.is_empty() => Ok(ValidRegistration {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Err(ValidationErrors(errors)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginForm {
    /// Returns `(username, password)` when both are non-blank.
    pub fn validate(&self) -> Result<(&str, &str), ValidationErrors> {
        match (present(&self.username), present(&self.password)) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(ValidationErrors::single("Both fields are required.")),
        }
    }
}

//=========================================================================================
// Habits
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct HabitForm {
    pub habit_name: Option<String>,
}

impl HabitForm {
    pub fn validate(&self) -> Result<&str, ValidationErrors> {
        present(&self.habit_name).ok_or_else(|| ValidationErrors::single("Habit is required."))
    }
}

//=========================================================================================
// Entries
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct EntryForm {
    pub habit_name: Option<String>,
    pub duration: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidEntry {
    pub habit_name: String,
    pub duration: f64,
    pub date: NaiveDate,
}

impl EntryForm {
    pub fn validate(&self) -> Result<ValidEntry, ValidationErrors> {
        let (Some(habit_name), Some(duration), Some(timestamp)) = (
            present(&self.habit_name),
            present(&self.duration),
            present(&self.timestamp),
        ) else {
            return Err(ValidationErrors::single("All fields are required."));
        };

        let mut errors = Vec::new();
        let date = parse_date(timestamp);
        if date.is_none() {
            errors.push("Date must be in YYYY-MM-DD format.".to_string());
        }
        let duration = match duration.trim().parse::<f64>() {
            Ok(value) if !value.is_finite() => {
                errors.push("Duration must be a valid number.".to_string());
                None
            }
            Ok(value) if value < 0.0 => {
                errors.push("Duration must be a positive number.".to_string());
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                errors.push("Duration must be a valid number.".to_string());
                None
            }
        };

        match (date, duration) {
            (Some(date), Some(duration)) => Ok(ValidEntry {
                habit_name: habit_name.to_string(),
                duration,
                date,
            }),
            _ => Err(ValidationErrors(errors)),
        }
    }
}

/// Parses a calendar date, discarding any time of day that follows it.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    let (date_part, time_part) = raw.split_once(|c: char| c == 'T' || c == ' ')?;
    let time_ok = ["%H:%M", "%H:%M:%S"]
        .iter()
        .any(|fmt| chrono::NaiveTime::parse_from_str(time_part.trim(), fmt).is_ok());
    if !time_ok {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    fn register(username: &str, password: &str, confirmation: &str) -> RegisterForm {
        RegisterForm {
            username: s(username),
            password: s(password),
            confirmation: s(confirmation),
        }
    }

    fn entry(duration: &str, timestamp: &str) -> EntryForm {
        EntryForm {
            habit_name: s("Running"),
            duration: s(duration),
            timestamp: s(timestamp),
        }
    }

    #[test]
    fn register_accepts_matching_long_password() {
        let valid = register("alice", "password1", "password1").validate().unwrap();
        assert_eq!(valid.username, "alice");
        assert_eq!(valid.password, "password1");
    }

    #[test]
    fn register_collects_every_failure() {
        let errors = RegisterForm::default().validate().unwrap_err();
        assert_eq!(
            errors.0,
            vec![
                "Username is required.",
                "Password is required.",
                "Passwords do not match.",
                "Passwords need to be at least 8 characters long.",
            ]
        );
    }

    #[test]
    fn register_rejects_short_and_mismatched_passwords() {
        let errors = register("alice", "short", "other").validate().unwrap_err();
        assert_eq!(
            errors.0,
            vec![
                "Passwords do not match.",
                "Passwords need to be at least 8 characters long.",
            ]
        );
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        assert!(register("bob", "ééééééé", "ééééééé").validate().is_err());
        assert!(register("bob", "éééééééé", "éééééééé").validate().is_ok());
    }

    #[test]
    fn login_requires_both_fields() {
        let form = LoginForm {
            username: s("alice"),
            password: s(""),
        };
        assert_eq!(
            form.validate().unwrap_err().0,
            vec!["Both fields are required."]
        );
    }

    #[test]
    fn habit_name_must_not_be_blank() {
        assert!(HabitForm::default().validate().is_err());
        let form = HabitForm {
            habit_name: s("Running"),
        };
        assert_eq!(form.validate().unwrap(), "Running");
    }

    #[test]
    fn entry_requires_all_fields() {
        let form = EntryForm {
            habit_name: s("Running"),
            duration: None,
            timestamp: s("2024-01-01"),
        };
        assert_eq!(form.validate().unwrap_err().0, vec!["All fields are required."]);
    }

    #[test]
    fn zero_duration_is_accepted_and_negative_rejected() {
        assert_eq!(entry("0", "2024-01-01").validate().unwrap().duration, 0.0);
        assert_eq!(
            entry("-1", "2024-01-01").validate().unwrap_err().0,
            vec!["Duration must be a positive number."]
        );
    }

    #[test]
    fn entry_reports_date_and_duration_together() {
        let errors = entry("abc", "01/02/2024").validate().unwrap_err();
        assert_eq!(
            errors.0,
            vec![
                "Date must be in YYYY-MM-DD format.",
                "Duration must be a valid number.",
            ]
        );
    }

    #[test]
    fn non_finite_durations_are_rejected() {
        assert!(entry("NaN", "2024-01-01").validate().is_err());
        assert!(entry("inf", "2024-01-01").validate().is_err());
    }

    #[test]
    fn parse_date_drops_time_of_day() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(parse_date("2024-01-01"), expected);
        assert_eq!(parse_date("2024-01-01T08:30"), expected);
        assert_eq!(parse_date("2024-01-01 21:15:07"), expected);
        assert_eq!(parse_date("2024-01-01Tlate"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }
}

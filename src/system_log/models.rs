use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "log_ceverity", rename_all = "lowercase")]
pub enum LogCeverity {
    Critical,
    Warning,
    Info,
}

impl fmt::Display for LogCeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogCeverity::Critical => write!(f, "critical"),
            LogCeverity::Warning => write!(f, "warning"),
            LogCeverity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "log_action", rename_all = "lowercase")]
pub enum LogAction {
    Create,
    Read,
    Update,
    Other,
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogAction::Create => write!(f, "create"),
            LogAction::Read => write!(f, "read"),
            LogAction::Update => write!(f, "update"),
            LogAction::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "subject_type", rename_all = "snake_case")]
pub enum SubjectType {
    RegisteredUser,
    System,
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectType::RegisteredUser => write!(f, "registered_user"),
            SubjectType::System => write!(f, "system"),
        }
    }
}

use sqlx::{Pool, Postgres};
use tracing::error;

use crate::{
    auth::models::SubjectId,
    common::server_error::ServerError,
    system_log::{
        db,
        models::{LogAction, LogCeverity, SubjectType},
    },
};

const MAX_DESCRIPTION_LEN: usize = 512;

pub struct SystemLogBuilder {
    pool: Pool<Postgres>,
    subject_id: Option<String>,
    subject_type: Option<SubjectType>,
    action: Option<LogAction>,
    ceverity: Option<LogCeverity>,
    function: Option<String>,
    description: Option<String>,
    metadata: Option<serde_json::Value>,
}

impl SystemLogBuilder {
    pub fn new(pool: &Pool<Postgres>) -> Self {
        Self {
            pool: pool.clone(),
            subject_id: None,
            subject_type: None,
            action: None,
            ceverity: None,
            function: None,
            description: None,
            metadata: None,
        }
    }

    pub fn subject(mut self, subject: SubjectId) -> Self {
        let (id, subject_type) = match subject {
            SubjectId::Registered(id) => (id.to_string(), SubjectType::RegisteredUser),
            SubjectId::System => ("system".to_string(), SubjectType::System),
        };
        self.subject_id = Some(id);
        self.subject_type = Some(subject_type);
        self
    }

    pub fn action(mut self, action: LogAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn ceverity(mut self, ceverity: LogCeverity) -> Self {
        self.ceverity = Some(ceverity);
        self
    }

    pub fn function(mut self, function: &str) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub async fn log(self) -> Result<(), ServerError> {
        let subject_id = self.subject_id.unwrap_or_else(|| "system".into());
        let subject_type = self.subject_type.unwrap_or(SubjectType::System);
        let description = truncate_description(
            self.description
                .unwrap_or_else(|| "No description".to_string()),
        );

        let action = self.action.unwrap_or(LogAction::Other);
        let ceverity = self.ceverity.unwrap_or(LogCeverity::Info);
        let function = self.function.unwrap_or_else(|| "Not specified".into());

        db::create_system_log(
            &self.pool,
            &subject_id,
            subject_type,
            action,
            ceverity,
            &function,
            &description,
            &self.metadata,
        )
        .await?;
        Ok(())
    }

    pub fn log_async(self) {
        tokio::spawn(async move {
            if let Err(e) = self.log().await {
                error!("Failed to system log async: {}", e);
            }
        });
    }
}

/// Keeps the description inside the VARCHAR(512) column, cutting on a char boundary.
fn truncate_description(description: String) -> String {
    if description.chars().count() <= MAX_DESCRIPTION_LEN {
        return description;
    }

    let kept: String = description.chars().take(MAX_DESCRIPTION_LEN - 3).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::truncate_description;

    #[test]
    fn short_descriptions_are_untouched() {
        assert_eq!(truncate_description("boom".into()), "boom");
    }

    #[test]
    fn long_descriptions_fit_the_column() {
        let long = "ж".repeat(600);
        let truncated = truncate_description(long);
        assert_eq!(truncated.chars().count(), 512);
        assert!(truncated.ends_with("..."));
    }
}

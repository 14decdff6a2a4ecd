//! Business logic services

pub mod assets;
pub mod assignments;
pub mod audit;
pub mod auth;
pub mod invalidation;
pub mod reports;

pub use audit::AuditService;
pub use invalidation::InvalidationService;

use crate::{
    config::AuthConfig, error::AppError, models::asset::BulkItemError, repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub assets: assets::AssetsService,
    pub assignments: assignments::AssignmentsService,
    pub audit: AuditService,
    pub reports: reports::ReportsService,
    pub invalidation: InvalidationService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        invalidation: InvalidationService,
    ) -> Self {
        let audit = AuditService::new(repository.clone());
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            assets: assets::AssetsService::new(
                repository.clone(),
                audit.clone(),
                invalidation.clone(),
            ),
            assignments: assignments::AssignmentsService::new(
                repository.clone(),
                audit.clone(),
                invalidation.clone(),
            ),
            reports: reports::ReportsService::new(repository),
            audit,
            invalidation,
        }
    }
}

/// Fold per-item bulk outcomes into a success count and the recorded
/// failures, preserving input order. Failures never stop the fold; that is
/// the whole contract of the bulk runners.
pub(crate) fn tally_bulk<I>(outcomes: I) -> (usize, Vec<BulkItemError>)
where
    I: IntoIterator<Item = (i32, Result<(), AppError>)>,
{
    let mut successful = 0;
    let mut errors = Vec::new();
    for (id, outcome) in outcomes {
        match outcome {
            Ok(()) => successful += 1,
            Err(e) => errors.push(BulkItemError {
                id,
                error: e.to_string(),
            }),
        }
    }
    (successful, errors)
}

/// Map validator derive errors to a structured validation error carrying
/// the first offending field name.
pub(crate) fn map_validation(errors: validator::ValidationErrors) -> AppError {
    let field_errors = errors.field_errors();
    let (field, message) = field_errors
        .iter()
        .next()
        .map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for {}", field));
            (field.to_string(), message)
        })
        .unwrap_or_else(|| ("input".to_string(), "Invalid input".to_string()));
    AppError::Validation {
        field: Some(field),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_tally_continues_past_failures() {
        let outcomes = vec![
            (1, Ok(())),
            (
                2,
                Err(AppError::Conflict {
                    field: None,
                    message: "Asset has an active assignment and must be returned first"
                        .to_string(),
                }),
            ),
            (3, Ok(())),
            (4, Err(AppError::BusinessRule("Assignment is not active".to_string()))),
        ];
        let (successful, errors) = tally_bulk(outcomes);
        assert_eq!(successful, 2);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].id, 2);
        assert_eq!(errors[1].id, 4);
        assert!(errors[1].error.contains("not active"));
    }

    #[test]
    fn bulk_tally_of_all_successes_records_no_errors() {
        let outcomes: Vec<(i32, Result<(), AppError>)> =
            (1..=5).map(|id| (id, Ok(()))).collect();
        let (successful, errors) = tally_bulk(outcomes);
        assert_eq!(successful, 5);
        assert!(errors.is_empty());
    }
}

//! Reporting service: read-only aggregation and CSV projection

use crate::{
    api::reports::{AssetStats, AssignmentStats, StatEntry, StatsResponse},
    error::AppResult,
    models::{asset::Asset, assignment::AssignmentDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Inventory statistics for the dashboard
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let by_status = self
            .repository
            .assets
            .count_by_status()
            .await?
            .into_iter()
            .map(|(label, value)| StatEntry { label, value })
            .collect::<Vec<_>>();
        let by_category = self
            .repository
            .assets
            .count_by_category()
            .await?
            .into_iter()
            .map(|(label, value)| StatEntry { label, value })
            .collect::<Vec<_>>();

        let total = by_status.iter().map(|e| e.value).sum();
        let total_value = self.repository.assets.total_current_value().await?;
        let active = self.repository.assignments.count_active().await?;
        let overdue = self.repository.assignments.count_overdue().await?;

        Ok(StatsResponse {
            assets: AssetStats {
                total,
                by_status,
                by_category,
                total_value,
            },
            assignments: AssignmentStats { active, overdue },
        })
    }

    /// Non-deleted assets as CSV
    pub async fn export_assets_csv(&self) -> AppResult<String> {
        let assets = self.repository.assets.list_all_live().await?;
        Ok(assets_csv(&assets))
    }

    /// All assignments as CSV
    pub async fn export_assignments_csv(&self) -> AppResult<String> {
        let assignments = self.repository.assignments.list_all().await?;
        Ok(assignments_csv(&assignments))
    }
}

/// Quote a CSV field when it contains a delimiter, quote or newline
pub fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Join escaped fields into one CSV line
pub fn csv_line(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| csv_escape(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn assets_csv(assets: &[Asset]) -> String {
    let mut out = String::from(
        "tag,name,category,status,condition,serial_number,model,manufacturer,building,room,current_value\n",
    );
    for a in assets {
        out.push_str(&csv_line(&[
            a.tag.clone(),
            a.name.clone(),
            a.category.to_string(),
            a.status.to_string(),
            a.condition.to_string(),
            opt(&a.serial_number),
            opt(&a.model),
            opt(&a.manufacturer),
            opt(&a.building),
            opt(&a.room),
            a.current_value.map(|v| v.to_string()).unwrap_or_default(),
        ]));
        out.push('\n');
    }
    out
}

fn assignments_csv(assignments: &[AssignmentDetails]) -> String {
    let mut out = String::from(
        "asset_tag,asset_name,user_name,user_email,status,assigned_at,expected_return_at,returned_at,overdue\n",
    );
    for d in assignments {
        let a = &d.assignment;
        out.push_str(&csv_line(&[
            d.asset_tag.clone(),
            d.asset_name.clone(),
            d.user_name.clone(),
            d.user_email.clone(),
            a.status.to_string(),
            a.assigned_at.to_rfc3339(),
            a.expected_return_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            a.returned_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            d.is_overdue.to_string(),
        ]));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(csv_escape("IT-LT-0001"), "IT-LT-0001");
    }

    #[test]
    fn delimiters_and_quotes_are_escaped() {
        assert_eq!(csv_escape("Dell, Inc."), "\"Dell, Inc.\"");
        assert_eq!(csv_escape("24\" monitor"), "\"24\"\" monitor\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn line_joins_escaped_fields() {
        let line = csv_line(&[
            "IT-MN-0002".to_string(),
            "24\" monitor, silver".to_string(),
        ]);
        assert_eq!(line, "IT-MN-0002,\"24\"\" monitor, silver\"");
    }
}

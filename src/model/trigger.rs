use serde::{Deserialize, Serialize};

use super::nullable;
use crate::client::Collection;

/// A package referenced by a deployment step, identified by the step slug.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentActionSlugPackage {
    #[serde(default)]
    pub deployment_action_slug: String,
    #[serde(default)]
    pub package_reference: String,
}

/// What causes a trigger to fire, keyed by `FilterType`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "FilterType")]
pub enum TriggerFilter {
    #[serde(rename = "MachineFilter", rename_all = "PascalCase")]
    Machine {
        #[serde(default, deserialize_with = "nullable")]
        environment_ids: Vec<String>,
        #[serde(default, deserialize_with = "nullable")]
        roles: Vec<String>,
        #[serde(default, deserialize_with = "nullable")]
        event_groups: Vec<String>,
        #[serde(default, deserialize_with = "nullable")]
        event_categories: Vec<String>,
    },
    #[serde(rename = "FeedFilter", rename_all = "PascalCase")]
    Feed {
        #[serde(default, deserialize_with = "nullable")]
        packages: Vec<DeploymentActionSlugPackage>,
    },
    #[serde(rename = "OnceDailySchedule", rename_all = "PascalCase")]
    OnceDaily {
        #[serde(default)]
        timezone: Option<String>,
        #[serde(default)]
        start_time: Option<String>,
        #[serde(default, deserialize_with = "nullable")]
        days_of_week: Vec<String>,
    },
    #[serde(rename = "ContinuousDailySchedule", rename_all = "PascalCase")]
    ContinuousDaily {
        #[serde(default)]
        timezone: Option<String>,
        #[serde(default)]
        interval: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hour_interval: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minute_interval: Option<i64>,
        #[serde(default)]
        run_after: Option<String>,
        #[serde(default)]
        run_until: Option<String>,
        #[serde(default, deserialize_with = "nullable")]
        days_of_week: Vec<String>,
    },
    #[serde(rename = "DaysPerMonthSchedule", rename_all = "PascalCase")]
    DaysPerMonth {
        #[serde(default)]
        timezone: Option<String>,
        #[serde(default)]
        start_time: Option<String>,
        #[serde(default)]
        monthly_schedule_type: Option<String>,
        #[serde(default)]
        date_of_month: Option<String>,
        #[serde(default)]
        day_number_of_month: Option<String>,
        #[serde(default)]
        day_of_week: Option<String>,
    },
    #[serde(rename = "CronExpressionSchedule", rename_all = "PascalCase")]
    CronExpression {
        #[serde(default)]
        timezone: Option<String>,
        #[serde(default)]
        cron_expression: String,
    },
    /// Git, built-in feed and other filters this provider does not manage.
    #[serde(other)]
    Unsupported,
}

impl TriggerFilter {
    pub fn filter_type(&self) -> &'static str {
        match self {
            TriggerFilter::Machine { .. } => "MachineFilter",
            TriggerFilter::Feed { .. } => "FeedFilter",
            TriggerFilter::OnceDaily { .. } => "OnceDailySchedule",
            TriggerFilter::ContinuousDaily { .. } => "ContinuousDailySchedule",
            TriggerFilter::DaysPerMonth { .. } => "DaysPerMonthSchedule",
            TriggerFilter::CronExpression { .. } => "CronExpressionSchedule",
            TriggerFilter::Unsupported => "an unsupported filter",
        }
    }

    /// The time zone of a schedule filter.
    pub fn timezone(&self) -> Option<&str> {
        match self {
            TriggerFilter::OnceDaily { timezone, .. }
            | TriggerFilter::ContinuousDaily { timezone, .. }
            | TriggerFilter::DaysPerMonth { timezone, .. }
            | TriggerFilter::CronExpression { timezone, .. } => timezone.as_deref(),
            _ => None,
        }
    }
}

/// The branch or commit a release of a version controlled project is created from.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct VersionControlReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
}

/// What a trigger does when it fires, keyed by `ActionType`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "ActionType")]
pub enum TriggerAction {
    #[serde(rename_all = "PascalCase")]
    AutoDeploy {
        #[serde(default)]
        should_redeploy_when_machine_has_been_deployed_to: bool,
    },
    #[serde(rename_all = "PascalCase")]
    CreateRelease {
        #[serde(default)]
        channel_id: Option<String>,
    },
    #[serde(rename_all = "PascalCase")]
    DeployLatestRelease {
        #[serde(default, deserialize_with = "nullable")]
        source_environment_ids: Vec<String>,
        #[serde(default)]
        destination_environment_id: String,
        #[serde(default)]
        should_redeploy: bool,
        #[serde(default)]
        channel_id: Option<String>,
        #[serde(default, deserialize_with = "nullable")]
        tenant_ids: Vec<String>,
    },
    #[serde(rename_all = "PascalCase")]
    DeployNewRelease {
        #[serde(default)]
        environment_id: String,
        #[serde(default)]
        channel_id: Option<String>,
        #[serde(default, deserialize_with = "nullable")]
        tenant_ids: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version_control_reference: Option<VersionControlReference>,
    },
    #[serde(rename_all = "PascalCase")]
    RunRunbook {
        #[serde(default)]
        runbook_id: String,
        #[serde(default, deserialize_with = "nullable")]
        environment_ids: Vec<String>,
        #[serde(default, deserialize_with = "nullable")]
        tenant_ids: Vec<String>,
    },
    #[serde(other)]
    Unsupported,
}

impl TriggerAction {
    pub fn action_type(&self) -> &'static str {
        match self {
            TriggerAction::AutoDeploy { .. } => "AutoDeploy",
            TriggerAction::CreateRelease { .. } => "CreateRelease",
            TriggerAction::DeployLatestRelease { .. } => "DeployLatestRelease",
            TriggerAction::DeployNewRelease { .. } => "DeployNewRelease",
            TriggerAction::RunRunbook { .. } => "RunRunbook",
            TriggerAction::Unsupported => "an unsupported action",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectTrigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    pub filter: TriggerFilter,
    pub action: TriggerAction,
}

impl Collection for ProjectTrigger {
    const PATH: &'static str = "projecttriggers";
}

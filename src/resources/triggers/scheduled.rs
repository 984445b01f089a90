//! Scheduled project triggers. One action block says what runs and one schedule block says
//! when. Schedule times are local date-times without an offset; the server's `timezone`
//! places them.
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::{NestedBlock, Schema}, value::Value};

use super::{unexpected, TriggerFields};
use crate::client::Client;
use crate::framework::value::{self, TfBool, TfInt, TfString, TfStrings};
use crate::framework::{replace_if_changed, schema, Error, ManagedResource, Validation};
use crate::model::trigger::{ProjectTrigger, TriggerAction, TriggerFilter, VersionControlReference};

pub const SCHEDULE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub const WEEKDAYS: [&str; 7] = ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];

pub const DAILY_INTERVALS: [&str; 3] = ["OnceDaily", "OnceHourly", "OnceEveryMinute"];

pub const MONTHLY_SCHEDULE_TYPES: [&str; 2] = ["DateOfMonth", "DayOfMonth"];

const DEFAULT_TIMEZONE: &str = "UTC";

const DEFAULT_DAY_OF_WEEK: &str = "Sunday";

const ACTIONS: [&str; 3] = ["deploy_latest_release_action", "deploy_new_release_action", "run_runbook_action"];

const SCHEDULES: [&str; 4] = [
    "once_daily_schedule",
    "continuous_daily_schedule",
    "days_per_month_schedule",
    "cron_expression_schedule",
];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DeployLatestReleaseActionState {
    pub source_environment_id: TfString,
    pub destination_environment_id: TfString,
    pub should_redeploy: TfBool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DeployNewReleaseActionState {
    pub destination_environment_id: TfString,
    pub git_reference: TfString,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RunRunbookActionState {
    pub runbook_id: TfString,
    pub target_environment_ids: TfStrings,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OnceDailyScheduleState {
    pub start_time: TfString,
    pub days_of_week: TfStrings,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ContinuousDailyScheduleState {
    pub interval: TfString,
    pub hour_interval: TfInt,
    pub minute_interval: TfInt,
    pub run_after: TfString,
    pub run_until: TfString,
    pub days_of_week: TfStrings,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DaysPerMonthScheduleState {
    pub start_time: TfString,
    pub monthly_schedule_type: TfString,
    pub date_of_month: TfString,
    pub day_number_of_month: TfString,
    pub day_of_week: TfString,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CronExpressionScheduleState {
    pub cron_expression: TfString,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ScheduledTriggerState {
    #[serde(flatten)]
    pub trigger: TriggerFields,
    pub description: TfString,
    pub channel_id: TfString,
    pub tenant_ids: TfStrings,
    pub timezone: TfString,
    #[serde(with = "tf_provider::value::serde_as_vec")]
    pub deploy_latest_release_action: Value<DeployLatestReleaseActionState>,
    #[serde(with = "tf_provider::value::serde_as_vec")]
    pub deploy_new_release_action: Value<DeployNewReleaseActionState>,
    #[serde(with = "tf_provider::value::serde_as_vec")]
    pub run_runbook_action: Value<RunRunbookActionState>,
    #[serde(with = "tf_provider::value::serde_as_vec")]
    pub once_daily_schedule: Value<OnceDailyScheduleState>,
    #[serde(with = "tf_provider::value::serde_as_vec")]
    pub continuous_daily_schedule: Value<ContinuousDailyScheduleState>,
    #[serde(with = "tf_provider::value::serde_as_vec")]
    pub days_per_month_schedule: Value<DaysPerMonthScheduleState>,
    #[serde(with = "tf_provider::value::serde_as_vec")]
    pub cron_expression_schedule: Value<CronExpressionScheduleState>,
}

/// Parse a schedule time. The server may add fractional seconds or an offset.
fn schedule_time(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|time| time.naive_local()))
}

fn send_time(time: &TfString) -> Option<String> {
    let text = value::opt_string(time)?;
    Some(match schedule_time(&text) {
        Some(parsed) => parsed.format(SCHEDULE_TIME_FORMAT).to_string(),
        None => text,
    })
}

/// Keep the configured text when it names the same instant as the server's.
fn set_time(target: &mut TfString, time: Option<&str>) {
    let Some(time) = time else {
        value::set_optional_string(target, None);
        return;
    };
    let parsed = schedule_time(time);
    if let Value::Value(current) = target {
        if parsed.is_some() && schedule_time(current) == parsed {
            return;
        }
    }
    let text = parsed.map_or_else(|| time.to_string(), |parsed| parsed.format(SCHEDULE_TIME_FORMAT).to_string());
    value::set(target, text);
}

/// The configured block, so unset optional attributes stay unset.
fn existing<T: Clone + Default>(block: &Value<T>) -> T {
    match block {
        Value::Value(block) => block.clone(),
        _ => T::default(),
    }
}

fn expand_action(state: &ScheduledTriggerState) -> TriggerAction {
    let channel_id = value::opt_string(&state.channel_id);
    let tenant_ids = value::strings(&state.tenant_ids);
    if let Value::Value(action) = &state.deploy_latest_release_action {
        return TriggerAction::DeployLatestRelease {
            source_environment_ids: value::opt_string(&action.source_environment_id).into_iter().collect(),
            destination_environment_id: value::string(&action.destination_environment_id),
            should_redeploy: value::boolean(&action.should_redeploy),
            channel_id,
            tenant_ids,
        };
    }
    if let Value::Value(action) = &state.deploy_new_release_action {
        return TriggerAction::DeployNewRelease {
            environment_id: value::string(&action.destination_environment_id),
            channel_id,
            tenant_ids,
            version_control_reference: value::opt_string(&action.git_reference).map(|git_ref| {
                VersionControlReference {
                    git_ref: Some(git_ref),
                    git_commit: None,
                }
            }),
        };
    }
    if let Value::Value(action) = &state.run_runbook_action {
        return TriggerAction::RunRunbook {
            runbook_id: value::string(&action.runbook_id),
            environment_ids: value::strings(&action.target_environment_ids),
            tenant_ids,
        };
    }
    TriggerAction::Unsupported
}

fn expand_filter(state: &ScheduledTriggerState) -> TriggerFilter {
    let timezone = Some(value::opt_string(&state.timezone).unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()));
    if let Value::Value(schedule) = &state.once_daily_schedule {
        return TriggerFilter::OnceDaily {
            timezone,
            start_time: send_time(&schedule.start_time),
            days_of_week: value::strings(&schedule.days_of_week),
        };
    }
    if let Value::Value(schedule) = &state.continuous_daily_schedule {
        let interval = value::opt_string(&schedule.interval);
        let every = |wanted: &str, count: &TfInt| {
            (interval.as_deref() == Some(wanted)).then(|| value::int(count))
        };
        return TriggerFilter::ContinuousDaily {
            timezone,
            hour_interval: every("OnceHourly", &schedule.hour_interval),
            minute_interval: every("OnceEveryMinute", &schedule.minute_interval),
            interval,
            run_after: send_time(&schedule.run_after),
            run_until: send_time(&schedule.run_until),
            days_of_week: value::strings(&schedule.days_of_week),
        };
    }
    if let Value::Value(schedule) = &state.days_per_month_schedule {
        return TriggerFilter::DaysPerMonth {
            timezone,
            start_time: send_time(&schedule.start_time),
            monthly_schedule_type: value::opt_string(&schedule.monthly_schedule_type),
            date_of_month: value::opt_string(&schedule.date_of_month),
            day_number_of_month: value::opt_string(&schedule.day_number_of_month),
            day_of_week: Some(value::opt_string(&schedule.day_of_week).unwrap_or_else(|| DEFAULT_DAY_OF_WEEK.to_string())),
        };
    }
    if let Value::Value(schedule) = &state.cron_expression_schedule {
        return TriggerFilter::CronExpression {
            timezone,
            cron_expression: value::string(&schedule.cron_expression),
        };
    }
    TriggerFilter::Unsupported
}

fn expand(state: &ScheduledTriggerState) -> ProjectTrigger {
    let mut trigger = state.trigger.expand(expand_filter(state), expand_action(state));
    trigger.description = value::opt_string(&state.description);
    trigger
}

fn flatten_action(action: &TriggerAction, state: &mut ScheduledTriggerState) -> Result<(), Error> {
    let (channel_id, tenant_ids) = match action {
        TriggerAction::DeployLatestRelease {
            source_environment_ids,
            destination_environment_id,
            should_redeploy,
            channel_id,
            tenant_ids,
        } => {
            let mut block = existing(&state.deploy_latest_release_action);
            value::set(
                &mut block.source_environment_id,
                source_environment_ids.first().cloned().unwrap_or_default(),
            );
            value::set(&mut block.destination_environment_id, destination_environment_id.clone());
            value::set(&mut block.should_redeploy, *should_redeploy);
            state.deploy_latest_release_action = Value::Value(block);
            state.deploy_new_release_action = Value::Null;
            state.run_runbook_action = Value::Null;
            (channel_id.as_deref(), tenant_ids)
        }
        TriggerAction::DeployNewRelease {
            environment_id,
            channel_id,
            tenant_ids,
            version_control_reference,
        } => {
            let mut block = existing(&state.deploy_new_release_action);
            value::set(&mut block.destination_environment_id, environment_id.clone());
            value::set_optional_string(
                &mut block.git_reference,
                version_control_reference.as_ref().and_then(|reference| reference.git_ref.as_deref()),
            );
            state.deploy_new_release_action = Value::Value(block);
            state.deploy_latest_release_action = Value::Null;
            state.run_runbook_action = Value::Null;
            (channel_id.as_deref(), tenant_ids)
        }
        TriggerAction::RunRunbook {
            runbook_id,
            environment_ids,
            tenant_ids,
        } => {
            let mut block = existing(&state.run_runbook_action);
            value::set(&mut block.runbook_id, runbook_id.clone());
            block.target_environment_ids = value::list_from(environment_ids);
            state.run_runbook_action = Value::Value(block);
            state.deploy_latest_release_action = Value::Null;
            state.deploy_new_release_action = Value::Null;
            (None, tenant_ids)
        }
        other => return Err(unexpected("a scheduled trigger action", other.action_type())),
    };
    value::set_optional_string(&mut state.channel_id, channel_id);
    value::set_optional_list(&mut state.tenant_ids, tenant_ids);
    Ok(())
}

fn flatten_filter(filter: &TriggerFilter, state: &mut ScheduledTriggerState) -> Result<(), Error> {
    let mut once_daily = Value::Null;
    let mut continuous_daily = Value::Null;
    let mut days_per_month = Value::Null;
    let mut cron_expression = Value::Null;
    match filter {
        TriggerFilter::OnceDaily {
            start_time,
            days_of_week,
            ..
        } => {
            let mut block = existing(&state.once_daily_schedule);
            set_time(&mut block.start_time, start_time.as_deref());
            block.days_of_week = value::list_from(days_of_week);
            once_daily = Value::Value(block);
        }
        TriggerFilter::ContinuousDaily {
            interval,
            hour_interval,
            minute_interval,
            run_after,
            run_until,
            days_of_week,
            ..
        } => {
            let mut block = existing(&state.continuous_daily_schedule);
            value::set_string(&mut block.interval, interval.as_deref());
            value::set(&mut block.hour_interval, hour_interval.unwrap_or_default());
            value::set(&mut block.minute_interval, minute_interval.unwrap_or_default());
            set_time(&mut block.run_after, run_after.as_deref());
            set_time(&mut block.run_until, run_until.as_deref());
            block.days_of_week = value::list_from(days_of_week);
            continuous_daily = Value::Value(block);
        }
        TriggerFilter::DaysPerMonth {
            start_time,
            monthly_schedule_type,
            date_of_month,
            day_number_of_month,
            day_of_week,
            ..
        } => {
            let mut block = existing(&state.days_per_month_schedule);
            set_time(&mut block.start_time, start_time.as_deref());
            value::set_string(&mut block.monthly_schedule_type, monthly_schedule_type.as_deref());
            value::set_optional_string(&mut block.date_of_month, date_of_month.as_deref());
            value::set_optional_string(&mut block.day_number_of_month, day_number_of_month.as_deref());
            value::set(
                &mut block.day_of_week,
                day_of_week.clone().unwrap_or_else(|| DEFAULT_DAY_OF_WEEK.to_string()),
            );
            days_per_month = Value::Value(block);
        }
        TriggerFilter::CronExpression {
            cron_expression: expression,
            ..
        } => {
            let mut block = existing(&state.cron_expression_schedule);
            value::set(&mut block.cron_expression, expression.clone());
            cron_expression = Value::Value(block);
        }
        other => return Err(unexpected("a schedule", other.filter_type())),
    }
    state.once_daily_schedule = once_daily;
    state.continuous_daily_schedule = continuous_daily;
    state.days_per_month_schedule = days_per_month;
    state.cron_expression_schedule = cron_expression;
    value::set(
        &mut state.timezone,
        filter.timezone().unwrap_or(DEFAULT_TIMEZONE).to_string(),
    );
    Ok(())
}

fn flatten(trigger: &ProjectTrigger, state: &mut ScheduledTriggerState) -> Result<(), Error> {
    flatten_action(&trigger.action, state)?;
    flatten_filter(&trigger.filter, state)?;
    state.trigger.flatten(trigger);
    value::set_optional_string(&mut state.description, trigger.description.as_deref());
    Ok(())
}

fn environment_attribute(description: &str) -> (&'static str, tf_provider::schema::Attribute) {
    ("destination_environment_id", schema::required(schema::text(), description))
}

fn days_of_week_attribute() -> (&'static str, tf_provider::schema::Attribute) {
    (
        "days_of_week",
        schema::required(schema::text_list(), "The days of the week to run the trigger."),
    )
}

fn single(description: &str, attributes: Vec<(&str, tf_provider::schema::Attribute)>) -> NestedBlock {
    NestedBlock::Optional(schema::block(description, attributes))
}

/// Names of the blocks that are set. `None` while any of them is unknown.
fn configured<'a>(blocks: &[(&'a str, bool, bool)]) -> Option<Vec<&'a str>> {
    if blocks.iter().any(|(_, _, unknown)| *unknown) {
        return None;
    }
    Some(blocks.iter().filter(|(_, set, _)| *set).map(|(name, _, _)| *name).collect())
}

fn presence<T>(name: &'static str, block: &Value<T>) -> (&'static str, bool, bool) {
    (name, matches!(block, Value::Value(_)), matches!(block, Value::Unknown))
}

fn exactly_one(validation: &mut Validation, kind: &str, names: &[&str], set: Option<Vec<&str>>) {
    let Some(set) = set else {
        return;
    };
    if set.len() != 1 {
        validation.error(
            names.first().copied().unwrap_or_default(),
            format!("exactly one {kind} block is required"),
            format!("set one of {}", names.join(", ")),
        );
    }
}

fn validate_time(validation: &mut Validation, attribute: &str, time: &TfString) {
    if let Value::Value(text) = time {
        if schedule_time(text).is_none() {
            validation.error(
                attribute,
                format!("{attribute} is not a date-time"),
                format!("{text:?} does not have the form YYYY-MM-DDTHH:MM:SS"),
            );
        }
    }
}

pub struct ScheduledTriggerResource;

#[async_trait]
impl ManagedResource for ScheduledTriggerResource {
    type State = ScheduledTriggerState;

    const NAME: &'static str = "octopusdeploy_project_scheduled_trigger";

    fn schema() -> Schema {
        schema::schema(schema::with_blocks(
            schema::block(
                "This resource manages a scheduled trigger for a project or runbook in Octopus Deploy.",
                vec![
                    ("id", schema::id()),
                    ("name", schema::name("trigger")),
                    ("description", schema::optional(schema::text(), "A description of the trigger.")),
                    (
                        "project_id",
                        schema::required(schema::text(), "The ID of the project to attach the trigger."),
                    ),
                    (
                        "is_disabled",
                        schema::optional(schema::flag(), "Indicates whether the trigger is disabled."),
                    ),
                    (
                        "channel_id",
                        schema::optional(
                            schema::text(),
                            "The channel ID to use when creating the release. Will use the default channel if left blank.",
                        ),
                    ),
                    (
                        "tenant_ids",
                        schema::optional(schema::text_list(), "The IDs of the tenants to deploy to."),
                    ),
                    (
                        "timezone",
                        schema::optional_computed(schema::text(), "The timezone for the trigger. Defaults to `UTC`."),
                    ),
                    ("space_id", schema::space_id("trigger")),
                ],
            ),
            vec![
                (
                    "deploy_latest_release_action",
                    single(
                        "Deploy the latest release from one environment to another.",
                        vec![
                            (
                                "source_environment_id",
                                schema::required(
                                    schema::text(),
                                    "The environment ID to use when selecting the release to deploy from.",
                                ),
                            ),
                            environment_attribute("The environment ID to deploy the selected release to."),
                            (
                                "should_redeploy",
                                schema::optional_computed(
                                    schema::flag(),
                                    "Enable to re-deploy to the deployment targets even if they are already up-to-date with the current deployment.",
                                ),
                            ),
                        ],
                    ),
                ),
                (
                    "deploy_new_release_action",
                    single(
                        "Create a release and deploy it.",
                        vec![
                            environment_attribute("The environment ID to deploy the new release to."),
                            (
                                "git_reference",
                                schema::optional(
                                    schema::text(),
                                    "The git reference to use when creating the release. Can be a branch, tag, or commit hash.",
                                ),
                            ),
                        ],
                    ),
                ),
                (
                    "run_runbook_action",
                    single(
                        "Run a published runbook.",
                        vec![
                            ("runbook_id", schema::required(schema::text(), "The ID of the runbook to run.")),
                            (
                                "target_environment_ids",
                                schema::required(
                                    schema::text_list(),
                                    "The IDs of the environments to run the runbook in.",
                                ),
                            ),
                        ],
                    ),
                ),
                (
                    "once_daily_schedule",
                    single(
                        "Run once a day on the given days.",
                        vec![
                            (
                                "start_time",
                                schema::required(schema::text(), "The time of day to start the trigger."),
                            ),
                            days_of_week_attribute(),
                        ],
                    ),
                ),
                (
                    "continuous_daily_schedule",
                    single(
                        "Run repeatedly between two times of day.",
                        vec![
                            (
                                "interval",
                                schema::required(
                                    schema::text(),
                                    "How often to run. Valid intervals are `OnceDaily`, `OnceHourly`, or `OnceEveryMinute`.",
                                ),
                            ),
                            (
                                "hour_interval",
                                schema::optional_computed(
                                    schema::number(),
                                    "How often to run the trigger in hours. Only used when the interval is `OnceHourly`.",
                                ),
                            ),
                            (
                                "minute_interval",
                                schema::optional_computed(
                                    schema::number(),
                                    "How often to run the trigger in minutes. Only used when the interval is `OnceEveryMinute`.",
                                ),
                            ),
                            (
                                "run_after",
                                schema::required(schema::text(), "The time of day to start the trigger."),
                            ),
                            (
                                "run_until",
                                schema::required(schema::text(), "The time of day to end the trigger."),
                            ),
                            days_of_week_attribute(),
                        ],
                    ),
                ),
                (
                    "days_per_month_schedule",
                    single(
                        "Run on given days of each month.",
                        vec![
                            (
                                "start_time",
                                schema::required(schema::text(), "The time of day to start the trigger."),
                            ),
                            (
                                "monthly_schedule_type",
                                schema::required(
                                    schema::text(),
                                    "The type of monthly schedule. Valid types are `DateOfMonth` or `DayOfMonth`.",
                                ),
                            ),
                            (
                                "date_of_month",
                                schema::optional(
                                    schema::text(),
                                    "Which date of the month to run the trigger. A number between 1 and 31, or `L` for the last day of the month.",
                                ),
                            ),
                            (
                                "day_number_of_month",
                                schema::optional(
                                    schema::text(),
                                    "Which occurrence of `day_of_week` to run the trigger on. A number between 1 and 4, or `L` for the last one.",
                                ),
                            ),
                            (
                                "day_of_week",
                                schema::optional_computed(
                                    schema::text(),
                                    "Which day of the week to run the trigger on. Defaults to `Sunday`.",
                                ),
                            ),
                        ],
                    ),
                ),
                (
                    "cron_expression_schedule",
                    single(
                        "Run on a cron expression.",
                        vec![(
                            "cron_expression",
                            schema::required(schema::text(), "The cron expression for the schedule."),
                        )],
                    ),
                ),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.trigger.name);
        validation.not_empty("project_id", &config.trigger.project_id);

        let actions = configured(&[
            presence(ACTIONS[0], &config.deploy_latest_release_action),
            presence(ACTIONS[1], &config.deploy_new_release_action),
            presence(ACTIONS[2], &config.run_runbook_action),
        ]);
        exactly_one(validation, "action", &ACTIONS, actions);
        let schedules = configured(&[
            presence(SCHEDULES[0], &config.once_daily_schedule),
            presence(SCHEDULES[1], &config.continuous_daily_schedule),
            presence(SCHEDULES[2], &config.days_per_month_schedule),
            presence(SCHEDULES[3], &config.cron_expression_schedule),
        ]);
        exactly_one(validation, "schedule", &SCHEDULES, schedules);

        if let Value::Value(action) = &config.deploy_latest_release_action {
            validation.within(ACTIONS[0], 0, |validation| {
                validation.not_empty("source_environment_id", &action.source_environment_id);
                validation.not_empty("destination_environment_id", &action.destination_environment_id);
            });
        }
        if let Value::Value(action) = &config.deploy_new_release_action {
            validation.within(ACTIONS[1], 0, |validation| {
                validation.not_empty("destination_environment_id", &action.destination_environment_id);
            });
        }
        if let Value::Value(action) = &config.run_runbook_action {
            validation.within(ACTIONS[2], 0, |validation| {
                validation.not_empty("runbook_id", &action.runbook_id);
            });
            if matches!(&config.channel_id, Value::Value(channel) if !channel.is_empty()) {
                validation.error(
                    "channel_id",
                    "channel_id is not used by run_runbook_action",
                    "runbooks run without creating a release",
                );
            }
        }

        if let Value::Value(schedule) = &config.once_daily_schedule {
            validation.within(SCHEDULES[0], 0, |validation| {
                validate_time(validation, "start_time", &schedule.start_time);
                validation.each_one_of("days_of_week", &schedule.days_of_week, &WEEKDAYS);
            });
        }
        if let Value::Value(schedule) = &config.continuous_daily_schedule {
            validation.within(SCHEDULES[1], 0, |validation| {
                validation.one_of("interval", &schedule.interval, &DAILY_INTERVALS);
                validation.at_least("hour_interval", &schedule.hour_interval, 0);
                validation.at_least("minute_interval", &schedule.minute_interval, 0);
                validate_time(validation, "run_after", &schedule.run_after);
                validate_time(validation, "run_until", &schedule.run_until);
                validation.each_one_of("days_of_week", &schedule.days_of_week, &WEEKDAYS);
            });
        }
        if let Value::Value(schedule) = &config.days_per_month_schedule {
            validation.within(SCHEDULES[2], 0, |validation| {
                validate_time(validation, "start_time", &schedule.start_time);
                validation.one_of("monthly_schedule_type", &schedule.monthly_schedule_type, &MONTHLY_SCHEDULE_TYPES);
                validation.one_of("day_of_week", &schedule.day_of_week, &WEEKDAYS);
            });
        }
        if let Value::Value(schedule) = &config.cron_expression_schedule {
            validation.within(SCHEDULES[3], 0, |validation| {
                validation.not_empty("cron_expression", &schedule.cron_expression);
            });
        }
    }

    fn plan(state: &mut Self::State) {
        state.trigger.plan();
        value::default_if_null(&mut state.timezone, DEFAULT_TIMEZONE.to_string());
        if let Value::Value(action) = &mut state.deploy_latest_release_action {
            value::default_if_null(&mut action.should_redeploy, false);
        }
        if let Value::Value(schedule) = &mut state.continuous_daily_schedule {
            value::default_if_null(&mut schedule.hour_interval, 0);
            value::default_if_null(&mut schedule.minute_interval, 0);
        }
        if let Value::Value(schedule) = &mut state.days_per_month_schedule {
            value::default_if_null(&mut schedule.day_of_week, DEFAULT_DAY_OF_WEEK.to_string());
        }
    }

    fn replace_on_change(prior: &Self::State, proposed: &Self::State) -> Vec<AttributePath> {
        replace_if_changed(&[
            ("space_id", &prior.trigger.space_id, &proposed.trigger.space_id),
            ("project_id", &prior.trigger.project_id, &proposed.trigger.project_id),
        ])
    }

    fn id(state: &Self::State) -> String {
        value::string(&state.trigger.id)
    }

    fn name(state: &Self::State) -> String {
        value::string(&state.trigger.name)
    }

    fn with_id(id: String) -> Self::State {
        ScheduledTriggerState {
            trigger: TriggerFields::with_id(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let space_id = value::opt_string(&planned.trigger.space_id);
        let created = client.add(space_id.as_deref(), &expand(&planned)).await?;
        let mut state = planned;
        flatten(&created, &mut state)?;
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.trigger.space_id);
        let Some(trigger) = client
            .find::<ProjectTrigger>(space_id.as_deref(), &value::string(&state.trigger.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&trigger, &mut state)?;
        Ok(Some(state))
    }

    async fn update(client: &Client, prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let space_id = value::opt_string(&planned.trigger.space_id);
        let id = value::string(&prior.trigger.id);
        let mut trigger = expand(&planned);
        trigger.id = Some(id.clone());
        let updated = client.update(space_id.as_deref(), &id, &trigger).await?;
        let mut state = planned;
        flatten(&updated, &mut state)?;
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let space_id = value::opt_string(&state.trigger.space_id);
        client
            .delete::<ProjectTrigger>(space_id.as_deref(), &value::string(&state.trigger.id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::framework::test::assert_schema_matches_state;

    fn text(value: &str) -> TfString {
        Value::Value(value.into())
    }

    fn trigger_fields() -> TriggerFields {
        TriggerFields {
            id: text("ProjectTriggers-5"),
            name: text("nightly"),
            project_id: text("Projects-1"),
            is_disabled: Value::Value(true),
            space_id: text("Spaces-1"),
        }
    }

    fn nightly_runbook() -> ScheduledTriggerState {
        ScheduledTriggerState {
            trigger: TriggerFields {
                name: text("nightly"),
                project_id: text("Projects-1"),
                ..Default::default()
            },
            run_runbook_action: Value::Value(RunRunbookActionState {
                runbook_id: text("Runbooks-1"),
                target_environment_ids: value::list_from(&["Environments-1"]),
            }),
            once_daily_schedule: Value::Value(OnceDailyScheduleState {
                start_time: text("2024-03-01T09:00:00"),
                days_of_week: value::list_from(&["Monday", "Friday"]),
            }),
            ..Default::default()
        }
    }

    fn round_trip(planned: &ScheduledTriggerState) -> ScheduledTriggerState {
        let mut state = ScheduledTriggerState::default();
        flatten(&expand(planned), &mut state).unwrap();
        state
    }

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<ScheduledTriggerState>(&ScheduledTriggerResource::schema());
    }

    #[test]
    fn exactly_one_action_and_schedule_are_required() {
        let config = ScheduledTriggerState {
            once_daily_schedule: Value::Null,
            cron_expression_schedule: Value::Value(CronExpressionScheduleState {
                cron_expression: text("0 0 * * *"),
            }),
            run_runbook_action: Value::Null,
            ..nightly_runbook()
        };
        let mut validation = Validation::default();
        ScheduledTriggerResource::validate(&config, &mut validation);
        assert_eq!(validation.issues().len(), 1);
        assert_eq!(validation.issues()[0].summary, "exactly one action block is required");

        let config = ScheduledTriggerState {
            cron_expression_schedule: Value::Value(CronExpressionScheduleState {
                cron_expression: text("0 0 * * *"),
            }),
            ..nightly_runbook()
        };
        let mut validation = Validation::default();
        ScheduledTriggerResource::validate(&config, &mut validation);
        assert_eq!(validation.issues().len(), 1);
        assert_eq!(validation.issues()[0].summary, "exactly one schedule block is required");
    }

    #[test]
    fn days_and_times_are_validated() {
        let config = ScheduledTriggerState {
            once_daily_schedule: Value::Value(OnceDailyScheduleState {
                start_time: text("9am"),
                days_of_week: value::list_from(&["Monday", "Funday"]),
            }),
            ..nightly_runbook()
        };
        let mut validation = Validation::default();
        ScheduledTriggerResource::validate(&config, &mut validation);
        assert_eq!(validation.issues().len(), 2);
    }

    #[test]
    fn server_time_formats_keep_the_configured_text() {
        let mut time = text("2024-03-01T09:00:00");
        set_time(&mut time, Some("2024-03-01T09:00:00.0000000"));
        assert_eq!(time, text("2024-03-01T09:00:00"));

        set_time(&mut time, Some("2024-03-01T10:30:00.000Z"));
        assert_eq!(time, text("2024-03-01T10:30:00"));
    }

    #[test]
    fn project_changes_force_replacement() {
        let prior = nightly_runbook();
        let mut proposed = nightly_runbook();
        proposed.trigger.project_id = text("Projects-2");
        let paths = ScheduledTriggerResource::replace_on_change(&prior, &proposed);
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn flatten_restores_a_latest_release_on_a_continuous_schedule() {
        let planned = ScheduledTriggerState {
            trigger: trigger_fields(),
            description: text("Promote every hour"),
            channel_id: text("Channels-2"),
            tenant_ids: value::list_from(&["Tenants-1", "Tenants-2"]),
            timezone: text("Europe/Oslo"),
            deploy_latest_release_action: Value::Value(DeployLatestReleaseActionState {
                source_environment_id: text("Environments-1"),
                destination_environment_id: text("Environments-2"),
                should_redeploy: Value::Value(true),
            }),
            continuous_daily_schedule: Value::Value(ContinuousDailyScheduleState {
                interval: text("OnceHourly"),
                hour_interval: Value::Value(3),
                minute_interval: Value::Value(0),
                run_after: text("2024-03-01T08:00:00"),
                run_until: text("2024-03-01T18:00:00"),
                days_of_week: value::list_from(&["Monday", "Tuesday"]),
            }),
            ..Default::default()
        };
        assert_eq!(round_trip(&planned), planned);
    }

    #[test]
    fn flatten_restores_a_new_release_on_a_monthly_schedule() {
        let planned = ScheduledTriggerState {
            trigger: trigger_fields(),
            description: text("Monthly release"),
            channel_id: text("Channels-1"),
            tenant_ids: value::list_from(&["Tenants-1"]),
            timezone: text("UTC"),
            deploy_new_release_action: Value::Value(DeployNewReleaseActionState {
                destination_environment_id: text("Environments-3"),
                git_reference: text("refs/heads/main"),
            }),
            days_per_month_schedule: Value::Value(DaysPerMonthScheduleState {
                start_time: text("2024-03-01T06:00:00"),
                monthly_schedule_type: text("DayOfMonth"),
                date_of_month: text("1"),
                day_number_of_month: text("L"),
                day_of_week: text("Friday"),
            }),
            ..Default::default()
        };
        assert_eq!(round_trip(&planned), planned);
    }

    #[test]
    fn flatten_restores_a_runbook_on_a_cron_schedule() {
        let planned = ScheduledTriggerState {
            trigger: trigger_fields(),
            description: text("Clean up"),
            tenant_ids: value::list_from(&["Tenants-3"]),
            timezone: text("UTC"),
            run_runbook_action: Value::Value(RunRunbookActionState {
                runbook_id: text("Runbooks-1"),
                target_environment_ids: value::list_from(&["Environments-1", "Environments-2"]),
            }),
            cron_expression_schedule: Value::Value(CronExpressionScheduleState {
                cron_expression: text("0 0 2 * * *"),
            }),
            ..Default::default()
        };
        assert_eq!(round_trip(&planned), planned);
    }

    #[tokio::test]
    async fn create_sends_a_once_daily_runbook_trigger() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/Spaces-1/projecttriggers"))
            .and(body_partial_json(serde_json::json!({
                "Name": "nightly",
                "ProjectId": "Projects-1",
                "Filter": {
                    "FilterType": "OnceDailySchedule",
                    "Timezone": "UTC",
                    "StartTime": "2024-03-01T09:00:00",
                    "DaysOfWeek": ["Monday", "Friday"]
                },
                "Action": {
                    "ActionType": "RunRunbook",
                    "RunbookId": "Runbooks-1",
                    "EnvironmentIds": ["Environments-1"]
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "Id": "ProjectTriggers-5",
                "Name": "nightly",
                "ProjectId": "Projects-1",
                "IsDisabled": false,
                "SpaceId": "Spaces-1",
                "Filter": {
                    "FilterType": "OnceDailySchedule",
                    "Timezone": "UTC",
                    "StartTime": "2024-03-01T09:00:00.0000000",
                    "DaysOfWeek": ["Monday", "Friday"]
                },
                "Action": {
                    "ActionType": "RunRunbook",
                    "RunbookId": "Runbooks-1",
                    "EnvironmentIds": ["Environments-1"],
                    "TenantIds": [],
                    "TenantTags": []
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut planned = nightly_runbook();
        ScheduledTriggerResource::plan(&mut planned);

        let client = client_for(&server, Some("Spaces-1"));
        let state = ScheduledTriggerResource::create(&client, planned).await.unwrap();
        assert_eq!(state.trigger.id, text("ProjectTriggers-5"));
        assert_eq!(state.timezone, text("UTC"));
        assert_eq!(state.tenant_ids, Value::Null);
        let Value::Value(schedule) = &state.once_daily_schedule else {
            panic!("expected a once daily schedule");
        };
        assert_eq!(schedule.start_time, text("2024-03-01T09:00:00"));
    }

    #[tokio::test]
    async fn reading_a_feed_trigger_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/projecttriggers/ProjectTriggers-6"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Id": "ProjectTriggers-6",
                "Name": "on new package",
                "ProjectId": "Projects-1",
                "Filter": { "FilterType": "FeedFilter", "Packages": [] },
                "Action": { "ActionType": "CreateRelease", "ChannelId": "Channels-1" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let err = ScheduledTriggerResource::read(&client, ScheduledTriggerResource::with_id("ProjectTriggers-6".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedType { expected: "a scheduled trigger action", .. }));
    }

    #[tokio::test]
    async fn deleted_triggers_read_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/projecttriggers/ProjectTriggers-5"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let state = ScheduledTriggerResource::read(&client, ScheduledTriggerResource::with_id("ProjectTriggers-5".into()))
            .await
            .unwrap();
        assert_eq!(state, None);
    }
}

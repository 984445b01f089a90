//! Project triggers. Every trigger resource lives in the `projecttriggers` collection and
//! is told apart by its filter and action variants.
use serde::{Deserialize, Serialize};

use crate::framework::value::{self, TfBool, TfString};
use crate::framework::Error;
use crate::model::trigger::{ProjectTrigger, TriggerAction, TriggerFilter};

pub mod deployment_action_slug_package;
pub mod deployment_target;
pub mod external_feed;
pub mod scheduled;

/// Attributes every trigger has.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TriggerFields {
    pub id: TfString,
    pub name: TfString,
    pub project_id: TfString,
    pub is_disabled: TfBool,
    pub space_id: TfString,
}

impl TriggerFields {
    fn expand(&self, filter: TriggerFilter, action: TriggerAction) -> ProjectTrigger {
        ProjectTrigger {
            id: value::opt_string(&self.id),
            name: value::string(&self.name),
            description: None,
            project_id: value::string(&self.project_id),
            is_disabled: value::boolean(&self.is_disabled),
            space_id: value::opt_string(&self.space_id),
            filter,
            action,
        }
    }

    fn flatten(&mut self, trigger: &ProjectTrigger) {
        value::set_string(&mut self.id, trigger.id.as_deref());
        value::set(&mut self.name, trigger.name.clone());
        value::set(&mut self.project_id, trigger.project_id.clone());
        value::set_optional(&mut self.is_disabled, trigger.is_disabled);
        value::set_string(&mut self.space_id, trigger.space_id.as_deref());
    }

    fn plan(&mut self) {
        value::unknown_if_null(&mut self.id);
        value::unknown_if_null(&mut self.space_id);
    }

    fn with_id(id: String) -> Self {
        Self {
            id: tf_provider::value::Value::Value(id),
            ..Default::default()
        }
    }
}

fn unexpected(expected: &'static str, found: &'static str) -> Error {
    Error::UnexpectedType {
        expected,
        found: found.to_string(),
    }
}

//! The `package` blocks of a feed trigger: which step package to watch.
use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, Block};

use crate::framework::schema;
use crate::framework::value::{self, TfString};
use crate::model::trigger::DeploymentActionSlugPackage;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DeploymentActionSlugPackageState {
    pub deployment_action_slug: TfString,
    pub package_reference: TfString,
}

pub fn block(description: &str, reference_required: bool) -> Block {
    let package_reference = if reference_required {
        schema::required(schema::text(), "The name of the package reference within the step.")
    } else {
        schema::optional(schema::text(), "The name of the package reference within the step.")
    };
    let attributes: Vec<(&str, Attribute)> = vec![
        (
            "deployment_action_slug",
            schema::required(schema::text(), "The slug of the deployment step that references the package."),
        ),
        ("package_reference", package_reference),
    ];
    schema::block(description, attributes)
}

pub fn expand(state: &DeploymentActionSlugPackageState) -> DeploymentActionSlugPackage {
    DeploymentActionSlugPackage {
        deployment_action_slug: value::string(&state.deployment_action_slug),
        package_reference: value::string(&state.package_reference),
    }
}

pub fn flatten(package: &DeploymentActionSlugPackage) -> DeploymentActionSlugPackageState {
    let mut state = DeploymentActionSlugPackageState::default();
    value::set(&mut state.deployment_action_slug, package.deployment_action_slug.clone());
    value::set(&mut state.package_reference, package.package_reference.clone());
    state
}

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::{NestedBlock, Schema}, value::Value};

use super::space_replacement;
use crate::client::Client;
use crate::framework::value::{self, TfBlocks, TfBool, TfString, TfStrings};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::team::{ExternalSecurityGroup, ScopedUserRole, Team};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExternalSecurityGroupState {
    pub id: TfString,
    pub display_name: TfString,
    pub display_id_and_name: TfBool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserRoleState {
    pub id: TfString,
    pub team_id: TfString,
    pub user_role_id: TfString,
    pub space_id: TfString,
    pub environment_ids: TfStrings,
    pub project_ids: TfStrings,
    pub project_group_ids: TfStrings,
    pub tenant_ids: TfStrings,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TeamState {
    pub id: TfString,
    pub name: TfString,
    pub description: TfString,
    pub users: TfStrings,
    pub external_security_group: TfBlocks<ExternalSecurityGroupState>,
    pub user_role: TfBlocks<UserRoleState>,
    pub can_be_deleted: TfBool,
    pub can_be_renamed: TfBool,
    pub can_change_members: TfBool,
    pub can_change_roles: TfBool,
    pub space_id: TfString,
}

fn expand(state: &TeamState) -> Team {
    Team {
        id: value::opt_string(&state.id),
        name: value::string(&state.name),
        description: value::opt_string(&state.description),
        member_user_ids: value::strings(&state.users),
        external_security_groups: value::blocks(&state.external_security_group)
            .into_iter()
            .map(|group| ExternalSecurityGroup {
                id: value::string(&group.id),
                display_name: value::opt_string(&group.display_name),
                display_id_and_name: value::boolean(&group.display_id_and_name),
            })
            .collect(),
        space_id: value::opt_string(&state.space_id),
        ..Default::default()
    }
}

fn flatten(team: &Team, state: &mut TeamState) {
    value::set_string(&mut state.id, team.id.as_deref());
    value::set(&mut state.name, team.name.clone());
    value::set_optional_string(&mut state.description, team.description.as_deref());
    value::set_optional_list(&mut state.users, &team.member_user_ids);
    state.external_security_group = value::blocks_from(
        team.external_security_groups
            .iter()
            .map(|group| ExternalSecurityGroupState {
                id: Value::Value(group.id.clone()),
                display_name: Value::Value(group.display_name.clone().unwrap_or_default()),
                display_id_and_name: Value::Value(group.display_id_and_name),
            })
            .collect(),
    );
    value::set(&mut state.can_be_deleted, team.can_be_deleted);
    value::set(&mut state.can_be_renamed, team.can_be_renamed);
    value::set(&mut state.can_change_members, team.can_change_members);
    value::set(&mut state.can_change_roles, team.can_change_roles);
    value::set_string(&mut state.space_id, team.space_id.as_deref());
}

fn expand_role(role: &UserRoleState, team_id: &str) -> ScopedUserRole {
    ScopedUserRole {
        id: value::opt_string(&role.id),
        team_id: team_id.to_string(),
        user_role_id: value::string(&role.user_role_id),
        space_id: value::opt_string(&role.space_id),
        environment_ids: value::strings(&role.environment_ids),
        project_ids: value::strings(&role.project_ids),
        project_group_ids: value::strings(&role.project_group_ids),
        tenant_ids: value::strings(&role.tenant_ids),
    }
}

/// Replace the `user_role` blocks with the granted roles. A granted role that matches a
/// configured block keeps that block's unset scope lists unset.
fn flatten_roles(roles: &[ScopedUserRole], state: &mut TeamState) {
    if roles.is_empty() && matches!(state.user_role, Value::Null) {
        return;
    }
    let team_id = value::string(&state.id);
    let configured: Vec<UserRoleState> = value::blocks(&state.user_role).into_iter().cloned().collect();
    state.user_role = value::blocks_from(
        roles
            .iter()
            .map(|role| {
                let mut block = configured
                    .iter()
                    .find(|block| expand_role(block, &team_id).same_grant(role))
                    .cloned()
                    .unwrap_or_default();
                value::set_string(&mut block.id, role.id.as_deref());
                value::set(&mut block.team_id, role.team_id.clone());
                value::set(&mut block.user_role_id, role.user_role_id.clone());
                value::set_string(&mut block.space_id, role.space_id.as_deref());
                value::set_optional_list(&mut block.environment_ids, &role.environment_ids);
                value::set_optional_list(&mut block.project_ids, &role.project_ids);
                value::set_optional_list(&mut block.project_group_ids, &role.project_group_ids);
                value::set_optional_list(&mut block.tenant_ids, &role.tenant_ids);
                block
            })
            .collect(),
    );
}

/// Grant each planned role that is not granted yet and revoke granted roles that are no
/// longer planned. Returns the roles the team holds afterwards.
async fn sync_roles(
    client: &Client,
    team_id: &str,
    granted: Vec<ScopedUserRole>,
    planned: Vec<ScopedUserRole>,
) -> Result<Vec<ScopedUserRole>, Error> {
    let mut kept = Vec::new();
    let mut revoked = Vec::new();
    let mut pending = planned;
    for role in granted {
        match pending.iter().position(|planned| planned.same_grant(&role)) {
            Some(index) => {
                pending.swap_remove(index);
                kept.push(role);
            }
            None => revoked.push(role),
        }
    }

    for role in revoked {
        if let Some(id) = &role.id {
            debug!("revoking {} ({id}) from team {team_id}", role.user_role_id);
            client.delete::<ScopedUserRole>(None, id).await?;
        }
    }
    for mut role in pending {
        debug!("granting {} to team {team_id}", role.user_role_id);
        role.id = None;
        role.team_id = team_id.to_string();
        kept.push(client.add(None, &role).await?);
    }
    Ok(kept)
}

fn planned_roles(state: &TeamState, team_id: &str) -> Vec<ScopedUserRole> {
    value::blocks(&state.user_role)
        .into_iter()
        .map(|role| expand_role(role, team_id))
        .collect()
}

pub struct TeamResource;

#[async_trait]
impl ManagedResource for TeamResource {
    type State = TeamState;

    const NAME: &'static str = "octopusdeploy_team";

    fn schema() -> Schema {
        let external_security_group = schema::block(
            "An external security group whose members belong to this team.",
            vec![
                ("id", schema::required(schema::text(), "The ID of the external security group.")),
                ("display_name", schema::optional_computed(schema::text(), "The display name of the external security group.")),
                (
                    "display_id_and_name",
                    schema::optional_computed(schema::flag(), "Whether both the ID and the name are displayed."),
                ),
            ],
        );

        let user_role = schema::block(
            "A user role granted to this team, optionally scoped.",
            vec![
                ("id", schema::id()),
                ("team_id", schema::computed(schema::text(), "The team the role is granted to.")),
                ("user_role_id", schema::required(schema::text(), "The ID of the user role.")),
                ("space_id", schema::required(schema::text(), "The space the role applies in.")),
                (
                    "environment_ids",
                    schema::optional(schema::text_set(), "Environments the role is limited to."),
                ),
                ("project_ids", schema::optional(schema::text_set(), "Projects the role is limited to.")),
                (
                    "project_group_ids",
                    schema::optional(schema::text_set(), "Project groups the role is limited to."),
                ),
                ("tenant_ids", schema::optional(schema::text_set(), "Tenants the role is limited to.")),
            ],
        );

        schema::schema(schema::with_blocks(
            schema::block(
                "This resource manages teams in Octopus Deploy.",
                vec![
                    ("id", schema::id()),
                    ("name", schema::name("team")),
                    ("description", schema::description("team")),
                    ("users", schema::optional(schema::text_set(), "A list of user IDs designated to be members of this team.")),
                    ("can_be_deleted", schema::computed(schema::flag(), "Whether the team can be deleted.")),
                    ("can_be_renamed", schema::computed(schema::flag(), "Whether the team can be renamed.")),
                    ("can_change_members", schema::computed(schema::flag(), "Whether the members of the team can be changed.")),
                    ("can_change_roles", schema::computed(schema::flag(), "Whether the roles of the team can be changed.")),
                    ("space_id", schema::space_id("team")),
                ],
            ),
            vec![
                ("external_security_group", NestedBlock::Set(external_security_group)),
                ("user_role", NestedBlock::Set(user_role)),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);
        for (index, group) in value::blocks(&config.external_security_group).into_iter().enumerate() {
            validation.within("external_security_group", index, |validation| {
                validation.not_empty("id", &group.id);
            });
        }
        for (index, role) in value::blocks(&config.user_role).into_iter().enumerate() {
            validation.within("user_role", index, |validation| {
                validation.not_empty("user_role_id", &role.user_role_id);
                validation.not_empty("space_id", &role.space_id);
            });
        }
    }

    fn plan(state: &mut Self::State) {
        value::unknown_if_null(&mut state.id);
        value::unknown_if_null(&mut state.can_be_deleted);
        value::unknown_if_null(&mut state.can_be_renamed);
        value::unknown_if_null(&mut state.can_change_members);
        value::unknown_if_null(&mut state.can_change_roles);
        value::unknown_if_null(&mut state.space_id);
        if let Value::Value(groups) = &mut state.external_security_group {
            for group in groups.iter_mut() {
                if let Value::Value(group) = group {
                    value::unknown_if_null(&mut group.display_name);
                    value::unknown_if_null(&mut group.display_id_and_name);
                }
            }
        }
        if let Value::Value(roles) = &mut state.user_role {
            for role in roles.iter_mut() {
                if let Value::Value(role) = role {
                    value::unknown_if_null(&mut role.id);
                    value::unknown_if_null(&mut role.team_id);
                }
            }
        }
    }

    fn replace_on_change(prior: &Self::State, proposed: &Self::State) -> Vec<AttributePath> {
        space_replacement(&prior.space_id, &proposed.space_id)
    }

    fn id(state: &Self::State) -> String {
        value::string(&state.id)
    }

    fn name(state: &Self::State) -> String {
        value::string(&state.name)
    }

    fn with_id(id: String) -> Self::State {
        TeamState {
            id: Value::Value(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let team = expand(&planned);
        let created = client.add(team.space_id.as_deref(), &team).await?;
        let team_id = created.id.clone().unwrap_or_default();
        let roles = sync_roles(client, &team_id, Vec::new(), planned_roles(&planned, &team_id)).await?;
        let mut state = planned;
        flatten(&created, &mut state);
        flatten_roles(&roles, &mut state);
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.space_id);
        let Some(team) = client
            .find::<Team>(space_id.as_deref(), &value::string(&state.id))
            .await?
        else {
            return Ok(None);
        };
        let roles = client
            .children::<Team, ScopedUserRole>(space_id.as_deref(), &value::string(&state.id))
            .await?;
        let mut state = state;
        flatten(&team, &mut state);
        flatten_roles(&roles.items, &mut state);
        Ok(Some(state))
    }

    async fn update(client: &Client, prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let team = expand(&planned);
        let team_id = value::string(&prior.id);
        let updated = client.update(team.space_id.as_deref(), &team_id, &team).await?;
        let granted = client
            .children::<Team, ScopedUserRole>(team.space_id.as_deref(), &team_id)
            .await?;
        let roles = sync_roles(client, &team_id, granted.items, planned_roles(&planned, &team_id)).await?;
        let mut state = planned;
        flatten(&updated, &mut state);
        flatten_roles(&roles, &mut state);
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let space_id = value::opt_string(&state.space_id);
        client
            .delete::<Team>(space_id.as_deref(), &value::string(&state.id))
            .await?;
        Ok(())
    }
}

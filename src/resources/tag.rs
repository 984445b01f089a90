//! Tags live inside their tag set. Every change is a read-modify-write of the whole set,
//! done while holding that set's lock.
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::Schema, value::Value};

use crate::client::{Client, Query};
use crate::framework::value::{self, TfInt, TfString};
use crate::framework::{replace_if_changed, schema, Error, ManagedResource, Validation};
use crate::model::tag_set::{Tag, TagSet};
use crate::model::tenant::Tenant;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TagState {
    pub id: TfString,
    pub name: TfString,
    pub color: TfString,
    pub description: TfString,
    pub sort_order: TfInt,
    pub canonical_tag_name: TfString,
    pub tag_set_id: TfString,
    pub tag_set_space_id: TfString,
}

/// A tag ID, `TagSets-1/Tags-2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagId<'a> {
    pub tag_set_id: &'a str,
    pub tag: &'a str,
}

impl<'a> TagId<'a> {
    pub fn parse(id: &'a str) -> Result<Self, Error> {
        match id.split_once('/') {
            Some((tag_set_id, tag)) if !tag_set_id.is_empty() && !tag.is_empty() && !tag.contains('/') => {
                Ok(Self { tag_set_id, tag })
            }
            _ => Err(Error::InvalidId {
                id: id.to_string(),
                reason: "tag IDs have the form TagSets-{ID}/Tags-{ID}".to_string(),
            }),
        }
    }

    /// The same tag, moved into another set.
    pub fn in_set(&self, tag_set_id: &str) -> String {
        format!("{tag_set_id}/{}", self.tag)
    }
}

fn expand(state: &TagState) -> Tag {
    Tag {
        id: value::opt_string(&state.id),
        name: value::string(&state.name),
        color: value::string(&state.color),
        description: value::opt_string(&state.description),
        sort_order: value::int(&state.sort_order),
        canonical_tag_name: value::opt_string(&state.canonical_tag_name),
    }
}

fn flatten(tag: &Tag, tag_set: &TagSet, state: &mut TagState) {
    value::set_string(&mut state.id, tag.id.as_deref());
    value::set(&mut state.name, tag.name.clone());
    value::set(&mut state.color, tag.color.clone());
    value::set_string(&mut state.description, tag.description.as_deref());
    value::set(&mut state.sort_order, tag.sort_order);
    value::set_string(&mut state.canonical_tag_name, tag.canonical_tag_name.as_deref());
    value::set_string(&mut state.tag_set_id, tag_set.id.as_deref());
    value::set_string(&mut state.tag_set_space_id, tag_set.space_id.as_deref());
}

/// Find a tag by ID first, then by name.
fn locate<'a>(tag_set: &'a TagSet, id: Option<&str>, name: &str) -> Option<&'a Tag> {
    id.and_then(|id| tag_set.tag(id)).or_else(|| tag_set.tag_named(name))
}

fn ensure_unique_name(tag_set: &TagSet, name: &str, except: Option<&str>) -> Result<(), Error> {
    match tag_set.tag_named(name) {
        Some(existing) if existing.id.as_deref() != except || except.is_none() => Err(Error::Conflict(format!(
            "the tag name '{name}' is already in use by another tag in this tag set; tag names must be unique"
        ))),
        _ => Ok(()),
    }
}

async fn used_by_tenants(client: &Client, space_id: Option<&str>, tag: &Tag) -> Result<bool, Error> {
    let Some(canonical) = tag.canonical_tag_name.as_deref().or(tag.id.as_deref()) else {
        return Ok(false);
    };
    let query = Query {
        take: Some(1),
        ..Default::default()
    }
    .with("tags", canonical);
    let tenants = client.query::<Tenant>(space_id, &query).await?;
    Ok(!tenants.items.is_empty())
}

pub struct TagResource;

impl TagResource {
    async fn move_between_sets(client: &Client, prior: TagState, planned: TagState) -> Result<TagState, Error> {
        let source_id = value::string(&prior.tag_set_id);
        let destination_id = value::string(&planned.tag_set_id);
        // One space for both sets: a changed tag_set_space_id replaces the tag instead of
        // reaching this update.
        let space_id = value::opt_string(&planned.tag_set_space_id).or_else(|| value::opt_string(&prior.tag_set_space_id));
        let name = value::string(&planned.name);
        let prior_id = value::string(&prior.id);
        info!("moving tag {prior_id} from {source_id} to {destination_id}");

        let _guard = client
            .tag_set_locks()
            .lock_all(&[source_id.as_str(), destination_id.as_str()])
            .await;

        let mut source: TagSet = client.get(space_id.as_deref(), &source_id).await?;
        let mut destination: TagSet = client.get(space_id.as_deref(), &destination_id).await?;
        ensure_unique_name(&destination, &name, None)?;

        let Some(position) = source.tags.iter().position(|tag| tag.id.as_deref() == Some(prior_id.as_str())) else {
            return Err(Error::Missing(format!("tag {prior_id} in tag set {source_id}")));
        };
        if used_by_tenants(client, space_id.as_deref(), &source.tags[position]).await? {
            return Err(Error::Conflict(
                "the tag may not be transferred; it is being used by one or more tenants".to_string(),
            ));
        }

        source.tags.remove(position);
        client.update(space_id.as_deref(), &source_id, &source).await?;

        let mut tag = expand(&planned);
        tag.id = Some(TagId::parse(&prior_id)?.in_set(&destination_id));
        tag.canonical_tag_name = None;
        destination.tags.push(tag);
        let updated: TagSet = client.update(space_id.as_deref(), &destination_id, &destination).await?;

        let tag = updated
            .tag_named(&name)
            .ok_or_else(|| Error::Missing(format!("tag '{name}' in tag set {destination_id}")))?;
        let mut state = planned;
        flatten(tag, &updated, &mut state);
        Ok(state)
    }
}

#[async_trait]
impl ManagedResource for TagResource {
    type State = TagState;

    const NAME: &'static str = "octopusdeploy_tag";

    fn schema() -> Schema {
        schema::schema(schema::block(
            "This resource manages tags in Octopus Deploy.",
            vec![
                ("id", schema::id()),
                ("name", schema::required(schema::text(), "The name of the tag.")),
                ("color", schema::required(schema::text(), "The color of the tag.")),
                ("description", schema::optional_computed(schema::text(), "The description of the tag.")),
                ("sort_order", schema::optional_computed(schema::number(), "The sort order of the tag.")),
                ("canonical_tag_name", schema::computed(schema::text(), "The canonical name of the tag.")),
                ("tag_set_id", schema::required(schema::text(), "The ID of the associated tag set.")),
                (
                    "tag_set_space_id",
                    schema::optional_computed(
                        schema::text(),
                        "The Space ID of the associated tag set. Required if the tag set is not in the same space as what is configured on the provider.",
                    ),
                ),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);
        validation.not_empty("color", &config.color);
        validation.not_empty("tag_set_id", &config.tag_set_id);
    }

    fn plan(state: &mut Self::State) {
        value::unknown_if_null(&mut state.id);
        value::default_if_null(&mut state.description, String::new());
        value::unknown_if_null(&mut state.sort_order);
        value::unknown_if_null(&mut state.canonical_tag_name);
        value::unknown_if_null(&mut state.tag_set_space_id);
    }

    fn replace_on_change(prior: &Self::State, proposed: &Self::State) -> Vec<AttributePath> {
        replace_if_changed(&[("tag_set_space_id", &prior.tag_set_space_id, &proposed.tag_set_space_id)])
    }

    fn id(state: &Self::State) -> String {
        value::string(&state.id)
    }

    fn name(state: &Self::State) -> String {
        value::string(&state.name)
    }

    fn with_id(id: String) -> Self::State {
        let tag_set_id = id.split_once('/').map(|(tag_set_id, _)| tag_set_id.to_string());
        TagState {
            id: Value::Value(id),
            tag_set_id: tag_set_id.map_or(Value::Null, Value::Value),
            ..Default::default()
        }
    }

    fn import(id: String) -> Result<Self::State, Error> {
        TagId::parse(&id)?;
        Ok(Self::with_id(id))
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let tag_set_id = value::string(&planned.tag_set_id);
        let space_id = value::opt_string(&planned.tag_set_space_id);
        let name = value::string(&planned.name);
        let _guard = client.tag_set_locks().lock(&tag_set_id).await;

        let mut tag_set: TagSet = client.get(space_id.as_deref(), &tag_set_id).await?;
        ensure_unique_name(&tag_set, &name, None)?;

        let mut tag = expand(&planned);
        tag.id = None;
        tag.canonical_tag_name = None;
        tag_set.tags.push(tag);
        let updated: TagSet = client.update(space_id.as_deref(), &tag_set_id, &tag_set).await?;

        let tag = updated
            .tag_named(&name)
            .ok_or_else(|| Error::Missing(format!("tag '{name}' in tag set {tag_set_id}")))?;
        let mut state = planned;
        flatten(tag, &updated, &mut state);
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let id = value::string(&state.id);
        let tag_id = TagId::parse(&id)?;
        let tag_set_id = value::opt_string(&state.tag_set_id).unwrap_or_else(|| tag_id.tag_set_id.to_string());
        let space_id = value::opt_string(&state.tag_set_space_id);
        let _guard = client.tag_set_locks().lock(&tag_set_id).await;

        let Some(tag_set) = client.find::<TagSet>(space_id.as_deref(), &tag_set_id).await? else {
            debug!("tag set {tag_set_id} no longer exists");
            return Ok(None);
        };
        let Some(tag) = locate(&tag_set, Some(id.as_str()), &value::string(&state.name)) else {
            return Ok(None);
        };
        let mut state = state;
        flatten(tag, &tag_set, &mut state);
        Ok(Some(state))
    }

    async fn update(client: &Client, prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        if prior.tag_set_id != planned.tag_set_id {
            return Self::move_between_sets(client, prior, planned).await;
        }

        let tag_set_id = value::string(&planned.tag_set_id);
        let space_id = value::opt_string(&planned.tag_set_space_id);
        let id = value::string(&prior.id);
        let name = value::string(&planned.name);
        let _guard = client.tag_set_locks().lock(&tag_set_id).await;

        let mut tag_set: TagSet = client.get(space_id.as_deref(), &tag_set_id).await?;
        ensure_unique_name(&tag_set, &name, Some(id.as_str()))?;
        let Some(position) = tag_set.tags.iter().position(|tag| tag.id.as_deref() == Some(id.as_str())) else {
            return Err(Error::Missing(format!("tag {id} in tag set {tag_set_id}")));
        };

        let mut tag = expand(&planned);
        tag.id = Some(id.clone());
        tag.canonical_tag_name = None;
        tag_set.tags[position] = tag;
        let updated: TagSet = client.update(space_id.as_deref(), &tag_set_id, &tag_set).await?;

        let tag = locate(&updated, Some(id.as_str()), &name)
            .ok_or_else(|| Error::Missing(format!("tag {id} in tag set {tag_set_id}")))?;
        let mut state = planned;
        flatten(tag, &updated, &mut state);
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let id = value::string(&state.id);
        let tag_set_id = value::string(&state.tag_set_id);
        let space_id = value::opt_string(&state.tag_set_space_id);
        let _guard = client.tag_set_locks().lock(&tag_set_id).await;

        let Some(mut tag_set) = client.find::<TagSet>(space_id.as_deref(), &tag_set_id).await? else {
            return Ok(());
        };
        let Some(position) = tag_set.tags.iter().position(|tag| tag.id.as_deref() == Some(id.as_str())) else {
            return Ok(());
        };
        if used_by_tenants(client, space_id.as_deref(), &tag_set.tags[position]).await? {
            return Err(Error::Conflict(
                "the tag may not be deleted; it is being used by one or more tenants".to_string(),
            ));
        }

        tag_set.tags.remove(position);
        client.update(space_id.as_deref(), &tag_set_id, &tag_set).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::test::client_for;
    use crate::framework::test::assert_schema_matches_state;

    fn region_set(tags: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "Id": "TagSets-1",
            "Name": "Region",
            "SpaceId": "Spaces-1",
            "Tags": tags
        })
    }

    fn tag_set(id: &str, name: &str, tags: serde_json::Value) -> serde_json::Value {
        serde_json::json!({ "Id": id, "Name": name, "SpaceId": "Spaces-1", "Tags": tags })
    }

    /// EU moving from Region (TagSets-1) to Market (TagSets-9).
    fn moving() -> (TagState, TagState) {
        let prior = TagState {
            id: Value::Value("TagSets-1/Tags-2".into()),
            description: Value::Value(String::new()),
            sort_order: Value::Value(0),
            canonical_tag_name: Value::Value("Region/EU".into()),
            tag_set_space_id: Value::Value("Spaces-1".into()),
            ..configured()
        };
        let planned = TagState {
            tag_set_id: Value::Value("TagSets-9".into()),
            ..prior.clone()
        };
        (prior, planned)
    }

    async fn mount_source(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/tagsets/TagSets-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(region_set(serde_json::json!([
                { "Id": "TagSets-1/Tags-2", "Name": "EU", "Color": "#333333", "CanonicalTagName": "Region/EU" },
                { "Id": "TagSets-1/Tags-3", "Name": "US", "Color": "#444444", "CanonicalTagName": "Region/US" }
            ]))))
            .mount(server)
            .await;
    }

    async fn mount_tenants(server: &MockServer, items: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/tenants"))
            .and(query_param("tags", "Region/EU"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": items,
                "TotalResults": 0,
                "ItemsPerPage": 1
            })))
            .mount(server)
            .await;
    }

    fn configured() -> TagState {
        TagState {
            name: Value::Value("EU".into()),
            color: Value::Value("#333333".into()),
            tag_set_id: Value::Value("TagSets-1".into()),
            ..Default::default()
        }
    }

    #[test]
    fn schema_matches_state() {
        assert_schema_matches_state::<TagState>(&TagResource::schema());
    }

    #[test]
    fn tag_ids_need_both_parts() {
        let id = TagId::parse("TagSets-1/Tags-2").unwrap();
        assert_eq!(id.tag_set_id, "TagSets-1");
        assert_eq!(id.in_set("TagSets-9"), "TagSets-9/Tags-2");

        for bad in ["", "Tags-2", "TagSets-1/", "/Tags-2", "a/b/c"] {
            assert!(matches!(TagId::parse(bad), Err(Error::InvalidId { .. })), "{bad}");
        }
    }

    #[test]
    fn import_fills_in_the_tag_set() {
        let state = TagResource::import("TagSets-3/Tags-7".into()).unwrap();
        assert_eq!(state.tag_set_id, Value::Value("TagSets-3".into()));
        assert!(TagResource::import("Tags-7".into()).is_err());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/tagsets/TagSets-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(region_set(serde_json::json!([
                { "Id": "TagSets-1/Tags-1", "Name": "EU", "Color": "#000000" }
            ]))))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let err = TagResource::create(&client, configured()).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn create_appends_to_the_tag_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/tagsets/TagSets-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(region_set(serde_json::json!([]))))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/Spaces-1/tagsets/TagSets-1"))
            .and(body_partial_json(serde_json::json!({ "Tags": [{ "Name": "EU", "Color": "#333333" }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(region_set(serde_json::json!([
                {
                    "Id": "TagSets-1/Tags-5",
                    "Name": "EU",
                    "Color": "#333333",
                    "Description": "",
                    "SortOrder": 0,
                    "CanonicalTagName": "Region/EU"
                }
            ]))))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let mut planned = configured();
        TagResource::plan(&mut planned);
        let state = TagResource::create(&client, planned).await.unwrap();
        assert_eq!(state.id, Value::Value("TagSets-1/Tags-5".into()));
        assert_eq!(state.canonical_tag_name, Value::Value("Region/EU".into()));
        assert_eq!(state.tag_set_space_id, Value::Value("Spaces-1".into()));
    }

    #[tokio::test]
    async fn read_drops_tag_when_tag_set_is_gone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/tagsets/TagSets-1"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let state = TagState {
            id: Value::Value("TagSets-1/Tags-5".into()),
            ..configured()
        };
        assert_eq!(TagResource::read(&client, state).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_refuses_tags_used_by_tenants() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/tagsets/TagSets-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(region_set(serde_json::json!([
                { "Id": "TagSets-1/Tags-5", "Name": "EU", "Color": "#333333", "CanonicalTagName": "Region/EU" }
            ]))))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/tenants"))
            .and(query_param("tags", "Region/EU"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [{ "Id": "Tenants-1", "Name": "Acme" }],
                "TotalResults": 1,
                "ItemsPerPage": 1
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("Spaces-1"));
        let state = TagState {
            id: Value::Value("TagSets-1/Tags-5".into()),
            ..configured()
        };
        let err = TagResource::delete(&client, state).await.unwrap_err();
        assert!(err.to_string().contains("tenants"));
    }

    #[tokio::test]
    async fn moving_a_tag_rewrites_both_sets() {
        let server = MockServer::start().await;
        mount_source(&server).await;
        mount_tenants(&server, serde_json::json!([])).await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/tagsets/TagSets-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tag_set(
                "TagSets-9",
                "Market",
                serde_json::json!([{ "Id": "TagSets-9/Tags-1", "Name": "APAC", "Color": "#555555" }]),
            )))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/Spaces-1/tagsets/TagSets-1"))
            .and(body_partial_json(serde_json::json!({ "Tags": [{ "Id": "TagSets-1/Tags-3" }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(region_set(serde_json::json!([
                { "Id": "TagSets-1/Tags-3", "Name": "US", "Color": "#444444", "CanonicalTagName": "Region/US" }
            ]))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/Spaces-1/tagsets/TagSets-9"))
            .and(body_partial_json(serde_json::json!({
                "Tags": [
                    { "Id": "TagSets-9/Tags-1", "Name": "APAC" },
                    { "Id": "TagSets-9/Tags-2", "Name": "EU", "Color": "#333333" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(tag_set(
                "TagSets-9",
                "Market",
                serde_json::json!([
                    { "Id": "TagSets-9/Tags-1", "Name": "APAC", "Color": "#555555" },
                    {
                        "Id": "TagSets-9/Tags-2",
                        "Name": "EU",
                        "Color": "#333333",
                        "Description": "",
                        "SortOrder": 0,
                        "CanonicalTagName": "Market/EU"
                    }
                ]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let (prior, planned) = moving();
        let client = client_for(&server, Some("Spaces-1"));
        let state = TagResource::update(&client, prior, planned).await.unwrap();
        assert_eq!(state.id, Value::Value("TagSets-9/Tags-2".into()));
        assert_eq!(state.tag_set_id, Value::Value("TagSets-9".into()));
        assert_eq!(state.canonical_tag_name, Value::Value("Market/EU".into()));
    }

    #[tokio::test]
    async fn moving_into_a_set_with_the_same_name_conflicts() {
        let server = MockServer::start().await;
        mount_source(&server).await;
        mount_tenants(&server, serde_json::json!([])).await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/tagsets/TagSets-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tag_set(
                "TagSets-9",
                "Market",
                serde_json::json!([{ "Id": "TagSets-9/Tags-4", "Name": "EU", "Color": "#555555" }]),
            )))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (prior, planned) = moving();
        let client = client_for(&server, Some("Spaces-1"));
        let err = TagResource::update(&client, prior, planned).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn tags_used_by_tenants_are_not_moved() {
        let server = MockServer::start().await;
        mount_source(&server).await;
        mount_tenants(&server, serde_json::json!([{ "Id": "Tenants-1", "Name": "Acme" }])).await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/tagsets/TagSets-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tag_set("TagSets-9", "Market", serde_json::json!([]))))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (prior, planned) = moving();
        let client = client_for(&server, Some("Spaces-1"));
        let err = TagResource::update(&client, prior, planned).await.unwrap_err();
        assert!(matches!(&err, Error::Conflict(message) if message.contains("transferred")));
    }
}

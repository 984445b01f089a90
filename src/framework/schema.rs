//! Schema builders shared by resources and data sources.
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, NestedBlock, Schema};

pub fn text() -> AttributeType {
    AttributeType::String
}

pub fn flag() -> AttributeType {
    AttributeType::Bool
}

pub fn number() -> AttributeType {
    AttributeType::Number
}

pub fn text_list() -> AttributeType {
    AttributeType::List(AttributeType::String.into())
}

pub fn text_set() -> AttributeType {
    AttributeType::Set(AttributeType::String.into())
}

/// A list of objects, used for data source results.
pub fn object_list(fields: Vec<(&str, AttributeType)>) -> AttributeType {
    AttributeType::List(
        AttributeType::Object(
            fields
                .into_iter()
                .map(|(name, attr_type)| (name.to_string(), attr_type))
                .collect(),
        )
        .into(),
    )
}

fn attribute(attr_type: AttributeType, constraint: AttributeConstraint, description: &str) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint,
        ..Default::default()
    }
}

pub fn required(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::Required, description)
}

pub fn optional(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::Optional, description)
}

pub fn computed(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::Computed, description)
}

pub fn optional_computed(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::OptionalComputed, description)
}

pub fn sensitive(attribute: Attribute) -> Attribute {
    Attribute {
        sensitive: true,
        ..attribute
    }
}

pub fn block(description: &str, attributes: Vec<(&str, Attribute)>) -> Block {
    Block {
        attributes: attributes
            .into_iter()
            .map(|(name, attribute)| (name.to_string(), attribute))
            .collect(),
        description: Description::plain(description),
        ..Default::default()
    }
}

pub fn with_blocks(mut parent: Block, blocks: Vec<(&str, NestedBlock)>) -> Block {
    parent.blocks = blocks
        .into_iter()
        .map(|(name, block)| (name.to_string(), block))
        .collect();
    parent
}

pub fn schema(block: Block) -> Schema {
    Schema { version: 0, block }
}

pub fn id() -> Attribute {
    computed(text(), "The unique ID for this resource.")
}

pub fn name(resource: &str) -> Attribute {
    required(text(), &format!("The name of this {resource}."))
}

pub fn description(resource: &str) -> Attribute {
    optional(text(), &format!("The description of this {resource}."))
}

pub fn space_id(resource: &str) -> Attribute {
    optional_computed(text(), &format!("The space ID associated with this {resource}."))
}

pub fn slug(resource: &str) -> Attribute {
    optional_computed(text(), &format!("The unique slug of this {resource}."))
}

pub fn sort_order(resource: &str) -> Attribute {
    optional_computed(number(), &format!("The order number to sort this {resource}."))
}

pub fn environments() -> Attribute {
    optional(text_list(), "A list of environment IDs associated with this resource.")
}

pub fn tenants() -> Attribute {
    optional(text_list(), "A list of tenant IDs associated with this resource.")
}

pub fn tenant_tags() -> Attribute {
    optional(
        text_list(),
        "A list of tenant tags associated with this resource, in the form `tag set name/tag name`.",
    )
}

pub fn tenanted_deployment_participation() -> Attribute {
    optional_computed(
        text(),
        "The tenanted deployment mode of the resource. Valid account types are `Untenanted`, `TenantedOrUntenanted`, or `Tenanted`.",
    )
}

pub fn username(required_attribute: bool) -> Attribute {
    let description = "The username associated with this resource.";
    if required_attribute {
        required(text(), description)
    } else {
        optional(text(), description)
    }
}

pub fn password(required_attribute: bool) -> Attribute {
    let description = "The password associated with this resource.";
    sensitive(if required_attribute {
        required(text(), description)
    } else {
        optional(text(), description)
    })
}

pub fn subject_keys(description: &str) -> Attribute {
    optional(text_list(), description)
}

/// Filters shared by every data source.
pub fn query_attributes(collection: &str) -> Vec<(&'static str, Attribute)> {
    vec![
        ("id", computed(text(), "An auto-generated identifier that includes the timestamp when this data source was last modified.")),
        ("ids", optional(text_list(), &format!("A filter to search by a list of {collection} IDs."))),
        ("partial_name", optional(text(), "A filter to search by a partial name.")),
        ("skip", optional(number(), "A filter to specify the number of items to skip in the response.")),
        ("take", optional(number(), "A filter to specify the number of items to take (or return) in the response.")),
        ("space_id", optional(text(), "A Space ID to filter by. Will revert what is specified on the provider if not set.")),
    ]
}

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use tf_provider::{AttributePath, schema::Schema, value::Value};

use super::{space_replacement, TENANTED_DEPLOYMENT_MODES};
use crate::client::Client;
use crate::framework::value::{self, TfBool, TfInt, TfString, TfStrings};
use crate::framework::{schema, Error, ManagedResource, Validation};
use crate::model::certificate::Certificate;
use crate::model::SensitiveValue;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CertificateState {
    pub id: TfString,
    pub name: TfString,
    pub certificate_data: TfString,
    pub password: TfString,
    pub notes: TfString,
    pub environments: TfStrings,
    pub tenants: TfStrings,
    pub tenant_tags: TfStrings,
    pub tenanted_deployment_participation: TfString,
    pub certificate_data_format: TfString,
    pub thumbprint: TfString,
    pub subject_common_name: TfString,
    pub issuer_common_name: TfString,
    pub not_after: TfString,
    pub not_before: TfString,
    pub has_private_key: TfBool,
    pub self_signed: TfBool,
    pub serial_number: TfString,
    pub version: TfInt,
    pub space_id: TfString,
}

pub(crate) fn timestamp(value: Option<&DateTime<FixedOffset>>) -> Option<String> {
    value.map(|value| value.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn expand(state: &CertificateState) -> Certificate {
    Certificate {
        id: value::opt_string(&state.id),
        name: value::string(&state.name),
        notes: value::opt_string(&state.notes),
        certificate_data: SensitiveValue::from_option(value::opt_string(&state.certificate_data)),
        password: SensitiveValue::from_option(value::opt_string(&state.password)),
        environment_ids: value::strings(&state.environments),
        tenant_ids: value::strings(&state.tenants),
        tenant_tags: value::strings(&state.tenant_tags),
        tenanted_deployment_participation: value::opt_string(&state.tenanted_deployment_participation),
        space_id: value::opt_string(&state.space_id),
        ..Default::default()
    }
}

/// Certificate data and password are write-only and keep their configured values.
fn flatten(certificate: &Certificate, state: &mut CertificateState) {
    value::set_string(&mut state.id, certificate.id.as_deref());
    value::set(&mut state.name, certificate.name.clone());
    value::set_optional_string(&mut state.notes, certificate.notes.as_deref());
    value::set_optional_list(&mut state.environments, &certificate.environment_ids);
    value::set_optional_list(&mut state.tenants, &certificate.tenant_ids);
    value::set_optional_list(&mut state.tenant_tags, &certificate.tenant_tags);
    value::set_string(
        &mut state.tenanted_deployment_participation,
        certificate.tenanted_deployment_participation.as_deref(),
    );
    value::set_string(&mut state.certificate_data_format, certificate.certificate_data_format.as_deref());
    value::set_string(&mut state.thumbprint, certificate.thumbprint.as_deref());
    value::set_string(&mut state.subject_common_name, certificate.subject_common_name.as_deref());
    value::set_string(&mut state.issuer_common_name, certificate.issuer_common_name.as_deref());
    value::set_string(&mut state.not_after, timestamp(certificate.not_after.as_ref()).as_deref());
    value::set_string(&mut state.not_before, timestamp(certificate.not_before.as_ref()).as_deref());
    value::set(&mut state.has_private_key, certificate.has_private_key);
    value::set(&mut state.self_signed, certificate.self_signed);
    value::set_string(&mut state.serial_number, certificate.serial_number.as_deref());
    value::set(&mut state.version, certificate.version);
    value::set_string(&mut state.space_id, certificate.space_id.as_deref());
}

pub struct CertificateResource;

#[async_trait]
impl ManagedResource for CertificateResource {
    type State = CertificateState;

    const NAME: &'static str = "octopusdeploy_certificate";

    fn schema() -> Schema {
        let computed_text = |description: &str| schema::computed(schema::text(), description);
        schema::schema(schema::block(
            "This resource manages certificates in Octopus Deploy.",
            vec![
                ("id", schema::id()),
                ("name", schema::name("certificate")),
                (
                    "certificate_data",
                    schema::sensitive(schema::required(
                        schema::text(),
                        "The encoded data of the certificate, as a base64 string.",
                    )),
                ),
                ("password", schema::password(false)),
                ("notes", schema::optional(schema::text(), "Notes about this certificate.")),
                ("environments", schema::environments()),
                ("tenants", schema::tenants()),
                ("tenant_tags", schema::tenant_tags()),
                ("tenanted_deployment_participation", schema::tenanted_deployment_participation()),
                (
                    "certificate_data_format",
                    computed_text("Specifies the archive file format used for storing cryptography objects in the certificate. Valid formats are `Der`, `Pem`, `Pkcs12`, or `Unknown`."),
                ),
                ("thumbprint", computed_text("The thumbprint of the certificate.")),
                ("subject_common_name", computed_text("The common name of the certificate subject.")),
                ("issuer_common_name", computed_text("The common name of the certificate issuer.")),
                ("not_after", computed_text("The end of the validity period, in RFC 3339 format.")),
                ("not_before", computed_text("The start of the validity period, in RFC 3339 format.")),
                ("has_private_key", schema::computed(schema::flag(), "Whether the certificate includes a private key.")),
                ("self_signed", schema::computed(schema::flag(), "Whether the certificate is self-signed.")),
                ("serial_number", computed_text("The serial number of the certificate.")),
                ("version", schema::computed(schema::number(), "The X.509 version of the certificate.")),
                ("space_id", schema::space_id("certificate")),
            ],
        ))
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.not_empty("name", &config.name);
        validation.not_empty("certificate_data", &config.certificate_data);
        validation.one_of(
            "tenanted_deployment_participation",
            &config.tenanted_deployment_participation,
            &TENANTED_DEPLOYMENT_MODES,
        );
    }

    fn plan(state: &mut Self::State) {
        value::unknown_if_null(&mut state.id);
        value::unknown_if_null(&mut state.tenanted_deployment_participation);
        value::unknown_if_null(&mut state.space_id);
        for computed in [
            &mut state.certificate_data_format,
            &mut state.thumbprint,
            &mut state.subject_common_name,
            &mut state.issuer_common_name,
            &mut state.not_after,
            &mut state.not_before,
            &mut state.serial_number,
        ] {
            value::unknown_if_null(computed);
        }
        value::unknown_if_null(&mut state.has_private_key);
        value::unknown_if_null(&mut state.self_signed);
        value::unknown_if_null(&mut state.version);
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
        CertificateState {
            id: Value::Value(id),
            ..Default::default()
        }
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error> {
        let certificate = expand(&planned);
        let created = client.add(certificate.space_id.as_deref(), &certificate).await?;
        let mut state = planned;
        flatten(&created, &mut state);
        Ok(state)
    }

    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error> {
        let space_id = value::opt_string(&state.space_id);
        let Some(certificate) = client
            .find::<Certificate>(space_id.as_deref(), &value::string(&state.id))
            .await?
        else {
            return Ok(None);
        };
        let mut state = state;
        flatten(&certificate, &mut state);
        Ok(Some(state))
    }

    async fn update(client: &Client, prior: Self::State, planned: Self::State) -> Result<Self::State, Error> {
        let mut certificate = expand(&planned);
        // Only send the secrets again when they changed.
        if prior.certificate_data == planned.certificate_data {
            certificate.certificate_data = SensitiveValue {
                has_value: true,
                new_value: None,
            };
        }
        if prior.password == planned.password && certificate.password.has_value {
            certificate.password.new_value = None;
        }

        let updated = client
            .update(certificate.space_id.as_deref(), &value::string(&planned.id), &certificate)
            .await?;
        let mut state = planned;
        flatten(&updated, &mut state);
        Ok(state)
    }

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error> {
        let space_id = value::opt_string(&state.space_id);
        client
            .delete::<Certificate>(space_id.as_deref(), &value::string(&state.id))
            .await?;
        Ok(())
    }
}

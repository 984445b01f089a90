use serde::{Deserialize, Serialize};
use tf_provider::schema::AttributeType;

use super::{Listing, QueryFields};
use crate::framework::schema;
use crate::framework::value::TfBlocks;
use crate::model::certificate::Certificate;
use crate::resources::certificate::timestamp;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CertificateItem {
    pub id: String,
    pub name: String,
    pub notes: String,
    pub certificate_data_format: String,
    pub thumbprint: String,
    pub subject_common_name: String,
    pub issuer_common_name: String,
    pub not_after: String,
    pub not_before: String,
    pub has_private_key: bool,
    pub self_signed: bool,
    pub environments: Vec<String>,
    pub tenants: Vec<String>,
    pub tenant_tags: Vec<String>,
    pub tenanted_deployment_participation: String,
    pub space_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CertificatesState {
    #[serde(flatten)]
    pub query: QueryFields,
    pub certificates: TfBlocks<CertificateItem>,
}

pub struct Certificates;

impl Listing for Certificates {
    type Model = Certificate;
    type Item = CertificateItem;
    type State = CertificatesState;

    const NAME: &'static str = "octopusdeploy_certificates";
    const RESULTS: &'static str = "certificates";
    const SINGULAR: &'static str = "certificate";

    fn item_type() -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", schema::text()),
            ("name", schema::text()),
            ("notes", schema::text()),
            ("certificate_data_format", schema::text()),
            ("thumbprint", schema::text()),
            ("subject_common_name", schema::text()),
            ("issuer_common_name", schema::text()),
            ("not_after", schema::text()),
            ("not_before", schema::text()),
            ("has_private_key", schema::flag()),
            ("self_signed", schema::flag()),
            ("environments", schema::text_list()),
            ("tenants", schema::text_list()),
            ("tenant_tags", schema::text_list()),
            ("tenanted_deployment_participation", schema::text()),
            ("space_id", schema::text()),
        ]
    }

    fn fields(state: &Self::State) -> &QueryFields {
        &state.query
    }

    fn fields_mut(state: &mut Self::State) -> &mut QueryFields {
        &mut state.query
    }

    fn item(_config: &Self::State, certificate: &Certificate) -> Option<CertificateItem> {
        Some(CertificateItem {
            id: certificate.id.clone().unwrap_or_default(),
            name: certificate.name.clone(),
            notes: certificate.notes.clone().unwrap_or_default(),
            certificate_data_format: certificate.certificate_data_format.clone().unwrap_or_default(),
            thumbprint: certificate.thumbprint.clone().unwrap_or_default(),
            subject_common_name: certificate.subject_common_name.clone().unwrap_or_default(),
            issuer_common_name: certificate.issuer_common_name.clone().unwrap_or_default(),
            not_after: timestamp(certificate.not_after.as_ref()).unwrap_or_default(),
            not_before: timestamp(certificate.not_before.as_ref()).unwrap_or_default(),
            has_private_key: certificate.has_private_key,
            self_signed: certificate.self_signed,
            environments: certificate.environment_ids.clone(),
            tenants: certificate.tenant_ids.clone(),
            tenant_tags: certificate.tenant_tags.clone(),
            tenanted_deployment_participation: certificate
                .tenanted_deployment_participation
                .clone()
                .unwrap_or_default(),
            space_id: certificate.space_id.clone().unwrap_or_default(),
        })
    }

    fn results(state: &mut Self::State) -> &mut TfBlocks<CertificateItem> {
        &mut state.certificates
    }
}

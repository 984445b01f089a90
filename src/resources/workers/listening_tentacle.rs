use serde::{Deserialize, Serialize};
use tf_provider::schema::Attribute;

use super::{WorkerFields, WorkerKind};
use crate::framework::value::{self, TfString};
use crate::framework::{schema, Validation};
use crate::model::worker::WorkerEndpoint;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ListeningTentacleWorkerState {
    #[serde(flatten)]
    pub worker: WorkerFields,
    pub uri: TfString,
    pub thumbprint: TfString,
}

pub struct ListeningTentacle;

impl WorkerKind for ListeningTentacle {
    type State = ListeningTentacleWorkerState;

    const NAME: &'static str = "octopusdeploy_listening_tentacle_worker";
    const COMMUNICATION_STYLE: &'static str = "TentaclePassive";
    const DESCRIPTION: &'static str = "This resource manages a listening tentacle worker in Octopus Deploy.";

    fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            ("uri", schema::required(schema::text(), "The URI of the listening tentacle, e.g. `https://worker:10933`.")),
            ("thumbprint", schema::required(schema::text(), "The thumbprint of the tentacle certificate.")),
        ]
    }

    fn fields(state: &Self::State) -> &WorkerFields {
        &state.worker
    }

    fn fields_mut(state: &mut Self::State) -> &mut WorkerFields {
        &mut state.worker
    }

    fn endpoint(state: &Self::State) -> WorkerEndpoint {
        WorkerEndpoint::ListeningTentacle {
            uri: value::string(&state.uri),
            thumbprint: value::string(&state.thumbprint),
            proxy_id: value::opt_string(&state.worker.proxy_id),
        }
    }

    fn flatten(endpoint: &WorkerEndpoint, state: &mut Self::State) -> bool {
        let WorkerEndpoint::ListeningTentacle { uri, thumbprint, .. } = endpoint else {
            return false;
        };
        value::set(&mut state.uri, uri.clone());
        value::set(&mut state.thumbprint, thumbprint.clone());
        true
    }

    fn validate(config: &Self::State, validation: &mut Validation) {
        validation.url("uri", &config.uri);
        validation.not_empty("thumbprint", &config.thumbprint);
    }

    fn with_fields(worker: WorkerFields) -> Self::State {
        ListeningTentacleWorkerState {
            worker,
            ..Default::default()
        }
    }
}

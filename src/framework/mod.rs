//! Glue between Octopus resources and the Terraform plugin protocol.
//!
//! Resources implement [ManagedResource] with plain async CRUD on a [Client]; the
//! [ResourceAdapter] turns that into a `tf_provider::Resource`, wrapping every failure in
//! a diagnostic that names the resource and what was being done to it.
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tf_provider::{AttributePath, DataSource, Diagnostics, Resource, schema::Schema, value::ValueEmpty};

use crate::client::{self, Client};

pub mod schema;
pub mod validate;
pub mod value;

pub use validate::Validation;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] client::Error),

    #[error("expected {expected}, found {found}")]
    UnexpectedType { expected: &'static str, found: String },

    #[error("invalid ID {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{0} no longer exists")]
    Missing(String),

    #[error("no {0} matched")]
    NoMatch(String),

    #[error("the provider has not been configured")]
    Unconfigured,
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Client(err) if err.is_not_found())
    }
}

/// The configured client, shared by every resource and data source.
///
/// Resources are registered before the provider block is configured, so the client is
/// filled in later.
#[derive(Clone, Debug, Default)]
pub struct Session(Arc<OnceLock<Client>>);

impl Session {
    /// Returns false when the session was already configured.
    pub fn configure(&self, client: Client) -> bool {
        self.0.set(client).is_ok()
    }

    pub fn client(&self) -> Result<&Client, Error> {
        self.0.get().ok_or(Error::Unconfigured)
    }

    fn client_or_report(&self, diags: &mut Diagnostics) -> Option<&Client> {
        match self.client() {
            Ok(client) => Some(client),
            Err(err) => {
                diags.root_error("provider is not configured", err.to_string());
                None
            }
        }
    }
}

/// A state struct as seen by the plugin protocol.
pub trait TfState:
    Serialize + DeserializeOwned + Clone + Debug + Default + Send + Sync + 'static
{
}

impl<T> TfState for T where
    T: Serialize + DeserializeOwned + Clone + Debug + Default + Send + Sync + 'static
{
}

/// An Octopus resource managed through Terraform.
#[async_trait]
pub trait ManagedResource: Send + Sync + 'static {
    type State: TfState;

    /// Terraform type name, e.g. `octopusdeploy_environment`.
    const NAME: &'static str;

    fn schema() -> Schema;

    fn validate(_config: &Self::State, _validation: &mut Validation) {}

    /// Mark attributes the server will compute as unknown.
    fn plan(state: &mut Self::State);

    /// Attributes whose change forces a new resource.
    fn replace_on_change(_prior: &Self::State, _proposed: &Self::State) -> Vec<AttributePath> {
        Vec::new()
    }

    fn id(state: &Self::State) -> String;

    fn name(state: &Self::State) -> String;

    /// A state holding only the ID, filled in by the read that follows an import.
    fn with_id(id: String) -> Self::State;

    fn import(id: String) -> Result<Self::State, Error> {
        if id.trim().is_empty() {
            return Err(Error::InvalidId {
                id,
                reason: "the ID must not be empty".to_string(),
            });
        }
        Ok(Self::with_id(id))
    }

    async fn create(client: &Client, planned: Self::State) -> Result<Self::State, Error>;

    /// `Ok(None)` when the resource no longer exists.
    async fn read(client: &Client, state: Self::State) -> Result<Option<Self::State>, Error>;

    async fn update(client: &Client, prior: Self::State, planned: Self::State) -> Result<Self::State, Error>;

    async fn delete(client: &Client, state: Self::State) -> Result<(), Error>;
}

/// Changes to any of these attributes force replacement.
pub fn replace_if_changed<T: PartialEq>(changes: &[(&str, &T, &T)]) -> Vec<AttributePath> {
    changes
        .iter()
        .filter(|(_, prior, proposed)| prior != proposed)
        .map(|(name, _, _)| AttributePath::new(name.to_string()))
        .collect()
}

pub struct ResourceAdapter<R> {
    session: Session,
    _resource: PhantomData<fn() -> R>,
}

impl<R> ResourceAdapter<R> {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            _resource: PhantomData,
        }
    }
}

impl<R> Debug for ResourceAdapter<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceAdapter")
            .field("resource", &std::any::type_name::<R>())
            .finish()
    }
}

#[async_trait]
impl<R: ManagedResource> Resource for ResourceAdapter<R> {
    type State<'a> = R::State;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(R::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        let mut validation = Validation::default();
        R::validate(&config, &mut validation);
        validation.report(diags)
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.session.client_or_report(diags)?;
        let id = R::id(&state);
        debug!("reading {} {id}", R::NAME);

        match R::read(client, state).await {
            Ok(Some(state)) => Some((state, private_state)),
            Ok(None) => {
                warn!("{} {id} no longer exists, removing it from state", R::NAME);
                None
            }
            Err(err) => {
                diags.root_error(format!("error reading {} ID {id}", R::NAME), err.to_string());
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state;
        R::plan(&mut state);
        Some((state, Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let mut state = proposed_state;
        R::plan(&mut state);
        let replace = R::replace_on_change(&prior_state, &state);
        Some((state, prior_private_state, replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.session.client_or_report(diags)?;
        let name = R::name(&planned_state);
        info!("creating {} {name}", R::NAME);

        match R::create(client, planned_state).await {
            Ok(state) => {
                debug!("created {} {name} ({})", R::NAME, R::id(&state));
                Some((state, private_state))
            }
            Err(err) => {
                diags.root_error(format!("error creating {} {name}", R::NAME), err.to_string());
                None
            }
        }
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.session.client_or_report(diags)?;
        let id = R::id(&prior_state);
        info!("updating {} {id}", R::NAME);

        match R::update(client, prior_state, planned_state).await {
            Ok(state) => {
                debug!("updated {} {id}", R::NAME);
                Some((state, private_state))
            }
            Err(err) => {
                diags.root_error(format!("error updating {} ID {id}", R::NAME), err.to_string());
                None
            }
        }
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let client = self.session.client_or_report(diags)?;
        let id = R::id(&state);
        info!("deleting {} {id}", R::NAME);

        match R::delete(client, state).await {
            Ok(()) => {
                debug!("deleted {} {id}", R::NAME);
                Some(())
            }
            Err(err) => {
                diags.root_error(format!("error deleting {} ID {id}", R::NAME), err.to_string());
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        info!("importing {} {id}", R::NAME);
        match R::import(id.clone()) {
            Ok(state) => Some((state, Default::default())),
            Err(err) => {
                diags.root_error(format!("error importing {} ID {id}", R::NAME), err.to_string());
                None
            }
        }
    }
}

/// A read-only query against an Octopus collection.
#[async_trait]
pub trait OctopusDataSource: Send + Sync + 'static {
    type State: TfState;

    const NAME: &'static str;

    fn schema() -> Schema;

    fn validate(_config: &Self::State, _validation: &mut Validation) {}

    async fn read(client: &Client, config: Self::State) -> Result<Self::State, Error>;
}

pub struct DataSourceAdapter<D> {
    session: Session,
    _data_source: PhantomData<fn() -> D>,
}

impl<D> DataSourceAdapter<D> {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            _data_source: PhantomData,
        }
    }
}

impl<D> Debug for DataSourceAdapter<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSourceAdapter")
            .field("data_source", &std::any::type_name::<D>())
            .finish()
    }
}

#[async_trait]
impl<D: OctopusDataSource> DataSource for DataSourceAdapter<D> {
    type State<'a> = D::State;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(D::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        let mut validation = Validation::default();
        D::validate(&config, &mut validation);
        validation.report(diags)
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.session.client_or_report(diags)?;
        debug!("querying {}", D::NAME);

        match D::read(client, config).await {
            Ok(state) => Some(state),
            Err(err) => {
                diags.root_error(format!("error reading {}", D::NAME), err.to_string());
                None
            }
        }
    }
}

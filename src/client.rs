use std::borrow::Borrow;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use futures::future::try_join_all;

use crate::api::{ActiniaApi, Api};
use crate::chain::{ParameterMap, ProcessChain};
use crate::config::ClientConfig;
use crate::error::{ActiniaError, Result};
use crate::job::JobStatus;
use crate::module::Module;
use crate::transport::Transport;

/// A named project on the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub name: String,
}

/// A sub-workspace of a location holding raster and vector data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mapset {
    pub name: String,
    pub location: String,
}

/// Discovery results kept for the lifetime of the client.
#[derive(Clone, Default)]
pub(crate) struct Registry {
    pub(crate) locations: Arc<RwLock<Option<HashMap<String, Location>>>>,
    pub(crate) modules: Arc<RwLock<Option<HashMap<String, Arc<Module>>>>>,
}

/// Client for one actinia instance.
///
/// Cloning is cheap; clones share the connection and the module registry.
pub struct Client<T> {
    pub(crate) api: Arc<Api<T>>,
    pub(crate) registry: Registry,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            registry: self.registry.clone(),
        }
    }
}

#[cfg(feature = "http")]
impl Client<crate::transport::HttpTransport> {
    /// Create a client talking HTTP to the instance described by `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = crate::transport::HttpTransport::new(&config)
            .map_err(|e| ActiniaError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client from `ACTINIA_URL`, `ACTINIA_USER` and `ACTINIA_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            api: Arc::new(Api::new(config, transport)),
            registry: Registry::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.api.config()
    }

    fn source(&self) -> Arc<dyn ActiniaApi> {
        self.api.clone()
    }

    // ------------------------------------------------------------------
    // Discovery
    // ------------------------------------------------------------------

    /// List all locations, refreshing the cached lookup table.
    pub async fn locations(&self) -> Result<Vec<Location>> {
        let names = self.api.list_locations().await?;
        let list: Vec<Location> = names.into_iter().map(|name| Location { name }).collect();
        let table = list
            .iter()
            .map(|l| (l.name.clone(), l.clone()))
            .collect();
        *self.registry.locations.write().unwrap() = Some(table);
        Ok(list)
    }

    /// Look up a location by name, listing locations on first use.
    pub async fn location(&self, name: &str) -> Result<Option<Location>> {
        if let Some(table) = self.registry.locations.read().unwrap().as_ref() {
            return Ok(table.get(name).cloned());
        }
        let list = self.locations().await?;
        Ok(list.into_iter().find(|l| l.name == name))
    }

    pub async fn mapsets(&self, location: &str) -> Result<Vec<Mapset>> {
        let names = self.api.list_mapsets(location).await?;
        Ok(names
            .into_iter()
            .map(|name| Mapset {
                name,
                location: location.to_string(),
            })
            .collect())
    }

    pub async fn raster_layers(&self, location: &str, mapset: &str) -> Result<Vec<String>> {
        self.api.list_raster_layers(location, mapset).await
    }

    /// List the space time raster datasets of a mapset.
    pub async fn strds(&self, location: &str, mapset: &str) -> Result<Vec<String>> {
        self.api.list_strds(location, mapset).await
    }

    // ------------------------------------------------------------------
    // Module registry
    // ------------------------------------------------------------------

    /// All modules offered by the service.
    ///
    /// The list is fetched once per client. The returned descriptors are shared,
    /// so parameters fetched through one of them are visible through every clone.
    pub async fn modules(&self) -> Result<Vec<Arc<Module>>> {
        if let Some(table) = self.registry.modules.read().unwrap().as_ref() {
            return Ok(table.values().cloned().collect());
        }

        let summaries = self.api.list_modules().await?;
        log::debug!("Registering {} modules", summaries.len());
        let fetched: HashMap<String, Arc<Module>> = summaries
            .into_iter()
            .map(|s| {
                let module = Module::new(s.id.clone(), s.description, self.source());
                (s.id, Arc::new(module))
            })
            .collect();

        let mut guard = self.registry.modules.write().unwrap();
        // Another task may have filled the registry meanwhile; its descriptors win.
        let table = guard.get_or_insert(fetched);
        Ok(table.values().cloned().collect())
    }

    /// Look up a module by name, listing modules on first use.
    pub async fn module(&self, name: &str) -> Result<Option<Arc<Module>>> {
        if let Some(table) = self.registry.modules.read().unwrap().as_ref() {
            return Ok(table.get(name).cloned());
        }
        Ok(self.modules().await?.into_iter().find(|m| m.name() == name))
    }

    // ------------------------------------------------------------------
    // Processing
    // ------------------------------------------------------------------

    /// Submit a process chain to `location`/`mapset` and return its tracker.
    ///
    /// The chain is posted exactly once; failures are not retried.
    pub async fn submit(
        &self,
        location: &str,
        mapset: &str,
        chain: &ProcessChain,
    ) -> Result<JobStatus> {
        let url = self.api.post_chain(location, mapset, chain).await?;
        log::debug!("Process chain accepted, status at {}", url);
        Ok(JobStatus::new(url, self.source()))
    }

    /// Fetch the parameters of every module, build the chain and submit it.
    ///
    /// `parameters[i]` is bound to `modules[i]`; see [`ProcessChain::build`].
    pub async fn run_process<M: Borrow<Module>>(
        &self,
        location: &str,
        mapset: &str,
        modules: &[M],
        parameters: &[ParameterMap],
    ) -> Result<JobStatus> {
        if modules.len() != parameters.len() {
            return Err(ActiniaError::ArityMismatch {
                modules: modules.len(),
                parameters: parameters.len(),
            });
        }
        let signatures = try_join_all(modules.iter().map(|m| m.borrow().signature())).await?;
        let chain = ProcessChain::build(&signatures, parameters)?;
        self.submit(location, mapset, &chain).await
    }
}

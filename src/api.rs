//! Endpoint layer
//!
//! [`Api`] owns the configuration and the transport and knows every URL and
//! response shape of the service. It keeps no state between calls. Module
//! descriptors and job trackers reach it through the [`ActiniaApi`] trait so
//! they can be driven by a scripted implementation in tests.

use async_trait::async_trait;
use serde_json::Value;

use crate::chain::ProcessChain;
use crate::config::ClientConfig;
use crate::error::{ActiniaError, Result, TransportError};
use crate::transport::Transport;

/// The raw parameter records of one module, before decoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleDetailRecord {
    pub parameters: Vec<Value>,
    pub returns: Vec<Value>,
}

/// The calls the process-chain core depends on.
#[async_trait]
pub trait ActiniaApi: Send + Sync {
    /// Fetch both the input and output parameter records of a module in one round trip.
    async fn fetch_module_detail(&self, module: &str) -> Result<ModuleDetailRecord>;

    /// Submit a process chain and return the URL to poll for its status.
    async fn post_chain(
        &self,
        location: &str,
        mapset: &str,
        chain: &ProcessChain,
    ) -> Result<String>;

    /// Fetch the current status text of a submitted job.
    async fn fetch_status(&self, status_url: &str) -> Result<String>;
}

/// A processing module as listed by the service, without its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    pub id: String,
    pub description: String,
}

pub struct Api<T> {
    pub(crate) config: ClientConfig,
    pub(crate) transport: T,
}

impl<T: Transport> Api<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get(&self, path: &str) -> Result<Value, TransportError> {
        self.transport.get(&self.config.endpoint(path)).await
    }

    pub async fn list_locations(&self) -> Result<Vec<String>> {
        let op = "get locations";
        let node = self
            .get("locations")
            .await
            .map_err(|e| ActiniaError::remote(op, "locations", e))?;
        require_success(&node).map_err(|e| ActiniaError::remote(op, "locations", e))?;
        // Newer releases renamed locations to projects.
        let list = node
            .get("locations")
            .or_else(|| node.get("projects"))
            .ok_or_else(|| shape("location list was missing"))
            .and_then(string_list)
            .map_err(|e| ActiniaError::remote(op, "locations", e))?;
        Ok(list)
    }

    pub async fn list_mapsets(&self, location: &str) -> Result<Vec<String>> {
        self.process_results(
            "get mapsets",
            location,
            &format!("locations/{}/mapsets", location),
        )
        .await
    }

    pub async fn list_raster_layers(&self, location: &str, mapset: &str) -> Result<Vec<String>> {
        self.process_results(
            "get raster layers",
            &format!("{}/{}", location, mapset),
            &format!("locations/{}/mapsets/{}/raster_layers", location, mapset),
        )
        .await
    }

    pub async fn list_strds(&self, location: &str, mapset: &str) -> Result<Vec<String>> {
        self.process_results(
            "get space time raster datasets",
            &format!("{}/{}", location, mapset),
            &format!("locations/{}/mapsets/{}/strds", location, mapset),
        )
        .await
    }

    pub async fn list_modules(&self) -> Result<Vec<ModuleSummary>> {
        let op = "get modules";
        let node = self
            .get("modules")
            .await
            .map_err(|e| ActiniaError::remote(op, "modules", e))?;
        require_success(&node).map_err(|e| ActiniaError::remote(op, "modules", e))?;
        let processes = node
            .get("processes")
            .and_then(Value::as_array)
            .ok_or_else(|| shape("'processes' was not a list"))
            .map_err(|e| ActiniaError::remote(op, "modules", e))?;

        processes
            .iter()
            .map(|p| -> Result<ModuleSummary> {
                let id = p
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ActiniaError::malformed("module", "missing string 'id'"))?;
                let description = p
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Ok(ModuleSummary {
                    id: id.to_string(),
                    description: description.to_string(),
                })
            })
            .collect()
    }

    async fn process_results(
        &self,
        op: &'static str,
        target: &str,
        path: &str,
    ) -> Result<Vec<String>> {
        self.get(path)
            .await
            .and_then(|node| {
                node.get("process_results")
                    .ok_or_else(|| shape("'process_results' was missing"))
                    .and_then(string_list)
            })
            .map_err(|e| ActiniaError::remote(op, target, e))
    }
}

#[async_trait]
impl<T: Transport> ActiniaApi for Api<T> {
    async fn fetch_module_detail(&self, module: &str) -> Result<ModuleDetailRecord> {
        let op = "update module details";
        let node = self
            .get(&format!("modules/{}", module))
            .await
            .map_err(|e| ActiniaError::remote(op, module, e))?;
        let parameters =
            record_list(&node, "parameters").map_err(|e| ActiniaError::remote(op, module, e))?;
        let returns =
            record_list(&node, "returns").map_err(|e| ActiniaError::remote(op, module, e))?;
        Ok(ModuleDetailRecord { parameters, returns })
    }

    async fn post_chain(
        &self,
        location: &str,
        mapset: &str,
        chain: &ProcessChain,
    ) -> Result<String> {
        let op = "run process chain";
        let target = format!("location {} and mapset {}", location, mapset);
        let url = self
            .config
            .endpoint(&format!("locations/{}/mapsets/{}/processing", location, mapset));
        let body = serde_json::to_value(chain)
            .map_err(|e| ActiniaError::remote(op, target.as_str(), e.into()))?;

        log::debug!("Submitting process chain of {} steps to {}", chain.len(), url);
        let node = self
            .transport
            .post_json(&url, &body)
            .await
            .map_err(|e| ActiniaError::remote(op, target.as_str(), e))?;

        node.get("urls")
            .and_then(|urls| urls.get("status"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ActiniaError::remote(op, target, shape("missing 'urls.status'")))
    }

    async fn fetch_status(&self, status_url: &str) -> Result<String> {
        let op = "fetch process status";
        let node = self
            .transport
            .get(status_url)
            .await
            .map_err(|e| ActiniaError::remote(op, status_url, e))?;
        node.get("status")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ActiniaError::remote(op, status_url, shape("missing 'status'")))
    }
}

fn shape(msg: &str) -> TransportError {
    TransportError::UnexpectedShape(msg.to_string())
}

fn require_success(node: &Value) -> Result<(), TransportError> {
    match node.get("status").and_then(Value::as_str) {
        Some("success") => Ok(()),
        Some(other) => Err(shape(&format!("request was unsuccessful: status '{}'", other))),
        None => Err(shape("missing 'status'")),
    }
}

fn string_list(node: &Value) -> Result<Vec<String>, TransportError> {
    let items = node.as_array().ok_or_else(|| shape("expected a list"))?;
    Ok(items
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect())
}

/// The field must be present and an array; an empty array is fine.
fn record_list(node: &Value, field: &str) -> Result<Vec<Value>, TransportError> {
    match node.get(field) {
        Some(Value::Array(items)) => Ok(items.clone()),
        None | Some(Value::Null) => Err(shape(&format!("'{}' was missing", field))),
        Some(_) => Err(shape(&format!("'{}' was not a list", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers GETs from a url → body table and records POSTs.
    #[derive(Default)]
    struct TableTransport {
        responses: HashMap<String, Value>,
        posted: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl Transport for TableTransport {
        async fn get(&self, url: &str) -> Result<Value, TransportError> {
            self.responses.get(url).cloned().ok_or(TransportError::Status {
                code: 404,
                body: url.to_string(),
            })
        }

        async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
            self.posted.lock().unwrap().push((url.to_string(), body.clone()));
            self.get(url).await
        }
    }

    fn api(responses: Vec<(&str, Value)>) -> Api<TableTransport> {
        let transport = TableTransport {
            responses: responses
                .into_iter()
                .map(|(k, v)| (format!("http://h/latest/{}", k), v))
                .collect(),
            ..Default::default()
        };
        Api::new(ClientConfig::new("http://h"), transport)
    }

    #[tokio::test]
    async fn test_list_locations_accepts_both_field_names() {
        let a = api(vec![("locations", json!({"status": "success", "locations": ["nc_spm_08"]}))]);
        assert_eq!(a.list_locations().await.unwrap(), vec!["nc_spm_08"]);

        let b = api(vec![("locations", json!({"status": "success", "projects": ["ECAD"]}))]);
        assert_eq!(b.list_locations().await.unwrap(), vec!["ECAD"]);
    }

    #[tokio::test]
    async fn test_unsuccessful_listing_is_remote_unavailable() {
        let a = api(vec![("modules", json!({"status": "error", "processes": []}))]);
        let err = a.list_modules().await.unwrap_err();
        assert!(err.is_remote_unavailable());
    }

    #[tokio::test]
    async fn test_module_detail_empty_returns() {
        let a = api(vec![(
            "modules/g.region",
            json!({"id": "g.region", "parameters": [{"name": "raster"}], "returns": []}),
        )]);
        let detail = a.fetch_module_detail("g.region").await.unwrap();
        assert_eq!(detail.parameters.len(), 1);
        assert!(detail.returns.is_empty());
    }

    #[tokio::test]
    async fn test_module_detail_without_lists_is_remote_unavailable() {
        let a = api(vec![
            ("modules/r.slope.aspect", json!({"status": "error", "message": "boom"})),
            ("modules/g.region", json!({"id": "g.region", "parameters": []})),
            ("modules/i.vi", json!({"id": "i.vi", "parameters": null, "returns": []})),
        ]);
        for module in ["r.slope.aspect", "g.region", "i.vi"] {
            let err = a.fetch_module_detail(module).await.unwrap_err();
            assert!(err.is_remote_unavailable(), "{}: {}", module, err);
            assert!(err.to_string().contains(module));
        }
    }

    #[tokio::test]
    async fn test_post_chain_extracts_status_url() {
        let a = api(vec![(
            "locations/nc/mapsets/user1/processing",
            json!({"status": "accepted", "urls": {"status": "http://h/status/u/r1"}}),
        )]);
        let chain = ProcessChain::build::<crate::module::ModuleSignature>(&[], &[]).unwrap();
        let url = a.post_chain("nc", "user1", &chain).await.unwrap();
        assert_eq!(url, "http://h/status/u/r1");

        let posted = a.transport.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].1, json!({"version": "1", "list": []}));
    }

    #[tokio::test]
    async fn test_post_chain_without_urls_is_remote_unavailable() {
        let a = api(vec![(
            "locations/nc/mapsets/user1/processing",
            json!({"status": "accepted"}),
        )]);
        let chain = ProcessChain::build::<crate::module::ModuleSignature>(&[], &[]).unwrap();
        let err = a.post_chain("nc", "user1", &chain).await.unwrap_err();
        assert!(err.is_remote_unavailable());
        assert!(err.to_string().contains("location nc and mapset user1"));
    }

    #[tokio::test]
    async fn test_raster_layers_read_process_results() {
        let a = api(vec![(
            "locations/nc/mapsets/PERMANENT/raster_layers",
            json!({"status": "finished", "process_results": ["elevation", "aspect"]}),
        )]);
        assert_eq!(
            a.list_raster_layers("nc", "PERMANENT").await.unwrap(),
            vec!["elevation", "aspect"]
        );
    }
}

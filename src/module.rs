//! Module descriptors and their lazily fetched parameter lists

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::api::{ActiniaApi, ModuleDetailRecord};
use crate::error::{ActiniaError, Result};
use crate::parameter::Parameter;

/// A module name together with its fully known inputs and outputs.
///
/// This is what the chain builder consumes; it never touches the network.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSignature {
    pub name: String,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
}

impl ModuleSignature {
    pub fn new(name: impl Into<String>, inputs: Vec<Parameter>, outputs: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
        }
    }

    fn decode(name: &str, record: &ModuleDetailRecord) -> Result<Self> {
        let decode_all = |records: &[serde_json::Value]| {
            records
                .iter()
                .map(Parameter::from_record)
                .collect::<Result<Vec<_>>>()
        };
        let inputs = decode_all(&record.parameters).map_err(|e| in_module(e, name))?;
        let outputs = decode_all(&record.returns).map_err(|e| in_module(e, name))?;
        // Names are unique per list; one name may still be both input and output.
        unique_names(&inputs, "input", name)?;
        unique_names(&outputs, "output", name)?;
        Ok(Self::new(name, inputs, outputs))
    }
}

fn unique_names(params: &[Parameter], kind: &str, module: &str) -> Result<()> {
    let mut seen = HashSet::new();
    match params.iter().find(|p| !seen.insert(p.name())) {
        Some(dup) => Err(ActiniaError::malformed(
            format!("{} parameter '{}' of module '{}'", kind, dup.name(), module),
            "declared more than once",
        )),
        None => Ok(()),
    }
}

/// Population state of one parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Population {
    /// Not fetched yet; the next accessor call fetches.
    Unpopulated,
    /// Fetched, and the module declares none of this kind.
    Empty,
    /// Fetched, holding this many parameters.
    Populated(usize),
}

impl Population {
    fn of(list: Option<&[Parameter]>) -> Self {
        match list {
            None => Population::Unpopulated,
            Some([]) => Population::Empty,
            Some(params) => Population::Populated(params.len()),
        }
    }
}

/// A named remote operation.
///
/// The parameter lists are fetched on first access with a single module detail
/// request that fills inputs and outputs together. The first successful fetch
/// is kept for the lifetime of the descriptor. A failed fetch leaves it
/// unpopulated so a later call retries.
pub struct Module {
    name: String,
    description: String,
    source: Option<Arc<dyn ActiniaApi>>,
    signature: OnceCell<ModuleSignature>,
}

impl Module {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        source: Arc<dyn ActiniaApi>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            source: Some(source),
            signature: OnceCell::new(),
        }
    }

    /// A descriptor whose parameters are already known; it never fetches.
    pub fn with_parameters(
        name: impl Into<String>,
        description: impl Into<String>,
        inputs: Vec<Parameter>,
        outputs: Vec<Parameter>,
    ) -> Self {
        let name = name.into();
        Self {
            signature: OnceCell::from(ModuleSignature::new(name.clone(), inputs, outputs)),
            name,
            description: description.into(),
            source: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub async fn input_parameters(&self) -> Result<&[Parameter]> {
        Ok(&self.signature().await?.inputs)
    }

    pub async fn output_parameters(&self) -> Result<&[Parameter]> {
        Ok(&self.signature().await?.outputs)
    }

    /// The populated signature, fetching it if this is the first access.
    pub async fn signature(&self) -> Result<&ModuleSignature> {
        self.signature
            .get_or_try_init(|| async {
                let source = self.source.as_ref().ok_or_else(|| {
                    ActiniaError::malformed(
                        format!("module '{}'", self.name),
                        "no parameters and no service to fetch them from",
                    )
                })?;
                log::debug!("Fetching parameter details for module {}", self.name);
                let record = source.fetch_module_detail(&self.name).await?;
                ModuleSignature::decode(&self.name, &record)
            })
            .await
    }

    pub fn input_population(&self) -> Population {
        Population::of(self.signature.get().map(|s| s.inputs.as_slice()))
    }

    pub fn output_population(&self) -> Population {
        Population::of(self.signature.get().map(|s| s.outputs.as_slice()))
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("inputs", &self.input_population())
            .field("outputs", &self.output_population())
            .finish()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn in_module(err: ActiniaError, module: &str) -> ActiniaError {
    match err {
        ActiniaError::MalformedDescriptor { record, reason } => ActiniaError::MalformedDescriptor {
            record: format!("{} of module '{}'", record, module),
            reason,
        },
        other => other,
    }
}

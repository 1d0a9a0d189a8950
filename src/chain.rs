//! Process chain documents
//!
//! A process chain is the body of a processing request: an ordered list of
//! module invocations, each carrying the parameter values that apply to it.
//!
//! ```json
//! {"version": "1",
//!  "list": [{"module": "g.region", "id": "g.region",
//!            "inputs": [{"param": "raster", "value": "elevation@PERMANENT"}]}]}
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ActiniaError, Result};
use crate::module::ModuleSignature;
use crate::parameter::Parameter;

/// Parameter values for one step, keyed by parameter name.
pub type ParameterMap = HashMap<String, String>;

pub const CHAIN_FORMAT_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBinding {
    pub param: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStep {
    pub module: String,
    pub id: String,
    pub inputs: Vec<ParameterBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessChain {
    pub version: String,
    pub list: Vec<ChainStep>,
}

impl ProcessChain {
    /// Builds the chain document for `modules`, binding the Nth parameter map to
    /// the Nth module.
    ///
    /// Pairing is purely positional: the caller must keep both slices in the
    /// same order, nothing checks that a map was meant for the module it lands
    /// on. For each step only declared parameters whose name appears in the map
    /// are bound, inputs first then outputs, each in declaration order. Keys
    /// that match no declared parameter are dropped; the service decides what
    /// is valid. A name declared as both input and output is bound twice.
    pub fn build<M: Borrow<ModuleSignature>>(
        modules: &[M],
        parameters: &[ParameterMap],
    ) -> Result<Self> {
        if modules.len() != parameters.len() {
            return Err(ActiniaError::ArityMismatch {
                modules: modules.len(),
                parameters: parameters.len(),
            });
        }

        let list = modules
            .iter()
            .zip(parameters)
            .map(|(module, values)| {
                let module = module.borrow();
                ChainStep {
                    module: module.name.clone(),
                    id: module.name.clone(),
                    inputs: bindings(&module.inputs, values)
                        .chain(bindings(&module.outputs, values))
                        .collect(),
                }
            })
            .collect();

        Ok(Self {
            version: CHAIN_FORMAT_VERSION.to_string(),
            list,
        })
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn steps(&self) -> &[ChainStep] {
        &self.list
    }
}

fn bindings<'a>(
    declared: &'a [Parameter],
    values: &'a ParameterMap,
) -> impl Iterator<Item = ParameterBinding> + 'a {
    declared.iter().filter_map(move |p| {
        values.get(p.name()).map(|value| ParameterBinding {
            param: p.name().to_string(),
            value: value.clone(),
        })
    })
}

//! Plugin factory handed to the host. The host creates one plugin per
//! channel and initializes each with its own capabilities.

use crate::config::{ConfigError, GateConfig};
use crate::ports::inbound::{EndorsementPlugin, EndorsementPluginFactory};
use crate::ports::outbound::DecisionService;
use crate::service::EndorsementGate;
use std::sync::Arc;

/// Creates uninitialized [`EndorsementGate`]s sharing one decision service.
pub struct ModelEndorsementFactory<D: DecisionService> {
    decision: Arc<D>,
    config: GateConfig,
}

impl<D: DecisionService + 'static> ModelEndorsementFactory<D> {
    /// Create a factory. `config` is validated once here.
    pub fn new(config: GateConfig, decision: D) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            decision: Arc::new(decision),
            config,
        })
    }

    /// The shared decision service.
    pub fn decision(&self) -> &Arc<D> {
        &self.decision
    }

    /// Create a gate with its concrete type, for hosts that want it.
    pub fn create_gate(&self) -> EndorsementGate<D> {
        // Config was validated in `new`, so construction cannot fail here.
        EndorsementGate::from_validated(self.config.clone(), Arc::clone(&self.decision))
    }
}

impl<D: DecisionService + 'static> EndorsementPluginFactory for ModelEndorsementFactory<D> {
    fn create(&self) -> Box<dyn EndorsementPlugin> {
        Box::new(self.create_gate())
    }
}

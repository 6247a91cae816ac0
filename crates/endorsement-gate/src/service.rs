//! # Endorsement Gate Service
//!
//! Application service implementing [`EndorsementPlugin`].
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`EndorsementPlugin`)
//! - Uses the outbound ports (`SigningIdentityFetcher` via the binder,
//!   `DecisionService`) for identity and evaluation
//! - Delegates binding and effect-set extraction to the domain layer
//!
//! A signature is produced before evaluation but only leaves the gate inside
//! an approved `Ok`. Every other path drops it.

use crate::config::{ConfigError, GateConfig};
use crate::domain::binder::IdentityBinder;
use crate::domain::effect_set::extract_effect_set;
use crate::domain::entities::Verdict;
use crate::domain::errors::EndorsementError;
use crate::ports::inbound::{Dependency, EndorsementPlugin};
use crate::ports::outbound::{DecisionError, DecisionService, SigningIdentityFetcher};
use async_trait::async_trait;
use shared_types::{Endorsement, SignedProposal};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// Endorsement gate: signs every outcome, releases the signature only on
/// an explicit approval from the decision service.
pub struct EndorsementGate<D: DecisionService> {
    binder: IdentityBinder,
    decision: Arc<D>,
    config: GateConfig,
}

impl<D: DecisionService> EndorsementGate<D> {
    /// Create an uninitialized gate around `decision`.
    ///
    /// # Errors
    /// Returns `ConfigError` if `config` fails validation.
    pub fn new(config: GateConfig, decision: D) -> Result<Self, ConfigError> {
        Self::with_shared_decision(config, Arc::new(decision))
    }

    /// Create an uninitialized gate sharing `decision` with other gates.
    pub fn with_shared_decision(config: GateConfig, decision: Arc<D>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config, decision))
    }

    pub(crate) fn from_validated(config: GateConfig, decision: Arc<D>) -> Self {
        Self {
            binder: IdentityBinder::new(),
            decision,
            config,
        }
    }

    /// Bind `fetcher` up front instead of waiting for `initialize`.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn SigningIdentityFetcher>) -> Self {
        self.binder = IdentityBinder::with_fetcher(fetcher);
        self
    }

    /// The gate's identity binder.
    pub fn binder(&self) -> &IdentityBinder {
        &self.binder
    }

    /// The gate's configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    async fn evaluate(&self, effect_set_json: Vec<u8>) -> Result<Verdict, EndorsementError> {
        let call = self.decision.evaluate(effect_set_json);
        let result = match self.config.evaluation_timeout {
            Some(deadline) => tokio::time::timeout(deadline, call)
                .await
                .unwrap_or_else(|_| Err(DecisionError::Timeout(deadline))),
            None => call.await,
        };
        result.map_err(EndorsementError::EvaluationTransport)
    }

    async fn run(
        &self,
        outcome: &[u8],
        proposal: &SignedProposal,
    ) -> Result<Endorsement, EndorsementError> {
        // 1. Identity
        let signer = self.binder.resolve_signer(proposal)?;

        // 2. Signature (held until approval)
        let bound = self.binder.bind(outcome, signer.as_ref())?;

        // 3. Effect set
        if outcome.len() > self.config.max_outcome_bytes {
            return Err(EndorsementError::OutcomeTooLarge {
                size: outcome.len(),
                limit: self.config.max_outcome_bytes,
            });
        }
        let effect_set = extract_effect_set(outcome).map_err(EndorsementError::Decode)?;
        debug!(summary = %effect_set.summary(), "[endorse] Effect set extracted");
        let effect_set_json = effect_set
            .to_canonical_json()
            .map_err(|e| EndorsementError::EffectSetEncoding(e.to_string()))?;

        // 4. Evaluation
        let verdict = self.evaluate(effect_set_json).await?;
        if !verdict.approved {
            return Err(EndorsementError::EvaluationRejected {
                reason: verdict.reason,
            });
        }

        Ok(bound.into_endorsement())
    }
}

#[async_trait]
impl<D: DecisionService> EndorsementPlugin for EndorsementGate<D> {
    fn initialize(&self, dependencies: Vec<Dependency>) -> Result<(), EndorsementError> {
        self.binder.initialize(dependencies)?;
        info!("[endorse] Gate initialized");
        Ok(())
    }

    async fn endorse(
        &self,
        outcome: Vec<u8>,
        proposal: &SignedProposal,
    ) -> Result<(Endorsement, Vec<u8>), EndorsementError> {
        let span = info_span!("endorse", outcome_bytes = outcome.len());
        async move {
            match self.run(&outcome, proposal).await {
                Ok(endorsement) => {
                    info!(
                        signature = %endorsement.signature_prefix(),
                        "[endorse] Outcome endorsed"
                    );
                    Ok((endorsement, outcome))
                }
                Err(err) => {
                    warn!(stage = %err.stage(), "[endorse] Endorsement withheld: {}", err);
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

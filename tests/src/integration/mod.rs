//! Cross-component flows: keystore → gate → HTTP decision service.

#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod endorsement_flow;

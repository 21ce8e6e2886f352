use crate::capability::CapabilityProvider;
use crate::decision::{compute_decision, LoadingDecision};
use crate::profile::compute_profile;

/// Memoised policy evaluation keyed on the mobile flag.
///
/// Motion preference and network type are sampled only when the flag changes, so a decision can
/// lag behind a network change until the next mobile/desktop transition.
#[derive(Debug, Default)]
pub struct AdaptiveLoading {
    cached: Option<(bool, LoadingDecision)>,
}

impl AdaptiveLoading {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate<P>(&mut self, is_mobile: bool, capabilities: &P) -> LoadingDecision
    where
        P: CapabilityProvider + ?Sized,
    {
        match self.cached {
            Some((cached_mobile, decision)) if cached_mobile == is_mobile => decision,
            _ => {
                let decision = compute_decision(&compute_profile(is_mobile, capabilities));
                log::debug!(
                    "loading decision recomputed: mobile={} quality={}",
                    is_mobile,
                    decision.image_quality
                );
                self.cached = Some((is_mobile, decision));
                decision
            }
        }
    }

    pub fn current(&self) -> Option<LoadingDecision> {
        self.cached.map(|(_, decision)| decision)
    }
}

use crate::decision::{ConnectionType, LoadingDecision};

/// Per-element loading flags derived from a [`LoadingDecision`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConditionalLoading {
    pub should_preload: bool,
    pub should_lazy_load: bool,
    pub should_reduce_quality: bool,
}

impl ConditionalLoading {
    pub fn from_decision(decision: &LoadingDecision) -> Self {
        let slow = decision.connection_type == ConnectionType::Slow;
        Self {
            should_preload: decision.preload_images && !slow,
            should_lazy_load: !decision.preload_images || slow,
            should_reduce_quality: slow,
        }
    }
}

impl From<&LoadingDecision> for ConditionalLoading {
    fn from(decision: &LoadingDecision) -> Self {
        Self::from_decision(decision)
    }
}

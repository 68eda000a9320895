//! Annotation of variants against all overlapping transcripts.

use std::sync::Arc;

use rayon::prelude::*;

use crate::models::index::GeneModelsIndex;

use super::{
    config::EngineConfig,
    csq::EffectClassifier,
    effect::Effect,
    reference::SequenceAccessor,
    variant::VariantDescriptor,
};

/// Annotates variants using a shared genome and gene models.
///
/// The aggregator is read-only after construction and can be used from many threads.
#[derive(Debug)]
pub struct EffectAggregator<G>
where
    G: SequenceAccessor + ?Sized,
{
    genome: Arc<G>,
    models: Arc<GeneModelsIndex>,
    config: EngineConfig,
}

impl<G> EffectAggregator<G>
where
    G: SequenceAccessor + ?Sized,
{
    pub fn new(genome: Arc<G>, models: Arc<GeneModelsIndex>, config: EngineConfig) -> Self {
        Self {
            genome,
            models,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn models(&self) -> &GeneModelsIndex {
        &self.models
    }

    pub fn genome(&self) -> &G {
        self.genome.as_ref()
    }

    /// Annotate one variant with its effect on all transcripts it touches.
    ///
    /// Transcripts whose classification fails are logged and reported in
    /// `Effect::failed_transcripts`; they do not fail the whole annotation.
    pub fn annotate(&self, var: &VariantDescriptor) -> Effect {
        let classifier = EffectClassifier::new(self.genome.as_ref(), &self.config);

        // Widen the query so that promoters on both strands are found.
        let (start, end) = var.affected_range();
        let padding = self.config.promoter_length;
        let txs = self.models.overlapping(
            var.chromosome(),
            start.saturating_sub(padding).max(1),
            end.saturating_add(padding),
        );

        let mut records = Vec::new();
        let mut failed_transcripts = Vec::new();
        for tx in txs {
            match classifier.classify(var, tx) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => (),
                Err(e) => {
                    tracing::warn!("Problem annotating {:?}: {}", var, e);
                    failed_transcripts.push(tx.transcript_id().to_string());
                }
            }
        }

        let effect = Effect::from_records(records, failed_transcripts);
        tracing::trace!("{:?} => {}", var, effect.effect_details());
        effect
    }

    /// Annotate many variants in parallel, keeping the input order.
    pub fn annotate_batch(&self, vars: &[VariantDescriptor]) -> Vec<Effect> {
        vars.par_iter().map(|var| self.annotate(var)).collect()
    }
}

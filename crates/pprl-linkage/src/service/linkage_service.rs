//! Linkage Service
//!
//! Runs the experiment for each characteristic subset S against the base
//! pool B:
//!
//! 1. Pool = shuffle(S ∪ B)
//! 2. Self pass: a fresh hardener hardens every record of S
//! 3. Pool pass: a second hardener hardens every pool member
//! 4. Every query of S is compared against every pool member, originals
//!    against originals and self-hardened against pool-hardened
//! 5. Maximal candidates (ties kept) are classified as 1-1/1-n, correct/wrong

use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::{debug, info, Level};

use crate::domain::{
    effective_hash_count, expected_false_positive_rate, mean_qgram_set_length,
    optimal_hash_count, BitVector, BlipHardener, ComparisonPool, Dataset, DiceScore,
    LinkageConfig, LinkageReport, Outcome, RandomHashingEncoder, Record, SubsetLabel,
    SubsetOutcome,
};
use crate::error::LinkageError;
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::LinkageApi;

/// Matches shown per diagnostic query
const DIAGNOSTIC_TOP_MATCHES: usize = 5;

/// Generator streams of one subset
#[derive(Clone, Copy, Debug)]
enum Pass {
    Shuffle = 0,
    SelfHardening = 1,
    PoolHardening = 2,
}

const PASSES_PER_SUBSET: u64 = 3;

/// Linkage service implementation
///
/// Implements the `LinkageApi` port.
pub struct LinkageService<M: MetricsRecorder = NoOpMetrics> {
    config: LinkageConfig,
    metrics: Arc<M>,
}

impl LinkageService<NoOpMetrics> {
    /// Create a service without metrics
    pub fn new(config: LinkageConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(NoOpMetrics),
        }
    }
}

impl<M: MetricsRecorder> LinkageService<M> {
    /// Create a service recording into `metrics`
    pub fn with_metrics(config: LinkageConfig, metrics: Arc<M>) -> Self {
        Self { config, metrics }
    }

    pub fn config(&self) -> &LinkageConfig {
        &self.config
    }

    fn stream(label: SubsetLabel, pass: Pass) -> u64 {
        label.index() as u64 * PASSES_PER_SUBSET + pass as u64
    }

    fn shuffle_rng(&self, label: SubsetLabel) -> ChaCha20Rng {
        match self.config.seed {
            Some(seed) => {
                let mut rng = ChaCha20Rng::seed_from_u64(seed);
                rng.set_stream(Self::stream(label, Pass::Shuffle));
                rng
            }
            None => ChaCha20Rng::from_entropy(),
        }
    }

    fn hardener(&self, label: SubsetLabel, pass: Pass) -> Result<BlipHardener, LinkageError> {
        let method = self.config.selection_method;
        let p = self.config.flip_probability;
        match self.config.seed {
            Some(seed) => BlipHardener::with_seed(method, p, seed, Self::stream(label, pass)),
            None => BlipHardener::new(method, p),
        }
    }

    /// Self pass: harden every query within its own subset
    fn harden_queries(
        &self,
        label: SubsetLabel,
        subset: &[Record],
    ) -> Result<Vec<Record>, LinkageError> {
        let start = Instant::now();
        let mut hardener = self.hardener(label, Pass::SelfHardening)?;
        let queries = subset
            .iter()
            .map(|record| {
                let hardened = record.harden_with(&mut hardener)?;
                hardened.require_complete()?;
                Ok(hardened)
            })
            .collect::<Result<Vec<_>, LinkageError>>()?;
        self.metrics.record_hardened(queries.len(), start.elapsed());
        Ok(queries)
    }

    /// Pool pass: merge, shuffle and harden the candidates
    fn build_pool<'a>(
        &self,
        label: SubsetLabel,
        subset: &'a [Record],
        base: &'a [Record],
    ) -> Result<ComparisonPool<'a>, LinkageError> {
        let start = Instant::now();
        let mut shuffle_rng = self.shuffle_rng(label);
        let mut hardener = self.hardener(label, Pass::PoolHardening)?;
        let pool = ComparisonPool::build(label, subset, base, &mut shuffle_rng, &mut hardener)?;
        if let Some(expected) = self.config.expected_pool_size() {
            pool.expect_size(expected)?;
        }
        self.metrics.record_hardened(pool.len(), start.elapsed());
        Ok(pool)
    }

    fn log_diagnostics(
        &self,
        queries: &[Record],
        pool: &ComparisonPool<'_>,
        candidates: &[Candidate<'_>],
    ) {
        for query in queries.iter().take(self.config.diagnostic_queries) {
            let (Ok(original), Ok(hardened)) = (query.original(), query.hardened()) else {
                continue;
            };
            let query_vectors = QueryVectors::new(original, hardened);

            let mut scored: Vec<(DiceScore, usize)> = candidates
                .iter()
                .enumerate()
                .map(|(index, candidate)| (query_vectors.original_score(candidate), index))
                .collect();
            scored.sort_by(|a, b| b.0.cmp(&a.0));

            debug!(
                id = query.id(),
                qgrams = query.qgrams().len(),
                original_ones = query_vectors.original_ones,
                hardened_ones = query_vectors.hardened_ones,
                "Diagnostic query"
            );
            for (rank, (score, index)) in scored.iter().take(DIAGNOSTIC_TOP_MATCHES).enumerate() {
                let member = &pool.members()[*index];
                debug!(
                    rank = rank + 1,
                    candidate = member.record.id(),
                    common_qgrams = query.qgrams().common_count(member.record.qgrams()),
                    original_dice = score.value(),
                    hardened_dice = query_vectors.hardened_score(&candidates[*index]).value(),
                    "Top match"
                );
            }
        }
    }
}

/// A pool member's vectors with their popcounts
struct Candidate<'a> {
    original: &'a BitVector,
    original_ones: usize,
    hardened: &'a BitVector,
    hardened_ones: usize,
}

/// A query's vectors with their popcounts
struct QueryVectors<'a> {
    original: &'a BitVector,
    original_ones: usize,
    hardened: &'a BitVector,
    hardened_ones: usize,
}

impl<'a> QueryVectors<'a> {
    fn new(original: &'a BitVector, hardened: &'a BitVector) -> Self {
        Self {
            original,
            original_ones: original.count_ones(),
            hardened,
            hardened_ones: hardened.count_ones(),
        }
    }

    fn original_score(&self, candidate: &Candidate<'_>) -> DiceScore {
        DiceScore::from_counts(
            self.original.and_count_ones(candidate.original),
            self.original_ones,
            candidate.original_ones,
        )
    }

    fn hardened_score(&self, candidate: &Candidate<'_>) -> DiceScore {
        DiceScore::from_counts(
            self.hardened.and_count_ones(candidate.hardened),
            self.hardened_ones,
            candidate.hardened_ones,
        )
    }
}

/// Maximum score and every candidate attaining it
#[derive(Default)]
struct MaximalSet {
    best: Option<DiceScore>,
    indices: Vec<usize>,
}

impl MaximalSet {
    fn offer(&mut self, index: usize, score: DiceScore) {
        match self.best {
            Some(best) if score < best => {}
            Some(best) if score == best => self.indices.push(index),
            _ => {
                self.best = Some(score);
                self.indices.clear();
                self.indices.push(index);
            }
        }
    }
}

/// Classify one query under both variants
fn classify_query(
    query: &Record,
    query_position: usize,
    candidates: &[Candidate<'_>],
) -> Result<(Outcome, Outcome), LinkageError> {
    let vectors = QueryVectors::new(query.original()?, query.hardened()?);

    let mut original = MaximalSet::default();
    let mut hardened = MaximalSet::default();
    for (index, candidate) in candidates.iter().enumerate() {
        original.offer(index, vectors.original_score(candidate));
        hardened.offer(index, vectors.hardened_score(candidate));
    }

    Ok((
        Outcome::classify(&query_position, &original.indices),
        Outcome::classify(&query_position, &hardened.indices),
    ))
}

impl<M: MetricsRecorder> LinkageApi for LinkageService<M> {
    fn prepare_encoder(&self, dataset: &Dataset) -> Result<RandomHashingEncoder, LinkageError> {
        let filter_len = self.config.filter_len;
        let mean_len = mean_qgram_set_length(dataset.qgram_sets())?;
        let k_opt = optimal_hash_count(mean_len, filter_len)?;
        let k = effective_hash_count(k_opt, self.config.hash_count_ratio)?;

        info!(
            filter_len,
            mean_qgram_set_length = mean_len,
            k_opt,
            k,
            hash = %self.config.hash_function,
            expected_fpr = expected_false_positive_rate(filter_len, mean_len, k),
            "Derived encoding parameters"
        );

        RandomHashingEncoder::new(self.config.hash_function, filter_len, k)
    }

    fn encode(&self, dataset: &mut Dataset, encoder: &RandomHashingEncoder) {
        let start = Instant::now();
        dataset.encode_all(encoder);
        let elapsed = start.elapsed();
        self.metrics.record_encoded(dataset.len(), elapsed);
        info!(
            records = dataset.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Encoded dataset"
        );
    }

    fn link_subset(
        &self,
        dataset: &Dataset,
        label: SubsetLabel,
    ) -> Result<SubsetOutcome, LinkageError> {
        if label.is_base() {
            return Err(LinkageError::InvalidParameter(
                "the base pool is not linked against itself".to_string(),
            ));
        }
        let subset = dataset.subset(label)?;
        let base = dataset.subset(SubsetLabel::Base)?;

        info!(
            subset = %label,
            description = label.description(),
            queries = subset.len(),
            base = base.len(),
            "Linking subset"
        );

        let queries = self.harden_queries(label, subset)?;
        let pool = self.build_pool(label, subset, base)?;

        let candidates: Vec<Candidate<'_>> = pool
            .members()
            .iter()
            .map(|member| Candidate {
                original: member.original,
                original_ones: member.original.count_ones(),
                hardened: &member.hardened,
                hardened_ones: member.hardened.count_ones(),
            })
            .collect();

        let start = Instant::now();
        let outcome = queries
            .par_iter()
            .map(|query| {
                let position = pool.position_of(query.id()).ok_or_else(|| {
                    LinkageError::MissingField {
                        record: query.id().to_string(),
                        field: "comparison pool entry",
                    }
                })?;
                classify_query(query, position, &candidates)
            })
            .try_fold(SubsetOutcome::default, |mut acc, result| {
                let (original, hardened) = result?;
                acc.original.record(original);
                acc.hardened.record(hardened);
                Ok::<_, LinkageError>(acc)
            })
            .try_reduce(SubsetOutcome::default, |mut a, b| {
                a.merge(&b);
                Ok(a)
            })?;
        let elapsed = start.elapsed();

        outcome.verify_total(label, queries.len() as u64)?;

        let comparisons = 2 * queries.len() as u64 * pool.len() as u64;
        self.metrics.record_subset_linked(comparisons, elapsed);

        if self.config.diagnostic_queries > 0 && tracing::enabled!(Level::DEBUG) {
            self.log_diagnostics(&queries, &pool, &candidates);
        }

        info!(
            subset = %label,
            original_1_1_correct = outcome.original.one_to_one_correct,
            hardened_1_1_correct = outcome.hardened.one_to_one_correct,
            elapsed_ms = elapsed.as_millis() as u64,
            "Subset linked"
        );

        Ok(outcome)
    }

    fn run(&self, mut dataset: Dataset) -> Result<LinkageReport, LinkageError> {
        dataset.validate(self.config.expected_total())?;
        info!(
            records = dataset.len(),
            distinct_ids = dataset.distinct_ids(),
            method = %self.config.selection_method,
            flip_probability = self.config.flip_probability,
            "Starting linkage run"
        );

        let encoder = self.prepare_encoder(&dataset)?;
        self.encode(&mut dataset, &encoder);

        let mut report = LinkageReport::new();
        for label in SubsetLabel::characteristic() {
            let outcome = self.link_subset(&dataset, label)?;
            report.insert(label, outcome);
        }

        info!(subsets = report.len(), "Linkage run complete");
        Ok(report)
    }
}

use super::flow::analyze_flow;
use super::physics::{analyze_pair, skipgram_metric};
use super::types::{AnalysisResult, Metric, MetricKind, NgramDetail, UsageStats};
use super::Analyser;
use crate::corpus::Bigram;
use crate::layout::Layout;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/// Percentage with a zero denominator defined as 0 rather than NaN.
#[inline(always)]
pub fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn has_space(chars: &[char]) -> bool {
    chars.iter().any(|c| c.is_whitespace())
}

/// Full single-pass classification of the corpus against a layout.
pub fn analyse(analyser: &Analyser, layout: &Layout) -> AnalysisResult {
    let corpus = analyser.corpus.as_ref();
    let exclude_space = analyser.options.exclude_space;
    let keys = layout.key_map();

    let mut counts: BTreeMap<Metric, u64> = Metric::iter().map(|m| (m, 0)).collect();
    let mut raw_details: BTreeMap<Metric, Vec<(String, u64, f64)>> = Metric::iter()
        .filter(|m| m.has_details())
        .map(|m| (m, Vec::new()))
        .collect();

    let mut res = AnalysisResult {
        layout_name: layout.name.clone(),
        corpus_name: corpus.name.clone(),
        ..Default::default()
    };

    // 1. Characters
    let mut usage_counts = UsageStats::default();
    for (&c, &n) in &corpus.unigrams {
        match keys.get(&c) {
            Some(k) => {
                usage_counts.hands[k.hand.index()] += n as f64;
                usage_counts.fingers[k.finger as usize] += n as f64;
                usage_counts.rows[k.pos.row as usize] += n as f64;
            }
            None => res.unsupported.push((c, n)),
        }
    }
    res.usage = scale_usage(usage_counts, corpus.total_unigrams);
    res.unsupported
        .sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    // 2. Bigrams
    for (bigram, &n) in &corpus.bigrams {
        if exclude_space && has_space(bigram) {
            continue;
        }
        let (Some(k1), Some(k2)) = (keys.get(&bigram[0]), keys.get(&bigram[1])) else {
            res.unsupported_bigrams += n;
            continue;
        };
        let m = analyze_pair(k1, k2);
        if !m.is_same_hand {
            continue;
        }
        let mut dist = None;
        for metric in m.matches() {
            *counts.entry(metric).or_default() += n;
            let d = *dist.get_or_insert_with(|| layout.distance(k1.pos, k2.pos));
            if let Some(list) = raw_details.get_mut(&metric) {
                list.push((bigram.iter().collect(), n, d));
            }
        }
    }

    // 3. Trigrams: skipgrams on the outer pair, flow on all three keys
    for (trigram, &n) in &corpus.trigrams {
        let (Some(k1), Some(k3)) = (keys.get(&trigram[0]), keys.get(&trigram[2])) else {
            res.unsupported_trigrams += n;
            continue;
        };

        if !(exclude_space && has_space(trigram)) {
            let m = analyze_pair(k1, k3);
            if m.is_same_hand {
                let mut dist = None;
                for metric in m.matches().map(skipgram_metric) {
                    *counts.entry(metric).or_default() += n;
                    let d = *dist.get_or_insert_with(|| layout.distance(k1.pos, k3.pos));
                    if let Some(list) = raw_details.get_mut(&metric) {
                        list.push((trigram.iter().collect(), n, d));
                    }
                }
            }
        }

        let Some(k2) = keys.get(&trigram[1]) else {
            res.unsupported_trigrams += n;
            continue;
        };
        if let Some(metric) = analyze_flow(k1, k2, k3).metric() {
            *counts.entry(metric).or_default() += n;
        }
    }

    // 4. Normalise
    let (bigram_total, skipgram_total) = if exclude_space {
        (corpus.total_bigrams_no_space, corpus.total_trigrams_no_space)
    } else {
        (corpus.total_bigrams, corpus.total_trigrams)
    };
    let denominator = |metric: Metric| match metric.kind() {
        MetricKind::Bigram => bigram_total,
        MetricKind::Skipgram => skipgram_total,
        MetricKind::Trigram => corpus.total_trigrams,
    };

    for (&metric, &count) in &counts {
        res.metrics.insert(metric, percent(count, denominator(metric)));
    }

    let limit = analyser.options.detail_limit;
    for (metric, mut list) in raw_details {
        list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(limit) = limit {
            list.truncate(limit);
        }
        let total = denominator(metric);
        let details = list
            .into_iter()
            .map(|(ngram, count, distance)| NgramDetail {
                ngram,
                count,
                percentage: percent(count, total),
                distance,
            })
            .collect();
        res.details.insert(metric, details);
    }
    res.counts = counts;

    res
}

fn scale_usage(raw: UsageStats, total: u64) -> UsageStats {
    let scale = |v: f64| if total == 0 { 0.0 } else { v / total as f64 * 100.0 };
    UsageStats {
        hands: raw.hands.map(scale),
        fingers: raw.fingers.map(scale),
        rows: raw.rows.map(scale),
    }
}

/// Same-finger bigrams of a layout with their raw counts, count descending.
/// Only the SFB predicate runs; this is the optimiser's hot path.
pub fn sfb_list(analyser: &Analyser, layout: &Layout) -> Vec<(Bigram, u64)> {
    let keys = layout.key_map();
    let exclude_space = analyser.options.exclude_space;

    let mut sfbs: Vec<(Bigram, u64)> = analyser
        .corpus
        .bigrams
        .iter()
        .filter(|(bigram, _)| !(exclude_space && has_space(bigram.as_slice())))
        .filter_map(|(bigram, &n)| {
            let k1 = keys.get(&bigram[0])?;
            let k2 = keys.get(&bigram[1])?;
            analyze_pair(k1, k2).is_sfb.then_some((*bigram, n))
        })
        .collect();

    sfbs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sfbs
}

/// SFB count over the bigram denominator, as a fraction in [0, 1].
pub fn sfb_fraction(analyser: &Analyser, layout: &Layout) -> f64 {
    let keys = layout.key_map();
    let corpus = analyser.corpus.as_ref();
    let exclude_space = analyser.options.exclude_space;

    let mut sfb = 0u64;
    for (bigram, &n) in &corpus.bigrams {
        if exclude_space && has_space(bigram) {
            continue;
        }
        if let (Some(k1), Some(k2)) = (keys.get(&bigram[0]), keys.get(&bigram[1])) {
            if analyze_pair(k1, k2).is_sfb {
                sfb += n;
            }
        }
    }

    let total = if exclude_space {
        corpus.total_bigrams_no_space
    } else {
        corpus.total_bigrams
    };
    percent(sfb, total) / 100.0
}

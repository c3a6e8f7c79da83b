use crate::compare::{compare_keys, directed};
use crate::config::SortConfig;
use crate::error::SortResult;
use crate::key::extract_key;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::borrow::Cow;
use std::cmp::Ordering;

/// Inputs at least this large extract keys and sort on the rayon pool.
const PARALLEL_THRESHOLD: usize = 8192;

/// A line's extracted key plus its input position
#[derive(Debug, Clone)]
struct KeyedLine<'a> {
    index: usize,
    key: Cow<'a, str>,
}

/// Orders a collection of lines under one validated configuration.
#[derive(Debug, Clone)]
pub struct LineSorter {
    config: SortConfig,
}

impl LineSorter {
    pub fn new(config: SortConfig) -> SortResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Order `lines`. Random mode draws from a generator seeded by
    /// `config.random_seed`, or from OS entropy when no seed is set.
    pub fn sort(&self, lines: Vec<String>) -> Vec<String> {
        if self.config.random {
            let mut rng = self.shuffle_rng();
            self.sort_with_rng(lines, &mut rng)
        } else {
            self.sort_by_keys(lines)
        }
    }

    /// Order `lines`, shuffling with `rng` when random mode is on.
    pub fn sort_with_rng<R: Rng + ?Sized>(
        &self,
        mut lines: Vec<String>,
        rng: &mut R,
    ) -> Vec<String> {
        if !self.config.random {
            return self.sort_by_keys(lines);
        }

        log::debug!("shuffling {} lines", lines.len());
        lines.shuffle(rng);
        if self.config.unique {
            self.dedup(lines)
        } else {
            lines
        }
    }

    fn shuffle_rng(&self) -> StdRng {
        match self.config.random_seed {
            Some(seed) => {
                log::debug!("random seed {seed}");
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        }
    }

    fn use_parallel(&self, len: usize) -> bool {
        len >= PARALLEL_THRESHOLD && num_cpus::get() > 1
    }

    /// Sort by extracted key, then collapse duplicate keys if requested.
    fn sort_by_keys(&self, lines: Vec<String>) -> Vec<String> {
        if lines.len() < 2 {
            return lines;
        }

        let parallel = self.use_parallel(lines.len());
        log::debug!(
            "sorting {} lines: mode={}, reverse={}, stable={}, unique={}, parallel={}",
            lines.len(),
            self.config.mode,
            self.config.reverse,
            self.config.stable,
            self.config.unique,
            parallel
        );

        let order = {
            let mut keyed = self.extract_keys(&lines, parallel);
            self.sort_keyed(&mut keyed, parallel);

            if self.config.unique {
                keyed
                    .into_iter()
                    .unique_by(|k| k.key.clone())
                    .map(|k| k.index)
                    .collect::<Vec<_>>()
            } else {
                keyed.into_iter().map(|k| k.index).collect::<Vec<_>>()
            }
        };

        let mut slots: Vec<Option<String>> = lines.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect()
    }

    fn extract_keys<'a>(&self, lines: &'a [String], parallel: bool) -> Vec<KeyedLine<'a>> {
        let config = &self.config;
        let make = |(index, line): (usize, &'a String)| KeyedLine {
            index,
            key: extract_key(line, config),
        };

        if parallel {
            lines.par_iter().enumerate().map(make).collect()
        } else {
            lines.iter().enumerate().map(make).collect()
        }
    }

    fn sort_keyed(&self, keyed: &mut [KeyedLine<'_>], parallel: bool) {
        let mode = self.config.mode;
        let reverse = self.config.reverse;
        let compare = move |a: &KeyedLine<'_>, b: &KeyedLine<'_>| {
            directed(compare_keys(&a.key, &b.key, mode), reverse)
        };

        // Unique keeps the first occurrence of each key, so ties need input order too.
        if self.config.stable || self.config.unique {
            // Reverse applies to the key order only; equal keys keep input order.
            let stable = move |a: &KeyedLine<'_>, b: &KeyedLine<'_>| match compare(a, b) {
                Ordering::Equal => a.index.cmp(&b.index),
                other => other,
            };
            if parallel {
                keyed.par_sort_by(stable);
            } else {
                keyed.sort_by(stable);
            }
        } else if parallel {
            keyed.par_sort_unstable_by(compare);
        } else {
            keyed.sort_unstable_by(compare);
        }
    }

    /// Keep the first line of each key class, in current order.
    fn dedup(&self, lines: Vec<String>) -> Vec<String> {
        let config = &self.config;
        lines
            .into_iter()
            .unique_by(|line| extract_key(line, config).into_owned())
            .collect()
    }
}

/// Order `lines` under `config`. Fails only on an invalid configuration.
pub fn order(lines: Vec<String>, config: &SortConfig) -> SortResult<Vec<String>> {
    Ok(LineSorter::new(config.clone())?.sort(lines))
}

/// Like [`order`], with the shuffle generator supplied by the caller.
pub fn order_with_rng<R: Rng + ?Sized>(
    lines: Vec<String>,
    config: &SortConfig,
    rng: &mut R,
) -> SortResult<Vec<String>> {
    Ok(LineSorter::new(config.clone())?.sort_with_rng(lines, rng))
}

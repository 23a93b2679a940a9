// Vocabulary and negative-sampling table for embedding training.

use indexmap::IndexMap;
use rand::Rng;

/// Words seen in the training set with their corpus frequencies.
/// A word's row in every weight matrix is its insertion index.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    counts: IndexMap<String, u64>,
}

impl Vocabulary {
    /// Count every word in `sentences`, keeping words seen at least `min_count` times.
    pub fn build<'a, I>(sentences: I, min_count: u64) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut counts: IndexMap<String, u64> = IndexMap::new();
        for sentence in sentences {
            for word in sentence {
                *counts.entry(word.clone()).or_insert(0) += 1;
            }
        }
        counts.retain(|_, count| *count >= min_count);
        Self { counts }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.counts.get_index_of(word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    /// Row indices of the known words, in order. Unknown words are dropped.
    pub fn encode(&self, words: &[String]) -> Vec<usize> {
        words.iter().filter_map(|w| self.index_of(w)).collect()
    }

    fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts.values().copied()
    }
}

/// Unigram distribution raised to `power`, sampled by binary search over the
/// cumulative weights.
#[derive(Debug, Clone)]
pub struct NegativeSampler {
    cumulative: Vec<f64>,
}

impl NegativeSampler {
    pub fn new(vocab: &Vocabulary, power: f64) -> Self {
        let mut total = 0.0;
        let cumulative = vocab
            .counts()
            .map(|count| {
                total += (count as f64).powf(power);
                total
            })
            .collect();
        Self { cumulative }
    }

    /// Draw a word index; `None` for an empty vocabulary.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let total = *self.cumulative.last()?;
        let r = rng.random::<f64>() * total;
        let index = self.cumulative.partition_point(|&c| c <= r);
        Some(index.min(self.cumulative.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_build_counts_and_min_count() {
        let a = words("bank fraud bank");
        let b = words("fraud probe");
        let vocab = Vocabulary::build([a.as_slice(), b.as_slice()], 1);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.index_of("bank"), Some(0));
        assert_eq!(vocab.encode(&words("probe unknown bank")), vec![2, 0]);

        let vocab = Vocabulary::build([a.as_slice(), b.as_slice()], 2);
        assert!(vocab.contains("bank"));
        assert!(!vocab.contains("probe"));
    }

    #[test]
    fn test_sampler_favours_frequent_words() {
        let sentence = words("common common common common common common common common rare");
        let vocab = Vocabulary::build([sentence.as_slice()], 1);
        let sampler = NegativeSampler::new(&vocab, 0.75);
        let mut rng = StdRng::seed_from_u64(7);

        let draws: Vec<usize> = (0..1000).filter_map(|_| sampler.sample(&mut rng)).collect();
        let common = draws.iter().filter(|&&i| i == 0).count();
        assert_eq!(draws.len(), 1000);
        assert!(common > 700, "common word drawn only {common} times");
        assert!(draws.iter().all(|&i| i < vocab.len()));
    }

    #[test]
    fn test_sampler_empty_vocabulary() {
        let sampler = NegativeSampler::new(&Vocabulary::default(), 0.75);
        assert_eq!(sampler.sample(&mut StdRng::seed_from_u64(1)), None);
    }
}

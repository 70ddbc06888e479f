//! Uniform random choice over the corpus.

use rand::seq::SliceRandom;

/// Pick one quote uniformly at random. `None` only for an empty corpus.
pub fn pick(corpus: &[String]) -> Option<&str> {
    corpus.choose(&mut rand::thread_rng()).map(String::as_str)
}

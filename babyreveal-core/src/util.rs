use rand::{distributions::{Alphanumeric, DistString}, thread_rng};

/// Random alphanumeric string, used for signing secrets and scratch directory names
pub fn random_string(length: usize) -> String {
    Alphanumeric.sample_string(&mut thread_rng(), length)
}

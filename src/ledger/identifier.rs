//! Identifier generation for blocks.
//!
//! Identifiers stand in for block hashes. They carry no relationship to the
//! block contents; the only requirement is that they are distinct within a
//! session.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const CHUNK_LEN: usize = 13;

pub trait IdentifierSource: Send {
    fn next_identifier(&mut self) -> String;
}

/// Random base-36 identifiers made of two 13-character chunks.
pub struct RandomIdentifiers {
    rng: StdRng,
}

impl RandomIdentifiers {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn chunk(&mut self) -> String {
        (0..CHUNK_LEN)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

impl Default for RandomIdentifiers {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierSource for RandomIdentifiers {
    fn next_identifier(&mut self) -> String {
        let mut id = self.chunk();
        id.push_str(&self.chunk());
        id
    }
}

#[cfg(test)]
pub(crate) struct SequentialIdentifiers {
    next: u64,
}

#[cfg(test)]
impl SequentialIdentifiers {
    pub(crate) fn new() -> Self {
        Self { next: 1 }
    }
}

#[cfg(test)]
impl IdentifierSource for SequentialIdentifiers {
    fn next_identifier(&mut self) -> String {
        let id = format!("id{:06}", self.next);
        self.next += 1;
        id
    }
}

/// Replays a fixed list, then repeats its last entry. Used to force collisions.
#[cfg(test)]
pub(crate) struct ScriptedIdentifiers {
    queue: std::collections::VecDeque<String>,
    last: String,
}

#[cfg(test)]
impl ScriptedIdentifiers {
    pub(crate) fn new(ids: &[&str]) -> Self {
        Self {
            queue: ids.iter().map(|s| s.to_string()).collect(),
            last: ids.last().map(|s| s.to_string()).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
impl IdentifierSource for ScriptedIdentifiers {
    fn next_identifier(&mut self) -> String {
        self.queue.pop_front().unwrap_or_else(|| self.last.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_identifier_shape() {
        let mut ids = RandomIdentifiers::seeded(7);
        let id = ids.next_identifier();
        assert_eq!(id.len(), 2 * CHUNK_LEN);
        assert!(id.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_random_identifiers_are_distinct() {
        let mut ids = RandomIdentifiers::new();
        let seen: HashSet<String> = (0..1000).map(|_| ids.next_identifier()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_seeded_identifiers_repeat() {
        let mut a = RandomIdentifiers::seeded(42);
        let mut b = RandomIdentifiers::seeded(42);
        assert_eq!(a.next_identifier(), b.next_identifier());
    }
}

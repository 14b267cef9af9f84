//! Per-parcel generation tokens for lookup results.
//!
//! Tokens for one parcel come from a single counter, so results of different
//! lookup kinds can be ordered against each other. Staleness is judged per
//! kind: a result is applied unless a later result of the same kind for the
//! same parcel has been applied already.

use std::collections::BTreeMap;

use landpermit_recon::LookupKind;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Generation(pub u64);

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationGuard {
    issued: Vec<u64>,
    applied: BTreeMap<(usize, LookupKind), u64>,
}

impl GenerationGuard {
    pub fn new(slots: usize) -> Self {
        Self {
            issued: vec![0; slots],
            applied: BTreeMap::new(),
        }
    }

    /// Issue the next token for `slot`.
    pub fn issue(&mut self, slot: usize) -> Generation {
        self.issued[slot] += 1;
        Generation(self.issued[slot])
    }

    /// Admit a `kind` result carrying `generation`, or return the newer token
    /// of the same kind that superseded it. Re-applying the last admitted
    /// token is allowed.
    pub fn admit(
        &mut self,
        slot: usize,
        kind: LookupKind,
        generation: Generation,
    ) -> Result<(), Generation> {
        let last = self.applied.entry((slot, kind)).or_insert(0);
        if generation.0 < *last {
            return Err(Generation(*last));
        }
        *last = generation.0;
        // Tokens minted elsewhere still move the issue counter forward
        self.issued[slot] = self.issued[slot].max(generation.0);
        Ok(())
    }

    pub fn last_applied(&self, slot: usize, kind: LookupKind) -> Generation {
        Generation(self.applied.get(&(slot, kind)).copied().unwrap_or(0))
    }

    /// The applied `kind` token newer than `generation`, if any.
    pub fn newer_applied(
        &self,
        slot: usize,
        kind: LookupKind,
        generation: Generation,
    ) -> Option<Generation> {
        let last = self.last_applied(slot, kind);
        (last > generation).then_some(last)
    }

    pub fn current(&self, slot: usize) -> Generation {
        Generation(self.issued[slot])
    }
}

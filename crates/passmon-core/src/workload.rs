//! Built-in digest workload: a deterministic, pass-structured job chaining
//! SHA-256 over a buffer. Used by the CLI `run` command and the end-to-end
//! tests; any other pass-structured computation plugs in through the same
//! `Job` trait.

use crate::job::{Job, PassOutcome};
use anyhow::Result;
use sha2::{Digest, Sha256};

/// Hashing granularity within a pass.
const CHUNK_SIZE: usize = 64 * 1024;

/// Result of a digest run; partial when the run was interrupted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestArtifact {
    /// Hex digest chained across all executed passes.
    pub hex: String,
    /// Passes actually executed.
    pub passes_run: u64,
    /// Total bytes folded into the digest.
    pub bytes_hashed: u64,
}

/// Multi-pass chained SHA-256 over a deterministic buffer.
///
/// Pass `k` hashes the digest of pass `k-1` followed by the whole buffer,
/// so passes are strictly sequential and the final digest depends on every
/// one of them. Units are bytes hashed.
pub struct DigestJob {
    buf: Vec<u8>,
    passes: u64,
    passes_done: u64,
    chain: [u8; 32],
}

impl DigestJob {
    pub fn new(passes: u64, buf_len: usize) -> Self {
        // prime-period fill so consecutive chunks differ
        let buf = (0..buf_len).map(|i| (i % 251) as u8).collect();
        Self {
            buf,
            passes,
            passes_done: 0,
            chain: [0u8; 32],
        }
    }
}

impl Job for DigestJob {
    type Artifact = DigestArtifact;

    fn total_units(&self) -> u64 {
        self.passes.saturating_mul(self.buf.len() as u64)
    }

    fn units_completed(&self) -> u64 {
        self.passes_done.saturating_mul(self.buf.len() as u64)
    }

    fn total_passes(&self) -> u64 {
        self.passes
    }

    fn execute_pass(&mut self) -> Result<PassOutcome> {
        let mut hasher = Sha256::new();
        hasher.update(self.chain);
        for chunk in self.buf.chunks(CHUNK_SIZE) {
            hasher.update(chunk);
        }
        self.chain = hasher.finalize().into();
        self.passes_done += 1;
        Ok(if self.passes_done >= self.passes {
            PassOutcome::Done
        } else {
            PassOutcome::Continue
        })
    }

    fn into_artifact(self) -> DigestArtifact {
        DigestArtifact {
            hex: hex::encode(self.chain),
            passes_run: self.passes_done,
            bytes_hashed: self.passes_done.saturating_mul(self.buf.len() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn passes_progress_and_finish() {
        let mut job = DigestJob::new(3, 1000);
        assert_eq!(job.total_units(), 3000);
        assert_eq!(job.units_completed(), 0);

        assert_eq!(job.execute_pass().unwrap(), PassOutcome::Continue);
        assert_eq!(job.units_completed(), 1000);
        assert_eq!(job.execute_pass().unwrap(), PassOutcome::Continue);
        assert_eq!(job.execute_pass().unwrap(), PassOutcome::Done);
        assert_eq!(job.units_completed(), 3000);
    }

    #[test]
    fn digest_matches_direct_computation() {
        // buffer longer than one chunk, so chunked hashing is exercised
        let len = CHUNK_SIZE + 4321;
        let mut job = DigestJob::new(2, len);
        while job.execute_pass().unwrap() == PassOutcome::Continue {}
        let artifact = job.into_artifact();

        let buf = fill(len);
        let mut chain: [u8; 32] = [0; 32];
        for _ in 0..2 {
            let mut hasher = Sha256::new();
            hasher.update(chain);
            hasher.update(&buf);
            chain = hasher.finalize().into();
        }
        assert_eq!(artifact.hex, hex::encode(chain));
        assert_eq!(artifact.passes_run, 2);
        assert_eq!(artifact.bytes_hashed, 2 * len as u64);
    }

    #[test]
    fn identical_jobs_produce_identical_digests() {
        let run = |passes: u64| {
            let mut job = DigestJob::new(passes, 4096);
            while job.execute_pass().unwrap() == PassOutcome::Continue {}
            job.into_artifact().hex
        };
        assert_eq!(run(5), run(5));
        assert_ne!(run(5), run(6));
    }

    #[test]
    fn partial_artifact_reflects_executed_passes() {
        let mut job = DigestJob::new(5, 2048);
        job.execute_pass().unwrap();
        job.execute_pass().unwrap();
        let artifact = job.into_artifact();
        assert_eq!(artifact.passes_run, 2);
        assert_eq!(artifact.bytes_hashed, 4096);
    }

    #[test]
    fn unit_counters_are_64_bit() {
        let job = DigestJob::new(1 << 40, 1 << 20);
        assert_eq!(job.total_units(), 1u64 << 60);
    }
}

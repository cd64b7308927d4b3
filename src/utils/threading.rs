//! # Threading Configuration
//!
//! ## Role
//! Configure the rayon thread pool shared by every per-haplotype HMM run.
//! Each run owns its forward, backward and posterior buffers, so the pool
//! needs no thread-local workspaces; the reference panel is the only shared
//! (read-only) state.

use crate::error::{LsError, Result};

/// Create a configured thread pool.
pub fn build_thread_pool(n_threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .thread_name(|i| format!("lsimpute-worker-{}", i))
        .build()
        .map_err(|e| LsError::config(format!("Failed to create thread pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size() {
        let pool = build_thread_pool(3).unwrap();
        assert_eq!(pool.current_num_threads(), 3);
        let name = pool.install(|| std::thread::current().name().map(str::to_string));
        assert!(name.unwrap().starts_with("lsimpute-worker-"));
    }
}

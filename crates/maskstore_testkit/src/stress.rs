//! Stress helpers for MaskStore.
//!
//! These exercise a shared store from many threads at once.

use maskstore_core::{MaskDraft, MaskStore};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Masks created.
    pub created: usize,
    /// Updates that found their mask.
    pub updated: usize,
    /// Deletes that found their mask.
    pub deleted: usize,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Total operations performed.
    pub fn total_ops(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    /// Operations per second.
    pub fn ops_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.total_ops() as f64 / secs
        } else {
            0.0
        }
    }

    /// Prints a summary of the run.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {name} ===");
        println!("Created: {}", self.created);
        println!("Updated: {}", self.updated);
        println!("Deleted: {}", self.deleted);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second());
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of worker threads.
    pub threads: usize,
    /// Masks each worker creates.
    pub masks_per_thread: usize,
    /// Whether each worker deletes every other mask it created.
    pub delete_half: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            masks_per_thread: 50,
            delete_half: true,
        }
    }
}

/// Has every worker create, rename and optionally delete its own masks.
pub fn concurrent_mutations(store: &Arc<MaskStore>, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|worker| {
            let store = Arc::clone(store);
            let config = config.clone();
            thread::spawn(move || {
                let (mut created, mut updated, mut deleted) = (0usize, 0usize, 0usize);
                for i in 0..config.masks_per_thread {
                    let mask = store.create(Some(MaskDraft::new().name(format!("w{worker}-{i}"))));
                    created += 1;

                    if store.update(mask.id.as_str(), |m| m.name.push_str("-renamed")) {
                        updated += 1;
                    }
                    if config.delete_half && i % 2 == 0 && store.delete(mask.id.as_str()) {
                        deleted += 1;
                    }
                }
                (created, updated, deleted)
            })
        })
        .collect();

    let mut result = StressTestResult {
        created: 0,
        updated: 0,
        deleted: 0,
        duration: Duration::ZERO,
    };
    for handle in handles {
        let (created, updated, deleted) = handle.join().expect("stress worker panicked");
        result.created += created;
        result.updated += updated;
        result.deleted += deleted;
    }
    result.duration = start.elapsed();
    result
}

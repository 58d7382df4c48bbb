//! Multi-threaded safe prime search
//!
//! Runs one independent search per worker thread, each with its own OS
//! entropy generator, and keeps the first safe prime reported. The remaining
//! workers are stopped through a shared [`CancellationToken`].

use std::sync::mpsc;
use std::thread;

use log::{debug, warn};

use crate::cancel::CancellationToken;
use crate::error::{Result, SafePrimeError};
use crate::generator::{SafePrime, SafePrimeGenerator};
use crate::params::SafePrimeRequest;

/// Largest accepted number of worker threads.
pub const MAX_THREADS: usize = 1024;

/// Search with `threads` workers and return the first safe prime found.
pub fn generate_parallel(request: &SafePrimeRequest, threads: usize) -> Result<SafePrime> {
    generate_parallel_with_cancel(request, threads, &CancellationToken::new())
}

/// Like [`generate_parallel`], abandoning the search once `cancel` is set.
///
/// Each worker gets the full iteration budget of `request`. When no worker
/// succeeds the first error other than [`SafePrimeError::Cancelled`] is
/// returned.
pub fn generate_parallel_with_cancel(
    request: &SafePrimeRequest,
    threads: usize,
    cancel: &CancellationToken,
) -> Result<SafePrime> {
    request.validate()?;
    if threads == 0 || threads > MAX_THREADS {
        return Err(SafePrimeError::InvalidParameter(format!(
            "worker threads must be between 1 and {}, got {}",
            MAX_THREADS, threads
        )));
    }
    if threads == 1 {
        return SafePrimeGenerator::new().generate_with_cancel(request, cancel);
    }

    debug!(
        "starting {} workers for a {}-bit safe prime",
        threads, request.bit_length
    );

    let stop = cancel.child();
    let (tx, rx) = mpsc::channel();
    let mut handles = Vec::with_capacity(threads);
    for worker in 0..threads {
        let tx = tx.clone();
        let worker_stop = stop.clone();
        let request = *request;
        let spawned = thread::Builder::new()
            .name(format!("safe-prime-{}", worker))
            .spawn(move || {
                let result = SafePrimeGenerator::new().generate_with_cancel(&request, &worker_stop);
                let _ = tx.send((worker, result));
            });

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(err) => {
                warn!("could not start worker {}: {}", worker, err);
                stop.cancel();
                for handle in handles {
                    let _ = handle.join();
                }
                return Err(SafePrimeError::ThreadSpawn(err.to_string()));
            }
        }
    }
    drop(tx);

    let mut found = None;
    let mut first_error = None;
    for (worker, result) in rx {
        match result {
            Ok(safe) => {
                if found.is_none() {
                    debug!(
                        "worker {} found a safe prime after {} candidates",
                        worker,
                        safe.iterations()
                    );
                    stop.cancel();
                    found = Some(safe);
                }
            }
            Err(SafePrimeError::Cancelled) => {}
            Err(err) => {
                warn!("worker {} failed: {}", worker, err);
                if matches!(err, SafePrimeError::EntropyUnavailable(_)) {
                    stop.cancel();
                }
                first_error.get_or_insert(err);
            }
        }
    }

    let mut panicked = false;
    for handle in handles {
        panicked |= handle.join().is_err();
    }

    if let Some(safe) = found {
        return Ok(safe);
    }
    if let Some(err) = first_error {
        return Err(err);
    }
    if panicked {
        return Err(SafePrimeError::WorkerPanicked);
    }
    Err(SafePrimeError::Cancelled)
}

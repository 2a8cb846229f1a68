// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
use crate::{BlurError, ThreadingPolicy};
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Executes `f(chunk_begin, chunk_end)` over partitions of `[begin, end)` and
/// returns once every partition is done.
///
/// The blur passes are written against this trait so the same code runs on the
/// crate's own [ParallelFor] pool or on a `rayon` pool.
pub trait RangeRunner {
    /// Number of partitions used when no override is given.
    fn num_threads(&self) -> usize;

    /// `thread_override == 0` splits into [RangeRunner::num_threads] partitions,
    /// anything else splits into that many for this call only.
    fn run_and_wait<F>(&self, begin: usize, end: usize, f: &F, thread_override: usize)
    where
        F: Fn(usize, usize) + Sync;
}

/// Contiguous near-equal partitions of a half-open range.
///
/// Chunk lengths differ by at most one, longer chunks come first and empty
/// chunks are never produced.
#[derive(Debug, Clone)]
pub struct RangeChunks {
    begin: usize,
    base: usize,
    extra: usize,
    index: usize,
    count: usize,
}

impl Iterator for RangeChunks {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let i = self.index;
        self.index += 1;
        let start = self.begin + i * self.base + i.min(self.extra);
        let len = self.base + usize::from(i < self.extra);
        Some((start, start + len))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for RangeChunks {}

/// Splits `[begin, end)` into at most `parts` chunks, see [RangeChunks].
pub fn split_range(begin: usize, end: usize, parts: usize) -> RangeChunks {
    let len = end.saturating_sub(begin);
    let count = parts.max(1).min(len);
    let (base, extra) = if count == 0 {
        (0, 0)
    } else {
        (len / count, len % count)
    };
    RangeChunks {
        begin,
        base,
        extra,
        index: 0,
        count,
    }
}

struct Queue {
    tasks: VecDeque<Task>,
    running: bool,
    panic: Option<Box<dyn Any + Send + 'static>>,
}

struct Shared {
    queue: Mutex<Queue>,
    task_available: Condvar,
    task_done: Condvar,
    outstanding: AtomicUsize,
}

impl Shared {
    #[inline]
    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn worker(shared: Arc<Shared>) {
    loop {
        let task = {
            let mut queue = shared.lock();
            loop {
                if let Some(task) = queue.tasks.pop_front() {
                    break task;
                }
                if !queue.running {
                    return;
                }
                queue = shared
                    .task_available
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        let result = panic::catch_unwind(AssertUnwindSafe(task));

        let mut queue = shared.lock();
        if let Err(payload) = result {
            if queue.panic.is_none() {
                queue.panic = Some(payload);
            }
        }
        if shared.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            shared.task_done.notify_all();
        }
    }
}

/// Fixed-size pool specialized for "partition a range, run every partition,
/// wait for all of them".
///
/// Workers are spawned once in the constructor and joined on drop; the pool is
/// never resized. Pass one pool by reference into every blur call.
///
/// A callback that panics does not take a worker down: the panic is caught,
/// the pool keeps counting, and the payload is re-raised from the next
/// [ParallelFor::wait] or [ParallelFor::run_and_wait] on the calling thread.
/// Callbacks must not call back into the same pool and wait, that deadlocks.
pub struct ParallelFor {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    num_threads: usize,
}

impl ParallelFor {
    /// Creates pool sized by the [ThreadingPolicy].
    pub fn new(threading_policy: ThreadingPolicy) -> Result<ParallelFor, BlurError> {
        Self::with_threads(threading_policy.thread_count())
    }

    /// Creates pool with exactly `num_threads` workers, `0` is treated as `1`.
    ///
    /// Fails if any worker cannot be spawned; workers that did start are joined
    /// before the error is returned.
    pub fn with_threads(num_threads: usize) -> Result<ParallelFor, BlurError> {
        let num_threads = num_threads.max(1);
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue {
                tasks: VecDeque::new(),
                running: true,
                panic: None,
            }),
            task_available: Condvar::new(),
            task_done: Condvar::new(),
            outstanding: AtomicUsize::new(0),
        });

        let mut pool = ParallelFor {
            shared,
            workers: Vec::with_capacity(num_threads),
            num_threads,
        };

        for i in 0..num_threads {
            let shared = pool.shared.clone();
            let handle = thread::Builder::new()
                .name(format!("bigblur-worker-{i}"))
                .spawn(move || worker(shared))
                .map_err(|e| {
                    log::error!("Failed to spawn worker {i} of {num_threads}: {e}");
                    BlurError::ThreadSpawn(e.kind())
                })?;
            pool.workers.push(handle);
        }

        log::debug!("{num_threads} worker threads created");

        Ok(pool)
    }

    #[inline]
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Splits `[begin, end)` and enqueues one task per chunk, returns immediately.
    ///
    /// Does nothing when `begin >= end`.
    pub fn run(
        &self,
        begin: usize,
        end: usize,
        f: Arc<dyn Fn(usize, usize) + Send + Sync + 'static>,
        thread_override: usize,
    ) {
        self.enqueue(begin, end, thread_override, |a, b| {
            let f = f.clone();
            Box::new(move || f(a, b))
        });
    }

    /// Blocks until every enqueued task has finished.
    ///
    /// Re-raises the first panic that escaped a task since the last wait.
    pub fn wait(&self) {
        let payload = self.wait_idle().panic.take();
        if let Some(payload) = payload {
            panic::resume_unwind(payload);
        }
    }

    /// [ParallelFor::run] followed by [ParallelFor::wait], the callback may
    /// borrow from the caller's stack.
    pub fn run_and_wait<F>(&self, begin: usize, end: usize, f: &F, thread_override: usize)
    where
        F: Fn(usize, usize) + Sync,
    {
        let f: &(dyn Fn(usize, usize) + Sync) = f;
        // SAFETY: the guard below blocks until every task that holds this
        // reference has finished, also when unwinding, so the erased lifetime
        // never outlives the borrow.
        let f: &'static (dyn Fn(usize, usize) + Sync) = unsafe { std::mem::transmute(f) };
        let guard = IdleGuard { pool: self };
        self.enqueue(begin, end, thread_override, |a, b| Box::new(move || f(a, b)));
        drop(guard);
        self.wait();
    }

    fn enqueue<M>(&self, begin: usize, end: usize, thread_override: usize, make_task: M)
    where
        M: Fn(usize, usize) -> Task,
    {
        if begin >= end {
            return;
        }
        let parts = if thread_override > 0 {
            thread_override
        } else {
            self.num_threads
        };
        let chunks = split_range(begin, end, parts);
        log::trace!(
            "Splitting [{begin}, {end}) into {} chunks over {} workers",
            chunks.len(),
            self.num_threads
        );
        for (a, b) in chunks {
            {
                let mut queue = self.shared.lock();
                self.shared.outstanding.fetch_add(1, Ordering::AcqRel);
                queue.tasks.push_back(make_task(a, b));
            }
            self.shared.task_available.notify_one();
        }
    }

    fn wait_idle(&self) -> MutexGuard<'_, Queue> {
        let mut queue = self.shared.lock();
        while self.shared.outstanding.load(Ordering::Acquire) != 0 {
            queue = self
                .shared
                .task_done
                .wait(queue)
                .unwrap_or_else(PoisonError::into_inner);
        }
        queue
    }
}

struct IdleGuard<'a> {
    pool: &'a ParallelFor,
}

impl Drop for IdleGuard<'_> {
    fn drop(&mut self) {
        drop(self.pool.wait_idle());
    }
}

impl Drop for ParallelFor {
    fn drop(&mut self) {
        {
            let mut queue = self.wait_idle();
            queue.running = false;
        }
        self.shared.task_available.notify_all();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        log::debug!("{} worker threads joined", self.num_threads);
    }
}

impl RangeRunner for ParallelFor {
    #[inline]
    fn num_threads(&self) -> usize {
        self.num_threads
    }

    fn run_and_wait<F>(&self, begin: usize, end: usize, f: &F, thread_override: usize)
    where
        F: Fn(usize, usize) + Sync,
    {
        ParallelFor::run_and_wait(self, begin, end, f, thread_override);
    }
}

impl RangeRunner for rayon::ThreadPool {
    #[inline]
    fn num_threads(&self) -> usize {
        self.current_num_threads()
    }

    fn run_and_wait<F>(&self, begin: usize, end: usize, f: &F, thread_override: usize)
    where
        F: Fn(usize, usize) + Sync,
    {
        let parts = if thread_override > 0 {
            thread_override
        } else {
            self.current_num_threads()
        };
        self.scope(|scope| {
            for (a, b) in split_range(begin, end, parts) {
                scope.spawn(move |_| f(a, b));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    fn chunks(begin: usize, end: usize, parts: usize) -> Vec<(usize, usize)> {
        split_range(begin, end, parts).collect()
    }

    #[test]
    fn test_split_range_remainder_goes_first() {
        assert_eq!(chunks(0, 10, 3), vec![(0, 4), (4, 7), (7, 10)]);
        assert_eq!(chunks(5, 13, 4), vec![(5, 7), (7, 9), (9, 11), (11, 13)]);
    }

    #[test]
    fn test_split_range_degenerate() {
        assert!(chunks(3, 3, 4).is_empty());
        assert!(chunks(7, 2, 4).is_empty());
        assert_eq!(chunks(0, 2, 8), vec![(0, 1), (1, 2)]);
        assert_eq!(chunks(0, 5, 0), vec![(0, 5)]);
    }

    #[test]
    fn test_split_range_covers_range() {
        for len in 0..40usize {
            for parts in 1..12usize {
                let c = chunks(2, 2 + len, parts);
                assert_eq!(c.len(), parts.min(len));
                let mut cursor = 2;
                for &(a, b) in c.iter() {
                    assert_eq!(a, cursor);
                    assert!(b > a);
                    cursor = b;
                }
                assert_eq!(cursor, 2 + len);
                if let (Some(min), Some(max)) = (
                    c.iter().map(|(a, b)| b - a).min(),
                    c.iter().map(|(a, b)| b - a).max(),
                ) {
                    assert!(max - min <= 1);
                }
            }
        }
    }

    #[test]
    fn test_run_and_wait_visits_every_index_once() {
        let pool = ParallelFor::with_threads(4).unwrap();
        let hits: Vec<AtomicUsize> = (0..1000).map(|_| AtomicUsize::new(0)).collect();
        pool.run_and_wait(
            0,
            hits.len(),
            &|a, b| {
                for hit in hits[a..b].iter() {
                    hit.fetch_add(1, Ordering::Relaxed);
                }
            },
            0,
        );
        assert!(hits.iter().all(|x| x.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn test_thread_override_controls_partitions() {
        let pool = ParallelFor::with_threads(2).unwrap();
        let calls = AtomicUsize::new(0);
        pool.run_and_wait(
            0,
            100,
            &|_, _| {
                calls.fetch_add(1, Ordering::Relaxed);
            },
            7,
        );
        assert_eq!(calls.load(Ordering::Relaxed), 7);
        calls.store(0, Ordering::Relaxed);
        pool.run_and_wait(
            0,
            100,
            &|_, _| {
                calls.fetch_add(1, Ordering::Relaxed);
            },
            0,
        );
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_empty_range_is_noop() {
        let pool = ParallelFor::with_threads(3).unwrap();
        let called = AtomicBool::new(false);
        pool.run_and_wait(5, 5, &|_, _| called.store(true, Ordering::Relaxed), 0);
        pool.run_and_wait(9, 1, &|_, _| called.store(true, Ordering::Relaxed), 0);
        assert!(!called.load(Ordering::Relaxed));
    }

    #[test]
    fn test_run_then_wait_is_a_barrier() {
        let pool = ParallelFor::with_threads(3).unwrap();
        let done = Arc::new(AtomicUsize::new(0));
        let counter = done.clone();
        pool.run(
            0,
            6,
            Arc::new(move |a, b| {
                thread::sleep(Duration::from_millis(10));
                counter.fetch_add(b - a, Ordering::SeqCst);
            }),
            0,
        );
        pool.wait();
        assert_eq!(done.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_drop_drains_queue() {
        let done = Arc::new(AtomicUsize::new(0));
        {
            let pool = ParallelFor::with_threads(1).unwrap();
            let counter = done.clone();
            pool.run(
                0,
                4,
                Arc::new(move |_, _| {
                    thread::sleep(Duration::from_millis(5));
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
                4,
            );
        }
        assert_eq!(done.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_panic_is_reraised_and_pool_survives() {
        let pool = ParallelFor::with_threads(2).unwrap();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pool.run_and_wait(
                0,
                4,
                &|a, _| {
                    if a == 2 {
                        panic!("chunk failed");
                    }
                },
                4,
            );
        }));
        assert!(result.is_err());

        let sum = AtomicUsize::new(0);
        pool.run_and_wait(
            0,
            10,
            &|a, b| {
                sum.fetch_add(b - a, Ordering::Relaxed);
            },
            0,
        );
        assert_eq!(sum.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn test_zero_threads_means_one() {
        let pool = ParallelFor::with_threads(0).unwrap();
        assert_eq!(pool.num_threads(), 1);
    }

    #[test]
    fn test_rayon_runner_matches_partitioning() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(3)
            .build()
            .unwrap();
        let seen = Mutex::new(Vec::new());
        RangeRunner::run_and_wait(
            &pool,
            0,
            10,
            &|a, b| seen.lock().unwrap().push((a, b)),
            0,
        );
        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        assert_eq!(seen, vec![(0, 4), (4, 7), (7, 10)]);
    }
}

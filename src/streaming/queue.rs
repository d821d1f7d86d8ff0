//! Bounded-concurrency priority queue for tile loads
//!
//! The queue only does bookkeeping: `start` hands back the futures of the
//! tasks it promoted and the owner drives them, reporting each outcome
//! through `complete` before calling `start` again to refill the slot.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::streaming::task::{Task, TaskFuture, TaskHandle, TaskResult, TaskStatus, TaskWork};
use crate::tiles::TileKey;

/// Default number of simultaneous loads
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Pending task candidate, ordered for a max-heap
#[derive(Clone, Copy, Debug)]
struct PendingEntry {
    key: TileKey,
    serial: u64,
    priority: f32,
}

impl Eq for PendingEntry {}

impl PartialEq for PendingEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for PendingEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first, ties go to the earlier enqueue
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.serial.cmp(&self.serial))
    }
}

impl PartialOrd for PendingEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A task promoted to running by [`PriorityLoadQueue::start`]
pub struct StartedTask {
    pub key: TileKey,
    pub serial: u64,
    pub handle: TaskHandle,
    pub future: TaskFuture,
}

/// Tracks every known tile load and decides which run next
pub struct PriorityLoadQueue {
    concurrency: usize,
    tasks: HashMap<TileKey, Task>,
    running: HashSet<TileKey>,
    next_serial: u64,
}

impl PriorityLoadQueue {
    /// Create a queue running at most `concurrency` tasks (at least one)
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            tasks: HashMap::new(),
            running: HashSet::new(),
            next_serial: 0,
        }
    }

    /// Track a new pending task.
    ///
    /// Returns `false` and drops `work` if the key is already tracked; use
    /// [`set_priority`](Self::set_priority) to refresh an existing task.
    pub fn enqueue(&mut self, key: TileKey, priority: f32, work: TaskWork) -> bool {
        if self.tasks.contains_key(&key) {
            return false;
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        self.tasks.insert(key, Task::new(key, serial, priority, work));
        log::trace!("Task {} enqueued (priority {:.3})", key, priority);
        true
    }

    /// Update the priority of a tracked task, re-enabling it if disabled
    pub fn set_priority(&mut self, key: TileKey, priority: f32) -> bool {
        match self.tasks.get_mut(&key) {
            Some(task) if !task.status().is_terminal() => {
                task.priority = priority;
                task.enable();
                true
            }
            _ => false,
        }
    }

    /// Park every pending task until a scan refreshes it
    pub fn disable_all(&mut self) {
        for task in self.tasks.values_mut() {
            task.disable();
        }
    }

    /// Promote the highest priority pending tasks into the free slots
    pub fn start(&mut self) -> Vec<StartedTask> {
        let free = self.concurrency.saturating_sub(self.running.len());
        if free == 0 {
            return Vec::new();
        }

        let mut heap: BinaryHeap<PendingEntry> = self
            .tasks
            .values()
            .filter(|task| task.status() == TaskStatus::Pending)
            .map(|task| PendingEntry {
                key: task.key,
                serial: task.serial,
                priority: task.priority,
            })
            .collect();

        let mut started = Vec::with_capacity(free.min(heap.len()));
        while started.len() < free {
            let Some(entry) = heap.pop() else { break };
            let Some(task) = self.tasks.get_mut(&entry.key) else { continue };
            let Some(future) = task.start() else { continue };

            self.running.insert(entry.key);
            log::trace!("Task {} started (priority {:.3})", entry.key, entry.priority);
            started.push(StartedTask {
                key: entry.key,
                serial: entry.serial,
                handle: task.handle().clone(),
                future,
            });
        }

        started
    }

    /// Record the end of a started task and free its slot.
    ///
    /// Completions of cancelled tasks, or of tasks dropped by `clear`, are
    /// discarded and reported as `Cancelled`.
    pub fn complete(&mut self, key: TileKey, serial: u64, outcome: &TaskResult) -> TaskStatus {
        let Some(task) = self.tasks.get_mut(&key).filter(|task| task.serial == serial) else {
            log::trace!("Discarding stale completion of task {}", key);
            return TaskStatus::Cancelled;
        };

        let status = if task.is_cancelled() {
            TaskStatus::Cancelled
        } else {
            task.finish(outcome);
            task.status()
        };

        self.tasks.remove(&key);
        self.running.remove(&key);
        log::trace!("Task {} finished: {:?}", key, status);
        status
    }

    /// Cancel one task. A running task keeps its slot until it completes.
    pub fn cancel(&mut self, key: TileKey) -> bool {
        let Some(task) = self.tasks.get_mut(&key) else {
            return false;
        };

        let was_running = task.status() == TaskStatus::Running;
        task.cancel();
        if !was_running {
            self.tasks.remove(&key);
        }
        true
    }

    /// Cancel every task and forget all of them
    pub fn clear(&mut self) {
        for task in self.tasks.values_mut() {
            task.cancel();
        }
        self.tasks.clear();
        self.running.clear();
    }

    /// Number of tracked tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks
            .values()
            .filter(|task| task.status() == TaskStatus::Pending)
            .count()
    }

    pub fn contains(&self, key: TileKey) -> bool {
        self.tasks.contains_key(&key)
    }

    pub fn status(&self, key: TileKey) -> Option<TaskStatus> {
        self.tasks.get(&key).map(Task::status)
    }

    pub fn priority(&self, key: TileKey) -> Option<f32> {
        self.tasks.get(&key).map(|task| task.priority)
    }
}

impl Default for PriorityLoadQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

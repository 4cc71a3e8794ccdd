use std::{collections::BTreeMap, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recurrence {
    Once,
    Every(Duration),
}

#[derive(Debug, Clone, Copy)]
struct Task {
    due: Duration,
    recurrence: Recurrence,
}

/// Single-threaded scheduler of named, cancellable tasks on a virtual clock.
///
/// The scheduler never sleeps and never reads a wall clock. The host moves time
/// forward and pulls due tasks with [`pop_due`](Self::pop_due) one at a time,
/// in deadline order (ties broken by name order). Scheduling under a name that
/// is already in use replaces the previous task.
///
/// A repeating task is re-armed *before* it is returned, so the caller may
/// cancel or replace it while handling it.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::TaskScheduler;
///
/// let mut tasks = TaskScheduler::new();
/// tasks.schedule_repeating("fall", Duration::from_millis(100));
/// tasks.schedule_once("lock", Duration::from_millis(150));
///
/// let until = Duration::from_millis(200);
/// let mut fired = vec![];
/// while let Some(name) = tasks.pop_due(until) {
///     fired.push(name);
/// }
/// tasks.advance_to(until);
/// assert_eq!(fired, ["fall", "lock", "fall"]);
/// ```
#[derive(Debug, Clone)]
pub struct TaskScheduler<K> {
    now: Duration,
    tasks: BTreeMap<K, Task>,
}

impl<K> Default for TaskScheduler<K>
where
    K: Ord + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TaskScheduler<K>
where
    K: Ord + Copy,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            tasks: BTreeMap::new(),
        }
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Runs `name` once, `delay` from now.
    pub fn schedule_once(&mut self, name: K, delay: Duration) {
        let due = self.now + delay;
        self.tasks.insert(
            name,
            Task {
                due,
                recurrence: Recurrence::Once,
            },
        );
    }

    /// Runs `name` every `interval`, first `interval` from now.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn schedule_repeating(&mut self, name: K, interval: Duration) {
        assert!(
            !interval.is_zero(),
            "repeating task needs a non-zero interval"
        );
        let due = self.now + interval;
        self.tasks.insert(
            name,
            Task {
                due,
                recurrence: Recurrence::Every(interval),
            },
        );
    }

    /// Cancels `name`. Returns whether it was scheduled.
    pub fn cancel(&mut self, name: K) -> bool {
        self.tasks.remove(&name).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    #[must_use]
    pub fn is_scheduled(&self, name: K) -> bool {
        self.tasks.contains_key(&name)
    }

    pub fn scheduled(&self) -> impl Iterator<Item = K> + '_ {
        self.tasks.keys().copied()
    }

    /// Returns how long until the earliest task is due, or `None` when idle.
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.tasks
            .values()
            .map(|task| task.due.saturating_sub(self.now))
            .min()
    }

    /// Pops the earliest task due at or before `until`.
    ///
    /// The clock moves to the task's deadline. Repeating tasks are re-armed one
    /// interval later; one-shot tasks are removed.
    pub fn pop_due(&mut self, until: Duration) -> Option<K> {
        let (name, task) = self
            .tasks
            .iter()
            .filter(|(_, task)| task.due <= until)
            .min_by_key(|(name, task)| (task.due, **name))
            .map(|(name, task)| (*name, *task))?;

        self.now = self.now.max(task.due);
        match task.recurrence {
            Recurrence::Once => {
                self.tasks.remove(&name);
            }
            Recurrence::Every(interval) => {
                self.tasks.insert(
                    name,
                    Task {
                        due: task.due + interval,
                        recurrence: task.recurrence,
                    },
                );
            }
        }
        Some(name)
    }

    /// Moves the clock forward to `until` (never backward).
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn drain(tasks: &mut TaskScheduler<&'static str>, until: Duration) -> Vec<&'static str> {
        let mut fired = vec![];
        while let Some(name) = tasks.pop_due(until) {
            fired.push(name);
        }
        tasks.advance_to(until);
        fired
    }

    #[test]
    fn test_nothing_due_before_deadline() {
        let mut tasks = TaskScheduler::new();
        tasks.schedule_once("a", ms(100));
        assert!(drain(&mut tasks, ms(99)).is_empty());
        assert_eq!(tasks.time_until_next(), Some(ms(1)));
        assert_eq!(drain(&mut tasks, ms(100)), ["a"]);
        assert!(!tasks.is_scheduled("a"));
        assert_eq!(tasks.time_until_next(), None);
    }

    #[test]
    fn test_repeating_fires_each_interval() {
        let mut tasks = TaskScheduler::new();
        tasks.schedule_repeating("tick", ms(50));
        assert_eq!(drain(&mut tasks, ms(175)), ["tick", "tick", "tick"]);
        assert_eq!(tasks.now(), ms(175));
        assert_eq!(tasks.time_until_next(), Some(ms(25)));
    }

    #[test]
    fn test_ties_break_by_name() {
        let mut tasks = TaskScheduler::new();
        tasks.schedule_once("b", ms(10));
        tasks.schedule_once("a", ms(10));
        assert_eq!(drain(&mut tasks, ms(10)), ["a", "b"]);
    }

    #[test]
    fn test_reschedule_replaces_task() {
        let mut tasks = TaskScheduler::new();
        tasks.schedule_repeating("fall", ms(100));
        drain(&mut tasks, ms(60));
        tasks.schedule_repeating("fall", ms(100));
        assert!(drain(&mut tasks, ms(150)).is_empty());
        assert_eq!(drain(&mut tasks, ms(160)), ["fall"]);
    }

    #[test]
    fn test_cancel() {
        let mut tasks = TaskScheduler::new();
        tasks.schedule_repeating("a", ms(10));
        tasks.schedule_once("b", ms(10));
        assert!(tasks.cancel("a"));
        assert!(!tasks.cancel("a"));
        assert_eq!(tasks.scheduled().collect::<Vec<_>>(), ["b"]);
        tasks.cancel_all();
        assert!(drain(&mut tasks, ms(100)).is_empty());
    }

    #[test]
    fn test_cancel_while_handling_repeating_task() {
        let mut tasks = TaskScheduler::new();
        tasks.schedule_repeating("a", ms(10));
        assert_eq!(tasks.pop_due(ms(100)), Some("a"));
        tasks.cancel("a");
        assert_eq!(tasks.pop_due(ms(100)), None);
    }

    #[test]
    fn test_clock_never_moves_backward() {
        let mut tasks: TaskScheduler<&str> = TaskScheduler::new();
        tasks.advance_to(ms(100));
        tasks.advance_to(ms(50));
        assert_eq!(tasks.now(), ms(100));
    }

    #[test]
    #[should_panic(expected = "non-zero interval")]
    fn test_zero_interval_rejected() {
        let mut tasks = TaskScheduler::new();
        tasks.schedule_repeating("a", Duration::ZERO);
    }
}

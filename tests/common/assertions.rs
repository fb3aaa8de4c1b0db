/// Assertion helpers over journaled events
use super::recording::{Event, Journal};
use anyhow::Result;

/// Assert the journal contains exactly `expected`, in order
pub fn assert_events(journal: &Journal, expected: &[Event]) -> Result<()> {
    let actual = journal.events();

    anyhow::ensure!(
        actual == expected,
        "Unexpected event sequence\n  expected: {:?}\n    actual: {:?}",
        expected,
        actual
    );

    Ok(())
}

/// Assert the exclusive lock was never taken
pub fn assert_never_exclusive(journal: &Journal) -> Result<()> {
    anyhow::ensure!(
        journal.count(&Event::ExclusiveLock) == 0,
        "Exclusive lock acquired on a path that should not recover: {:?}",
        journal.events()
    );

    Ok(())
}

/// Assert the observer was never notified
pub fn assert_observer_silent(journal: &Journal) -> Result<()> {
    let notifications =
        journal.count_matching(|e| matches!(e, Event::Recover(_) | Event::Abort(_)));

    anyhow::ensure!(
        notifications == 0,
        "Observer received {} notifications: {:?}",
        notifications,
        journal.events()
    );

    Ok(())
}

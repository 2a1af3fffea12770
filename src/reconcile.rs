//! Keyed reconciliation - the Enter/Update/Exit join.
//!
//! Given the currently rendered keyed set and a freshly filtered row
//! sequence, compute which bars are new, which persist (and must be
//! animated to new values), and which disappear. The identity key
//! compensates for cohort aging (see [`row_key`]), so a cohort's bar
//! "slides" across years instead of popping out and back in: object
//! constancy.
//!
//! The reconciler is pure. It never touches the render surface, never
//! animates, and is re-run in full on every state change; partitions
//! are returned as an explicit immutable structure rather than mutated
//! in place.
//!
//! # Key semantics
//!
//! - Forward step (+10): incoming rows key as `age_group - 10`, which
//!   matches the bar rendered for the same cohort ten years younger.
//! - Backward step (-10): symmetric, `age_group + 10`.
//! - Step 0 (sex switch): the key degenerates to `age_group`, so every
//!   bar persists and only color and height change.
//!
//! Keys within one incoming set must be pairwise unique. A duplicate
//! is a fatal consistency error, reported with the colliding key -
//! never silently merged or dropped.

use std::collections::{HashMap, HashSet};

use crate::error::{ChartError, Result};
use crate::types::{row_key, Key, Row};

// =============================================================================
// Partition
// =============================================================================

/// An incoming row that matched an existing rendered bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateEntry {
    /// The join key under which the match was found.
    pub key: Key,
    /// The row carrying the bar's new values.
    pub row: Row,
}

/// The three disjoint partitions of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Rows with no match in the previous set: bars to create.
    pub enter: Vec<Row>,
    /// Rows matching a previous entry: bars to animate to new values.
    pub update: Vec<UpdateEntry>,
    /// Previous keys with no match among incoming keys: bars to remove.
    pub exit: Vec<Key>,
}

impl Partition {
    /// True when the pass changes nothing structurally (no bar created
    /// or removed).
    pub fn is_structurally_empty(&self) -> bool {
        self.enter.is_empty() && self.exit.is_empty()
    }
}

// =============================================================================
// reconcile
// =============================================================================

/// Compute the Enter/Update/Exit partition.
///
/// `previous` maps join keys to whatever the caller renders (the value
/// type is opaque here - only the key set matters). `incoming` is the
/// filtered row sequence for `target_year`; `step` is the signed year
/// delta (-10, 0, or +10) feeding the aging-compensated key.
///
/// Enter and update preserve incoming order; exit keys are sorted
/// ascending so the partition is deterministic.
///
/// # Errors
///
/// [`ChartError::KeyCollision`] if two incoming rows resolve to the
/// same key. No partition is returned in that case.
pub fn reconcile<V>(
    previous: &HashMap<Key, V>,
    incoming: &[Row],
    target_year: i32,
    step: i32,
) -> Result<Partition> {
    let mut seen: HashSet<Key> = HashSet::with_capacity(incoming.len());
    let mut enter = Vec::new();
    let mut update = Vec::new();

    for row in incoming {
        let key = row_key(row, target_year, step);
        if !seen.insert(key) {
            return Err(ChartError::KeyCollision { key });
        }

        if previous.contains_key(&key) {
            update.push(UpdateEntry { key, row: *row });
        } else {
            enter.push(*row);
        }
    }

    let mut exit: Vec<Key> = previous
        .keys()
        .filter(|key| !seen.contains(key))
        .copied()
        .collect();
    exit.sort_unstable();

    tracing::trace!(
        enter = enter.len(),
        update = update.len(),
        exit = exit.len(),
        "reconciled"
    );

    Ok(Partition {
        enter,
        update,
        exit,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sex;

    fn rows_for_year(year: i32, ages: &[i32]) -> Vec<Row> {
        ages.iter()
            .map(|&age| Row {
                year,
                age_group: age,
                sex: Sex::Female,
                people: 100 + age as i64,
            })
            .collect()
    }

    fn keyed(keys: &[Key]) -> HashMap<Key, ()> {
        keys.iter().map(|&k| (k, ())).collect()
    }

    #[test]
    fn test_all_enter_when_previous_empty() {
        let incoming = rows_for_year(1900, &[0, 10, 20]);
        let partition = reconcile(&keyed(&[]), &incoming, 1900, 0).unwrap();

        assert_eq!(partition.enter, incoming);
        assert!(partition.update.is_empty());
        assert!(partition.exit.is_empty());
    }

    #[test]
    fn test_forward_step_slides_cohorts() {
        // Rendered set for 1900, keyed by plain age_group.
        let ages: Vec<i32> = (0..10).map(|i| i * 10).collect();
        let previous = keyed(&ages);

        // Step to 1910: incoming keys shift back by 10.
        let incoming = rows_for_year(1910, &ages);
        let partition = reconcile(&previous, &incoming, 1910, 10).unwrap();

        // Age 0 at 1910 keys to -10: a newborn cohort enters.
        assert_eq!(partition.enter.len(), 1);
        assert_eq!(partition.enter[0].age_group, 0);

        // Ages 10..90 match the same cohorts ten years younger.
        assert_eq!(partition.update.len(), 9);
        for entry in &partition.update {
            assert_eq!(entry.key, entry.row.age_group - 10);
        }

        // The 1900 age-90 bar has no successor.
        assert_eq!(partition.exit, vec![90]);
    }

    #[test]
    fn test_sex_switch_preserves_identity() {
        let ages: Vec<i32> = (0..10).map(|i| i * 10).collect();
        let previous = keyed(&ages);

        // Same year, new sex: step 0, keys are plain age groups.
        let incoming = rows_for_year(1900, &ages);
        let partition = reconcile(&previous, &incoming, 1900, 0).unwrap();

        assert!(partition.enter.is_empty());
        assert!(partition.exit.is_empty());
        assert_eq!(partition.update.len(), incoming.len());
    }

    #[test]
    fn test_idempotent_second_pass() {
        let ages = [0, 10, 20];
        let incoming = rows_for_year(1900, &ages);

        // First pass renders everything; second pass against the
        // resulting key set must be pure updates.
        let first = reconcile(&keyed(&[]), &incoming, 1900, 0).unwrap();
        assert_eq!(first.enter.len(), 3);

        let rendered: Vec<Key> = first.enter.iter().map(|r| r.age_group).collect();
        let second = reconcile(&keyed(&rendered), &incoming, 1900, 0).unwrap();
        assert!(second.is_structurally_empty());
        assert_eq!(second.update.len(), 3);
    }

    #[test]
    fn test_round_trip_restores_key_set() {
        let ages: Vec<i32> = (0..10).map(|i| i * 10).collect();
        let before: HashMap<Key, ()> = keyed(&ages);

        // Forward: 1900 -> 1910.
        let forward = reconcile(&before, &rows_for_year(1910, &ages), 1910, 10).unwrap();
        let mut after_forward: HashMap<Key, ()> = HashMap::new();
        for row in &forward.enter {
            after_forward.insert(row.age_group, ());
        }
        for entry in &forward.update {
            after_forward.insert(entry.row.age_group, ());
        }

        // Backward: 1910 -> 1900.
        let back = reconcile(&after_forward, &rows_for_year(1900, &ages), 1900, -10).unwrap();
        let mut after_back: HashMap<Key, ()> = HashMap::new();
        for row in &back.enter {
            after_back.insert(row.age_group, ());
        }
        for entry in &back.update {
            after_back.insert(entry.row.age_group, ());
        }

        let mut expected: Vec<Key> = before.keys().copied().collect();
        let mut actual: Vec<Key> = after_back.keys().copied().collect();
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_key_collision_is_fatal() {
        // Two rows for the same cohort resolve to the same key.
        let mut incoming = rows_for_year(1900, &[0, 10]);
        incoming.push(Row {
            year: 1900,
            age_group: 10,
            sex: Sex::Female,
            people: 42,
        });

        match reconcile(&keyed(&[]), &incoming, 1900, 0) {
            Err(ChartError::KeyCollision { key: 10 }) => {}
            other => panic!("expected KeyCollision at key 10, got {other:?}"),
        }
    }

    #[test]
    fn test_collision_across_shifted_keys() {
        // An aged cohort and a younger one can collide through the
        // shift: age 20 at the target year keys to 10, same as a
        // non-target-year row with age_group 10.
        let incoming = vec![
            Row { year: 1910, age_group: 20, sex: Sex::Female, people: 1 },
            Row { year: 1900, age_group: 10, sex: Sex::Female, people: 2 },
        ];
        assert!(matches!(
            reconcile(&keyed(&[]), &incoming, 1910, 10),
            Err(ChartError::KeyCollision { key: 10 })
        ));
    }

    #[test]
    fn test_exit_keys_sorted() {
        let previous = keyed(&[50, 10, 30]);
        let partition = reconcile(&previous, &[], 1900, 0).unwrap();
        assert_eq!(partition.exit, vec![10, 30, 50]);
    }
}

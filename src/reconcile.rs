use std::collections::HashSet;

use crate::models::Weekday;

/// What bulk schedule sync has to do to make the stored weekday set match the
/// submitted one exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Stored days absent from the target set.
    pub delete: Vec<Weekday>,
    /// Target days with no stored entry yet.
    pub create: Vec<Weekday>,
}

/// Computes the plan as a set difference in both directions, so the order of
/// the submitted days is irrelevant and duplicates collapse. Days present on
/// both sides are left alone, which is what keeps previously set start/end
/// times intact across a sync.
pub fn plan_sync(existing: &[Weekday], target: &HashSet<Weekday>) -> SyncPlan {
    let stored: HashSet<Weekday> = existing.iter().copied().collect();

    let mut delete: Vec<Weekday> = stored.difference(target).copied().collect();
    let mut create: Vec<Weekday> = target.difference(&stored).copied().collect();
    delete.sort_by_key(|d| d.ordinal());
    create.sort_by_key(|d| d.ordinal());

    SyncPlan { delete, create }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::collections::HashMap;

    fn target(days: &[Weekday]) -> HashSet<Weekday> {
        days.iter().copied().collect()
    }

    /// Minimal stand-in for the stored schedule: weekday -> start time.
    fn apply(
        schedule: &mut HashMap<Weekday, Option<NaiveTime>>,
        plan: &SyncPlan,
    ) {
        for day in &plan.delete {
            schedule.remove(day);
        }
        for day in &plan.create {
            // bulk sync always creates entries without times
            schedule.insert(*day, None);
        }
    }

    #[test]
    fn plan_on_empty_schedule_creates_everything() {
        let plan = plan_sync(&[], &target(&[Weekday::Wed, Weekday::Mon]));
        assert_eq!(plan.delete, vec![]);
        assert_eq!(plan.create, vec![Weekday::Mon, Weekday::Wed]);
    }

    #[test]
    fn plan_is_a_set_difference_both_ways() {
        let plan = plan_sync(
            &[Weekday::Mon, Weekday::Wed],
            &target(&[Weekday::Wed, Weekday::Fri]),
        );
        assert_eq!(plan.delete, vec![Weekday::Mon]);
        assert_eq!(plan.create, vec![Weekday::Fri]);
    }

    #[test]
    fn matching_sets_plan_nothing() {
        let plan = plan_sync(
            &[Weekday::Tue, Weekday::Thu],
            &target(&[Weekday::Thu, Weekday::Tue]),
        );
        assert_eq!(plan.delete, vec![]);
        assert_eq!(plan.create, vec![]);
    }

    #[test]
    fn input_order_and_duplicates_are_irrelevant() {
        let shuffled: HashSet<Weekday> = [Weekday::Fri, Weekday::Mon, Weekday::Fri, Weekday::Mon]
            .into_iter()
            .collect();
        let plan = plan_sync(&[Weekday::Mon], &shuffled);
        assert_eq!(plan.delete, vec![]);
        assert_eq!(plan.create, vec![Weekday::Fri]);
    }

    #[test]
    fn sync_is_idempotent() {
        let mut schedule = HashMap::from([(Weekday::Mon, None)]);
        let days = target(&[Weekday::Mon, Weekday::Wed]);

        let first = plan_sync(&[Weekday::Mon], &days);
        apply(&mut schedule, &first);
        let stored: Vec<Weekday> = schedule.keys().copied().collect();

        let second = plan_sync(&stored, &days);
        assert_eq!(second.delete, vec![]);
        assert_eq!(second.create, vec![]);
    }

    #[test]
    fn surviving_days_keep_their_times_and_new_days_get_none() {
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let mut schedule = HashMap::from([
            (Weekday::Mon, Some(ten)),
            (Weekday::Wed, Some(ten)),
        ]);

        let stored: Vec<Weekday> = schedule.keys().copied().collect();
        let plan = plan_sync(&stored, &target(&[Weekday::Wed, Weekday::Fri]));
        apply(&mut schedule, &plan);

        assert_eq!(
            schedule.keys().copied().collect::<HashSet<_>>(),
            target(&[Weekday::Wed, Weekday::Fri])
        );
        // WED kept its time; MON is gone.
        assert_eq!(schedule[&Weekday::Wed], Some(ten));
        // Days added through bulk sync never receive times through this path;
        // times only arrive via the single-day endpoint.
        assert_eq!(schedule[&Weekday::Fri], None);
    }
}

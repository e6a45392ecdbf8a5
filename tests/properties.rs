//! Property tests: board invariants hold after any sequence of operations.

use daybook::tasks::codec;
use daybook::tasks::{EntityGraph, ListId, Snapshot, TaskId};
use daybook::testing::{FixedClock, MemorySlotStore};
use daybook::{Clock, EmptyListPolicy};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    NewGroup,
    NextDay,
    NewList(usize),
    NewTask(usize),
    Check(usize, usize, bool),
    Edit(usize, usize, String),
    Due(usize, usize, bool),
    DeleteTask(usize, usize),
    DeleteGroup(usize),
    ToggleList(usize),
    ToggleTasks(usize),
    ToggleGroup(usize),
    ToggleGroupLists(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::NewGroup),
        1 => Just(Op::NextDay),
        3 => any::<usize>().prop_map(Op::NewList),
        5 => any::<usize>().prop_map(Op::NewTask),
        4 => (any::<usize>(), any::<usize>(), any::<bool>()).prop_map(|(l, t, c)| Op::Check(l, t, c)),
        1 => (any::<usize>(), any::<usize>(), "[ a-z]{0,8}").prop_map(|(l, t, s)| Op::Edit(l, t, s)),
        1 => (any::<usize>(), any::<usize>(), any::<bool>()).prop_map(|(l, t, d)| Op::Due(l, t, d)),
        4 => (any::<usize>(), any::<usize>()).prop_map(|(l, t)| Op::DeleteTask(l, t)),
        1 => any::<usize>().prop_map(Op::DeleteGroup),
        1 => any::<usize>().prop_map(Op::ToggleList),
        1 => any::<usize>().prop_map(Op::ToggleTasks),
        1 => any::<usize>().prop_map(Op::ToggleGroup),
        1 => any::<usize>().prop_map(Op::ToggleGroupLists),
    ]
}

fn pick_date(s: &Snapshot, i: usize) -> Option<String> {
    (!s.groups.is_empty()).then(|| s.groups[i % s.groups.len()].date.clone())
}

fn pick_list(s: &Snapshot, i: usize) -> Option<ListId> {
    let lists: Vec<ListId> = s.list_ids().collect();
    (!lists.is_empty()).then(|| lists[i % lists.len()])
}

fn pick_task(s: &Snapshot, l: usize, t: usize) -> Option<(ListId, TaskId)> {
    let list = pick_list(s, l)?;
    let tasks = s.tasks.get(&list)?;
    (!tasks.is_empty()).then(|| (list, tasks[t % tasks.len()].id))
}

fn apply(g: &mut EntityGraph<&FixedClock>, clock: &FixedClock, op: &Op) {
    let s = g.snapshot();
    match op {
        Op::NewGroup => {
            g.create_group();
        }
        Op::NextDay => clock.advance_days(1),
        Op::NewList(i) => {
            if let Some(date) = pick_date(s, *i) {
                g.create_list(&date);
            }
        }
        Op::NewTask(i) => {
            if let Some(list) = pick_list(s, *i) {
                g.create_task(list);
            }
        }
        Op::Check(l, t, checked) => {
            if let Some((list, task)) = pick_task(s, *l, *t) {
                g.update_task_checked(list, task, *checked);
            }
        }
        Op::Edit(l, t, text) => {
            if let Some((list, task)) = pick_task(s, *l, *t) {
                g.update_task_content(list, task, text);
            }
        }
        Op::Due(l, t, set) => {
            if let Some((list, task)) = pick_task(s, *l, *t) {
                let due = set.then(|| clock.now().date());
                g.update_task_due_date(list, task, due);
            }
        }
        Op::DeleteTask(l, t) => {
            if let Some((list, task)) = pick_task(s, *l, *t) {
                g.delete_task(list, task);
            }
        }
        Op::DeleteGroup(i) => {
            if let Some(date) = pick_date(s, *i) {
                g.delete_group(&date);
            }
        }
        Op::ToggleList(i) => {
            if let Some(list) = pick_list(s, *i) {
                g.toggle_list(list);
            }
        }
        Op::ToggleTasks(i) => {
            if let Some(list) = pick_list(s, *i) {
                g.toggle_list_tasks(list);
            }
        }
        Op::ToggleGroup(i) => {
            if let Some(date) = pick_date(s, *i) {
                g.toggle_group(&date);
            }
        }
        Op::ToggleGroupLists(i) => {
            if let Some(date) = pick_date(s, *i) {
                g.toggle_group_lists(&date);
            }
        }
    }
}

fn policy(prune: bool) -> EmptyListPolicy {
    if prune {
        EmptyListPolicy::Prune
    } else {
        EmptyListPolicy::Keep
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn invariants_hold_after_every_operation(
        prune in any::<bool>(),
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let clock = FixedClock::at(2024, 6, 1, 9, 0);
        let mut g = EntityGraph::new(&clock, policy(prune));

        for op in &ops {
            apply(&mut g, &clock, op);
            let problems = g.snapshot().check_consistency();
            prop_assert!(problems.is_empty(), "after {:?}: {:?}", op, problems);

            for (list, tasks) in &g.snapshot().tasks {
                let unchecked = tasks.iter().filter(|t| !t.checked).count();
                prop_assert_eq!(g.snapshot().incomplete_counts[list] as usize, unchecked);
            }
        }
    }

    #[test]
    fn toggling_a_list_twice_is_identity(
        ops in prop::collection::vec(op_strategy(), 0..40),
        pick in any::<usize>(),
    ) {
        let clock = FixedClock::at(2024, 6, 1, 9, 0);
        let mut g = EntityGraph::new(&clock, EmptyListPolicy::Keep);
        for op in &ops {
            apply(&mut g, &clock, op);
        }

        if let Some(list) = pick_list(g.snapshot(), pick) {
            let before = g.snapshot().clone();
            g.toggle_list(list);
            g.toggle_list(list);
            prop_assert_eq!(g.snapshot(), &before);
        }
    }

    #[test]
    fn deleting_a_group_leaves_no_residue(
        ops in prop::collection::vec(op_strategy(), 0..40),
        pick in any::<usize>(),
    ) {
        let clock = FixedClock::at(2024, 6, 1, 9, 0);
        let mut g = EntityGraph::new(&clock, EmptyListPolicy::Keep);
        for op in &ops {
            apply(&mut g, &clock, op);
        }

        if let Some(date) = pick_date(g.snapshot(), pick) {
            let doomed = g.snapshot().lists_on(&date);
            g.delete_group(&date);

            let s = g.snapshot();
            for list in doomed {
                prop_assert!(!s.tasks.contains_key(&list));
                prop_assert!(!s.categories.contains_key(&list));
                prop_assert!(!s.incomplete_counts.contains_key(&list));
                prop_assert!(!s.list_expanded.contains_key(&list));
                prop_assert!(!s.tasks_expanded.contains_key(&list));
            }
            prop_assert!(!s.has_group(&date));
        }
    }

    #[test]
    fn save_then_load_reproduces_state(
        prune in any::<bool>(),
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let clock = FixedClock::at(2024, 6, 1, 9, 0);
        let mut g = EntityGraph::new(&clock, policy(prune));
        for op in &ops {
            apply(&mut g, &clock, op);
        }

        let store = MemorySlotStore::new();
        codec::save(&store, g.snapshot()).unwrap();
        let loaded = codec::load(&store).unwrap();

        prop_assert!(loaded.report.is_clean(), "{:?}", loaded.report);
        prop_assert_eq!(&loaded.snapshot, g.snapshot());
    }
}

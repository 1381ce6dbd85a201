use bankcore::*;
use proptest::prelude::*;

// Allocation ≤ Max by construction: each cell draws two values and
// Max takes the larger one.
fn state() -> impl Strategy<Value = (Vector, Matrix, Matrix)> {
    (0usize..6, 0usize..4)
        .prop_flat_map(|(p, r)| {
            (
                prop::collection::vec(0usize..8, r),
                prop::collection::vec(prop::collection::vec((0usize..8, 0usize..8), r), p),
            )
        })
        .prop_map(|(available, cells)| {
            let max: Matrix = cells.iter()
                .map(|row| row.iter().map(|&(a, b)| a.max(b)).collect())
                .collect();
            let allocation: Matrix = cells.iter()
                .map(|row| row.iter().map(|&(a, b)| a.min(b)).collect())
                .collect();
            (available, max, allocation)
        })
}

fn snapshot() -> impl Strategy<Value = Snapshot> {
    state().prop_map(|(available, max, allocation)| {
        Snapshot::new(max.len(), available.len(), available, max, allocation).unwrap()
    })
}

// Process indices run one past the end, so malformed requests show up too.
fn with_request() -> impl Strategy<Value = (Snapshot, ProcessId, Vector)> {
    snapshot().prop_flat_map(|s| {
        let (p, r) = (s.processes(), s.resources());
        (Just(s), 0..p + 1, prop::collection::vec(0usize..5, r))
    })
}

proptest! {
    #[test]
    fn need_is_exact((available, max, allocation) in state()) {
        let s = Snapshot::new(max.len(), available.len(), available, max.clone(), allocation.clone()).unwrap();
        for i in 0..s.processes() {
            for j in 0..s.resources() {
                prop_assert_eq!(s.need()[i][j], max[i][j] - allocation[i][j]);
            }
        }
    }

    #[test]
    fn safety_is_deterministic(s in snapshot()) {
        prop_assert_eq!(s.check_safety(), s.check_safety());
    }

    #[test]
    fn safe_sequences_replay(s in snapshot()) {
        let r = s.check_safety();
        if r.is_safe {
            prop_assert_eq!(r.sequence.len(), s.processes());
            prop_assert!(s.replay(&r.sequence));
        } else {
            prop_assert!(r.safe_sequence().is_empty());
        }
        prop_assert!(
            matches!(r.trace.last(), Some(TraceEvent::Halt { .. })),
            "trace must end in a halt event"
        );
    }

    #[test]
    fn deadlocked_are_exactly_the_unfinished(s in snapshot()) {
        let r = s.detect_deadlock();
        prop_assert_eq!(r.is_deadlocked, !s.check_safety().is_safe);
        let finished: BTreeSet<ProcessId> = r.safe_sequence.iter().copied().collect();
        let unfinished: BTreeSet<ProcessId> = (0..s.processes())
            .filter(|p| !finished.contains(p))
            .collect();
        prop_assert_eq!(&r.deadlocked_processes, &unfinished);

        // One more round would change nothing.
        let mut work = s.available().to_vec();
        for &p in &r.safe_sequence {
            for (w, h) in work.iter_mut().zip(s.allocation()[p].iter()) {
                *w += h;
            }
        }
        for &p in &r.deadlocked_processes {
            prop_assert!(s.need()[p].iter().zip(work.iter()).any(|(n, w)| n > w));
        }
    }

    #[test]
    fn requests_never_touch_the_live_state((s, process, request) in with_request()) {
        let before = s.clone();
        let _ = s.evaluate_request(process, &request);
        prop_assert_eq!(&s, &before);
    }

    #[test]
    fn granted_requests_move_units((s, process, request) in with_request()) {
        if let Ok(v) = s.evaluate_request(process, &request) {
            if v.is_granted() {
                let trial = v.trial().unwrap();
                for k in 0..s.resources() {
                    prop_assert_eq!(trial.available[k] + request[k], s.available()[k]);
                    prop_assert_eq!(
                        trial.allocation[process][k],
                        s.allocation()[process][k] + request[k]
                    );
                }
                for p in (0..s.processes()).filter(|&p| p != process) {
                    prop_assert_eq!(&trial.allocation[p], &s.allocation()[p]);
                }
                let replayed = Snapshot::new(
                    s.processes(),
                    s.resources(),
                    trial.available.clone(),
                    s.max().clone(),
                    trial.allocation.clone(),
                ).unwrap();
                prop_assert!(replayed.replay(v.safe_sequence()));
            }
        } else {
            prop_assert!(process >= s.processes());
        }
    }
}

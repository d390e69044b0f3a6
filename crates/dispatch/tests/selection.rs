//! Selection sweep behaviour with injected costs and the real catalog.

use std::sync::atomic::{AtomicU64, Ordering};

use dispatch::{
    CandidateStatus, DispatchSlot, KernelSelector, MicrobenchConfig, Microbenchmark,
    SelectError, select_implementation_with,
};
use kernels::{
    FillSegment, Implementation, Instance, InstanceError, Position, REFERENCE, Reference,
};
use logging::ProgressSink;
use proptest::prelude::*;

fn passes() -> bool {
    true
}

fn fails() -> bool {
    false
}

fn candidate(name: &'static str, supported: bool) -> Implementation {
    let check: fn() -> bool = if supported { passes } else { fails };
    Implementation::new(name, Some(check), &Reference)
}

type Measured = Result<u64, SelectError>;

fn cost_by_name<'c>(costs: &'c [(&'c str, u64)]) -> impl FnMut(&Implementation) -> Measured + 'c {
    move |implementation| {
        Ok(costs
            .iter()
            .find(|(name, _)| *name == implementation.name())
            .map_or(u64::MAX, |(_, cost)| *cost))
    }
}

/// Runs a sweep into a fresh slot and returns the selection, the slot and the progress text.
fn sweep(
    candidates: &[Implementation],
    measure: impl FnMut(&Implementation) -> Measured,
) -> (dispatch::Selection, DispatchSlot, String) {
    let slot = DispatchSlot::new();
    let mut selector =
        KernelSelector::new(&slot).with_progress(ProgressSink::with_label(Vec::new(), "[t] "));
    let selection = selector.run(candidates, measure).unwrap();
    let output = selector.into_progress().into_inner().unwrap();
    (selection, slot, String::from_utf8(output).unwrap())
}

const FALLBACK: &str = "No optimized implementation available, using default!";

// ============================================================================
// Injected costs
// ============================================================================

#[test]
fn all_checks_failing_leaves_slot_unchanged() {
    let candidates = [candidate("a", false), candidate("b", false)];
    let (selection, slot, output) = sweep(&candidates, |_| panic!("must not be measured"));

    assert!(selection.kept_default());
    assert!(!slot.is_frozen());
    assert_eq!(slot.current(), REFERENCE);
    assert!(
        selection
            .outcomes()
            .iter()
            .all(|outcome| outcome.status == CandidateStatus::CapabilityUnsupported)
    );
    assert!(output.contains("[t]   Checking implementation 'a'... CHECK FAILED!\n"));
    assert!(output.contains(FALLBACK));
}

#[test]
fn single_passing_candidate_wins_regardless_of_cost() {
    let candidates = [
        candidate("a", false),
        candidate("b", true),
        candidate("c", false),
    ];
    let (selection, slot, _) = sweep(&candidates, |_| Ok(u64::MAX - 1));

    assert_eq!(selection.chosen().map(|imp| imp.name()), Some("b"));
    assert_eq!(slot.current().name(), "b");
}

#[test]
fn strictly_cheaper_candidate_is_selected() {
    let candidates = [candidate("a", true), candidate("b", true)];
    let (selection, slot, output) = sweep(&candidates, cost_by_name(&[("a", 100), ("b", 50)]));

    assert_eq!(slot.current().name(), "b");
    assert_eq!(selection.chosen_cost(), Some(50));
    assert!(output.contains("  Selecting best implementation: 'b' (bench 50)...\n"));
    assert!(!output.contains(FALLBACK));
}

#[test]
fn tie_goes_to_first_listed_candidate() {
    let candidates = [candidate("a", true), candidate("b", true)];
    let (_, slot, _) = sweep(&candidates, |_| Ok(75));
    assert_eq!(slot.current().name(), "a");
}

#[test]
fn failed_candidates_are_never_measured() {
    let candidates = [candidate("skip", false), candidate("keep", true)];
    let mut measured = Vec::new();
    let (selection, _, _) = sweep(&candidates, |implementation| {
        measured.push(implementation.name());
        Ok(1)
    });

    assert_eq!(measured, ["keep"]);
    assert_eq!(selection.outcomes().len(), 2);
    assert_eq!(
        selection.outcomes()[1].status,
        CandidateStatus::Measured { cost: 1 }
    );
}

#[test]
fn progress_transcript_for_single_reference_entry() {
    let candidates = [Implementation::new("ref", None, &Reference)];
    let (selection, slot, output) = sweep(&candidates, |_| Ok(100));

    assert_eq!(slot.current().name(), "ref");
    assert_eq!(selection.chosen_cost(), Some(100));
    assert_eq!(
        output,
        "[t] Selecting fill_segment function implementation...\n\
         [t]   Checking implementation 'ref'... OK!\n\
         [t]     Measuring...\n\
         [t]     Benchmark result: 100\n\
         [t]   Selecting best implementation: 'ref' (bench 100)...\n\
         [t]   Done!\n"
    );
}

#[test]
fn empty_catalog_keeps_default() {
    let (selection, slot, output) = sweep(&[], |_| Ok(0));
    assert!(selection.kept_default());
    assert_eq!(slot.current(), REFERENCE);
    assert!(output.contains(FALLBACK));
    assert!(output.ends_with("[t]   Done!\n"));
}

#[test]
fn frozen_slot_rejects_a_second_sweep() {
    let slot = DispatchSlot::new();
    let candidates = [candidate("a", true)];
    KernelSelector::new(&slot).run(&candidates, |_| Ok(1)).unwrap();

    let again = [candidate("b", true)];
    let error = KernelSelector::new(&slot).run(&again, |_| Ok(1)).unwrap_err();
    assert_eq!(error, SelectError::AlreadySelected { installed: "a" });
    assert_eq!(slot.current().name(), "a");
}

#[test]
fn frozen_slot_is_neither_measured_nor_reported() {
    let slot = DispatchSlot::new();
    slot.install(candidate("a", true)).unwrap();

    let mut measured = Vec::new();
    let mut selector =
        KernelSelector::new(&slot).with_progress(ProgressSink::with_label(Vec::new(), "[t] "));
    let error = selector
        .run(&[candidate("b", true)], |implementation| {
            measured.push(implementation.name());
            Ok(5)
        })
        .unwrap_err();

    assert_eq!(error, SelectError::AlreadySelected { installed: "a" });
    assert!(measured.is_empty());
    assert!(selector.into_progress().into_inner().unwrap().is_empty());
    assert_eq!(slot.current().name(), "a");
}

#[test]
fn measurement_failure_aborts_without_installing() {
    let candidates = [candidate("a", true), candidate("b", true)];
    let slot = DispatchSlot::new();
    let mut selector =
        KernelSelector::new(&slot).with_progress(ProgressSink::with_label(Vec::new(), "[t] "));
    let failure = SelectError::Instance(InstanceError::MemoryMismatch {
        expected: 512,
        actual: 0,
    });

    let error = selector
        .run(&candidates, |implementation| {
            if implementation.name() == "b" { Err(failure) } else { Ok(10) }
        })
        .unwrap_err();

    assert_eq!(error, failure);
    assert!(!slot.is_frozen());
    let output = String::from_utf8(selector.into_progress().into_inner().unwrap()).unwrap();
    assert!(!output.contains("Selecting best implementation"));
    assert!(!output.contains("Done!"));
}

#[test]
fn silent_selector_writes_nothing() {
    let slot = DispatchSlot::new();
    let mut selector = KernelSelector::new(&slot)
        .with_progress(ProgressSink::<Vec<u8>>::from_option(None, "[t] "));
    selector.run(&[candidate("a", true)], |_| Ok(3)).unwrap();
    assert!(selector.into_progress().into_inner().is_none());
}

const NAMES: [&str; 8] = ["k0", "k1", "k2", "k3", "k4", "k5", "k6", "k7"];

proptest! {
    #[test]
    fn selection_picks_first_minimum_among_passers(
        entries in proptest::collection::vec((any::<bool>(), 0u64..8), 0..8)
    ) {
        let candidates: Vec<_> = entries
            .iter()
            .zip(NAMES)
            .map(|(&(supported, _), name)| candidate(name, supported))
            .collect();
        let costs: Vec<_> = entries
            .iter()
            .zip(NAMES)
            .map(|(&(_, cost), name)| (name, cost))
            .collect();

        let (selection, slot, _) = sweep(&candidates, cost_by_name(&costs));

        let mut expected: Option<(&str, u64)> = None;
        for (&(supported, cost), name) in entries.iter().zip(NAMES) {
            if supported && expected.is_none_or(|(_, best)| cost < best) {
                expected = Some((name, cost));
            }
        }

        prop_assert_eq!(selection.chosen().map(|imp| imp.name()), expected.map(|(name, _)| name));
        prop_assert_eq!(slot.current().name(), expected.map_or("(default)", |(name, _)| name));
    }
}

// ============================================================================
// Microbenchmark
// ============================================================================

struct Counting(AtomicU64);

impl FillSegment for Counting {
    fn fill_segment(&self, _instance: &Instance<'_>, _position: Position) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

static COUNTING: Counting = Counting(AtomicU64::new(0));

#[test]
fn microbenchmark_calls_warm_up_plus_every_timed_iteration() {
    let config = MicrobenchConfig::default().with_iterations(5).with_rounds(3);
    let mut bench = Microbenchmark::new(config).unwrap();
    let counting = Implementation::new("counting", None, &COUNTING);

    let before = COUNTING.0.load(Ordering::Relaxed);
    bench.measure(&counting).unwrap();
    let calls = COUNTING.0.load(Ordering::Relaxed) - before;

    assert_eq!(calls, config.calls());
    assert_eq!(calls, 16);
}

#[test]
fn microbenchmark_cost_grows_with_iterations() {
    let mut short = Microbenchmark::new(MicrobenchConfig::default().with_iterations(4)).unwrap();
    let mut long = Microbenchmark::new(MicrobenchConfig::default().with_iterations(512)).unwrap();

    let short_cost = short.measure(&REFERENCE).unwrap();
    let long_cost = long.measure(&REFERENCE).unwrap();
    assert!(
        long_cost > short_cost,
        "512 iterations ({long_cost} ns) should cost more than 4 ({short_cost} ns)"
    );
}

#[test]
fn repeated_measurements_stay_within_an_order_of_magnitude() {
    let config = MicrobenchConfig::default().with_iterations(256);
    let mut bench = Microbenchmark::new(config).unwrap();

    let costs: Vec<u64> = (0..5).map(|_| bench.measure(&REFERENCE).unwrap()).collect();
    let fastest = *costs.iter().min().unwrap();
    let slowest = *costs.iter().max().unwrap();

    assert!(fastest > 0, "costs {costs:?}");
    assert!(slowest < fastest * 10, "costs {costs:?} spread too far");
}

// ============================================================================
// Real catalog
// ============================================================================

#[test]
fn real_catalog_selects_a_supported_kernel() {
    let slot = DispatchSlot::new();
    let mut output = Vec::new();
    let config = MicrobenchConfig::default().with_iterations(8).with_rounds(1);
    let selection =
        select_implementation_with(&slot, config, Some(&mut output), "[libargon2] ").unwrap();

    let output = String::from_utf8(output).unwrap();
    assert!(output.starts_with("[libargon2] Selecting fill_segment function implementation...\n"));
    assert!(output.ends_with("[libargon2]   Done!\n"));

    match selection.chosen() {
        Some(chosen) => {
            assert!(chosen.is_supported());
            assert_eq!(slot.current(), chosen);
            assert!(kernels::implementations().contains(&chosen));
        }
        None => {
            assert!(
                kernels::implementations()
                    .iter()
                    .all(|imp| !imp.is_supported())
            );
            assert_eq!(slot.current(), REFERENCE);
        }
    }
}

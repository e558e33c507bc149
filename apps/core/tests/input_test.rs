use std::sync::{Arc, Mutex};
use std::time::Duration;

use typeahead_core::input::{Behavior, InputOptions, TypeaheadInput, DEBOUNCE_WINDOW};
use typeahead_core::lookup::ScriptedLookup;
use typeahead_core::model::RowKind;
use typeahead_core::presentation::Presentation;

struct Harness {
    input: TypeaheadInput,
    lookup: Arc<ScriptedLookup>,
    selected: Arc<Mutex<Vec<String>>>,
}

fn harness(lookup: ScriptedLookup, behavior: Behavior) -> Harness {
    let lookup = Arc::new(lookup);
    let selected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&selected);
    let options = InputOptions::new(move |value| sink.lock().unwrap().push(value.to_string()))
        .with_placeholder("Search fruit");
    let input = TypeaheadInput::new(options, lookup.clone(), behavior);
    Harness {
        input,
        lookup,
        selected,
    }
}

fn fruit_lookup() -> ScriptedLookup {
    ScriptedLookup::default()
        .respond("ab", ["apple", "band"])
        .respond("zz", Vec::<String>::new())
        .fail("xx", "Network down")
}

async fn settle() {
    tokio::time::sleep(DEBOUNCE_WINDOW + Duration::from_millis(50)).await;
}

#[tokio::test(start_paused = true)]
async fn nothing_renders_before_typing() {
    let h = harness(fruit_lookup(), Behavior::default());

    assert_eq!(h.input.view(), Presentation::Hidden);
    assert_eq!(h.input.placeholder(), Some("Search fruit"));
}

#[tokio::test(start_paused = true)]
async fn typing_burst_runs_one_lookup_for_last_text() {
    let mut h = harness(fruit_lookup(), Behavior::default());

    h.input.on_input("a");
    h.input.on_input("ab");
    settle().await;

    assert_eq!(h.lookup.calls(), vec!["ab"]);
    let view = h.input.view();
    let texts: Vec<&str> = view.rows().iter().map(|row| row.text.as_str()).collect();
    assert_eq!(texts, vec!["apple", "band"]);
    assert!(view.rows().iter().all(|row| row.kind == RowKind::Match));
    assert!(!h.input.state().loading);
}

#[tokio::test(start_paused = true)]
async fn empty_input_after_query_hides_section() {
    let mut h = harness(fruit_lookup(), Behavior::default());

    h.input.on_input("ab");
    settle().await;
    h.input.on_input("");

    assert_eq!(h.input.view(), Presentation::Hidden);
    settle().await;
    assert!(h.input.state().rows.is_empty());
    assert_eq!(h.lookup.calls(), vec!["ab"]);
}

#[tokio::test(start_paused = true)]
async fn no_matches_render_the_no_result_row() {
    let mut h = harness(fruit_lookup(), Behavior::default());

    h.input.on_input("zz");
    settle().await;

    let view = h.input.view();
    assert_eq!(view.rows().len(), 1);
    assert_eq!(view.rows()[0].kind, RowKind::NoResult);
    assert_eq!(view.rows()[0].text, "No result");
    assert_eq!(view.rows()[0].class_name(), "item results-container__no-result");
}

#[tokio::test(start_paused = true)]
async fn failures_render_inline_and_reach_the_failure_channel() {
    let mut h = harness(fruit_lookup(), Behavior::default());
    let mut failures = h.input.take_failures().expect("failure channel");
    assert!(h.input.take_failures().is_none());

    h.input.on_input("xx");
    settle().await;

    let view = h.input.view();
    assert_eq!(view.rows()[0].key, -1);
    assert_eq!(view.rows()[0].text, "Network down");
    let failure = failures.try_recv().expect("failure should be re-signaled");
    assert_eq!(failure.error.message(), "Network down");
}

#[tokio::test(start_paused = true)]
async fn loading_indicator_replaces_rows_while_lookup_runs() {
    let lookup = ScriptedLookup::default().respond_after("ab", Duration::from_millis(300), ["apple"]);
    let mut h = harness(lookup, Behavior::default());

    h.input.on_input("ab");
    settle().await;
    assert_eq!(h.input.view(), Presentation::Loading);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(h.input.view().rows().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn selecting_a_row_invokes_the_callback() {
    let mut h = harness(fruit_lookup(), Behavior::default());

    h.input.on_input("ab");
    settle().await;

    assert_eq!(h.input.select(1), Some("band".to_string()));
    assert_eq!(h.input.select(5), None);
    assert_eq!(*h.selected.lock().unwrap(), vec!["band"]);
}

#[tokio::test(start_paused = true)]
async fn error_row_selection_follows_behavior() {
    let mut passthrough = harness(fruit_lookup(), Behavior::default());
    passthrough.input.on_input("xx");
    settle().await;
    assert_eq!(passthrough.input.select(0), Some("Network down".to_string()));

    let mut blocked = harness(
        fruit_lookup(),
        Behavior {
            select_error_rows: false,
            ..Behavior::default()
        },
    );
    blocked.input.on_input("xx");
    settle().await;
    assert_eq!(blocked.input.select(0), None);
    assert!(blocked.selected.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_drops_the_pending_query() {
    let mut h = harness(fruit_lookup(), Behavior::default());

    h.input.on_input("ab");
    h.input.shutdown();
    settle().await;

    assert!(h.input.is_shut_down());
    assert!(h.lookup.calls().is_empty());
    assert!(h.input.state().rows.is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_earlier_query_cannot_replace_later_results() {
    let lookup = ScriptedLookup::default()
        .respond_after("a", Duration::from_millis(300), ["alpha", "apricot"])
        .respond_after("ab", Duration::from_millis(20), ["abc"]);
    let mut h = harness(lookup, Behavior::default());

    h.input.on_input("a");
    settle().await;
    assert_eq!(h.input.view(), Presentation::Loading);

    h.input.on_input("ab");
    settle().await;
    let texts: Vec<String> = h.input.view().rows().iter().map(|row| row.text.clone()).collect();
    assert_eq!(texts, vec!["abc"]);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(h.lookup.calls(), vec!["a", "ab"]);
    let state = h.input.state();
    assert!(!state.loading);
    assert_eq!(state.rows.len(), 1);
    assert_eq!(state.rows[0].value, "abc");
}

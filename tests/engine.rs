//! End-to-end tests driving the engine the way an enclosing program would:
//! append lines, swap queries, and follow the output mailbox.

use sift::prelude::*;

fn init() -> Sift {
    let _ = env_logger::builder().is_test(true).try_init();
    Sift::builder().build()
}

/// Wait for a finished pass that covers `watermark` items and, when given,
/// carries the expected query pattern.
fn wait_for_pass(sift: &Sift, watermark: usize, pattern: Option<&str>) -> Arc<SearchSnapshot> {
    loop {
        let Value::Snapshot(snapshot) = sift.events().wait_for(Event::SearchFin) else {
            continue;
        };
        let query_matches = pattern
            .is_none_or(|p| snapshot.query.pattern().iter().collect::<String>() == p);
        if snapshot.watermark >= watermark && query_matches {
            return snapshot;
        }
    }
}

fn texts(snapshot: &SearchSnapshot) -> Vec<String> {
    snapshot.items.iter().map(|m| m.item.text.to_string()).collect()
}

#[test]
fn ranks_by_score_then_index() {
    let sift = init();
    sift.set_query("foo", QueryFlags::default()).unwrap();
    sift.append_batch(["foobar".into(), "foo bar".into(), "barfoo".into()])
        .unwrap();

    let snapshot = wait_for_pass(&sift, 3, Some("foo"));
    assert_eq!(texts(&snapshot), vec!["foobar", "foo bar", "barfoo"]);
    assert!(snapshot.items[0].result.score > snapshot.items[2].result.score);
}

#[test]
fn reverse_mode_breaks_ties_by_descending_index() {
    let sift = init();
    let flags = QueryFlags {
        forward: false,
        ..Default::default()
    };
    sift.set_query("foo", flags).unwrap();
    sift.append_batch(["foobar".into(), "foo bar".into()]).unwrap();

    let snapshot = wait_for_pass(&sift, 2, Some("foo"));
    assert_eq!(texts(&snapshot), vec!["foo bar", "foobar"]);
}

#[test]
fn empty_query_matches_everything_in_index_order() {
    let sift = init();
    sift.set_query("", QueryFlags::default()).unwrap();
    sift.append_batch(["charlie".into(), "alpha".into(), "bravo".into()])
        .unwrap();

    let snapshot = wait_for_pass(&sift, 3, Some(""));
    assert_eq!(texts(&snapshot), vec!["charlie", "alpha", "bravo"]);
    assert!(snapshot.items.iter().all(|m| m.result.score == 0));
}

#[test]
fn query_change_restarts_over_the_whole_store() {
    let sift = init();
    sift.set_query("rs", QueryFlags::default()).unwrap();
    sift.append_batch(["src/main.rs".into(), "Cargo.toml".into(), "build.rs".into()])
        .unwrap();

    let snapshot = wait_for_pass(&sift, 3, Some("rs"));
    assert_eq!(snapshot.items.len(), 2);

    sift.set_query("toml", QueryFlags::default()).unwrap();
    let snapshot = wait_for_pass(&sift, 3, Some("toml"));
    assert_eq!(texts(&snapshot), vec!["Cargo.toml"]);
}

#[test]
fn late_appends_are_picked_up_incrementally() {
    let sift = init();
    sift.set_query("log", QueryFlags::default()).unwrap();
    sift.append("dialog.rs").unwrap();

    let snapshot = wait_for_pass(&sift, 1, Some("log"));
    assert_eq!(snapshot.items.len(), 1);

    sift.append("logger.rs").unwrap();
    sift.append("readme.md").unwrap();
    let snapshot = wait_for_pass(&sift, 3, Some("log"));
    // the word-start occurrence outranks the mid-word one
    assert_eq!(texts(&snapshot), vec!["logger.rs", "dialog.rs"]);
}

#[test]
fn match_positions_drive_highlighting() {
    let sift = init();
    sift.set_query("obz", QueryFlags::default()).unwrap();
    sift.append("fooBarbaz1").unwrap();

    let snapshot = wait_for_pass(&sift, 1, Some("obz"));
    let result = &snapshot.items[0].result;
    assert_eq!((result.begin, result.end), (2, 9));
    let positions = result.positions.as_ref().expect("positions requested by default");
    assert_eq!(positions.len(), 3);
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(positions.iter().all(|&p| p >= result.begin && p < result.end));
}

#[test]
fn algorithms_are_selectable_per_query() {
    let sift = init();
    sift.append_batch(["prefix match".into(), "a prefix elsewhere".into()])
        .unwrap();

    let flags = QueryFlags {
        algorithm: Algorithm::Prefix,
        ..Default::default()
    };
    sift.set_query("prefix", flags).unwrap();
    let snapshot = wait_for_pass(&sift, 2, Some("prefix"));
    assert_eq!(texts(&snapshot), vec!["prefix match"]);

    let flags = QueryFlags {
        algorithm: Algorithm::Equal,
        ..Default::default()
    };
    sift.set_query("prefix match", flags).unwrap();
    let snapshot = wait_for_pass(&sift, 2, Some("prefix match"));
    assert_eq!(texts(&snapshot), vec!["prefix match"]);
}

#[test]
fn close_rejects_further_calls_and_notifies() {
    let mut sift = init();
    sift.append("line").unwrap();
    sift.close();

    assert_eq!(sift.append("more"), Err(EngineError::Closed));
    assert_eq!(
        sift.set_query("q", QueryFlags::default()),
        Err(EngineError::Closed)
    );
    // the searcher forwarded the close to the output mailbox
    assert!(matches!(sift.events().wait_for(Event::Close), Value::Empty));
}

#[test]
fn normalised_queries_match_accented_lines() {
    let sift = init();
    let flags = QueryFlags {
        normalize: true,
        ..Default::default()
    };
    sift.set_query("danco", flags).unwrap();
    sift.append_batch(["Só Danço Samba".into(), "plain text".into()])
        .unwrap();

    let snapshot = wait_for_pass(&sift, 2, Some("danco"));
    assert_eq!(texts(&snapshot), vec!["Só Danço Samba"]);
}

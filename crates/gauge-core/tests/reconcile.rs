//! Storage reconciliation scenarios.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gauge_core::protocol::decode_push;
use gauge_core::storage::{LabelSet, MetricLine, MetricsStorage};

fn labels(pairs: &[(&str, &str)]) -> LabelSet {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn line(pairs: &[(&str, &str)], value: f64) -> MetricLine {
    MetricLine::new(labels(pairs), value)
}

/// name -> signature -> value
fn dump(s: &MetricsStorage) -> BTreeMap<String, BTreeMap<String, f64>> {
    s.names()
        .into_iter()
        .map(|name| {
            let lines = s
                .lines(&name)
                .into_iter()
                .map(|l| (l.signature(), l.value()))
                .collect();
            (name, lines)
        })
        .collect()
}

fn group(lines: &[(&str, f64)]) -> BTreeMap<String, f64> {
    lines.iter().map(|(sig, v)| (sig.to_string(), *v)).collect()
}

fn expected(entries: &[(&str, &[(&str, f64)])]) -> BTreeMap<String, BTreeMap<String, f64>> {
    entries
        .iter()
        .map(|(name, lines)| (name.to_string(), group(lines)))
        .collect()
}

#[test]
fn new_lines_are_added() {
    let s = MetricsStorage::new();
    s.update("metric-name-1", &LabelSet::new(), vec![line(&[("a", "b")], 123.4)], Duration::from_secs(1));
    s.update("metric-name-2", &LabelSet::new(), vec![line(&[("a", "b")], 100.0)], Duration::from_secs(1));

    assert_eq!(
        dump(&s),
        expected(&[
            ("metric-name-1", &[("a:b", 123.4)]),
            ("metric-name-2", &[("a:b", 100.0)]),
        ])
    );
}

#[test]
fn existing_lines_are_zeroed_on_update() {
    let s = MetricsStorage::new();
    let ttl = Duration::from_secs(1);
    let none = LabelSet::new();

    s.update("metric-name-1", &none, vec![line(&[("a", "b")], 123.4)], ttl);

    s.update("metric-2", &none, vec![line(&[("c", "d")], 100.0)], ttl);
    assert_eq!(dump(&s)["metric-2"], group(&[("c:d", 100.0)]));

    s.update("metric-2", &none, vec![line(&[("c", "d"), ("f", "g")], 100.0)], ttl);
    assert_eq!(dump(&s)["metric-2"], group(&[("c:d", 0.0), ("c:d;f:g", 100.0)]));

    s.update("metric-2", &none, vec![line(&[("c", "d")], 150.0)], ttl);
    assert_eq!(
        dump(&s),
        expected(&[
            ("metric-2", &[("c:d", 150.0), ("c:d;f:g", 0.0)]),
            ("metric-name-1", &[("a:b", 123.4)]),
        ])
    );
}

#[test]
fn same_labels_in_different_order_are_one_line() {
    let s = MetricsStorage::new();
    s.update("metric-name", &LabelSet::new(), vec![line(&[("a", "b"), ("c", "d")], 123.4)], Duration::from_secs(1));
    s.update("metric-name", &LabelSet::new(), vec![line(&[("c", "d"), ("a", "b")], 100.0)], Duration::from_secs(1));

    assert_eq!(dump(&s), expected(&[("metric-name", &[("a:b;c:d", 100.0)])]));
}

#[test]
fn zero_fill_is_scoped_by_system_labels() {
    let s = MetricsStorage::new();
    let ttl = Duration::from_secs(300);

    // client with system labels {env: test}
    decode_push(br#"{"ttl": 300, "data": [{"labels": {"a": "b"}, "value": 5}, {"labels": {"a": "c"}, "value": 6}], "system_labels": {"env": "test"}}"#)
        .unwrap()
        .apply(&s, "metric");

    // client with system labels {host: rent}
    decode_push(br#"{"ttl": 300, "data": [{"labels": {"a": "b"}, "value": 5}], "system_labels": {"host": "rent"}}"#)
        .unwrap()
        .apply(&s, "metric");
    assert_eq!(
        dump(&s),
        expected(&[(
            "metric",
            &[("a:b;env:test", 5.0), ("a:b;host:rent", 5.0), ("a:c;env:test", 6.0)]
        )])
    );

    decode_push(br#"{"ttl": 300, "data": [{"labels": {"a": "c"}, "value": 6}], "system_labels": {"host": "rent"}}"#)
        .unwrap()
        .apply(&s, "metric");
    assert_eq!(
        dump(&s),
        expected(&[(
            "metric",
            &[
                ("a:b;env:test", 5.0),
                ("a:b;host:rent", 0.0),
                ("a:c;env:test", 6.0),
                ("a:c;host:rent", 6.0),
            ]
        )])
    );

    // empty bag from the env=test client zeroes only its own lines
    s.update("metric", &labels(&[("env", "test")]), vec![], ttl);
    assert_eq!(
        dump(&s),
        expected(&[(
            "metric",
            &[
                ("a:b;env:test", 0.0),
                ("a:b;host:rent", 0.0),
                ("a:c;env:test", 0.0),
                ("a:c;host:rent", 6.0),
            ]
        )])
    );
}

#[test]
fn metric_expires_after_ttl() {
    let s = MetricsStorage::new();
    s.update("metric-name-1", &LabelSet::new(), vec![line(&[("a", "b")], 1.0)], Duration::from_secs(1));
    s.update("metric-name-2", &LabelSet::new(), vec![line(&[("a", "b")], 1.0)], Duration::from_secs(3));
    assert!(!s.is_expired("metric-name-1"));

    thread::sleep(Duration::from_millis(1100));

    assert!(s.is_expired("metric-name-1"));
    assert!(!s.is_expired("metric-name-2"));
    // expiry is lazy: nothing was removed
    assert_eq!(s.names().len(), 2);
}

#[test]
fn push_before_expiry_resets_countdown() {
    let s = MetricsStorage::new();
    s.update("m", &LabelSet::new(), vec![], Duration::from_secs(1));
    thread::sleep(Duration::from_millis(600));
    s.update("m", &LabelSet::new(), vec![], Duration::from_secs(1));
    thread::sleep(Duration::from_millis(600));

    assert!(!s.is_expired("m"));
}

#[test]
fn deleted_metric_is_forgotten_and_recreated_empty() {
    let s = MetricsStorage::new();
    s.update("metric-name-1", &LabelSet::new(), vec![line(&[("a", "b"), ("c", "d")], 123.4)], Duration::from_secs(1));
    s.update(
        "metric-name-2",
        &LabelSet::new(),
        vec![line(&[("a", "b"), ("c", "d"), ("f", "g")], 123.4)],
        Duration::from_secs(2),
    );

    s.delete("metric-name-1");
    s.delete("metric-name-1");
    assert_eq!(dump(&s), expected(&[("metric-name-2", &[("a:b;c:d;f:g", 123.4)])]));
    assert!(s.lines("metric-name-1").is_empty());
    assert!(s.is_expired("metric-name-1"));

    s.update("metric-name-1", &LabelSet::new(), vec![line(&[("x", "y")], 1.0)], Duration::from_secs(1));
    assert_eq!(dump(&s)["metric-name-1"], group(&[("x:y", 1.0)]));
}

#[test]
fn rejected_push_leaves_storage_untouched() {
    let s = MetricsStorage::new();
    decode_push(br#"{"ttl": 300, "data": [{"labels": {"a": "b"}, "value": 5}], "system_labels": {"env": "test"}}"#)
        .unwrap()
        .apply(&s, "metric");
    let before = dump(&s);

    let res = decode_push(br#"{"ttl": 300, "data": [{"labels": {"a": "b"}, "value": 9}, {"labels": {"env": "x"}, "value": 1}], "system_labels": {"env": "test"}}"#);
    assert!(res.is_err());

    assert_eq!(dump(&s), before);
}

#[test]
fn unknown_name_defaults() {
    let s = MetricsStorage::new();
    assert!(s.is_expired("never-pushed"));
    assert!(s.lines("never-pushed").is_empty());
}

#[test]
fn concurrent_pushes_and_scrapes() {
    let s = Arc::new(MetricsStorage::new());
    let mut handles = Vec::new();

    for writer in 0..4 {
        let s = Arc::clone(&s);
        handles.push(thread::spawn(move || {
            let host = format!("h{writer}");
            for i in 0..500 {
                let slot = (i % 10).to_string();
                let system = labels(&[("host", host.as_str())]);
                let data = line(&[("slot", slot.as_str())], i as f64)
                    .with_extra_labels(&system);
                s.update("shared", &system, vec![data], Duration::from_secs(60));
            }
        }));
    }
    for _ in 0..2 {
        let s = Arc::clone(&s);
        handles.push(thread::spawn(move || {
            for _ in 0..500 {
                for name in s.names() {
                    if s.is_expired(&name) {
                        s.delete(&name);
                        continue;
                    }
                    for l in s.lines(&name) {
                        assert!(l.labels().contains_key("host"));
                    }
                }
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    // 4 hosts x 10 slots, only the last slot of each host non-zero
    let lines = s.lines("shared");
    assert_eq!(lines.len(), 40);
    assert_eq!(lines.iter().filter(|l| l.value() != 0.0).count(), 4);
    assert_eq!(s.line_count(), 40);
}

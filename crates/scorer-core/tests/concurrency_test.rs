//! Concurrent predict/update against a shared scorer.

mod common;

use std::sync::Arc;
use std::thread;

use common::{mapping, MockEmbedder};
use scorer_core::{Scorer, ScorerConfig};

#[test]
fn test_concurrent_predict_and_update() {
    let max_len = 5;
    let scorer = Arc::new(
        Scorer::build(
            mapping(&[("Work", &["coding", "meeting"]), ("Sleep", &["nap"])]),
            Arc::new(MockEmbedder::activities()),
            ScorerConfig {
                max_description_length: max_len,
                ..ScorerConfig::default()
            },
        )
        .unwrap(),
    );

    let mut handles = Vec::new();

    for w in 0..4 {
        let scorer = Arc::clone(&scorer);
        handles.push(thread::spawn(move || {
            let label = if w % 2 == 0 { "Work" } else { "Sleep" };
            for i in 0..50 {
                scorer
                    .update_descriptions(label, &format!("writer {} item {}", w, i))
                    .unwrap();
            }
            // Each writer also introduces a label of its own
            scorer
                .update_descriptions(&format!("Label{}", w), "first")
                .unwrap();
        }));
    }

    for _ in 0..4 {
        let scorer = Arc::clone(&scorer);
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                let ranked = scorer.predict("writing code").unwrap();
                assert!(ranked.len() >= 2);
                for score in &ranked {
                    assert!((-1.0..=1.0).contains(&score.score));
                }
                for label in ["Work", "Sleep"] {
                    let set = scorer.descriptions(label).unwrap();
                    set.check_invariant().unwrap();
                    assert!(set.len() <= max_len);
                    assert_eq!(set.descriptions()[0], label);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let labels = scorer.labels().unwrap();
    assert_eq!(labels.len(), 6);
    for label in &labels {
        let set = scorer.descriptions(label).unwrap();
        set.check_invariant().unwrap();
        assert!(set.len() <= max_len);
    }
}

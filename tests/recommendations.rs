// tests/recommendations.rs
//
// Recommendation ordering and content from real engine output.

use chakra_balance::{recommend, Channel, Reading, ScoringEngine, Status};

#[test]
fn underactive_root_and_overactive_heart_yield_four_strings_in_order() {
    // Root raw 39.6 (Underactive), Heart raw 70.3 (Overactive), the rest in [40, 70].
    let engine = ScoringEngine::default();
    let r = Reading::now([100.0, 2.476, 95.0, 12.75, 21.5, 6.8]).unwrap();
    let results = engine.score(&r);

    let statuses: Vec<_> = results.iter().map(|c| c.status).collect();
    use Status::*;
    assert_eq!(
        statuses,
        vec![Underactive, Balanced, Balanced, Overactive, Balanced, Balanced, Balanced]
    );

    let recs = recommend(&results);
    assert_eq!(
        recs,
        vec![
            "Activate grounding motor in wristband for 5 minutes",
            "Play 396 Hz binaural beat for root chakra activation",
            "Balance Heart chakra through gentle cooling therapy",
            "Reduce stimulation and practice grounding exercises",
        ]
    );
}

#[test]
fn all_balanced_reading_yields_no_recommendations() {
    let engine = ScoringEngine::default();
    let r = Reading::now([55.0, 5.05, 98.5, 10.5, 21.5, 6.0]).unwrap();
    assert!(recommend(&engine.score(&r)).is_empty());
}

#[test]
fn all_minimum_reading_yields_every_underactive_pair() {
    let engine = ScoringEngine::default();
    let r = Reading::now([10.0, 0.1, 95.0, 8.0, 13.0, 4.0]).unwrap();
    let recs = recommend(&engine.score(&r));
    assert_eq!(recs.len(), 2 * Channel::COUNT);
    assert_eq!(recs[2], "Play 417 Hz frequency for emotional healing");
    assert_eq!(recs[4], "Play 528 Hz tone for personal power activation");
    assert_eq!(
        recs[6],
        "Heart coherence breathing pattern (5 seconds in, 5 seconds out)"
    );
    assert_eq!(recs[8], "Humming vibration therapy for throat chakra");
    assert_eq!(recs[10], "Increase alpha wave stimulation through meditation");
    assert_eq!(recs[12], "Deep theta meditation session recommended");
}

#[test]
fn all_maximum_reading_yields_generic_pairs_per_channel() {
    let engine = ScoringEngine::default();
    let r = Reading::now([100.0, 10.0, 102.0, 13.0, 30.0, 8.0]).unwrap();
    let recs = recommend(&engine.score(&r));
    assert_eq!(recs.len(), 14);
    for (i, c) in Channel::ALL.iter().enumerate() {
        assert_eq!(
            recs[2 * i],
            format!("Balance {} chakra through gentle cooling therapy", c.name())
        );
        assert_eq!(
            recs[2 * i + 1],
            "Reduce stimulation and practice grounding exercises"
        );
    }
}

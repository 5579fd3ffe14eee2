// Unit tests for Coffee Match

use coffee_match::core::{
    calculate_availability_score, calculate_interest_score, calculate_location_score,
    calculate_match_score, calculate_personality_score,
};
use coffee_match::models::{Availability, MatchWeights, Profile, ProfileAttributes};
use std::collections::HashSet;

fn profile(interests: &[i32], days: &[&str], slots: &[&str], embedding: Option<Vec<f64>>) -> Profile {
    Profile {
        user_id: "test".to_string(),
        attributes: ProfileAttributes {
            interest_ids: interests.to_vec(),
            availability: Availability {
                days: days.iter().map(|s| s.to_string()).collect(),
                time_slots: slots.iter().map(|s| s.to_string()).collect(),
            },
            ..Default::default()
        },
        embedding,
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn test_interest_score_shared_third() {
    // {"tech","travel"} vs {"tech","music"} -> 1/3
    let a: HashSet<i32> = [1, 4].into_iter().collect();
    let b: HashSet<i32> = [1, 8].into_iter().collect();
    assert!((calculate_interest_score(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_interest_score_identical_sets() {
    let a: HashSet<i32> = [1, 2, 3].into_iter().collect();
    assert_eq!(calculate_interest_score(&a, &a), 1.0);
}

#[test]
fn test_interest_score_disjoint_sets() {
    let a: HashSet<i32> = [1, 2].into_iter().collect();
    let b: HashSet<i32> = [3, 4].into_iter().collect();
    assert_eq!(calculate_interest_score(&a, &b), 0.0);
}

#[test]
fn test_interest_score_symmetry() {
    let pairs: Vec<(HashSet<i32>, HashSet<i32>)> = vec![
        ([1, 2, 3].into_iter().collect(), [2, 3, 4].into_iter().collect()),
        ([5].into_iter().collect(), HashSet::new()),
        ([7, 8].into_iter().collect(), [9].into_iter().collect()),
    ];

    for (a, b) in pairs {
        assert_eq!(
            calculate_interest_score(&a, &b),
            calculate_interest_score(&b, &a)
        );
    }
}

#[test]
fn test_availability_score_enumerates_three_levels() {
    let weekend_morning = Availability {
        days: vec!["saturday".to_string(), "sunday".to_string()],
        time_slots: vec!["morning".to_string()],
    };
    let weekend_evening = Availability {
        days: vec!["sunday".to_string()],
        time_slots: vec!["evening".to_string()],
    };
    let weekday_evening = Availability {
        days: vec!["tuesday".to_string()],
        time_slots: vec!["evening".to_string()],
    };

    assert_eq!(calculate_availability_score(&weekend_morning, &weekend_morning), 1.0);
    assert_eq!(calculate_availability_score(&weekend_morning, &weekend_evening), 0.5);
    assert_eq!(calculate_availability_score(&weekend_morning, &weekday_evening), 0.0);
}

#[test]
fn test_availability_score_undeclared_side_is_zero() {
    let declared = Availability {
        days: vec!["monday".to_string()],
        time_slots: vec!["morning".to_string()],
    };
    assert_eq!(calculate_availability_score(&declared, &Availability::default()), 0.0);
}

#[test]
fn test_location_stub_always_half() {
    assert_eq!(calculate_location_score(), 0.5);
}

#[test]
fn test_personality_score_within_unit_interval() {
    let cases = [
        (vec![1.0, 0.0, 0.0], vec![1.0, 0.0, 0.0]),
        (vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]),
        (vec![0.5, 0.5, 0.5], vec![0.1, 0.9, 0.4]),
        (vec![1.0, 0.0, 0.0], vec![-1.0, 0.0, 0.0]),
    ];

    for (a, b) in cases {
        let score = calculate_personality_score(Some(&a), Some(&b));
        assert!(score >= 0.0 && score <= 1.0, "score {} out of bounds", score);
    }
}

#[test]
fn test_final_score_bounded_for_varied_pairs() {
    let weights = MatchWeights::default();
    let profiles = vec![
        profile(&[], &[], &[], None),
        profile(&[1], &["monday"], &[], Some(vec![1.0, 0.0])),
        profile(&[1, 2, 3], &["saturday"], &["morning"], Some(vec![0.2, 0.8])),
        profile(&[4, 5], &["sunday"], &["evening"], Some(vec![-0.5, 0.5])),
    ];

    for a in &profiles {
        for b in &profiles {
            let score = calculate_match_score(a, b, &weights);
            assert!(score >= 0.0 && score <= 1.0, "score {} out of bounds", score);
        }
    }
}

#[test]
fn test_final_score_symmetric() {
    let weights = MatchWeights::default();
    let a = profile(&[1, 2], &["saturday"], &["morning"], Some(vec![0.3, 0.7]));
    let b = profile(&[2, 3], &["saturday"], &["evening"], Some(vec![0.6, 0.4]));

    let ab = calculate_match_score(&a, &b, &weights);
    let ba = calculate_match_score(&b, &a, &weights);
    assert!((ab - ba).abs() < 1e-12);
}

#[test]
fn test_sparse_profile_degrades_not_fails() {
    // A candidate with nothing but an embedding still scores: the
    // missing pillars contribute their defined zeros.
    let weights = MatchWeights::default();
    let full = profile(&[1, 2], &["saturday"], &["morning"], Some(vec![1.0, 0.0]));
    let sparse = profile(&[], &[], &[], Some(vec![1.0, 0.0]));

    let score = calculate_match_score(&full, &sparse, &weights);
    // location stub + perfect personality alignment
    assert!((score - (0.20 * 0.5 + 0.10)).abs() < 1e-9);
}

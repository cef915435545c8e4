//! Selector Tests
//!
//! Weighted content type draws, preference filtering, the general-tag retry
//! and the generic fallback.

use super::support::{exercise, quote, technique, MockContentStore};
use crate::brain::MessageAnalyzer;
use crate::chat::{ResponseSelector, FALLBACK_RESPONSE};
use crate::models::{ContentPreferences, ContentType, ReferenceKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn only(quotes: bool, exercises: bool, techniques: bool) -> ContentPreferences {
    ContentPreferences {
        quotes,
        exercises,
        techniques,
    }
}

#[cfg(test)]
mod content_type_tests {
    use super::*;

    #[test]
    fn test_weighted_distribution() {
        let selector = ResponseSelector::new(StdRng::seed_from_u64(42));
        let preferences = ContentPreferences::default();

        let draws = 10_000;
        let (mut quotes, mut exercises, mut techniques) = (0usize, 0usize, 0usize);
        for _ in 0..draws {
            match selector.choose_content_type(&preferences).unwrap() {
                ContentType::Quote => quotes += 1,
                ContentType::Exercise => exercises += 1,
                ContentType::Technique => techniques += 1,
                ContentType::Resource => panic!("resources are never drawn"),
            }
        }

        let share = |n: usize| n as f64 / draws as f64;
        assert!((share(quotes) - 0.3).abs() < 0.03, "quotes share {}", share(quotes));
        assert!((share(exercises) - 0.3).abs() < 0.03, "exercises share {}", share(exercises));
        assert!((share(techniques) - 0.4).abs() < 0.03, "techniques share {}", share(techniques));
    }

    #[test]
    fn test_single_preference_always_wins() {
        let selector = ResponseSelector::new(StdRng::seed_from_u64(7));
        for _ in 0..500 {
            assert_eq!(
                selector.choose_content_type(&only(true, false, false)).unwrap(),
                ContentType::Quote
            );
            assert_eq!(
                selector.choose_content_type(&only(false, false, true)).unwrap(),
                ContentType::Technique
            );
        }
    }

    #[test]
    fn test_draws_stay_within_preferences() {
        let selector = ResponseSelector::new(StdRng::seed_from_u64(99));
        let preferences = only(true, true, false);
        let mut seen_exercise = false;
        for _ in 0..1_000 {
            let picked = selector.choose_content_type(&preferences).unwrap();
            assert_ne!(picked, ContentType::Technique);
            seen_exercise |= picked == ContentType::Exercise;
        }
        assert!(seen_exercise);
    }

    #[test]
    fn test_no_preferences_means_all_types() {
        let selector = ResponseSelector::new(StdRng::seed_from_u64(3));
        let preferences = only(false, false, false);
        let mut seen = Vec::new();
        for _ in 0..1_000 {
            let picked = selector.choose_content_type(&preferences).unwrap();
            if !seen.contains(&picked) {
                seen.push(picked);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = ResponseSelector::new(StdRng::seed_from_u64(2024));
        let b = ResponseSelector::new(StdRng::seed_from_u64(2024));
        let preferences = ContentPreferences::default();
        for _ in 0..100 {
            assert_eq!(
                a.choose_content_type(&preferences).unwrap(),
                b.choose_content_type(&preferences).unwrap()
            );
        }
    }
}

#[cfg(test)]
mod selection_tests {
    use super::*;

    #[tokio::test]
    async fn test_topic_query_includes_general() {
        let store = MockContentStore::with_items(vec![quote(1, &["sleep"]), quote(2, &["anxiety"])]);
        let selector = ResponseSelector::new(StdRng::seed_from_u64(1));
        let analysis = MessageAnalyzer::new().analyze("I can't sleep");

        let selected = selector
            .select_response(&analysis, &only(true, false, false), &store)
            .await
            .unwrap();

        assert_eq!(selected.content_type, ReferenceKind::Quote);
        assert_eq!(selected.item.as_ref().map(|i| i.id), Some(1));
        assert_eq!(selected.response_text, "\"Quote number 1\" - Anonymous");

        let queries = store.queries.lock().unwrap();
        assert_eq!(
            queries.as_slice(),
            &[(ContentType::Quote, vec!["sleep".to_string(), "general".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_general_retry_when_topic_query_is_empty() {
        let store = MockContentStore::scripted(vec![vec![], vec![exercise(7, &["general"])]]);
        let selector = ResponseSelector::new(StdRng::seed_from_u64(1));
        let analysis = MessageAnalyzer::new().analyze("My deadline is tomorrow");

        let selected = selector
            .select_response(&analysis, &only(false, true, false), &store)
            .await
            .unwrap();

        assert_eq!(selected.content_type, ReferenceKind::Exercise);
        assert_eq!(selected.item.map(|i| i.id), Some(7));
        assert!(selected
            .response_text
            .starts_with("Here's a mindfulness exercise that might help: \"Exercise 7\""));

        let queries = store.queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].1, vec!["stress".to_string(), "general".to_string()]);
        assert_eq!(queries[1], (ContentType::Exercise, vec!["general".to_string()]));
    }

    #[tokio::test]
    async fn test_fallback_when_nothing_matches() {
        let store = MockContentStore::default();
        let selector = ResponseSelector::new(StdRng::seed_from_u64(5));
        let analysis = MessageAnalyzer::new().analyze("hello");

        let selected = selector
            .select_response(&analysis, &ContentPreferences::default(), &store)
            .await
            .unwrap();

        assert_eq!(selected.content_type, ReferenceKind::General);
        assert!(selected.item.is_none());
        assert_eq!(selected.response_text, FALLBACK_RESPONSE);
        assert_eq!(store.query_count(), 2);
    }

    #[tokio::test]
    async fn test_pick_is_among_candidates() {
        let store = MockContentStore::with_items(vec![
            technique(1, &["general"]),
            technique(2, &["general"]),
            technique(3, &["general"]),
            technique(4, &["anxiety"]),
        ]);
        let selector = ResponseSelector::new(StdRng::seed_from_u64(11));
        let analysis = MessageAnalyzer::new().analyze("nothing in particular");

        let mut picked = Vec::new();
        for _ in 0..200 {
            let selected = selector
                .select_response(&analysis, &only(false, false, true), &store)
                .await
                .unwrap();
            let id = selected.item.map(|i| i.id).unwrap();
            assert!((1..=3).contains(&id));
            if !picked.contains(&id) {
                picked.push(id);
            }
        }
        assert_eq!(picked.len(), 3);
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let store = MockContentStore::failing();
        let selector = ResponseSelector::new(StdRng::seed_from_u64(1));
        let analysis = MessageAnalyzer::new().analyze("hello");

        let result = selector
            .select_response(&analysis, &ContentPreferences::default(), &store)
            .await;
        assert!(matches!(result, Err(crate::error::AppError::Database(_))));
        assert_eq!(store.query_count(), 1);
    }
}

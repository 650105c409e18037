// tests/seen_set.rs
use anime_news_relay::dedup::{item_id, SeenSet, SEEN_CAP};
use anime_news_relay::sources::types::{CandidateItem, ItemCategory};

fn announcement(title: &str) -> CandidateItem {
    CandidateItem {
        category: ItemCategory::NewAnnouncement,
        title: title.to_string(),
        url: "https://anilist.co/anime/1".to_string(),
        posted_at: "2026-1-1".to_string(),
        format: Some("TV".to_string()),
        subreddit: None,
    }
}

fn feed_post(created: &str) -> CandidateItem {
    CandidateItem {
        category: ItemCategory::FeedPost,
        title: "One Piece season 2 confirmed!".to_string(),
        url: "https://reddit.com/r/anime/comments/x1/".to_string(),
        posted_at: created.to_string(),
        format: None,
        subreddit: Some("anime".to_string()),
    }
}

#[test]
fn identifier_is_deterministic_across_observations() {
    let a1 = announcement("Dandadan 2nd Season");
    let a2 = announcement("Dandadan 2nd Season");
    assert_eq!(item_id(&a1), item_id(&a2));

    let f1 = feed_post("1723000123");
    let f2 = feed_post("1723000123");
    assert_eq!(item_id(&f1), item_id(&f2));

    // Same title under different categories must not collide.
    assert_ne!(item_id(&a1), item_id(&feed_post("Dandadan 2nd Season")));
}

#[test]
fn is_new_flips_to_false_right_after_record() {
    let mut seen = SeenSet::new();
    let item = feed_post("1723000123");
    assert!(seen.is_new(&item));
    seen.record(item_id(&item));
    assert!(!seen.is_new(&item));
}

#[test]
fn bound_holds_and_survivors_are_the_most_recent() {
    let mut seen = SeenSet::new();
    for i in 0..250 {
        seen.record(format!("id-{i}"));
        if i % 40 == 0 {
            // Eviction runs once per cycle; interleave a few cycle ends.
            seen.evict_over_capacity();
            assert!(seen.len() <= SEEN_CAP);
        }
    }
    seen.evict_over_capacity();

    assert_eq!(seen.len(), SEEN_CAP);
    // Exactly the most recently inserted SEEN_CAP ids survive.
    for i in 0..150 {
        assert!(!seen.contains(&format!("id-{i}")), "id-{i} should be evicted");
    }
    for i in 150..250 {
        assert!(seen.contains(&format!("id-{i}")), "id-{i} should survive");
    }
}

#[test]
fn re_recording_does_not_reorder_or_duplicate() {
    let mut seen = SeenSet::with_capacity(2);
    seen.record("a".to_string());
    seen.record("b".to_string());
    seen.record("a".to_string());
    seen.record("c".to_string());
    seen.evict_over_capacity();

    // "a" kept its original (oldest) slot, so it is evicted first.
    assert_eq!(seen.len(), 2);
    assert!(!seen.contains("a"));
    assert!(seen.contains("b"));
    assert!(seen.contains("c"));
}

// tests/feed_filter.rs
use anime_news_relay::watchlist::{SeriesKind, Watchlist};

#[test]
fn keyword_and_series_title_is_retained() {
    let wl = Watchlist::builtin();
    // Matches both a keyword ("season 2", "confirmed") and a series term.
    assert!(wl.matches_title("One Piece season 2 confirmed!"));
}

#[test]
fn unrelated_title_is_dropped() {
    let wl = Watchlist::builtin();
    assert!(!wl.matches_title("random unrelated post"));
}

#[test]
fn matching_is_case_insensitive_substring() {
    let wl = Watchlist::builtin();
    assert!(wl.matches_title("DANDADAN popularity poll results"));
    assert!(wl.matches_title("New TRAILER for spring lineup"));
    assert!(!wl.matches_title("Spring lineup discussion"));
}

#[test]
fn followed_series_extend_the_filter() {
    let mut wl = Watchlist::builtin();
    assert!(!wl.matches_title("Frieren stage play casting"));
    assert!(wl.follow(SeriesKind::Anime, "Frieren"));
    assert!(wl.matches_title("Frieren stage play casting"));
}

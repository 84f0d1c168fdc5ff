use chrono::Datelike;
use std::collections::HashMap;

use crate::models::{ConsumptionStats, GenreCount, MediaType, WatchedItem, WeekdayCount};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const FAVORITE_GENRES: usize = 3;

/// Renders minutes as `"{d}d {h}h {m}m"`
pub fn format_watch_time(minutes: u64) -> String {
    let days = minutes / (24 * 60);
    let hours = (minutes % (24 * 60)) / 60;
    let mins = minutes % 60;
    format!("{}d {}h {}m", days, hours, mins)
}

/// Computes viewing-habit statistics over watched items
pub fn consumption_stats(items: &[WatchedItem]) -> ConsumptionStats {
    let mut movie_watch_time = 0u64;
    let mut show_watch_time = 0u64;
    let mut genre_counts: HashMap<&str, usize> = HashMap::new();
    let mut weekday_counts = [0usize; 7];

    for item in items {
        match item.media_type {
            MediaType::Movie => movie_watch_time += item.watch_minutes(),
            MediaType::Tv => show_watch_time += item.watch_minutes(),
        }

        for genre in &item.genres {
            *genre_counts.entry(genre.as_str()).or_default() += 1;
        }

        // Only movies carry a meaningful single watch date
        if let (MediaType::Movie, Some(date)) = (item.media_type, item.watch_date) {
            weekday_counts[date.weekday().num_days_from_monday() as usize] += 1;
        }
    }

    let mut all_genres: Vec<GenreCount> = genre_counts
        .into_iter()
        .map(|(name, count)| GenreCount {
            name: name.to_string(),
            count,
        })
        .collect();
    all_genres.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    let average_rating = if items.is_empty() {
        0.0
    } else {
        items.iter().map(|i| i.rating).sum::<f64>() / items.len() as f64
    };

    let total_watch_time = movie_watch_time + show_watch_time;

    ConsumptionStats {
        total_watch_time,
        movie_watch_time,
        show_watch_time,
        total_watch_time_display: format_watch_time(total_watch_time),
        total_items: items.len(),
        movies_count: items.iter().filter(|i| i.media_type == MediaType::Movie).count(),
        shows_count: items.iter().filter(|i| i.media_type == MediaType::Tv).count(),
        favorite_count: items.iter().filter(|i| i.favorite).count(),
        average_rating,
        favorite_genres: all_genres.iter().take(FAVORITE_GENRES).cloned().collect(),
        all_genres,
        weekday_counts: WEEKDAYS
            .iter()
            .zip(weekday_counts)
            .map(|(&name, count)| WeekdayCount { name, count })
            .collect(),
    }
}

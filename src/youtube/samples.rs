// Placeholder content for browse sections before real data arrives

use super::models::{Video, VideoGroup};

/// A group of `count` synthetic videos titled after the section
pub fn sample_group(title: &str, count: usize) -> VideoGroup {
    let videos = (1..=count)
        .map(|i| {
            let mut video = Video::new(format!("sample-{}", i), format!("{} Video {}", title, i));
            video.channel_name = Some(format!("Sample Channel {}", i % 5 + 1));
            video.duration_text = Some(format!("{}:{:02}", 5 + i % 10, i % 60));
            video.view_count = 1_000_000 + i as u64 * 50_000;
            video.thumbnail_url = Some(format!("https://img.youtube.com/vi/sample{}/maxresdefault.jpg", i));
            video
        })
        .collect();

    VideoGroup::with_videos(title, videos)
}

/// Sections shown for a sidebar category ("home", "trending", ...)
pub fn sections_for(category: &str) -> Vec<VideoGroup> {
    let layout: &[(&str, usize)] = match category.to_ascii_lowercase().as_str() {
        "home" => &[("Recommended", 20), ("Recently Uploaded", 15), ("Popular Today", 12)],
        "trending" => &[("Trending Now", 25), ("Music", 15), ("Gaming", 12)],
        "subscriptions" => &[("Latest Uploads", 20), ("Recommended from Subscriptions", 15)],
        "library" => &[("Watch Later", 10), ("Liked Videos", 8), ("My Playlists", 5)],
        "history" => &[("Recently Watched", 20), ("Watch Again", 15)],
        _ => &[("Content", 10)],
    };

    let auth_required = matches!(
        category.to_ascii_lowercase().as_str(),
        "subscriptions" | "library" | "history"
    );

    layout
        .iter()
        .map(|(title, count)| {
            let mut group = sample_group(title, *count);
            group.auth_required = auth_required;
            group
        })
        .collect()
}

use playlist_sectioner::sectioning::DEFAULT_LONG_BREAK_SECONDS;
use playlist_sectioner::{
    auto_section, build_preview, PlaylistExport, Section, Sectioner, SectioningConfig, Video,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

const WORDS: &[&str] = &[
    "rust", "async", "the", "intro", "part", "lesson", "traits", "#", "macros", "basics", "tokio",
    "and", "testing", "!!!", "chapter", "of",
];

fn random_playlist(rng: &mut StdRng, len: usize) -> Vec<Video> {
    (0..len)
        .map(|i| {
            let word_count = rng.gen_range(0..5usize);
            let mut title: Vec<String> = (0..word_count)
                .map(|_| WORDS[rng.gen_range(0..WORDS.len())].to_string())
                .collect();
            if rng.gen_bool(1.0 / 3.0) {
                title.push(format!("Part {}", rng.gen_range(0..6u32)));
            }
            let duration = match rng.gen_range(0..8u32) {
                0 => DEFAULT_LONG_BREAK_SECONDS + rng.gen_range(0..3600),
                1 => DEFAULT_LONG_BREAK_SECONDS,
                _ => rng.gen_range(0..DEFAULT_LONG_BREAK_SECONDS),
            };
            Video::new(format!("v{}", i), title.join(" "), duration, i)
        })
        .collect()
}

fn is_long(video: &Video) -> bool {
    video.duration_seconds >= DEFAULT_LONG_BREAK_SECONDS
}

fn check_invariants(input: &[Video], sections: &[Section]) {
    // Partition: flattening reproduces the input exactly
    let flattened: Vec<&Video> = sections.iter().flat_map(|s| s.videos.iter()).collect();
    assert_eq!(flattened.len(), input.len());
    for (a, b) in flattened.iter().zip(input.iter()) {
        assert_eq!(*a, b);
    }

    let mut start = 0;
    for (k, section) in sections.iter().enumerate() {
        // No empty sections, contiguous indices
        assert!(!section.videos.is_empty());
        assert_eq!(section.order_index, k);
        assert!(!section.title.is_empty());

        let len = section.videos.len();
        let end = start + len;
        assert!(len <= 4, "section {} has {} videos", k, len);

        if len < 2 {
            let is_last = k + 1 == sections.len();
            let cut_by_break = end < input.len() && (is_long(&input[end]) || is_long(&input[end - 1]));
            assert!(is_last || cut_by_break, "undersized section {} not explained", k);
        }

        // Hard breaks
        for (offset, video) in section.videos.iter().enumerate() {
            if is_long(video) {
                assert_eq!(offset, 0, "long video {} not first in its section", video.id);
                assert_eq!(len, 1, "long video {} shares its section", video.id);
            }
        }

        start = end;
    }
}

#[test]
fn test_sectioning_invariants_on_generated_playlists() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for round in 0..400 {
        let len = (round % 23) as usize;
        let input = random_playlist(&mut rng, len);
        let sections = auto_section(&input);
        check_invariants(&input, &sections);
    }
}

#[test]
fn test_sectioning_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let input = random_playlist(&mut rng, 17);
        assert_eq!(auto_section(&input), auto_section(&input));
    }
}

#[test]
fn test_custom_windows_respect_bounds() {
    let sectioner = Sectioner::new(SectioningConfig {
        window_min: 3,
        window_max: 6,
        ..SectioningConfig::default()
    })
    .unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let input = random_playlist(&mut rng, 20);
        let sections = sectioner.section(&input);
        let flattened: Vec<&Video> = sections.iter().flat_map(|s| s.videos.iter()).collect();
        assert_eq!(flattened.len(), input.len());
        assert!(sections.iter().all(|s| !s.videos.is_empty() && s.videos.len() <= 6));
    }
}

#[test]
fn test_section_titles_fall_back_to_position() {
    let input = vec![
        Video::new("a", "", 100, 0),
        Video::new("b", "???", 100, 1),
        Video::new("c", "The Intro", 100, 2),
        Video::new("d", "Of", 100, 3),
    ];
    let titles: Vec<String> = auto_section(&input).into_iter().map(|s| s.title).collect();
    assert_eq!(titles, vec!["Section 1", "Section 2"]);
}

#[tokio::test]
async fn test_playlist_file_to_preview() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("course.json");
    tokio::fs::write(
        &path,
        r#"{
            "playlistUrl": "https://www.youtube.com/playlist?list=PLintegration",
            "title": "Home Espresso",
            "description": "Dial in your grinder.",
            "items": [
                {"videoId": "e4", "title": "Milk Steaming Technique #2", "position": 3, "duration": "PT9M"},
                {"videoId": "e1", "title": "Espresso Grind Size Explained", "position": 0, "duration": "PT11M"},
                {"videoId": "e2", "title": "Espresso Grind Size Experiments", "position": 1, "duration": "PT13M"},
                {"videoId": "e3", "title": "Milk Steaming Technique #1", "position": 2, "duration": "PT8M"},
                {"videoId": "e5", "title": "Live Q&A Session", "position": 4, "duration": "PT1H5M"}
            ]
        }"#,
    )
    .await
    .unwrap();

    let export = PlaylistExport::from_file(&path).await.unwrap();
    let preview = build_preview(&export, &Sectioner::default()).unwrap();

    assert_eq!(preview.playlist_id, "PLintegration");
    assert_eq!(preview.total_videos, 5);
    assert_eq!(preview.total_duration_seconds, (11 + 13 + 8 + 9 + 65) * 60);

    let titles: Vec<&str> = preview.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Espresso Grind Size", "Milk Steaming Technique", "Live Q Session"]);

    let ids: Vec<&str> = preview.videos().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["e1", "e2", "e3", "e4", "e5"]);
}

use chrono::{DateTime, FixedOffset, Local};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::model::generated_story::GeneratedStory;
use crate::model::stored_story::StoredStory;
use crate::storage::error::{StoreError, StoreResult};
use crate::APP_DIR_NAME;

const EXTENSION: &str = "json";
const TITLE_PREFIX_CHARS: usize = 20;
const UNTITLED: &str = "untitled";
const ILLEGAL_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Saved stories as one pretty-printed JSON file each.
///
/// Files are never rewritten; a save that would collide with an existing
/// name gets a numeric suffix instead.
#[derive(Debug, Clone)]
pub struct StoryStore {
    dir: PathBuf,
}

impl StoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_dir() -> PathBuf {
        match dirs::data_dir() {
            Some(mut path) => {
                path.push(APP_DIR_NAME);
                path.push("stories");
                path
            }
            None => PathBuf::from("saved_stories"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, generated: &GeneratedStory) -> StoreResult<StoredStory> {
        self.save_at(generated, Local::now().fixed_offset())
    }

    pub fn save_at(
        &self,
        generated: &GeneratedStory,
        created_at: DateTime<FixedOffset>,
    ) -> StoreResult<StoredStory> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let stem = format!(
            "{}_{}",
            created_at.format("%Y%m%d_%H%M%S"),
            sanitize_title(&generated.story.title)
        );

        let mut attempt = 1;
        loop {
            let filename = if attempt == 1 {
                format!("{stem}.{EXTENSION}")
            } else {
                format!("{stem}_{attempt}.{EXTENSION}")
            };

            let stored = StoredStory {
                title: generated.story.title.clone(),
                episode_input: generated.episode.clone(),
                raw_response_text: generated.raw_response.clone(),
                panels: generated.story.panels.clone(),
                created_at,
                filename,
            };

            match self.write_new(&stored) {
                Ok(()) => {
                    tracing::info!(file = %stored.filename, "story saved");
                    return Ok(stored);
                }
                Err(WriteNewError::Exists) => attempt += 1,
                Err(WriteNewError::Store(e)) => return Err(e),
            }
        }
    }

    fn write_new(&self, stored: &StoredStory) -> Result<(), WriteNewError> {
        let path = self.dir.join(&stored.filename);
        let json = serde_json::to_string_pretty(stored).map_err(StoreError::Serialize)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(WriteNewError::Exists),
            Err(source) => return Err(StoreError::Write { path, source }.into()),
        };

        file.write_all(json.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .map_err(|source| StoreError::Write { path, source })?;
        Ok(())
    }

    /// Every readable story, newest first by filename.
    /// Files that fail to read or parse are skipped.
    pub fn list(&self) -> StoreResult<Vec<StoredStory>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::ListDir {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| has_json_extension(name))
            .collect();

        names.sort_unstable_by(|a, b| b.cmp(a));

        let stories = names
            .into_iter()
            .filter_map(|name| match self.load(&name) {
                Ok(story) => Some(story),
                Err(e) => {
                    tracing::warn!(file = %name, "skipping unreadable story: {e}");
                    None
                }
            })
            .collect();

        Ok(stories)
    }

    pub fn load(&self, filename: &str) -> StoreResult<StoredStory> {
        let path = self.path_for(filename)?;
        let text = fs::read_to_string(&path).map_err(|source| StoreError::Read { path, source })?;

        let mut story: StoredStory = serde_json::from_str(&text).map_err(StoreError::Deserialize)?;
        // the name on disk is the handle for delete, whatever the file says
        story.filename = filename.to_string();
        Ok(story)
    }

    pub fn delete(&self, filename: &str) -> StoreResult<()> {
        let path = self.path_for(filename)?;
        fs::remove_file(&path).map_err(|source| StoreError::Delete { path, source })?;
        tracing::info!(file = %filename, "story deleted");
        Ok(())
    }

    fn path_for(&self, filename: &str) -> StoreResult<PathBuf> {
        let plain = Path::new(filename).file_name().and_then(|n| n.to_str()) == Some(filename);

        if !plain || filename.starts_with('.') || !has_json_extension(filename) {
            return Err(StoreError::InvalidFilename(filename.to_string()));
        }
        Ok(self.dir.join(filename))
    }
}

enum WriteNewError {
    Exists,
    Store(StoreError),
}

impl From<StoreError> for WriteNewError {
    fn from(e: StoreError) -> Self {
        WriteNewError::Store(e)
    }
}

fn has_json_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION))
}

/// Filesystem-safe short prefix of a title.
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !c.is_control())
        .collect();

    let joined = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
    let prefix: String = joined.chars().take(TITLE_PREFIX_CHARS).collect();
    let prefix = prefix.trim_matches(|c: char| c == '.' || c == '_');

    if prefix.is_empty() {
        UNTITLED.to_string()
    } else {
        prefix.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::story_parser::parse_story;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn generated(raw: &str) -> GeneratedStory {
        GeneratedStory::new("카페에서 커피 쏟음".into(), raw.into(), parse_story(raw))
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 1, h, m, s)
            .unwrap()
    }

    const RAW: &str = "제목: 커피\n|||\n## 1컷\n내용1\n```svg\n<svg>A</svg>\n```\n|||\n## 2컷\n내용2";

    #[test]
    fn saved_story_loads_back_equal() {
        let temp = TempDir::new().unwrap();
        let store = StoryStore::new(temp.path().join("stories"));
        let gen = generated(RAW);

        let saved = store.save(&gen).unwrap();
        let listed = store.list().unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, gen.story.title);
        assert_eq!(listed[0].panels, gen.story.panels);
        assert_eq!(listed[0].episode_input, "카페에서 커피 쏟음");
        assert_eq!(listed[0].raw_response_text, RAW);
        assert_eq!(listed[0], saved);
    }

    #[test]
    fn file_is_pretty_json_with_camel_case_keys() {
        let temp = TempDir::new().unwrap();
        let store = StoryStore::new(temp.path());

        let saved = store.save_at(&generated(RAW), at(14, 5, 9)).unwrap();
        assert_eq!(saved.filename, "20250301_140509_커피.json");

        let text = fs::read_to_string(temp.path().join(&saved.filename)).unwrap();
        assert!(text.contains("\n  \"episodeInput\""));
        assert!(text.contains("\"rawResponseText\""));
        assert!(text.contains("\"narrativeText\""));
        assert!(text.contains("\"graphicFragment\": null"));
        assert!(text.contains("\"createdAt\": \"2025-03-01T14:05:09+09:00\""));
    }

    #[test]
    fn same_second_same_title_does_not_overwrite() {
        let temp = TempDir::new().unwrap();
        let store = StoryStore::new(temp.path());
        let gen = generated(RAW);

        let first = store.save_at(&gen, at(9, 0, 0)).unwrap();
        let second = store.save_at(&gen, at(9, 0, 0)).unwrap();

        assert_eq!(first.filename, "20250301_090000_커피.json");
        assert_eq!(second.filename, "20250301_090000_커피_2.json");
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn list_is_newest_first_and_skips_corrupt_files() {
        let temp = TempDir::new().unwrap();
        let store = StoryStore::new(temp.path());

        store.save_at(&generated("제목: 첫째|||a"), at(8, 0, 0)).unwrap();
        store.save_at(&generated("제목: 셋째|||c"), at(10, 0, 0)).unwrap();
        store.save_at(&generated("제목: 둘째|||b"), at(9, 0, 0)).unwrap();

        fs::write(temp.path().join("99999999_broken.json"), "{ not json").unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(temp.path().join("dir.json")).unwrap();

        let titles: Vec<String> = store.list().unwrap().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["셋째", "둘째", "첫째"]);
    }

    #[test]
    fn missing_directory_lists_empty() {
        let temp = TempDir::new().unwrap();
        let store = StoryStore::new(temp.path().join("never-created"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn delete_removes_only_the_named_file() {
        let temp = TempDir::new().unwrap();
        let store = StoryStore::new(temp.path());

        let a = store.save_at(&generated("제목: a|||x"), at(1, 0, 0)).unwrap();
        let b = store.save_at(&generated("제목: b|||x"), at(2, 0, 0)).unwrap();

        store.delete(&a.filename).unwrap();

        let left = store.list().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].filename, b.filename);
        assert!(matches!(store.delete(&a.filename), Err(StoreError::Delete { .. })));
    }

    #[test]
    fn path_like_names_are_rejected() {
        let temp = TempDir::new().unwrap();
        let store = StoryStore::new(temp.path());

        for bad in ["../x.json", "a/b.json", "", ".json", "story.txt", ".."] {
            assert!(
                matches!(store.load(bad), Err(StoreError::InvalidFilename(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn loaded_filename_follows_the_file_on_disk() {
        let temp = TempDir::new().unwrap();
        let store = StoryStore::new(temp.path());

        let saved = store.save_at(&generated(RAW), at(3, 0, 0)).unwrap();
        fs::rename(temp.path().join(&saved.filename), temp.path().join("renamed.json")).unwrap();

        let loaded = store.load("renamed.json").unwrap();
        assert_eq!(loaded.filename, "renamed.json");
    }

    #[test]
    fn unwritable_directory_reports_the_cause() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let store = StoryStore::new(blocker.join("stories"));
        let err = store.save(&generated(RAW)).unwrap_err();
        assert!(matches!(err, StoreError::CreateDir { .. }));
        assert!(err.to_string().contains("failed to create storage directory"));
    }

    #[test]
    fn default_dir_lives_under_the_app_dir() {
        let dir = StoryStore::default_dir();
        if dirs::data_dir().is_some() {
            assert!(dir.ends_with(Path::new(APP_DIR_NAME).join("stories")));
        } else {
            assert_eq!(dir, PathBuf::from("saved_stories"));
        }
    }

    #[test]
    fn sanitize_strips_illegal_characters() {
        let name = sanitize_title("a/b:c");
        assert_eq!(name, "abc");
        assert!(!name.chars().any(|c| ILLEGAL_CHARS.contains(&c)));
    }

    #[test]
    fn sanitize_truncates_and_joins_whitespace() {
        assert_eq!(sanitize_title("커피 쏟은  날"), "커피_쏟은_날");
        assert_eq!(
            sanitize_title("abcdefghijklmnopqrstuvwxyz").chars().count(),
            TITLE_PREFIX_CHARS
        );
    }

    #[test]
    fn sanitize_falls_back_when_nothing_is_left() {
        assert_eq!(sanitize_title(""), UNTITLED);
        assert_eq!(sanitize_title("///:::"), UNTITLED);
        assert_eq!(sanitize_title(" .. "), UNTITLED);
    }
}

//! Sound library
//!
//! Static mapping from category key to an ordered list of clips, plus the
//! display metadata the mini player shows for each category. Immutable once
//! the board is built.

use crate::error::{Error, Result};
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Clip identifier (path relative to the sound root)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipRef(String);

impl ClipRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human title derived from the file name: extension dropped,
    /// underscores shown as spaces.
    pub fn title(&self) -> String {
        let stem = Path::new(&self.0)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.clone());
        stem.replace('_', " ")
    }
}

impl fmt::Display for ClipRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One category of notification clips
#[derive(Debug, Clone)]
pub struct SoundCategory {
    /// Key used by reminder slots
    pub key: String,
    /// Label shown in the player and dropdown
    pub display_name: String,
    /// Vinyl artwork shown while a clip of this category plays
    pub vinyl: String,
    /// Ordered clip list
    pub clips: Vec<ClipRef>,
}

/// A clip chosen for playback with its display metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PickedClip {
    pub category: String,
    pub category_label: String,
    pub vinyl: String,
    pub clip: ClipRef,
    /// Player title: "<category display name> - <clip title>"
    pub title: String,
}

/// Category → clips table
#[derive(Debug, Clone, Default)]
pub struct SoundLibrary {
    categories: BTreeMap<String, SoundCategory>,
}

impl SoundLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two categories the board ships with
    pub fn builtin() -> Self {
        let mut library = Self::new();
        library.insert(SoundCategory {
            key: "piam".to_string(),
            display_name: "_p.iam_".to_string(),
            vinyl: "disque/p.iam.png".to_string(),
            clips: vec![ClipRef::new("_p.iam_/Não Cá Vàng.m4a")],
        });
        library.insert(SoundCategory {
            key: "Sonnguyn".to_string(),
            display_name: "Sonnguyn".to_string(),
            vinyl: "disque/sonnguyn.png".to_string(),
            clips: vec![ClipRef::new("Sonnguyn/Người như anh xứng đáng có đơn.m4a")],
        });
        library
    }

    /// Add or replace a category
    pub fn insert(&mut self, category: SoundCategory) {
        self.categories.insert(category.key.clone(), category);
    }

    pub fn get(&self, key: &str) -> Option<&SoundCategory> {
        self.categories.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.categories.contains_key(key)
    }

    /// Category keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Every clip across all categories (for preloading)
    pub fn all_clips(&self) -> impl Iterator<Item = &ClipRef> {
        self.categories.values().flat_map(|c| c.clips.iter())
    }

    /// Display label for a category, falling back to the key itself
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.categories
            .get(key)
            .map(|c| c.display_name.as_str())
            .unwrap_or(key)
    }

    /// Resolve a category to a uniformly random clip.
    ///
    /// Fails with `ResourceUnavailable` when the category is unknown or has
    /// no clips.
    pub fn pick<R: Rng + ?Sized>(&self, key: &str, rng: &mut R) -> Result<PickedClip> {
        let category = self
            .categories
            .get(key)
            .filter(|c| !c.clips.is_empty())
            .ok_or_else(|| Error::ResourceUnavailable(format!("no clips for category '{}'", key)))?;

        let clip = category.clips[rng.gen_range(0..category.clips.len())].clone();
        Ok(PickedClip {
            category: category.key.clone(),
            category_label: category.display_name.clone(),
            vinyl: category.vinyl.clone(),
            title: format!("{} - {}", category.display_name, clip.title()),
            clip,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_clip_title_from_file_name() {
        let clip = ClipRef::new("_p.iam_/Não Cá Vàng.m4a");
        assert_eq!(clip.title(), "Não Cá Vàng");

        let clip = ClipRef::new("bells/soft_morning_bell.ogg");
        assert_eq!(clip.title(), "soft morning bell");
    }

    #[test]
    fn test_builtin_library() {
        let library = SoundLibrary::builtin();
        assert_eq!(library.len(), 2);
        assert!(library.contains("piam"));
        assert!(library.contains("Sonnguyn"));
        assert_eq!(library.display_name("piam"), "_p.iam_");
        assert_eq!(library.display_name("missing"), "missing");
        assert_eq!(library.all_clips().count(), 2);
    }

    #[test]
    fn test_pick_returns_clip_from_category() {
        let mut library = SoundLibrary::new();
        library.insert(SoundCategory {
            key: "bells".to_string(),
            display_name: "Bells".to_string(),
            vinyl: "disque/bells.png".to_string(),
            clips: vec![ClipRef::new("bells/a.ogg"), ClipRef::new("bells/b.ogg")],
        });

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = library.pick("bells", &mut rng).unwrap();
            assert_eq!(picked.category, "bells");
            assert_eq!(picked.vinyl, "disque/bells.png");
            assert!(picked.clip.as_str().starts_with("bells/"));
            assert!(picked.title.starts_with("Bells - "));
        }
    }

    #[test]
    fn test_pick_empty_or_unknown_category_is_unavailable() {
        let mut library = SoundLibrary::new();
        library.insert(SoundCategory {
            key: "empty".to_string(),
            display_name: "Empty".to_string(),
            vinyl: String::new(),
            clips: Vec::new(),
        });

        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            library.pick("empty", &mut rng),
            Err(Error::ResourceUnavailable(_))
        ));
        assert!(matches!(
            library.pick("nope", &mut rng),
            Err(Error::ResourceUnavailable(_))
        ));
    }
}

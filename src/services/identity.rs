use crate::domain::{CategoryId, CharacterId, MediaId};

/// Run-wide surrogate key counters.
///
/// Each call hands out the next id and advances its counter, whether or not
/// the caller's write later succeeds. Ids are never reclaimed, so a failed
/// write leaves a gap.
#[derive(Debug, Clone)]
pub struct IdentityAllocator {
    next_media: i32,
    next_character: i32,
    next_category: i32,
}

impl Default for IdentityAllocator {
    fn default() -> Self {
        Self {
            next_media: 0,
            next_character: 1,
            next_category: 0,
        }
    }
}

impl IdentityAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_media_id(&mut self) -> MediaId {
        let id = MediaId::new(self.next_media);
        self.next_media += 1;
        id
    }

    pub fn next_character_id(&mut self) -> CharacterId {
        let id = CharacterId::new(self.next_character);
        self.next_character += 1;
        id
    }

    pub fn next_category_id(&mut self) -> CategoryId {
        let id = CategoryId::new(self.next_category);
        self.next_category += 1;
        id
    }

    /// Number of media ids handed out so far.
    #[must_use]
    pub const fn media_allocated(&self) -> i32 {
        self.next_media
    }

    #[must_use]
    pub const fn characters_allocated(&self) -> i32 {
        self.next_character - 1
    }
}

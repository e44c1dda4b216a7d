//! Id generation for songs, drafts, and blobs.

use uuid::Uuid;

use crate::now_millis;

/// Fresh UUID v4 id for persisted entities.
pub fn new_entity_id() -> String {
    Uuid::new_v4().to_string()
}

/// Client-side id for records that have not been persisted remotely:
/// `<prefix>-<millis>-<random>`. The random suffix keeps ids distinct even
/// when two are generated within the same millisecond.
pub fn new_local_id(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, now_millis(), &suffix[..8])
}

/// Draft ids use the same millis+suffix scheme without a prefix.
pub fn new_draft_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now_millis(), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_draft_ids_distinct_within_same_millisecond() {
        let ids: HashSet<String> = (0..100).map(|_| new_draft_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_local_id_carries_prefix() {
        let id = new_local_id("song");
        assert!(id.starts_with("song-"));
    }
}

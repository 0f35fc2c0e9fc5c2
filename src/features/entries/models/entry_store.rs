use std::collections::HashSet;

use uuid::Uuid;

use super::{EntryEdit, FileEntry, FileSignature};

/// Insertion-ordered collection of entries.
///
/// Order drives both display and batch-write order. Dropping an entry
/// (remove, clear, or dropping the store) releases its preview.
#[derive(Debug, Default)]
pub struct EntryStore {
    entries: Vec<FileEntry>,
}

impl EntryStore {
    pub fn add(&mut self, entries: impl IntoIterator<Item = FileEntry>) {
        self.entries.extend(entries);
    }

    /// Apply `mutator` to the entry with `id`; returns false when absent
    pub fn update<F>(&mut self, id: Uuid, mutator: F) -> bool
    where
        F: FnOnce(&mut FileEntry),
    {
        match self.entries.iter_mut().find(|e| e.id() == id) {
            Some(entry) => {
                mutator(entry);
                true
            }
            None => false,
        }
    }

    /// Title/tag edit; resets the entry's write status
    pub fn edit(&mut self, id: Uuid, edit: EntryEdit) -> bool {
        self.update(id, |entry| entry.apply_edit(edit))
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        match self.entries.iter().position(|e| e.id() == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every entry; returns how many were removed
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn get(&self, id: Uuid) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FileEntry> {
        self.entries.iter_mut()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.entries.iter().map(FileEntry::id).collect()
    }

    pub fn signatures(&self) -> HashSet<FileSignature> {
        self.entries.iter().map(|e| e.signature().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::entries::models::{PreviewCache, PreviewData, RawFile, WriteStatus};
    use axum::body::Bytes;

    fn entry(cache: &PreviewCache, name: &str) -> FileEntry {
        let id = Uuid::now_v7();
        let raw = RawFile::new(name, "image/jpeg", 1, Bytes::from_static(b"jpeg"));
        let handle = cache.register(
            id,
            PreviewData {
                content_type: raw.content_type.clone(),
                data: raw.data.clone(),
            },
        );
        FileEntry::new(id, raw, handle)
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let cache = PreviewCache::new();
        let mut store = EntryStore::default();
        let a = entry(&cache, "a.jpg");
        let b = entry(&cache, "b.jpg");
        let c = entry(&cache, "c.jpg");
        let expected = vec![a.id(), b.id(), c.id()];

        store.add(vec![a, b]);
        store.add(vec![c]);

        assert_eq!(store.ids(), expected);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_update_touches_only_matching_entry() {
        let cache = PreviewCache::new();
        let mut store = EntryStore::default();
        let a = entry(&cache, "a.jpg");
        let b = entry(&cache, "b.jpg");
        let (a_id, b_id) = (a.id(), b.id());
        store.add(vec![a, b]);

        assert!(store.update(a_id, |e| e.set_title("Sunset")));
        assert!(!store.update(Uuid::now_v7(), |e| e.set_title("ghost")));

        assert_eq!(store.get(a_id).unwrap().title(), "Sunset");
        assert_eq!(store.get(b_id).unwrap().title(), "");
    }

    #[test]
    fn test_edit_resets_write_status() {
        let cache = PreviewCache::new();
        let mut store = EntryStore::default();
        let a = entry(&cache, "a.jpg");
        let id = a.id();
        store.add(vec![a]);

        for prior in [
            WriteStatus::Success,
            WriteStatus::Error("disk full".to_string()),
            WriteStatus::Loading,
        ] {
            store.update(id, |e| e.set_write_status(prior.clone()));
            store.edit(
                id,
                EntryEdit {
                    tags: Some("beach, sea".to_string()),
                    ..Default::default()
                },
            );
            assert_eq!(store.get(id).unwrap().write_status(), &WriteStatus::Idle);
        }
        assert_eq!(store.get(id).unwrap().tags(), "beach, sea");
    }

    #[test]
    fn test_remove_and_clear_release_previews() {
        let cache = PreviewCache::new();
        let mut store = EntryStore::default();
        let a = entry(&cache, "a.jpg");
        let a_id = a.id();
        store.add(vec![a, entry(&cache, "b.jpg"), entry(&cache, "c.jpg")]);
        assert_eq!(cache.live(), 3);

        assert!(store.remove(a_id));
        assert!(!store.remove(a_id));
        assert_eq!(cache.live(), 2);
        assert!(cache.get(a_id).is_none());

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
        assert_eq!(cache.live(), 0);
    }

    #[test]
    fn test_dropping_store_releases_previews() {
        let cache = PreviewCache::new();
        {
            let mut store = EntryStore::default();
            store.add(vec![entry(&cache, "a.jpg"), entry(&cache, "b.jpg")]);
            assert_eq!(cache.live(), 2);
        }
        assert_eq!(cache.live(), 0);
    }
}

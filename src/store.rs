//! The tag store.
//!
//! [`TagStore`] is the sole owner of the active document's tag list. Every mutation
//! (except [`TagStore::reset_tags`]) first copies the current list into a one-slot
//! snapshot so the change can be reverted with [`TagStore::rollback_tags`], then writes
//! the full list to storage.

use crate::constants::TAG_INPUT_SEPARATOR;
use crate::layout::seed_position;
use crate::storage::{load_or, save_json, SharedStorage, TAGS_KEY};
use crate::types::*;
use std::collections::HashSet;

/// Produces monotonically increasing tag ids from the wall clock.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: TagId,
}

impl IdGenerator {
    /// Creates a generator that has not issued any id yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure future ids are greater than every id in `tags`.
    pub fn observe(&mut self, tags: &[Tag]) {
        if let Some(max) = tags.iter().map(|tag| tag.id).max() {
            self.last = self.last.max(max);
        }
    }

    /// Returns one fresh id that no tag in `in_use` carries.
    pub fn next_id(&mut self, in_use: &[Tag]) -> TagId {
        self.next_batch(1, in_use)[0]
    }

    /// Returns `count` fresh ids: the current millisecond timestamp offset by index.
    ///
    /// When the clock has not advanced past the last issued id, numbering continues
    /// from it instead. Once that numbering would pass `TagId::MAX` (an imported list
    /// can carry any id), the smallest positive ids absent from `in_use` are handed out.
    pub fn next_batch(&mut self, count: usize, in_use: &[Tag]) -> Vec<TagId> {
        let Ok(span) = TagId::try_from(count) else {
            return Self::unused_ids(count, in_use);
        };
        let sequential = self.last.checked_add(1).and_then(|next| {
            let base = now_millis().max(next);
            base.checked_add(span - 1).map(|_| base)
        });
        let Some(base) = sequential else {
            log::warn!("Tag id space exhausted after {}, reusing free ids", self.last);
            return Self::unused_ids(count, in_use);
        };
        let ids: Vec<TagId> = (0..span).map(|offset| base + offset).collect();
        if let Some(last) = ids.last() {
            self.last = *last;
        }
        ids
    }

    fn unused_ids(count: usize, in_use: &[Tag]) -> Vec<TagId> {
        let taken: HashSet<TagId> = in_use.iter().map(|tag| tag.id).collect();
        (1..=TagId::MAX)
            .filter(|id| !taken.contains(id))
            .take(count)
            .collect()
    }
}

pub(crate) fn now_millis() -> TagId {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as TagId)
        .unwrap_or_default()
}

/// Small xorshift generator driving [`TagStore::random_shuffle`].
#[derive(Debug, Clone)]
pub struct ShuffleRng {
    state: u64,
}

impl ShuffleRng {
    /// Creates a generator with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    /// Creates a generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        let mut bytes = [0u8; 8];
        if let Err(err) = getrandom::fill(&mut bytes) {
            log::warn!("No entropy source, seeding shuffle from the clock: {err}");
            return Self::seeded(now_millis() as u64);
        }
        Self::seeded(u64::from_le_bytes(bytes))
    }

    /// Next pseudo-random value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Picks one element of a non-empty slice.
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Splits free text into tag contents on the input separator.
///
/// Segments are trimmed and empty ones dropped, so `"a, b,,c "` yields three tags.
pub fn tags_from_input(input: &str) -> Vec<TagContent> {
    input
        .split(TAG_INPUT_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| TagContent::Text(segment.to_string()))
        .collect()
}

/// Owner of the ordered tag list with one-level rollback.
pub struct TagStore {
    tags: Vec<Tag>,
    previous: Vec<Tag>,
    ids: IdGenerator,
    storage: SharedStorage,
}

impl TagStore {
    /// Creates a store, replaying the last committed list from `storage`.
    pub fn new(storage: SharedStorage) -> Self {
        let tags: Vec<Tag> = load_or(&*storage, TAGS_KEY, Vec::new());
        let mut ids = IdGenerator::new();
        ids.observe(&tags);
        Self {
            previous: tags.clone(),
            tags,
            ids,
            storage,
        }
    }

    /// The current list.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// The rollback snapshot.
    pub fn previous(&self) -> &[Tag] {
        &self.previous
    }

    /// Looks up a tag by id.
    pub fn get(&self, id: TagId) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == id)
    }

    /// Returns a fresh id for a tag about to be added.
    pub fn next_id(&mut self) -> TagId {
        self.ids.next_id(&self.tags)
    }

    /// Builds tags with fresh, consecutive ids for each content.
    pub fn make_tags(
        &mut self,
        contents: Vec<TagContent>,
        variant: TagVariant,
        shape: TagShape,
    ) -> Vec<Tag> {
        let ids = self.ids.next_batch(contents.len(), &self.tags);
        contents
            .into_iter()
            .zip(ids)
            .map(|(content, id)| Tag::new(id, content, variant, shape))
            .collect()
    }

    fn snapshot(&mut self) {
        self.previous = self.tags.clone();
    }

    fn persist(&self) {
        save_json(&*self.storage, TAGS_KEY, &self.tags);
    }

    /// Appends one tag.
    pub fn add_tag(&mut self, tag: Tag) {
        self.snapshot();
        self.ids.observe(std::slice::from_ref(&tag));
        self.tags.push(tag);
        self.persist();
    }

    /// Appends several tags as one list replacement.
    pub fn add_tags(&mut self, tags: Vec<Tag>) {
        self.snapshot();
        self.ids.observe(&tags);
        self.tags.extend(tags);
        self.persist();
    }

    /// Removes the tag with `id`. Returns `false` (list unchanged) when no tag matches.
    pub fn remove_tag(&mut self, id: TagId) -> bool {
        self.snapshot();
        let Some(index) = self.tags.iter().position(|tag| tag.id == id) else {
            return false;
        };
        self.tags.remove(index);
        self.persist();
        true
    }

    /// Shallow-merges `patch` into the tag with `id`. Returns `false` when no tag matches.
    pub fn update_tag(&mut self, id: TagId, patch: &TagPatch) -> bool {
        self.snapshot();
        let Some(tag) = self.tags.iter_mut().find(|tag| tag.id == id) else {
            return false;
        };
        tag.apply(patch);
        self.persist();
        true
    }

    /// Replaces the whole list with a caller-provided ordering.
    pub fn update_order(&mut self, tags: Vec<Tag>) {
        self.snapshot();
        self.tags = tags;
        self.persist();
    }

    /// Replaces the whole list with one from a template.
    pub fn replace_all(&mut self, tags: Vec<Tag>) {
        self.snapshot();
        self.ids.observe(&tags);
        self.tags = tags;
        self.persist();
    }

    /// Clears the list. The rollback snapshot is left untouched.
    pub fn reset_tags(&mut self) {
        self.tags.clear();
        self.persist();
    }

    /// Restores the rollback snapshot. Repeated calls restore the same snapshot.
    pub fn rollback_tags(&mut self) {
        self.tags = self.previous.clone();
        self.persist();
    }

    /// Reassigns variant and shape of every tag at random.
    ///
    /// Emoji keep their shape and line breaks are left alone.
    pub fn random_shuffle(&mut self, rng: &mut ShuffleRng) {
        self.snapshot();
        for tag in &mut self.tags {
            match tag.content {
                TagContent::LineBreak => {}
                TagContent::Emoji(_) => {
                    tag.tag_variant = rng.pick(&TagVariant::ALL);
                }
                TagContent::Text(_) => {
                    tag.tag_variant = rng.pick(&TagVariant::ALL);
                    tag.tag_shape = rng.pick(&TagShape::TEXT_SHAPES);
                }
            }
        }
        self.persist();
    }

    /// Gives every positionless, non-line-break tag a cascading default position.
    ///
    /// Returns `false` without touching the list when every tag already has one.
    pub fn assign_missing_positions(&mut self) -> bool {
        let missing = self
            .tags
            .iter()
            .any(|tag| tag.position.is_none() && !tag.content.is_line_break());
        if !missing {
            return false;
        }
        self.snapshot();
        for (index, tag) in self
            .tags
            .iter_mut()
            .filter(|tag| !tag.content.is_line_break())
            .enumerate()
        {
            if tag.position.is_none() {
                tag.position = Some(seed_position(index));
            }
        }
        self.persist();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::rc::Rc;

    fn text(id: TagId, value: &str) -> Tag {
        Tag::text(id, value, TagVariant::Filled, TagShape::Round)
    }

    fn store() -> (TagStore, Rc<MemoryStore>) {
        let storage = MemoryStore::shared();
        (TagStore::new(storage.clone()), storage)
    }

    fn values(store: &TagStore) -> Vec<String> {
        store
            .tags()
            .iter()
            .map(|tag| tag.content.as_text().unwrap_or("").to_string())
            .collect()
    }

    #[test]
    fn add_then_remove_first_keeps_second() {
        let (mut store, _) = store();
        let hello = store.next_id();
        store.add_tag(text(hello, "hello"));
        let world = store.next_id();
        store.add_tag(text(world, "world"));
        assert_eq!(values(&store), ["hello", "world"]);

        assert!(store.remove_tag(hello));
        assert_eq!(values(&store), ["world"]);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let (mut store, storage) = store();
        store.add_tag(text(1, "a"));
        let saved: Vec<Tag> = serde_json::from_str(&storage.get(TAGS_KEY).unwrap()).unwrap();
        assert_eq!(saved, store.tags());

        store.reset_tags();
        assert_eq!(storage.get(TAGS_KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn reload_replays_last_committed_list() {
        let storage = MemoryStore::shared();
        {
            let mut store = TagStore::new(storage.clone());
            store.add_tags(vec![text(10, "a"), text(11, "b")]);
        }
        let mut reloaded = TagStore::new(storage);
        assert_eq!(values(&reloaded), ["a", "b"]);
        assert!(reloaded.next_id() > 11);
    }

    #[test]
    fn malformed_stored_list_falls_back_to_empty() {
        let storage = MemoryStore::shared();
        storage.set(TAGS_KEY, "{\"oops\":true}").unwrap();
        let store = TagStore::new(storage);
        assert!(store.tags().is_empty());
    }

    #[test]
    fn rollback_restores_pre_mutation_list_and_is_idempotent() {
        let (mut store, _) = store();
        store.add_tags(vec![text(1, "a"), text(2, "b")]);
        let before = store.tags().to_vec();

        store.update_tag(2, &TagPatch::content(TagContent::Text("changed".into())));
        assert_ne!(store.tags(), before.as_slice());
        assert_eq!(store.previous(), before.as_slice());

        store.rollback_tags();
        assert_eq!(store.tags(), before.as_slice());
        store.rollback_tags();
        assert_eq!(store.tags(), before.as_slice());
    }

    #[test]
    fn unknown_ids_are_silent_no_ops() {
        let (mut store, _) = store();
        store.add_tag(text(1, "a"));
        let before = store.tags().to_vec();

        assert!(!store.remove_tag(99));
        assert!(!store.update_tag(99, &TagPatch::position(TagPosition::new(1.0, 1.0))));
        assert_eq!(store.tags(), before.as_slice());
    }

    #[test]
    fn reset_does_not_take_a_snapshot() {
        let (mut store, _) = store();
        store.add_tag(text(1, "a"));
        store.add_tag(text(2, "b"));
        store.reset_tags();
        assert!(store.tags().is_empty());

        // The snapshot still holds the list from before the last add.
        store.rollback_tags();
        assert_eq!(values(&store), ["a"]);
    }

    #[test]
    fn update_order_is_a_permutation() {
        let (mut store, _) = store();
        store.add_tags(vec![text(1, "a"), text(2, "b"), text(3, "c")]);
        let mut reordered = store.tags().to_vec();
        reordered.reverse();
        store.update_order(reordered);

        assert_eq!(values(&store), ["c", "b", "a"]);
        let mut ids: Vec<_> = store.tags().iter().map(|tag| tag.id).collect();
        ids.sort();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn matches_reference_model_over_a_sequence() {
        let (mut store, _) = store();
        let mut model: Vec<Tag> = Vec::new();

        for step in 0..30_i64 {
            match step % 5 {
                0 | 1 | 3 => {
                    let tag = text(store.next_id(), &format!("t{step}"));
                    model.push(tag.clone());
                    store.add_tag(tag);
                }
                2 => {
                    let id = model[model.len() / 2].id;
                    model.retain(|tag| tag.id != id);
                    store.remove_tag(id);
                }
                _ => {
                    let id = model[0].id;
                    let patch = TagPatch {
                        tag_variant: Some(TagVariant::Outlined),
                        ..Default::default()
                    };
                    model[0].apply(&patch);
                    store.update_tag(id, &patch);
                }
            }
        }

        assert_eq!(store.tags(), model.as_slice());
        let mut ids: Vec<_> = model.iter().map(|tag| tag.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), model.len());
    }

    #[test]
    fn batch_ids_are_consecutive_and_increasing() {
        let (mut store, _) = store();
        let tags = store.make_tags(
            tags_from_input("a, b , ,c"),
            TagVariant::Ghost,
            TagShape::Squared,
        );
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[1].id, tags[0].id + 1);
        assert_eq!(tags[2].id, tags[1].id + 1);
        assert!(store.next_id() > tags[2].id);
    }

    #[test]
    fn ids_after_the_largest_id_reuse_free_slots() {
        let (mut store, _) = store();
        store.replace_all(vec![text(TagId::MAX, "huge"), text(1, "one")]);

        let ids = store.ids.next_batch(2, &store.tags);
        assert_eq!(ids, [2, 3]);

        let tags = store.make_tags(tags_from_input("next, after"), TagVariant::Filled, TagShape::Round);
        store.add_tags(tags);
        let mut ids: Vec<_> = store.tags().iter().map(|tag| tag.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids, [1, 2, 3, TagId::MAX]);
        assert_eq!(store.next_id(), 4);
    }

    #[test]
    fn input_split_drops_empty_segments() {
        let contents = tags_from_input(" one,,two , ");
        assert_eq!(
            contents,
            vec![TagContent::Text("one".into()), TagContent::Text("two".into())]
        );
        assert!(tags_from_input("  ").is_empty());
    }

    #[test]
    fn shuffle_touches_style_only() {
        let (mut store, _) = store();
        store.add_tags(vec![text(1, "a"), Tag::line_break(2), text(3, "c")]);
        let before = store.tags().to_vec();

        store.random_shuffle(&mut ShuffleRng::seeded(42));

        for (old, new) in before.iter().zip(store.tags()) {
            assert_eq!(old.id, new.id);
            assert_eq!(old.content, new.content);
            assert_ne!(new.tag_shape, TagShape::Emoji);
        }
        assert_eq!(store.tags()[1], before[1]);
        store.rollback_tags();
        assert_eq!(store.tags(), before.as_slice());
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let mut a = ShuffleRng::seeded(7);
        let mut b = ShuffleRng::seeded(7);
        for _ in 0..10 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn missing_positions_are_seeded_once() {
        let (mut store, _) = store();
        let mut placed = text(1, "placed");
        placed.position = Some(TagPosition::new(50.0, 50.0));
        store.add_tags(vec![placed, Tag::line_break(2), text(3, "loose")]);

        assert!(store.assign_missing_positions());
        assert_eq!(store.get(1).unwrap().position, Some(TagPosition::new(50.0, 50.0)));
        assert!(store.get(2).unwrap().position.is_none());
        assert!(store.get(3).unwrap().position.is_some());
        assert!(!store.assign_missing_positions());
    }
}

//! Layout strategies over the tag list.
//!
//! - Flow: [`flow_layout`] wraps tag boxes in array order; a line break ends the row.
//! - Sortable: the same flow, reordered through [`reorder_by_ids`] (drag and drop) or
//!   [`move_by_key`] (keyboard), both committed with `TagStore::update_order`.
//! - Free-form: every visible tag carries a percentage position moved with [`FreeDrag`].

use crate::constants::{DRAG_THRESHOLD_PX, SEED_COLUMNS, SEED_ORIGIN, SEED_STEP_X, SEED_STEP_Y};
use crate::palette::{Palette, TagStyle};
use crate::presets::TagMetrics;
use crate::types::*;
use egui::{Pos2, Rect, Vec2};

/// One entry fed to [`flow_layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowItem {
    /// A tag box of the given size
    Box(Vec2),
    /// A forced row break
    Break,
}

/// Result of [`flow_layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlowLayout {
    /// Placement of each input item relative to the container's top-left corner;
    /// `None` for breaks
    pub rects: Vec<Option<Rect>>,
    /// Natural size needed to lay out every item
    pub content_size: Vec2,
}

struct Row {
    items: Vec<(usize, Vec2)>,
    width: f32,
    height: f32,
}

impl Row {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            width: 0.0,
            height: 0.0,
        }
    }
}

/// Wraps `items` left to right into rows no wider than `max_width` where possible.
///
/// Rows are centred horizontally and items centred vertically within their row. An
/// item wider than `max_width` sits alone on its row, so the content width exceeds the
/// box and the overflow detector can report it.
pub fn flow_layout(items: &[FlowItem], max_width: f32, gap: f32) -> FlowLayout {
    let mut rows: Vec<Row> = Vec::new();
    let mut row = Row::new();

    for (index, item) in items.iter().enumerate() {
        match item {
            FlowItem::Box(size) => {
                let needed = if row.items.is_empty() {
                    size.x
                } else {
                    row.width + gap + size.x
                };
                if !row.items.is_empty() && needed > max_width {
                    rows.push(std::mem::replace(&mut row, Row::new()));
                    row.width = size.x;
                } else {
                    row.width = needed;
                }
                row.height = row.height.max(size.y);
                row.items.push((index, *size));
            }
            FlowItem::Break => {
                if !row.items.is_empty() {
                    rows.push(std::mem::replace(&mut row, Row::new()));
                }
            }
        }
    }
    if !row.items.is_empty() {
        rows.push(row);
    }

    let mut rects = vec![None; items.len()];
    let mut y = 0.0;
    let mut content_width: f32 = 0.0;
    for (row_index, row) in rows.iter().enumerate() {
        if row_index > 0 {
            y += gap;
        }
        let mut x = ((max_width - row.width) / 2.0).max(0.0);
        for (index, size) in &row.items {
            let top = y + (row.height - size.y) / 2.0;
            rects[*index] = Some(Rect::from_min_size(egui::pos2(x, top), *size));
            x += size.x + gap;
        }
        content_width = content_width.max(row.width);
        y += row.height;
    }

    FlowLayout {
        rects,
        content_size: egui::vec2(content_width, y),
    }
}

/// Natural size of one tag in canvas units, given the measured width of its text.
pub fn tag_box_size(content: &TagContent, style: &TagStyle, metrics: &TagMetrics, text_width: f32) -> Vec2 {
    match content {
        TagContent::Text(_) => {
            let padding = if style.padded { 2.0 * metrics.padding_x } else { 0.0 };
            egui::vec2(text_width + padding, metrics.height)
        }
        TagContent::Emoji(_) => egui::vec2(metrics.emoji_size, metrics.emoji_size),
        TagContent::LineBreak => Vec2::ZERO,
    }
}

/// Builds the flow input for `tags`; `measure` returns the rendered width of a text value.
pub fn flow_items(
    tags: &[Tag],
    palette: &Palette,
    metrics: &TagMetrics,
    mut measure: impl FnMut(&str) -> f32,
) -> Vec<FlowItem> {
    tags.iter()
        .map(|tag| match &tag.content {
            TagContent::LineBreak => FlowItem::Break,
            content => {
                let style = palette.tag_style(tag.tag_variant, tag.tag_shape);
                let text_width = content.as_text().map(&mut measure).unwrap_or_default();
                FlowItem::Box(tag_box_size(content, &style, metrics, text_width))
            }
        })
        .collect()
}

/// Offset that centres the flow block vertically inside a container of `bounds` size.
pub fn flow_block_offset(layout: &FlowLayout, bounds: Vec2) -> Vec2 {
    egui::vec2(0.0, ((bounds.y - layout.content_size.y) / 2.0).max(0.0))
}

/// Moves the element at `from` to `to` by removing and reinserting it.
pub fn array_move<T>(list: &mut Vec<T>, from: usize, to: usize) {
    if from >= list.len() || to >= list.len() || from == to {
        return;
    }
    let item = list.remove(from);
    list.insert(to, item);
}

/// Computes the order after dropping `dragged` onto `target`.
///
/// Returns `None` when either id is missing (a stale drag target) or both are the same
/// tag, in which case nothing should be committed.
pub fn reorder_by_ids(tags: &[Tag], dragged: TagId, target: TagId) -> Option<Vec<Tag>> {
    let from = tags.iter().position(|tag| tag.id == dragged)?;
    let to = tags.iter().position(|tag| tag.id == target)?;
    if from == to {
        return None;
    }
    let mut reordered = tags.to_vec();
    array_move(&mut reordered, from, to);
    Some(reordered)
}

/// Direction of a keyboard reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMove {
    /// Towards the start of the list (left/up arrow)
    Backward,
    /// Towards the end of the list (right/down arrow)
    Forward,
}

/// Swaps the tag with `id` with its neighbour in the given direction.
///
/// Returns `None` for an unknown id or when the tag is already at that end.
pub fn move_by_key(tags: &[Tag], id: TagId, direction: KeyMove) -> Option<Vec<Tag>> {
    let index = tags.iter().position(|tag| tag.id == id)?;
    let neighbour = match direction {
        KeyMove::Backward => index.checked_sub(1)?,
        KeyMove::Forward if index + 1 < tags.len() => index + 1,
        KeyMove::Forward => return None,
    };
    let mut reordered = tags.to_vec();
    reordered.swap(index, neighbour);
    Some(reordered)
}

/// Tags taking part in free-form layout: everything except line breaks.
pub fn visible_free_form(tags: &[Tag]) -> impl Iterator<Item = &Tag> {
    tags.iter().filter(|tag| !tag.content.is_line_break())
}

/// Default position of the `index`-th tag entering free-form mode.
pub fn seed_position(index: usize) -> TagPosition {
    TagPosition::new(
        SEED_ORIGIN + (index % SEED_COLUMNS) as f32 * SEED_STEP_X,
        SEED_ORIGIN + (index / SEED_COLUMNS) as f32 * SEED_STEP_Y,
    )
    .clamped()
}

/// Converts a percentage position to a point inside `container`.
pub fn percent_to_point(container: Rect, position: TagPosition) -> Pos2 {
    container.min + egui::vec2(
        container.width() * position.x / 100.0,
        container.height() * position.y / 100.0,
    )
}

/// Converts a point inside `container` to a percentage position.
pub fn point_to_percent(container: Rect, point: Pos2) -> TagPosition {
    let offset = point - container.min;
    TagPosition::new(
        percent_of(offset.x, container.width()),
        percent_of(offset.y, container.height()),
    )
}

fn percent_of(value: f32, whole: f32) -> f32 {
    if whole > 0.0 {
        value / whole * 100.0
    } else {
        0.0
    }
}

/// How a free-form drag ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// The tag moved; commit the clamped position
    Moved {
        /// Dragged tag
        id: TagId,
        /// Final position, clamped to the canvas
        position: TagPosition,
    },
    /// The pointer never left the threshold; treat as a selection click
    Clicked(TagId),
}

/// State of one active free-form drag.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeDrag {
    tag_id: TagId,
    start_pointer: Pos2,
    start_position: TagPosition,
    preview: TagPosition,
    moved: bool,
}

impl FreeDrag {
    /// Starts dragging `tag` from `pointer`. Line breaks cannot be dragged.
    pub fn begin(tag: &Tag, pointer: Pos2) -> Option<Self> {
        if tag.content.is_line_break() {
            return None;
        }
        let start_position = tag.position.unwrap_or_default();
        Some(Self {
            tag_id: tag.id,
            start_pointer: pointer,
            start_position,
            preview: start_position,
            moved: false,
        })
    }

    /// Dragged tag.
    pub fn tag_id(&self) -> TagId {
        self.tag_id
    }

    /// Transient position for visual feedback. Not committed and not clamped.
    pub fn preview(&self) -> TagPosition {
        self.preview
    }

    /// Whether the pointer has travelled past the click threshold.
    pub fn moved(&self) -> bool {
        self.moved
    }

    /// Follows the pointer; `container` is the measured size of the canvas content box.
    pub fn update(&mut self, pointer: Pos2, container: Vec2) {
        let delta = pointer - self.start_pointer;
        self.preview = TagPosition::new(
            self.start_position.x + percent_of(delta.x, container.x),
            self.start_position.y + percent_of(delta.y, container.y),
        );
        if delta.x.abs() >= DRAG_THRESHOLD_PX || delta.y.abs() >= DRAG_THRESHOLD_PX {
            self.moved = true;
        }
    }

    /// Ends the drag.
    pub fn finish(self) -> DragOutcome {
        if self.moved {
            DragOutcome::Moved {
                id: self.tag_id,
                position: self.preview.clamped(),
            }
        } else {
            DragOutcome::Clicked(self.tag_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: TagId, value: &str) -> Tag {
        Tag::text(id, value, TagVariant::Filled, TagShape::Round)
    }

    fn ids(tags: &[Tag]) -> Vec<TagId> {
        tags.iter().map(|tag| tag.id).collect()
    }

    #[test]
    fn flow_wraps_when_row_is_full() {
        let items = [
            FlowItem::Box(egui::vec2(40.0, 10.0)),
            FlowItem::Box(egui::vec2(40.0, 10.0)),
            FlowItem::Box(egui::vec2(40.0, 10.0)),
        ];
        let layout = flow_layout(&items, 100.0, 5.0);
        let rects: Vec<Rect> = layout.rects.iter().map(|r| r.unwrap()).collect();

        assert_eq!(rects[0].min.y, rects[1].min.y);
        assert!(rects[2].min.y > rects[0].min.y);
        assert_eq!(layout.content_size, egui::vec2(85.0, 25.0));
    }

    #[test]
    fn flow_break_forces_new_row() {
        let items = [
            FlowItem::Box(egui::vec2(10.0, 10.0)),
            FlowItem::Break,
            FlowItem::Box(egui::vec2(10.0, 10.0)),
        ];
        let layout = flow_layout(&items, 100.0, 4.0);
        assert!(layout.rects[1].is_none());
        assert_eq!(layout.rects[2].unwrap().min.y, 14.0);
        assert_eq!(layout.content_size.y, 24.0);
    }

    #[test]
    fn flow_rows_are_centred() {
        let layout = flow_layout(&[FlowItem::Box(egui::vec2(20.0, 10.0))], 100.0, 4.0);
        assert_eq!(layout.rects[0].unwrap().min.x, 40.0);
    }

    #[test]
    fn oversized_item_widens_content() {
        let items = [
            FlowItem::Box(egui::vec2(30.0, 10.0)),
            FlowItem::Box(egui::vec2(150.0, 10.0)),
        ];
        let layout = flow_layout(&items, 100.0, 4.0);
        assert_eq!(layout.rects[1].unwrap().min.x, 0.0);
        assert_eq!(layout.content_size.x, 150.0);
    }

    #[test]
    fn empty_flow_has_no_size() {
        let layout = flow_layout(&[FlowItem::Break], 100.0, 4.0);
        assert_eq!(layout.content_size, Vec2::ZERO);
    }

    #[test]
    fn flow_items_measure_text_and_size_emoji() {
        use crate::emoji::EmojiCatalog;
        use crate::palette::PaletteName;
        use crate::presets::TagSizePreset;

        let palette = PaletteName::White.palette();
        let metrics = TagSizePreset::Medium.metrics();
        let tags = vec![
            text(1, "abcd"),
            Tag::line_break(2),
            Tag::emoji(3, EmojiCatalog::builtin().get("fire").unwrap().clone()),
            Tag::text(4, "ab", TagVariant::Ghost, TagShape::Squared),
        ];
        let items = flow_items(&tags, &palette, &metrics, |s| s.len() as f32 * 10.0);

        assert_eq!(
            items[0],
            FlowItem::Box(egui::vec2(40.0 + 2.0 * metrics.padding_x, metrics.height))
        );
        assert_eq!(items[1], FlowItem::Break);
        assert_eq!(
            items[2],
            FlowItem::Box(egui::vec2(metrics.emoji_size, metrics.emoji_size))
        );
        assert_eq!(
            items[3],
            FlowItem::Box(egui::vec2(20.0 + 2.0 * metrics.padding_x, metrics.height))
        );
    }

    #[test]
    fn short_blocks_are_centred_vertically() {
        let layout = flow_layout(&[FlowItem::Box(egui::vec2(10.0, 20.0))], 100.0, 4.0);
        assert_eq!(flow_block_offset(&layout, egui::vec2(100.0, 100.0)), egui::vec2(0.0, 40.0));
        assert_eq!(flow_block_offset(&layout, egui::vec2(100.0, 10.0)), Vec2::ZERO);
    }

    #[test]
    fn array_move_reinserts() {
        let mut list = vec!['a', 'b', 'c', 'd'];
        array_move(&mut list, 0, 2);
        assert_eq!(list, ['b', 'c', 'a', 'd']);
        array_move(&mut list, 3, 0);
        assert_eq!(list, ['d', 'b', 'c', 'a']);
        array_move(&mut list, 9, 0);
        assert_eq!(list, ['d', 'b', 'c', 'a']);
    }

    #[test]
    fn reorder_by_ids_moves_dragged_onto_target() {
        let tags = vec![text(1, "a"), text(2, "b"), text(3, "c")];
        let reordered = reorder_by_ids(&tags, 1, 3).unwrap();
        assert_eq!(ids(&reordered), [2, 3, 1]);

        let reordered = reorder_by_ids(&tags, 3, 1).unwrap();
        assert_eq!(ids(&reordered), [3, 1, 2]);
    }

    #[test]
    fn reorder_with_stale_or_same_id_is_a_no_op() {
        let tags = vec![text(1, "a"), text(2, "b")];
        assert!(reorder_by_ids(&tags, 1, 42).is_none());
        assert!(reorder_by_ids(&tags, 42, 1).is_none());
        assert!(reorder_by_ids(&tags, 2, 2).is_none());
    }

    #[test]
    fn keyboard_move_swaps_neighbours() {
        let tags = vec![text(1, "a"), text(2, "b"), text(3, "c")];
        assert_eq!(ids(&move_by_key(&tags, 2, KeyMove::Backward).unwrap()), [2, 1, 3]);
        assert_eq!(ids(&move_by_key(&tags, 2, KeyMove::Forward).unwrap()), [1, 3, 2]);
        assert!(move_by_key(&tags, 1, KeyMove::Backward).is_none());
        assert!(move_by_key(&tags, 3, KeyMove::Forward).is_none());
        assert!(move_by_key(&tags, 9, KeyMove::Forward).is_none());
    }

    #[test]
    fn free_form_hides_line_breaks() {
        let tags = vec![text(1, "a"), Tag::line_break(2), text(3, "c")];
        let visible: Vec<TagId> = visible_free_form(&tags).map(|tag| tag.id).collect();
        assert_eq!(visible, [1, 3]);
    }

    #[test]
    fn line_break_cannot_be_dragged() {
        assert!(FreeDrag::begin(&Tag::line_break(1), Pos2::ZERO).is_none());
    }

    #[test]
    fn small_drag_is_a_click() {
        let mut tag = text(1, "a");
        tag.position = Some(TagPosition::new(10.0, 10.0));
        let mut drag = FreeDrag::begin(&tag, egui::pos2(100.0, 100.0)).unwrap();
        drag.update(egui::pos2(102.0, 101.0), egui::vec2(200.0, 100.0));
        assert!(!drag.moved());
        assert_eq!(drag.finish(), DragOutcome::Clicked(1));
    }

    #[test]
    fn drag_past_threshold_commits_percent_delta() {
        let mut tag = text(1, "a");
        tag.position = Some(TagPosition::new(10.0, 10.0));
        let mut drag = FreeDrag::begin(&tag, egui::pos2(100.0, 100.0)).unwrap();
        drag.update(egui::pos2(140.0, 100.0), egui::vec2(200.0, 100.0));
        assert!(drag.moved());
        assert_eq!(drag.preview(), TagPosition::new(30.0, 10.0));
        assert_eq!(
            drag.finish(),
            DragOutcome::Moved {
                id: 1,
                position: TagPosition::new(30.0, 10.0)
            }
        );
    }

    #[test]
    fn threshold_is_inclusive_on_either_axis() {
        let tag = text(1, "a");
        let mut drag = FreeDrag::begin(&tag, Pos2::ZERO).unwrap();
        drag.update(egui::pos2(0.0, 3.0), egui::vec2(100.0, 100.0));
        assert!(drag.moved());
    }

    #[test]
    fn moved_position_is_clamped() {
        let mut tag = text(1, "a");
        tag.position = Some(TagPosition::new(80.0, 5.0));
        let mut drag = FreeDrag::begin(&tag, egui::pos2(0.0, 0.0)).unwrap();
        drag.update(egui::pos2(100.0, -50.0), egui::vec2(200.0, 100.0));
        match drag.finish() {
            DragOutcome::Moved { position, .. } => {
                assert_eq!(position, TagPosition::new(90.0, 0.0));
            }
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[test]
    fn moved_flag_sticks_after_returning() {
        let tag = text(1, "a");
        let mut drag = FreeDrag::begin(&tag, Pos2::ZERO).unwrap();
        drag.update(egui::pos2(10.0, 0.0), egui::vec2(100.0, 100.0));
        drag.update(egui::pos2(1.0, 0.0), egui::vec2(100.0, 100.0));
        assert!(drag.moved());
    }

    #[test]
    fn percent_conversions_are_inverse() {
        let container = Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(200.0, 100.0));
        let point = percent_to_point(container, TagPosition::new(50.0, 25.0));
        assert_eq!(point, egui::pos2(110.0, 45.0));
        assert_eq!(point_to_percent(container, point), TagPosition::new(50.0, 25.0));
    }

    #[test]
    fn seeded_positions_cascade_and_stay_in_bounds() {
        assert_eq!(seed_position(0), TagPosition::new(5.0, 5.0));
        assert_eq!(seed_position(1), TagPosition::new(27.0, 5.0));
        assert_eq!(seed_position(4), TagPosition::new(5.0, 21.0));
        let far = seed_position(100);
        assert!(far.x <= 90.0 && far.y <= 90.0);
    }
}

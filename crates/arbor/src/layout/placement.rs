//! Coordinate assignment inside one scope.
//!
//! Ranks are stacked along the main axis, each as thick as its thickest item.
//! Items of a rank are laid out along the cross axis with a fixed gap, and
//! every rank is centered on the widest one. Coordinates are relative to the
//! scope's content origin.

use arbor_core::geometry::{Point, Size};

use crate::model::Direction;

#[derive(Debug, Default)]
pub(super) struct Placement {
    /// Relative top-left corner of every item.
    pub offsets: Vec<Point>,
    /// Size of the content, in x/y terms.
    pub content: Size,
}

/// Places items of `layers` with the given sizes.
///
/// `rank_gaps[r]` separates rank `r` from rank `r + 1`.
pub(super) fn place(
    layers: &[Vec<usize>],
    sizes: &[Size],
    rank_gaps: &[f32],
    node_spacing: f32,
    direction: Direction,
) -> Placement {
    let mut offsets = vec![Point::default(); sizes.len()];
    if layers.is_empty() {
        return Placement {
            offsets,
            content: Size::default(),
        };
    }

    let thickness: Vec<f32> = layers
        .iter()
        .map(|layer| {
            layer
                .iter()
                .map(|&item| direction.main_extent(sizes[item]))
                .fold(0.0, f32::max)
        })
        .collect();

    let lengths: Vec<f32> = layers
        .iter()
        .map(|layer| {
            let items: f32 = layer
                .iter()
                .map(|&item| direction.cross_extent(sizes[item]))
                .sum();
            items + node_spacing * layer.len().saturating_sub(1) as f32
        })
        .collect();
    let cross_total = lengths.iter().copied().fold(0.0, f32::max);

    let mut main = 0.0;
    for (rank, layer) in layers.iter().enumerate() {
        let mut cross = (cross_total - lengths[rank]) / 2.0;
        for &item in layer {
            let size = sizes[item];
            let main_start = main + (thickness[rank] - direction.main_extent(size)) / 2.0;
            offsets[item] = direction.point(main_start, cross);
            cross += direction.cross_extent(size) + node_spacing;
        }

        main += thickness[rank];
        if rank + 1 < layers.len() {
            main += rank_gaps.get(rank).copied().unwrap_or_default();
        }
    }

    Placement {
        offsets,
        content: direction.size(main, cross_total),
    }
}

//! In-rank ordering by the barycenter heuristic.
//!
//! Items start in insertion order. Sweeps alternate downwards (each rank
//! ordered by its neighbours in the rank above) and upwards. Only neighbours
//! in the adjacent rank count. The ordering with the fewest crossings seen
//! wins, the earliest one on ties.

use std::cmp::Ordering;

use log::trace;

/// Groups items by rank, each rank in insertion order.
pub(super) fn initial_layers(ranks: &[usize]) -> Vec<Vec<usize>> {
    let rank_count = ranks.iter().max().map_or(0, |max| max + 1);
    let mut layers = vec![Vec::new(); rank_count];
    for (item, &rank) in ranks.iter().enumerate() {
        layers[rank].push(item);
    }
    layers
}

/// Counts pairwise crossings of edges between adjacent ranks.
///
/// Edges spanning more than one rank, or within a rank, are ignored.
pub(super) fn count_crossings(
    layers: &[Vec<usize>],
    ranks: &[usize],
    edges: &[(usize, usize)],
) -> usize {
    let positions = positions(layers, ranks.len());
    let mut crossings = 0;

    for upper in 0..layers.len().saturating_sub(1) {
        let segments: Vec<(usize, usize)> = edges
            .iter()
            .filter_map(|&(a, b)| {
                if ranks[a] == upper && ranks[b] == upper + 1 {
                    Some((positions[a], positions[b]))
                } else if ranks[b] == upper && ranks[a] == upper + 1 {
                    Some((positions[b], positions[a]))
                } else {
                    None
                }
            })
            .collect();

        for (i, &(u1, l1)) in segments.iter().enumerate() {
            for &(u2, l2) in &segments[i + 1..] {
                if (u1 < u2 && l1 > l2) || (u1 > u2 && l1 < l2) {
                    crossings += 1;
                }
            }
        }
    }

    crossings
}

/// Orders every rank, returning the best layers and their crossing count.
pub(super) fn order_layers(
    ranks: &[usize],
    edges: &[(usize, usize)],
    passes: usize,
) -> (Vec<Vec<usize>>, usize) {
    let mut layers = initial_layers(ranks);
    let mut best = layers.clone();
    let mut best_crossings = count_crossings(&layers, ranks, edges);

    for pass in 0..passes {
        if best_crossings == 0 {
            break;
        }

        let downward = pass % 2 == 0;
        if downward {
            for rank in 1..layers.len() {
                reorder(&mut layers, rank, rank - 1, ranks, edges);
            }
        } else {
            for rank in (0..layers.len().saturating_sub(1)).rev() {
                reorder(&mut layers, rank, rank + 1, ranks, edges);
            }
        }

        let crossings = count_crossings(&layers, ranks, edges);
        trace!(pass, downward, crossings; "Ordering sweep");
        if crossings < best_crossings {
            best_crossings = crossings;
            best = layers.clone();
        }
    }

    (best, best_crossings)
}

/// Re-sorts `layers[rank]` by the mean position of neighbours in `layers[fixed]`.
fn reorder(
    layers: &mut [Vec<usize>],
    rank: usize,
    fixed: usize,
    ranks: &[usize],
    edges: &[(usize, usize)],
) {
    let positions = positions(layers, ranks.len());

    let mut keyed: Vec<(f32, usize)> = layers[rank]
        .iter()
        .map(|&item| {
            let (sum, count) = edges
                .iter()
                .filter_map(|&(a, b)| {
                    if a == item && ranks[b] == fixed {
                        Some(b)
                    } else if b == item && ranks[a] == fixed {
                        Some(a)
                    } else {
                        None
                    }
                })
                .fold((0.0_f32, 0_usize), |(sum, count), neighbour| {
                    (sum + positions[neighbour] as f32, count + 1)
                });

            // No neighbours: keep the current slot.
            let barycenter = if count == 0 {
                positions[item] as f32
            } else {
                sum / count as f32
            };
            (barycenter, item)
        })
        .collect();

    // Items are numbered in insertion order, so the item index breaks ties.
    keyed.sort_by(|a, b| match a.0.total_cmp(&b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });

    layers[rank] = keyed.into_iter().map(|(_, item)| item).collect();
}

fn positions(layers: &[Vec<usize>], item_count: usize) -> Vec<usize> {
    let mut positions = vec![0; item_count];
    for layer in layers {
        for (position, &item) in layer.iter().enumerate() {
            positions[item] = position;
        }
    }
    positions
}

use crate::corpus::Bigram;
use crate::geometry::KEY_COUNT;
use crate::layout::Layout;
use fastrand::Rng;

/// Weighted SFB draws before falling back to a uniform pick.
pub const MAX_PICK_ATTEMPTS: usize = 64;

/// Picks an item with probability proportional to its count.
pub fn pick_weighted<'a, T>(rng: &mut Rng, items: &'a [(T, u64)]) -> Option<&'a T> {
    let total: u64 = items.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return None;
    }
    let mut target = rng.u64(0..total);
    for (item, n) in items {
        if target < *n {
            return Some(item);
        }
        target -= n;
    }
    None
}

/// Slots holding a character that may move.
pub fn movable_slots(layout: &Layout) -> Vec<usize> {
    (0..KEY_COUNT)
        .filter(|&slot| layout.char_at(slot).is_some() && !layout.is_pinned(slot))
        .collect()
}

fn pick_sfb_slot(rng: &mut Rng, layout: &Layout, sfbs: &[(Bigram, u64)]) -> Option<usize> {
    for _ in 0..MAX_PICK_ATTEMPTS {
        let bigram = pick_weighted(rng, sfbs)?;
        let c = bigram[rng.usize(0..2)];
        let Some(info) = layout.key_info(c) else {
            continue;
        };
        let slot = info.pos.slot();
        if !layout.is_pinned(slot) {
            return Some(slot);
        }
    }
    None
}

/// Moves one character of a frequent same-finger bigram to a random unpinned slot.
///
/// Returns the swapped slots, or `None` when fewer than two characters can move.
pub fn sfb_mutation(
    rng: &mut Rng,
    layout: &mut Layout,
    sfbs: &[(Bigram, u64)],
) -> Option<(usize, usize)> {
    let movable = movable_slots(layout);
    if movable.len() < 2 {
        return None;
    }

    let first = pick_sfb_slot(rng, layout, sfbs)
        .unwrap_or_else(|| movable[rng.usize(0..movable.len())]);

    let others: Vec<usize> = movable.into_iter().filter(|&s| s != first).collect();
    let second = others[rng.usize(0..others.len())];

    layout.swap_slots(first, second);
    Some((first, second))
}

/// Recombination is not used by this search: the child is the first parent.
pub fn crossover(parent: &Layout, _other: &Layout) -> Layout {
    parent.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_weights_pick_nothing() {
        let mut rng = Rng::with_seed(1);
        let items = [('a', 0u64), ('b', 0)];
        assert!(pick_weighted(&mut rng, &items).is_none());
    }

    #[test]
    fn single_weight_always_wins() {
        let mut rng = Rng::with_seed(7);
        let items = [('a', 0u64), ('b', 5), ('c', 0)];
        for _ in 0..100 {
            assert_eq!(pick_weighted(&mut rng, &items), Some(&'b'));
        }
    }
}

//! A* search over the tile grid
//!
//! 4-directional, unit step cost, Manhattan heuristic. Walkability is supplied
//! by the caller so the same search serves every kind of mover.

use std::collections::BTreeSet;

use glam::IVec2;

use super::grid::{Grid, valid};
use crate::{Direction, manhattan};

/// Open-set entry, ordered by total cost then heuristic (then position for stability)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    y: i32,
    x: i32,
}

impl OpenNode {
    fn new(pos: IVec2, g: u32, h: u32) -> Self {
        Self {
            f: g + h,
            h,
            y: pos.y,
            x: pos.x,
        }
    }

    fn pos(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }
}

/// Find an optimal walk from `start` to `goal`
///
/// Returns the cells from start to goal inclusive, or `None` when either end is
/// unwalkable or the goal is unreachable. `start == goal` yields a single-cell path.
/// Each cell is closed at most once, so the search is bounded by the cell count.
pub fn find_path<F>(start: IVec2, goal: IVec2, width: i32, height: i32, mut walkable: F) -> Option<Vec<IVec2>>
where
    F: FnMut(IVec2) -> bool,
{
    if !valid(start, width, height) || !valid(goal, width, height) {
        return None;
    }
    if !walkable(start) || !walkable(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut open = BTreeSet::new();
    let mut g_cost = Grid::new(width, height, u32::MAX);
    let mut parent: Grid<Option<IVec2>> = Grid::new(width, height, None);
    let mut closed = Grid::new(width, height, false);

    g_cost.set(start, 0);
    open.insert(OpenNode::new(start, 0, manhattan(start, goal)));

    while let Some(current) = open.pop_first() {
        let pos = current.pos();
        if pos == goal {
            return Some(reconstruct_path(&parent, start, goal));
        }
        closed.set(pos, true);

        let tentative = g_cost.at(pos) + 1;
        for dir in Direction::ALL {
            let next = pos + dir.offset();
            if !valid(next, width, height) || closed.at(next) || !walkable(next) {
                continue;
            }

            let known = g_cost.at(next);
            if tentative >= known {
                continue;
            }

            let h = manhattan(next, goal);
            if known != u32::MAX {
                // Cheaper route to a node still in the open set
                open.remove(&OpenNode::new(next, known, h));
            }
            g_cost.set(next, tentative);
            parent.set(next, Some(pos));
            open.insert(OpenNode::new(next, tentative, h));
        }
    }

    None
}

fn reconstruct_path(parent: &Grid<Option<IVec2>>, start: IVec2, goal: IVec2) -> Vec<IVec2> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match parent.at(current) {
            Some(prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use proptest::prelude::*;

    use super::*;

    fn open(_: IVec2) -> bool {
        true
    }

    fn assert_contiguous(path: &[IVec2]) {
        for pair in path.windows(2) {
            assert_eq!(manhattan(pair[0], pair[1]), 1, "path must move one cell at a time");
        }
    }

    #[test]
    fn test_start_equals_goal() {
        let p = IVec2::new(3, 3);
        assert_eq!(find_path(p, p, 10, 10, open), Some(vec![p]));
    }

    #[test]
    fn test_open_field_path_is_manhattan() {
        let start = IVec2::new(20, 10);
        let goal = IVec2::new(1, 1);
        let path = find_path(start, goal, 25, 15, open).expect("open field is connected");
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len() as u32, manhattan(start, goal) + 1);
        assert_contiguous(&path);
    }

    #[test]
    fn test_detours_around_wall() {
        // Vertical wall at x=2 with a gap at y=4
        let blocked = |p: IVec2| p.x == 2 && p.y != 4;
        let start = IVec2::new(0, 0);
        let goal = IVec2::new(4, 0);
        let path = find_path(start, goal, 5, 5, |p| !blocked(p)).expect("gap makes goal reachable");
        assert!(path.iter().all(|p| !blocked(*p)));
        assert!(path.contains(&IVec2::new(2, 4)));
        // 4 down, 4 across, 4 up
        assert_eq!(path.len(), 13);
        assert_contiguous(&path);
    }

    #[test]
    fn test_disconnected_region_has_no_path() {
        let wall = |p: IVec2| p.x == 2;
        assert_eq!(find_path(IVec2::new(0, 0), IVec2::new(4, 4), 5, 5, |p| !wall(p)), None);
    }

    #[test]
    fn test_unwalkable_endpoints() {
        let goal = IVec2::new(3, 3);
        assert_eq!(find_path(IVec2::new(0, 0), goal, 5, 5, |p| p != goal), None);
        assert_eq!(find_path(IVec2::new(0, 0), goal, 5, 5, |p| p != IVec2::ZERO), None);
        assert_eq!(find_path(IVec2::new(0, 0), IVec2::new(9, 9), 5, 5, open), None);
    }

    #[test]
    fn test_walkability_is_queried_boundedly() {
        // Fully enclosed start: the search must give up, not spin
        let mut calls = 0;
        let start = IVec2::new(5, 5);
        let result = find_path(start, IVec2::new(0, 0), 11, 11, |p| {
            calls += 1;
            p == start || p == IVec2::ZERO || manhattan(p, start) > 1
        });
        assert_eq!(result, None);
        assert!(calls < 11 * 11 * 4 + 2);
    }

    /// Reference breadth-first distance
    fn bfs_distance(blocked: &[bool], w: i32, h: i32, start: IVec2, goal: IVec2) -> Option<u32> {
        let idx = |p: IVec2| (p.y * w + p.x) as usize;
        if blocked[idx(start)] || blocked[idx(goal)] {
            return None;
        }
        let mut dist = vec![u32::MAX; (w * h) as usize];
        let mut queue = VecDeque::new();
        dist[idx(start)] = 0;
        queue.push_back(start);
        while let Some(p) = queue.pop_front() {
            if p == goal {
                return Some(dist[idx(p)]);
            }
            for dir in Direction::ALL {
                let n = p + dir.offset();
                if valid(n, w, h) && !blocked[idx(n)] && dist[idx(n)] == u32::MAX {
                    dist[idx(n)] = dist[idx(p)] + 1;
                    queue.push_back(n);
                }
            }
        }
        None
    }

    proptest! {
        #[test]
        fn prop_path_is_optimal(
            w in 2i32..12,
            h in 2i32..12,
            bits in proptest::collection::vec(any::<bool>(), 144),
            sx in 0i32..12, sy in 0i32..12, gx in 0i32..12, gy in 0i32..12,
        ) {
            let blocked: Vec<bool> = bits.iter().take((w * h) as usize).copied().collect();
            let start = IVec2::new(sx % w, sy % h);
            let goal = IVec2::new(gx % w, gy % h);
            let idx = |p: IVec2| (p.y * w + p.x) as usize;

            let path = find_path(start, goal, w, h, |p| !blocked[idx(p)]);
            let expected = bfs_distance(&blocked, w, h, start, goal);

            match (path, expected) {
                (Some(path), Some(dist)) => {
                    prop_assert_eq!(path.len() as u32, dist + 1);
                    prop_assert_eq!(path[0], start);
                    prop_assert_eq!(*path.last().unwrap(), goal);
                    for pair in path.windows(2) {
                        prop_assert_eq!(manhattan(pair[0], pair[1]), 1);
                    }
                    prop_assert!(path.iter().all(|p| !blocked[idx(*p)]));
                }
                (None, None) => {}
                (got, want) => prop_assert!(false, "path {:?} vs bfs {:?}", got, want),
            }
        }
    }
}

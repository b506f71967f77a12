use std::collections::VecDeque;

pub(crate) const GRID_W: usize = 15;
pub(crate) const GRID_H: usize = 15;
pub(crate) const COLLECTIBLE_COUNT: usize = 4;

/// Tiny xorshift RNG (no dependency); seeded from the wall clock at game
/// start.
#[derive(Clone)]
pub(crate) struct Rng64(u64);

impl Rng64 {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed | 1)
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        ((x.wrapping_mul(0x2545F4914F6CDD1D)) >> 32) as u32
    }

    /// Uniform pick in `0..n`.
    fn pick(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u32() as usize) % n
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Item {
    Blueberry,
    Acorn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    fn step(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// Odd-sized grid; `true` = wall. Cells at odd (x, y) are rooms, the rest
/// start as walls and get carved.
#[derive(Clone, Debug)]
pub(crate) struct Maze {
    pub(crate) w: usize,
    pub(crate) h: usize,
    walls: Vec<bool>,
}

impl Maze {
    pub(crate) fn is_wall(&self, x: usize, y: usize) -> bool {
        if x >= self.w || y >= self.h {
            return true;
        }
        self.walls[y * self.w + x]
    }

    fn carve(&mut self, x: usize, y: usize) {
        self.walls[y * self.w + x] = false;
    }

    /// Perfect maze via recursive backtracking, iterative stack form. Room
    /// cells sit at odd coordinates two apart; carving knocks out the wall
    /// cell between a room and its chosen neighbor.
    pub(crate) fn generate(w: usize, h: usize, rng: &mut Rng64) -> Self {
        assert!(w % 2 == 1 && h % 2 == 1, "maze dimensions must be odd");
        assert!(w >= 5 && h >= 5);

        let mut maze = Self {
            w,
            h,
            walls: vec![true; w * h],
        };

        let start = (1usize, 1usize);
        maze.carve(start.0, start.1);

        let mut stack = vec![start];
        while let Some(&(cx, cy)) = stack.last() {
            // unvisited rooms two cells away
            let mut options: [(usize, usize); 4] = [(0, 0); 4];
            let mut n = 0;
            let candidates = [
                (cx as i32, cy as i32 - 2),
                (cx as i32, cy as i32 + 2),
                (cx as i32 - 2, cy as i32),
                (cx as i32 + 2, cy as i32),
            ];
            for (nx, ny) in candidates {
                if nx < 1 || ny < 1 || nx as usize >= w - 1 || ny as usize >= h - 1 {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if maze.is_wall(nx, ny) {
                    options[n] = (nx, ny);
                    n += 1;
                }
            }

            if n == 0 {
                stack.pop();
                continue;
            }

            let (nx, ny) = options[rng.pick(n)];
            maze.carve((cx + nx) / 2, (cy + ny) / 2);
            maze.carve(nx, ny);
            stack.push((nx, ny));
        }

        maze
    }

    /// Floor cells reachable from `start`, in BFS order.
    pub(crate) fn reachable_from(&self, start: (usize, usize)) -> Vec<(usize, usize)> {
        let mut seen = vec![false; self.w * self.h];
        let mut order = Vec::new();
        let mut queue = VecDeque::new();

        if self.is_wall(start.0, start.1) {
            return order;
        }
        seen[start.1 * self.w + start.0] = true;
        queue.push_back(start);

        while let Some((x, y)) = queue.pop_front() {
            order.push((x, y));
            for d in [Dir::Up, Dir::Down, Dir::Left, Dir::Right] {
                let (dx, dy) = d.step();
                let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                if nx < 0 || ny < 0 {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if nx >= self.w || ny >= self.h || self.is_wall(nx, ny) {
                    continue;
                }
                let i = ny * self.w + nx;
                if !seen[i] {
                    seen[i] = true;
                    queue.push_back((nx, ny));
                }
            }
        }

        order
    }
}

fn manhattan(a: (usize, usize), b: (usize, usize)) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

#[derive(Clone, Debug)]
pub(crate) struct Collectible {
    pub(crate) pos: (usize, usize),
    pub(crate) item: Item,
    pub(crate) taken: bool,
}

/// A labyrinth run: generated maze, player, collectibles, exit. Entirely
/// local until the exit posts the collected counts.
#[derive(Clone, Debug)]
pub(crate) struct LabyrinthState {
    pub(crate) maze: Maze,
    pub(crate) player: (usize, usize),
    pub(crate) start: (usize, usize),
    pub(crate) exit: (usize, usize),
    pub(crate) collectibles: Vec<Collectible>,
    pub(crate) finished: bool,
}

impl LabyrinthState {
    pub(crate) fn new(seed: u64) -> Self {
        let mut rng = Rng64::new(seed);
        let maze = Maze::generate(GRID_W, GRID_H, &mut rng);
        let start = (1usize, 1usize);

        let reachable = maze.reachable_from(start);

        // collectibles on random reachable cells, never the start
        let mut pool: Vec<(usize, usize)> =
            reachable.iter().copied().filter(|&c| c != start).collect();
        let mut collectibles = Vec::new();
        let kinds = [Item::Blueberry, Item::Acorn, Item::Blueberry, Item::Acorn];
        for item in kinds.into_iter().take(COLLECTIBLE_COUNT.min(pool.len())) {
            let i = rng.pick(pool.len());
            let pos = pool.swap_remove(i);
            collectibles.push(Collectible {
                pos,
                item,
                taken: false,
            });
        }

        // exit at the reachable cell farthest (Manhattan) from the start,
        // skipping cells already holding a collectible
        let exit = reachable
            .iter()
            .copied()
            .filter(|&c| c != start && !collectibles.iter().any(|col| col.pos == c))
            .max_by_key(|&c| manhattan(start, c))
            .unwrap_or(start);

        Self {
            maze,
            player: start,
            start,
            exit,
            collectibles,
            finished: false,
        }
    }

    pub(crate) fn all_collected(&self) -> bool {
        self.collectibles.iter().all(|c| c.taken)
    }

    pub(crate) fn collected_counts(&self) -> (u32, u32) {
        let mut blueberry = 0;
        let mut acorn = 0;
        for c in self.collectibles.iter().filter(|c| c.taken) {
            match c.item {
                Item::Blueberry => blueberry += 1,
                Item::Acorn => acorn += 1,
            }
        }
        (blueberry, acorn)
    }

    pub(crate) fn remaining_count(&self) -> usize {
        self.collectibles.iter().filter(|c| !c.taken).count()
    }

    /// Walk one cell. Picks up anything on the target cell; stepping onto
    /// the exit only ends the run once every collectible is held.
    pub(crate) fn step(&mut self, dir: Dir) {
        if self.finished {
            return;
        }
        let (dx, dy) = dir.step();
        let (nx, ny) = (self.player.0 as i32 + dx, self.player.1 as i32 + dy);
        if nx < 0 || ny < 0 {
            return;
        }
        let (nx, ny) = (nx as usize, ny as usize);
        if self.maze.is_wall(nx, ny) {
            return;
        }
        self.player = (nx, ny);

        for c in &mut self.collectibles {
            if !c.taken && c.pos == self.player {
                c.taken = true;
            }
        }

        if self.player == self.exit && self.all_collected() {
            self.finished = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maze_is_odd_sized_and_walled_at_border() {
        let mut rng = Rng64::new(7);
        let maze = Maze::generate(GRID_W, GRID_H, &mut rng);
        for x in 0..maze.w {
            assert!(maze.is_wall(x, 0));
            assert!(maze.is_wall(x, maze.h - 1));
        }
        for y in 0..maze.h {
            assert!(maze.is_wall(0, y));
            assert!(maze.is_wall(maze.w - 1, y));
        }
    }

    #[test]
    fn exit_is_reachable_from_start() {
        for seed in [1u64, 42, 0xDEAD_BEEF, 987_654_321] {
            let lab = LabyrinthState::new(seed);
            let reachable = lab.maze.reachable_from(lab.start);
            assert!(
                reachable.contains(&lab.exit),
                "seed {seed}: exit {:?} unreachable",
                lab.exit
            );
        }
    }

    #[test]
    fn places_exactly_four_collectibles_two_of_each() {
        for seed in [3u64, 99, 1_000_003] {
            let lab = LabyrinthState::new(seed);
            assert_eq!(lab.collectibles.len(), COLLECTIBLE_COUNT);
            let blue = lab
                .collectibles
                .iter()
                .filter(|c| c.item == Item::Blueberry)
                .count();
            assert_eq!(blue, 2, "seed {seed}");
            // none share a cell, none sit on start or exit
            for (i, a) in lab.collectibles.iter().enumerate() {
                assert_ne!(a.pos, lab.start);
                assert_ne!(a.pos, lab.exit);
                for b in &lab.collectibles[i + 1..] {
                    assert_ne!(a.pos, b.pos);
                }
            }
        }
    }

    #[test]
    fn exit_maximizes_manhattan_distance_among_candidates() {
        let lab = LabyrinthState::new(5);
        let best = manhattan(lab.start, lab.exit);
        for c in lab
            .maze
            .reachable_from(lab.start)
            .into_iter()
            .filter(|&c| c != lab.start && !lab.collectibles.iter().any(|col| col.pos == c))
        {
            assert!(manhattan(lab.start, c) <= best);
        }
    }

    #[test]
    fn perfect_maze_reaches_every_room_cell() {
        let mut rng = Rng64::new(11);
        let maze = Maze::generate(GRID_W, GRID_H, &mut rng);
        let reachable = maze.reachable_from((1, 1));
        // every odd-coordinate cell is a carved room
        for y in (1..maze.h).step_by(2) {
            for x in (1..maze.w).step_by(2) {
                assert!(!maze.is_wall(x, y), "room ({x},{y}) not carved");
                assert!(reachable.contains(&(x, y)), "room ({x},{y}) not reached");
            }
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let a = LabyrinthState::new(1234);
        let b = LabyrinthState::new(1234);
        assert_eq!(a.exit, b.exit);
        assert_eq!(a.maze.walls, b.maze.walls);
    }

    #[test]
    fn walking_into_walls_stays_put() {
        let mut lab = LabyrinthState::new(8);
        lab.player = lab.start; // (1,1); border sits above and left
        lab.step(Dir::Up);
        assert_eq!(lab.player, lab.start);
        lab.step(Dir::Left);
        assert_eq!(lab.player, lab.start);
    }

    #[test]
    fn exit_requires_all_collectibles() {
        let mut lab = LabyrinthState::new(21);
        // teleport through the run: stand on the exit before collecting
        lab.player = lab.exit;
        lab.step(Dir::Up);
        lab.step(Dir::Down);
        assert!(!lab.finished || lab.all_collected());

        // collect everything, then stepping onto the exit finishes
        for c in &mut lab.collectibles {
            c.taken = true;
        }
        // move the player next to the exit and step in
        let (ex, ey) = lab.exit;
        let neighbor = [
            (ex as i32, ey as i32 - 1, Dir::Down),
            (ex as i32, ey as i32 + 1, Dir::Up),
            (ex as i32 - 1, ey as i32, Dir::Right),
            (ex as i32 + 1, ey as i32, Dir::Left),
        ]
        .into_iter()
        .find(|&(x, y, _)| {
            x >= 0 && y >= 0 && !lab.maze.is_wall(x as usize, y as usize)
        })
        .expect("exit has an open neighbor");
        lab.player = (neighbor.0 as usize, neighbor.1 as usize);
        lab.step(neighbor.2);
        assert!(lab.finished);
        assert_eq!(lab.collected_counts(), (2, 2));
    }
}

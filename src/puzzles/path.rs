//! Shortest single-piece paths for the knight and bishop trainers.
//!
//! A path search is a BFS over a move graph whose edges are the moves a lone
//! piece has on an empty board. The graph is asked from the Move Oracle, the
//! search driver is shared by every piece.

use std::collections::VecDeque;
use std::fmt;

use crate::domain::{MoveOracle, PieceKind, Square};
use crate::puzzles::square_color::random_square;

/// Pieces the path trainers use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathPiece {
    Knight,
    Bishop,
}

impl PathPiece {
    pub fn kind(self) -> PieceKind {
        match self {
            PathPiece::Knight => PieceKind::Knight,
            PathPiece::Bishop => PieceKind::Bishop,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PathPiece::Knight => "knight",
            PathPiece::Bishop => "bishop",
        }
    }
}

/// Neighbour function of a single-piece move graph
pub trait MoveGraph {
    fn neighbours(&self, square: Square) -> Vec<Square>;

    /// Cheap test run before searching; `false` means no path can exist
    fn may_connect(&self, _start: Square, _target: Square) -> bool {
        true
    }
}

/// Knight hops on an empty board
pub struct KnightGraph<'a, O: MoveOracle> {
    oracle: &'a O,
}

impl<'a, O: MoveOracle> KnightGraph<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }
}

impl<O: MoveOracle> MoveGraph for KnightGraph<'_, O> {
    fn neighbours(&self, square: Square) -> Vec<Square> {
        self.oracle.single_piece_destinations(PieceKind::Knight, square)
    }
}

/// Bishop slides on an empty board
pub struct BishopGraph<'a, O: MoveOracle> {
    oracle: &'a O,
}

impl<'a, O: MoveOracle> BishopGraph<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }
}

impl<O: MoveOracle> MoveGraph for BishopGraph<'_, O> {
    fn neighbours(&self, square: Square) -> Vec<Square> {
        self.oracle.single_piece_destinations(PieceKind::Bishop, square)
    }

    /// A bishop never leaves its square colour
    fn may_connect(&self, start: Square, target: Square) -> bool {
        start.shade() == target.shade()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathQuery {
    pub start: Square,
    pub target: Square,
    pub piece: PathPiece,
}

/// Squares from start to target inclusive.
///
/// An unreachable target gives `[start]` with `reachable` false; `[start]`
/// with `reachable` true means start and target are the same square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathResult {
    pub squares: Vec<Square>,
    pub reachable: bool,
}

impl PathResult {
    fn unreachable(start: Square) -> Self {
        Self {
            squares: vec![start],
            reachable: false,
        }
    }

    /// Number of moves along the path (0 when unreachable)
    pub fn moves(&self) -> usize {
        self.squares.len().saturating_sub(1)
    }

    pub fn start(&self) -> Square {
        self.squares[0]
    }
}

impl fmt::Display for PathResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line: Vec<String> = self.squares.iter().map(Square::to_string).collect();
        write!(f, "{}", line.join(" -> "))
    }
}

/// Breadth-first search returning the first path discovered, which is minimal
pub fn shortest_path<G: MoveGraph + ?Sized>(graph: &G, start: Square, target: Square) -> PathResult {
    if start == target {
        return PathResult {
            squares: vec![start],
            reachable: true,
        };
    }
    if !graph.may_connect(start, target) {
        return PathResult::unreachable(start);
    }

    let mut visited = [false; 64];
    visited[start.board_index()] = true;
    let mut queue: VecDeque<(Square, Vec<Square>)> = VecDeque::new();
    queue.push_back((start, vec![start]));

    while let Some((square, path)) = queue.pop_front() {
        for next in graph.neighbours(square) {
            if visited[next.board_index()] {
                continue;
            }
            let mut next_path = path.clone();
            next_path.push(next);
            if next == target {
                return PathResult {
                    squares: next_path,
                    reachable: true,
                };
            }
            visited[next.board_index()] = true;
            queue.push_back((next, next_path));
        }
    }
    PathResult::unreachable(start)
}

/// Path queries against a Move Oracle
pub struct PathSolver<O: MoveOracle> {
    oracle: O,
}

impl<O: MoveOracle> PathSolver<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    pub fn solve(&self, query: &PathQuery) -> PathResult {
        match query.piece {
            PathPiece::Knight => shortest_path(&KnightGraph::new(&self.oracle), query.start, query.target),
            PathPiece::Bishop => shortest_path(&BishopGraph::new(&self.oracle), query.start, query.target),
        }
    }

    /// Whether `piece` alone on the board moves from `from` to `to` in one step
    pub fn is_hop(&self, piece: PathPiece, from: Square, to: Square) -> bool {
        self.oracle
            .single_piece_destinations(piece.kind(), from)
            .contains(&to)
    }
}

/// How a submitted path compares to the optimum
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathGrade {
    Optimal { moves: usize },
    Longer { used: usize, optimal: usize },
    /// Every hop is legal but the target was not reached
    Incomplete,
    IllegalHop { from: Square, to: Square },
}

/// A path puzzle: bring the piece from start to target
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPuzzle {
    pub piece: PathPiece,
    pub start: Square,
    pub target: Square,
    optimal: PathResult,
}

impl PathPuzzle {
    pub fn new<O: MoveOracle>(solver: &PathSolver<O>, query: PathQuery) -> Self {
        let optimal = solver.solve(&query);
        Self {
            piece: query.piece,
            start: query.start,
            target: query.target,
            optimal,
        }
    }

    /// Random distinct start and target; bishop targets share the start's colour
    pub fn random<O: MoveOracle>(solver: &PathSolver<O>, piece: PathPiece, rng: &mut fastrand::Rng) -> Self {
        let start = random_square(rng, None);
        let target = loop {
            match Square::from_board_index(rng.usize(..64)) {
                Some(square) if square == start => continue,
                Some(square) if piece == PathPiece::Bishop && square.shade() != start.shade() => continue,
                Some(square) => break square,
                None => continue,
            }
        };
        Self::new(solver, PathQuery { start, target, piece })
    }

    /// The minimal path, hidden until the user asks for it
    pub fn optimal(&self) -> &PathResult {
        &self.optimal
    }

    /// Grade the squares a user visited after the start
    pub fn check_path<O: MoveOracle>(&self, solver: &PathSolver<O>, hops: &[Square]) -> PathGrade {
        let mut from = self.start;
        for &to in hops {
            if !solver.is_hop(self.piece, from, to) {
                return PathGrade::IllegalHop { from, to };
            }
            from = to;
        }
        if from != self.target || hops.is_empty() {
            return PathGrade::Incomplete;
        }
        let optimal = self.optimal.moves();
        if hops.len() <= optimal {
            PathGrade::Optimal { moves: hops.len() }
        } else {
            PathGrade::Longer {
                used: hops.len(),
                optimal,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShakmatyOracle;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn solver() -> PathSolver<ShakmatyOracle> {
        PathSolver::new(ShakmatyOracle::new())
    }

    fn solve(piece: PathPiece, start: &str, target: &str) -> PathResult {
        solver().solve(&PathQuery {
            start: sq(start),
            target: sq(target),
            piece,
        })
    }

    /// Knight distances by plain BFS over coordinate deltas
    fn reference_knight_distances(start: Square) -> [usize; 64] {
        const DELTAS: [(i8, i8); 8] = [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
        let mut dist = [usize::MAX; 64];
        dist[start.board_index()] = 0;
        let mut queue = VecDeque::from([start]);
        while let Some(square) = queue.pop_front() {
            for (df, dr) in DELTAS {
                let file = square.file() as i8 + df;
                let rank = square.rank() as i8 + dr;
                if !(0..8).contains(&file) || !(0..8).contains(&rank) {
                    continue;
                }
                let Some(next) = Square::new(file as u8, rank as u8) else {
                    continue;
                };
                if dist[next.board_index()] == usize::MAX {
                    dist[next.board_index()] = dist[square.board_index()] + 1;
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    fn is_knight_step(a: Square, b: Square) -> bool {
        let df = (a.file() as i8 - b.file() as i8).abs();
        let dr = (a.rank() as i8 - b.rank() as i8).abs();
        (df == 1 && dr == 2) || (df == 2 && dr == 1)
    }

    #[test]
    fn test_knight_one_hop() {
        let result = solve(PathPiece::Knight, "a1", "b3");
        assert_eq!(result.squares, vec![sq("a1"), sq("b3")]);
        assert!(result.reachable);
    }

    #[test]
    fn test_bishop_long_diagonal() {
        let result = solve(PathPiece::Bishop, "a1", "h8");
        assert_eq!(result.squares, vec![sq("a1"), sq("h8")]);
    }

    #[test]
    fn test_bishop_other_colour_unreachable() {
        let result = solve(PathPiece::Bishop, "a1", "b1");
        assert_eq!(result.squares, vec![sq("a1")]);
        assert!(!result.reachable);
        assert_eq!(result.moves(), 0);
    }

    #[test]
    fn test_same_square() {
        let result = solve(PathPiece::Knight, "e4", "e4");
        assert_eq!(result.squares, vec![sq("e4")]);
        assert!(result.reachable);
    }

    #[test]
    fn test_knight_matches_reference_for_all_pairs() {
        let solver = solver();
        for start in Square::all() {
            let dist = reference_knight_distances(start);
            for target in Square::all() {
                let result = solver.solve(&PathQuery {
                    start,
                    target,
                    piece: PathPiece::Knight,
                });
                assert!(result.reachable);
                assert_eq!(result.moves(), dist[target.board_index()], "{} -> {}", start, target);
                assert_eq!(result.squares.first(), Some(&start));
                assert_eq!(result.squares.last(), Some(&target));
                assert!(result.squares.windows(2).all(|w| is_knight_step(w[0], w[1])));
            }
        }
    }

    #[test]
    fn test_bishop_pairs() {
        let solver = solver();
        for start in Square::all() {
            for target in Square::all() {
                let result = solver.solve(&PathQuery {
                    start,
                    target,
                    piece: PathPiece::Bishop,
                });
                if start.shade() == target.shade() {
                    assert!(result.reachable);
                    assert!(result.moves() <= 2, "{} -> {}", start, target);
                    assert_eq!(result.squares.last(), Some(&target));
                } else {
                    assert!(!result.reachable);
                    assert_eq!(result.squares, vec![start]);
                }
            }
        }
    }

    #[test]
    fn test_knight_corner_to_corner() {
        let result = solve(PathPiece::Knight, "a1", "h8");
        assert_eq!(result.moves(), 6);
        assert_eq!(result.to_string().matches(" -> ").count(), 6);
    }

    #[test]
    fn test_random_puzzle_constraints() {
        let solver = solver();
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..50 {
            let puzzle = PathPuzzle::random(&solver, PathPiece::Bishop, &mut rng);
            assert_ne!(puzzle.start, puzzle.target);
            assert_eq!(puzzle.start.shade(), puzzle.target.shade());
            assert!(puzzle.optimal().reachable);

            let puzzle = PathPuzzle::random(&solver, PathPiece::Knight, &mut rng);
            assert_ne!(puzzle.start, puzzle.target);
            assert!(puzzle.optimal().moves() >= 1);
        }
    }

    #[test]
    fn test_check_path_grades() {
        let solver = solver();
        let query = PathQuery {
            start: sq("a1"),
            target: sq("c2"),
            piece: PathPiece::Knight,
        };
        let puzzle = PathPuzzle::new(&solver, query);
        assert_eq!(puzzle.optimal().moves(), 1);

        assert_eq!(
            puzzle.check_path(&solver, &[sq("c2")]),
            PathGrade::Optimal { moves: 1 }
        );
        assert_eq!(
            puzzle.check_path(&solver, &[sq("b3"), sq("d4"), sq("c2")]),
            PathGrade::Longer { used: 3, optimal: 1 }
        );
        assert_eq!(
            puzzle.check_path(&solver, &[sq("b3")]),
            PathGrade::Incomplete
        );
        assert_eq!(puzzle.check_path(&solver, &[]), PathGrade::Incomplete);
        assert_eq!(
            puzzle.check_path(&solver, &[sq("b3"), sq("b4")]),
            PathGrade::IllegalHop {
                from: sq("b3"),
                to: sq("b4")
            }
        );
    }
}

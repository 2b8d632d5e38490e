use std::{fmt, str::FromStr};

use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

use crate::env::{Action, Environment};

/// `(row, col)` coordinates, with `(0, 0)` in the top-left corner
pub type Pos = (usize, usize);

pub const GOAL_REWARD: f32 = 100.0;
pub const HAZARD_REWARD: f32 = -100.0;
pub const STEP_REWARD: f32 = -1.0;

/// The kind of a single grid cell
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Wall,
    /// The cheese
    Goal,
    /// A cat
    Hazard,
}

impl Cell {
    /// Reward for entering a cell of this kind
    pub fn reward(self) -> f32 {
        match self {
            Cell::Goal => GOAL_REWARD,
            Cell::Hazard => HAZARD_REWARD,
            Cell::Empty | Cell::Wall => STEP_REWARD,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Cell::Goal | Cell::Hazard)
    }

    /// Character used in ASCII layouts
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Wall => '#',
            Cell::Goal => 'C',
            Cell::Hazard => 'X',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Cell::Empty),
            '#' => Some(Cell::Wall),
            'C' => Some(Cell::Goal),
            'X' => Some(Cell::Hazard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("a grid needs at least two cells, got {rows}x{cols}")]
    Dimensions { rows: usize, cols: usize },
    #[error("cannot place {requested} hazards on {available} free cells")]
    TooManyHazards { requested: usize, available: usize },
    #[error("layout is empty")]
    EmptyLayout,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell symbol {symbol:?} at ({row}, {col})")]
    UnknownSymbol { symbol: char, row: usize, col: usize },
    #[error("layout must contain exactly one goal, found {0}")]
    GoalCount(usize),
    #[error("start cell must be empty, found {0:?}")]
    InvalidStart(Cell),
}

/// A rectangular gridworld
///
/// A grid never changes once built. Resetting a game replaces the whole grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    goal: Pos,
}

impl Grid {
    /// An obstacle-free grid with the goal in the bottom-right corner
    pub fn empty(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows.saturating_mul(cols) < 2 {
            return Err(GridError::Dimensions { rows, cols });
        }
        let goal = (rows - 1, cols - 1);
        let mut cells = vec![Cell::Empty; rows * cols];
        cells[goal.0 * cols + goal.1] = Cell::Goal;
        Ok(Self {
            rows,
            cols,
            cells,
            goal,
        })
    }

    /// An [`empty`](Self::empty) grid with `hazards` cats placed uniformly at random
    ///
    /// Cats never land on the start cell or the goal.
    pub fn generate<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        hazards: usize,
        rng: &mut R,
    ) -> Result<Self, GridError> {
        let mut grid = Self::empty(rows, cols)?;
        let start = grid.start_pos();
        let candidates = grid
            .positions()
            .filter(|&pos| pos != start && grid.cell(pos) == Cell::Empty)
            .collect::<Vec<_>>();

        if hazards > candidates.len() {
            return Err(GridError::TooManyHazards {
                requested: hazards,
                available: candidates.len(),
            });
        }

        for &pos in candidates.choose_multiple(rng, hazards) {
            let ix = grid.index(pos);
            grid.cells[ix] = Cell::Hazard;
        }

        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start_pos(&self) -> Pos {
        (0, 0)
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    /// Kind of the cell at `pos`
    ///
    /// **Panics** if `pos` is out of bounds
    pub fn cell(&self, pos: Pos) -> Cell {
        self.cells[self.index(pos)]
    }

    pub fn get(&self, pos: Pos) -> Option<Cell> {
        self.in_bounds(pos).then(|| self.cell(pos))
    }

    pub fn in_bounds(&self, (row, col): Pos) -> bool {
        row < self.rows && col < self.cols
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    pub fn hazards(&self) -> impl Iterator<Item = Pos> + '_ {
        self.positions().filter(|&pos| self.cell(pos) == Cell::Hazard)
    }

    /// The in-bounds cell adjacent to `pos` in the direction of `action`, walls included
    pub fn neighbor(&self, (row, col): Pos, action: Action) -> Option<Pos> {
        let (dr, dc) = action.offset();
        let next = (row.checked_add_signed(dr)?, col.checked_add_signed(dc)?);
        self.in_bounds(next).then_some(next)
    }

    fn index(&self, (row, col): Pos) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "position ({row}, {col}) outside {}x{} grid",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }
}

impl Environment for Grid {
    type State = Pos;

    fn start(&self) -> Pos {
        self.start_pos()
    }

    fn states(&self) -> Vec<Pos> {
        self.positions()
            .filter(|&pos| self.cell(pos) != Cell::Wall)
            .collect()
    }

    fn reward(&self, state: Pos) -> f32 {
        self.cell(state).reward()
    }

    fn attempt_move(&self, state: Pos, action: Action) -> Pos {
        self.neighbor(state, action)
            .filter(|&next| self.cell(next) != Cell::Wall)
            .unwrap_or(state)
    }

    fn is_terminal(&self, state: Pos) -> bool {
        self.cell(state).is_terminal()
    }

    fn is_goal(&self, state: Pos) -> bool {
        self.cell(state) == Cell::Goal
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Parse an ASCII layout: `.` empty, `#` wall, `C` cheese, `X` cat
    ///
    /// Blank lines and surrounding whitespace are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();

        let Some(first) = lines.first() else {
            return Err(GridError::EmptyLayout);
        };
        let cols = first.chars().count();
        let rows = lines.len();

        let mut cells = Vec::with_capacity(rows * cols);
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(GridError::Ragged {
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let cell = Cell::from_symbol(symbol)
                    .ok_or(GridError::UnknownSymbol { symbol, row, col })?;
                cells.push(cell);
            }
        }

        if rows * cols < 2 {
            return Err(GridError::Dimensions { rows, cols });
        }

        let goals = cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == Cell::Goal)
            .map(|(i, _)| (i / cols, i % cols))
            .collect::<Vec<_>>();
        let &[goal] = goals.as_slice() else {
            return Err(GridError::GoalCount(goals.len()));
        };

        if cells[0] != Cell::Empty {
            return Err(GridError::InvalidStart(cells[0]));
        }

        Ok(Self {
            rows,
            cols,
            cells,
            goal,
        })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line = row.iter().map(|c| c.symbol()).collect::<String>();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

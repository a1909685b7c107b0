//! Drawn-numbers board
//!
//! One cell per value in the fixed 1..=75 universe. The board is rebuilt from
//! the drawn list on every update.

use super::constants::{BOARD_SIZE, MAX_NUMBER, MIN_NUMBER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Drawn,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCell {
    pub value: i32,
    pub state: CellState,
}

impl BoardCell {
    pub fn is_drawn(&self) -> bool {
        self.state == CellState::Drawn
    }
}

/// Whether `value` belongs to the drawable range
pub fn is_valid_number(value: i32) -> bool {
    (MIN_NUMBER..=MAX_NUMBER).contains(&value)
}

/// Build all cells, marking those present in `drawn`
pub fn build_board(drawn: &[i32]) -> Vec<BoardCell> {
    let mut marks = [false; BOARD_SIZE];
    for &value in drawn.iter().filter(|v| is_valid_number(**v)) {
        marks[(value - MIN_NUMBER) as usize] = true;
    }

    (MIN_NUMBER..=MAX_NUMBER)
        .zip(marks)
        .map(|(value, drawn)| BoardCell {
            value,
            state: if drawn {
                CellState::Drawn
            } else {
                CellState::Pending
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_has_every_value_once() {
        let board = build_board(&[]);
        assert_eq!(board.len(), 75);
        let values: Vec<i32> = board.iter().map(|c| c.value).collect();
        assert_eq!(values, (1..=75).collect::<Vec<_>>());
        assert!(board.iter().all(|c| !c.is_drawn()));
    }

    #[test]
    fn test_board_marks_drawn_values() {
        let board = build_board(&[5, 12]);
        for cell in &board {
            assert_eq!(cell.is_drawn(), cell.value == 5 || cell.value == 12);
        }
    }

    #[test]
    fn test_board_ignores_out_of_range() {
        let board = build_board(&[0, 76, -3, 75]);
        assert_eq!(board.len(), 75);
        assert_eq!(board.iter().filter(|c| c.is_drawn()).count(), 1);
        assert!(board[74].is_drawn());
    }

    #[test]
    fn test_board_rebuild_is_idempotent() {
        let drawn = [75, 1, 40];
        assert_eq!(build_board(&drawn), build_board(&drawn));
    }
}

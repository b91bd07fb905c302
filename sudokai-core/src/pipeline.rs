//! The solve request/response pipeline: serialize the puzzle into a prompt,
//! issue exactly one chat-completion call, and turn the reply into a
//! validated [`SolveResult`] or a classified [`SolveError`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::board::Board;
use crate::client::ChatClient;
use crate::error::SolveError;

/// Framing for the remote assistant.
pub const SYSTEM_PROMPT: &str = "You are an expert Sudoku solver assistant that provides clear, step-by-step solutions and helpful tips.";

/// Structured outcome of a successful solve call. Discarded by the caller
/// whenever the input grid changes or a new solve is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveResult {
    /// Fully solved grid, 9 rows of digits 1..=9 (no empty cells).
    pub solved_grid: [[u8; 9]; 9],
    pub steps: Vec<String>,
    pub tips: Vec<String>,
    pub explanation: String,
}

/// Build the user instruction for one puzzle.
pub fn build_prompt(board: &Board) -> String {
    format!(
        r#"You are an expert Sudoku solver. I will provide you with a Sudoku puzzle where empty cells are represented by 0 and filled cells contain numbers 1-9.

Here's the puzzle:
{grid}

Please solve this Sudoku puzzle and provide:

1. The complete solved grid
2. A step-by-step explanation of how you solved it (maximum 5-7 key steps)
3. 3-4 practical tips and tricks that a beginner can use to solve similar puzzles
4. A detailed explanation of the main solving techniques used

Format your response as a JSON object with this structure:
{{
  "solved": true/false,
  "solvedGrid": [9x9 array of numbers],
  "steps": ["step1", "step2", ...],
  "tips": ["tip1", "tip2", ...],
  "explanation": "detailed explanation of techniques used"
}}

Make sure the explanation is easy to understand for someone learning Sudoku. Focus on practical techniques like:
- Looking for naked singles (cells with only one possible number)
- Hidden singles (numbers that can only go in one cell in a row/column/box)
- Elimination techniques
- Box/line reduction
- Pattern recognition

Keep the language simple and encouraging, as this is for someone who enjoys solving puzzles manually."#,
        grid = board.to_digit_block()
    )
}

/// Solve `board` through the given chat client.
///
/// Issues exactly one outbound call; mutates nothing beyond the return
/// value. Transport failures are reclassified by message text, reply
/// payloads are parsed and validated against the solved-grid invariant.
pub fn solve(client: &dyn ChatClient, board: &Board) -> Result<SolveResult, SolveError> {
    let prompt = build_prompt(board);
    log::debug!("requesting solve for puzzle {}", board.to_text());

    let reply = client
        .complete(SYSTEM_PROMPT, &prompt)
        .map_err(|e| SolveError::classify(&e.to_string()))?;

    let result = parse_reply(&reply)?;
    log::info!(
        "solve succeeded ({} steps, {} tips)",
        result.steps.len(),
        result.tips.len()
    );
    Ok(result)
}

fn parse_reply(text: &str) -> Result<SolveResult, SolveError> {
    let reply: Value =
        serde_json::from_str(text).map_err(|e| SolveError::ResponseFormat(e.to_string()))?;

    // An unsolved report wins over any structural problem in the rest of
    // the payload.
    if !reply["solved"].as_bool().unwrap_or(false) {
        return Err(SolveError::Unsolvable);
    }

    let solved_grid = parse_solved_grid(&reply["solvedGrid"])
        .ok_or_else(|| SolveError::ResponseFormat("invalid solved grid format".into()))?;

    Ok(SolveResult {
        solved_grid,
        steps: string_list(&reply["steps"]),
        tips: string_list(&reply["tips"]),
        explanation: reply["explanation"].as_str().unwrap_or_default().to_string(),
    })
}

fn parse_solved_grid(value: &Value) -> Option<[[u8; 9]; 9]> {
    let rows: Vec<Vec<u8>> = serde_json::from_value(value.clone()).ok()?;
    if !crate::board::validate_grid(&rows) {
        return None;
    }
    let mut grid = [[0u8; 9]; 9];
    for (r, row) in rows.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            // A solved grid has no empty cells
            if v == 0 {
                return None;
            }
            grid[r][c] = v;
        }
    }
    Some(grid)
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(|s| s.as_str().map(String::from)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_the_digit_block_and_reply_contract() {
        let board = Board::parse(
            "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79",
        )
        .unwrap();
        let prompt = build_prompt(&board);
        assert!(prompt.contains("530070000"));
        assert!(prompt.contains("\"solvedGrid\""));
        assert!(prompt.contains("JSON object"));
    }

    #[test]
    fn steps_and_tips_keep_their_order() {
        let grid = [[1u8; 9]; 9];
        let reply = serde_json::json!({
            "solved": true,
            "solvedGrid": grid,
            "steps": ["first", "second", "third"],
            "tips": ["a", "b"],
            "explanation": "x"
        });
        // All-ones is not a real solution but is structurally a 9x9 digit
        // grid, which is all parse_reply checks.
        let result = parse_reply(&reply.to_string()).unwrap();
        assert_eq!(result.steps, vec!["first", "second", "third"]);
        assert_eq!(result.tips, vec!["a", "b"]);
    }

    #[test]
    fn zero_cell_in_solved_grid_is_rejected() {
        let mut grid = [[5u8; 9]; 9];
        grid[4][4] = 0;
        let reply = serde_json::json!({ "solved": true, "solvedGrid": grid });
        assert!(matches!(
            parse_reply(&reply.to_string()),
            Err(SolveError::ResponseFormat(_))
        ));
    }
}

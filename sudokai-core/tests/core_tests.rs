use pretty_assertions::assert_eq;
use sudokai_core::{
    board::{validate_grid, Board},
    client::{ChatClient, ChatError},
    error::SolveError,
    pipeline::solve,
};

fn easy_puzzle() -> &'static str {
    // Known easy puzzle; dots for blanks
    "53..7....\n6..195...\n.98....6.\n8...6...3\n4..8.3..1\n7...2...6\n.6....28.\n...419..5\n....8..79"
}

fn solved_rows() -> [[u8; 9]; 9] {
    // Unique solution of easy_puzzle
    [
        [5, 3, 4, 6, 7, 8, 9, 1, 2],
        [6, 7, 2, 1, 9, 5, 3, 4, 8],
        [1, 9, 8, 3, 4, 2, 5, 6, 7],
        [8, 5, 9, 7, 6, 1, 4, 2, 3],
        [4, 2, 6, 8, 5, 3, 7, 9, 1],
        [7, 1, 3, 9, 2, 4, 8, 5, 6],
        [9, 6, 1, 5, 3, 7, 2, 8, 4],
        [2, 8, 7, 4, 1, 9, 6, 3, 5],
        [3, 4, 5, 2, 8, 6, 1, 7, 9],
    ]
}

/// Replies with a fixed payload, never touching the network.
struct ScriptedClient {
    reply: String,
}

impl ScriptedClient {
    fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl ChatClient for ScriptedClient {
    fn complete(&self, _system: &str, _user: &str) -> Result<String, ChatError> {
        Ok(self.reply.clone())
    }
}

/// Fails every request with the given transport error.
struct FailingClient {
    make: fn() -> ChatError,
}

impl ChatClient for FailingClient {
    fn complete(&self, _system: &str, _user: &str) -> Result<String, ChatError> {
        Err((self.make)())
    }
}

#[test]
fn parse_and_validity() {
    let b = Board::parse(easy_puzzle()).expect("parse");
    assert!(b.is_valid(), "initial board should be valid");
    assert!(!b.is_empty());
}

#[test]
fn parse_rejects_short_input() {
    assert!(Board::parse("53..7....").is_err());
}

#[test]
fn validate_grid_checks_shape_and_range() {
    let ok: Vec<Vec<u8>> = vec![vec![0; 9]; 9];
    assert!(validate_grid(&ok));

    let mixed: Vec<Vec<u8>> = (0..9).map(|r| vec![(r % 9) as u8 + 1; 9]).collect();
    assert!(validate_grid(&mixed));

    let short_rows: Vec<Vec<u8>> = vec![vec![0; 9]; 8];
    assert!(!validate_grid(&short_rows));

    let mut short_cols: Vec<Vec<u8>> = vec![vec![0; 9]; 9];
    short_cols[3] = vec![0; 8];
    assert!(!validate_grid(&short_cols));

    let mut out_of_range: Vec<Vec<u8>> = vec![vec![0; 9]; 9];
    out_of_range[0][0] = 10;
    assert!(!validate_grid(&out_of_range));
}

#[test]
fn solve_returns_the_echoed_grid() {
    let board = Board::from_rows(solved_rows());
    let reply = serde_json::json!({
        "solved": true,
        "solvedGrid": solved_rows(),
        "steps": [],
        "tips": [],
        "explanation": ""
    });
    let client = ScriptedClient::new(reply.to_string());

    let result = solve(&client, &board).expect("solve");
    assert_eq!(result.solved_grid, solved_rows());
    assert!(result.steps.is_empty());
    assert!(result.tips.is_empty());
    assert_eq!(result.explanation, "");
}

#[test]
fn missing_optional_fields_default_to_empty() {
    let board = Board::parse(easy_puzzle()).unwrap();
    let reply = serde_json::json!({ "solved": true, "solvedGrid": solved_rows() });
    let client = ScriptedClient::new(reply.to_string());

    let result = solve(&client, &board).expect("solve");
    assert!(result.steps.is_empty());
    assert!(result.tips.is_empty());
    assert_eq!(result.explanation, "");
}

#[test]
fn unsolved_reply_fails_regardless_of_other_fields() {
    let board = Board::parse(easy_puzzle()).unwrap();
    let reply = serde_json::json!({
        "solved": false,
        "solvedGrid": "garbage",
        "steps": 42
    });
    let client = ScriptedClient::new(reply.to_string());

    assert_eq!(solve(&client, &board), Err(SolveError::Unsolvable));
}

#[test]
fn non_json_reply_is_a_format_error() {
    let board = Board::parse(easy_puzzle()).unwrap();
    let client = ScriptedClient::new("I solved it! The first row is 5,3,4,...");

    assert!(matches!(
        solve(&client, &board),
        Err(SolveError::ResponseFormat(_))
    ));
}

#[test]
fn short_solved_grid_is_a_format_error() {
    let board = Board::parse(easy_puzzle()).unwrap();
    let eight_rows: Vec<[u8; 9]> = solved_rows()[..8].to_vec();
    let reply = serde_json::json!({ "solved": true, "solvedGrid": eight_rows });
    let client = ScriptedClient::new(reply.to_string());

    assert!(matches!(
        solve(&client, &board),
        Err(SolveError::ResponseFormat(_))
    ));
}

#[test]
fn transport_failures_are_reclassified() {
    let board = Board::parse(easy_puzzle()).unwrap();

    let auth = FailingClient {
        make: || ChatError::Http(401, "Incorrect API key provided: sk-***".into()),
    };
    assert_eq!(solve(&auth, &board), Err(SolveError::Auth));

    let throttled = FailingClient {
        make: || ChatError::Http(429, "Rate limit reached for requests".into()),
    };
    assert_eq!(solve(&throttled, &board), Err(SolveError::RateLimit));

    let other = FailingClient {
        make: || ChatError::Network("connection reset by peer".into()),
    };
    match solve(&other, &board) {
        Err(SolveError::Unknown(msg)) => assert!(msg.contains("connection reset by peer")),
        other => panic!("expected Unknown, got {other:?}"),
    }
}

#[test]
fn solve_is_idempotent_against_a_deterministic_endpoint() {
    let board = Board::parse(easy_puzzle()).unwrap();
    let reply = serde_json::json!({
        "solved": true,
        "solvedGrid": solved_rows(),
        "steps": ["Scan row 1 for naked singles", "Fill the top-left box"],
        "tips": ["Start with the most constrained cells"],
        "explanation": "Mostly naked and hidden singles."
    });
    let client = ScriptedClient::new(reply.to_string());

    let first = solve(&client, &board).expect("first solve");
    let second = solve(&client, &board).expect("second solve");
    assert_eq!(first, second);
}

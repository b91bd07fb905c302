use std::fs;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::{egui, App, Frame, NativeOptions};
use sudokai_core::{
    auth::{FileKeyStore, KeyStore},
    board::Board,
    client::OpenAiClient,
    error::SolveError,
    pipeline::{solve, SolveResult},
};

/// Lifecycle of the single outstanding solve request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolvePhase {
    Idle,
    Solving,
    Done,
    Failed,
}

struct SudokaiApp {
    board: Board,
    sel: (usize, usize),
    phase: SolvePhase,
    solution: Option<SolveResult>,
    error: String,
    status: String,
    api_key: String,
    key_input: String,
    show_key_dialog: bool,
    keystore: Option<FileKeyStore>,
    pending: Option<Receiver<Result<SolveResult, SolveError>>>,
}

impl Default for SudokaiApp {
    fn default() -> Self {
        let keystore = match FileKeyStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                log::warn!("credential store unavailable: {e}");
                None
            }
        };
        let api_key = keystore.as_ref().and_then(|s| s.load()).unwrap_or_default();
        Self {
            board: Board::empty(),
            sel: (0, 0),
            phase: SolvePhase::Idle,
            solution: None,
            error: String::new(),
            status: String::new(),
            api_key,
            key_input: String::new(),
            show_key_dialog: false,
            keystore,
            pending: None,
        }
    }
}

impl SudokaiApp {
    /// Any edit or clear invalidates the previous outcome: back to Idle,
    /// result and error discarded, an in-flight reply dropped unread.
    fn reset_outcome(&mut self) {
        self.phase = SolvePhase::Idle;
        self.solution = None;
        self.error.clear();
        self.status.clear();
        self.pending = None;
    }

    fn start_solve(&mut self) {
        if self.api_key.trim().is_empty() {
            self.key_input = self.api_key.clone();
            self.show_key_dialog = true;
            return;
        }
        if !self.board.is_valid() {
            self.error = "The grid has conflicting entries. Fix the highlighted cells first.".into();
            self.phase = SolvePhase::Failed;
            return;
        }

        let (tx, rx) = mpsc::channel();
        let board = self.board.clone();
        let api_key = self.api_key.clone();
        thread::spawn(move || {
            let client = OpenAiClient::new(api_key);
            // The receiver may be gone if the user edited mid-flight
            let _ = tx.send(solve(&client, &board));
        });

        self.pending = Some(rx);
        self.phase = SolvePhase::Solving;
        self.solution = None;
        self.error.clear();
        self.status = "Solving…".into();
    }

    fn poll_pending(&mut self, ctx: &egui::Context) {
        let Some(rx) = self.pending.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(result)) => {
                self.solution = Some(result);
                self.phase = SolvePhase::Done;
                self.status = "Puzzle solved".into();
            }
            Ok(Err(err)) => {
                self.error = err.to_string();
                self.phase = SolvePhase::Failed;
                self.status.clear();
            }
            Err(TryRecvError::Empty) => {
                self.pending = Some(rx);
                ctx.request_repaint_after(Duration::from_millis(100));
            }
            Err(TryRecvError::Disconnected) => {
                self.error = "The solve request was interrupted".into();
                self.phase = SolvePhase::Failed;
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            ui.heading("Sudokai");
            ui.separator();

            let solving = self.phase == SolvePhase::Solving;
            let label = if solving { "Solving…" } else { "Solve Puzzle" };
            let solve_btn = egui::Button::new(egui::RichText::new(label).strong());
            if ui
                .add_enabled(!solving && !self.board.is_empty(), solve_btn)
                .on_hover_text("Send the puzzle to the AI for a solution, steps, and tips")
                .clicked()
            {
                self.start_solve();
            }
            ui.separator();

            if ui
                .button(egui::RichText::new("Clear").strong())
                .on_hover_text("Set all cells to empty")
                .clicked()
            {
                self.board = Board::empty();
                self.sel = (0, 0);
                self.reset_outcome();
                self.status = "Cleared board".into();
            }
            ui.separator();

            if ui
                .button(egui::RichText::new("API Key…").strong())
                .on_hover_text("Configure the OpenAI API key used for solving")
                .clicked()
            {
                self.key_input = self.api_key.clone();
                self.show_key_dialog = true;
            }
            ui.separator();

            if ui
                .button(egui::RichText::new("Open Puzzle…").strong())
                .on_hover_text("Open a .sdk or .txt with 81 characters (0/.) as blanks")
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Sudoku", &["sdk", "txt"])
                    .pick_file()
                {
                    match fs::read_to_string(&path) {
                        Ok(raw) => match Board::parse(&raw) {
                            Ok(b) => {
                                self.board = b;
                                self.sel = (0, 0);
                                self.reset_outcome();
                                self.status = format!("Loaded puzzle: {}", display_filename(&path));
                            }
                            Err(e) => self.status = format!("Failed to parse puzzle: {}", e),
                        },
                        Err(e) => self.status = format!("Failed to read file: {}", e),
                    }
                }
            }
            ui.separator();

            if ui
                .button(egui::RichText::new("Save Puzzle…").strong())
                .on_hover_text("Save the entered grid as an 81-char .sdk")
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Sudoku", &["sdk", "txt"])
                    .set_file_name("puzzle.sdk")
                    .save_file()
                {
                    match fs::write(&path, self.board.to_text()) {
                        Ok(()) => self.status = format!("Saved puzzle: {}", display_filename(&path)),
                        Err(e) => self.status = format!("Failed to save puzzle: {}", e),
                    }
                }
            }
        });
        ui.add_space(6.0);
    }

    fn handle_digit_entry(&mut self, ui: &egui::Ui) {
        // Keystrokes belong to the dialog while it is open
        if self.show_key_dialog {
            return;
        }
        let mut entered: Option<u8> = None;
        let mut cleared = false;
        ui.input(|i| {
            for ev in &i.events {
                if let egui::Event::Text(t) = ev {
                    for ch in t.chars() {
                        match ch {
                            '1'..='9' => entered = Some(ch as u8 - b'0'),
                            '0' | '.' => cleared = true,
                            _ => {}
                        }
                    }
                }
            }
            if i.key_pressed(egui::Key::Backspace) || i.key_pressed(egui::Key::Delete) {
                cleared = true;
            }
        });

        let (r, c) = self.sel;
        if let Some(v) = entered {
            if self.board.cells[r][c] != v {
                self.board.cells[r][c] = v;
                self.reset_outcome();
            }
        } else if cleared && self.board.cells[r][c] != 0 {
            self.board.cells[r][c] = 0;
            self.reset_outcome();
        }
    }

    fn solution_panel(&self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        match self.phase {
            SolvePhase::Idle => {
                ui.heading("AI Sudoku Solver");
                ui.label("Enter your puzzle and let the AI solve it with detailed explanations.");
                ui.add_space(6.0);
                ui.label(
                    egui::RichText::new(
                        "Click a cell and type 1-9 to fill it, 0 or Backspace to clear it.",
                    )
                    .weak(),
                );
            }
            SolvePhase::Solving => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Solving your puzzle…");
                });
                ui.add_space(4.0);
                ui.label(egui::RichText::new("This usually takes a few seconds.").weak());
            }
            SolvePhase::Failed => {
                ui.heading("Solve failed");
                ui.add_space(4.0);
                ui.colored_label(egui::Color32::LIGHT_RED, &self.error);
            }
            SolvePhase::Done => {
                let Some(solution) = &self.solution else {
                    return;
                };
                ui.heading(egui::RichText::new("Puzzle Solved!").color(egui::Color32::LIGHT_GREEN));
                ui.label("Cells you left empty show the AI's digits in green.");
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if !solution.steps.is_empty() {
                        ui.add_space(8.0);
                        ui.strong("Solution Steps");
                        for (i, step) in solution.steps.iter().enumerate() {
                            ui.label(format!("{}. {}", i + 1, step));
                        }
                    }
                    if !solution.tips.is_empty() {
                        ui.add_space(8.0);
                        ui.strong("Tips & Tricks");
                        for tip in &solution.tips {
                            ui.label(format!("• {}", tip));
                        }
                    }
                    if !solution.explanation.is_empty() {
                        ui.add_space(8.0);
                        ui.strong("Detailed Explanation");
                        for paragraph in solution
                            .explanation
                            .split('\n')
                            .filter(|p| !p.trim().is_empty())
                        {
                            ui.label(paragraph);
                            ui.add_space(4.0);
                        }
                    }
                });
            }
        }
    }

    fn key_dialog(&mut self, ctx: &egui::Context) {
        if !self.show_key_dialog {
            return;
        }
        let mut open = true;
        egui::Window::new("OpenAI API Key")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label("The key is stored locally and only ever sent to the OpenAI API.");
                ui.hyperlink_to("Get an API key", "https://platform.openai.com/api-keys");
                ui.add_space(6.0);
                ui.add(
                    egui::TextEdit::singleline(&mut self.key_input)
                        .password(true)
                        .hint_text("sk-…")
                        .desired_width(280.0),
                );
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        let key = self.key_input.trim().to_string();
                        if key.is_empty() {
                            self.status = "API key cannot be empty".into();
                        } else {
                            match &self.keystore {
                                Some(store) => match store.save(&key) {
                                    Ok(()) => self.status = "API key saved".into(),
                                    Err(e) => {
                                        log::warn!("failed to persist API key: {e}");
                                        self.status = e;
                                    }
                                },
                                None => {
                                    self.status =
                                        "No config directory; key kept for this session only"
                                            .into()
                                }
                            }
                            self.api_key = key;
                            self.show_key_dialog = false;
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        self.show_key_dialog = false;
                    }
                    if ui.button("Forget stored key").clicked() {
                        if let Some(store) = &self.keystore {
                            if let Err(e) = store.delete() {
                                log::warn!("failed to delete stored key: {e}");
                            }
                        }
                        self.api_key.clear();
                        self.key_input.clear();
                        self.status = "Stored API key removed".into();
                    }
                });
            });
        if !open {
            self.show_key_dialog = false;
        }
    }
}

impl App for SudokaiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_pending(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            // Square cells read better than rounded ones
            let mut style = (*ui.ctx().style()).clone();
            style.visuals.widgets.inactive.rounding = egui::Rounding::ZERO;
            style.visuals.widgets.hovered.rounding = egui::Rounding::ZERO;
            style.visuals.widgets.active.rounding = egui::Rounding::ZERO;
            ui.set_style(style);
            self.toolbar(ui);
        });

        egui::SidePanel::right("solution")
            .default_width(360.0)
            .show(ctx, |ui| {
                self.solution_panel(ui);
            });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal_wrapped(|ui| {
                if !self.error.is_empty() {
                    ui.colored_label(egui::Color32::LIGHT_RED, &self.error);
                } else if self.api_key.is_empty() {
                    ui.label(
                        egui::RichText::new(
                            "OpenAI API key required — click API Key… to configure",
                        )
                        .italics(),
                    );
                } else {
                    let msg = if self.status.is_empty() {
                        "Ready"
                    } else {
                        self.status.as_str()
                    };
                    ui.label(egui::RichText::new(msg).italics());
                }
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            draw_board_ui(ui, &self.board, &mut self.sel, self.solution.as_ref());
            self.handle_digit_entry(ui);
        });

        self.key_dialog(ctx);
    }
}

fn draw_board_ui(
    ui: &mut egui::Ui,
    board: &Board,
    sel: &mut (usize, usize),
    solution: Option<&SolveResult>,
) {
    let conflicts = board.conflict_mask();
    egui::Grid::new("board")
        .num_columns(9)
        .spacing([4.0, 4.0])
        .show(ui, |ui| {
            for r in 0..9 {
                for c in 0..9 {
                    let v = board.cells[r][c];
                    let overlay = if v == 0 {
                        solution.map(|s| s.solved_grid[r][c])
                    } else {
                        None
                    };
                    let txt = match (v, overlay) {
                        (0, Some(d)) => d.to_string(),
                        (0, None) => "·".to_string(),
                        (d, _) => d.to_string(),
                    };
                    let mut text = egui::RichText::new(txt).size(22.0);
                    if v != 0 {
                        text = text.color(if conflicts[r][c] {
                            egui::Color32::LIGHT_RED
                        } else {
                            egui::Color32::LIGHT_BLUE
                        });
                    } else if overlay.is_some() {
                        text = text.color(egui::Color32::LIGHT_GREEN);
                    }

                    let peers = r == sel.0 || c == sel.1 || (r / 3 == sel.0 / 3 && c / 3 == sel.1 / 3);
                    let mut button = egui::Button::new(text).min_size(egui::vec2(40.0, 40.0));
                    if peers {
                        button = button.fill(egui::Color32::from_gray(40));
                    }
                    if *sel == (r, c) {
                        button = button
                            .fill(egui::Color32::from_gray(60))
                            .stroke(egui::Stroke::new(2.0, egui::Color32::LIGHT_BLUE));
                    }
                    let resp = ui.add(button);
                    if resp.clicked() {
                        *sel = (r, c);
                    }

                    // Thin cell borders, thick 3x3 box borders
                    let thin = egui::Stroke::new(1.0, egui::Color32::from_gray(90));
                    let thick = egui::Stroke::new(2.0, egui::Color32::LIGHT_GRAY);
                    let rect = resp.rect;
                    let p = ui.painter();
                    p.line_segment(
                        [rect.left_top(), rect.left_bottom()],
                        if c % 3 == 0 { thick } else { thin },
                    );
                    p.line_segment(
                        [rect.left_top(), rect.right_top()],
                        if r % 3 == 0 { thick } else { thin },
                    );
                    p.line_segment(
                        [rect.right_top(), rect.right_bottom()],
                        if c % 3 == 2 { thick } else { thin },
                    );
                    p.line_segment(
                        [rect.left_bottom(), rect.right_bottom()],
                        if r % 3 == 2 { thick } else { thin },
                    );
                }
                ui.end_row();
            }
        });
}

fn display_filename(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .to_string()
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let options = NativeOptions::default();
    eframe::run_native(
        "Sudokai",
        options,
        Box::new(|_| -> Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(Box::new(SudokaiApp::default()))
        }),
    )
}

//! Virtual screen reconstruction.
//!
//! Replays every control sequence against an in-memory character grid so
//! the final rendered screen - what a human watching the terminal would
//! have seen - can be snapshotted at stream end, no matter how many redraw
//! cycles happened in between.
//!
//! Uses the VTE crate to parse the byte stream; unsupported sequences are
//! no-ops on the grid and cursor movement clamps to the grid bounds.

use std::fmt;

use vte::{Parser, Perform};

/// Default grid width for a capture session.
pub const DEFAULT_COLS: usize = 160;
/// Default grid height for a capture session.
pub const DEFAULT_ROWS: usize = 50;

/// A fixed-size virtual terminal screen.
///
/// Dimensions are fixed for the lifetime of one capture session.
pub struct VirtualScreen {
    width: usize,
    height: usize,
    grid: Vec<Vec<char>>,
    cursor_col: usize,
    cursor_row: usize,
    parser: Parser,
}

impl VirtualScreen {
    pub fn new(width: usize, height: usize) -> Self {
        // A zero-sized grid has no valid cursor position; clamp to 1x1
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            grid: vec![vec![' '; width]; height],
            cursor_col: 0,
            cursor_row: 0,
            parser: Parser::new(),
        }
    }

    /// Replay one chunk of raw output against the grid.
    pub fn write(&mut self, data: &str) {
        let mut performer = ScreenPerformer {
            grid: &mut self.grid,
            width: self.width,
            height: self.height,
            cursor_col: &mut self.cursor_col,
            cursor_row: &mut self.cursor_row,
        };
        self.parser.advance(&mut performer, data.as_bytes());
    }

    /// Clear the grid and home the cursor.
    pub fn reset(&mut self) {
        for row in &mut self.grid {
            row.fill(' ');
        }
        self.cursor_col = 0;
        self.cursor_row = 0;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Current rendered text: per-row trailing whitespace trimmed, trailing
    /// blank rows removed.
    pub fn snapshot(&self) -> String {
        let mut lines: Vec<String> = self
            .grid
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect();
        while lines.last().map(|s| s.is_empty()).unwrap_or(false) {
            lines.pop();
        }
        lines.join("\n")
    }
}

impl fmt::Display for VirtualScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.snapshot())
    }
}

/// Performer that handles VTE callbacks and updates the grid.
struct ScreenPerformer<'a> {
    grid: &'a mut Vec<Vec<char>>,
    width: usize,
    height: usize,
    cursor_col: &'a mut usize,
    cursor_row: &'a mut usize,
}

impl ScreenPerformer<'_> {
    /// Move cursor down one line, scrolling if necessary.
    /// Does NOT move to column 0 (that's carriage return).
    fn line_feed(&mut self) {
        if *self.cursor_row + 1 < self.height {
            *self.cursor_row += 1;
        } else {
            self.grid.remove(0);
            self.grid.push(vec![' '; self.width]);
        }
    }

    fn carriage_return(&mut self) {
        *self.cursor_col = 0;
    }

    fn backspace(&mut self) {
        *self.cursor_col = self.cursor_col.saturating_sub(1);
    }

    fn put_char(&mut self, c: char) {
        if *self.cursor_col >= self.width {
            // Wrap to next line, column 0
            self.line_feed();
            self.carriage_return();
        }
        if *self.cursor_row < self.height && *self.cursor_col < self.width {
            self.grid[*self.cursor_row][*self.cursor_col] = c;
            *self.cursor_col += 1;
        }
    }

    fn erase_to_eol(&mut self) {
        if *self.cursor_row < self.height {
            for col in *self.cursor_col..self.width {
                self.grid[*self.cursor_row][col] = ' ';
            }
        }
    }

    fn erase_line(&mut self) {
        if *self.cursor_row < self.height {
            self.grid[*self.cursor_row].fill(' ');
        }
    }

    fn erase_to_eos(&mut self) {
        self.erase_to_eol();
        for row in (*self.cursor_row + 1)..self.height {
            self.grid[row].fill(' ');
        }
    }

    fn clear_screen(&mut self) {
        for row in self.grid.iter_mut() {
            row.fill(' ');
        }
        *self.cursor_row = 0;
        *self.cursor_col = 0;
    }
}

impl Perform for ScreenPerformer<'_> {
    fn print(&mut self, c: char) {
        self.put_char(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' => self.line_feed(),
            b'\r' => self.carriage_return(),
            b'\x08' => self.backspace(),
            b'\t' => {
                // Next tab stop, every 8 columns
                let next_tab = (*self.cursor_col / 8 + 1) * 8;
                *self.cursor_col = next_tab.min(self.width - 1);
            }
            _ => {}
        }
    }

    fn hook(&mut self, _params: &vte::Params, _intermediates: &[u8], _ignore: bool, _action: char) {
    }

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn csi_dispatch(
        &mut self,
        params: &vte::Params,
        _intermediates: &[u8],
        _ignore: bool,
        action: char,
    ) {
        let params: Vec<u16> = params
            .iter()
            .map(|p| p.first().copied().unwrap_or(0))
            .collect();

        match action {
            'A' => {
                let n = params.first().copied().filter(|&x| x != 0).unwrap_or(1) as usize;
                *self.cursor_row = self.cursor_row.saturating_sub(n);
            }
            'B' => {
                let n = params.first().copied().filter(|&x| x != 0).unwrap_or(1) as usize;
                *self.cursor_row = (*self.cursor_row + n).min(self.height - 1);
            }
            'C' => {
                let n = params.first().copied().filter(|&x| x != 0).unwrap_or(1) as usize;
                *self.cursor_col = (*self.cursor_col + n).min(self.width - 1);
            }
            'D' => {
                let n = params.first().copied().filter(|&x| x != 0).unwrap_or(1) as usize;
                *self.cursor_col = self.cursor_col.saturating_sub(n);
            }
            'G' => {
                let n = params.first().copied().filter(|&x| x != 0).unwrap_or(1) as usize;
                *self.cursor_col = n.saturating_sub(1).min(self.width - 1);
            }
            'H' | 'f' => {
                // Cursor position (row;col), 1-indexed, clamped to the grid
                let row = params.first().copied().unwrap_or(1) as usize;
                let col = params.get(1).copied().unwrap_or(1) as usize;
                *self.cursor_row = row.saturating_sub(1).min(self.height - 1);
                *self.cursor_col = col.saturating_sub(1).min(self.width - 1);
            }
            'J' => match params.first().copied().unwrap_or(0) {
                0 => self.erase_to_eos(),
                2 => self.clear_screen(),
                _ => {}
            },
            'K' => match params.first().copied().unwrap_or(0) {
                0 => self.erase_to_eol(),
                2 => self.erase_line(),
                _ => {}
            },
            // SGR carries no information for a plain character grid
            'm' => {}
            _ => {}
        }
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}

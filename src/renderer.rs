//! Rendering della tela nel terminale con celle a mezzo blocco
//!
//! Ogni cella mostra due pixel verticali: il superiore come colore di primo
//! piano di `▀`, l'inferiore come sfondo. Vengono riscritte solo le righe
//! cambiate rispetto al frame precedente.

use crate::compositor::Canvas;
use crate::resample::resize_area;
use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal,
};
use image::Rgb;
use std::io::{self, Write};

const UPPER_HALF_BLOCK: char = '▀';

/// One terminal cell: two stacked canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub top: Rgb<u8>,
    pub bottom: Rgb<u8>,
}

/// Downsample `canvas` into `rows` rows of `cols` half-block cells.
pub fn canvas_to_cells(canvas: &Canvas, cols: u16, rows: u16) -> Vec<Vec<Cell>> {
    if cols == 0 || rows == 0 {
        return Vec::new();
    }
    let scaled = resize_area(canvas, cols as u32, rows as u32 * 2);
    (0..rows as u32)
        .map(|row| {
            (0..cols as u32)
                .map(|col| Cell {
                    top: *scaled.get_pixel(col, row * 2),
                    bottom: *scaled.get_pixel(col, row * 2 + 1),
                })
                .collect()
        })
        .collect()
}

fn to_color(Rgb([r, g, b]): Rgb<u8>) -> Color {
    Color::Rgb { r, g, b }
}

/// Preview area occupying the top `rows` terminal rows
pub struct TerminalPreview {
    cols: u16,
    rows: u16,
    last_frame: Vec<Vec<Cell>>,
    force_full_refresh: bool,
}

impl TerminalPreview {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            last_frame: Vec::new(),
            force_full_refresh: true,
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// Aggiorna dimensioni quando il terminale viene ridimensionato
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if (cols, rows) != (self.cols, self.rows) {
            self.cols = cols;
            self.rows = rows;
            self.last_frame.clear();
            self.force_full_refresh = true;
        }
    }

    /// Canvas pixel under the cell `(col, row)` for a canvas of the given size
    pub fn cell_to_canvas(&self, col: u16, row: u16, canvas_w: u32, canvas_h: u32) -> (i32, i32) {
        if self.cols == 0 || self.rows == 0 {
            return (0, 0);
        }
        let x = col as u64 * canvas_w as u64 / self.cols as u64;
        let y = row as u64 * canvas_h as u64 / self.rows as u64;
        (x as i32, y as i32)
    }

    /// Draw `canvas`, writing only rows that changed. Returns rows written.
    pub fn draw<W: Write>(&mut self, out: &mut W, canvas: &Canvas) -> io::Result<usize> {
        let frame = canvas_to_cells(canvas, self.cols, self.rows);
        if self.force_full_refresh {
            queue!(out, terminal::Clear(terminal::ClearType::All))?;
        }

        let mut written = 0;
        for (row, cells) in frame.iter().enumerate() {
            let unchanged = !self.force_full_refresh && self.last_frame.get(row) == Some(cells);
            if unchanged {
                continue;
            }
            queue!(out, cursor::MoveTo(0, row as u16))?;
            let mut current: Option<Cell> = None;
            for cell in cells {
                if current != Some(*cell) {
                    queue!(
                        out,
                        SetForegroundColor(to_color(cell.top)),
                        SetBackgroundColor(to_color(cell.bottom))
                    )?;
                    current = Some(*cell);
                }
                queue!(out, Print(UPPER_HALF_BLOCK))?;
            }
            written += 1;
        }
        queue!(out, ResetColor)?;
        out.flush()?;

        self.last_frame = frame;
        self.force_full_refresh = false;
        Ok(written)
    }

    /// Print a single status line right below the preview area.
    pub fn draw_status<W: Write>(&self, out: &mut W, text: &str) -> io::Result<()> {
        let line: String = text.chars().take(self.cols as usize).collect();
        queue!(
            out,
            cursor::MoveTo(0, self.rows),
            ResetColor,
            terminal::Clear(terminal::ClearType::CurrentLine),
            Print(line)
        )?;
        out.flush()
    }
}

// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Colour state last sent to the terminal, so runs of equal cells skip
/// redundant escape sequences.
#[derive(Default)]
struct Pen {
    fg: Option<Option<Color>>,
    bg: Option<Option<Color>>,
    pos: Option<(u16, u16)>,
}

pub struct Terminal {
    stdout: Stdout,
    size: Option<(u16, u16)>,
    rows: Vec<Vec<usize>>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            size: None,
            rows: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    fn put(&mut self, pen: &mut Pen, x: u16, y: u16, cell: Cell) -> Result<()> {
        if cell.is_continuation() {
            // the wide glyph to the left already covers this column
            if pen.pos == Some((x, y)) {
                pen.pos = Some((x + 1, y));
            }
            return Ok(());
        }
        if pen.pos != Some((x, y)) {
            self.stdout.queue(cursor::MoveTo(x, y))?;
        }
        if pen.fg != Some(cell.fg) {
            self.stdout
                .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            pen.fg = Some(cell.fg);
        }
        if pen.bg != Some(cell.bg) {
            self.stdout
                .queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            pen.bg = Some(cell.bg);
        }
        self.stdout.queue(Print(cell.ch))?;
        let advance = if unicode_width::UnicodeWidthChar::width(cell.ch) == Some(2) {
            2
        } else {
            1
        };
        pen.pos = Some((x.saturating_add(advance), y));
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let mut pen = Pen::default();
        let resized = self.size != Some((frame.width, frame.height));
        let total = frame.width as usize * frame.height as usize;
        let full = resized || frame.is_dirty_all() || frame.dirty_indices().len() >= total / 3;

        if resized {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.size = Some((frame.width, frame.height));
        }

        if full {
            for y in 0..frame.height {
                for x in 0..frame.width {
                    let idx = y as usize * frame.width as usize + x as usize;
                    self.put(&mut pen, x, y, frame.cell_at_index(idx))?;
                }
            }
        } else {
            let width = frame.width as usize;
            if self.rows.len() != frame.height as usize {
                self.rows = vec![Vec::new(); frame.height as usize];
            }
            for &idx in frame.dirty_indices() {
                if let Some(row) = self.rows.get_mut(idx / width) {
                    row.push(idx);
                }
            }
            let mut rows = std::mem::take(&mut self.rows);
            for (y, row) in rows.iter_mut().enumerate() {
                row.sort_unstable();
                for &idx in row.iter() {
                    let x = (idx % width) as u16;
                    self.put(&mut pen, x, y as u16, frame.cell_at_index(idx))?;
                }
                row.clear();
            }
            self.rows = rows;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

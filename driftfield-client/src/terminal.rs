// Driftfield terminal host
//
// Treats the terminal window as the viewport: pixel size from TIOCGWINSZ,
// one canvas cell per character cell, frames drawn on the alternate screen
// as shade glyphs in white-on-black gray levels.

use std::io::{self, Write};

use ansi_term::Colour;

use crate::animation::AnimationFrame;
use crate::host::Viewport;
use crate::runtime::Presenter;
use crate::surface::Canvas;

/// Glyphs from empty to fully covered
pub const SHADE_RAMP: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// Assumed character cell size when the terminal reports no pixel size
const FALLBACK_CELL_WIDTH: u16 = 8;
const FALLBACK_CELL_HEIGHT: u16 = 16;

const FALLBACK_COLUMNS: u16 = 80;
const FALLBACK_ROWS: u16 = 24;

const ENTER_SCREEN: &str = "\x1b[?1049h\x1b[?25l";
const LEAVE_SCREEN: &str = "\x1b[0m\x1b[?25h\x1b[?1049l";
const CURSOR_HOME: &str = "\x1b[H";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub columns: u16,
    pub rows: u16,
    pub pixel_width: u16,
    pub pixel_height: u16,
}

impl TerminalSize {
    /// Size of the terminal attached to stdout, or 80x24 when there is none
    pub fn query() -> Self {
        Self::from_winsize(query_winsize())
    }

    fn from_winsize(size: Option<(u16, u16, u16, u16)>) -> Self {
        match size {
            Some((columns, rows, pixel_width, pixel_height)) if columns > 0 && rows > 0 => {
                Self::new(columns, rows, pixel_width, pixel_height)
            }
            _ => Self::new(FALLBACK_COLUMNS, FALLBACK_ROWS, 0, 0),
        }
    }

    /// Missing pixel dimensions are derived from the fallback cell size
    pub fn new(columns: u16, rows: u16, pixel_width: u16, pixel_height: u16) -> Self {
        let pixel_width = if pixel_width == 0 {
            columns.saturating_mul(FALLBACK_CELL_WIDTH)
        } else {
            pixel_width
        };
        let pixel_height = if pixel_height == 0 {
            rows.saturating_mul(FALLBACK_CELL_HEIGHT)
        } else {
            pixel_height
        };
        Self {
            columns,
            rows,
            pixel_width,
            pixel_height,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.pixel_width as f64, self.pixel_height as f64)
    }

    /// Pixels per character cell
    pub fn cell_size(&self) -> (f64, f64) {
        (
            self.pixel_width as f64 / self.columns.max(1) as f64,
            self.pixel_height as f64 / self.rows.max(1) as f64,
        )
    }
}

#[cfg(unix)]
fn query_winsize() -> Option<(u16, u16, u16, u16)> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    // SAFETY: TIOCGWINSZ only writes into the winsize we pass
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };
    if rc == 0 {
        Some((ws.ws_col, ws.ws_row, ws.ws_xpixel, ws.ws_ypixel))
    } else {
        None
    }
}

#[cfg(not(unix))]
fn query_winsize() -> Option<(u16, u16, u16, u16)> {
    None
}

/// Glyph for a cell's coverage
pub fn shade(coverage: f32) -> char {
    if coverage <= 0.0 {
        return SHADE_RAMP[0];
    }
    let steps = (SHADE_RAMP.len() - 1) as f32;
    let index = (coverage.min(1.0) * steps).ceil() as usize;
    SHADE_RAMP[index.clamp(1, SHADE_RAMP.len() - 1)]
}

/// Plain glyph rows for a canvas, top to bottom
pub fn render_rows(canvas: &Canvas) -> Vec<String> {
    (0..canvas.rows())
        .map(|row| {
            (0..canvas.columns())
                .map(|column| shade(canvas.coverage_at(column, row).unwrap_or(0.0)))
                .collect()
        })
        .collect()
}

/// Draws frames on the terminal's alternate screen
pub struct TerminalPresenter<W: Write + Send> {
    out: W,
    entered: bool,
    colored: bool,
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            entered: false,
            colored: true,
        }
    }

    /// Plain glyphs without color escapes
    pub fn monochrome(mut self) -> Self {
        self.colored = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn compose(&self, canvas: &Canvas) -> String {
        let mut screen = String::from(CURSOR_HOME);
        for row in 0..canvas.rows() {
            if row > 0 {
                screen.push_str("\r\n");
            }
            for column in 0..canvas.columns() {
                let coverage = canvas.coverage_at(column, row).unwrap_or(0.0);
                let glyph = shade(coverage);
                if self.colored && glyph != SHADE_RAMP[0] {
                    let level = (coverage.min(1.0) * 255.0).round() as u8;
                    let painted = Colour::RGB(level, level, level).paint(glyph.to_string());
                    screen.push_str(&painted.to_string());
                } else {
                    screen.push(glyph);
                }
            }
        }
        screen
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn present(&mut self, canvas: &Canvas, _frame: &AnimationFrame) -> io::Result<()> {
        if !self.entered {
            self.out.write_all(ENTER_SCREEN.as_bytes())?;
            self.entered = true;
        }
        let screen = self.compose(canvas);
        self.out.write_all(screen.as_bytes())?;
        self.out.flush()
    }

    fn teardown(&mut self) -> io::Result<()> {
        if self.entered {
            self.out.write_all(LEAVE_SCREEN.as_bytes())?;
            self.entered = false;
        }
        self.out.flush()
    }
}

/// Terminal window-change notifications (SIGWINCH). Never fires on
/// platforms without it.
pub struct WindowChanges {
    #[cfg(unix)]
    signal: tokio::signal::unix::Signal,
}

impl WindowChanges {
    pub fn new() -> io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                signal: signal(SignalKind::window_change())?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    pub async fn recv(&mut self) -> Option<()> {
        #[cfg(unix)]
        {
            self.signal.recv().await
        }
        #[cfg(not(unix))]
        {
            std::future::pending().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    fn frame() -> AnimationFrame {
        AnimationFrame::new(0, 1, 4.0, 2.0)
    }

    #[test]
    fn test_shade_ramp() {
        assert_eq!(shade(0.0), ' ');
        assert_eq!(shade(0.2), '░');
        assert_eq!(shade(0.5), '▒');
        assert_eq!(shade(0.7), '▓');
        assert_eq!(shade(0.8), '█');
        assert_eq!(shade(1.0), '█');
    }

    #[test]
    fn test_size_fallbacks() {
        let size = TerminalSize::from_winsize(None);
        assert_eq!((size.columns, size.rows), (80, 24));
        assert_eq!(size.viewport(), Viewport::new(640.0, 384.0));
        assert_eq!(size.cell_size(), (8.0, 16.0));

        let size = TerminalSize::from_winsize(Some((0, 0, 0, 0)));
        assert_eq!((size.columns, size.rows), (80, 24));
    }

    #[test]
    fn test_size_uses_reported_pixels() {
        let size = TerminalSize::from_winsize(Some((100, 40, 1000, 800)));
        assert_eq!(size.viewport(), Viewport::new(1000.0, 800.0));
        assert_eq!(size.cell_size(), (10.0, 20.0));

        let size = TerminalSize::from_winsize(Some((100, 40, 0, 0)));
        assert_eq!(size.viewport(), Viewport::new(800.0, 640.0));
    }

    #[test]
    fn test_render_rows() {
        let mut canvas = Canvas::new(6.0, 2.0);
        canvas.fill_circle(0.5, 0.5, 0.1, 0.2);
        canvas.fill_circle(2.5, 0.5, 0.1, 0.5);
        canvas.fill_circle(4.5, 1.5, 0.1, 0.8);

        let rows: String = render_rows(&canvas)
            .iter()
            .map(|row| format!("{}|", row))
            .collect();
        insta::assert_snapshot!(rows, @"░ ▒   |    █ |");
    }

    #[test]
    fn test_monochrome_present_and_teardown() {
        let mut canvas = Canvas::new(4.0, 2.0);
        canvas.fill_circle(1.5, 1.5, 0.1, 1.0);

        let mut presenter = TerminalPresenter::new(Vec::new()).monochrome();
        presenter.present(&canvas, &frame()).unwrap();
        presenter.teardown().unwrap();

        let output = String::from_utf8(presenter.into_inner()).unwrap();
        assert_eq!(
            output,
            format!("{}{}    \r\n █  {}", ENTER_SCREEN, CURSOR_HOME, LEAVE_SCREEN)
        );
    }

    #[test]
    fn test_screen_entered_once() {
        let canvas = Canvas::new(2.0, 1.0);
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.present(&canvas, &frame()).unwrap();
        presenter.present(&canvas, &frame()).unwrap();

        let output = String::from_utf8(presenter.into_inner()).unwrap();
        assert_eq!(output.matches(ENTER_SCREEN).count(), 1);
        assert_eq!(output.matches(CURSOR_HOME).count(), 2);
    }

    #[test]
    fn test_colored_cells_carry_gray_level() {
        let mut canvas = Canvas::new(1.0, 1.0);
        canvas.fill_circle(0.5, 0.5, 0.1, 1.0);

        let presenter = TerminalPresenter::new(Vec::new());
        let screen = presenter.compose(&canvas);
        assert!(screen.contains("\x1b[38;2;255;255;255m█"));
    }

    #[test]
    fn test_teardown_without_frames_writes_nothing() {
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.teardown().unwrap();
        assert!(presenter.into_inner().is_empty());
    }
}

// Application state for the TUI: a circular node x time heat raster.

use anyhow::Result;

use crate::backend::DiffusionBackend;

/// Glyphs from empty to full intensity.
pub const GLYPHS: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// Maps |value| / peak onto the glyph scale.
pub fn glyph(value: f64, peak: f64) -> char {
    if peak.is_nan() || peak <= 0.0 || !value.is_finite() {
        return GLYPHS[0];
    }
    let level = (value.abs() / peak * (GLYPHS.len() - 1) as f64).round();
    GLYPHS[(level as usize).min(GLYPHS.len() - 1)]
}

pub struct App<B: DiffusionBackend> {
    pub backend: B,
    pub width: usize,           // number of columns (time window)
    pub raster: Vec<Vec<char>>, // [node][col]
    pub peak: f64,
    pub running: bool,
    pub last_error: Option<String>,
}

impl<B: DiffusionBackend> App<B> {
    pub fn new(backend: B, width: usize) -> Self {
        let width = width.max(1);
        let mut app = Self {
            raster: vec![vec![' '; width]; backend.nodes()],
            backend,
            width,
            peak: 0.0,
            running: false,
            last_error: None,
        };
        app.restart();
        app
    }

    pub fn toggle_running(&mut self) {
        self.running = !self.running;
    }

    /// Back to x(0); the raster is cleared and column 0 shows the initial signal.
    pub fn restart(&mut self) {
        self.backend.reset();
        let x0 = self.backend.values();
        self.peak = x0.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        for row in &mut self.raster {
            row.iter_mut().for_each(|c| *c = ' ');
        }
        self.paint(0, &x0);
        self.last_error = None;
    }

    pub fn tick(&self) -> u64 {
        self.backend.tick()
    }

    /// Advance the diffusion by one tick and paint the next column.
    pub fn step(&mut self) -> Result<()> {
        let values = match self.backend.step() {
            Ok(v) => v,
            Err(e) => {
                self.running = false;
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };
        let col = (self.backend.tick() as usize) % self.width;
        self.paint(col, &values);
        Ok(())
    }

    fn paint(&mut self, col: usize, values: &[f64]) {
        for (row, cells) in self.raster.iter_mut().enumerate() {
            cells[col] = values.get(row).map_or(' ', |&v| glyph(v, self.peak));
        }
    }
}

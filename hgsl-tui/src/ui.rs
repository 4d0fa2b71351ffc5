// TUI rendering: heat raster (time on X, node indices on Y) + status panel.

use std::io::Stdout;

use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Text,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

use crate::app::App;
use crate::backend::DiffusionBackend;

/// Row label padded to the width of the largest node index.
fn row_label(idx: usize, rows: usize) -> String {
    let digits = rows.saturating_sub(1).to_string().len().max(2);
    format!("v{:0width$} |", idx, width = digits)
}

pub fn raster_lines(raster: &[Vec<char>]) -> Vec<String> {
    raster
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut line = row_label(idx, raster.len());
            line.extend(row.iter());
            line
        })
        .collect()
}

/// Draws the UI each frame:
/// - Top: node x time raster, glyph intensity relative to the initial peak.
/// - Bottom: tick, node count, operator, run state, controls (and the last error, if any).
pub fn draw<B: DiffusionBackend>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &App<B>,
    operator: &str,
) -> anyhow::Result<()> {
    terminal.draw(|f| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Percentage(80), Constraint::Percentage(20)].as_ref())
            .split(f.size());

        let raster_widget = Paragraph::new(Text::from(raster_lines(&app.raster).join("\n")))
            .block(
                Block::default()
                    .title(format!("Diffusion  (time →, peak {:.3})", app.peak))
                    .borders(Borders::ALL),
            )
            .style(Style::default().fg(Color::White));
        f.render_widget(raster_widget, chunks[0]);

        let mut status = format!(
            "Tick: {} | Nodes: {} | Operator: {} | Running: {} | Controls: [s] Step  [r] Run/Pause  [c] Restart  [q] Quit",
            app.tick(),
            app.backend.nodes(),
            operator,
            if app.running { "yes" } else { "no" }
        );
        if let Some(err) = &app.last_error {
            status.push_str(&format!("\nError: {}", err));
        }
        let status_widget = Paragraph::new(status)
            .style(Style::default().fg(Color::Cyan))
            .block(Block::default().title("Status").borders(Borders::ALL));
        f.render_widget(status_widget, chunks[1]);
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_padded() {
        let raster = vec![vec!['█', ' '], vec!['░', '▒']];
        assert_eq!(raster_lines(&raster), vec!["v00 |█ ".to_string(), "v01 |░▒".to_string()]);
        assert_eq!(row_label(7, 150), "v007 |");
    }
}

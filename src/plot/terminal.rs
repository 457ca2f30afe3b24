//! Terminal session for the chart viewer (raw mode, alternate screen).

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use is_terminal::IsTerminal;
use ratatui::prelude::*;

use super::{app::ChartApp, ui::render_ui};
use crate::error::{Error, Result};

/// Show the charts until the user quits. Blocks the calling thread.
pub fn run_charts(app: &mut ChartApp) -> Result<()> {
    if !io::stdout().is_terminal() {
        return Err(Error::Terminal("chart display requires a terminal".into()));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut ChartApp) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| render_ui(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
    }
    Ok(())
}

//! Chart viewer state and key handling.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::Series;
use crate::{error::Result, stats::Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Line chart of both series against the round index.
    Comparison,
    /// Grouped bars of min and mean.
    Statistics,
}

#[derive(Debug)]
pub struct ChartApp {
    pub baseline: Series,
    pub loaded: Series,
    /// `(baseline, loaded)`; only computed when the statistics view is shown.
    pub summaries: Option<(Summary, Summary)>,
    views: Vec<View>,
    current: usize,
    pub should_quit: bool,
}

impl ChartApp {
    /// Fails if the statistics view is requested for an empty series.
    pub fn new(baseline: Series, loaded: Series, views: &[View]) -> Result<Self> {
        let summaries = if views.contains(&View::Statistics) {
            Some((baseline.summary()?, loaded.summary()?))
        } else {
            None
        };
        Ok(Self {
            baseline,
            loaded,
            summaries,
            views: views.to_vec(),
            current: 0,
            should_quit: views.is_empty(),
        })
    }

    pub fn view(&self) -> View {
        self.views.get(self.current).copied().unwrap_or(View::Comparison)
    }

    pub fn position(&self) -> (usize, usize) {
        (self.current + 1, self.views.len())
    }

    /// Advance to the next chart; leaving the last one quits.
    pub fn next(&mut self) {
        if self.current + 1 < self.views.len() {
            self.current += 1;
        } else {
            self.should_quit = true;
        }
    }

    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.should_quit = true,
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right | KeyCode::Tab => self.next(),
            KeyCode::Left | KeyCode::BackTab => self.previous(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn app(views: &[View]) -> ChartApp {
        ChartApp::new(
            Series::new("Without Load", vec![10.0, 20.0]),
            Series::new("With Load", vec![15.0, 25.0]),
            views,
        )
        .unwrap()
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn enter_walks_through_views_then_quits() {
        let mut app = app(&[View::Comparison, View::Statistics]);
        assert_eq!(app.view(), View::Comparison);
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.view(), View::Statistics);
        assert_eq!(app.position(), (2, 2));
        assert!(!app.should_quit);
        app.handle_key(press(KeyCode::Left));
        assert_eq!(app.view(), View::Comparison);
        app.handle_key(press(KeyCode::Right));
        app.handle_key(press(KeyCode::Char(' ')));
        assert!(app.should_quit);
    }

    #[test]
    fn escape_quits_immediately() {
        let mut app = app(&[View::Comparison, View::Statistics]);
        app.handle_key(press(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn summaries_only_for_statistics_view() {
        assert!(app(&[View::Comparison]).summaries.is_none());
        let (a, b) = app(&[View::Statistics]).summaries.unwrap();
        assert_eq!((a.min, a.mean), (10.0, 15.0));
        assert_eq!((b.min, b.mean), (15.0, 20.0));
    }

    #[test]
    fn empty_series_rejected_for_statistics() {
        let err = ChartApp::new(
            Series::new("Without Load", vec![]),
            Series::new("With Load", vec![1.0]),
            &[View::Statistics],
        )
        .unwrap_err();
        assert!(matches!(err, Error::EmptySeries(_)));
    }
}

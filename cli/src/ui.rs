//! Terminal presentation: the live dashboard and a debug log presenter

use log::*;
use r_arplib::{
    error::{RArpLibError, Result as LibResult},
    scanners::controller::{Presenter, ScanView},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
        execute,
        terminal::{
            EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
            enable_raw_mode,
        },
    },
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::{
    io::{self, Stdout},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

fn terminal_error(e: io::Error) -> RArpLibError {
    RArpLibError::Terminal(e.to_string())
}

/// Continuously refreshed host table rendered through ratatui
pub struct Dashboard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    interrupted: Arc<AtomicBool>,
}

impl Dashboard {
    /// Puts the terminal into raw mode on an alternate screen
    pub fn new(interrupted: Arc<AtomicBool>) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            interrupted,
        })
    }

    // Raw mode swallows the usual SIGINT from the keyboard, so ctrl-c is
    // handled here alongside q and esc
    fn poll_keys(&self) -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                let ctrl_c = key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL);

                if ctrl_c
                    || key.code == KeyCode::Char('q')
                    || key.code == KeyCode::Esc
                {
                    self.interrupted.store(true, Ordering::SeqCst);
                }
            }
        }
        Ok(())
    }
}

impl Presenter for Dashboard {
    fn render(&mut self, view: &ScanView) -> LibResult<()> {
        self.terminal
            .draw(|frame| draw(frame, view))
            .map_err(terminal_error)?;
        self.poll_keys().map_err(terminal_error)
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn draw(frame: &mut Frame, view: &ScanView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let mut header = vec![
        Line::from(format!(
            "TOTAL HOST: {}   TOTAL REQ.: {}   TOTAL REP.: {}",
            view.totals.hosts, view.totals.requests, view.totals.replies
        )),
        Line::from(format!(
            "sending: {}   elapsed: {}s",
            view.send_status,
            view.elapsed.as_secs()
        )),
    ];

    if !view.notes.is_empty() {
        header.push(Line::styled(
            view.notes.join(" | "),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(
        Paragraph::new(header)
            .block(Block::default().borders(Borders::BOTTOM)),
        chunks[0],
    );

    let rows = view.hosts.iter().map(|host| {
        // a MAC mismatch hints at spoofing
        let style = if host.is_suspicious() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        Row::new(vec![
            Cell::from(host.ip.to_string()),
            Cell::from(host.eth_mac.to_string()),
            Cell::from(host.arp_mac.to_string()),
            Cell::from(host.requests.to_string()),
            Cell::from(host.replies.to_string()),
            Cell::from(host.vendor.clone()),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Length(15),
        Constraint::Length(17),
        Constraint::Length(17),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Min(10),
    ];

    let table = Table::new(rows, widths).header(
        Row::new(vec![
            "IP ADDRESS",
            "ETH MAC ADDRESS",
            "ARP MAC ADDRESS",
            "REQ.",
            "REP.",
            "VENDOR",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    );

    frame.render_widget(table, chunks[1]);

    frame.render_widget(
        Paragraph::new("press q or ctrl-c to stop")
            .style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

/// Presenter for `--debug` mode: logs newly discovered hosts instead of
/// drawing the dashboard
#[derive(Debug, Default)]
pub struct LogPresenter {
    seen: usize,
}

impl Presenter for LogPresenter {
    fn render(&mut self, view: &ScanView) -> LibResult<()> {
        for host in &view.hosts[self.seen..] {
            info!(
                "discovered {} ({}) {}",
                host.ip, host.eth_mac, host.vendor
            );
        }
        self.seen = view.hosts.len();
        Ok(())
    }
}

use super::app::{App, Tab};
use crate::ledger::{format_timestamp, short_identifier, Block as LedgerBlock};
use crate::pipeline::palette::{self, CONNECTION, MARKER};
use crate::pipeline::stage::{
    dashes, LineKind, Point, Stage, DIAGRAM_HEIGHT, DIAGRAM_WIDTH, MARKER_RADIUS, STAGE_RADIUS,
};
use crate::pipeline::{Gauge, SequencerState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Block, Borders, Cell, Gauge as GaugeWidget, Paragraph, Row, Table, TableState, Tabs, Wrap,
    },
    Frame,
};
use std::time::Instant;
use unicode_width::UnicodeWidthStr;

const DASH_LENGTH: f64 = 5.0;

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    match app.current_tab {
        Tab::Blockchain => draw_blockchain(f, app, chunks[1]),
        Tab::Llm => draw_llm(f, &app.pipeline_state(), chunks[1]),
    }
    draw_status_bar(f, app, chunks[2]);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let num = format!("[{}] ", i + 1);
            let style = if *t == app.current_tab {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(num, Style::default().fg(Color::DarkGray)),
                Span::styled(t.title(), style),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" vizlab  [←/→ or 1-2 to switch tabs] "),
        )
        .highlight_style(Style::default().fg(Color::Yellow))
        .select(
            Tab::all()
                .iter()
                .position(|t| *t == app.current_tab)
                .unwrap_or(0),
        );

    f.render_widget(tabs, area);
}

// Blockchain tab

fn draw_blockchain(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Intro
            Constraint::Min(0),    // Chain and array
            Constraint::Length(5), // How it works
        ])
        .split(area);

    let intro = Paragraph::new(Line::from(vec![
        Span::styled("Press ", Style::default().fg(Color::Gray)),
        Span::styled("a", Style::default().fg(Color::Cyan)),
        Span::styled(
            " to add new blocks and see how they connect.",
            Style::default().fg(Color::Gray),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" Blockchain Visualizer ({} blocks) ", app.ledger.len())),
    );
    f.render_widget(intro, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let now = Instant::now();
    draw_chain(f, app, now, columns[0]);
    draw_block_array(f, app, now, columns[1]);
    draw_how_it_works(f, chunks[2]);
}

fn block_lines(block: &LedgerBlock, highlighted: bool) -> Vec<Line<'static>> {
    let base = if highlighted {
        Style::default().bg(Color::Blue).fg(Color::White)
    } else {
        Style::default()
    };
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let hash = Style::default().fg(if highlighted { Color::White } else { Color::Gray });

    let previous = block
        .previous_identifier
        .clone()
        .unwrap_or_else(|| "Genesis Block".to_string());

    vec![
        Line::from(vec![
            Span::styled(
                format!("▣ Block {}", block.number),
                base.add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", format_timestamp(&block.created_at)),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(vec![
            Span::styled("  # Previous Hash: ", label),
            Span::styled(previous, hash),
        ]),
        Line::from(vec![
            Span::styled("  # Current Hash:  ", label),
            Span::styled(block.identifier.clone(), hash),
        ]),
    ]
}

fn draw_chain(f: &mut Frame, app: &App, now: Instant, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    let count = app.ledger.len();
    for (i, block) in app.ledger.iter().enumerate() {
        let highlighted = app.highlight.is_highlighted(&block.identifier, now);
        lines.extend(block_lines(block, highlighted));
        if i + 1 < count {
            lines.push(Line::from(Span::styled(
                "        │",
                Style::default().fg(Color::Blue),
            )));
            lines.push(Line::from(Span::styled(
                "        ▼",
                Style::default().fg(Color::Blue),
            )));
        }
    }

    // Keep the newest block in view.
    let visible = area.height.saturating_sub(2);
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let scroll = total.saturating_sub(visible);

    let chain = Paragraph::new(lines).scroll((scroll, 0)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Blockchain Structure "),
    );
    f.render_widget(chain, area);
}

fn draw_block_array(f: &mut Frame, app: &App, now: Instant, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Index").style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Cell::from("Block").style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Cell::from("Hash").style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Cell::from("PrevHash").style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    ])
    .height(1)
    .bottom_margin(1);

    let rows: Vec<Row> = app
        .ledger
        .iter()
        .map(|block| {
            let highlighted = app.highlight.is_highlighted(&block.identifier, now);
            let style = if highlighted {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("[{}]", block.number - 1))
                    .style(Style::default().fg(if highlighted { Color::White } else { Color::Cyan })),
                Cell::from(format!("Block {}", block.number)),
                Cell::from(short_identifier(Some(block.identifier.as_str()))),
                Cell::from(short_identifier(block.previous_identifier.as_deref()))
                    .style(Style::default().fg(if highlighted { Color::White } else { Color::DarkGray })),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Percentage(40),
        Constraint::Percentage(40),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Block Array Structure "),
    );

    // Selecting the last row scrolls it into view.
    let mut state = TableState::default();
    state.select(Some(app.ledger.len() - 1));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_how_it_works(f: &mut Frame, area: Rect) {
    let bullet = |symbol: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(symbol, Style::default().fg(Color::Blue)),
            Span::styled(text, Style::default().fg(Color::Gray)),
        ])
    };
    let text = vec![
        bullet(" # ", "Each block contains its own unique hash and the previous block's hash"),
        bullet(" ⛓ ", "Blocks are linked together forming an immutable chain"),
        bullet(" ▤ ", "The array structure shows the sequential storage of blocks"),
    ];
    let how = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" How it works "));
    f.render_widget(how, area);
}

// LLM tab

fn draw_llm(f: &mut Frame, state: &SequencerState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(12),   // Diagram
            Constraint::Length(3), // Status
            Constraint::Length(3), // Tokenization gauge
            Constraint::Length(3), // Attention gauge
        ])
        .split(area);

    draw_diagram(f, state, chunks[0]);

    let status_text = if state.status_message.is_empty() {
        "Press p to play the animation".to_string()
    } else {
        state.status_message.clone()
    };
    let status_style = if state.is_running {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::Cyan)),
        Span::styled(status_text, status_style),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[1]);

    draw_gauge(f, state, Gauge::Tokenize, chunks[2]);
    draw_gauge(f, state, Gauge::Attention, chunks[3]);
}

/// A gauge appears once its value leaves zero.
fn draw_gauge(f: &mut Frame, state: &SequencerState, gauge: Gauge, area: Rect) {
    let value = state.gauge(gauge);
    if value == 0 {
        return;
    }
    let color = match gauge {
        Gauge::Tokenize => palette::tokenizer_color(value),
        Gauge::Attention => palette::attention_color(value),
    };
    let widget = GaugeWidget::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(color.into()))
        .percent(u16::from(value))
        .label(format!("{}: {}%", gauge.label(), value));
    f.render_widget(widget, area);
}

/// Canvas y grows upwards, the diagram's y grows downwards.
fn flip(p: Point) -> (f64, f64) {
    (p.x, DIAGRAM_HEIGHT - p.y)
}

fn fill_circle(ctx: &mut Context, center: Point, radius: f64, color: Color) {
    let (x, y) = flip(center);
    let mut r = radius;
    while r > 0.0 {
        ctx.draw(&Circle {
            x,
            y,
            radius: r,
            color,
        });
        r -= 3.0;
    }
}

fn draw_diagram(f: &mut Frame, state: &SequencerState, area: Rect) {
    let inner_width = f64::from(area.width.saturating_sub(2).max(1));
    let inner_height = f64::from(area.height.saturating_sub(2).max(1));
    let cell_width = DIAGRAM_WIDTH / inner_width;
    let cell_height = DIAGRAM_HEIGHT / inner_height;

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" LLM Processing Pipeline "),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, DIAGRAM_WIDTH])
        .y_bounds([0.0, DIAGRAM_HEIGHT])
        .paint(move |ctx| {
            for connection in Stage::connections() {
                let from = connection.from.position();
                let to = connection.to.position();
                let segments = match connection.kind {
                    LineKind::Solid => vec![(from, to)],
                    LineKind::Dashed => dashes(from, to, DASH_LENGTH),
                };
                for (a, b) in segments {
                    let (x1, y1) = flip(a);
                    let (x2, y2) = flip(b);
                    ctx.draw(&CanvasLine {
                        x1,
                        y1,
                        x2,
                        y2,
                        color: CONNECTION.into(),
                    });
                }
            }
            ctx.layer();

            for stage in Stage::all() {
                let color = palette::stage_color(stage, state);
                fill_circle(ctx, stage.position(), STAGE_RADIUS, color.into());
            }
            ctx.layer();

            fill_circle(ctx, state.marker, MARKER_RADIUS, MARKER.into());
            ctx.layer();

            for stage in Stage::all() {
                let words: Vec<&str> = stage.label().split(' ').collect();
                let (x, y) = flip(stage.position());
                let middle = (words.len() as f64 - 1.0) / 2.0;
                for (index, word) in words.iter().enumerate() {
                    let half_width = word.width() as f64 * cell_width / 2.0;
                    let line_y = y - (index as f64 - middle) * cell_height;
                    ctx.print(
                        x - half_width,
                        line_y,
                        Span::styled(
                            word.to_string(),
                            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                        ),
                    );
                }
            }
        });

    f.render_widget(canvas, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.current_tab {
        Tab::Blockchain => " a/Enter:Add Block  r:Reset  ←/→:Tabs  q:Quit ",
        Tab::Llm => {
            if app.sequencer.is_running() {
                " Playing...  r:Reset  ←/→:Tabs  q:Quit "
            } else {
                " p/Enter:Play Animation  r:Reset  ←/→:Tabs  q:Quit "
            }
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    // Left: context-sensitive help
    let help_style = if app.sequencer.is_running() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let help = Paragraph::new(Line::from(Span::styled(help_text, help_style)))
        .block(Block::default().borders(Borders::ALL).title(" Keys "));

    // Right: global info
    let pipeline = if app.sequencer.is_running() {
        "running"
    } else {
        "idle"
    };
    let info = format!(" {} blocks | pipeline {} ", app.ledger.len(), pipeline);
    let info_widget = Paragraph::new(Line::from(Span::styled(
        info,
        Style::default().fg(Color::DarkGray),
    )))
    .block(Block::default().borders(Borders::ALL).title(" Info "));

    f.render_widget(help, chunks[0]);
    f.render_widget(info_widget, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ledger::identifier::SequentialIdentifiers;
    use crate::ledger::IdentifierSource;
    use crate::pipeline::InstantClock;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn sequential() -> Box<dyn IdentifierSource> {
        Box::new(SequentialIdentifiers::new())
    }

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_blockchain_tab_lists_blocks() {
        let mut app = App::with_identifiers(Config::default(), Arc::new(InstantClock::new()), sequential);
        app.add_block(Instant::now());

        let screen = render(&mut app);
        assert!(screen.contains("Blockchain Structure"));
        assert!(screen.contains("Block Array Structure"));
        assert!(screen.contains("Block 2"));
        assert!(screen.contains("Genesis Block"));
        assert!(screen.contains("id000001"));
        assert!(screen.contains("null..."));
        assert!(screen.contains("2 blocks"));
    }

    #[test]
    fn test_llm_tab_shows_status_and_hides_empty_gauges() {
        let mut app = App::with_identifiers(Config::default(), Arc::new(InstantClock::new()), sequential);
        app.goto_tab(1);

        let screen = render(&mut app);
        assert!(screen.contains("LLM Processing Pipeline"));
        assert!(screen.contains("Press p to play the animation"));
        assert!(!screen.contains("Tokenization Progress"));
        assert!(!screen.contains("Attention Score"));
        assert!(screen.contains("pipeline idle"));
    }

    #[test]
    fn test_gauges_appear_once_above_zero() {
        let state = SequencerState {
            is_running: true,
            tokenize_progress: 40,
            ..SequencerState::default()
        };
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                draw_llm(f, &state, area);
            })
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();

        assert!(screen.contains("Tokenization Progress: 40%"));
        assert!(!screen.contains("Attention Score"));
    }

    #[test]
    fn test_flip_inverts_y() {
        assert_eq!(flip(Stage::ContextWindow.position()), (350.0, 250.0));
        assert_eq!(flip(Stage::KnowledgeBase.position()), (500.0, 50.0));
    }
}

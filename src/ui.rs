use std::{
    io::{self, Stdout},
    time::Instant,
};

use anyhow::Result;
use crossterm::{
    cursor,
    execute,
    terminal::{
        self, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::*,
};

use crate::app::{AppState, Scene};
use crate::minigame::higher_lower::{Guess, HigherLowerState, BASE_NUMBER};
use crate::minigame::labyrinth::{Item, LabyrinthState};
use crate::minigame::Game;
use crate::model::{
    check_action, fmt_countdown, ActionCheck, Food, MaturityStage, PetKind, PlayKind, SleepKind,
    WashKind, PLAY_DURATION,
};
use crate::sprite::appearance;

pub(crate) fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode()?;
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen, DisableLineWrap, cursor::Hide)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

pub(crate) fn restore_terminal(term: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut out = io::stdout();
    execute!(out, cursor::Show, EnableLineWrap, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    term.show_cursor()?;
    Ok(())
}

fn pet_color(pet: PetKind, mono: bool) -> Color {
    if mono {
        return Color::White;
    }
    // per-species tints: brown, golden, sienna
    match pet {
        PetKind::Hedgehog => Color::Rgb(139, 69, 19),
        PetKind::Hamster => Color::Rgb(218, 165, 32),
        PetKind::Squirrel => Color::Rgb(160, 82, 45),
    }
}

fn stat_color(v: f64, mono: bool) -> Color {
    if mono {
        return Color::Gray;
    }
    if v >= 80.0 {
        Color::Green
    } else if v >= 40.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub(crate) fn draw_frame(
    term: &mut Terminal<CrosstermBackend<Stdout>>,
    st: &AppState,
) -> Result<()> {
    let now = Instant::now();

    term.draw(|f| {
        let area = f.size();
        let outer = Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::styled(" hutch ", Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!(" {} ", st.server_url),
                    Style::default().fg(if st.mono { Color::White } else { Color::Cyan }),
                ),
            ]))
            .border_style(Style::default().fg(if st.mono {
                Color::Gray
            } else {
                Color::DarkGray
            }));
        f.render_widget(outer, area);

        let inner = area.inner(Margin {
            horizontal: 1,
            vertical: 1,
        });
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(inner);

        render_header(f, rows[0], st);
        render_main(f, rows[1], st);
        render_footer(f, rows[2], st);

        // popups over the main pane
        match &st.scene {
            Scene::FoodMenu { cursor } => render_food_menu(f, rows[1], st, *cursor),
            Scene::PlayMenu { cursor } => render_play_menu(f, rows[1], st, *cursor),
            Scene::WashMenu { cursor } => render_wash_menu(f, rows[1], st, *cursor),
            Scene::SleepMenu { cursor } => render_sleep_menu(f, rows[1], st, *cursor),
            Scene::Shop(_) => render_shop(f, rows[1], st),
            Scene::GameMenu { cursor } => render_game_menu(f, rows[1], st, *cursor),
            Scene::HigherLower(hl) => render_higher_lower(f, rows[1], st, hl),
            Scene::Help => render_help(f, rows[1], st),
            Scene::Main | Scene::Labyrinth(_) => {}
        }

        // a running activity blocks everything else
        if !st.activity.is_idle() {
            render_overlay(f, rows[1], st, now);
        }
    })?;

    Ok(())
}

fn render_header(f: &mut Frame, area: Rect, st: &AppState) {
    let stage = st
        .maturity
        .as_ref()
        .map(|m| m.stage.label())
        .unwrap_or("adult");
    let coins = st.inventory.map(|i| i.coins).unwrap_or(0);

    let mut spans = vec![
        Span::styled(
            st.pet.label(),
            Style::default()
                .fg(pet_color(st.pet, st.mono))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  stage: {stage}")),
        Span::raw(format!("  coins: {coins}")),
    ];
    if let Some(m) = &st.maturity {
        if let Some(next) = &m.next_change_time {
            spans.push(Span::styled(
                format!("  next stage: {next}"),
                Style::default().fg(if st.mono { Color::Gray } else { Color::DarkGray }),
            ));
        }
    }
    spans.push(Span::raw(format!("  [{}]", st.activity.title())));

    let p = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Pet"));
    f.render_widget(p, area);
}

fn render_main(f: &mut Frame, area: Rect, st: &AppState) {
    if let Scene::Labyrinth(lab) = &st.scene {
        render_labyrinth(f, area, st, lab);
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(0)])
        .split(area);

    render_stats(f, cols[0], st);
    render_pet(f, cols[1], st);
}

fn render_stats(f: &mut Frame, area: Rect, st: &AppState) {
    let block = Block::default().borders(Borders::ALL).title("Needs");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(stats) = st.stats else {
        f.render_widget(
            Paragraph::new("No stats loaded yet (press r).").style(Style::default().fg(
                if st.mono { Color::White } else { Color::Yellow },
            )),
            inner,
        );
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

    let bars = [
        ("Hunger", stats.hunger),
        ("Joy", stats.happiness),
        ("Clean", stats.cleanliness),
        ("Energy", stats.energy),
    ];
    for (i, (name, v)) in bars.iter().enumerate() {
        let g = Gauge::default()
            .block(Block::default().title(*name))
            .gauge_style(Style::default().fg(stat_color(*v, st.mono)))
            .percent(v.clamp(0.0, 100.0) as u16)
            .label(format!("{v:.0}%"));
        f.render_widget(g, rows[i]);
    }

    if let Some(inv) = st.inventory {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Pantry",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("  tree seeds   {}", inv.tree_seed)),
            Line::from(format!("  blueberries  {}", inv.blueberries)),
            Line::from(format!("  mushrooms    {}", inv.mushroom)),
            Line::from(format!("  acorns       {}", inv.acorn)),
        ];
        f.render_widget(Paragraph::new(lines), rows[4]);
    }
}

fn render_pet(f: &mut Frame, area: Rect, st: &AppState) {
    let block = Block::default().borders(Borders::ALL).title("Burrow");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let stats = st.stats.unwrap_or_default();
    let stage = st
        .maturity
        .as_ref()
        .map(|m| m.stage)
        .unwrap_or(MaturityStage::Adult);
    let look = appearance(&stats, stage);
    let frames = look.frames();
    let frame = frames[st.anim_index(frames.len())];

    let mut lines: Vec<Line> = Vec::new();
    let pad = inner.height.saturating_sub(frame.lines().count() as u16 + 2) / 2;
    for _ in 0..pad {
        lines.push(Line::from(""));
    }
    for l in frame.lines() {
        lines.push(Line::from(Span::styled(
            l.to_string(),
            Style::default().fg(pet_color(st.pet, st.mono)),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        look.caption(),
        Style::default().fg(if st.mono { Color::White } else { Color::Gray }),
    )));

    let p = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(p, inner);
}

fn render_footer(f: &mut Frame, area: Rect, st: &AppState) {
    let mut spans = vec![
        Span::styled("f", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" feed  "),
        Span::styled("p", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" play  "),
        Span::styled("w", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" wash  "),
        Span::styled("s", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" sleep  "),
        Span::styled("b", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" shop  "),
        Span::styled("g", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" games  "),
        Span::styled("r", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" refresh  "),
        Span::styled("h", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" help  "),
        Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ];

    if let Some(t) = &st.toast {
        let color = if st.mono {
            Color::White
        } else if t.success {
            Color::Green
        } else {
            Color::Red
        };
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            t.text.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    let p = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Keys"));
    f.render_widget(p, area);
}

fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let w = width.min(r.width);
    let h = height.min(r.height);
    Rect {
        x: r.x + (r.width - w) / 2,
        y: r.y + (r.height - h) / 2,
        width: w,
        height: h,
    }
}

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
}

fn menu_lines<'a>(
    rows: Vec<(String, Option<String>)>,
    cursor: usize,
    mono: bool,
) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from("")];
    for (i, (text, blocked)) in rows.into_iter().enumerate() {
        let marker = if i == cursor { "▶ " } else { "  " };
        let mut style = Style::default();
        if i == cursor {
            style = style.add_modifier(Modifier::BOLD);
        }
        match blocked {
            Some(reason) => {
                lines.push(Line::from(vec![
                    Span::styled(format!("{marker}{}. {text}", i + 1), style.fg(Color::DarkGray)),
                    Span::styled(
                        format!("   {reason}"),
                        Style::default().fg(if mono { Color::Gray } else { Color::Red }),
                    ),
                ]));
            }
            None => {
                lines.push(Line::from(Span::styled(
                    format!("{marker}{}. {text}", i + 1),
                    style,
                )));
            }
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  ↑/↓ + Enter, digits, Esc to close",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn render_food_menu(f: &mut Frame, area: Rect, st: &AppState, cursor: usize) {
    let rows: Vec<(String, Option<String>)> = Food::ALL
        .iter()
        .map(|food| {
            let have = st
                .inventory
                .map(|inv| inv.food_count(*food))
                .unwrap_or(0);
            let text = format!(
                "{:<12} ×{:<3} +{} hunger",
                food.label(),
                have,
                food.restore()
            );
            let blocked = (have == 0).then(|| "none left".to_string());
            (text, blocked)
        })
        .collect();

    let rect = centered_rect(52, 10, area);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(menu_lines(rows, cursor, st.mono)).block(popup_block("Feed")),
        rect,
    );
}

fn render_play_menu(f: &mut Frame, area: Rect, st: &AppState, cursor: usize) {
    let rows: Vec<(String, Option<String>)> = PlayKind::ALL
        .iter()
        .map(|game| {
            (
                format!("{:<16} {}s", game.label(), PLAY_DURATION.as_secs()),
                None,
            )
        })
        .collect();

    let rect = centered_rect(48, 8, area);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(menu_lines(rows, cursor, st.mono)).block(popup_block("Play")),
        rect,
    );
}

fn render_wash_menu(f: &mut Frame, area: Rect, st: &AppState, cursor: usize) {
    let rows: Vec<(String, Option<String>)> = WashKind::ALL
        .iter()
        .map(|kind| {
            (
                format!(
                    "{:<12} +{:<3} clean, {}s",
                    kind.label(),
                    kind.restore(),
                    kind.duration().as_secs()
                ),
                None,
            )
        })
        .collect();

    let rect = centered_rect(48, 9, area);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(menu_lines(rows, cursor, st.mono)).block(popup_block("Wash")),
        rect,
    );
}

fn render_sleep_menu(f: &mut Frame, area: Rect, st: &AppState, cursor: usize) {
    let stats = st.stats.unwrap_or_default();
    let rows: Vec<(String, Option<String>)> = SleepKind::ALL
        .iter()
        .map(|kind| {
            let text = format!(
                "{:<12} {}",
                kind.label(),
                fmt_countdown(kind.duration().as_secs())
            );
            let blocked = check_action(&stats, ActionCheck::Sleep(*kind)).err();
            (text, blocked)
        })
        .collect();

    let rect = centered_rect(58, 8, area);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(menu_lines(rows, cursor, st.mono)).block(popup_block("Sleep")),
        rect,
    );
}

fn render_game_menu(f: &mut Frame, area: Rect, st: &AppState, cursor: usize) {
    let rows: Vec<(String, Option<String>)> = Game::ALL
        .iter()
        .map(|g| (g.label().to_string(), None))
        .collect();

    let rect = centered_rect(44, 8, area);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(menu_lines(rows, cursor, st.mono)).block(popup_block("Minigames")),
        rect,
    );
}

fn render_shop(f: &mut Frame, area: Rect, st: &AppState) {
    let Scene::Shop(shop) = &st.scene else {
        return;
    };
    let coins = st.inventory.map(|i| i.coins).unwrap_or(0);

    let mut lines = vec![Line::from("")];
    for (i, food) in Food::ALL.iter().enumerate() {
        let marker = if i == shop.cursor { "▶ " } else { "  " };
        let qty = shop.qty[i];
        let total = qty * food.price();
        let affordable = crate::shop::affordability(coins, *food) > 0;
        let owned = st
            .inventory
            .map(|inv| inv.food_count(*food))
            .unwrap_or(0);

        let mut style = Style::default();
        if i == shop.cursor {
            style = style.add_modifier(Modifier::BOLD);
        }
        if !affordable {
            style = style.fg(Color::DarkGray);
        }
        lines.push(Line::from(Span::styled(
            format!(
                "{marker}{:<12} {:>2}c   owned {:<3}  ◀ {:>2} ▶  = {:>3}c",
                food.label(),
                food.price(),
                owned,
                qty,
                total
            ),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  ←/→ quantity, Enter buy, Esc leave",
        Style::default().fg(Color::DarkGray),
    )));

    let rect = centered_rect(58, 11, area);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines).block(popup_block(&format!("Shop ({coins} coins)"))),
        rect,
    );
}

fn render_higher_lower(f: &mut Frame, area: Rect, st: &AppState, hl: &HigherLowerState) {
    let mut lines = vec![
        Line::from(""),
        Line::from(format!("The base number is {BASE_NUMBER}.")),
        Line::from("Will the next roll (0–20) be higher or lower?"),
        Line::from(""),
    ];

    match hl {
        HigherLowerState::Choosing { pick } => {
            for g in [Guess::Higher, Guess::Lower] {
                let marker = if *pick == g { "▶ " } else { "  " };
                let mut style = Style::default();
                if *pick == g {
                    style = style.add_modifier(Modifier::BOLD);
                }
                lines.push(Line::from(Span::styled(
                    format!("{marker}{}", g.label()),
                    style,
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  ↑/↓ pick, Enter guess, Esc leave",
                Style::default().fg(Color::DarkGray),
            )));
        }
        HigherLowerState::Waiting { pick } => {
            lines.push(Line::from(format!("Guessing {}…", pick.label())));
        }
        HigherLowerState::Done {
            pick,
            rolled,
            correct,
            message,
        } => {
            lines.push(Line::from(format!(
                "You guessed {}. The roll was {rolled}.",
                pick.label()
            )));
            let (verdict, color) = if *correct {
                ("Correct!", Color::Green)
            } else {
                ("Wrong!", Color::Red)
            };
            lines.push(Line::from(Span::styled(
                verdict,
                Style::default()
                    .fg(if st.mono { Color::White } else { color })
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(message.clone()));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  Enter to play again, Esc to leave",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let rect = centered_rect(54, 13, area);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines).block(popup_block("Higher or lower")),
        rect,
    );
}

fn render_labyrinth(f: &mut Frame, area: Rect, st: &AppState, lab: &LabyrinthState) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        "Labyrinth: {} to collect, then find the exit",
        lab.remaining_count()
    ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let wall_style = Style::default().fg(if st.mono {
        Color::Gray
    } else {
        Color::DarkGray
    });

    let mut lines: Vec<Line> = Vec::new();
    for y in 0..lab.maze.h {
        let mut spans: Vec<Span> = Vec::new();
        for x in 0..lab.maze.w {
            // each maze cell is two characters wide to square the aspect
            if (x, y) == lab.player {
                spans.push(Span::styled(
                    "@ ",
                    Style::default()
                        .fg(pet_color(st.pet, st.mono))
                        .add_modifier(Modifier::BOLD),
                ));
            } else if (x, y) == lab.exit {
                spans.push(Span::styled(
                    "E ",
                    Style::default().fg(if st.mono { Color::White } else { Color::Green }),
                ));
            } else if let Some(c) = lab
                .collectibles
                .iter()
                .find(|c| !c.taken && c.pos == (x, y))
            {
                let (ch, color) = match c.item {
                    Item::Blueberry => ("b ", Color::Blue),
                    Item::Acorn => ("a ", Color::Yellow),
                };
                spans.push(Span::styled(
                    ch,
                    Style::default().fg(if st.mono { Color::White } else { color }),
                ));
            } else if lab.maze.is_wall(x, y) {
                spans.push(Span::styled("██", wall_style));
            } else {
                spans.push(Span::raw("  "));
            }
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    let (blueberry, acorn) = lab.collected_counts();
    lines.push(Line::from(Span::styled(
        format!("collected: {blueberry} blueberries, {acorn} acorns   arrows move, Esc gives up"),
        Style::default().fg(Color::DarkGray),
    )));

    let p = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(p, inner);
}

fn render_help(f: &mut Frame, area: Rect, st: &AppState) {
    let mut lines = vec![
        Line::from(""),
        Line::from("Keep the four needs up; the server drains them over time."),
        Line::from(""),
        Line::from("  f feed    pick a food (blocked over 80% hunger)"),
        Line::from("  p play    ball or wheel (blocked over 89% joy)"),
        Line::from("  w wash    hands, shower or bath (blocked over 85% clean)"),
        Line::from("  s sleep   nap ≤50% energy, full sleep ≤30%"),
        Line::from("  b shop    spend coins on food"),
        Line::from("  g games   minigames need at least 40% joy"),
        Line::from("  r refresh pull fresh stats from the server"),
        Line::from(""),
        Line::from("Actions run on a timer; the pet is busy until it ends."),
    ];
    if st.debug_keys {
        lines.push(Line::from(""));
        lines.push(Line::from("  F2/F3 drain hunger/energy   F6/F7 stage up/down"));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Esc or h to close",
        Style::default().fg(Color::DarkGray),
    )));

    let rect = centered_rect(64, 18, area);
    f.render_widget(Clear, rect);
    f.render_widget(Paragraph::new(lines).block(popup_block("Help")), rect);
}

fn render_overlay(f: &mut Frame, area: Rect, st: &AppState, now: Instant) {
    let Some(overlay) = st.activity.overlay() else {
        return;
    };

    let rect = centered_rect(46, 7, area);
    f.render_widget(Clear, rect);

    let block = popup_block(st.activity.title());
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(format!(
            "{} left",
            fmt_countdown(overlay.countdown_secs(now))
        ))
        .alignment(Alignment::Center),
        rows[0],
    );

    let g = Gauge::default()
        .gauge_style(Style::default().fg(if st.mono { Color::Gray } else { Color::Cyan }))
        .percent(overlay.progress_pct(now))
        .label(format!("{}%", overlay.progress_pct(now)));
    f.render_widget(g, rows[1]);
}

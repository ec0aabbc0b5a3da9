use ratatui::{
    layout::{Constraint, Layout, Position},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};
use std::time::Instant;

use crate::{
    classify::Bucket,
    controller::{BucketFilter, Controller, DiscoveryMode},
};

const HELP: &str = "/ search  esc clear  0-3 bucket  ^r discover  s shuffle  enter open  q quit";

pub fn draw(frame: &mut Frame, controller: &Controller, now: Instant) {
    let [search_area, tabs_area, list_area, suggest_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    // search field
    let focused = controller.is_focused();
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let query = controller.query();
    let input = if query.is_empty() {
        Line::from(Span::styled("Search", Style::default().fg(Color::DarkGray)))
    } else if controller.is_selected_all() {
        Line::from(Span::styled(
            query,
            Style::default().add_modifier(Modifier::REVERSED),
        ))
    } else {
        Line::from(query)
    };

    frame.render_widget(
        Paragraph::new(input).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" rsrch "),
        ),
        search_area,
    );

    if focused {
        let x = search_area.x + 1 + query.chars().count() as u16;
        frame.set_cursor_position(Position::new(
            x.min(search_area.right().saturating_sub(2)),
            search_area.y + 1,
        ));
    }

    // bucket tabs
    let buckets = controller.buckets();
    let mut titles = vec![format!("0 all ({})", buckets.len())];
    for (idx, (bucket, count)) in buckets.counts().into_iter().enumerate() {
        titles.push(format!("{} {bucket} ({count})", idx + 1));
    }

    let selected_tab = match controller.active_bucket() {
        BucketFilter::All => 0,
        BucketFilter::Only(bucket) => {
            1 + Bucket::ALL
                .iter()
                .position(|b| *b == bucket)
                .unwrap_or_default()
        }
    };

    frame.render_widget(
        Tabs::new(titles)
            .select(selected_tab)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        tabs_area,
    );

    // entries
    let items = controller
        .visible()
        .iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    entry.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(entry.display_date(), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect::<Vec<_>>();

    let list_title = match controller.discovery() {
        DiscoveryMode::Off => " results ",
        DiscoveryMode::Random => " discover ",
    };

    let mut state = ListState::default().with_selected(Some(controller.selected()));
    frame.render_stateful_widget(
        List::new(items)
            .block(Block::default().borders(Borders::TOP).title(list_title))
            .highlight_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::REVERSED)),
        list_area,
        &mut state,
    );

    // suggestions
    let suggestions = controller.suggestions(now);
    if !suggestions.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("try: ", Style::default().fg(Color::DarkGray)),
                Span::raw(suggestions.join(" · ")),
            ])),
            suggest_area,
        );
    }

    // status
    let status = if controller.is_loading() {
        Span::styled("loading…", Style::default().fg(Color::Cyan))
    } else if let Some(status) = controller.status() {
        Span::styled(status.to_string(), Style::default().fg(Color::Red))
    } else {
        Span::styled(
            format!(
                "{}/{} entries  {HELP}",
                controller.visible().len(),
                controller.corpus().len()
            ),
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(Line::from(status)), status_area);
}

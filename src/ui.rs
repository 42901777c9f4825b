use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use crate::app::{App, CountryDetails, Fetch, Screen};
use crate::country::{Country, format_population};
use crate::picker::filtered_indices;

pub fn draw_ui(frame: &mut ratatui::Frame, app: &App) {
    // Header, the active screen, then controls.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(5),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app);
    match app.screen {
        Screen::Browse => draw_browse(frame, chunks[1], app),
        Screen::Details => draw_details(frame, chunks[1], app),
        Screen::Favorites => draw_favorites(frame, chunks[1], app),
    }
    draw_help(frame, chunks[2], app);

    if app.picker.is_some() {
        draw_picker(frame, app);
    }
    if app.sign_in.is_some() {
        draw_sign_in(frame, app);
    }
}

fn bold(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().add_modifier(Modifier::BOLD))
}

fn highlight() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn draw_header(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let user = match app.user() {
        Some(user) => Span::styled(user, Style::default().fg(Color::Green)),
        None => Span::styled("guest", Style::default().fg(Color::DarkGray)),
    };
    let title = Line::from(vec![
        bold("World Explorer"),
        Span::raw("  |  "),
        user,
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::White));

    frame.render_widget(block, area);
}

fn draw_browse(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);
    let filters = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(rows[0]);

    let mut search = app.search.clone();
    search.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title("Search")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(&search, filters[0]);

    let criteria = app.filter.criteria();
    let region = Paragraph::new(criteria.region.as_label())
        .block(Block::default().borders(Borders::ALL).title("Region (Ctrl+r)"));
    frame.render_widget(region, filters[1]);
    let language = Paragraph::new(criteria.language.as_label())
        .block(Block::default().borders(Borders::ALL).title("Language (Ctrl+t)"));
    frame.render_widget(language, filters[2]);

    let title = format!(
        "Countries ({}/{})",
        app.filter.visible_len(),
        app.filter.countries().len()
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    match &app.list {
        Fetch::Loading => {
            draw_message(frame, rows[1], block, "Loading countries...", Color::Yellow);
        }
        Fetch::Failed(message) => {
            let text = format!("{message}  (Ctrl+e to retry)");
            draw_message(frame, rows[1], block, &text, Color::Red);
        }
        Fetch::Ready(()) if app.filter.visible_len() == 0 => {
            draw_message(
                frame,
                rows[1],
                block,
                "No countries found. Try adjusting your search or filters.",
                Color::DarkGray,
            );
        }
        Fetch::Ready(()) => {
            let items: Vec<ListItem> = app
                .filter
                .visible()
                .map(|country| country_item(country, app.is_favorite(&country.code)))
                .collect();
            draw_list(frame, rows[1], block, items, app.selected);
        }
    }
}

fn country_item(country: &Country, favorite: bool) -> ListItem<'_> {
    let marker = if favorite {
        Span::styled("* ", Style::default().fg(Color::Red))
    } else {
        Span::raw("  ")
    };
    ListItem::new(Line::from(vec![
        marker,
        bold(country.common_name()),
        Span::raw(format!(
            "  {}  pop. {}  capital {}",
            country.region.as_deref().unwrap_or("-"),
            format_population(country.population),
            country.capital()
        )),
    ]))
}

fn draw_list(frame: &mut ratatui::Frame, area: Rect, block: Block, items: Vec<ListItem>, selected: usize) {
    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(selected.min(items.len() - 1)));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight())
        .highlight_symbol(">> ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_message(frame: &mut ratatui::Frame, area: Rect, block: Block, message: &str, color: Color) {
    let paragraph = Paragraph::new(Span::styled(message, Style::default().fg(color)))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_details(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let Some(details) = &app.details else {
        return;
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(details.code.as_str())
        .border_style(Style::default().fg(Color::Cyan));

    let data = match &details.data {
        Fetch::Loading => {
            draw_message(frame, area, block, "Loading country...", Color::Yellow);
            return;
        }
        Fetch::Failed(message) => {
            draw_message(frame, area, block, message, Color::Red);
            return;
        }
        Fetch::Ready(data) => data,
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let favorite = app.is_favorite(&data.country.code);
    let title = format!("{} ({})", data.country.common_name(), details.code);
    let facts = Paragraph::new(detail_lines(data, favorite))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(facts, columns[0]);

    let borders_block = Block::default().borders(Borders::ALL).title("Border countries");
    if data.borders.is_empty() {
        draw_message(frame, columns[1], borders_block, "None", Color::DarkGray);
    } else {
        let items: Vec<ListItem> = data
            .borders
            .iter()
            .map(|border| ListItem::new(border.common_name()))
            .collect();
        draw_list(frame, columns[1], borders_block, items, details.selected_border);
    }
}

fn detail_lines(data: &CountryDetails, favorite: bool) -> Vec<Line<'_>> {
    let country = &data.country;
    let field = |label: &'static str, value: String| {
        Line::from(vec![bold(label), Span::raw(value)])
    };
    let mut lines = vec![
        field("Official name: ", country.name.official.clone()),
        field(
            "Native name: ",
            country.native_name().unwrap_or("N/A").to_string(),
        ),
        field("Population: ", format_population(country.population)),
        field(
            "Region: ",
            country.region.clone().unwrap_or_else(|| "N/A".to_string()),
        ),
        field(
            "Sub region: ",
            country.subregion.clone().unwrap_or_else(|| "N/A".to_string()),
        ),
        field("Capital: ", country.capital().to_string()),
        field("Top level domain: ", country.tld().to_string()),
        field("Currencies: ", country.currency_names()),
        field("Languages: ", country.language_names().join(", ")),
    ];
    if let Some(flag) = country.flag() {
        lines.push(field("Flag: ", flag.to_string()));
    }
    if favorite {
        lines.push(Line::from(Span::styled(
            "* In your favorites",
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn draw_favorites(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Your favorite countries");
    if app.session.is_none() {
        draw_message(
            frame,
            area,
            block,
            "Authentication Required. Sign in with Ctrl+l to view your favorites.",
            Color::DarkGray,
        );
        return;
    }
    match &app.favorites {
        Fetch::Loading => draw_message(frame, area, block, "Loading favorites...", Color::Yellow),
        Fetch::Failed(message) => draw_message(frame, area, block, message, Color::Red),
        Fetch::Ready(countries) if countries.is_empty() => draw_message(
            frame,
            area,
            block,
            "No favorites yet. Press Ctrl+f on a country to add it.",
            Color::DarkGray,
        ),
        Fetch::Ready(countries) => {
            let items = countries
                .iter()
                .map(|country| country_item(country, true))
                .collect();
            draw_list(frame, area, block, items, app.favorites_selected);
        }
    }
}

fn draw_help(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let keys: &[(&str, &str)] = match app.screen {
        Screen::Browse => &[
            ("Enter", " details  "),
            ("Ctrl+f", " favorite  "),
            ("Ctrl+v", " favorites  "),
            ("Esc", " clear search"),
        ],
        Screen::Details => &[
            ("Up/Down", " borders  "),
            ("Enter", " open border  "),
            ("Ctrl+f", " favorite  "),
            ("Esc", " back"),
        ],
        Screen::Favorites => &[
            ("Enter", " details  "),
            ("Ctrl+f", " remove  "),
            ("Esc", " back"),
        ],
    };
    let mut first: Vec<Span> = Vec::new();
    for (key, label) in keys {
        first.push(bold(key));
        first.push(Span::raw(*label));
    }
    let account = if app.session.is_some() {
        "  sign out  "
    } else {
        "  sign in  "
    };

    let status = match (&app.status, app.session.as_ref().and_then(|s| s.last_error())) {
        (Some(message), _) => Span::styled(message.as_str(), Style::default().fg(Color::Red)),
        (None, Some(message)) => Span::styled(message, Style::default().fg(Color::Red)),
        (None, None) if app.list == Fetch::Loading => {
            Span::styled("loading...", Style::default().fg(Color::Yellow))
        }
        (None, None) => Span::styled("ready", Style::default().fg(Color::Green)),
    };

    let lines = vec![
        Line::from(first),
        Line::from(vec![
            bold("Ctrl+l"),
            Span::raw(account),
            bold("Ctrl+c"),
            Span::raw("  quit"),
        ]),
        Line::from(vec![bold("Status"), Span::raw("  "), status]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Controls"))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn draw_picker(frame: &mut ratatui::Frame, app: &App) {
    let Some(picker) = &app.picker else {
        return;
    };
    let area = centered_rect(50, 60, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(picker.kind.title())
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(block, area);

    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(inner);

    let query = Paragraph::new(Line::from(vec![
        bold("Search: "),
        Span::raw(picker.query.as_str()),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .wrap(Wrap { trim: true });
    frame.render_widget(query, rows[0]);

    let options = app.picker_options();
    let items: Vec<ListItem> = filtered_indices(&options, &picker.query)
        .into_iter()
        .map(|index| ListItem::new(options[index].clone()))
        .collect();
    draw_list(frame, rows[1], Block::default(), items, picker.selected);

    let footer = Paragraph::new(Line::from(vec![
        bold("Enter"),
        Span::raw(" select  "),
        bold("Esc"),
        Span::raw(" cancel  "),
        bold("Up/Down"),
        Span::raw(" navigate"),
    ]))
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, rows[2]);
}

fn draw_sign_in(frame: &mut ratatui::Frame, app: &App) {
    let Some(prompt) = &app.sign_in else {
        return;
    };
    let area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let mut input = prompt.clone();
    input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title("Sign in")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(&input, rows[0]);

    let hint = Paragraph::new(Line::from(vec![
        bold("Enter"),
        Span::raw(" sign in  "),
        bold("Ctrl+n"),
        Span::raw(" create account  "),
        bold("Esc"),
        Span::raw(" cancel"),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .wrap(Wrap { trim: true });
    frame.render_widget(hint, rows[1]);
}

/// Popup area taking the given share of `area`, centered on both axes.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    popup
}

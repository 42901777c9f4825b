use std::io::Stdout;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{error, info, warn};
use tui_textarea::TextArea;

use crate::api::{CountrySource, RestCountriesApi};
use crate::config::Config;
use crate::country::{Country, REGIONS};
use crate::error::{Error, Result};
use crate::filter::{ALL, CountryFilter, Selection};
use crate::picker::{Picker, PickerKind};
use crate::session::{FavoritesStore, JsonFileStore, Session};
use crate::textarea::{edit_single_line, single_line, textarea_text};
use crate::ui::draw_ui;

pub const LIST_ERROR: &str = "Failed to load countries. Please try again later.";
pub const DETAILS_ERROR: &str = "Failed to load country details.";
pub const NOT_FOUND: &str = "Country not found";
pub const FAVORITES_LOAD_ERROR: &str = "Failed to load favorite countries. Please try again later.";
pub const SIGN_IN_FIRST: &str = "Sign in to save favorites.";

const PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Browse,
    Details,
    Favorites,
}

/// Progress of a remote load.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Loading,
    Ready(T),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    None,
    Quit,
    ReloadCountries,
    OpenDetails(String),
    OpenFavorites,
    ToggleFavorite(String),
    SignIn(String),
    Register(String),
    SignOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryDetails {
    pub country: Country,
    pub borders: Vec<Country>,
}

pub struct DetailsView {
    pub code: String,
    pub data: Fetch<CountryDetails>,
    pub selected_border: usize,
    // Where Esc goes back to.
    pub origin: Screen,
}

pub struct App {
    pub screen: Screen,
    pub filter: CountryFilter,
    pub list: Fetch<()>,
    pub search: TextArea<'static>,
    pub selected: usize,
    pub picker: Option<Picker>,
    // Open while the user types a name to sign in with.
    pub sign_in: Option<TextArea<'static>>,
    pub session: Option<Session>,
    pub details: Option<DetailsView>,
    pub favorites: Fetch<Vec<Country>>,
    pub favorites_selected: usize,
    pub status: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            screen: Screen::Browse,
            filter: CountryFilter::default(),
            list: Fetch::Loading,
            search: single_line("Search for a country..."),
            selected: 0,
            picker: None,
            sign_in: None,
            session: None,
            details: None,
            favorites: Fetch::Ready(Vec::new()),
            favorites_selected: 0,
            status: None,
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.session.as_ref().map(Session::user)
    }

    pub fn is_favorite(&self, code: &str) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.is_favorite(code))
    }

    pub fn selected_country(&self) -> Option<&Country> {
        self.filter.visible_at(self.selected)
    }

    pub fn picker_options(&self) -> Vec<String> {
        match &self.picker {
            Some(picker) => options_for(picker.kind, &self.filter),
            None => Vec::new(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if key.kind != KeyEventKind::Press {
            return AppAction::None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return AppAction::Quit;
        }
        if self.sign_in.is_some() {
            return self.handle_sign_in_key(key);
        }
        if self.picker.is_some() {
            self.handle_picker_key(key);
            return AppAction::None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('l') => return self.toggle_sign_in(),
                KeyCode::Char('v') => return self.open_favorites(),
                _ => {}
            }
        }
        match self.screen {
            Screen::Browse => self.handle_browse_key(key),
            Screen::Details => self.handle_details_key(key),
            Screen::Favorites => self.handle_favorites_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> AppAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('r') if ctrl => {
                self.picker = Some(Picker::new(PickerKind::Region));
                AppAction::None
            }
            KeyCode::Char('t') if ctrl => {
                self.picker = Some(Picker::new(PickerKind::Language));
                AppAction::None
            }
            KeyCode::Char('e') if ctrl => {
                self.list = Fetch::Loading;
                AppAction::ReloadCountries
            }
            KeyCode::Char('f') if ctrl => match self.selected_country() {
                Some(country) => {
                    let code = country.code.clone();
                    self.favorite_action(code)
                }
                None => AppAction::None,
            },
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                AppAction::None
            }
            KeyCode::Down => {
                self.selected = step_down(self.selected, 1, self.filter.visible_len());
                AppAction::None
            }
            KeyCode::PageUp => {
                self.selected = self.selected.saturating_sub(PAGE);
                AppAction::None
            }
            KeyCode::PageDown => {
                self.selected = step_down(self.selected, PAGE, self.filter.visible_len());
                AppAction::None
            }
            KeyCode::Enter => match self.selected_country() {
                Some(country) => {
                    let code = country.code.clone();
                    self.open_details(code, Screen::Browse)
                }
                None => AppAction::None,
            },
            KeyCode::Esc => {
                self.search = single_line("Search for a country...");
                self.apply_search();
                AppAction::None
            }
            _ if ctrl => AppAction::None,
            _ => {
                if edit_single_line(&mut self.search, key) {
                    self.apply_search();
                }
                AppAction::None
            }
        }
    }

    fn handle_details_key(&mut self, key: KeyEvent) -> AppAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let Some(details) = self.details.as_mut() else {
            self.screen = Screen::Browse;
            return AppAction::None;
        };
        let border_count = match &details.data {
            Fetch::Ready(data) => data.borders.len(),
            _ => 0,
        };
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => {
                self.screen = details.origin;
                AppAction::None
            }
            KeyCode::Char('f') if ctrl => {
                let code = details.code.clone();
                self.favorite_action(code)
            }
            KeyCode::Up => {
                details.selected_border = details.selected_border.saturating_sub(1);
                AppAction::None
            }
            KeyCode::Down => {
                details.selected_border = step_down(details.selected_border, 1, border_count);
                AppAction::None
            }
            KeyCode::Enter => {
                let origin = details.origin;
                let border = match &details.data {
                    Fetch::Ready(data) => data
                        .borders
                        .get(details.selected_border)
                        .map(|border| border.code.clone()),
                    _ => None,
                };
                match border {
                    Some(code) => self.open_details(code, origin),
                    None => AppAction::None,
                }
            }
            _ => AppAction::None,
        }
    }

    fn handle_favorites_key(&mut self, key: KeyEvent) -> AppAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let count = match &self.favorites {
            Fetch::Ready(countries) => countries.len(),
            _ => 0,
        };
        let current = match &self.favorites {
            Fetch::Ready(countries) => countries
                .get(self.favorites_selected)
                .map(|country| country.code.clone()),
            _ => None,
        };
        match key.code {
            KeyCode::Esc => {
                self.screen = Screen::Browse;
                AppAction::None
            }
            KeyCode::Up => {
                self.favorites_selected = self.favorites_selected.saturating_sub(1);
                AppAction::None
            }
            KeyCode::Down => {
                self.favorites_selected = step_down(self.favorites_selected, 1, count);
                AppAction::None
            }
            KeyCode::Enter => match current {
                Some(code) => self.open_details(code, Screen::Favorites),
                None => AppAction::None,
            },
            KeyCode::Char('f') if ctrl => match current {
                Some(code) => self.favorite_action(code),
                None => AppAction::None,
            },
            _ => AppAction::None,
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let Some(kind) = self.picker.as_ref().map(|picker| picker.kind) else {
            return;
        };
        let options = options_for(kind, &self.filter);
        let Some(picker) = self.picker.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.picker = None,
            KeyCode::Enter => {
                let choice = picker.current(&options).map(Selection::from_label);
                self.picker = None;
                if let Some(choice) = choice {
                    match kind {
                        PickerKind::Region => self.filter.set_region(choice),
                        PickerKind::Language => self.filter.set_language(choice),
                    }
                    self.selected = 0;
                }
            }
            KeyCode::Up => picker.up(),
            KeyCode::Down => picker.down(&options),
            KeyCode::Backspace => picker.pop(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => picker.push(c),
            _ => {}
        }
    }

    fn handle_sign_in_key(&mut self, key: KeyEvent) -> AppAction {
        let Some(prompt) = self.sign_in.as_mut() else {
            return AppAction::None;
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.sign_in = None;
                AppAction::None
            }
            KeyCode::Enter => {
                let name = textarea_text(prompt).trim().to_string();
                self.sign_in = None;
                AppAction::SignIn(name)
            }
            KeyCode::Char('n') if ctrl => {
                let name = textarea_text(prompt).trim().to_string();
                self.sign_in = None;
                AppAction::Register(name)
            }
            _ if ctrl => AppAction::None,
            _ => {
                edit_single_line(prompt, key);
                AppAction::None
            }
        }
    }

    fn toggle_sign_in(&mut self) -> AppAction {
        if self.session.is_some() {
            return AppAction::SignOut;
        }
        self.sign_in = Some(single_line("user name"));
        AppAction::None
    }

    fn open_favorites(&mut self) -> AppAction {
        self.screen = Screen::Favorites;
        self.favorites_selected = 0;
        if self.session.is_none() {
            self.favorites = Fetch::Ready(Vec::new());
            return AppAction::None;
        }
        self.favorites = Fetch::Loading;
        AppAction::OpenFavorites
    }

    fn open_details(&mut self, code: String, origin: Screen) -> AppAction {
        self.screen = Screen::Details;
        self.details = Some(DetailsView {
            code: code.clone(),
            data: Fetch::Loading,
            selected_border: 0,
            origin,
        });
        AppAction::OpenDetails(code)
    }

    fn favorite_action(&mut self, code: String) -> AppAction {
        if self.session.is_none() {
            self.status = Some(SIGN_IN_FIRST.to_string());
            return AppAction::None;
        }
        AppAction::ToggleFavorite(code)
    }

    fn apply_search(&mut self) {
        self.filter.set_search_term(textarea_text(&self.search));
        self.selected = 0;
    }

    /// Performs the I/O an action asks for. `Quit` is the caller's business.
    pub fn dispatch(
        &mut self,
        action: AppAction,
        source: &dyn CountrySource,
        store: &dyn FavoritesStore,
    ) {
        match action {
            AppAction::None | AppAction::Quit => {}
            AppAction::ReloadCountries => self.load_countries(source),
            AppAction::OpenDetails(code) => self.load_details(&code, source),
            AppAction::OpenFavorites => self.load_favorites(source),
            AppAction::ToggleFavorite(code) => self.toggle_favorite(&code, store),
            AppAction::SignIn(name) => {
                let result = Session::sign_in(&name, store);
                self.start_session(result);
            }
            AppAction::Register(name) => {
                let result = Session::register(&name, store);
                self.start_session(result);
            }
            AppAction::SignOut => {
                if let Some(session) = self.session.take() {
                    session.sign_out();
                }
                self.favorites = Fetch::Ready(Vec::new());
                self.favorites_selected = 0;
                self.status = None;
            }
        }
    }

    pub fn load_countries(&mut self, source: &dyn CountrySource) {
        match source.all() {
            Ok(countries) => {
                info!(count = countries.len(), "loaded countries");
                self.filter.set_countries(countries);
                self.selected = self
                    .selected
                    .min(self.filter.visible_len().saturating_sub(1));
                self.list = Fetch::Ready(());
            }
            Err(err) => {
                error!(error = %err, "error fetching countries");
                self.list = Fetch::Failed(LIST_ERROR.to_string());
            }
        }
    }

    fn load_details(&mut self, code: &str, source: &dyn CountrySource) {
        let result = source.by_code(code).and_then(|country| {
            let borders = source.by_codes(&country.borders)?;
            Ok(CountryDetails { country, borders })
        });
        let data = match result {
            Ok(details) => Fetch::Ready(details),
            Err(Error::NotFound(_)) => {
                warn!(code, "country not found");
                Fetch::Failed(NOT_FOUND.to_string())
            }
            Err(err) => {
                error!(code, error = %err, "error fetching country");
                Fetch::Failed(DETAILS_ERROR.to_string())
            }
        };
        if let Some(details) = self.details.as_mut().filter(|details| details.code == code) {
            details.data = data;
        }
    }

    fn load_favorites(&mut self, source: &dyn CountrySource) {
        let Some(session) = &self.session else {
            self.favorites = Fetch::Ready(Vec::new());
            return;
        };
        self.favorites = match source.by_codes(session.favorites()) {
            Ok(countries) => Fetch::Ready(countries),
            Err(err) => {
                error!(error = %err, "error fetching favorite countries");
                Fetch::Failed(FAVORITES_LOAD_ERROR.to_string())
            }
        };
    }

    fn toggle_favorite(&mut self, code: &str, store: &dyn FavoritesStore) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.toggle_favorite(code, store);
        self.status = session.last_error().map(str::to_string);
        if let Fetch::Ready(countries) = &mut self.favorites {
            countries.retain(|country| session.is_favorite(&country.code));
            self.favorites_selected = self
                .favorites_selected
                .min(countries.len().saturating_sub(1));
        }
    }

    fn start_session(&mut self, result: Result<Session>) {
        match result {
            Ok(session) => {
                self.status = None;
                self.session = Some(session);
                if self.screen == Screen::Favorites {
                    self.favorites = Fetch::Loading;
                }
            }
            Err(err) => {
                warn!(error = %err, "sign-in failed");
                self.status = Some(err.to_string());
            }
        }
    }
}

fn step_down(current: usize, by: usize, len: usize) -> usize {
    (current + by).min(len.saturating_sub(1))
}

fn options_for(kind: PickerKind, filter: &CountryFilter) -> Vec<String> {
    match kind {
        PickerKind::Region => std::iter::once(ALL)
            .chain(REGIONS.iter().copied())
            .map(str::to_string)
            .collect(),
        PickerKind::Language => filter.languages().to_vec(),
    }
}

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, config: &Config) -> Result<()> {
    let api = RestCountriesApi::new(config)?;
    let store = JsonFileStore::new(&config.data_dir);
    let mut app = App::new();
    if let Some(user) = &config.user {
        app.dispatch(AppAction::SignIn(user.clone()), &api, &store);
    }
    let poll_rate = Duration::from_millis(100);
    let mut pending = AppAction::ReloadCountries;

    loop {
        // Draw before any blocking request so loading states are visible.
        terminal.draw(|frame| draw_ui(frame, &app))?;

        match std::mem::replace(&mut pending, AppAction::None) {
            AppAction::Quit => return Ok(()),
            AppAction::None => {}
            action => {
                app.dispatch(action, &api, &store);
                // Signing in while on the favorites screen needs a fetch.
                if app.screen == Screen::Favorites && app.favorites == Fetch::Loading {
                    pending = AppAction::OpenFavorites;
                }
                continue;
            }
        }

        if event::poll(poll_rate)? {
            if let Event::Key(key) = event::read()? {
                pending = app.handle_key(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::BTreeMap;

    use super::*;
    use crate::country::CountryName;
    use crate::session::tests::MemoryStore;

    fn country(code: &str, name: &str, region: &str, languages: &[&str], borders: &[&str]) -> Country {
        Country {
            code: code.to_string(),
            name: CountryName {
                common: name.to_string(),
                ..CountryName::default()
            },
            region: Some(region.to_string()),
            languages: Some(
                languages
                    .iter()
                    .enumerate()
                    .map(|(index, name)| (format!("l{index}"), name.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            borders: borders.iter().map(|code| code.to_string()).collect(),
            ..Country::default()
        }
    }

    struct FakeSource {
        countries: Vec<Country>,
        fail: Cell<bool>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                countries: vec![
                    country("CAN", "Canada", "Americas", &["English", "French"], &["USA"]),
                    country("USA", "United States", "Americas", &["English"], &["CAN"]),
                    country("JPN", "Japan", "Asia", &["Japanese"], &[]),
                    country("FRA", "France", "Europe", &["French"], &[]),
                ],
                fail: Cell::new(false),
            }
        }

        fn check(&self) -> Result<()> {
            if self.fail.get() {
                return Err(Error::Decode("boom".to_string()));
            }
            Ok(())
        }
    }

    impl CountrySource for FakeSource {
        fn all(&self) -> Result<Vec<Country>> {
            self.check()?;
            Ok(self.countries.clone())
        }

        fn by_code(&self, code: &str) -> Result<Country> {
            self.check()?;
            self.countries
                .iter()
                .find(|country| country.code == code)
                .cloned()
                .ok_or_else(|| Error::NotFound(code.to_string()))
        }

        fn by_codes(&self, codes: &[String]) -> Result<Vec<Country>> {
            self.check()?;
            Ok(self
                .countries
                .iter()
                .filter(|country| codes.contains(&country.code))
                .cloned()
                .collect())
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) -> AppAction {
        let mut last = AppAction::None;
        for c in text.chars() {
            last = app.handle_key(press(KeyCode::Char(c)));
        }
        last
    }

    fn loaded_app(source: &FakeSource) -> App {
        let mut app = App::new();
        app.load_countries(source);
        app
    }

    fn visible_names(app: &App) -> Vec<&str> {
        app.filter.visible().map(Country::common_name).collect()
    }

    #[test]
    fn ctrl_c_requests_quit() {
        let mut app = App::new();
        assert_eq!(app.handle_key(ctrl('c')), AppAction::Quit);
    }

    #[test]
    fn loading_fills_the_list() {
        let source = FakeSource::new();
        let app = loaded_app(&source);
        assert_eq!(app.list, Fetch::Ready(()));
        assert_eq!(app.filter.visible_len(), 4);
        assert_eq!(app.filter.languages(), ["All", "English", "French", "Japanese"]);
    }

    #[test]
    fn failed_load_can_be_retried() {
        let source = FakeSource::new();
        source.fail.set(true);
        let mut app = loaded_app(&source);
        assert_eq!(app.list, Fetch::Failed(LIST_ERROR.to_string()));

        source.fail.set(false);
        let action = app.handle_key(ctrl('e'));
        assert_eq!(action, AppAction::ReloadCountries);
        assert_eq!(app.list, Fetch::Loading);
        app.dispatch(action, &source, &MemoryStore::default());
        assert_eq!(app.list, Fetch::Ready(()));
    }

    #[test]
    fn typing_filters_immediately() {
        let source = FakeSource::new();
        let mut app = loaded_app(&source);
        type_text(&mut app, "CAN");
        assert_eq!(visible_names(&app), vec!["Canada"]);
        app.handle_key(press(KeyCode::Backspace));
        app.handle_key(press(KeyCode::Backspace));
        assert_eq!(visible_names(&app), vec!["Canada", "France"]);
        app.handle_key(press(KeyCode::Backspace));
        assert_eq!(visible_names(&app), vec!["Canada", "United States", "Japan", "France"]);
        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.filter.criteria().search_term, "");
    }

    #[test]
    fn region_picker_applies_selection() {
        let source = FakeSource::new();
        let mut app = loaded_app(&source);
        app.handle_key(ctrl('r'));
        assert_eq!(app.picker.as_ref().map(|p| p.kind), Some(PickerKind::Region));
        type_text(&mut app, "asia");
        app.handle_key(press(KeyCode::Enter));
        assert!(app.picker.is_none());
        assert_eq!(app.filter.criteria().region, Selection::from_label("Asia"));
        assert_eq!(visible_names(&app), vec!["Japan"]);
    }

    #[test]
    fn language_picker_offers_derived_languages() {
        let source = FakeSource::new();
        let mut app = loaded_app(&source);
        app.handle_key(ctrl('t'));
        assert_eq!(app.picker_options(), app.filter.languages().to_vec());
        type_text(&mut app, "french");
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(visible_names(&app), vec!["Canada", "France"]);

        app.handle_key(ctrl('t'));
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.filter.criteria().language, Selection::All);
    }

    #[test]
    fn escape_cancels_picker() {
        let source = FakeSource::new();
        let mut app = loaded_app(&source);
        app.handle_key(ctrl('r'));
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Esc));
        assert!(app.picker.is_none());
        assert_eq!(app.filter.criteria().region, Selection::All);
    }

    #[test]
    fn enter_opens_details_with_borders() {
        let source = FakeSource::new();
        let store = MemoryStore::default();
        let mut app = loaded_app(&source);
        app.handle_key(press(KeyCode::Down));
        let action = app.handle_key(press(KeyCode::Enter));
        assert_eq!(action, AppAction::OpenDetails("USA".to_string()));
        assert_eq!(app.screen, Screen::Details);

        app.dispatch(action, &source, &store);
        let details = app.details.as_ref().unwrap();
        match &details.data {
            Fetch::Ready(data) => {
                assert_eq!(data.country.common_name(), "United States");
                assert_eq!(data.borders.len(), 1);
                assert_eq!(data.borders[0].code, "CAN");
            }
            other => panic!("unexpected details state: {other:?}"),
        }

        let action = app.handle_key(press(KeyCode::Enter));
        assert_eq!(action, AppAction::OpenDetails("CAN".to_string()));
        app.dispatch(action, &source, &store);
        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Browse);
    }

    #[test]
    fn unknown_country_reports_not_found() {
        let source = FakeSource::new();
        let mut app = loaded_app(&source);
        let action = app.open_details("XXX".to_string(), Screen::Browse);
        app.dispatch(action, &source, &MemoryStore::default());
        assert_eq!(
            app.details.as_ref().map(|details| &details.data),
            Some(&Fetch::Failed(NOT_FOUND.to_string()))
        );
    }

    #[test]
    fn favorites_require_a_session() {
        let source = FakeSource::new();
        let mut app = loaded_app(&source);
        assert_eq!(app.handle_key(ctrl('f')), AppAction::None);
        assert_eq!(app.status.as_deref(), Some(SIGN_IN_FIRST));
        assert_eq!(app.handle_key(ctrl('v')), AppAction::None);
        assert_eq!(app.screen, Screen::Favorites);
    }

    #[test]
    fn sign_in_then_toggle_favorites() {
        let source = FakeSource::new();
        let store = MemoryStore::default();
        let mut app = loaded_app(&source);

        app.handle_key(ctrl('l'));
        assert!(app.sign_in.is_some());
        type_text(&mut app, "ada");
        let action = app.handle_key(press(KeyCode::Enter));
        assert_eq!(action, AppAction::SignIn("ada".to_string()));
        app.dispatch(action, &source, &store);
        assert_eq!(app.user(), Some("ada"));

        let action = app.handle_key(ctrl('f'));
        assert_eq!(action, AppAction::ToggleFavorite("CAN".to_string()));
        app.dispatch(action, &source, &store);
        assert!(app.is_favorite("CAN"));

        let action = app.handle_key(ctrl('v'));
        assert_eq!(action, AppAction::OpenFavorites);
        app.dispatch(action, &source, &store);
        match &app.favorites {
            Fetch::Ready(countries) => assert_eq!(countries.len(), 1),
            other => panic!("unexpected favorites state: {other:?}"),
        }

        let action = app.handle_key(ctrl('f'));
        app.dispatch(action, &source, &store);
        assert_eq!(app.favorites, Fetch::Ready(Vec::new()));
        assert!(!app.is_favorite("CAN"));

        let action = app.handle_key(ctrl('l'));
        assert_eq!(action, AppAction::SignOut);
        app.dispatch(action, &source, &store);
        assert_eq!(app.user(), None);
    }

    #[test]
    fn register_existing_user_shows_error() {
        let source = FakeSource::new();
        let store = MemoryStore::default();
        let mut app = loaded_app(&source);
        app.dispatch(AppAction::Register("ada".to_string()), &source, &store);
        app.dispatch(AppAction::SignOut, &source, &store);

        app.handle_key(ctrl('l'));
        type_text(&mut app, "ada");
        let action = app.handle_key(ctrl('n'));
        assert_eq!(action, AppAction::Register("ada".to_string()));
        app.dispatch(action, &source, &store);
        assert_eq!(app.user(), None);
        assert!(app.status.as_deref().unwrap_or_default().contains("already exists"));
    }

    #[test]
    fn failed_favorites_load_is_reported() {
        let source = FakeSource::new();
        let store = MemoryStore::default();
        let mut app = loaded_app(&source);
        app.dispatch(AppAction::SignIn("ada".to_string()), &source, &store);
        source.fail.set(true);
        let action = app.handle_key(ctrl('v'));
        app.dispatch(action, &source, &store);
        assert_eq!(app.favorites, Fetch::Failed(FAVORITES_LOAD_ERROR.to_string()));
    }

    #[test]
    fn selection_is_clamped_to_visible_rows() {
        let source = FakeSource::new();
        let mut app = loaded_app(&source);
        for _ in 0..10 {
            app.handle_key(press(KeyCode::Down));
        }
        assert_eq!(app.selected, 3);
        app.handle_key(press(KeyCode::PageUp));
        assert_eq!(app.selected, 0);
    }
}

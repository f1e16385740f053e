use std::str::FromStr;

use anyhow::anyhow;

use crate::api::client::Client;
use crate::api::service::types::RouteComparison;
use crate::api::types::*;

use super::auth::{self, SessionStore};
use super::pagination::Pagination;
use super::render;

/// Which sequence the map shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapMode {
    #[default]
    Planned,
    Actual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String, password: String },
    Logout,
    Next,
    Prev,
    /// 1-based, as shown in the footer.
    Page(usize),
    /// A route id, or `#n` for the n-th route on the page.
    Select(String),
    Show(MapMode),
    Refresh,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  login <username> <password>
  logout
  next | prev | page <n>
  select <route_id> | select #<n>
  planned | actual
  refresh
  help
  quit
";

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("login", [username, password]) => Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            },
            ("logout", []) => Command::Logout,
            ("next", []) => Command::Next,
            ("prev", []) => Command::Prev,
            ("page", [n]) => {
                let n: usize = n.parse().map_err(|_| anyhow!("{n} is not a page number"))?;
                Command::Page(n)
            }
            ("select", [target]) => Command::Select(target.to_string()),
            ("planned", []) => Command::Show(MapMode::Planned),
            ("actual", []) => Command::Show(MapMode::Actual),
            ("refresh", []) => Command::Refresh,
            ("help", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => return Err(anyhow!("unknown command: {line}")),
        };

        Ok(command)
    }
}

/// State of the single dashboard view.
#[derive(Debug, Default)]
pub struct View {
    pub routes: Vec<RouteWithStopCount>,
    pub stats: Option<RouteAndStopCount>,
    pub selected: Option<String>,
    pub comparison: Option<RouteComparison>,
    pub metrics: Option<RouteMetrics>,
    pub pagination: Pagination,
    pub map_mode: MapMode,
}

impl View {
    fn clear_selection(&mut self) {
        self.selected = None;
        self.comparison = None;
        self.metrics = None;
    }

    pub fn selected_route(&self) -> Option<&RouteWithStopCount> {
        let selected = self.selected.as_deref()?;
        self.routes.iter().find(|r| r.route.route_id == selected)
    }
}

pub struct Dashboard {
    client: Client,
    session: SessionStore,
    username: Option<String>,
    view: View,
    notice: Option<String>,
}

impl Dashboard {
    /// Picks up a username remembered from an earlier run.
    pub fn new(client: Client, session: SessionStore) -> anyhow::Result<Self> {
        let username = session.load()?;

        Ok(Self {
            client,
            session,
            username,
            view: View::default(),
            notice: None,
        })
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), auth::LoginError> {
        auth::check_credentials(username, password)?;

        if let Err(e) = self.session.save(username) {
            log::error!("{e:#}");
        }
        self.username = Some(username.to_string());
        log::info!("{username} logged in");

        Ok(())
    }

    pub fn logout(&mut self) {
        self.view = View::default();
        self.username = None;

        if let Err(e) = self.session.clear() {
            log::error!("{e:#}");
        }
    }

    /// Loads the stats cards, then the first page.
    pub async fn load(&mut self) {
        match self.client.route_stats().await {
            Ok(stats) => {
                self.view.stats = Some(stats);
                self.view.pagination = Pagination::from_route_count(stats.route_count);
                self.load_page(0).await;
            }
            Err(e) => log::error!("{e:#}"),
        }
    }

    /// Fetches a page and selects its first route.
    pub async fn load_page(&mut self, page: usize) {
        if self.view.stats.is_none() {
            return;
        }

        let routes = match self
            .client
            .routes(Pagination::skip(page), Pagination::limit())
            .await
        {
            Ok(routes) => routes,
            Err(e) => {
                log::error!("Failed to load routes: {e:#}");
                return;
            }
        };

        self.view.routes = routes;
        self.view.pagination.page = page;

        let first = self.view.routes.first().map(|r| r.route.route_id.clone());
        match first {
            Some(route_id) => self.select_route(&route_id).await,
            None => self.view.clear_selection(),
        }
    }

    /// Generates the planned route, then fetches the comparison and the metrics.
    pub async fn select_route(&mut self, route_id: &str) {
        self.view.clear_selection();
        self.view.selected = Some(route_id.to_string());

        if let Err(e) = self.fetch_route_data(route_id).await {
            log::error!("{e:#}");
        }
    }

    async fn fetch_route_data(&mut self, route_id: &str) -> anyhow::Result<()> {
        self.client.generate_planned_route(route_id).await?;

        let comparison = self.client.comparison(route_id).await?;
        self.view.comparison = Some(comparison);

        let metrics = self.client.metrics(route_id).await?;
        self.view.metrics = Some(metrics.metrics);

        Ok(())
    }

    fn resolve_target(&self, target: &str) -> Option<String> {
        match target.strip_prefix('#') {
            Some(n) => {
                let n: usize = n.parse().ok()?;
                let route = self.view.routes.get(n.checked_sub(1)?)?;
                Some(route.route.route_id.clone())
            }
            None => Some(target.to_string()),
        }
    }

    pub async fn handle(&mut self, command: Command) -> Flow {
        self.notice = None;

        match command {
            Command::Quit => return Flow::Quit,
            Command::Help => self.notice = Some(HELP.to_string()),
            Command::Login { username, password } => {
                if self.username.is_some() {
                    self.notice = Some("Already logged in".to_string());
                } else {
                    match self.login(&username, &password) {
                        Ok(()) => self.load().await,
                        Err(e) => self.notice = Some(e.to_string()),
                    }
                }
            }
            _ if self.username.is_none() => {
                self.notice = Some("Log in first".to_string());
            }
            Command::Logout => self.logout(),
            Command::Refresh => self.load().await,
            Command::Next => match self.view.pagination.next() {
                Some(page) => self.load_page(page).await,
                None => self.notice = Some("Already on the last page".to_string()),
            },
            Command::Prev => match self.view.pagination.prev() {
                Some(page) => self.load_page(page).await,
                None => self.notice = Some("Already on the first page".to_string()),
            },
            Command::Page(n) => match n.checked_sub(1) {
                Some(page) if self.view.pagination.contains(page) => self.load_page(page).await,
                _ => self.notice = Some(format!("No page {n}")),
            },
            Command::Select(target) => match self.resolve_target(&target) {
                Some(route_id) => self.select_route(&route_id).await,
                None => self.notice = Some(format!("No route {target} on this page")),
            },
            Command::Show(mode) => self.view.map_mode = mode,
        }

        Flow::Continue
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        match self.username.as_deref() {
            None => out.push_str(&render::login_screen(self.notice.as_deref())),
            Some(username) => {
                out.push_str(&render::header(username));
                out.push_str(&render::stats_cards(self.view.stats.as_ref()));
                out.push('\n');
                out.push_str(&render::route_list(
                    &self.view.routes,
                    self.view.selected.as_deref(),
                    &self.view.pagination,
                ));
                out.push('\n');
                out.push_str(&render::route_panel(
                    self.view.selected_route(),
                    self.view.comparison.as_ref(),
                    self.view.metrics.as_ref(),
                    self.view.map_mode,
                ));

                if let Some(notice) = &self.notice {
                    out.push('\n');
                    out.push_str(notice);
                    out.push('\n');
                }
            }
        }

        out
    }
}

use std::{fmt::Display, mem, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use chrono::Local;
use dialoguer::{console::Style, theme::ColorfulTheme, Confirm, FuzzySelect, Input, Password};
use order_porter_engine::{FetchJob, FetchTarget, ViewFilter};
use vivid_tools::{OrderStatus, VividApi};

use crate::{
    interactive::{
        app_state::AppState,
        formatting::{
            format_fetch_report,
            format_order,
            format_orders,
            format_push_summary,
            format_store_status,
            format_transfer_result,
        },
        menus::{order_menu, top_menu, Menu},
    },
    progress::{follow_sweep, spinner},
    session::Session,
};

pub mod app_state;
pub mod formatting;
pub mod menus;

pub struct InteractiveApp {
    session: Session,
    state: AppState,
    current_menu: &'static Menu,
    breadcrumbs: Vec<&'static Menu>,
}

impl InteractiveApp {
    pub fn new(session: Session) -> Self {
        let current_menu = top_menu();
        let breadcrumbs = vec![top_menu()];
        Self { session, state: AppState::default(), current_menu, breadcrumbs }
    }

    pub fn menu_prompt(&self) -> String {
        let breadcrumbs = self.breadcrumbs.iter().map(|m| m.0).collect::<Vec<&str>>().join(" » ");
        let busy = if self.session.porter.is_busy() { " [fetching]" } else { "" };
        format!("{breadcrumbs:-30}{:50}{busy}", self.state.status_line())
    }

    pub fn pop_menu(&mut self) {
        if self.breadcrumbs.len() > 1 {
            self.breadcrumbs.pop();
            self.current_menu = self.breadcrumbs.last().copied().unwrap_or_else(top_menu);
        }
    }

    pub fn select_menu(&mut self, menu: &'static Menu) {
        if self.current_menu.0 == menu.0 {
            return;
        }
        self.breadcrumbs.push(menu);
        self.current_menu = menu;
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("{}", format_orders(&self.session.porter.view(ViewFilter::default()).await?));
        loop {
            let theme = ColorfulTheme { prompt_style: Style::new().magenta().bold(), ..ColorfulTheme::default() };
            let i = FuzzySelect::with_theme(&theme)
                .with_prompt(self.menu_prompt())
                .items(self.current_menu.1)
                .interact()?;
            match self.current_menu.1[i] {
                menus::SHOW_ORDERS => handle_response(self.show_orders().await),
                menus::FETCH_ORDERS => handle_response(self.fetch_orders().await),
                menus::FETCH_RETRANSFER => handle_response(self.fetch(FetchTarget::RetransferPending).await),
                menus::SEARCH => handle_response(self.search()),
                menus::TOGGLE_TODAY => self.update_state(AppState::toggle_today_only),
                menus::TOGGLE_HIDE_PAST => self.update_state(AppState::toggle_hide_past),
                menus::SELECT_ORDER => handle_response(self.select_order().await),
                menus::NAV_TO_ORDER_MENU => handle_response(self.order_menu().await),
                menus::SHOW_ORDER => handle_response(self.show_order().await),
                menus::REFRESH_DETAIL => handle_response(self.refresh_detail().await),
                menus::ADD_URL => handle_response(self.add_url()),
                menus::CLEAR_URLS => self.update_state(AppState::clear_urls),
                menus::SUBMIT_TRANSFER => handle_response(self.submit_transfer().await),
                menus::EXPORT_CSV => handle_response(self.export_csv().await),
                menus::PUSH_WAREHOUSE => handle_response(self.push_to_warehouse().await),
                menus::STORE_STATUS => handle_response(self.store_status().await),
                menus::SET_TOKEN => handle_response(self.set_token()),
                menus::NAV_BACK => self.pop_menu(),
                menus::EXIT => break,
                _ => continue,
            }
        }
        Ok(())
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    fn update_state(&mut self, f: impl FnOnce(AppState) -> AppState) {
        self.state = f(mem::take(&mut self.state));
    }

    async fn show_orders(&self) -> Result<String> {
        let records = self.session.porter.view(self.state.filter.clone()).await?;
        Ok(format_orders(&records))
    }

    async fn fetch_orders(&mut self) -> Result<String> {
        let statuses = OrderStatus::ALL.map(|s| s.as_str());
        let i = FuzzySelect::with_theme(&ColorfulTheme::default())
            .with_prompt("Order status")
            .items(&statuses)
            .default(1)
            .interact()?;
        self.fetch(FetchTarget::Status(OrderStatus::ALL[i])).await
    }

    async fn fetch(&mut self, target: FetchTarget) -> Result<String> {
        let enrich = Confirm::new()
            .with_prompt("Fetch the detail of every order too? (one call per order)")
            .default(false)
            .interact()?;
        self.session.drain_events();
        let handle = self.session.porter.start_fetch(FetchJob::new(target).with_enrichment(enrich))?;
        let report = follow_sweep(handle, &mut self.session.events).await?;
        format_fetch_report(&report)
    }

    fn search(&mut self) -> Result<String> {
        let query = Input::<String>::new()
            .with_prompt("Order id contains (blank clears the search)")
            .allow_empty(true)
            .with_initial_text(self.state.filter.query.clone())
            .interact_text()?;
        self.update_state(|s| s.with_query(&query));
        Ok(self.state.status_line())
    }

    async fn select_order(&mut self) -> Result<String> {
        let records = self.session.porter.view(self.state.filter.clone()).await?;
        let ids = records.iter().filter_map(|r| r.order_id().map(String::from)).collect::<Vec<String>>();
        if ids.is_empty() {
            return Err(anyhow!("No orders match the current filter"));
        }
        let labels = records
            .iter()
            .map(|r| {
                let id = r.order_id().unwrap_or_default();
                format!("{id} {} {}", r.event().unwrap_or_default(), r.event_date().unwrap_or_default())
            })
            .collect::<Vec<String>>();
        let i = FuzzySelect::with_theme(&ColorfulTheme::default()).with_prompt("Order").items(&labels).interact()?;
        let order_id = ids[i].clone();
        self.update_state(|s| s.select(&order_id));
        self.select_menu(order_menu());
        self.show_order().await
    }

    async fn order_menu(&mut self) -> Result<String> {
        if self.state.selected.is_none() {
            return self.select_order().await;
        }
        self.select_menu(order_menu());
        self.show_order().await
    }

    fn selected(&self) -> Result<String> {
        self.state.selected.clone().ok_or_else(|| anyhow!("Select an order first"))
    }

    async fn show_order(&self) -> Result<String> {
        let order_id = self.selected()?;
        let entry = self
            .session
            .porter
            .entry(&order_id)
            .await?
            .ok_or_else(|| anyhow!("Order #{order_id} is no longer in the store"))?;
        let mut text = format_order(&entry.merged(), &entry.sources())?;
        if !self.state.pending_urls.is_empty() {
            text.push_str(&format!("Queued transfer URLs:\n  {}\n", self.state.pending_urls.join("\n  ")));
        }
        Ok(text)
    }

    async fn refresh_detail(&self) -> Result<String> {
        let order_id = self.selected()?;
        let pb = spinner(&format!("Fetching the detail of order #{order_id}..."));
        match self.session.porter.refresh_detail(&order_id).await {
            Ok(_) => pb.finish_with_message("Done!"),
            Err(e) => {
                pb.finish_with_message("Error!");
                return Err(e.into());
            },
        }
        self.show_order().await
    }

    fn add_url(&mut self) -> Result<String> {
        self.selected()?;
        let url = Input::<String>::new().with_prompt("Transfer URL").interact_text()?;
        self.update_state(|s| s.add_url(&url));
        Ok(format!("{} URL(s) queued", self.state.pending_urls.len()))
    }

    async fn submit_transfer(&mut self) -> Result<String> {
        let order = self.state.transfer_order().ok_or_else(|| anyhow!("Select an order and add at least one URL"))?;
        let prompt = format!("Transfer order #{} to {} URL(s)?", order.order_id, order.urls.len());
        if !Confirm::new().with_prompt(prompt).interact()? {
            return Err(anyhow!("Cancelled"));
        }
        let result = self.session.porter.transfer(&order).await?;
        if result.success {
            self.update_state(AppState::clear_urls);
        }
        Ok(format_transfer_result(&order.order_id, &result))
    }

    async fn export_csv(&self) -> Result<String> {
        let default = format!("vivid_export_{}.csv", Local::now().format("%Y%m%d_%H%M%S"));
        let path = Input::<String>::new().with_prompt("Export to").default(default).interact_text()?;
        let path = PathBuf::from(path.trim());
        let rows = self.session.porter.export_csv(&path, self.state.filter.clone()).await?;
        Ok(format!("Exported {rows} orders to {}", path.display()))
    }

    async fn push_to_warehouse(&self) -> Result<String> {
        let pb = spinner("Pushing orders to the warehouse...");
        let result = self.session.porter.push_to_warehouse().await;
        pb.finish_and_clear();
        let summary = result?;
        let table = self.session.porter.config().warehouse.as_ref().map(|w| w.table.clone()).unwrap_or_default();
        Ok(format_push_summary(&summary, &table))
    }

    async fn store_status(&self) -> Result<String> {
        let stats = self.session.porter.stats().await?;
        format_store_status(&stats, self.session.porter.restored())
    }

    fn set_token(&mut self) -> Result<String> {
        let token = Password::new().with_prompt("Vivid Seats API token").interact()?;
        let config = self.session.porter.config().vivid.clone().with_token(token.trim());
        let api = VividApi::new(config)?;
        self.session.porter.replace_source(Arc::new(api))?;
        Ok("API token updated for this session".to_string())
    }
}

fn handle_response<T: Display>(res: Result<T>) {
    match res {
        Ok(res) => println!("{res}"),
        Err(e) => println!("Error: {}", e),
    }
}

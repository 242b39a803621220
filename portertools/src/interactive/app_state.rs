//! What the operator has in hand between menu actions. Handlers take the state by value and hand back the next one.
use order_porter_engine::{transfers::TransferOrder, ViewFilter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub filter: ViewFilter,
    pub selected: Option<String>,
    /// URLs queued for the selected order's next transfer.
    pub pending_urls: Vec<String>,
}

impl AppState {
    pub fn with_query(mut self, query: &str) -> Self {
        self.filter.query = query.trim().to_string();
        self
    }

    pub fn toggle_today_only(mut self) -> Self {
        self.filter.today_only = !self.filter.today_only;
        self
    }

    pub fn toggle_hide_past(mut self) -> Self {
        self.filter.hide_past = !self.filter.hide_past;
        self
    }

    /// Selecting a different order drops the URLs queued for the previous one.
    pub fn select(mut self, order_id: &str) -> Self {
        let order_id = order_id.trim();
        if self.selected.as_deref() != Some(order_id) {
            self.pending_urls.clear();
        }
        self.selected = (!order_id.is_empty()).then(|| order_id.to_string());
        self
    }

    pub fn add_url(mut self, url: &str) -> Self {
        let url = url.trim();
        if !url.is_empty() && !self.pending_urls.iter().any(|u| u == url) {
            self.pending_urls.push(url.to_string());
        }
        self
    }

    pub fn clear_urls(mut self) -> Self {
        self.pending_urls.clear();
        self
    }

    /// The transfer the operator has set up, if an order is selected and at least one URL is queued.
    pub fn transfer_order(&self) -> Option<TransferOrder> {
        match (&self.selected, self.pending_urls.is_empty()) {
            (Some(order_id), false) => Some(TransferOrder::new(order_id, self.pending_urls.clone())),
            _ => None,
        }
    }

    pub fn status_line(&self) -> String {
        let mut parts = Vec::new();
        if !self.filter.query.is_empty() {
            parts.push(format!("search: {}", self.filter.query));
        }
        if self.filter.today_only {
            parts.push("today only".to_string());
        }
        if self.filter.hide_past {
            parts.push("hiding past".to_string());
        }
        if let Some(id) = &self.selected {
            parts.push(format!("order #{id} ({} URLs)", self.pending_urls.len()));
        }
        if parts.is_empty() {
            "All orders".to_string()
        } else {
            parts.join(" | ")
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn filters_toggle() {
        let state = AppState::default().with_query("  ord-1 ").toggle_today_only().toggle_hide_past();
        assert_eq!(state.filter, ViewFilter::new("ord-1", true, true));
        let state = state.toggle_today_only();
        assert!(!state.filter.today_only);
        assert_eq!(state.status_line(), "search: ord-1 | hiding past");
    }

    #[test]
    fn urls_belong_to_the_selected_order() {
        let state = AppState::default().select("55").add_url("https://a").add_url(" ").add_url("https://a");
        assert_eq!(state.pending_urls, vec!["https://a"]);
        let order = state.transfer_order().unwrap();
        assert_eq!(order.order_id, "55");
        assert_eq!(order.urls, vec!["https://a"]);

        let same = state.clone().select("55");
        assert_eq!(same.pending_urls.len(), 1);
        let other = state.select("56");
        assert!(other.pending_urls.is_empty());
        assert!(other.transfer_order().is_none());
    }

    #[test]
    fn nothing_to_transfer_without_a_selection() {
        let state = AppState::default().add_url("https://a");
        assert!(state.transfer_order().is_none());
        assert_eq!(state.clone().clear_urls().pending_urls.len(), 0);
        assert_eq!(state.select(" ").selected, None);
    }
}

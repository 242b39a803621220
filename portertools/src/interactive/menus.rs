//! Interactive menu options.
//!
//! Commands must be unique across all menus. If the same name is used in multiple menus, the same function will be
//! called for each menu that contains the command.
pub type Menu = (&'static str, &'static [&'static str]);

// Command aliases. Keep this list in alphabetical order.
pub mod commands {
    pub const ADD_URL: &str = "Add transfer URL";
    pub const CLEAR_URLS: &str = "Clear transfer URLs";
    pub const EXIT: &str = "Exit";
    pub const EXPORT_CSV: &str = "Export CSV";
    pub const FETCH_ORDERS: &str = "Fetch orders";
    pub const FETCH_RETRANSFER: &str = "Fetch retransfer-pending orders";
    pub const NAV_BACK: &str = "Back";
    pub const NAV_TO_ORDER_MENU: &str = "Selected order";
    pub const PUSH_WAREHOUSE: &str = "Push to warehouse";
    pub const REFRESH_DETAIL: &str = "Fetch order detail";
    pub const SEARCH: &str = "Search by order id";
    pub const SELECT_ORDER: &str = "Select order";
    pub const SET_TOKEN: &str = "Set API token";
    pub const SHOW_ORDER: &str = "Show order";
    pub const SHOW_ORDERS: &str = "Show orders";
    pub const STORE_STATUS: &str = "Store status";
    pub const SUBMIT_TRANSFER: &str = "Submit transfer";
    pub const TOGGLE_HIDE_PAST: &str = "Toggle hide past events";
    pub const TOGGLE_TODAY: &str = "Toggle today only";
}

pub use commands::*;

pub const TOP_MENU: [&str; 13] = [
    SHOW_ORDERS,
    FETCH_ORDERS,
    FETCH_RETRANSFER,
    SEARCH,
    TOGGLE_TODAY,
    TOGGLE_HIDE_PAST,
    SELECT_ORDER,
    NAV_TO_ORDER_MENU,
    EXPORT_CSV,
    PUSH_WAREHOUSE,
    STORE_STATUS,
    SET_TOKEN,
    EXIT,
];

pub const ORDER_MENU: [&str; 8] =
    [SHOW_ORDER, REFRESH_DETAIL, ADD_URL, CLEAR_URLS, SUBMIT_TRANSFER, SELECT_ORDER, NAV_BACK, EXIT];

pub fn top_menu() -> &'static Menu {
    &("Main", &TOP_MENU)
}

pub fn order_menu() -> &'static Menu {
    &("Order", &ORDER_MENU)
}

//! What the kiosk shows
//!
//! [`UiState`] is the controller's logical state; [`Screen`] is the set of
//! visible elements a front end draws.

use pricemonitor_api_client::PriceRecord;

/// Dialog titles and messages
pub mod messages {
    /// Title of the dialog for an unknown barcode
    pub const NOT_FOUND_TITLE: &str = "Mal tapılmadı";
    /// Message prefix for an unknown barcode
    pub const NOT_FOUND_MESSAGE: &str = "Bu barkoda uyğun mal tapılmadı";
    /// Title of the dialog for network and response failures
    pub const ERROR_TITLE: &str = "Xəta";
    /// Message prefix for network and response failures
    pub const SERVER_ERROR: &str = "Server xətası";

    pub fn not_found(barcode: &str) -> String {
        format!("{NOT_FOUND_MESSAGE}: {barcode}")
    }

    pub fn server_error(description: &str) -> String {
        format!("{SERVER_ERROR}: {description}")
    }
}

/// Logical state of the display controller
#[derive(Debug, Clone, PartialEq)]
pub enum UiState {
    /// Waiting for a scan
    Idle,
    /// A lookup is in flight
    Loading,
    /// A found item is on screen
    Result(PriceRecord),
    /// A dialog reports a failure or an unknown barcode
    Error { title: String, message: String },
}

impl UiState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Result(_) => "result",
            Self::Error { .. } => "error",
        }
    }
}

/// Modal message with its own dismiss countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub id: u64,
    pub title: String,
    pub message: String,
}

/// Visible elements of the kiosk screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    /// Text typed so far
    pub input: String,
    pub barcode: String,
    pub item_name: String,
    /// Formatted price with currency
    pub price: String,
    pub logo_visible: bool,
    pub progress_visible: bool,
    pub dialog: Option<Dialog>,
}

impl Default for Screen {
    fn default() -> Self {
        Self::idle()
    }
}

impl Screen {
    /// Logo shown, fields empty, nothing in progress
    pub fn idle() -> Self {
        Self {
            input: String::new(),
            barcode: String::new(),
            item_name: String::new(),
            price: String::new(),
            logo_visible: true,
            progress_visible: false,
            dialog: None,
        }
    }

    /// Whether the screen looks idle, ignoring any dialog and typed input
    pub fn shows_idle(&self) -> bool {
        self.logo_visible
            && !self.progress_visible
            && self.barcode.is_empty()
            && self.item_name.is_empty()
            && self.price.is_empty()
    }

    pub(crate) fn clear_fields(&mut self) {
        self.barcode.clear();
        self.item_name.clear();
        self.price.clear();
    }

    /// Back to the idle display, keeping any dialog and typed input
    pub(crate) fn show_initial(&mut self) {
        self.clear_fields();
        self.logo_visible = true;
        self.progress_visible = false;
    }

    pub(crate) fn show_loading(&mut self) {
        self.clear_fields();
        self.logo_visible = false;
        self.progress_visible = true;
    }

    pub(crate) fn show_record(&mut self, record: &PriceRecord, price: String) {
        self.progress_visible = false;
        self.logo_visible = false;
        self.barcode = record.barcode().to_string();
        self.item_name = record.item_name().to_string();
        self.price = price;
    }
}

pub mod app;
pub mod faq;
pub mod header;
pub mod input;
pub mod search_panel;

pub use app::App;
pub use faq::render_faq;
pub use header::{Header, Page};
pub use input::FreeTextInput;
pub use search_panel::{ManualField, SearchPanel};

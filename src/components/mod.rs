//! UI Components
//!
//! Reusable Leptos components.

mod confirm_button;
mod footer;
mod header;
mod smart_search;
mod subtask_list;
mod task_input;
mod task_item;
mod task_list;

pub use confirm_button::ConfirmButton;
pub use footer::Footer;
pub use header::Header;
pub use smart_search::SmartSearch;
pub use subtask_list::SubtaskList;
pub use task_input::TaskInput;
pub use task_item::TaskItem;
pub use task_list::TaskList;

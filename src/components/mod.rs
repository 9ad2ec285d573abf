//! UI Components
//!
//! Leptos components of the structure editor.

mod billing_type_selector;
mod delete_confirm_button;
mod inherit_prompt;
mod message_area;
mod new_node_form;
mod node_list_view;
mod structure_row;
mod structure_table;
mod structure_toolbar;

pub use billing_type_selector::BillingTypeSelector;
pub use delete_confirm_button::DeleteConfirmButton;
pub use inherit_prompt::InheritPrompt;
pub use message_area::MessageArea;
pub use new_node_form::NewNodeForm;
pub use node_list_view::NodeListView;
pub use structure_row::StructureRow;
pub use structure_table::StructureTable;
pub use structure_toolbar::StructureToolbar;

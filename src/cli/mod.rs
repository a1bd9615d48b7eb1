mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_add, handle_browse, handle_delete, handle_edit, handle_export, handle_init,
    handle_list, handle_palette, handle_select, handle_show,
};

pub mod export;
pub mod init;
pub mod list;
pub mod new;

pub use export::{export, ExportArgs};
pub use init::{init, InitArgs};
pub use list::{components, templates, ComponentsArgs, TemplatesArgs};
pub use new::{new_page, NewArgs};

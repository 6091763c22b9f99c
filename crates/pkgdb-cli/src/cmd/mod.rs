//! One module per subcommand.

pub mod info;
pub mod list;
pub mod status;
pub mod uid;

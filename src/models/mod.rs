mod auth;
mod backups;
mod interfaces;
mod port_channels;
mod switches;
mod vlans;

pub use auth::*;
pub use backups::*;
pub use interfaces::*;
pub use port_channels::*;
pub use switches::*;
pub use vlans::*;

pub mod init;
pub mod packages;
pub mod rewrite;
pub mod vendor;

pub use init::init_command;
pub use packages::packages_command;
pub use rewrite::rewrite_command;
pub use vendor::vendor_command;

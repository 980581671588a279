pub mod create_account;
pub mod initdb;
pub mod serve;

pub use create_account::create_account;
pub use initdb::init_database;
pub use serve::serve;

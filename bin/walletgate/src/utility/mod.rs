pub mod background_tasks;
pub mod db_pool;
pub mod logging;
pub mod shutdown;
pub mod tasks;

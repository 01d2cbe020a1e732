pub mod db_utils;
pub mod holiday_cache;
pub mod timezone;

pub mod record_cache;

//! Configuration: schema (`config_struct!`), TOML loading, global access

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{
    CacheSettings, Config, ExchangesConfig, IndicatorConfig, LoggingConfig, SentimentConfig,
};
pub use utils::{
    config_path, get_config_clone, load_config, load_config_from_path, read_config_file,
    reload_config_from_path, CONFIG_FILE_PATH,
};

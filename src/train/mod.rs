pub mod epoch_stats;
pub mod loop_fn;
pub mod train_config;
pub mod train_params;

pub use epoch_stats::EpochStats;
pub use train_config::TrainConfig;
pub use train_params::TrainParams;
pub use loop_fn::train_loop;

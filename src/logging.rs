use log::LevelFilter;
use simplelog::{Config, WriteLogger};
use std::fs::File;

pub fn init_logging() {
    // If the log file cannot be created we run without logging rather than abort.
    if let Ok(file) = File::create("cinder.log") {
        let _ = WriteLogger::init(LevelFilter::Info, Config::default(), file);
        log::info!("logger initialized");
    }
}

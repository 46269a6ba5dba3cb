use log::{Level, LevelFilter, Log, Metadata, Record};

/// Routes `log` records to the browser console.
pub struct ConsoleLogger {
    level: Level,
}

static LOGGER: ConsoleLogger = ConsoleLogger { level: Level::Info };

/// Install the console logger; a second call is a no-op.
pub fn init_console_logger() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!("[{}] {}", record.target(), record.args());
        write_console(record.level(), &message);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, message: &str) {
    use web_sys::console;

    match level {
        Level::Error => console::error_1(&message.into()),
        Level::Warn => console::warn_1(&message.into()),
        _ => console::log_1(&message.into()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, message: &str) {
    eprintln!("{}", message);
}

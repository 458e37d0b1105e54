use evlog::Logger;
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<Logger> = OnceCell::new();

/// Installs the process-wide logger. Only the first call has any effect.
pub fn set_logger(logger: Logger) {
    if LOGGER.set(logger).is_err() {
        get_logger().debug("Logger already installed; ignoring replacement.", None);
    }
}

/// Returns the installed logger, or a silent default one when `set_logger` was never called.
pub fn get_logger() -> &'static Logger {
    LOGGER.get_or_init(Logger::default)
}

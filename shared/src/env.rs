use log::debug;

/// Loads variables such as `RUST_LOG` from a `.env` file, if one exists.
pub fn init() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(_) => debug!("No .env file found"),
    }
}

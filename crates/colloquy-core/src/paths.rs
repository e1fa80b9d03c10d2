use std::env;
use std::path::PathBuf;

/// Return the user's home directory path.
///
/// Uses HOME on Unix-like systems and USERPROFILE on Windows.
pub fn get_home_dir() -> Result<String, String> {
    for var in ["HOME", "USERPROFILE"] {
        if let Ok(value) = env::var(var) {
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }

    Err("Home directory not set".to_string())
}

/// `$HOME/.config/colloquy`
pub fn default_data_dir() -> Result<PathBuf, String> {
    Ok(PathBuf::from(get_home_dir()?).join(".config").join("colloquy"))
}

/// `$HOME/.config/colloquy/config.json`
pub fn default_config_path() -> Result<PathBuf, String> {
    Ok(default_data_dir()?.join("config.json"))
}

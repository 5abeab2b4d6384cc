use dirs::config_dir;
use once_cell::sync::Lazy;
use std::{fs, path::PathBuf};

static CONFIG_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let base = config_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let root = base.join("campus-events");
    if let Err(err) = fs::create_dir_all(&root) {
        tracing::error!("failed to create config root {:?}: {err}", root);
    }
    root
});

pub fn config_root() -> PathBuf {
    CONFIG_ROOT.clone()
}

pub fn config_path() -> PathBuf {
    config_root().join("config.json")
}

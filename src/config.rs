use std::{fs, path::PathBuf, sync::Mutex, time::Duration};

use serde::{Deserialize, Serialize};

use crate::utils;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";
const DEFAULT_LOGIN_ROUTE: &str = "/users/login/";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub base_url: String,
    pub login_route: String,
    pub csrf_cookie: String,
    pub csrf_header: String,
    pub redirect_delay_ms: u64,
    pub dialog_close_delay_ms: u64,
    pub success_flash_ms: u64,
    pub toast_ttl_ms: u64,
    pub default_vendor_image: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            csrf_cookie: "csrftoken".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
            redirect_delay_ms: 2000,
            dialog_close_delay_ms: 2000,
            success_flash_ms: 1000,
            toast_ttl_ms: 5000,
            default_vendor_image: "/static/js/img/default_vendor.jpg".to_string(),
        }
    }
}

impl ViewConfig {
    /// Applies `EVENTLY_*` environment overrides on top of `self`.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("EVENTLY_BASE_URL") {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
        if let Ok(route) = std::env::var("EVENTLY_LOGIN_ROUTE") {
            if !route.trim().is_empty() {
                self.login_route = route.trim().to_string();
            }
        }
        self
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn dialog_close_delay(&self) -> Duration {
        Duration::from_millis(self.dialog_close_delay_ms)
    }

    pub fn success_flash(&self) -> Duration {
        Duration::from_millis(self.success_flash_ms)
    }

    pub fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }
}

pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<ViewConfig>,
}

impl ConfigStore {
    pub fn load() -> Self {
        Self::load_from(utils::config_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        let data = match read_config(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring unreadable config {:?}: {err}", path);
                ViewConfig::default()
            }
        };
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn read(&self) -> ViewConfig {
        match self.data.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update<F>(&self, transform: F) -> Result<ViewConfig, String>
    where
        F: FnOnce(&mut ViewConfig),
    {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| "config mutex poisoned".to_string())?;
        transform(&mut guard);
        write_config(&self.path, &guard)?;
        Ok(guard.clone())
    }
}

fn read_config(path: &PathBuf) -> Result<ViewConfig, String> {
    if !path.exists() {
        return Ok(ViewConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| err.to_string())
}

fn write_config(path: &PathBuf, config: &ViewConfig) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            return Err(err.to_string());
        }
    }
    let contents = serde_json::to_string_pretty(config).map_err(|err| err.to_string())?;
    fs::write(path, contents).map_err(|err| err.to_string())
}

use crate::error::Result;
use config::{Config, Environment, File, FileStoredFormat, Format, Map, Value, ValueKind};
use ini::{Ini, ParseOption};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "hmcinv.ini";
const SYSTEM_CONFIG_PATH: &str = "/etc/ansible/hmcinv.ini";
const DEFAULT_HMC_PORT: u16 = 12443;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub hmc: HmcSettings,
}

#[derive(Clone, Deserialize)]
pub struct HmcSettings {
    pub url: String,
    pub user: String,
    pub password: String,
    pub ssl_verify: bool,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_HMC_PORT
}

// Keep the password out of debug logs.
impl std::fmt::Debug for HmcSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmcSettings")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ssl_verify", &self.ssl_verify)
            .field("port", &self.port)
            .finish()
    }
}

/// INI without quote stripping or backslash escapes: values are read as
/// written, so passwords survive untouched.
#[derive(Debug, Clone, Copy)]
struct RawIni;

impl Format for RawIni {
    fn parse(
        &self,
        uri: Option<&String>,
        text: &str,
    ) -> std::result::Result<Map<String, Value>, Box<dyn std::error::Error + Send + Sync>> {
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(text, options)?;

        let mut map: Map<String, Value> = Map::new();
        for (section, properties) in ini.iter() {
            let values: Map<String, Value> = properties
                .iter()
                .map(|(k, v)| (k.to_owned(), Value::new(uri, ValueKind::String(v.to_owned()))))
                .collect();
            match section {
                Some(section) => {
                    map.insert(section.to_owned(), Value::new(uri, ValueKind::Table(values)));
                }
                None => map.extend(values),
            }
        }
        Ok(map)
    }
}

impl FileStoredFormat for RawIni {
    fn file_extensions(&self) -> &'static [&'static str] {
        &["ini"]
    }
}

impl Settings {
    /// Load settings from the well-known INI locations, then `extra`, then
    /// `HMCINV_HMC__*` environment variables. Later sources win.
    pub fn load(extra: Option<&Path>) -> Result<Self> {
        Self::load_from(&search_paths(extra, dirs::home_dir()))
    }

    fn load_from(paths: &[PathBuf]) -> Result<Self> {
        let mut builder = Config::builder();

        for path in paths {
            debug!("Considering configuration file {}", path.display());
            builder = builder.add_source(File::new(&path.to_string_lossy(), RawIni).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("HMCINV")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}

impl HmcSettings {
    /// Base URL every REST path is joined onto, always ending in `/`.
    pub fn base_url(&self) -> String {
        let url = self.url.trim();
        if url.starts_with("http") {
            if url.ends_with('/') {
                url.to_string()
            } else {
                format!("{}/", url)
            }
        } else {
            format!("https://{}:{}/", url.trim_end_matches('/'), self.port)
        }
    }
}

fn search_paths(extra: Option<&Path>, home: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];

    if let Some(home) = home.as_deref() {
        paths.push(home.join(format!(".{}", CONFIG_FILE_NAME)));
    }

    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(dir.join(CONFIG_FILE_NAME));
    }

    if let Some(path) = extra {
        paths.push(expand_home(path, home.as_deref()));
    }

    paths
}

fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn hmc(url: &str) -> HmcSettings {
        HmcSettings {
            url: url.to_string(),
            user: "hscroot".to_string(),
            password: "secret".to_string(),
            ssl_verify: false,
            port: DEFAULT_HMC_PORT,
        }
    }

    fn write_ini(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn with_password(password: &str) -> String {
        format!(
            "[hmc]\nurl = hmc02\nuser = admin\npassword = {}\nssl_verify = false\n",
            password
        )
    }

    #[test]
    fn test_base_url_bare_host() {
        assert_eq!(hmc("hmc01.example.com").base_url(), "https://hmc01.example.com:12443/");
    }

    #[test]
    fn test_base_url_custom_port() {
        let mut settings = hmc("10.0.0.5");
        settings.port = 443;
        assert_eq!(settings.base_url(), "https://10.0.0.5:443/");
    }

    #[test]
    fn test_base_url_full_url_kept() {
        assert_eq!(hmc("http://127.0.0.1:8080").base_url(), "http://127.0.0.1:8080/");
        assert_eq!(hmc("https://hmc:12443/").base_url(), "https://hmc:12443/");
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", hmc("hmc"));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_ini(
            &dir,
            "hmcinv.ini",
            "[hmc]\nurl = hmc02\nuser = admin\npassword = pa$$w0rd%\nssl_verify = no\nport = 443\n",
        );

        let settings = Settings::load_from(&[path]).unwrap();
        assert_eq!(settings.hmc.url, "hmc02");
        assert_eq!(settings.hmc.user, "admin");
        assert_eq!(settings.hmc.password, "pa$$w0rd%");
        assert!(!settings.hmc.ssl_verify);
        assert_eq!(settings.hmc.port, 443);
    }

    #[test]
    fn test_password_is_read_verbatim() {
        let dir = TempDir::new().unwrap();
        for password in [r"pa\ss", r#""q""#, "'single'", r"C:\Windows\n"] {
            let path = write_ini(&dir, "hmcinv.ini", &with_password(password));
            let settings = Settings::load_from(&[path]).unwrap();
            assert_eq!(settings.hmc.password, password);
        }
    }

    #[test]
    fn test_later_files_override_earlier() {
        let dir = TempDir::new().unwrap();
        let system = write_ini(&dir, "system.ini", &with_password("from-system"));
        let user = write_ini(&dir, "user.ini", "[hmc]\npassword = from-user\n");

        let settings = Settings::load_from(&[system, user]).unwrap();
        assert_eq!(settings.hmc.password, "from-user");
        assert_eq!(settings.hmc.url, "hmc02");
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let present = write_ini(&dir, "hmcinv.ini", &with_password("pw"));
        let absent = dir.path().join("absent.ini");

        let settings = Settings::load_from(&[present, absent]).unwrap();
        assert_eq!(settings.hmc.password, "pw");
    }

    #[test]
    fn test_load_rejects_missing_section() {
        let dir = TempDir::new().unwrap();
        let path = write_ini(&dir, "hmcinv.ini", "[cache]\npath = /tmp\n");
        assert!(Settings::load_from(&[path]).is_err());
    }

    #[test]
    fn test_load_rejects_bad_boolean() {
        let dir = TempDir::new().unwrap();
        let path = write_ini(
            &dir,
            "hmcinv.ini",
            "[hmc]\nurl = a\nuser = b\npassword = c\nssl_verify = maybe\n",
        );
        assert!(Settings::load_from(&[path]).is_err());
    }

    #[test]
    fn test_expand_home() {
        let home = Path::new("/home/ops");
        assert_eq!(
            expand_home(Path::new("~/inv/hmcinv.ini"), Some(home)),
            PathBuf::from("/home/ops/inv/hmcinv.ini")
        );
        assert_eq!(
            expand_home(Path::new("/etc/hmcinv.ini"), Some(home)),
            PathBuf::from("/etc/hmcinv.ini")
        );
        assert_eq!(
            expand_home(Path::new("~/hmcinv.ini"), None),
            PathBuf::from("~/hmcinv.ini")
        );
    }

    #[test]
    fn test_search_path_order() {
        let home = PathBuf::from("/home/ops");
        let paths = search_paths(Some(Path::new("~/extra.ini")), Some(home));

        assert_eq!(paths.first(), Some(&PathBuf::from(SYSTEM_CONFIG_PATH)));
        assert_eq!(paths[1], PathBuf::from("/home/ops/.hmcinv.ini"));
        assert_eq!(paths.last(), Some(&PathBuf::from("/home/ops/extra.ini")));
    }
}

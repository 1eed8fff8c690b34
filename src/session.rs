use chrono::Utc;
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use eth_keystore::decrypt_key;
use fuels::{
    crypto::SecretKey,
    prelude::{
        derivation::DEFAULT_DERIVATION_PATH,
        private_key::PrivateKeySigner,
    },
    types::Address,
};
use rpassword::prompt_password;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};
use tracing::{
    info,
    warn,
};

#[derive(Clone, Debug)]
pub struct WalletDescriptor {
    pub name: String,
    pub path: PathBuf,
}

impl WalletDescriptor {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }
}

/// An unlocked signer and its derived account address.
#[derive(Clone)]
pub struct Session {
    pub signer: PrivateKeySigner,
    pub address: Address,
}

pub fn default_wallet_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").wrap_err("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".fuel").join("wallets"))
}

pub fn resolve_wallet_dir(dir: Option<&str>) -> Result<PathBuf> {
    match dir {
        Some(raw) => {
            let expanded = shellexpand::tilde(raw);
            Ok(PathBuf::from(expanded.into_owned()))
        }
        None => default_wallet_dir(),
    }
}

pub fn default_cache_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").wrap_err("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("double-or-nothing")
        .join("session.json"))
}

pub fn list_wallets(dir: &Path) -> Result<Vec<WalletDescriptor>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut wallets = Vec::new();
    for entry in fs::read_dir(dir).wrap_err("Failed to read wallet directory")? {
        let entry = entry.wrap_err("Failed to read wallet entry")?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("wallet") {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| eyre!("Invalid wallet filename {:?}", path))?
            .to_owned();
        wallets.push(WalletDescriptor::new(name, path));
    }
    wallets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(wallets)
}

pub fn find_wallet(dir: &Path, name: &str) -> Result<WalletDescriptor> {
    let wallets = list_wallets(dir)?;
    wallets
        .into_iter()
        .find(|w| w.name == name)
        .ok_or_else(|| eyre!("Wallet '{name}' not found in {}", dir.to_string_lossy()))
}

/// Prompts for the keystore password and turns the key material into a signer.
pub fn unlock_wallet(descriptor: &WalletDescriptor) -> Result<Session> {
    let prompt = format!("Enter password for wallet '{}': ", descriptor.name);
    let password = prompt_password(prompt).wrap_err("Failed to read wallet password")?;

    let secret = decrypt_key(&descriptor.path, password.as_bytes())
        .map_err(|_| eyre!("Invalid password for wallet '{}'", descriptor.name))?;

    if let Ok(secret_key) = SecretKey::try_from(secret.as_slice()) {
        return Ok(session_from_key(secret_key));
    }

    if let Ok(mnemonic) = std::str::from_utf8(&secret) {
        let word_count = mnemonic.split_whitespace().count();
        if word_count >= 12 {
            let secret_key = SecretKey::new_from_mnemonic_phrase_with_path(
                mnemonic,
                DEFAULT_DERIVATION_PATH,
            )?;
            return Ok(session_from_key(secret_key));
        }
    }

    Err(eyre!(
        "Wallet '{}' contained unsupported key material",
        descriptor.name
    ))
}

fn session_from_key(secret_key: SecretKey) -> Session {
    let address = Address::from(*secret_key.public_key().hash());
    Session {
        signer: PrivateKeySigner::new(secret_key),
        address,
    }
}

/// On-disk record of the last provider choice, read back for auto-reconnect.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CachedProvider {
    pub wallet: String,
    pub cached_at: String,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub wallet_dir: PathBuf,
    pub cache_path: PathBuf,
    pub auto_load: bool,
}

impl SessionConfig {
    pub fn new(wallet_dir: PathBuf, cache_path: PathBuf) -> Self {
        Self {
            wallet_dir,
            cache_path,
            auto_load: true,
        }
    }
}

/// Establishes and tears down wallet sessions, remembering the chosen
/// provider across runs the way the web frontend caches its wallet modal
/// choice.
pub struct SessionManager {
    config: SessionConfig,
    auto_loaded: bool,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            auto_loaded: false,
        }
    }

    pub fn cached_provider(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.config.cache_path).ok()?;
        let record: CachedProvider = serde_json::from_str(&raw).ok()?;
        Some(record.wallet)
    }

    /// Opens the provider-selection interface. A `None` from the chooser means
    /// the user backed out: no session, no error. Unlock failures propagate.
    pub fn connect(
        &mut self,
        chooser: &mut dyn FnMut(&[WalletDescriptor]) -> Option<usize>,
    ) -> Result<Option<Session>> {
        let wallets = list_wallets(&self.config.wallet_dir)?;
        if wallets.is_empty() {
            return Err(eyre!(
                "No wallets found in {}",
                self.config.wallet_dir.to_string_lossy()
            ));
        }
        let Some(ix) = chooser(&wallets) else {
            return Ok(None);
        };
        let descriptor = wallets
            .get(ix)
            .ok_or_else(|| eyre!("Wallet selection {ix} out of range"))?;
        let session = unlock_wallet(descriptor)?;
        self.cache_provider(&descriptor.name)?;
        info!(wallet = %descriptor.name, "session established");
        Ok(Some(session))
    }

    /// Reconnects to the cached provider. Runs at most once per process, and
    /// only when auto-load is on and a cache record exists. A cached name that
    /// no longer resolves clears the stale record.
    pub fn auto_connect(&mut self) -> Result<Option<Session>> {
        if !self.config.auto_load || self.auto_loaded {
            return Ok(None);
        }
        self.auto_loaded = true;
        let Some(name) = self.cached_provider() else {
            return Ok(None);
        };
        let descriptor = match find_wallet(&self.config.wallet_dir, &name) {
            Ok(descriptor) => descriptor,
            Err(_) => {
                warn!(wallet = %name, "cached wallet no longer exists, clearing cache");
                self.disconnect()?;
                return Ok(None);
            }
        };
        let session = unlock_wallet(&descriptor)?;
        info!(wallet = %name, "session restored from cache");
        Ok(Some(session))
    }

    /// Clears the cached provider. The caller tears the rest down; there is
    /// no page to reload here.
    pub fn disconnect(&self) -> Result<()> {
        if self.config.cache_path.exists() {
            fs::remove_file(&self.config.cache_path)
                .wrap_err("Failed to clear cached provider")?;
        }
        Ok(())
    }

    fn cache_provider(&self, name: &str) -> Result<()> {
        let record = CachedProvider {
            wallet: name.to_string(),
            cached_at: Utc::now().to_rfc3339(),
        };
        if let Some(parent) = self.config.cache_path.parent() {
            fs::create_dir_all(parent).wrap_err("Failed to create cache directory")?;
        }
        let raw = serde_json::to_string_pretty(&record)?;
        fs::write(&self.config.cache_path, raw).wrap_err("Failed to cache provider")?;
        Ok(())
    }
}

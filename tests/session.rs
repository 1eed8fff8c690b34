#![allow(non_snake_case)]

use double_or_nothing::session::{
    CachedProvider,
    SessionConfig,
    SessionManager,
    WalletDescriptor,
    list_wallets,
    resolve_wallet_dir,
};
use std::{
    fs,
    path::PathBuf,
};
use tempdir::TempDir;

fn write_wallet(dir: &PathBuf, name: &str) {
    fs::write(dir.join(format!("{name}.wallet")), "{}").unwrap();
}

fn write_cache(path: &PathBuf, wallet: &str) {
    let record = CachedProvider {
        wallet: wallet.to_string(),
        cached_at: String::from("2024-01-01T00:00:00Z"),
    };
    fs::write(path, serde_json::to_string(&record).unwrap()).unwrap();
}

fn manager_for(dir: &TempDir, auto_load: bool) -> (SessionManager, PathBuf) {
    let wallet_dir = dir.path().join("wallets");
    fs::create_dir_all(&wallet_dir).unwrap();
    let cache_path = dir.path().join("session.json");
    let mut config = SessionConfig::new(wallet_dir, cache_path.clone());
    config.auto_load = auto_load;
    (SessionManager::new(config), cache_path)
}

#[test]
fn list_wallets__missing_directory_is_empty() {
    let dir = TempDir::new("donsession").unwrap();
    let missing = dir.path().join("nope");

    assert!(list_wallets(&missing).unwrap().is_empty());
}

#[test]
fn list_wallets__returns_sorted_names() {
    let dir = TempDir::new("donsession").unwrap();
    let wallet_dir = dir.path().to_path_buf();
    write_wallet(&wallet_dir, "zoe");
    write_wallet(&wallet_dir, "alice");
    write_wallet(&wallet_dir, "mallory");

    let names: Vec<String> = list_wallets(&wallet_dir)
        .unwrap()
        .into_iter()
        .map(|w| w.name)
        .collect();

    assert_eq!(names, vec!["alice", "mallory", "zoe"]);
}

#[test]
fn list_wallets__ignores_other_extensions() {
    let dir = TempDir::new("donsession").unwrap();
    let wallet_dir = dir.path().to_path_buf();
    write_wallet(&wallet_dir, "alice");
    fs::write(wallet_dir.join("notes.txt"), "hi").unwrap();
    fs::create_dir(wallet_dir.join("sub.wallet")).unwrap();

    let wallets = list_wallets(&wallet_dir).unwrap();

    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].name, "alice");
}

#[test]
fn resolve_wallet_dir__expands_explicit_paths() {
    let resolved = resolve_wallet_dir(Some("/tmp/wallets")).unwrap();
    assert_eq!(resolved, PathBuf::from("/tmp/wallets"));
}

#[test]
fn connect__cancelled_selection_creates_no_session_and_no_cache() {
    let dir = TempDir::new("donsession").unwrap();
    let (mut manager, cache_path) = manager_for(&dir, true);
    write_wallet(&dir.path().join("wallets"), "alice");

    // the user backs out of the provider selection
    let mut chooser = |_: &[WalletDescriptor]| -> Option<usize> { None };
    let session = manager.connect(&mut chooser).unwrap();

    assert!(session.is_none());
    assert!(!cache_path.exists());
}

#[test]
fn connect__with_no_wallets_is_an_error() {
    let dir = TempDir::new("donsession").unwrap();
    let (mut manager, _) = manager_for(&dir, true);

    let mut chooser = |_: &[WalletDescriptor]| -> Option<usize> { None };
    assert!(manager.connect(&mut chooser).is_err());
}

#[test]
fn connect__out_of_range_selection_is_an_error() {
    let dir = TempDir::new("donsession").unwrap();
    let (mut manager, _) = manager_for(&dir, true);
    write_wallet(&dir.path().join("wallets"), "alice");

    let mut chooser = |_: &[WalletDescriptor]| -> Option<usize> { Some(99) };
    assert!(manager.connect(&mut chooser).is_err());
}

#[test]
fn cached_provider__reads_back_the_record() {
    let dir = TempDir::new("donsession").unwrap();
    let (manager, cache_path) = manager_for(&dir, true);
    write_cache(&cache_path, "alice");

    assert_eq!(manager.cached_provider(), Some(String::from("alice")));
}

#[test]
fn cached_provider__is_none_for_garbage_records() {
    let dir = TempDir::new("donsession").unwrap();
    let (manager, cache_path) = manager_for(&dir, true);
    fs::write(&cache_path, "not json").unwrap();

    assert_eq!(manager.cached_provider(), None);
}

#[test]
fn auto_connect__is_skipped_when_autoload_is_off() {
    let dir = TempDir::new("donsession").unwrap();
    let (mut manager, cache_path) = manager_for(&dir, false);
    write_wallet(&dir.path().join("wallets"), "alice");
    write_cache(&cache_path, "alice");

    let session = manager.auto_connect().unwrap();

    assert!(session.is_none());
    // the cache survives, it was simply not used
    assert!(cache_path.exists());
}

#[test]
fn auto_connect__without_a_cache_does_nothing() {
    let dir = TempDir::new("donsession").unwrap();
    let (mut manager, _) = manager_for(&dir, true);

    assert!(manager.auto_connect().unwrap().is_none());
}

#[test]
fn auto_connect__clears_a_stale_cache_record() {
    let dir = TempDir::new("donsession").unwrap();
    let (mut manager, cache_path) = manager_for(&dir, true);
    write_cache(&cache_path, "ghost");

    let session = manager.auto_connect().unwrap();

    assert!(session.is_none());
    assert!(!cache_path.exists());
}

#[test]
fn auto_connect__runs_at_most_once_per_process() {
    let dir = TempDir::new("donsession").unwrap();
    let (mut manager, cache_path) = manager_for(&dir, true);

    // first run consumes the one auto-load attempt
    assert!(manager.auto_connect().unwrap().is_none());

    // a cache appearing later must not trigger a second attempt
    write_cache(&cache_path, "alice");
    assert!(manager.auto_connect().unwrap().is_none());
    assert!(cache_path.exists());
}

#[test]
fn disconnect__removes_the_cache_record() {
    let dir = TempDir::new("donsession").unwrap();
    let (manager, cache_path) = manager_for(&dir, true);
    write_cache(&cache_path, "alice");

    manager.disconnect().unwrap();

    assert!(!cache_path.exists());
}

#[test]
fn disconnect__with_no_cache_is_a_no_op() {
    let dir = TempDir::new("donsession").unwrap();
    let (manager, cache_path) = manager_for(&dir, true);

    manager.disconnect().unwrap();

    assert!(!cache_path.exists());
}

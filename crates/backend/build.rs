use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// target/debug или target/release, куда ляжет бинарник
fn profile_dir() -> io::Result<PathBuf> {
    let out_dir = env::var("OUT_DIR").map_err(io::Error::other)?;
    let profile = env::var("PROFILE").map_err(io::Error::other)?;
    Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::other("target profile directory not found"))
}

fn copy_migrations(source: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(source)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "sql") {
            if let Some(name) = path.file_name() {
                fs::copy(&path, dest.join(name))?;
            }
        }
    }
    Ok(())
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=../../config.toml");
    println!("cargo:rerun-if-changed=../../migrations");

    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .ok_or_else(|| io::Error::other("workspace root not found"))?;
    let target_dir = profile_dir()?;

    // Конфиг и миграции рядом с бинарником
    let source_config = workspace_root.join("config.toml");
    if source_config.exists() {
        fs::copy(&source_config, target_dir.join("config.toml"))?;
    } else {
        println!(
            "cargo:warning=config.toml not found at {:?}, using default config",
            source_config
        );
    }

    let source_migrations = workspace_root.join("migrations");
    if source_migrations.is_dir() {
        copy_migrations(&source_migrations, &target_dir.join("migrations"))?;
    }

    Ok(())
}

//! `chassis-mcp init`: seed the data directory with an editable catalog and
//! settings that point at it.

use std::path::{Path, PathBuf};

use chassis_core::{read_settings_from, write_settings_to, Catalog, Settings};

#[derive(Debug, Default)]
pub struct InitReport {
    pub written: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
    pub settings: Settings,
}

pub fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let dir = chassis_core::data_dir();
    let report = init_data_dir(&dir, force)?;
    for path in &report.written {
        eprintln!("Wrote {}", path.display());
    }
    for path in &report.kept {
        eprintln!("Kept existing {} (use --force to overwrite)", path.display());
    }
    let catalog = report.settings.load_catalog()?;
    eprintln!(
        "\nDone. {} server(s) in the catalog, exports go to {}.",
        catalog.servers.len(),
        report.settings.export_dir().display()
    );
    Ok(())
}

/// Write `catalog.json` (a copy of the built-in catalog) and `settings.json`
/// into `dir`. Existing files are kept unless `force` is set; kept settings
/// must still parse.
pub fn init_data_dir(dir: &Path, force: bool) -> Result<InitReport, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let mut report = InitReport::default();

    let catalog_path = dir.join("catalog.json");
    if force || !catalog_path.exists() {
        let json = serde_json::to_string_pretty(&Catalog::builtin()?)?;
        std::fs::write(&catalog_path, json)?;
        report.written.push(catalog_path.clone());
    } else {
        // Fail early on a catalog the server would refuse to start with.
        Catalog::load(&catalog_path)?;
        report.kept.push(catalog_path.clone());
    }

    let settings_path = dir.join("settings.json");
    if force || !settings_path.exists() {
        let settings = Settings {
            catalog_path: Some(catalog_path),
            export_dir: Some(dir.join("exports")),
            ..Settings::default()
        };
        write_settings_to(&settings_path, &settings)?;
        tracing::info!(path = %settings_path.display(), "settings initialized");
        report.written.push(settings_path);
        report.settings = settings;
    } else {
        report.settings = read_settings_from(&settings_path)?;
        report.kept.push(settings_path);
    }

    Ok(report)
}

use crate::commands::{Command, NoArgs};
use crate::models::mod_dto::{DetectedMod, InstalledModRecord};

/// Lists the mods recorded as installed in the backend database.
pub struct GetInstalledMods;

impl Command for GetInstalledMods {
    const NAME: &'static str = "get_installed_mods_from_db";
    type Args = NoArgs;
    type Output = Vec<InstalledModRecord>;
}

/// Re-scans the mods directory.
pub struct RefreshModsFolder;

impl Command for RefreshModsFolder {
    const NAME: &'static str = "refresh_mods_folder";
    type Args = NoArgs;
    type Output = ();
}

/// Mods present on disk, whether or not the database tracks them.
pub struct GetDetectedLocalMods;

impl Command for GetDetectedLocalMods {
    const NAME: &'static str = "get_detected_local_mods";
    type Args = NoArgs;
    type Output = Vec<DetectedMod>;
}

use crate::commands::{Command, NoArgs};
use crate::models::mod_dto::Mod;

pub struct GetModCatalog;

impl Command for GetModCatalog {
    const NAME: &'static str = "get_mod_catalog";
    type Args = NoArgs;
    type Output = Vec<Mod>;
}

pub struct GetSteamoddedVersions;

impl Command for GetSteamoddedVersions {
    const NAME: &'static str = "get_steamodded_versions";
    type Args = NoArgs;
    type Output = Vec<String>;
}

pub struct GetTalismanVersions;

impl Command for GetTalismanVersions {
    const NAME: &'static str = "get_talisman_versions";
    type Args = NoArgs;
    type Output = Vec<String>;
}

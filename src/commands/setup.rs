use crate::commands::{Command, NoArgs};
use serde::Serialize;

// Commands used by the first-run flow; usually called through `invoke_with_timeout`.

pub struct FindSteamBalatro;

impl Command for FindSteamBalatro {
    const NAME: &'static str = "find_steam_balatro";
    type Args = NoArgs;
    type Output = Vec<String>;
}

#[derive(Serialize, Debug, Clone)]
pub struct CustomPath {
    pub path: String,
}

pub struct CheckCustomBalatro;

impl Command for CheckCustomBalatro {
    const NAME: &'static str = "check_custom_balatro";
    type Args = CustomPath;
    type Output = bool;
}

pub struct CheckExistingInstallation;

impl Command for CheckExistingInstallation {
    const NAME: &'static str = "check_existing_installation";
    type Args = NoArgs;
    type Output = Option<String>;
}

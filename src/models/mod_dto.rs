use serde::{Deserialize, Serialize};

/// Installed mod as exposed to readers: only the identifying name and its path.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct InstalledMod {
    pub name: String,
    pub path: String,
}

impl InstalledMod {
    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Record returned by the backend installed-mods query.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InstalledModRecord {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub current_version: Option<String>,
}

impl From<InstalledModRecord> for InstalledMod {
    fn from(record: InstalledModRecord) -> Self {
        Self {
            name: record.name,
            path: record.path,
        }
    }
}

/// A mod found on disk by the backend's local detection pass.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct DetectedMod {
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub author: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
    pub path: String,
    #[serde(default)]
    pub is_duplicate: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub enum Category {
    Content = 0,
    Joker = 1,
    QualityOfLife = 2,
    Technical = 3,
    Miscellaneous = 4,
    ResourcePacks = 5,
    API = 6,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Content,
        Category::Joker,
        Category::QualityOfLife,
        Category::Technical,
        Category::Miscellaneous,
        Category::ResourcePacks,
        Category::API,
    ];
}

impl TryFrom<u8> for Category {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Category::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| format!("invalid category index: {value}"))
    }
}

impl From<Category> for u8 {
    fn from(category: Category) -> Self {
        category as u8
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorPair {
    pub color1: String,
    pub color2: String,
}

/// Catalog entry, as rendered by the browse views.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Mod {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub colors: ColorPair,
    #[serde(default)]
    pub installed: bool,
    #[serde(rename = "requires_steamodded", default)]
    pub requires_steamodded: bool,
    #[serde(rename = "requires_talisman", default)]
    pub requires_talisman: bool,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub repo: String,
    #[serde(rename = "downloadURL", default)]
    pub download_url: String,
    #[serde(default)]
    pub folder_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub last_updated: u64,
    #[serde(rename = "_installedPath", default)]
    pub installed_path: Option<String>,
}

// Persisted projection: same record without the large free-text fields.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlimMod {
    pub title: String,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub colors: ColorPair,
    #[serde(default)]
    pub installed: bool,
    #[serde(rename = "requires_steamodded", default)]
    pub requires_steamodded: bool,
    #[serde(rename = "requires_talisman", default)]
    pub requires_talisman: bool,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub repo: String,
    #[serde(rename = "downloadURL", default)]
    pub download_url: String,
    #[serde(default)]
    pub folder_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub last_updated: u64,
    #[serde(rename = "_installedPath", default)]
    pub installed_path: Option<String>,
}

impl From<&Mod> for SlimMod {
    fn from(m: &Mod) -> Self {
        Self {
            title: m.title.clone(),
            categories: m.categories.clone(),
            colors: m.colors.clone(),
            installed: m.installed,
            requires_steamodded: m.requires_steamodded,
            requires_talisman: m.requires_talisman,
            publisher: m.publisher.clone(),
            repo: m.repo.clone(),
            download_url: m.download_url.clone(),
            folder_name: m.folder_name.clone(),
            version: m.version.clone(),
            last_updated: m.last_updated,
            installed_path: m.installed_path.clone(),
        }
    }
}

impl From<SlimMod> for Mod {
    fn from(s: SlimMod) -> Self {
        Self {
            title: s.title,
            description: String::new(),
            image: String::new(),
            categories: s.categories,
            colors: s.colors,
            installed: s.installed,
            requires_steamodded: s.requires_steamodded,
            requires_talisman: s.requires_talisman,
            publisher: s.publisher,
            repo: s.repo,
            download_url: s.download_url,
            folder_name: s.folder_name,
            version: s.version,
            last_updated: s.last_updated,
            installed_path: s.installed_path,
        }
    }
}

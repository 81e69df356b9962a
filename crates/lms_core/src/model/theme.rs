//! Branding and theme configuration, stored as one object rather than a list.

use serde::{Deserialize, Serialize};

pub const THEME_KEY: &str = "lms_theme";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeSettings {
    pub company_name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
    pub dark_mode: bool,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            company_name: "LMS".to_string(),
            logo_url: None,
            primary_color: "#2563eb".to_string(),
            secondary_color: "#1e293b".to_string(),
            accent_color: "#f59e0b".to_string(),
            font_family: "Inter, sans-serif".to_string(),
            dark_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ThemeSettings;

    #[test]
    fn partial_documents_fill_missing_fields_from_defaults() {
        let theme: ThemeSettings =
            serde_json::from_str(r##"{"companyName":"Acme","darkMode":true}"##).unwrap();
        assert_eq!(theme.company_name, "Acme");
        assert!(theme.dark_mode);
        assert_eq!(theme.primary_color, ThemeSettings::default().primary_color);
    }
}

use pagesmith_model::Breakpoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pixel widths at which the responsive tiers switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeBreakpoints {
    pub mobile: u32,
    pub tablet: u32,
    pub desktop: u32,
}

impl ThemeBreakpoints {
    pub fn width(&self, breakpoint: Breakpoint) -> u32 {
        match breakpoint {
            Breakpoint::Desktop => self.desktop,
            Breakpoint::Tablet => self.tablet,
            Breakpoint::Mobile => self.mobile,
        }
    }
}

impl Default for ThemeBreakpoints {
    fn default() -> Self {
        Self {
            mobile: 768,
            tablet: 1024,
            desktop: 1200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeFonts {
    pub heading: String,
    pub body: String,
}

impl Default for ThemeFonts {
    fn default() -> Self {
        Self {
            heading: "Arial".to_string(),
            body: "Arial".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default)]
    pub fonts: ThemeFonts,
    #[serde(default)]
    pub spacing: BTreeMap<String, String>,
    #[serde(default)]
    pub breakpoints: ThemeBreakpoints,
    /// Extra custom properties, emitted as `--name: value`
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl Theme {
    /// CSS `font-family` stack for body text
    pub fn font_family(&self) -> String {
        format!("{}, sans-serif", self.fonts.body)
    }

    /// Colors, spacing and variables as CSS custom properties
    pub fn custom_properties(&self) -> Vec<(String, String)> {
        let colors = self.colors.iter().map(|(k, v)| (format!("--color-{}", k), v.clone()));
        let spacing = self.spacing.iter().map(|(k, v)| (format!("--spacing-{}", k), v.clone()));
        let variables = self.variables.iter().map(|(k, v)| (format!("--{}", k), v.clone()));
        colors.chain(spacing).chain(variables).collect()
    }
}
